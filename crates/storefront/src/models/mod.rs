//! Request-scoped models for storefront.

pub mod session;

pub use session::{CurrentEditor, keys as session_keys};
