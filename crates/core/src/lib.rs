//! Lumina Core - Shared catalog types and logic.
//!
//! This crate provides the domain model used by every Lumina component:
//! - `storefront` - Public catalog and the gated editor panel
//! - `cli` - Command-line tools for seeding, resetting and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. The storefront's shop store drives [`catalog::Catalog`]
//! as the optimistic half of every mutation.
//!
//! # Modules
//!
//! - [`types`] - Products, classifications, site config, ids, emails and prices
//! - [`catalog`] - The in-memory catalog, rename/delete cascades, filtering and sorting
//! - [`defaults`] - The built-in seed dataset

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod defaults;
pub mod types;

pub use catalog::{Catalog, CatalogError, CatalogQuery, DanglingReference, Section, SortOrder};
pub use types::*;
