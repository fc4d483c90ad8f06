//! Session-related types.

use std::fmt;

use lumina_core::Email;
use serde::{Deserialize, Serialize};

/// The signed-in editor, as stored in the session.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentEditor {
    /// Auth service user id.
    pub user_id: String,
    pub email: Email,
    /// Bearer token issued at sign-in, re-validated by the dashboard.
    pub access_token: String,
}

impl fmt::Debug for CurrentEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentEditor")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in editor.
    pub const CURRENT_EDITOR: &str = "current_editor";
}
