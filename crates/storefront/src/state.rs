//! Application state shared across handlers.

use std::sync::Arc;

use lumina_core::Email;

use crate::config::StorefrontConfig;
use crate::shop::ShopStore;
use crate::supabase::AuthProvider;

/// Application state shared across all handlers.
///
/// Created once at startup, after the shop store has finished loading, and
/// dropped at shutdown. Cloning only bumps a reference count.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: Arc<ShopStore>,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig, shop: Arc<ShopStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, shop, auth }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The catalog and its mutation API.
    #[must_use]
    pub fn shop(&self) -> &ShopStore {
        &self.inner.shop
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }

    /// The only address allowed into the editor.
    #[must_use]
    pub fn editor_email(&self) -> &Email {
        &self.inner.config.editor_email
    }
}
