use corkscrew_backend::{Backend, RestBackend};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Absent until the backend credentials are configured
    pub backend: Option<Arc<dyn Backend>>,
    pub session_store: SessionStore,
}

impl AppState {
    pub fn new(config: ServerConfig, backend: Option<Arc<dyn Backend>>) -> Self {
        let session_store = SessionStore::new(config.secure_cookies);
        Self {
            config: Arc::new(config),
            backend,
            session_store,
        }
    }

    /// State talking to the hosted backend named in `config`, if any
    pub fn from_config(config: ServerConfig) -> Self {
        let backend = config.backend.as_ref().map(|b| {
            Arc::new(RestBackend::new(&b.url, &b.anon_key)) as Arc<dyn Backend>
        });
        Self::new(config, backend)
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        self.config
            .backend
            .as_ref()
            .and_then(|b| b.jwt_secret.as_deref())
            .filter(|secret| !secret.is_empty())
    }
}
