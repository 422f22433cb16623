use anyhow::Result;
use corkscrew_backend::RestBackend;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::client::BackendClient;
use crate::config::ClientConfig;

/// Lazily built, process-wide [`BackendClient`].
///
/// The first successful initialization wins; every later call hands out the
/// same `Arc`, so all forms and the session bridge observe one session slot.
pub struct SharedClient {
    cell: OnceCell<Arc<BackendClient>>,
}

static SHARED: SharedClient = SharedClient::new();

impl SharedClient {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The process-wide instance
    pub fn global() -> &'static SharedClient {
        &SHARED
    }

    pub fn get(&self) -> Option<Arc<BackendClient>> {
        self.cell.get().cloned()
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> BackendClient) -> Arc<BackendClient> {
        self.cell.get_or_init(|| Arc::new(init())).clone()
    }

    /// Build the client against the REST backend named in `config`
    pub fn get_or_connect(&self, config: &ClientConfig) -> Result<Arc<BackendClient>> {
        self.cell
            .get_or_try_init(|| {
                let (url, key) = config.backend_credentials()?;
                tracing::debug!("Creating backend client for {}", url);
                let backend = RestBackend::new(url, key);
                Ok::<_, anyhow::Error>(Arc::new(BackendClient::new(Arc::new(backend))))
            })
            .cloned()
    }
}

impl Default for SharedClient {
    fn default() -> Self {
        Self::new()
    }
}
