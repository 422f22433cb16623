use corkscrew_common::models::AuthChange;
use std::sync::Arc;

/// Side channel that tells the server about client-side session changes
pub trait SessionForwarder: Send + Sync {
    /// Hand off `change`. Returns immediately; the outcome is never reported back.
    fn forward(&self, change: &AuthChange);
}

/// Posts each change to `{server}/auth/callback` on a detached task
#[derive(Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    callback_url: Arc<str>,
}

impl HttpForwarder {
    pub fn new(server_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), server_url)
    }

    pub fn with_client(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            callback_url: Arc::from(format!(
                "{}/auth/callback",
                server_url.trim_end_matches('/')
            )),
        }
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

impl SessionForwarder for HttpForwarder {
    fn forward(&self, change: &AuthChange) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime to forward {:?}, dropping it", change.event);
            return;
        };
        let client = self.client.clone();
        let url = self.callback_url.clone();
        let change = change.clone();
        runtime.spawn(async move {
            match client.post(url.as_ref()).json(&change).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::debug!(
                        "Session callback for {:?} returned {}",
                        change.event,
                        response.status()
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Session callback for {:?} failed: {}", change.event, e);
                }
            }
        });
    }
}
