use serde::{Deserialize, Serialize};

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

/// Hosted backend project credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    /// Secret the backend signs access tokens with. When set, session cookies
    /// are signature-checked; otherwise only their claims are read.
    pub jwt_secret: Option<String>,
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    pub backend: Option<BackendConfig>,
    /// Mark session cookies `Secure` (serve over HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            backend: None,
            secure_cookies: false,
        }
    }
}

impl ServerConfig {
    /// Overlay `BACKEND_URL` / `BACKEND_ANON_KEY`. Both must be present for the
    /// backend to count as configured.
    pub fn with_backend_env(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        let url = url.filter(|v| !v.trim().is_empty());
        let anon_key = anon_key.filter(|v| !v.trim().is_empty());
        match (url, anon_key, self.backend.as_mut()) {
            (Some(url), Some(anon_key), Some(backend)) => {
                backend.url = url;
                backend.anon_key = anon_key;
            }
            (Some(url), Some(anon_key), None) => {
                self.backend = Some(BackendConfig {
                    url,
                    anon_key,
                    jwt_secret: None,
                });
            }
            _ => {}
        }
        if self
            .backend
            .as_ref()
            .is_some_and(|b| b.url.trim().is_empty() || b.anon_key.trim().is_empty())
        {
            self.backend = None;
        }
        self
    }

    /// Whether session cookies are signature-checked before their claims are
    /// trusted. False means the rendered identity comes from unverified tokens.
    pub fn verifies_session_tokens(&self) -> bool {
        self.backend
            .as_ref()
            .and_then(|b| b.jwt_secret.as_deref())
            .is_some_and(|secret| !secret.is_empty())
    }
}

/// Load server config from an optional YAML file with CORKSCREW__ env var
/// overrides, then the backend credential variables.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml).required(false))
        .add_source(
            config::Environment::with_prefix("CORKSCREW")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;

    Ok(config.with_backend_env(
        std::env::var("BACKEND_URL").ok(),
        std::env::var("BACKEND_ANON_KEY").ok(),
    ))
}
