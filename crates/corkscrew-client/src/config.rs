use anyhow::{bail, Result};
use clap::Args;

/// Connection settings shared by every client command
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Backend project URL
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Backend public API key
    #[arg(long, env = "BACKEND_ANON_KEY", hide_env_values = true)]
    pub backend_anon_key: Option<String>,

    /// Corkscrew server that receives session changes on /auth/callback
    #[arg(long, env = "CORKSCREW_SERVER_URL", default_value = "http://localhost:3000")]
    pub server_url: String,
}

impl ClientConfig {
    /// Backend URL and key, both required and non-blank
    pub fn backend_credentials(&self) -> Result<(&str, &str)> {
        let url = self.backend_url.as_deref().map(str::trim).unwrap_or("");
        let key = self.backend_anon_key.as_deref().map(str::trim).unwrap_or("");
        if url.is_empty() || key.is_empty() {
            bail!("Backend is not configured: set BACKEND_URL and BACKEND_ANON_KEY");
        }
        Ok((url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ClientConfig,
    }

    #[test]
    fn test_parse_flags() {
        let cli = TestCli::parse_from([
            "corkscrew",
            "--backend-url",
            "https://project.example.co",
            "--backend-anon-key",
            "anon",
            "--server-url",
            "http://127.0.0.1:4000",
        ]);
        let (url, key) = cli.config.backend_credentials().unwrap();
        assert_eq!(url, "https://project.example.co");
        assert_eq!(key, "anon");
        assert_eq!(cli.config.server_url, "http://127.0.0.1:4000");
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let config = ClientConfig {
            backend_url: Some("https://project.example.co".into()),
            backend_anon_key: Some("  ".into()),
            server_url: "http://localhost:3000".into(),
        };
        let err = config.backend_credentials().unwrap_err();
        assert!(err.to_string().contains("BACKEND_ANON_KEY"));

        let config = ClientConfig {
            backend_url: None,
            ..config
        };
        assert!(config.backend_credentials().is_err());
    }
}
