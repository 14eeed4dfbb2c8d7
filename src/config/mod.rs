pub mod providers;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub embed: EmbedConfig,
    pub upstream: UpstreamConfig,
}

/// Bind address and request limits for the embedding proxy service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: u64,
    pub max_request_body_size: usize,
    pub max_text_length: usize,
}

/// How the matcher reaches the embedding proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    pub server_url: String,
    pub timeout_seconds: u64,
    pub concurrency: usize,
}

/// How the proxy reaches upstream embedding providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub config_path: PathBuf,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "7777".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let rate_limit = std::env::var("EMBED_RATE_LIMIT")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_RATE_LIMIT value".to_string()))?;

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let max_text_length = std::env::var("MAX_TEXT_LENGTH")
            .unwrap_or_else(|_| "8192".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_TEXT_LENGTH value".to_string()))?;

        let server_url =
            std::env::var("EMBED_SERVER_URL").unwrap_or_else(|_| "http://localhost:7777".to_string());

        let embed_timeout = std::env::var("EMBED_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_TIMEOUT value".to_string()))?;

        let concurrency = std::env::var("EMBED_CONCURRENCY")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBED_CONCURRENCY value".to_string()))?;

        let config_path = std::env::var("PROVIDER_CONFIG_PATH")
            .unwrap_or_else(|_| "config/providers.yaml".to_string())
            .into();

        let upstream_timeout = std::env::var("UPSTREAM_TIMEOUT")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid UPSTREAM_TIMEOUT value".to_string()))?;

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                rate_limit,
                max_request_body_size,
                max_text_length,
            },
            embed: EmbedConfig {
                server_url,
                timeout_seconds: embed_timeout,
                concurrency,
            },
            upstream: UpstreamConfig {
                config_path,
                timeout_seconds: upstream_timeout,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.rate_limit == 0 {
            return Err(Error::Config("Rate limit must be non-zero".to_string()));
        }

        if self.server.max_text_length == 0 {
            return Err(Error::Config("Max text length must be non-zero".to_string()));
        }

        if self.embed.timeout_seconds == 0 || self.upstream.timeout_seconds == 0 {
            return Err(Error::Config("Timeouts must be non-zero".to_string()));
        }

        if self.embed.concurrency == 0 {
            return Err(Error::Config(
                "Embedding concurrency must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 7777,
                rate_limit: 50,
                max_request_body_size: 1048576,
                max_text_length: 8192,
            },
            embed: EmbedConfig {
                server_url: "http://localhost:7777".to_string(),
                timeout_seconds: 30,
                concurrency: 8,
            },
            upstream: UpstreamConfig {
                config_path: "config/providers.yaml".into(),
                timeout_seconds: 60,
            },
        }
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = test_settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut settings = test_settings();
        settings.embed.concurrency = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = test_settings();
        settings.upstream.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }
}
