use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use url::Url;

/// Default Gemini embeddings endpoint (Vertex AI generative embeddings).
const GEMINI_ENDPOINT: &str =
    "https://api.generative.googleapis.com/v1/models/textembedding-gecko-001:embed";

/// Default OpenAI embeddings endpoint and model.
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
const OPENAI_MODEL: &str = "text-embedding-3-small";

/// Ordered list of upstream embedding providers. List order is priority
/// order: the proxy hands each request to the first enabled provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub version: u32,
    pub providers: Vec<ProviderEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub kind: ProviderKind,
    /// Name of the environment variable holding the credential. Keys never
    /// live in the config file itself.
    pub api_key_env: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

fn default_true() -> bool {
    true
}

impl ProviderEntry {
    /// Endpoint to call, falling back to the provider kind's default.
    pub fn endpoint(&self) -> &str {
        match &self.endpoint {
            Some(url) => url,
            None => match self.kind {
                ProviderKind::Gemini => GEMINI_ENDPOINT,
                ProviderKind::OpenAi => OPENAI_ENDPOINT,
            },
        }
    }

    /// Model identifier sent to providers that require one.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(OPENAI_MODEL)
    }
}

impl ProviderConfig {
    /// Load provider configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read provider config from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: ProviderConfig = serde_yaml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse provider config from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Build the provider list from conventional environment variables,
    /// used when no config file is present: Gemini (GEMINI_API_KEY) first,
    /// then OpenAI (OPENAI_API_KEY).
    pub fn from_env() -> Self {
        ProviderConfig {
            version: 1,
            providers: vec![
                ProviderEntry {
                    name: "gemini".to_string(),
                    kind: ProviderKind::Gemini,
                    api_key_env: "GEMINI_API_KEY".to_string(),
                    endpoint: None,
                    model: None,
                    enabled: true,
                },
                ProviderEntry {
                    name: "openai".to_string(),
                    kind: ProviderKind::OpenAi,
                    api_key_env: "OPENAI_API_KEY".to_string(),
                    endpoint: None,
                    model: None,
                    enabled: true,
                },
            ],
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported config version: {}. Expected version 1",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(&provider.name) {
                return Err(Error::Config(format!(
                    "Duplicate provider name: {}",
                    provider.name
                )));
            }
        }

        for (index, provider) in self.providers.iter().enumerate() {
            self.validate_provider(provider).map_err(|e| {
                Error::Config(format!("Provider #{} ({}): {}", index + 1, provider.name, e))
            })?;
        }

        Ok(())
    }

    fn validate_provider(&self, provider: &ProviderEntry) -> Result<()> {
        if provider.name.trim().is_empty() {
            return Err(Error::Config("Provider name cannot be empty".to_string()));
        }

        if provider.api_key_env.trim().is_empty() {
            return Err(Error::Config(
                "Provider api_key_env cannot be empty".to_string(),
            ));
        }

        let endpoint = provider.endpoint();
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Config(format!(
                "Invalid endpoint scheme '{}': expected http or https",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::Config(
                "Endpoint must have a valid host".to_string(),
            ));
        }

        Ok(())
    }

    /// Get an iterator over enabled providers, in priority order
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderEntry> {
        self.providers.iter().filter(|p| p.enabled)
    }

    /// Get the total number of configured providers
    pub fn total_providers(&self) -> usize {
        self.providers.len()
    }

    /// Get the number of enabled providers
    pub fn enabled_count(&self) -> usize {
        self.enabled_providers().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
version: 1
providers:
  - name: gemini-primary
    kind: gemini
    api_key_env: GEMINI_API_KEY
  - name: openai-fallback
    kind: openai
    api_key_env: OPENAI_API_KEY
    model: text-embedding-3-large
    enabled: false
"#;

        let file = create_test_config(config_content);
        let config = ProviderConfig::from_file(file.path()).unwrap();

        assert_eq!(config.version, 1);
        assert_eq!(config.total_providers(), 2);
        assert_eq!(config.enabled_count(), 1);
        assert_eq!(config.providers[0].kind, ProviderKind::Gemini);
        assert_eq!(config.providers[0].endpoint(), GEMINI_ENDPOINT);
        assert_eq!(config.providers[1].model(), "text-embedding-3-large");
        assert!(!config.providers[1].enabled);
    }

    #[test]
    fn test_reject_duplicate_names() {
        let config_content = r#"
version: 1
providers:
  - name: primary
    kind: gemini
    api_key_env: GEMINI_API_KEY
  - name: primary
    kind: openai
    api_key_env: OPENAI_API_KEY
"#;

        let file = create_test_config(config_content);
        let result = ProviderConfig::from_file(file.path());

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate provider name"));
    }

    #[test]
    fn test_reject_unsupported_version() {
        let config_content = r#"
version: 2
providers: []
"#;

        let file = create_test_config(config_content);
        let result = ProviderConfig::from_file(file.path());

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unsupported config version"));
    }

    #[test]
    fn test_reject_invalid_endpoint_scheme() {
        let config_content = r#"
version: 1
providers:
  - name: local
    kind: openai
    api_key_env: OPENAI_API_KEY
    endpoint: "ftp://example.com/embed"
"#;

        let file = create_test_config(config_content);
        let result = ProviderConfig::from_file(file.path());

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid endpoint scheme"));
    }

    #[test]
    fn test_default_model_and_endpoint() {
        let entry = ProviderEntry {
            name: "openai".to_string(),
            kind: ProviderKind::OpenAi,
            api_key_env: "OPENAI_API_KEY".to_string(),
            endpoint: None,
            model: None,
            enabled: true,
        };

        assert_eq!(entry.endpoint(), OPENAI_ENDPOINT);
        assert_eq!(entry.model(), OPENAI_MODEL);
    }

    #[test]
    fn test_env_fallback_priority_order() {
        let config = ProviderConfig::from_env();
        assert!(config.validate().is_ok());

        let kinds: Vec<ProviderKind> = config.enabled_providers().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProviderKind::Gemini, ProviderKind::OpenAi]);
    }
}
