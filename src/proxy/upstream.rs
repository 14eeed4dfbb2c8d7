use crate::config::providers::{ProviderConfig, ProviderKind};
use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// A fully resolved upstream provider: endpoint, credential and model
/// are all known at construction time.
#[derive(Debug, Clone)]
pub struct Provider {
    name: String,
    kind: ProviderKind,
    endpoint: String,
    api_key: String,
    model: String,
}

impl Provider {
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

/// The resolved upstream providers in priority order, sharing one HTTP
/// client. Each request is handed to the first provider only; there is
/// no cascading to the next provider within a request.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    client: Client,
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Provider>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client, providers })
    }

    /// Resolve the configured providers against the environment.
    /// Entries whose credential variable is unset are skipped with a
    /// warning rather than failing startup; an empty registry simply
    /// answers every embed request with the no-provider outcome.
    pub fn from_config(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let mut providers = Vec::new();
        for entry in config.enabled_providers() {
            match std::env::var(&entry.api_key_env) {
                Ok(key) if !key.trim().is_empty() => {
                    providers.push(Provider::new(
                        entry.name.clone(),
                        entry.kind,
                        entry.endpoint(),
                        key,
                        entry.model(),
                    ));
                }
                _ => {
                    warn!(
                        provider = %entry.name,
                        env = %entry.api_key_env,
                        "Skipping provider: credential variable not set"
                    );
                }
            }
        }

        Self::new(providers, timeout)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }

    /// Embed a text through the highest-priority provider.
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let provider = self.providers.first().ok_or(Error::NoProvider)?;
        debug!(provider = %provider.name, "Forwarding embed request upstream");
        match provider.kind {
            ProviderKind::Gemini => self.embed_gemini(provider, text).await,
            ProviderKind::OpenAi => self.embed_openai(provider, text).await,
        }
    }

    async fn embed_gemini(&self, provider: &Provider, text: &str) -> Result<Vec<f64>> {
        // A bare API key goes in the query string; anything else (for
        // example an OAuth token with spaces or slashes) is sent as a
        // Bearer credential
        let key_shape = Regex::new(r"^[A-Za-z0-9_=.\-]+$").unwrap();

        let request = if key_shape.is_match(&provider.api_key) {
            let url = format!(
                "{}?key={}",
                provider.endpoint,
                urlencoding::encode(&provider.api_key)
            );
            self.client.post(url)
        } else {
            self.client
                .post(&provider.endpoint)
                .bearer_auth(&provider.api_key)
        };

        let response = request
            .json(&json!({"instances": [{"content": text}]}))
            .send()
            .await
            .map_err(|e| Error::UpstreamRequest {
                provider: provider.name.clone(),
                message: e.to_string(),
            })?;

        let raw = response.text().await.map_err(|e| Error::UpstreamRequest {
            provider: provider.name.clone(),
            message: e.to_string(),
        })?;

        normalize_gemini(provider, &raw)
    }

    async fn embed_openai(&self, provider: &Provider, text: &str) -> Result<Vec<f64>> {
        let response = self
            .client
            .post(&provider.endpoint)
            .bearer_auth(&provider.api_key)
            .json(&json!({"model": provider.model, "input": text}))
            .send()
            .await
            .map_err(|e| Error::UpstreamRequest {
                provider: provider.name.clone(),
                message: e.to_string(),
            })?;

        let raw = response.text().await.map_err(|e| Error::UpstreamRequest {
            provider: provider.name.clone(),
            message: e.to_string(),
        })?;

        normalize_openai(provider, &raw)
    }
}

/// Gemini deployments answer in several shapes; try the known vector
/// locations and normalize. Anything else is a bad upstream response,
/// surfaced with the raw body for diagnostics.
fn normalize_gemini(provider: &Provider, raw: &str) -> Result<Vec<f64>> {
    let body: Value = serde_json::from_str(raw).map_err(|_| Error::BadUpstream {
        provider: provider.name.clone(),
        body: raw.to_string(),
    })?;

    for pointer in [
        "/predictions/0/embedding",
        "/data/0/embedding",
        "/instances/0/embedding",
    ] {
        if let Some(vector) = body.pointer(pointer).and_then(as_vector) {
            return Ok(vector);
        }
    }

    Err(Error::BadUpstream {
        provider: provider.name.clone(),
        body: raw.to_string(),
    })
}

fn normalize_openai(provider: &Provider, raw: &str) -> Result<Vec<f64>> {
    let body: Value = serde_json::from_str(raw).map_err(|_| Error::BadUpstream {
        provider: provider.name.clone(),
        body: raw.to_string(),
    })?;

    body.pointer("/data/0/embedding")
        .and_then(as_vector)
        .ok_or_else(|| Error::BadUpstream {
            provider: provider.name.clone(),
            body: raw.to_string(),
        })
}

/// Read a JSON value as a non-empty vector of floats.
fn as_vector(value: &Value) -> Option<Vec<f64>> {
    let array = value.as_array()?;
    if array.is_empty() {
        return None;
    }
    array.iter().map(Value::as_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gemini(endpoint: &str, key: &str) -> Provider {
        Provider::new("gemini", ProviderKind::Gemini, endpoint, key, "")
    }

    fn openai(endpoint: &str, key: &str) -> Provider {
        Provider::new(
            "openai",
            ProviderKind::OpenAi,
            endpoint,
            key,
            "text-embedding-3-small",
        )
    }

    fn registry(provider: Provider) -> ProviderRegistry {
        ProviderRegistry::new(vec![provider], Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_as_vector() {
        assert_eq!(as_vector(&json!([0.1, 0.2, 3])), Some(vec![0.1, 0.2, 3.0]));
        assert_eq!(as_vector(&json!([])), None);
        assert_eq!(as_vector(&json!([0.1, "x"])), None);
        assert_eq!(as_vector(&json!("nope")), None);
    }

    #[test]
    fn test_normalize_gemini_reads_known_shapes() {
        let p = gemini("https://example.com", "k");

        for raw in [
            r#"{"predictions":[{"embedding":[0.1,0.2]}]}"#,
            r#"{"data":[{"embedding":[0.1,0.2]}]}"#,
            r#"{"instances":[{"embedding":[0.1,0.2]}]}"#,
        ] {
            let vector = normalize_gemini(&p, raw).unwrap();
            assert_eq!(vector, vec![0.1, 0.2]);
        }
    }

    #[test]
    fn test_normalize_gemini_rejects_unknown_shape_with_raw_body() {
        let p = gemini("https://example.com", "k");
        let raw = r#"{"error":{"status":"PERMISSION_DENIED"}}"#;

        match normalize_gemini(&p, raw) {
            Err(Error::BadUpstream { provider, body }) => {
                assert_eq!(provider, "gemini");
                assert_eq!(body, raw);
            }
            other => panic!("expected BadUpstream, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_gemini_rejects_non_json() {
        let p = gemini("https://example.com", "k");
        assert!(matches!(
            normalize_gemini(&p, "<html>gateway timeout</html>"),
            Err(Error::BadUpstream { .. })
        ));
    }

    #[test]
    fn test_normalize_openai() {
        let p = openai("https://example.com", "k");
        let vector = normalize_openai(
            &p,
            r#"{"object":"list","data":[{"object":"embedding","embedding":[1.0,2.0],"index":0}]}"#,
        )
        .unwrap();
        assert_eq!(vector, vec![1.0, 2.0]);

        assert!(matches!(
            normalize_openai(&p, r#"{"error":{"message":"bad key"}}"#),
            Err(Error::BadUpstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_gemini_api_key_goes_in_query_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/models/gecko:embed")
            .match_query(mockito::Matcher::UrlEncoded(
                "key".into(),
                "AIza-test_key".into(),
            ))
            .match_body(mockito::Matcher::Json(
                json!({"instances": [{"content": "egg"}]}),
            ))
            .with_body(r#"{"predictions":[{"embedding":[0.5]}]}"#)
            .create_async()
            .await;

        let url = format!("{}/v1/models/gecko:embed", server.url());
        let vector = registry(gemini(&url, "AIza-test_key"))
            .embed("egg")
            .await
            .unwrap();

        assert_eq!(vector, vec![0.5]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_oauth_token_goes_in_bearer_header() {
        let mut server = mockito::Server::new_async().await;
        // A credential with spaces does not look like an API key
        let mock = server
            .mock("POST", "/v1/models/gecko:embed")
            .match_header("authorization", "Bearer ya29 token with spaces")
            .with_body(r#"{"predictions":[{"embedding":[0.5]}]}"#)
            .create_async()
            .await;

        let url = format!("{}/v1/models/gecko:embed", server.url());
        registry(gemini(&url, "ya29 token with spaces"))
            .embed("egg")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_request_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::Json(
                json!({"model": "text-embedding-3-small", "input": "egg milk"}),
            ))
            .with_body(r#"{"data":[{"embedding":[0.25,0.75]}]}"#)
            .create_async()
            .await;

        let url = format!("{}/v1/embeddings", server.url());
        let vector = registry(openai(&url, "sk-test"))
            .embed("egg milk")
            .await
            .unwrap();

        assert_eq!(vector, vec![0.25, 0.75]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_first_provider_wins_no_cascade() {
        let mut server = mockito::Server::new_async().await;
        // First provider fails; the second must not be contacted
        let first = server
            .mock("POST", "/fail/v1/embeddings")
            .with_status(500)
            .with_body(r#"{"error":"boom"}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/ok/v1/embeddings")
            .with_body(r#"{"data":[{"embedding":[1.0]}]}"#)
            .expect(0)
            .create_async()
            .await;

        let providers = vec![
            openai(&format!("{}/fail/v1/embeddings", server.url()), "a"),
            openai(&format!("{}/ok/v1/embeddings", server.url()), "b"),
        ];
        let registry = ProviderRegistry::new(providers, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            registry.embed("egg").await,
            Err(Error::BadUpstream { .. })
        ));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_registry_reports_no_provider() {
        let registry = ProviderRegistry::new(Vec::new(), Duration::from_secs(5)).unwrap();

        assert!(registry.is_empty());
        assert!(matches!(registry.embed("egg").await, Err(Error::NoProvider)));
    }

    #[tokio::test]
    async fn test_from_config_skips_entries_without_credentials() {
        use crate::config::providers::{ProviderConfig, ProviderEntry};

        fn entry(name: &str, api_key_env: &str) -> ProviderEntry {
            ProviderEntry {
                name: name.to_string(),
                kind: ProviderKind::OpenAi,
                api_key_env: api_key_env.to_string(),
                endpoint: None,
                model: None,
                enabled: true,
            }
        }

        // Variable names are unique to this test; no other test touches them
        std::env::remove_var("PANTRY_TEST_UNSET_CRED");
        std::env::set_var("PANTRY_TEST_BLANK_CRED", "   ");
        std::env::set_var("PANTRY_TEST_SET_CRED", "sk-live");

        let config = ProviderConfig {
            version: 1,
            providers: vec![
                entry("no-cred", "PANTRY_TEST_UNSET_CRED"),
                entry("blank-cred", "PANTRY_TEST_BLANK_CRED"),
                entry("with-cred", "PANTRY_TEST_SET_CRED"),
            ],
        };

        let registry =
            ProviderRegistry::from_config(&config, Duration::from_secs(5)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.provider_names(), vec!["with-cred"]);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_a_request_failure() {
        let registry = ProviderRegistry::new(
            vec![openai("http://127.0.0.1:59998/v1/embeddings", "sk")],
            Duration::from_millis(200),
        )
        .unwrap();

        match registry.embed("egg").await {
            Err(Error::UpstreamRequest { provider, message }) => {
                assert_eq!(provider, "openai");
                assert!(!message.is_empty());
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
    }
}
