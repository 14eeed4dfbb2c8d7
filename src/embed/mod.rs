use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request body accepted by the embedding proxy.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

/// Canonical proxy response: `data[0].embedding` carries the vector no
/// matter which upstream provider answered.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f64>,
}

/// Client for the embedding proxy. Explicitly constructed and passed
/// where it is needed; there is no process-global instance, which keeps
/// tests free to point each matcher at its own mock server.
#[derive(Debug, Clone)]
pub struct EmbedClient {
    client: Client,
    base_url: String,
}

impl EmbedClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Embed one text. Every failure (transport, non-success status,
    /// unexpected body) collapses into `None`: absence is an ordinary
    /// outcome here, and the caller decides what degraded mode to use.
    /// No retries, no caching; the semantic matcher owns batching.
    pub async fn embed(&self, text: &str) -> Option<Vec<f64>> {
        let url = format!("{}/api/embed", self.base_url);

        let response = match self
            .client
            .post(&url)
            .json(&EmbedRequest { text })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Embedding request failed to send");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Embedding service returned an error");
            return None;
        }

        let body: EmbedResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Embedding response body was not the expected shape");
                return None;
            }
        };

        match body.data.into_iter().next() {
            Some(d) if !d.embedding.is_empty() => {
                debug!(dims = d.embedding.len(), "Received embedding");
                Some(d.embedding)
            }
            _ => {
                warn!("Embedding response carried no vector");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> EmbedClient {
        EmbedClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_embed_returns_vector_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embed")
            .match_body(mockito::Matcher::Json(serde_json::json!({"text": "egg milk"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
            .create_async()
            .await;

        let result = client(&server.url()).embed("egg milk").await;

        assert_eq!(result, Some(vec![0.1, 0.2, 0.3]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_absent_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(502)
            .with_body(r#"{"error":"upstream failed"}"#)
            .create_async()
            .await;

        assert_eq!(client(&server.url()).embed("egg").await, None);
    }

    #[tokio::test]
    async fn test_embed_absent_on_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(200)
            .with_body(r#"{"vectors":[1,2,3]}"#)
            .create_async()
            .await;

        assert_eq!(client(&server.url()).embed("egg").await, None);
    }

    #[tokio::test]
    async fn test_embed_absent_on_empty_data_array() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        assert_eq!(client(&server.url()).embed("egg").await, None);
    }

    #[tokio::test]
    async fn test_embed_absent_when_unreachable() {
        // Nothing listens on this port
        let c = EmbedClient::new("http://127.0.0.1:59999", Duration::from_millis(200)).unwrap();
        assert_eq!(c.embed("egg").await, None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let c = client("http://localhost:7777/");
        assert_eq!(c.base_url, "http://localhost:7777");
    }
}
