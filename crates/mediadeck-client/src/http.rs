//! Thin HTTP wrapper over the remote API.
//!
//! One `reqwest::Client` per session, carrying the configured timeout.
//! Every call is a single attempt; the operator retries by reissuing
//! the action, never the client.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::ClientError;

/// HTTP client bound to the configured base URL.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Connect(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` relative to the base URL with the given query
    /// parameters, returning the parsed body.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.decode(response).await
    }

    /// PATCH `path` with an optional JSON body, returning the parsed
    /// response body.
    pub async fn patch(&self, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        info!(%url, "PATCH");
        let mut request = self.http.patch(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        self.decode(response).await
    }

    async fn decode(&self, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Connect(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_HOST, ENV_PORT, ENV_TIMEOUT};

    fn refused_config() -> ApiConfig {
        // Port 1 on loopback: nothing listens there, connect fails fast.
        ApiConfig::from_lookup(|var| match var {
            ENV_HOST => Some("127.0.0.1".to_string()),
            ENV_PORT => Some("1".to_string()),
            ENV_TIMEOUT => Some("2".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn base_url_comes_from_config() {
        let client = ApiClient::new(&refused_config()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:1/conveyor/");
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connect_error() {
        let client = ApiClient::new(&refused_config()).unwrap();
        let err = client.get("health", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)), "got {err:?}");
    }
}
