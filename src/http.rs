//! HTTP client module for WeChat Open Platform API calls.
//!
//! Wraps `reqwest` with the construction-time configuration and the response
//! envelope handling shared by every endpoint. Timeouts and cancellation are
//! entirely the transport's concern; this layer adds no retry of its own.
//! The single `42001` replay lives in the token manager.

use crate::config::{Config, RequestOptions};
use crate::error::{Result, WeChatError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP client for WeChat Open Platform component API calls.
#[derive(Debug, Clone)]
pub struct ComponentHttpClient {
    client: Client,
    config: Config,
}

impl ComponentHttpClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.http.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Posts a JSON body to an unauthenticated endpoint and parses the
    /// response envelope. Used for token issuance.
    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de> + std::fmt::Debug,
    {
        let url = format!("{}{}", self.config.http.base_url, endpoint);
        self.execute_json(&url, body, &RequestOptions::default())
            .await
    }

    /// Posts a JSON body to a component endpoint with the access token as a
    /// query parameter, parsing the response envelope.
    pub async fn post_component<B, T>(&self, operation: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de> + std::fmt::Debug,
    {
        self.post_component_with(operation, token, body, &RequestOptions::default())
            .await
    }

    /// Same as [`post_component`](Self::post_component) with per-call request
    /// overrides merged over the construction-time defaults.
    pub async fn post_component_with<B, T>(
        &self,
        operation: &str,
        token: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de> + std::fmt::Debug,
    {
        let url = self.component_url(operation, token);
        self.execute_json(&url, body, options).await
    }

    /// Posts to a component endpoint whose success response carries no
    /// payload beyond the envelope.
    pub async fn post_component_ack<B>(&self, operation: &str, token: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.component_url(operation, token);
        let envelope: WeChatResponse<serde_json::Value> = self
            .execute_envelope(&url, body, &RequestOptions::default())
            .await?;
        envelope.into_ack()
    }

    fn component_url(&self, operation: &str, token: &str) -> String {
        format!(
            "{}component/{}?component_access_token={}",
            self.config.http.base_url, operation, token
        )
    }

    async fn execute_json<B, T>(&self, url: &str, body: &B, options: &RequestOptions) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de> + std::fmt::Debug,
    {
        let envelope: WeChatResponse<T> = self.execute_envelope(url, body, options).await?;
        envelope.into_result()
    }

    async fn execute_envelope<B, T>(
        &self,
        url: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<WeChatResponse<T>>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let mut request = self.client.post(url).json(body);

        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WeChatError::Internal(anyhow::anyhow!(
                "HTTP {status}: {text}"
            )));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        debug!("received {} bytes from {}", bytes.len(), url);

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn map_transport_error(e: reqwest::Error) -> WeChatError {
    if e.is_timeout() {
        WeChatError::Timeout
    } else {
        WeChatError::Network(e)
    }
}

/// Standard WeChat API response envelope.
///
/// A zero (or absent) `errcode` signals success; any other value is a
/// domain-specific failure with an accompanying message.
#[derive(Debug, Deserialize, Serialize)]
pub struct WeChatResponse<T> {
    /// Error code (0 for success)
    #[serde(default)]
    pub errcode: i32,
    /// Error message
    #[serde(default)]
    pub errmsg: String,
    /// Response data (flattened)
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: std::fmt::Debug> WeChatResponse<T> {
    /// Converts the envelope to a Result, checking for API errors.
    pub fn into_result(self) -> Result<T> {
        if self.errcode == 0 {
            self.data.ok_or_else(|| {
                WeChatError::Internal(anyhow::anyhow!(
                    "Missing response data. errcode: {}, errmsg: {}",
                    self.errcode,
                    self.errmsg
                ))
            })
        } else {
            Err(WeChatError::from_api_response(self.errcode, self.errmsg))
        }
    }
}

impl<T> WeChatResponse<T> {
    /// Checks the envelope for success, discarding any payload.
    pub fn into_ack(self) -> Result<()> {
        if self.errcode == 0 {
            Ok(())
        } else {
            Err(WeChatError::from_api_response(self.errcode, self.errmsg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ComponentAccessToken;

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = ComponentHttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let mut config = Config::default();
        config.http.base_url = String::new();
        assert!(ComponentHttpClient::with_config(config).is_err());
    }

    #[test]
    fn test_envelope_success() {
        let response: WeChatResponse<ComponentAccessToken> = serde_json::from_str(
            r#"{"component_access_token": "COMPONENT_TOKEN", "expires_in": 7200}"#,
        )
        .unwrap();

        let token = response.into_result().unwrap();
        assert_eq!(token.component_access_token, "COMPONENT_TOKEN");
        assert_eq!(token.expires_in, 7200);
    }

    #[test]
    fn test_envelope_error() {
        let response: WeChatResponse<ComponentAccessToken> =
            serde_json::from_str(r#"{"errcode": 42001, "errmsg": "access_token expired"}"#)
                .unwrap();

        let err = response.into_result().unwrap_err();
        assert!(err.is_token_expired());
    }

    #[test]
    fn test_envelope_missing_data() {
        let response: WeChatResponse<ComponentAccessToken> =
            serde_json::from_str(r#"{"errcode": 0, "errmsg": "ok"}"#).unwrap();

        let err = response.into_result().unwrap_err();
        assert!(matches!(err, WeChatError::Internal(_)));
    }

    #[test]
    fn test_envelope_ack() {
        let ok: WeChatResponse<serde_json::Value> =
            serde_json::from_str(r#"{"errcode": 0, "errmsg": "ok"}"#).unwrap();
        assert!(ok.into_ack().is_ok());

        let err: WeChatResponse<serde_json::Value> =
            serde_json::from_str(r#"{"errcode": 61003, "errmsg": "component not authorized"}"#)
                .unwrap();
        assert!(err.into_ack().is_err());
    }
}
