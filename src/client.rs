//! Core client for the WeChat Open Platform component API.
//!
//! [`ComponentClient`] holds the component identity, the HTTP client, and the
//! token manager. Endpoint groups live in their own modules (see
//! [`service`](crate::service)) and delegate to this client rather than being
//! merged into it, so name collisions are a compile-time concern.

use crate::auth::{ComponentCredentials, TokenManager};
use crate::config::Config;
use crate::error::Result;
use crate::http::ComponentHttpClient;
use crate::store::{MemoryTokenStore, TokenStore};
use std::sync::Arc;

/// Client for a single third-party component identity.
///
/// ## Example
///
/// ```rust,no_run
/// use wechat_open_rs::{ComponentClient, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = ComponentClient::new("component_appid", "component_appsecret", "ticket")?;
///     let pre_auth = client.create_pre_auth_code().await?;
///     let url = client.component_login_url(&pre_auth.pre_auth_code, "https://example.com/cb");
///     println!("redirect the merchant to {url}");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ComponentClient {
    http: Arc<ComponentHttpClient>,
    tokens: TokenManager,
}

impl ComponentClient {
    /// Creates a client with the default configuration and the in-memory
    /// token store (single-process only).
    pub fn new(
        component_appid: impl Into<String>,
        component_appsecret: impl Into<String>,
        component_verify_ticket: impl Into<String>,
    ) -> Result<Self> {
        Self::with_store(
            component_appid,
            component_appsecret,
            component_verify_ticket,
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// Creates a client backed by a caller-supplied token store, so the token
    /// can be shared across processes.
    pub fn with_store(
        component_appid: impl Into<String>,
        component_appsecret: impl Into<String>,
        component_verify_ticket: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        Self::with_config(
            component_appid,
            component_appsecret,
            component_verify_ticket,
            store,
            Config::default(),
        )
    }

    /// Creates a client with full control over store and configuration.
    pub fn with_config(
        component_appid: impl Into<String>,
        component_appsecret: impl Into<String>,
        component_verify_ticket: impl Into<String>,
        store: Arc<dyn TokenStore>,
        config: Config,
    ) -> Result<Self> {
        let credentials = ComponentCredentials::new(
            component_appid,
            component_appsecret,
            component_verify_ticket,
        );
        let http = Arc::new(ComponentHttpClient::with_config(config)?);
        let tokens = TokenManager::new(credentials, Arc::clone(&http), store);

        Ok(Self { http, tokens })
    }

    /// The component appid this client authenticates as.
    pub fn component_appid(&self) -> &str {
        &self.tokens.credentials().component_appid
    }

    /// The token manager, for callers that want to drive acquisition
    /// directly (e.g. warming the store at startup).
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub(crate) fn http(&self) -> &ComponentHttpClient {
        &self.http
    }

    /// Builds the authorization page URL a merchant is redirected to.
    ///
    /// Pure string construction, no network call. The upstream redirect flow
    /// expects the parameters concatenated verbatim, so no percent-encoding
    /// is applied.
    pub fn component_login_url(&self, pre_auth_code: &str, redirect_uri: &str) -> String {
        format!(
            "https://mp.weixin.qq.com/cgi-bin/componentloginpage?component_appid={}&pre_auth_code={}&redirect_uri={}",
            self.component_appid(),
            pre_auth_code,
            redirect_uri
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ComponentClient {
        ComponentClient::with_store(
            "wx_component_id",
            "wx_component_secret",
            "ticket@@@abc",
            Arc::new(MemoryTokenStore::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_component_login_url() {
        let client = test_client();
        let url = client.component_login_url("PREAUTH123", "https://example.com/cb");

        assert_eq!(
            url,
            "https://mp.weixin.qq.com/cgi-bin/componentloginpage?component_appid=wx_component_id&pre_auth_code=PREAUTH123&redirect_uri=https://example.com/cb"
        );
    }

    #[test]
    fn test_login_url_does_not_encode() {
        // The redirect flow expects verbatim concatenation; an encoded URI
        // would break the downstream match.
        let client = test_client();
        let url = client.component_login_url("CODE", "https://example.com/cb?tenant=1");
        assert!(url.ends_with("&redirect_uri=https://example.com/cb?tenant=1"));
    }

    #[test]
    fn test_client_exposes_identity() {
        let client = test_client();
        assert_eq!(client.component_appid(), "wx_component_id");
    }
}
