//! Token lifecycle management for the WeChat Open Platform.
//!
//! The component access token is a short-lived bearer credential minted from
//! the component identity (appid, appsecret, verify ticket). This module owns
//! the acquisition/caching/retry protocol:
//!
//! - [`TokenManager::resolve_token`] trusts whatever the store yields; no
//!   local expiry tracking. The server signals expiry through errcode `42001`.
//! - [`call_authenticated`] replays a call exactly once after a forced
//!   re-acquisition when that signal arrives. At most two HTTP calls and one
//!   re-acquisition per invocation.
//! - Concurrent acquisitions on one manager are serialized by a mutex with a
//!   double-checked store read, so racing resolvers share one fetch.

use crate::error::Result;
use crate::http::ComponentHttpClient;
use crate::store::TokenStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Short-lived component access token as issued by WeChat.
///
/// The `expires_in` window is recorded for callers (a persistent store may
/// want it for its own TTL), but the core never compares it against a clock:
/// validity is established solely by the server accepting or rejecting the
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAccessToken {
    /// The bearer token string
    pub component_access_token: String,
    /// Validity window in seconds, as reported by the server
    pub expires_in: u64,
}

/// Immutable component identity, set at construction.
#[derive(Clone)]
pub struct ComponentCredentials {
    /// AppID issued by the open platform
    pub component_appid: String,
    /// AppSecret paired with the AppID
    pub component_appsecret: String,
    /// Rotating ticket pushed by WeChat every ~10 minutes; refresh is the
    /// caller's responsibility
    pub component_verify_ticket: String,
}

impl ComponentCredentials {
    pub fn new(
        component_appid: impl Into<String>,
        component_appsecret: impl Into<String>,
        component_verify_ticket: impl Into<String>,
    ) -> Self {
        Self {
            component_appid: component_appid.into(),
            component_appsecret: component_appsecret.into(),
            component_verify_ticket: component_verify_ticket.into(),
        }
    }
}

// Secrets stay out of debug output.
impl fmt::Debug for ComponentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCredentials")
            .field("component_appid", &self.component_appid)
            .field("component_appsecret", &mask(&self.component_appsecret))
            .field("component_verify_ticket", &mask(&self.component_verify_ticket))
            .finish()
    }
}

fn mask(value: &str) -> String {
    if value.len() <= 4 {
        format!("{value}***")
    } else {
        format!("{}***{}", &value[..2], &value[value.len() - 2..])
    }
}

#[derive(Serialize)]
struct ComponentTokenRequest<'a> {
    component_appid: &'a str,
    component_appsecret: &'a str,
    component_verify_ticket: &'a str,
}

/// Capability to produce a usable component access token.
///
/// The seam between the retry protocol and the concrete token machinery, so
/// [`call_authenticated`] can be exercised without a network.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Yields a token to attempt a call with, acquiring one only if none is
    /// cached.
    async fn token(&self) -> Result<ComponentAccessToken>;

    /// Forces a fresh acquisition, bypassing any cached value.
    async fn refresh_token(&self) -> Result<ComponentAccessToken>;
}

/// Owns component token acquisition and caching.
pub struct TokenManager {
    credentials: ComponentCredentials,
    http: Arc<ComponentHttpClient>,
    store: Arc<dyn TokenStore>,
    acquire_lock: Mutex<()>,
}

impl TokenManager {
    /// Creates a new token manager over the given store.
    pub fn new(
        credentials: ComponentCredentials,
        http: Arc<ComponentHttpClient>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            credentials,
            http,
            store,
            acquire_lock: Mutex::new(()),
        }
    }

    /// Acquires a fresh token from WeChat and saves it to the store,
    /// replacing whatever was there.
    ///
    /// No retry at this layer: transport failures and non-success envelopes
    /// propagate to the caller.
    pub async fn acquire_token(&self) -> Result<ComponentAccessToken> {
        let _guard = self.acquire_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Resolves a token to attempt a call with.
    ///
    /// A stored token is returned as-is, with no expiry check; if the store
    /// is empty, a fresh token is acquired. Concurrent resolvers that race on
    /// an empty store share a single acquisition.
    pub async fn resolve_token(&self) -> Result<ComponentAccessToken> {
        if let Some(token) = self.store.load().await? {
            return Ok(token);
        }

        let _guard = self.acquire_lock.lock().await;

        // Double-check after acquiring the lock
        if let Some(token) = self.store.load().await? {
            return Ok(token);
        }

        self.fetch_and_store().await
    }

    async fn fetch_and_store(&self) -> Result<ComponentAccessToken> {
        debug!(
            "acquiring component access token for {}",
            self.credentials.component_appid
        );

        let body = ComponentTokenRequest {
            component_appid: &self.credentials.component_appid,
            component_appsecret: &self.credentials.component_appsecret,
            component_verify_ticket: &self.credentials.component_verify_ticket,
        };
        let token: ComponentAccessToken = self
            .http
            .post_json("component/api_component_token", &body)
            .await?;

        self.store.save(&token).await?;
        info!(
            "acquired component access token, expires_in={}s",
            token.expires_in
        );
        Ok(token)
    }

    /// The component identity this manager authenticates as.
    pub fn credentials(&self) -> &ComponentCredentials {
        &self.credentials
    }

    /// Performs an authenticated call with the single-replay protocol; see
    /// [`call_authenticated`].
    pub async fn call_authenticated<F, T>(&self, call: F) -> Result<T>
    where
        F: AsyncFnMut(&ComponentAccessToken) -> Result<T>,
    {
        call_authenticated(self, call).await
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn token(&self) -> Result<ComponentAccessToken> {
        self.resolve_token().await
    }

    async fn refresh_token(&self) -> Result<ComponentAccessToken> {
        self.acquire_token().await
    }
}

/// Performs an authenticated call, transparently recovering once from a
/// server-signalled token expiry.
///
/// First attempt uses the provider's resolved token. If the call fails with
/// errcode `42001`, a fresh token is forced (bypassing the cache) and the call
/// runs exactly once more; that second outcome is returned as-is, even if it
/// is another `42001`. Any other error surfaces immediately. The second
/// attempt is strictly ordered after the forced acquisition completes.
pub async fn call_authenticated<P, F, T>(provider: &P, mut call: F) -> Result<T>
where
    P: TokenProvider + ?Sized,
    F: AsyncFnMut(&ComponentAccessToken) -> Result<T>,
{
    let token = provider.token().await?;
    match call(&token).await {
        Err(err) if err.is_token_expired() => {
            debug!("access token rejected with 42001, re-acquiring and replaying once");
            let fresh = provider.refresh_token().await?;
            call(&fresh).await
        }
        outcome => outcome,
    }
}
