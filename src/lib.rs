//! # WeChat Open Platform Rust SDK
//!
//! Client SDK for the WeChat Open Platform ("third-party component") API,
//! centered on the component access token lifecycle: acquisition, caching
//! through a pluggable store, and the transparent single retry on the
//! server's `42001` token-expiry signal.
//!
//! ## Features
//!
//! - **Token lifecycle**: fetch-or-reuse with a forced re-acquisition and
//!   exactly one replay when WeChat reports the token expired
//! - **Pluggable persistence**: share the token across processes via a
//!   caller-supplied [`TokenStore`]; in-memory default for single-process use
//! - **Typed endpoints**: the component authorization flow
//!   (pre-auth codes, `query_auth`, authorizer token refresh, options)
//! - **Async throughout**: `reqwest` + `tokio`, no blocking calls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wechat_open_rs::{ComponentClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ComponentClient::new("appid", "appsecret", "verify_ticket")?;
//!     let pre_auth = client.create_pre_auth_code().await?;
//!     let url = client.component_login_url(&pre_auth.pre_auth_code, "https://example.com/cb");
//!     println!("authorize at: {url}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use auth::{ComponentAccessToken, ComponentCredentials, TokenManager, TokenProvider};
pub use client::ComponentClient;
pub use config::{Config, HttpConfig, RequestOptions};
pub use error::{Result, WeChatError};
pub use store::{MemoryTokenStore, TokenStore};
