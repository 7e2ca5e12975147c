//! Error types and handling for the WeChat Open Platform SDK.
//!
//! Every fallible operation in this crate returns [`Result`]; errors are
//! surfaced through the same channel as successful results, never panicked
//! across an async boundary.
//!
//! ## Error Categories
//!
//! - **Network Errors**: Connection failures, timeouts (not retried by the core)
//! - **WeChat API Errors**: Non-zero `errcode` envelopes; code `42001` is the
//!   sole trigger for the automatic single retry in the token manager
//! - **Store Errors**: Failures of the caller-supplied token store, passed
//!   through unmodified
//! - **Configuration Errors**: Invalid construction-time settings

/// Result type alias for WeChat Open Platform SDK operations.
pub type Result<T> = std::result::Result<T, WeChatError>;

/// WeChat API error code signalling an expired access token.
///
/// This is the only error code the token manager recovers from automatically:
/// it forces a fresh token acquisition and replays the call exactly once.
pub const ERR_ACCESS_TOKEN_EXPIRED: i32 = 42001;

/// Error type for WeChat Open Platform SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum WeChatError {
    /// Network-related errors
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// WeChat API errors (non-zero `errcode` in the response envelope)
    #[error("WeChat API error [{code}]: {message}")]
    WeChatApi { code: i32, message: String },

    /// Failure of the caller-supplied token store
    #[error("Token store operation failed: {0}")]
    Store(#[source] anyhow::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors for wrapping other error types
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WeChatError {
    /// Creates a WeChat API error from response envelope data.
    pub fn from_api_response(code: i32, message: impl Into<String>) -> Self {
        WeChatError::WeChatApi {
            code,
            message: message.into(),
        }
    }

    /// Creates a token store error from any underlying failure.
    pub fn store_error(source: impl Into<anyhow::Error>) -> Self {
        WeChatError::Store(source.into())
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        WeChatError::Config {
            message: message.into(),
        }
    }

    /// Whether this error is the `42001` "access token expired" signal that
    /// the token manager recovers from with a forced re-acquisition.
    pub fn is_token_expired(&self) -> bool {
        matches!(
            self,
            WeChatError::WeChatApi {
                code: ERR_ACCESS_TOKEN_EXPIRED,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expired_detection() {
        let expired = WeChatError::from_api_response(42001, "access_token expired");
        assert!(expired.is_token_expired());

        let invalid_credential = WeChatError::from_api_response(40001, "invalid credential");
        assert!(!invalid_credential.is_token_expired());

        let timeout = WeChatError::Timeout;
        assert!(!timeout.is_token_expired());
    }

    #[test]
    fn test_error_creation_helpers() {
        let api_err = WeChatError::from_api_response(40013, "invalid appid");
        match api_err {
            WeChatError::WeChatApi { code, message } => {
                assert_eq!(code, 40013);
                assert_eq!(message, "invalid appid");
            }
            _ => panic!("Expected WeChatApi error"),
        }

        let config_err = WeChatError::config_error("base_url cannot be empty");
        match config_err {
            WeChatError::Config { message } => {
                assert_eq!(message, "base_url cannot be empty");
            }
            _ => panic!("Expected Config error"),
        }

        let store_err = WeChatError::store_error(std::io::Error::other("disk full"));
        assert!(matches!(store_err, WeChatError::Store(_)));
    }

    #[test]
    fn test_error_display() {
        let err = WeChatError::from_api_response(42001, "access_token expired");
        assert_eq!(
            err.to_string(),
            "WeChat API error [42001]: access_token expired"
        );
    }
}
