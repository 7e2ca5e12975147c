//! Component authorization endpoints.
//!
//! Wrappers for the `component/*` authorization flow: pre-auth codes,
//! exchanging an authorization code, refreshing authorizer tokens, and
//! reading or writing authorizer options. Every call here routes through
//! [`call_authenticated`](crate::auth::call_authenticated), so the `42001`
//! replay protocol applies uniformly.
//!
//! Authorizer tokens returned by these calls are business payloads the caller
//! owns; the SDK does not cache them.

use crate::client::ComponentClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pre-authorization code used to start the authorization flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreAuthCode {
    pub pre_auth_code: String,
    pub expires_in: u64,
}

/// Authorization granted by an authorizer, exchanged from an authorization
/// code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizationInfo {
    pub authorizer_appid: String,
    #[serde(default)]
    pub authorizer_access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub authorizer_refresh_token: Option<String>,
    /// Granted permission sets, opaque to the SDK
    #[serde(default)]
    pub func_info: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryAuthResponse {
    pub authorization_info: AuthorizationInfo,
}

/// Refreshed authorizer credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizerToken {
    pub authorizer_access_token: String,
    pub expires_in: u64,
    pub authorizer_refresh_token: String,
}

/// Authorizer account profile plus its current authorization.
///
/// The profile is a pass-through business payload (nickname, avatar, account
/// type, ...); it is kept as raw JSON rather than being re-modelled here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizerInfoResponse {
    pub authorizer_info: Value,
    #[serde(default)]
    pub authorization_info: Option<AuthorizationInfo>,
}

/// An authorizer option setting (location reporting, voice recognition,
/// customer service switch, ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizerOption {
    pub authorizer_appid: String,
    pub option_name: String,
    pub option_value: String,
}

#[derive(Serialize)]
struct PreAuthCodeRequest<'a> {
    component_appid: &'a str,
}

#[derive(Serialize)]
struct QueryAuthRequest<'a> {
    component_appid: &'a str,
    authorization_code: &'a str,
}

#[derive(Serialize)]
struct AuthorizerTokenRequest<'a> {
    component_appid: &'a str,
    authorizer_appid: &'a str,
    authorizer_refresh_token: &'a str,
}

#[derive(Serialize)]
struct AuthorizerInfoRequest<'a> {
    component_appid: &'a str,
    authorizer_appid: &'a str,
}

#[derive(Serialize)]
struct GetAuthorizerOptionRequest<'a> {
    component_appid: &'a str,
    authorizer_appid: &'a str,
    option_name: &'a str,
}

#[derive(Serialize)]
struct SetAuthorizerOptionRequest<'a> {
    component_appid: &'a str,
    authorizer_appid: &'a str,
    option_name: &'a str,
    option_value: &'a str,
}

impl ComponentClient {
    /// Fetches a pre-authorization code (`api_create_preauthcode`).
    pub async fn create_pre_auth_code(&self) -> Result<PreAuthCode> {
        let body = PreAuthCodeRequest {
            component_appid: self.component_appid(),
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component(
                        "api_create_preauthcode",
                        &token.component_access_token,
                        &body,
                    )
                    .await
            })
            .await
    }

    /// Exchanges an authorization code for the authorizer's credentials
    /// (`api_query_auth`).
    ///
    /// The authorization code arrives on the redirect URI after the merchant
    /// completes the authorization page.
    pub async fn query_auth(&self, authorization_code: &str) -> Result<QueryAuthResponse> {
        let body = QueryAuthRequest {
            component_appid: self.component_appid(),
            authorization_code,
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component("api_query_auth", &token.component_access_token, &body)
                    .await
            })
            .await
    }

    /// Refreshes an authorizer's access token from its refresh token
    /// (`api_authorizer_token`).
    pub async fn refresh_authorizer_token(
        &self,
        authorizer_appid: &str,
        authorizer_refresh_token: &str,
    ) -> Result<AuthorizerToken> {
        let body = AuthorizerTokenRequest {
            component_appid: self.component_appid(),
            authorizer_appid,
            authorizer_refresh_token,
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component("api_authorizer_token", &token.component_access_token, &body)
                    .await
            })
            .await
    }

    /// Fetches an authorizer's account profile (`api_get_authorizer_info`).
    pub async fn get_authorizer_info(
        &self,
        authorizer_appid: &str,
    ) -> Result<AuthorizerInfoResponse> {
        let body = AuthorizerInfoRequest {
            component_appid: self.component_appid(),
            authorizer_appid,
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component(
                        "api_get_authorizer_info",
                        &token.component_access_token,
                        &body,
                    )
                    .await
            })
            .await
    }

    /// Reads one authorizer option (`api_get_authorizer_option`).
    pub async fn get_authorizer_option(
        &self,
        authorizer_appid: &str,
        option_name: &str,
    ) -> Result<AuthorizerOption> {
        let body = GetAuthorizerOptionRequest {
            component_appid: self.component_appid(),
            authorizer_appid,
            option_name,
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component(
                        "api_get_authorizer_option",
                        &token.component_access_token,
                        &body,
                    )
                    .await
            })
            .await
    }

    /// Writes one authorizer option (`api_set_authorizer_option`).
    pub async fn set_authorizer_option(
        &self,
        authorizer_appid: &str,
        option_name: &str,
        option_value: &str,
    ) -> Result<()> {
        let body = SetAuthorizerOptionRequest {
            component_appid: self.component_appid(),
            authorizer_appid,
            option_name,
            option_value,
        };
        self.tokens()
            .call_authenticated(async |token| {
                self.http()
                    .post_component_ack(
                        "api_set_authorizer_option",
                        &token.component_access_token,
                        &body,
                    )
                    .await
            })
            .await
    }
}
