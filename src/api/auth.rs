use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    AuthProviders, AuthResponse, AuthUser, LoginRequest, RefreshResponse, RegisterRequest, Session,
};

/// Client for the authentication endpoints
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Password login with CPF as the username
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post_json("/auth/login", credentials).await
    }

    /// Operator self-registration; logs the new operator in
    pub async fn register(&self, payload: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post_json("/auth/register", payload).await
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        self.client
            .post_bearer_json("/auth/refresh", refresh_token)
            .await
    }

    /// Discover which external sign-in providers the backend offers
    pub async fn providers(&self) -> Result<AuthProviders, ApiError> {
        self.client.get_json("/auth/providers", &[]).await
    }
}

/// Build the provider authorize URL, overriding `redirect_uri`.
///
/// Replaces any existing `redirect_uri` query parameter. When the target
/// does not parse as a URL, falls back to naive `?`/`&` concatenation so a
/// half-broken discovery document still produces something usable.
pub fn build_authorize_url(target: &str, redirect_uri: Option<&str>) -> String {
    let Some(redirect) = redirect_uri.map(str::trim).filter(|r| !r.is_empty()) else {
        return target.to_string();
    };

    match Url::parse(target) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| key != "redirect_uri")
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();

            {
                let mut pairs = url.query_pairs_mut();
                pairs.clear();
                pairs.extend_pairs(kept);
                pairs.append_pair("redirect_uri", redirect);
            }

            url.to_string()
        }
        Err(_) => {
            let separator = if target.contains('?') { '&' } else { '?' };
            format!(
                "{target}{separator}redirect_uri={}",
                urlencoding::encode(redirect)
            )
        }
    }
}

/// Problems completing an OAuth sign-in from a callback URL
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum OAuthCallbackError {
    #[error("callback URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("callback is missing the '{0}' parameter")]
    MissingParam(&'static str),

    #[error("callback 'expiresIn' is not a number")]
    InvalidExpiry,

    #[error("callback user payload could not be decoded: {0}")]
    InvalidUserPayload(String),
}

/// Turn the provider's callback redirect into a session.
///
/// The backend appends `accessToken`, `refreshToken`, `expiresIn`, and a
/// base64url-encoded `user` JSON document to the callback URL.
pub fn parse_oauth_callback(callback_url: &str) -> Result<Session, OAuthCallbackError> {
    let url =
        Url::parse(callback_url).map_err(|err| OAuthCallbackError::InvalidUrl(err.to_string()))?;

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let param = |name: &'static str| {
        params
            .get(name)
            .filter(|value| !value.is_empty())
            .ok_or(OAuthCallbackError::MissingParam(name))
    };

    let access_token = param("accessToken")?;
    let refresh_token = param("refreshToken")?;
    let expires_raw = param("expiresIn")?;
    let user_payload = param("user")?;

    let expires_in: i64 = expires_raw
        .parse()
        .map_err(|_| OAuthCallbackError::InvalidExpiry)?;

    let decoded = decode_base64url(user_payload)
        .map_err(|err| OAuthCallbackError::InvalidUserPayload(err.to_string()))?;
    let user: AuthUser = serde_json::from_slice(&decoded)
        .map_err(|err| OAuthCallbackError::InvalidUserPayload(err.to_string()))?;

    Ok(Session::from_oauth(
        access_token.clone(),
        refresh_token.clone(),
        expires_in,
        user,
    ))
}

/// Decode base64url regardless of whether padding was kept
fn decode_base64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value.trim_end_matches('='))
}
