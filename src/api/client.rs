use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::ApiError;

/// HTTP client for the backoffice REST backend.
///
/// Holds the base URL and the bearer token of the active session. The token
/// is attached to every request except authentication and OAuth endpoints,
/// mirroring the security interceptor of the web console.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // Validate early so a broken config fails at startup, not mid-call.
        url::Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Attach the access token used for authorized endpoints
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Auth and OAuth endpoints never receive the session token
    fn is_auth_exempt(path: &str) -> bool {
        path.contains("/auth/") || path.contains("/oauth2/") || path.starts_with("/login")
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);

        if let Some(bearer) = &self.bearer {
            if !Self::is_auth_exempt(path) {
                builder = builder.bearer_auth(bearer);
            }
        }

        builder
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|err| ApiError::Decode(err.to_string()))
        } else {
            // Error bodies are best-effort JSON; anything else is dropped.
            let body = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str(&text).ok());

            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send_json(request).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::PUT, path).json(body))
            .await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::DELETE, path)).await
    }

    /// POST with an explicit bearer, bypassing the auth-path exemption.
    ///
    /// Used by token refresh, which authenticates with the refresh token on
    /// an `/auth/` path.
    pub async fn post_bearer_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.request(Method::POST, url).bearer_auth(bearer);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(ApiClient::new("http://localhost:8080/api").is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_auth_paths_are_exempt_from_bearer() {
        assert!(ApiClient::is_auth_exempt("/auth/login"));
        assert!(ApiClient::is_auth_exempt("/auth/providers"));
        assert!(ApiClient::is_auth_exempt("/login"));
        assert!(ApiClient::is_auth_exempt("/oauth2/authorization/google"));
        assert!(!ApiClient::is_auth_exempt("/customers"));
        assert!(!ApiClient::is_auth_exempt("/customers/7"));
    }
}
