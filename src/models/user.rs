use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Credentials for password login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}

/// Payload for operator self-registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub cpf: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Authenticated operator identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub cpf: Option<String>,
}

/// Token envelope returned by login and register
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in milliseconds
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Envelope returned by the token refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Discovery data for one external sign-in provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProviderInfo {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,

    /// Providers may attach extra keys the console does not interpret
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Response of the provider discovery endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthProviders {
    #[serde(default)]
    pub providers: HashMap<String, AuthProviderInfo>,
}

impl AuthProviders {
    /// Google provider entry, if the backend announces one
    pub fn google(&self) -> Option<&AuthProviderInfo> {
        self.providers.get("google")
    }

    /// Whether Google sign-in is enabled and usable
    pub fn google_enabled(&self) -> bool {
        self.google().map(|p| p.enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_wire_shape() {
        let body = r#"{
            "accessToken": "header.payload.sig",
            "refreshToken": "refresh.payload.sig",
            "tokenType": "Bearer",
            "expiresIn": 3600000,
            "user": {
                "id": 1,
                "username": "11122233344",
                "email": "admin@pulse.com",
                "fullName": "Admin Pulse",
                "role": "ADMIN",
                "cpf": null
            }
        }"#;

        let response: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3_600_000);
        assert_eq!(response.user.role, "ADMIN");
        assert!(response.user.cpf.is_none());
    }

    #[test]
    fn test_providers_discovery() {
        let body = r#"{
            "providers": {
                "google": {
                    "enabled": true,
                    "authorizationUrl": "http://localhost:8080/oauth2/authorization/google",
                    "redirectUri": "http://localhost:4200/oauth/callback",
                    "scopes": ["openid", "email", "profile"],
                    "postLoginRedirect": "/customers"
                }
            }
        }"#;

        let providers: AuthProviders = serde_json::from_str(body).unwrap();
        assert!(providers.google_enabled());
        let google = providers.google().unwrap();
        assert_eq!(
            google.authorization_url.as_deref(),
            Some("http://localhost:8080/oauth2/authorization/google")
        );
        // Unknown keys survive in the flattened map.
        assert!(google.extra.contains_key("postLoginRedirect"));
    }

    #[test]
    fn test_providers_absent_provider() {
        let providers: AuthProviders = serde_json::from_str(r#"{"providers": {}}"#).unwrap();
        assert!(!providers.google_enabled());
        assert!(providers.google().is_none());
    }
}
