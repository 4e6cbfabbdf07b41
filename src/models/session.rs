use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::{AuthResponse, AuthUser, RefreshResponse};

/// Represents the state of an operator session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SessionState {
    /// Session holds a token that has not reached its expiry
    Active,
    /// Session token is past its expiry and must not be sent
    Expired,
}

/// An authenticated operator session.
///
/// Expiry is computed at persist time from the backend's `expiresIn`
/// lifetime (milliseconds), so a loaded session can be judged without
/// another round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Build a session from a login or register response
    pub fn from_auth(response: &AuthResponse) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            token_type: response.token_type.clone(),
            expires_at: Utc::now() + Duration::milliseconds(response.expires_in),
            user: response.user.clone(),
        }
    }

    /// Build a session from OAuth callback credentials
    pub fn from_oauth(
        access_token: String,
        refresh_token: String,
        expires_in_ms: i64,
        user: AuthUser,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + Duration::milliseconds(expires_in_ms),
            user,
        }
    }

    /// Replace the access token after a refresh round trip
    pub fn apply_refresh(&mut self, response: &RefreshResponse) {
        self.access_token = response.access_token.clone();
        self.token_type = response.token_type.clone();
        self.expires_at = Utc::now() + Duration::milliseconds(response.expires_in);
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        if self.is_expired() {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Time left before expiry, zero when already expired
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> AuthUser {
        AuthUser {
            id: 1,
            username: "11122233344".to_string(),
            email: "admin@pulse.com".to_string(),
            full_name: "Admin Pulse".to_string(),
            role: "ADMIN".to_string(),
            cpf: Some("111.222.333-44".to_string()),
        }
    }

    #[test]
    fn test_session_from_auth_is_active() {
        let response = AuthResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3_600_000,
            user: sample_user(),
        };

        let session = Session::from_auth(&response);
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.remaining() > Duration::minutes(59));
    }

    #[test]
    fn test_expired_session() {
        let mut session = Session::from_oauth(
            "access".to_string(),
            "refresh".to_string(),
            1_000,
            sample_user(),
        );
        session.expires_at = Utc::now() - Duration::seconds(1);

        assert!(session.is_expired());
        assert_eq!(session.state(), SessionState::Expired);
        assert_eq!(session.remaining(), Duration::zero());
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let mut session = Session::from_oauth(
            "old-access".to_string(),
            "refresh".to_string(),
            1_000,
            sample_user(),
        );
        session.expires_at = Utc::now() - Duration::seconds(1);

        session.apply_refresh(&RefreshResponse {
            access_token: "new-access".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3_600_000,
        });

        assert_eq!(session.access_token, "new-access");
        assert_eq!(session.refresh_token, "refresh");
        assert_eq!(session.state(), SessionState::Active);
    }
}
