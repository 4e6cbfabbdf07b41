use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::models::Session;
use crate::telemetry::EventLog;

const SESSION_FILE: &str = "session.json";

/// Persistent session store.
///
/// Mirrors the web console's local-storage semantics: a load that finds a
/// corrupt file behaves as logged-out, and a load that finds an expired
/// session clears it. Both outcomes are recorded in the event log rather
/// than surfaced as errors.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store location under the per-user config directory
    pub fn default_path() -> Result<PathBuf> {
        Ok(AppConfig::config_dir()?.join(SESSION_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the active session, if one is stored and still valid
    pub fn load(&self, log: &EventLog) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                log.warn(
                    "SessionStore",
                    "load",
                    &format!("session file unreadable: {err}"),
                    None,
                );
                return None;
            }
        };

        let session: Session = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(err) => {
                log.warn(
                    "SessionStore",
                    "load",
                    &format!("session file corrupt, treating as logged out: {err}"),
                    None,
                );
                return None;
            }
        };

        if session.is_expired() {
            log.info(
                "SessionStore",
                "load",
                "stored session expired, clearing",
                None,
            );
            let _ = self.clear();
            return None;
        }

        Some(session)
    }

    /// Persist the session, creating the parent directory as needed
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(session).context("failed to serialize session")?;

        fs::write(&self.path, content)
            .with_context(|| format!("failed to write session file: {}", self.path.display()))
    }

    /// Remove the stored session; absent file is not an error
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("failed to remove session file: {}", self.path.display())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthResponse, AuthUser};
    use chrono::{Duration, Utc};

    fn sample_session(expires_in_ms: i64) -> Session {
        Session::from_auth(&AuthResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: expires_in_ms,
            user: AuthUser {
                id: 1,
                username: "11122233344".to_string(),
                email: "admin@pulse.com".to_string(),
                full_name: "Admin Pulse".to_string(),
                role: "ADMIN".to_string(),
                cpf: None,
            },
        })
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let log = EventLog::new();

        assert!(store.load(&log).is_none());

        store.save(&sample_session(3_600_000)).unwrap();
        let loaded = store.load(&log).expect("session should load");
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.user.full_name, "Admin Pulse");
    }

    #[test]
    fn test_corrupt_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        let log = EventLog::new();
        assert!(store.load(&log).is_none());

        let warnings = log.at_or_above(crate::telemetry::LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("corrupt"));
    }

    #[test]
    fn test_expired_session_cleared_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut session = sample_session(1_000);
        session.expires_at = Utc::now() - Duration::seconds(5);
        store.save(&session).unwrap();

        let log = EventLog::new();
        assert!(store.load(&log).is_none());
        // The expired file is gone; the next load is a clean miss.
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.clear().is_ok());
        store.save(&sample_session(1_000)).unwrap();
        assert!(store.clear().is_ok());
        assert!(store.clear().is_ok());
    }
}
