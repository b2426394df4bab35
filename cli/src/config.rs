//! Connection settings and the file-backed session store.

use std::{fs, path::PathBuf, time::Duration};

use edu_admin_shared::{resolve_session, session::ADMIN_ROLE, Session, SessionStore};

/// API root used when neither `--api-base` nor `EDU_ADMIN_API_BASE` is set.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

/// Client-side request deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Where and how to reach the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:3000/api`.
    pub api_base: String,
    /// Session whose token is sent as a bearer header.
    pub session: Option<Session>,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings for `api_base` with no session and the default timeout.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            session: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Pick the session from an explicit token first, then the persisted
    /// session file.
    pub fn with_session(mut self, token: Option<&str>, store: &dyn SessionStore) -> Self {
        let explicit = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Session {
                token: token.to_string(),
                role: ADMIN_ROLE.to_string(),
                user_name: None,
            });
        self.session = resolve_session(explicit.as_ref(), store);
        self
    }

    /// Override the request deadline; anything under a second becomes one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_secs(1));
        self
    }

    /// `{api_base}/admin` without a trailing slash.
    pub fn admin_base(&self) -> String {
        format!("{}/admin", self.api_base.trim().trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Session persisted by the web login flow and exported to a file.
#[derive(Debug, Clone, Default)]
pub struct FileSessionStore {
    path: Option<PathBuf>,
}

impl FileSessionStore {
    /// Store reading `path`; `None` never yields a session.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        match fs::read_to_string(path) {
            Ok(raw) => Some(raw),
            Err(err) => {
                tracing::warn!("failed to read session file {}: {err}", path.display());
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn admin_base_tolerates_trailing_slash() {
        assert_eq!(ClientConfig::new("http://x/api/").admin_base(), "http://x/api/admin");
        assert_eq!(ClientConfig::default().admin_base(), "http://localhost:3000/api/admin");
    }

    #[test]
    fn explicit_token_beats_session_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token":"from-file","role":"admin"}}"#).unwrap();
        let store = FileSessionStore::new(Some(file.path().to_path_buf()));

        let config = ClientConfig::default().with_session(Some("cli"), &store);
        assert_eq!(config.session.map(|session| session.token).as_deref(), Some("cli"));

        let config = ClientConfig::default().with_session(Some(" "), &store);
        assert_eq!(config.session.map(|session| session.token).as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_session_file_means_anonymous() {
        let store = FileSessionStore::new(Some(PathBuf::from("/nonexistent/session.json")));
        assert_eq!(ClientConfig::default().with_session(None, &store).session, None);
        assert_eq!(ClientConfig::default().with_session(None, &FileSessionStore::default()).session, None);
    }
}
