//! Admin session resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::RawRecord;

/// Key under which the login flow persists the session.
pub const SESSION_STORAGE_KEY: &str = "eduAdminSession";

/// Role that unlocks the admin pages.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated session handed over by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with every admin request.
    pub token: String,
    /// Role claimed by the login flow.
    pub role: String,
    /// Name for the header, when the login flow stored one.
    #[serde(default)]
    pub user_name: Option<String>,
}

impl Session {
    /// Whether the role unlocks the admin pages.
    pub fn is_admin(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn is_usable(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Parse a persisted session, tolerating the key casings the login flow
    /// has used over time.
    pub fn from_persisted(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let record = RawRecord::new(&value).ok()?;
        let session = Self {
            token: record.text(&["token", "accessToken", "jwt"])?,
            role: record.text_or_default(&["role", "userRole"]),
            user_name: record
                .text(&["userName", "username", "name"])
                .filter(|value| !value.is_empty()),
        };
        session.is_usable().then_some(session)
    }
}

/// Persisted-session provider (browser storage, config file, env).
pub trait SessionStore {
    /// Raw persisted session, if any.
    fn load(&self) -> Option<String>;
}

impl SessionStore for Option<String> {
    fn load(&self) -> Option<String> {
        self.clone()
    }
}

/// Resolve the active session: the live context wins, the persisted store is
/// the fallback, otherwise there is no session.
pub fn resolve_session(context: Option<&Session>, store: &dyn SessionStore) -> Option<Session> {
    if let Some(session) = context.filter(|session| session.is_usable()) {
        return Some(session.clone());
    }
    let raw = store.load()?;
    let session = Session::from_persisted(&raw);
    if session.is_none() {
        tracing::debug!("ignoring unreadable persisted session");
    }
    session
}
