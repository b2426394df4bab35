//! Single-slot toast channel with auto-hide generations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time a toast stays on screen.
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(6000);

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A write was confirmed.
    Success,
    /// A request failed.
    Error,
    /// Something partially worked.
    Warning,
    /// Neutral information, e.g. a delete that deactivated instead.
    Info,
}

impl Severity {
    /// Lowercase name, used as a CSS modifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// One toast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Text shown to the user.
    pub message: String,
    /// Styling and urgency.
    pub severity: Severity,
}

/// Identifies the notification an auto-hide timer was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideToken(u64);

/// Single-slot toast channel.
///
/// `Hidden -> Visible` on [`notify`](Self::notify), `Visible -> Hidden` on
/// [`dismiss`](Self::dismiss) or when the timer for the *current* message
/// fires. A new message replaces the visible one and restarts its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    current: Option<Notification>,
    generation: u64,
    auto_hide: Duration,
}

impl NotificationChannel {
    /// Empty channel hiding messages after `auto_hide`.
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            auto_hide,
        }
    }

    /// Show `message`, replacing anything visible. The returned token must be
    /// passed to [`expire`](Self::expire) once [`auto_hide`](Self::auto_hide)
    /// has elapsed.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> HideToken {
        self.generation += 1;
        self.current = Some(Notification {
            message: message.into(),
            severity,
        });
        HideToken(self.generation)
    }

    /// Hide the visible message, if any.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Timer callback. Hides the message only if `token` belongs to it;
    /// returns `true` when something was hidden.
    pub fn expire(&mut self, token: HideToken) -> bool {
        if token.0 == self.generation && self.current.is_some() {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// The visible message.
    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Token of the visible message, for scheduling its timer.
    pub fn current_token(&self) -> Option<HideToken> {
        self.current.as_ref().map(|_| HideToken(self.generation))
    }

    /// Whether a message is showing.
    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    /// How long a message stays before its timer fires.
    pub fn auto_hide(&self) -> Duration {
        self.auto_hide
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}
