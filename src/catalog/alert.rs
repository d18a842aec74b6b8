use std::time::Duration;
use tokio::time::Instant;

/// How long an alert stays up.
pub const ALERT_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AlertToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    pub token: AlertToken,
    pub expires_at: Instant,
}

/// Holds at most one alert. Each new alert gets a fresh token and only a
/// clear carrying that token removes it.
#[derive(Debug, Default)]
pub struct AlertSlot {
    current: Option<Alert>,
    last_token: u64,
}

impl AlertSlot {
    pub fn show(&mut self, severity: Severity, message: &str) -> AlertToken {
        self.show_at(severity, message, Instant::now())
    }

    pub fn show_at(&mut self, severity: Severity, message: &str, now: Instant) -> AlertToken {
        self.last_token += 1;
        let token = AlertToken(self.last_token);
        self.current = Some(Alert {
            severity,
            message: message.to_string(),
            token,
            expires_at: now + ALERT_TTL,
        });
        token
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    /// Returns whether anything was cleared.
    pub fn clear(&mut self, token: AlertToken) -> bool {
        match &self.current {
            Some(alert) if alert.token == token => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
