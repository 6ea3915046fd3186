//! Status line messages
//!
//! The viewer has room for one message below the page. A message stays until
//! its lifetime runs out; while it is shown, a less severe message does not
//! replace it, so a failed history write is not hidden by "History is empty".

use std::time::{Duration, Instant};

use log::debug;

use crate::error::BrowseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn lifetime(self) -> Duration {
        match self {
            Severity::Info => Duration::from_secs(3),
            Severity::Warning => Duration::from_secs(5),
            Severity::Error => Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    shown_until: Instant,
}

#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<StatusMessage>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, text: impl Into<String>, severity: Severity) {
        self.post_at(text.into(), severity, Instant::now());
    }

    fn post_at(&mut self, text: String, severity: Severity, now: Instant) {
        if let Some(shown) = &self.current {
            if shown.shown_until > now && shown.severity > severity {
                debug!("Status line keeps {:?} message, dropping: {text}", shown.severity);
                return;
            }
        }
        self.current = Some(StatusMessage {
            text,
            severity,
            shown_until: now + severity.lifetime(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.post(text, Severity::Info);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.post(text, Severity::Warning);
    }

    /// Show a recoverable error; history write failures are errors, the rest warnings
    pub fn report(&mut self, err: &BrowseError) {
        let severity = match err {
            BrowseError::HistoryIo { .. } => Severity::Error,
            _ => Severity::Warning,
        };
        self.post(err.to_string(), severity);
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    /// Clear a message whose time is up, returns true when the line changed
    pub fn expire(&mut self) -> bool {
        self.expire_at(Instant::now())
    }

    fn expire_at(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|m| m.shown_until <= now) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
