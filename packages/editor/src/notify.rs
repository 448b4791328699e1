//! Notification collaborator
//!
//! Transient feedback goes out fire-and-forget; nothing flows back into
//! the editing core.

use crate::errors::ErrorKind;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
    pub kind: Option<ErrorKind>,
}

impl Notice {
    pub fn info(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            duration,
            kind: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            duration,
            kind: Some(kind),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Forwards notices to the tracing subscriber
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            Some(ErrorKind::External) => {
                warn!(duration_ms = notice.duration.as_millis() as u64, "{}", notice.message)
            }
            _ => info!(duration_ms = notice.duration.as_millis() as u64, "{}", notice.message),
        }
    }
}

/// Keeps every notice, for tests and headless front ends
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.message.as_str()).collect()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }
}
