//! Operator-facing notifications ("toasts").

use parking_lot::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Sink for transient success/failure messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(notice = %notice.message, "Success"),
            NoticeLevel::Error => warn!(notice = %notice.message, "Failure"),
        }
    }
}

/// Keeps every notice in memory, for headless callers and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
