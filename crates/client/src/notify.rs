use std::sync::Mutex;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

/// A short transient user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// The external notification surface. Fire and forget; no return value is
/// consulted.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices into the log. The default surface when nothing richer is
/// wired up.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!("{}: {}", notice.title, notice.description),
            Severity::Destructive => error!("{}: {}", notice.title, notice.description),
        }
    }
}

/// Collects notices for later inspection. Used by the test suites.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut self.notices.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
