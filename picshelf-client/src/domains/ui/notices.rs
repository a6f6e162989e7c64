//! Transient user-facing notices (snackbar/toast messages).

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const INFO_NOTICE_DURATION: Duration = Duration::from_secs(3);
pub const ERROR_NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Undrained notices kept before the oldest are dropped.
pub const MAX_PENDING_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub duration: Duration,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
            duration: INFO_NOTICE_DURATION,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            duration: ERROR_NOTICE_DURATION,
        }
    }
}

/// Shared queue of pending notices. Cloning shares the queue.
///
/// Workflows push, the front end drains and shows each for its duration.
/// Front ends that never drain only ever see the latest
/// [`MAX_PENDING_NOTICES`].
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Notice>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: Notice) {
        log::debug!("[Notice] {:?}: {}", notice.level, notice.text);
        let mut queue = self.queue.lock();
        if queue.len() >= MAX_PENDING_NOTICES {
            queue.pop_front();
        }
        queue.push_back(notice);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(Notice::info(text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(Notice::error(text));
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.queue.lock().drain(..).collect()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.queue.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
