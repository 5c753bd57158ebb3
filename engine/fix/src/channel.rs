//! Execution-report delivery channel
//!
//! The only mutable structure shared between the session's background
//! thread and the host: a mutex-guarded FIFO plus a single optional
//! callback slot.

use crate::messages::ExecReport;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Callback invoked synchronously when a report is enqueued.
///
/// Runs inside the enqueueing thread's critical section: it must not
/// block and must not re-enter the session.
pub type ExecReportCallback = Box<dyn Fn(&ExecReport) + Send>;

/// Thread-safe execution-report queue with optional push-style fan-out
#[derive(Default)]
pub struct ExecReportChannel {
    queue: Mutex<VecDeque<ExecReport>>,
    callback: Mutex<Option<ExecReportCallback>>,
}

impl ExecReportChannel {
    /// Create an empty channel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a report and invoke the registered callback, if any
    pub fn push(&self, report: ExecReport) {
        let mut queue = self.queue.lock();
        queue.push_back(report.clone());
        // Callback fires while the enqueue is still in flight so push and
        // poll observers see reports in the same order.
        if let Some(cb) = self.callback.lock().as_ref() {
            cb(&report);
        }
    }

    /// Drain all pending reports, oldest first. Never blocks.
    #[must_use]
    pub fn drain(&self) -> Vec<ExecReport> {
        self.queue.lock().drain(..).collect()
    }

    /// Number of undelivered reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Register the callback. Single-slot by design: replacing discards
    /// the previous subscriber.
    pub fn set_callback(&self, callback: ExecReportCallback) {
        *self.callback.lock() = Some(callback);
    }
}

impl std::fmt::Debug for ExecReportChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecReportChannel")
            .field("pending", &self.len())
            .field("has_callback", &self.callback.lock().is_some())
            .finish()
    }
}
