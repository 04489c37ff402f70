//! Background cleanup of expired upload tokens and stale files

use crate::uploads::{FileStore, UploadTickets};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Sweeper {
    tickets: Arc<UploadTickets>,
    files: FileStore,
    retention: Duration,
}

/// What one pass removed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub tokens: usize,
    pub files: usize,
}

impl Sweeper {
    pub fn new(tickets: Arc<UploadTickets>, files: FileStore, retention: Duration) -> Self {
        Self {
            tickets,
            files,
            retention,
        }
    }

    /// Run one pass. Failures are logged and the pass carries on.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        match self.tickets.expire().await {
            Ok(n) => report.tokens = n,
            Err(e) => tracing::error!(error = %e, "Failed to expire upload tokens"),
        }
        match self.files.remove_older_than(self.retention).await {
            Ok(n) => report.files = n,
            Err(e) => tracing::error!(
                dir = %self.files.dir().display(),
                error = %e,
                "Failed to remove stale files"
            ),
        }

        if report != SweepReport::default() {
            tracing::info!(tokens = report.tokens, files = report.files, "Sweep removed entries");
        }
        report
    }

    /// Sweep every `interval` until the runtime shuts down
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
