//! Inventory polling driver
//!
//! Repeats single-shot scans at a fixed cadence. Cancellation is checked
//! between scans only; a scan in flight always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use obidrfid_core::Outcome;
use obidrfid_types::InventoryResult;

use crate::config::PollOptions;
use crate::error::Result;
use crate::reader::Reader;

/// Cooperative cancellation flag shared between a loop and its controller
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Wait until [`cancel`](Self::cancel) is called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Counters collected by [`poll_inventory`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Scans issued
    pub scans: u64,

    /// Transponder records seen across all successful scans
    pub records: u64,

    /// Scans answered with a reader status
    pub statuses: u64,

    /// Scans answered with an error code
    pub errors: u64,

    /// Scans whose reply could not be decoded
    pub decode_failures: u64,
}

impl PollSummary {
    fn record(&mut self, outcome: &Outcome<InventoryResult>) {
        match outcome {
            Outcome::Success(inventory) => self.records += inventory.len() as u64,
            Outcome::Status { .. } => self.statuses += 1,
            Outcome::Error { .. } => self.errors += 1,
        }
    }
}

/// Scan repeatedly, handing every outcome to `on_scan`
///
/// Stops when `cancel` fires, after `options.max_iterations` scans, or on an
/// error that requires reconnecting. Status and Error outcomes never stop
/// the loop; an empty inventory is the normal idle state.
pub async fn poll_inventory<F>(
    reader: &mut Reader,
    options: &PollOptions,
    cancel: &CancelToken,
    mut on_scan: F,
) -> Result<PollSummary>
where
    F: FnMut(&Outcome<InventoryResult>),
{
    let mut summary = PollSummary::default();
    let limit_reached =
        |summary: &PollSummary| options.max_iterations.is_some_and(|max| summary.scans >= max);

    debug!("Polling every {:?} (limit: {:?})", options.interval, options.max_iterations);

    while !cancel.is_cancelled() && !limit_reached(&summary) {
        summary.scans += 1;

        match reader.scan().await {
            Ok(outcome) => {
                summary.record(&outcome);
                on_scan(&outcome);
            }
            Err(e) if e.requires_reconnect() => {
                warn!("Polling stopped after {} scans: {}", summary.scans, e);
                return Err(e);
            }
            Err(e) => {
                warn!("Scan {} failed: {}", summary.scans, e);
                summary.decode_failures += 1;
            }
        }

        if limit_reached(&summary) {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(options.interval) => {}
        }
    }

    info!(
        "Polling finished: {} scans, {} records, {} statuses, {} errors",
        summary.scans, summary.records, summary.statuses, summary.errors
    );

    Ok(summary)
}
