use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, trace};
use vdrive_rs::metrics::{IoEvent, IoOpType, MetricsSink, install_metrics_sink};

/// Counts store and drive I/O and traces each event.
#[derive(Default)]
pub struct IoTally {
    disk_reads: AtomicU64,
    disk_writes: AtomicU64,
    drive_bytes: AtomicU64,
    drive_micros: AtomicU64,
    errors: AtomicU64,
}

impl IoTally {
    /// Install a fresh tally as the process-wide sink.
    pub fn install() -> Option<Arc<Self>> {
        let tally = Arc::new(Self::default());
        install_metrics_sink(tally.clone()).then_some(tally)
    }

    pub fn log_summary(&self) {
        info!(
            disk_reads = self.disk_reads.load(Ordering::Relaxed),
            disk_writes = self.disk_writes.load(Ordering::Relaxed),
            drive_bytes = self.drive_bytes.load(Ordering::Relaxed),
            drive_micros = self.drive_micros.load(Ordering::Relaxed),
            errors = self.errors.load(Ordering::Relaxed),
            "io summary"
        );
    }
}

impl MetricsSink for IoTally {
    fn record(&self, event: IoEvent) {
        if event.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        match event {
            IoEvent::Disk(op) => {
                let counter = match op.op {
                    IoOpType::Read => &self.disk_reads,
                    IoOpType::Write => &self.disk_writes,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                trace!(disk = op.disk_id, op = ?op.op, error = op.error, "disk op");
            }
            IoEvent::Drive(op) => {
                self.drive_bytes.fetch_add(op.bytes, Ordering::Relaxed);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let micros = (op.latency_seconds * 1e6) as u64;
                self.drive_micros.fetch_add(micros, Ordering::Relaxed);
                trace!(
                    layout = op.layout,
                    op = ?op.op,
                    bytes = op.bytes,
                    latency_seconds = op.latency_seconds,
                    error = op.error,
                    "drive op"
                );
            }
        }
    }
}
