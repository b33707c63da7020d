//! Optional I/O accounting hook.
//!
//! Stores and drives report every byte-level operation as an [`IoEvent`]. Nothing
//! is recorded until a sink is installed, and only one sink can ever be installed.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IoOpType {
    Read,
    Write,
}

/// One cell access on a physical store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiskOp {
    pub disk_id: usize,
    pub op: IoOpType,
    pub error: bool,
}

/// One `write` or `read_many` call on a virtual drive.
#[derive(Copy, Clone, Debug)]
pub struct DriveOp {
    pub layout: &'static str,
    pub op: IoOpType,
    pub bytes: u64,
    pub latency_seconds: f64,
    pub error: bool,
}

#[derive(Copy, Clone, Debug)]
pub enum IoEvent {
    Disk(DiskOp),
    Drive(DriveOp),
}

impl IoEvent {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        match self {
            Self::Disk(op) => op.error,
            Self::Drive(op) => op.error,
        }
    }
}

pub trait MetricsSink: Send + Sync + 'static {
    fn record(&self, event: IoEvent);
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

/// Returns `false` if a sink was already installed.
pub fn install_metrics_sink(sink: Arc<dyn MetricsSink>) -> bool {
    SINK.set(sink).is_ok()
}

pub fn is_enabled() -> bool {
    SINK.get().is_some()
}

pub(crate) fn record_disk(disk_id: usize, op: IoOpType, error: bool) {
    if let Some(sink) = SINK.get() {
        sink.record(IoEvent::Disk(DiskOp { disk_id, op, error }));
    }
}

pub(crate) fn record_drive(
    layout: &'static str,
    op: IoOpType,
    bytes: usize,
    started: Instant,
    error: bool,
) {
    if let Some(sink) = SINK.get() {
        sink.record(IoEvent::Drive(DriveOp {
            layout,
            op,
            bytes: bytes as u64,
            latency_seconds: started.elapsed().as_secs_f64(),
            error,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::volume::VirtualDrive;
    use crate::retention::volume::striped::StripedVolume;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<IoEvent>>);

    impl MetricsSink for Recorder {
        fn record(&self, event: IoEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn installed_sink_sees_disk_and_drive_events() {
        let sink = Arc::new(Recorder::default());
        assert!(install_metrics_sink(sink.clone()));
        assert!(is_enabled());
        assert!(!install_metrics_sink(Arc::new(Recorder::default())));

        let mut drive = StripedVolume::with_capacity(3, 6).unwrap();
        drive.write(0x2A, Some(0)).unwrap();
        drive.fail_disk(0).unwrap();
        assert_eq!(drive.read_many(&[0]).unwrap(), vec![Some(0x2A)]);
        assert!(drive.read_many(&[99]).is_err());

        // Other tests share the global sink, so only look for what this test produced.
        let events = sink.0.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            IoEvent::Disk(DiskOp { op: IoOpType::Write, error: false, .. })
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            IoEvent::Drive(DriveOp {
                layout: "striped",
                op: IoOpType::Read,
                bytes: 1,
                error: false,
                ..
            })
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            IoEvent::Drive(DriveOp { layout: "striped", error: true, .. })
        )));
        assert!(events.iter().any(IoEvent::is_error));
    }
}
