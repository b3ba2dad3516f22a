//! In-memory dispatcher that records readings.

use cardio_types::{PatientId, Reading};
use parking_lot::Mutex;

use super::Dispatcher;

/// A dispatcher that keeps every reading it receives.
///
/// Useful for tests and for embedding the simulator in another program
/// that wants to inspect readings directly.
#[derive(Debug, Default)]
pub struct CaptureDispatcher {
    readings: Mutex<Vec<Reading>>,
}

impl CaptureDispatcher {
    /// Create an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all readings received so far, in arrival order.
    pub fn readings(&self) -> Vec<Reading> {
        self.readings.lock().clone()
    }

    /// Number of readings received so far.
    pub fn len(&self) -> usize {
        self.readings.lock().len()
    }

    /// Returns true if nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.readings.lock().is_empty()
    }

    /// Count readings whose label and data both match.
    pub fn count_where(&self, label: &str, data: &str) -> usize {
        self.readings
            .lock()
            .iter()
            .filter(|r| r.label == label && r.data == data)
            .count()
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Reading> {
        std::mem::take(&mut *self.readings.lock())
    }

    /// Discard everything received so far.
    pub fn clear(&self) {
        self.readings.lock().clear();
    }
}

impl Dispatcher for CaptureDispatcher {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        self.readings
            .lock()
            .push(Reading::new(patient_id, timestamp_ms, label, data));
    }
}
