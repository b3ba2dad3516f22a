//! Output dispatchers for generated readings.
//!
//! A [`Dispatcher`] is the delivery channel a generator hands each reading
//! to. Delivery is one-way and best effort: a dispatcher never reports a
//! failure back to the generator. It logs the problem and moves on.
//!
//! | Dispatcher | Channel | Line format |
//! |---|---|---|
//! | [`ConsoleDispatcher`] | stdout | `Patient ID: 1, Timestamp: .., Label: .., Data: ..` |
//! | [`FileDispatcher`] | `<dir>/<label>.txt` | same as console |
//! | [`StreamSocketDispatcher`] | one TCP client | `1,<ts>,<label>,<data>` |
//! | [`BroadcastSocketDispatcher`] | every WebSocket client | `1,<ts>,<label>,<data>` |

mod capture;
mod console;
mod file;

#[cfg(feature = "tokio")]
mod broadcast;
#[cfg(feature = "tokio")]
mod stream;

pub use capture::CaptureDispatcher;
pub use console::ConsoleDispatcher;
pub use file::FileDispatcher;

#[cfg(feature = "tokio")]
pub use broadcast::BroadcastSocketDispatcher;
#[cfg(feature = "tokio")]
pub use stream::StreamSocketDispatcher;

use std::fmt::Debug;
use std::sync::Arc;

use cardio_types::PatientId;

/// A delivery channel for readings.
///
/// Implementations must tolerate concurrent `output` calls from many
/// generator threads. Label and data are delivered as given; empty strings
/// are not rejected.
///
/// # Example
///
/// ```rust
/// use cardio_sdk::{CaptureDispatcher, Dispatcher};
///
/// let dispatcher = CaptureDispatcher::new();
/// dispatcher.output(1, 1_700_000_000_000, "Saturation", "98%");
/// assert_eq!(dispatcher.len(), 1);
/// ```
pub trait Dispatcher: Send + Sync + Debug {
    /// Deliver one reading.
    ///
    /// Never fails from the caller's point of view.
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str);
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        (**self).output(patient_id, timestamp_ms, label, data)
    }
}

impl<D: Dispatcher + ?Sized> Dispatcher for Box<D> {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        (**self).output(patient_id, timestamp_ms, label, data)
    }
}
