//! Reading - one labeled value for one patient at one instant.

use crate::PatientId;

/// A single generated reading.
///
/// Readings are ephemeral: generators hand their parts straight to a
/// dispatcher, which renders them as text. This owned form exists for
/// code that needs to hold on to readings, such as capture buffers in tests.
///
/// # Example
///
/// ```rust
/// use cardio_types::Reading;
///
/// let reading = Reading::new(3, 1_700_000_000_000, "Alert", "triggered");
/// assert_eq!(reading.to_wire_line(), "3,1700000000000,Alert,triggered");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Patient the reading belongs to.
    pub patient_id: PatientId,

    /// Unix timestamp in milliseconds when the reading was produced.
    pub timestamp_ms: i64,

    /// Kind of reading, e.g. `"Saturation"`.
    pub label: String,

    /// Rendered value, e.g. `"97%"`.
    pub data: String,
}

impl Reading {
    /// Create a reading from its parts.
    pub fn new(
        patient_id: PatientId,
        timestamp_ms: i64,
        label: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            patient_id,
            timestamp_ms,
            label: label.into(),
            data: data.into(),
        }
    }

    /// Human-readable rendering used by console and file output.
    pub fn to_console_line(&self) -> String {
        format_console_line(self.patient_id, self.timestamp_ms, &self.label, &self.data)
    }

    /// Comma-separated rendering used by socket output.
    pub fn to_wire_line(&self) -> String {
        format_wire_line(self.patient_id, self.timestamp_ms, &self.label, &self.data)
    }
}

/// Format `Patient ID: <id>, Timestamp: <ms>, Label: <label>, Data: <data>`.
///
/// No trailing newline is included.
pub fn format_console_line(
    patient_id: PatientId,
    timestamp_ms: i64,
    label: &str,
    data: &str,
) -> String {
    format!(
        "Patient ID: {}, Timestamp: {}, Label: {}, Data: {}",
        patient_id, timestamp_ms, label, data
    )
}

/// Format `<id>,<ts>,<label>,<data>`.
///
/// No trailing newline is included.
pub fn format_wire_line(patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) -> String {
    format!("{},{},{},{}", patient_id, timestamp_ms, label, data)
}
