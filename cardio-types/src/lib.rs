//! # cardio-types
//!
//! Core types for simulated patient vital-sign readings. Everything that
//! generates or delivers readings agrees on the definitions in this crate:
//! how patients are identified, which labels exist, and how a reading is
//! rendered as text.
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`Reading`] and [`AlertState`]
//!
//! ## Example
//!
//! ```rust
//! use cardio_types::{labels, Reading};
//!
//! let reading = Reading::new(7, 123456, labels::SATURATION, "97%");
//!
//! assert_eq!(
//!     reading.to_console_line(),
//!     "Patient ID: 7, Timestamp: 123456, Label: Saturation, Data: 97%"
//! );
//! assert_eq!(reading.to_wire_line(), "7,123456,Saturation,97%");
//! ```

mod alert;
mod reading;
mod saturation;
mod time;

pub mod labels;

pub use alert::AlertState;
pub use reading::{format_console_line, format_wire_line, Reading};
pub use saturation::{
    format_saturation, SATURATION_INITIAL_MAX, SATURATION_INITIAL_MIN, SATURATION_MAX,
    SATURATION_MIN,
};
pub use time::current_timestamp_ms;

/// Identifies a simulated patient.
///
/// Patient IDs are 1-based: a simulation with `n` patients uses IDs `1..=n`.
pub type PatientId = u32;
