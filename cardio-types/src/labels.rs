//! Well-known reading labels.
//!
//! A label names the kind of reading. The file dispatcher routes each label
//! to its own `<label>.txt` file.

/// Label for alert transitions (`triggered` / `resolved`).
pub const ALERT: &str = "Alert";

/// Label for blood oxygen saturation readings.
pub const SATURATION: &str = "Saturation";
