//! Blood oxygen saturation bounds and formatting.

/// Lowest saturation value a reading may carry.
pub const SATURATION_MIN: u8 = 90;

/// Highest saturation value a reading may carry.
pub const SATURATION_MAX: u8 = 100;

/// Lower bound (inclusive) of a patient's starting saturation.
pub const SATURATION_INITIAL_MIN: u8 = 95;

/// Upper bound (inclusive) of a patient's starting saturation.
pub const SATURATION_INITIAL_MAX: u8 = 100;

/// Render a saturation value as a percentage string, e.g. `"97%"`.
///
/// Values are integral, so no decimal point is ever produced.
pub fn format_saturation(value: u8) -> String {
    format!("{}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_decimal_point() {
        assert_eq!(format_saturation(97), "97%");
        assert_eq!(format_saturation(SATURATION_MAX), "100%");
        assert_eq!(format_saturation(SATURATION_MIN), "90%");
    }

    #[test]
    fn initial_range_is_inside_bounds() {
        assert!(SATURATION_INITIAL_MIN >= SATURATION_MIN);
        assert!(SATURATION_INITIAL_MAX <= SATURATION_MAX);
    }
}
