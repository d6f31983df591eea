//! Display formatting for numeric values on the e-ink templates.

/// Degree marker appended to temperatures.
pub const DEGREE: &str = "°";

/// Format with a fixed number of decimals.
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Round to a whole number and append `suffix`.
pub fn integer(value: f64, suffix: &str) -> String {
    format!("{:.0}{}", value, suffix)
}

/// Whole degrees, e.g. `-3°`.
pub fn degrees(value: f64) -> String {
    integer(value, DEGREE)
}

/// Degrees with one decimal, e.g. `21.4°`.
pub fn degrees_tenths(value: f64) -> String {
    format!("{:.1}{}", value, DEGREE)
}

/// Truncated integer padded to at least two digits, e.g. `07`.
pub fn two_digits(value: f64) -> String {
    format!("{:02}", value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed() {
        assert_eq!(fixed(12.345, 1), "12.3");
        assert_eq!(fixed(3.0, 0), "3");
    }

    #[test]
    fn test_degrees() {
        assert_eq!(degrees(21.6), "22°");
        assert_eq!(degrees(-3.2), "-3°");
        assert_eq!(degrees_tenths(21.64), "21.6°");
    }

    #[test]
    fn test_two_digits() {
        assert_eq!(two_digits(7.9), "07");
        assert_eq!(two_digits(48.0), "48");
        assert_eq!(two_digits(100.0), "100");
    }
}
