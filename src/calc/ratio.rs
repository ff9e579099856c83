//! Guarded division for payback and cost-per-ton figures.

/// Divides `numerator` by `denominator`, returning `None` when the quotient is undefined.
///
/// A zero denominator or a non-finite quotient yields `None`. Negative and
/// zero quotients are valid and returned unchanged.
///
/// # Examples
///
/// ```
/// use carbon_incentives::calc::ratio::checked_ratio;
///
/// assert_eq!(checked_ratio(1800.0, 200.0), Some(9.0));
/// assert_eq!(checked_ratio(-50.0, 100.0), Some(-0.5));
/// assert_eq!(checked_ratio(1800.0, 0.0), None);
/// ```
pub fn checked_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Renders an optional ratio for text output, `N/A` when undefined.
pub fn display_ratio(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_is_undefined() {
        assert_eq!(checked_ratio(0.0, 0.0), None);
        assert_eq!(checked_ratio(-3.0, -0.0), None);
    }

    #[test]
    fn nan_input_is_undefined() {
        assert_eq!(checked_ratio(f64::NAN, 2.0), None);
    }

    #[test]
    fn display_marks_undefined() {
        assert_eq!(display_ratio(None, 1), "N/A");
        assert_eq!(display_ratio(Some(2.3456), 2), "2.35");
    }
}
