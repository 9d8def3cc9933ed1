use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a numeric value with fixed decimals and an optional unit suffix.
///
/// With `show_zero_decimals == false` trailing zeros are dropped, so `2.50`
/// renders as `2.5`. Non-finite values render through `f64`'s display.
#[must_use]
pub fn format_value(
    value: f64,
    decimals: Option<u32>,
    units: &str,
    show_zero_decimals: bool,
) -> String {
    let mut text = match (decimals, Decimal::from_f64(value)) {
        (Some(decimals), Some(decimal)) => {
            let rounded =
                decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            if show_zero_decimals {
                format!("{rounded:.prec$}", prec = decimals as usize)
            } else {
                rounded.normalize().to_string()
            }
        }
        (None, Some(decimal)) => decimal.normalize().to_string(),
        (_, None) => value.to_string(),
    };
    if !units.is_empty() {
        text.push(' ');
        text.push_str(units);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::format_value;

    #[test]
    fn fixed_decimals_with_units() {
        assert_eq!(format_value(21.456, Some(1), "°C", true), "21.5 °C");
        assert_eq!(format_value(2.0, Some(2), "", true), "2.00");
        assert_eq!(format_value(2.0, Some(2), "", false), "2");
        assert_eq!(format_value(2.50, Some(2), "kW", false), "2.5 kW");
        assert_eq!(format_value(2.25, Some(1), "", true), "2.3");
    }

    #[test]
    fn non_finite_values_fall_back_to_display() {
        assert_eq!(format_value(f64::NAN, Some(2), "", true), "NaN");
    }
}
