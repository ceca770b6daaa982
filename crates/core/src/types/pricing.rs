//! Price display helpers.
//!
//! Prices are stored as whole currency units (`i64`). Display formatting
//! follows the marketplace's Spanish-locale convention: `.` groups
//! thousands and `,` marks decimals.

use serde::{Deserialize, Serialize};

/// Number of decimal places kept before trimming.
const DECIMAL_PLACES: usize = 4;

/// How [`format_number`] renders a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// `1.234,50`: thousands grouped with `.`, decimal comma, at least two
    /// decimal digits once any decimals remain.
    #[default]
    Grouped,
    /// `1234.5`: no grouping, decimal point, trailing zeros removed.
    Plain,
}

impl NumberFormat {
    const fn decimal_mark(self) -> char {
        match self {
            Self::Grouped => ',',
            Self::Plain => '.',
        }
    }
}

/// Format a number for display.
///
/// The value is rounded to four decimals, trailing zeros are trimmed and a
/// dangling decimal mark is removed. Negative zero renders as `0`.
///
/// # Examples
///
/// ```rust
/// use mercadillo_core::{NumberFormat, format_number};
///
/// assert_eq!(format_number(1234.0, NumberFormat::Grouped), "1.234");
/// assert_eq!(format_number(1234.5, NumberFormat::Grouped), "1.234,50");
/// assert_eq!(format_number(1234.5, NumberFormat::Plain), "1234.5");
/// ```
#[must_use]
pub fn format_number(value: f64, format: NumberFormat) -> String {
    let fixed = format!("{value:.DECIMAL_PLACES$}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let (sign, digits) = int_part
        .strip_prefix('-')
        .map_or(("", int_part), |rest| ("-", rest));
    let fraction = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + digits.len() / 3);
    out.push_str(sign);
    match format {
        NumberFormat::Grouped => push_grouped(&mut out, digits, '.'),
        NumberFormat::Plain => out.push_str(digits),
    }

    if !fraction.is_empty() {
        out.push(format.decimal_mark());
        out.push_str(fraction);
        if format == NumberFormat::Grouped && fraction.len() == 1 {
            out.push('0');
        }
    }

    if out == "-0" {
        return "0".to_owned();
    }
    out
}

fn push_grouped(out: &mut String, digits: &str, separator: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}

/// Discount of `price` relative to `original_price`, as a whole percentage.
///
/// Truncates toward zero. Returns `0` when there is no original price.
/// A price above the original yields a negative discount.
#[must_use]
pub fn discount_percent(original_price: i64, price: i64) -> i32 {
    if original_price == 0 {
        return 0;
    }
    let pct =
        (i128::from(original_price) - i128::from(price)) * 100 / i128::from(original_price);
    i32::try_from(pct).unwrap_or(if pct.is_negative() { i32::MIN } else { i32::MAX })
}
