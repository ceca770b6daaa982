//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use mercadillo_core::NumberFormat;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a number with `.` thousands separators and a `,` decimal mark.
///
/// Values that do not parse as a number are rendered unchanged.
///
/// Usage in templates: `{{ product.sold|format_number }}`
#[askama::filter_fn]
pub fn format_number(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(text.parse::<f64>().map_or(text, |n| {
        mercadillo_core::format_number(n, NumberFormat::Grouped)
    }))
}

/// URL-encodes a query parameter value.
///
/// Usage in templates: `{{ page.next_cursor|urlencode_param }}`
#[askama::filter_fn]
pub fn urlencode_param(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(urlencoding::encode(&value.to_string()).into_owned())
}
