//! View models handed to templates and the JSON API.

use crate::domain::types::Timestamp;

pub mod categories;
pub mod listings;

/// Format a price in US-dollar style: thousands separators and two decimals,
/// e.g. `$1,234.50`.
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Calendar date of a timestamp in UTC, `YYYY-MM-DD`.
pub fn format_date(timestamp: Timestamp) -> String {
    timestamp
        .to_datetime()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_prices_with_grouping_and_cents() {
        assert_eq!(format_price(100.0), "$100.00");
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(999.999), "$1,000.00");
    }

    #[test]
    fn formats_dates_in_utc() {
        let ts = Timestamp::new(1_700_000_000_000).unwrap();
        assert_eq!(format_date(ts), "2023-11-14");
        assert_eq!(format_date(Timestamp::default()), "1970-01-01");
    }
}
