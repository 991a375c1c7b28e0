// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display formatting for amounts, months, and dates (en-US conventions).

use chrono::{DateTime, NaiveDate, Utc};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English month name for 1..=12, "Invalid Month" otherwise.
pub fn month_name(month: i64) -> &'static str {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MONTH_NAMES.get(i))
        .copied()
        .unwrap_or("Invalid Month")
}

/// Symbol for an ISO 4217 code; unknown codes are shown as the code itself.
fn currency_symbol(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        other => format!("{other} "),
    }
}

/// Format an amount in minor units (100 per major unit) as e.g. `$1,234.56`.
pub fn format_currency(minor_units: i64, currency_code: &str) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    let major = abs / 100;
    let cents = abs % 100;
    format!(
        "{sign}{}{}.{cents:02}",
        currency_symbol(currency_code),
        group_thousands(major)
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Short date, e.g. `Mar 1, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Short date of a timestamp, in UTC.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    format_date(ts.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_cover_range() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Invalid Month");
        assert_eq!(month_name(13), "Invalid Month");
        assert_eq!(month_name(-3), "Invalid Month");
    }

    #[test]
    fn currency_from_cents() {
        assert_eq!(format_currency(15_000, "USD"), "$150.00");
        assert_eq!(format_currency(5, "USD"), "$0.05");
        assert_eq!(format_currency(123_456_789, "USD"), "$1,234,567.89");
        assert_eq!(format_currency(-250, "USD"), "-$2.50");
        assert_eq!(format_currency(100, "GBP"), "£1.00");
        assert_eq!(format_currency(100, "CHF"), "CHF 1.00");
    }

    #[test]
    fn short_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(d), "Mar 1, 2024");
        let d = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert_eq!(format_date(d), "Dec 25, 2023");
    }
}
