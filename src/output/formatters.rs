//! Reusable formatting utilities for CLI output
//!
//! Timestamps, durations, money amounts and other display values shared by
//! several commands.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Format a UTC timestamp as a local date/time string.
///
/// # Example output
/// `01/15/2025 14:30 PST`
pub fn format_timestamp_local(timestamp: Option<DateTime<Utc>>) -> String {
    let Some(dt) = timestamp else {
        return "N/A".to_string();
    };

    let local = dt.with_timezone(&Local);
    let date_time = local.format("%m/%d/%Y %H:%M").to_string();
    let tz_abbrev = offset_to_tz_abbrev(local.offset().local_minus_utc());
    format!("{} {}", date_time, tz_abbrev)
}

/// Format a UTC timestamp as a local date only.
pub fn format_date_local(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Convert UTC offset (seconds) to timezone abbreviation.
///
/// Falls back to `UTC+N` for uncommon offsets.
pub fn offset_to_tz_abbrev(offset_secs: i32) -> String {
    let offset_hours = offset_secs / 3600;
    let abbrev = match offset_hours {
        -10 => "HST",
        -9 => "AKST",
        -8 => "PST",
        -7 => "MST",
        -6 => "CST",
        -5 => "EST",
        -3 => "ART",
        0 => "UTC",
        1 => "CET",
        2 => "EET",
        3 => "MSK",
        9 => "JST",
        10 => "AEST",
        12 => "NZST",
        _ => return format!("UTC{:+}", offset_hours),
    };
    abbrev.to_string()
}

/// Format a duration as a compact age.
///
/// # Example output
/// - `2h 15m` (hours, minutes)
/// - `5m 10s` (minutes, seconds)
/// - `45s` (seconds only)
pub fn format_age(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Currencies without minor units
const ZERO_DECIMAL: &[&str] = &["jpy", "krw", "vnd"];

/// Format an amount in minor units (cents) with its currency.
///
/// # Example output
/// - `$1,234.56`
/// - `-€5.00`
/// - `CHF 10.00`
pub fn format_money(minor_units: i64, currency: &str) -> String {
    let code = currency.to_lowercase();
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();

    let amount = if ZERO_DECIMAL.contains(&code.as_str()) {
        group_thousands(abs)
    } else {
        format!("{}.{:02}", group_thousands(abs / 100), abs % 100)
    };

    match code.as_str() {
        "usd" | "cad" | "aud" => format!("{}${}", sign, amount),
        "eur" => format!("{}€{}", sign, amount),
        "gbp" => format!("{}£{}", sign, amount),
        "jpy" => format!("{}¥{}", sign, amount),
        _ => format!("{}{} {}", sign, code.to_uppercase(), amount),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format an optional value, `-` when absent.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Format a 0.0 - 1.0 ratio as a percentage.
pub fn format_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "-".to_string(),
    }
}
