//! Display formatting for money, ratios and durations.

/// Groups the integer digits of `digits` with `separator`.
fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// `1234.5` -> `"1,234.5"`. At most two decimals, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && fixed != "0.00" {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, ','));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// US dollars: `"$1,234.5"`, `"-$80"`.
pub fn format_currency(value: f64) -> String {
    let number = format_number(value);
    match number.strip_prefix('-') {
        Some(positive) => format!("-${positive}"),
        None if value.is_finite() => format!("${number}"),
        None => number,
    }
}

/// Argentine pesos, whole units with dot grouping: `"$ 1.234.567"`.
pub fn format_ars(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}$ {}", group_thousands(&digits, '.'))
}

/// Short form for chart axes: `"1.5M"`, `"12.3K"`, `"640"`.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format_number(value)
    }
}

pub fn format_multiplier(value: f64) -> String {
    format!("{value:.1}x")
}

/// Ratio to percent: `0.105` -> `"10.5%"`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

pub fn format_duration(minutes: u32) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
