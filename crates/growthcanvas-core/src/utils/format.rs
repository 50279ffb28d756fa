/// Format a dollar amount compactly: `$1.3M`, `$350.0K`, `$420`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "$0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.1}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}

/// Format a fraction as a percentage: `0.125` -> `12.5%`
pub fn format_percent(fraction: f64) -> String {
    let percent = fraction * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{:.0}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

/// Format a headcount or client count, which the model may return fractional
pub fn format_count(value: f64) -> String {
    format!("{:.0}", value.round())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
