//! Report formatting utilities for terminal output
//!
//! Small helpers shared by the report, statistics and dashboard views.

use crate::audit::AuditEntry;
use crate::reports::{Trend, TrendSummary};

/// Format a signed percentage change with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    let magnitude = pct.abs();
    let sign = if pct > 0.0 {
        "+"
    } else if pct < 0.0 {
        "-"
    } else {
        ""
    };
    if magnitude > 0.0 && magnitude < 0.1 {
        format!("{}{:.2}%", sign, magnitude)
    } else if magnitude < 10.0 {
        format!("{}{:.1}%", sign, magnitude)
    } else {
        format!("{}{:.0}%", sign, magnitude)
    }
}

/// Create a simple bar chart representation from cent amounts
pub fn format_bar(value: i64, max_value: i64, width: usize) -> String {
    if max_value <= 0 || value <= 0 {
        return " ".repeat(width);
    }

    let filled = ((value as f64 / max_value as f64) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Arrow and label for a trend
pub fn format_trend(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "▲ up",
        Trend::Down => "▼ down",
        Trend::Stable => "● stable",
    }
}

/// One-line summary of a trend comparison
pub fn format_trend_line(summary: &TrendSummary, currency: &str) -> String {
    format!(
        "{} vs {} ({}, {})",
        summary.current.format_with_symbol(currency),
        summary.previous.format_with_symbol(currency),
        format_percentage(summary.growth_percentage),
        format_trend(summary.trend)
    )
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Format audit entries, oldest first
pub fn format_audit_log(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::reports::calculate_trend;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "+0.05%");
        assert_eq!(format_percentage(-5.5), "-5.5%");
        assert_eq!(format_percentage(50.0), "+50%");
        assert_eq!(format_percentage(0.0), "0.0%");
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50, 100, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(0, 100, 4), "    ");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Café au lait", 6), "Caf...");
    }

    #[test]
    fn test_trend_line() {
        let line = format_trend_line(
            &calculate_trend(Money::from_cents(11000), Money::from_cents(10000)),
            "$",
        );
        assert_eq!(line, "$110.00 vs $100.00 (+10%, ▲ up)");
    }
}
