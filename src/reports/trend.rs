//! Period-over-period trend calculation

use serde::Serialize;

use crate::models::labels::labeled_enum;
use crate::models::Money;

/// Changes within +/- this many percent count as stable
pub const DEFAULT_TREND_THRESHOLD: f64 = 5.0;

labeled_enum! {
    /// Direction of change between two periods
    pub enum Trend as "trend" {
        Up => "up" / "Up",
        Down => "down" / "Down",
        Stable => "stable" / "Stable",
    }
}

/// Current vs previous totals and the resulting trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub current: Money,
    pub previous: Money,
    /// `current - previous`
    pub growth: Money,
    /// Growth relative to `previous`, 0 when `previous` is not positive
    pub growth_percentage: f64,
    pub trend: Trend,
}

/// Percentage change from `previous` to `current`
///
/// A previous total of zero (or less) yields 0, not infinity.
pub fn growth_percentage(current: Money, previous: Money) -> f64 {
    if !previous.is_positive() {
        return 0.0;
    }
    (current - previous).cents() as f64 / previous.cents() as f64 * 100.0
}

/// Classify a percentage change against a symmetric dead zone
///
/// Exactly `threshold` is still stable.
pub fn classify(percentage: f64, threshold: f64) -> Trend {
    if percentage > threshold {
        Trend::Up
    } else if percentage < -threshold {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Compare two totals with the default threshold
pub fn calculate_trend(current: Money, previous: Money) -> TrendSummary {
    calculate_trend_with(current, previous, DEFAULT_TREND_THRESHOLD)
}

pub fn calculate_trend_with(current: Money, previous: Money, threshold: f64) -> TrendSummary {
    let growth_percentage = growth_percentage(current, previous);
    TrendSummary {
        current,
        previous,
        growth: current - previous,
        growth_percentage,
        trend: classify(growth_percentage, threshold),
    }
}
