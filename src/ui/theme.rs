//! Class helpers shared by pages so status colours stay consistent.

use drone_import_dashboard::domain::{AlertLevel, RiskLevel};

// ============================================
// BUTTON STYLES
// ============================================

pub const BTN_PRIMARY: &str = "btn btn-primary";
pub const BTN_SECONDARY: &str = "btn btn-secondary";
pub const BTN_DANGER: &str = "btn btn-danger";

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-btn nav-btn-active"
    } else {
        "nav-btn"
    }
}

pub fn toggle_button(active: bool) -> &'static str {
    if active {
        "btn btn-small btn-toggle-active"
    } else {
        "btn btn-small"
    }
}

// ============================================
// STATUS STYLES
// ============================================

pub fn alert_class(level: AlertLevel) -> String {
    format!("alert {}", level.css_class())
}

pub fn alert_icon(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Warning => "⚠️",
        AlertLevel::Info => "ℹ️",
        AlertLevel::Success => "✅",
    }
}

pub fn risk_badge(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "badge badge-good",
        RiskLevel::Medium => "badge badge-watch",
        RiskLevel::High => "badge badge-bad",
    }
}

/// Green above 2x, amber above 1x, red otherwise.
pub fn advantage_text(ratio: f64) -> &'static str {
    if ratio > 2.0 {
        "text-good"
    } else if ratio > 1.0 {
        "text-watch"
    } else {
        "text-bad"
    }
}

pub fn signed_text(value: f64) -> &'static str {
    if value >= 0.0 {
        "text-good"
    } else {
        "text-bad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advantage_bands() {
        assert_eq!(advantage_text(2.5), "text-good");
        assert_eq!(advantage_text(1.5), "text-watch");
        assert_eq!(advantage_text(0.2), "text-bad");
    }

    #[test]
    fn alert_classes_carry_the_level() {
        assert_eq!(alert_class(AlertLevel::Warning), "alert alert-warning");
    }
}
