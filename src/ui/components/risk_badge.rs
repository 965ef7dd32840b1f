use dioxus::prelude::*;

use drone_import_dashboard::domain::RiskLevel;

use crate::ui::theme;

#[component]
pub fn RiskBadge(level: RiskLevel, score: Option<u32>) -> Element {
    let text = match score {
        Some(score) => format!("{level} · {score}/100"),
        None => level.to_string(),
    };

    rsx! {
        span { class: theme::risk_badge(level), "{text}" }
    }
}
