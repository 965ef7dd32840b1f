use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{Recommendation, RecommendedAction, RiskAssessment},
    util::format::format_currency,
};

use super::risk_badge::RiskBadge;

#[component]
pub fn RiskPanel(risk: RiskAssessment) -> Element {
    rsx! {
        div { class: "panel",
            div { class: "panel-head",
                h3 { class: "label", "Risk assessment" }
                RiskBadge { level: risk.level, score: Some(risk.score) }
            }
            if risk.factors.is_empty() {
                p { class: "text-muted small", "No risk factors triggered." }
            } else {
                table { class: "table",
                    thead {
                        tr {
                            th { "Area" }
                            th { "Risk" }
                            th { "Impact" }
                            th { "Mitigation" }
                        }
                    }
                    tbody {
                        for factor in risk.factors {
                            tr {
                                td { "{factor.area}" }
                                td { "{factor.risk}" }
                                td { RiskBadge { level: factor.impact, score: None } }
                                td { class: "text-muted", "{factor.mitigation}" }
                            }
                        }
                    }
                }
            }
            p { class: "text-muted small", "{risk.summary()}" }
        }
    }
}

/// Recommendation cards; `on_apply` fires for actions the inputs can take
/// directly.
#[component]
pub fn RecommendationList(
    recommendations: Vec<Recommendation>,
    on_apply: EventHandler<RecommendedAction>,
) -> Element {
    if recommendations.is_empty() {
        return rsx! {
            p { class: "text-muted small", "Nothing to recommend for the current inputs." }
        };
    }

    rsx! {
        div { class: "card-list",
            for recommendation in recommendations {
                div { class: "panel recommendation",
                    h4 { class: "text-strong", "{recommendation.title}" }
                    p { class: "small", "{recommendation.message}" }
                    button {
                        class: "btn btn-small",
                        onclick: {
                            let action = recommendation.action.clone();
                            move |_| on_apply.call(action.clone())
                        },
                        "{action_label(&recommendation.action)}"
                    }
                }
            }
        }
    }
}

fn action_label(action: &RecommendedAction) -> String {
    match action {
        RecommendedAction::ExploreCategory(category) => format!("Browse {category} models"),
        RecommendedAction::AdjustPrice { target_price } => {
            format!("Use {}", format_currency(*target_price))
        }
        RecommendedAction::IncreaseQuantity { suggested_quantity } => {
            format!("Set quantity to {suggested_quantity}")
        }
    }
}
