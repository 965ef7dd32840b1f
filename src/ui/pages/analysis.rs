use dioxus::prelude::*;

use drone_import_dashboard::domain::{
    AppState, CategorySummary, ImportReport, PriceOverride, RecommendedAction,
};

use crate::{
    app::persist_user_state,
    ui::components::{
        bar_chart::TornadoChart,
        risk_panel::{RecommendationList, RiskPanel},
        sensitivity_tables::{CategoryTable, PriceRangeTable},
        toast::{push_toast, ToastKind, ToastMessage},
    },
};

#[component]
pub fn AnalysisPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let report = use_context::<Memo<ImportReport>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let current = report();
    let condition = state.with(|st| st.specs.condition);
    let current_category = current.costs.model.category.name().to_string();

    let on_apply = move |action: RecommendedAction| {
        let categories = report.with(|r| r.categories.clone());
        let message = state.with_mut(|st| apply_recommendation(st, &action, &categories));
        persist_user_state(&state);
        push_toast(toasts, ToastKind::Info, message);
    };

    rsx! {
        div { class: "content",
            div { class: "two-column",
                RiskPanel { risk: current.risk.clone() }
                div { class: "panel",
                    h2 { class: "section-title", "Recommendations" }
                    RecommendationList {
                        recommendations: current.recommendations.clone(),
                        on_apply: on_apply,
                    }
                }
            }

            div { class: "panel",
                h2 { class: "section-title", "Sensitivity (tornado)" }
                p { class: "text-muted small",
                    "Percent change in landed cost for each input's low and high scenario. Exchange rate is measured on savings per drone."
                }
                TornadoChart { entries: current.tornado.clone() }
            }

            div { class: "panel",
                h2 { class: "section-title", "Purchase price sweep ({condition})" }
                PriceRangeTable {
                    points: current.price_range.clone(),
                    current_price: current.costs.base_price,
                }
            }

            div { class: "panel",
                h2 { class: "section-title", "Category comparison" }
                CategoryTable {
                    categories: current.categories.clone(),
                    current: current_category,
                }
            }
        }
    }
}

/// Applies a recommendation to the inputs and describes what changed.
fn apply_recommendation(
    state: &mut AppState,
    action: &RecommendedAction,
    categories: &[CategorySummary],
) -> String {
    match action {
        RecommendedAction::ExploreCategory(category) => {
            match categories.iter().find(|summary| summary.category == *category) {
                Some(summary) => {
                    let model = summary.best_model.model.clone();
                    state.select_model(&model);
                    format!("Switched to {model}, the strongest {category} model.")
                }
                None => format!("No {category} models in the catalog."),
            }
        }
        RecommendedAction::AdjustPrice { target_price } => {
            state.specs.price_override = PriceOverride::Manual(*target_price);
            format!("Purchase price set to ${target_price:.0}.")
        }
        RecommendedAction::IncreaseQuantity { suggested_quantity } => {
            state.params.quantity = *suggested_quantity;
            format!("Quantity set to {suggested_quantity}.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_import_dashboard::domain::{category_comparison, Category};

    #[test]
    fn applying_recommendations_updates_inputs() {
        let mut state = AppState::default();
        let categories = category_comparison(&state.params, &state.specs);

        apply_recommendation(
            &mut state,
            &RecommendedAction::IncreaseQuantity { suggested_quantity: 4 },
            &categories,
        );
        assert_eq!(state.params.quantity, 4);

        apply_recommendation(
            &mut state,
            &RecommendedAction::AdjustPrice { target_price: 300.0 },
            &categories,
        );
        assert_eq!(state.specs.price_override, PriceOverride::Manual(300.0));

        apply_recommendation(
            &mut state,
            &RecommendedAction::ExploreCategory(Category::Agricultural),
            &categories,
        );
        let expected = categories
            .iter()
            .find(|summary| summary.category == Category::Agricultural)
            .map(|summary| summary.best_model.model.clone());
        assert_eq!(Some(state.specs.model.clone()), expected);
        assert_eq!(state.specs.price_override, PriceOverride::Default);
    }
}
