use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{CategorySummary, PriceRangePoint},
    util::format::{format_ars, format_currency, format_multiplier, format_number},
};

use crate::ui::theme;

#[component]
pub fn PriceRangeTable(points: Vec<PriceRangePoint>, current_price: f64) -> Element {
    // Highlight the sample nearest the price currently in use.
    let nearest = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.drone_price - current_price)
                .abs()
                .total_cmp(&(b.drone_price - current_price).abs())
        })
        .map(|(idx, _)| idx);

    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "Drone price" }
                    th { class: "num", "Total USD" }
                    th { class: "num", "Total ARS" }
                    th { class: "num", "Per drone" }
                    th { class: "num", "With margin" }
                    th { class: "num", "Savings" }
                    th { class: "num", "Advantage" }
                }
            }
            tbody {
                for (idx, point) in points.into_iter().enumerate() {
                    tr { class: if Some(idx) == nearest { "row-selected" } else { "" },
                        td { "{format_currency(point.drone_price)}" }
                        td { class: "num", "{format_currency(point.total_cost_usd)}" }
                        td { class: "num", "{format_ars(point.total_cost_ars)}" }
                        td { class: "num", "{format_currency(point.cost_per_drone)}" }
                        td { class: "num", "{format_currency(point.cost_per_drone_with_margin)}" }
                        td { class: "num {theme::signed_text(point.import_savings)}", "{format_currency(point.import_savings)}" }
                        td { class: "num {theme::advantage_text(point.advantage_ratio)}", "{format_multiplier(point.advantage_ratio)}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn CategoryTable(categories: Vec<CategorySummary>, current: String) -> Element {
    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "Category" }
                    th { class: "num", "Models" }
                    th { class: "num", "Avg sensitivity" }
                    th { class: "num", "Avg advantage" }
                    th { class: "num", "Avg challenges" }
                    th { "Best model" }
                }
            }
            tbody {
                for summary in categories {
                    tr { class: if summary.category.name() == current { "row-selected" } else { "" },
                        td { class: "text-strong", "{summary.category}" }
                        td { class: "num", "{summary.total_models}" }
                        td { class: "num", "{format_number(summary.avg_sensitivity)}" }
                        td { class: "num {theme::advantage_text(summary.avg_import_advantage)}", "{format_multiplier(summary.avg_import_advantage)}" }
                        td { class: "num", "{format_number(summary.avg_challenge_count)}" }
                        td { "{summary.best_model.model}" }
                    }
                }
            }
        }
    }
}
