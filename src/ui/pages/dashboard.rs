use dioxus::prelude::*;
use time::OffsetDateTime;

use drone_import_dashboard::{
    domain::{AnalysisSnapshot, AppState, ImportReport},
    util::format::{format_ars, format_currency, format_multiplier},
};

use crate::{
    app::Services,
    ui::{
        components::{
            alert_list::AlertList,
            bar_chart::CostBars,
            breakdown_table::BreakdownTable,
            kpi_card::KpiCard,
            param_form::ParamForm,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn DashboardPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let report = use_context::<Memo<ImportReport>>();
    let services = use_context::<Services>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let mut saving = use_signal(|| false);

    let current = report();
    let costs = current.costs.clone();
    let quantity = state.with(|st| st.params.quantity);
    let inputs_valid = state.with(|st| st.params.validate().is_ok());

    let on_save = move |_| {
        let Some(store) = services.store.clone() else {
            push_toast(toasts, ToastKind::Error, "No analysis store is available.");
            return;
        };
        let (params, specs) = state.with(|st| (st.params.clone(), st.specs.clone()));
        if let Err(err) = params.validate() {
            push_toast(toasts, ToastKind::Warning, format!("Fix the inputs before saving: {err}"));
            return;
        }
        let costs = report.with(|r| r.costs.clone());
        let snapshot =
            match AnalysisSnapshot::from_breakdown(&params, &specs, &costs, OffsetDateTime::now_utc()) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    log::error!("could not encode analysis: {err}");
                    push_toast(toasts, ToastKind::Error, "Could not encode this analysis.");
                    return;
                }
            };

        saving.set(true);
        spawn(async move {
            match store.save(&snapshot).await {
                Ok(saved) => push_toast(
                    toasts,
                    ToastKind::Success,
                    format!("Saved analysis for {}.", saved.snapshot.drone_model),
                ),
                Err(err) => {
                    log::error!("saving analysis failed: {err}");
                    push_toast(
                        toasts,
                        ToastKind::Error,
                        format!("Failed to save analysis: {err}"),
                    );
                }
            }
            saving.set(false);
        });
    };

    rsx! {
        div { class: "layout-sidebar",
            ParamForm { base_price: costs.base_price }

            section { class: "content",
                div { class: "kpi-grid",
                    KpiCard {
                        title: "Total DDP".to_string(),
                        value: format_currency(costs.total_ddp_usd),
                        description: Some(format_ars(costs.total_ddp_ars)),
                    }
                    KpiCard {
                        title: "Cost per drone".to_string(),
                        value: format_currency(costs.cost_per_drone),
                        description: Some(format!("{} with margin", format_currency(costs.cost_per_drone_with_margin))),
                    }
                    KpiCard {
                        title: "Import advantage".to_string(),
                        value: format_multiplier(costs.import_advantage_calculated),
                        description: Some(format!("Retail {} in Argentina", format_currency(costs.argentine_price_usd))),
                        tone: theme::advantage_text(costs.import_advantage_calculated),
                    }
                    KpiCard {
                        title: "Profit".to_string(),
                        value: format_currency(costs.total_profit),
                        description: Some(format!("{} per drone × {quantity}", format_currency(costs.profit_per_drone))),
                        tone: theme::signed_text(costs.total_profit),
                    }
                }

                div { class: "panel",
                    div { class: "panel-head",
                        h2 { class: "section-title", "Alerts" }
                        button {
                            class: theme::BTN_PRIMARY,
                            disabled: saving() || !inputs_valid,
                            onclick: on_save,
                            if saving() { "Saving…" } else { "Save analysis" }
                        }
                    }
                    AlertList { alerts: current.alerts.clone() }
                }

                div { class: "panel",
                    h2 { class: "section-title", "Cost composition" }
                    CostBars { segments: current.composition.clone() }
                }

                BreakdownTable { costs: costs.clone() }
            }
        }
    }
}
