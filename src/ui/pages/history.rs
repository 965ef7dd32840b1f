use std::time::SystemTime;

use dioxus::prelude::*;
use time::macros::format_description;

use drone_import_dashboard::{
    domain::{AnalysisAnalytics, AppState, CacheResource, StoredAnalysis},
    util::format::{format_currency, format_duration, format_multiplier},
};

use crate::{
    app::{persist_user_state, Route, Services, HISTORY_PAGE_SIZE},
    ui::{
        components::{
            kpi_card::KpiCard,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

type HistoryData = (Vec<StoredAnalysis>, AnalysisAnalytics);

#[component]
pub fn HistoryPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let services = use_context::<Services>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let nav = use_navigator();
    let mut reload = use_signal(|| 0_u32);

    let store = services.store.clone();
    let history = use_resource(move || {
        let store = store.clone();
        let _generation = reload();
        async move {
            let store = store?;
            let loaded = async {
                let analyses = store.list(HISTORY_PAGE_SIZE).await?;
                let analytics = store.analytics().await?;
                Ok::<HistoryData, drone_import_dashboard::infra::store::StoreError>((
                    analyses, analytics,
                ))
            }
            .await;
            if loaded.is_ok() {
                state.with_mut(|st| {
                    st.cache.record_fetch(CacheResource::Analyses, SystemTime::now())
                });
            }
            Some(loaded.map_err(|err| {
                log::error!("loading saved analyses failed: {err}");
                err.to_string()
            }))
        }
    });

    let on_open = move |analysis: StoredAnalysis| {
        let Some((params, specs)) = analysis.snapshot.inputs() else {
            push_toast(
                toasts,
                ToastKind::Warning,
                "This analysis predates stored inputs and cannot be reopened.",
            );
            return;
        };
        state.with_mut(|st| {
            st.params = params;
            st.specs = specs;
        });
        persist_user_state(&state);
        nav.push(Route::Dashboard {});
    };

    let delete_store = services.store.clone();
    let on_delete = move |id: String| {
        let Some(store) = delete_store.clone() else {
            return;
        };
        spawn(async move {
            match store.delete(&id).await {
                Ok(()) => {
                    push_toast(toasts, ToastKind::Info, "Analysis deleted.");
                    reload += 1;
                }
                Err(err) => push_toast(
                    toasts,
                    ToastKind::Error,
                    format!("Failed to delete analysis: {err}"),
                ),
            }
        });
    };

    let refreshed = refreshed_label(
        state.with(|st| st.cache.fetched_at(&CacheResource::Analyses)),
        SystemTime::now(),
    );

    let body = match history() {
        None => rsx! { p { class: "text-muted small", "Loading saved analyses…" } },
        Some(None) => rsx! {
            p { class: "form-error", "No analysis store is available." }
        },
        Some(Some(Err(message))) => rsx! {
            p { class: "form-error", "Could not load saved analyses: {message}" }
        },
        Some(Some(Ok((analyses, analytics)))) => rsx! {
            AnalyticsCards { analytics }
            HistoryTable {
                analyses,
                on_open: on_open,
                on_delete: on_delete,
            }
        },
    };

    rsx! {
        div { class: "content",
            div { class: "panel-head",
                div {
                    h2 { class: "section-title", "Saved analyses" }
                    p { class: "text-muted small", "{refreshed}" }
                }
                button {
                    class: theme::BTN_SECONDARY,
                    onclick: move |_| reload += 1,
                    "Refresh"
                }
            }
            {body}
        }
    }
}

#[component]
fn AnalyticsCards(analytics: AnalysisAnalytics) -> Element {
    rsx! {
        div { class: "kpi-grid",
            KpiCard {
                title: "Saved".to_string(),
                value: analytics.count.to_string(),
                description: Some(format!("{} drones in total", analytics.total_units)),
            }
            KpiCard {
                title: "Avg cost per drone".to_string(),
                value: format_currency(analytics.avg_cost_per_drone),
                description: None,
            }
            KpiCard {
                title: "Avg profit per drone".to_string(),
                value: format_currency(analytics.avg_profit_per_drone),
                description: None,
                tone: theme::signed_text(analytics.avg_profit_per_drone),
            }
            KpiCard {
                title: "Avg advantage".to_string(),
                value: format_multiplier(analytics.avg_import_advantage),
                description: analytics.top_model.clone().map(|model| format!("Most saved: {model}")),
            }
        }
    }
}

#[component]
fn HistoryTable(
    analyses: Vec<StoredAnalysis>,
    on_open: EventHandler<StoredAnalysis>,
    on_delete: EventHandler<String>,
) -> Element {
    if analyses.is_empty() {
        return rsx! {
            p { class: "text-muted small", "Nothing saved yet. Use \"Save analysis\" on the dashboard." }
        };
    }

    rsx! {
        table { class: "table panel",
            thead {
                tr {
                    th { "Saved" }
                    th { "Model" }
                    th { class: "num", "Qty" }
                    th { class: "num", "Per drone" }
                    th { class: "num", "Profit" }
                    th { class: "num", "Advantage" }
                    th {}
                }
            }
            tbody {
                for analysis in analyses {
                    tr {
                        td { class: "text-muted", "{saved_label(&analysis)}" }
                        td { "{analysis.snapshot.drone_model} ({analysis.snapshot.condition})" }
                        td { class: "num", "{analysis.snapshot.quantity}" }
                        td { class: "num", "{format_currency(analysis.snapshot.cost_per_drone)}" }
                        td { class: "num {theme::signed_text(analysis.snapshot.total_profit)}", "{format_currency(analysis.snapshot.total_profit)}" }
                        td { class: "num", "{format_multiplier(analysis.snapshot.import_advantage)}" }
                        td { class: "actions",
                            button {
                                class: "btn btn-small",
                                onclick: {
                                    let analysis = analysis.clone();
                                    move |_| on_open.call(analysis.clone())
                                },
                                "Open"
                            }
                            button {
                                class: "btn btn-small btn-danger",
                                onclick: {
                                    let id = analysis.id.clone();
                                    move |_| on_delete.call(id.clone())
                                },
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn refreshed_label(fetched_at: Option<SystemTime>, now: SystemTime) -> String {
    let Some(fetched_at) = fetched_at else {
        return "Not loaded yet".to_string();
    };
    match now.duration_since(fetched_at) {
        Ok(elapsed) if elapsed.as_secs() >= 60 => {
            let minutes = u32::try_from(elapsed.as_secs() / 60).unwrap_or(u32::MAX);
            format!("Refreshed {} ago", format_duration(minutes))
        }
        _ => "Refreshed just now".to_string(),
    }
}

fn saved_label(analysis: &StoredAnalysis) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    analysis
        .snapshot
        .created_at
        .format(&format)
        .unwrap_or_else(|_| analysis.snapshot.created_at.to_string())
}
