use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{AppState, ImportReport},
    util::{
        format::format_currency,
        version::{version_label, APP_NAME},
    },
};

use crate::app::{Route, Services};
use crate::ui::theme;

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let report = use_context::<Memo<ImportReport>>();
    let services = use_context::<Services>();

    let current_route = use_route::<Route>();
    let nav = use_navigator();

    let (model, condition) = state.with(|s| (s.specs.model.clone(), s.specs.condition));
    let (cost_per_drone, risk) = report.with(|r| (r.costs.cost_per_drone, r.risk.level));
    let store_label = services
        .store
        .as_ref()
        .map(|store| store.label())
        .unwrap_or("not available");

    rsx! {
        div { class: "app",
            header { class: "app-header",
                div { class: "header-grid",
                    div {
                        h1 { class: "app-title", "{APP_NAME}" }
                        p { class: "text-muted small", "US → Argentina landed cost" }
                    }

                    div { class: "header-summary",
                        span { class: "text-strong", "{model}" }
                        span { class: "text-muted", " · {condition} · " }
                        span { "{format_currency(cost_per_drone)} / unit " }
                        span { class: theme::risk_badge(risk), "{risk} risk" }
                    }

                    nav { class: "nav",
                        NavButton { active: matches!(current_route, Route::Dashboard {}), onclick: move |_| { nav.push(Route::Dashboard {}); }, label: "Dashboard" }
                        NavButton { active: matches!(current_route, Route::Analysis {}), onclick: move |_| { nav.push(Route::Analysis {}); }, label: "Analysis" }
                        NavButton { active: matches!(current_route, Route::Market {}), onclick: move |_| { nav.push(Route::Market {}); }, label: "Market" }
                        NavButton { active: matches!(current_route, Route::History {}), onclick: move |_| { nav.push(Route::History {}); }, label: "History" }
                    }
                }
            }
            main { class: "app-main",
                {children}
            }
            footer { class: "app-footer text-muted small",
                "{version_label()} · analyses stored in {store_label}"
            }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::nav_button(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
