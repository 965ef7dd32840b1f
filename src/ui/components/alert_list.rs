use dioxus::prelude::*;

use drone_import_dashboard::domain::Alert;

use crate::ui::theme;

#[component]
pub fn AlertList(alerts: Vec<Alert>) -> Element {
    if alerts.is_empty() {
        return rsx! {
            p { class: "text-muted small", "No alerts for the current inputs." }
        };
    }

    rsx! {
        ul { class: "alert-list",
            for alert in alerts {
                li { class: theme::alert_class(alert.level),
                    span { "{theme::alert_icon(alert.level)}" }
                    span { class: "alert-message", "{alert.message}" }
                    span { class: "alert-value", "{alert.value}" }
                }
            }
        }
    }
}
