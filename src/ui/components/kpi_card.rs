use dioxus::prelude::*;

#[component]
pub fn KpiCard(
    title: String,
    value: String,
    description: Option<String>,
    #[props(default = "")] tone: &'static str,
) -> Element {
    rsx! {
        div {
            class: "panel kpi",
            h3 { class: "label", "{title}" }
            p { class: "kpi-value {tone}", "{value}" }
            if let Some(desc) = description {
                p { class: "text-muted small", "{desc}" }
            }
        }
    }
}
