use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{catalog, AppState, Category, Condition, PriceOverride, TradeParameters},
    util::format::format_currency,
};

use crate::app::persist_user_state;
use crate::ui::theme;

/// Sidebar with every engine input. Changes apply immediately.
#[component]
pub fn ParamForm(base_price: f64) -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let (params, specs) = state.with(|st| (st.params.clone(), st.specs.clone()));
    let validation = params.validate().err().map(|err| err.to_string());

    let override_text = match specs.price_override {
        PriceOverride::Manual(price) => price.to_string(),
        PriceOverride::Default => String::new(),
    };
    let price_placeholder = format!("Catalog: {}", format_currency(base_price));
    let condition = specs.condition;

    rsx! {
        aside { class: "panel form",
            h2 { class: "section-title", "Drone" }

            label { class: "field",
                span { class: "label", "Model" }
                select {
                    class: "input",
                    onchange: move |evt| {
                        state.with_mut(|st| st.select_model(&evt.value()));
                        persist_user_state(&state);
                    },
                    for category in Category::ALL {
                        optgroup { label: "{category}",
                            for model in catalog().models_in(category) {
                                option {
                                    value: "{model.name}",
                                    selected: model.name == specs.model,
                                    "{model.name}"
                                }
                            }
                        }
                    }
                }
            }

            div { class: "field",
                span { class: "label", "Condition" }
                div { class: "toggle-row",
                    for choice in [Condition::Used, Condition::New] {
                        button {
                            class: theme::toggle_button(condition == choice),
                            onclick: move |_| {
                                state.with_mut(|st| st.specs.condition = choice);
                                persist_user_state(&state);
                            },
                            "{choice}"
                        }
                    }
                }
            }

            label { class: "field",
                span { class: "label", "Camera" }
                select {
                    class: "input",
                    onchange: move |evt| {
                        state.with_mut(|st| st.specs.camera_type = evt.value());
                        persist_user_state(&state);
                    },
                    for camera in catalog().cameras() {
                        option {
                            value: "{camera.name}",
                            selected: camera.name == specs.camera_type,
                            "{camera.name} (+{format_currency(camera.cost)})"
                        }
                    }
                }
            }

            label { class: "field",
                span { class: "label", "Purchase price override (USD)" }
                input {
                    class: "input",
                    r#type: "number",
                    min: "0",
                    placeholder: "{price_placeholder}",
                    value: "{override_text}",
                    oninput: move |evt| {
                        let parsed = evt.value().trim().parse::<f64>().ok();
                        state.with_mut(|st| st.specs.price_override = PriceOverride::from_input(parsed));
                        persist_user_state(&state);
                    },
                }
            }

            h2 { class: "section-title", "Shipment" }

            label { class: "field",
                span { class: "label", "Quantity" }
                input {
                    class: "input",
                    r#type: "number",
                    min: "1",
                    value: "{params.quantity}",
                    oninput: move |evt| {
                        if let Ok(quantity) = evt.value().trim().parse::<u32>() {
                            state.with_mut(|st| st.params.quantity = quantity.max(1));
                            persist_user_state(&state);
                        }
                    },
                }
            }

            NumberField { label: "Freight (USD)", value: params.freight, on_change: move |v| update_params(state, |p| p.freight = v) }
            NumberField { label: "Insurance (USD)", value: params.insurance, on_change: move |v| update_params(state, |p| p.insurance = v) }
            NumberField { label: "Battery upgrade (USD / unit)", value: params.battery_upgrade, on_change: move |v| update_params(state, |p| p.battery_upgrade = v) }
            NumberField { label: "Case upgrade (USD / unit)", value: params.case_upgrade, on_change: move |v| update_params(state, |p| p.case_upgrade = v) }
            NumberField { label: "Inland cost (USD / unit)", value: params.inland_cost, on_change: move |v| update_params(state, |p| p.inland_cost = v) }

            h2 { class: "section-title", "Market" }

            NumberField { label: "Exchange rate (ARS / USD)", value: params.exchange_rate, on_change: move |v| update_params(state, |p| p.exchange_rate = v) }
            NumberField { label: "Target margin (%)", value: params.target_margin, on_change: move |v| update_params(state, |p| p.target_margin = v) }

            if let Some(message) = validation {
                p { class: "form-error", "{message}" }
            }
        }
    }
}

fn update_params(mut state: Signal<AppState>, apply: impl FnOnce(&mut TradeParameters)) {
    state.with_mut(|st| apply(&mut st.params));
    persist_user_state(&state);
}

#[component]
fn NumberField(label: &'static str, value: f64, on_change: EventHandler<f64>) -> Element {
    rsx! {
        label { class: "field",
            span { class: "label", "{label}" }
            input {
                class: "input",
                r#type: "number",
                min: "0",
                step: "any",
                value: "{value}",
                oninput: move |evt| {
                    match evt.value().trim().parse::<f64>() {
                        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => on_change.call(parsed),
                        _ => log::debug!("ignoring invalid {label} input"),
                    }
                },
            }
        }
    }
}
