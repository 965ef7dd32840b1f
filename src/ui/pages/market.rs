use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{catalog, AppState, CacheResource, DroneModelRow, ImportReport, PriceOverride},
    infra::ebay::CacheStatus,
    util::format::{format_currency, format_duration},
};

use crate::{
    app::{persist_user_state, MarketState, Services},
    ui::{
        components::{
            listing_table::ListingTable,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn MarketPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let report = use_context::<Memo<ImportReport>>();
    let services = use_context::<Services>();
    let market = use_context::<Signal<MarketState>>();
    let mut listing_request = use_context::<Signal<Option<String>>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let (model, condition) = state.with(|st| (st.specs.model.clone(), st.specs.condition));
    let base_price = report.with(|r| r.costs.base_price);
    let ttl = services.config.listings_cache_ttl;
    let ttl_minutes = (ttl.as_secs() / 60) as u32;
    let stale = state.with(|st| st.is_stale(&CacheResource::Listings(model.clone()), ttl));
    let view = market();
    let enabled = services.ebay.is_some();

    // Only show results that belong to the selected model.
    let search = view
        .search
        .clone()
        .filter(|_| view.model.as_deref() == Some(model.as_str()));
    let hint = search.as_ref().and_then(|s| s.price_hint(condition));
    let hint_label = hint.map(format_currency).unwrap_or_else(|| "—".to_string());
    let status_label = match (&search, &view.status) {
        (None, _) => "not fetched",
        (Some(_), Some(CacheStatus::Stale)) => "stale cache",
        (Some(_), Some(CacheStatus::Cached)) => "cached",
        (Some(_), _) if stale => "expired",
        (Some(_), _) => "fresh",
    };

    let on_fetch = {
        let model = model.clone();
        move |_| {
            if market.with(|m| m.loading) {
                return;
            }
            listing_request.set(Some(model.clone()));
        }
    };

    let on_clear = {
        let client = services.ebay.clone();
        move |_| {
            let Some(client) = client.clone() else {
                return;
            };
            state.with_mut(|st| st.cache.clear());
            spawn(async move {
                client.clear_cache().await;
                let stats = client.usage_stats().await;
                log::info!(
                    "listings cache cleared after {} eBay requests",
                    stats.request_count
                );
                push_toast(toasts, ToastKind::Info, "Listings cache cleared.");
            });
        }
    };

    let on_use_hint = move |_| {
        let Some(price) = hint else {
            return;
        };
        state.with_mut(|st| st.specs.price_override = PriceOverride::Manual(price));
        persist_user_state(&state);
        push_toast(
            toasts,
            ToastKind::Success,
            format!("Purchase price set to {} from eBay listings.", format_currency(price)),
        );
    };

    rsx! {
        div { class: "content",
            div { class: "panel",
                div { class: "panel-head",
                    div {
                        h2 { class: "section-title", "eBay market for {model}" }
                        p { class: "text-muted small",
                            "{condition} listings · status: {status_label} · cache TTL {format_duration(ttl_minutes)}"
                        }
                    }
                    div { class: "toggle-row",
                        button {
                            class: theme::BTN_PRIMARY,
                            disabled: !enabled || view.loading,
                            onclick: on_fetch,
                            if view.loading { "Searching…" } else { "Fetch listings" }
                        }
                        button {
                            class: theme::BTN_SECONDARY,
                            disabled: !enabled,
                            onclick: on_clear,
                            "Clear cache"
                        }
                    }
                }

                if !enabled {
                    p { class: "form-error",
                        "Set EBAY_APP_ID and EBAY_CERT_ID to enable live listings."
                    }
                }

                div { class: "stat-grid",
                    div { class: "stat",
                        p { class: "label", "Price in use" }
                        p { class: "stat-value", "{format_currency(base_price)}" }
                    }
                    div { class: "stat",
                        p { class: "label", "Market hint ({condition})" }
                        p { class: "stat-value", "{hint_label}" }
                        button {
                            class: "btn btn-small",
                            disabled: hint.is_none(),
                            onclick: on_use_hint,
                            "Use as purchase price"
                        }
                    }
                }
            }

            if let Some(search) = search {
                ListingTable { search }
            }

            CatalogEntryPanel { model: model.clone() }
        }
    }
}

/// Shows the stored `drone_models` row for the selected model and lets the
/// user publish the built-in catalog entry.
#[component]
fn CatalogEntryPanel(model: String) -> Element {
    let services = use_context::<Services>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let mut reload = use_signal(|| 0_u32);
    let mut saving = use_signal(|| false);

    let store = services.store.clone();
    let rows = use_resource(move || {
        let store = store.clone();
        let _generation = reload();
        async move {
            let store = store?;
            Some(store.list_drone_models().await.map_err(|err| {
                log::warn!("loading stored model rows failed: {err}");
                err.to_string()
            }))
        }
    });

    let Some(store) = services.store.clone() else {
        return rsx! {};
    };
    let store_label = store.label();

    let on_save = {
        let model = model.clone();
        move |_| {
            let Some(record) = catalog().model(&model).cloned() else {
                push_toast(toasts, ToastKind::Warning, format!("{model} is not in the catalog."));
                return;
            };
            let store = store.clone();
            saving.set(true);
            spawn(async move {
                match store.save_drone_model(&record).await {
                    Ok(row) => {
                        push_toast(
                            toasts,
                            ToastKind::Success,
                            format!("Catalog entry for {} saved.", row.model_name),
                        );
                        reload += 1;
                    }
                    Err(err) => push_toast(
                        toasts,
                        ToastKind::Error,
                        format!("Failed to save catalog entry: {err}"),
                    ),
                }
                saving.set(false);
            });
        }
    };

    let summary = match rows() {
        None | Some(None) => "Loading stored catalog rows…".to_string(),
        Some(Some(Err(message))) => format!("Could not load stored rows: {message}"),
        Some(Some(Ok(rows))) => stored_row_summary(&rows, &model),
    };

    rsx! {
        div { class: "panel",
            div { class: "panel-head",
                div {
                    h2 { class: "section-title", "Catalog entry" }
                    p { class: "text-muted small", "Stored in {store_label}" }
                }
                button {
                    class: theme::BTN_SECONDARY,
                    disabled: saving(),
                    onclick: on_save,
                    if saving() { "Saving…" } else { "Save catalog entry" }
                }
            }
            p { class: "small", "{summary}" }
        }
    }
}

fn stored_row_summary(rows: &[DroneModelRow], model: &str) -> String {
    let Some(row) = rows.iter().find(|row| row.model_name == model) else {
        return format!("{model} has no stored row yet ({} models stored).", rows.len());
    };

    let mut parts = Vec::new();
    if let Some(price) = row.new_price {
        parts.push(format!("list {}", format_currency(price)));
    }
    if let (Some(min), Some(max)) = (row.used_price_min, row.used_price_max) {
        parts.push(format!("used {} - {}", format_currency(min), format_currency(max)));
    }
    if let Some(price) = row.ebay_new_price {
        parts.push(format!("eBay new avg {}", format_currency(price)));
    }
    if let Some(count) = row.ebay_listings_count {
        parts.push(format!("{count} eBay listings"));
    }
    if parts.is_empty() {
        format!("{model} is stored without pricing.")
    } else {
        format!("{model}: {}", parts.join(" · "))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn stored_row_summary_prefers_matching_model() {
        assert_eq!(
            stored_row_summary(&[], "DJI Neo"),
            "DJI Neo has no stored row yet (0 models stored)."
        );

        let record = catalog().model_or_default("DJI Neo");
        let mut row = DroneModelRow::from_record(record, datetime!(2025-03-01 12:00 UTC)).unwrap();
        row.ebay_listings_count = Some(12);
        assert_eq!(
            stored_row_summary(&[row], "DJI Neo"),
            "DJI Neo: list $159 · used $80 - $120 · 12 eBay listings"
        );
    }
}
