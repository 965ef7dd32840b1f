use std::sync::Arc;

use dioxus::{prelude::*, signals::Signal};

use drone_import_dashboard::{
    config::AppConfig,
    domain::{AppState, CacheResource, ImportReport},
    infra::{
        ebay::{CacheStatus, EbayClient, EbayClientError},
        listings::{ListingOptions, ListingSearch, ModelPricingUpdate},
        store::AnalysisStore,
    },
    util::persistence::{load_persisted_state, save_persisted_state},
};

use crate::ui::{
    assets,
    components::toast::{push_toast, Toast, ToastKind, ToastMessage},
    pages::{AnalysisPage, DashboardPage, HistoryPage, MarketPage},
    shell::Shell,
};

/// Saved analyses shown per History page load.
pub const HISTORY_PAGE_SIZE: usize = 25;

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Dashboard {},
    #[route("/analysis")]
    Analysis {},
    #[route("/market")]
    Market {},
    #[route("/history")]
    History {},
}

/// Network collaborators, each optional so the dashboard still works offline.
#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub ebay: Option<EbayClient>,
    pub store: Option<Arc<AnalysisStore>>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Self {
        let ebay = match EbayClient::new(config) {
            Ok(client) => Some(client),
            Err(EbayClientError::NotConfigured) => None,
            Err(err) => {
                log::error!("eBay client unavailable: {err}");
                None
            }
        };
        let store = match AnalysisStore::from_config(config) {
            Ok(store) => Some(Arc::new(store)),
            Err(err) => {
                log::error!("analysis store unavailable: {err}");
                None
            }
        };
        Self {
            config: config.clone(),
            ebay,
            store,
        }
    }
}

/// Latest listings shown on the Market page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketState {
    pub model: Option<String>,
    pub search: Option<ListingSearch>,
    pub status: Option<CacheStatus>,
    pub loading: bool,
}

#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let services = use_hook(|| Services::from_config(&config));
    use_context_provider(|| services.clone());

    let state = use_signal(AppState::default);
    use_hook({
        let mut state = state.clone();
        move || {
            if let Some(saved) = load_persisted_state() {
                log::info!("restored inputs for {}", saved.specs.model);
                state.with_mut(|st| st.apply_persisted(saved));
            }
        }
    });
    use_context_provider(|| state.clone());

    let report = use_memo(move || state.with(|st| ImportReport::build(&st.params, &st.specs)));
    use_context_provider(|| report);

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    let market = use_signal(MarketState::default);
    use_context_provider(|| market.clone());

    // Listings fetch trigger shared across routes.
    let listing_request = use_signal(|| None::<String>);
    use_context_provider(|| listing_request.clone());

    let _listings = use_resource({
        let services = services.clone();
        move || {
            let services = services.clone();
            async move {
                fetch_listings(services, state.clone(), market.clone(), listing_request.clone(), toasts.clone())
                    .await
            }
        }
    });

    rsx! {
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        log::warn!("failed to persist user state: {err}");
    }
}

async fn fetch_listings(
    services: Services,
    mut state: Signal<AppState>,
    mut market: Signal<MarketState>,
    mut listing_request: Signal<Option<String>>,
    toasts: Signal<Vec<ToastMessage>>,
) -> Option<CacheStatus> {
    let requested = listing_request();
    let Some(model) = requested else {
        log::debug!("no model queued for a listings fetch");
        return None;
    };

    let Some(client) = services.ebay.clone() else {
        listing_request.set(None);
        push_toast(
            toasts,
            ToastKind::Warning,
            "eBay credentials are not configured; live listings are disabled.",
        );
        return None;
    };

    let condition = state.with(|st| st.specs.condition);
    market.with_mut(|m| m.loading = true);
    log::info!("fetching eBay listings for {model} ({condition})");

    let result = client
        .search_listings(&model, &ListingOptions::for_condition(condition))
        .await;
    listing_request.set(None);

    match result {
        Ok(payload) => {
            state.with_mut(|st| {
                st.cache
                    .record_fetch(CacheResource::Listings(model.clone()), payload.fetched_at)
            });
            match payload.status {
                CacheStatus::Stale => push_toast(
                    toasts,
                    ToastKind::Warning,
                    "eBay unreachable; showing cached listings that might be stale.",
                ),
                CacheStatus::Cached => push_toast(
                    toasts,
                    ToastKind::Info,
                    format!("Listings for {model} served from cache."),
                ),
                CacheStatus::Fresh => {
                    if let Some(store) = services.store.clone() {
                        record_pricing(&store, &model, &payload.data).await;
                    }
                }
            }

            let status = payload.status.clone();
            market.set(MarketState {
                model: Some(model),
                search: Some(payload.data),
                status: Some(payload.status),
                loading: false,
            });
            Some(status)
        }
        Err(err) => {
            market.with_mut(|m| m.loading = false);
            log::error!("eBay search for {model} failed: {err}");
            push_toast(
                toasts,
                ToastKind::Error,
                format!("Failed to load listings: {err}"),
            );
            None
        }
    }
}

async fn record_pricing(store: &AnalysisStore, model: &str, search: &ListingSearch) {
    let update = match ModelPricingUpdate::from_search(model, search) {
        Ok(Some(update)) => update,
        Ok(None) => return,
        Err(err) => {
            log::warn!("could not encode pricing for {model}: {err}");
            return;
        }
    };
    if let Err(err) = store.record_model_pricing(&update).await {
        log::warn!("could not record eBay pricing for {model}: {err}");
    }
}

#[component]
pub fn Dashboard() -> Element {
    rsx! { Shell { DashboardPage {} } }
}

#[component]
pub fn Analysis() -> Element {
    rsx! { Shell { AnalysisPage {} } }
}

#[component]
pub fn Market() -> Element {
    rsx! { Shell { MarketPage {} } }
}

#[component]
pub fn History() -> Element {
    rsx! { Shell { HistoryPage {} } }
}
