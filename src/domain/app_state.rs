use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};

use super::entities::{DroneSpec, TradeParameters};

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub params: TradeParameters,
    pub specs: DroneSpec,
    pub cache: CacheTimestamps,
}

impl AppState {
    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.cache.is_stale(resource, ttl)
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.params = persisted.params;
        self.specs = persisted.specs;
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            params: self.params.clone(),
            specs: self.specs.clone(),
        }
    }

    /// Selects another model and drops any manual price entered for the old one.
    pub fn select_model(&mut self, model: &str) {
        if self.specs.model != model {
            self.specs.model = model.to_string();
            self.specs.price_override = Default::default();
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CacheTimestamps {
    entries: HashMap<CacheResource, SystemTime>,
}

impl CacheTimestamps {
    pub fn record_fetch(&mut self, resource: CacheResource, fetched_at: SystemTime) {
        self.entries.insert(resource, fetched_at);
    }

    pub fn fetched_at(&self, resource: &CacheResource) -> Option<SystemTime> {
        self.entries.get(resource).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.fetched_at(resource)
            .map(|time| time.elapsed().map(|elapsed| elapsed > ttl).unwrap_or(true))
            .unwrap_or(true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheResource {
    Listings(String),
    Analyses,
}

/// Inputs restored on the next launch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub params: TradeParameters,
    #[serde(default)]
    pub specs: DroneSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceOverride;

    #[test]
    fn unseen_resources_are_stale() {
        let state = AppState::default();
        assert!(state.is_stale(&CacheResource::Analyses, Duration::from_secs(60)));
    }

    #[test]
    fn fresh_fetch_is_not_stale() {
        let mut state = AppState::default();
        let resource = CacheResource::Listings("DJI Neo".to_string());
        state.cache.record_fetch(resource.clone(), SystemTime::now());
        assert!(!state.is_stale(&resource, Duration::from_secs(300)));

        state.cache.clear();
        assert!(state.is_stale(&resource, Duration::from_secs(300)));
    }

    #[test]
    fn switching_model_clears_manual_price() {
        let mut state = AppState::default();
        state.specs.price_override = PriceOverride::Manual(300.0);
        state.select_model(&state.specs.model.clone());
        assert_eq!(state.specs.price_override, PriceOverride::Manual(300.0));

        state.select_model("DJI Air 3S");
        assert_eq!(state.specs.model, "DJI Air 3S");
        assert_eq!(state.specs.price_override, PriceOverride::Default);
    }

    #[test]
    fn persisted_round_trip_restores_inputs() {
        let mut state = AppState::default();
        state.params.quantity = 6;
        state.specs.camera_type = "4K Standard".to_string();

        let mut restored = AppState::default();
        restored.apply_persisted(state.to_persisted());
        assert_eq!(restored.params, state.params);
        assert_eq!(restored.specs, state.specs);
    }

    #[test]
    fn partial_persisted_json_falls_back_to_defaults() {
        let persisted: PersistedState = serde_json::from_str("{}").unwrap();
        assert_eq!(persisted, PersistedState::default());
    }
}
