use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::catalog::{Category, ModelRecord};
use super::entities::{CostBreakdown, DroneSpec, TradeParameters};

/// Flattened record of one saved analysis. Column names match the
/// `drone_analyses` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub drone_model: String,
    pub condition: String,
    pub purchase_price: f64,
    pub quantity: u32,
    pub total_cost_usd: f64,
    pub total_cost_ars: f64,
    pub cost_per_drone: f64,
    pub profit_per_drone: f64,
    pub total_profit: f64,
    pub import_advantage: f64,
    pub exchange_rate: f64,
    pub target_margin: f64,
    pub freight_multiplier: f64,
    pub challenge_multiplier: f64,
    /// Full inputs and breakdown, kept so an analysis can be reopened later.
    pub analysis_data: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Serialize)]
struct AnalysisData<'a> {
    params: &'a TradeParameters,
    specs: &'a DroneSpec,
    costs: &'a CostBreakdown,
}

impl AnalysisSnapshot {
    pub fn from_breakdown(
        params: &TradeParameters,
        specs: &DroneSpec,
        costs: &CostBreakdown,
        created_at: OffsetDateTime,
    ) -> Result<Self, serde_json::Error> {
        let analysis_data = serde_json::to_value(AnalysisData {
            params,
            specs,
            costs,
        })?;

        Ok(Self {
            drone_model: specs.model.clone(),
            condition: specs.condition.to_string(),
            purchase_price: costs.base_price,
            quantity: params.quantity,
            total_cost_usd: costs.total_ddp_usd,
            total_cost_ars: costs.total_ddp_ars,
            cost_per_drone: costs.cost_per_drone,
            profit_per_drone: costs.profit_per_drone,
            total_profit: costs.total_profit,
            import_advantage: costs.import_advantage_calculated,
            exchange_rate: params.exchange_rate,
            target_margin: params.target_margin,
            freight_multiplier: costs.freight_multiplier,
            challenge_multiplier: costs.challenge_multiplier,
            analysis_data,
            created_at,
        })
    }

    /// First numeric column holding NaN or an infinity. JSON has no encoding
    /// for those, so such a row cannot be stored and read back.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("purchase_price", self.purchase_price),
            ("total_cost_usd", self.total_cost_usd),
            ("total_cost_ars", self.total_cost_ars),
            ("cost_per_drone", self.cost_per_drone),
            ("profit_per_drone", self.profit_per_drone),
            ("total_profit", self.total_profit),
            ("import_advantage", self.import_advantage),
            ("exchange_rate", self.exchange_rate),
            ("target_margin", self.target_margin),
            ("freight_multiplier", self.freight_multiplier),
            ("challenge_multiplier", self.challenge_multiplier),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(field, _)| field)
    }

    /// Inputs stored alongside the snapshot, when they are still readable.
    pub fn inputs(&self) -> Option<(TradeParameters, DroneSpec)> {
        #[derive(Deserialize)]
        struct Inputs {
            params: TradeParameters,
            specs: DroneSpec,
        }

        serde_json::from_value::<Inputs>(self.analysis_data.clone())
            .ok()
            .map(|inputs| (inputs.params, inputs.specs))
    }
}

/// Saved analysis with the identifier assigned by its store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    #[serde(flatten)]
    pub snapshot: AnalysisSnapshot,
}

// PostgREST returns bigint keys as numbers; local ids are uuids.
fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Row of the `drone_models` table. Catalog columns may be empty on rows
/// that so far only carry eBay pricing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroneModelRow {
    pub model_name: String,
    pub category: Option<Category>,
    pub new_price: Option<f64>,
    pub used_price_min: Option<f64>,
    pub used_price_max: Option<f64>,
    pub camera_type: Option<String>,
    pub battery_life: Option<u32>,
    pub use_case: Option<String>,
    pub depreciation: Option<f64>,
    pub argentina_price_ars: Option<f64>,
    #[serde(default)]
    pub challenges: Option<Vec<String>>,
    pub import_advantage: Option<f64>,
    #[serde(default)]
    pub model_data: serde_json::Value,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    // Pricing columns are written by the eBay pricing upsert only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebay_new_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebay_used_price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebay_used_price_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebay_listings_count: Option<u64>,
}

impl DroneModelRow {
    pub fn from_record(
        record: &ModelRecord,
        updated_at: OffsetDateTime,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            model_name: record.name.clone(),
            category: Some(record.category),
            new_price: Some(record.new_price),
            used_price_min: Some(record.used_range.0),
            used_price_max: Some(record.used_range.1),
            camera_type: Some(record.camera.clone()),
            battery_life: Some(record.battery_life),
            use_case: Some(record.use_case.clone()),
            depreciation: Some(record.depreciation),
            argentina_price_ars: Some(record.argentine_price_ars),
            challenges: Some(record.challenges.clone()),
            import_advantage: Some(record.import_advantage),
            model_data: serde_json::to_value(record)?,
            updated_at: Some(updated_at),
            ebay_new_price: None,
            ebay_used_price_min: None,
            ebay_used_price_max: None,
            ebay_listings_count: None,
        })
    }
}

/// Aggregate view over recent saved analyses.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalysisAnalytics {
    pub count: usize,
    pub avg_cost_per_drone: f64,
    pub avg_profit_per_drone: f64,
    pub avg_import_advantage: f64,
    pub total_units: u64,
    /// Most frequently saved model; earliest in the list wins ties.
    pub top_model: Option<String>,
}

impl AnalysisAnalytics {
    pub fn from_analyses(analyses: &[StoredAnalysis]) -> Self {
        if analyses.is_empty() {
            return Self::default();
        }
        let count = analyses.len();
        let avg = |f: fn(&AnalysisSnapshot) -> f64| {
            analyses.iter().map(|a| f(&a.snapshot)).sum::<f64>() / count as f64
        };

        let mut tally: Vec<(&str, usize)> = Vec::new();
        for analysis in analyses {
            let name = analysis.snapshot.drone_model.as_str();
            match tally.iter_mut().find(|(model, _)| *model == name) {
                Some((_, seen)) => *seen += 1,
                None => tally.push((name, 1)),
            }
        }
        let top_model = tally
            .iter()
            .fold(None::<(&str, usize)>, |best, &(model, seen)| match best {
                Some((_, best_seen)) if seen <= best_seen => best,
                _ => Some((model, seen)),
            })
            .map(|(model, _)| model.to_string());

        Self {
            count,
            avg_cost_per_drone: avg(|s| s.cost_per_drone),
            avg_profit_per_drone: avg(|s| s.profit_per_drone),
            avg_import_advantage: avg(|s| s.import_advantage),
            total_units: analyses.iter().map(|a| a.snapshot.quantity as u64).sum(),
            top_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compute_costs;
    use time::macros::datetime;

    fn snapshot(model: &str, quantity: u32) -> AnalysisSnapshot {
        let params = TradeParameters {
            quantity,
            ..TradeParameters::default()
        };
        let specs = DroneSpec {
            model: model.to_string(),
            ..DroneSpec::default()
        };
        let costs = compute_costs(&params, &specs);
        AnalysisSnapshot::from_breakdown(&params, &specs, &costs, datetime!(2025-03-01 12:00 UTC))
            .unwrap()
    }

    #[test]
    fn snapshot_flattens_breakdown() {
        let params = TradeParameters::default();
        let specs = DroneSpec::default();
        let costs = compute_costs(&params, &specs);
        let snap =
            AnalysisSnapshot::from_breakdown(&params, &specs, &costs, datetime!(2025-03-01 12:00 UTC))
                .unwrap();

        assert_eq!(snap.drone_model, "DJI Phantom Standard");
        assert_eq!(snap.condition, "Used");
        assert_eq!(snap.purchase_price, 325.0);
        assert_eq!(snap.quantity, 2);
        assert_eq!(snap.total_cost_usd, costs.total_ddp_usd);
        assert_eq!(snap.import_advantage, costs.import_advantage_calculated);
        assert_eq!(snap.analysis_data["costs"]["adp_fee"], 1000.0);
        assert_eq!(snap.inputs(), Some((params, specs)));
    }

    #[test]
    fn created_at_serializes_as_rfc3339() {
        let snap = snapshot("DJI Neo", 1);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["created_at"], "2025-03-01T12:00:00Z");

        let back: AnalysisSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.created_at, snap.created_at);
    }

    #[test]
    fn stored_analysis_flattens_id_next_to_columns() {
        let stored = StoredAnalysis {
            id: "42".to_string(),
            snapshot: snapshot("DJI Neo", 1),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], "42");
        assert_eq!(json["drone_model"], "DJI Neo");

        let mut remote = json.clone();
        remote["id"] = serde_json::json!(7);
        let back: StoredAnalysis = serde_json::from_value(remote).unwrap();
        assert_eq!(back.id, "7");
        assert_eq!(back.snapshot, stored.snapshot);
    }

    #[test]
    fn analytics_average_and_pick_most_saved_model() {
        let analyses: Vec<StoredAnalysis> = [
            ("DJI Neo", 1),
            ("DJI Air 3S", 2),
            ("DJI Air 3S", 3),
            ("DJI Neo", 4),
        ]
        .into_iter()
        .enumerate()
        .map(|(idx, (model, qty))| StoredAnalysis {
            id: idx.to_string(),
            snapshot: snapshot(model, qty),
        })
        .collect();

        let analytics = AnalysisAnalytics::from_analyses(&analyses);
        assert_eq!(analytics.count, 4);
        assert_eq!(analytics.total_units, 10);
        assert_eq!(analytics.top_model.as_deref(), Some("DJI Neo"));

        let expected = analyses
            .iter()
            .map(|a| a.snapshot.cost_per_drone)
            .sum::<f64>()
            / 4.0;
        assert_eq!(analytics.avg_cost_per_drone, expected);
    }

    #[test]
    fn zero_exchange_rate_yields_non_finite_snapshot() {
        let params = TradeParameters {
            exchange_rate: 0.0,
            ..TradeParameters::default()
        };
        let specs = DroneSpec::default();
        let costs = compute_costs(&params, &specs);
        let snap =
            AnalysisSnapshot::from_breakdown(&params, &specs, &costs, datetime!(2025-03-01 12:00 UTC))
                .unwrap();
        assert_eq!(snap.non_finite_field(), Some("import_advantage"));

        // serde_json writes infinities as null, which the f64 columns refuse on read.
        let json = serde_json::to_string(&snap).unwrap();
        assert!(serde_json::from_str::<AnalysisSnapshot>(&json).is_err());

        assert_eq!(snapshot("DJI Neo", 2).non_finite_field(), None);
    }

    #[test]
    fn model_row_mirrors_catalog_record() {
        let record = crate::domain::catalog().model_or_default("DJI Agras T30");
        let row = DroneModelRow::from_record(record, datetime!(2025-03-01 12:00 UTC)).unwrap();
        assert_eq!(row.model_name, "DJI Agras T30");
        assert_eq!(row.category, Some(Category::Agricultural));
        assert_eq!(row.used_price_min, Some(11000.0));
        assert_eq!(row.used_price_max, Some(13000.0));
        assert_eq!(row.model_data["name"], "DJI Agras T30");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["updated_at"], "2025-03-01T12:00:00Z");
        assert_eq!(json["argentina_price_ars"], record.argentine_price_ars);
        assert!(json.get("ebay_new_price").is_none());
    }

    #[test]
    fn pricing_only_model_row_reads_with_empty_catalog_columns() {
        let row: DroneModelRow = serde_json::from_value(serde_json::json!({
            "id": 3,
            "model_name": "DJI Neo",
            "category": null,
            "ebay_new_price": 199.0,
            "ebay_listings_count": 12,
            "updated_at": "2025-03-01T12:00:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(row.category, None);
        assert_eq!(row.challenges, None);
        assert_eq!(row.ebay_new_price, Some(199.0));
        assert_eq!(row.ebay_listings_count, Some(12));
        assert!(row.updated_at.is_some());
    }

    #[test]
    fn analytics_of_nothing_is_empty() {
        assert_eq!(AnalysisAnalytics::from_analyses(&[]), AnalysisAnalytics::default());
    }
}
