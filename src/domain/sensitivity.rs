//! What-if sweeps over the cost engine: price ranges, per-category
//! comparison and the tornado diagram.

use serde::Serialize;

use super::catalog::{catalog, Category, ModelRecord, SENSITIVITY_RANGES};
use super::engine::compute_costs;
use super::entities::{Condition, CostBreakdown, DroneSpec, PriceOverride, TradeParameters};
use crate::util::format::format_number;

/// Number of intervals in a price sweep; the sweep yields one more point.
pub const PRICE_STEPS: usize = 10;
/// Spread applied around the list price when sweeping new units.
pub const NEW_PRICE_VARIATION: f64 = 0.20;
/// Relative swing applied to the challenge multiplier in the tornado.
pub const CHALLENGE_VARIATION: f64 = 0.20;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRangePoint {
    pub drone_price: f64,
    pub total_cost_usd: f64,
    pub total_cost_ars: f64,
    pub cost_per_drone: f64,
    pub cost_per_drone_with_margin: f64,
    pub import_savings: f64,
    pub advantage_ratio: f64,
}

/// Purchase price interval swept for a given condition.
pub fn price_bounds(model: &ModelRecord, condition: Condition) -> (f64, f64) {
    match condition {
        Condition::Used => model.used_range,
        Condition::New => (
            model.new_price * (1.0 - NEW_PRICE_VARIATION),
            model.new_price * (1.0 + NEW_PRICE_VARIATION),
        ),
    }
}

pub fn price_range_analysis(params: &TradeParameters, specs: &DroneSpec) -> Vec<PriceRangePoint> {
    let model = catalog().model_or_default(&specs.model);
    let (low, high) = price_bounds(model, specs.condition);
    let step = (high - low) / PRICE_STEPS as f64;

    (0..=PRICE_STEPS)
        .map(|idx| {
            let price = low + step * idx as f64;
            let result = compute_costs(params, &specs.with_price(price));
            PriceRangePoint {
                drone_price: price,
                total_cost_usd: result.total_ddp_usd,
                total_cost_ars: result.total_ddp_ars,
                cost_per_drone: result.cost_per_drone,
                cost_per_drone_with_margin: result.cost_per_drone_with_margin,
                import_savings: result.import_savings,
                advantage_ratio: result.import_advantage_calculated,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelSensitivity {
    pub model: String,
    /// Change in cost per drone per dollar of purchase price.
    pub sensitivity: f64,
    pub import_advantage: f64,
    pub challenge_count: usize,
    pub avg_price: f64,
    pub avg_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub avg_sensitivity: f64,
    pub avg_import_advantage: f64,
    pub avg_challenge_count: f64,
    pub total_models: usize,
    pub best_model: ModelSensitivity,
    pub models: Vec<ModelSensitivity>,
}

fn model_sensitivity(
    params: &TradeParameters,
    specs: &DroneSpec,
    model: &ModelRecord,
) -> ModelSensitivity {
    let (low_price, high_price) = model.used_range;
    let swept = DroneSpec {
        model: model.name.clone(),
        condition: Condition::Used,
        camera_type: specs.camera_type.clone(),
        price_override: PriceOverride::Default,
    };
    let low_cost = compute_costs(params, &swept.with_price(low_price));
    let high_cost = compute_costs(params, &swept.with_price(high_price));

    let price_spread = high_price - low_price;
    let cost_spread = high_cost.cost_per_drone - low_cost.cost_per_drone;
    let sensitivity = if price_spread > 0.0 {
        cost_spread / price_spread
    } else {
        0.0
    };

    ModelSensitivity {
        model: model.name.clone(),
        sensitivity,
        import_advantage: model.import_advantage,
        challenge_count: model.challenge_count(),
        avg_price: (low_price + high_price) / 2.0,
        avg_cost: (low_cost.cost_per_drone + high_cost.cost_per_drone) / 2.0,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Per-category averages across every catalog model, in category order.
/// Categories without models are skipped.
pub fn category_comparison(params: &TradeParameters, specs: &DroneSpec) -> Vec<CategorySummary> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let models: Vec<ModelSensitivity> = catalog()
                .models_in(category)
                .map(|model| model_sensitivity(params, specs, model))
                .collect();

            // first model wins ties
            let best_model = models.iter().fold(None::<&ModelSensitivity>, |best, current| {
                match best {
                    Some(best) if current.import_advantage <= best.import_advantage => Some(best),
                    _ => Some(current),
                }
            })?;

            Some(CategorySummary {
                category,
                avg_sensitivity: mean(models.iter().map(|m| m.sensitivity)),
                avg_import_advantage: mean(models.iter().map(|m| m.import_advantage)),
                avg_challenge_count: mean(models.iter().map(|m| m.challenge_count as f64)),
                total_models: models.len(),
                best_model: best_model.clone(),
                models,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TornadoFactor {
    DronePrice,
    Freight,
    ExchangeRate,
    ChallengeComplexity,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TornadoEntry {
    pub factor: TornadoFactor,
    pub parameter: String,
    /// Smaller of the two percent changes in the measured output.
    pub low_impact: f64,
    pub high_impact: f64,
    pub range: String,
    pub total_range: f64,
}

impl TornadoEntry {
    fn new(factor: TornadoFactor, parameter: String, range: String, a: f64, b: f64) -> Self {
        Self {
            factor,
            parameter,
            low_impact: a.min(b),
            high_impact: a.max(b),
            range,
            total_range: (b - a).abs(),
        }
    }
}

fn percent_change(value: f64, baseline: f64) -> f64 {
    (value / baseline - 1.0) * 100.0
}

/// Ranks the inputs by how far they swing the landed cost, largest first.
///
/// Exchange-rate impact is measured on import savings and reported as zero
/// when the baseline shows no savings.
pub fn tornado_analysis(
    params: &TradeParameters,
    specs: &DroneSpec,
    baseline: &CostBreakdown,
) -> Vec<TornadoEntry> {
    let base_cost = baseline.total_ddp_usd;
    let ranges = SENSITIVITY_RANGES;

    let (price_low, price_high) = price_bounds(&baseline.model, specs.condition);
    let price_impact = |price: f64| {
        percent_change(compute_costs(params, &specs.with_price(price)).total_ddp_usd, base_cost)
    };
    let drone_price = TornadoEntry::new(
        TornadoFactor::DronePrice,
        format!("{} Price Range", specs.model),
        format!("${}-${}", format_number(price_low), format_number(price_high)),
        price_impact(price_low),
        price_impact(price_high),
    );

    let freight_impact = |factor: f64| {
        let shifted = TradeParameters {
            freight: params.freight * factor,
            ..params.clone()
        };
        percent_change(compute_costs(&shifted, specs).total_ddp_usd, base_cost)
    };
    let freight = TornadoEntry::new(
        TornadoFactor::Freight,
        "Enhanced Freight (Category Impact)".to_string(),
        format!(
            "±{:.0}% × {:.1}x",
            ranges.freight_variation * 100.0,
            baseline.freight_multiplier
        ),
        freight_impact(1.0 - ranges.freight_variation),
        freight_impact(1.0 + ranges.freight_variation),
    );

    let base_savings = baseline.import_savings;
    let exchange_impact = |factor: f64| {
        if base_savings <= 0.0 {
            return 0.0;
        }
        let shifted = TradeParameters {
            exchange_rate: params.exchange_rate * factor,
            ..params.clone()
        };
        percent_change(compute_costs(&shifted, specs).import_savings, base_savings)
    };
    let exchange = TornadoEntry::new(
        TornadoFactor::ExchangeRate,
        "Exchange Rate (Import Advantage)".to_string(),
        format!("±{:.0}%", ranges.exchange_variation * 100.0),
        exchange_impact(1.0 - ranges.exchange_variation),
        exchange_impact(1.0 + ranges.exchange_variation),
    );

    let base_challenge = baseline.challenge_multiplier;
    let challenge_impact = |factor: f64| {
        let perturbed = base_challenge * factor;
        percent_change(base_cost * perturbed / base_challenge, base_cost)
    };
    let challenge = TornadoEntry::new(
        TornadoFactor::ChallengeComplexity,
        "Import Challenge Complexity".to_string(),
        format!("{:.2}x multiplier", base_challenge),
        challenge_impact(1.0 - CHALLENGE_VARIATION),
        challenge_impact(1.0 + CHALLENGE_VARIATION),
    );

    let mut entries = vec![drone_price, freight, exchange, challenge];
    entries.sort_by(|a, b| b.total_range.total_cmp(&a.total_range));
    entries
}
