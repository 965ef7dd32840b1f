//! Landed-cost engine: turns trade parameters and a drone spec into a full
//! DDP breakdown. Pure and re-entrant; touches only its inputs and the
//! immutable catalog.

use super::catalog::{catalog, CategoryProfile, ModelRecord, TaxTable, ARGENTINE_TAXES};
use super::entities::{
    Condition, CostBreakdown, CostSegment, DroneSpec, LogisticsLines, TaxLines, TradeParameters,
};

/// Freight never scales below this share of the unit rate.
pub const FREIGHT_SCALING_FLOOR: f64 = 0.7;
/// Extra challenge factor for thermal and multispectral payloads.
pub const RESTRICTED_SENSOR_SURCHARGE: f64 = 1.2;
pub const ADP_FEE_RATE: f64 = 0.07;
pub const ADP_FEE_FLOOR: f64 = 1000.0;

const FISCAL_DEPOSIT: f64 = 150.0;
const INTERNATIONAL_INSURANCE: f64 = 60.0;
const IMPORT_CLEARANCE: f64 = 680.0;
const FORWARDING_FEE: f64 = 100.0;
const LOCAL_TRANSPORT: f64 = 150.0;
const IVA_ON_EXPENSES: f64 = 239.40;

/// Multipliers resolved for one model/camera combination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Multipliers {
    pub freight: f64,
    pub challenge: f64,
}

pub fn compute_costs(params: &TradeParameters, specs: &DroneSpec) -> CostBreakdown {
    let catalog = catalog();
    let model = catalog.model_or_default(&specs.model);
    let profile = model.category.profile();

    let base_price = resolve_base_price(model, specs);
    let camera_cost = catalog.camera_cost(&specs.camera_type);
    let quantity = params.quantity as f64;

    let adjusted_exw =
        (base_price + camera_cost + params.battery_upgrade + params.case_upgrade) * quantity;
    let adjusted_inland = params.inland_cost * quantity;

    let multipliers = resolve_multipliers(&profile, &specs.camera_type);

    let freight_scaling = freight_scaling(params.quantity);
    let adjusted_freight = params.freight * freight_scaling * multipliers.freight;

    let fob_value = adjusted_exw + adjusted_inland;
    let cif_value = fob_value + adjusted_freight + params.insurance;

    let taxes = compute_taxes(cif_value, &ARGENTINE_TAXES);
    let total_taxes = taxes.total();

    let logistics = compute_logistics(cif_value, &profile, multipliers.challenge);
    let total_logistics = logistics.total();

    let total_ddp_usd = cif_value + total_taxes + total_logistics;
    let total_ddp_ars = total_ddp_usd * params.exchange_rate;
    let cost_per_drone = total_ddp_usd / quantity;

    let argentine_price_usd = model.argentine_price_ars / params.exchange_rate;
    let import_savings = argentine_price_usd - cost_per_drone;
    let import_advantage_calculated = if cost_per_drone > 0.0 {
        argentine_price_usd / cost_per_drone
    } else {
        0.0
    };

    let cost_per_drone_with_margin = cost_per_drone * (1.0 + params.target_margin / 100.0);
    let profit_per_drone = cost_per_drone_with_margin - cost_per_drone;
    let total_profit = profit_per_drone * quantity;

    CostBreakdown {
        adjusted_exw,
        adjusted_inland,
        adjusted_freight,
        freight_scaling,
        fob_value,
        cif_value,
        taxes,
        total_taxes,
        adp_fee: logistics.management_fee,
        logistics,
        total_logistics,
        total_ddp_usd,
        total_ddp_ars,
        cost_per_drone,
        model: model.clone(),
        base_price,
        freight_multiplier: multipliers.freight,
        challenge_multiplier: multipliers.challenge,
        argentine_price_usd,
        import_savings,
        import_advantage_calculated,
        cost_per_drone_with_margin,
        profit_per_drone,
        total_profit,
    }
}

/// Manual override first, then used-range midpoint or list price.
pub fn resolve_base_price(model: &ModelRecord, specs: &DroneSpec) -> f64 {
    if let Some(price) = specs.price_override.effective() {
        return price;
    }
    match specs.condition {
        Condition::Used => model.used_midpoint(),
        Condition::New => model.new_price,
    }
}

pub fn resolve_multipliers(profile: &CategoryProfile, camera_type: &str) -> Multipliers {
    let restricted = catalog()
        .camera(camera_type)
        .map(|camera| camera.restricted_sensor)
        .unwrap_or(false);
    let challenge = if restricted {
        profile.challenge_multiplier * RESTRICTED_SENSOR_SURCHARGE
    } else {
        profile.challenge_multiplier
    };

    Multipliers {
        freight: profile.freight_multiplier,
        challenge,
    }
}

/// Sub-linear freight growth with a floor for fixed per-shipment overhead.
pub fn freight_scaling(quantity: u32) -> f64 {
    (quantity as f64 / 2.0).sqrt().max(FREIGHT_SCALING_FLOOR)
}

pub fn compute_taxes(cif_value: f64, table: &TaxTable) -> TaxLines {
    TaxLines {
        import_duty: cif_value * table.import_duty,
        statistics_fee: cif_value * table.statistics_fee,
        iva: cif_value * table.iva,
        additional_iva: cif_value * table.additional_iva,
        gross_income: cif_value * table.gross_income,
        advance_profit: cif_value * table.advance_profit,
        sim_fee: table.sim_fee,
    }
}

pub fn adp_fee(cif_value: f64) -> f64 {
    ADP_FEE_FLOOR.max(cif_value * ADP_FEE_RATE)
}

pub fn compute_logistics(
    cif_value: f64,
    profile: &CategoryProfile,
    challenge_multiplier: f64,
) -> LogisticsLines {
    let complexity = profile.base_complexity * challenge_multiplier;

    LogisticsLines {
        fiscal_deposit: FISCAL_DEPOSIT * complexity,
        international_insurance: INTERNATIONAL_INSURANCE,
        import_clearance: IMPORT_CLEARANCE * complexity,
        forwarding_fee: FORWARDING_FEE,
        local_transport: LOCAL_TRANSPORT,
        iva_on_expenses: IVA_ON_EXPENSES * complexity,
        management_fee: adp_fee(cif_value),
        challenge_fee: profile.challenge_fee,
    }
}

/// Landed-cost composition for the breakdown chart.
pub fn cost_composition(costs: &CostBreakdown, params: &TradeParameters) -> Vec<CostSegment> {
    vec![
        CostSegment {
            name: "Drone + Upgrades",
            value: costs.adjusted_exw,
            color: "#8884d8",
        },
        CostSegment {
            name: "Enhanced Freight",
            value: params.freight * costs.freight_multiplier,
            color: "#82ca9d",
        },
        CostSegment {
            name: "Argentine Taxes",
            value: costs.total_taxes,
            color: "#ffc658",
        },
        CostSegment {
            name: "ADP Services",
            value: costs.adp_fee,
            color: "#ff7300",
        },
        CostSegment {
            name: "Challenge Costs",
            value: costs.total_logistics - costs.adp_fee,
            color: "#8dd1e1",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, PriceOverride};

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    fn spec(model: &str, condition: Condition, camera: &str) -> DroneSpec {
        DroneSpec {
            model: model.to_string(),
            condition,
            camera_type: camera.to_string(),
            price_override: PriceOverride::Default,
        }
    }

    #[test]
    fn reference_scenario_matches_hand_calculation() {
        let params = TradeParameters::default();
        let costs = compute_costs(&params, &DroneSpec::default());

        assert_close(costs.base_price, 325.0);
        assert_close(costs.adjusted_exw, 1100.0);
        assert_close(costs.adjusted_inland, 730.0);
        assert_close(costs.freight_scaling, 1.0);
        assert_close(costs.adjusted_freight, 625.0);
        assert_close(costs.fob_value, 1830.0);
        assert_close(costs.cif_value, 2460.37);
        assert_eq!(costs.freight_multiplier, 1.0);
        assert_eq!(costs.challenge_multiplier, 1.0);

        assert_close(costs.taxes.iva, 2460.37 * 0.105);
        assert_close(costs.taxes.additional_iva, 246.037);
        assert_close(costs.taxes.gross_income, 73.8111);
        assert_close(costs.taxes.advance_profit, 147.6222);
        assert_eq!(costs.taxes.import_duty, 0.0);
        assert_eq!(costs.taxes.sim_fee, 10.0);
        assert_close(costs.total_taxes, 2460.37 * 0.295 + 10.0);

        assert_eq!(costs.adp_fee, 1000.0);
        assert_close(costs.logistics.fiscal_deposit, 150.0);
        assert_close(costs.logistics.import_clearance, 680.0);
        assert_close(costs.logistics.iva_on_expenses, 239.4);
        assert_eq!(costs.logistics.challenge_fee, 0.0);
        assert_close(costs.total_logistics, 2379.4);

        let expected_total = 2460.37 + (2460.37 * 0.295 + 10.0) + 2379.4;
        assert_close(costs.total_ddp_usd, expected_total);
        assert_close(costs.total_ddp_ars, expected_total * 1250.0);
        assert_close(costs.cost_per_drone, expected_total / 2.0);

        assert_close(costs.argentine_price_usd, 640.0);
        assert_close(costs.import_savings, 640.0 - expected_total / 2.0);
        assert_close(
            costs.import_advantage_calculated,
            640.0 / (expected_total / 2.0),
        );
        assert_close(costs.profit_per_drone, expected_total / 2.0 * 0.1);
        assert_close(costs.total_profit, expected_total * 0.1);
    }

    #[test]
    fn ddp_total_is_exact_sum_of_parts() {
        for model in catalog().models() {
            for condition in [Condition::New, Condition::Used] {
                let params = TradeParameters {
                    quantity: 7,
                    ..TradeParameters::default()
                };
                let costs = compute_costs(&params, &spec(&model.name, condition, "4K HDR Pro"));
                assert_eq!(
                    costs.total_ddp_usd,
                    costs.cif_value + costs.total_taxes + costs.total_logistics
                );
                assert_eq!(costs.cost_per_drone, costs.total_ddp_usd / 7.0);
            }
        }
    }

    #[test]
    fn manual_override_wins_over_condition() {
        let mut drone = spec("DJI Air 3S", Condition::New, "Standard HD");
        assert_eq!(compute_costs(&TradeParameters::default(), &drone).base_price, 1299.0);

        drone.price_override = PriceOverride::Manual(910.0);
        assert_eq!(compute_costs(&TradeParameters::default(), &drone).base_price, 910.0);

        drone.price_override = PriceOverride::Manual(0.0);
        assert_eq!(compute_costs(&TradeParameters::default(), &drone).base_price, 1299.0);
    }

    #[test]
    fn unknown_model_and_camera_fall_back_quietly() {
        let costs = compute_costs(
            &TradeParameters::default(),
            &spec("Prototype Z", Condition::Used, "Night Vision"),
        );
        let reference = compute_costs(&TradeParameters::default(), &DroneSpec::default());
        assert_eq!(costs, reference);
    }

    #[test]
    fn category_multipliers_follow_profile_table() {
        let params = TradeParameters::default();
        let ag = compute_costs(&params, &spec("DJI Agras T30", Condition::Used, "Standard HD"));
        assert_eq!(ag.freight_multiplier, 2.5);
        assert_eq!(ag.challenge_multiplier, 1.3);
        assert_eq!(ag.logistics.challenge_fee, 200.0);
        assert_close(ag.logistics.fiscal_deposit, 150.0 * 1.5 * 1.3);

        let ag_thermal =
            compute_costs(&params, &spec("DJI Agras T30", Condition::Used, "Thermal + RGB"));
        assert_close(ag_thermal.challenge_multiplier, 1.3 * 1.2);

        let ent = compute_costs(&params, &spec("Skydio X2", Condition::Used, "Multispectral"));
        assert_eq!(ent.freight_multiplier, 1.8);
        assert_close(ent.challenge_multiplier, 1.2 * 1.2);
        assert_close(ent.logistics.import_clearance, 680.0 * 1.3 * 1.44);

        let cinema =
            compute_costs(&params, &spec("Freefly Alta 8 Pro", Condition::Used, "Standard HD"));
        assert_eq!(cinema.freight_multiplier, 2.0);
        assert_eq!(cinema.challenge_multiplier, 1.15);
        assert_eq!(cinema.logistics.challenge_fee, 0.0);
        assert_close(cinema.logistics.fiscal_deposit, 150.0 * 1.15);

        for model in catalog().models().iter().filter(|m| {
            matches!(
                m.category,
                Category::Entry | Category::Consumer | Category::Prosumer | Category::Professional
            )
        }) {
            let costs = compute_costs(&params, &spec(&model.name, Condition::Used, "6K Professional"));
            assert_eq!(costs.freight_multiplier, 1.0, "{}", model.name);
            assert_eq!(costs.challenge_multiplier, 1.0, "{}", model.name);
        }
    }

    #[test]
    fn freight_scaling_never_drops_below_floor() {
        assert_eq!(freight_scaling(1), FREIGHT_SCALING_FLOOR);
        assert_eq!(freight_scaling(2), 1.0);
        assert_close(freight_scaling(8), 2.0);
        for qty in 0..200 {
            assert!(freight_scaling(qty) >= FREIGHT_SCALING_FLOOR);
        }
    }

    #[test]
    fn adp_fee_has_thousand_dollar_floor() {
        assert_eq!(adp_fee(0.0), 1000.0);
        assert_eq!(adp_fee(14_000.0), 1000.0);
        assert_close(adp_fee(20_000.0), 1400.0);

        let params = TradeParameters {
            quantity: 10,
            ..TradeParameters::default()
        };
        let costs = compute_costs(&params, &spec("DJI Matrice 350 RTK", Condition::Used, "Standard HD"));
        assert!(costs.cif_value * ADP_FEE_RATE > ADP_FEE_FLOOR);
        assert_eq!(costs.adp_fee, costs.cif_value * ADP_FEE_RATE);
    }

    #[test]
    fn exchange_rate_moves_ars_total_only() {
        let base = TradeParameters::default();
        let doubled = TradeParameters {
            exchange_rate: base.exchange_rate * 2.0,
            ..base.clone()
        };
        let a = compute_costs(&base, &DroneSpec::default());
        let b = compute_costs(&doubled, &DroneSpec::default());
        assert_eq!(a.total_ddp_usd, b.total_ddp_usd);
        assert_close(b.total_ddp_ars, a.total_ddp_ars * 2.0);
        assert!(b.argentine_price_usd < a.argentine_price_usd);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let params = TradeParameters {
            quantity: 3,
            target_margin: 17.5,
            ..TradeParameters::default()
        };
        let drone = spec("DJI Mavic 3M (Multispectral)", Condition::New, "Multispectral");
        let first = compute_costs(&params, &drone);
        let second = compute_costs(&params, &drone);
        assert_eq!(first, second);
        assert_eq!(first.total_ddp_usd.to_bits(), second.total_ddp_usd.to_bits());
    }

    #[test]
    fn composition_splits_logistics_into_adp_and_rest() {
        let params = TradeParameters::default();
        let costs = compute_costs(&params, &DroneSpec::default());
        let segments = cost_composition(&costs, &params);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].value, costs.adjusted_exw);
        assert_eq!(segments[1].value, 625.0);
        assert_eq!(segments[3].value, 1000.0);
        assert_close(segments[4].value, costs.total_logistics - 1000.0);
    }
}
