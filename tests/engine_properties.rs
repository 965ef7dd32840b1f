//! Catalog-wide properties of the landed-cost engine, exercised through the
//! public API only.

use drone_import_dashboard::domain::{
    catalog, category_comparison, compute_costs, AnalysisSnapshot, Condition, DroneSpec,
    ImportReport, ParameterError, PriceOverride, RiskLevel, TradeParameters,
};
use time::macros::datetime;

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
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
fn every_model_camera_combination_adds_up() {
    let params = TradeParameters {
        quantity: 3,
        ..TradeParameters::default()
    };
    for model in catalog().models() {
        for camera in catalog().cameras() {
            for condition in [Condition::New, Condition::Used] {
                let costs = compute_costs(&params, &spec(&model.name, condition, &camera.name));
                assert_eq!(
                    costs.total_ddp_usd,
                    costs.cif_value + costs.total_taxes + costs.total_logistics,
                    "{} / {}",
                    model.name,
                    camera.name
                );
                assert_close(costs.cost_per_drone * 3.0, costs.total_ddp_usd);
                assert!(costs.adp_fee >= 1000.0);
                assert!(costs.total_taxes > 0.0);
                assert!(costs.import_advantage_calculated > 0.0);
            }
        }
    }
}

#[test]
fn reference_scenario_matches_hand_calculation() {
    let report = ImportReport::build(&TradeParameters::default(), &DroneSpec::default());
    let costs = &report.costs;

    assert_eq!(costs.base_price, 325.0);
    assert_close(costs.adjusted_exw, 1100.0);
    assert_close(costs.cif_value, 2460.37);

    let total = 2460.37 + (2460.37 * 0.295 + 10.0) + 2379.4;
    assert_close(costs.total_ddp_usd, total);
    assert_close(costs.cost_per_drone, total / 2.0);
    assert_close(costs.cost_per_drone_with_margin, total / 2.0 * 1.1);

    assert_eq!(report.risk.score, 30);
    assert_eq!(report.risk.level, RiskLevel::Medium);
}

#[test]
fn building_a_report_twice_gives_the_same_report() {
    let params = TradeParameters {
        quantity: 5,
        exchange_rate: 1425.5,
        ..TradeParameters::default()
    };
    let drone = spec("Skydio X2", Condition::New, "Thermal + RGB");
    assert_eq!(ImportReport::build(&params, &drone), ImportReport::build(&params, &drone));
}

#[test]
fn stronger_peso_rate_shrinks_savings_but_not_usd_cost() {
    let drone = spec("DJI Air 3S", Condition::Used, "Standard HD");
    let mut previous = None;
    for rate in [900.0, 1100.0, 1250.0, 1500.0, 2000.0] {
        let params = TradeParameters {
            exchange_rate: rate,
            ..TradeParameters::default()
        };
        let costs = compute_costs(&params, &drone);
        if let Some((usd, savings)) = previous {
            assert_eq!(costs.total_ddp_usd, usd);
            assert!(costs.import_savings < savings);
        }
        previous = Some((costs.total_ddp_usd, costs.import_savings));
    }
}

#[test]
fn per_drone_cost_falls_as_quantity_grows() {
    let drone = DroneSpec::default();
    let mut previous = f64::INFINITY;
    for quantity in 1..=20 {
        let params = TradeParameters {
            quantity,
            ..TradeParameters::default()
        };
        let costs = compute_costs(&params, &drone);
        assert!(costs.freight_scaling >= 0.7);
        assert!(
            costs.cost_per_drone < previous,
            "quantity {quantity} did not lower the unit cost"
        );
        previous = costs.cost_per_drone;
    }
}

#[test]
fn single_unit_freight_uses_the_floor() {
    let params = TradeParameters {
        quantity: 1,
        ..TradeParameters::default()
    };
    let costs = compute_costs(&params, &DroneSpec::default());
    assert_eq!(costs.freight_scaling, 0.7);
    assert_close(costs.adjusted_freight, 625.0 * 0.7);
}

#[test]
fn tornado_is_ranked_and_each_bar_is_ordered() {
    for model in ["DJI Phantom Standard", "DJI Agras T30", "Freefly Alta 8 Pro"] {
        let report = ImportReport::build(
            &TradeParameters::default(),
            &spec(model, Condition::Used, "Standard HD"),
        );
        assert_eq!(report.tornado.len(), 4);
        for pair in report.tornado.windows(2) {
            assert!(pair[0].total_range >= pair[1].total_range, "{model}");
        }
        for entry in &report.tornado {
            assert!(entry.low_impact <= entry.high_impact);
        }
    }
}

#[test]
fn category_summaries_cover_the_whole_catalog() {
    let summaries = category_comparison(&TradeParameters::default(), &DroneSpec::default());
    let counted: usize = summaries.iter().map(|s| s.total_models).sum();
    assert_eq!(counted, catalog().models().len());

    for summary in &summaries {
        let members: Vec<_> = catalog().models_in(summary.category).collect();
        let expected =
            members.iter().map(|m| m.import_advantage).sum::<f64>() / members.len() as f64;
        assert_close(summary.avg_import_advantage, expected);
        assert!(summary
            .models
            .iter()
            .all(|m| m.import_advantage <= summary.best_model.import_advantage));
    }
}

#[test]
fn invalid_parameters_are_reported_before_computing() {
    let zero = TradeParameters {
        quantity: 0,
        ..TradeParameters::default()
    };
    assert_eq!(zero.validate(), Err(ParameterError::ZeroQuantity));

    let no_rate = TradeParameters {
        exchange_rate: 0.0,
        ..TradeParameters::default()
    };
    assert_eq!(no_rate.validate(), Err(ParameterError::InvalidExchangeRate(0.0)));

    assert_eq!(TradeParameters::default().validate(), Ok(()));
}

#[test]
fn saved_snapshot_reopens_with_identical_costs() {
    let params = TradeParameters {
        quantity: 4,
        target_margin: 25.0,
        ..TradeParameters::default()
    };
    let drone = spec("DJI Mavic 3M (Multispectral)", Condition::New, "Multispectral")
        .with_price(3900.0);
    let costs = compute_costs(&params, &drone);
    let snapshot =
        AnalysisSnapshot::from_breakdown(&params, &drone, &costs, datetime!(2025-06-01 09:30 UTC))
            .unwrap();

    let (reopened_params, reopened_spec) = snapshot.inputs().unwrap();
    assert_eq!(compute_costs(&reopened_params, &reopened_spec), costs);
    assert_eq!(snapshot.purchase_price, 3900.0);
}

#[test]
fn inputs_that_fail_validation_cannot_produce_a_storable_snapshot() {
    let cases = [
        TradeParameters {
            exchange_rate: 0.0,
            ..TradeParameters::default()
        },
        TradeParameters {
            quantity: 0,
            ..TradeParameters::default()
        },
    ];
    for params in cases {
        assert!(params.validate().is_err());
        let drone = DroneSpec::default();
        let costs = compute_costs(&params, &drone);
        let snapshot =
            AnalysisSnapshot::from_breakdown(&params, &drone, &costs, datetime!(2025-06-01 09:30 UTC))
                .unwrap();
        assert!(snapshot.non_finite_field().is_some());
    }
}
