use super::alerts::{
    generate_alerts, recommendations, risk_assessment, Alert, Recommendation, RiskAssessment,
};
use super::engine::{compute_costs, cost_composition};
use super::entities::{CostBreakdown, CostSegment, DroneSpec, TradeParameters};
use super::sensitivity::{
    category_comparison, price_range_analysis, tornado_analysis, CategorySummary,
    PriceRangePoint, TornadoEntry,
};

/// Every derived view the dashboard renders for one input pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportReport {
    pub costs: CostBreakdown,
    pub composition: Vec<CostSegment>,
    pub alerts: Vec<Alert>,
    pub price_range: Vec<PriceRangePoint>,
    pub categories: Vec<CategorySummary>,
    pub tornado: Vec<TornadoEntry>,
    pub recommendations: Vec<Recommendation>,
    pub risk: RiskAssessment,
}

impl ImportReport {
    pub fn build(params: &TradeParameters, specs: &DroneSpec) -> Self {
        let costs = compute_costs(params, specs);
        let categories = category_comparison(params, specs);

        Self {
            composition: cost_composition(&costs, params),
            alerts: generate_alerts(&costs, params),
            price_range: price_range_analysis(params, specs),
            tornado: tornado_analysis(params, specs, &costs),
            recommendations: recommendations(&costs, params, &categories),
            risk: risk_assessment(&costs, params),
            categories,
            costs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_consistent_with_its_parts() {
        let params = TradeParameters::default();
        let specs = DroneSpec::default();
        let report = ImportReport::build(&params, &specs);

        assert_eq!(report.costs, compute_costs(&params, &specs));
        assert_eq!(report.composition.len(), 5);
        assert_eq!(report.price_range.len(), 11);
        assert_eq!(report.categories.len(), 7);
        assert_eq!(report.tornado.len(), 4);
        assert_eq!(report.risk.score, 30);
        assert_eq!(report, ImportReport::build(&params, &specs));
    }
}
