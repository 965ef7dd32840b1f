//! Threshold rules over a single breakdown: alerts, recommendations and the
//! weighted risk score.

use std::fmt;

use serde::Serialize;

use super::catalog::Category;
use super::entities::{CostBreakdown, TradeParameters};
use super::sensitivity::CategorySummary;

pub const LOW_ADVANTAGE_THRESHOLD: f64 = 1.5;
pub const LOW_PROFIT_THRESHOLD: f64 = 100.0;
pub const COMPLEX_IMPORT_ALERT_THRESHOLD: f64 = 1.25;
pub const COMPLEX_IMPORT_RISK_THRESHOLD: f64 = 1.3;
pub const FAVOURABLE_EXCHANGE_RATE: f64 = 1400.0;
pub const UNFAVOURABLE_EXCHANGE_RATE: f64 = 1200.0;
pub const HIGH_SAVINGS_THRESHOLD: f64 = 500.0;
pub const HIGH_FREIGHT_MULTIPLIER: f64 = 2.0;

const SCALING_ADVANTAGE_THRESHOLD: f64 = 2.0;
const SCALING_MAX_QUANTITY: u32 = 5;
const TARGET_PRICE_POSITION: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AlertLevel {
    Warning,
    Info,
    Success,
}

impl AlertLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertLevel::Warning => "alert-warning",
            AlertLevel::Info => "alert-info",
            AlertLevel::Success => "alert-success",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: &'static str,
    pub value: String,
}

impl Alert {
    fn new(level: AlertLevel, message: &'static str, value: String) -> Self {
        Self {
            level,
            message,
            value,
        }
    }
}

pub fn generate_alerts(costs: &CostBreakdown, params: &TradeParameters) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if costs.import_advantage_calculated < LOW_ADVANTAGE_THRESHOLD {
        alerts.push(Alert::new(
            AlertLevel::Warning,
            "Low import advantage - consider different model or pricing",
            format!("{:.1}x", costs.import_advantage_calculated),
        ));
    }

    if costs.challenge_multiplier > COMPLEX_IMPORT_ALERT_THRESHOLD {
        alerts.push(Alert::new(
            AlertLevel::Info,
            "High complexity import - plan for extended timeline",
            format!("{:.2}x", costs.challenge_multiplier),
        ));
    }

    if costs.profit_per_drone < LOW_PROFIT_THRESHOLD {
        alerts.push(Alert::new(
            AlertLevel::Warning,
            "Low profit margin - consider increasing target margin",
            format!("${:.0}", costs.profit_per_drone),
        ));
    }

    if params.exchange_rate > FAVOURABLE_EXCHANGE_RATE {
        alerts.push(Alert::new(
            AlertLevel::Success,
            "Favorable exchange rate for imports",
            format!("{} ARS/USD", params.exchange_rate),
        ));
    }

    if costs.import_savings > HIGH_SAVINGS_THRESHOLD {
        alerts.push(Alert::new(
            AlertLevel::Success,
            "Excellent import opportunity - high savings potential",
            format!("${:.0} saved", costs.import_savings),
        ));
    }

    if costs.model.category == Category::Agricultural
        && costs.challenge_multiplier > COMPLEX_IMPORT_RISK_THRESHOLD
    {
        alerts.push(Alert::new(
            AlertLevel::Info,
            "Agricultural drones require SENASA approval - factor in 2-4 weeks",
            "Regulatory".to_string(),
        ));
    }

    if costs.freight_multiplier > HIGH_FREIGHT_MULTIPLIER {
        alerts.push(Alert::new(
            AlertLevel::Warning,
            "High freight costs due to specialized handling requirements",
            format!("{:.1}x", costs.freight_multiplier),
        ));
    }

    alerts
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RecommendedAction {
    ExploreCategory(Category),
    AdjustPrice { target_price: f64 },
    IncreaseQuantity { suggested_quantity: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub message: String,
    pub action: RecommendedAction,
}

pub fn recommendations(
    costs: &CostBreakdown,
    params: &TradeParameters,
    categories: &[CategorySummary],
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let best_category = categories.iter().fold(None::<&CategorySummary>, |best, current| {
        match best {
            Some(best) if current.avg_import_advantage <= best.avg_import_advantage => Some(best),
            _ => Some(current),
        }
    });
    if let Some(best) = best_category.filter(|best| best.category != costs.model.category) {
        out.push(Recommendation {
            title: "Consider Category Switch",
            message: format!(
                "{} drones offer {:.1}x average import advantage vs your current {:.1}x",
                best.category, best.avg_import_advantage, costs.import_advantage_calculated
            ),
            action: RecommendedAction::ExploreCategory(best.category),
        });
    }

    let (low, high) = costs.model.used_range;
    if costs.base_price > costs.model.used_midpoint() {
        let target_price = low + (high - low) * TARGET_PRICE_POSITION;
        out.push(Recommendation {
            title: "Price Optimization",
            message: format!("Target price around ${target_price:.0} for better margins"),
            action: RecommendedAction::AdjustPrice { target_price },
        });
    }

    if params.quantity < SCALING_MAX_QUANTITY
        && costs.import_advantage_calculated > SCALING_ADVANTAGE_THRESHOLD
    {
        out.push(Recommendation {
            title: "Scale for Better Economics",
            message: "Consider increasing quantity to improve freight scaling and unit economics"
                .to_string(),
            action: RecommendedAction::IncreaseQuantity {
                suggested_quantity: (params.quantity + 2).min(SCALING_MAX_QUANTITY),
            },
        });
    }

    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score > 50 {
            RiskLevel::High
        } else if score > 25 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RiskArea {
    Financial,
    Operational,
    Regulatory,
    Market,
}

impl RiskArea {
    pub fn name(&self) -> &'static str {
        match self {
            RiskArea::Financial => "Financial",
            RiskArea::Operational => "Operational",
            RiskArea::Regulatory => "Regulatory",
            RiskArea::Market => "Market",
        }
    }
}

impl fmt::Display for RiskArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskFactor {
    pub area: RiskArea,
    pub risk: &'static str,
    pub impact: RiskLevel,
    pub mitigation: &'static str,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Sum of triggered factor weights, 0..=100.
    pub score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    pub fn summary(&self) -> String {
        format!("Overall risk level: {} ({}/100)", self.level, self.score)
    }
}

pub fn risk_assessment(costs: &CostBreakdown, params: &TradeParameters) -> RiskAssessment {
    let rules = [
        (
            costs.import_advantage_calculated < LOW_ADVANTAGE_THRESHOLD,
            RiskFactor {
                area: RiskArea::Financial,
                risk: "Low import advantage",
                impact: RiskLevel::High,
                mitigation: "Find better pricing or different model",
                weight: 30,
            },
        ),
        (
            costs.profit_per_drone < LOW_PROFIT_THRESHOLD,
            RiskFactor {
                area: RiskArea::Financial,
                risk: "Low profit margins",
                impact: RiskLevel::Medium,
                mitigation: "Increase target margin or reduce costs",
                weight: 25,
            },
        ),
        (
            costs.challenge_multiplier > COMPLEX_IMPORT_RISK_THRESHOLD,
            RiskFactor {
                area: RiskArea::Operational,
                risk: "High import complexity",
                impact: RiskLevel::Medium,
                mitigation: "Plan for extended timelines and additional documentation",
                weight: 20,
            },
        ),
        (
            costs.model.category == Category::Agricultural,
            RiskFactor {
                area: RiskArea::Regulatory,
                risk: "SENASA approval required",
                impact: RiskLevel::Medium,
                mitigation: "Ensure proper agricultural equipment documentation",
                weight: 15,
            },
        ),
        (
            params.exchange_rate < UNFAVOURABLE_EXCHANGE_RATE,
            RiskFactor {
                area: RiskArea::Market,
                risk: "Unfavorable exchange rate",
                impact: RiskLevel::Low,
                mitigation: "Monitor exchange rates for better timing",
                weight: 10,
            },
        ),
    ];

    let factors: Vec<RiskFactor> = rules
        .into_iter()
        .filter_map(|(triggered, factor)| triggered.then_some(factor))
        .collect();
    let score = factors.iter().map(|factor| factor.weight).sum();

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}
