use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{ModelRecord, DEFAULT_MODEL};

/// Shipment-level trade inputs. All money figures are USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeParameters {
    pub exw_price: f64,
    pub inland_cost: f64,
    pub freight: f64,
    pub insurance: f64,
    pub quantity: u32,
    /// ARS per USD.
    pub exchange_rate: f64,
    pub battery_upgrade: f64,
    pub case_upgrade: f64,
    /// Percent, e.g. `10.0` for a 10% markup.
    pub target_margin: f64,
}

impl Default for TradeParameters {
    fn default() -> Self {
        Self {
            exw_price: 537.0,
            inland_cost: 365.0,
            freight: 625.0,
            insurance: 5.37,
            quantity: 2,
            exchange_rate: 1250.0,
            battery_upgrade: 150.0,
            case_upgrade: 75.0,
            target_margin: 10.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("exchange rate must be a positive number, got {0}")]
    InvalidExchangeRate(f64),
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

impl TradeParameters {
    /// Checks the preconditions the cost engine relies on but never enforces.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.quantity == 0 {
            return Err(ParameterError::ZeroQuantity);
        }
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(ParameterError::InvalidExchangeRate(self.exchange_rate));
        }

        let amounts = [
            ("exw price", self.exw_price),
            ("inland cost", self.inland_cost),
            ("freight", self.freight),
            ("insurance", self.insurance),
            ("battery upgrade", self.battery_upgrade),
            ("case upgrade", self.case_upgrade),
            ("target margin", self.target_margin),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ParameterError::InvalidAmount { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    New,
    #[default]
    Used,
}

impl Condition {
    pub fn name(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Used => "Used",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Manually entered purchase price, or the catalog-derived default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum PriceOverride {
    #[default]
    Default,
    Manual(f64),
}

impl PriceOverride {
    /// The manual price when it is usable; zero, negative and NaN fall through.
    pub fn effective(&self) -> Option<f64> {
        match *self {
            PriceOverride::Manual(price) if price.is_finite() && price > 0.0 => Some(price),
            _ => None,
        }
    }

    pub fn from_input(value: Option<f64>) -> Self {
        value.map(PriceOverride::Manual).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroneSpec {
    pub model: String,
    pub condition: Condition,
    pub camera_type: String,
    #[serde(default)]
    pub price_override: PriceOverride,
}

impl Default for DroneSpec {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            condition: Condition::Used,
            camera_type: "Standard HD".to_string(),
            price_override: PriceOverride::Default,
        }
    }
}

impl DroneSpec {
    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price_override: PriceOverride::Manual(price),
            ..self.clone()
        }
    }
}

/// Argentine taxes levied on one shipment, in USD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxLines {
    pub import_duty: f64,
    pub statistics_fee: f64,
    pub iva: f64,
    pub additional_iva: f64,
    pub gross_income: f64,
    pub advance_profit: f64,
    pub sim_fee: f64,
}

impl TaxLines {
    pub fn lines(&self) -> [(&'static str, f64); 7] {
        [
            ("Import Duty", self.import_duty),
            ("Statistics Fee", self.statistics_fee),
            ("IVA", self.iva),
            ("Additional IVA", self.additional_iva),
            ("Gross Income", self.gross_income),
            ("Advance Profit", self.advance_profit),
            ("SIM Fee", self.sim_fee),
        ]
    }

    pub fn total(&self) -> f64 {
        self.lines().iter().fold(0.0, |sum, (_, value)| sum + value)
    }
}

/// Forwarding and clearance costs for one shipment, in USD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogisticsLines {
    pub fiscal_deposit: f64,
    pub international_insurance: f64,
    pub import_clearance: f64,
    pub forwarding_fee: f64,
    pub local_transport: f64,
    pub iva_on_expenses: f64,
    pub management_fee: f64,
    pub challenge_fee: f64,
}

impl LogisticsLines {
    pub fn lines(&self) -> [(&'static str, f64); 8] {
        [
            ("Fiscal Deposit", self.fiscal_deposit),
            ("International Insurance", self.international_insurance),
            ("Import Clearance", self.import_clearance),
            ("Forwarding Fee", self.forwarding_fee),
            ("Local Transport", self.local_transport),
            ("IVA on Expenses", self.iva_on_expenses),
            ("Management Fee", self.management_fee),
            ("Challenge Fee", self.challenge_fee),
        ]
    }

    pub fn total(&self) -> f64 {
        self.lines().iter().fold(0.0, |sum, (_, value)| sum + value)
    }
}

/// Everything the engine derives from one `(TradeParameters, DroneSpec)` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub adjusted_exw: f64,
    pub adjusted_inland: f64,
    pub adjusted_freight: f64,
    pub freight_scaling: f64,
    pub fob_value: f64,
    pub cif_value: f64,
    pub taxes: TaxLines,
    pub total_taxes: f64,
    pub logistics: LogisticsLines,
    pub total_logistics: f64,
    pub total_ddp_usd: f64,
    pub total_ddp_ars: f64,
    pub cost_per_drone: f64,
    pub model: ModelRecord,
    pub base_price: f64,
    pub adp_fee: f64,
    pub freight_multiplier: f64,
    pub challenge_multiplier: f64,
    pub argentine_price_usd: f64,
    pub import_savings: f64,
    pub import_advantage_calculated: f64,
    pub cost_per_drone_with_margin: f64,
    pub profit_per_drone: f64,
    pub total_profit: f64,
}

/// One slice of the landed-cost composition chart.
#[derive(Clone, Debug, PartialEq)]
pub struct CostSegment {
    pub name: &'static str,
    pub value: f64,
    pub color: &'static str,
}
