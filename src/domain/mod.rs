//! Landed-cost domain: catalog, cost engine, sensitivity sweeps and alerts.

pub mod alerts;
pub mod app_state;
pub mod catalog;
pub mod engine;
pub mod entities;
pub mod report;
pub mod sensitivity;
pub mod snapshot;

pub use alerts::{
    generate_alerts, recommendations, risk_assessment, Alert, AlertLevel, Recommendation,
    RecommendedAction, RiskArea, RiskAssessment, RiskFactor, RiskLevel,
};
pub use app_state::{AppState, CacheResource, CacheTimestamps, PersistedState};
pub use catalog::{
    catalog, CameraUpgrade, Catalog, Category, CategoryProfile, ModelRecord, TaxTable,
    ARGENTINE_TAXES, DEFAULT_MODEL, SENSITIVITY_RANGES,
};
pub use engine::{compute_costs, cost_composition};
pub use entities::{
    Condition, CostBreakdown, CostSegment, DroneSpec, LogisticsLines, ParameterError,
    PriceOverride, TaxLines, TradeParameters,
};
pub use report::ImportReport;
pub use sensitivity::{
    category_comparison, price_bounds, price_range_analysis, tornado_analysis, CategorySummary,
    ModelSensitivity, PriceRangePoint, TornadoEntry, TornadoFactor,
};
pub use snapshot::{AnalysisAnalytics, AnalysisSnapshot, DroneModelRow, StoredAnalysis};
