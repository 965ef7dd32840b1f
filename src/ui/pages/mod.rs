pub mod analysis;
pub mod dashboard;
pub mod history;
pub mod market;

pub use analysis::AnalysisPage;
pub use dashboard::DashboardPage;
pub use history::HistoryPage;
pub use market::MarketPage;
