pub mod alert_list;
pub mod bar_chart;
pub mod breakdown_table;
pub mod kpi_card;
pub mod listing_table;
pub mod param_form;
pub mod risk_badge;
pub mod risk_panel;
pub mod sensitivity_tables;
pub mod toast;
