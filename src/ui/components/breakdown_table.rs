use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::CostBreakdown,
    util::format::{format_ars, format_currency, format_multiplier, format_number},
};

struct Line {
    label: String,
    value: String,
    strong: bool,
}

impl Line {
    fn new(label: impl Into<String>, value: String) -> Self {
        Self {
            label: label.into(),
            value,
            strong: false,
        }
    }

    fn total(label: impl Into<String>, value: String) -> Self {
        Self {
            strong: true,
            ..Self::new(label, value)
        }
    }
}

fn sections(costs: &CostBreakdown) -> Vec<(&'static str, Vec<Line>)> {
    let goods = vec![
        Line::new("Base price / unit", format_currency(costs.base_price)),
        Line::new("Adjusted EXW", format_currency(costs.adjusted_exw)),
        Line::new("Inland transport", format_currency(costs.adjusted_inland)),
        Line::total("FOB value", format_currency(costs.fob_value)),
        Line::new(
            format!(
                "Freight (scaling {}, multiplier {})",
                format_number(costs.freight_scaling),
                format_multiplier(costs.freight_multiplier)
            ),
            format_currency(costs.adjusted_freight),
        ),
        Line::total("CIF value", format_currency(costs.cif_value)),
    ];

    let mut taxes: Vec<Line> = costs
        .taxes
        .lines()
        .into_iter()
        .map(|(label, value)| Line::new(label, format_currency(value)))
        .collect();
    taxes.push(Line::total("Total taxes", format_currency(costs.total_taxes)));

    let mut logistics: Vec<Line> = costs
        .logistics
        .lines()
        .into_iter()
        .map(|(label, value)| Line::new(label, format_currency(value)))
        .collect();
    logistics.push(Line::total(
        "Total logistics",
        format_currency(costs.total_logistics),
    ));

    let totals = vec![
        Line::total("Total DDP (USD)", format_currency(costs.total_ddp_usd)),
        Line::new("Total DDP (ARS)", format_ars(costs.total_ddp_ars)),
        Line::total("Cost per drone", format_currency(costs.cost_per_drone)),
        Line::new(
            "Cost per drone with margin",
            format_currency(costs.cost_per_drone_with_margin),
        ),
        Line::new(
            "Argentine retail (USD)",
            format_currency(costs.argentine_price_usd),
        ),
        Line::new("Savings per drone", format_currency(costs.import_savings)),
    ];

    vec![
        ("Goods & freight", goods),
        ("Argentine taxes", taxes),
        ("Logistics & ADP", logistics),
        ("Landed cost", totals),
    ]
}

#[component]
pub fn BreakdownTable(costs: CostBreakdown) -> Element {
    let sections = sections(&costs);

    rsx! {
        div { class: "breakdown-grid",
            for (title, lines) in sections {
                div { class: "panel",
                    h3 { class: "label", "{title}" }
                    table { class: "table",
                        tbody {
                            for line in lines {
                                tr { class: if line.strong { "row-total" } else { "" },
                                    td { "{line.label}" }
                                    td { class: "num", "{line.value}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
