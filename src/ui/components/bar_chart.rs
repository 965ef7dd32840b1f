use dioxus::prelude::*;

use drone_import_dashboard::{
    domain::{CostSegment, TornadoEntry},
    util::format::{format_currency, format_percentage},
};

/// Horizontal bars scaled against the largest segment.
#[component]
pub fn CostBars(segments: Vec<CostSegment>) -> Element {
    let total: f64 = segments.iter().map(|s| s.value.max(0.0)).sum();
    let widest = segments.iter().fold(0.0_f64, |max, s| max.max(s.value));
    let rows = segments
        .iter()
        .map(|segment| {
            let share = if total > 0.0 {
                format!(" ({})", format_percentage(segment.value / total, 1))
            } else {
                String::new()
            };
            BarRow {
                label: segment.name.to_string(),
                style: format!(
                    "width: {:.1}%; background: {};",
                    bar_width(segment.value, widest),
                    segment.color
                ),
                value: format!("{}{share}", format_currency(segment.value)),
            }
        })
        .collect::<Vec<_>>();

    rsx! {
        div { class: "bar-chart",
            for row in rows {
                div { class: "bar-row",
                    span { class: "bar-label", "{row.label}" }
                    div { class: "bar-track",
                        div { class: "bar-fill", style: "{row.style}" }
                    }
                    span { class: "bar-value", "{row.value}" }
                }
            }
        }
    }
}

struct BarRow {
    label: String,
    style: String,
    value: String,
}

/// Diverging bars around the baseline: left for the low scenario, right for
/// the high one.
#[component]
pub fn TornadoChart(entries: Vec<TornadoEntry>) -> Element {
    let widest = entries.iter().fold(0.0_f64, |max, e| {
        max.max(e.low_impact.abs()).max(e.high_impact.abs())
    });
    let rows = entries
        .iter()
        .map(|entry| TornadoRow {
            parameter: entry.parameter.clone(),
            range: entry.range.clone(),
            low_style: format!("width: {:.1}%;", bar_width(-entry.low_impact, widest)),
            high_style: format!("width: {:.1}%;", bar_width(entry.high_impact, widest)),
            impacts: format!("{:+.1}% / {:+.1}%", entry.low_impact, entry.high_impact),
        })
        .collect::<Vec<_>>();

    rsx! {
        div { class: "tornado",
            for row in rows {
                div { class: "tornado-row",
                    div { class: "tornado-label",
                        span { class: "text-strong", "{row.parameter}" }
                        span { class: "text-muted small", "{row.range}" }
                    }
                    div { class: "tornado-track",
                        div { class: "tornado-half tornado-left",
                            div { class: "tornado-bar tornado-low", style: "{row.low_style}" }
                        }
                        div { class: "tornado-half",
                            div { class: "tornado-bar tornado-high", style: "{row.high_style}" }
                        }
                    }
                    span { class: "bar-value", "{row.impacts}" }
                }
            }
        }
    }
}

struct TornadoRow {
    parameter: String,
    range: String,
    low_style: String,
    high_style: String,
    impacts: String,
}

/// Percentage width of `value` against `max`, clamped to the track.
pub fn bar_width(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}
