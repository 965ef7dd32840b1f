use std::cmp::Ordering;

use dioxus::prelude::*;

use drone_import_dashboard::{
    infra::listings::{Listing, ListingSearch, PriceStats},
    util::format::{format_currency, format_percentage},
};

use crate::ui::theme;

#[component]
pub fn ListingTable(search: ListingSearch) -> Element {
    let sort_mode = use_signal(|| SortMode::Relevance);
    let current_sort = sort_mode();

    let overall = search.summary.overall.clone();
    let cheapest_id = cheapest(&search.results).map(|listing| listing.id.clone());
    let condition_rows = search
        .summary
        .conditions
        .iter()
        .map(|(label, stats)| (label.clone(), stats.clone()))
        .collect::<Vec<_>>();

    let mut rows = search.results.clone();
    sort_rows(&mut rows, current_sort);
    let rows = rows
        .into_iter()
        .map(|listing| {
            let is_cheapest = cheapest_id.as_deref() == Some(listing.id.as_str());
            (listing, is_cheapest)
        })
        .collect::<Vec<_>>();

    rsx! {
        div { class: "panel",
            div { class: "stat-grid",
                SummaryStat {
                    title: "Average".to_string(),
                    value: format_currency(overall.avg_price),
                    caption: format!("{} priced listings", overall.count),
                }
                SummaryStat {
                    title: "Range".to_string(),
                    value: format_stats_range(&overall),
                    caption: format!("query \"{}\"", search.search_query),
                }
                div { class: "stat",
                    p { class: "label", "By condition" }
                    for (label, stats) in condition_rows {
                        p { class: "small text-muted", "{label}: {format_currency(stats.avg_price)} ({stats.count})" }
                    }
                }
            }

            div { class: "toggle-row",
                span { class: "label", "Sort:" }
                button {
                    class: theme::toggle_button(current_sort == SortMode::Relevance),
                    onclick: {
                        let mut sort_mode = sort_mode.clone();
                        move |_| sort_mode.set(SortMode::Relevance)
                    },
                    "Relevance"
                }
                button {
                    class: theme::toggle_button(current_sort == SortMode::PriceLow),
                    onclick: {
                        let mut sort_mode = sort_mode.clone();
                        move |_| sort_mode.set(SortMode::PriceLow)
                    },
                    "Lowest total"
                }
                button {
                    class: theme::toggle_button(current_sort == SortMode::PriceHigh),
                    onclick: {
                        let mut sort_mode = sort_mode.clone();
                        move |_| sort_mode.set(SortMode::PriceHigh)
                    },
                    "Highest total"
                }
            }

            if rows.is_empty() {
                p { class: "text-muted small", "No relevant listings found." }
            } else {
                table { class: "table",
                    thead {
                        tr {
                            th { "Title" }
                            th { "Condition" }
                            th { class: "num", "Price" }
                            th { class: "num", "Shipping" }
                            th { class: "num", "Total" }
                            th { "Seller" }
                            th { class: "num", "Match" }
                        }
                    }
                    tbody {
                        for (listing, is_cheapest) in rows {
                            tr {
                                td {
                                    span { "{listing.title}" }
                                    if is_cheapest {
                                        span { class: "badge badge-good", "Cheapest" }
                                    }
                                }
                                td { "{condition_label(&listing)}" }
                                td { class: "num", "{format_currency(listing.price)}" }
                                td { class: "num", "{format_currency(listing.shipping)}" }
                                td { class: "num text-strong", "{format_currency(listing.total_price)}" }
                                td { class: "text-muted", "{seller_label(&listing)}" }
                                td { class: "num", "{format_percentage(listing.relevance, 0)}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SummaryStat(title: String, value: String, caption: String) -> Element {
    rsx! {
        div { class: "stat",
            p { class: "label", "{title}" }
            p { class: "stat-value", "{value}" }
            p { class: "small text-muted", "{caption}" }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SortMode {
    Relevance,
    PriceLow,
    PriceHigh,
}

fn sort_rows(rows: &mut [Listing], mode: SortMode) {
    match mode {
        SortMode::Relevance => rows.sort_by(|a, b| b.relevance.total_cmp(&a.relevance)),
        SortMode::PriceLow => rows.sort_by(|a, b| compare_price(a, b, false)),
        SortMode::PriceHigh => rows.sort_by(|a, b| compare_price(a, b, true)),
    }
}

// Unpriced listings sort last either way.
fn compare_price(a: &Listing, b: &Listing, descending: bool) -> Ordering {
    match (a.total_price > 0.0, b.total_price > 0.0) {
        (true, true) if descending => b.total_price.total_cmp(&a.total_price),
        (true, true) => a.total_price.total_cmp(&b.total_price),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

fn cheapest(listings: &[Listing]) -> Option<&Listing> {
    listings
        .iter()
        .filter(|listing| listing.total_price > 0.0)
        .min_by(|a, b| a.total_price.total_cmp(&b.total_price))
}

fn condition_label(listing: &Listing) -> &str {
    listing.condition.as_deref().unwrap_or("—")
}

fn seller_label(listing: &Listing) -> String {
    match (&listing.seller.username, &listing.seller.feedback_percentage) {
        (Some(name), Some(pct)) => format!("{name} ({pct}%)"),
        (Some(name), None) => name.clone(),
        _ => "—".to_string(),
    }
}

fn format_stats_range(stats: &PriceStats) -> String {
    if stats.count == 0 {
        "—".to_string()
    } else if (stats.max - stats.min).abs() < f64::EPSILON {
        format_currency(stats.min)
    } else {
        format!("{} - {}", format_currency(stats.min), format_currency(stats.max))
    }
}
