//! Marketplace listing model: search options, relevance scoring and the
//! summaries derived from an eBay Browse response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::domain::Condition;

/// Browse API category for multi-rotor drones.
pub const DRONE_CATEGORY_ID: &str = "179697";
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Listings scoring at or below this are dropped as unrelated.
pub const RELEVANCE_CUTOFF: f64 = 0.3;
pub const MAX_RESULTS_KEPT: usize = 20;

const KNOWN_PREFIXES: [&str; 4] = ["dji", "autel", "skydio", "parrot"];
const DRONE_KEYWORDS: [&str; 4] = ["drone", "quadcopter", "uav", "multirotor"];
const ACCESSORY_KEYWORDS: [&str; 7] = [
    "case",
    "bag",
    "parts",
    "battery",
    "charger",
    "propeller",
    "toy",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingCondition {
    New,
    Used,
    Refurbished,
}

impl ListingCondition {
    fn filter_ids(&self) -> &'static str {
        match self {
            ListingCondition::New => "NEW",
            ListingCondition::Used => "USED_EXCELLENT,USED_VERY_GOOD,USED_GOOD",
            ListingCondition::Refurbished => "SELLER_REFURBISHED,MANUFACTURER_REFURBISHED",
        }
    }
}

impl From<Condition> for ListingCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::New => ListingCondition::New,
            Condition::Used => ListingCondition::Used,
        }
    }
}

/// Search knobs. Serialized form doubles as the cache key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingOptions {
    pub conditions: Vec<ListingCondition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub buy_it_now_only: bool,
    pub sort: Option<String>,
    pub max_results: u32,
    pub offset: u32,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            min_price: None,
            max_price: None,
            buy_it_now_only: false,
            sort: None,
            max_results: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ListingOptions {
    pub fn for_condition(condition: Condition) -> Self {
        Self {
            conditions: vec![condition.into()],
            ..Self::default()
        }
    }

    pub fn page_size(&self) -> u32 {
        self.max_results.min(MAX_PAGE_SIZE)
    }

    pub fn sort_order(&self) -> &str {
        self.sort.as_deref().unwrap_or("price")
    }

    /// Comma-separated Browse API `filter` value.
    pub fn filter(&self) -> String {
        let mut filters = Vec::new();

        let conditions: Vec<&str> = self.conditions.iter().map(|c| c.filter_ids()).collect();
        if !conditions.is_empty() {
            filters.push(format!("conditionIds:{{{}}}", conditions.join("|")));
        }

        let bound = |value: Option<f64>| {
            value
                .filter(|price| *price > 0.0)
                .map(|price| price.to_string())
                .unwrap_or_default()
        };
        if self.min_price.is_some_and(|p| p > 0.0) || self.max_price.is_some_and(|p| p > 0.0) {
            filters.push(format!(
                "price:[{}..{}]",
                bound(self.min_price),
                bound(self.max_price)
            ));
        }

        filters.push("itemLocationCountry:US".to_string());

        if self.buy_it_now_only {
            filters.push("buyingOptions:{FIXED_PRICE}".to_string());
        }

        filters.join(",")
    }
}

/// Brand inferred from well-known model words.
pub fn detect_brand(model: &str) -> Option<&'static str> {
    let lower = model.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    if any_word(
        &words,
        &["dji", "phantom", "mavic", "mini", "air", "spark", "inspire", "matrice", "agras"],
    ) {
        Some("DJI")
    } else if any_word(&words, &["autel", "evo"]) {
        Some("Autel")
    } else if any_word(&words, &["skydio"]) {
        Some("Skydio")
    } else if any_word(&words, &["parrot", "bebop", "anafi"]) {
        Some("Parrot")
    } else if lower.contains("holy stone") || any_word(&words, &["holystone"]) {
        Some("Holy Stone")
    } else {
        None
    }
}

fn any_word(words: &[&str], candidates: &[&str]) -> bool {
    words.iter().any(|word| candidates.contains(word))
}

/// Normalised query: brand first, single-spaced, with a drone keyword.
pub fn prepare_search_query(model: &str) -> String {
    let mut words: Vec<&str> = model.split_whitespace().collect();
    if words.len() > 1
        && words
            .first()
            .is_some_and(|first| KNOWN_PREFIXES.contains(&first.to_lowercase().as_str()))
    {
        words.remove(0);
    }

    let mut query = words.join(" ");
    if let Some(brand) = detect_brand(model) {
        query = format!("{brand} {query}");
    }

    let lower = query.to_lowercase();
    if !lower.contains("drone") && !lower.contains("quadcopter") {
        query.push_str(" drone");
    }
    query
}

/// Title match score in `0.0..=1.0`.
pub fn calculate_relevance(title: &str, model: &str) -> f64 {
    let title = title.to_lowercase();
    let model = model.to_lowercase();

    let mut score = 0.0;
    let mut max_score = 0.0;

    if title.contains(&model) {
        score += 1.0;
    }

    for term in model.split_whitespace().filter(|t| t.chars().count() > 2) {
        max_score += 0.3;
        if title.contains(term) {
            score += 0.3;
        }
    }

    if DRONE_KEYWORDS.iter().any(|keyword| title.contains(keyword)) {
        score += 0.2;
    }
    if ACCESSORY_KEYWORDS.iter().any(|keyword| title.contains(keyword)) {
        score -= 0.3;
    }

    (score / f64::max(max_score, 1.0)).clamp(0.0, 1.0)
}

/// Reads an eBay amount that may be a number, a formatted string or a
/// `{ "value": .. }` object. Anything unreadable counts as zero.
pub fn extract_price(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => {
            let digits: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            parse_leading_float(&digits)
        }
        Some(Value::Object(map)) => match map.get("value") {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(Value::String(text)) => parse_leading_float(text.trim()),
            _ => 0.0,
        },
        _ => 0.0,
    }
}

// "12.5.3" reads as 12.5
fn parse_leading_float(text: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, c) in text.char_indices() {
        match c {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerInfo {
    pub username: Option<String>,
    pub feedback_score: Option<i64>,
    pub feedback_percentage: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub shipping: f64,
    pub total_price: f64,
    pub condition: Option<String>,
    pub condition_description: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub seller: SellerInfo,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub marketplace: Option<String>,
    pub end_time: Option<String>,
    pub relevance: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub count: usize,
    pub avg_price: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceStats {
    fn from_prices(count: usize, prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self {
                count,
                ..Self::default()
            };
        }
        Self {
            count,
            avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
            min: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub total_found: usize,
    /// Totals (price plus shipping) over every relevant listing with a price.
    pub overall: PriceStats,
    /// Keyed by the marketplace's condition label.
    pub conditions: BTreeMap<String, PriceStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingSearch {
    pub results: Vec<Listing>,
    pub summary: ListingSummary,
    pub search_query: String,
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

impl ListingSearch {
    /// Suggested purchase price for a condition: the average of matching
    /// listings, else the overall average. `None` when nothing is priced.
    pub fn price_hint(&self, condition: Condition) -> Option<f64> {
        let matches = |label: &str| {
            let label = label.to_lowercase();
            match condition {
                Condition::New => label == "new" || label == "brand new",
                Condition::Used => label.contains("used") || label.contains("pre-owned"),
            }
        };

        let mut count = 0;
        let mut weighted = 0.0;
        for (label, stats) in &self.summary.conditions {
            if matches(label) && stats.avg_price > 0.0 {
                let priced = stats.count.max(1);
                weighted += stats.avg_price * priced as f64;
                count += priced;
            }
        }

        if count > 0 {
            Some(weighted / count as f64)
        } else if self.summary.overall.avg_price > 0.0 {
            Some(self.summary.overall.avg_price)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponseDto {
    #[serde(default)]
    pub item_summaries: Vec<ItemSummaryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemSummaryDto {
    #[serde(default)]
    item_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    shipping_options: Vec<ShippingOptionDto>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    condition_description: Option<String>,
    #[serde(default)]
    item_location: Option<LocationDto>,
    #[serde(default)]
    seller: Option<SellerDto>,
    #[serde(default)]
    item_web_url: Option<String>,
    #[serde(default)]
    image: Option<ImageDto>,
    #[serde(default)]
    listing_marketplace_id: Option<String>,
    #[serde(default)]
    item_end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShippingOptionDto {
    #[serde(default)]
    shipping_cost: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellerDto {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    feedback_score: Option<i64>,
    #[serde(default)]
    feedback_percentage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageDto {
    #[serde(default)]
    image_url: Option<String>,
}

impl ItemSummaryDto {
    fn into_listing(self, model: &str) -> Listing {
        let price = extract_price(self.price.as_ref());
        let shipping = extract_price(
            self.shipping_options
                .first()
                .and_then(|option| option.shipping_cost.as_ref()),
        );
        let relevance = calculate_relevance(&self.title, model);
        let (location, country) = self
            .item_location
            .map(|loc| (loc.city, loc.country))
            .unwrap_or_default();

        Listing {
            id: self.item_id,
            title: self.title,
            price,
            shipping,
            total_price: price + shipping,
            condition: self.condition,
            condition_description: self.condition_description,
            location,
            country,
            seller: self
                .seller
                .map(|seller| SellerInfo {
                    username: seller.username,
                    feedback_score: seller.feedback_score,
                    feedback_percentage: seller.feedback_percentage,
                })
                .unwrap_or_default(),
            url: self.item_web_url,
            image_url: self.image.and_then(|image| image.image_url),
            marketplace: self.listing_marketplace_id,
            end_time: self.item_end_date,
            relevance,
        }
    }
}

pub fn group_by_condition(listings: &[Listing]) -> BTreeMap<String, PriceStats> {
    let mut grouped: BTreeMap<String, (usize, Vec<f64>)> = BTreeMap::new();
    for listing in listings {
        let label = listing
            .condition
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let entry = grouped.entry(label).or_default();
        entry.0 += 1;
        if listing.total_price > 0.0 {
            entry.1.push(listing.total_price);
        }
    }

    grouped
        .into_iter()
        .map(|(label, (count, prices))| (label, PriceStats::from_prices(count, &prices)))
        .collect()
}

/// Scores, filters and summarises a raw search response.
pub(crate) fn process_search_results(
    response: SearchResponseDto,
    model: &str,
    fetched_at: OffsetDateTime,
) -> ListingSearch {
    let relevant: Vec<Listing> = response
        .item_summaries
        .into_iter()
        .map(|item| item.into_listing(model))
        .filter(|listing| listing.relevance > RELEVANCE_CUTOFF)
        .collect();

    let prices: Vec<f64> = relevant
        .iter()
        .map(|listing| listing.total_price)
        .filter(|price| *price > 0.0)
        .collect();
    let summary = ListingSummary {
        total_found: relevant.len(),
        overall: PriceStats::from_prices(prices.len(), &prices),
        conditions: group_by_condition(&relevant),
    };

    ListingSearch {
        results: relevant.into_iter().take(MAX_RESULTS_KEPT).collect(),
        summary,
        search_query: model.to_string(),
        fetched_at,
    }
}

/// eBay-derived pricing columns for the `drone_models` table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelPricingUpdate {
    pub model_name: String,
    pub ebay_new_price: Option<f64>,
    pub ebay_used_price_min: Option<f64>,
    pub ebay_used_price_max: Option<f64>,
    pub ebay_listings_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub ebay_last_updated: OffsetDateTime,
    pub ebay_price_data: Value,
}

impl ModelPricingUpdate {
    /// `None` when the search found nothing worth recording.
    pub fn from_search(
        model: &str,
        search: &ListingSearch,
    ) -> Result<Option<Self>, serde_json::Error> {
        if search.results.is_empty() {
            return Ok(None);
        }

        let conditions = &search.summary.conditions;
        let lookup = |labels: &[&str]| {
            labels
                .iter()
                .find_map(|label| conditions.get(*label))
                .filter(|stats| stats.avg_price > 0.0)
        };
        let new_stats = lookup(&["New", "NEW", "Brand New"]);
        let used_stats = lookup(&["Used", "USED_EXCELLENT", "Pre-owned"]);

        Ok(Some(Self {
            model_name: model.to_string(),
            ebay_new_price: new_stats.map(|stats| stats.avg_price),
            ebay_used_price_min: used_stats.map(|stats| stats.min),
            ebay_used_price_max: used_stats.map(|stats| stats.max),
            ebay_listings_count: search.summary.total_found,
            ebay_last_updated: search.fetched_at,
            ebay_price_data: serde_json::to_value(search)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn response(items: Value) -> SearchResponseDto {
        serde_json::from_value(json!({ "itemSummaries": items })).unwrap()
    }

    #[test]
    fn query_puts_brand_first_and_adds_keyword() {
        assert_eq!(prepare_search_query("DJI Mini 4 Pro"), "DJI Mini 4 Pro drone");
        assert_eq!(prepare_search_query("Mavic  3   Pro"), "DJI Mavic 3 Pro drone");
        assert_eq!(prepare_search_query("Autel EVO Lite+"), "Autel EVO Lite+ drone");
        assert_eq!(prepare_search_query("Hylio AG-110"), "Hylio AG-110 drone");
        assert_eq!(prepare_search_query("Skydio X2 drone"), "Skydio X2 drone");
    }

    #[test]
    fn brand_detection_uses_whole_words() {
        assert_eq!(detect_brand("DJI Agras T30"), Some("DJI"));
        assert_eq!(detect_brand("Phantom 4"), Some("DJI"));
        assert_eq!(detect_brand("EVO II Dual"), Some("Autel"));
        assert_eq!(detect_brand("Holy Stone HS720"), Some("Holy Stone"));
        assert_eq!(detect_brand("Anafi USA"), Some("Parrot"));
        assert_eq!(detect_brand("Freefly Alta 8 Pro"), None);
        // "repair" must not match "air"
        assert_eq!(detect_brand("repair kit"), None);
    }

    #[test]
    fn filter_lists_conditions_prices_and_location() {
        let options = ListingOptions {
            conditions: vec![ListingCondition::New, ListingCondition::Used],
            min_price: Some(100.0),
            max_price: None,
            buy_it_now_only: true,
            ..ListingOptions::default()
        };
        assert_eq!(
            options.filter(),
            "conditionIds:{NEW|USED_EXCELLENT,USED_VERY_GOOD,USED_GOOD},price:[100..],\
             itemLocationCountry:US,buyingOptions:{FIXED_PRICE}"
        );
        assert_eq!(ListingOptions::default().filter(), "itemLocationCountry:US");
    }

    #[test]
    fn page_size_is_capped() {
        let options = ListingOptions {
            max_results: 500,
            ..ListingOptions::default()
        };
        assert_eq!(options.page_size(), MAX_PAGE_SIZE);
        assert_eq!(options.sort_order(), "price");
    }

    #[test]
    fn relevance_rewards_exact_model_and_penalises_accessories() {
        let exact = calculate_relevance("DJI Mini 4 Pro Drone Fly More Combo", "DJI Mini 4 Pro");
        let accessory = calculate_relevance("Mini 4 Pro battery charger", "DJI Mini 4 Pro");
        let unrelated = calculate_relevance("Vintage film camera", "DJI Mini 4 Pro");

        assert_eq!(exact, 1.0);
        assert!(accessory < exact);
        assert_eq!(unrelated, 0.0);
    }

    #[test]
    fn relevance_of_partial_title() {
        // two of three terms plus the keyword bonus, over a 0.9 maximum
        let score = calculate_relevance("Mini Pro drone", "DJI Mini 4 Pro");
        assert!((score - 0.8 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn price_extraction_handles_every_shape() {
        assert_eq!(extract_price(None), 0.0);
        assert_eq!(extract_price(Some(&json!(12.5))), 12.5);
        assert_eq!(extract_price(Some(&json!("$1,299.99"))), 1299.99);
        assert_eq!(extract_price(Some(&json!({"value": "849.00", "currency": "USD"}))), 849.0);
        assert_eq!(extract_price(Some(&json!({"value": 40}))), 40.0);
        assert_eq!(extract_price(Some(&json!({"currency": "USD"}))), 0.0);
        assert_eq!(extract_price(Some(&json!("free"))), 0.0);
        assert_eq!(extract_price(Some(&json!(true))), 0.0);
    }

    #[test]
    fn processing_filters_unrelated_and_summarises() {
        let raw = response(json!([
            {
                "itemId": "1",
                "title": "DJI Mini 4 Pro drone",
                "price": {"value": "600.00", "currency": "USD"},
                "shippingOptions": [{"shippingCost": {"value": "20.00"}}],
                "condition": "Used",
                "seller": {"username": "skyshop", "feedbackScore": 120}
            },
            {
                "itemId": "2",
                "title": "DJI Mini 4 Pro",
                "price": {"value": "760.00"},
                "condition": "New"
            },
            {
                "itemId": "3",
                "title": "Propeller guard case",
                "price": {"value": "15.00"},
                "condition": "New"
            },
            {
                "itemId": "4",
                "title": "DJI Mini 4 Pro drone with extras",
                "price": {"value": "680.00"},
                "condition": "Used"
            }
        ]));

        let search = process_search_results(raw, "DJI Mini 4 Pro", datetime!(2025-05-01 0:00 UTC));
        assert_eq!(search.summary.total_found, 3);
        assert_eq!(search.results[0].total_price, 620.0);
        assert_eq!(search.results[0].seller.username.as_deref(), Some("skyshop"));

        let used = search.summary.conditions["Used"];
        assert_eq!(used.count, 2);
        assert_eq!(used.avg_price, 650.0);
        assert_eq!((used.min, used.max), (620.0, 680.0));
        assert_eq!(search.summary.conditions["New"].avg_price, 760.0);
        assert_eq!(search.summary.overall.max, 760.0);

        assert_eq!(search.price_hint(Condition::Used), Some(650.0));
        assert_eq!(search.price_hint(Condition::New), Some(760.0));
    }

    #[test]
    fn empty_response_yields_empty_summary() {
        let search = process_search_results(
            SearchResponseDto::default(),
            "DJI Neo",
            datetime!(2025-05-01 0:00 UTC),
        );
        assert!(search.results.is_empty());
        assert_eq!(search.summary, ListingSummary::default());
        assert_eq!(search.price_hint(Condition::Used), None);
        assert_eq!(
            ModelPricingUpdate::from_search("DJI Neo", &search).unwrap(),
            None
        );
    }

    #[test]
    fn results_are_capped_after_summary() {
        let items: Vec<Value> = (0..30)
            .map(|idx| {
                json!({
                    "itemId": idx.to_string(),
                    "title": "DJI Neo drone",
                    "price": {"value": "100"},
                    "condition": "Used"
                })
            })
            .collect();
        let search = process_search_results(
            response(Value::Array(items)),
            "DJI Neo",
            datetime!(2025-05-01 0:00 UTC),
        );
        assert_eq!(search.results.len(), MAX_RESULTS_KEPT);
        assert_eq!(search.summary.total_found, 30);
    }

    #[test]
    fn pricing_update_reads_condition_buckets() {
        let raw = response(json!([
            {"itemId": "1", "title": "DJI Air 3S drone", "price": {"value": "1300"}, "condition": "New"},
            {"itemId": "2", "title": "DJI Air 3S drone", "price": {"value": "900"}, "condition": "Used"},
            {"itemId": "3", "title": "DJI Air 3S drone", "price": {"value": "1000"}, "condition": "Used"}
        ]));
        let search = process_search_results(raw, "DJI Air 3S", datetime!(2025-05-01 0:00 UTC));
        let update = ModelPricingUpdate::from_search("DJI Air 3S", &search)
            .unwrap()
            .expect("update");

        assert_eq!(update.ebay_new_price, Some(1300.0));
        assert_eq!(update.ebay_used_price_min, Some(900.0));
        assert_eq!(update.ebay_used_price_max, Some(1000.0));
        assert_eq!(update.ebay_listings_count, 3);
        assert_eq!(update.ebay_price_data["search_query"], "DJI Air 3S");
    }
}
