//! Asynchronous client for the eBay Browse API.
//!
//! - Client-credentials OAuth token, reused until shortly before expiry.
//! - At most one request every 200 ms.
//! - Per-search in-memory cache with stale fallbacks when eBay is unreachable.
//!   Entries older than a day are dropped whenever a new search is stored.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant, SystemTime},
};

use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::config::{AppConfig, EbayCredentials};
use crate::infra::http::{build_client, send_with_retry};
use crate::infra::listings::{
    prepare_search_query, process_search_results, ListingOptions, ListingSearch,
    SearchResponseDto, DRONE_CATEGORY_ID,
};

/// Space-separated scopes requested with the client-credentials grant.
const OAUTH_SCOPES: &str =
    "https://api.ebay.com/oauth/api_scope https://api.ebay.com/oauth/api_scope/buy.item.feed";
const MARKETPLACE_ID: &str = "EBAY_US";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(200);
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Cached searches past this age no longer serve as stale fallbacks.
const CACHE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum EbayClientError {
    #[error("eBay credentials are not configured")]
    NotConfigured,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("eBay authentication failed: {0}")]
    Auth(String),
    #[error("eBay search failed: {0}")]
    Api(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

/// Spaces requests at least `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

struct AccessToken {
    value: String,
    valid_until: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UsageStats {
    pub request_count: u64,
    pub cache_size: usize,
    pub token_valid: bool,
}

#[derive(Clone)]
pub struct EbayClient {
    http: Client,
    credentials: EbayCredentials,
    auth_url: Url,
    browse_url: Url,
    ttl: Duration,
    retry_attempts: u32,
    token: Arc<Mutex<Option<AccessToken>>>,
    cache: Arc<Mutex<HashMap<String, Cached<ListingSearch>>>>,
    limiter: Arc<RateLimiter>,
    request_count: Arc<AtomicU64>,
}

impl EbayClient {
    pub fn new(config: &AppConfig) -> Result<Self, EbayClientError> {
        let credentials = config
            .ebay
            .credentials()
            .ok_or(EbayClientError::NotConfigured)?;
        let environment = config.ebay.environment;
        log::info!("eBay client using {environment} endpoints");

        Ok(Self {
            http: build_client(&config.http)?,
            credentials,
            auth_url: Url::parse(environment.auth_url())?,
            browse_url: Url::parse(environment.browse_url())?,
            ttl: config.listings_cache_ttl,
            retry_attempts: config.http.retry_attempts,
            token: Arc::new(Mutex::new(None)),
            cache: Arc::new(Mutex::new(HashMap::new())),
            limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Searches listings for a catalog model. Fresh cache entries are served
    /// without a request; on failure a stale entry is served when present.
    pub async fn search_listings(
        &self,
        model: &str,
        options: &ListingOptions,
    ) -> Result<CachedPayload<ListingSearch>, EbayClientError> {
        let key = cache_key(model, options);
        if let Some(payload) = self.cached(&key).await {
            log::debug!("serving cached eBay listings for {model}");
            return Ok(payload);
        }

        match self.fetch_listings(model, options).await {
            Ok(search) => {
                log::info!(
                    "eBay returned {} relevant listings for {model}",
                    search.summary.total_found
                );
                Ok(self.store(key, search).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_stale(&key).await {
                    log::warn!("eBay search for {model} failed ({error}); serving stale listings");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn usage_stats(&self) -> UsageStats {
        let token_valid = self
            .token
            .lock()
            .await
            .as_ref()
            .is_some_and(|token| Instant::now() < token.valid_until);
        UsageStats {
            request_count: self.request_count.load(Ordering::Relaxed),
            cache_size: self.cache.lock().await.len(),
            token_valid,
        }
    }

    async fn fetch_listings(
        &self,
        model: &str,
        options: &ListingOptions,
    ) -> Result<ListingSearch, EbayClientError> {
        self.limiter.acquire().await;
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let token = self.access_token().await?;
        let url = self.search_url(model, options)?;

        let response = send_with_retry(
            || {
                self.http
                    .get(url.clone())
                    .bearer_auth(&token)
                    .header("X-EBAY-C-MARKETPLACE-ID", MARKETPLACE_ID)
            },
            self.retry_attempts,
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EbayClientError::Api(status.to_string()));
        }

        let raw: SearchResponseDto = response.json().await?;
        Ok(process_search_results(raw, model, OffsetDateTime::now_utc()))
    }

    fn search_url(&self, model: &str, options: &ListingOptions) -> Result<Url, url::ParseError> {
        let mut url = self.browse_url.join("item_summary/search")?;
        url.query_pairs_mut()
            .append_pair("q", &prepare_search_query(model))
            .append_pair("category_ids", DRONE_CATEGORY_ID)
            .append_pair("filter", &options.filter())
            .append_pair("sort", options.sort_order())
            .append_pair("limit", &options.page_size().to_string())
            .append_pair("offset", &options.offset.to_string());
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, EbayClientError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if Instant::now() < current.valid_until {
                return Ok(current.value.clone());
            }
        }

        log::debug!("requesting eBay OAuth token");
        let response = self.token_request().send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EbayClientError::Auth(status.to_string()));
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *token = Some(AccessToken {
            value: body.access_token.clone(),
            valid_until: Instant::now() + lifetime,
        });
        Ok(body.access_token)
    }

    fn token_request(&self) -> RequestBuilder {
        self.http
            .post(self.auth_url.clone())
            .basic_auth(&self.credentials.app_id, Some(&self.credentials.cert_id))
            .form(&[("grant_type", "client_credentials"), ("scope", OAUTH_SCOPES)])
    }

    async fn cached(&self, key: &str) -> Option<CachedPayload<ListingSearch>> {
        let cache = self.cache.lock().await;
        cache.get(key).and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_stale(&self, key: &str) -> Option<CachedPayload<ListingSearch>> {
        let cache = self.cache.lock().await;
        cache.get(key).map(Cached::stale)
    }

    async fn store(&self, key: String, data: ListingSearch) -> CachedPayload<ListingSearch> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);
        let mut cache = self.cache.lock().await;
        let pruned = prune_older_than(&mut cache, fetched_at, CACHE_MAX_AGE);
        if pruned > 0 {
            log::debug!("dropped {pruned} expired eBay searches from the cache");
        }
        cache.insert(key, Cached::new(data, fetched_at));
        payload
    }
}

/// Removes entries fetched more than `max_age` before `now` and returns how
/// many were dropped. Entries stamped after `now` are kept.
fn prune_older_than<T>(
    cache: &mut HashMap<String, Cached<T>>,
    now: SystemTime,
    max_age: Duration,
) -> usize {
    let before = cache.len();
    cache.retain(|_, entry| {
        now.duration_since(entry.fetched_at)
            .map(|age| age <= max_age)
            .unwrap_or(true)
    });
    before - cache.len()
}

/// Model name plus the serialized options.
pub fn cache_key(model: &str, options: &ListingOptions) -> String {
    let options = serde_json::to_string(options).unwrap_or_default();
    format!("{model}-{options}")
}
