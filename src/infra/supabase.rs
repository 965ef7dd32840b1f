//! Supabase PostgREST client for saved analyses, catalog model rows and eBay
//! model pricing.

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::domain::{AnalysisAnalytics, AnalysisSnapshot, DroneModelRow, StoredAnalysis};
use crate::infra::http::{build_client, send_with_retry};
use crate::infra::listings::ModelPricingUpdate;

const ANALYSES_TABLE: &str = "drone_analyses";
const MODELS_TABLE: &str = "drone_models";
pub const ANALYTICS_WINDOW: usize = 100;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Supabase is not configured")]
    NotConfigured,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Supabase returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("analysis {0} not found")]
    NotFound(String),
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> SupabaseError {
    let message = serde_json::from_str::<PostgrestErrorDto>(body)
        .ok()
        .and_then(|dto| match (dto.message, dto.hint) {
            (Some(message), Some(hint)) => Some(format!("{message} ({hint})")),
            (message, _) => message,
        })
        .unwrap_or_else(|| body.trim().to_string());
    SupabaseError::Api { status, message }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_url: Url,
    anon_key: String,
    retry_attempts: u32,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self, SupabaseError> {
        let (Some(url), Some(anon_key)) = (&config.supabase.url, &config.supabase.anon_key) else {
            return Err(SupabaseError::NotConfigured);
        };

        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: build_client(&config.http)?,
            rest_url: base.join("rest/v1/")?,
            anon_key: anon_key.clone(),
            retry_attempts: config.http.retry_attempts,
        })
    }

    pub async fn save_analysis(
        &self,
        snapshot: &AnalysisSnapshot,
    ) -> Result<StoredAnalysis, SupabaseError> {
        let url = self.table_url(ANALYSES_TABLE)?;
        let response = self
            .authorized(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&[snapshot])
            .send()
            .await?;

        let mut rows: Vec<StoredAnalysis> = read_json(response).await?;
        log::info!("saved analysis for {} to Supabase", snapshot.drone_model);
        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound("inserted row".to_string()))
    }

    /// Most recent analyses first.
    pub async fn list_analyses(&self, limit: usize) -> Result<Vec<StoredAnalysis>, SupabaseError> {
        let mut url = self.table_url(ANALYSES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc")
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    pub async fn get_analysis(&self, id: &str) -> Result<StoredAnalysis, SupabaseError> {
        let mut url = self.table_url(ANALYSES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{id}"));
        let mut rows: Vec<StoredAnalysis> = self.get_json(url).await?;
        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound(id.to_string()))
    }

    pub async fn delete_analysis(&self, id: &str) -> Result<(), SupabaseError> {
        let mut url = self.table_url(ANALYSES_TABLE)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        let response = send_with_retry(
            || self.authorized(self.http.delete(url.clone())),
            self.retry_attempts,
        )
        .await?;
        ensure_success(response).await?;
        log::info!("deleted analysis {id} from Supabase");
        Ok(())
    }

    pub async fn analytics(&self) -> Result<AnalysisAnalytics, SupabaseError> {
        let recent = self.list_analyses(ANALYTICS_WINDOW).await?;
        Ok(AnalysisAnalytics::from_analyses(&recent))
    }

    /// Upserts a catalog row keyed by `model_name` and returns the stored row.
    pub async fn save_drone_model(&self, row: &DroneModelRow) -> Result<DroneModelRow, SupabaseError> {
        let response = self.upsert_model_request(row)?.send().await?;
        let mut rows: Vec<DroneModelRow> = read_json(response).await?;
        log::info!("saved catalog row for {} to Supabase", row.model_name);
        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound(row.model_name.clone()))
    }

    /// Every `drone_models` row, ordered by model name.
    pub async fn list_drone_models(&self) -> Result<Vec<DroneModelRow>, SupabaseError> {
        self.get_json(self.models_url()?).await
    }

    fn upsert_model_request(&self, row: &DroneModelRow) -> Result<RequestBuilder, SupabaseError> {
        let mut url = self.table_url(MODELS_TABLE)?;
        url.query_pairs_mut().append_pair("on_conflict", "model_name");
        Ok(self
            .authorized(self.http.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row]))
    }

    fn models_url(&self) -> Result<Url, url::ParseError> {
        let mut url = self.table_url(MODELS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "model_name");
        Ok(url)
    }

    /// Inserts or updates the model's eBay pricing row, keyed by model name.
    pub async fn upsert_model_pricing(
        &self,
        update: &ModelPricingUpdate,
    ) -> Result<(), SupabaseError> {
        let mut url = self.table_url(MODELS_TABLE)?;
        url.query_pairs_mut().append_pair("on_conflict", "model_name");
        let response = self
            .authorized(self.http.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[update])
            .send()
            .await?;
        ensure_success(response).await?;
        log::info!("updated eBay pricing for {}", update.model_name);
        Ok(())
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let response = send_with_retry(
            || self.authorized(self.http.get(url.clone())),
            self.retry_attempts,
        )
        .await?;
        read_json(response).await
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn table_url(&self, table: &str) -> Result<Url, url::ParseError> {
        self.rest_url.join(table)
    }
}

async fn ensure_success(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

async fn read_json<T>(response: Response) -> Result<T, SupabaseError>
where
    T: DeserializeOwned,
{
    Ok(ensure_success(response).await?.json().await?)
}
