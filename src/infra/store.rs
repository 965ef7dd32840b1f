//! Saved-analysis storage: Supabase when configured, otherwise a JSON file
//! in the local data directory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::{AnalysisAnalytics, AnalysisSnapshot, DroneModelRow, ModelRecord, StoredAnalysis};
use crate::infra::listings::ModelPricingUpdate;
use crate::infra::supabase::{SupabaseClient, SupabaseError, ANALYTICS_WINDOW};

const STORE_DIR: &str = "drone-import-dashboard";
const STORE_FILENAME: &str = "analyses.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local data directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("analysis {0} not found")]
    NotFound(String),
    #[error("analysis has a non-finite {field}; check the exchange rate and quantity")]
    InvalidSnapshot { field: &'static str },
    #[error(transparent)]
    Remote(#[from] SupabaseError),
}

/// Default location of the local store.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join(STORE_DIR).join(STORE_FILENAME))
}

fn ensure_storable(snapshot: &AnalysisSnapshot) -> Result<(), StoreError> {
    match snapshot.non_finite_field() {
        Some(field) => Err(StoreError::InvalidSnapshot { field }),
        None => Ok(()),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    analyses: Vec<StoredAnalysis>,
    #[serde(default)]
    models: Vec<DroneModelRow>,
}

/// JSON-file store. Writes go through a temp file and a rename.
pub struct LocalAnalysisStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalAnalysisStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        default_store_path()
            .map(Self::new)
            .ok_or(StoreError::StorageUnavailable)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, snapshot: &AnalysisSnapshot) -> Result<StoredAnalysis, StoreError> {
        ensure_storable(snapshot)?;
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;
        let stored = StoredAnalysis {
            id: Uuid::new_v4().to_string(),
            snapshot: snapshot.clone(),
        };
        file.analyses.push(stored.clone());
        self.write(&file)?;
        log::info!("saved analysis {} to {}", stored.id, self.path.display());
        Ok(stored)
    }

    /// Newest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<StoredAnalysis>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut analyses = self.read()?.analyses;
        analyses.sort_by(|a, b| b.snapshot.created_at.cmp(&a.snapshot.created_at));
        analyses.truncate(limit);
        Ok(analyses)
    }

    pub async fn get(&self, id: &str) -> Result<StoredAnalysis, StoreError> {
        let _guard = self.lock.lock().await;
        self.read()?
            .analyses
            .into_iter()
            .find(|analysis| analysis.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;
        let before = file.analyses.len();
        file.analyses.retain(|analysis| analysis.id != id);
        if file.analyses.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write(&file)
    }

    /// Inserts or replaces the row with the same model name.
    pub async fn save_model(&self, row: &DroneModelRow) -> Result<DroneModelRow, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;
        match file
            .models
            .iter_mut()
            .find(|existing| existing.model_name == row.model_name)
        {
            Some(existing) => *existing = row.clone(),
            None => file.models.push(row.clone()),
        }
        self.write(&file)?;
        Ok(row.clone())
    }

    /// Ordered by model name.
    pub async fn list_models(&self) -> Result<Vec<DroneModelRow>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut models = self.read()?.models;
        models.sort_by(|a, b| a.model_name.cmp(&b.model_name));
        Ok(models)
    }

    fn read(&self) -> Result<StoreFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Where saved analyses go.
pub enum AnalysisStore {
    Remote(SupabaseClient),
    Local(LocalAnalysisStore),
}

impl AnalysisStore {
    /// Supabase when it is configured and reachable by URL, else the local file.
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match SupabaseClient::new(config) {
            Ok(client) => {
                log::info!("saving analyses to Supabase");
                Ok(AnalysisStore::Remote(client))
            }
            Err(SupabaseError::NotConfigured) => {
                let local = LocalAnalysisStore::open_default()?;
                log::info!("saving analyses locally at {}", local.path().display());
                Ok(AnalysisStore::Local(local))
            }
            Err(error) => Err(error.into()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStore::Remote(_) => "Supabase",
            AnalysisStore::Local(_) => "local file",
        }
    }

    pub async fn save(&self, snapshot: &AnalysisSnapshot) -> Result<StoredAnalysis, StoreError> {
        ensure_storable(snapshot)?;
        match self {
            AnalysisStore::Remote(client) => Ok(client.save_analysis(snapshot).await?),
            AnalysisStore::Local(store) => store.save(snapshot).await,
        }
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<StoredAnalysis>, StoreError> {
        match self {
            AnalysisStore::Remote(client) => Ok(client.list_analyses(limit).await?),
            AnalysisStore::Local(store) => store.list(limit).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<StoredAnalysis, StoreError> {
        match self {
            AnalysisStore::Remote(client) => match client.get_analysis(id).await {
                Err(SupabaseError::NotFound(id)) => Err(StoreError::NotFound(id)),
                other => Ok(other?),
            },
            AnalysisStore::Local(store) => store.get(id).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self {
            AnalysisStore::Remote(client) => Ok(client.delete_analysis(id).await?),
            AnalysisStore::Local(store) => store.delete(id).await,
        }
    }

    pub async fn analytics(&self) -> Result<AnalysisAnalytics, StoreError> {
        match self {
            AnalysisStore::Remote(client) => Ok(client.analytics().await?),
            AnalysisStore::Local(store) => {
                let recent = store.list(ANALYTICS_WINDOW).await?;
                Ok(AnalysisAnalytics::from_analyses(&recent))
            }
        }
    }

    /// Upserts the catalog entry for a model, keyed by its name.
    pub async fn save_drone_model(&self, record: &ModelRecord) -> Result<DroneModelRow, StoreError> {
        let row = DroneModelRow::from_record(record, OffsetDateTime::now_utc())?;
        match self {
            AnalysisStore::Remote(client) => Ok(client.save_drone_model(&row).await?),
            AnalysisStore::Local(store) => store.save_model(&row).await,
        }
    }

    pub async fn list_drone_models(&self) -> Result<Vec<DroneModelRow>, StoreError> {
        match self {
            AnalysisStore::Remote(client) => Ok(client.list_drone_models().await?),
            AnalysisStore::Local(store) => store.list_models().await,
        }
    }

    /// Records observed eBay pricing for a model. Only Supabase tracks eBay
    /// pricing; the local store skips it.
    pub async fn record_model_pricing(&self, update: &ModelPricingUpdate) -> Result<(), StoreError> {
        match self {
            AnalysisStore::Remote(client) => Ok(client.upsert_model_pricing(update).await?),
            AnalysisStore::Local(_) => {
                log::debug!("no remote store; skipping pricing for {}", update.model_name);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, OffsetDateTime};

    use super::*;
    use crate::domain::{catalog, compute_costs, DroneSpec, TradeParameters};

    fn snapshot(model: &str, created_at: OffsetDateTime) -> AnalysisSnapshot {
        let params = TradeParameters::default();
        let specs = DroneSpec {
            model: model.to_string(),
            ..DroneSpec::default()
        };
        let costs = compute_costs(&params, &specs);
        AnalysisSnapshot::from_breakdown(&params, &specs, &costs, created_at).unwrap()
    }

    #[tokio::test]
    async fn save_list_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAnalysisStore::new(dir.path().join("nested").join(STORE_FILENAME));

        let older = store
            .save(&snapshot("DJI Neo", datetime!(2025-01-01 0:00 UTC)))
            .await
            .unwrap();
        let newer = store
            .save(&snapshot("DJI Air 3S", datetime!(2025-02-01 0:00 UTC)))
            .await
            .unwrap();
        assert_ne!(older.id, newer.id);

        let listed = store.list(10).await.unwrap();
        assert_eq!(listed, vec![newer.clone(), older.clone()]);
        assert_eq!(store.list(1).await.unwrap(), vec![newer.clone()]);

        assert_eq!(store.get(&older.id).await.unwrap(), older);

        store.delete(&older.id).await.unwrap();
        assert!(matches!(
            store.get(&older.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&older.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.list(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_finite_analysis_is_refused_and_store_stays_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalysisStore::Local(LocalAnalysisStore::new(dir.path().join(STORE_FILENAME)));
        let kept = store
            .save(&snapshot("DJI Neo", datetime!(2025-01-01 0:00 UTC)))
            .await
            .unwrap();

        let params = TradeParameters {
            exchange_rate: 0.0,
            ..TradeParameters::default()
        };
        let specs = DroneSpec::default();
        let costs = compute_costs(&params, &specs);
        let broken = AnalysisSnapshot::from_breakdown(
            &params,
            &specs,
            &costs,
            datetime!(2025-01-02 0:00 UTC),
        )
        .unwrap();

        assert!(matches!(
            store.save(&broken).await,
            Err(StoreError::InvalidSnapshot { field: "import_advantage" })
        ));
        if let AnalysisStore::Local(local) = &store {
            assert!(matches!(
                local.save(&broken).await,
                Err(StoreError::InvalidSnapshot { .. })
            ));
        }
        assert_eq!(store.list(10).await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn local_store_upserts_models_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalysisStore::Local(LocalAnalysisStore::new(dir.path().join(STORE_FILENAME)));
        let neo = catalog().model_or_default("DJI Neo");
        let agras = catalog().model_or_default("DJI Agras T30");

        store.save_drone_model(neo).await.unwrap();
        store.save_drone_model(agras).await.unwrap();
        store.save_drone_model(neo).await.unwrap();

        let models = store.list_drone_models().await.unwrap();
        let names: Vec<_> = models.iter().map(|row| row.model_name.as_str()).collect();
        assert_eq!(names, vec!["DJI Agras T30", "DJI Neo"]);
        assert!(store.list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_files_without_models_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILENAME);
        fs::write(&path, r#"{"analyses":[]}"#).unwrap();
        let store = LocalAnalysisStore::new(&path);
        assert!(store.list_models().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAnalysisStore::new(dir.path().join(STORE_FILENAME));
        assert!(store.list(10).await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILENAME);
        fs::write(&path, "not json").unwrap();
        let store = LocalAnalysisStore::new(&path);
        assert!(matches!(store.list(10).await, Err(StoreError::Serde(_))));
    }

    #[tokio::test]
    async fn local_store_computes_analytics() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalysisStore::Local(LocalAnalysisStore::new(dir.path().join(STORE_FILENAME)));
        assert_eq!(store.label(), "local file");

        store
            .save(&snapshot("DJI Neo", datetime!(2025-01-01 0:00 UTC)))
            .await
            .unwrap();
        store
            .save(&snapshot("DJI Neo", datetime!(2025-01-02 0:00 UTC)))
            .await
            .unwrap();

        let analytics = store.analytics().await.unwrap();
        assert_eq!(analytics.count, 2);
        assert_eq!(analytics.total_units, 4);
        assert_eq!(analytics.top_model.as_deref(), Some("DJI Neo"));
    }

    #[tokio::test]
    async fn local_store_skips_model_pricing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILENAME);
        let store = AnalysisStore::Local(LocalAnalysisStore::new(&path));
        let update = ModelPricingUpdate {
            model_name: "DJI Neo".to_string(),
            ebay_new_price: Some(199.0),
            ebay_used_price_min: None,
            ebay_used_price_max: None,
            ebay_listings_count: 3,
            ebay_last_updated: datetime!(2025-01-01 0:00 UTC),
            ebay_price_data: serde_json::Value::Null,
        };

        store.record_model_pricing(&update).await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn unconfigured_supabase_falls_back_to_local() {
        let store = AnalysisStore::from_config(&AppConfig::default());
        if default_store_path().is_some() {
            assert!(matches!(store, Ok(AnalysisStore::Local(_))));
        }
    }
}
