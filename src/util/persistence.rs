use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use crate::domain::app_state::PersistedState;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "DroneImport";
const APP_NAME: &str = "DroneImportDashboard";

fn data_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("state.json"))
}

/// Last used parameters, if any were saved and are still readable.
pub fn load_persisted_state() -> Option<PersistedState> {
    load_from(&data_file()?)
}

pub fn save_persisted_state(state: &PersistedState) -> Result<(), PersistSaveError> {
    let path = data_file().ok_or(PersistSaveError::StorageUnavailable)?;
    save_to(&path, state)
}

pub fn load_from(path: &Path) -> Option<PersistedState> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(state) => Some(state),
        Err(err) => {
            log::warn!("ignoring unreadable state file {}: {err}", path.display());
            None
        }
    }
}

pub fn save_to(path: &Path, state: &PersistedState) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, DroneSpec, TradeParameters};

    #[test]
    fn state_survives_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("state.json");
        let state = PersistedState {
            params: TradeParameters {
                quantity: 5,
                exchange_rate: 1400.0,
                ..TradeParameters::default()
            },
            specs: DroneSpec {
                model: "DJI Air 3S".to_string(),
                condition: Condition::New,
                ..DroneSpec::default()
            },
        };

        save_to(&path, &state).unwrap();
        assert_eq!(load_from(&path), Some(state));
    }

    #[test]
    fn missing_or_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        assert_eq!(load_from(&path), None);

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_from(&path), None);
    }

    #[test]
    fn empty_state_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(load_from(&path), Some(PersistedState::default()));
    }
}
