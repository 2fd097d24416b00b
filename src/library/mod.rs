use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SimError;
use crate::Result;

/// One stored strategy: script text plus free-form configuration and tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub id: String,
    pub name: String,
    pub script: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JSON-file backed library of named strategies
///
/// A missing or corrupt file reads as an empty library; every mutation
/// rewrites the whole file.
pub struct StrategyLibrary {
    path: PathBuf,
}

impl StrategyLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Library file under the user data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("stratsim")
            .join("strategy_library.json")
    }

    pub fn open_default() -> Self {
        Self::new(Self::default_path())
    }

    fn load(&self) -> Vec<StrategyRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "Strategy library at {} is corrupt ({}); treating as empty",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[StrategyRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// All stored strategies, in insertion order
    pub fn list(&self) -> Vec<StrategyRecord> {
        self.load()
    }

    /// Find a strategy by id, falling back to an exact name match
    pub fn get(&self, id_or_name: &str) -> Option<StrategyRecord> {
        let records = self.load();
        records
            .iter()
            .find(|r| r.id == id_or_name)
            .or_else(|| records.iter().find(|r| r.name == id_or_name))
            .cloned()
    }

    /// Store a new strategy; names must be unique
    pub fn add(
        &self,
        name: &str,
        script: &str,
        config: serde_json::Value,
        tags: Vec<String>,
    ) -> Result<StrategyRecord> {
        let mut records = self.load();

        if records.iter().any(|r| r.name == name) {
            return Err(SimError::StrategyExists(name.to_string()));
        }

        let now = Utc::now();
        let record = StrategyRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            script: script.to_string(),
            config,
            tags,
            created_at: now,
            updated_at: now,
        };

        records.push(record.clone());
        self.save(&records)?;

        tracing::info!("Added strategy '{}' ({})", record.name, record.id);
        Ok(record)
    }

    /// Update fields of an existing strategy; None leaves a field unchanged
    pub fn update(
        &self,
        id_or_name: &str,
        script: Option<&str>,
        config: Option<serde_json::Value>,
        tags: Option<Vec<String>>,
    ) -> Result<StrategyRecord> {
        let mut records = self.load();

        let record = records
            .iter_mut()
            .find(|r| r.id == id_or_name || r.name == id_or_name)
            .ok_or_else(|| SimError::StrategyNotFound(id_or_name.to_string()))?;

        if let Some(script) = script {
            record.script = script.to_string();
        }
        if let Some(config) = config {
            record.config = config;
        }
        if let Some(tags) = tags {
            record.tags = tags;
        }
        record.updated_at = Utc::now();

        let updated = record.clone();
        self.save(&records)?;
        Ok(updated)
    }

    /// Remove a strategy by id or name
    pub fn delete(&self, id_or_name: &str) -> Result<()> {
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| r.id != id_or_name && r.name != id_or_name);

        if records.len() == before {
            return Err(SimError::StrategyNotFound(id_or_name.to_string()));
        }

        self.save(&records)?;
        tracing::info!("Deleted strategy '{}'", id_or_name);
        Ok(())
    }
}
