use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::error::WeightError;
use super::presets::Preset;
use super::sliders::SliderSet;

const STORE_VERSION: u32 = 1;

/// Saved slider weights, one entry per ranking domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightStore {
    pub version: u32,
    #[serde(default)]
    pub domains: HashMap<String, SavedWeights>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedWeights {
    pub sliders: Preset,
    pub updated_at: DateTime<Utc>,
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightStore {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            domains: HashMap::new(),
        }
    }

    pub fn get(&self, domain_id: &str) -> Option<&SavedWeights> {
        self.domains.get(domain_id)
    }

    /// Record a domain's sliders. Only balanced sets can be saved.
    pub fn save(&mut self, domain_id: &str, sliders: &SliderSet) -> Result<(), WeightError> {
        sliders.ensure_balanced()?;
        self.domains.insert(
            domain_id.to_string(),
            SavedWeights {
                sliders: sliders.to_map(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Forget a domain's custom weights.
    /// Returns true if weights were previously saved, false otherwise
    pub fn reset(&mut self, domain_id: &str) -> bool {
        self.domains.remove(domain_id).is_some()
    }

    /// Restore a domain's saved values onto its default sliders.
    ///
    /// Returns `Ok(None)` when nothing is saved. A saved set that no longer
    /// matches the domain's sliders (schema changed since) is an error.
    pub fn restore(
        &self,
        domain_id: &str,
        defaults: &SliderSet,
    ) -> Result<Option<SliderSet>, WeightError> {
        let Some(saved) = self.get(domain_id) else {
            return Ok(None);
        };
        let mut sliders = defaults.clone();
        sliders.apply_values(&saved.sliders)?;
        Ok(Some(sliders))
    }
}

/// Get the default weight store path (~/.config/placerank/weights.json)
pub fn get_weights_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("weights.json"))
}

/// Load the weight store from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_weight_store(path: &Path) -> Result<WeightStore> {
    if !path.exists() {
        return Ok(WeightStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open weight store at {}", path.display()))?;

    let store: WeightStore =
        serde_json::from_reader(file).context("Failed to load weight store")?;

    if store.version != STORE_VERSION {
        anyhow::bail!("Unsupported weight store version: {}", store.version);
    }

    Ok(store)
}

/// Save the weight store to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_weight_store(path: &Path, store: &WeightStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize weight store")?;

    file.commit().context("Failed to save weight store")?;

    Ok(())
}
