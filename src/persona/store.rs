//! File-backed profile store.
//!
//! One pretty-printed JSON document per profile, plus an optional PNG snapshot
//! of its last rendered chart, both named after the sanitized profile name:
//!
//! ```text
//! <dir>/jane_doe_persona.json
//! <dir>/jane_doe_persona_radar.png
//! ```
//!
//! There is no locking; the last writer wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::profile::{storage_key, Profile};
use crate::error::StoreError;

const PROFILE_SUFFIX: &str = "_persona.json";
const CHART_SUFFIX: &str = "_persona_radar.png";

/// Listing entry for a stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub key: String,
    pub name: String,
    pub tags: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub has_chart: bool,
}

/// Reads and writes profiles in a single data directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    directory: PathBuf,
}

impl ProfileStore {
    /// Create a store rooted at `directory`. Nothing is created until the first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the JSON document for `name`.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let key = storage_key(name)?;
        Ok(self.directory.join(format!("{}{}", key, PROFILE_SUFFIX)))
    }

    /// Path of the PNG snapshot for `name`.
    pub fn chart_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let key = storage_key(name)?;
        Ok(self.directory.join(format!("{}{}", key, CHART_SUFFIX)))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }
        Ok(())
    }

    /// Write `profile`, stamping `updated_at`. Returns the file written.
    pub fn save(&self, profile: &mut Profile) -> Result<PathBuf, StoreError> {
        let path = self.profile_path(&profile.name)?;
        self.ensure_dir()?;
        profile.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(profile)?;
        fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "saved profile");
        Ok(path)
    }

    /// Load the profile stored for `name`, if any.
    pub fn load(&self, name: &str) -> Result<Option<Profile>, StoreError> {
        let path = self.profile_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Whether a profile document exists for `name`.
    ///
    /// Names that sanitize to nothing never exist.
    pub fn exists(&self, name: &str) -> bool {
        self.profile_path(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Store the PNG snapshot for `name`. Returns the file written.
    pub fn save_chart(&self, name: &str, png: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.chart_path(name)?;
        self.ensure_dir()?;
        fs::write(&path, png)?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "saved chart");
        Ok(path)
    }

    /// Load the PNG snapshot for `name`, if any.
    pub fn load_chart(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.chart_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every stored profile, sorted by key.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<ProfileSummary>, StoreError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(key) = file_name
                .to_str()
                .and_then(|f| f.strip_suffix(PROFILE_SUFFIX))
            else {
                continue;
            };

            let profile: Profile = match fs::read_to_string(entry.path())
                .map_err(StoreError::from)
                .and_then(|c| serde_json::from_str(&c).map_err(StoreError::from))
            {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(file = ?file_name, error = %e, "skipping unreadable profile");
                    continue;
                }
            };

            let has_chart = self
                .directory
                .join(format!("{}{}", key, CHART_SUFFIX))
                .exists();
            summaries.push(ProfileSummary {
                key: key.to_string(),
                name: profile.name,
                tags: profile.tags,
                updated_at: profile.updated_at,
                has_chart,
            });
        }

        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }

    /// Remove the profile and its chart. Returns whether a profile existed.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let existed = remove_if_present(&self.profile_path(name)?)?;
        remove_if_present(&self.chart_path(name)?)?;
        Ok(existed)
    }
}

fn remove_if_present(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
