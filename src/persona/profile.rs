//! Persona profile types, name sanitization, and validation.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Lowest score on either scale.
pub const MIN_SCORE: u8 = 1;

/// Highest skill score, and the top of the chart's display range.
pub const MAX_SKILL: u8 = 5;

static DISALLOWED_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N} _\-]").unwrap());

/// Derive the storage key for a display name.
///
/// Lowercases, drops everything except letters and digits (in any script),
/// spaces, hyphens and underscores, then turns spaces into underscores.
/// `"Jane Doe!!"` becomes `"jane_doe"`, `"Zoë"` becomes `"zoë"`.
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    DISALLOWED_NAME_CHARS
        .replace_all(&lowered, "")
        .trim()
        .replace(' ', "_")
}

/// Like [`sanitize_name`] but rejects names that sanitize to nothing.
pub fn storage_key(name: &str) -> Result<String, ProfileError> {
    let key = sanitize_name(name);
    if key.is_empty() {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(key)
}

/// Self-rated skill for one animal category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRating {
    pub animal: String,
    pub skill: u8,
}

impl SkillRating {
    pub fn new(animal: impl Into<String>, skill: u8) -> Self {
        Self {
            animal: animal.into(),
            skill,
        }
    }
}

/// Self-rated interest for one animal category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRating {
    pub animal: String,
    pub interest: u8,
}

impl InterestRating {
    pub fn new(animal: impl Into<String>, interest: u8) -> Self {
        Self {
            animal: animal.into(),
            interest,
        }
    }
}

/// A named user's stored skill and interest ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub skills: Vec<SkillRating>,
    pub interests: Vec<InterestRating>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set by the store on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One line of the combined skills/interests table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRow {
    pub animal: String,
    pub skill: u8,
    pub interest: Option<u8>,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        skills: Vec<SkillRating>,
        interests: Vec<InterestRating>,
    ) -> Self {
        Self {
            name: name.into(),
            skills,
            interests,
            tags: Vec::new(),
            updated_at: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Storage key derived from the profile name.
    pub fn key(&self) -> Result<String, ProfileError> {
        storage_key(&self.name)
    }

    /// Check the profile is complete and every score is on its scale.
    ///
    /// Interests are checked against `interest_max`; skills always use 1..=5.
    /// Series alignment is left to the chart builder.
    pub fn validate(&self, interest_max: u8) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::Missing("name"));
        }
        storage_key(&self.name)?;
        if self.skills.is_empty() {
            return Err(ProfileError::Missing("skills"));
        }
        if self.interests.is_empty() {
            return Err(ProfileError::Missing("interests"));
        }

        for entry in &self.skills {
            check_entry(&entry.animal, entry.skill, MAX_SKILL, "skill")?;
        }
        for entry in &self.interests {
            check_entry(&entry.animal, entry.interest, interest_max, "interest")?;
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ProfileError::Malformed("tags must not be blank".into()));
        }
        Ok(())
    }

    /// Skills joined with interests by animal, in skill order.
    pub fn rows(&self) -> Vec<ProfileRow> {
        self.skills
            .iter()
            .map(|s| ProfileRow {
                animal: s.animal.clone(),
                skill: s.skill,
                interest: self
                    .interests
                    .iter()
                    .find(|i| i.animal == s.animal)
                    .map(|i| i.interest),
            })
            .collect()
    }
}

fn check_entry(animal: &str, score: u8, max: u8, metric: &str) -> Result<(), ProfileError> {
    if animal.trim().is_empty() {
        return Err(ProfileError::Malformed(format!("{} entry has no animal", metric)));
    }
    if !(MIN_SCORE..=max).contains(&score) {
        return Err(ProfileError::Malformed(format!(
            "{} for {} must be between {} and {}, got {}",
            metric, animal, MIN_SCORE, max, score
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
