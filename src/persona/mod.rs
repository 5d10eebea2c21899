//! Persona profiles: the data model, the on-disk store, and survey setup.
//!
//! # Layout
//!
//! ```text
//! profile  — Profile / SkillRating / InterestRating, name sanitization, validation
//! store    — ProfileStore: one JSON document (+ optional PNG) per sanitized name
//! survey   — animal catalog and random category selection
//! ```

pub mod profile;
pub mod store;
pub mod survey;

pub use profile::{
    sanitize_name, storage_key, InterestRating, Profile, ProfileRow, SkillRating, MAX_SKILL,
    MIN_SCORE,
};
pub use store::{ProfileStore, ProfileSummary};
pub use survey::{random_animals, random_animals_with, ANIMALS, DEFAULT_SURVEY_SIZE};
