//! Animal catalog and random category selection for new surveys.

use rand::seq::SliceRandom;
use rand::Rng;

/// Categories a survey can ask about.
pub const ANIMALS: [&str; 10] = [
    "Lion", "Eagle", "Dolphin", "Wolf", "Elephant", "Giraffe", "Penguin", "Bear", "Fox", "Owl",
];

/// Number of animals a new survey asks about.
pub const DEFAULT_SURVEY_SIZE: usize = 5;

/// Pick `count` distinct animals using the thread-local RNG.
pub fn random_animals(count: usize) -> Vec<String> {
    random_animals_with(&mut rand::thread_rng(), count)
}

/// Pick `count` distinct animals from the catalog, without replacement.
///
/// `count` is capped at the catalog size.
pub fn random_animals_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    ANIMALS
        .choose_multiple(rng, count.min(ANIMALS.len()))
        .map(|a| a.to_string())
        .collect()
}
