//! Polar geometry for the skills-vs-interests radar chart.
//!
//! N categories are spread evenly around the circle, `angle(i) = i / N * 2π`,
//! and every series is closed by repeating its first point, so all vectors
//! here have length N + 1.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::ChartError;
use crate::persona::{InterestRating, SkillRating, MAX_SKILL};

/// Upper radial limit of the chart. The lower limit is 0.
pub const RADIAL_MAX: f64 = MAX_SKILL as f64;

/// Radii at which grid rings and tick marks are drawn.
pub const RADIAL_TICKS: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

/// Evenly spaced angles for `n` categories, first angle repeated at the end.
pub fn angles(n: usize) -> Result<Vec<f64>, ChartError> {
    if n == 0 {
        return Err(ChartError::NoCategories);
    }
    let open: Vec<f64> = (0..n).map(|i| i as f64 / n as f64 * 2.0 * PI).collect();
    Ok(close_loop(&open))
}

/// Copy `values` with the first element appended. Empty input stays empty.
pub fn close_loop<T: Clone>(values: &[T]) -> Vec<T> {
    let mut closed = values.to_vec();
    if let Some(first) = values.first() {
        closed.push(first.clone());
    }
    closed
}

/// Map an interest on a `1..=interest_max` scale onto the 0..=5 display range.
pub fn scale_interest(value: f64, interest_max: u8) -> f64 {
    value * RADIAL_MAX / f64::from(interest_max)
}

/// A category label and the angle of its spoke.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub category: String,
    pub angle: f64,
}

/// Which of the two plotted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Skills,
    Interests,
}

/// Closed polygons for both series on a shared polar axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarGeometry {
    pub categories: Vec<String>,
    /// Length N + 1.
    pub angles: Vec<f64>,
    /// Skill radii, length N + 1.
    pub skills: Vec<f64>,
    /// Interest radii after rescaling, length N + 1.
    pub interests: Vec<f64>,
}

impl RadarGeometry {
    /// Build the chart geometry from aligned skill and interest ratings.
    ///
    /// The two lists must have the same length and name the same animal at
    /// each position.
    pub fn from_ratings(
        skills: &[SkillRating],
        interests: &[InterestRating],
        interest_max: u8,
    ) -> Result<Self, ChartError> {
        if interest_max == 0 {
            return Err(ChartError::InvalidScale(interest_max));
        }
        if skills.len() != interests.len() {
            return Err(ChartError::LengthMismatch {
                skills: skills.len(),
                interests: interests.len(),
            });
        }
        if let Some((index, (s, i))) = skills
            .iter()
            .zip(interests)
            .enumerate()
            .find(|(_, (s, i))| s.animal != i.animal)
        {
            return Err(ChartError::CategoryMismatch {
                index,
                skill: s.animal.clone(),
                interest: i.animal.clone(),
            });
        }

        let angles = angles(skills.len())?;
        let categories = skills.iter().map(|s| s.animal.clone()).collect();
        let skill_values: Vec<f64> = skills.iter().map(|s| f64::from(s.skill)).collect();
        let interest_values: Vec<f64> = interests
            .iter()
            .map(|i| scale_interest(f64::from(i.interest), interest_max))
            .collect();

        Ok(Self {
            categories,
            angles,
            skills: close_loop(&skill_values),
            interests: close_loop(&interest_values),
        })
    }

    /// Number of categories (N).
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Spoke labels and angles, without the closing duplicate.
    pub fn axes(&self) -> Vec<Axis> {
        self.categories
            .iter()
            .zip(&self.angles)
            .map(|(category, angle)| Axis {
                category: category.clone(),
                angle: *angle,
            })
            .collect()
    }

    pub fn values(&self, series: Series) -> &[f64] {
        match series {
            Series::Skills => &self.skills,
            Series::Interests => &self.interests,
        }
    }

    /// Pixel coordinates of a series' closed polygon.
    ///
    /// Theta 0 points east and grows counter-clockwise; image y grows
    /// downward. Radii are clamped to `[0, RADIAL_MAX]`, and `RADIAL_MAX`
    /// maps to `radius_px`.
    pub fn to_cartesian(
        &self,
        series: Series,
        center: (f64, f64),
        radius_px: f64,
    ) -> Vec<(f64, f64)> {
        self.angles
            .iter()
            .zip(self.values(series))
            .map(|(theta, r)| polar_to_pixel(*theta, *r, center, radius_px))
            .collect()
    }
}

/// Project one polar point onto the canvas.
pub fn polar_to_pixel(theta: f64, r: f64, center: (f64, f64), radius_px: f64) -> (f64, f64) {
    let scaled = r.clamp(0.0, RADIAL_MAX) / RADIAL_MAX * radius_px;
    (
        center.0 + scaled * theta.cos(),
        center.1 - scaled * theta.sin(),
    )
}

// ============================================================================
// Tests
// ============================================================================
