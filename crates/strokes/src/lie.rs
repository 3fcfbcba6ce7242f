//! Lie types and their per-lie regression settings.

use crate::errors::{Result, StrokesError};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the ball lies before the shot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Lie {
    /// Tee shot
    Tee,
    /// Fairway
    Fairway,
    /// Rough
    Rough,
    /// Bunker
    Sand,
    /// Deep rough
    DeepRough,
    /// Putting green, distances in feet
    Green,
}

impl Lie {
    /// All lies, in display order
    pub const ALL: [Lie; 6] = [
        Lie::Tee,
        Lie::Fairway,
        Lie::Rough,
        Lie::Sand,
        Lie::DeepRough,
        Lie::Green,
    ];

    /// Label of the lie as found in shot files
    pub fn as_str(&self) -> &'static str {
        match self {
            Lie::Tee => "tee",
            Lie::Fairway => "fairway",
            Lie::Rough => "rough",
            Lie::Sand => "sand",
            Lie::DeepRough => "deep_rough",
            Lie::Green => "green",
        }
    }
}

impl fmt::Display for Lie {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lie {
    type Err = StrokesError;

    /// Case insensitive, `deep rough` and `deep-rough` are accepted for `deep_rough`
    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_lowercase().replace([' ', '-'], "_");
        Lie::ALL
            .iter()
            .find(|lie| lie.as_str() == label)
            .copied()
            .ok_or_else(|| StrokesError::InvalidValueError(format!("unknown lie '{s}'")))
    }
}

/// Distances kept for a lie before binning
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum DistanceRange {
    /// Keep distances `>= bound`
    AtLeast(f64),
    /// Keep distances `<= bound`
    AtMost(f64),
    /// Keep every distance
    All,
}

impl DistanceRange {
    /// Whether `distance` is kept
    pub fn contains(&self, distance: f64) -> bool {
        match *self {
            DistanceRange::AtLeast(bound) => distance >= bound,
            DistanceRange::AtMost(bound) => distance <= bound,
            DistanceRange::All => true,
        }
    }
}

/// Regression settings of a lie: distance filtering, binning, scaling and GP hyperparameters.
///
/// Defaults:
///
/// | lie   | range       | bin      | min shots | scale  | lam | sig | grid |
/// |-------|-------------|----------|-----------|--------|-----|-----|------|
/// | tee   | >= 80 yds   | 5 yds    | 5         | 1/300  | 0.3 | 0.2 | 200  |
/// | other | <= 250 yds  | 5 yds    | 5         | 1/300  | 0.3 | 0.2 | 200  |
/// | green | <= 90 ft    | 1 ft     | 10        | 1/90   | 0.3 | 0.2 | 300  |
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct LieProfile {
    pub(crate) lie: Lie,
    pub(crate) range: DistanceRange,
    pub(crate) bin_size: f64,
    pub(crate) min_count: usize,
    pub(crate) scale: f64,
    pub(crate) length_scale: f64,
    pub(crate) noise_std: f64,
    pub(crate) n_grid: usize,
}

impl LieProfile {
    /// Default settings for the given lie
    pub fn new(lie: Lie) -> LieProfile {
        let long_game = LieProfile {
            lie,
            range: DistanceRange::AtMost(250.),
            bin_size: 5.,
            min_count: 5,
            scale: 1. / 300.,
            length_scale: 0.3,
            noise_std: 0.2,
            n_grid: 200,
        };
        match lie {
            Lie::Tee => LieProfile {
                range: DistanceRange::AtLeast(80.),
                ..long_game
            },
            Lie::Green => LieProfile {
                range: DistanceRange::AtMost(90.),
                bin_size: 1.,
                min_count: 10,
                scale: 1. / 90.,
                n_grid: 300,
                ..long_game
            },
            _ => long_game,
        }
    }

    /// Set the kept distance range
    pub fn range(mut self, range: DistanceRange) -> Self {
        self.range = range;
        self
    }

    /// Set the bin width, in distance units
    pub fn bin_size(mut self, bin_size: f64) -> Self {
        self.bin_size = bin_size;
        self
    }

    /// Set the minimum number of shots for a bin to be used as training point
    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    /// Set the factor applied to distances before regression
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the GP length-scale, in scaled distance units
    pub fn length_scale(mut self, length_scale: f64) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Set the GP noise standard deviation, in strokes
    pub fn noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    /// Set the number of prediction points
    pub fn n_grid(mut self, n_grid: usize) -> Self {
        self.n_grid = n_grid;
        self
    }

    /// Lie
    pub fn lie(&self) -> Lie {
        self.lie
    }

    /// Kept distance range
    pub fn distance_range(&self) -> DistanceRange {
        self.range
    }

    /// Bin width
    pub fn bin_width(&self) -> f64 {
        self.bin_size
    }

    /// Minimum number of shots per bin
    pub fn min_shots(&self) -> usize {
        self.min_count
    }

    /// Distance scaling factor
    pub fn distance_scale(&self) -> f64 {
        self.scale
    }

    /// GP hyperparameters `(length_scale, noise_std)`
    pub fn hyperparameters(&self) -> (f64, f64) {
        (self.length_scale, self.noise_std)
    }

    /// Number of prediction points
    pub fn grid_size(&self) -> usize {
        self.n_grid
    }

    /// Check binning and scaling settings, GP hyperparameters are checked by the regression
    pub(crate) fn check(&self) -> Result<()> {
        if !(self.bin_size.is_finite() && self.bin_size > 0.) {
            return Err(StrokesError::InvalidValueError(format!(
                "{}: bin size should be a finite positive value, got {}",
                self.lie, self.bin_size
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.) {
            return Err(StrokesError::InvalidValueError(format!(
                "{}: distance scale should be a finite positive value, got {}",
                self.lie, self.scale
            )));
        }
        if self.min_count == 0 || self.n_grid == 0 {
            return Err(StrokesError::InvalidValueError(format!(
                "{}: minimum shots per bin and grid size should be at least 1",
                self.lie
            )));
        }
        Ok(())
    }
}

/// Default profiles of every lie
pub fn standard_profiles() -> Vec<LieProfile> {
    Lie::ALL.iter().map(|&lie| LieProfile::new(lie)).collect()
}
