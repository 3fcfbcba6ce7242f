use crate::errors::{Result, StrokesError};
use crate::shots::Shot;
use ndarray::Array1;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shots aggregated over a distance bin
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Bin {
    /// Lower edge of the bin
    pub start: f64,
    /// Mean strokes to hole out of the shots in the bin
    pub mean: f64,
    /// Number of shots in the bin
    pub count: usize,
}

/// Distance bins sorted by ascending lower edge
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Bins(Vec<Bin>);

impl Bins {
    /// Drop bins holding fewer than `min_count` shots
    pub fn retain_min_count(&mut self, min_count: usize) {
        self.0.retain(|bin| bin.count >= min_count);
    }

    /// Bin lower edges
    pub fn distances(&self) -> Array1<f64> {
        self.0.iter().map(|bin| bin.start).collect()
    }

    /// Mean strokes per bin
    pub fn means(&self) -> Array1<f64> {
        self.0.iter().map(|bin| bin.mean).collect()
    }

    /// Number of shots per bin
    pub fn counts(&self) -> Vec<usize> {
        self.0.iter().map(|bin| bin.count).collect()
    }

    /// Bins as a slice
    pub fn as_slice(&self) -> &[Bin] {
        &self.0
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no bin
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Aggregate shots by distance bins of width `bin_size`.
///
/// A shot at distance `d` falls in the bin starting at `floor(d / bin_size) * bin_size`.
pub fn bin_shots(shots: &[Shot], bin_size: f64) -> Result<Bins> {
    if !(bin_size.is_finite() && bin_size > 0.) {
        return Err(StrokesError::InvalidValueError(format!(
            "bin size should be a finite positive value, got {bin_size}"
        )));
    }
    let mut acc: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for shot in shots {
        let key = (shot.holedis / bin_size).floor() as i64;
        let entry = acc.entry(key).or_insert((0., 0));
        entry.0 += shot.shots_to_hole_out;
        entry.1 += 1;
    }
    let bins = acc
        .into_iter()
        .map(|(key, (sum, count))| Bin {
            start: key as f64 * bin_size,
            mean: sum / count as f64,
            count,
        })
        .collect();
    Ok(Bins(bins))
}
