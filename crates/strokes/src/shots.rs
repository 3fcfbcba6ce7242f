//! Shot records loaded from CSV files.
//!
//! Expected headers are `holedis` (distance to the hole before the shot) and
//! `shots_to_hole_out` (strokes needed from there, this shot included).
//! An optional `lie` column labels the lie of each shot and an optional `pickup` column
//! flags picked up balls (`1`); other columns are ignored.

use crate::errors::Result;
use crate::lie::Lie;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// A single shot observation
#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    /// Distance to the hole before the shot
    pub holedis: f64,
    /// Strokes needed to hole out from `holedis`
    pub shots_to_hole_out: f64,
    /// Lie before the shot, when known
    pub lie: Option<Lie>,
}

impl Shot {
    /// A shot with no lie label
    pub fn new(holedis: f64, shots_to_hole_out: f64) -> Shot {
        Shot {
            holedis,
            shots_to_hole_out,
            lie: None,
        }
    }

    /// Set the lie label
    pub fn with_lie(mut self, lie: Lie) -> Shot {
        self.lie = Some(lie);
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawShot {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    holedis: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    shots_to_hole_out: Option<f64>,
    #[serde(default)]
    lie: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pickup: Option<f64>,
}

/// Read shots from CSV data with headers.
///
/// Rows with a missing or non-finite distance or strokes value are dropped, as well as
/// picked up balls and shots with a non-positive distance to the hole.
/// Unknown lie labels are dropped too (the shot is kept without lie).
pub fn read_shots<R: Read>(reader: R) -> Result<Vec<Shot>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut shots = Vec::new();
    let mut n_dropped = 0;
    let mut unknown_lies: BTreeMap<String, usize> = BTreeMap::new();
    for record in rdr.deserialize() {
        let raw: RawShot = record?;
        if raw.pickup == Some(1.) {
            n_dropped += 1;
            continue;
        }
        match (raw.holedis, raw.shots_to_hole_out) {
            (Some(holedis), Some(strokes))
                if holedis.is_finite() && holedis > 0. && strokes.is_finite() =>
            {
                let lie = match raw.lie.as_deref().filter(|l| !l.is_empty()) {
                    Some(label) => match label.parse::<Lie>() {
                        Ok(lie) => Some(lie),
                        Err(_) => {
                            *unknown_lies.entry(label.to_string()).or_insert(0) += 1;
                            None
                        }
                    },
                    None => None,
                };
                shots.push(Shot {
                    holedis,
                    shots_to_hole_out: strokes,
                    lie,
                });
            }
            _ => n_dropped += 1,
        }
    }
    if n_dropped > 0 {
        debug!(
            "{} rows with missing values, non-positive distance or pickup dropped",
            n_dropped
        );
    }
    for (label, count) in unknown_lies.iter() {
        warn!("unknown lie '{}' for {} shots, lie ignored", label, count);
    }
    Ok(shots)
}

/// Load shots from the CSV file at `path`, see [`read_shots`]
pub fn load_shots<P: AsRef<Path>>(path: P) -> Result<Vec<Shot>> {
    let file = std::fs::File::open(path.as_ref())?;
    let shots = read_shots(std::io::BufReader::new(file))?;
    debug!("{} shots loaded from {}", shots.len(), path.as_ref().display());
    Ok(shots)
}

/// Split labelled shots by lie, unlabelled shots are left out
pub fn group_by_lie(shots: &[Shot]) -> BTreeMap<Lie, Vec<Shot>> {
    let mut groups: BTreeMap<Lie, Vec<Shot>> = BTreeMap::new();
    for shot in shots {
        if let Some(lie) = shot.lie {
            groups.entry(lie).or_default().push(shot.clone());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_shots() {
        let data = "\
roundid,holedis,shots_to_hole_out,lie
1,412,4,tee
1,160.5,3,fairway
1,,2,green
1,12,,green
1,NA,2,rough
2,35,2,Deep Rough
2,8,1,
";
        let shots = read_shots(data.as_bytes()).unwrap();
        assert_eq!(shots.len(), 4);
        assert_eq!(shots[0], Shot::new(412., 4.).with_lie(Lie::Tee));
        assert_eq!(shots[1], Shot::new(160.5, 3.).with_lie(Lie::Fairway));
        assert_eq!(shots[2].lie, Some(Lie::DeepRough));
        assert_eq!(shots[3], Shot::new(8., 1.));
    }

    #[test]
    fn test_read_shots_without_lie_column() {
        let data = "holedis,shots_to_hole_out\n120,3\n95,3\n";
        let shots = read_shots(data.as_bytes()).unwrap();
        assert_eq!(shots, vec![Shot::new(120., 3.), Shot::new(95., 3.)]);
    }

    #[test]
    fn test_pickups_and_non_positive_distances_are_dropped() {
        let data = "\
holedis,shots_to_hole_out,pickup
120,3,0
0,1,0
-4.5,2,
35,2,1
8,1,
";
        let shots = read_shots(data.as_bytes()).unwrap();
        assert_eq!(shots, vec![Shot::new(120., 3.), Shot::new(8., 1.)]);
    }

    #[test]
    fn test_unknown_lie_is_ignored() {
        let data = "holedis,shots_to_hole_out,lie\n120,3,water\n";
        let shots = read_shots(data.as_bytes()).unwrap();
        assert_eq!(shots, vec![Shot::new(120., 3.)]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_shots("target/tests/no_such_shots.csv"),
            Err(crate::StrokesError::Io(_))
        ));
    }

    #[test]
    fn test_group_by_lie() {
        let shots = vec![
            Shot::new(400., 4.).with_lie(Lie::Tee),
            Shot::new(150., 3.).with_lie(Lie::Fairway),
            Shot::new(380., 4.).with_lie(Lie::Tee),
            Shot::new(10., 2.),
        ];
        let groups = group_by_lie(&shots);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Lie::Tee].len(), 2);
        assert_eq!(groups[&Lie::Fairway][0].holedis, 150.);
    }
}
