use crate::binning::{bin_shots, Bins};
use crate::errors::{Result, StrokesError};
use crate::lie::{Lie, LieProfile};
use crate::shots::{group_by_lie, Shot};

use golfgp_gp::{design_grid, fit_predict, Posterior};
use ndarray::Array1;

use env_logger::{Builder, Env};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Environment variable controlling the log level of the strokes pipeline
pub const GOLFGP_LOG: &str = "GOLFGP_LOG";

/// Initialize logging from the [`GOLFGP_LOG`] environment variable (default level `info`)
/// unless a logger is already set.
pub fn init_logger() {
    let env = Env::new().filter_or(GOLFGP_LOG, "info");
    let mut builder = Builder::from_env(env);
    let builder = builder.target(env_logger::Target::Stdout);
    builder.try_init().ok();
}

/// Expected strokes to hole out as a function of distance for one lie
#[derive(Clone, Debug)]
pub struct LieCurve {
    /// Lie of the curve
    pub lie: Lie,
    /// Training bins used by the regression
    pub bins: Bins,
    /// Prediction distances, in original units
    pub distances: Array1<f64>,
    /// GP posterior at `distances`
    pub posterior: Posterior<f64>,
}

#[derive(Serialize)]
struct PredictionRecord {
    distance: f64,
    mean: f64,
    std: f64,
}

impl LieCurve {
    /// Default predictions file name `gpr_<lie>_preds.csv`
    pub fn file_name(&self) -> String {
        format!("gpr_{}_preds.csv", self.lie)
    }

    /// Write predictions as CSV with `distance,mean,std` columns
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let std = self.posterior.std_dev();
        for ((&distance, &mean), &std) in self
            .distances
            .iter()
            .zip(self.posterior.mean().iter())
            .zip(std.iter())
        {
            wtr.serialize(PredictionRecord {
                distance,
                mean,
                std,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write predictions in the CSV file at `path`, see [`LieCurve::to_writer`]
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.to_writer(file)?;
        info!("{} predictions saved in {}", self.lie, path.as_ref().display());
        Ok(())
    }
}

/// Fit the strokes curve of the lie described by `profile` from its `shots`.
///
/// Shots outside the profile distance range are discarded, the remaining ones are
/// averaged by distance bins, sparse bins are dropped and the GP regression runs on
/// scaled bin distances. Lie labels of `shots` are not looked at.
pub fn run_lie(profile: &LieProfile, shots: &[Shot]) -> Result<LieCurve> {
    profile.check()?;
    let lie = profile.lie();
    let kept: Vec<Shot> = shots
        .iter()
        .filter(|shot| profile.distance_range().contains(shot.holedis))
        .cloned()
        .collect();
    if kept.is_empty() {
        return Err(StrokesError::EmptyLie(format!(
            "{lie}: no shot in the distance range {:?}",
            profile.distance_range()
        )));
    }

    let mut bins = bin_shots(&kept, profile.bin_width())?;
    let n_bins = bins.len();
    bins.retain_min_count(profile.min_shots());
    debug!(
        "{}: {} shots in range, {} bins, {} with at least {} shots",
        lie,
        kept.len(),
        n_bins,
        bins.len(),
        profile.min_shots()
    );
    if bins.is_empty() {
        return Err(StrokesError::EmptyLie(format!(
            "{lie}: no distance bin with at least {} shots",
            profile.min_shots()
        )));
    }

    let scale = profile.distance_scale();
    let x = bins.distances().mapv(|d| d * scale);
    let y = bins.means();
    let design = design_grid(&x, profile.grid_size())?;
    let (length_scale, noise_std) = profile.hyperparameters();

    let now = Instant::now();
    let posterior = fit_predict(&x, &y, length_scale, noise_std, &design)?;
    debug!("{}: regression done in {:?}", lie, now.elapsed());

    let distances = design.mapv(|xs| xs / scale);

    Ok(LieCurve {
        lie,
        bins,
        distances,
        posterior,
    })
}

/// Outcome of a batch over several lies
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Curves of lies fitted successfully, in profile order
    pub curves: Vec<LieCurve>,
    /// Lies which failed with their error, in profile order
    pub failures: Vec<(Lie, StrokesError)>,
}

impl BatchReport {
    /// Curve of the given lie if it was fitted
    pub fn curve(&self, lie: Lie) -> Option<&LieCurve> {
        self.curves.iter().find(|c| c.lie == lie)
    }
}

/// Strokes pipeline over several lies
#[derive(Clone, Debug)]
pub struct StrokesPipeline {
    profiles: Vec<LieProfile>,
}

impl Default for StrokesPipeline {
    fn default() -> Self {
        StrokesPipeline::new(crate::lie::standard_profiles())
    }
}

impl StrokesPipeline {
    /// Constructor of the pipeline running the given lie `profiles`.
    ///
    /// Logging is initialized with [`init_logger`].
    pub fn new(profiles: Vec<LieProfile>) -> Self {
        init_logger();
        StrokesPipeline { profiles }
    }

    /// Profiles run by the pipeline
    pub fn profiles(&self) -> &[LieProfile] {
        &self.profiles
    }

    /// Run each profile on the shots labelled with its lie, see [`run_lies`]
    pub fn run(&self, shots: &[Shot]) -> BatchReport {
        run_lies(&self.profiles, shots)
    }
}

/// Run [`run_lie`] for every profile on the shots labelled with the profile lie.
///
/// Lies are processed independently and in parallel: a failing lie is logged
/// and reported in [`BatchReport::failures`] while the others go on.
pub fn run_lies(profiles: &[LieProfile], shots: &[Shot]) -> BatchReport {
    let groups = group_by_lie(shots);
    let no_shots: Vec<Shot> = Vec::new();
    let outcomes: Vec<(Lie, Result<LieCurve>)> = profiles
        .par_iter()
        .map(|profile| {
            let lie_shots = groups.get(&profile.lie()).unwrap_or(&no_shots);
            (profile.lie(), run_lie(profile, lie_shots))
        })
        .collect();

    let mut report = BatchReport::default();
    for (lie, outcome) in outcomes {
        match outcome {
            Ok(curve) => {
                info!("{}: strokes curve fitted on {} bins", lie, curve.bins.len());
                report.curves.push(curve)
            }
            Err(err) => {
                warn!("{}: skipped ({})", lie, err);
                report.failures.push((lie, err))
            }
        }
    }
    report
}
