use anyhow::{bail, Context};
use clap::Parser;
use golfgp_strokes::{
    init_logger, load_shots, run_lie, standard_profiles, Lie, LieProfile, StrokesPipeline,
};
use std::path::PathBuf;

/// Fit expected strokes to hole out curves from a shots CSV file
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with `holedis`, `shots_to_hole_out` and optionally `lie` columns
    #[arg(short, long)]
    input: PathBuf,
    /// Lie of all shots in the input file, otherwise shots are grouped by their `lie` column
    #[arg(short, long)]
    lie: Option<Lie>,
    /// Output CSV file for a single lie (default `gpr_<lie>_preds.csv`),
    /// output directory otherwise (default `./strokes_preds`)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// GP length-scale, overrides the lie default
    #[arg(long)]
    length_scale: Option<f64>,
    /// GP noise standard deviation, overrides the lie default
    #[arg(long)]
    noise_std: Option<f64>,
}

fn profile(lie: Lie, args: &Args) -> LieProfile {
    let mut profile = LieProfile::new(lie);
    if let Some(length_scale) = args.length_scale {
        profile = profile.length_scale(length_scale);
    }
    if let Some(noise_std) = args.noise_std {
        profile = profile.noise_std(noise_std);
    }
    profile
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger();
    let shots = load_shots(&args.input)
        .with_context(|| format!("cannot load shots from {}", args.input.display()))?;

    if let Some(lie) = args.lie {
        let curve = run_lie(&profile(lie, &args), &shots)?;
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(curve.file_name()));
        if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        curve.write_csv(&output)?;
        println!(
            "{}: {} bins used, predictions saved in {}",
            lie,
            curve.bins.len(),
            output.display()
        );
        return Ok(());
    }

    let profiles = standard_profiles()
        .into_iter()
        .map(|p| profile(p.lie(), &args))
        .collect();
    let report = StrokesPipeline::new(profiles).run(&shots);
    if report.curves.is_empty() {
        bail!("no strokes curve could be fitted from {}", args.input.display());
    }
    let outdir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("./strokes_preds"));
    std::fs::create_dir_all(&outdir)?;
    for curve in report.curves.iter() {
        let path = outdir.join(curve.file_name());
        curve.write_csv(&path)?;
        println!(
            "{}: {} bins used, predictions saved in {}",
            curve.lie,
            curve.bins.len(),
            path.display()
        );
    }
    for (lie, err) in report.failures.iter() {
        println!("{lie}: skipped, {err}");
    }
    Ok(())
}
