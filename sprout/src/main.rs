//! `sprout` command-line front end
//!
//! ```text
//! sprout [config.yaml]
//! ```
//!
//! A configuration with `ero_iters` runs adaptive seed generation (erosion
//! mode for one threshold, threshold-sweep mode for several); one with
//! `erosion_steps` runs the erosion sweep. Logs go to stdout and `logs/`.

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use log::info;
use sprout_core::{Volume, Voxel};
use sprout_io::{AnyVolume, read_any_file};
use sprout_seed::{
    DirectorySink, RunConfig, SeedConfig, SweepConfig, load_yaml, make_adaptive_seeds, run_sweep,
    sweep_folder,
};
use std::path::Path;
use std::time::Instant;

const DEFAULT_CONFIG: &str = "./make_adaptive_seed.yaml";

fn setup_logging(base_level: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(base_level)?
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()?;
    Ok(handle)
}

fn run_seed<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    config: SeedConfig,
) -> Result<()> {
    let folder = config.run_folder();
    let options = config.into_options().context("invalid seed configuration")?;
    let mut sink = DirectorySink::new(&folder)
        .with_context(|| format!("creating output folder {}", folder.display()))?;
    let run = make_adaptive_seeds(volume, boundary, options, &mut sink)?;
    info!(
        "{}: {} seeds after {} steps ({:?}), written to {}",
        run.output_name,
        run.final_count,
        run.steps_run,
        run.state,
        folder.display()
    );
    Ok(())
}

fn run_erosion_sweep<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    config: SweepConfig,
) -> Result<()> {
    let folder = sweep_folder(&config.output_folder, &config.img_path);
    let options = config.into_options().context("invalid sweep configuration")?;
    let result = run_sweep(volume, boundary, &options, Some(&folder))?;
    info!(
        "Erosion sweep finished: {} jobs written to {}",
        result.jobs.len(),
        folder.display()
    );
    Ok(())
}

fn dispatch<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    config: RunConfig,
) -> Result<()> {
    match config {
        RunConfig::Seed(c) => run_seed(volume, boundary, c),
        RunConfig::Sweep(c) => run_erosion_sweep(volume, boundary, c),
    }
}

fn load_volume(path: &Path) -> Result<AnyVolume> {
    read_any_file(path).with_context(|| format!("reading volume {}", path.display()))
}

fn main() -> Result<()> {
    let _logger = setup_logging("info")?;
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config =
        load_yaml(&config_path).with_context(|| format!("reading configuration {config_path}"))?;

    let start = Instant::now();
    let volume = load_volume(config.img_path())?;
    let boundary = config
        .boundary_path()
        .map(|p| load_volume(p).map(|b| b.to_mask()))
        .transpose()?;
    info!(
        "Loaded {} ({} {})",
        config.img_path().display(),
        volume.shape(),
        volume.dtype().name()
    );

    let boundary = boundary.as_ref();
    match &volume {
        AnyVolume::Bool(v) => dispatch(v, boundary, config)?,
        AnyVolume::U8(v) => dispatch(v, boundary, config)?,
        AnyVolume::U16(v) => dispatch(v, boundary, config)?,
        AnyVolume::U32(v) => dispatch(v, boundary, config)?,
        AnyVolume::I16(v) => dispatch(v, boundary, config)?,
        AnyVolume::I32(v) => dispatch(v, boundary, config)?,
        AnyVolume::F32(v) => dispatch(v, boundary, config)?,
        AnyVolume::F64(v) => dispatch(v, boundary, config)?,
    }

    info!("Total running time: {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
