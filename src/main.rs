use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use geotile::core::{enhance_directory, normalize_file, tile_to_directory, Interpolation};
use geotile::PipelineConfig;
use log::{error, info};

mod cli;

use cli::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Some(n_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build_global()
            .context("Failed to build thread pool")?;
        info!("Using {} threads", n_threads);
    }

    match args.command {
        Command::Tile { input, output, size } => {
            let size = size.unwrap_or(PipelineConfig::default().tile_size);
            let written = tile_to_directory(&input, &output, size)
                .with_context(|| format!("Tiling {} failed", input.display()))?;
            info!("Wrote {} tiles to {}", written.len(), output.display());
        }

        Command::Enhance { input, output, factor, method, sequential } => {
            let defaults = PipelineConfig::default();
            let config = PipelineConfig {
                tiles_dir: input.unwrap_or_else(|| defaults.tiles_dir.clone()),
                output_dir: output.unwrap_or_else(|| defaults.output_dir.clone()),
                upscale_factor: factor.unwrap_or(defaults.upscale_factor),
                parallel: !sequential,
                ..defaults
            };

            let summary = enhance_directory(&config, &Interpolation::from(method))
                .with_context(|| format!("Enhancing {} failed", config.tiles_dir.display()))?;

            if !summary.is_success() {
                for failure in &summary.failures {
                    error!("{}", failure);
                }
                bail!(
                    "{} of {} rasters failed",
                    summary.failures.len(),
                    summary.failures.len() + summary.written.len()
                );
            }
        }

        Command::Normalize { input, output } => {
            normalize_file(&input, &output)
                .with_context(|| format!("Normalizing {} failed", input.display()))?;
        }
    }

    Ok(())
}
