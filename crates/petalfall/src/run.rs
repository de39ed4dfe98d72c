use anyhow::Result;
use petalfall_renderer::{GardenInitError, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let surface_size = parse_surface_size(&args.size)?;
    let config = RendererConfig {
        surface_size,
        fullscreen: args.fullscreen,
        rng_seed: args.seed,
    };
    tracing::info!(
        width = surface_size.0,
        height = surface_size.1,
        fullscreen = config.fullscreen,
        seeded = config.rng_seed.is_some(),
        "starting petalfall garden"
    );

    match Renderer::new(config).run() {
        Ok(()) => Ok(()),
        // Fail soft when the machine simply has no usable GPU surface: log
        // the situation and exit cleanly instead of reporting a crash.
        Err(err) if err.downcast_ref::<GardenInitError>().is_some() => {
            tracing::error!(error = %err, "no usable GPU; garden disabled");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1280x800"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}
