use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use raytrace::ppm::{self, PpmFormat};
use raytrace::{render_parallel_with, render_with, Color, RenderSettings, Scene, MAX_RECURSION};

#[derive(Parser, Debug)]
#[command(name = "raytrace")]
#[command(about = "Render a JSON scene of spheres and planes to a PPM image", long_about = None)]
struct Args {
    /// Image width in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Image height in pixels
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Pixmap flavor to write
    #[arg(long, value_enum, default_value_t = Format::P6)]
    format: Format,

    /// Maximum reflection/refraction depth
    #[arg(long, default_value_t = MAX_RECURSION)]
    max_depth: u32,

    /// Background color as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_color, default_value = "0,0,0")]
    background: Color,

    /// Render rows on all cores
    #[arg(long)]
    parallel: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Binary pixmap
    P6,
    /// Plain-text pixmap
    P3,
}

impl From<Format> for PpmFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::P6 => PpmFormat::Binary,
            Format::P3 => PpmFormat::Ascii,
        }
    }
}

fn parse_color(value: &str) -> Result<Color, String> {
    let channels = value
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("'{c}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    match channels.as_slice() {
        &[r, g, b] => Ok(Color::new(r, g, b)),
        _ => Err(format!("expected three comma-separated channels, got {}", channels.len())),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let scene = Scene::load(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    info!(
        objects = scene.objects().len(),
        lights = scene.lights().len(),
        "loaded {}",
        args.scene.display()
    );

    let settings = RenderSettings {
        background: args.background,
        max_depth: args.max_depth,
        ..RenderSettings::default()
    };

    let grid = if args.parallel {
        render_parallel_with(&scene, args.width, args.height, &settings)
    } else {
        render_with(&scene, args.width, args.height, &settings)
    }
    .context("render failed")?;

    ppm::save(&args.output, &grid, args.format.into())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}x{} image to {}", args.width, args.height, args.output.display());

    Ok(())
}
