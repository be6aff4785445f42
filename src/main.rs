//! Command-line renderer for ImageStag FX.
//!
//! Loads an image and a parameter snapshot, renders, and writes
//! `edited-image.<ext>` into the output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use imagestag_fx::{Bitmap, ExportFormat, FilterParameters, Renderer};

#[derive(Debug, Parser)]
#[command(name = "imagestag-fx", about = "Apply editor filters to an image and export it")]
struct Cli {
    /// Source image (PNG, JPEG, WebP, GIF, BMP)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Filter parameters as YAML or JSON; defaults leave the image unchanged
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Export format: png, jpeg or webp
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Directory that receives edited-image.<ext>
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Seed the stochastic effects for a reproducible render
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for the parallel passes (0 = one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive = format!("imagestag_fx={level}")
        .parse()
        .context("building log directive")?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .context("configuring worker threads")?;

    let source = Bitmap::open(&cli.input)
        .with_context(|| format!("loading image from {}", cli.input.display()))?;
    let params = match &cli.params {
        Some(path) => FilterParameters::load(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => FilterParameters::default(),
    };
    info!(
        width = source.width(),
        height = source.height(),
        threads = rayon::current_num_threads(),
        "loaded source"
    );

    let mut renderer = cli.seed.map_or_else(Renderer::new, Renderer::seeded);
    let path = renderer
        .export(&source, &params, cli.format, &cli.output_dir)
        .with_context(|| format!("exporting to {}", cli.output_dir.display()))?;
    println!("{}", path.display());
    Ok(())
}
