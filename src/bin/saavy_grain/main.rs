//! saavy-grain - play a WAV file from the keyboard
//!
//! Run with: cargo run --bin saavy-grain -- path/to/sample.wav
//!
//! Logs go to stderr. Redirect them (`2> grain.log`) to keep the TUI clean,
//! and raise the level with `RUST_LOG=saavy_grain=debug`.

mod app;
mod decode;
mod ui;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use saavy_grain::{dsp::resampler::Interpolation, PlayerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InterpolationArg {
    Cubic,
    Sinc,
}

impl From<InterpolationArg> for Interpolation {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Cubic => Interpolation::Cubic,
            InterpolationArg::Sinc => Interpolation::Sinc,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Granular sample player for the terminal")]
struct Args {
    /// WAV file to load
    path: PathBuf,

    /// Interpolation used by the grains
    #[arg(long, value_enum, default_value = "cubic")]
    interpolation: InterpolationArg,

    /// Start with looping enabled
    #[arg(short, long)]
    r#loop: bool,

    /// Seed for velocity and detune jitter
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = PlayerConfig::default().with_interpolation(args.interpolation.into());
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    app::GrainApp::new(config)
        .looping(args.r#loop)
        .run(&args.path)
}
