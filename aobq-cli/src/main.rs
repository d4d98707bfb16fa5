mod config;
mod loader;
mod synthetic;
mod timing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use aobq_core::{AdaptiveReport, Codec, Encoded, UnifiedCodec};
use aobq_math::{compute_error_metrics, reconstruction_error, ErrorMetrics};
use clap::Parser;
use ndarray::{ArrayD, IxDyn};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{CodecConfig, ModeKind, Overrides};
use loader::{SampleType, Shape};
use timing::timed;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Raw little-endian sample file. If omitted, generates synthetic data.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Element type of --input / --generate files
    #[arg(long, value_enum, default_value_t = SampleType::F64)]
    dtype: SampleType,

    /// Shape of --input as comma-separated extents (flat when omitted)
    #[arg(long, value_parser = clap::value_parser!(Shape))]
    shape: Option<Shape>,

    /// Side length of the synthetic grid
    #[arg(long, default_value_t = 512)]
    grid: usize,

    /// Standard deviation of the synthetic Gaussian noise
    #[arg(long, default_value_t = 0.5)]
    noise: f64,

    /// Seed for the synthetic noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write a synthetic grid to this path and exit
    #[arg(long)]
    generate: Option<PathBuf>,

    /// JSON codec configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeKind>,

    /// Code width for uniform mode
    #[arg(long)]
    bits: Option<u8>,

    /// Integer magnitude width for adaptive/offset modes
    #[arg(long)]
    integer_bits: Option<u8>,

    /// Decimal scaling factor (inferred from the data when omitted)
    #[arg(long)]
    scaling_factor: Option<f64>,

    /// Integer offset (median integer part when omitted)
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<i32>,

    /// Also compare plain and offset reconstructions side by side
    #[arg(long)]
    report: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            mode: self.mode,
            bits: self.bits,
            integer_bits: self.integer_bits,
            scaling_factor: self.scaling_factor,
            offset: self.offset,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aobq=info,aobq_core=info,aobq_math=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Some(path) = args.generate.as_ref() {
        info!(grid = args.grid, noise = args.noise, seed = args.seed, "generating synthetic grid");
        let grid = synthetic::noisy_sine_grid(args.grid, args.noise, args.seed)?;
        loader::write_raw(path, &grid, args.dtype)?;
        println!("✓ Wrote {}x{} {:?} samples to {}", args.grid, args.grid, args.dtype, path.display());
        return Ok(());
    }

    let config = CodecConfig::resolve(args.config.as_deref(), &args.overrides())?;
    if config.mode == ModeKind::Uniform && (config.scaling_factor.is_some() || config.offset.is_some()) {
        warn!("scaling factor and offset are ignored in uniform mode");
    }

    let data: ArrayD<f64> = match args.input.as_ref() {
        Some(path) => {
            info!(path = %path.display(), dtype = ?args.dtype, "loading samples");
            loader::read_raw(path, args.dtype, args.shape.as_ref())
                .with_context(|| format!("load {}", path.display()))?
        }
        None => {
            info!(grid = args.grid, noise = args.noise, seed = args.seed, "using synthetic grid");
            synthetic::noisy_sine_grid(args.grid, args.noise, args.seed)?.into_dyn()
        }
    };

    let codec = UnifiedCodec::new(config.to_mode());
    info!(mode = %codec.mode_description(), elements = data.len(), "quantizing");

    let (encoded, encode_time) = timed(|| codec.encode(&data));
    let encoded = encoded?;
    let (reconstructed, decode_time) = timed(|| codec.decode(&encoded));
    let reconstructed = reconstructed?;

    let error_map = reconstruction_error(&data, &reconstructed)?;
    let metrics = compute_error_metrics(&data, &reconstructed)?;

    println!("Mode: {}", codec.mode_description());
    println!("Shape: {:?}", data.shape());
    println!("Parameters: {}", describe(&encoded));
    print_metrics("", &metrics);
    print_error_map(&error_map);
    println!("Quantization Time: {:.6} seconds", encode_time.as_secs_f64());
    println!("Reconstruction Time: {:.6} seconds", decode_time.as_secs_f64());

    if args.report {
        if config.mode == ModeKind::Uniform {
            warn!("--report applies to adaptive and offset modes only");
        } else {
            let report =
                AdaptiveReport::build_with(&data, config.scaling_factor, config.offset, config.integer_bits)?;
            println!("--------------------------------------------------");
            print_metrics("Adaptive ", &report.metrics);
            match &report.offset {
                Ok(offset) => print_metrics("Offset ", &offset.metrics),
                Err(e) => println!("Offset: skipped ({e})"),
            }
            println!("Max Absolute Error: {:.6e}", report.max_abs_error());
        }
    }

    Ok(())
}

fn describe(encoded: &Encoded<IxDyn>) -> String {
    match encoded {
        Encoded::Uniform(q) => format!(
            "bits={}, min={}, max={}, scale={:.6e}",
            q.bits, q.min, q.max, q.scale
        ),
        Encoded::SignMagnitude(m) => format!(
            "scaling_factor={:e}, integer_bits={}",
            m.scaling_factor, m.integer_bits
        ),
        Encoded::Offset(r) => format!(
            "scaling_factor={:e}, integer_bits={}, offset={}",
            r.scaling_factor(),
            r.magnitude.integer_bits,
            r.offset()
        ),
    }
}

fn print_metrics(label: &str, metrics: &ErrorMetrics) {
    println!("{}MSE: {:.6e}", label, metrics.mse);
    println!("{}PSNR: {:.2} dB", label, metrics.psnr);
}

fn print_error_map(error_map: &ArrayD<f64>) {
    let (lo, hi) = error_map
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e)));
    let mean_abs = error_map.iter().map(|e| e.abs()).sum::<f64>() / error_map.len() as f64;
    println!("Error Map: min={:.6e} max={:.6e} mean|e|={:.6e}", lo, hi, mean_abs);
}
