use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};

use blind_watermarking as wm;

#[derive(Parser)]
#[clap(author, version, about = "Frequency-domain blind watermark embedding and extraction", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Shared secret seed driving the position permutations.
    #[clap(long, value_parser)]
    seed: Option<i64>,

    /// Embedding strength.
    #[clap(long, value_parser)]
    alpha: Option<f64>,

    /// JSON file holding a watermark configuration; explicit flags override it.
    #[clap(long, value_parser)]
    config: Option<PathBuf>,

    /// Output path; derived from the input path when omitted.
    #[clap(long, value_parser)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Embed {
    /// The host image to embed into.
    #[clap(action)]
    host: PathBuf,

    /// The watermark image; at most half the host's height and the host's width.
    #[clap(action)]
    watermark: PathBuf,

    #[clap(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct Extract {
    /// The original host image.
    #[clap(action)]
    host: PathBuf,

    /// The marked image produced by the embed step.
    #[clap(action)]
    marked: PathBuf,

    /// How extracted samples are forced into the 8-bit range.
    #[clap(long, value_enum)]
    quantization: Option<QuantizationArg>,

    #[clap(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuantizationArg {
    /// Truncate toward zero and wrap modulo 256 (reference behavior).
    Wrap,
    /// Round to nearest and saturate at 0 and 255.
    Clamp,
}

impl From<QuantizationArg> for wm::Quantization {
    fn from(value: QuantizationArg) -> Self {
        match value {
            QuantizationArg::Wrap => wm::Quantization::Wrap,
            QuantizationArg::Clamp => wm::Quantization::Clamp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a watermark image into a host image.
    Embed(Embed),
    /// Recover a watermark from a host image and its marked counterpart.
    Extract(Extract),
}

/// Resolve the operation configuration: config file first, flags on top.
fn resolve_config(common: &CommonArgs) -> Result<wm::WatermarkConfig> {
    let mut config = match &common.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(wm::Error::Io)
                .with_context(|| format!("could not read config file {path:?}"))?;
            serde_json::from_str(&text)
                .with_context(|| format!("could not parse config file {path:?}"))?
        }
        None => wm::WatermarkConfig::default(),
    };
    if let Some(seed) = common.seed {
        config.seed = seed;
    }
    if let Some(alpha) = common.alpha {
        config.alpha = alpha;
    }
    Ok(config)
}

/// Derive `name_encode.ext` / `name_decode.ext` next to the input file.
fn derived_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_{suffix}");
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}

fn is_lossy_format(path: &Path) -> bool {
    matches!(
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("jpg") | Some("jpeg")
    )
}

/// Decode an image file into a pixel buffer, reporting a missing-input error
/// for anything that does not resolve to pixel data.
fn open_pixels(path: &Path) -> Result<wm::PixelBuffer> {
    let image = image::open(path).map_err(|source| wm::Error::MissingInput {
        path: path.display().to_string(),
        source,
    })?;
    Ok(wm::PixelBuffer::from_image(&image)?)
}

fn save_pixels(buffer: &wm::PixelBuffer, path: &Path) -> Result<()> {
    // Advisories only, the write still proceeds.
    if is_lossy_format(path) {
        warn!(
            "precision loss: {path:?} is a lossy format, a substantial part of \
             the embedded signal will be discarded"
        );
    } else if !buffer.is_8bit_exact() {
        warn!(
            "precision loss: {path:?} stores 8-bit samples, the unclamped \
             output will be rounded and later extraction is approximate"
        );
    }
    buffer
        .to_rgb8()?
        .save(path)
        .map_err(wm::Error::Image)
        .with_context(|| format!("could not write output image {path:?}"))?;
    Ok(())
}

fn run_embed(args: &Embed) -> Result<()> {
    let config = resolve_config(&args.common)?;
    let output_path = args
        .common
        .output
        .clone()
        .unwrap_or_else(|| derived_output_path(&args.host, "encode"));
    info!(
        "image<{:?}> + watermark<{:?}> -> image(encoded)<{output_path:?}>",
        args.host, args.watermark
    );

    let host = open_pixels(&args.host)?;
    let watermark = open_pixels(&args.watermark)?;
    let marked = wm::embed(&host, &watermark, &config)?;
    save_pixels(&marked, &output_path)?;
    Ok(())
}

fn run_extract(args: &Extract) -> Result<()> {
    let mut config = resolve_config(&args.common)?;
    if let Some(quantization) = args.quantization {
        config.quantization = quantization.into();
    }
    let output_path = args
        .common
        .output
        .clone()
        .unwrap_or_else(|| derived_output_path(&args.host, "decode"));
    info!(
        "image<{:?}> + image(encoded)<{:?}> -> watermark<{output_path:?}>",
        args.host, args.marked
    );

    let host = open_pixels(&args.host)?;
    let marked = open_pixels(&args.marked)?;
    let recovered = wm::extract(&host, &marked, &config)?;
    save_pixels(&recovered, &output_path)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Embed(args) => run_embed(args),
        Commands::Extract(args) => run_extract(args),
    }
}
