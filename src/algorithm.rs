//! Contains the actual logic that ties everything together.
//!
//! The scheme hides a visible watermark image in the Fourier spectrum of a
//! host image:
//! - Pack the watermark into a zero half-height canvas of the host's width.
//! - Scramble the canvas rows and columns with a seeded permutation.
//! - Mirror the scrambled canvas point-symmetrically into a host-sized
//!   pattern, so both spectrum halves carry the same signal.
//! - Forward-transform the host per channel, add `alpha` times the pattern,
//!   inverse-transform and keep the real component.
//!
//! Extraction reverses this from the spectral difference of the original and
//! the marked image: `(F2 - F1) / alpha` recovers the pattern, the inverse
//! permutation restores the spatial layout of the upper half, and the lower
//! half is rebuilt by mirroring.
//!
//! The core is pure over in-memory [`PixelBuffer`]s; it never touches files.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fft2d;
use crate::permutation;
use crate::pixels::PixelBuffer;

/// Reference seed used when the caller does not supply one.
pub const DEFAULT_SEED: i64 = 20160930;

/// Reference embedding strength.
pub const DEFAULT_ALPHA: f64 = 3.0;

/// How extracted samples are forced into the 8-bit range.
///
/// The reference behavior truncates toward zero and wraps modulo 256, so an
/// out-of-range sample silently lands elsewhere in the range. That wraparound
/// is a latent correctness issue, kept as the default for fidelity; `Clamp`
/// is the rounded, saturating alternative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantization {
    /// Truncate toward zero, then wrap modulo 256 (reference behavior).
    #[default]
    Wrap,
    /// Round to nearest and saturate at 0 and 255.
    Clamp,
}

impl Quantization {
    /// Force one extracted sample into `0..=255`, returned as `f64`.
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Quantization::Wrap => {
                // Truncating cast with wraparound, like a C cast to uint8.
                let truncated = value.trunc() as i64;
                (truncated & 0xFF) as f64
            }
            Quantization::Clamp => value.round().clamp(0.0, 255.0),
        }
    }
}

/// Immutable per-operation configuration.
///
/// Passed by reference into each call; there is no process-wide mutable
/// state, so concurrent operations cannot interfere.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Shared secret driving the position permutations.
    pub seed: i64,
    /// Embedding strength; must be positive and finite.
    pub alpha: f64,
    /// Sample conversion used during extraction.
    pub quantization: Quantization,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        WatermarkConfig {
            seed: DEFAULT_SEED,
            alpha: DEFAULT_ALPHA,
            quantization: Quantization::default(),
        }
    }
}

impl WatermarkConfig {
    /// Fail fast on parameters that no transform stage could accept.
    fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "alpha must be a positive finite number, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Place the watermark into a zero half-height canvas of the host's width.
///
/// The canvas height is `floor(host_height * 0.5)`. A watermark taller or
/// wider than the canvas, or with a different channel count, is rejected
/// before any sample is written.
pub fn pack(
    host_height: usize,
    host_width: usize,
    channels: usize,
    watermark: &PixelBuffer,
) -> Result<PixelBuffer> {
    let canvas_height = host_height / 2;
    if canvas_height == 0 {
        return Err(Error::InvalidParameter(format!(
            "host height {host_height} leaves no room for a half-height canvas"
        )));
    }
    if watermark.height() > canvas_height
        || watermark.width() > host_width
        || watermark.channels() != channels
    {
        return Err(Error::DimensionMismatch {
            context: "watermark exceeds canvas",
            expected_height: canvas_height,
            expected_width: host_width,
            expected_channels: channels,
            actual_height: watermark.height(),
            actual_width: watermark.width(),
            actual_channels: watermark.channels(),
        });
    }

    let mut canvas = PixelBuffer::zeros(canvas_height, host_width, channels)?;
    for row in 0..watermark.height() {
        for col in 0..watermark.width() {
            for channel in 0..channels {
                canvas.set(row, col, channel, watermark.get(row, col, channel));
            }
        }
    }
    Ok(canvas)
}

/// Rearrange the canvas so cell `(i, j)` holds `canvas[rows[i]][cols[j]]`.
fn scramble(canvas: &PixelBuffer, rows: &[usize], cols: &[usize]) -> PixelBuffer {
    let (height, width, channels) = canvas.shape();
    let mut scrambled = canvas.clone();
    for i in 0..height {
        for j in 0..width {
            for channel in 0..channels {
                scrambled.set(i, j, channel, canvas.get(rows[i], cols[j], channel));
            }
        }
    }
    scrambled
}

/// Build the host-sized pattern: scrambled canvas in the top half, each cell
/// duplicated into its point reflection `(H-1-i, W-1-j)`.
///
/// With an odd host height the center row has no counterpart in the
/// half-height canvas; neither loop bound reaches it and it stays zero.
fn symmetric_pattern(
    host_height: usize,
    host_width: usize,
    scrambled: &PixelBuffer,
) -> Result<PixelBuffer> {
    let (height, width, channels) = scrambled.shape();
    let mut pattern = PixelBuffer::zeros(host_height, host_width, channels)?;
    for i in 0..height {
        for j in 0..width {
            for channel in 0..channels {
                let value = scrambled.get(i, j, channel);
                pattern.set(i, j, channel, value);
                pattern.set(host_height - 1 - i, host_width - 1 - j, channel, value);
            }
        }
    }
    Ok(pattern)
}

/// Embed `watermark` into `host`, returning a host-shaped real-valued image.
///
/// The output is deliberately not clamped to a display range; quantization to
/// 8 bit belongs to whoever encodes the result, and a lossy encoder will
/// discard a substantial fraction of the embedded signal.
pub fn embed(
    host: &PixelBuffer,
    watermark: &PixelBuffer,
    config: &WatermarkConfig,
) -> Result<PixelBuffer> {
    config.validate()?;
    let (height, width, channels) = host.shape();

    let canvas = pack(height, width, channels, watermark)?;
    let (rows, cols) = permutation::generate(config.seed, canvas.height(), canvas.width())?;
    let scrambled = scramble(&canvas, &rows, &cols);
    let pattern = symmetric_pattern(height, width, &scrambled)?;

    let mut planner = FftPlanner::new();
    let mut output = PixelBuffer::zeros(height, width, channels)?;
    for channel in 0..channels {
        let mut spectrum = fft2d::fft2d(&mut planner, width, height, &host.channel_plane(channel));
        for (value, pattern_value) in spectrum.iter_mut().zip(pattern.channel_plane(channel)) {
            *value += Complex64::new(config.alpha * pattern_value, 0.0);
        }
        let spatial = fft2d::ifft2d(&mut planner, width, height, &spectrum);
        let real: Vec<f64> = spatial.iter().map(|value| value.re).collect();
        output.set_channel_plane(channel, &real);
    }
    Ok(output)
}

/// Recover a host-shaped approximation of the watermark from the original
/// host and the marked image.
///
/// The original watermark size is not recoverable from the marked image
/// alone, so the output has the host's full shape; the watermark sits in its
/// packed footprint in the upper half, with the lower half a mirror
/// reconstruction.
pub fn extract(
    host: &PixelBuffer,
    marked: &PixelBuffer,
    config: &WatermarkConfig,
) -> Result<PixelBuffer> {
    config.validate()?;
    let (height, width, channels) = host.shape();
    if marked.shape() != host.shape() {
        let (marked_height, marked_width, marked_channels) = marked.shape();
        return Err(Error::DimensionMismatch {
            context: "marked image differs from host",
            expected_height: height,
            expected_width: width,
            expected_channels: channels,
            actual_height: marked_height,
            actual_width: marked_width,
            actual_channels: marked_channels,
        });
    }
    let half_height = height / 2;
    if half_height == 0 {
        return Err(Error::InvalidParameter(format!(
            "host height {height} leaves no watermark region to recover"
        )));
    }

    let (rows, cols) = permutation::generate(config.seed, half_height, width)?;

    let mut planner = FftPlanner::new();
    let mut recovered = PixelBuffer::zeros(height, width, channels)?;
    for channel in 0..channels {
        let host_spectrum =
            fft2d::fft2d(&mut planner, width, height, &host.channel_plane(channel));
        let marked_spectrum =
            fft2d::fft2d(&mut planner, width, height, &marked.channel_plane(channel));
        let diff: Vec<f64> = marked_spectrum
            .iter()
            .zip(host_spectrum.iter())
            .map(|(marked_value, host_value)| ((marked_value - host_value) / config.alpha).re)
            .collect();

        // Undo the permutation on the upper half.
        for i in 0..half_height {
            for j in 0..width {
                let value = config.quantization.apply(diff[i * width + j]);
                recovered.set(rows[i], cols[j], channel, value);
            }
        }
        // Rebuild the lower half by mirroring. The source is the permuted
        // destination cell of the step above, not the raster cell, matching
        // the reference pipeline's asymmetry with the embedder.
        for i in 0..half_height {
            for j in 0..width {
                let value = recovered.get(rows[i], cols[j], channel);
                recovered.set(height - 1 - i, width - 1 - j, channel, value);
            }
        }
    }
    Ok(recovered)
}
