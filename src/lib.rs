//! Frequency-domain blind watermarking.
//!
//! Embeds a visible watermark image into a host image through its 2-D
//! Fourier spectrum and recovers an approximation of the watermark from the
//! marked image, given the shared seed and embedding strength. See
//! [`algorithm`] for the pipeline description.

pub mod algorithm;
pub mod error;
pub mod fft2d;
pub mod permutation;
pub mod pixels;
pub mod util;

// Export the public components from the algorithm here.
pub use algorithm::{embed, extract, pack};
pub use algorithm::{Quantization, WatermarkConfig, DEFAULT_ALPHA, DEFAULT_SEED};
pub use error::{Error, Result};
pub use pixels::PixelBuffer;
