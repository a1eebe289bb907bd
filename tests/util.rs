#![allow(dead_code)]
use blind_watermarking as wm;

/// Buffer filled with a single value.
pub fn constant(height: usize, width: usize, channels: usize, value: f64) -> wm::PixelBuffer {
    wm::PixelBuffer::from_samples(
        height,
        width,
        channels,
        vec![value; height * width * channels],
    )
    .unwrap()
}

/// Deterministic non-constant buffer with per-channel structure.
pub fn gradient(height: usize, width: usize, channels: usize) -> wm::PixelBuffer {
    let mut buffer = wm::PixelBuffer::zeros(height, width, channels).unwrap();
    for row in 0..height {
        for col in 0..width {
            for channel in 0..channels {
                let value = ((row * 31 + col * 7 + channel * 13) % 256) as f64;
                buffer.set(row, col, channel, value);
            }
        }
    }
    buffer
}
