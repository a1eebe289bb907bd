//! Multi-channel pixel buffer used by all pipeline stages.
//!
//! Samples are `f64` and stay unclamped throughout the pipeline; converting
//! back to 8 bit is the concern of whoever encodes the result to a file.

use crate::error::{Error, Result};

/// A `[row][col][channel]` sample array, stored row-major with interleaved
/// channels.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f64>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer. All dimensions must be non-zero.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Result<Self> {
        if height == 0 || width == 0 || channels == 0 {
            return Err(Error::InvalidParameter(format!(
                "zero-sized buffer requested: {height}x{width}x{channels}"
            )));
        }
        Ok(PixelBuffer {
            height,
            width,
            channels,
            data: vec![0.0; height * width * channels],
        })
    }

    /// Create a buffer from raw row-major interleaved samples.
    pub fn from_samples(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f64>,
    ) -> Result<Self> {
        let mut buffer = Self::zeros(height, width, channels)?;
        if data.len() != buffer.data.len() {
            return Err(Error::InvalidParameter(format!(
                "sample count {} does not match {height}x{width}x{channels}",
                data.len()
            )));
        }
        buffer.data = data;
        Ok(buffer)
    }

    /// Widen a decoded 8-bit image into a buffer, always three channels.
    pub fn from_image(image: &image::DynamicImage) -> Result<Self> {
        let rgb = image.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let data = rgb.as_raw().iter().map(|&s| f64::from(s)).collect();
        Self::from_samples(height, width, 3, data)
    }

    /// Quantize back to an 8-bit RGB image, rounding and clamping.
    ///
    /// This is the encode collaborator's quantization, not the core's: embed
    /// output may hold values outside `0..=255` and they are clipped here.
    pub fn to_rgb8(&self) -> Result<image::RgbImage> {
        if self.channels != 3 {
            return Err(Error::InvalidParameter(format!(
                "8-bit RGB output needs 3 channels, buffer has {}",
                self.channels
            )));
        }
        let samples = self
            .data
            .iter()
            .map(|&s| s.round().clamp(0.0, 255.0) as u8)
            .collect::<Vec<u8>>();
        image::RgbImage::from_raw(self.width as u32, self.height as u32, samples)
            .ok_or_else(|| Error::InvalidParameter("buffer does not form an RGB image".into()))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Shape as `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    #[inline]
    fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        debug_assert!(row < self.height && col < self.width && channel < self.channels);
        (row * self.width + col) * self.channels + channel
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f64 {
        self.data[self.index(row, col, channel)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: f64) {
        let index = self.index(row, col, channel);
        self.data[index] = value;
    }

    /// Copy one channel out as a contiguous row-major plane.
    pub fn channel_plane(&self, channel: usize) -> Vec<f64> {
        assert!(channel < self.channels, "channel out of range");
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    /// Write a contiguous row-major plane back into one channel.
    pub fn set_channel_plane(&mut self, channel: usize, plane: &[f64]) {
        assert!(channel < self.channels, "channel out of range");
        assert_eq!(plane.len(), self.height * self.width);
        for (slot, value) in self
            .data
            .iter_mut()
            .skip(channel)
            .step_by(self.channels)
            .zip(plane.iter())
        {
            *slot = *value;
        }
    }

    /// True when every sample is already an exact 8-bit value, so an 8-bit
    /// encode loses nothing.
    ///
    /// Holds for decoded images and for extraction output (whose samples are
    /// quantized), but usually not for embed output.
    pub fn is_8bit_exact(&self) -> bool {
        self.data
            .iter()
            .all(|&v| v.fract() == 0.0 && (0.0..=255.0).contains(&v))
    }

    /// All samples in storage order.
    pub fn samples(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_rejected() {
        assert!(PixelBuffer::zeros(0, 4, 3).is_err());
        assert!(PixelBuffer::zeros(4, 0, 3).is_err());
        assert!(PixelBuffer::zeros(4, 4, 0).is_err());
    }

    #[test]
    fn get_set_roundtrip() {
        let mut buffer = PixelBuffer::zeros(2, 3, 3).unwrap();
        buffer.set(1, 2, 0, 7.5);
        buffer.set(0, 0, 2, -4.0);
        assert_eq!(buffer.get(1, 2, 0), 7.5);
        assert_eq!(buffer.get(0, 0, 2), -4.0);
        assert_eq!(buffer.get(1, 2, 1), 0.0);
    }

    #[test]
    fn channel_planes_are_independent() {
        let mut buffer = PixelBuffer::zeros(2, 2, 3).unwrap();
        buffer.set(0, 1, 1, 9.0);
        let plane0 = buffer.channel_plane(0);
        let plane1 = buffer.channel_plane(1);
        assert!(plane0.iter().all(|&v| v == 0.0));
        assert_eq!(plane1, vec![0.0, 9.0, 0.0, 0.0]);

        buffer.set_channel_plane(2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.get(1, 0, 2), 3.0);
        // Other channels untouched.
        assert_eq!(buffer.get(1, 0, 0), 0.0);
        assert_eq!(buffer.get(0, 1, 1), 9.0);
    }

    #[test]
    fn exact_8bit_content_detected() {
        let mut buffer = PixelBuffer::zeros(1, 2, 3).unwrap();
        assert!(buffer.is_8bit_exact());
        buffer.set(0, 0, 0, 255.0);
        assert!(buffer.is_8bit_exact());

        buffer.set(0, 1, 1, 12.5);
        assert!(!buffer.is_8bit_exact());
        buffer.set(0, 1, 1, 300.0);
        assert!(!buffer.is_8bit_exact());
        buffer.set(0, 1, 1, -1.0);
        assert!(!buffer.is_8bit_exact());
    }

    #[test]
    fn rgb8_rounds_and_clamps() {
        let mut buffer = PixelBuffer::zeros(1, 2, 3).unwrap();
        buffer.set(0, 0, 0, -12.3);
        buffer.set(0, 0, 1, 254.6);
        buffer.set(0, 1, 2, 300.0);
        let rgb = buffer.to_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 255]);
    }
}
