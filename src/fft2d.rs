//! Row/column 2-D discrete Fourier transform over [`rustfft`].
//!
//! The forward transform is unnormalized and the inverse divides by
//! `width * height`, matching the usual fft2/ifft2 convention so that
//! `ifft2d(fft2d(x))` reproduces `x` up to floating point error.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Forward 2-D FFT of one real-valued row-major plane.
pub fn fft2d(
    planner: &mut FftPlanner<f64>,
    width: usize,
    height: usize,
    plane: &[f64],
) -> Vec<Complex64> {
    assert_eq!(plane.len(), width * height);
    let mut spectrum: Vec<Complex64> = plane.iter().map(|&v| Complex64::new(v, 0.0)).collect();

    let row_fft = planner.plan_fft_forward(width);
    for row in spectrum.chunks_exact_mut(width) {
        row_fft.process(row);
    }

    // Columns via gather / transform / scatter with a single column buffer.
    let col_fft = planner.plan_fft_forward(height);
    let mut column = vec![Complex64::new(0.0, 0.0); height];
    for col in 0..width {
        for row in 0..height {
            column[row] = spectrum[row * width + col];
        }
        col_fft.process(&mut column);
        for row in 0..height {
            spectrum[row * width + col] = column[row];
        }
    }

    spectrum
}

/// Inverse 2-D FFT, normalized by `1 / (width * height)`.
///
/// Returns the full complex result; embedding keeps only the real part.
pub fn ifft2d(
    planner: &mut FftPlanner<f64>,
    width: usize,
    height: usize,
    spectrum: &[Complex64],
) -> Vec<Complex64> {
    assert_eq!(spectrum.len(), width * height);
    let mut data = spectrum.to_vec();

    let row_fft = planner.plan_fft_inverse(width);
    for row in data.chunks_exact_mut(width) {
        row_fft.process(row);
    }

    let col_fft = planner.plan_fft_inverse(height);
    let mut column = vec![Complex64::new(0.0, 0.0); height];
    for col in 0..width {
        for row in 0..height {
            column[row] = data[row * width + col];
        }
        col_fft.process(&mut column);
        for row in 0..height {
            data[row * width + col] = column[row];
        }
    }

    let norm = 1.0 / (width * height) as f64;
    for value in data.iter_mut() {
        *value *= norm;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_component_is_sum() {
        let plane = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut planner = FftPlanner::new();
        let spectrum = fft2d(&mut planner, 4, 2, &plane);
        let sum: f64 = plane.iter().sum();
        assert!((spectrum[0].re - sum).abs() < 1e-9);
        assert!(spectrum[0].im.abs() < 1e-9);
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut plane = vec![0.0; 4 * 4];
        plane[0] = 1.0;
        let mut planner = FftPlanner::new();
        let spectrum = fft2d(&mut planner, 4, 4, &plane);
        for value in &spectrum {
            assert!((value.re - 1.0).abs() < 1e-9);
            assert!(value.im.abs() < 1e-9);
        }
    }

    #[test]
    fn roundtrip_is_identity() {
        // Non-power-of-two on both axes to exercise the generic planner path.
        let width = 12;
        let height = 10;
        let plane: Vec<f64> = (0..width * height).map(|i| (i as f64) * 0.3 - 17.0).collect();

        let mut planner = FftPlanner::new();
        let spectrum = fft2d(&mut planner, width, height, &plane);
        let back = ifft2d(&mut planner, width, height, &spectrum);

        for (original, recovered) in plane.iter().zip(back.iter()) {
            assert!((original - recovered.re).abs() < 1e-9);
            assert!(recovered.im.abs() < 1e-9);
        }
    }

    #[test]
    fn transform_is_linear() {
        let width = 8;
        let height = 6;
        let a: Vec<f64> = (0..width * height).map(|i| (i % 7) as f64).collect();
        let b: Vec<f64> = (0..width * height).map(|i| ((i * 3) % 11) as f64).collect();
        let sum: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| x + y).collect();

        let mut planner = FftPlanner::new();
        let fa = fft2d(&mut planner, width, height, &a);
        let fb = fft2d(&mut planner, width, height, &b);
        let fsum = fft2d(&mut planner, width, height, &sum);

        for ((xa, xb), xs) in fa.iter().zip(fb.iter()).zip(fsum.iter()) {
            let combined = xa + xb;
            assert!((combined.re - xs.re).abs() < 1e-8);
            assert!((combined.im - xs.im).abs() < 1e-8);
        }
    }
}
