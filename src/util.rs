//! Small numeric helpers shared by the unit and integration tests.

/// Assert two sample slices are elementwise equal within `max_error`.
pub fn approx_equal(a: &[f64], b: &[f64], max_error: f64) {
    assert_eq!(a.len(), b.len(), "slices are not equal length");
    for (index, delta) in a
        .iter()
        .zip(b.iter())
        .map(|(av, bv)| (av - bv).abs())
        .enumerate()
    {
        assert!(
            delta <= max_error,
            "delta {delta} at index {index} exceeded allowed {max_error}"
        );
    }
}

/// Mean absolute elementwise difference between two sample slices.
pub fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "slices are not equal length");
    let total: f64 = a.iter().zip(b.iter()).map(|(av, bv)| (av - bv).abs()).sum();
    total / a.len() as f64
}
