//! Seeded index permutations for scrambling watermark pixel positions.
//!
//! The determinism contract of the whole scheme lives here: the same seed
//! must produce the same permutation pair in every process, forever. The
//! contract is a Fisher-Yates shuffle over `0..len` driven by
//! [`rand_chacha::ChaCha8Rng`] seeded from the operation seed, drawing row
//! indices first and column indices second from the same stream.
//!
//! The shuffle draws `u32` ranges rather than `usize` so the consumed
//! entropy per step is identical on 32-bit and 64-bit targets.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Produce the row and column permutations for one operation.
///
/// `row_count` is the half-height of the host, `col_count` its width. Both
/// must be non-zero.
pub fn generate(seed: i64, row_count: usize, col_count: usize) -> Result<(Vec<usize>, Vec<usize>)> {
    if row_count == 0 || col_count == 0 {
        return Err(Error::InvalidParameter(format!(
            "permutation lengths must be positive, got rows={row_count} cols={col_count}"
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let rows = shuffled_indices(&mut rng, row_count);
    let cols = shuffled_indices(&mut rng, col_count);
    Ok((rows, cols))
}

/// Fisher-Yates over `0..len`, drawing `u32` ranges for portability.
fn shuffled_indices(rng: &mut ChaCha8Rng, len: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        indices.swap(i, j);
    }
    indices
}
