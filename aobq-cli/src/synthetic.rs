use anyhow::{Context, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Upper end of both grid axes; the lower end is zero.
const GRID_SPAN: f64 = 200.0;

/// `sin(x) * cos(y)` on an `n × n` grid over `[0, 200]²` plus Gaussian noise.
///
/// Rows follow `y`, columns follow `x`. The same seed always yields the same grid.
pub fn noisy_sine_grid(n: usize, noise: f64, seed: u64) -> Result<Array2<f64>> {
    let normal = Normal::new(0.0, noise).with_context(|| format!("noise level {}", noise))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let step = if n > 1 { GRID_SPAN / (n - 1) as f64 } else { 0.0 };
    Ok(Array2::from_shape_fn((n, n), |(row, col)| {
        let x = col as f64 * step;
        let y = row as f64 * step;
        x.sin() * y.cos() + normal.sample(&mut rng)
    }))
}
