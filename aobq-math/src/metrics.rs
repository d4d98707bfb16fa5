use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use thiserror::Error;

use crate::Sample;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
    #[error("Cannot measure error over an empty array")]
    Empty,
}

/// Reconstruction quality of one original/reconstructed pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB, `+inf` for a perfect reconstruction.
    pub psnr: f64,
}

fn check_pair<S1, S2, D>(
    original: &ArrayBase<S1, D>,
    reconstructed: &ArrayBase<S2, D>,
) -> Result<(), MetricsError>
where
    S1: Data,
    S2: Data,
    D: Dimension,
{
    if original.shape() != reconstructed.shape() {
        return Err(MetricsError::ShapeMismatch(
            original.shape().to_vec(),
            reconstructed.shape().to_vec(),
        ));
    }
    if original.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

/// Element-wise `original - reconstructed`, the full error map.
pub fn reconstruction_error<S1, S2, D>(
    original: &ArrayBase<S1, D>,
    reconstructed: &ArrayBase<S2, D>,
) -> Result<Array<f64, D>, MetricsError>
where
    S1: Data,
    S1::Elem: Sample,
    S2: Data,
    S2::Elem: Sample,
    D: Dimension,
{
    check_pair(original, reconstructed)?;
    Ok(Zip::from(original)
        .and(reconstructed)
        .map_collect(|o, r| o.to_f64() - r.to_f64()))
}

/// Mean squared error.
pub fn mse<S1, S2, D>(
    original: &ArrayBase<S1, D>,
    reconstructed: &ArrayBase<S2, D>,
) -> Result<f64, MetricsError>
where
    S1: Data,
    S1::Elem: Sample,
    S2: Data,
    S2::Elem: Sample,
    D: Dimension,
{
    check_pair(original, reconstructed)?;
    let sum: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(o, r)| {
            let d = o.to_f64() - r.to_f64();
            d * d
        })
        .sum();
    Ok(sum / original.len() as f64)
}

/// PSNR from a precomputed MSE and peak magnitude.
///
/// Zero MSE is a perfect reconstruction and maps to `+inf` instead of dividing by zero.
pub fn psnr(mse: f64, peak: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    20.0 * (peak / mse.sqrt()).log10()
}

/// MSE and PSNR, with the PSNR peak taken as `max(|original|)`.
pub fn compute_error_metrics<S1, S2, D>(
    original: &ArrayBase<S1, D>,
    reconstructed: &ArrayBase<S2, D>,
) -> Result<ErrorMetrics, MetricsError>
where
    S1: Data,
    S1::Elem: Sample,
    S2: Data,
    S2::Elem: Sample,
    D: Dimension,
{
    let mse = mse(original, reconstructed)?;
    let peak = original
        .iter()
        .map(|x| x.to_f64().abs())
        .fold(0.0f64, f64::max);
    Ok(ErrorMetrics {
        mse,
        psnr: psnr(mse, peak),
    })
}
