use aobq_math::{compute_error_metrics, reconstruction_error, ErrorMetrics, Sample};
use ndarray::{Array, ArrayBase, Data, Dimension};
use tracing::warn;

use crate::error::{ErrorKind, QuantizeError};
use crate::offset::{refine_offset, OffsetRefinement};
use crate::sign_magnitude::{quantize_sign_magnitude, SignMagnitude, DEFAULT_INTEGER_BITS};

/// Offset half of an [`AdaptiveReport`].
#[derive(Debug, Clone)]
pub struct OffsetReport<D: Dimension> {
    pub refinement: OffsetRefinement<D>,
    pub reconstructed: Array<f64, D>,
    /// `original - reconstructed`
    pub error: Array<f64, D>,
    pub metrics: ErrorMetrics,
}

/// Sign-magnitude encoding plus its reconstruction and error map, and the same for the
/// offset refinement when the integer parts fit around one `i8` offset.
///
/// Unlike [`adaptive_quantize`](crate::adaptive_quantize), a refinement that is out of
/// range does not fail the report: `offset` holds the error and the adaptive half stays
/// usable.
#[derive(Debug, Clone)]
pub struct AdaptiveReport<D: Dimension> {
    pub magnitude: SignMagnitude<D>,
    pub reconstructed: Array<f64, D>,
    /// `original - reconstructed`
    pub error: Array<f64, D>,
    pub metrics: ErrorMetrics,
    pub offset: Result<OffsetReport<D>, QuantizeError>,
}

impl<D: Dimension> AdaptiveReport<D> {
    pub fn build<S>(
        data: &ArrayBase<S, D>,
        scaling_factor: Option<f64>,
        offset: Option<i32>,
    ) -> Result<Self, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
    {
        Self::build_with(data, scaling_factor, offset, DEFAULT_INTEGER_BITS)
    }

    /// Range errors from the offset refinement are kept in `offset`; every other error,
    /// including a residual defect, is returned.
    pub fn build_with<S>(
        data: &ArrayBase<S, D>,
        scaling_factor: Option<f64>,
        offset: Option<i32>,
        integer_bits: u8,
    ) -> Result<Self, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
    {
        let magnitude = quantize_sign_magnitude(data, scaling_factor, integer_bits)?;
        let reconstructed = magnitude.reconstruct();

        let offset = match refine_offset(data, &magnitude, offset) {
            Ok(refinement) => {
                let reconstructed = refinement.reconstruct(&magnitude.sign, magnitude.scaling_factor);
                Ok(OffsetReport {
                    error: reconstruction_error(data, &reconstructed)?,
                    metrics: compute_error_metrics(data, &reconstructed)?,
                    refinement,
                    reconstructed,
                })
            }
            Err(e) if e.kind() == ErrorKind::Range => {
                warn!(error = %e, "offset refinement skipped");
                Err(e)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            error: reconstruction_error(data, &reconstructed)?,
            metrics: compute_error_metrics(data, &reconstructed)?,
            magnitude,
            reconstructed,
            offset,
        })
    }

    pub fn scaling_factor(&self) -> f64 {
        self.magnitude.scaling_factor
    }

    pub fn offset_report(&self) -> Option<&OffsetReport<D>> {
        self.offset.as_ref().ok()
    }

    /// Largest absolute error across the reconstructions that were produced.
    pub fn max_abs_error(&self) -> f64 {
        let offset_error = self.offset_report().into_iter().flat_map(|o| o.error.iter());
        self.error
            .iter()
            .chain(offset_error)
            .fold(0.0f64, |acc, e| acc.max(e.abs()))
    }
}
