use aobq_math::Sample;
use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::error::QuantizeError;
use crate::offset::{refine_offset, OffsetRefinement};
use crate::sign_magnitude::{quantize_sign_magnitude, SignMagnitude, DEFAULT_INTEGER_BITS};

/// Complete adaptive encoding of one array: the sign-magnitude split and its offset
/// refinement, both derived from the same scaling factor.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedRecord<D: Dimension> {
    pub magnitude: SignMagnitude<D>,
    pub refinement: OffsetRefinement<D>,
}

impl<D: Dimension> QuantizedRecord<D> {
    pub fn scaling_factor(&self) -> f64 {
        self.magnitude.scaling_factor
    }

    pub fn offset(&self) -> i32 {
        self.refinement.offset
    }

    pub fn reconstruct_adaptive(&self) -> Array<f64, D> {
        self.magnitude.reconstruct()
    }

    pub fn reconstruct_offset(&self) -> Array<f64, D> {
        self.refinement
            .reconstruct(&self.magnitude.sign, self.magnitude.scaling_factor)
    }
}

/// Adaptive quantization with the default 8-bit integer width.
///
/// `scaling_factor` defaults to the smallest power of ten that resolves the smallest
/// nonzero magnitude, `offset` to the median integer part.
///
/// The record always carries the offset refinement, so input whose integer parts do not
/// fit around one `i8` offset fails with [`QuantizeError::OffsetOutOfRange`] even though
/// its sign-magnitude split is valid. Use
/// [`quantize_sign_magnitude`](crate::quantize_sign_magnitude) or
/// [`AdaptiveReport`](crate::AdaptiveReport) for such data.
///
/// # Example
/// ```
/// use aobq_core::{adaptive_quantize, reconstruct_adaptive};
/// use ndarray::array;
///
/// let data = array![0.001, 0.01, 0.1];
/// let record = adaptive_quantize(&data, None, None).unwrap();
/// assert_eq!(record.scaling_factor(), 1000.0);
/// assert_eq!(record.magnitude.decimal_part[0], 1);
///
/// let recon = reconstruct_adaptive(&record);
/// assert!((recon[2] - 0.1).abs() < 1e-9);
/// ```
pub fn adaptive_quantize<S, D>(
    data: &ArrayBase<S, D>,
    scaling_factor: Option<f64>,
    offset: Option<i32>,
) -> Result<QuantizedRecord<D>, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    adaptive_quantize_with(data, scaling_factor, offset, DEFAULT_INTEGER_BITS)
}

/// [`adaptive_quantize`] with an explicit integer width.
pub fn adaptive_quantize_with<S, D>(
    data: &ArrayBase<S, D>,
    scaling_factor: Option<f64>,
    offset: Option<i32>,
    integer_bits: u8,
) -> Result<QuantizedRecord<D>, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    let magnitude = quantize_sign_magnitude(data, scaling_factor, integer_bits)?;
    let refinement = refine_offset(data, &magnitude, offset)?;
    tracing::trace!(
        elements = magnitude.len(),
        scaling_factor = magnitude.scaling_factor,
        offset = refinement.offset,
        "adaptive record built"
    );
    Ok(QuantizedRecord {
        magnitude,
        refinement,
    })
}

pub fn reconstruct_adaptive<D: Dimension>(record: &QuantizedRecord<D>) -> Array<f64, D> {
    record.reconstruct_adaptive()
}

pub fn reconstruct_offset<D: Dimension>(record: &QuantizedRecord<D>) -> Array<f64, D> {
    record.reconstruct_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_both_reconstructions_agree() {
        let data = array![[0.37f64, -12.125], [3.0, -0.002]];
        let record = adaptive_quantize(&data, None, None).unwrap();
        assert_eq!(record.scaling_factor(), 1000.0);

        let plain = reconstruct_adaptive(&record);
        let shifted = reconstruct_offset(&record);
        for ((x, a), b) in data.iter().zip(plain.iter()).zip(shifted.iter()) {
            assert!((x - a).abs() <= 0.5e-3 + 1e-12);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_supplied_parameters_are_kept() {
        let data = array![10.5f64, 11.25, 12.0];
        let record = adaptive_quantize(&data, Some(100.0), Some(11)).unwrap();
        assert_eq!(record.scaling_factor(), 100.0);
        assert_eq!(record.offset(), 11);
        assert_eq!(record.refinement.integer_offset_part, array![-1, 0, 1]);
        assert_eq!(record.magnitude.decimal_part, array![50, 25, 0]);
    }

    #[test]
    fn test_wide_integer_width() {
        let data = array![1000.5f64, 1001.5];
        assert!(adaptive_quantize(&data, None, None).is_err());
        let record = adaptive_quantize_with(&data, None, None, 10).unwrap();
        assert_eq!(record.offset(), 1000);
    }
}
