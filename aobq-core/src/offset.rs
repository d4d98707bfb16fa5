use aobq_math::{lower_median, Sample};
use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use tracing::debug;

use crate::codec::{Codec, Encoded};
use crate::error::QuantizeError;
use crate::record::adaptive_quantize_with;
use crate::sign_magnitude::{SignMagnitude, DEFAULT_INTEGER_BITS};

/// Integer magnitudes re-expressed relative to a shared offset.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetRefinement<D: Dimension> {
    pub offset: i32,
    /// `integer_part - offset`, always within `i8`.
    pub integer_offset_part: Array<i8, D>,
    /// Decimal remainder recomputed from the shifted integer part.
    pub decimal_offset_part: Array<i64, D>,
}

impl<D: Dimension> OffsetRefinement<D> {
    /// `sign * (integer_offset_part + offset + decimal_offset_part / scaling_factor)`
    pub fn reconstruct(&self, sign: &Array<i8, D>, scaling_factor: f64) -> Array<f64, D> {
        let offset = f64::from(self.offset);
        Zip::from(sign)
            .and(&self.integer_offset_part)
            .and(&self.decimal_offset_part)
            .map_collect(|&s, &i, &d| {
                f64::from(s) * (f64::from(i) + offset + d as f64 / scaling_factor)
            })
    }
}

/// Shifts the integer parts of `magnitude` by `offset` (the lower median of the integer
/// parts when `None`) and re-quantizes the fractional remainder of `data` against them.
///
/// `magnitude` must have been produced from `data`.
pub fn refine_offset<S, D>(
    data: &ArrayBase<S, D>,
    magnitude: &SignMagnitude<D>,
    offset: Option<i32>,
) -> Result<OffsetRefinement<D>, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    if data.shape() != magnitude.integer_part.shape() {
        return Err(QuantizeError::ShapeMismatch(
            data.shape().to_vec(),
            magnitude.integer_part.shape().to_vec(),
        ));
    }

    let offset = match offset {
        Some(offset) => offset,
        None => {
            let median = lower_median(magnitude.integer_part.iter().copied())
                .ok_or(QuantizeError::EmptyInput)?;
            debug!(offset = median, "inferred offset from integer median");
            i32::from(median)
        }
    };

    let shifted = magnitude
        .integer_part
        .iter()
        .enumerate()
        .map(|(index, &ip)| (index, ip, i64::from(ip) - i64::from(offset)))
        .find(|&(_, _, shifted)| i8::try_from(shifted).is_err());
    if let Some((index, integer_part, shifted)) = shifted {
        return Err(QuantizeError::OffsetOutOfRange {
            index,
            integer_part,
            offset,
            shifted,
        });
    }
    // In range: every shifted value was checked against i8 above
    let integer_offset_part = magnitude
        .integer_part
        .mapv(|ip| (i64::from(ip) - i64::from(offset)) as i8);

    let sf = magnitude.scaling_factor;
    let base = f64::from(offset);
    let residuals = Zip::from(data)
        .and(&integer_offset_part)
        .map_collect(|x, &iop| ((x.to_f64().abs() - (f64::from(iop) + base)) * sf).round());

    // The shifted integer plus offset is the original integer part, so every residual is
    // the scaled fraction again. Anything else means the record does not match the data.
    let defect = residuals
        .iter()
        .enumerate()
        .find(|&(_, &r)| !(0.0..=sf).contains(&r));
    if let Some((index, &residual)) = defect {
        return Err(QuantizeError::ResidualOutOfRange {
            index,
            residual,
            scaling_factor: sf,
        });
    }

    Ok(OffsetRefinement {
        offset,
        integer_offset_part,
        decimal_offset_part: residuals.mapv(|r| r as i64),
    })
}

/// Sign-magnitude quantizer followed by offset refinement of the integer parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetRefinementQuantizer {
    pub scaling_factor: Option<f64>,
    /// `None` uses the median integer part of each input.
    pub offset: Option<i32>,
    pub integer_bits: u8,
}

impl OffsetRefinementQuantizer {
    pub fn new(scaling_factor: Option<f64>, offset: Option<i32>, integer_bits: u8) -> Self {
        Self {
            scaling_factor,
            offset,
            integer_bits,
        }
    }
}

impl Default for OffsetRefinementQuantizer {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_INTEGER_BITS)
    }
}

impl Codec for OffsetRefinementQuantizer {
    fn name(&self) -> &'static str {
        "offset"
    }

    fn encode<S, D>(&self, data: &ArrayBase<S, D>) -> Result<Encoded<D>, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
        D: Dimension,
    {
        adaptive_quantize_with(data, self.scaling_factor, self.offset, self.integer_bits)
            .map(Encoded::Offset)
    }

    fn decode<D: Dimension>(&self, encoded: &Encoded<D>) -> Result<Array<f64, D>, QuantizeError> {
        match encoded {
            Encoded::Offset(record) => Ok(record.reconstruct_offset()),
            other => Err(QuantizeError::PayloadMismatch {
                codec: self.name(),
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sign_magnitude::quantize_sign_magnitude;
    use ndarray::{array, Array2};

    #[test]
    fn test_constant_array_has_zero_offset_parts() {
        let data = Array2::from_elem((3, 4), 42.75f64);
        let m = quantize_sign_magnitude(&data, None, 8).unwrap();
        let r = refine_offset(&data, &m, None).unwrap();
        assert_eq!(r.offset, 42);
        assert!(r.integer_offset_part.iter().all(|&i| i == 0));
        assert_eq!(r.decimal_offset_part, m.decimal_part);
    }

    #[test]
    fn test_median_offset_narrows_range() {
        // Integer parts 200..=210 do not fit i8 on their own but do around the median
        let data: ndarray::Array1<f64> = (200..=210).map(|i| i as f64 + 0.25).collect();
        let m = quantize_sign_magnitude(&data, Some(100.0), 8).unwrap();
        let r = refine_offset(&data, &m, None).unwrap();
        assert_eq!(r.offset, 205);
        assert_eq!(r.integer_offset_part[0], -5);
        assert_eq!(r.integer_offset_part[10], 5);

        let recon = r.reconstruct(&m.sign, m.scaling_factor);
        for (x, y) in data.iter().zip(recon.iter()) {
            assert!((x - y).abs() < 1e-9, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_negative_samples_keep_their_sign() {
        let data = array![-3.5f64, 2.25, -1.0, 0.0];
        let m = quantize_sign_magnitude(&data, Some(100.0), 8).unwrap();
        let r = refine_offset(&data, &m, Some(2)).unwrap();
        assert_eq!(r.integer_offset_part, array![1, 0, -1, -2]);
        let recon = r.reconstruct(&m.sign, m.scaling_factor);
        assert_eq!(recon, array![-3.5, 2.25, -1.0, 0.0]);
    }

    #[test]
    fn test_unsuitable_offset_rejected() {
        let data = array![0.5f64, 255.5];
        let m = quantize_sign_magnitude(&data, None, 8).unwrap();
        let err = refine_offset(&data, &m, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(
            err,
            QuantizeError::OffsetOutOfRange {
                index: 1,
                integer_part: 255,
                offset: 0,
                shifted: 255
            }
        );
        // The midpoint keeps both ends within i8
        assert!(refine_offset(&data, &m, Some(128)).is_ok());
    }

    #[test]
    fn test_mismatched_record_is_a_defect() {
        let data = array![1.5f64, 2.5];
        let mut m = quantize_sign_magnitude(&data, None, 8).unwrap();
        m.integer_part[0] = 3;
        let err = refine_offset(&data, &m, Some(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Defect);
        assert!(matches!(err, QuantizeError::ResidualOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let data = array![1.5f64, 2.5];
        let m = quantize_sign_magnitude(&array![1.5f64, 2.5, 3.5], None, 8).unwrap();
        assert!(matches!(
            refine_offset(&data, &m, None),
            Err(QuantizeError::ShapeMismatch(..))
        ));
    }
}
