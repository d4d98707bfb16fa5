use aobq_math::{min_nonzero_abs, Sample};
use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use tracing::debug;

use crate::codec::{Codec, Encoded};
use crate::error::{ensure_bits, ensure_finite, QuantizeError};

pub const DEFAULT_INTEGER_BITS: u8 = 8;
pub const MAX_INTEGER_BITS: u8 = 16;

/// Largest scaling factor for which every decimal part is an exact `f64` integer (2^53).
pub const MAX_SCALING_FACTOR: f64 = 9_007_199_254_740_992.0;

/// Sign, truncated magnitude and scaled fractional remainder of every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SignMagnitude<D: Dimension> {
    /// -1, 0 or +1; zero only for samples that are exactly zero.
    pub sign: Array<i8, D>,
    /// `floor(|x|)`, always within `0..=2^integer_bits - 1`.
    pub integer_part: Array<u16, D>,
    /// `round(frac(|x|) * scaling_factor)`, in `0..=scaling_factor`.
    pub decimal_part: Array<i64, D>,
    pub scaling_factor: f64,
    pub integer_bits: u8,
}

impl<D: Dimension> SignMagnitude<D> {
    pub fn len(&self) -> usize {
        self.sign.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sign.is_empty()
    }

    /// `sign * (integer_part + decimal_part / scaling_factor)`
    pub fn reconstruct(&self) -> Array<f64, D> {
        let sf = self.scaling_factor;
        Zip::from(&self.sign)
            .and(&self.integer_part)
            .and(&self.decimal_part)
            .map_collect(|&s, &i, &d| f64::from(s) * (f64::from(i) + d as f64 / sf))
    }
}

/// Validates a caller-supplied or inferred scaling factor.
pub fn check_scaling_factor(scaling_factor: f64) -> Result<f64, QuantizeError> {
    if scaling_factor.is_nan() || scaling_factor <= 0.0 {
        return Err(QuantizeError::InvalidScalingFactor(scaling_factor));
    }
    if scaling_factor > MAX_SCALING_FACTOR {
        return Err(QuantizeError::ScalingFactorOverflow(scaling_factor));
    }
    Ok(scaling_factor)
}

/// Smallest power of ten that keeps the smallest nonzero magnitude from rounding to zero:
/// `10^ceil(-log10(min_nonzero_abs))`.
///
/// An exponent within [`Sample::LOG_EPS`] of an integer is taken as that integer, so
/// exact decades stored as `f32` keep their factor.
pub fn infer_scaling_factor<S, D>(data: &ArrayBase<S, D>) -> Result<f64, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    let smallest = min_nonzero_abs(data).ok_or(QuantizeError::AllZero)?;
    let exponent = -smallest.log10();
    let nearest = exponent.round();
    let exponent = if (exponent - nearest).abs() < <S::Elem as Sample>::LOG_EPS {
        nearest
    } else {
        exponent.ceil()
    };
    // Denormal magnitudes push this to infinity; the overflow check rejects it
    let scaling_factor = 10f64.powi(exponent.clamp(-400.0, 400.0) as i32);
    debug!(smallest, scaling_factor, "inferred scaling factor");
    check_scaling_factor(scaling_factor)
}

#[inline]
fn sign_of(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Splits every sample into sign, integer magnitude and scaled decimal remainder.
///
/// Any sample whose integer magnitude does not fit `integer_bits` is rejected; nothing is
/// truncated.
pub fn quantize_sign_magnitude<S, D>(
    data: &ArrayBase<S, D>,
    scaling_factor: Option<f64>,
    integer_bits: u8,
) -> Result<SignMagnitude<D>, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    ensure_bits(integer_bits, 1, MAX_INTEGER_BITS)?;
    ensure_finite(data)?;
    let sf = match scaling_factor {
        Some(sf) => check_scaling_factor(sf)?,
        None => infer_scaling_factor(data)?,
    };

    let max_integer = (1u32 << integer_bits) - 1;
    let overflow = data
        .iter()
        .map(|x| x.to_f64().abs().floor())
        .enumerate()
        .find(|&(_, whole)| whole > f64::from(max_integer));
    if let Some((index, integer_part)) = overflow {
        return Err(QuantizeError::IntegerOverflow {
            index,
            integer_part,
            bits: integer_bits,
            max: max_integer,
        });
    }

    let magnitudes = data.mapv(|x| x.to_f64().abs());
    // In range: every floor(|x|) was checked against max_integer above
    let integer_part = magnitudes.mapv(|m| m.floor() as u16);
    let decimal_part = magnitudes.mapv(|m| ((m - m.floor()) * sf).round() as i64);
    let sign = data.mapv(|x| sign_of(x.to_f64()));

    Ok(SignMagnitude {
        sign,
        integer_part,
        decimal_part,
        scaling_factor: sf,
        integer_bits,
    })
}

/// Adaptive sign-magnitude quantizer without offset refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignMagnitudeQuantizer {
    /// `None` infers the factor from the data on every call.
    pub scaling_factor: Option<f64>,
    pub integer_bits: u8,
}

impl SignMagnitudeQuantizer {
    pub fn new(scaling_factor: Option<f64>, integer_bits: u8) -> Self {
        Self {
            scaling_factor,
            integer_bits,
        }
    }
}

impl Default for SignMagnitudeQuantizer {
    fn default() -> Self {
        Self::new(None, DEFAULT_INTEGER_BITS)
    }
}

impl Codec for SignMagnitudeQuantizer {
    fn name(&self) -> &'static str {
        "sign-magnitude"
    }

    fn encode<S, D>(&self, data: &ArrayBase<S, D>) -> Result<Encoded<D>, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
        D: Dimension,
    {
        quantize_sign_magnitude(data, self.scaling_factor, self.integer_bits).map(Encoded::SignMagnitude)
    }

    fn decode<D: Dimension>(&self, encoded: &Encoded<D>) -> Result<Array<f64, D>, QuantizeError> {
        match encoded {
            Encoded::SignMagnitude(m) => Ok(m.reconstruct()),
            Encoded::Offset(record) => Ok(record.magnitude.reconstruct()),
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
    use ndarray::array;

    #[test]
    fn test_inferred_factor_for_decades() {
        let data = array![0.001f64, 0.01, 0.1];
        assert_eq!(infer_scaling_factor(&data).unwrap(), 1000.0);

        let m = quantize_sign_magnitude(&data, None, 8).unwrap();
        assert_eq!(m.scaling_factor, 1000.0);
        assert_eq!(m.decimal_part, array![1, 10, 100]);
        assert!(m.integer_part.iter().all(|&i| i == 0));
    }

    #[test]
    fn test_inferred_factor_f32_samples() {
        // 0.001f32 widens to slightly more than 1e-3 and must still give 1000
        let data = array![0.001f32, -0.5];
        assert_eq!(infer_scaling_factor(&data).unwrap(), 1000.0);
    }

    #[test]
    fn test_inferred_factor_f32_below_decade() {
        // 0.01f32 and 1e-4f32 widen to slightly less than their decade
        assert_eq!(infer_scaling_factor(&array![0.01f32, 0.5]).unwrap(), 100.0);
        assert_eq!(infer_scaling_factor(&array![1e-4f32, -0.5]).unwrap(), 10_000.0);
        assert_eq!(infer_scaling_factor(&array![0.1f32, 2.0]).unwrap(), 10.0);

        let encoded = quantize_sign_magnitude(&array![0.01f32, 0.25], None, DEFAULT_INTEGER_BITS).unwrap();
        assert_eq!(encoded.scaling_factor, 100.0);
        assert_eq!(encoded.decimal_part, array![1i64, 25]);
    }

    #[test]
    fn test_inferred_factor_between_decades() {
        let data = array![0.05f64, 3.0];
        assert_eq!(infer_scaling_factor(&data).unwrap(), 100.0);
        // Magnitudes at or above one need no fractional amplification
        let data = array![7.0f64, 12.5];
        assert_eq!(infer_scaling_factor(&data).unwrap(), 1.0);
    }

    #[test]
    fn test_all_zero_needs_explicit_factor() {
        let zeros = array![[0.0f64, -0.0], [0.0, 0.0]];
        assert_eq!(
            quantize_sign_magnitude(&zeros, None, 8).unwrap_err(),
            QuantizeError::AllZero
        );
        let m = quantize_sign_magnitude(&zeros, Some(10.0), 8).unwrap();
        assert!(m.sign.iter().all(|&s| s == 0));
        assert!(m.reconstruct().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_signs() {
        let data = array![-1.5f64, 0.0, -0.0, 2.0];
        let m = quantize_sign_magnitude(&data, Some(10.0), 8).unwrap();
        assert_eq!(m.sign, array![-1, 0, 0, 1]);
    }

    #[test]
    fn test_reconstruction_within_half_unit() {
        let data = array![[1.2345f64, -7.891], [254.999, -0.0004]];
        let m = quantize_sign_magnitude(&data, Some(1000.0), 8).unwrap();
        let recon = m.reconstruct();
        for (x, y) in data.iter().zip(recon.iter()) {
            assert!((x - y).abs() <= 0.5 / 1000.0 + 1e-12, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_integer_overflow_rejected() {
        let data = array![1.0f64, -256.0, 3.0];
        let err = quantize_sign_magnitude(&data, Some(10.0), 8).unwrap_err();
        assert_eq!(
            err,
            QuantizeError::IntegerOverflow {
                index: 1,
                integer_part: 256.0,
                bits: 8,
                max: 255
            }
        );
        // 255.99 still fits
        assert!(quantize_sign_magnitude(&array![255.99f64], Some(10.0), 8).is_ok());
        // A wider declared width accepts the same value
        assert!(quantize_sign_magnitude(&data, Some(10.0), 9).is_ok());
    }

    #[test]
    fn test_bad_scaling_factors() {
        let data = array![0.5f64];
        assert_eq!(
            quantize_sign_magnitude(&data, Some(0.0), 8).unwrap_err(),
            QuantizeError::InvalidScalingFactor(0.0)
        );
        assert!(matches!(
            quantize_sign_magnitude(&data, Some(f64::NAN), 8),
            Err(QuantizeError::InvalidScalingFactor(_))
        ));
        assert_eq!(
            quantize_sign_magnitude(&data, Some(1e20), 8).unwrap_err(),
            QuantizeError::ScalingFactorOverflow(1e20)
        );
    }

    #[test]
    fn test_denormal_magnitude_overflows_factor() {
        let data = array![f64::MIN_POSITIVE / 1024.0];
        assert!(matches!(
            infer_scaling_factor(&data),
            Err(QuantizeError::ScalingFactorOverflow(_))
        ));
    }
}
