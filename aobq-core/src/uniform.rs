use aobq_math::{extent, Sample};
use ndarray::{Array, ArrayBase, Data, Dimension};
use tracing::debug;

use crate::codec::{Codec, Encoded};
use crate::error::{ensure_bits, ensure_finite, QuantizeError};

pub const MIN_CODE_BITS: u8 = 1;
pub const MAX_CODE_BITS: u8 = 32;

/// Min-max quantized payload.
///
/// `max` travels with the codes because reconstruction cannot recompute it.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformQuantized<D: Dimension> {
    pub codes: Array<u32, D>,
    /// Codes per unit of input, `0.0` when the input was constant.
    pub scale: f64,
    pub min: f64,
    pub max: f64,
    pub bits: u8,
}

impl<D: Dimension> UniformQuantized<D> {
    /// Width of one quantization bucket.
    pub fn step(&self) -> f64 {
        (self.max - self.min) / levels(self.bits)
    }

    pub fn dequantize(&self) -> Result<Array<f64, D>, QuantizeError> {
        dequantize(&self.codes, self.scale, self.min, self.max, self.bits)
    }
}

#[inline]
fn levels(bits: u8) -> f64 {
    ((1u64 << bits) - 1) as f64
}

/// Maps every sample linearly from `[min, max]` onto `0..=2^bits - 1`.
pub fn quantize<S, D>(data: &ArrayBase<S, D>, bits: u8) -> Result<UniformQuantized<D>, QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    ensure_bits(bits, MIN_CODE_BITS, MAX_CODE_BITS)?;
    ensure_finite(data)?;
    let range = extent(data).ok_or(QuantizeError::EmptyInput)?;
    if !range.width().is_finite() {
        return Err(QuantizeError::UnboundedExtent {
            min: range.min,
            max: range.max,
        });
    }

    if range.is_degenerate() {
        debug!(value = range.min, bits, "constant input, using zero scale");
        return Ok(UniformQuantized {
            codes: Array::zeros(data.raw_dim()),
            scale: 0.0,
            min: range.min,
            max: range.max,
            bits,
        });
    }

    let top = levels(bits);
    let scale = top / range.width();
    debug!(min = range.min, max = range.max, scale, bits, "uniform quantization");

    let codes = data.mapv(|x| ((x.to_f64() - range.min) * scale).round().clamp(0.0, top) as u32);

    Ok(UniformQuantized {
        codes,
        scale,
        min: range.min,
        max: range.max,
        bits,
    })
}

/// Inverse of [`quantize`]. A zero `scale` marks constant input and yields `min` everywhere.
pub fn dequantize<S, D>(
    codes: &ArrayBase<S, D>,
    scale: f64,
    min: f64,
    max: f64,
    bits: u8,
) -> Result<Array<f64, D>, QuantizeError>
where
    S: Data<Elem = u32>,
    D: Dimension,
{
    ensure_bits(bits, MIN_CODE_BITS, MAX_CODE_BITS)?;
    if scale == 0.0 {
        return Ok(Array::from_elem(codes.raw_dim(), min));
    }

    let top = levels(bits);
    if let Some((index, &code)) = codes.iter().enumerate().find(|&(_, &c)| f64::from(c) > top) {
        return Err(QuantizeError::CodeOutOfRange { index, code, bits });
    }

    let width = max - min;
    Ok(codes.mapv(|c| f64::from(c) / top * width + min))
}

/// Global min-max quantizer with a fixed code width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformQuantizer {
    pub bits: u8,
}

impl UniformQuantizer {
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }
}

impl Default for UniformQuantizer {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Codec for UniformQuantizer {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn encode<S, D>(&self, data: &ArrayBase<S, D>) -> Result<Encoded<D>, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
        D: Dimension,
    {
        quantize(data, self.bits).map(Encoded::Uniform)
    }

    fn decode<D: Dimension>(&self, encoded: &Encoded<D>) -> Result<Array<f64, D>, QuantizeError> {
        match encoded {
            Encoded::Uniform(payload) => payload.dequantize(),
            other => Err(QuantizeError::PayloadMismatch {
                codec: self.name(),
                found: other.kind(),
            }),
        }
    }
}
