use aobq_math::{MetricsError, Sample};
use ndarray::{ArrayBase, Data, Dimension};
use thiserror::Error;

/// Coarse classification of a [`QuantizeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is degenerate or invalid for the requested operation.
    Domain,
    /// A quantized component does not fit its declared width.
    Range,
    /// An internal consistency check failed; the encoding would be wrong.
    Defect,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantizeError {
    #[error("Cannot quantize an empty array")]
    EmptyInput,
    #[error("Non-finite sample {value} at index {index}")]
    NonFinite { index: usize, value: f64 },
    #[error("Value range [{min}, {max}] is too wide to represent")]
    UnboundedExtent { min: f64, max: f64 },
    #[error("All samples are zero, no scaling factor can be inferred")]
    AllZero,
    #[error("Scaling factor must be finite and positive, got {0}")]
    InvalidScalingFactor(f64),
    #[error("Bit width {bits} outside supported range {min}..={max}")]
    InvalidBitWidth { bits: u8, min: u8, max: u8 },
    #[error("Shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
    #[error("Codec {codec} cannot decode a {found} payload")]
    PayloadMismatch { codec: &'static str, found: &'static str },
    #[error("Integer part {integer_part} at index {index} exceeds {bits}-bit range 0..={max}")]
    IntegerOverflow {
        index: usize,
        integer_part: f64,
        bits: u8,
        max: u32,
    },
    #[error("Code {code} at index {index} exceeds {bits}-bit range")]
    CodeOutOfRange { index: usize, code: u32, bits: u8 },
    #[error("Scaling factor {0} too large for exact decimal encoding")]
    ScalingFactorOverflow(f64),
    #[error("Offset {offset} unsuitable: integer part {integer_part} at index {index} shifts to {shifted}, outside i8")]
    OffsetOutOfRange {
        index: usize,
        integer_part: u16,
        offset: i32,
        shifted: i64,
    },
    #[error("Offset residual {residual} at index {index} outside [0, {scaling_factor}]")]
    ResidualOutOfRange {
        index: usize,
        residual: f64,
        scaling_factor: f64,
    },
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

impl QuantizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuantizeError::EmptyInput
            | QuantizeError::NonFinite { .. }
            | QuantizeError::UnboundedExtent { .. }
            | QuantizeError::AllZero
            | QuantizeError::InvalidScalingFactor(_)
            | QuantizeError::InvalidBitWidth { .. }
            | QuantizeError::ShapeMismatch(..)
            | QuantizeError::PayloadMismatch { .. }
            | QuantizeError::Metrics(_) => ErrorKind::Domain,
            QuantizeError::IntegerOverflow { .. }
            | QuantizeError::CodeOutOfRange { .. }
            | QuantizeError::ScalingFactorOverflow(_)
            | QuantizeError::OffsetOutOfRange { .. } => ErrorKind::Range,
            QuantizeError::ResidualOutOfRange { .. } => ErrorKind::Defect,
        }
    }
}

/// Rejects empty arrays and NaN/infinite samples before any encoding starts.
pub(crate) fn ensure_finite<S, D>(data: &ArrayBase<S, D>) -> Result<(), QuantizeError>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    if data.is_empty() {
        return Err(QuantizeError::EmptyInput);
    }
    match data
        .iter()
        .map(|x| x.to_f64())
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        Some((index, value)) => Err(QuantizeError::NonFinite { index, value }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_bits(bits: u8, min: u8, max: u8) -> Result<(), QuantizeError> {
    if (min..=max).contains(&bits) {
        Ok(())
    } else {
        Err(QuantizeError::InvalidBitWidth { bits, min, max })
    }
}
