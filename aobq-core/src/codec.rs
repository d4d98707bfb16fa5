use aobq_math::Sample;
use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::error::QuantizeError;
use crate::record::QuantizedRecord;
use crate::sign_magnitude::SignMagnitude;
use crate::uniform::UniformQuantized;

/// Output of any [`Codec`], tagged by the representation it holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded<D: Dimension> {
    Uniform(UniformQuantized<D>),
    SignMagnitude(SignMagnitude<D>),
    Offset(QuantizedRecord<D>),
}

impl<D: Dimension> Encoded<D> {
    pub fn kind(&self) -> &'static str {
        match self {
            Encoded::Uniform(_) => "uniform",
            Encoded::SignMagnitude(_) => "sign-magnitude",
            Encoded::Offset(_) => "offset",
        }
    }

    /// Number of encoded elements.
    pub fn len(&self) -> usize {
        match self {
            Encoded::Uniform(q) => q.codes.len(),
            Encoded::SignMagnitude(m) => m.len(),
            Encoded::Offset(r) => r.magnitude.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Quantizer interface shared by every variant.
///
/// Both directions are pure: the same input always produces the same output and
/// implementations hold no state between calls.
pub trait Codec {
    fn name(&self) -> &'static str;

    fn encode<S, D>(&self, data: &ArrayBase<S, D>) -> Result<Encoded<D>, QuantizeError>
    where
        S: Data,
        S::Elem: Sample,
        D: Dimension;

    fn decode<D: Dimension>(&self, encoded: &Encoded<D>) -> Result<Array<f64, D>, QuantizeError>;
}
