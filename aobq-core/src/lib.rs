//! # aobq-core
//!
//! Lossy quantizers that turn floating-point arrays into fixed-width integer records
//! and back.
//!
//! - [`uniform`]: global min-max mapping onto `bits`-wide unsigned codes
//! - [`sign_magnitude`]: sign + truncated integer magnitude + scaled decimal remainder,
//!   with a data-driven scaling factor
//! - [`offset`]: integer magnitudes shifted by a (median) offset into `i8`
//!
//! All quantizers implement [`Codec`]; [`UnifiedCodec`] selects one at run time from a
//! serializable [`QuantizationMode`]. Every operation is pure and validates its input
//! before encoding; overflow is reported as a [`QuantizeError`], never wrapped.

pub mod codec;
pub mod error;
pub mod offset;
pub mod record;
pub mod report;
pub mod sign_magnitude;
pub mod uniform;
pub mod unified;

pub use codec::{Codec, Encoded};
pub use error::{ErrorKind, QuantizeError};
pub use offset::{refine_offset, OffsetRefinement, OffsetRefinementQuantizer};
pub use record::{
    adaptive_quantize, adaptive_quantize_with, reconstruct_adaptive, reconstruct_offset,
    QuantizedRecord,
};
pub use report::{AdaptiveReport, OffsetReport};
pub use sign_magnitude::{
    infer_scaling_factor, quantize_sign_magnitude, SignMagnitude, SignMagnitudeQuantizer,
};
pub use uniform::{UniformQuantized, UniformQuantizer};
pub use unified::{QuantizationMode, RoundTrip, UnifiedCodec};
