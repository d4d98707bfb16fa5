//! # aobq
//!
//! Adaptive offset-based quantization of floating-point arrays.
//!
//! Facade over the workspace crates:
//! - [`math`] (`aobq-math`): array statistics and MSE/PSNR error metrics
//! - [`codec`] (`aobq-core`): uniform, sign-magnitude and offset-refined quantizers
//!
//! The most common entry points are re-exported at the top level.

pub use aobq_core as codec;
pub use aobq_math as math;

pub use aobq_core::uniform::{dequantize, quantize};
pub use aobq_core::{
    adaptive_quantize, reconstruct_adaptive, reconstruct_offset, AdaptiveReport, Codec,
    ErrorKind, OffsetReport, QuantizationMode, QuantizeError, QuantizedRecord, UnifiedCodec,
};
pub use aobq_math::{compute_error_metrics, ErrorMetrics};
