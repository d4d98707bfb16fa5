//! # aobq-math
//!
//! Numeric groundwork for the aobq quantizers.
//!
//! This crate provides the [`Sample`] element abstraction (implemented for `f32` and
//! `f64`), whole-array statistics used to pick quantization parameters
//! ([`extent`], [`min_nonzero_abs`], [`lower_median`]) and the reconstruction quality
//! measures ([`compute_error_metrics`], [`reconstruction_error`]).
//!
//! Every function works on any `ndarray` dimensionality and never mutates its input.

pub mod metrics;
pub mod sample;
pub mod stats;

pub use metrics::{compute_error_metrics, mse, psnr, reconstruction_error, ErrorMetrics, MetricsError};
pub use sample::Sample;
pub use stats::{extent, lower_median, min_nonzero_abs, Extent};
