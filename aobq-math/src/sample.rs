use std::fmt::Debug;

/// Floating-point element accepted by the quantizers.
///
/// All arithmetic happens in `f64`; narrower samples are widened exactly.
pub trait Sample: Copy + Debug + PartialOrd {
    /// Largest error a widened sample can carry in `log10` of its magnitude.
    /// Decade snapping uses it so `0.01f32` counts as exactly two decades.
    const LOG_EPS: f64;

    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    // f32::EPSILON / ln(10) is about 5.2e-8
    const LOG_EPS: f64 = 1e-6;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for f64 {
    const LOG_EPS: f64 = 1e-9;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
