use ndarray::{ArrayBase, Data, Dimension};

use crate::Sample;

/// Closed value range `[min, max]` of an array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True when every sample has the same value.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

/// Minimum and maximum of the array, `None` when it is empty.
///
/// NaN samples are skipped; callers that must reject them validate beforehand.
pub fn extent<S, D>(data: &ArrayBase<S, D>) -> Option<Extent>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    data.iter()
        .map(|x| x.to_f64())
        .filter(|x| !x.is_nan())
        .fold(None, |acc, x| match acc {
            None => Some(Extent { min: x, max: x }),
            Some(e) => Some(Extent {
                min: e.min.min(x),
                max: e.max.max(x),
            }),
        })
}

/// Smallest strictly positive absolute value, `None` for an all-zero (or empty) array.
pub fn min_nonzero_abs<S, D>(data: &ArrayBase<S, D>) -> Option<f64>
where
    S: Data,
    S::Elem: Sample,
    D: Dimension,
{
    data.iter()
        .map(|x| x.to_f64().abs())
        .filter(|&m| m > 0.0)
        .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.min(m))))
}

/// Median of integer values. For an even count the lower of the two middle
/// elements is returned, so the result is always a member of the input.
pub fn lower_median<I>(values: I) -> Option<u16>
where
    I: IntoIterator<Item = u16>,
{
    let mut sorted: Vec<u16> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();
    Some(sorted[(sorted.len() - 1) / 2])
}
