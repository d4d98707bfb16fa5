use std::time::{Duration, Instant};

/// Runs `f` once and returns its result with the elapsed wall-clock time.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_passes_result_through() {
        let (value, elapsed) = timed(|| (1..=10).sum::<u32>());
        assert_eq!(value, 55);
        assert!(elapsed < Duration::from_secs(5));
    }
}
