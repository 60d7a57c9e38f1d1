use rand::Rng;

/// Randomness seam for motion selection and idle-delay jitter.
///
/// Everything the widget randomizes (clip picks, wait durations) is derived
/// from a uniform unit sample, so tests can pin behavior by injecting a
/// fixed source.
pub trait MotionRng: Send + Sync {
    /// Uniform value in `[0, 1)`.
    fn unit(&self) -> f64;

    /// Uniform index into a slice of the given length. Callers must pass a
    /// non-zero length.
    fn pick(&self, len: usize) -> usize {
        debug_assert!(len > 0);
        let idx = (self.unit() * len as f64) as usize;
        idx.min(len - 1)
    }
}

/// Production source backed by the thread-local rand generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRng;

impl MotionRng for ThreadRng {
    fn unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}
