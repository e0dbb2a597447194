use num::complex::Complex64;

use crate::config::SearchConfig;
use crate::func::Func;

type C = Complex64;

/// Newton iteration used to polish root candidates during discovery.
#[derive(Debug, Clone, Copy)]
pub struct Refiner {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub derivative_threshold: f64,
}

impl Refiner {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            max_iterations: config.newton_iterations,
            tolerance: config.newton_tolerance,
            derivative_threshold: config.derivative_threshold,
        }
    }

    /// Returns the last iterate. A vanishing derivative or an exhausted
    /// iteration budget is not reported; callers check the result.
    pub fn refine<F: Func + ?Sized>(&self, func: &F, guess: C) -> C {
        let mut z = guess;
        for _ in 0..self.max_iterations {
            let df = func.df(z);
            if df.norm() < self.derivative_threshold {
                return z;
            }
            let step = func.f(z) / df;
            z -= step;
            if step.norm() < self.tolerance {
                return z;
            }
        }
        z
    }
}

impl Default for Refiner {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}
