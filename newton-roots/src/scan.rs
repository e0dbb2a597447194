use itertools::iproduct;
use num::complex::Complex64;

use crate::config::SearchConfig;
use crate::contour::Region;
use crate::func::Func;
use crate::nr::Refiner;
use crate::store::RootStore;

/// Seeds Newton iteration on a uniform grid and keeps every result whose
/// residual is small. Catches roots the tracer lost to quadrature noise or
/// early cutoffs.
#[derive(Debug, Clone, Copy)]
pub struct GridScanner {
    pub refiner: Refiner,
    pub grid_size: usize,
    pub residual_threshold: f64,
}

impl GridScanner {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            refiner: Refiner::new(config),
            grid_size: config.grid_size,
            residual_threshold: config.residual_threshold,
        }
    }

    fn coordinate(&self, min: f64, max: f64, i: usize) -> f64 {
        if self.grid_size < 2 {
            (min + max) / 2.0
        } else {
            min + (max - min) * i as f64 / (self.grid_size - 1) as f64
        }
    }

    /// Returns the number of roots added.
    pub fn scan<F: Func + ?Sized>(&self, func: &F, region: &Region, store: &mut RootStore) -> usize {
        let mut added = 0;
        for (i, j) in iproduct!(0..self.grid_size, 0..self.grid_size) {
            if store.is_full() {
                log::info!("Root store full, stopping grid scan");
                break;
            }
            let seed = Complex64::new(
                self.coordinate(region.min.re, region.max.re, i),
                self.coordinate(region.min.im, region.max.im, j),
            );
            let z = self.refiner.refine(func, seed);
            if func.f(z).norm() < self.residual_threshold && store.add(z).accepted() {
                log::debug!("Grid scan found {z} from {seed}");
                added += 1;
            }
        }
        added
    }
}

impl Default for GridScanner {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{Cubic, FnPair};

    type C = Complex64;

    fn domain() -> Region {
        Region::new(C::new(-1.5, -1.5), C::new(1.5, 1.5))
    }

    #[test]
    fn finds_all_cube_roots() {
        let mut store = RootStore::new(20, 1e-5);
        assert_eq!(GridScanner::default().scan(&Cubic, &domain(), &mut store), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn second_scan_adds_nothing() {
        let scanner = GridScanner::default();
        let mut store = RootStore::new(20, 1e-5);
        scanner.scan(&Cubic, &domain(), &mut store);
        assert_eq!(scanner.scan(&Cubic, &domain(), &mut store), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn stops_when_full() {
        let mut store = RootStore::new(2, 1e-5);
        GridScanner::default().scan(&Cubic, &domain(), &mut store);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_large_residuals() {
        // One step from these seeds lands nowhere near the zeros at ±i√1000.
        let func = FnPair::new(|z: C| z * z + 1e3, |z: C| 2.0 * z);
        let region = Region::new(C::new(0.1, -0.1), C::new(1.0, 0.1));
        let scanner = GridScanner {
            refiner: Refiner {
                max_iterations: 1,
                ..Refiner::default()
            },
            ..GridScanner::default()
        };
        let mut store = RootStore::new(20, 1e-5);
        assert_eq!(scanner.scan(&func, &region, &mut store), 0);
    }
}
