use std::f64::consts::TAU;

use itertools::Itertools;
use num::complex::Complex64;

use crate::config::SearchConfig;
use crate::func::Func;

type C = Complex64;

/// Axis-aligned rectangle given by its lower left and upper right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: C,
    pub max: C,
}

impl Region {
    pub fn new(a: C, b: C) -> Self {
        Self {
            min: C::new(a.re.min(b.re), a.im.min(b.im)),
            max: C::new(a.re.max(b.re), a.im.max(b.im)),
        }
    }

    pub fn center(&self) -> C {
        (self.min + self.max) / 2.0
    }

    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Corners in counter-clockwise order starting at `min`.
    pub fn corners(&self) -> [C; 4] {
        [
            self.min,
            C::new(self.max.re, self.min.im),
            self.max,
            C::new(self.min.re, self.max.im),
        ]
    }

    /// The four quarters, tiling `self` exactly.
    pub fn quadrisect(&self) -> [Region; 4] {
        let mid = self.center();
        [
            Region::new(self.min, mid),
            Region::new(C::new(mid.re, self.min.im), C::new(self.max.re, mid.im)),
            Region::new(C::new(self.min.re, mid.im), C::new(mid.re, self.max.im)),
            Region::new(mid, self.max),
        ]
    }

    pub fn contains(&self, z: C) -> bool {
        (self.min.re..=self.max.re).contains(&z.re) && (self.min.im..=self.max.im).contains(&z.im)
    }
}

/// Winding number estimate `(1/2πi) ∮ f'/f dz` for a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winding {
    pub value: C,
}

impl Winding {
    const MAX_IMAGINARY: f64 = 0.5;

    /// Rounded root count, or `None` when the imaginary part says the
    /// quadrature is too noisy to trust.
    pub fn count(&self) -> Option<i64> {
        if !self.value.is_finite() || self.value.im.abs() > Self::MAX_IMAGINARY {
            None
        } else {
            Some(self.value.re.round() as i64)
        }
    }
}

/// Trapezoidal quadrature of the argument principle integral.
#[derive(Debug, Clone, Copy)]
pub struct Counter {
    pub steps: usize,
    pub near_zero: f64,
}

impl Counter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            steps: config.integration_steps.max(1),
            near_zero: config.near_zero_threshold,
        }
    }

    pub fn count<F: Func + ?Sized>(&self, func: &F, region: &Region) -> Winding {
        let corners = region.corners();
        let integral: C = corners
            .iter()
            .circular_tuple_windows::<(_, _)>()
            .map(|(&a, &b)| self.integrate_segment(func, a, b))
            .sum();
        Winding {
            value: integral / C::new(0.0, TAU),
        }
    }

    fn integrate_segment<F: Func + ?Sized>(&self, func: &F, a: C, b: C) -> C {
        let step = (b - a) / self.steps as f64;
        let mut sum = C::new(0.0, 0.0);
        let mut z = a;
        for _ in 0..self.steps {
            let next = z + step;
            let (f1, f2) = (func.f(z), func.f(next));
            // Panels touching a near zero of f would blow up; they are dropped.
            if f1.norm() > self.near_zero && f2.norm() > self.near_zero {
                sum += (func.df(z) / f1 + func.df(next) / f2) * 0.5 * step;
            }
            z = next;
        }
        sum
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::Cubic;

    #[test]
    fn quarters_tile_the_parent() {
        let region = Region::new(C::new(-1.0, -2.0), C::new(3.0, 2.0));
        let quarters = region.quadrisect();
        let area = |r: &Region| (r.max.re - r.min.re) * (r.max.im - r.min.im);
        let total: f64 = quarters.iter().map(area).sum();
        assert!((total - area(&region)).abs() < 1e-12);
        assert_eq!(quarters[0].min, region.min);
        assert_eq!(quarters[3].max, region.max);
        assert_eq!(quarters[0].max, region.center());
        assert_eq!(quarters[1].min, C::new(1.0, -2.0));
        assert_eq!(quarters[2].max, C::new(1.0, 2.0));
    }

    #[test]
    fn corners_are_normalised() {
        let region = Region::new(C::new(1.0, 1.0), C::new(-1.0, -1.0));
        assert_eq!(region.min, C::new(-1.0, -1.0));
        assert_eq!(region.max, C::new(1.0, 1.0));
        assert!(region.contains(C::new(0.0, 1.0)));
        assert!(!region.contains(C::new(0.0, 1.5)));
    }

    #[test]
    fn counts_cube_roots_of_unity() {
        let region = Region::new(C::new(-1.5, -1.5), C::new(1.5, 1.5));
        let winding = Counter::default().count(&Cubic, &region);
        assert_eq!(winding.count(), Some(3));
        assert!(winding.value.im.abs() < 1e-3);
    }

    #[test]
    fn empty_region_counts_zero() {
        let region = Region::new(C::new(2.0, 2.0), C::new(3.0, 3.0));
        assert_eq!(Counter::default().count(&Cubic, &region).count(), Some(0));
    }

    #[test]
    fn single_root_region_counts_one() {
        let region = Region::new(C::new(0.5, -0.5), C::new(1.5, 0.5));
        assert_eq!(Counter::default().count(&Cubic, &region).count(), Some(1));
    }

    #[test]
    fn noisy_estimates_are_unresolved() {
        let winding = Winding {
            value: C::new(1.0, 0.75),
        };
        assert_eq!(winding.count(), None);
        let winding = Winding {
            value: C::new(1.9, -0.2),
        };
        assert_eq!(winding.count(), Some(2));
    }

    #[test]
    fn non_finite_estimates_are_unresolved() {
        for value in [
            C::new(1.0, f64::NAN),
            C::new(1.0, f64::INFINITY),
            C::new(f64::NAN, 0.0),
            C::new(f64::NEG_INFINITY, 0.0),
        ] {
            assert_eq!(Winding { value }.count(), None, "{value}");
        }
    }
}
