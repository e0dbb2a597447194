use std::ops::Range;

use num::complex::Complex64;

use crate::config::ClassifyConfig;
use crate::contour::Region;
use crate::func::Func;
use crate::partition::WorkRange;
use crate::store::Roots;

type C = Complex64;

/// Plotted window of the complex plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

impl Bounds {
    pub fn new(x_range: Range<f64>, y_range: Range<f64>) -> Self {
        Self { x_range, y_range }
    }

    pub fn width(&self) -> f64 {
        self.x_range.end - self.x_range.start
    }

    pub fn height(&self) -> f64 {
        self.y_range.end - self.y_range.start
    }

    pub fn region(&self) -> Region {
        Region::new(
            C::new(self.x_range.start, self.y_range.start),
            C::new(self.x_range.end, self.y_range.end),
        )
    }
}

/// Pixel grid laid over [`Bounds`]; the first and last pixel of a row or
/// column sit exactly on the bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub bounds: Bounds,
    pub width: usize,
    pub height: usize,
}

fn interpolate(range: &Range<f64>, i: usize, n: usize) -> f64 {
    if n < 2 {
        range.start
    } else {
        range.start + i as f64 / (n - 1) as f64 * (range.end - range.start)
    }
}

impl Grid {
    pub fn new(bounds: Bounds, width: usize, height: usize) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn point(&self, x: usize, y: usize) -> C {
        C::new(
            interpolate(&self.bounds.x_range, x, self.width),
            interpolate(&self.bounds.y_range, y, self.height),
        )
    }
}

/// Basin label of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelResult {
    /// Index into the frozen root list, or -1.
    pub root_idx: i32,
    pub iterations: u32,
}

impl PixelResult {
    pub const NO_ROOT: i32 = -1;

    pub fn new(root_idx: i32, iterations: u32) -> Self {
        Self {
            root_idx,
            iterations,
        }
    }

    pub fn converged(&self) -> bool {
        self.root_idx != Self::NO_ROOT
    }
}

pub struct Classifier<'a, F: Func + ?Sized> {
    func: &'a F,
    roots: &'a Roots,
    config: ClassifyConfig,
}

impl<'a, F: Func + ?Sized> Classifier<'a, F> {
    pub fn new(func: &'a F, roots: &'a Roots, config: ClassifyConfig) -> Self {
        Self {
            func,
            roots,
            config,
        }
    }

    /// Runs Newton from `z` until it lands within tolerance of a known root.
    pub fn classify_point(&self, mut z: C) -> PixelResult {
        let tolerance_squared = self.config.tolerance_squared();
        for k in 0..self.config.max_iterations {
            let df = self.func.df(z);
            if df.norm() < self.config.derivative_threshold {
                return PixelResult::new(PixelResult::NO_ROOT, k);
            }
            z -= self.func.f(z) / df;
            if let Some(index) = self.roots.find(z, tolerance_squared) {
                return PixelResult::new(index as i32, k + 1);
            }
        }
        PixelResult::new(PixelResult::NO_ROOT, self.config.max_iterations)
    }

    pub fn classify(&self, grid: &Grid, x: usize, y: usize) -> PixelResult {
        self.classify_point(grid.point(x, y))
    }

    /// Row-major results for every pixel of `rows`, calling `progress`
    /// once per finished row.
    pub fn classify_rows(
        &self,
        grid: &Grid,
        rows: WorkRange,
        mut progress: impl FnMut(usize),
    ) -> Vec<PixelResult> {
        let mut results = Vec::with_capacity(rows.len() * grid.width);
        for y in rows.rows() {
            results.extend((0..grid.width).map(|x| self.classify(grid, x, y)));
            progress(y);
        }
        results
    }
}
