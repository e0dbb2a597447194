use crate::config::{FallbackPolicy, SearchConfig};
use crate::contour::Region;
use crate::func::Func;
use crate::scan::GridScanner;
use crate::store::RootStore;
use crate::tracer::Tracer;

/// Discovers the roots of `func` inside `region`: recursive tracing first,
/// then the grid scan as dictated by `config.fallback`.
pub fn find_roots<F: Func + ?Sized>(func: &F, region: Region, config: &SearchConfig) -> RootStore {
    let mut store = RootStore::new(config.capacity, config.dedup_tolerance);

    let stats = Tracer::new(config).trace(func, region, &mut store);
    log::info!(
        "Tracer visited {} regions, found {} roots",
        stats.regions,
        store.len()
    );

    let run_scan = match config.fallback {
        FallbackPolicy::Always => true,
        FallbackPolicy::WhenEmpty => store.is_empty(),
        FallbackPolicy::Never => false,
    };
    if run_scan {
        let added = GridScanner::new(config).scan(func, &region, &mut store);
        log::info!("Grid scan ({}) added {added} roots", config.fallback);
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{Cubic, SinSquare};
    use num::complex::Complex64;

    type C = Complex64;

    #[test]
    fn cube_roots_of_unity() {
        let region = Region::new(C::new(-1.5, -1.5), C::new(1.5, 1.5));
        let store = find_roots(&Cubic, region, &SearchConfig::default());

        let h = 3f64.sqrt() / 2.0;
        let expected = [C::new(1.0, 0.0), C::new(-0.5, h), C::new(-0.5, -h)];
        assert_eq!(store.len(), 3);
        for e in expected {
            assert!(
                store.roots().iter().any(|z| (z - e).norm() < 1e-5),
                "{e} missing from {:?}",
                store.roots()
            );
        }
    }

    #[test]
    fn tracer_alone_finds_cube_roots() {
        // Offset so that no quadrisection line passes through a root.
        let region = Region::new(C::new(-1.4, -1.3), C::new(1.6, 1.5));
        let config = SearchConfig {
            fallback: FallbackPolicy::Never,
            ..SearchConfig::default()
        };
        let store = find_roots(&Cubic, region, &config);

        let h = 3f64.sqrt() / 2.0;
        assert_eq!(store.len(), 3, "{:?}", store.roots());
        for e in [C::new(1.0, 0.0), C::new(-0.5, h), C::new(-0.5, -h)] {
            assert!(
                store.roots().iter().any(|z| (z - e).norm() < config.dedup_tolerance),
                "{e} missing from {:?}",
                store.roots()
            );
        }
    }

    #[test]
    fn sine_roots_inside_the_square() {
        let region = Region::new(C::new(-1.5, -1.5), C::new(1.5, 1.5));
        let store = find_roots(&SinSquare, region, &SearchConfig::default());
        let r = (std::f64::consts::PI - 1.0).sqrt();
        for e in [C::new(0.0, 1.0), C::new(0.0, -1.0), C::new(r, 0.0), C::new(-r, 0.0)] {
            assert!(
                store.roots().iter().any(|z| (z - e).norm() < 1e-5),
                "{e} missing from {:?}",
                store.roots()
            );
        }
    }

    #[test]
    fn when_empty_policy_skips_scan_after_success() {
        let region = Region::new(C::new(0.5, -0.5), C::new(1.5, 0.5));
        let config = SearchConfig {
            fallback: FallbackPolicy::WhenEmpty,
            ..SearchConfig::default()
        };
        let store = find_roots(&Cubic, region, &config);
        assert_eq!(store.len(), 1);
        assert!((store.roots()[0] - C::new(1.0, 0.0)).norm() < 1e-10);
    }
}
