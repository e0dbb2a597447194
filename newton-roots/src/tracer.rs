use crate::config::SearchConfig;
use crate::contour::{Counter, Region};
use crate::func::Func;
use crate::nr::Refiner;
use crate::store::{AddOutcome, RootStore};

/// Isolates roots by recursively quartering regions whose argument
/// principle count is at least two.
#[derive(Debug, Clone, Copy)]
pub struct Tracer {
    pub counter: Counter,
    pub refiner: Refiner,
    pub max_depth: usize,
    pub min_region_size: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceStats {
    pub regions: usize,
    pub discarded: usize,
    pub terminal: usize,
    pub isolated: usize,
}

impl Tracer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            counter: Counter::new(config),
            refiner: Refiner::new(config),
            max_depth: config.max_depth,
            min_region_size: config.min_region_size,
        }
    }

    pub fn trace<F: Func + ?Sized>(
        &self,
        func: &F,
        region: Region,
        store: &mut RootStore,
    ) -> TraceStats {
        let mut stats = TraceStats::default();
        // Depth first, quarters visited in the order quadrisect returns them.
        let mut pending = vec![(region, 0)];

        while let Some((region, depth)) = pending.pop() {
            stats.regions += 1;

            if depth > self.max_depth || region.diagonal() < self.min_region_size {
                stats.terminal += 1;
                self.add_center(func, &region, store);
                continue;
            }

            let winding = self.counter.count(func, &region);
            match winding.count() {
                None => {
                    log::debug!("Unreliable count {} in {region:?}", winding.value);
                    stats.discarded += 1;
                }
                Some(n) if n <= 0 => {
                    stats.discarded += 1;
                }
                Some(1) => {
                    stats.isolated += 1;
                    self.add_center(func, &region, store);
                }
                Some(n) => {
                    log::debug!("{n} roots in {region:?} (depth {depth})");
                    pending.extend(region.quadrisect().into_iter().rev().map(|r| (r, depth + 1)));
                }
            }
        }

        stats
    }

    fn add_center<F: Func + ?Sized>(&self, func: &F, region: &Region, store: &mut RootStore) {
        let z = self.refiner.refine(func, region.center());
        match store.add(z) {
            AddOutcome::Inserted(index) => log::debug!("Root {index} at {z}"),
            AddOutcome::NonFinite => log::warn!("Discarding non finite candidate {z}"),
            AddOutcome::Duplicate(_) | AddOutcome::CapacityExceeded => {}
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}
