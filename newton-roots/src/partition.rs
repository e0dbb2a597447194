use std::ops::Range;

/// Half-open interval of grid rows owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkRange {
    pub start: usize,
    pub end: usize,
}

impl WorkRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `height` rows into `workers` contiguous ranges. The first
/// `height % workers` ranges get one extra row.
pub fn partition(height: usize, workers: usize) -> Vec<WorkRange> {
    if workers == 0 {
        return vec![];
    }
    let base = height / workers;
    let remainder = height % workers;

    let mut start = 0;
    (0..workers)
        .map(|rank| {
            let len = if rank < remainder { base + 1 } else { base };
            let range = WorkRange::new(start, start + len);
            start += len;
            range
        })
        .collect()
}
