use num::complex::Complex64;

/// What happened to a candidate offered to [`RootStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted(usize),
    Duplicate(usize),
    CapacityExceeded,
    NonFinite,
}

impl AddOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Bounded, deduplicated, insertion-ordered set of roots found during
/// discovery. The insertion position is the root index used for labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct RootStore {
    roots: Vec<Complex64>,
    capacity: usize,
    tolerance: f64,
}

impl RootStore {
    pub fn new(capacity: usize, tolerance: f64) -> Self {
        Self {
            roots: Vec::with_capacity(capacity),
            capacity,
            tolerance,
        }
    }

    pub fn add(&mut self, z: Complex64) -> AddOutcome {
        if self.is_full() {
            return AddOutcome::CapacityExceeded;
        }
        if let Some(index) = self
            .roots
            .iter()
            .position(|root| (z - root).norm() < self.tolerance)
        {
            return AddOutcome::Duplicate(index);
        }
        if !(z.re.is_finite() && z.im.is_finite()) {
            return AddOutcome::NonFinite;
        }
        self.roots.push(z);
        AddOutcome::Inserted(self.roots.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.roots.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn roots(&self) -> &[Complex64] {
        &self.roots
    }

    /// Ends the discovery phase.
    pub fn freeze(self) -> Roots {
        Roots(self.roots)
    }
}

/// The read-only root list shared by every worker during classification.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Roots(Vec<Complex64>);

impl Roots {
    /// Rebuilds the list from the real and imaginary parts as broadcast.
    pub fn from_parts(re: &[f64], im: &[f64]) -> Self {
        Self(
            re.iter()
                .zip(im)
                .map(|(&re, &im)| Complex64::new(re, im))
                .collect(),
        )
    }

    pub fn to_parts(&self) -> (Vec<f64>, Vec<f64>) {
        self.0.iter().map(|z| (z.re, z.im)).unzip()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Complex64> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<Complex64> {
        self.0.get(index).copied()
    }

    /// Index of the first root whose squared distance to `z` is below
    /// `tolerance_squared`.
    pub fn find(&self, z: Complex64, tolerance_squared: f64) -> Option<usize> {
        self.0
            .iter()
            .position(|root| (z - root).norm_sqr() < tolerance_squared)
    }
}
