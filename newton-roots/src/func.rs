use num::complex::Complex64;

type C = Complex64;

/// An analytic function together with its derivative.
pub trait Func {
    fn f(&self, z: C) -> C;
    fn df(&self, z: C) -> C;
}

/// `z^3 - 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct Cubic;

impl Func for Cubic {
    fn f(&self, z: C) -> C {
        z * z * z - 1.0
    }

    fn df(&self, z: C) -> C {
        3.0 * z * z
    }
}

/// `sin(z^2 + 1)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SinSquare;

impl Func for SinSquare {
    fn f(&self, z: C) -> C {
        (z * z + 1.0).sin()
    }

    fn df(&self, z: C) -> C {
        2.0 * z * (z * z + 1.0).cos()
    }
}

/// A function given as a pair of closures `(f, f')`.
#[derive(Clone, Copy)]
pub struct FnPair<F, DF> {
    f: F,
    df: DF,
}

impl<F, DF> FnPair<F, DF>
where
    F: Fn(C) -> C,
    DF: Fn(C) -> C,
{
    pub fn new(f: F, df: DF) -> Self {
        Self { f, df }
    }
}

impl<F, DF> Func for FnPair<F, DF>
where
    F: Fn(C) -> C,
    DF: Fn(C) -> C,
{
    fn f(&self, z: C) -> C {
        (self.f)(z)
    }

    fn df(&self, z: C) -> C {
        (self.df)(z)
    }
}
