// Dense linear-solve capability
//
// Each target node j needs two solves against the same matrix (I - Q_j),
// so the seam is "factor once, solve many" rather than a one-shot solve.
// The default implementation is nalgebra's partial-pivoting LU.

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::errors::{CentralityError, CentralityResult};

/// Default relative pivot threshold for `LuSolver`.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Factors square systems `A x = b`.
pub trait LinearSolver: Send + Sync {
    type Factorization: Factorization;

    /// Factor `a`. Returns `None` when `a` is (numerically) singular.
    fn factorize(&self, a: DMatrix<f64>) -> Option<Self::Factorization>;
}

/// A factored matrix that can be solved against any right-hand side.
pub trait Factorization {
    /// Returns `None` if the solve fails or produces non-finite values.
    fn solve(&self, b: &DVector<f64>) -> Option<DVector<f64>>;
}

/// LU solver with a relative pivot check.
///
/// nalgebra only refuses exact zero pivots. A pivot that is tiny relative
/// to the largest one means the system is singular up to rounding, and the
/// solution would be garbage, so those are rejected too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuSolver {
    pivot_tolerance: f64,
}

impl LuSolver {
    /// # Errors
    /// - `InvalidParameter` if the tolerance is not finite or not in [0, 1)
    pub fn new(pivot_tolerance: f64) -> CentralityResult<Self> {
        if !pivot_tolerance.is_finite() || !(0.0..1.0).contains(&pivot_tolerance) {
            return Err(CentralityError::InvalidParameter(format!(
                "pivot_tolerance must be in [0, 1), got {}",
                pivot_tolerance
            )));
        }
        Ok(Self { pivot_tolerance })
    }

    pub fn pivot_tolerance(&self) -> f64 {
        self.pivot_tolerance
    }
}

impl Default for LuSolver {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

/// LU factors of a square matrix.
pub struct LuFactorization {
    lu: LU<f64, Dyn, Dyn>,
}

impl LinearSolver for LuSolver {
    type Factorization = LuFactorization;

    fn factorize(&self, a: DMatrix<f64>) -> Option<LuFactorization> {
        if a.is_empty() || !a.is_square() {
            return None;
        }

        let lu = a.lu();
        let pivots = lu.u().diagonal();

        let largest = pivots.iter().fold(0.0_f64, |acc, p| acc.max(p.abs()));
        let smallest = pivots.iter().fold(f64::INFINITY, |acc, p| acc.min(p.abs()));

        if !largest.is_finite() || largest == 0.0 {
            return None;
        }
        if smallest <= self.pivot_tolerance * largest {
            return None;
        }

        Some(LuFactorization { lu })
    }
}

impl Factorization for LuFactorization {
    fn solve(&self, b: &DVector<f64>) -> Option<DVector<f64>> {
        let x = self.lu.solve(b)?;
        if x.iter().all(|v| v.is_finite()) {
            Some(x)
        } else {
            None
        }
    }
}
