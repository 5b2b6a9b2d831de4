//! Options controlling table construction.

use serde::{Deserialize, Serialize};

/// Default relative tolerance for table comparisons.
pub const DEFAULT_RTOL: f64 = 1e-6;
/// Default absolute tolerance for table comparisons.
pub const DEFAULT_ATOL: f64 = 1e-9;

/// Numeric tolerances and feature flags for one table-construction run.
///
/// The same tolerance pair is used both for snapping near-integer values
/// and for the structural equality that drives deduplication.
///
/// # Examples
///
/// ```
/// use formtab_tables::TableOptions;
///
/// let options = TableOptions::new().with_sum_factorization();
/// assert!(options.sum_factorization);
/// assert_eq!(options.rtol, 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Relative tolerance for comparing and snapping table values.
    pub rtol: f64,
    /// Absolute tolerance for comparing and snapping table values.
    pub atol: f64,
    /// Decompose tensor-product element tables into 1-D factors.
    pub sum_factorization: bool,
    /// The domain mixes cells of different dimension; codimension-0
    /// entities then need facet permutations like interior facets do.
    pub mixed_dim: bool,
}

impl TableOptions {
    pub fn new() -> Self {
        TableOptions {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            sum_factorization: false,
            mixed_dim: false,
        }
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn with_sum_factorization(mut self) -> Self {
        self.sum_factorization = true;
        self
    }

    pub fn with_mixed_dimensions(mut self) -> Self {
        self.mixed_dim = true;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.rtol, 1e-6);
        assert_eq!(options.atol, 1e-9);
        assert!(!options.sum_factorization);
        assert!(!options.mixed_dim);
    }

    #[test]
    fn test_builders() {
        let options = TableOptions::new()
            .with_tolerances(1e-10, 1e-14)
            .with_mixed_dimensions();
        assert_eq!(options.rtol, 1e-10);
        assert!(options.mixed_dim);
    }
}
