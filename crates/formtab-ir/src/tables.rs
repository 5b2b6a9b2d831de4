//! Table classification and the unique table reference.

use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Variation class of a cleaned table, ordered by specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    /// Empty, or all entries zero.
    Zeros,
    /// All entries one.
    Ones,
    /// Square point-by-dof identity on every entity.
    Quadrature,
    /// Constant across both points and entities.
    Fixed,
    /// Constant across points on each entity separately.
    Piecewise,
    /// Equal on all entities.
    Uniform,
    /// Varying over points and entities.
    Varying,
}

impl TableType {
    /// Whether tables of this class collapse their point axis.
    pub fn is_piecewise(self) -> bool {
        matches!(
            self,
            TableType::Piecewise | TableType::Fixed | TableType::Ones | TableType::Zeros
        )
    }

    /// Whether tables of this class collapse their entity axis.
    pub fn is_uniform(self) -> bool {
        matches!(
            self,
            TableType::Uniform | TableType::Fixed | TableType::Ones | TableType::Zeros
        )
    }
}

/// The canonical record for one distinct table.
///
/// Created once per first-seen distinct table and immutable thereafter;
/// lives for one compilation unit. `values` has axes `[permutation,
/// entity, point, dof]` with collapsed axes of size 1; consumers must
/// broadcast collapsed axes, never re-expand them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueTableReference {
    /// Stable cache key, also the array name the emitter declares.
    pub name: String,
    pub values: Array4<f64>,
    /// Dof offset for component extraction (includes the restriction
    /// offset for minus-restricted arguments).
    pub offset: usize,
    /// Dof stride for component extraction.
    pub block_size: usize,
    pub ttype: TableType,
    pub is_piecewise: bool,
    pub is_uniform: bool,
    pub is_permuted: bool,
    /// Names of the per-axis factor tables, for sum-factorized tables.
    /// The named entries live in the same output mapping.
    pub tensor_factors: Option<Vec<String>>,
    /// Permutation reordering flattened factor dof indices.
    pub tensor_permutation: Option<Vec<u32>>,
}
