//! Sum-factorization of tables into 1-D factor tables.
//!
//! On tensor-product cells a basis table factors into per-axis 1-D
//! tables, one per factor element, each tabulated at that axis's 1-D
//! quadrature points and derivative count. Factors are deduplicated by
//! exact value equality (they are never cleaned, so no tolerance) and
//! named `FE_TF{n}` in first-seen order.

use std::sync::Arc;

use formtab_ir::{FiniteElement, QuadratureRule, TableError};
use ndarray::{s, Array4};

/// Exact shape and value equality; factor tables are raw tabulations
/// and compare bitwise.
fn identical_tables(a: &Array4<f64>, b: &Array4<f64>) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Store of 1-D factor tables, separate from the main table registry.
#[derive(Default)]
pub struct FactorRegistry {
    entries: Vec<(String, Array4<f64>)>,
}

impl FactorRegistry {
    pub fn new() -> Self {
        FactorRegistry::default()
    }

    /// The name for `values`, inserting it if unseen; the flag is true
    /// for a first-seen table.
    fn insert(&mut self, values: Array4<f64>) -> (String, bool) {
        for (name, existing) in &self.entries {
            if identical_tables(existing, &values) {
                return (name.clone(), false);
            }
        }
        let name = format!("FE_TF{}", self.entries.len());
        self.entries.push((name.clone(), values));
        (name, true)
    }

    pub fn entries(&self) -> &[(String, Array4<f64>)] {
        &self.entries
    }
}

/// The factorization of one table: ordered per-axis factor names, the
/// dof-flattening permutation, and any factors first seen here (for the
/// caller to expose to the emitter).
pub struct FactorizedTable {
    pub factor_names: Vec<String>,
    pub permutation: Vec<u32>,
    pub new_factors: Vec<(String, Array4<f64>)>,
}

/// Factor a tabulation of `element` over `rule` into per-axis 1-D
/// tables.
///
/// Fatal if the rule carries no tensor decomposition or the element no
/// factorisation, or if their axis counts disagree.
pub fn factorize_table(
    element: &Arc<dyn FiniteElement>,
    rule: &QuadratureRule,
    derivative_counts: &[usize],
    registry: &mut FactorRegistry,
) -> Result<FactorizedTable, TableError> {
    let factorisation =
        element
            .tensor_factorisation()
            .ok_or_else(|| TableError::MissingTensorFactorisation {
                element: element.signature(),
            })?;
    let rule_factors =
        rule.tensor_factors
            .as_ref()
            .ok_or_else(|| TableError::MissingTensorQuadrature {
                rule: rule.id.clone(),
            })?;
    if factorisation.factors.len() != rule_factors.len()
        || derivative_counts.len() != rule_factors.len()
    {
        return Err(TableError::Internal(format!(
            "tensor factor mismatch for {}: {} element axes, {} rule axes, {} derivative axes",
            element.signature(),
            factorisation.factors.len(),
            rule_factors.len(),
            derivative_counts.len()
        )));
    }

    let mut factor_names = Vec::with_capacity(rule_factors.len());
    let mut new_factors = Vec::new();
    for (axis, factor) in factorisation.factors.iter().enumerate() {
        let d = derivative_counts[axis];
        let (points, _) = &rule_factors[axis];
        let table = factor.tabulate(d, points);
        // Row d is the order-d derivative on a 1-D cell.
        let values = table.slice(s![d, .., ..]);
        let (num_points, num_dofs) = values.dim();
        let mut factor_table = Array4::zeros((1, 1, num_points, num_dofs));
        factor_table.slice_mut(s![0, 0, .., ..]).assign(&values);
        let (name, is_new) = registry.insert(factor_table.clone());
        if is_new {
            new_factors.push((name.clone(), factor_table));
        }
        factor_names.push(name);
    }

    Ok(FactorizedTable {
        factor_names,
        permutation: factorisation.permutation,
        new_factors,
    })
}
