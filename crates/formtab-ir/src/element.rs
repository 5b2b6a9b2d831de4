//! The finite-element capability contract.
//!
//! The table-construction stage treats basis evaluation as a black box:
//! anything that can tabulate derivatives of its basis functions at a set
//! of points, split off a scalar component, and (optionally) factor into
//! 1-D pieces can drive it. Concrete reference implementations live in
//! [`crate::reference`].

use std::sync::Arc;

use ndarray::{Array1, Array2, Array3};

use crate::cell::CellKind;

/// A scalar component of an element: the sub-element evaluating it, plus
/// the (offset, stride) placing its dofs inside the parent's dof block.
#[derive(Clone)]
pub struct ComponentElement {
    pub element: Arc<dyn FiniteElement>,
    pub offset: usize,
    pub stride: usize,
}

/// A tensor-product factorisation of an element: 1-D factors per spatial
/// axis and the permutation taking flattened factor indices to the
/// element's dof numbering.
#[derive(Clone)]
pub struct TensorFactorisation {
    pub factors: Vec<Arc<dyn FiniteElement>>,
    pub permutation: Vec<u32>,
}

/// Basis-evaluation capability required of any element.
pub trait FiniteElement: Send + Sync {
    /// The reference cell the element is defined on.
    fn cell(&self) -> CellKind;

    /// Total number of degrees of freedom.
    fn dim(&self) -> usize;

    /// Degree of the smallest polynomial space containing the element's
    /// span; a quadrature rule exact to this degree integrates the basis
    /// exactly.
    fn embedded_superdegree(&self) -> usize;

    /// Tabulate all basis derivatives up to order `nderiv` at `points`
    /// (shape `(num_points, tdim)`).
    ///
    /// Returns a table of shape `(num_derivative_indices, num_points,
    /// num_dofs)` whose first axis is ordered by [`derivative_index`].
    fn tabulate(&self, nderiv: usize, points: &Array2<f64>) -> Array3<f64>;

    /// Resolve a flat scalar component to its evaluating sub-element.
    fn component_element(&self, flat_component: usize) -> ComponentElement;

    /// Direct sub-elements, if any.
    fn sub_elements(&self) -> Vec<Arc<dyn FiniteElement>> {
        Vec::new()
    }

    /// A stable identity string; elements with equal signatures are
    /// treated as the same element for numbering and naming.
    fn signature(&self) -> String;

    /// The element's own points and weights, for quadrature-point
    /// elements only.
    fn quadrature_points(&self) -> Option<(Array2<f64>, Array1<f64>)> {
        None
    }

    /// The element's unique tensor-product factorisation, if it has
    /// exactly one.
    fn tensor_factorisation(&self) -> Option<TensorFactorisation> {
        None
    }
}

/// Position of a derivative multi-index in a tabulated derivative axis.
///
/// Multi-indices are ordered by total order, then by the triangular
/// (2-D) or tetrahedral (3-D) numbering within each order, so the axis
/// is cumulative: order-`n` tables contain all rows of lower orders at
/// the same positions.
pub fn derivative_index(counts: &[usize]) -> usize {
    match *counts {
        [] => 0,
        [i] => i,
        [p, q] => {
            let n = p + q;
            n * (n + 1) / 2 + q
        }
        [p, q, r] => {
            let n = p + q + r;
            let m = q + r;
            n * (n + 1) * (n + 2) / 6 + m * (m + 1) / 2 + r
        }
        _ => unreachable!("reference cells are at most 3-dimensional"),
    }
}

/// Number of derivative multi-indices of total order at most `order` in
/// `dim` dimensions: C(order + dim, dim).
pub fn num_derivatives(order: usize, dim: usize) -> usize {
    let mut n = 1;
    for i in 1..=dim {
        n = n * (order + i) / i;
    }
    n
}

/// All derivative multi-indices (counts per axis) of total order at most
/// `order`, in no particular order; pair with [`derivative_index`] to
/// place them.
pub fn derivative_multi_indices(order: usize, dim: usize) -> Vec<Vec<usize>> {
    fn fill(order: usize, dim: usize, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if prefix.len() == dim {
            out.push(prefix.clone());
            return;
        }
        let used: usize = prefix.iter().sum();
        for c in 0..=(order - used) {
            prefix.push(c);
            fill(order, dim, prefix, out);
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    fill(order, dim, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivative_index_1d() {
        assert_eq!(derivative_index(&[0]), 0);
        assert_eq!(derivative_index(&[2]), 2);
    }

    #[test]
    fn test_derivative_index_2d_cumulative() {
        assert_eq!(derivative_index(&[0, 0]), 0);
        assert_eq!(derivative_index(&[1, 0]), 1);
        assert_eq!(derivative_index(&[0, 1]), 2);
        assert_eq!(derivative_index(&[2, 0]), 3);
        assert_eq!(derivative_index(&[1, 1]), 4);
        assert_eq!(derivative_index(&[0, 2]), 5);
    }

    #[test]
    fn test_derivative_index_3d() {
        assert_eq!(derivative_index(&[0, 0, 0]), 0);
        assert_eq!(derivative_index(&[1, 0, 0]), 1);
        assert_eq!(derivative_index(&[0, 1, 0]), 2);
        assert_eq!(derivative_index(&[0, 0, 1]), 3);
        assert_eq!(derivative_index(&[2, 0, 0]), 4);
    }

    #[test]
    fn test_num_derivatives() {
        assert_eq!(num_derivatives(0, 2), 1);
        assert_eq!(num_derivatives(1, 2), 3);
        assert_eq!(num_derivatives(2, 2), 6);
        assert_eq!(num_derivatives(1, 3), 4);
        assert_eq!(num_derivatives(2, 3), 10);
    }

    #[test]
    fn test_multi_indices_cover_the_axis() {
        for dim in 1..=3 {
            for order in 0..=2 {
                let indices = derivative_multi_indices(order, dim);
                assert_eq!(indices.len(), num_derivatives(order, dim));
                let mut rows: Vec<usize> =
                    indices.iter().map(|c| derivative_index(c)).collect();
                rows.sort_unstable();
                assert_eq!(rows, (0..indices.len()).collect::<Vec<_>>());
            }
        }
    }
}
