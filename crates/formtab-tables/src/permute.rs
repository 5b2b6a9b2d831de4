//! Quadrature-point permutations for orientation-ambiguous facets.
//!
//! Interior-facet integrals (and codimension-0 entities in
//! mixed-dimension settings) see each facet from two cells whose local
//! orientations need not agree, so basis values are tabulated once per
//! reference-coordinate permutation of the facet. Facets that carry a
//! global orientation (1-D facets, codimension-1 entities) need only the
//! identity.

use formtab_ir::{CellKind, IntegralKind, TableError};
use ndarray::Array2;

/// Reflect interval points: p -> 1 - p.
///
/// Points must be genuinely 1-D: any trailing coordinate column has to
/// be zero, or the reflection would leave it behind unpermuted.
pub fn permute_interval_points(
    points: &Array2<f64>,
    reflections: usize,
) -> Result<Array2<f64>, TableError> {
    if points.ncols() > 1 {
        for row in points.rows() {
            for &v in row.iter().skip(1) {
                if v.abs() > 1e-12 {
                    return Err(TableError::Internal(format!(
                        "interval reflection expects 1-D points, got trailing coordinate {v}"
                    )));
                }
            }
        }
    }
    let mut output = points.clone();
    for _ in 0..reflections {
        for mut p in output.rows_mut() {
            p[0] = 1.0 - p[0];
        }
    }
    Ok(output)
}

/// Rotate then reflect triangle points: rotation maps (p0, p1) to
/// (p1, 1 - p0 - p1), reflection swaps (p0, p1).
pub fn permute_triangle_points(
    points: &Array2<f64>,
    reflections: usize,
    rotations: usize,
) -> Array2<f64> {
    let mut output = points.clone();
    for _ in 0..rotations {
        for mut p in output.rows_mut() {
            let (p0, p1) = (p[0], p[1]);
            p[0] = p1;
            p[1] = 1.0 - p0 - p1;
        }
    }
    for _ in 0..reflections {
        for mut p in output.rows_mut() {
            p.swap(0, 1);
        }
    }
    output
}

/// Rotate then reflect quadrilateral points: rotation maps (p0, p1) to
/// (p1, 1 - p0), reflection swaps (p0, p1).
pub fn permute_quadrilateral_points(
    points: &Array2<f64>,
    reflections: usize,
    rotations: usize,
) -> Array2<f64> {
    let mut output = points.clone();
    for _ in 0..rotations {
        for mut p in output.rows_mut() {
            let (p0, p1) = (p[0], p[1]);
            p[0] = p1;
            p[1] = 1.0 - p0;
        }
    }
    for _ in 0..reflections {
        for mut p in output.rows_mut() {
            p.swap(0, 1);
        }
    }
    output
}

/// The point sets to tabulate, one per permutation, stacked along the
/// table's permutation axis in rotation-major order (reflection inner).
///
/// The count depends only on (topological dimension, codimension,
/// integral kind): 1 by default, 2 for 2-D interior facets, 6 for
/// tetrahedra, 8 for hexahedra. 3-D cells with other facet shapes are
/// unsupported.
pub fn permuted_point_sets(
    points: &Array2<f64>,
    cell: CellKind,
    integral: IntegralKind,
    codim: usize,
    mixed_dim: bool,
) -> Result<Vec<Array2<f64>>, TableError> {
    let needs_permutations =
        matches!(integral, IntegralKind::InteriorFacet) || (mixed_dim && codim == 0);
    let tdim = cell.topological_dimension();
    if !needs_permutations || tdim <= 1 || codim == 1 {
        // Facets oriented globally downstream; tabulate once.
        return Ok(vec![points.clone()]);
    }
    match tdim {
        2 => (0..2)
            .map(|reflections| permute_interval_points(points, reflections))
            .collect(),
        3 => match cell {
            CellKind::Tetrahedron => {
                let mut sets = Vec::with_capacity(6);
                for rotations in 0..3 {
                    for reflections in 0..2 {
                        sets.push(permute_triangle_points(points, reflections, rotations));
                    }
                }
                Ok(sets)
            }
            CellKind::Hexahedron => {
                let mut sets = Vec::with_capacity(8);
                for rotations in 0..4 {
                    for reflections in 0..2 {
                        sets.push(permute_quadrilateral_points(points, reflections, rotations));
                    }
                }
                Ok(sets)
            }
            _ => Err(TableError::UnsupportedCell {
                cell,
                context: "facet permutations need triangular or quadrilateral facets".into(),
            }),
        },
        _ => Ok(vec![points.clone()]),
    }
}
