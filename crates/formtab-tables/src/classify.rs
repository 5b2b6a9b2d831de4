//! Table cleaning, comparison and classification.
//!
//! Tables are compared with the usual allclose semantics
//! (`|a - b| <= atol + rtol * |b|`). Classification assigns exactly one
//! [`TableType`] per table, checked in order of specificity: zeros,
//! ones, quadrature, then the piecewise/uniform combination.

use formtab_ir::TableType;
use ndarray::{s, Array4, ArrayView, Dimension, Zip};

#[inline]
fn close(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

fn views_close<D: Dimension>(
    a: ArrayView<'_, f64, D>,
    b: ArrayView<'_, f64, D>,
    rtol: f64,
    atol: f64,
) -> bool {
    Zip::from(&a).and(&b).all(|&x, &y| close(x, y, rtol, atol))
}

/// Whether two tables are numerically identical: shapes match exactly
/// and all entries agree within tolerance.
pub fn equal_tables(a: &Array4<f64>, b: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    a.shape() == b.shape() && views_close(a.view(), b.view(), rtol, atol)
}

/// Snap values within tolerance of -1, 0 or 1 to those exact numbers.
pub fn clamp_table_small_numbers(table: &mut Array4<f64>, rtol: f64, atol: f64) {
    for v in table.iter_mut() {
        for n in [-1.0, 0.0, 1.0] {
            if close(*v, n, rtol, atol) {
                *v = n;
                break;
            }
        }
    }
}

/// All entries zero, or the table is empty.
pub fn is_zeros_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    table.is_empty() || table.iter().all(|&v| close(v, 0.0, rtol, atol))
}

/// All entries one.
pub fn is_ones_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    !table.is_empty() && table.iter().all(|&v| close(v, 1.0, rtol, atol))
}

/// The square point-by-dof block is the identity on every entity.
pub fn is_quadrature_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    let (_, num_entities, num_points, num_dofs) = table.dim();
    if num_points != num_dofs || num_points == 0 {
        return false;
    }
    (0..num_entities).all(|e| {
        (0..num_points).all(|p| {
            (0..num_dofs).all(|d| {
                let expect = if p == d { 1.0 } else { 0.0 };
                close(table[[0, e, p, d]], expect, rtol, atol)
            })
        })
    })
}

/// Whether any permutation differs from the first; if not, the
/// permutation axis is uninformative and collapses.
pub fn is_permuted_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    let first = table.slice(s![0, .., .., ..]);
    !(1..table.dim().0).all(|p| views_close(first, table.slice(s![p, .., .., ..]), rtol, atol))
}

/// Constant across the point axis, on each entity separately.
pub fn is_piecewise_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    let first = table.slice(s![0, .., 0, ..]);
    (1..table.dim().2).all(|p| views_close(first, table.slice(s![0, .., p, ..]), rtol, atol))
}

/// Equal on all entities.
pub fn is_uniform_table(table: &Array4<f64>, rtol: f64, atol: f64) -> bool {
    let first = table.slice(s![0, 0, .., ..]);
    (1..table.dim().1).all(|e| views_close(first, table.slice(s![0, e, .., ..]), rtol, atol))
}

/// Classify a cleaned table.
///
/// A size-1 entity axis carries no information of its own, so it
/// inherits the piecewise verdict: a table that genuinely varies over
/// points on the only entity classifies varying, while a constant one
/// still reaches fixed. This keeps "fixed iff piecewise and uniform"
/// meaningful for single-entity integrals.
pub fn analyse_table_type(table: &Array4<f64>, rtol: f64, atol: f64) -> TableType {
    if is_zeros_table(table, rtol, atol) {
        TableType::Zeros
    } else if is_ones_table(table, rtol, atol) {
        TableType::Ones
    } else if is_quadrature_table(table, rtol, atol) {
        TableType::Quadrature
    } else {
        let piecewise = is_piecewise_table(table, rtol, atol);
        let uniform = if table.dim().1 > 1 {
            is_uniform_table(table, rtol, atol)
        } else {
            piecewise
        };
        match (piecewise, uniform) {
            (true, true) => TableType::Fixed,
            (true, false) => TableType::Piecewise,
            (false, true) => TableType::Uniform,
            (false, false) => TableType::Varying,
        }
    }
}

/// Apply the axis-collapse policy for a classified table and report
/// whether the permutation axis is informative.
///
/// Piecewise-group tables drop their point axis, uniform-group tables
/// their entity axis; a permutation axis whose slices are all equal
/// drops as well. Collapse is irreversible; consumers broadcast size-1
/// axes.
pub fn collapse_table(
    mut table: Array4<f64>,
    ttype: TableType,
    rtol: f64,
    atol: f64,
) -> (Array4<f64>, bool) {
    if ttype.is_piecewise() {
        table = table.slice(s![.., .., ..1, ..]).to_owned();
    }
    if ttype.is_uniform() {
        table = table.slice(s![.., ..1, .., ..]).to_owned();
    }
    let is_permuted = is_permuted_table(&table, rtol, atol);
    if !is_permuted {
        table = table.slice(s![..1, .., .., ..]).to_owned();
    }
    (table, is_permuted)
}
