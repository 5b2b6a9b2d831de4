//! Tabulation of resolved terminals into raw 4-axis tables.
//!
//! For one permutation's point set, an element is tabulated once per
//! sub-entity of the integration dimension, selecting the derivative row
//! and scalar component the resolver asked for. Averaged terminals swap
//! the caller's points for a quadrature rule of the element's embedded
//! degree and collapse the point axis to its weighted mean.

use std::sync::Arc;

use formtab_ir::{
    derivative_index, Averaging, CellKind, EntityType, FiniteElement, IntegralKind,
    QuadratureRule, TableError,
};
use ndarray::{s, Array1, Array2, Array4, Axis};

/// One permutation's table for one terminal, shape
/// `(1, num_entities, num_points, num_dofs)`, with the component
/// placement inside the parent element's dof block.
#[derive(Debug)]
pub struct TabulatedTerminal {
    pub array: Array4<f64>,
    pub offset: usize,
    pub stride: usize,
}

/// Reduce the integral kind to the plain cell/facet kind that fixes the
/// entity loop. Averaging overrides the integral's own geometry.
fn effective_integral(
    integral: IntegralKind,
    entity_type: EntityType,
    averaging: Option<Averaging>,
) -> Result<IntegralKind, TableError> {
    if averaging.is_some() && matches!(integral, IntegralKind::Custom) {
        return Err(TableError::AveragingUnsupported { integral });
    }
    let base = match integral {
        IntegralKind::Custom => IntegralKind::Cell,
        IntegralKind::Expression => match entity_type {
            EntityType::Cell => IntegralKind::Cell,
            EntityType::Facet | EntityType::Vertex => IntegralKind::ExteriorFacet,
        },
        other => other,
    };
    Ok(match averaging {
        Some(Averaging::Cell) => IntegralKind::Cell,
        Some(Averaging::Facet) => IntegralKind::ExteriorFacet,
        None => base,
    })
}

/// Embed points given in an entity's local frame into the cell's
/// reference coordinates, affinely through the entity's vertices.
pub fn map_integral_points(
    points: &Array2<f64>,
    entity_dim: usize,
    cell: CellKind,
    entity: usize,
) -> Result<Array2<f64>, TableError> {
    let tdim = cell.topological_dimension();
    if entity_dim == tdim {
        cell.sub_entity_vertices(tdim, entity)?;
        return Ok(points.clone());
    }
    let vertices = cell.vertices();
    let idx = cell.sub_entity_vertices(entity_dim, entity)?;
    let origin = vertices.row(idx[0]);
    let num_points = points.nrows();
    let mut mapped = Array2::zeros((num_points, tdim));
    for p in 0..num_points {
        for d in 0..tdim {
            let mut x = origin[d];
            for (axis, &iv) in idx.iter().skip(1).take(entity_dim).enumerate() {
                x += points[[p, axis]] * (vertices[[iv, d]] - origin[d]);
            }
            mapped[[p, d]] = x;
        }
    }
    Ok(mapped)
}

fn averaging_rule(
    element: &Arc<dyn FiniteElement>,
    integral: IntegralKind,
    cell: CellKind,
) -> Result<(Array2<f64>, Array1<f64>), TableError> {
    if let Some((points, weights)) = element.quadrature_points() {
        return Ok((points, weights));
    }
    let rule_cell = match integral {
        IntegralKind::Cell => element.cell(),
        _ => cell.facet_cell().ok_or(TableError::UnsupportedCell {
            cell,
            context: "facet averaging needs a cell with facets".into(),
        })?,
    };
    let rule = QuadratureRule::default_rule(rule_cell, element.embedded_superdegree())?;
    Ok((rule.points, rule.weights))
}

/// Tabulate one component of `element` for every sub-entity the integral
/// touches, at one permutation's `points`.
///
/// `derivative_counts` has one entry per axis of the integration cell;
/// entries beyond the element's own cell dimension must be zero, and an
/// averaged terminal must carry none at all. With `codim == 1` the
/// points are already in the element's frame and are used unmapped.
#[allow(clippy::too_many_arguments)]
pub fn tabulate_terminal(
    points: &Array2<f64>,
    cell: CellKind,
    integral: IntegralKind,
    entity_type: EntityType,
    element: &Arc<dyn FiniteElement>,
    averaging: Option<Averaging>,
    derivative_counts: &[usize],
    flat_component: usize,
    codim: usize,
) -> Result<TabulatedTerminal, TableError> {
    let deriv_order: usize = derivative_counts.iter().sum();
    if averaging.is_some() && deriv_order > 0 {
        return Err(TableError::AveragedDerivatives {
            terminal: element.signature(),
        });
    }
    let integral = effective_integral(integral, entity_type, averaging)?;
    let tdim = cell.topological_dimension();
    let entity_dim = integral.entity_dimension(tdim);
    let num_entities = cell.num_sub_entities(entity_dim);

    let component = element.component_element(flat_component);
    let comp_element = &component.element;
    let element_dim = comp_element.cell().topological_dimension();

    for (axis, &count) in derivative_counts.iter().enumerate().skip(element_dim) {
        if count > 0 {
            return Err(TableError::DerivativeAxisOutOfRange {
                element: element.signature(),
                axis,
            });
        }
    }
    let row = derivative_index(&derivative_counts[..element_dim.min(derivative_counts.len())]);

    let averaged = averaging.is_some();
    let (eval_points, weights) = if averaged {
        let (p, w) = averaging_rule(comp_element, integral, cell)?;
        (p, Some(w))
    } else {
        (points.clone(), None)
    };

    let num_points = if averaged { 1 } else { eval_points.nrows() };
    let num_dofs = comp_element.dim();
    let mut array = Array4::zeros((1, num_entities, num_points, num_dofs));

    for entity in 0..num_entities {
        let entity_points = if codim == 1 {
            eval_points.clone()
        } else {
            map_integral_points(&eval_points, entity_dim, cell, entity)?
        };
        let table = comp_element.tabulate(deriv_order, &entity_points);
        let values = table.slice(s![row, .., ..]);
        match &weights {
            Some(w) => {
                let wsum: f64 = w.sum();
                for dof in 0..num_dofs {
                    let mean: f64 = values
                        .index_axis(Axis(1), dof)
                        .iter()
                        .zip(w.iter())
                        .map(|(v, wt)| v * wt)
                        .sum::<f64>()
                        / wsum;
                    array[[0, entity, 0, dof]] = mean;
                }
            }
            None => {
                array.slice_mut(s![0, entity, .., ..]).assign(&values);
            }
        }
    }

    Ok(TabulatedTerminal {
        array,
        offset: component.offset,
        stride: component.stride,
    })
}
