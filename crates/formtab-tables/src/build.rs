//! The table-construction pipeline for one integral.
//!
//! Terminals are processed in caller order: resolve, permute, tabulate,
//! clean, classify, collapse, deduplicate, optionally factorize. The
//! result is an ordered mapping from each terminal (and each synthetic
//! factor table) to its unique table reference, ready for the code
//! emitter.

use formtab_ir::{
    CellKind, EntityType, IntegralKind, ModifiedTerminal, QuadratureRule, Restriction, TableError,
    TableType, UniqueTableReference,
};
use ndarray::{concatenate, Array4, Axis};

use crate::classify::{analyse_table_type, clamp_table_small_numbers, collapse_table};
use crate::config::TableOptions;
use crate::factorize::{factorize_table, FactorRegistry};
use crate::permute::permuted_point_sets;
use crate::registry::{table_name, ElementNumbering, TableRegistry};
use crate::resolve::resolve_terminal;
use crate::tabulate::tabulate_terminal;

/// Key of one entry in the output mapping: the position of a terminal
/// in the caller's list, or the name of a sum-factorization factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKey {
    Terminal(usize),
    Factor(String),
}

/// The stage's output: references in processing order, plus the
/// deduplicated name-to-array store for seeding later integrals.
#[derive(Debug)]
pub struct TerminalTables {
    pub entries: Vec<(TableKey, UniqueTableReference)>,
    pub tables: Vec<(String, Array4<f64>)>,
}

impl TerminalTables {
    /// The reference built for the terminal at `index`, if it resolved
    /// to an element.
    pub fn terminal(&self, index: usize) -> Option<&UniqueTableReference> {
        self.entries.iter().find_map(|(key, reference)| {
            (*key == TableKey::Terminal(index)).then_some(reference)
        })
    }

    /// The reference for a named factor table.
    pub fn factor(&self, name: &str) -> Option<&UniqueTableReference> {
        self.entries.iter().find_map(|(key, reference)| {
            (*key == TableKey::Factor(name.to_string())).then_some(reference)
        })
    }
}

fn factor_reference(name: String, values: Array4<f64>) -> UniqueTableReference {
    UniqueTableReference {
        name,
        values,
        offset: 0,
        block_size: 1,
        ttype: TableType::Varying,
        is_piecewise: false,
        is_uniform: false,
        is_permuted: false,
        tensor_factors: None,
        tensor_permutation: None,
    }
}

/// Build the unique tables for every element-bearing terminal of one
/// integral.
///
/// `existing_tables` seeds the deduplication store with tables from
/// earlier integrals of the same module; equal tables then reuse their
/// names. Terminals whose kind carries no element are skipped and get
/// no entry.
pub fn build_terminal_tables(
    rule: &QuadratureRule,
    cell: CellKind,
    integral: IntegralKind,
    entity_type: EntityType,
    terminals: &[ModifiedTerminal],
    existing_tables: &[(String, Array4<f64>)],
    options: &TableOptions,
) -> Result<TerminalTables, TableError> {
    if options.sum_factorization && !rule.has_tensor_factors() {
        return Err(TableError::MissingTensorQuadrature {
            rule: rule.id.clone(),
        });
    }
    let tdim = cell.topological_dimension();

    let mut resolved = Vec::new();
    for (index, terminal) in terminals.iter().enumerate() {
        if let Some(r) = resolve_terminal(terminal, tdim)? {
            resolved.push((index, r));
        }
    }
    let elements: Vec<_> = resolved.iter().map(|(_, r)| r.element.clone()).collect();
    let numbering = ElementNumbering::build(&elements);

    let mut registry =
        TableRegistry::with_seed(existing_tables.to_vec(), options.rtol, options.atol);
    let mut factor_registry = FactorRegistry::new();
    let mut entries = Vec::new();

    for (index, r) in resolved {
        let element_tdim = r.element.cell().topological_dimension();
        let codimension = tdim as i64 - element_tdim as i64;
        if !(0..=1).contains(&codimension) {
            return Err(TableError::UnsupportedCodimension {
                codimension,
                cell,
                element: r.element.signature(),
            });
        }
        let codim = codimension as usize;

        let point_sets =
            permuted_point_sets(&rule.points, cell, integral, codim, options.mixed_dim)?;
        let mut parts = Vec::with_capacity(point_sets.len());
        let mut dof_offset = 0;
        let mut dof_stride = 1;
        for points in &point_sets {
            let tabulated = tabulate_terminal(
                points,
                cell,
                integral,
                entity_type,
                &r.element,
                r.averaging,
                &r.derivative_counts,
                r.flat_component,
                codim,
            )?;
            dof_offset = tabulated.offset;
            dof_stride = tabulated.stride;
            parts.push(tabulated.array);
        }
        let views: Vec<_> = parts.iter().map(|a| a.view()).collect();
        let mut table =
            concatenate(Axis(0), &views).map_err(|e| TableError::Internal(e.to_string()))?;

        clamp_table_small_numbers(&mut table, options.rtol, options.atol);
        let ttype = analyse_table_type(&table, options.rtol, options.atol);
        let (collapsed, is_permuted) = collapse_table(table, ttype, options.rtol, options.atol);

        let number = numbering.number(&r.element).ok_or_else(|| {
            TableError::Internal(format!("element {} was not numbered", r.element.signature()))
        })?;
        let name = table_name(
            &rule.id,
            number,
            r.averaging,
            entity_type,
            &r.derivative_counts,
            r.flat_component,
        );
        let (name, values) = registry.insert(name, collapsed);

        // Minus-restricted arguments index the second cell's dof block.
        if r.is_argument && matches!(r.restriction, Restriction::Minus) {
            dof_offset += r.element.dim();
        }

        let (tensor_factors, tensor_permutation) = if options.sum_factorization {
            let component = r.element.component_element(r.flat_component);
            let factorized = factorize_table(
                &component.element,
                rule,
                &r.derivative_counts,
                &mut factor_registry,
            )?;
            for (factor_name, factor_values) in factorized.new_factors {
                entries.push((
                    TableKey::Factor(factor_name.clone()),
                    factor_reference(factor_name, factor_values),
                ));
            }
            (
                Some(factorized.factor_names),
                Some(factorized.permutation),
            )
        } else {
            (None, None)
        };

        entries.push((
            TableKey::Terminal(index),
            UniqueTableReference {
                name,
                values,
                offset: dof_offset,
                block_size: dof_stride,
                ttype,
                is_piecewise: ttype.is_piecewise(),
                is_uniform: ttype.is_uniform(),
                is_permuted,
                tensor_factors,
                tensor_permutation,
            },
        ));
    }

    Ok(TerminalTables {
        entries,
        tables: registry.into_entries(),
    })
}
