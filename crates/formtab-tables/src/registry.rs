//! Deterministic table naming and first-match deduplication.
//!
//! Table names encode everything that went into a tabulation (element
//! ordinal, component, derivatives, averaging, entity kind, quadrature
//! rule), so equal names mean equal requests. The registry then merges
//! requests whose *values* coincide within tolerance, keeping the first
//! inserted name as canonical.

use std::sync::Arc;

use formtab_ir::{Averaging, EntityType, FiniteElement};
use ndarray::Array4;

use crate::classify::equal_tables;

/// Stable ordinals for every element referenced by an integral.
///
/// Elements are visited depth-first with sub-elements numbered before
/// their parents, so a mixed element and its pieces get consistent
/// ordinals regardless of which one is met first. Identity is the
/// element signature.
pub struct ElementNumbering {
    order: Vec<String>,
}

impl ElementNumbering {
    pub fn build(elements: &[Arc<dyn FiniteElement>]) -> Self {
        let mut order = Vec::new();
        for element in elements {
            Self::visit(element, &mut order);
        }
        ElementNumbering { order }
    }

    fn visit(element: &Arc<dyn FiniteElement>, order: &mut Vec<String>) {
        for sub in element.sub_elements() {
            Self::visit(&sub, order);
        }
        let signature = element.signature();
        if !order.contains(&signature) {
            order.push(signature);
        }
    }

    /// The ordinal of `element`, if it was part of the numbered set.
    pub fn number(&self, element: &Arc<dyn FiniteElement>) -> Option<usize> {
        let signature = element.signature();
        self.order.iter().position(|s| *s == signature)
    }
}

/// Deterministic name for one tabulation request.
pub fn table_name(
    rule_id: &str,
    element_number: usize,
    averaging: Option<Averaging>,
    entity_type: EntityType,
    derivative_counts: &[usize],
    flat_component: usize,
) -> String {
    let mut name = format!("FE{element_number}_C{flat_component}");
    if derivative_counts.iter().any(|&d| d > 0) {
        name.push_str("_D");
        for d in derivative_counts {
            name.push_str(&d.to_string());
        }
    }
    name.push_str(match averaging {
        Some(Averaging::Cell) => "_AC",
        Some(Averaging::Facet) => "_AF",
        None => "",
    });
    name.push_str(match entity_type {
        EntityType::Cell => "",
        EntityType::Facet => "_F",
        EntityType::Vertex => "_V",
    });
    name.push_str(&format!("_Q{rule_id}"));
    name
}

/// Ordered name-to-array store with first-match-wins deduplication.
pub struct TableRegistry {
    entries: Vec<(String, Array4<f64>)>,
    rtol: f64,
    atol: f64,
}

impl TableRegistry {
    pub fn new(rtol: f64, atol: f64) -> Self {
        TableRegistry {
            entries: Vec::new(),
            rtol,
            atol,
        }
    }

    /// Seed with tables from earlier integrals so equal tables reuse
    /// their names across the module.
    pub fn with_seed(seed: Vec<(String, Array4<f64>)>, rtol: f64, atol: f64) -> Self {
        TableRegistry {
            entries: seed,
            rtol,
            atol,
        }
    }

    /// Insert a table, returning the canonical (name, values) pair: the
    /// first stored entry equal to `values` in shape and tolerance, or
    /// the new entry itself.
    pub fn insert(&mut self, name: String, values: Array4<f64>) -> (String, Array4<f64>) {
        for (existing_name, existing) in &self.entries {
            if equal_tables(existing, &values, self.rtol, self.atol) {
                return (existing_name.clone(), existing.clone());
            }
        }
        self.entries.push((name.clone(), values.clone()));
        (name, values)
    }

    pub fn entries(&self) -> &[(String, Array4<f64>)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, Array4<f64>)> {
        self.entries
    }
}
