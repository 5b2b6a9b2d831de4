//! Build the tables for a small Poisson-like integrand on a triangle
//! and print what the code emitter would receive.

use std::sync::Arc;

use anyhow::Result;
use formtab_ir::{
    CellKind, EntityType, FiniteElement, IntegralKind, LagrangeElement, ModifiedTerminal,
    QuadratureRule,
};
use formtab_tables::{build_terminal_tables, TableKey, TableOptions};

fn main() -> Result<()> {
    let element: Arc<dyn FiniteElement> =
        Arc::new(LagrangeElement::new(CellKind::Triangle, 1)?);
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2)?;

    let terminals = vec![
        ModifiedTerminal::argument(element.clone()),
        ModifiedTerminal::argument(element.clone()).with_local_derivatives(vec![0]),
        ModifiedTerminal::argument(element).with_local_derivatives(vec![1]),
    ];

    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )?;

    for (key, reference) in &tables.entries {
        let label = match key {
            TableKey::Terminal(i) => format!("terminal {i}"),
            TableKey::Factor(name) => format!("factor {name}"),
        };
        println!(
            "{label}: {} {:?} shape {:?} offset {} stride {}",
            reference.name,
            reference.ttype,
            reference.values.dim(),
            reference.offset,
            reference.block_size,
        );
    }
    println!("{} distinct tables", tables.tables.len());
    Ok(())
}
