//! Property tests for classification and deduplication.

use formtab_ir::TableType;
use formtab_tables::classify::{
    analyse_table_type, clamp_table_small_numbers, equal_tables, is_piecewise_table,
    is_uniform_table,
};
use formtab_tables::{TableRegistry, DEFAULT_ATOL, DEFAULT_RTOL};
use ndarray::Array4;
use proptest::prelude::*;

fn table_strategy() -> impl Strategy<Value = Array4<f64>> {
    (1usize..=3, 1usize..=3, 1usize..=4, 1usize..=4).prop_flat_map(|(p, e, q, d)| {
        proptest::collection::vec(-2.0f64..2.0, p * e * q * d)
            .prop_map(move |v| Array4::from_shape_vec((p, e, q, d), v).unwrap())
    })
}

proptest! {
    #[test]
    fn classification_is_total_and_consistent(table in table_strategy()) {
        let ttype = analyse_table_type(&table, DEFAULT_RTOL, DEFAULT_ATOL);
        if !matches!(
            ttype,
            TableType::Zeros | TableType::Ones | TableType::Quadrature
        ) {
            let piecewise = is_piecewise_table(&table, DEFAULT_RTOL, DEFAULT_ATOL);
            // A singleton entity axis carries no signal of its own.
            let uniform = if table.dim().1 > 1 {
                is_uniform_table(&table, DEFAULT_RTOL, DEFAULT_ATOL)
            } else {
                piecewise
            };
            let expected = match (piecewise, uniform) {
                (true, true) => TableType::Fixed,
                (true, false) => TableType::Piecewise,
                (false, true) => TableType::Uniform,
                (false, false) => TableType::Varying,
            };
            prop_assert_eq!(ttype, expected);
        }
    }

    #[test]
    fn clamping_is_idempotent(table in table_strategy()) {
        let mut once = table;
        clamp_table_small_numbers(&mut once, DEFAULT_RTOL, DEFAULT_ATOL);
        let mut twice = once.clone();
        clamp_table_small_numbers(&mut twice, DEFAULT_RTOL, DEFAULT_ATOL);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn table_equality_is_reflexive(table in table_strategy()) {
        prop_assert!(equal_tables(&table, &table, DEFAULT_RTOL, DEFAULT_ATOL));
    }

    #[test]
    fn perturbations_within_tolerance_share_a_name(table in table_strategy()) {
        let mut registry = TableRegistry::new(DEFAULT_RTOL, DEFAULT_ATOL);
        let (first, _) = registry.insert("first".into(), table.clone());
        let perturbed = table.mapv(|v| v + 1e-10);
        let (second, _) = registry.insert("second".into(), perturbed);
        prop_assert_eq!(first, second);
        prop_assert_eq!(registry.entries().len(), 1);
    }

    #[test]
    fn registry_never_loses_distinct_tables(table in table_strategy()) {
        let mut registry = TableRegistry::new(DEFAULT_RTOL, DEFAULT_ATOL);
        registry.insert("base".into(), table.clone());
        let shifted = table.mapv(|v| v + 1.0);
        let (name, _) = registry.insert("shifted".into(), shifted);
        prop_assert_eq!(name, "shifted");
        prop_assert_eq!(registry.entries().len(), 2);
    }
}
