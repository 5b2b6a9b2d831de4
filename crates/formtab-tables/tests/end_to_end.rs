//! End-to-end runs of the table-construction pipeline on small but
//! complete inputs: one quadrature rule, a handful of modified
//! terminals, assertions on the resulting names, classes, shapes and
//! offsets.

use std::sync::Arc;

use approx::assert_relative_eq;
use formtab_ir::{
    Averaging, BlockedElement, CellKind, EntityType, FiniteElement, IntegralKind,
    LagrangeElement, ModifiedTerminal, QuadratureElement, QuadratureRule, Restriction, TableType,
    TensorProductElement,
};
use formtab_tables::{build_terminal_tables, TableKey, TableOptions};
use ndarray::{array, Array1};

fn p1(cell: CellKind) -> Arc<dyn FiniteElement> {
    Arc::new(LagrangeElement::new(cell, 1).unwrap())
}

fn p0(cell: CellKind) -> Arc<dyn FiniteElement> {
    Arc::new(LagrangeElement::new(cell, 0).unwrap())
}

#[test]
fn varying_table_on_a_cell_integral() {
    // Three points along one edge of the triangle still make a cell
    // rule; the single cell entity leaves the point variation as the
    // only signal.
    let points = array![[0.25, 0.0], [0.5, 0.0], [0.75, 0.0]];
    let weights = Array1::from(vec![1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0]);
    let rule = QuadratureRule::new(points, weights, "edge3");

    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Triangle))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.ttype, TableType::Varying);
    assert_eq!(reference.values.dim(), (1, 1, 3, 3));
    assert!(!reference.is_permuted);
    assert_eq!(reference.name, "FE0_C0_Qedge3");
}

#[test]
fn constant_element_collapses_fully() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p0(CellKind::Triangle))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    // The constant basis is exactly one everywhere, the most specific
    // of the piecewise-and-uniform classes.
    assert_eq!(reference.ttype, TableType::Ones);
    assert!(reference.is_piecewise);
    assert!(reference.is_uniform);
    assert_eq!(reference.values.dim(), (1, 1, 1, 1));
}

#[test]
fn constant_gradient_classifies_as_fixed() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals =
        vec![ModifiedTerminal::argument(p1(CellKind::Triangle)).with_local_derivatives(vec![0])];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.ttype, TableType::Fixed);
    assert_eq!(reference.values.dim(), (1, 1, 1, 3));
    assert_relative_eq!(reference.values[[0, 0, 0, 0]], -1.0);
    assert_relative_eq!(reference.values[[0, 0, 0, 1]], 1.0);
    assert_relative_eq!(reference.values[[0, 0, 0, 2]], 0.0);
    assert_eq!(reference.name, "FE0_C0_D10_Qauto");
}

#[test]
fn quadrature_element_yields_identity_class() {
    let points = array![[0.2, 0.2], [0.6, 0.2], [0.2, 0.6]];
    let weights = Array1::from(vec![1.0 / 6.0; 3]);
    let element: Arc<dyn FiniteElement> = Arc::new(QuadratureElement::new(
        CellKind::Triangle,
        points.clone(),
        weights.clone(),
        2,
    ));
    let rule = QuadratureRule::new(points, weights, "qp");

    let terminals = vec![ModifiedTerminal::argument(element)];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.ttype, TableType::Quadrature);
    assert_eq!(reference.values.dim(), (1, 1, 3, 3));
}

#[test]
fn interior_facet_on_triangle_tabulates_both_orientations() {
    let rule = QuadratureRule::default_rule(CellKind::Interval, 3).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Triangle))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::InteriorFacet,
        EntityType::Facet,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.ttype, TableType::Varying);
    assert!(reference.is_permuted);
    let (perms, entities, points, dofs) = reference.values.dim();
    assert_eq!((perms, entities, points, dofs), (2, 3, 2, 3));
    assert_eq!(reference.name, "FE0_C0_F_Qauto");
}

#[test]
fn tetrahedron_interior_facet_has_six_permutations() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Tetrahedron))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Tetrahedron,
        IntegralKind::InteriorFacet,
        EntityType::Facet,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert!(reference.is_permuted);
    assert_eq!(reference.values.dim().0, 6);
}

#[test]
fn symmetric_facet_points_collapse_the_permutation_axis() {
    // The facet centroid is fixed by every rotation and reflection, so
    // all six permutations tabulate identically.
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 1).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Tetrahedron))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Tetrahedron,
        IntegralKind::InteriorFacet,
        EntityType::Facet,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert!(!reference.is_permuted);
    assert_eq!(reference.ttype, TableType::Piecewise);
    assert_eq!(reference.values.dim(), (1, 4, 1, 4));
}

#[test]
fn minus_restriction_offsets_by_the_dof_count() {
    let rule = QuadratureRule::default_rule(CellKind::Interval, 3).unwrap();
    let element = p1(CellKind::Triangle);
    let terminals = vec![
        ModifiedTerminal::argument(element.clone()).with_restriction(Restriction::Plus),
        ModifiedTerminal::argument(element.clone()).with_restriction(Restriction::Minus),
    ];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::InteriorFacet,
        EntityType::Facet,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let plus = tables.terminal(0).unwrap();
    let minus = tables.terminal(1).unwrap();
    assert_eq!(minus.offset, plus.offset + element.dim());
    // Same values on both sides, so dedup gives them one name.
    assert_eq!(plus.name, minus.name);
}

#[test]
fn vector_component_reuses_the_scalar_table() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let scalar = p1(CellKind::Triangle);
    let vector: Arc<dyn FiniteElement> = Arc::new(BlockedElement::new(scalar.clone(), 2));
    let terminals = vec![
        ModifiedTerminal::argument(scalar),
        ModifiedTerminal::argument(vector).with_component(1),
    ];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let scalar_ref = tables.terminal(0).unwrap();
    let component_ref = tables.terminal(1).unwrap();
    // The scalar element was numbered first, so the shared name is its.
    assert_eq!(scalar_ref.name, "FE0_C0_Qauto");
    assert_eq!(component_ref.name, scalar_ref.name);
    assert_eq!(component_ref.offset, 1);
    assert_eq!(component_ref.block_size, 2);
    assert_eq!(tables.tables.len(), 1);
}

#[test]
fn averaged_argument_collapses_points() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals =
        vec![ModifiedTerminal::argument(p1(CellKind::Triangle)).with_averaging(Averaging::Cell)];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.values.dim(), (1, 1, 1, 3));
    for dof in 0..3 {
        assert_relative_eq!(reference.values[[0, 0, 0, dof]], 1.0 / 3.0, epsilon = 1e-12);
    }
    assert_eq!(reference.name, "FE0_C0_AC_Qauto");
}

#[test]
fn sum_factorization_emits_factor_tables() {
    let interval = p1(CellKind::Interval);
    let element: Arc<dyn FiniteElement> =
        Arc::new(TensorProductElement::new(vec![interval.clone(), interval]).unwrap());
    let rule = QuadratureRule::default_rule(CellKind::Quadrilateral, 3).unwrap();
    let terminals = vec![
        ModifiedTerminal::argument(element.clone()),
        ModifiedTerminal::argument(element).with_local_derivatives(vec![0]),
    ];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Quadrilateral,
        IntegralKind::Cell,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new().with_sum_factorization(),
    )
    .unwrap();

    let value_ref = tables.terminal(0).unwrap();
    assert_eq!(
        value_ref.tensor_factors.as_deref(),
        Some(&["FE_TF0".to_string(), "FE_TF0".to_string()][..])
    );
    assert_eq!(value_ref.tensor_permutation.as_deref(), Some(&[0, 1, 2, 3][..]));

    let gradient_ref = tables.terminal(1).unwrap();
    assert_eq!(
        gradient_ref.tensor_factors.as_deref(),
        Some(&["FE_TF1".to_string(), "FE_TF0".to_string()][..])
    );

    // Both distinct factors are exposed under synthetic keys.
    let f0 = tables.factor("FE_TF0").unwrap();
    assert_eq!(f0.values.dim().0, 1);
    assert!(tables.factor("FE_TF1").is_some());
    let factor_keys = tables
        .entries
        .iter()
        .filter(|(key, _)| matches!(key, TableKey::Factor(_)))
        .count();
    assert_eq!(factor_keys, 2);
}

#[test]
fn rerunning_the_stage_is_deterministic() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals = vec![
        ModifiedTerminal::argument(p1(CellKind::Triangle)),
        ModifiedTerminal::argument(p1(CellKind::Triangle)).with_local_derivatives(vec![1]),
        ModifiedTerminal::argument(p0(CellKind::Triangle)),
    ];
    let run = || {
        build_terminal_tables(
            &rule,
            CellKind::Triangle,
            IntegralKind::Cell,
            EntityType::Cell,
            &terminals,
            &[],
            &TableOptions::new(),
        )
        .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.entries.len(), second.entries.len());
    for ((key_a, ref_a), (key_b, ref_b)) in first.entries.iter().zip(second.entries.iter()) {
        assert_eq!(key_a, key_b);
        assert_eq!(ref_a, ref_b);
    }
}

#[test]
fn seeded_tables_keep_their_names_across_integrals() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Triangle))];
    let build = |seed: &[(String, ndarray::Array4<f64>)]| {
        build_terminal_tables(
            &rule,
            CellKind::Triangle,
            IntegralKind::Cell,
            EntityType::Cell,
            &terminals,
            seed,
            &TableOptions::new(),
        )
        .unwrap()
    };
    let first = build(&[]);
    let second = build(&first.tables);
    assert_eq!(
        first.terminal(0).unwrap().name,
        second.terminal(0).unwrap().name
    );
    assert_eq!(second.tables.len(), first.tables.len());
}

#[test]
fn mixed_dimension_facet_element_uses_points_directly() {
    // A facet-cell element in a mixed-dimension setting, codimension 1:
    // the interval points feed the element unmapped and no permutations
    // are generated.
    let rule = QuadratureRule::default_rule(CellKind::Interval, 3).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Interval))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::InteriorFacet,
        EntityType::Facet,
        &terminals,
        &[],
        &TableOptions::new().with_mixed_dimensions(),
    )
    .unwrap();

    let reference = tables.terminal(0).unwrap();
    assert_eq!(reference.values.dim().0, 1);
    // Every facet sees the same interval tabulation.
    assert!(reference.is_uniform);
}

#[test]
fn expression_kind_follows_the_entity_type() {
    let rule = QuadratureRule::default_rule(CellKind::Triangle, 2).unwrap();
    let terminals = vec![ModifiedTerminal::argument(p1(CellKind::Triangle))];
    let tables = build_terminal_tables(
        &rule,
        CellKind::Triangle,
        IntegralKind::Expression,
        EntityType::Cell,
        &terminals,
        &[],
        &TableOptions::new(),
    )
    .unwrap();
    assert_eq!(tables.terminal(0).unwrap().values.dim().1, 1);
}
