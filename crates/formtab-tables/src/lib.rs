//! Construction of unique basis-function tables for generated
//! finite-element kernels.
//!
//! Given a quadrature rule and the modified terminals of one integral,
//! this crate tabulates every element-bearing terminal over the
//! integration entities (and facet-orientation permutations where those
//! matter), cleans and classifies the resulting 4-axis tables, collapses
//! constant axes, deduplicates numerically equal tables under stable
//! names, and optionally sum-factorizes them into 1-D factor tables.
//!
//! The entry point is [`build_terminal_tables`]; element capabilities
//! and the core data model live in [`formtab_ir`].

pub mod build;
pub mod classify;
pub mod config;
pub mod factorize;
pub mod permute;
pub mod registry;
pub mod resolve;
pub mod tabulate;

pub use build::{build_terminal_tables, TableKey, TerminalTables};
pub use classify::{
    analyse_table_type, clamp_table_small_numbers, collapse_table, equal_tables,
};
pub use config::{TableOptions, DEFAULT_ATOL, DEFAULT_RTOL};
pub use factorize::{factorize_table, FactorRegistry, FactorizedTable};
pub use permute::{
    permute_interval_points, permute_quadrilateral_points, permute_triangle_points,
    permuted_point_sets,
};
pub use registry::{table_name, ElementNumbering, TableRegistry};
pub use resolve::{resolve_terminal, ResolvedTerminal};
pub use tabulate::{map_integral_points, tabulate_terminal, TabulatedTerminal};
