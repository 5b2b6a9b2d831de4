//! # formtab-ir
//!
//! Data model for the table-construction stage of a finite-element form
//! compiler. This crate defines the inputs and outputs of the stage and
//! carries no construction logic:
//!
//! - Reference cell topology ([`CellKind`], [`IntegralKind`],
//!   [`EntityType`])
//! - Quadrature rules ([`QuadratureRule`]) with optional tensor-product
//!   factors
//! - Modified terminals ([`ModifiedTerminal`]): terminal symbols of an
//!   integrand annotated with derivative, averaging, restriction and
//!   component metadata
//! - The element capability contract ([`FiniteElement`]) and reference
//!   implementations ([`reference`])
//! - Table classification results ([`TableType`],
//!   [`UniqueTableReference`])
//! - The fatal error taxonomy ([`TableError`])
//!
//! The companion crate `formtab-tables` drives these types to produce
//! the named lookup tables a code emitter consumes.

pub mod cell;
pub mod element;
pub mod error;
pub mod quadrature;
pub mod reference;
pub mod tables;
pub mod terminal;

pub use cell::{CellKind, EntityType, IntegralKind};
pub use element::{
    derivative_index, derivative_multi_indices, num_derivatives, ComponentElement, FiniteElement,
    TensorFactorisation,
};
pub use error::TableError;
pub use quadrature::{QuadratureRule, TensorQuadratureFactor};
pub use reference::{BlockedElement, LagrangeElement, QuadratureElement, TensorProductElement};
pub use tables::{TableType, UniqueTableReference};
pub use terminal::{Averaging, ModifiedTerminal, Restriction, TerminalKind};
