//! Error types for table construction.

use thiserror::Error;

use crate::cell::{CellKind, IntegralKind};

/// Fatal conditions encountered while building element tables.
///
/// All variants abort the enclosing integral's compilation; there is no
/// partial or degraded table output. Variants carry enough context
/// (terminal, element, derivative request) for the caller to report a
/// precise diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("global derivatives of reference values are not defined ({terminal})")]
    GlobalDerivativesOfReferenceValue { terminal: String },
    #[error("local derivatives of global values are not defined ({terminal})")]
    LocalDerivativesOfGlobalValue { terminal: String },
    #[error("not expecting a reference value of {terminal}")]
    ReferenceValueNotExpected { terminal: String },
    #[error("not expecting global derivatives of {terminal}")]
    GlobalDerivativesNotExpected { terminal: String },
    #[error("averaged terminal {terminal} must not carry derivatives")]
    AveragedDerivatives { terminal: String },
    #[error("averaging is not supported for {integral:?} integrals")]
    AveragingUnsupported { integral: IntegralKind },
    #[error("codimension {codimension} is not supported (element {element} inside {cell:?})")]
    UnsupportedCodimension {
        codimension: i64,
        cell: CellKind,
        element: String,
    },
    #[error("derivative along axis {axis} is outside the {element} reference cell")]
    DerivativeAxisOutOfRange { element: String, axis: usize },
    #[error("{cell:?} is not supported here: {context}")]
    UnsupportedCell { cell: CellKind, context: String },
    #[error("no quadrature rule of degree {degree} available on {cell:?}")]
    UnsupportedQuadratureDegree { cell: CellKind, degree: usize },
    #[error("degree {degree} elements are not available on {cell:?}")]
    UnsupportedElementDegree { cell: CellKind, degree: usize },
    #[error("sub-entity {entity} of dimension {dim} does not exist on {cell:?}")]
    EntityOutOfRange {
        cell: CellKind,
        dim: usize,
        entity: usize,
    },
    #[error("quadrature rule {rule} has no tensor-product factorisation")]
    MissingTensorQuadrature { rule: String },
    #[error("element {element} has no single tensor-product factorisation")]
    MissingTensorFactorisation { element: String },
    #[error("internal error: {0}")]
    Internal(String),
}
