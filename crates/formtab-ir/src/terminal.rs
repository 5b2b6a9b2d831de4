//! Modified terminals.
//!
//! A modified terminal is a terminal symbol of an integrand together
//! with the modifiers the symbolic analysis attached to it: derivatives,
//! averaging, restriction and a flat scalar component. Terminals are
//! produced by the symbolic-analysis collaborator and are read-only
//! here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::FiniteElement;

/// Averaging mode of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Averaging {
    Cell,
    Facet,
}

/// Which side of an interior facet a two-sided quantity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Restriction {
    None,
    Plus,
    Minus,
}

/// The terminal symbol itself.
#[derive(Clone)]
pub enum TerminalKind {
    /// An argument-like terminal (argument or coefficient) with its
    /// function-space element.
    Argument { element: Arc<dyn FiniteElement> },
    /// The spatial coordinate, evaluated through the coordinate element.
    SpatialCoordinate {
        coordinate_element: Arc<dyn FiniteElement>,
    },
    /// The Jacobian `J[row, column]`, expressed through the coordinate
    /// element as a reference gradient.
    Jacobian {
        coordinate_element: Arc<dyn FiniteElement>,
        component: (usize, usize),
    },
    /// A terminal this stage does not tabulate (skipped, not an error).
    Unsupported,
}

impl fmt::Debug for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalKind::Argument { element } => {
                write!(f, "Argument({})", element.signature())
            }
            TerminalKind::SpatialCoordinate { .. } => write!(f, "SpatialCoordinate"),
            TerminalKind::Jacobian { component, .. } => {
                write!(f, "Jacobian[{}, {}]", component.0, component.1)
            }
            TerminalKind::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// A terminal with its modifiers.
#[derive(Debug, Clone)]
pub struct ModifiedTerminal {
    pub kind: TerminalKind,
    /// Whether the terminal is a reference value (already pulled back to
    /// the reference cell).
    pub reference_value: bool,
    /// Local derivatives as a list of reference-axis indices, e.g.
    /// `[0, 1]` for d²/dx₀dx₁. Normalized to per-axis counts during
    /// resolution.
    pub local_derivatives: Vec<usize>,
    /// Whether global (physical) derivatives were requested.
    pub global_derivatives: bool,
    pub averaging: Option<Averaging>,
    pub restriction: Restriction,
    /// Flat scalar component into the element's value block.
    pub flat_component: usize,
}

impl ModifiedTerminal {
    pub fn argument(element: Arc<dyn FiniteElement>) -> Self {
        ModifiedTerminal {
            kind: TerminalKind::Argument { element },
            reference_value: true,
            local_derivatives: Vec::new(),
            global_derivatives: false,
            averaging: None,
            restriction: Restriction::None,
            flat_component: 0,
        }
    }

    pub fn spatial_coordinate(coordinate_element: Arc<dyn FiniteElement>) -> Self {
        ModifiedTerminal {
            kind: TerminalKind::SpatialCoordinate { coordinate_element },
            reference_value: false,
            local_derivatives: Vec::new(),
            global_derivatives: false,
            averaging: None,
            restriction: Restriction::None,
            flat_component: 0,
        }
    }

    pub fn jacobian(coordinate_element: Arc<dyn FiniteElement>, row: usize, column: usize) -> Self {
        ModifiedTerminal {
            kind: TerminalKind::Jacobian {
                coordinate_element,
                component: (row, column),
            },
            reference_value: false,
            local_derivatives: Vec::new(),
            global_derivatives: false,
            averaging: None,
            restriction: Restriction::None,
            flat_component: 0,
        }
    }

    pub fn unsupported() -> Self {
        ModifiedTerminal {
            kind: TerminalKind::Unsupported,
            reference_value: false,
            local_derivatives: Vec::new(),
            global_derivatives: false,
            averaging: None,
            restriction: Restriction::None,
            flat_component: 0,
        }
    }

    pub fn with_component(mut self, flat_component: usize) -> Self {
        self.flat_component = flat_component;
        self
    }

    pub fn with_local_derivatives(mut self, axes: Vec<usize>) -> Self {
        self.local_derivatives = axes;
        self
    }

    pub fn with_global_derivatives(mut self) -> Self {
        self.global_derivatives = true;
        self
    }

    pub fn with_reference_value(mut self, reference_value: bool) -> Self {
        self.reference_value = reference_value;
        self
    }

    pub fn with_averaging(mut self, averaging: Averaging) -> Self {
        self.averaging = Some(averaging);
        self
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = restriction;
        self
    }
}

impl fmt::Display for ModifiedTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        write!(f, "[{}]", self.flat_component)?;
        if !self.local_derivatives.is_empty() {
            write!(f, " d{:?}", self.local_derivatives)?;
        }
        if self.global_derivatives {
            write!(f, " grad")?;
        }
        if let Some(avg) = self.averaging {
            write!(f, " avg({avg:?})")?;
        }
        match self.restriction {
            Restriction::None => {}
            Restriction::Plus => write!(f, " (+)")?,
            Restriction::Minus => write!(f, " (-)")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crate::reference::LagrangeElement;

    #[test]
    fn test_display_carries_context() {
        let element = Arc::new(LagrangeElement::new(CellKind::Triangle, 1).unwrap());
        let mt = ModifiedTerminal::argument(element)
            .with_local_derivatives(vec![0, 1])
            .with_restriction(Restriction::Minus);
        let text = mt.to_string();
        assert!(text.contains("Argument"));
        assert!(text.contains("(-)"));
    }
}
