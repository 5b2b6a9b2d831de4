//! Resolution of modified terminals into concrete tabulation requests.
//!
//! A modified terminal carries modifiers (component, derivatives,
//! averaging, restriction) around a terminal kind. Resolution validates
//! the modifier combination, picks the element to tabulate, and
//! normalizes derivatives from a list of axis indices into per-axis
//! counts.

use std::sync::Arc;

use formtab_ir::{
    Averaging, FiniteElement, ModifiedTerminal, Restriction, TableError, TerminalKind,
};

/// A validated tabulation request for one modified terminal.
#[derive(Clone)]
pub struct ResolvedTerminal {
    pub element: Arc<dyn FiniteElement>,
    /// Derivative count along each reference axis, length `tdim`.
    pub derivative_counts: Vec<usize>,
    pub flat_component: usize,
    pub averaging: Option<Averaging>,
    pub restriction: Restriction,
    /// Whether the terminal is an argument (restriction offsets apply
    /// only to argument dofs).
    pub is_argument: bool,
}

/// Turn a list of derivative axis indices into per-axis counts of
/// length `tdim`.
fn derivative_counts(
    ld: &[usize],
    tdim: usize,
    element: &Arc<dyn FiniteElement>,
) -> Result<Vec<usize>, TableError> {
    let mut counts = vec![0usize; tdim];
    for &axis in ld {
        if axis >= tdim {
            return Err(TableError::DerivativeAxisOutOfRange {
                element: element.signature(),
                axis,
            });
        }
        counts[axis] += 1;
    }
    Ok(counts)
}

/// Validate a modified terminal and resolve the element, component and
/// derivatives to tabulate. `Ok(None)` means the terminal carries no
/// element and needs no table.
///
/// `tdim` is the topological dimension of the integration domain, which
/// fixes the length of the derivative-count vector even when the
/// element's own cell is smaller.
pub fn resolve_terminal(
    terminal: &ModifiedTerminal,
    tdim: usize,
) -> Result<Option<ResolvedTerminal>, TableError> {
    if terminal.averaging.is_some() && (!terminal.local_derivatives.is_empty()
        || terminal.global_derivatives)
    {
        return Err(TableError::AveragedDerivatives {
            terminal: terminal.to_string(),
        });
    }

    match &terminal.kind {
        TerminalKind::Argument { element } => {
            if terminal.reference_value {
                if terminal.global_derivatives {
                    return Err(TableError::GlobalDerivativesOfReferenceValue {
                        terminal: terminal.to_string(),
                    });
                }
            } else if !terminal.local_derivatives.is_empty() {
                return Err(TableError::LocalDerivativesOfGlobalValue {
                    terminal: terminal.to_string(),
                });
            }
            Ok(Some(ResolvedTerminal {
                element: element.clone(),
                derivative_counts: derivative_counts(&terminal.local_derivatives, tdim, element)?,
                flat_component: terminal.flat_component,
                averaging: terminal.averaging,
                restriction: terminal.restriction,
                is_argument: true,
            }))
        }
        TerminalKind::SpatialCoordinate { coordinate_element } => {
            if terminal.reference_value {
                return Err(TableError::ReferenceValueNotExpected {
                    terminal: terminal.to_string(),
                });
            }
            if terminal.global_derivatives {
                return Err(TableError::GlobalDerivativesNotExpected {
                    terminal: terminal.to_string(),
                });
            }
            Ok(Some(ResolvedTerminal {
                element: coordinate_element.clone(),
                derivative_counts: derivative_counts(
                    &terminal.local_derivatives,
                    tdim,
                    coordinate_element,
                )?,
                flat_component: terminal.flat_component,
                averaging: terminal.averaging,
                restriction: terminal.restriction,
                is_argument: false,
            }))
        }
        TerminalKind::Jacobian {
            coordinate_element,
            component,
        } => {
            if terminal.reference_value {
                return Err(TableError::ReferenceValueNotExpected {
                    terminal: terminal.to_string(),
                });
            }
            if terminal.global_derivatives {
                return Err(TableError::GlobalDerivativesNotExpected {
                    terminal: terminal.to_string(),
                });
            }
            // dx/dX[i][j] is the j-derivative of coordinate component i.
            let (row, col) = *component;
            let mut ld = terminal.local_derivatives.clone();
            ld.push(col);
            ld.sort_unstable();
            Ok(Some(ResolvedTerminal {
                element: coordinate_element.clone(),
                derivative_counts: derivative_counts(&ld, tdim, coordinate_element)?,
                flat_component: row,
                averaging: terminal.averaging,
                restriction: terminal.restriction,
                is_argument: false,
            }))
        }
        TerminalKind::Unsupported => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtab_ir::{CellKind, LagrangeElement};

    fn p1_triangle() -> Arc<dyn FiniteElement> {
        Arc::new(LagrangeElement::new(CellKind::Triangle, 1).unwrap())
    }

    #[test]
    fn test_argument_derivative_counts() {
        let t = ModifiedTerminal::argument(p1_triangle()).with_local_derivatives(vec![1, 0, 1]);
        let r = resolve_terminal(&t, 2).unwrap().unwrap();
        assert!(r.is_argument);
        assert_eq!(r.derivative_counts, vec![1, 2]);
    }

    #[test]
    fn test_global_argument_rejects_local_derivatives() {
        let t = ModifiedTerminal::argument(p1_triangle())
            .with_reference_value(false)
            .with_local_derivatives(vec![0]);
        assert!(matches!(
            resolve_terminal(&t, 2),
            Err(TableError::LocalDerivativesOfGlobalValue { .. })
        ));

        let t = ModifiedTerminal::argument(p1_triangle())
            .with_local_derivatives(vec![0])
            .with_global_derivatives();
        assert!(matches!(
            resolve_terminal(&t, 2),
            Err(TableError::GlobalDerivativesOfReferenceValue { .. })
        ));
    }

    #[test]
    fn test_spatial_coordinate_is_global() {
        let t = ModifiedTerminal::spatial_coordinate(p1_triangle());
        let r = resolve_terminal(&t, 2).unwrap().unwrap();
        assert!(!r.is_argument);
        assert_eq!(r.derivative_counts, vec![0, 0]);

        let bad = ModifiedTerminal::spatial_coordinate(p1_triangle()).with_reference_value(true);
        assert!(matches!(
            resolve_terminal(&bad, 2),
            Err(TableError::ReferenceValueNotExpected { .. })
        ));
    }

    #[test]
    fn test_jacobian_adds_column_derivative() {
        let t = ModifiedTerminal::jacobian(p1_triangle(), 1, 0).with_local_derivatives(vec![1]);
        let r = resolve_terminal(&t, 2).unwrap().unwrap();
        assert_eq!(r.flat_component, 1);
        assert_eq!(r.derivative_counts, vec![1, 1]);
    }

    #[test]
    fn test_averaged_derivatives_rejected() {
        let t = ModifiedTerminal::argument(p1_triangle())
            .with_local_derivatives(vec![0])
            .with_averaging(Averaging::Cell);
        assert!(matches!(
            resolve_terminal(&t, 2),
            Err(TableError::AveragedDerivatives { .. })
        ));
    }

    #[test]
    fn test_unsupported_terminal_is_skipped() {
        let t = ModifiedTerminal::unsupported();
        assert!(resolve_terminal(&t, 2).unwrap().is_none());
    }

    #[test]
    fn test_derivative_axis_out_of_range() {
        let t = ModifiedTerminal::argument(p1_triangle()).with_local_derivatives(vec![2]);
        assert!(matches!(
            resolve_terminal(&t, 2),
            Err(TableError::DerivativeAxisOutOfRange { .. })
        ));
    }
}
