//! Quadrature rules.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::cell::CellKind;
use crate::error::TableError;

/// A 1-D factor of a tensor-product quadrature rule: points on the unit
/// interval (shape `(n, 1)`) and matching weights.
pub type TensorQuadratureFactor = (Array2<f64>, Array1<f64>);

/// A quadrature rule on a reference cell.
///
/// Owned by the caller and borrowed by the table-construction stage; the
/// `id` distinguishes tables built from different rules in a mixed
/// quadrature setting and must be stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadratureRule {
    /// Point coordinates, shape `(num_points, tdim)`.
    pub points: Array2<f64>,
    /// Weights, one per point.
    pub weights: Array1<f64>,
    /// Stable identifier.
    pub id: String,
    /// Per-axis 1-D decomposition, present for tensor-product rules.
    pub tensor_factors: Option<Vec<TensorQuadratureFactor>>,
}

impl QuadratureRule {
    pub fn new(points: Array2<f64>, weights: Array1<f64>, id: impl Into<String>) -> Self {
        QuadratureRule {
            points,
            weights,
            id: id.into(),
            tensor_factors: None,
        }
    }

    pub fn with_tensor_factors(
        points: Array2<f64>,
        weights: Array1<f64>,
        id: impl Into<String>,
        tensor_factors: Vec<TensorQuadratureFactor>,
    ) -> Self {
        QuadratureRule {
            points,
            weights,
            id: id.into(),
            tensor_factors: Some(tensor_factors),
        }
    }

    pub fn has_tensor_factors(&self) -> bool {
        self.tensor_factors.is_some()
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    /// A low-order rule exact for polynomials of the given degree.
    ///
    /// Used internally when a terminal is averaged over a cell or facet
    /// and the element does not carry its own quadrature points. On
    /// tensor-product cells the returned rule carries its per-axis
    /// factors.
    pub fn default_rule(cell: CellKind, degree: usize) -> Result<QuadratureRule, TableError> {
        match cell {
            CellKind::Point => Ok(QuadratureRule::new(
                Array2::zeros((1, 0)),
                Array1::from_elem(1, 1.0),
                "auto",
            )),
            CellKind::Interval => {
                let (p, w) = gauss_interval(cell, degree)?;
                Ok(QuadratureRule::new(p, w, "auto"))
            }
            CellKind::Triangle => match degree {
                0 | 1 => Ok(QuadratureRule::new(
                    Array2::from_shape_vec((1, 2), vec![1.0 / 3.0, 1.0 / 3.0])
                        .map_err(|e| TableError::Internal(e.to_string()))?,
                    Array1::from_elem(1, 0.5),
                    "auto",
                )),
                2 => {
                    let pts = vec![
                        1.0 / 6.0,
                        1.0 / 6.0,
                        2.0 / 3.0,
                        1.0 / 6.0,
                        1.0 / 6.0,
                        2.0 / 3.0,
                    ];
                    Ok(QuadratureRule::new(
                        Array2::from_shape_vec((3, 2), pts)
                            .map_err(|e| TableError::Internal(e.to_string()))?,
                        Array1::from_elem(3, 1.0 / 6.0),
                        "auto",
                    ))
                }
                _ => Err(TableError::UnsupportedQuadratureDegree { cell, degree }),
            },
            CellKind::Tetrahedron => match degree {
                0 | 1 => Ok(QuadratureRule::new(
                    Array2::from_shape_vec((1, 3), vec![0.25, 0.25, 0.25])
                        .map_err(|e| TableError::Internal(e.to_string()))?,
                    Array1::from_elem(1, 1.0 / 6.0),
                    "auto",
                )),
                2 => {
                    let a = 0.585_410_196_624_968_5;
                    let b = 0.138_196_601_125_010_5;
                    let pts = vec![a, b, b, b, a, b, b, b, a, b, b, b];
                    Ok(QuadratureRule::new(
                        Array2::from_shape_vec((4, 3), pts)
                            .map_err(|e| TableError::Internal(e.to_string()))?,
                        Array1::from_elem(4, 1.0 / 24.0),
                        "auto",
                    ))
                }
                _ => Err(TableError::UnsupportedQuadratureDegree { cell, degree }),
            },
            CellKind::Quadrilateral | CellKind::Hexahedron => {
                let tdim = cell.topological_dimension();
                let (p1, w1) = gauss_interval(cell, degree)?;
                let n = p1.nrows();
                let total = n.pow(tdim as u32);
                let mut points = Array2::zeros((total, tdim));
                let mut weights = Array1::from_elem(total, 1.0);
                for k in 0..total {
                    let mut rem = k;
                    for a in 0..tdim {
                        let i = rem % n;
                        rem /= n;
                        points[[k, a]] = p1[[i, 0]];
                        weights[k] *= w1[i];
                    }
                }
                let factors = (0..tdim).map(|_| (p1.clone(), w1.clone())).collect();
                Ok(QuadratureRule::with_tensor_factors(
                    points, weights, "auto", factors,
                ))
            }
        }
    }
}

/// Gauss-Legendre points and weights on the unit interval, exact for the
/// requested degree (up to degree 5).
fn gauss_interval(cell: CellKind, degree: usize) -> Result<(Array2<f64>, Array1<f64>), TableError> {
    let n = degree / 2 + 1;
    let (pts, wts): (Vec<f64>, Vec<f64>) = match n {
        1 => (vec![0.5], vec![1.0]),
        2 => {
            let d = 0.5 / 3.0_f64.sqrt();
            (vec![0.5 - d, 0.5 + d], vec![0.5, 0.5])
        }
        3 => {
            let d = 0.5 * 0.6_f64.sqrt();
            (
                vec![0.5 - d, 0.5, 0.5 + d],
                vec![5.0 / 18.0, 4.0 / 9.0, 5.0 / 18.0],
            )
        }
        _ => return Err(TableError::UnsupportedQuadratureDegree { cell, degree }),
    };
    let points = Array2::from_shape_vec((pts.len(), 1), pts)
        .map_err(|e| TableError::Internal(e.to_string()))?;
    Ok((points, Array1::from_vec(wts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_rules_integrate_constants() {
        for cell in [
            CellKind::Interval,
            CellKind::Triangle,
            CellKind::Quadrilateral,
            CellKind::Tetrahedron,
            CellKind::Hexahedron,
        ] {
            for degree in [0, 1, 2] {
                let rule = QuadratureRule::default_rule(cell, degree).unwrap();
                assert_relative_eq!(rule.weights.sum(), cell.reference_volume(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_interval_rule_exactness() {
        // The two-point rule integrates cubics exactly on [0, 1].
        let rule = QuadratureRule::default_rule(CellKind::Interval, 3).unwrap();
        let integral: f64 = rule
            .points
            .column(0)
            .iter()
            .zip(rule.weights.iter())
            .map(|(x, w)| w * x * x * x)
            .sum();
        assert_relative_eq!(integral, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_tensor_cells_carry_factors() {
        let rule = QuadratureRule::default_rule(CellKind::Hexahedron, 2).unwrap();
        assert!(rule.has_tensor_factors());
        let factors = rule.tensor_factors.as_ref().unwrap();
        assert_eq!(factors.len(), 3);
        assert_eq!(rule.num_points(), factors[0].0.nrows().pow(3));
    }

    #[test]
    fn test_unsupported_degree() {
        assert!(QuadratureRule::default_rule(CellKind::Triangle, 7).is_err());
    }
}
