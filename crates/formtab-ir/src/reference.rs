//! Reference element implementations.
//!
//! Small concrete elements backing the [`FiniteElement`](crate::element::FiniteElement)
//! contract: degree-0 and degree-1 Lagrange on every supported cell, a
//! quadrature-point element, a blocked (vector) wrapper and a
//! tensor-product element. Basis functions are stored as monomial
//! expansions, so derivatives of any order tabulate exactly.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::{Array1, Array2, Array3, ArrayView1};

use crate::cell::CellKind;
use crate::element::{
    derivative_index, derivative_multi_indices, num_derivatives, ComponentElement, FiniteElement,
    TensorFactorisation,
};
use crate::error::TableError;

/// One term of a polynomial: `coeff * prod_a x_a^exponents[a]`.
#[derive(Debug, Clone)]
struct Monomial {
    coeff: f64,
    exponents: Vec<usize>,
}

type Poly = Vec<Monomial>;

fn poly_const(coeff: f64, dim: usize) -> Poly {
    vec![Monomial {
        coeff,
        exponents: vec![0; dim],
    }]
}

/// The coordinate polynomial `x_axis`.
fn poly_axis(axis: usize, dim: usize) -> Poly {
    let mut exponents = vec![0; dim];
    exponents[axis] = 1;
    vec![Monomial {
        coeff: 1.0,
        exponents,
    }]
}

/// `1 - x_axis`.
fn poly_one_minus_axis(axis: usize, dim: usize) -> Poly {
    let mut p = poly_const(1.0, dim);
    let mut exponents = vec![0; dim];
    exponents[axis] = 1;
    p.push(Monomial {
        coeff: -1.0,
        exponents,
    });
    p
}

fn poly_mul(a: &Poly, b: &Poly) -> Poly {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for ma in a {
        for mb in b {
            let exponents = ma
                .exponents
                .iter()
                .zip(&mb.exponents)
                .map(|(x, y)| x + y)
                .collect();
            out.push(Monomial {
                coeff: ma.coeff * mb.coeff,
                exponents,
            });
        }
    }
    out
}

/// Evaluate the `counts` derivative of `poly` at `point`. Coordinates
/// beyond the polynomial's dimension are ignored.
fn poly_eval_derivative(poly: &Poly, counts: &[usize], point: ArrayView1<'_, f64>) -> f64 {
    let mut total = 0.0;
    for m in poly {
        let mut value = m.coeff;
        for (axis, &e) in m.exponents.iter().enumerate() {
            let k = counts.get(axis).copied().unwrap_or(0);
            if k > e {
                value = 0.0;
                break;
            }
            // d^k/dx^k x^e = e!/(e-k)! x^(e-k)
            for j in (e - k + 1)..=e {
                value *= j as f64;
            }
            let rem = e - k;
            if rem > 0 {
                value *= point[axis].powi(rem as i32);
            }
        }
        total += value;
    }
    total
}

/// Tabulate a set of scalar basis polynomials at points, all derivative
/// rows up to order `nderiv`.
fn tabulate_polys(basis: &[Poly], tdim: usize, nderiv: usize, points: &Array2<f64>) -> Array3<f64> {
    let rows = num_derivatives(nderiv, tdim);
    let mut out = Array3::zeros((rows, points.nrows(), basis.len()));
    for counts in derivative_multi_indices(nderiv, tdim) {
        let row = derivative_index(&counts);
        for (pi, point) in points.outer_iter().enumerate() {
            for (di, poly) in basis.iter().enumerate() {
                out[[row, pi, di]] = poly_eval_derivative(poly, &counts, point);
            }
        }
    }
    out
}

/// Scalar Lagrange element of degree 0 or 1.
#[derive(Clone)]
pub struct LagrangeElement {
    cell: CellKind,
    degree: usize,
    basis: Vec<Poly>,
}

impl LagrangeElement {
    pub fn new(cell: CellKind, degree: usize) -> Result<Self, TableError> {
        let tdim = cell.topological_dimension();
        let basis = match degree {
            0 => vec![poly_const(1.0, tdim)],
            1 => match cell {
                CellKind::Point => vec![poly_const(1.0, 0)],
                CellKind::Interval | CellKind::Triangle | CellKind::Tetrahedron => {
                    // Barycentric: 1 - sum x_a, then the coordinates.
                    let mut first = poly_const(1.0, tdim);
                    for a in 0..tdim {
                        let mut exponents = vec![0; tdim];
                        exponents[a] = 1;
                        first.push(Monomial {
                            coeff: -1.0,
                            exponents,
                        });
                    }
                    let mut basis = vec![first];
                    for a in 0..tdim {
                        basis.push(poly_axis(a, tdim));
                    }
                    basis
                }
                CellKind::Quadrilateral | CellKind::Hexahedron => {
                    // Vertex v has bit a set iff its a-th coordinate is 1,
                    // with axis 0 varying fastest.
                    let nverts = 1 << tdim;
                    (0..nverts)
                        .map(|v| {
                            let mut p = poly_const(1.0, tdim);
                            for a in 0..tdim {
                                let factor = if (v >> a) & 1 == 1 {
                                    poly_axis(a, tdim)
                                } else {
                                    poly_one_minus_axis(a, tdim)
                                };
                                p = poly_mul(&p, &factor);
                            }
                            p
                        })
                        .collect()
                }
            },
            _ => return Err(TableError::UnsupportedElementDegree { cell, degree }),
        };
        Ok(LagrangeElement {
            cell,
            degree,
            basis,
        })
    }
}

impl FiniteElement for LagrangeElement {
    fn cell(&self) -> CellKind {
        self.cell
    }

    fn dim(&self) -> usize {
        self.basis.len()
    }

    fn embedded_superdegree(&self) -> usize {
        match self.cell {
            CellKind::Quadrilateral => 2 * self.degree,
            CellKind::Hexahedron => 3 * self.degree,
            _ => self.degree,
        }
    }

    fn tabulate(&self, nderiv: usize, points: &Array2<f64>) -> Array3<f64> {
        tabulate_polys(
            &self.basis,
            self.cell.topological_dimension(),
            nderiv,
            points,
        )
    }

    fn component_element(&self, _flat_component: usize) -> ComponentElement {
        ComponentElement {
            element: Arc::new(self.clone()),
            offset: 0,
            stride: 1,
        }
    }

    fn signature(&self) -> String {
        format!("P{}({:?})", self.degree, self.cell)
    }
}

/// An element whose dofs are point evaluations at its own quadrature
/// points; tabulating it at those points gives the identity.
#[derive(Clone)]
pub struct QuadratureElement {
    cell: CellKind,
    points: Array2<f64>,
    weights: Array1<f64>,
    degree: usize,
}

impl QuadratureElement {
    pub fn new(cell: CellKind, points: Array2<f64>, weights: Array1<f64>, degree: usize) -> Self {
        QuadratureElement {
            cell,
            points,
            weights,
            degree,
        }
    }

    fn points_match(&self, points: &Array2<f64>) -> bool {
        self.points.dim() == points.dim()
            && self
                .points
                .iter()
                .zip(points.iter())
                .all(|(a, b)| (a - b).abs() <= 1e-12)
    }
}

impl FiniteElement for QuadratureElement {
    fn cell(&self) -> CellKind {
        self.cell
    }

    fn dim(&self) -> usize {
        self.points.nrows()
    }

    fn embedded_superdegree(&self) -> usize {
        self.degree
    }

    fn tabulate(&self, nderiv: usize, points: &Array2<f64>) -> Array3<f64> {
        let tdim = self.cell.topological_dimension();
        let rows = num_derivatives(nderiv, tdim);
        let n = self.dim();
        let mut out = Array3::zeros((rows, points.nrows(), n));
        if self.points_match(points) {
            for i in 0..n {
                out[[0, i, i]] = 1.0;
            }
        }
        out
    }

    fn component_element(&self, _flat_component: usize) -> ComponentElement {
        ComponentElement {
            element: Arc::new(self.clone()),
            offset: 0,
            stride: 1,
        }
    }

    fn signature(&self) -> String {
        let mut h = DefaultHasher::new();
        for v in self.points.iter() {
            v.to_bits().hash(&mut h);
        }
        format!(
            "Quadrature({:?}, {} pts, {:016x})",
            self.cell,
            self.dim(),
            h.finish()
        )
    }

    fn quadrature_points(&self) -> Option<(Array2<f64>, Array1<f64>)> {
        Some((self.points.clone(), self.weights.clone()))
    }
}

/// A vector-valued element built by repeating a scalar sub-element, with
/// interleaved components: the dof for component `c` of node `n` sits at
/// `n * block_size + c`.
#[derive(Clone)]
pub struct BlockedElement {
    sub: Arc<dyn FiniteElement>,
    block_size: usize,
}

impl BlockedElement {
    pub fn new(sub: Arc<dyn FiniteElement>, block_size: usize) -> Self {
        BlockedElement { sub, block_size }
    }
}

impl FiniteElement for BlockedElement {
    fn cell(&self) -> CellKind {
        self.sub.cell()
    }

    fn dim(&self) -> usize {
        self.sub.dim() * self.block_size
    }

    fn embedded_superdegree(&self) -> usize {
        self.sub.embedded_superdegree()
    }

    fn tabulate(&self, nderiv: usize, points: &Array2<f64>) -> Array3<f64> {
        // Every component is evaluated by the same scalar basis.
        self.sub.tabulate(nderiv, points)
    }

    fn component_element(&self, flat_component: usize) -> ComponentElement {
        ComponentElement {
            element: self.sub.clone(),
            offset: flat_component,
            stride: self.block_size,
        }
    }

    fn sub_elements(&self) -> Vec<Arc<dyn FiniteElement>> {
        vec![self.sub.clone()]
    }

    fn signature(&self) -> String {
        format!("Blocked({}, {})", self.sub.signature(), self.block_size)
    }
}

/// An element built as a tensor product of 1-D factors, with the
/// flattened dof index running over axis 0 fastest.
#[derive(Clone)]
pub struct TensorProductElement {
    cell: CellKind,
    factors: Vec<Arc<dyn FiniteElement>>,
}

impl TensorProductElement {
    pub fn new(factors: Vec<Arc<dyn FiniteElement>>) -> Result<Self, TableError> {
        let cell = match factors.len() {
            2 => CellKind::Quadrilateral,
            3 => CellKind::Hexahedron,
            n => {
                return Err(TableError::Internal(format!(
                    "tensor-product elements need 2 or 3 factors, got {n}"
                )))
            }
        };
        for f in &factors {
            if f.cell() != CellKind::Interval {
                return Err(TableError::UnsupportedCell {
                    cell: f.cell(),
                    context: "tensor-product factors must be interval elements".into(),
                });
            }
        }
        Ok(TensorProductElement { cell, factors })
    }
}

impl FiniteElement for TensorProductElement {
    fn cell(&self) -> CellKind {
        self.cell
    }

    fn dim(&self) -> usize {
        self.factors.iter().map(|f| f.dim()).product()
    }

    fn embedded_superdegree(&self) -> usize {
        self.factors.iter().map(|f| f.embedded_superdegree()).sum()
    }

    fn tabulate(&self, nderiv: usize, points: &Array2<f64>) -> Array3<f64> {
        let tdim = self.cell.topological_dimension();
        let rows = num_derivatives(nderiv, tdim);
        let npoints = points.nrows();
        let ndofs = self.dim();
        // Per-axis 1-D tables at the matching point column.
        let factor_tables: Vec<Array3<f64>> = self
            .factors
            .iter()
            .enumerate()
            .map(|(a, f)| {
                let col = points.column(a).to_owned();
                let pts = col.insert_axis(ndarray::Axis(1));
                f.tabulate(nderiv, &pts)
            })
            .collect();
        let dims: Vec<usize> = self.factors.iter().map(|f| f.dim()).collect();
        let mut out = Array3::zeros((rows, npoints, ndofs));
        for counts in derivative_multi_indices(nderiv, tdim) {
            let row = derivative_index(&counts);
            for p in 0..npoints {
                for k in 0..ndofs {
                    let mut rem = k;
                    let mut value = 1.0;
                    for (a, tbl) in factor_tables.iter().enumerate() {
                        let i = rem % dims[a];
                        rem /= dims[a];
                        value *= tbl[[counts[a], p, i]];
                    }
                    out[[row, p, k]] = value;
                }
            }
        }
        out
    }

    fn component_element(&self, _flat_component: usize) -> ComponentElement {
        ComponentElement {
            element: Arc::new(self.clone()),
            offset: 0,
            stride: 1,
        }
    }

    fn sub_elements(&self) -> Vec<Arc<dyn FiniteElement>> {
        self.factors.clone()
    }

    fn signature(&self) -> String {
        let parts: Vec<String> = self.factors.iter().map(|f| f.signature()).collect();
        format!("TensorProduct[{}]", parts.join(" x "))
    }

    fn tensor_factorisation(&self) -> Option<TensorFactorisation> {
        Some(TensorFactorisation {
            factors: self.factors.clone(),
            permutation: (0..self.dim() as u32).collect(),
        })
    }
}
