//! Reference cell topology.
//!
//! Cells are the reference domains elements and quadrature rules live on.
//! The topology tables (sub-entity counts, sub-entity vertex lists,
//! reference vertices) follow the usual lexicographic conventions, with
//! facets of simplices numbered opposite their vertex.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Supported reference cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Point,
    Interval,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl CellKind {
    pub fn topological_dimension(self) -> usize {
        match self {
            CellKind::Point => 0,
            CellKind::Interval => 1,
            CellKind::Triangle | CellKind::Quadrilateral => 2,
            CellKind::Tetrahedron | CellKind::Hexahedron => 3,
        }
    }

    /// Number of sub-entities of the given dimension (0 if `dim` exceeds
    /// the cell dimension).
    pub fn num_sub_entities(self, dim: usize) -> usize {
        let counts: &[usize] = match self {
            CellKind::Point => &[1],
            CellKind::Interval => &[2, 1],
            CellKind::Triangle => &[3, 3, 1],
            CellKind::Quadrilateral => &[4, 4, 1],
            CellKind::Tetrahedron => &[4, 6, 4, 1],
            CellKind::Hexahedron => &[8, 12, 6, 1],
        };
        counts.get(dim).copied().unwrap_or(0)
    }

    /// The reference cell of this cell's facets.
    pub fn facet_cell(self) -> Option<CellKind> {
        match self {
            CellKind::Point => None,
            CellKind::Interval => Some(CellKind::Point),
            CellKind::Triangle | CellKind::Quadrilateral => Some(CellKind::Interval),
            CellKind::Tetrahedron => Some(CellKind::Triangle),
            CellKind::Hexahedron => Some(CellKind::Quadrilateral),
        }
    }

    /// Reference vertex coordinates, shape `(num_vertices, tdim)`.
    pub fn vertices(self) -> Array2<f64> {
        let (n, tdim, data): (usize, usize, &[f64]) = match self {
            CellKind::Point => (1, 0, &[]),
            CellKind::Interval => (2, 1, &[0.0, 1.0]),
            CellKind::Triangle => (3, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            CellKind::Quadrilateral => (4, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            CellKind::Tetrahedron => (
                4,
                3,
                &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            ),
            CellKind::Hexahedron => (
                8,
                3,
                &[
                    0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0,
                    1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0,
                ],
            ),
        };
        Array2::from_shape_vec((n, tdim), data.to_vec())
            .unwrap_or_else(|_| Array2::zeros((n, tdim)))
    }

    /// Vertex indices of one sub-entity.
    ///
    /// For facets the first `dim + 1` listed vertices span the entity's
    /// local coordinate frame (origin first).
    pub fn sub_entity_vertices(self, dim: usize, entity: usize) -> Result<Vec<usize>, TableError> {
        let tdim = self.topological_dimension();
        if dim == tdim {
            if entity != 0 {
                return Err(TableError::EntityOutOfRange {
                    cell: self,
                    dim,
                    entity,
                });
            }
            return Ok((0..self.num_sub_entities(0)).collect());
        }
        if dim == 0 {
            if entity >= self.num_sub_entities(0) {
                return Err(TableError::EntityOutOfRange {
                    cell: self,
                    dim,
                    entity,
                });
            }
            return Ok(vec![entity]);
        }
        let table: &[&[usize]] = match (self, dim) {
            (CellKind::Triangle, 1) => &[&[1, 2], &[0, 2], &[0, 1]],
            (CellKind::Quadrilateral, 1) => &[&[0, 1], &[0, 2], &[1, 3], &[2, 3]],
            (CellKind::Tetrahedron, 1) => {
                &[&[2, 3], &[1, 3], &[1, 2], &[0, 3], &[0, 2], &[0, 1]]
            }
            (CellKind::Tetrahedron, 2) => &[&[1, 2, 3], &[0, 2, 3], &[0, 1, 3], &[0, 1, 2]],
            (CellKind::Hexahedron, 1) => &[
                &[0, 1],
                &[0, 2],
                &[0, 4],
                &[1, 3],
                &[1, 5],
                &[2, 3],
                &[2, 6],
                &[3, 7],
                &[4, 5],
                &[4, 6],
                &[5, 7],
                &[6, 7],
            ],
            (CellKind::Hexahedron, 2) => &[
                &[0, 1, 2, 3],
                &[0, 1, 4, 5],
                &[0, 2, 4, 6],
                &[1, 3, 5, 7],
                &[2, 3, 6, 7],
                &[4, 5, 6, 7],
            ],
            _ => {
                return Err(TableError::EntityOutOfRange {
                    cell: self,
                    dim,
                    entity,
                })
            }
        };
        table
            .get(entity)
            .map(|v| v.to_vec())
            .ok_or(TableError::EntityOutOfRange {
                cell: self,
                dim,
                entity,
            })
    }

    /// Volume of the reference cell.
    pub fn reference_volume(self) -> f64 {
        match self {
            CellKind::Point | CellKind::Interval | CellKind::Quadrilateral | CellKind::Hexahedron => 1.0,
            CellKind::Triangle => 0.5,
            CellKind::Tetrahedron => 1.0 / 6.0,
        }
    }
}

/// The kind of integral a table is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralKind {
    Cell,
    ExteriorFacet,
    InteriorFacet,
    Custom,
    Expression,
}

impl IntegralKind {
    /// Dimension of the entities the integral's tables range over.
    pub fn entity_dimension(self, tdim: usize) -> usize {
        match self {
            IntegralKind::Cell | IntegralKind::Custom | IntegralKind::Expression => tdim,
            IntegralKind::ExteriorFacet | IntegralKind::InteriorFacet => tdim - 1,
        }
    }
}

/// The entity type a table's second axis enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Cell,
    Facet,
    Vertex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_entity_counts() {
        assert_eq!(CellKind::Triangle.num_sub_entities(0), 3);
        assert_eq!(CellKind::Triangle.num_sub_entities(1), 3);
        assert_eq!(CellKind::Triangle.num_sub_entities(2), 1);
        assert_eq!(CellKind::Tetrahedron.num_sub_entities(2), 4);
        assert_eq!(CellKind::Hexahedron.num_sub_entities(2), 6);
        assert_eq!(CellKind::Hexahedron.num_sub_entities(1), 12);
        assert_eq!(CellKind::Interval.num_sub_entities(0), 2);
        assert_eq!(CellKind::Triangle.num_sub_entities(3), 0);
    }

    #[test]
    fn test_facet_cells() {
        assert_eq!(CellKind::Interval.facet_cell(), Some(CellKind::Point));
        assert_eq!(CellKind::Triangle.facet_cell(), Some(CellKind::Interval));
        assert_eq!(CellKind::Tetrahedron.facet_cell(), Some(CellKind::Triangle));
        assert_eq!(CellKind::Hexahedron.facet_cell(), Some(CellKind::Quadrilateral));
        assert_eq!(CellKind::Point.facet_cell(), None);
    }

    #[test]
    fn test_entity_dimension() {
        assert_eq!(IntegralKind::Cell.entity_dimension(2), 2);
        assert_eq!(IntegralKind::ExteriorFacet.entity_dimension(2), 1);
        assert_eq!(IntegralKind::InteriorFacet.entity_dimension(3), 2);
        assert_eq!(IntegralKind::Custom.entity_dimension(3), 3);
    }

    #[test]
    fn test_facet_vertices_span_frame() {
        // Facet 0 of the tetrahedron is the triangle (1, 2, 3).
        let f = CellKind::Tetrahedron.sub_entity_vertices(2, 0).unwrap();
        assert_eq!(f, vec![1, 2, 3]);
        // Hexahedron face 5 is the top face.
        let f = CellKind::Hexahedron.sub_entity_vertices(2, 5).unwrap();
        assert_eq!(f, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_entity_out_of_range() {
        assert!(CellKind::Triangle.sub_entity_vertices(1, 3).is_err());
        assert!(CellKind::Triangle.sub_entity_vertices(2, 1).is_err());
    }

    #[test]
    fn test_vertices_shape() {
        assert_eq!(CellKind::Hexahedron.vertices().dim(), (8, 3));
        assert_eq!(CellKind::Triangle.vertices().dim(), (3, 2));
        assert_eq!(CellKind::Point.vertices().dim(), (1, 0));
    }
}
