//! Model document serialization
//!
//! A small RON description of an initial model. Edges are numbered in the
//! order segments, arcs, splines; faces refer to those numbers.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::CURVE_SEGMENTS;
use crate::geometry::{EdgeGeometry, FaceGeometry};
use crate::memory::ShapeData;
use crate::traits::{KernelError, KernelResult};

/// Initial model loaded into the committed shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Standalone points
    #[serde(default)]
    pub points: Vec<Vec3>,
    /// Straight edges as point index pairs
    #[serde(default)]
    pub segments: Vec<[usize; 2]>,
    /// Arcs as (start, mid, end) point indices
    #[serde(default)]
    pub arcs: Vec<[usize; 3]>,
    /// Splines as point index lists
    #[serde(default)]
    pub splines: Vec<Vec<usize>>,
    /// Faces as edge index lists
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
}

impl ModelDocument {
    /// Load a document from a file
    pub fn load(path: impl AsRef<Path>) -> KernelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| KernelError::Import(format!("{}: {}", path.display(), e)))?;
        Self::from_ron(&content)
    }

    /// Parse a document from RON text
    pub fn from_ron(content: &str) -> KernelResult<Self> {
        ron::from_str(content).map_err(|e| KernelError::Import(e.to_string()))
    }

    /// Save the document to a file
    pub fn save(&self, path: impl AsRef<Path>) -> KernelResult<()> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| KernelError::Import(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| KernelError::Import(e.to_string()))
    }

    /// Build the shape described by this document
    pub fn build(&self) -> KernelResult<ShapeData> {
        let point = |id: usize| {
            self.points.get(id).copied().ok_or(KernelError::InvalidPointId {
                shape_index: 0,
                point_id: id,
            })
        };

        let mut edges = Vec::new();
        for [a, b] in &self.segments {
            edges.push(EdgeGeometry::line(point(*a)?, point(*b)?)?);
        }
        for [a, m, b] in &self.arcs {
            edges.push(EdgeGeometry::arc(point(*a)?, point(*m)?, point(*b)?)?);
        }
        for ids in &self.splines {
            let points = ids
                .iter()
                .map(|&id| point(id))
                .collect::<KernelResult<Vec<_>>>()?;
            edges.push(EdgeGeometry::spline(points)?);
        }

        let mut shape = ShapeData::new();
        for p in &self.points {
            shape.insert_vertex(*p);
        }
        for edge in &edges {
            shape.insert_edge(edge.clone());
        }
        for ids in &self.faces {
            let wire = ids
                .iter()
                .map(|&id| {
                    edges.get(id).cloned().ok_or(KernelError::InvalidEdgeId {
                        shape_index: 0,
                        edge_id: id,
                    })
                })
                .collect::<KernelResult<Vec<_>>>()?;
            shape.insert_face(FaceGeometry::from_wire(&wire, CURVE_SEGMENTS)?);
        }
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKernel;
    use crate::traits::ModelKernel;

    const CUBE_FACE: &str = r#"(
        points: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)],
        segments: [(0, 1), (1, 2), (2, 3), (3, 0)],
        faces: [[0, 1, 2, 3]],
    )"#;

    #[test]
    fn test_parse_and_build() {
        let document = ModelDocument::from_ron(CUBE_FACE).unwrap();
        let shape = document.build().unwrap();
        assert_eq!(shape.vertices().len(), 4);
        assert_eq!(shape.edges().len(), 4);
        assert_eq!(shape.faces().len(), 1);
    }

    #[test]
    fn test_invalid_point_reference() {
        let document = ModelDocument {
            points: vec![Vec3::ZERO],
            segments: vec![[0, 3]],
            ..Default::default()
        };
        assert!(matches!(
            document.build(),
            Err(KernelError::InvalidPointId { point_id: 3, .. })
        ));
    }

    #[test]
    fn test_import_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.ron");
        ModelDocument::from_ron(CUBE_FACE)
            .unwrap()
            .save(&path)
            .unwrap();

        let mut kernel = MemoryKernel::new();
        kernel.import_model(&path).unwrap();
        assert_eq!(kernel.vertices_of(0).unwrap().len(), 4);
        assert!(!kernel.faces_of(0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_reports_import_error() {
        let mut kernel = MemoryKernel::new();
        let result = kernel.import_model(Path::new("/nonexistent/model.ron"));
        assert!(matches!(result, Err(KernelError::Import(_))));
    }
}
