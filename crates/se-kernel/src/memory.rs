//! In-memory kernel backend
//!
//! Pure Rust kernel keeping every shape as plain vertex/edge/face lists.
//! It mirrors how a B-Rep kernel reports shapes to the editor: unique
//! vertices, unique edges tessellated at a fixed granularity, and
//! triangulated faces tagged with their logical face id.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{CURVE_SEGMENTS, VERTEX_TOLERANCE};
use crate::document::ModelDocument;
use crate::geometry::{EdgeGeometry, FaceGeometry};
use crate::traits::{FaceTessellation, KernelError, KernelResult, ModelKernel};

/// Geometry of one shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    vertices: Vec<Vec3>,
    edges: Vec<EdgeGeometry>,
    faces: Vec<FaceGeometry>,
}

impl ShapeData {
    /// Create an empty shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique vertices in insertion order
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Unique edges in insertion order
    pub fn edges(&self) -> &[EdgeGeometry] {
        &self.edges
    }

    /// Faces in insertion order
    pub fn faces(&self) -> &[FaceGeometry] {
        &self.faces
    }

    /// Check if the shape holds no geometry
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    /// Insert a vertex unless one already sits within tolerance
    ///
    /// Returns the id of the new or existing vertex.
    pub fn insert_vertex(&mut self, position: Vec3) -> usize {
        if let Some(existing) = self
            .vertices
            .iter()
            .position(|v| v.distance(position) < VERTEX_TOLERANCE)
        {
            return existing;
        }
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    /// Insert an edge unless an identical one exists
    ///
    /// The end points are registered as vertices. Returns the id of the new
    /// or existing edge.
    pub fn insert_edge(&mut self, edge: EdgeGeometry) -> usize {
        self.insert_vertex(edge.start());
        self.insert_vertex(edge.end());

        if let Some(existing) = self.edges.iter().position(|e| e.coincides(&edge)) {
            debug!("Edge duplicates edge {}, keeping the existing one", existing);
            return existing;
        }
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Append a face
    pub fn insert_face(&mut self, face: FaceGeometry) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    fn vertex(&self, shape_index: usize, point_id: usize) -> KernelResult<Vec3> {
        self.vertices
            .get(point_id)
            .copied()
            .ok_or(KernelError::InvalidPointId {
                shape_index,
                point_id,
            })
    }

    fn edge(&self, shape_index: usize, edge_id: usize) -> KernelResult<&EdgeGeometry> {
        self.edges
            .get(edge_id)
            .ok_or(KernelError::InvalidEdgeId {
                shape_index,
                edge_id,
            })
    }
}

/// Kernel keeping all shapes in memory
#[derive(Debug, Clone)]
pub struct MemoryKernel {
    /// Index 0 is the committed shape, a trailing index the scratch shape
    shapes: Vec<ShapeData>,
    scratch_active: bool,
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKernel {
    /// Create a kernel holding one empty committed shape
    pub fn new() -> Self {
        Self {
            shapes: vec![ShapeData::new()],
            scratch_active: false,
        }
    }

    /// Create a kernel whose committed shape is `shape`
    pub fn with_committed(shape: ShapeData) -> Self {
        Self {
            shapes: vec![shape],
            scratch_active: false,
        }
    }

    /// Get a shape by index
    pub fn shape(&self, shape_index: usize) -> Option<&ShapeData> {
        self.shapes.get(shape_index)
    }

    fn shape_ref(&self, shape_index: usize) -> KernelResult<&ShapeData> {
        self.shapes
            .get(shape_index)
            .ok_or(KernelError::InvalidShapeIndex(shape_index))
    }

    fn shape_mut(&mut self, shape_index: usize) -> KernelResult<&mut ShapeData> {
        self.shapes
            .get_mut(shape_index)
            .ok_or(KernelError::InvalidShapeIndex(shape_index))
    }
}

impl ModelKernel for MemoryKernel {
    type Snapshot = ShapeData;

    fn name(&self) -> &str {
        "memory"
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn vertices_of(&self, shape_index: usize) -> KernelResult<Vec<Vec3>> {
        Ok(self.shape_ref(shape_index)?.vertices.clone())
    }

    fn edge_point_pairs_of(&self, shape_index: usize) -> KernelResult<Vec<[Vec3; 2]>> {
        let shape = self.shape_ref(shape_index)?;
        Ok(shape
            .edges
            .iter()
            .flat_map(|edge| edge.tessellate(CURVE_SEGMENTS))
            .collect())
    }

    fn faces_of(&self, shape_index: usize) -> KernelResult<FaceTessellation> {
        let shape = self.shape_ref(shape_index)?;
        let mut tessellation = FaceTessellation::new();
        for (face_id, face) in shape.faces.iter().enumerate() {
            let triangles = face.triangulate();
            tessellation
                .face_ids
                .extend(std::iter::repeat_n(face_id, triangles.len()));
            tessellation.triangles.extend(triangles);
        }
        Ok(tessellation)
    }

    fn add_point(&mut self, shape_index: usize, position: Vec3) -> KernelResult<()> {
        let shape = self.shape_mut(shape_index)?;
        let before = shape.vertices.len();
        let id = shape.insert_vertex(position);
        if shape.vertices.len() == before {
            debug!(
                "Point {:?} coincides with vertex {} of shape {}",
                position, id, shape_index
            );
        }
        Ok(())
    }

    fn add_edge(&mut self, shape_index: usize, first: usize, second: usize) -> KernelResult<()> {
        let shape = self.shape_mut(shape_index)?;
        let start = shape.vertex(shape_index, first)?;
        let end = shape.vertex(shape_index, second)?;
        let edge = EdgeGeometry::line(start, end)?;
        shape.insert_edge(edge);
        Ok(())
    }

    fn add_arc(
        &mut self,
        shape_index: usize,
        first: usize,
        mid: usize,
        second: usize,
    ) -> KernelResult<()> {
        let shape = self.shape_mut(shape_index)?;
        let start = shape.vertex(shape_index, first)?;
        let through = shape.vertex(shape_index, mid)?;
        let end = shape.vertex(shape_index, second)?;
        let edge = EdgeGeometry::arc(start, through, end)?;
        shape.insert_edge(edge);
        Ok(())
    }

    fn add_surface(&mut self, shape_index: usize, edge_ids: &[usize]) -> KernelResult<()> {
        let shape = self.shape_mut(shape_index)?;

        let mut edges = Vec::with_capacity(edge_ids.len());
        for &edge_id in edge_ids {
            match shape.edge(shape_index, edge_id) {
                Ok(edge) => edges.push(edge.clone()),
                Err(e) => warn!("Skipping edge while building face: {}", e),
            }
        }
        if edges.is_empty() {
            return Err(KernelError::NoValidEdges);
        }

        let face = FaceGeometry::from_wire(&edges, CURVE_SEGMENTS)?;
        shape.insert_face(face);
        Ok(())
    }

    fn add_spline(&mut self, shape_index: usize, point_ids: &[usize]) -> KernelResult<()> {
        if point_ids.len() < 2 {
            return Err(KernelError::TooFewPoints(point_ids.len()));
        }
        let shape = self.shape_mut(shape_index)?;
        let points = point_ids
            .iter()
            .map(|&id| shape.vertex(shape_index, id))
            .collect::<KernelResult<Vec<_>>>()?;
        let edge = EdgeGeometry::spline(points)?;
        shape.insert_edge(edge);
        Ok(())
    }

    fn transfer_edges(
        &mut self,
        from_shape: usize,
        edge_ids: &[usize],
        to_shape: usize,
    ) -> KernelResult<Vec<usize>> {
        let source = self.shape_ref(from_shape)?;
        let edges = edge_ids
            .iter()
            .map(|&id| source.edge(from_shape, id).cloned())
            .collect::<KernelResult<Vec<_>>>()?;

        let target = self.shape_mut(to_shape)?;
        Ok(edges
            .into_iter()
            .map(|edge| target.insert_edge(edge))
            .collect())
    }

    fn begin_scratch_shape(&mut self) -> usize {
        if self.scratch_active {
            self.end_scratch_shape();
        }
        self.shapes.push(ShapeData::new());
        self.scratch_active = true;
        self.shapes.len() - 1
    }

    fn end_scratch_shape(&mut self) -> bool {
        if !self.scratch_active {
            return false;
        }
        // Shape 0 is never removed
        if self.shapes.len() > 1 {
            self.shapes.pop();
        }
        self.scratch_active = false;
        true
    }

    fn has_scratch_shape(&self) -> bool {
        self.scratch_active
    }

    fn capture_snapshot(&self) -> ShapeData {
        self.shapes[0].clone()
    }

    fn restore_snapshot(&mut self, snapshot: &ShapeData) {
        self.shapes[0] = snapshot.clone();
    }

    fn import_model(&mut self, path: &Path) -> KernelResult<()> {
        let document = ModelDocument::load(path)?;
        let shape = document.build()?;
        debug!(
            "Imported {} vertices, {} edges, {} faces from {}",
            shape.vertices.len(),
            shape.edges.len(),
            shape.faces.len(),
            path.display()
        );
        self.shapes[0] = shape;
        Ok(())
    }
}
