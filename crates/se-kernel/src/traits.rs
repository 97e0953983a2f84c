//! Kernel trait definitions
//!
//! These traits define the interface the editing core needs from a geometry
//! kernel. Shapes are addressed by index: index 0 is the committed model,
//! a trailing index (when present) is the scratch shape used for previews.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

/// Error type for kernel operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("Invalid shape index: {0}")]
    InvalidShapeIndex(usize),

    #[error("Invalid point id {point_id} in shape {shape_index}")]
    InvalidPointId { shape_index: usize, point_id: usize },

    #[error("Invalid edge id {edge_id} in shape {shape_index}")]
    InvalidEdgeId { shape_index: usize, edge_id: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Need at least 2 points to create a spline, got {0}")]
    TooFewPoints(usize),

    #[error("Wire is not closed, cannot create face")]
    OpenWire,

    #[error("No valid edges found")]
    NoValidEdges,

    #[error("Model import failed: {0}")]
    Import(String),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Triangulated faces of one shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceTessellation {
    /// Triangle corners, three per triangle
    pub triangles: Vec<[Vec3; 3]>,
    /// Logical face id of each triangle (same length as `triangles`)
    pub face_ids: Vec<usize>,
}

impl FaceTessellation {
    /// Create an empty tessellation
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// The kernel contract consumed by the editing core
///
/// Implementations own every shape. The core never holds kernel geometry
/// across a mutation; it re-queries after each one.
pub trait ModelKernel {
    /// Restorable copy of the committed shape
    type Snapshot: Clone + PartialEq + std::fmt::Debug;

    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Number of shapes currently held (1 or 2)
    fn shape_count(&self) -> usize;

    // ========== Queries ==========

    /// Vertex positions of a shape; the order defines the point element id
    fn vertices_of(&self, shape_index: usize) -> KernelResult<Vec<Vec3>>;

    /// Tessellated edges of a shape as start/end pairs, in edge order
    ///
    /// Every edge contributes exactly [`crate::CURVE_SEGMENTS`] pairs.
    fn edge_point_pairs_of(&self, shape_index: usize) -> KernelResult<Vec<[Vec3; 2]>>;

    /// Triangulated faces of a shape with the logical face id of each triangle
    fn faces_of(&self, shape_index: usize) -> KernelResult<FaceTessellation>;

    // ========== Mutations ==========

    /// Add a standalone point
    fn add_point(&mut self, shape_index: usize, position: Vec3) -> KernelResult<()>;

    /// Add a straight edge between two existing points
    fn add_edge(&mut self, shape_index: usize, first: usize, second: usize) -> KernelResult<()>;

    /// Add a circular arc from `first` through `mid` to `second`
    fn add_arc(
        &mut self,
        shape_index: usize,
        first: usize,
        mid: usize,
        second: usize,
    ) -> KernelResult<()>;

    /// Add a planar face bounded by the given edges
    ///
    /// The edges must chain into a single closed wire.
    fn add_surface(&mut self, shape_index: usize, edge_ids: &[usize]) -> KernelResult<()>;

    /// Add an interpolating spline through the given points
    fn add_spline(&mut self, shape_index: usize, point_ids: &[usize]) -> KernelResult<()>;

    /// Copy edges (with their end vertices) from one shape into another
    ///
    /// Returns the edge ids the copies received in the target shape.
    fn transfer_edges(
        &mut self,
        from_shape: usize,
        edge_ids: &[usize],
        to_shape: usize,
    ) -> KernelResult<Vec<usize>>;

    // ========== Scratch shape ==========

    /// Create an empty scratch shape, replacing any existing one
    ///
    /// Returns the index of the new scratch shape.
    fn begin_scratch_shape(&mut self) -> usize;

    /// Drop the scratch shape; returns false when there was none
    fn end_scratch_shape(&mut self) -> bool;

    /// Check if a scratch shape currently exists
    fn has_scratch_shape(&self) -> bool;

    // ========== Snapshots ==========

    /// Capture the full state of the committed shape
    fn capture_snapshot(&self) -> Self::Snapshot;

    /// Replace the committed shape with a captured state
    fn restore_snapshot(&mut self, snapshot: &Self::Snapshot);

    // ========== Import ==========

    /// Load an initial model into the committed shape
    fn import_model(&mut self, path: &Path) -> KernelResult<()>;
}
