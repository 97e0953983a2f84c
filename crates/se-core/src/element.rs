//! Element index
//!
//! Flat per-shape lists of pickable elements, rebuilt from kernel queries
//! after every mutation. Element ids follow kernel enumeration order and are
//! only meaningful until the next rebuild.

use std::fmt;

use glam::Vec3;
use se_kernel::{CURVE_SEGMENTS, ModelKernel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Kind of pickable element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementType {
    #[default]
    Point,
    Curve,
    Surface,
}

impl ElementType {
    /// All element types in picking order
    pub const ALL: [ElementType; 3] = [ElementType::Point, ElementType::Curve, ElementType::Surface];

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Point => "point",
            ElementType::Curve => "curve",
            ElementType::Surface => "surface",
        }
    }

    /// Parse a display name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "point" | "points" => Some(ElementType::Point),
            "curve" | "curves" => Some(ElementType::Curve),
            "surface" | "surfaces" | "face" | "faces" => Some(ElementType::Surface),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A vertex of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vec3,
    pub element_id: usize,
}

/// One tessellation segment of an edge
///
/// Every edge contributes [`CURVE_SEGMENTS`] records sharing its element id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub start: Vec3,
    pub end: Vec3,
    pub element_id: usize,
}

/// One triangle of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub vertex1: Vec3,
    pub vertex2: Vec3,
    pub vertex3: Vec3,
    pub element_id: usize,
}

/// Pickable elements of one shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeElements {
    pub points: Vec<Point>,
    pub curves: Vec<Curve>,
    pub surfaces: Vec<Surface>,
}

impl ShapeElements {
    /// Check whether an element with this id exists
    pub fn contains(&self, element_type: ElementType, element_id: usize) -> bool {
        match element_type {
            ElementType::Point => self.points.iter().any(|p| p.element_id == element_id),
            ElementType::Curve => self.curves.iter().any(|c| c.element_id == element_id),
            ElementType::Surface => self.surfaces.iter().any(|s| s.element_id == element_id),
        }
    }

    /// Number of distinct element ids of a type
    pub fn count(&self, element_type: ElementType) -> usize {
        let last = match element_type {
            ElementType::Point => self.points.last().map(|p| p.element_id),
            ElementType::Curve => self.curves.last().map(|c| c.element_id),
            ElementType::Surface => self.surfaces.last().map(|s| s.element_id),
        };
        last.map_or(0, |id| id + 1)
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty() && self.curves.is_empty() && self.surfaces.is_empty()
    }
}

/// Summary of one rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub shapes: usize,
    pub points: usize,
    pub curves: usize,
    pub surfaces: usize,
    /// Shapes for which at least one kernel query failed
    pub failed_shapes: Vec<usize>,
}

/// Element lists for every shape the kernel holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementIndex {
    shapes: Vec<ShapeElements>,
}

impl ElementIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from the kernel's current state
    pub fn from_kernel<K: ModelKernel>(kernel: &K) -> Self {
        let mut index = Self::new();
        index.rebuild(kernel);
        index
    }

    /// Re-query every shape and replace the index contents
    ///
    /// The index always ends up with exactly `kernel.shape_count()` entries.
    /// A failing query leaves the corresponding list empty.
    pub fn rebuild<K: ModelKernel>(&mut self, kernel: &K) -> RebuildStats {
        let shape_count = kernel.shape_count();
        let mut stats = RebuildStats {
            shapes: shape_count,
            ..Default::default()
        };

        self.shapes.clear();
        self.shapes.resize_with(shape_count, ShapeElements::default);

        for (shape_index, elements) in self.shapes.iter_mut().enumerate() {
            let mut failed = false;

            match kernel.vertices_of(shape_index) {
                Ok(vertices) => {
                    elements.points = vertices
                        .into_iter()
                        .enumerate()
                        .map(|(element_id, position)| Point {
                            position,
                            element_id,
                        })
                        .collect();
                }
                Err(e) => {
                    warn!("Skipping points of shape {}: {}", shape_index, e);
                    failed = true;
                }
            }

            match kernel.edge_point_pairs_of(shape_index) {
                Ok(pairs) => {
                    elements.curves = pairs
                        .into_iter()
                        .enumerate()
                        .map(|(i, [start, end])| Curve {
                            start,
                            end,
                            element_id: i / CURVE_SEGMENTS,
                        })
                        .collect();
                }
                Err(e) => {
                    warn!("Skipping curves of shape {}: {}", shape_index, e);
                    failed = true;
                }
            }

            match kernel.faces_of(shape_index) {
                Ok(tessellation) => {
                    if tessellation.face_ids.len() != tessellation.triangles.len() {
                        warn!(
                            "Shape {} reported {} triangles but {} face ids",
                            shape_index,
                            tessellation.triangles.len(),
                            tessellation.face_ids.len()
                        );
                    }
                    elements.surfaces = tessellation
                        .triangles
                        .into_iter()
                        .zip(tessellation.face_ids)
                        .map(|([vertex1, vertex2, vertex3], element_id)| Surface {
                            vertex1,
                            vertex2,
                            vertex3,
                            element_id,
                        })
                        .collect();
                }
                Err(e) => {
                    warn!("Skipping surfaces of shape {}: {}", shape_index, e);
                    failed = true;
                }
            }

            if failed {
                stats.failed_shapes.push(shape_index);
            } else if elements.is_empty() {
                debug!("Shape {} has no elements", shape_index);
            }

            stats.points += elements.points.len();
            stats.curves += elements.curves.len();
            stats.surfaces += elements.surfaces.len();
        }

        stats
    }

    /// Number of shapes in the index
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Get the elements of one shape
    pub fn shape(&self, shape_index: usize) -> Option<&ShapeElements> {
        self.shapes.get(shape_index)
    }

    /// Get the elements of every shape
    pub fn shapes(&self) -> &[ShapeElements] {
        &self.shapes
    }

    /// Get the position of a point
    pub fn point_position(&self, shape_index: usize, element_id: usize) -> Option<Vec3> {
        self.shape(shape_index)?
            .points
            .iter()
            .find(|p| p.element_id == element_id)
            .map(|p| p.position)
    }

    /// Check whether an element exists
    pub fn contains(&self, shape_index: usize, element_type: ElementType, element_id: usize) -> bool {
        self.shape(shape_index)
            .is_some_and(|shape| shape.contains(element_type, element_id))
    }
}
