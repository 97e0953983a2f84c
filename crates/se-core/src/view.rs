//! Display state
//!
//! Highlight masks derived from the selection, and per-layer visibility.

use tracing::warn;

use crate::element::ElementType;
use crate::selection::SelectionSets;

/// Per-element highlight flags for shape 0
///
/// Each mask has a fixed capacity; ids at or beyond it are never
/// highlighted.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightMasks {
    points: Vec<bool>,
    curves: Vec<bool>,
    surfaces: Vec<bool>,
    /// Render selected elements with the multi-select style
    pub multi_select: bool,
}

impl Default for HighlightMasks {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl HighlightMasks {
    /// Create cleared masks with `capacity` slots per type
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: vec![false; capacity],
            curves: vec![false; capacity],
            surfaces: vec![false; capacity],
            multi_select: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Get the mask for one element type
    pub fn mask(&self, element_type: ElementType) -> &[bool] {
        match element_type {
            ElementType::Point => &self.points,
            ElementType::Curve => &self.curves,
            ElementType::Surface => &self.surfaces,
        }
    }

    /// Check whether an element is highlighted
    pub fn is_highlighted(&self, element_type: ElementType, element_id: usize) -> bool {
        self.mask(element_type)
            .get(element_id)
            .copied()
            .unwrap_or(false)
    }

    /// Recompute every mask from the selection sets
    pub fn refresh(&mut self, selection: &SelectionSets) {
        for element_type in ElementType::ALL {
            let mask = match element_type {
                ElementType::Point => &mut self.points,
                ElementType::Curve => &mut self.curves,
                ElementType::Surface => &mut self.surfaces,
            };
            let capacity = mask.len();
            mask.fill(false);
            for &id in selection.get(element_type) {
                match mask.get_mut(id) {
                    Some(slot) => *slot = true,
                    None => warn!(
                        "Cannot highlight {} {}: beyond highlight capacity {}",
                        element_type, id, capacity
                    ),
                }
            }
        }
    }
}

/// Independently toggled display layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Imported reference mesh
    Mesh,
    Surfaces,
    Edges,
    Points,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Mesh, Layer::Surfaces, Layer::Edges, Layer::Points];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Mesh => "mesh",
            Layer::Surfaces => "surfaces",
            Layer::Edges => "edges",
            Layer::Points => "points",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(name))
    }
}

/// Visibility of each display layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub mesh: bool,
    pub surfaces: bool,
    pub edges: bool,
    pub points: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            mesh: false,
            surfaces: true,
            edges: true,
            points: true,
        }
    }
}

impl Visibility {
    pub fn is_visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Mesh => self.mesh,
            Layer::Surfaces => self.surfaces,
            Layer::Edges => self.edges,
            Layer::Points => self.points,
        }
    }

    /// Flip a layer and return its new visibility
    pub fn toggle(&mut self, layer: Layer) -> bool {
        let flag = match layer {
            Layer::Mesh => &mut self.mesh,
            Layer::Surfaces => &mut self.surfaces,
            Layer::Edges => &mut self.edges,
            Layer::Points => &mut self.points,
        };
        *flag = !*flag;
        *flag
    }
}
