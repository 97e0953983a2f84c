//! Construction operations
//!
//! The edits the session can apply to a shape, with the input checks that
//! run before the kernel is touched.

use std::collections::HashSet;

use glam::Vec3;
use se_kernel::{KernelResult, ModelKernel};

use crate::error::{EditError, EditResult};
use crate::tools::ToolKind;

/// A single construction step on one shape
#[derive(Debug, Clone, PartialEq)]
pub enum Construction {
    Point { position: Vec3 },
    Segment { first: usize, second: usize },
    /// Circular arc from `first` through `mid` to `second`
    Arc { first: usize, mid: usize, second: usize },
    Face { curves: Vec<usize> },
    Spline { points: Vec<usize> },
}

impl Construction {
    /// History label recorded when this construction is committed
    pub fn label(&self) -> &'static str {
        match self {
            Construction::Point { .. } => "Point added",
            Construction::Segment { .. } => "Segment added",
            Construction::Arc { .. } => "Arc added",
            Construction::Face { .. } => "Face added",
            Construction::Spline { .. } => "Spline added",
        }
    }

    /// Tool that builds this construction
    pub fn kind(&self) -> ToolKind {
        match self {
            Construction::Point { .. } => ToolKind::Point,
            Construction::Segment { .. } => ToolKind::Segment,
            Construction::Arc { .. } => ToolKind::Arc,
            Construction::Face { .. } => ToolKind::Face,
            Construction::Spline { .. } => ToolKind::Spline,
        }
    }

    /// Check the inputs without consulting the kernel
    pub fn validate(&self) -> EditResult<()> {
        match self {
            Construction::Point { position } => {
                if !position.is_finite() {
                    return Err(EditError::InvalidInput(format!(
                        "point coordinates must be finite, got {position}"
                    )));
                }
            }
            Construction::Segment { first, second } => {
                if first == second {
                    return Err(EditError::InvalidInput(format!(
                        "segment endpoints must differ, got {first} twice"
                    )));
                }
            }
            Construction::Arc { first, mid, second } => {
                if first == mid || mid == second || first == second {
                    return Err(EditError::InvalidInput(format!(
                        "arc needs three distinct points, got {first}, {mid}, {second}"
                    )));
                }
            }
            Construction::Face { curves } => {
                if curves.is_empty() {
                    return Err(EditError::InvalidInput(
                        "face needs at least one curve".to_string(),
                    ));
                }
                let mut seen = HashSet::new();
                if let Some(repeated) = curves.iter().find(|id| !seen.insert(**id)) {
                    return Err(EditError::InvalidInput(format!(
                        "curve {repeated} appears more than once in face boundary"
                    )));
                }
            }
            Construction::Spline { points } => {
                if points.len() < 2 {
                    return Err(EditError::InvalidInput(format!(
                        "spline needs at least 2 points, got {}",
                        points.len()
                    )));
                }
                if let Some(pair) = points.windows(2).find(|pair| pair[0] == pair[1]) {
                    return Err(EditError::InvalidInput(format!(
                        "spline repeats point {} consecutively",
                        pair[0]
                    )));
                }
            }
        }
        Ok(())
    }

    /// Apply this construction to a kernel shape
    pub(crate) fn apply<K: ModelKernel>(&self, kernel: &mut K, shape_index: usize) -> KernelResult<()> {
        match self {
            Construction::Point { position } => kernel.add_point(shape_index, *position),
            Construction::Segment { first, second } => kernel.add_edge(shape_index, *first, *second),
            Construction::Arc { first, mid, second } => {
                kernel.add_arc(shape_index, *first, *mid, *second)
            }
            Construction::Face { curves } => kernel.add_surface(shape_index, curves),
            Construction::Spline { points } => kernel.add_spline(shape_index, points),
        }
    }
}
