//! Construction tools
//!
//! An open tool turns the current selection into a construction, keeps a
//! preview of it up to date and commits it on confirm.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;

use crate::element::ElementType;
use crate::events::Subscription;
use crate::operations::Construction;
use crate::selection::SelectionSets;

/// Kind of construction tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Point,
    Segment,
    Arc,
    Spline,
    Face,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Point,
        ToolKind::Segment,
        ToolKind::Arc,
        ToolKind::Spline,
        ToolKind::Face,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Point => "point",
            ToolKind::Segment => "segment",
            ToolKind::Arc => "arc",
            ToolKind::Spline => "spline",
            ToolKind::Face => "face",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Tools that build a curve from selected points
    pub fn is_curve_tool(&self) -> bool {
        matches!(self, ToolKind::Segment | ToolKind::Arc | ToolKind::Spline)
    }

    /// Selection mode the tool picks its inputs with
    pub fn input_type(&self) -> Option<ElementType> {
        match self {
            ToolKind::Point => None,
            ToolKind::Segment | ToolKind::Arc | ToolKind::Spline => Some(ElementType::Point),
            ToolKind::Face => Some(ElementType::Curve),
        }
    }

    /// Build the construction described by the current inputs
    ///
    /// Returns `None` while there are not enough inputs yet. Segment and arc
    /// use the first selected points in selection order.
    pub fn construction(&self, selection: &SelectionSets, point_input: Vec3) -> Option<Construction> {
        let points = selection.points();
        match self {
            ToolKind::Point => Some(Construction::Point {
                position: point_input,
            }),
            ToolKind::Segment => match points {
                [first, second, ..] => Some(Construction::Segment {
                    first: *first,
                    second: *second,
                }),
                _ => None,
            },
            ToolKind::Arc => match points {
                [first, mid, second, ..] => Some(Construction::Arc {
                    first: *first,
                    mid: *mid,
                    second: *second,
                }),
                _ => None,
            },
            ToolKind::Spline => (points.len() >= 2).then(|| Construction::Spline {
                points: points.to_vec(),
            }),
            ToolKind::Face => (!selection.curves().is_empty()).then(|| Construction::Face {
                curves: selection.curves().to_vec(),
            }),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An open construction tool
#[derive(Debug)]
pub(crate) struct ToolSession {
    pub kind: ToolKind,
    /// Coordinates entered for the point tool
    pub point_input: Vec3,
    /// Set by the selection listener, cleared when the preview is refreshed
    pub dirty: Rc<Cell<bool>>,
    /// Keeps the selection listener registered while the tool is open
    pub _subscription: Option<Subscription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("Arc"), Some(ToolKind::Arc));
        assert_eq!(ToolKind::from_name("circle"), None);
    }

    #[test]
    fn test_segment_needs_two_points() {
        let mut selection = SelectionSets::new();
        selection.select(ElementType::Point, 4, false, false);
        assert_eq!(ToolKind::Segment.construction(&selection, Vec3::ZERO), None);

        selection.select(ElementType::Point, 7, true, false);
        assert_eq!(
            ToolKind::Segment.construction(&selection, Vec3::ZERO),
            Some(Construction::Segment { first: 4, second: 7 })
        );
    }

    #[test]
    fn test_arc_uses_first_three_points() {
        let mut selection = SelectionSets::new();
        for id in [0, 2, 1, 5] {
            selection.select(ElementType::Point, id, true, false);
        }
        assert_eq!(
            ToolKind::Arc.construction(&selection, Vec3::ZERO),
            Some(Construction::Arc { first: 0, mid: 2, second: 1 })
        );
    }

    #[test]
    fn test_face_uses_selected_curves() {
        let mut selection = SelectionSets::new();
        assert_eq!(ToolKind::Face.construction(&selection, Vec3::ZERO), None);
        selection.select(ElementType::Curve, 1, true, false);
        selection.select(ElementType::Curve, 2, true, false);
        assert_eq!(
            ToolKind::Face.construction(&selection, Vec3::ZERO),
            Some(Construction::Face { curves: vec![1, 2] })
        );
    }

    #[test]
    fn test_point_tool_uses_entered_coordinates() {
        let selection = SelectionSets::new();
        assert_eq!(
            ToolKind::Point.construction(&selection, Vec3::new(1.0, 2.0, 3.0)),
            Some(Construction::Point {
                position: Vec3::new(1.0, 2.0, 3.0)
            })
        );
    }
}
