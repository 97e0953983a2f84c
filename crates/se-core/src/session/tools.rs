//! Construction tool lifecycle

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use se_kernel::ModelKernel;
use tracing::{debug, info, warn};

use super::EditSession;
use crate::error::{EditError, EditResult};
use crate::events::EditorEvent;
use crate::tools::{ToolKind, ToolSession};

impl<K: ModelKernel> EditSession<K> {
    /// Open a construction tool, closing any other open tool
    ///
    /// Switching between curve tools keeps the selected points.
    pub fn open_tool(&mut self, kind: ToolKind) {
        if let Some(current) = self.active_tool() {
            let keep_selection = current.is_curve_tool() && kind.is_curve_tool();
            self.close_tool(!keep_selection);
        }

        if let Some(mode) = kind.input_type() {
            self.set_selection_mode(mode);
        }

        let dirty = Rc::new(Cell::new(true));
        let subscription = match kind {
            ToolKind::Point => None,
            ToolKind::Segment | ToolKind::Arc | ToolKind::Spline => {
                let flag = Rc::clone(&dirty);
                Some(self.events.subscribe(move |event| {
                    if matches!(event, EditorEvent::PointSelected { .. }) {
                        flag.set(true);
                    }
                }))
            }
            ToolKind::Face => {
                let flag = Rc::clone(&dirty);
                Some(self.events.subscribe(move |event| {
                    if matches!(event, EditorEvent::SelectionChanged) {
                        flag.set(true);
                    }
                }))
            }
        };

        self.tool = Some(ToolSession {
            kind,
            point_input: Vec3::ZERO,
            dirty,
            _subscription: subscription,
        });
        info!("Opened {} tool", kind);
        self.sync_tool();
    }

    /// Close the open tool and remove its preview
    ///
    /// Returns the kind of the closed tool, or `None` if none was open.
    pub fn close_tool(&mut self, clear_selection: bool) -> Option<ToolKind> {
        let tool = self.tool.take()?;
        self.end_tool_preview(tool.kind);
        if clear_selection {
            self.select_one_type(None);
        }
        info!("Closed {} tool", tool.kind);
        Some(tool.kind)
    }

    /// Set the coordinates used by the point tool
    pub fn set_point_input(&mut self, position: Vec3) -> EditResult<()> {
        let tool = self
            .tool
            .as_mut()
            .filter(|tool| tool.kind == ToolKind::Point)
            .ok_or(EditError::NoActiveTool)?;
        tool.point_input = position;
        tool.dirty.set(true);
        self.sync_tool();
        Ok(())
    }

    /// Commit the construction described by the open tool
    ///
    /// The point tool closes afterwards; other tools stay open for the next
    /// construction.
    pub fn confirm_tool(&mut self) -> EditResult<()> {
        let Some((kind, point_input)) = self.tool.as_ref().map(|t| (t.kind, t.point_input)) else {
            warn!("Nothing to confirm: no construction tool is open");
            return Err(EditError::NoActiveTool);
        };
        let Some(construction) = kind.construction(self.selection.sets(), point_input) else {
            warn!("The {} tool needs more selected elements", kind);
            return Err(EditError::InvalidInput(format!(
                "{kind} tool needs more selected elements"
            )));
        };

        self.construct(&construction, 0, true)?;
        self.end_tool_preview(kind);
        if kind == ToolKind::Point {
            self.close_tool(false);
        }
        Ok(())
    }

    pub(super) fn mark_tool_dirty(&self) {
        if let Some(tool) = &self.tool {
            tool.dirty.set(true);
        }
    }

    /// Refresh the open tool's preview if its inputs changed
    pub(super) fn sync_tool(&mut self) {
        let Some(tool) = &self.tool else {
            return;
        };
        if !tool.dirty.replace(false) {
            return;
        }
        let (kind, point_input) = (tool.kind, tool.point_input);

        match kind.construction(self.selection.sets(), point_input) {
            Some(construction) => {
                if let Err(e) = self.visualize(&construction) {
                    debug!("No {} preview: {}", kind, e);
                }
            }
            None => self.end_tool_preview(kind),
        }
    }

    fn end_tool_preview(&mut self, kind: ToolKind) {
        match kind {
            ToolKind::Point => self.end_point_visualization(),
            ToolKind::Segment => self.end_segment_visualization(),
            ToolKind::Arc => {
                self.end_arc_visualization();
            }
            ToolKind::Spline => {
                self.end_spline_visualization();
            }
            ToolKind::Face => {
                self.end_face_visualization();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::element::ElementType;
    use se_kernel::MemoryKernel;

    fn session_with_points(points: &[Vec3]) -> EditSession<MemoryKernel> {
        let mut session = EditSession::new(MemoryKernel::new(), EditorConfig::default());
        for p in points {
            session.add_point(*p).unwrap();
        }
        session
    }

    #[test]
    fn test_segment_tool_previews_on_point_selection() {
        let mut session = session_with_points(&[Vec3::ZERO, Vec3::X]);
        session.open_tool(ToolKind::Segment);
        assert_eq!(session.selection_mode(), ElementType::Point);
        assert_eq!(session.events().listener_count(), 1);

        session.select(ElementType::Point, 0, 0, true).unwrap();
        assert!(session.preview().segment().is_none());
        session.select(ElementType::Point, 0, 1, true).unwrap();
        assert!(session.preview().segment().is_some());

        session.confirm_tool().unwrap();
        assert_eq!(session.history_labels().last(), Some(&"Segment added"));
        assert!(session.preview().segment().is_none());
        assert_eq!(session.active_tool(), Some(ToolKind::Segment));
    }

    #[test]
    fn test_close_tool_unsubscribes_and_clears() {
        let mut session = session_with_points(&[Vec3::ZERO, Vec3::X]);
        session.open_tool(ToolKind::Segment);
        session.select(ElementType::Point, 0, 0, true).unwrap();
        session.select(ElementType::Point, 0, 1, true).unwrap();

        assert_eq!(session.close_tool(true), Some(ToolKind::Segment));
        assert_eq!(session.events().listener_count(), 0);
        assert!(session.selection().is_empty());
        assert!(session.preview().is_empty());
        assert_eq!(session.close_tool(true), None);
    }

    #[test]
    fn test_undo_drops_preview_of_removed_input() {
        let mut session = session_with_points(&[Vec3::X, Vec3::Y, Vec3::NEG_X]);
        session.open_tool(ToolKind::Arc);
        for id in 0..3 {
            session.select(ElementType::Point, 0, id, true).unwrap();
        }
        assert_eq!(session.preview().scratch(), Some(ToolKind::Arc));

        session.undo().unwrap();
        assert_eq!(session.selection().points(), &[0, 1]);
        assert_eq!(session.preview().scratch(), None);
        assert_eq!(session.kernel().shape_count(), 1);
        assert_eq!(session.active_tool(), Some(ToolKind::Arc));

        session.redo().unwrap();
        session.select(ElementType::Point, 0, 2, true).unwrap();
        assert_eq!(session.preview().scratch(), Some(ToolKind::Arc));
    }

    #[test]
    fn test_switching_curve_tools_keeps_points() {
        let mut session = session_with_points(&[Vec3::X, Vec3::Y, Vec3::NEG_X]);
        session.open_tool(ToolKind::Segment);
        for id in 0..3 {
            session.select(ElementType::Point, 0, id, true).unwrap();
        }
        session.open_tool(ToolKind::Arc);

        assert_eq!(session.selection().points(), &[0, 1, 2]);
        assert!(session.preview().segment().is_none());
        assert_eq!(session.preview().scratch(), Some(crate::tools::ToolKind::Arc));
        assert_eq!(session.events().listener_count(), 1);
    }

    #[test]
    fn test_face_tool_switches_to_curve_mode() {
        let mut session = session_with_points(&[Vec3::ZERO, Vec3::X]);
        session.open_tool(ToolKind::Segment);
        session.select(ElementType::Point, 0, 0, false).unwrap();
        session.open_tool(ToolKind::Face);
        assert_eq!(session.selection_mode(), ElementType::Curve);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_point_tool_confirm_closes() {
        let mut session = session_with_points(&[]);
        session.open_tool(ToolKind::Point);
        session.set_point_input(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(
            session.preview().point().map(|m| m.position),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );

        session.confirm_tool().unwrap();
        assert_eq!(session.active_tool(), None);
        assert!(session.preview().point().is_none());
        assert_eq!(session.index().point_position(0, 0), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_confirm_without_tool() {
        let mut session = session_with_points(&[]);
        assert_eq!(session.confirm_tool(), Err(EditError::NoActiveTool));
        assert_eq!(session.set_point_input(Vec3::ONE), Err(EditError::NoActiveTool));
    }

    #[test]
    fn test_confirm_with_missing_inputs() {
        let mut session = session_with_points(&[Vec3::ZERO]);
        session.open_tool(ToolKind::Arc);
        session.select(ElementType::Point, 0, 0, true).unwrap();
        assert!(matches!(session.confirm_tool(), Err(EditError::InvalidInput(_))));
        assert_eq!(session.history().len(), 2);
    }
}
