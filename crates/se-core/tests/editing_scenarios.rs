use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use glam::Vec3;
use se_core::{
    EditError, EditSession, EditorConfig, EditorEvent, ElementIndex, ElementType, Ray, ToolKind,
};
use se_kernel::{FaceTessellation, KernelError, KernelResult, MemoryKernel, ModelKernel, ShapeData};

fn session_with_points(points: &[Vec3]) -> EditSession<MemoryKernel> {
    let mut session = EditSession::new(MemoryKernel::new(), EditorConfig::default());
    for p in points {
        session.add_point(*p).unwrap();
    }
    session
}

/// Ray straight down onto the XY plane
fn ray_above(point: Vec3) -> Ray {
    Ray::new(point + Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z)
}

#[test]
fn test_pick_select_and_add_segment() {
    let mut session = session_with_points(&[Vec3::ZERO, Vec3::X]);

    let hit = session
        .find_closest(ElementType::Point, &ray_above(Vec3::X), 0.1)
        .unwrap();
    assert_eq!((hit.shape_index, hit.element_id), (0, 1));

    session.select(ElementType::Point, 0, 1, false).unwrap();
    assert_eq!(session.selection().points(), &[1]);
    assert!(session.highlights().is_highlighted(ElementType::Point, 1));

    let curves_before = session.index().shape(0).unwrap().count(ElementType::Curve);
    session.add_segment(0, 1).unwrap();
    assert_eq!(session.history_labels().last(), Some(&"Segment added"));
    assert_eq!(
        session.index().shape(0).unwrap().count(ElementType::Curve),
        curves_before + 1
    );
}

#[test]
fn test_segment_then_undo_restores_index() {
    let points = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(2.0, 3.0, 1.0)];
    for first in 0..points.len() {
        for second in 0..points.len() {
            if first == second {
                continue;
            }
            let mut session = session_with_points(&points);
            let before = session.index().clone();

            session.add_segment(first, second).unwrap();
            assert_ne!(session.index(), &before);
            session.undo().unwrap();
            assert_eq!(session.index(), &before);
        }
    }
}

#[test]
fn test_degenerate_commits_do_not_touch_kernel_or_history() {
    let mut session = session_with_points(&[Vec3::X, Vec3::Y, Vec3::NEG_X]);
    let snapshot = session.kernel().capture_snapshot();
    let labels: Vec<String> = session.history_labels().iter().map(|s| s.to_string()).collect();

    for id in 0..3 {
        assert!(matches!(session.add_segment(id, id), Err(EditError::InvalidInput(_))));
    }
    for (a, b, c) in [(0, 0, 1), (0, 1, 1), (2, 1, 2), (1, 1, 1)] {
        assert!(matches!(session.add_arc(a, b, c), Err(EditError::InvalidInput(_))));
    }

    assert_eq!(session.kernel().capture_snapshot(), snapshot);
    assert_eq!(session.history_labels(), labels);
}

#[test]
fn test_push_after_undo_discards_redo_branch() {
    let mut session = session_with_points(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    session.undo().unwrap();
    session.undo().unwrap();

    session.add_point(Vec3::Z).unwrap();
    assert_eq!(
        session.history_labels(),
        vec!["Initial import", "Point added", "Point added"]
    );
    assert_eq!(session.redo(), Err(EditError::NothingToRedo));
    assert_eq!(session.index().shape(0).unwrap().points.len(), 2);
}

#[test]
fn test_jump_restores_exact_state() {
    let mut session = EditSession::new(MemoryKernel::new(), EditorConfig::default());
    let mut states = vec![session.kernel().capture_snapshot()];
    for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
        session.add_point(p).unwrap();
        states.push(session.kernel().capture_snapshot());
    }
    session.add_segment(0, 1).unwrap();
    states.push(session.kernel().capture_snapshot());

    for i in [2, 0, 4, 1, 3] {
        session.jump_to(i).unwrap();
        assert_eq!(session.history_index(), i);
        assert_eq!(session.kernel().capture_snapshot(), states[i]);
    }
    assert_eq!(session.history().len(), states.len());
}

#[test]
fn test_select_one_type_keeps_only_points() {
    let mut session = session_with_points(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    session.add_segment(0, 1).unwrap();

    session.select(ElementType::Point, 0, 2, false).unwrap();
    session.select_one_type(Some(ElementType::Point));
    assert_eq!(session.selection().points(), &[2]);

    session.select(ElementType::Curve, 0, 0, false).unwrap();
    session.select_one_type(Some(ElementType::Point));
    assert!(session.selection().is_empty());
}

#[test]
fn test_arc_preview_round_trip() {
    let mut session = session_with_points(&[Vec3::X, Vec3::Y, Vec3::NEG_X]);
    let committed = session.kernel().capture_snapshot();

    session.visualize_add_arc(0, 1, 2).unwrap();
    assert_eq!(session.kernel().shape_count(), 2);
    let scratch = session.kernel().shape(1).unwrap();
    assert_eq!(scratch.vertices().len(), 3);
    assert_eq!(scratch.edges().len(), 1);

    session.end_arc_visualization();
    assert_eq!(session.kernel().shape_count(), 1);
    assert_eq!(session.index().shape_count(), 1);
    assert_eq!(session.kernel().capture_snapshot(), committed);
}

#[test]
fn test_tie_break_is_first_in_iteration_order() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

    let tied = session_with_points(&[Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -5.0, 0.0)]);
    let hit = tied.find_closest(ElementType::Point, &ray, 20.0).unwrap();
    assert_eq!(hit.element_id, 0);

    let closer_second =
        session_with_points(&[Vec3::new(0.0, 5.0001, 0.0), Vec3::new(0.0, -5.0, 0.0)]);
    let hit = closer_second.find_closest(ElementType::Point, &ray, 20.0).unwrap();
    assert_eq!(hit.element_id, 1);
}

#[test]
fn test_click_miss_clears_selection() {
    let mut session = session_with_points(&[Vec3::ZERO, Vec3::X]);
    assert!(session.click(&ray_above(Vec3::X), false).is_some());
    assert_eq!(session.selection().points(), &[1]);

    assert!(session.click(&ray_above(Vec3::new(100.0, 100.0, 0.0)), false).is_none());
    assert!(session.selection().is_empty());
}

#[test]
fn test_click_builds_arc_preview_through_tool() {
    let mut session = session_with_points(&[Vec3::X, Vec3::Y, Vec3::NEG_X]);
    session.open_tool(ToolKind::Arc);

    for p in [Vec3::X, Vec3::Y, Vec3::NEG_X] {
        session.click(&ray_above(p), true);
    }
    assert_eq!(session.selection().points(), &[0, 1, 2]);
    assert_eq!(session.kernel().shape_count(), 2);

    session.confirm_tool().unwrap();
    assert_eq!(session.kernel().shape_count(), 1);
    assert_eq!(session.history_labels().last(), Some(&"Arc added"));
    assert_eq!(session.index().shape(0).unwrap().count(ElementType::Curve), 1);
}

#[test]
fn test_face_tool_previews_closed_loop() {
    let mut session = session_with_points(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
        session.add_segment(a, b).unwrap();
    }
    session.open_tool(ToolKind::Face);
    for id in 0..3 {
        session.select(ElementType::Curve, 0, id, true).unwrap();
    }
    assert!(!session.index().shape(1).unwrap().surfaces.is_empty());

    session.confirm_tool().unwrap();
    assert_eq!(session.history_labels().last(), Some(&"Face added"));
    assert!(session.index().contains(0, ElementType::Surface, 0));
    assert_eq!(session.kernel().shape_count(), 1);
}

#[test]
fn test_events_follow_edit_sequence() {
    let mut session = session_with_points(&[Vec3::ZERO]);
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let subscription = session.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    session.add_point(Vec3::X).unwrap();
    assert_eq!(
        *received.borrow(),
        vec![
            EditorEvent::HistoryChanged { current: 2, len: 3 },
            EditorEvent::ShapeInvalidated { shape_index: 0 },
            EditorEvent::RedrawRequested,
        ]
    );

    drop(subscription);
    received.borrow_mut().clear();
    session.add_point(Vec3::Y).unwrap();
    assert!(received.borrow().is_empty());
}

#[test]
fn test_selection_rejects_preview_and_unknown_elements() {
    let mut session = session_with_points(&[Vec3::ZERO]);
    assert_eq!(
        session.select(ElementType::Point, 1, 0, false),
        Err(EditError::NotCommittedShape(1))
    );
    assert!(matches!(
        session.select(ElementType::Surface, 0, 0, false),
        Err(EditError::UnknownElement { .. })
    ));
    assert!(session.selection().is_empty());
}

/// Kernel whose queries fail for every shape but the committed one
struct PreviewQueryFailure(MemoryKernel);

impl ModelKernel for PreviewQueryFailure {
    type Snapshot = ShapeData;

    fn name(&self) -> &str {
        "failing"
    }

    fn shape_count(&self) -> usize {
        self.0.shape_count()
    }

    fn vertices_of(&self, shape_index: usize) -> KernelResult<Vec<Vec3>> {
        self.0.vertices_of(shape_index)
    }

    fn edge_point_pairs_of(&self, shape_index: usize) -> KernelResult<Vec<[Vec3; 2]>> {
        if shape_index > 0 {
            return Err(KernelError::InvalidShapeIndex(shape_index));
        }
        self.0.edge_point_pairs_of(shape_index)
    }

    fn faces_of(&self, shape_index: usize) -> KernelResult<FaceTessellation> {
        self.0.faces_of(shape_index)
    }

    fn add_point(&mut self, shape_index: usize, position: Vec3) -> KernelResult<()> {
        self.0.add_point(shape_index, position)
    }

    fn add_edge(&mut self, shape_index: usize, first: usize, second: usize) -> KernelResult<()> {
        self.0.add_edge(shape_index, first, second)
    }

    fn add_arc(&mut self, shape_index: usize, first: usize, mid: usize, second: usize) -> KernelResult<()> {
        self.0.add_arc(shape_index, first, mid, second)
    }

    fn add_surface(&mut self, shape_index: usize, edge_ids: &[usize]) -> KernelResult<()> {
        self.0.add_surface(shape_index, edge_ids)
    }

    fn add_spline(&mut self, shape_index: usize, point_ids: &[usize]) -> KernelResult<()> {
        self.0.add_spline(shape_index, point_ids)
    }

    fn transfer_edges(&mut self, from_shape: usize, edge_ids: &[usize], to_shape: usize) -> KernelResult<Vec<usize>> {
        self.0.transfer_edges(from_shape, edge_ids, to_shape)
    }

    fn begin_scratch_shape(&mut self) -> usize {
        self.0.begin_scratch_shape()
    }

    fn end_scratch_shape(&mut self) -> bool {
        self.0.end_scratch_shape()
    }

    fn has_scratch_shape(&self) -> bool {
        self.0.has_scratch_shape()
    }

    fn capture_snapshot(&self) -> ShapeData {
        self.0.capture_snapshot()
    }

    fn restore_snapshot(&mut self, snapshot: &ShapeData) {
        self.0.restore_snapshot(snapshot)
    }

    fn import_model(&mut self, path: &Path) -> KernelResult<()> {
        self.0.import_model(path)
    }
}

#[test]
fn test_failing_shape_query_does_not_abort_rebuild() {
    let mut kernel = PreviewQueryFailure(MemoryKernel::new());
    kernel.add_point(0, Vec3::ZERO).unwrap();
    kernel.add_point(0, Vec3::X).unwrap();
    kernel.add_edge(0, 0, 1).unwrap();
    let scratch = kernel.begin_scratch_shape();
    kernel.add_point(scratch, Vec3::Y).unwrap();

    let mut index = ElementIndex::new();
    let stats = index.rebuild(&kernel);
    assert_eq!(stats.failed_shapes, vec![1]);
    assert_eq!(index.shape_count(), 2);
    assert_eq!(index.shape(0).unwrap().count(ElementType::Curve), 1);
    assert_eq!(index.shape(1).unwrap().points.len(), 1);
    assert!(index.shape(1).unwrap().curves.is_empty());
}

#[test]
fn test_session_over_imported_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.ron");
    std::fs::write(
        &path,
        r#"(
            points: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)],
            segments: [(0, 1), (1, 2), (2, 3), (3, 0)],
            faces: [[0, 1, 2, 3]],
        )"#,
    )
    .unwrap();

    let mut kernel = MemoryKernel::new();
    kernel.import_model(&path).unwrap();
    let mut session = EditSession::new(kernel, EditorConfig::default());

    assert_eq!(session.history_labels(), vec!["Initial import"]);
    session.set_selection_mode(ElementType::Surface);
    let hit = session.click(&ray_above(Vec3::new(0.5, 0.5, 0.0)), false).unwrap();
    assert_eq!(hit.element_id, 0);
    assert_eq!(session.selection().surfaces(), &[0]);
}
