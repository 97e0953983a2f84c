//! Editing session
//!
//! [`EditSession`] owns the kernel together with everything derived from
//! it: the element index, selection, previews, history and display state.
//! Every mutation goes through the session so that those stay consistent.

mod edit;
mod navigate;
mod tools;
mod visualize;

use glam::Vec3;
use se_kernel::ModelKernel;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::element::{ElementIndex, ElementType};
use crate::error::{EditError, EditResult};
use crate::events::{EditorEvent, EventBus, Subscription};
use crate::history::{HistoryManager, TimelineRow};
use crate::picking::Ray;
use crate::preview::PreviewChannel;
use crate::selection::{PickHit, SelectionEngine, SelectionSets};
use crate::tools::{ToolKind, ToolSession};
use crate::view::{HighlightMasks, Layer, Visibility};

/// Interactive editing state over a kernel
pub struct EditSession<K: ModelKernel> {
    kernel: K,
    config: EditorConfig,
    index: ElementIndex,
    selection: SelectionEngine,
    preview: PreviewChannel,
    history: HistoryManager<K::Snapshot>,
    events: EventBus,
    highlights: HighlightMasks,
    visibility: Visibility,
    tool: Option<ToolSession>,
}

impl<K: ModelKernel> EditSession<K> {
    /// Start a session over a kernel that already holds the initial model
    ///
    /// The initial state is recorded as the first history entry.
    pub fn new(kernel: K, config: EditorConfig) -> Self {
        let index = ElementIndex::from_kernel(&kernel);
        let mut history = HistoryManager::new();
        history.push(config.initial_label.clone(), kernel.capture_snapshot());

        info!(
            "Editing session started on {} kernel ({} points, {} curves, {} surfaces)",
            kernel.name(),
            index.shape(0).map_or(0, |s| s.count(ElementType::Point)),
            index.shape(0).map_or(0, |s| s.count(ElementType::Curve)),
            index.shape(0).map_or(0, |s| s.count(ElementType::Surface)),
        );

        Self {
            selection: SelectionEngine::from_config(&config),
            highlights: HighlightMasks::with_capacity(config.highlight_capacity),
            kernel,
            config,
            index,
            preview: PreviewChannel::new(),
            history,
            events: EventBus::new(),
            visibility: Visibility::default(),
            tool: None,
        }
    }

    // ========== Queries ==========

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn index(&self) -> &ElementIndex {
        &self.index
    }

    pub fn selection(&self) -> &SelectionSets {
        self.selection.sets()
    }

    /// Element type picked by [`Self::click`]
    pub fn selection_mode(&self) -> ElementType {
        self.selection.mode()
    }

    pub fn preview(&self) -> &PreviewChannel {
        &self.preview
    }

    pub fn history(&self) -> &HistoryManager<K::Snapshot> {
        &self.history
    }

    pub fn history_labels(&self) -> Vec<&str> {
        self.history.labels()
    }

    /// Index of the history entry the model currently matches
    pub fn history_index(&self) -> usize {
        self.history.current().unwrap_or(0)
    }

    pub fn timeline(&self) -> Vec<TimelineRow<'_>> {
        self.history.timeline()
    }

    pub fn highlights(&self) -> &HighlightMasks {
        &self.highlights
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tool.as_ref().map(|tool| tool.kind)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a callback for session events
    #[must_use = "the callback is unregistered when the subscription is dropped"]
    pub fn subscribe(&self, listener: impl FnMut(&EditorEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    // ========== Selection ==========

    /// Find the element of `element_type` nearest to the ray across all shapes
    pub fn find_closest(&self, element_type: ElementType, ray: &Ray, margin: f32) -> Option<PickHit> {
        self.selection.find_closest(&self.index, element_type, ray, margin)
    }

    /// Select an element of the committed shape
    pub fn select(
        &mut self,
        element_type: ElementType,
        shape_index: usize,
        element_id: usize,
        multi_select: bool,
    ) -> EditResult<()> {
        if shape_index != 0 {
            warn!("Ignoring selection of {} {} in shape {}", element_type, element_id, shape_index);
            return Err(EditError::NotCommittedShape(shape_index));
        }
        if !self.index.contains(0, element_type, element_id) {
            warn!("Cannot select unknown {} {}", element_type, element_id);
            return Err(EditError::UnknownElement {
                element_type,
                shape_index,
                element_id,
            });
        }

        self.selection.select(element_type, element_id, multi_select);
        debug!(
            "Selected {} {} (multi: {}): {:?}",
            element_type,
            element_id,
            multi_select,
            self.selection.sets().get(element_type)
        );
        self.selection_changed();
        if element_type == ElementType::Point {
            self.emit(EditorEvent::PointSelected { element_id });
        }
        self.sync_tool();
        Ok(())
    }

    /// Remove an element from the selection; returns true if it was selected
    pub fn deselect(&mut self, element_type: ElementType, element_id: usize) -> bool {
        let removed = self.selection.deselect(element_type, element_id);
        if removed {
            self.selection_changed();
            self.mark_tool_dirty();
            self.sync_tool();
        }
        removed
    }

    /// Clear every selection set except `except`
    ///
    /// Highlights are refreshed even when nothing was selected.
    pub fn select_one_type(&mut self, except: Option<ElementType>) {
        self.selection.select_one_type(except);
        self.selection_changed();
        self.mark_tool_dirty();
        self.sync_tool();
    }

    /// Change the element type picked by clicks
    pub fn set_selection_mode(&mut self, mode: ElementType) {
        if self.selection.mode() != mode {
            self.selection.set_mode(mode);
            debug!("Selection mode set to {}", mode);
            self.emit(EditorEvent::ModeChanged { mode });
        }
    }

    /// Pick with the current selection mode and update the selection
    ///
    /// A miss clears the whole selection. A hit on the scratch shape is
    /// reported but not selected.
    pub fn click(&mut self, ray: &Ray, multi_select: bool) -> Option<PickHit> {
        let mode = self.selection.mode();
        let hit = self.find_closest(mode, ray, self.config.pick_margin);
        match hit {
            Some(hit) if hit.shape_index == 0 => {
                if let Err(e) = self.select(mode, 0, hit.element_id, multi_select) {
                    warn!("Pick could not be selected: {}", e);
                }
            }
            Some(hit) => {
                debug!(
                    "Picked {} {} on preview shape {}",
                    mode, hit.element_id, hit.shape_index
                );
            }
            None => {
                debug!("Pick missed, clearing selection");
                self.select_one_type(None);
            }
        }
        hit
    }

    // ========== Display ==========

    /// Switch highlighting between single and multi-select styles
    pub fn set_multi_select_highlighting(&mut self, enabled: bool) {
        if self.highlights.multi_select != enabled {
            self.highlights.multi_select = enabled;
            self.emit(EditorEvent::RedrawRequested);
        }
    }

    /// Flip the visibility of a layer and return the new state
    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        let visible = self.visibility.toggle(layer);
        debug!("{} layer {}", layer.name(), if visible { "shown" } else { "hidden" });
        self.emit(EditorEvent::RedrawRequested);
        visible
    }

    // ========== Internals ==========

    fn emit(&self, event: EditorEvent) {
        self.events.emit(&event);
    }

    fn selection_changed(&mut self) {
        self.highlights.refresh(self.selection.sets());
        self.emit(EditorEvent::SelectionChanged);
        self.emit(EditorEvent::RedrawRequested);
    }

    /// Re-index after a kernel change to `shape_index`
    fn invalidate(&mut self, shape_index: usize) {
        let stats = self.index.rebuild(&self.kernel);
        debug!(
            "Rebuilt element index after change to shape {}: {} shapes, {} points, {} curve segments, {} triangles",
            shape_index, stats.shapes, stats.points, stats.curves, stats.surfaces
        );
        if self.selection.retain_existing(&self.index) {
            debug!("Dropped selected elements that no longer exist");
            self.highlights.refresh(self.selection.sets());
            self.emit(EditorEvent::SelectionChanged);
            self.mark_tool_dirty();
            self.sync_tool();
        } else {
            self.highlights.refresh(self.selection.sets());
        }
        self.emit(EditorEvent::ShapeInvalidated { shape_index });
        self.emit(EditorEvent::RedrawRequested);
    }

    fn point_position(&self, element_id: usize) -> EditResult<Vec3> {
        self.index
            .point_position(0, element_id)
            .ok_or(EditError::UnknownElement {
                element_type: ElementType::Point,
                shape_index: 0,
                element_id,
            })
    }
}
