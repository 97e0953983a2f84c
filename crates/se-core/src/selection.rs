//! Spatial selection
//!
//! Nearest-element search against a picking ray, and the per-type
//! selection sets that reference committed-shape elements.

use crate::config::EditorConfig;
use crate::element::{ElementIndex, ElementType};
use crate::picking::{Ray, distance_to_line, ray_triangle_intersection, segment_distance};

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub shape_index: usize,
    pub element_id: usize,
    pub element_type: ElementType,
    /// Metric value of the winning element
    pub distance: f32,
}

/// Constants the picking metrics depend on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickSettings {
    /// Length of the ray segment sampled by the point and curve metrics
    pub ray_length: f32,
    /// Parallel-ray rejection threshold for surfaces
    pub surface_epsilon: f32,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for PickSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            ray_length: config.ray_length,
            surface_epsilon: config.surface_epsilon,
        }
    }
}

/// Selected element ids per type, all referring to shape 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSets {
    points: Vec<usize>,
    curves: Vec<usize>,
    surfaces: Vec<usize>,
}

impl SelectionSets {
    /// Create empty selection sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids of one type, in selection order
    pub fn get(&self, element_type: ElementType) -> &[usize] {
        match element_type {
            ElementType::Point => &self.points,
            ElementType::Curve => &self.curves,
            ElementType::Surface => &self.surfaces,
        }
    }

    fn get_mut(&mut self, element_type: ElementType) -> &mut Vec<usize> {
        match element_type {
            ElementType::Point => &mut self.points,
            ElementType::Curve => &mut self.curves,
            ElementType::Surface => &mut self.surfaces,
        }
    }

    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn curves(&self) -> &[usize] {
        &self.curves
    }

    pub fn surfaces(&self) -> &[usize] {
        &self.surfaces
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.curves.is_empty() && self.surfaces.is_empty()
    }

    /// Check if an element is selected
    pub fn contains(&self, element_type: ElementType, element_id: usize) -> bool {
        self.get(element_type).contains(&element_id)
    }

    /// Add an element to the selection
    ///
    /// Without `multi_select` the set for `element_type` is replaced by the
    /// single id; with it the id is appended (skipped if already present and
    /// `dedup` is set). Sets of the other types are cleared either way.
    pub fn select(&mut self, element_type: ElementType, element_id: usize, multi_select: bool, dedup: bool) {
        let set = self.get_mut(element_type);
        if multi_select {
            if !(dedup && set.contains(&element_id)) {
                set.push(element_id);
            }
        } else {
            set.clear();
            set.push(element_id);
        }
        self.select_one_type(Some(element_type));
    }

    /// Remove every occurrence of an element; returns true if it was selected
    pub fn deselect(&mut self, element_type: ElementType, element_id: usize) -> bool {
        let set = self.get_mut(element_type);
        let before = set.len();
        set.retain(|&id| id != element_id);
        set.len() != before
    }

    /// Clear every set except the one for `except`
    pub fn select_one_type(&mut self, except: Option<ElementType>) {
        for element_type in ElementType::ALL {
            if Some(element_type) != except {
                self.get_mut(element_type).clear();
            }
        }
    }

    /// Clear every set
    pub fn clear(&mut self) {
        self.select_one_type(None);
    }

    /// Drop ids that no longer exist in shape 0; returns true if anything changed
    pub fn retain_existing(&mut self, index: &ElementIndex) -> bool {
        let mut changed = false;
        for element_type in ElementType::ALL {
            let set = self.get_mut(element_type);
            let before = set.len();
            set.retain(|&id| index.contains(0, element_type, id));
            changed |= set.len() != before;
        }
        changed
    }
}

/// Nearest-element search plus the current selection state
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    sets: SelectionSets,
    mode: ElementType,
    settings: PickSettings,
    dedup: bool,
}

impl SelectionEngine {
    /// Create an engine with the given picking settings
    pub fn new(settings: PickSettings, dedup: bool) -> Self {
        Self {
            sets: SelectionSets::new(),
            mode: ElementType::Point,
            settings,
            dedup,
        }
    }

    /// Create an engine from the editor configuration
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(PickSettings::from(config), config.dedup_multi_select)
    }

    pub fn sets(&self) -> &SelectionSets {
        &self.sets
    }

    pub fn settings(&self) -> &PickSettings {
        &self.settings
    }

    /// Element type picked by cursor clicks
    pub fn mode(&self) -> ElementType {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ElementType) {
        self.mode = mode;
    }

    /// Find the element of `element_type` closest to the ray
    ///
    /// Scans every shape. Ties keep the first element in shape then element
    /// order. Returns `None` when nothing is closer than `margin`.
    pub fn find_closest(
        &self,
        index: &ElementIndex,
        element_type: ElementType,
        ray: &Ray,
        margin: f32,
    ) -> Option<PickHit> {
        if ray.is_degenerate() {
            return None;
        }
        let near = ray.origin;
        let far = ray.at(self.settings.ray_length);

        let mut best: Option<(usize, usize, f32)> = None;
        let mut consider = |shape_index: usize, element_id: usize, distance: f32| {
            if best.is_none_or(|(_, _, min)| distance < min) {
                best = Some((shape_index, element_id, distance));
            }
        };

        for (shape_index, shape) in index.shapes().iter().enumerate() {
            match element_type {
                ElementType::Point => {
                    for point in &shape.points {
                        consider(
                            shape_index,
                            point.element_id,
                            distance_to_line(near, far, point.position),
                        );
                    }
                }
                ElementType::Curve => {
                    for curve in &shape.curves {
                        consider(
                            shape_index,
                            curve.element_id,
                            segment_distance(near, far, curve.start, curve.end),
                        );
                    }
                }
                ElementType::Surface => {
                    // Parameter is measured in ray lengths, like the other metrics' sampling
                    let direction = ray.direction * self.settings.ray_length;
                    for surface in &shape.surfaces {
                        if let Some(t) = ray_triangle_intersection(
                            near,
                            direction,
                            surface.vertex1,
                            surface.vertex2,
                            surface.vertex3,
                            self.settings.surface_epsilon,
                        ) {
                            consider(shape_index, surface.element_id, t);
                        }
                    }
                }
            }
        }

        let (shape_index, element_id, distance) = best?;
        (distance <= margin).then_some(PickHit {
            shape_index,
            element_id,
            element_type,
            distance,
        })
    }

    /// Add an element to the selection; see [`SelectionSets::select`]
    pub fn select(&mut self, element_type: ElementType, element_id: usize, multi_select: bool) {
        self.sets.select(element_type, element_id, multi_select, self.dedup);
    }

    /// Remove an element from the selection
    pub fn deselect(&mut self, element_type: ElementType, element_id: usize) -> bool {
        self.sets.deselect(element_type, element_id)
    }

    /// Clear every set except the one for `except`
    pub fn select_one_type(&mut self, except: Option<ElementType>) {
        self.sets.select_one_type(except);
    }

    /// Drop selected ids missing from the index
    pub fn retain_existing(&mut self, index: &ElementIndex) -> bool {
        self.sets.retain_existing(index)
    }
}
