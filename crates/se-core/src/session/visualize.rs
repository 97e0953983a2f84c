//! Previews of constructions before they are committed

use glam::Vec3;
use se_kernel::ModelKernel;
use tracing::{debug, warn};

use super::EditSession;
use crate::error::{EditError, EditResult};
use crate::events::EditorEvent;
use crate::operations::Construction;
use crate::preview::{PointMarker, SegmentProxy};
use crate::tools::ToolKind;

impl<K: ModelKernel> EditSession<K> {
    /// Preview any construction with the channel suited to it
    pub fn visualize(&mut self, construction: &Construction) -> EditResult<()> {
        match construction {
            Construction::Point { position } => self.visualize_add_point(*position).map(|_| ()),
            Construction::Segment { first, second } => {
                self.visualize_add_segment(*first, *second).map(|_| ())
            }
            _ => self.visualize_on_scratch(construction).map(|_| ()),
        }
    }

    /// Show a marker where a point would be added
    pub fn visualize_add_point(&mut self, position: Vec3) -> EditResult<PointMarker> {
        if let Err(e) = (Construction::Point { position }).validate() {
            warn!("Cannot preview point: {}", e);
            self.end_point_visualization();
            return Err(e);
        }
        let marker = PointMarker { position };
        self.preview.set_point(Some(marker));
        self.emit(EditorEvent::RedrawRequested);
        Ok(marker)
    }

    /// Remove the point marker
    pub fn end_point_visualization(&mut self) {
        if self.preview.point().is_some() {
            self.preview.set_point(None);
            self.emit(EditorEvent::RedrawRequested);
        }
    }

    /// Show a proxy spanning two committed points
    pub fn visualize_add_segment(&mut self, first: usize, second: usize) -> EditResult<SegmentProxy> {
        let result = (Construction::Segment { first, second })
            .validate()
            .and_then(|()| {
                let start = self.point_position(first)?;
                let end = self.point_position(second)?;
                SegmentProxy::spanning(start, end, self.config.segment_proxy_thickness).ok_or_else(
                    || EditError::InvalidInput(format!("points {first} and {second} coincide")),
                )
            });

        match result {
            Ok(proxy) => {
                self.preview.set_segment(Some(proxy));
                self.emit(EditorEvent::RedrawRequested);
                Ok(proxy)
            }
            Err(e) => {
                warn!("Cannot preview segment: {}", e);
                self.end_segment_visualization();
                Err(e)
            }
        }
    }

    /// Remove the segment proxy
    pub fn end_segment_visualization(&mut self) {
        if self.preview.segment().is_some() {
            self.preview.set_segment(None);
            self.emit(EditorEvent::RedrawRequested);
        }
    }

    /// Build an arc on the scratch shape; returns the scratch shape index
    pub fn visualize_add_arc(&mut self, first: usize, mid: usize, second: usize) -> EditResult<usize> {
        self.visualize_on_scratch(&Construction::Arc { first, mid, second })
    }

    /// Build a spline on the scratch shape; returns the scratch shape index
    pub fn visualize_add_spline(&mut self, points: &[usize]) -> EditResult<usize> {
        self.visualize_on_scratch(&Construction::Spline {
            points: points.to_vec(),
        })
    }

    /// Build a face on the scratch shape; returns the scratch shape index
    pub fn visualize_add_face(&mut self, curves: &[usize]) -> EditResult<usize> {
        self.visualize_on_scratch(&Construction::Face {
            curves: curves.to_vec(),
        })
    }

    pub fn end_arc_visualization(&mut self) -> bool {
        self.end_scratch_preview_of(ToolKind::Arc)
    }

    pub fn end_spline_visualization(&mut self) -> bool {
        self.end_scratch_preview_of(ToolKind::Spline)
    }

    pub fn end_face_visualization(&mut self) -> bool {
        self.end_scratch_preview_of(ToolKind::Face)
    }

    /// Drop the scratch shape whatever it previews
    ///
    /// Returns false when there was nothing to remove.
    pub fn end_scratch_visualization(&mut self) -> bool {
        self.preview.set_scratch(None);
        if !self.kernel.end_scratch_shape() {
            return false;
        }
        // The removed shape was the last one
        let removed = self.kernel.shape_count();
        debug!("Removed preview shape {}", removed);
        self.invalidate(removed);
        true
    }

    /// Remove every preview
    pub fn end_all_visualizations(&mut self) {
        self.end_point_visualization();
        self.end_segment_visualization();
        self.end_scratch_visualization();
    }

    fn end_scratch_preview_of(&mut self, kind: ToolKind) -> bool {
        match self.preview.scratch() {
            Some(active) if active != kind => {
                debug!("Keeping {} preview while ending {} preview", active, kind);
                false
            }
            _ => self.end_scratch_visualization(),
        }
    }

    /// Replace the scratch shape with a preview of `construction`
    ///
    /// Any failure removes the scratch shape again.
    fn visualize_on_scratch(&mut self, construction: &Construction) -> EditResult<usize> {
        if let Err(e) = construction.validate() {
            warn!("Cannot preview {}: {}", construction.kind(), e);
            return Err(e);
        }
        if matches!(construction, Construction::Point { .. } | Construction::Segment { .. }) {
            return Err(EditError::InvalidInput(format!(
                "{} previews do not use the scratch shape",
                construction.kind()
            )));
        }

        let scratch = self.kernel.begin_scratch_shape();
        self.preview.set_scratch(Some(construction.kind()));
        debug!("Previewing {} on shape {}", construction.kind(), scratch);

        match self.build_on_scratch(construction, scratch) {
            Ok(()) => Ok(scratch),
            Err(e) => {
                warn!("Cannot preview {}: {}", construction.kind(), e);
                self.end_scratch_visualization();
                Err(e)
            }
        }
    }

    fn build_on_scratch(&mut self, construction: &Construction, scratch: usize) -> EditResult<()> {
        let local = match construction {
            Construction::Arc { first, mid, second } => {
                let ids = self.copy_points_to(scratch, &[*first, *mid, *second])?;
                Construction::Arc {
                    first: ids[0],
                    mid: ids[1],
                    second: ids[2],
                }
            }
            Construction::Spline { points } => Construction::Spline {
                points: self.copy_points_to(scratch, points)?,
            },
            Construction::Face { curves } => {
                let curves = self.kernel.transfer_edges(0, curves, scratch)?;
                self.invalidate(scratch);
                Construction::Face { curves }
            }
            Construction::Point { .. } | Construction::Segment { .. } => construction.clone(),
        };
        self.construct(&local, scratch, false)
    }

    /// Copy committed points to the scratch shape
    ///
    /// Returns the scratch-local id of each input id. Repeated inputs map to
    /// the same local point.
    fn copy_points_to(&mut self, scratch: usize, ids: &[usize]) -> EditResult<Vec<usize>> {
        let mut unique: Vec<usize> = Vec::new();
        let mut positions = Vec::new();
        let mut local = Vec::with_capacity(ids.len());
        for &id in ids {
            let slot = match unique.iter().position(|&u| u == id) {
                Some(slot) => slot,
                None => {
                    positions.push(self.point_position(id)?);
                    unique.push(id);
                    unique.len() - 1
                }
            };
            local.push(slot);
        }
        for position in positions {
            self.construct(&Construction::Point { position }, scratch, false)?;
        }
        Ok(local)
    }
}
