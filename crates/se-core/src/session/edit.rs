//! Committing constructions

use glam::Vec3;
use se_kernel::ModelKernel;
use tracing::{info, warn};

use super::EditSession;
use crate::error::{EditError, EditResult};
use crate::events::EditorEvent;
use crate::operations::Construction;

impl<K: ModelKernel> EditSession<K> {
    /// Apply a construction to a shape
    ///
    /// Both commits and previews go through here: commits target shape 0
    /// with `save_state` set, previews target the scratch shape without it.
    /// On error nothing is changed.
    pub fn construct(
        &mut self,
        construction: &Construction,
        shape_index: usize,
        save_state: bool,
    ) -> EditResult<()> {
        if let Err(e) = construction.validate() {
            warn!("Rejected {}: {}", construction.kind(), e);
            return Err(e);
        }
        if save_state && shape_index != 0 {
            warn!("Refusing to record history for shape {}", shape_index);
            return Err(EditError::InvalidInput(format!(
                "history only records the committed shape, got shape {shape_index}"
            )));
        }

        if let Err(e) = construction.apply(&mut self.kernel, shape_index) {
            warn!("Kernel rejected {} on shape {}: {}", construction.kind(), shape_index, e);
            return Err(e.into());
        }

        if save_state {
            self.record(construction.label());
        }
        self.invalidate(shape_index);
        Ok(())
    }

    /// Add a standalone point to the model
    pub fn add_point(&mut self, position: Vec3) -> EditResult<()> {
        self.construct(&Construction::Point { position }, 0, true)
    }

    /// Add a straight segment between two points
    pub fn add_segment(&mut self, first: usize, second: usize) -> EditResult<()> {
        self.construct(&Construction::Segment { first, second }, 0, true)
    }

    /// Add a circular arc from `first` through `mid` to `second`
    pub fn add_arc(&mut self, first: usize, mid: usize, second: usize) -> EditResult<()> {
        self.construct(&Construction::Arc { first, mid, second }, 0, true)
    }

    /// Add a face bounded by a closed loop of curves
    pub fn add_face(&mut self, curves: &[usize]) -> EditResult<()> {
        self.construct(
            &Construction::Face {
                curves: curves.to_vec(),
            },
            0,
            true,
        )
    }

    /// Add a spline through points in order
    pub fn add_spline(&mut self, points: &[usize]) -> EditResult<()> {
        self.construct(
            &Construction::Spline {
                points: points.to_vec(),
            },
            0,
            true,
        )
    }

    fn record(&mut self, label: &str) {
        let snapshot = self.kernel.capture_snapshot();
        let index = self.history.push(label, snapshot);
        info!("{} (history entry {})", label, index);
        self.emit(EditorEvent::HistoryChanged {
            current: index,
            len: self.history.len(),
        });
    }
}
