//! Moving through the undo history

use std::fmt;

use se_kernel::ModelKernel;
use tracing::{info, warn};

use super::EditSession;
use crate::error::EditResult;
use crate::events::EditorEvent;

#[derive(Debug, Clone, Copy)]
enum HistoryStep {
    Undo,
    Redo,
    Jump(usize),
}

impl fmt::Display for HistoryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryStep::Undo => f.write_str("undo"),
            HistoryStep::Redo => f.write_str("redo"),
            HistoryStep::Jump(index) => write!(f, "jump to entry {index}"),
        }
    }
}

impl<K: ModelKernel> EditSession<K> {
    /// Restore the previous history entry
    pub fn undo(&mut self) -> EditResult<()> {
        self.step_history(HistoryStep::Undo)
    }

    /// Restore the next history entry
    pub fn redo(&mut self) -> EditResult<()> {
        self.step_history(HistoryStep::Redo)
    }

    /// Restore an arbitrary history entry, keeping later entries for redo
    pub fn jump_to(&mut self, index: usize) -> EditResult<()> {
        self.step_history(HistoryStep::Jump(index))
    }

    fn step_history(&mut self, step: HistoryStep) -> EditResult<()> {
        let result = match step {
            HistoryStep::Undo => self.history.undo(),
            HistoryStep::Redo => self.history.redo(),
            HistoryStep::Jump(index) => self.history.jump_to(index),
        };
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Cannot {}: {}", step, e);
                return Err(e);
            }
        };
        self.kernel.restore_snapshot(snapshot);

        let current = self.history_index();
        info!(
            "Restored history entry {} ({})",
            current,
            self.history.get(current).map_or("", |entry| entry.label.as_str())
        );
        self.emit(EditorEvent::HistoryChanged {
            current,
            len: self.history.len(),
        });
        self.invalidate(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::error::EditError;
    use glam::Vec3;
    use se_kernel::MemoryKernel;

    fn session_with_points(count: usize) -> EditSession<MemoryKernel> {
        let mut session = EditSession::new(MemoryKernel::new(), EditorConfig::default());
        for i in 0..count {
            session.add_point(Vec3::new(i as f32, 0.0, 0.0)).unwrap();
        }
        session
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut session = session_with_points(2);
        session.undo().unwrap();
        assert_eq!(session.history_index(), 1);
        assert_eq!(session.index().shape(0).unwrap().points.len(), 1);

        session.redo().unwrap();
        assert_eq!(session.index().shape(0).unwrap().points.len(), 2);
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let mut session = session_with_points(1);
        assert_eq!(session.redo(), Err(EditError::NothingToRedo));
        session.undo().unwrap();
        assert_eq!(session.undo(), Err(EditError::NothingToUndo));
        assert_eq!(
            session.jump_to(5),
            Err(EditError::HistoryOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(session.history_index(), 0);
    }

    #[test]
    fn test_undo_drops_stale_selection() {
        let mut session = session_with_points(2);
        session
            .select(crate::element::ElementType::Point, 0, 1, false)
            .unwrap();
        session.undo().unwrap();
        assert!(session.selection().points().is_empty());
    }
}
