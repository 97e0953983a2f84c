//! Undo history
//!
//! A linear list of labelled model snapshots with a cursor. Recording a new
//! entry while the cursor is behind the end discards the entries after it.

use uuid::Uuid;

use crate::error::{EditError, EditResult};

/// A recorded model state
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<S> {
    /// Unique id of the entry
    pub id: Uuid,
    /// Human-readable description of the edit
    pub label: String,
    snapshot: S,
}

impl<S> HistoryEntry<S> {
    /// Create a new entry
    pub fn new(label: impl Into<String>, snapshot: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            snapshot,
        }
    }

    /// Get the recorded snapshot
    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }
}

/// One row of the history view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow<'a> {
    /// Stable key of the entry, unchanged by undo and redo
    pub id: Uuid,
    pub index: usize,
    pub label: &'a str,
    pub is_current: bool,
}

/// Linear undo/redo history over snapshots of type `S`
#[derive(Debug, Clone)]
pub struct HistoryManager<S> {
    entries: Vec<HistoryEntry<S>>,
    /// Index of the entry the model currently matches (None while empty)
    current: Option<usize>,
}

impl<S> Default for HistoryManager<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
        }
    }
}

impl<S> HistoryManager<S> {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Get an entry by index
    pub fn get(&self, index: usize) -> Option<&HistoryEntry<S>> {
        self.entries.get(index)
    }

    /// Labels of every entry in order
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Rows for a history view with the current entry marked
    pub fn timeline(&self) -> Vec<TimelineRow<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| TimelineRow {
                id: entry.id,
                index,
                label: &entry.label,
                is_current: Some(index) == self.current,
            })
            .collect()
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Record a new state after the current entry
    ///
    /// Entries after the current one are discarded. Returns the index of the
    /// new entry, which becomes current.
    pub fn push(&mut self, label: impl Into<String>, snapshot: S) -> usize {
        if let Some(current) = self.current {
            let discarded = self.entries.len() - (current + 1);
            if discarded > 0 {
                tracing::debug!("Discarding {} redo entries", discarded);
                self.entries.truncate(current + 1);
            }
        }
        self.entries.push(HistoryEntry::new(label, snapshot));
        let index = self.entries.len() - 1;
        self.current = Some(index);
        index
    }

    /// Step back one entry and return the snapshot to restore
    pub fn undo(&mut self) -> EditResult<&S> {
        match self.current {
            Some(current) if current > 0 => self.set_current(current - 1),
            _ => Err(EditError::NothingToUndo),
        }
    }

    /// Step forward one entry and return the snapshot to restore
    pub fn redo(&mut self) -> EditResult<&S> {
        match self.current {
            Some(current) if current + 1 < self.entries.len() => self.set_current(current + 1),
            _ => Err(EditError::NothingToRedo),
        }
    }

    /// Move to any entry and return the snapshot to restore
    ///
    /// Later entries are kept, so redo still works after jumping back.
    pub fn jump_to(&mut self, index: usize) -> EditResult<&S> {
        if index >= self.entries.len() {
            return Err(EditError::HistoryOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.set_current(index)
    }

    fn set_current(&mut self, index: usize) -> EditResult<&S> {
        self.current = Some(index);
        Ok(&self.entries[index].snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(labels: &[&str]) -> HistoryManager<usize> {
        let mut history = HistoryManager::new();
        for (i, label) in labels.iter().enumerate() {
            history.push(*label, i);
        }
        history
    }

    #[test]
    fn test_empty_history() {
        let mut history: HistoryManager<usize> = HistoryManager::new();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
        assert_eq!(history.undo(), Err(EditError::NothingToUndo));
        assert_eq!(history.redo(), Err(EditError::NothingToRedo));
        assert_eq!(
            history.jump_to(0),
            Err(EditError::HistoryOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_push_moves_current() {
        let history = history_with(&["Initial import", "Point added"]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some(1));
        assert_eq!(history.labels(), vec!["Initial import", "Point added"]);
    }

    #[test]
    fn test_undo_redo() {
        let mut history = history_with(&["a", "b", "c"]);
        assert_eq!(history.undo(), Ok(&1));
        assert_eq!(history.undo(), Ok(&0));
        assert_eq!(history.undo(), Err(EditError::NothingToUndo));
        assert_eq!(history.current(), Some(0));

        assert_eq!(history.redo(), Ok(&1));
        assert_eq!(history.redo(), Ok(&2));
        assert_eq!(history.redo(), Err(EditError::NothingToRedo));
        assert_eq!(history.current(), Some(2));
    }

    #[test]
    fn test_push_after_undo_truncates() {
        let mut history = history_with(&["a", "b", "c"]);
        history.undo().unwrap();
        history.undo().unwrap();

        let index = history.push("d", 3);
        assert_eq!(index, 1);
        assert_eq!(history.labels(), vec!["a", "d"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_jump_keeps_later_entries() {
        let mut history = history_with(&["a", "b", "c", "d"]);
        assert_eq!(history.jump_to(1), Ok(&1));
        assert_eq!(history.len(), 4);
        assert!(history.can_redo());
        assert_eq!(history.jump_to(3), Ok(&3));
        assert_eq!(
            history.jump_to(4),
            Err(EditError::HistoryOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(history.current(), Some(3));
    }

    #[test]
    fn test_timeline_marks_current() {
        let mut history = history_with(&["a", "b"]);
        history.undo().unwrap();
        let rows = history.timeline();
        assert!(rows[0].is_current);
        assert!(!rows[1].is_current);
        assert_eq!(rows[1].label, "b");
    }

    #[test]
    fn test_timeline_ids_survive_undo_and_change_on_push() {
        let mut history = history_with(&["a", "b"]);
        let before: Vec<Uuid> = history.timeline().iter().map(|row| row.id).collect();
        assert_ne!(before[0], before[1]);

        history.undo().unwrap();
        let after_undo: Vec<Uuid> = history.timeline().iter().map(|row| row.id).collect();
        assert_eq!(before, after_undo);

        history.push("c", 9);
        let rows = history.timeline();
        assert_eq!(rows[0].id, before[0]);
        assert_ne!(rows[1].id, before[1]);
        assert_eq!(rows[1].label, "c");
    }
}
