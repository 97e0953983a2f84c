//! Error types for editing operations

use se_kernel::KernelError;
use thiserror::Error;

use crate::element::ElementType;

/// Errors reported by edit, selection and history operations
///
/// An operation that fails leaves the model, selection and history untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown {element_type} {element_id} in shape {shape_index}")]
    UnknownElement {
        element_type: ElementType,
        shape_index: usize,
        element_id: usize,
    },

    #[error("Only elements of the committed shape can be selected, got shape {0}")]
    NotCommittedShape(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("History index {index} out of range (history has {len} entries)")]
    HistoryOutOfRange { index: usize, len: usize },

    #[error("No construction tool is open")]
    NoActiveTool,

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Result type for editing operations
pub type EditResult<T> = Result<T, EditError>;
