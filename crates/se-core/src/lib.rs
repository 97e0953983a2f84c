//! Interactive Editing Core
//!
//! This crate provides:
//! - An element index of points, curves and surfaces rebuilt from the kernel
//! - Ray picking with per-element distance metrics and a selection margin
//! - Provisional previews of in-progress constructions on a scratch shape
//! - A linear, labelled undo/redo history with jump-to-index
//! - Edit operations tying kernel mutations, history and notifications together

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod history;
pub mod operations;
pub mod picking;
pub mod preview;
pub mod selection;
pub mod session;
pub mod tools;
pub mod view;

// Re-exports for convenience
pub use config::{ConfigError, EditorConfig};
pub use element::{Curve, ElementIndex, ElementType, Point, RebuildStats, ShapeElements, Surface};
pub use error::{EditError, EditResult};
pub use events::{EditorEvent, EventBus, Subscription};
pub use history::{HistoryEntry, HistoryManager};
pub use operations::Construction;
pub use picking::Ray;
pub use preview::{PointMarker, PreviewChannel, SegmentProxy};
pub use selection::{PickHit, SelectionEngine, SelectionSets};
pub use session::EditSession;
pub use tools::ToolKind;
pub use view::{HighlightMasks, Layer, Visibility};
