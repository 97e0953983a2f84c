//! Geometry Kernel for the Shape Editor
//!
//! This crate provides:
//! - The `ModelKernel` trait the editing core talks to
//! - Edge geometry (lines, three-point arcs, interpolating splines) and tessellation
//! - `MemoryKernel`, a pure Rust kernel holding shapes in memory
//! - A RON model document for loading an initial model

pub mod constants;
pub mod document;
pub mod geometry;
pub mod memory;
pub mod traits;

pub use constants::{CURVE_SEGMENTS, EDGE_COMPARE_SAMPLES, VERTEX_TOLERANCE};
pub use document::ModelDocument;
pub use geometry::{EdgeGeometry, FaceGeometry};
pub use memory::{MemoryKernel, ShapeData};
pub use traits::{FaceTessellation, KernelError, KernelResult, ModelKernel};
