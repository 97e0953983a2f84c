//! Global constants for se-kernel

/// Number of tessellated segments emitted for every logical edge.
///
/// The element index advances the curve id once per this many segment
/// pairs, so it must never depend on the geometry of the edge.
pub const CURVE_SEGMENTS: usize = 32;

/// Distance under which two vertices are considered the same vertex
pub const VERTEX_TOLERANCE: f32 = 1e-6;

/// Number of intervals sampled along two edges when checking for duplicates
pub const EDGE_COMPARE_SAMPLES: usize = 4;
