//! Edge and face geometry
//!
//! Edges are evaluated on a normalized parameter `t` in `[0, 1]` and
//! tessellated into a fixed number of segments regardless of their shape.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{EDGE_COMPARE_SAMPLES, VERTEX_TOLERANCE};
use crate::traits::{KernelError, KernelResult};

/// Geometry of a single logical edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeGeometry {
    /// Straight segment
    Line { start: Vec3, end: Vec3 },
    /// Circular arc passing through three points
    Arc {
        start: Vec3,
        mid: Vec3,
        end: Vec3,
        /// Circle center (derived)
        center: Vec3,
        /// Unit vector from the center towards `start`
        basis_u: Vec3,
        /// Unit vector completing the arc plane basis
        basis_v: Vec3,
        /// Circle radius
        radius: f32,
        /// Swept angle from `start` to `end`, in radians
        sweep: f32,
    },
    /// Uniform Catmull-Rom spline interpolating its control points
    Spline { points: Vec<Vec3> },
}

impl EdgeGeometry {
    /// Create a straight edge
    pub fn line(start: Vec3, end: Vec3) -> KernelResult<Self> {
        if start.distance(end) < VERTEX_TOLERANCE {
            return Err(KernelError::DegenerateGeometry(
                "segment start and end coincide".into(),
            ));
        }
        Ok(Self::Line { start, end })
    }

    /// Create the circular arc starting at `start`, passing through `mid`
    /// and ending at `end`
    pub fn arc(start: Vec3, mid: Vec3, end: Vec3) -> KernelResult<Self> {
        let u = mid - start;
        let v = end - start;
        let normal = u.cross(v);
        let normal_len2 = normal.length_squared();
        if normal_len2 < VERTEX_TOLERANCE * VERTEX_TOLERANCE {
            return Err(KernelError::DegenerateGeometry(
                "arc points are collinear or coincide".into(),
            ));
        }

        // Circumcenter of the triangle (start, mid, end)
        let center =
            start + (u.length_squared() * v - v.length_squared() * u).cross(normal) / (2.0 * normal_len2);
        let radius = start.distance(center);

        let basis_u = (start - center) / radius;
        let basis_v = normal.normalize().cross(basis_u);

        // start -> mid -> end runs counter-clockwise around `normal`,
        // so the end angle is the swept angle
        let sweep = angle_in_basis(end - center, basis_u, basis_v);

        Ok(Self::Arc {
            start,
            mid,
            end,
            center,
            basis_u,
            basis_v,
            radius,
            sweep,
        })
    }

    /// Create an interpolating spline through `points`
    pub fn spline(points: Vec<Vec3>) -> KernelResult<Self> {
        if points.len() < 2 {
            return Err(KernelError::TooFewPoints(points.len()));
        }
        if points
            .windows(2)
            .any(|w| w[0].distance(w[1]) < VERTEX_TOLERANCE)
        {
            return Err(KernelError::DegenerateGeometry(
                "consecutive spline points coincide".into(),
            ));
        }
        Ok(Self::Spline { points })
    }

    /// Start point of the edge
    pub fn start(&self) -> Vec3 {
        match self {
            Self::Line { start, .. } | Self::Arc { start, .. } => *start,
            Self::Spline { points } => points[0],
        }
    }

    /// End point of the edge
    pub fn end(&self) -> Vec3 {
        match self {
            Self::Line { end, .. } | Self::Arc { end, .. } => *end,
            Self::Spline { points } => points[points.len() - 1],
        }
    }

    /// Evaluate the edge at `t` in `[0, 1]`
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Line { start, end } => start.lerp(*end, t),
            Self::Arc {
                center,
                basis_u,
                basis_v,
                radius,
                sweep,
                ..
            } => {
                let angle = sweep * t;
                *center + (*basis_u * angle.cos() + *basis_v * angle.sin()) * *radius
            }
            Self::Spline { points } => catmull_rom(points, t),
        }
    }

    /// Sample `segments + 1` evenly spaced points along the edge
    pub fn sample(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|s| self.point_at(s as f32 / segments as f32))
            .collect()
    }

    /// Tessellate into exactly `segments` start/end pairs
    pub fn tessellate(&self, segments: usize) -> Vec<[Vec3; 2]> {
        self.sample(segments)
            .windows(2)
            .map(|w| [w[0], w[1]])
            .collect()
    }

    /// Check whether `other` describes the same curve
    ///
    /// End points may match in either direction; the sampled interior is
    /// compared in parameter order.
    pub fn coincides(&self, other: &EdgeGeometry) -> bool {
        let (a0, a1) = (self.start(), self.end());
        let (b0, b1) = (other.start(), other.end());
        let same = a0.distance(b0) < VERTEX_TOLERANCE && a1.distance(b1) < VERTEX_TOLERANCE;
        let flipped = a0.distance(b1) < VERTEX_TOLERANCE && a1.distance(b0) < VERTEX_TOLERANCE;
        if !same && !flipped {
            return false;
        }

        let matches = |reversed: bool| {
            (0..=EDGE_COMPARE_SAMPLES).all(|s| {
                let t = s as f32 / EDGE_COMPARE_SAMPLES as f32;
                let u = if reversed { 1.0 - t } else { t };
                self.point_at(t).distance(other.point_at(u)) < VERTEX_TOLERANCE
            })
        };
        (same && matches(false)) || (flipped && matches(true))
    }
}

/// A planar face described by its closed boundary polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceGeometry {
    /// Boundary polygon; the closing point is not repeated
    pub boundary: Vec<Vec3>,
}

impl FaceGeometry {
    /// Build a face from edges that chain into one closed wire
    ///
    /// Edges may be given in any order and orientation.
    pub fn from_wire(edges: &[EdgeGeometry], segments: usize) -> KernelResult<Self> {
        let Some((first, rest)) = edges.split_first() else {
            return Err(KernelError::NoValidEdges);
        };

        let mut boundary = first.sample(segments);
        boundary.pop();
        let wire_start = first.start();
        let mut cursor = first.end();
        let mut remaining: Vec<&EdgeGeometry> = rest.iter().collect();

        while !remaining.is_empty() {
            let next = remaining.iter().position(|e| {
                e.start().distance(cursor) < VERTEX_TOLERANCE
                    || e.end().distance(cursor) < VERTEX_TOLERANCE
            });
            let Some(index) = next else {
                return Err(KernelError::OpenWire);
            };
            let edge = remaining.remove(index);

            let mut samples = edge.sample(segments);
            if edge.start().distance(cursor) >= VERTEX_TOLERANCE {
                samples.reverse();
            }
            cursor = samples[samples.len() - 1];
            samples.pop();
            boundary.extend(samples);
        }

        if cursor.distance(wire_start) >= VERTEX_TOLERANCE || boundary.len() < 3 {
            return Err(KernelError::OpenWire);
        }

        Ok(Self { boundary })
    }

    /// Fan triangulation around the boundary centroid
    ///
    /// Exact for convex and centroid-star-shaped boundaries.
    pub fn triangulate(&self) -> Vec<[Vec3; 3]> {
        let n = self.boundary.len();
        let centroid = self.boundary.iter().copied().sum::<Vec3>() / n as f32;
        (0..n)
            .map(|i| [centroid, self.boundary[i], self.boundary[(i + 1) % n]])
            .collect()
    }
}

/// Angle of `offset` in the plane spanned by `u` and `v`, in `[0, 2π)`
fn angle_in_basis(offset: Vec3, u: Vec3, v: Vec3) -> f32 {
    let angle = offset.dot(v).atan2(offset.dot(u));
    if angle < 0.0 {
        angle + std::f32::consts::TAU
    } else {
        angle
    }
}

/// Evaluate a uniform Catmull-Rom spline through `points` at `t` in `[0, 1]`
///
/// The end tangents come from mirrored phantom points, so a two-point
/// spline is a straight segment.
fn catmull_rom(points: &[Vec3], t: f32) -> Vec3 {
    let spans = points.len() - 1;
    let scaled = t * spans as f32;
    let span = (scaled.floor() as usize).min(spans - 1);
    let local = scaled - span as f32;

    let p1 = points[span];
    let p2 = points[span + 1];
    let p0 = if span == 0 {
        2.0 * p1 - p2
    } else {
        points[span - 1]
    };
    let p3 = if span + 2 > spans {
        2.0 * p2 - p1
    } else {
        points[span + 2]
    };

    let t2 = local * local;
    let t3 = t2 * local;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * local
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
