//! Ray picking metrics
//!
//! Distance functions used to rank elements against a cursor ray. The point
//! and curve metrics are deliberate approximations; margins are tuned
//! against their bias, so they are kept as they are.

use glam::Vec3;

/// A picking ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from a near point towards a far point
    ///
    /// This is the form produced by unprojecting a cursor through a camera.
    pub fn through(near: Vec3, far: Vec3) -> Self {
        Self::new(near, far - near)
    }

    /// Point at `distance` along the ray
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Check if the direction is usable
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// Distance from a point to the infinite line through two samples.
///
/// Projects `point` onto the line through `line_start` and `line_end` and
/// returns the distance to that projection. The projection is not clamped,
/// so points beside either end of the samples measure against the extended
/// line.
///
/// Coincident samples degrade to the distance from `line_start`.
pub fn distance_to_line(line_start: Vec3, line_end: Vec3, point: Vec3) -> f32 {
    let offset = line_end - line_start;
    let length = offset.length();
    if length <= f32::EPSILON {
        return point.distance(line_start);
    }
    let direction = offset / length;
    let projection = line_start + direction * direction.dot(point - line_start);
    projection.distance(point)
}

/// Approximate distance between two segments.
///
/// Takes the minimum of four point-to-line distances: each endpoint of one
/// segment against the line through the other. This underestimates for
/// crossing segments and overestimates for skew ones compared to the exact
/// closest-approach distance.
pub fn segment_distance(a_start: Vec3, a_end: Vec3, b_start: Vec3, b_end: Vec3) -> f32 {
    [
        distance_to_line(b_start, b_end, a_start),
        distance_to_line(b_start, b_end, a_end),
        distance_to_line(a_start, a_end, b_start),
        distance_to_line(a_start, a_end, b_end),
    ]
    .into_iter()
    .fold(f32::MAX, |min, d| if d < min { d } else { min })
}

/// Ray-triangle intersection test.
///
/// # Algorithm
///
/// Möller–Trumbore: solves
/// ```text
/// origin + t * dir = (1 - u - v) * v0 + u * v1 + v * v2
/// ```
/// for `(t, u, v)` with Cramer's rule. The ray misses when it is parallel to
/// the triangle plane (`|det| < epsilon`), when the barycentric coordinates
/// fall outside the triangle, or when the hit lies behind the origin.
///
/// # Returns
///
/// * `Some(t)` - Ray parameter of the hit, in units of `ray_dir`.
/// * `None` - If the ray does not hit the triangle.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    epsilon: f32,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray_dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < epsilon {
        return None;
    }

    let f = 1.0 / det;
    let s = ray_origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > epsilon).then_some(t)
}
