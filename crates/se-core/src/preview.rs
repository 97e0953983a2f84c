//! Provisional geometry
//!
//! State of the in-progress construction preview. Segments and points are
//! shown with lightweight proxies; arcs, splines and faces are built on the
//! kernel's scratch shape by the session.

use glam::{Mat4, Quat, Vec3};

use crate::tools::ToolKind;

/// Thin box standing in for a segment before it is committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProxy {
    /// Midpoint of the segment
    pub position: Vec3,
    /// Rotates the proxy's local -Z axis onto the segment direction
    pub rotation: Quat,
    /// (thickness, thickness, length)
    pub scale: Vec3,
}

impl SegmentProxy {
    /// Build a proxy spanning two points
    ///
    /// Returns `None` when the points coincide, since no orientation exists.
    pub fn spanning(start: Vec3, end: Vec3, thickness: f32) -> Option<Self> {
        let offset = end - start;
        let length = offset.length();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            position: (start + end) * 0.5,
            rotation: Quat::from_rotation_arc(Vec3::NEG_Z, offset / length),
            scale: Vec3::new(thickness, thickness, length),
        })
    }

    /// Local-to-world transform of a unit cube proxy
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Marker shown at a point that has not been added yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMarker {
    pub position: Vec3,
}

/// Active previews
///
/// At most one kernel-backed preview exists at a time, matching the
/// kernel's single scratch shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewChannel {
    segment: Option<SegmentProxy>,
    point: Option<PointMarker>,
    scratch: Option<ToolKind>,
}

impl PreviewChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self) -> Option<&SegmentProxy> {
        self.segment.as_ref()
    }

    pub fn point(&self) -> Option<&PointMarker> {
        self.point.as_ref()
    }

    /// Construction currently previewed on the scratch shape
    pub fn scratch(&self) -> Option<ToolKind> {
        self.scratch
    }

    /// Check if no preview of any kind is shown
    pub fn is_empty(&self) -> bool {
        self.segment.is_none() && self.point.is_none() && self.scratch.is_none()
    }

    pub(crate) fn set_segment(&mut self, proxy: Option<SegmentProxy>) {
        self.segment = proxy;
    }

    pub(crate) fn set_point(&mut self, marker: Option<PointMarker>) {
        self.point = marker;
    }

    pub(crate) fn set_scratch(&mut self, kind: Option<ToolKind>) {
        self.scratch = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proxy_spans_segment() {
        let proxy = SegmentProxy::spanning(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), 0.3).unwrap();
        assert_eq!(proxy.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(proxy.scale, Vec3::new(0.3, 0.3, 4.0));

        let axis = proxy.rotation * Vec3::NEG_Z;
        assert_relative_eq!(axis.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(axis.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(axis.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_proxy_transform_maps_unit_box_ends() {
        let start = Vec3::new(1.0, 1.0, 1.0);
        let end = Vec3::new(3.0, 1.0, 1.0);
        let proxy = SegmentProxy::spanning(start, end, 0.3).unwrap();
        let transform = proxy.transform();

        let mapped = transform.transform_point3(Vec3::new(0.0, 0.0, -0.5));
        assert_relative_eq!(mapped.distance(end), 0.0, epsilon = 1e-5);
        let mapped = transform.transform_point3(Vec3::new(0.0, 0.0, 0.5));
        assert_relative_eq!(mapped.distance(start), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_proxy_for_coincident_points() {
        assert!(SegmentProxy::spanning(Vec3::ONE, Vec3::ONE, 0.3).is_none());
    }

    #[test]
    fn test_proxy_for_opposite_direction() {
        // Direction antiparallel to the proxy axis
        let proxy = SegmentProxy::spanning(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 0.3).unwrap();
        let axis = proxy.rotation * Vec3::NEG_Z;
        assert_relative_eq!(axis.z, 1.0, epsilon = 1e-5);
    }
}
