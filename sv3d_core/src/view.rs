//! Orthographic view projection for 3D plots.
//!
//! The camera orbits the origin with the z axis pointing up, parameterised by
//! elevation above the xy plane and azimuth around z (both in degrees). The
//! defaults match the usual 3D plotting view of 30° elevation, −60° azimuth.

use crate::types::Point3;

/// Projected position of a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Horizontal screen coordinate (right is positive).
    pub x: f32,
    /// Vertical screen coordinate (up is positive).
    pub y: f32,
    /// Distance towards the viewer; larger values are closer.
    pub depth: f32,
}

/// An orthographic camera looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoView {
    right: Point3,
    up: Point3,
    toward_viewer: Point3,
}

impl Default for OrthoView {
    fn default() -> Self {
        Self::new(30.0, -60.0)
    }
}

impl OrthoView {
    /// Create a view from elevation and azimuth in degrees.
    pub fn new(elevation_deg: f32, azimuth_deg: f32) -> Self {
        let (se, ce) = elevation_deg.to_radians().sin_cos();
        let (sa, ca) = azimuth_deg.to_radians().sin_cos();

        Self {
            right: Point3::new(-sa, ca, 0.0),
            up: Point3::new(-se * ca, -se * sa, ce),
            toward_viewer: Point3::new(ce * ca, ce * sa, se),
        }
    }

    /// Unit vector pointing from the scene towards the camera.
    #[inline]
    pub fn toward_viewer(&self) -> Point3 {
        self.toward_viewer
    }

    /// Project a point onto the screen plane.
    #[inline]
    pub fn project(&self, p: Point3) -> Projected {
        Projected {
            x: p.dot(self.right),
            y: p.dot(self.up),
            depth: p.dot(self.toward_viewer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        let view = OrthoView::new(30.0, -60.0);
        let basis = [view.right, view.up, view.toward_viewer];
        for (i, a) in basis.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-5);
            for b in basis.iter().skip(i + 1) {
                assert!(a.dot(*b).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_z_axis_points_up() {
        let view = OrthoView::default();
        let p = view.project(Point3::new(0.0, 0.0, 1.0));
        assert!(p.y > 0.0);
        assert!(p.x.abs() < 1e-6);
    }

    #[test]
    fn test_top_down_view() {
        let view = OrthoView::new(90.0, 0.0);
        let p = view.project(Point3::new(0.0, 0.0, 2.0));
        assert!((p.depth - 2.0).abs() < 1e-5);
    }
}
