//! Fixed perspective camera looking down -Z at the petal field.

use crate::viewport::{CAMERA_DISTANCE, CAMERA_FOV_DEGREES};
use glam::{Mat4, Vec3};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Camera placed on the +Z axis, aimed at the origin.
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Distance from the origin plane.
    pub distance: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            fov_y: CAMERA_FOV_DEGREES,
            distance: CAMERA_DISTANCE,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Combined projection and view for a surface aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y.to_radians(), aspect, NEAR_PLANE, FAR_PLANE);
        proj * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;
    use glam::Vec4;

    #[test]
    fn test_viewport_edge_projects_to_ndc_edge() {
        let camera = Camera::new();
        let aspect = 16.0 / 9.0;
        let vp = Viewport::from_camera(camera.fov_y, camera.distance, aspect);
        let edge = Vec4::new(vp.width * 0.5, vp.height * 0.5, 0.0, 1.0);
        let corner = camera.view_proj(aspect) * edge;
        let ndc = corner / corner.w;
        assert!((ndc.x - 1.0).abs() < 1e-4);
        assert!((ndc.y - 1.0).abs() < 1e-4);
    }
}
