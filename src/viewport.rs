//! Visible scene-space area and device classification.
//!
//! The field works in scene units, not pixels. A [`Viewport`] is the size of
//! the camera's view frustum cut at the origin plane, which is where
//! petals are measured against when they fall out of view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Vertical field of view of the scene camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 50.0;

/// Distance from the camera to the origin plane.
pub const CAMERA_DISTANCE: f32 = 10.0;

/// Largest width or height a field will work with, in scene units.
///
/// Spawn bands are a few multiples of the viewport, so anything larger risks
/// overflowing `f32` once those multiples are applied.
pub const MAX_EXTENT: f32 = 1.0e6;

/// Visible scene-space size at the origin plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport seen by a perspective camera.
    ///
    /// * `fov_y_degrees` - vertical field of view
    /// * `distance` - camera distance to the origin plane
    /// * `aspect` - surface width divided by height
    pub fn from_camera(fov_y_degrees: f32, distance: f32, aspect: f32) -> Self {
        let height = 2.0 * (fov_y_degrees.to_radians() * 0.5).tan() * distance;
        Self {
            width: height * aspect,
            height,
        }
    }

    /// Viewport of the default camera for a surface of `width` x `height` pixels.
    pub fn for_surface(width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self::from_camera(CAMERA_FOV_DEGREES, CAMERA_DISTANCE, aspect)
    }

    /// Copy with any non-finite or negative extent replaced by zero and
    /// oversized extents clamped to [`MAX_EXTENT`].
    pub fn sanitized(self) -> Self {
        let clean = |v: f32| {
            if v.is_finite() && v > 0.0 {
                v.min(MAX_EXTENT)
            } else {
                0.0
            }
        };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Coarse capability class used to pick particle counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Narrow viewport, typically a phone in portrait.
    Constrained,
    Standard,
}

impl DeviceClass {
    /// Classify a viewport against the configured width threshold.
    pub fn classify(viewport: Viewport, constrained_width: f32) -> Self {
        if viewport.width < constrained_width {
            DeviceClass::Constrained
        } else {
            DeviceClass::Standard
        }
    }
}
