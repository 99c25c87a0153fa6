//! A single falling petal and its GPU instance form.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// One simulated petal.
///
/// Position and rotation change every tick. Everything else is fixed when the
/// particle is created and only readable afterwards, so recycling can never
/// alter a petal's character.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3,
    scale: f32,
    fall_speed: f32,
    rotation_speed: Vec2,
    sway_phase: f32,
    sway_amplitude: f32,
}

impl Particle {
    pub(crate) fn new(
        position: Vec3,
        rotation: Vec3,
        scale: f32,
        fall_speed: f32,
        rotation_speed: Vec2,
        sway_phase: f32,
        sway_amplitude: f32,
    ) -> Self {
        Self {
            position,
            rotation,
            scale,
            fall_speed,
            rotation_speed,
            sway_phase,
            sway_amplitude,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euler angles, XYZ order.
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    /// Spin rates around x and y, radians per second.
    #[inline]
    pub fn rotation_speed(&self) -> Vec2 {
        self.rotation_speed
    }

    #[inline]
    pub fn sway_phase(&self) -> f32 {
        self.sway_phase
    }

    #[inline]
    pub fn sway_amplitude(&self) -> f32 {
        self.sway_amplitude
    }

    /// Whether every mutable and fixed value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.scale.is_finite()
            && self.fall_speed.is_finite()
            && self.rotation_speed.is_finite()
            && self.sway_phase.is_finite()
            && self.sway_amplitude.is_finite()
    }

    /// Model matrix: scale, then XYZ rotation, then translation.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            euler_quat(self.rotation),
            self.position,
        )
    }
}

#[inline]
pub(crate) fn euler_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Per-instance data uploaded to the GPU.
///
/// Layout matches the vertex attributes of the petal pipeline: four
/// model-matrix columns followed by opacity.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PetalInstance {
    pub model: [[f32; 4]; 4],
    pub opacity: f32,
    pub _padding: [f32; 3],
}

impl PetalInstance {
    pub fn new(model: Mat4, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            opacity,
            _padding: [0.0; 3],
        }
    }

    /// Translation column of the model matrix.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}
