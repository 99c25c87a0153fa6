//! The particle field: two petal layers and a parallax background panel.
//!
//! A field is created once for a viewport and then advanced by calling
//! [`ParticleField::tick`] from the host render loop, once per frame. Ticking
//! is plain arithmetic over owned state: no I/O, no allocation, no failure
//! modes. Bad timing or pointer input is sanitized at the top of each tick.
//!
//! # Lifecycle of a petal
//!
//! Petals start scattered above the viewport, fall at their own fixed speed
//! while swaying sideways and tumbling, and once they drop below the
//! viewport (plus a margin) they are moved back above it at a fresh
//! horizontal position. The pool never grows or shrinks.
//!
//! ```ignore
//! let mut field = ParticleField::new(&FieldConfig::default(), viewport, Some(1.5))?;
//! let mut instances = Vec::new();
//! loop {
//!     let (elapsed, delta) = clock.advance();
//!     field.tick(elapsed, delta, pointer.load());
//!     field.write_instances(&mut instances);
//!     renderer.draw(&instances);
//! }
//! ```

use crate::background::BackgroundPanel;
use crate::config::{FieldConfig, LayerConfig, LayerKind, MotionConfig, Span};
use crate::error::FieldError;
use crate::particle::{Particle, PetalInstance};
use crate::spawn::Spawner;
use crate::viewport::{DeviceClass, Viewport};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Smallest delta time a tick will integrate with.
///
/// Zero, negative and non-finite deltas are replaced by this value so that
/// petals never stall or rise.
pub const MIN_DELTA: f32 = 1e-4;

/// Appearance and motion shared by every petal of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    pub kind: LayerKind,
    pub opacity: f32,
    /// Multiplier on the sampled per-particle scale.
    pub scale_base: f32,
    pub motion: MotionConfig,
}

impl LayerParams {
    pub fn from_config(kind: LayerKind, layer: &LayerConfig, motion: &MotionConfig) -> Self {
        Self {
            kind,
            opacity: layer.opacity,
            scale_base: layer.scale_base,
            motion: motion.clone(),
        }
    }
}

/// A fixed-size pool of petals sharing depth band, opacity and base scale.
#[derive(Debug, Clone)]
pub struct PetalLayer {
    kind: LayerKind,
    opacity: f32,
    particles: Vec<Particle>,
    motion: MotionConfig,
    viewport: Viewport,
    spawn_range: Span,
    spawner: Spawner,
}

impl PetalLayer {
    /// Create a layer of `count` petals spread above `viewport`.
    ///
    /// Returns [`FieldError::EmptyLayer`] when `count` is zero: an empty layer
    /// is a configuration mistake, not something to animate.
    pub fn create(
        count: u32,
        viewport: Viewport,
        depth: Span,
        params: &LayerParams,
        mut spawner: Spawner,
    ) -> Result<Self, FieldError> {
        if count == 0 {
            return Err(FieldError::EmptyLayer {
                layer: params.kind.name(),
            });
        }
        if !depth.min.is_finite() || !depth.max.is_finite() || depth.min > depth.max {
            return Err(FieldError::InvalidRange {
                name: "depth",
                min: depth.min,
                max: depth.max,
            });
        }

        let viewport = viewport.sanitized();
        let motion = &params.motion;
        let spawn_range = sampleable("spawn_range", motion.spawn_range(viewport.width))?;
        let start_band = sampleable(
            "spawn_band",
            Span::new(viewport.height, viewport.height * (1.0 + motion.spawn_height)),
        )?;

        let particles = (0..count)
            .map(|_| {
                let position = Vec3::new(
                    spawner.sample(spawn_range),
                    spawner.sample(start_band),
                    spawner.sample(depth),
                );
                let rotation = spawner.euler();
                let scale = spawner.sample(motion.scale) * params.scale_base;
                let fall_speed = spawner.sample(motion.fall_speed);
                let rotation_speed = Vec2::new(
                    spawner.sample(motion.rotation_speed_x),
                    spawner.sample(motion.rotation_speed_y),
                );
                let sway_phase = spawner.angle();
                let sway_amplitude = spawner.sample(motion.sway_amplitude);
                Particle::new(
                    position,
                    rotation,
                    scale,
                    fall_speed,
                    rotation_speed,
                    sway_phase,
                    sway_amplitude,
                )
            })
            .collect();

        Ok(Self {
            kind: params.kind,
            opacity: params.opacity,
            particles,
            motion: motion.clone(),
            viewport,
            spawn_range,
            spawner,
        })
    }

    /// Advance every petal by one frame.
    ///
    /// * `elapsed` - seconds since the field started, drives sway and flutter
    /// * `delta` - seconds since the previous tick, drives fall and spin
    /// * `pointer` - pointer position in `[-1, 1]`, x adds a shared wind
    pub fn tick(&mut self, elapsed: f32, delta: f32, pointer: Vec2) {
        let delta = sanitize_delta(delta);
        let elapsed = sanitize_elapsed(elapsed);
        let pointer = sanitize_pointer(pointer);

        let motion = &self.motion;
        let wind = pointer.x * motion.wind_gain;
        let floor = self.recycle_floor();
        let ceiling = self.viewport.height;

        for p in &mut self.particles {
            p.position.y -= p.fall_speed() * delta * motion.fall_scale;

            let sway = (elapsed * motion.sway_frequency + p.sway_phase()).sin();
            p.position.x += sway * p.sway_amplitude() * motion.sway_gain + wind;

            let spin = p.rotation_speed() * delta;
            p.rotation.x = (p.rotation.x + spin.x).rem_euclid(TAU);
            p.rotation.y = (p.rotation.y + spin.y).rem_euclid(TAU);
            // Recomputed rather than accumulated so it stays bounded.
            p.rotation.z = (elapsed * motion.flutter_frequency + p.sway_phase()).sin()
                * motion.flutter_amplitude;

            if p.position.y < floor {
                p.position.y = ceiling + self.spawner.up_to(motion.spawn_jitter);
                p.position.x = self.spawner.sample(self.spawn_range);
            }
        }
    }

    /// Track a new viewport. Existing petals keep their positions.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        match sampleable("spawn_range", self.motion.spawn_range(self.viewport.width)) {
            Ok(range) => self.spawn_range = range,
            Err(e) => log::warn!("Keeping previous spawn range after resize: {}", e),
        }
    }

    /// Height below which a petal is recycled.
    #[inline]
    pub fn recycle_floor(&self) -> f32 {
        -(self.viewport.height + self.motion.recycle_margin)
    }

    /// Horizontal range recycled petals are placed into.
    #[inline]
    pub fn spawn_range(&self) -> Span {
        self.spawn_range
    }

    #[inline]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Append one instance per petal.
    pub fn write_instances(&self, out: &mut Vec<PetalInstance>) {
        out.extend(
            self.particles
                .iter()
                .map(|p| PetalInstance::new(p.transform(), self.opacity)),
        );
    }
}

/// Back and front petal layers plus the background panel.
#[derive(Debug, Clone)]
pub struct ParticleField {
    back: PetalLayer,
    front: PetalLayer,
    panel: BackgroundPanel,
    viewport: Viewport,
    device_class: DeviceClass,
    image_aspect: Option<f32>,
}

impl ParticleField {
    /// Build a field for `viewport`.
    ///
    /// Layer sizes follow the device class of the viewport. `image_aspect` is
    /// the background image's width over height, if already known.
    pub fn new(
        config: &FieldConfig,
        viewport: Viewport,
        image_aspect: Option<f32>,
    ) -> Result<Self, FieldError> {
        config.validate()?;

        let viewport = viewport.sanitized();
        let device_class = DeviceClass::classify(viewport, config.constrained_width);
        let mut root = Spawner::new(config.seed);

        let back = build_layer(config, LayerKind::Back, viewport, device_class, root.fork())?;
        let front = build_layer(config, LayerKind::Front, viewport, device_class, root.fork())?;
        let panel = BackgroundPanel::new(&config.panel, viewport, image_aspect);

        log::debug!(
            "Created particle field: {} back + {} front petals, {:?} viewport {:.2}x{:.2}",
            back.len(),
            front.len(),
            device_class,
            viewport.width,
            viewport.height
        );

        Ok(Self {
            back,
            front,
            panel,
            viewport,
            device_class,
            image_aspect,
        })
    }

    /// Advance both layers and the panel by one frame.
    pub fn tick(&mut self, elapsed: f32, delta: f32, pointer: Vec2) {
        self.back.tick(elapsed, delta, pointer);
        self.front.tick(elapsed, delta, pointer);
        self.panel.tick(sanitize_pointer(pointer), self.viewport);
    }

    /// Follow a viewport change without rebuilding the pools.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        self.back.resize(self.viewport);
        self.front.resize(self.viewport);
        self.panel.fit(self.viewport, self.image_aspect);
        log::debug!(
            "Resized particle field to {:.2}x{:.2}",
            self.viewport.width,
            self.viewport.height
        );
    }

    /// Refit the panel once the background image's aspect ratio is known.
    pub fn set_image_aspect(&mut self, aspect: Option<f32>) {
        self.image_aspect = aspect;
        self.panel.fit(self.viewport, aspect);
    }

    pub fn layer(&self, kind: LayerKind) -> &PetalLayer {
        match kind {
            LayerKind::Back => &self.back,
            LayerKind::Front => &self.front,
        }
    }

    /// Layers in draw order, back first.
    pub fn layers(&self) -> [&PetalLayer; 2] {
        [&self.back, &self.front]
    }

    pub fn panel(&self) -> &BackgroundPanel {
        &self.panel
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    /// Total number of petals across both layers.
    pub fn particle_count(&self) -> usize {
        self.back.len() + self.front.len()
    }

    /// Number of instances [`write_instances`](Self::write_instances) produces.
    pub fn instance_count(&self) -> usize {
        1 + self.particle_count()
    }

    /// Replace the contents of `out` with the panel followed by every petal
    /// in draw order. Reuses the vector's allocation across frames.
    pub fn write_instances(&self, out: &mut Vec<PetalInstance>) {
        out.clear();
        out.reserve(self.instance_count());
        out.push(PetalInstance::new(self.panel.transform(), 1.0));
        self.back.write_instances(out);
        self.front.write_instances(out);
    }
}

fn build_layer(
    config: &FieldConfig,
    kind: LayerKind,
    viewport: Viewport,
    device_class: DeviceClass,
    spawner: Spawner,
) -> Result<PetalLayer, FieldError> {
    let layer = config.layer(kind);
    let count = match device_class {
        DeviceClass::Constrained => layer.constrained_count,
        DeviceClass::Standard => layer.count,
    };
    let params = LayerParams::from_config(kind, layer, &config.motion);
    PetalLayer::create(count, viewport, layer.depth, &params, spawner)
}

/// Reject spans whose bounds or width overflow `f32`; the RNG cannot sample them.
fn sampleable(name: &'static str, span: Span) -> Result<Span, FieldError> {
    if span.min.is_finite() && span.max.is_finite() && span.width().is_finite() {
        Ok(span)
    } else {
        Err(FieldError::InvalidRange {
            name,
            min: span.min,
            max: span.max,
        })
    }
}

#[inline]
fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > MIN_DELTA {
        delta
    } else if delta == f32::INFINITY {
        // Still a forward step; keep it finite.
        1.0
    } else {
        MIN_DELTA
    }
}

#[inline]
fn sanitize_elapsed(elapsed: f32) -> f32 {
    if elapsed.is_finite() {
        elapsed
    } else {
        0.0
    }
}

#[inline]
fn sanitize_pointer(pointer: Vec2) -> Vec2 {
    let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
    Vec2::new(axis(pointer.x), axis(pointer.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::MAX_EXTENT;

    fn params() -> LayerParams {
        LayerParams::from_config(LayerKind::Back, &LayerConfig::back(), &MotionConfig::default())
    }

    fn layer(count: u32) -> PetalLayer {
        PetalLayer::create(
            count,
            Viewport::new(10.0, 10.0),
            Span::new(-15.0, -10.0),
            &params(),
            Spawner::from_seed(11),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = PetalLayer::create(
            0,
            Viewport::new(10.0, 10.0),
            Span::new(-1.0, 1.0),
            &params(),
            Spawner::from_seed(1),
        )
        .unwrap_err();
        assert_eq!(err, FieldError::EmptyLayer { layer: "back" });
    }

    #[test]
    fn test_initial_ranges() {
        let layer = layer(500);
        let motion = MotionConfig::default();
        for p in layer.particles() {
            let pos = p.position();
            assert!((-12.5..=12.5).contains(&pos.x));
            assert!((10.0..=35.0).contains(&pos.y));
            assert!((-15.0..=-10.0).contains(&pos.z));
            for angle in p.rotation().to_array() {
                assert!((0.0..TAU).contains(&angle));
            }
            assert!(motion.fall_speed.contains(p.fall_speed()));
            assert!(motion.rotation_speed_x.contains(p.rotation_speed().x));
            assert!(motion.rotation_speed_y.contains(p.rotation_speed().y));
            assert!(motion.sway_amplitude.contains(p.sway_amplitude()));
            assert!((0.0..TAU).contains(&p.sway_phase()));
            // scale range [0.2, 0.5] times the back layer base of 0.4
            assert!(p.scale() >= 0.08 - 1e-6 && p.scale() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn test_particle_below_floor_is_recycled_above_viewport() {
        let mut layer = layer(4);
        let floor = layer.recycle_floor();
        layer.particles[2].position.y = floor - 0.001;

        layer.tick(1.0, 1.0 / 60.0, Vec2::ZERO);

        let p = &layer.particles()[2];
        assert!(p.position().y >= 10.0);
        assert!(p.position().y <= 14.0);
        assert!(layer.spawn_range().contains(p.position().x));
    }

    #[test]
    fn test_recycle_keeps_depth_and_constants() {
        let mut layer = layer(1);
        let before = layer.particles()[0].clone();
        layer.particles[0].position.y = layer.recycle_floor() - 1.0;
        layer.tick(0.0, 0.016, Vec2::ZERO);
        let after = &layer.particles()[0];
        assert_eq!(after.position().z, before.position().z);
        assert_eq!(after.fall_speed().to_bits(), before.fall_speed().to_bits());
        assert_eq!(after.scale().to_bits(), before.scale().to_bits());
    }

    #[test]
    fn test_z_rotation_is_bounded_flutter() {
        let mut layer = layer(32);
        for i in 0..2000 {
            layer.tick(i as f32 * 0.5, 0.5, Vec2::ZERO);
            for p in layer.particles() {
                assert!(p.rotation().z.abs() <= 0.6 + 1e-5);
            }
        }
    }

    #[test]
    fn test_wind_pushes_right() {
        let mut calm = layer(8);
        let mut windy = calm.clone();
        calm.tick(0.0, 0.001, Vec2::ZERO);
        windy.tick(0.0, 0.001, Vec2::new(1.0, 0.0));
        for (c, w) in calm.particles().iter().zip(windy.particles()) {
            assert!(w.position().x > c.position().x);
        }
    }

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(0.0), MIN_DELTA);
        assert_eq!(sanitize_delta(-5.0), MIN_DELTA);
        assert_eq!(sanitize_delta(f32::NAN), MIN_DELTA);
        assert_eq!(sanitize_delta(f32::NEG_INFINITY), MIN_DELTA);
        assert_eq!(sanitize_delta(0.016), 0.016);
    }

    #[test]
    fn test_sanitize_pointer() {
        assert_eq!(sanitize_pointer(Vec2::new(3.0, -2.0)), Vec2::new(1.0, -1.0));
        assert_eq!(sanitize_pointer(Vec2::new(f32::NAN, 0.5)), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_resize_moves_boundary_not_particles() {
        let mut layer = layer(16);
        let before: Vec<Vec3> = layer.particles().iter().map(|p| p.position()).collect();
        layer.resize(Viewport::new(20.0, 5.0));
        assert_eq!(layer.recycle_floor(), -7.0);
        assert_eq!(layer.spawn_range(), Span::new(-25.0, 25.0));
        let after: Vec<Vec3> = layer.particles().iter().map(|p| p.position()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_huge_viewport_is_clamped_not_fatal() {
        let config = FieldConfig::default().with_seed(3);
        for viewport in [Viewport::new(2.0e38, 9.0), Viewport::new(16.0, 1.0e38)] {
            let mut field = ParticleField::new(&config, viewport, None).unwrap();
            for i in 0..10 {
                field.tick(i as f32 / 60.0, 1.0 / 60.0, Vec2::ZERO);
            }
            assert!(field.viewport().width <= MAX_EXTENT);
            assert!(field.viewport().height <= MAX_EXTENT);
            for layer in field.layers() {
                assert!(layer.particles().iter().all(|p| p.is_finite()));
            }
        }
    }

    #[test]
    fn test_overflowing_spawn_width_is_rejected() {
        let motion = MotionConfig {
            spawn_width: 1.0e36,
            ..MotionConfig::default()
        };
        let params = LayerParams::from_config(LayerKind::Front, &LayerConfig::front(), &motion);
        let err = PetalLayer::create(
            4,
            Viewport::new(1.0e5, 9.0),
            Span::new(-3.0, 2.0),
            &params,
            Spawner::from_seed(2),
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::InvalidRange { name: "spawn_range", .. }));
    }

    #[test]
    fn test_resize_keeps_range_that_would_overflow() {
        let motion = MotionConfig {
            spawn_width: 1.0e33,
            ..MotionConfig::default()
        };
        let params = LayerParams::from_config(LayerKind::Back, &LayerConfig::back(), &motion);
        let mut layer = PetalLayer::create(
            4,
            Viewport::new(1.0, 1.0),
            Span::new(-15.0, -10.0),
            &params,
            Spawner::from_seed(9),
        )
        .unwrap();
        let range = layer.spawn_range();

        layer.resize(Viewport::new(1.0e6, 1.0));
        assert_eq!(layer.spawn_range(), range);

        layer.particles[0].position.y = layer.recycle_floor() - 1.0;
        layer.tick(0.0, 1.0 / 60.0, Vec2::ZERO);
        assert!(layer.particles()[0].is_finite());
    }

    #[test]
    fn test_constrained_viewport_uses_smaller_pools() {
        let config = FieldConfig::default().with_seed(5);
        let narrow = ParticleField::new(&config, Viewport::new(4.0, 9.3), None).unwrap();
        let wide = ParticleField::new(&config, Viewport::new(16.6, 9.3), None).unwrap();
        assert_eq!(narrow.device_class(), DeviceClass::Constrained);
        assert_eq!(narrow.particle_count(), 60 + 50);
        assert_eq!(wide.particle_count(), 120 + 100);
    }

    #[test]
    fn test_write_instances_order_and_reuse() {
        let config = FieldConfig::default().with_seed(5);
        let field = ParticleField::new(&config, Viewport::new(16.6, 9.3), Some(1.5)).unwrap();
        let mut out = Vec::new();
        field.write_instances(&mut out);
        assert_eq!(out.len(), field.instance_count());
        assert_eq!(out[0].opacity, 1.0);
        assert_eq!(out[1].opacity, 0.7);
        assert_eq!(out[out.len() - 1].opacity, 0.85);

        let capacity = out.capacity();
        field.write_instances(&mut out);
        assert_eq!(out.len(), field.instance_count());
        assert_eq!(out.capacity(), capacity);
    }
}
