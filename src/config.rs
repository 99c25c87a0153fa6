//! Field configuration.
//!
//! Every numeric range and constant the animation uses lives here, so the
//! look of the field can be retuned without touching the update step.
//! Defaults reproduce the sakura background: a sparse, slow back layer and a
//! slightly larger, more opaque front layer.
//!
//! Configurations serialize to JSON and can be loaded by the viewer:
//!
//! ```ignore
//! let config = FieldConfig::load("petals.json")?;
//! let config = FieldConfig::default()
//!     .with_seed(7)
//!     .with_front(LayerConfig::front().with_count(40, 20));
//! ```

use crate::error::{ConfigError, FieldError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Closed sampling range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    fn validate(&self, name: &'static str) -> Result<(), FieldError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(FieldError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn validate_positive(&self, name: &'static str) -> Result<(), FieldError> {
        self.validate(name)?;
        if self.min <= 0.0 {
            return Err(FieldError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Which of the two petal layers a configuration or pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Back,
    Front,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Back => "back",
            LayerKind::Front => "front",
        }
    }
}

/// Per-layer settings: pool size, depth band, opacity and base scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Particle count on standard viewports.
    pub count: u32,
    /// Particle count on constrained (narrow) viewports.
    pub constrained_count: u32,
    /// Z band the layer's particles are spread over.
    pub depth: Span,
    pub opacity: f32,
    /// Multiplier applied to the sampled per-particle scale.
    pub scale_base: f32,
}

impl LayerConfig {
    /// Distant layer behind the foreground content.
    pub fn back() -> Self {
        Self {
            count: 120,
            constrained_count: 60,
            depth: Span::new(-15.0, -10.0),
            opacity: 0.7,
            scale_base: 0.4,
        }
    }

    /// Near layer around the focal plane.
    pub fn front() -> Self {
        Self {
            count: 100,
            constrained_count: 50,
            depth: Span::new(-3.0, 2.0),
            opacity: 0.85,
            scale_base: 0.6,
        }
    }

    pub fn with_count(mut self, standard: u32, constrained: u32) -> Self {
        self.count = standard;
        self.constrained_count = constrained;
        self
    }

    pub fn with_depth(mut self, min: f32, max: f32) -> Self {
        self.depth = Span::new(min, max);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_scale_base(mut self, scale_base: f32) -> Self {
        self.scale_base = scale_base;
        self
    }

    fn validate(&self, kind: LayerKind) -> Result<(), FieldError> {
        if self.count == 0 || self.constrained_count == 0 {
            return Err(FieldError::EmptyLayer { layer: kind.name() });
        }
        self.depth.validate("depth")?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FieldError::InvalidParameter {
                name: "opacity",
                value: self.opacity,
            });
        }
        if !(self.scale_base.is_finite() && self.scale_base > 0.0) {
            return Err(FieldError::InvalidParameter {
                name: "scale_base",
                value: self.scale_base,
            });
        }
        Ok(())
    }
}

/// Sampling ranges and update constants shared by both layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-particle scale before the layer's `scale_base` is applied.
    pub scale: Span,
    pub fall_speed: Span,
    pub rotation_speed_x: Span,
    pub rotation_speed_y: Span,
    pub sway_amplitude: Span,
    /// Converts `fall_speed * delta` into scene units.
    pub fall_scale: f32,
    /// Angular frequency of the horizontal sway.
    pub sway_frequency: f32,
    /// Horizontal displacement per frame at full sway amplitude.
    pub sway_gain: f32,
    /// Horizontal displacement per frame at full pointer deflection.
    pub wind_gain: f32,
    /// Angular frequency of the z-axis flutter.
    pub flutter_frequency: f32,
    /// Peak z-axis flutter angle in radians.
    pub flutter_amplitude: f32,
    /// Distance below the viewport a particle may fall before recycling.
    pub recycle_margin: f32,
    /// Random height added above the viewport when a particle respawns.
    pub spawn_jitter: f32,
    /// Horizontal spawn half-extent as a multiple of viewport width.
    pub spawn_width: f32,
    /// Initial vertical spread above the viewport as a multiple of its height.
    pub spawn_height: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            scale: Span::new(0.2, 0.5),
            fall_speed: Span::new(0.015, 0.04),
            rotation_speed_x: Span::new(0.05, 0.15),
            rotation_speed_y: Span::new(0.03, 0.1),
            sway_amplitude: Span::new(0.4, 1.0),
            fall_scale: 20.0,
            sway_frequency: 0.2,
            sway_gain: 0.003,
            wind_gain: 0.03 * 0.005,
            flutter_frequency: 0.3,
            flutter_amplitude: 0.6,
            recycle_margin: 2.0,
            spawn_jitter: 4.0,
            spawn_width: 1.25,
            spawn_height: 2.5,
        }
    }
}

impl MotionConfig {
    pub fn with_fall_speed(mut self, min: f32, max: f32) -> Self {
        self.fall_speed = Span::new(min, max);
        self
    }

    pub fn with_sway_amplitude(mut self, min: f32, max: f32) -> Self {
        self.sway_amplitude = Span::new(min, max);
        self
    }

    pub fn with_scale(mut self, min: f32, max: f32) -> Self {
        self.scale = Span::new(min, max);
        self
    }

    /// Horizontal range particles spawn into for a viewport of `width`.
    pub fn spawn_range(&self, width: f32) -> Span {
        let half = width * self.spawn_width;
        Span::new(-half, half)
    }

    fn validate(&self) -> Result<(), FieldError> {
        self.scale.validate_positive("scale")?;
        self.fall_speed.validate_positive("fall_speed")?;
        self.rotation_speed_x.validate_positive("rotation_speed_x")?;
        self.rotation_speed_y.validate_positive("rotation_speed_y")?;
        self.sway_amplitude.validate_positive("sway_amplitude")?;

        let scalars = [
            ("fall_scale", self.fall_scale),
            ("recycle_margin", self.recycle_margin),
            ("spawn_jitter", self.spawn_jitter),
            ("spawn_width", self.spawn_width),
            ("spawn_height", self.spawn_height),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(FieldError::InvalidParameter { name, value });
            }
        }
        if self.fall_scale == 0.0 {
            return Err(FieldError::InvalidParameter {
                name: "fall_scale",
                value: self.fall_scale,
            });
        }
        let finite = [
            ("sway_frequency", self.sway_frequency),
            ("sway_gain", self.sway_gain),
            ("wind_gain", self.wind_gain),
            ("flutter_frequency", self.flutter_frequency),
            ("flutter_amplitude", self.flutter_amplitude),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(FieldError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Background panel placement and parallax settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Resting position of the panel center.
    pub base_position: glam::Vec3,
    /// Pointer-to-offset gain, relative to the viewport size.
    pub parallax: f32,
    /// Fraction of the remaining distance covered each tick.
    pub smoothing: f32,
    /// Panel height as a multiple of viewport height when the image aspect is known.
    pub cover_factor: f32,
    /// Panel size as a multiple of the viewport when the image aspect is unknown.
    pub fallback_factor: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_position: glam::Vec3::new(0.0, 0.0, -20.0),
            parallax: 0.02 * 0.3,
            smoothing: 0.03,
            cover_factor: 3.0,
            fallback_factor: 6.0,
        }
    }
}

impl PanelConfig {
    fn validate(&self) -> Result<(), FieldError> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(FieldError::InvalidParameter {
                name: "smoothing",
                value: self.smoothing,
            });
        }
        for (name, value) in [
            ("parallax", self.parallax),
            ("cover_factor", self.cover_factor),
            ("fallback_factor", self.fallback_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FieldError::InvalidParameter { name, value });
            }
        }
        if !self.base_position.is_finite() {
            return Err(FieldError::InvalidParameter {
                name: "base_position",
                value: f32::NAN,
            });
        }
        Ok(())
    }
}

/// Complete configuration of a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub back: LayerConfig,
    pub front: LayerConfig,
    pub motion: MotionConfig,
    pub panel: PanelConfig,
    /// Viewports narrower than this (scene units) use the constrained counts.
    pub constrained_width: f32,
    /// Fixed RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            back: LayerConfig::back(),
            front: LayerConfig::front(),
            motion: MotionConfig::default(),
            panel: PanelConfig::default(),
            constrained_width: 5.0,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_back(mut self, layer: LayerConfig) -> Self {
        self.back = layer;
        self
    }

    pub fn with_front(mut self, layer: LayerConfig) -> Self {
        self.front = layer;
        self
    }

    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_panel(mut self, panel: PanelConfig) -> Self {
        self.panel = panel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_constrained_width(mut self, width: f32) -> Self {
        self.constrained_width = width;
        self
    }

    /// Settings for one of the two layers.
    pub fn layer(&self, kind: LayerKind) -> &LayerConfig {
        match kind {
            LayerKind::Back => &self.back,
            LayerKind::Front => &self.front,
        }
    }

    /// Check every range and constant before any field is built from it.
    pub fn validate(&self) -> Result<(), FieldError> {
        self.back.validate(LayerKind::Back)?;
        self.front.validate(LayerKind::Front)?;
        self.motion.validate()?;
        self.panel.validate()?;
        if !self.constrained_width.is_finite() || self.constrained_width < 0.0 {
            return Err(FieldError::InvalidParameter {
                name: "constrained_width",
                value: self.constrained_width,
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: FieldConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
