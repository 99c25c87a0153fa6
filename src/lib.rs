//! # petalfall
//!
//! Falling cherry-blossom petals over a parallax background, as a small,
//! self-contained simulation plus a native viewer.
//!
//! The simulation is plain state advanced by a plain function: build a
//! [`ParticleField`] for a viewport, then call [`ParticleField::tick`] once
//! per frame from whatever render loop you have. The bundled [`Viewer`] is
//! one such loop, drawing the field with wgpu.
//!
//! ## Quick Start
//!
//! ```ignore
//! use petalfall::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     Viewer::new()
//!         .with_config(FieldConfig::default())
//!         .with_background("assets/bg_sakura.png")
//!         .with_petal_sprite("assets/blossom.jpg")
//!         .run()
//! }
//! ```
//!
//! ## Driving the field yourself
//!
//! ```ignore
//! let mut field = ParticleField::new(&FieldConfig::default(), Viewport::new(16.5, 9.3), None)?;
//! let mut clock = FrameClock::new();
//! let mut instances = Vec::new();
//!
//! // Every frame:
//! let (elapsed, delta) = clock.advance();
//! field.tick(elapsed, delta, pointer);
//! field.write_instances(&mut instances);
//! ```
//!
//! ## Layers
//!
//! | Layer | Depth | Opacity | Scale base | Petals (standard / constrained) |
//! |-------|-------|---------|------------|---------------------------------|
//! | Back  | -15 to -10 | 0.7  | 0.4 | 120 / 60 |
//! | Front | -3 to 2    | 0.85 | 0.6 | 100 / 50 |
//!
//! All ranges and constants are defaults on [`FieldConfig`] and can be
//! retuned or loaded from JSON.

mod background;
pub mod clock;
pub mod config;
mod error;
pub mod field;
mod gpu;
pub mod input;
mod particle;
mod spawn;
pub mod textures;
mod viewer;
pub mod viewport;

pub use background::BackgroundPanel;
pub use config::{FieldConfig, LayerConfig, LayerKind, MotionConfig, PanelConfig, Span};
pub use error::{ConfigError, FieldError, GpuError, TextureError, ViewerError};
pub use field::{LayerParams, ParticleField, PetalLayer, MIN_DELTA};
pub use glam::{Vec2, Vec3};
pub use input::PointerCell;
pub use particle::{Particle, PetalInstance};
pub use spawn::Spawner;
pub use textures::TextureConfig;
pub use viewer::Viewer;
pub use viewport::{DeviceClass, Viewport};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use petalfall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::FrameClock;
    pub use crate::config::{FieldConfig, LayerConfig, LayerKind, MotionConfig, PanelConfig, Span};
    pub use crate::error::{ConfigError, FieldError, ViewerError};
    pub use crate::field::{ParticleField, PetalLayer};
    pub use crate::input::PointerCell;
    pub use crate::particle::PetalInstance;
    pub use crate::viewer::Viewer;
    pub use crate::viewport::Viewport;
    pub use crate::{Vec2, Vec3};
}
