//! Parallax background panel.
//!
//! A single large textured quad behind the petals. Its scale covers the
//! viewport the way CSS `object-fit: cover` would (sides may be cropped), and
//! its offset eases toward a small pointer-driven target each tick.

use crate::config::PanelConfig;
use crate::viewport::Viewport;
use glam::{Mat4, Vec2, Vec3};

/// The background panel: a fixed base position plus a smoothed offset.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPanel {
    base_position: Vec3,
    offset: Vec2,
    scale: Vec2,
    parallax: f32,
    smoothing: f32,
    cover_factor: f32,
    fallback_factor: f32,
}

impl BackgroundPanel {
    pub fn new(config: &PanelConfig, viewport: Viewport, image_aspect: Option<f32>) -> Self {
        let mut panel = Self {
            base_position: config.base_position,
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            parallax: config.parallax,
            smoothing: config.smoothing,
            cover_factor: config.cover_factor,
            fallback_factor: config.fallback_factor,
        };
        panel.fit(viewport, image_aspect);
        panel
    }

    /// Recompute the panel size for a viewport and image aspect ratio.
    ///
    /// A missing or degenerate aspect falls back to an oversized square-ish
    /// panel so the viewport is still covered.
    pub fn fit(&mut self, viewport: Viewport, image_aspect: Option<f32>) {
        self.scale = cover_scale(viewport, image_aspect, self.cover_factor, self.fallback_factor);
    }

    /// Ease the offset toward the pointer target.
    pub fn tick(&mut self, pointer: Vec2, viewport: Viewport) {
        let target = self.target(pointer, viewport);
        self.offset = self.offset.lerp(target, self.smoothing);
    }

    /// Offset the panel would settle at for a held pointer.
    pub fn target(&self, pointer: Vec2, viewport: Viewport) -> Vec2 {
        pointer * self.parallax * viewport.size()
    }

    #[inline]
    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Width and height of the panel in scene units.
    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Current world position: base plus offset.
    pub fn position(&self) -> Vec3 {
        self.base_position + self.offset.extend(0.0)
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position()) * Mat4::from_scale(self.scale.extend(1.0))
    }
}

fn cover_scale(
    viewport: Viewport,
    image_aspect: Option<f32>,
    cover_factor: f32,
    fallback_factor: f32,
) -> Vec2 {
    match image_aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => {
            let height = viewport.height * cover_factor;
            Vec2::new(height * aspect, height)
        }
        _ => viewport.size() * fallback_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(aspect: Option<f32>) -> BackgroundPanel {
        BackgroundPanel::new(&PanelConfig::default(), Viewport::new(16.0, 9.0), aspect)
    }

    #[test]
    fn test_cover_scale_keeps_aspect() {
        let p = panel(Some(1.5));
        assert!((p.scale().y - 27.0).abs() < 1e-5);
        assert!((p.scale().x - 40.5).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_aspect_falls_back() {
        let p = panel(None);
        assert_eq!(p.scale(), Vec2::new(96.0, 54.0));
        let p = panel(Some(0.0));
        assert_eq!(p.scale(), Vec2::new(96.0, 54.0));
    }

    #[test]
    fn test_offset_approaches_target() {
        let vp = Viewport::new(16.0, 9.0);
        let mut p = panel(None);
        let pointer = Vec2::new(1.0, -1.0);
        let target = p.target(pointer, vp);
        p.tick(pointer, vp);
        // One step covers the smoothing fraction of the gap.
        assert!((p.offset() - target * 0.03).length() < 1e-6);
        assert_eq!(p.position().z, -20.0);
    }
}
