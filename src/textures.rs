//! Image loading for the background panel and the petal sprite.
//!
//! Textures are decoded into tightly packed RGBA8 on the CPU and uploaded by
//! the renderer. A missing or corrupt asset never stops the animation: the
//! viewer falls back to a flat color and keeps ticking.
//!
//! # Supported Formats
//!
//! - PNG
//! - JPEG

use crate::error::TextureError;
use std::path::Path;

/// Filter mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Smooth linear filtering (default).
    #[default]
    Linear,
    /// Sharp nearest-neighbor filtering.
    Nearest,
}

/// Address mode for texture wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge color (default).
    #[default]
    ClampToEdge,
    /// Repeat/tile the texture.
    Repeat,
}

/// Decoded RGBA image plus its sampling settings.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
    pub address_mode: AddressMode,
}

impl TextureConfig {
    /// Load a texture from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory PNG or JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        })
    }

    /// Load `path`, or return `fallback` and log why the file was unusable.
    pub fn load_or<P: AsRef<Path>>(path: P, fallback: TextureConfig) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(tex) => {
                log::debug!(
                    "Loaded texture '{}' ({}x{})",
                    path.as_ref().display(),
                    tex.width,
                    tex.height
                );
                tex
            }
            Err(e) => {
                log::warn!(
                    "Using fallback for texture '{}': {}",
                    path.as_ref().display(),
                    e
                );
                fallback
            }
        }
    }

    /// Create a solid color texture (1x1 pixel).
    pub fn solid(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            data: vec![r, g, b, a],
            width: 1,
            height: 1,
            filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        }
    }

    /// Soft round blob, used when the petal sprite cannot be loaded.
    pub fn soft_disc(size: u32, color: [u8; 3]) -> Self {
        let size = size.max(2);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let center = (size as f32 - 1.0) * 0.5;
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - center) / center;
                let dy = (y as f32 - center) / center;
                let d = (dx * dx + dy * dy).sqrt();
                let alpha = (1.0 - d).clamp(0.0, 1.0);
                data.extend_from_slice(&color);
                data.push((alpha * 255.0).round() as u8);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        }
    }

    /// Change how the sampler treats coordinates outside `[0, 1]`.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextureConfig::from_file("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, TextureError::Io(_)));
    }

    #[test]
    fn test_garbage_bytes_is_image_error() {
        let err = TextureConfig::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, TextureError::ImageLoad(_)));
    }

    #[test]
    fn test_load_or_returns_fallback() {
        let tex = TextureConfig::load_or("missing.jpg", TextureConfig::solid(1, 2, 3, 4));
        assert_eq!(tex.data, vec![1, 2, 3, 4]);
        assert_eq!(tex.aspect(), 1.0);
    }

    #[test]
    fn test_png_round_trip_through_decoder() {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tex = TextureConfig::from_bytes(&bytes).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.aspect(), 2.0);
        assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_soft_disc_is_opaque_center_clear_corner() {
        let tex = TextureConfig::soft_disc(9, [255, 183, 197]);
        let px = |x: u32, y: u32| tex.data[((y * tex.width + x) * 4 + 3) as usize];
        assert_eq!(px(4, 4), 255);
        assert_eq!(px(0, 0), 0);
    }
}
