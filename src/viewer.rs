//! Native window that hosts a particle field.
//!
//! The viewer is the field's render loop: it owns the window, the GPU state,
//! the clock and the pointer, and calls [`ParticleField::tick`] once per
//! redraw.
//!
//! ```ignore
//! Viewer::new()
//!     .with_config(FieldConfig::default().with_seed(3))
//!     .with_background("assets/bg_sakura.png")
//!     .run()?;
//! ```

use crate::config::FieldConfig;
use crate::error::ViewerError;
use crate::field::ParticleField;
use crate::gpu::GpuState;
use crate::input::{Input, KeyCode};
use crate::clock::FrameClock;
use crate::particle::PetalInstance;
use crate::textures::{AddressMode, TextureConfig};
use crate::viewport::Viewport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

const DEFAULT_BACKGROUND: &str = "assets/bg_sakura.png";
const DEFAULT_PETAL: &str = "assets/blossom.jpg";

/// Background color used when the panel image is unavailable.
const FALLBACK_BACKGROUND: [u8; 4] = [255, 228, 236, 255];
/// Petal tint used when the sprite is unavailable.
const FALLBACK_PETAL: [u8; 3] = [255, 183, 197];

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 60;

/// A particle field viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
pub struct Viewer {
    config: FieldConfig,
    background: PathBuf,
    petal: PathBuf,
    title: String,
    size: (u32, u32),
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            config: FieldConfig::default(),
            background: PathBuf::from(DEFAULT_BACKGROUND),
            petal: PathBuf::from(DEFAULT_PETAL),
            title: "petalfall".to_string(),
            size: (1280, 720),
        }
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Image shown on the parallax panel.
    pub fn with_background(mut self, path: impl Into<PathBuf>) -> Self {
        self.background = path.into();
        self
    }

    /// Image drawn on every petal.
    pub fn with_petal_sprite(mut self, path: impl Into<PathBuf>) -> Self {
        self.petal = path.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Run the viewer. This blocks until the window is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        // Fail before opening a window if the configuration is unusable.
        self.config.validate()?;

        let (background, image_aspect) = match TextureConfig::from_file(&self.background) {
            Ok(tex) => {
                let aspect = tex.aspect();
                (tex, Some(aspect))
            }
            Err(e) => {
                log::warn!(
                    "Background '{}' unavailable, using flat color: {}",
                    self.background.display(),
                    e
                );
                let [r, g, b, a] = FALLBACK_BACKGROUND;
                (TextureConfig::solid(r, g, b, a), None)
            }
        };
        let petal = petal_sprite(&self.petal);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            settings: self,
            background,
            petal,
            image_aspect,
            window: None,
            gpu_state: None,
            field: None,
            input: Input::new(),
            clock: FrameClock::new(),
            instances: Vec::new(),
            error: None,
        };
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Petal sprite, tiled rather than clamped so the quad's edges wrap.
fn petal_sprite(path: &Path) -> TextureConfig {
    TextureConfig::load_or(path, TextureConfig::soft_disc(64, FALLBACK_PETAL))
        .with_address_mode(AddressMode::Repeat)
}

struct App {
    settings: Viewer,
    background: TextureConfig,
    petal: TextureConfig,
    image_aspect: Option<f32>,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    field: Option<ParticleField>,
    input: Input,
    clock: FrameClock,
    /// Reused every frame.
    instances: Vec<PetalInstance>,
    error: Option<ViewerError>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let (width, height) = self.settings.size;
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let field = ParticleField::new(
            &self.settings.config,
            Viewport::for_surface(size.width, size.height),
            self.image_aspect,
        )?;

        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            &self.background,
            &self.petal,
            field.instance_count(),
        ))?;

        self.instances.reserve(field.instance_count());
        self.field = Some(field);
        self.gpu_state = Some(gpu_state);
        self.window = Some(window);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.clock.toggle_pause();
        }

        let (elapsed, delta) = self.clock.advance();
        if let Some(field) = &mut self.field {
            if !self.clock.is_paused() {
                field.tick(elapsed, delta, self.input.pointer());
            }
            field.write_instances(&mut self.instances);
        }

        if let Some(gpu_state) = &mut self.gpu_state {
            match gpu_state.render(&self.instances) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu_state.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory, closing viewer");
                    event_loop.exit();
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        if let Some(window) = &self.window {
            let frames = self.clock.frames();
            if frames > 0 && frames % TITLE_INTERVAL == 0 {
                let fps = self.clock.fps();
                window.set_title(&format!("{} - {:.0} FPS", self.settings.title, fps));
            }
        }

        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && self.error.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("Viewer initialization failed: {}", e);
                // Drop whatever was built before the failure.
                self.gpu_state = None;
                self.field = None;
                self.window = None;
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    if let Some(field) = &mut self.field {
                        field.resize(Viewport::for_surface(
                            physical_size.width,
                            physical_size.height,
                        ));
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release GPU resources before the window they render into.
        self.gpu_state = None;
        self.field = None;
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_petal_sprite_falls_back_to_tiled_disc() {
        let sprite = petal_sprite(Path::new("no/such/petal.png"));
        assert_eq!(sprite.address_mode, AddressMode::Repeat);
        assert_eq!((sprite.width, sprite.height), (64, 64));
    }
}
