//! Pointer and keyboard input for the petal field.
//!
//! The field only cares about where the pointer is, in normalized device
//! coordinates. [`PointerCell`] carries that value from the input handler to
//! the tick without locking; [`Input`] turns raw winit events into it and
//! tracks the few keys the viewer reacts to.

use glam::Vec2;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Shared pointer position, written by input handling and read by the tick.
///
/// Both components live in one `AtomicU64`, so a reader always sees a pair
/// that was written together. A value one frame stale is fine.
#[derive(Debug, Default)]
pub struct PointerCell {
    bits: AtomicU64,
}

impl PointerCell {
    pub fn new(pointer: Vec2) -> Self {
        Self {
            bits: AtomicU64::new(pack(pointer)),
        }
    }

    pub fn store(&self, pointer: Vec2) {
        self.bits.store(pack(pointer), Ordering::Relaxed);
    }

    pub fn load(&self) -> Vec2 {
        unpack(self.bits.load(Ordering::Relaxed))
    }
}

#[inline]
fn pack(v: Vec2) -> u64 {
    ((v.x.to_bits() as u64) << 32) | v.y.to_bits() as u64
}

#[inline]
fn unpack(bits: u64) -> Vec2 {
    Vec2::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

/// Keys the viewer responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Input state tracking for the viewer window.
#[derive(Debug, Default)]
pub struct Input {
    /// Keys that went down this frame. Auto-repeat does not count.
    keys_pressed: HashSet<KeyCode>,
    pointer: PointerCell,
    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Pointer position in normalized device coordinates (-1 to 1).
    ///
    /// Origin is at center of window. X increases to the right, Y increases upward.
    pub fn pointer(&self) -> Vec2 {
        self.pointer.load()
    }

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Convert a cursor position in pixels to NDC and store it.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            let ndc = Vec2::new(
                (x as f32 / w as f32) * 2.0 - 1.0,
                1.0 - (y as f32 / h as f32) * 2.0, // Y flipped
            );
            self.pointer.store(ndc.clamp(Vec2::NEG_ONE, Vec2::ONE));
        }
    }

    fn record_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        if state == ElementState::Pressed && !repeat {
            self.keys_pressed.insert(key);
        }
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    self.record_key(KeyCode::from(keycode), event.state, event.repeat);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(position.x, position.y);
            }
            // Let petals settle back to calm when the pointer leaves.
            WindowEvent::CursorLeft { .. } => {
                self.pointer.store(Vec2::ZERO);
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_cell_round_trips_pair() {
        let cell = PointerCell::new(Vec2::ZERO);
        cell.store(Vec2::new(-0.25, 0.75));
        assert_eq!(cell.load(), Vec2::new(-0.25, 0.75));
    }

    #[test]
    fn test_pointer_cell_shared_across_threads() {
        let cell = std::sync::Arc::new(PointerCell::default());
        let writer = {
            let cell = cell.clone();
            std::thread::spawn(move || {
                for i in 0..1000 {
                    let v = i as f32 / 1000.0;
                    cell.store(Vec2::new(v, -v));
                }
            })
        };
        for _ in 0..1000 {
            let p = cell.load();
            // Components were always written as a pair.
            assert_eq!(p.x, -p.y);
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_cursor_to_ndc() {
        let mut input = Input::new();
        input.set_window_size(800, 600);

        input.set_cursor(400.0, 300.0);
        assert!(input.pointer().length() < 0.01);

        input.set_cursor(800.0, 0.0);
        assert!((input.pointer() - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_cursor_outside_window_is_clamped() {
        let mut input = Input::new();
        input.set_window_size(100, 100);
        input.set_cursor(-50.0, 250.0);
        assert_eq!(input.pointer(), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_key_press_lasts_one_frame() {
        let mut input = Input::new();
        input.record_key(KeyCode::Space, ElementState::Pressed, false);
        assert!(input.key_pressed(KeyCode::Space));

        input.end_frame();
        assert!(!input.key_pressed(KeyCode::Space));
    }

    #[test]
    fn test_repeat_and_release_do_not_press() {
        let mut input = Input::new();
        input.record_key(KeyCode::Space, ElementState::Pressed, true);
        input.record_key(KeyCode::Escape, ElementState::Released, false);
        assert!(!input.key_pressed(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Escape));
    }
}
