//! Frame clock for the viewer loop.
//!
//! Turns wall-clock frames into the `(elapsed, delta)` pair a tick takes.
//! Elapsed is simulated time, the running sum of the deltas handed out, so a
//! pause or a stalled window never shows up as a jump in the sway phase.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // Every redraw:
//! let (elapsed, delta) = clock.advance();
//! if !clock.is_paused() {
//!     field.tick(elapsed, delta, pointer);
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest frame gap fed to the field, in seconds.
///
/// A window that was hidden or dragged can report a gap of many seconds;
/// passing that through would teleport every petal at once.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// How long frames are counted before the rate is refreshed.
const RATE_WINDOW: Duration = Duration::from_millis(500);

/// Simulated time plus a frame rate readout.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    /// Accumulated in f64 so long sessions don't lose sub-frame precision.
    simulated: f64,
    frames: u64,
    paused: bool,
    rate: FrameRate,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last: now,
            simulated: 0.0,
            frames: 0,
            paused: false,
            rate: FrameRate::new(now),
        }
    }

    /// Mark a new frame and return `(elapsed, delta)` in seconds.
    ///
    /// While paused the delta is zero and elapsed holds still. Frames are
    /// counted either way.
    pub fn advance(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let gap = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frames += 1;
        self.rate.record(now);

        if self.paused {
            return (self.simulated as f32, 0.0);
        }

        let delta = gap.min(MAX_FRAME_DELTA);
        self.simulated += delta as f64;
        (self.simulated as f32, delta)
    }

    /// Pause or resume. Resuming restarts the frame gap so the pause itself
    /// is never integrated.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            self.last = Instant::now();
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames seen since the clock started, paused ones included.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Most recent frames-per-second measurement, zero until the first window closes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.rate.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct FrameRate {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FrameRate {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    fn record(&mut self, now: Instant) {
        self.frames += 1;
        let span = now.duration_since(self.window_start);
        if span >= RATE_WINDOW {
            self.fps = self.frames as f32 / span.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }
}
