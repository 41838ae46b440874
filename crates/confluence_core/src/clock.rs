//! Frame-driven animation clock.

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Curve time units per wall-clock second at speed 1.
pub const BASE_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    time: f64,
    speed: f64,
    playing: bool,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            time: 0.0,
            speed: 1.0,
            playing: true,
        }
    }
}

impl AnimationClock {
    pub fn new(speed: f64, playing: bool) -> Result<Self> {
        ensure_positive("speed", speed)?;
        Ok(Self {
            time: 0.0,
            speed,
            playing,
        })
    }

    /// Advances by `delta * BASE_RATE * speed` seconds of curve time while
    /// playing. Returns the accumulated time.
    pub fn tick(&mut self, delta: f64) -> Result<f64> {
        ensure_non_negative("delta", delta)?;
        if self.playing {
            self.time += delta * BASE_RATE * self.speed;
        }
        trace!(delta, time = self.time, playing = self.playing, "clock tick");
        Ok(self.time)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) -> Result<()> {
        ensure_finite("time", time)?;
        self.time = time;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        ensure_positive("speed", speed)?;
        self.speed = speed;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Path coordinate to emphasise for the current time.
    pub fn wrapped(&self) -> f64 {
        wrap_unit(self.time)
    }
}

/// Fractional part of `value` in [0, 1), also for negative input.
pub fn wrap_unit(value: f64) -> f64 {
    ((value % 1.0) + 1.0) % 1.0
}
