//! Core value types shared by the sampler, the detector and the scene.

use crate::error::{ensure_positive, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Spatial extent the streams are drawn within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("Bounds width", self.width)?;
        ensure_positive("Bounds height", self.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 420.0,
        }
    }
}

/// A single evaluated position on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledPoint {
    pub position: Point3<f64>,
    /// Path coordinate in [0, 1].
    pub u: f64,
    /// Visual emphasis in [0, 1].
    pub intensity: f64,
}

/// A near-coincidence between two distinct streams at one time-slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceEvent {
    /// Midpoint of the two samples.
    pub position: Point3<f64>,
    /// Mean intensity of the two samples.
    pub strength: f64,
    /// Mean path coordinate of the two samples.
    pub u: f64,
    pub streams: [String; 2],
}

impl ConvergenceEvent {
    /// True when `id` is one of the two streams involved.
    pub fn involves(&self, id: &str) -> bool {
        self.streams.iter().any(|s| s == id)
    }

    /// True when both events name the same pair, in either order.
    pub fn same_pair(&self, other: &ConvergenceEvent) -> bool {
        let [a, b] = &self.streams;
        let [c, d] = &other.streams;
        (a == c && b == d) || (a == d && b == c)
    }
}

impl PartialEq for ConvergenceEvent {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.strength == other.strength
            && self.u == other.u
            && self.same_pair(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(a: &str, b: &str) -> ConvergenceEvent {
        ConvergenceEvent {
            position: Point3::new(1.0, 2.0, 3.0),
            strength: 0.5,
            u: 0.25,
            streams: [a.to_string(), b.to_string()],
        }
    }

    #[test]
    fn bounds_reject_non_positive_extent() {
        assert!(Bounds::new(100.0, 50.0).is_ok());
        assert!(Bounds::new(0.0, 50.0).is_err());
        assert!(Bounds::new(100.0, f64::INFINITY).is_err());
    }

    #[test]
    fn event_equality_ignores_pair_order() {
        assert_eq!(event("stream-0", "stream-1"), event("stream-1", "stream-0"));
        assert_ne!(event("stream-0", "stream-1"), event("stream-0", "stream-2"));
        assert!(event("stream-0", "stream-1").involves("stream-1"));
        assert!(!event("stream-0", "stream-1").involves("stream-2"));
    }
}
