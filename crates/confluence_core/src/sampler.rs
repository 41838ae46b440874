//! Evaluation of stream curves at a time-slice.

use crate::error::{ensure_finite, invalid, Result};
use crate::params::StreamShapeParameters;
use crate::types::{Bounds, SampledPoint};
use nalgebra::Point3;
use std::f64::consts::TAU;

/// Lateral twist amplitude as a fraction of the width.
const TWIST_SCALE: f64 = 0.06;
/// Texture waves as fractions of the height; shared by every stream.
const SECONDARY_Y_SCALE: f64 = 0.08;
const SECONDARY_Z_SCALE: f64 = 0.06;

/// Position and intensity of a stream at path coordinate `u` and `time`.
///
/// x sweeps the width with `u` and drifts sideways with the twist term; y and
/// z are a primary wave driven by the stream's own frequency and phase plus a
/// fixed low-amplitude texture wave. Every wave argument advances with time,
/// so the curve evolves continuously.
pub fn sample_point(
    u: f64,
    time: f64,
    params: &StreamShapeParameters,
    bounds: &Bounds,
) -> SampledPoint {
    let theta = TAU * u;
    let phase = TAU * time;
    let half_height = 0.5 * bounds.height;

    let x = (u - 0.5) * bounds.width
        + params.twist * TWIST_SCALE * bounds.width * (params.freq_x * theta + 0.5 * phase).sin();

    let y = params.amplitude_y
        * half_height
        * (params.freq_y * theta + params.phase_y + phase).sin()
        + SECONDARY_Y_SCALE * bounds.height * (3.0 * theta - 0.5 * phase).sin();

    let swirl_rate = 1.0 + 0.5 * params.swirl;
    let z = params.amplitude_z
        * half_height
        * (params.freq_z * theta + params.phase_z + swirl_rate * phase).cos()
        + SECONDARY_Z_SCALE * bounds.height * (2.0 * theta + 0.25 * phase).cos();

    let intensity = (0.5 + 0.5 * (2.0 * theta - phase).sin()).clamp(0.0, 1.0);

    SampledPoint {
        position: Point3::new(x, y, z),
        u,
        intensity,
    }
}

/// Samples `segment_count + 1` points with `u` evenly spaced over [0, 1].
pub fn sample_curve(
    params: &StreamShapeParameters,
    bounds: &Bounds,
    segment_count: usize,
    time: f64,
) -> Result<Vec<SampledPoint>> {
    validate_sampling(bounds, segment_count, time)?;
    Ok(sample_with(segment_count, |u| sample_point(u, time, params, bounds)))
}

pub(crate) fn validate_sampling(bounds: &Bounds, segment_count: usize, time: f64) -> Result<()> {
    if segment_count == 0 {
        invalid!("segment_count must be at least 1.");
    }
    ensure_finite("time", time)?;
    bounds.validate()
}

/// Evaluates `f` at `segment_count + 1` evenly spaced path coordinates.
pub(crate) fn sample_with<F>(segment_count: usize, mut f: F) -> Vec<SampledPoint>
where
    F: FnMut(f64) -> SampledPoint,
{
    let denom = segment_count as f64;
    (0..=segment_count).map(|i| f(i as f64 / denom)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::generate;

    fn params() -> StreamShapeParameters {
        generate("stream-0", 4_096.5).expect("params")
    }

    #[test]
    fn sample_curve_spaces_u_evenly_and_includes_endpoints() {
        let bounds = Bounds::default();
        for segments in [1usize, 2, 7, 120, 200] {
            let points = sample_curve(&params(), &bounds, segments, 0.3).expect("curve");
            assert_eq!(points.len(), segments + 1);
            assert_eq!(points[0].u, 0.0);
            assert_eq!(points[segments].u, 1.0);
            let step = 1.0 / segments as f64;
            for pair in points.windows(2) {
                assert!((pair[1].u - pair[0].u - step).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn intensity_stays_in_unit_interval() {
        let bounds = Bounds::default();
        for k in 0..40 {
            let time = -3.0 + k as f64 * 0.37;
            let points = sample_curve(&params(), &bounds, 64, time).expect("curve");
            for p in points {
                assert!((0.0..=1.0).contains(&p.intensity), "intensity {}", p.intensity);
            }
        }
    }

    #[test]
    fn sample_point_is_pure() {
        let bounds = Bounds::new(640.0, 360.0).expect("bounds");
        let a = sample_point(0.42, 1.7, &params(), &bounds);
        let b = sample_point(0.42, 1.7, &params(), &bounds);
        assert_eq!(a, b);
    }

    #[test]
    fn x_sweeps_width_within_twist_margin() {
        let bounds = Bounds::new(1000.0, 400.0).expect("bounds");
        let margin = TWIST_SCALE * bounds.width;
        let start = sample_point(0.0, 0.9, &params(), &bounds);
        let end = sample_point(1.0, 0.9, &params(), &bounds);
        assert!((start.position.x + 500.0).abs() <= margin);
        assert!((end.position.x - 500.0).abs() <= margin);
    }

    #[test]
    fn curve_evolves_with_time() {
        let bounds = Bounds::default();
        let before = sample_point(0.5, 0.0, &params(), &bounds);
        let after = sample_point(0.5, 0.1, &params(), &bounds);
        assert_ne!(before.position, after.position);
    }

    #[test]
    fn sample_curve_rejects_invalid_input() {
        let bounds = Bounds::default();
        let err = sample_curve(&params(), &bounds, 0, 0.0).expect_err("zero segments");
        assert!(err.to_string().contains("segment_count"));
        let err = sample_curve(&params(), &bounds, 10, f64::INFINITY).expect_err("bad time");
        assert!(err.to_string().contains("time"));
        let bad_bounds = Bounds {
            width: -1.0,
            height: 10.0,
        };
        assert!(sample_curve(&params(), &bad_bounds, 10, 0.0).is_err());
    }
}
