//! Time-slice convergence detection.
//!
//! Every stream is sampled at the same time value, samples of different
//! streams that sit at roughly the same path coordinate are compared, and
//! close pairs become [`ConvergenceEvent`]s. Candidates are then bucketed on a
//! voxel grid, ranked by strength and capped.

use crate::error::{ensure_non_negative, invalid, Result};
use crate::sampler::{sample_with, validate_sampling};
use crate::traits::Curve;
use crate::types::{Bounds, ConvergenceEvent, SampledPoint};
use nalgebra::Point3;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on the number of events returned by [`detect`].
pub const MAX_EVENTS: usize = 200;

/// Voxel cell size as a fraction of the proximity threshold.
pub const DEDUP_CELL_FACTOR: f64 = 0.75;

/// Slack for the sorted-`u` window lookup; the exact tolerance test still
/// decides every comparison.
const WINDOW_SLACK: f64 = 1e-9;

/// Detects convergences between `streams` at `time`.
///
/// Returns at most [`MAX_EVENTS`] events ordered strongest first. Events of
/// equal strength keep their pairwise-scan order.
pub fn detect<C: Curve>(
    streams: &[C],
    time: f64,
    path_tolerance: f64,
    proximity_threshold: f64,
    segment_count: usize,
    bounds: &Bounds,
) -> Result<Vec<ConvergenceEvent>> {
    let candidates = collect_candidates(
        streams,
        time,
        path_tolerance,
        proximity_threshold,
        segment_count,
        bounds,
    )?;
    let candidate_count = candidates.len();
    let deduplicated = deduplicate(candidates, proximity_threshold);
    let unique_count = deduplicated.len();
    let events = rank(deduplicated);

    debug!(
        streams = streams.len(),
        time,
        candidates = candidate_count,
        unique = unique_count,
        returned = events.len(),
        "detected convergences"
    );
    Ok(events)
}

/// Raw candidate matches before deduplication, in pairwise-scan order:
/// streams in their given order, then increasing sample index.
pub fn collect_candidates<C: Curve>(
    streams: &[C],
    time: f64,
    path_tolerance: f64,
    proximity_threshold: f64,
    segment_count: usize,
    bounds: &Bounds,
) -> Result<Vec<ConvergenceEvent>> {
    validate_sampling(bounds, segment_count, time)?;
    ensure_non_negative("path_tolerance", path_tolerance)?;
    ensure_non_negative("proximity_threshold", proximity_threshold)?;
    ensure_unique_ids(streams)?;

    if streams.len() < 2 {
        return Ok(Vec::new());
    }

    let samples: Vec<Vec<SampledPoint>> = streams
        .iter()
        .map(|stream| {
            // The window lookup below needs `u` sorted, so pin it to the sampled coordinate.
            sample_with(segment_count, |u| SampledPoint {
                u,
                ..stream.point_at(u, time, bounds)
            })
        })
        .collect();
    let threshold_sq = proximity_threshold * proximity_threshold;

    let mut candidates = Vec::new();
    for (i, curve_a) in samples.iter().enumerate() {
        for a in curve_a {
            for (j, curve_b) in samples.iter().enumerate().skip(i + 1) {
                let start = curve_b.partition_point(|b| b.u < a.u - path_tolerance - WINDOW_SLACK);
                for b in &curve_b[start..] {
                    if b.u > a.u + path_tolerance + WINDOW_SLACK {
                        break;
                    }
                    if (a.u - b.u).abs() > path_tolerance {
                        continue;
                    }
                    if nalgebra::distance_squared(&a.position, &b.position) <= threshold_sq {
                        candidates.push(ConvergenceEvent {
                            position: nalgebra::center(&a.position, &b.position),
                            strength: 0.5 * (a.intensity + b.intensity),
                            u: 0.5 * (a.u + b.u),
                            streams: [streams[i].id().to_string(), streams[j].id().to_string()],
                        });
                    }
                }
            }
        }
    }
    Ok(candidates)
}

/// Keeps the first event per voxel of size `proximity_threshold * DEDUP_CELL_FACTOR`.
pub fn deduplicate(
    events: Vec<ConvergenceEvent>,
    proximity_threshold: f64,
) -> Vec<ConvergenceEvent> {
    let cell = proximity_threshold * DEDUP_CELL_FACTOR;
    let mut seen = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert(voxel_key(&event.position, cell)))
        .collect()
}

/// Stable strength-descending sort, capped at [`MAX_EVENTS`].
pub fn rank(mut events: Vec<ConvergenceEvent>) -> Vec<ConvergenceEvent> {
    events.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(Ordering::Equal)
    });
    events.truncate(MAX_EVENTS);
    events
}

/// Grid cell containing `position`, rounding half away from zero.
///
/// A zero cell size keys on the exact position instead (`+ 0.0` folds
/// negative zero into zero). Dividing by the zero cell would send every
/// coordinate to `±inf` or NaN and merge unrelated events, so that case
/// intentionally does not follow the plain division.
pub fn voxel_key(position: &Point3<f64>, cell: f64) -> [i64; 3] {
    if cell > 0.0 {
        [
            (position.x / cell).round() as i64,
            (position.y / cell).round() as i64,
            (position.z / cell).round() as i64,
        ]
    } else {
        [
            (position.x + 0.0).to_bits() as i64,
            (position.y + 0.0).to_bits() as i64,
            (position.z + 0.0).to_bits() as i64,
        ]
    }
}

fn ensure_unique_ids<C: Curve>(streams: &[C]) -> Result<()> {
    let mut ids = HashSet::with_capacity(streams.len());
    for stream in streams {
        if !ids.insert(stream.id()) {
            invalid!("Duplicate stream identifier: {}", stream.id());
        }
    }
    Ok(())
}
