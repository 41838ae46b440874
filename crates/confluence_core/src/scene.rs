//! Scene state driven by the presentation layer.
//!
//! The scene owns everything that changes between frames: configuration,
//! the stream set, the animation clock and the reference point. Controls talk
//! to it through [`SceneMessage`]s; each rendered frame calls [`Scene::tick`]
//! and draws the returned [`FrameSnapshot`].

use crate::clock::AnimationClock;
use crate::convergence::detect;
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, invalid, Result};
use crate::params::ParameterCache;
use crate::sampler::sample_curve;
use crate::stream::Stream;
use crate::types::{Bounds, ConvergenceEvent, SampledPoint};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seed offset between consecutive streams of one scene.
pub const STREAM_SEED_STRIDE: f64 = 101.0;

pub const STREAM_COUNT_RANGE: (usize, usize) = (1, 20);
pub const SEGMENT_COUNT_RANGE: (usize, usize) = (20, 200);
pub const PATH_TOLERANCE_RANGE: (f64, f64) = (0.005, 0.15);
pub const PROXIMITY_THRESHOLD_RANGE: (f64, f64) = (16.0, 140.0);
pub const SPEED_RANGE: (f64, f64) = (0.1, 4.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub stream_count: usize,
    pub segment_count: usize,
    pub path_tolerance: f64,
    pub proximity_threshold: f64,
    pub speed: f64,
    pub playing: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            stream_count: 6,
            segment_count: 120,
            path_tolerance: 0.04,
            proximity_threshold: 48.0,
            speed: 1.0,
            playing: true,
        }
    }
}

impl SceneConfig {
    /// Rejects values outside the domain the core can evaluate.
    ///
    /// The UI ranges are narrower; see [`SceneConfig::clamped`].
    pub fn validate(&self) -> Result<()> {
        if self.segment_count == 0 {
            invalid!("segment_count must be at least 1.");
        }
        ensure_non_negative("path_tolerance", self.path_tolerance)?;
        ensure_non_negative("proximity_threshold", self.proximity_threshold)?;
        ensure_positive("speed", self.speed)
    }

    /// Projects every value into its UI range. Non-finite reals fall back to
    /// the default.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let clamp_real = |value: f64, fallback: f64, (min, max): (f64, f64)| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };
        Self {
            stream_count: self
                .stream_count
                .clamp(STREAM_COUNT_RANGE.0, STREAM_COUNT_RANGE.1),
            segment_count: self
                .segment_count
                .clamp(SEGMENT_COUNT_RANGE.0, SEGMENT_COUNT_RANGE.1),
            path_tolerance: clamp_real(
                self.path_tolerance,
                defaults.path_tolerance,
                PATH_TOLERANCE_RANGE,
            ),
            proximity_threshold: clamp_real(
                self.proximity_threshold,
                defaults.proximity_threshold,
                PROXIMITY_THRESHOLD_RANGE,
            ),
            speed: clamp_real(self.speed, defaults.speed, SPEED_RANGE),
            playing: self.playing,
        }
    }
}

/// A change reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneMessage {
    /// Regenerates the stream set from a fresh seed basis.
    StreamCount { count: usize, seed_basis: f64 },
    SegmentCount(usize),
    PathTolerance(f64),
    ProximityThreshold(f64),
    Speed(f64),
    Playing(bool),
    /// Jumps the clock to an absolute curve time.
    Seek(f64),
    Rewind,
    /// The reference point was dragged to a new position.
    ReferenceMoved(Point3<f64>),
}

/// Sampled geometry of one stream for the current frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveSnapshot {
    pub id: String,
    pub hue: f64,
    pub points: Vec<SampledPoint>,
}

/// A convergence event with its distance to the reference point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceReport {
    pub event: ConvergenceEvent,
    pub distance: f64,
}

/// Everything the presentation layer draws for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub time: f64,
    /// Wrapped time, used as the path coordinate to highlight.
    pub emphasis_u: f64,
    pub reference: Point3<f64>,
    pub curves: Vec<CurveSnapshot>,
    /// Strongest first.
    pub convergences: Vec<ConvergenceReport>,
}

impl FrameSnapshot {
    pub fn nearest_to_reference(&self) -> Option<&ConvergenceReport> {
        self.convergences
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Reports whose event involves the stream `id`, strongest first.
    pub fn involving<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ConvergenceReport> {
        self.convergences.iter().filter(move |r| r.event.involves(id))
    }
}

#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    bounds: Bounds,
    seed_basis: f64,
    streams: Vec<Stream>,
    cache: ParameterCache,
    clock: AnimationClock,
    reference: Point3<f64>,
}

impl Scene {
    pub fn new(config: SceneConfig, bounds: Bounds, seed_basis: f64) -> Result<Self> {
        config.validate()?;
        bounds.validate()?;
        let mut scene = Self {
            config,
            bounds,
            seed_basis,
            streams: Vec::new(),
            cache: ParameterCache::new(),
            clock: AnimationClock::new(config.speed, config.playing)?,
            reference: Point3::origin(),
        };
        scene.regenerate(config.stream_count, seed_basis)?;
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn seed_basis(&self) -> f64 {
        self.seed_basis
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn reference(&self) -> Point3<f64> {
        self.reference
    }

    /// Applies one control change. On error the scene is left untouched.
    pub fn apply(&mut self, message: SceneMessage) -> Result<()> {
        match message {
            SceneMessage::StreamCount { count, seed_basis } => {
                self.regenerate(count, seed_basis)?;
            }
            SceneMessage::SegmentCount(segment_count) => {
                if segment_count == 0 {
                    invalid!("segment_count must be at least 1.");
                }
                self.config.segment_count = segment_count;
            }
            SceneMessage::PathTolerance(tolerance) => {
                ensure_non_negative("path_tolerance", tolerance)?;
                self.config.path_tolerance = tolerance;
            }
            SceneMessage::ProximityThreshold(threshold) => {
                ensure_non_negative("proximity_threshold", threshold)?;
                self.config.proximity_threshold = threshold;
            }
            SceneMessage::Speed(speed) => {
                self.clock.set_speed(speed)?;
                self.config.speed = speed;
            }
            SceneMessage::Playing(playing) => {
                self.clock.set_playing(playing);
                self.config.playing = playing;
            }
            SceneMessage::Seek(time) => {
                self.clock.set_time(time)?;
            }
            SceneMessage::Rewind => {
                self.clock.reset();
            }
            SceneMessage::ReferenceMoved(position) => {
                for coord in position.coords.iter() {
                    ensure_finite("reference coordinate", *coord)?;
                }
                self.reference = position;
            }
        }
        Ok(())
    }

    /// Advances the clock by `delta` seconds and samples the new time-slice.
    pub fn tick(&mut self, delta: f64) -> Result<FrameSnapshot> {
        self.clock.tick(delta)?;
        self.snapshot()
    }

    /// Samples the current time-slice without advancing the clock.
    pub fn snapshot(&self) -> Result<FrameSnapshot> {
        let time = self.clock.time();
        let segment_count = self.config.segment_count;

        let curves = self
            .streams
            .iter()
            .map(|stream| {
                Ok(CurveSnapshot {
                    id: stream.id.clone(),
                    hue: stream.hue,
                    points: sample_curve(&stream.params, &self.bounds, segment_count, time)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let convergences = detect(
            &self.streams,
            time,
            self.config.path_tolerance,
            self.config.proximity_threshold,
            segment_count,
            &self.bounds,
        )?
        .into_iter()
        .map(|event| ConvergenceReport {
            distance: nalgebra::distance(&self.reference, &event.position),
            event,
        })
        .collect();

        Ok(FrameSnapshot {
            time,
            emphasis_u: self.clock.wrapped(),
            reference: self.reference,
            curves,
            convergences,
        })
    }

    fn regenerate(&mut self, count: usize, seed_basis: f64) -> Result<()> {
        ensure_finite("seed_basis", seed_basis)?;
        if seed_basis.to_bits() != self.seed_basis.to_bits() {
            self.cache.clear();
        }
        let streams = (0..count)
            .map(|i| {
                let id = format!("stream-{i}");
                let seed = seed_basis + i as f64 * STREAM_SEED_STRIDE;
                let params = self.cache.get_or_generate(&id, seed)?;
                Ok(Stream::new(id, params))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count, seed_basis, "regenerated streams");
        self.streams = streams;
        self.seed_basis = seed_basis;
        self.config.stream_count = count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::BASE_RATE;

    fn scene_with(config: SceneConfig, seed_basis: f64) -> Scene {
        Scene::new(config, Bounds::default(), seed_basis).expect("scene")
    }

    #[test]
    fn default_config_is_valid_and_within_ui_ranges() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clamped(), config);
    }

    #[test]
    fn clamped_projects_into_ui_ranges() {
        let config = SceneConfig {
            stream_count: 0,
            segment_count: 5_000,
            path_tolerance: f64::NAN,
            proximity_threshold: 1.0,
            speed: 9.0,
            playing: false,
        }
        .clamped();
        assert_eq!(config.stream_count, 1);
        assert_eq!(config.segment_count, 200);
        assert_eq!(config.path_tolerance, SceneConfig::default().path_tolerance);
        assert_eq!(config.proximity_threshold, 16.0);
        assert_eq!(config.speed, 4.0);
        assert!(!config.playing);
    }

    #[test]
    fn validate_rejects_out_of_domain_values() {
        let base = SceneConfig::default();
        let cases = [
            (
                SceneConfig {
                    segment_count: 0,
                    ..base
                },
                "segment_count",
            ),
            (
                SceneConfig {
                    path_tolerance: -0.1,
                    ..base
                },
                "path_tolerance",
            ),
            (
                SceneConfig {
                    proximity_threshold: f64::INFINITY,
                    ..base
                },
                "proximity_threshold",
            ),
            (
                SceneConfig {
                    speed: 0.0,
                    ..base
                },
                "speed",
            ),
        ];
        for (config, needle) in cases {
            let err = config.validate().expect_err("invalid config");
            assert!(err.to_string().contains(needle), "unexpected error: {err}");
        }
        let negative_speed = SceneConfig {
            speed: -1.0,
            ..base
        };
        assert!(Scene::new(negative_speed, Bounds::default(), 0.0).is_err());
    }

    #[test]
    fn scene_builds_named_streams_from_seed_basis() {
        let scene = scene_with(SceneConfig::default(), 31_337.0);
        assert_eq!(scene.streams().len(), 6);
        for (i, stream) in scene.streams().iter().enumerate() {
            assert_eq!(stream.id, format!("stream-{i}"));
            let expected = Stream::generate(stream.id.clone(), 31_337.0 + i as f64 * 101.0)
                .expect("stream");
            assert_eq!(*stream, expected);
        }
    }

    #[test]
    fn injected_seed_basis_makes_regeneration_reproducible() {
        let a = scene_with(SceneConfig::default(), 12.5);
        let b = scene_with(SceneConfig::default(), 12.5);
        let c = scene_with(SceneConfig::default(), 13.5);
        assert_eq!(a.streams(), b.streams());
        assert_ne!(a.streams(), c.streams());
    }

    #[test]
    fn stream_count_message_regenerates_streams() {
        let mut scene = scene_with(SceneConfig::default(), 500.0);
        let before: Vec<Stream> = scene.streams().to_vec();

        scene
            .apply(SceneMessage::StreamCount {
                count: 9,
                seed_basis: 500.0,
            })
            .expect("apply");
        assert_eq!(scene.streams().len(), 9);
        assert_eq!(scene.config().stream_count, 9);
        assert_eq!(&scene.streams()[..6], before.as_slice());

        scene
            .apply(SceneMessage::StreamCount {
                count: 2,
                seed_basis: 900.0,
            })
            .expect("apply");
        assert_eq!(scene.streams().len(), 2);
        assert_eq!(scene.seed_basis(), 900.0);
        assert_ne!(scene.streams()[0], before[0]);
    }

    #[test]
    fn rejected_messages_leave_scene_unchanged() {
        let mut scene = scene_with(SceneConfig::default(), 1.0);
        let config = *scene.config();
        let streams = scene.streams().to_vec();

        assert!(scene.apply(SceneMessage::SegmentCount(0)).is_err());
        assert!(scene.apply(SceneMessage::PathTolerance(-1.0)).is_err());
        assert!(scene.apply(SceneMessage::ProximityThreshold(f64::NAN)).is_err());
        assert!(scene.apply(SceneMessage::Speed(0.0)).is_err());
        assert!(scene
            .apply(SceneMessage::StreamCount {
                count: 3,
                seed_basis: f64::NAN,
            })
            .is_err());
        assert!(scene
            .apply(SceneMessage::ReferenceMoved(Point3::new(0.0, f64::NAN, 0.0)))
            .is_err());

        assert_eq!(*scene.config(), config);
        assert_eq!(scene.streams(), streams.as_slice());
        assert_eq!(scene.reference(), Point3::origin());
    }

    #[test]
    fn tick_honours_play_state_and_speed() {
        let mut scene = scene_with(SceneConfig::default(), 2.0);
        scene.apply(SceneMessage::Speed(2.0)).expect("speed");
        let frame = scene.tick(1.0).expect("tick");
        assert!((frame.time - 2.0 * BASE_RATE).abs() < 1e-12);

        scene.apply(SceneMessage::Playing(false)).expect("pause");
        let paused = scene.tick(3.0).expect("tick");
        assert_eq!(paused.time, frame.time);
        assert!(!scene.config().playing);
        assert!(scene.tick(-1.0).is_err());
    }

    #[test]
    fn seek_and_rewind_move_the_clock() {
        let mut scene = scene_with(SceneConfig::default(), 3.0);
        scene.apply(SceneMessage::Seek(12.25)).expect("seek");
        let frame = scene.snapshot().expect("snapshot");
        assert_eq!(frame.time, 12.25);
        assert!((frame.emphasis_u - 0.25).abs() < 1e-12);

        assert!(scene.apply(SceneMessage::Seek(f64::INFINITY)).is_err());
        assert_eq!(scene.clock().time(), 12.25);

        scene.apply(SceneMessage::Rewind).expect("rewind");
        assert_eq!(scene.snapshot().expect("snapshot").time, 0.0);
    }

    #[test]
    fn involving_filters_reports_by_stream() {
        let config = SceneConfig {
            stream_count: 8,
            proximity_threshold: 140.0,
            path_tolerance: 0.15,
            ..SceneConfig::default()
        };
        let scene = scene_with(config, 64.0);
        let frame = scene.snapshot().expect("snapshot");
        let mut total = 0;
        for stream in scene.streams() {
            let reports: Vec<_> = frame.involving(&stream.id).collect();
            assert!(reports.iter().all(|r| r.event.streams.contains(&stream.id)));
            total += reports.len();
        }
        // Every event names two streams.
        assert_eq!(total, 2 * frame.convergences.len());
        assert_eq!(frame.involving("missing").count(), 0);
    }

    #[test]
    fn snapshot_samples_every_stream() {
        let mut scene = scene_with(SceneConfig::default(), 77.0);
        scene.apply(SceneMessage::SegmentCount(40)).expect("segments");
        let frame = scene.snapshot().expect("snapshot");
        assert_eq!(frame.curves.len(), 6);
        for (curve, stream) in frame.curves.iter().zip(scene.streams()) {
            assert_eq!(curve.id, stream.id);
            assert_eq!(curve.hue, stream.hue);
            assert_eq!(curve.points.len(), 41);
        }
        assert!(frame.convergences.len() <= crate::convergence::MAX_EVENTS);
        assert!((0.0..1.0).contains(&frame.emphasis_u));
    }

    #[test]
    fn single_stream_scene_has_no_convergences() {
        let config = SceneConfig {
            stream_count: 1,
            proximity_threshold: 140.0,
            path_tolerance: 0.15,
            ..SceneConfig::default()
        };
        let mut scene = scene_with(config, 4.0);
        for _ in 0..5 {
            let frame = scene.tick(0.5).expect("tick");
            assert!(frame.convergences.is_empty());
        }
    }

    #[test]
    fn reports_measure_distance_to_reference() {
        let config = SceneConfig {
            stream_count: 8,
            proximity_threshold: 140.0,
            path_tolerance: 0.15,
            ..SceneConfig::default()
        };
        let mut scene = scene_with(config, 64.0);
        let reference = Point3::new(10.0, -20.0, 30.0);
        scene
            .apply(SceneMessage::ReferenceMoved(reference))
            .expect("move");

        let frame = scene.snapshot().expect("snapshot");
        assert_eq!(frame.reference, reference);
        for report in &frame.convergences {
            let expected = (report.event.position - reference).norm();
            assert!((report.distance - expected).abs() < 1e-9);
        }
        if let Some(nearest) = frame.nearest_to_reference() {
            assert!(frame
                .convergences
                .iter()
                .all(|r| r.distance >= nearest.distance));
        }
    }

    #[test]
    fn detection_does_not_depend_on_reference() {
        let mut scene = scene_with(SceneConfig::default(), 8.0);
        let before = scene.snapshot().expect("snapshot");
        scene
            .apply(SceneMessage::ReferenceMoved(Point3::new(400.0, 0.0, -90.0)))
            .expect("move");
        let after = scene.snapshot().expect("snapshot");
        let events = |f: &FrameSnapshot| -> Vec<ConvergenceEvent> {
            f.convergences.iter().map(|r| r.event.clone()).collect()
        };
        assert_eq!(events(&before), events(&after));
    }
}
