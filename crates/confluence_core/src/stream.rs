use crate::error::Result;
use crate::params::{generate, StreamShapeParameters};
use crate::sampler::sample_point;
use crate::traits::Curve;
use crate::types::{Bounds, SampledPoint};
use serde::{Deserialize, Serialize};

/// One parametric flow in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub params: StreamShapeParameters,
    /// Display hue in degrees.
    pub hue: f64,
}

impl Stream {
    pub fn new(id: impl Into<String>, params: StreamShapeParameters) -> Self {
        Self {
            id: id.into(),
            hue: f64::from(params.color_seed),
            params,
        }
    }

    pub fn generate(id: impl Into<String>, seed_base: f64) -> Result<Self> {
        let id = id.into();
        let params = generate(&id, seed_base)?;
        Ok(Self::new(id, params))
    }
}

impl Curve for Stream {
    fn id(&self) -> &str {
        &self.id
    }

    fn point_at(&self, u: f64, time: f64, bounds: &Bounds) -> SampledPoint {
        sample_point(u, time, &self.params, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_hue_follows_color_seed() {
        let stream = Stream::generate("stream-4", 9_001.0).expect("stream");
        assert_eq!(stream.hue, f64::from(stream.params.color_seed));
        assert_eq!(stream.id(), "stream-4");
    }

    #[test]
    fn stream_point_at_matches_sampler() {
        let stream = Stream::generate("stream-4", 9_001.0).expect("stream");
        let bounds = Bounds::default();
        assert_eq!(
            stream.point_at(0.3, 2.0, &bounds),
            sample_point(0.3, 2.0, &stream.params, &bounds)
        );
    }
}
