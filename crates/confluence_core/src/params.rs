//! Deterministic per-stream shape parameters.

use crate::error::{ensure_finite, invalid, Result};
use crate::prng::{remap, to_int32, unit_random};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Sub-seed mixing constants: `seed_base * SEED_MULTIPLIERS[k] + len * LENGTH_MULTIPLIERS[k]`.
const SEED_MULTIPLIERS: [f64; 4] = [31.0, 131.0, 313.0, 1031.0];
const LENGTH_MULTIPLIERS: [f64; 4] = [7.0, 11.0, 13.0, 17.0];

pub const FREQUENCY_RANGE: (f64, f64) = (1.0, 4.5);
pub const AMPLITUDE_RANGE: (f64, f64) = (0.25, 0.70);
pub const COEFFICIENT_RANGE: (f64, f64) = (-1.0, 1.0);

/// Shape of one stream. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamShapeParameters {
    pub freq_x: f64,
    pub freq_y: f64,
    pub freq_z: f64,
    /// Fraction of the height bound.
    pub amplitude_y: f64,
    pub amplitude_z: f64,
    pub twist: f64,
    pub swirl: f64,
    pub phase_y: f64,
    pub phase_z: f64,
    /// Hue seed in [0, 360).
    pub color_seed: u16,
}

/// Derives the shape of stream `identifier` from `seed_base`.
///
/// Pure: the same `(identifier, seed_base)` always yields bit-identical
/// parameters. Only the identifier's length (in UTF-16 code units) enters
/// the derivation, so distinct streams need distinct seeds.
pub fn generate(identifier: &str, seed_base: f64) -> Result<StreamShapeParameters> {
    if identifier.is_empty() {
        invalid!("Stream identifier must be non-empty.");
    }
    ensure_finite("seed_base", seed_base)?;

    let len = identifier.encode_utf16().count() as f64;
    let mut seeds = [0i32; 4];
    for (k, seed) in seeds.iter_mut().enumerate() {
        *seed = to_int32(seed_base * SEED_MULTIPLIERS[k] + len * LENGTH_MULTIPLIERS[k]);
    }
    let [s1, s2, s3, s4] = seeds;

    let (f_min, f_max) = FREQUENCY_RANGE;
    let (a_min, a_max) = AMPLITUDE_RANGE;
    let (c_min, c_max) = COEFFICIENT_RANGE;

    Ok(StreamShapeParameters {
        freq_x: remap(s1, f_min, f_max),
        freq_y: remap(s2, f_min, f_max),
        freq_z: remap(s3, f_min, f_max),
        amplitude_y: remap(s4, a_min, a_max),
        amplitude_z: remap(s1 ^ s2, a_min, a_max),
        twist: remap(s2 ^ s3, c_min, c_max),
        swirl: remap(s3 ^ s4, c_min, c_max),
        phase_y: remap(s1 ^ s3, 0.0, TAU),
        phase_z: remap(s2 ^ s4, 0.0, TAU),
        color_seed: ((unit_random(s1 ^ s4) * 360.0).floor() as u16).min(359),
    })
}

/// Memoizes [`generate`] per `(identifier, seed_base)`.
#[derive(Debug, Default)]
pub struct ParameterCache {
    entries: HashMap<(String, u64), StreamShapeParameters>,
}

impl ParameterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_generate(
        &mut self,
        identifier: &str,
        seed_base: f64,
    ) -> Result<StreamShapeParameters> {
        let key = (identifier.to_string(), seed_base.to_bits());
        if let Some(params) = self.entries.get(&key) {
            return Ok(*params);
        }
        let params = generate(identifier, seed_base)?;
        self.entries.insert(key, params);
        Ok(params)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
