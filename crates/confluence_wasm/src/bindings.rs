//! Stateless bindings of the core operations.

use crate::scene::core_error;
use confluence_core::clock::wrap_unit;
use confluence_core::convergence::detect;
use confluence_core::params::{generate, StreamShapeParameters};
use confluence_core::sampler::sample_curve;
use confluence_core::stream::Stream;
use confluence_core::types::Bounds;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn generate_stream_parameters(identifier: &str, seed_base: f64) -> Result<JsValue, JsValue> {
    let params =
        generate(identifier, seed_base).map_err(|e| core_error("Parameter generation failed", e))?;
    to_value(&params).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
pub fn sample_stream_curve(
    params: JsValue,
    width: f64,
    height: f64,
    segment_count: u32,
    time: f64,
) -> Result<JsValue, JsValue> {
    let params: StreamShapeParameters = from_value(params)
        .map_err(|e| JsValue::from_str(&format!("Invalid stream parameters: {}", e)))?;
    let bounds = Bounds::new(width, height).map_err(|e| core_error("Sampling failed", e))?;
    let points = sample_curve(&params, &bounds, segment_count as usize, time)
        .map_err(|e| core_error("Sampling failed", e))?;
    to_value(&points).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// `streams` is an array of `{ id, params, hue }` objects.
#[wasm_bindgen]
pub fn detect_convergences(
    streams: JsValue,
    time: f64,
    path_tolerance: f64,
    proximity_threshold: f64,
    segment_count: u32,
    width: f64,
    height: f64,
) -> Result<JsValue, JsValue> {
    let streams: Vec<Stream> =
        from_value(streams).map_err(|e| JsValue::from_str(&format!("Invalid streams: {}", e)))?;
    let bounds = Bounds::new(width, height).map_err(|e| core_error("Detection failed", e))?;
    let events = detect(
        &streams,
        time,
        path_tolerance,
        proximity_threshold,
        segment_count as usize,
        &bounds,
    )
    .map_err(|e| core_error("Detection failed", e))?;
    to_value(&events).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Path coordinate to emphasise for an accumulated clock time.
#[wasm_bindgen]
pub fn wrap_time(time: f64) -> f64 {
    wrap_unit(time)
}
