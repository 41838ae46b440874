//! Scene handle driven by the browser render loop.

use confluence_core::color::vertex_color;
use confluence_core::scene::{FrameSnapshot, Scene, SceneConfig, SceneMessage};
use confluence_core::types::Bounds;
use confluence_core::StreamError;
use js_sys::{Float32Array, Float64Array};
use nalgebra::Point3;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn core_error(context: &str, err: StreamError) -> JsValue {
    JsValue::from_str(&format!("{context}: {err}"))
}

#[wasm_bindgen]
pub struct WasmScene {
    pub(crate) scene: Scene,
    frame: FrameSnapshot,
}

impl WasmScene {
    pub(crate) fn build(
        config: SceneConfig,
        width: f64,
        height: f64,
        seed_basis: f64,
    ) -> Result<WasmScene, StreamError> {
        let bounds = Bounds::new(width, height)?;
        let scene = Scene::new(config, bounds, seed_basis)?;
        let frame = scene.snapshot()?;
        Ok(WasmScene { scene, frame })
    }

    fn send(&mut self, message: SceneMessage) -> Result<(), JsValue> {
        self.scene
            .apply(message)
            .map_err(|e| core_error("Scene update failed", e))?;
        self.refresh()
    }

    fn refresh(&mut self) -> Result<(), JsValue> {
        self.frame = self
            .scene
            .snapshot()
            .map_err(|e| core_error("Frame sampling failed", e))?;
        Ok(())
    }

    pub(crate) fn flat_curve_positions(&self, index: usize) -> Option<Vec<f64>> {
        let curve = self.frame.curves.get(index)?;
        Some(
            curve
                .points
                .iter()
                .flat_map(|p| [p.position.x, p.position.y, p.position.z])
                .collect(),
        )
    }

    pub(crate) fn flat_curve_colors(&self, index: usize) -> Option<Vec<f32>> {
        let curve = self.frame.curves.get(index)?;
        Some(
            curve
                .points
                .iter()
                .flat_map(|p| vertex_color(curve.hue, p.intensity))
                .collect(),
        )
    }

    pub(crate) fn flat_convergence_positions(&self) -> Vec<f64> {
        self.frame
            .convergences
            .iter()
            .flat_map(|r| [r.event.position.x, r.event.position.y, r.event.position.z])
            .collect()
    }
}

#[wasm_bindgen]
impl WasmScene {
    /// `config` may be `undefined` or `null` for the defaults; missing fields
    /// also fall back to their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        width: f64,
        height: f64,
        seed_basis: f64,
    ) -> Result<WasmScene, JsValue> {
        console_error_panic_hook::set_once();

        let config: SceneConfig = if config.is_undefined() || config.is_null() {
            SceneConfig::default()
        } else {
            from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid scene config: {}", e)))?
        };

        WasmScene::build(config, width, height, seed_basis)
            .map_err(|e| core_error("Scene init failed", e))
    }

    pub fn with_defaults(width: f64, height: f64, seed_basis: f64) -> Result<WasmScene, JsValue> {
        console_error_panic_hook::set_once();
        WasmScene::build(SceneConfig::default(), width, height, seed_basis)
            .map_err(|e| core_error("Scene init failed", e))
    }

    /// Advances the clock by `delta` seconds and resamples the frame.
    pub fn tick(&mut self, delta: f64) -> Result<(), JsValue> {
        self.frame = self
            .scene
            .tick(delta)
            .map_err(|e| core_error("Tick failed", e))?;
        Ok(())
    }

    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_value(&self.frame).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_value(self.scene.config())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn set_stream_count(&mut self, count: u32, seed_basis: f64) -> Result<(), JsValue> {
        self.send(SceneMessage::StreamCount {
            count: count as usize,
            seed_basis,
        })
    }

    pub fn set_segment_count(&mut self, segment_count: u32) -> Result<(), JsValue> {
        self.send(SceneMessage::SegmentCount(segment_count as usize))
    }

    pub fn set_path_tolerance(&mut self, tolerance: f64) -> Result<(), JsValue> {
        self.send(SceneMessage::PathTolerance(tolerance))
    }

    pub fn set_proximity_threshold(&mut self, threshold: f64) -> Result<(), JsValue> {
        self.send(SceneMessage::ProximityThreshold(threshold))
    }

    /// Speed only affects future ticks, so the frame is kept.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), JsValue> {
        self.scene
            .apply(SceneMessage::Speed(speed))
            .map_err(|e| core_error("Scene update failed", e))
    }

    pub fn set_playing(&mut self, playing: bool) -> Result<(), JsValue> {
        self.scene
            .apply(SceneMessage::Playing(playing))
            .map_err(|e| core_error("Scene update failed", e))
    }

    /// Jumps to an absolute curve time and resamples the frame.
    pub fn seek(&mut self, time: f64) -> Result<(), JsValue> {
        self.send(SceneMessage::Seek(time))
    }

    pub fn rewind(&mut self) -> Result<(), JsValue> {
        self.send(SceneMessage::Rewind)
    }

    /// Reports the dragged reference point; detection is unaffected, only
    /// the distances are recomputed.
    pub fn move_reference(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.send(SceneMessage::ReferenceMoved(Point3::new(x, y, z)))
    }

    pub fn time(&self) -> f64 {
        self.frame.time
    }

    pub fn emphasis_u(&self) -> f64 {
        self.frame.emphasis_u
    }

    pub fn is_playing(&self) -> bool {
        self.scene.clock().is_playing()
    }

    pub fn stream_count(&self) -> usize {
        self.scene.streams().len()
    }

    pub fn stream_ids(&self) -> Vec<String> {
        self.scene.streams().iter().map(|s| s.id.clone()).collect()
    }

    pub fn stream_hues(&self) -> Vec<f64> {
        self.scene.streams().iter().map(|s| s.hue).collect()
    }

    pub fn convergence_count(&self) -> usize {
        self.frame.convergences.len()
    }

    pub fn convergence_strengths(&self) -> Vec<f64> {
        self.frame
            .convergences
            .iter()
            .map(|r| r.event.strength)
            .collect()
    }

    pub fn convergence_distances(&self) -> Vec<f64> {
        self.frame.convergences.iter().map(|r| r.distance).collect()
    }

    /// Distance from the reference point to the closest event, if any.
    pub fn nearest_convergence_distance(&self) -> Option<f64> {
        self.frame.nearest_to_reference().map(|r| r.distance)
    }

    /// Stream pair of the event closest to the reference point; empty when
    /// there are no events.
    pub fn nearest_convergence_streams(&self) -> Vec<String> {
        self.frame
            .nearest_to_reference()
            .map(|r| r.event.streams.to_vec())
            .unwrap_or_default()
    }

    pub fn stream_convergence_count(&self, id: &str) -> usize {
        self.frame.involving(id).count()
    }

    /// Flat `[x0, y0, z0, x1, ...]` buffer of one stream's samples.
    pub fn curve_positions(&self, index: usize) -> Result<Float64Array, JsValue> {
        let positions = self
            .flat_curve_positions(index)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown stream index: {}", index)))?;
        Ok(Float64Array::from(positions.as_slice()))
    }

    /// Flat `[r0, g0, b0, r1, ...]` vertex colours of one stream's samples.
    pub fn curve_colors(&self, index: usize) -> Result<Float32Array, JsValue> {
        let colors = self
            .flat_curve_colors(index)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown stream index: {}", index)))?;
        Ok(Float32Array::from(colors.as_slice()))
    }

    pub fn convergence_positions(&self) -> Float64Array {
        Float64Array::from(self.flat_convergence_positions().as_slice())
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn wasm_scene_accepts_undefined_config() {
        let scene = WasmScene::new(JsValue::UNDEFINED, 900.0, 420.0, 3.0).expect("scene");
        assert_eq!(scene.stream_count(), 6);
    }

    #[wasm_bindgen_test]
    fn wasm_scene_reads_partial_config() {
        let config = to_value(&SceneConfig {
            stream_count: 4,
            ..SceneConfig::default()
        })
        .expect("config");
        let scene = WasmScene::new(config, 900.0, 420.0, 3.0).expect("scene");
        assert_eq!(scene.stream_count(), 4);
    }

    #[wasm_bindgen_test]
    fn wasm_scene_rejects_invalid_config() {
        let result = WasmScene::new(JsValue::from_str("nope"), 900.0, 420.0, 3.0);
        let message = result.err().and_then(|err| err.as_string()).unwrap_or_default();
        assert!(message.contains("Invalid scene config"));
    }

    #[wasm_bindgen_test]
    fn wasm_scene_rejects_invalid_updates() {
        let mut scene = WasmScene::with_defaults(900.0, 420.0, 3.0).expect("scene");
        let err = scene.set_segment_count(0).expect_err("zero segments");
        let message = err.as_string().unwrap_or_default();
        assert!(message.contains("segment_count"));
        assert!(scene.tick(-1.0).is_err());
        assert!(scene.curve_positions(42).is_err());
    }

    #[wasm_bindgen_test]
    fn wasm_scene_frame_serializes() {
        let mut scene = WasmScene::with_defaults(900.0, 420.0, 3.0).expect("scene");
        scene.tick(0.25).expect("tick");
        assert!(scene.frame().expect("frame").is_object());
        assert_eq!(scene.curve_positions(0).expect("positions").length(), 121 * 3);
    }
}
