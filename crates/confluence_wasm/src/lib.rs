//! Browser bridge for the Confluence core.
//!
//! The render loop owns a [`WasmScene`], calls `tick` once per animation
//! frame and reads flat geometry buffers back out. Controls forward their
//! values through the setters; the draggable reference point reports its
//! position through `move_reference`.

pub mod bindings;
pub mod scene;

pub use bindings::{detect_convergences, generate_stream_parameters, sample_stream_curve, wrap_time};
pub use scene::WasmScene;
