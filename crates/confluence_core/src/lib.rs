pub mod clock;
pub mod color;
pub mod convergence;
pub mod error;
pub mod params;
pub mod prng;
pub mod sampler;
pub mod scene;
pub mod stream;
/// The `confluence_core` crate is the engine behind the Confluence stream
/// visualization. It turns a handful of configuration values into sampled
/// space curves and the convergence events between them, one time-slice at a
/// time.
///
/// Key components:
/// - **Params**: deterministic per-stream shape parameters from an identifier and a seed.
/// - **Sampler**: curve positions and intensities at a path coordinate and time.
/// - **Convergence**: pairwise proximity detection, voxel deduplication and ranking.
/// - **Clock / Scene**: frame-driven time and the state the presentation layer mutates.
pub mod traits;
pub mod types;

pub use error::{Result, StreamError};
