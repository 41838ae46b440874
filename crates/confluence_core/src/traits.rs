use crate::types::{Bounds, SampledPoint};

/// A named space curve that can be evaluated at any path coordinate and time.
pub trait Curve {
    /// Identifier, unique within a scene.
    fn id(&self) -> &str;

    /// Evaluates the curve.
    /// u: path coordinate in [0, 1]
    /// time: curve time (unbounded)
    /// bounds: spatial scale of the scene
    ///
    /// The returned `u` should equal the input. Convergence detection
    /// overwrites it with the sampled coordinate either way.
    fn point_at(&self, u: f64, time: f64, bounds: &Bounds) -> SampledPoint;
}

impl<C: Curve + ?Sized> Curve for &C {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn point_at(&self, u: f64, time: f64, bounds: &Bounds) -> SampledPoint {
        (**self).point_at(u, time, bounds)
    }
}
