use crate::Body;
use cgmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Integration {
  Advanced,
  /// Velocity and force were all below the settle threshold, nothing moved.
  Frozen,
}

/// True when both velocity and force components are below `threshold`.
pub fn is_settled(velocity: Vector2<f32>, force: Vector2<f32>, threshold: f32) -> bool {
  velocity.y.abs() < threshold
    && velocity.x.abs() < threshold
    && force.y.abs() < threshold
    && force.x.abs() < threshold
}

/// Semi-implicit Euler step: velocity first, then position from the new velocity.
///
/// A body whose velocity and net force are all under `threshold` is left
/// untouched. Bodies resting close to the threshold can stick instead of
/// settling asymptotically.
pub fn integrate(body: &mut Body, force: Vector2<f32>, dt: f32, threshold: f32) -> Integration {
  if is_settled(body.velocity, force, threshold) {
    return Integration::Frozen;
  }
  let acceleration = force / body.mass();
  body.velocity += acceleration * dt;
  body.position += body.velocity * dt;
  Integration::Advanced
}
