//! External forces: gravity, window shake and mutual attraction.

use crate::{Body, ForceParams};
use cgmath::{InnerSpace, Vector2, Zero};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GravityDirection {
  #[default]
  Down,
  Up,
}

impl GravityDirection {
  pub fn sign(self) -> f32 {
    match self {
      GravityDirection::Down => -1.0,
      GravityDirection::Up => 1.0,
    }
  }
}

pub fn gravity(mass: f32, magnitude: f32, direction: GravityDirection) -> Vector2<f32> {
  Vector2::new(0.0, direction.sign() * magnitude * mass)
}

/// Pseudo-acceleration from the host window being dragged around. Moving the
/// window one way pushes the bodies the other way, then fades out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WindowShake {
  last_position: Option<Vector2<f32>>,
  acceleration: Vector2<f32>,
}

impl Default for WindowShake {
  fn default() -> Self {
    Self {
      last_position: None,
      acceleration: Vector2::zero(),
    }
  }
}

impl WindowShake {
  /// Feeds this frame's window position (Y up). `None` when the platform
  /// cannot report it, in which case the shake only decays.
  pub fn observe(&mut self, position: Option<Vector2<f32>>, params: &ForceParams) -> Vector2<f32> {
    let delta = match (position, self.last_position) {
      (Some(position), Some(last)) => position - last,
      _ => Vector2::zero(),
    };
    if position.is_some() {
      self.last_position = position;
    }
    self.acceleration = (self.acceleration - delta * params.shake_scale) * params.shake_decay;
    self.acceleration
  }

  pub fn acceleration(&self) -> Vector2<f32> {
    self.acceleration
  }
}

/// Newtonian pull of `other` on `body`. The separation is clamped to
/// `min_separation`, and coincident bodies do not attract at all.
pub fn attraction(body: &Body, other: &Body, constant: f32, min_separation: f32) -> Vector2<f32> {
  let offset = other.position - body.position;
  let distance = offset.magnitude();
  if distance == 0.0 || !distance.is_finite() {
    return Vector2::zero();
  }
  let clamped = distance.max(min_separation);
  let magnitude = constant * body.mass() * other.mass() / (clamped * clamped);
  offset / distance * magnitude
}

/// Net external force on every body for one sub-step. The shake acceleration
/// is scaled by each body's mass.
pub fn external_forces(
  bodies: &[Body],
  direction: GravityDirection,
  shake: Vector2<f32>,
  params: &ForceParams,
) -> Vec<Vector2<f32>> {
  let mut forces: Vec<Vector2<f32>> = bodies
    .iter()
    .map(|body| gravity(body.mass(), params.gravity, direction) + shake * body.mass())
    .collect();
  if params.attraction > 0.0 {
    for i in 0..bodies.len() {
      for j in i + 1..bodies.len() {
        let pull = attraction(&bodies[i], &bodies[j], params.attraction, params.min_separation);
        forces[i] += pull;
        forces[j] -= pull;
      }
    }
  }
  forces
}
