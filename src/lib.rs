pub mod audio;
pub mod bounce;
pub mod collision;
pub mod error;
pub mod forces;
pub mod initialize;
pub mod input;
pub mod integrate;
pub mod project;
pub mod render;
pub mod state;
pub mod world;

use bounce::{BouncePolicy, BounceTracker};
use cgmath::Vector2;
use project::Tint;

pub use error::PlaygroundError;

/// Upper bound for the user adjustable sub-step count.
pub const MAX_ITERATIONS: u32 = 64;

/// How a body's drawn half-extents react to wall overlap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SquashMode {
  /// Squashed only on the overlapping step, back at rest on the next free step.
  Instant,
  /// Free axes grow back towards rest by `rate` units per step.
  Relax { rate: f32 },
  /// The orthogonal axis inflates so the ellipse keeps its rest area.
  AreaConserving,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactParams {
  /// Coulomb coefficient for the tangential axis, 0 disables friction.
  pub friction: f32,
  pub squash: SquashMode,
}

impl Default for ContactParams {
  fn default() -> Self {
    Self {
      friction: 0.0,
      squash: SquashMode::Instant,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ForceParams {
  /// Gravity acceleration magnitude in pixels per second squared.
  pub gravity: f32,
  pub shake_scale: f32,
  pub shake_decay: f32,
  /// Gravitational constant between bodies, tuned for pixel units. 0 disables.
  pub attraction: f32,
  pub min_separation: f32,
}

impl Default for ForceParams {
  fn default() -> Self {
    Self {
      gravity: 9.8 * 256.0 / 10.0,
      shake_scale: 1e1,
      shake_decay: 0.95,
      attraction: 0.0,
      min_separation: 1.0,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimParams {
  pub viewport: Vector2<f32>,
  pub delta_t: f32,
  /// Sub-steps per rendered frame, each advancing `delta_t`.
  pub iterations: u32,
  pub settle_threshold: f32,
  pub bounce_policy: BouncePolicy,
  pub contact: ContactParams,
  pub forces: ForceParams,
}

impl Default for SimParams {
  fn default() -> Self {
    Self {
      viewport: Vector2::new(800.0, 600.0),
      delta_t: 1.0 / 60.0,
      iterations: 1,
      settle_threshold: 0.1,
      bounce_policy: BouncePolicy::Counter,
      contact: ContactParams::default(),
      forces: ForceParams::default(),
    }
  }
}

/// A simulated elliptical body. Position and velocity live in simulation
/// space, with the origin at the bottom left of the viewport and Y pointing up.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
  mass: f32,
  pub position: Vector2<f32>,
  pub velocity: Vector2<f32>,
  /// Nominal half-extents used for penetration tests.
  pub rest_size: Vector2<f32>,
  /// Half-extents as drawn this frame, possibly squashed.
  pub size: Vector2<f32>,
  pub max_size: Vector2<f32>,
  pub stiffness: f32,
  pub damping: f32,
  pub bounce: BounceTracker,
  pub tint: Tint,
}

impl Body {
  pub fn new(
    mass: f32,
    position: Vector2<f32>,
    velocity: Vector2<f32>,
    size: Vector2<f32>,
    stiffness: f32,
    damping: f32,
  ) -> Result<Self, PlaygroundError> {
    if !(mass.is_finite() && mass > 0.0) {
      return Err(PlaygroundError::InvalidMass(mass));
    }
    if !(size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite()) {
      return Err(PlaygroundError::InvalidExtent {
        x: size.x,
        y: size.y,
      });
    }
    Ok(Self {
      mass,
      position,
      velocity,
      rest_size: size,
      size,
      max_size: size * 2.0,
      stiffness: stiffness.max(0.0),
      damping: damping.max(0.0),
      bounce: BounceTracker::default(),
      tint: Tint::default(),
    })
  }

  pub fn mass(&self) -> f32 {
    self.mass
  }

  /// Raises the squash clamp. Values below the rest size are ignored.
  #[must_use]
  pub fn with_max_size(mut self, max_size: Vector2<f32>) -> Self {
    self.max_size = Vector2::new(
      max_size.x.max(self.rest_size.x),
      max_size.y.max(self.rest_size.y),
    );
    self
  }

  #[must_use]
  pub fn with_tint(mut self, tint: Tint) -> Self {
    self.tint = tint;
    self
  }
}
