//! Per-frame simulation context: everything the frame loop mutates lives here.

use crate::collision::{self, Contact};
use crate::forces::{self, GravityDirection, WindowShake};
use crate::integrate::{self, Integration};
use crate::project::{self, Projection};
use crate::{Body, PlaygroundError, SimParams, MAX_ITERATIONS};
use cgmath::Vector2;
use log::{debug, trace};

/// Input sampled once per rendered frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
  /// Set while a gravity key is held.
  pub gravity: Option<GravityDirection>,
  /// Net iteration key presses since the previous frame.
  pub iteration_delta: i32,
  /// Window position with Y pointing up, if the platform reports it.
  pub window_position: Option<Vector2<f32>>,
}

/// One wall impact, reported on the first step of its overlap episode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BounceEvent {
  pub body: usize,
  /// `[x, y]` axes that started bouncing.
  pub axes: [bool; 2],
  /// Velocity right after the impact step.
  pub velocity: Vector2<f32>,
}

pub struct Playground {
  params: SimParams,
  bodies: Vec<Body>,
  gravity: GravityDirection,
  shake: WindowShake,
  iterations: u32,
  steps: u64,
}

impl Playground {
  pub fn new(params: SimParams, bodies: Vec<Body>) -> Result<Self, PlaygroundError> {
    if bodies.is_empty() || bodies.len() > 2 {
      return Err(PlaygroundError::UnsupportedBodyCount(bodies.len()));
    }
    Ok(Self {
      iterations: params.iterations.clamp(1, MAX_ITERATIONS),
      params,
      bodies,
      gravity: GravityDirection::default(),
      shake: WindowShake::default(),
      steps: 0,
    })
  }

  pub fn params(&self) -> &SimParams {
    &self.params
  }

  pub fn bodies(&self) -> &[Body] {
    &self.bodies
  }

  pub fn gravity(&self) -> GravityDirection {
    self.gravity
  }

  pub fn iterations(&self) -> u32 {
    self.iterations
  }

  /// Total sub-steps advanced so far.
  pub fn steps(&self) -> u64 {
    self.steps
  }

  /// Simulated time covered by one rendered frame.
  pub fn frame_time(&self) -> f32 {
    self.params.delta_t * self.iterations as f32
  }

  /// Advances one rendered frame: applies input, then runs `iterations`
  /// sub-steps of `delta_t`.
  pub fn frame(&mut self, input: &FrameInput) -> Vec<BounceEvent> {
    if let Some(direction) = input.gravity {
      self.gravity = direction;
    }
    if input.iteration_delta != 0 {
      let iterations = (self.iterations as i64 + i64::from(input.iteration_delta))
        .clamp(1, i64::from(MAX_ITERATIONS)) as u32;
      if iterations != self.iterations {
        debug!("sub-steps per frame: {iterations}");
      }
      self.iterations = iterations;
    }
    let shake = self.shake.observe(input.window_position, &self.params.forces);

    let mut events = Vec::new();
    for _ in 0..self.iterations {
      self.step(shake, &mut events);
    }
    trace!("frame done after {} steps, {} bounces", self.steps, events.len());
    events
  }

  /// One sub-step for all bodies. External forces are computed from the
  /// positions at the start of the step so attraction stays symmetric.
  pub fn step(&mut self, shake: Vector2<f32>, events: &mut Vec<BounceEvent>) -> Vec<Contact> {
    let params = self.params;
    let external = forces::external_forces(&self.bodies, self.gravity, shake, &params.forces);
    let mut contacts = Vec::with_capacity(self.bodies.len());
    for (index, (body, force)) in self.bodies.iter_mut().zip(external).enumerate() {
      let contact = collision::respond(body, force, params.viewport, &params.contact);
      let integration = integrate::integrate(body, contact.force, params.delta_t, params.settle_threshold);
      if integration == Integration::Advanced {
        let axes = body.bounce.edges(params.bounce_policy);
        if axes[0] || axes[1] {
          debug!(
            "body {index} bounced x={} y={} at {:?}",
            axes[0], axes[1], body.velocity
          );
          events.push(BounceEvent {
            body: index,
            axes,
            velocity: body.velocity,
          });
        }
      }
      contacts.push(contact);
    }
    self.steps += 1;
    contacts
  }

  pub fn project(&self, elapsed: f32, with_sprite: bool) -> Vec<Projection> {
    self
      .bodies
      .iter()
      .map(|body| project::project(body, self.params.viewport, elapsed, with_sprite))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::initialize::{self, Scenario};

  #[test]
  fn rejects_bad_body_counts() {
    let params = SimParams::default();
    assert!(matches!(
      Playground::new(params, Vec::new()),
      Err(PlaygroundError::UnsupportedBodyCount(0))
    ));
    let body = initialize::create_bodies(Scenario::Single, &params).unwrap().remove(0);
    let three = vec![body.clone(), body.clone(), body];
    assert!(Playground::new(params, three).is_err());
  }

  #[test]
  fn iteration_count_is_clamped() {
    let params = SimParams::default();
    let bodies = initialize::create_bodies(Scenario::Single, &params).unwrap();
    let mut playground = Playground::new(params, bodies).unwrap();
    let steps_before = playground.steps();
    playground.frame(&FrameInput {
      iteration_delta: -5,
      ..FrameInput::default()
    });
    assert_eq!(playground.iterations(), 1);
    assert_eq!(playground.steps(), steps_before + 1);

    playground.frame(&FrameInput {
      iteration_delta: 1000,
      ..FrameInput::default()
    });
    assert_eq!(playground.iterations(), MAX_ITERATIONS);
    assert_eq!(playground.steps(), steps_before + 1 + u64::from(MAX_ITERATIONS));
  }

  #[test]
  fn step_reports_floor_contact() {
    let params = SimParams::default();
    let body = Body::new(
      10.0,
      Vector2::new(400.0, 30.0),
      Vector2::new(0.0, -60.0),
      Vector2::new(32.0, 32.0),
      5000.0,
      500.0,
    )
    .unwrap();
    let mut playground = Playground::new(params, vec![body]).unwrap();
    let mut events = Vec::new();
    let contacts = playground.step(Vector2::new(0.0, 0.0), &mut events);
    assert_eq!(contacts.len(), 1);
    assert!(!contacts[0].is_overlapping(0));
    let floor = contacts[0].axes[1].unwrap();
    assert_eq!(floor.depth, -2.0);
    // k * 2 + c * 60
    assert_eq!(floor.normal, 40000.0);
    let weight = 10.0 * params.forces.gravity;
    assert!((contacts[0].force.y - (floor.normal - weight)).abs() < 1e-2);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].axes, [false, true]);
  }

  #[test]
  fn gravity_key_latches_direction() {
    let params = SimParams::default();
    let bodies = initialize::create_bodies(Scenario::Single, &params).unwrap();
    let mut playground = Playground::new(params, bodies).unwrap();
    let start = playground.bodies()[0].velocity.y;
    playground.frame(&FrameInput {
      gravity: Some(GravityDirection::Up),
      ..FrameInput::default()
    });
    playground.frame(&FrameInput::default());
    assert_eq!(playground.gravity(), GravityDirection::Up);
    assert!(playground.bodies()[0].velocity.y > start);
  }
}
