use bounce_playground::world::{FrameInput, Playground};
use bounce_playground::{Body, ForceParams, SimParams, SquashMode};
use cgmath::Vector2;

fn weightless() -> SimParams {
  SimParams {
    forces: ForceParams {
      gravity: 0.0,
      ..ForceParams::default()
    },
    ..SimParams::default()
  }
}

fn falling(damping: f32, speed: f32) -> Body {
  Body::new(
    10.0,
    Vector2::new(400.0, 100.0),
    Vector2::new(0.0, -speed),
    Vector2::new(32.0, 32.0),
    5000.0,
    damping,
  )
  .unwrap()
}

#[test]
fn spring_damper_does_not_add_energy() {
  let mut playground = Playground::new(weightless(), vec![falling(50.0, 300.0)]).unwrap();
  let mut touched = false;
  let mut exit_speed = None;
  for _ in 0..120 {
    playground.frame(&FrameInput::default());
    let body = &playground.bodies()[0];
    if body.bounce.is_overlapping(1) {
      touched = true;
      assert!(body.velocity.y.abs() <= 300.0);
    } else if touched {
      exit_speed = Some(body.velocity.y);
      break;
    }
  }
  let exit_speed = exit_speed.expect("body never left the floor");
  assert!(exit_speed > 0.0);
  assert!(exit_speed < 0.9 * 300.0);
}

#[test]
fn heavy_damping_settles_against_the_floor() {
  let mut playground = Playground::new(weightless(), vec![falling(500.0, 300.0)]).unwrap();
  let mut max_after_contact: f32 = 0.0;
  let mut touched = false;
  for _ in 0..240 {
    playground.frame(&FrameInput::default());
    let body = &playground.bodies()[0];
    touched |= body.bounce.is_overlapping(1);
    if touched {
      max_after_contact = max_after_contact.max(body.velocity.y.abs());
    }
  }
  assert!(touched);
  assert!(max_after_contact < 0.5 * 300.0);
}

#[test]
fn long_overlap_fires_one_event() {
  let mut playground = Playground::new(weightless(), vec![falling(500.0, 300.0)]).unwrap();
  let mut overlapping_frames = 0;
  let mut y_events = 0;
  for _ in 0..240 {
    let events = playground.frame(&FrameInput::default());
    y_events += events.iter().filter(|event| event.axes[1]).count();
    if playground.bodies()[0].bounce.is_overlapping(1) {
      overlapping_frames += 1;
    }
  }
  assert!(overlapping_frames > 10);
  assert_eq!(y_events, 1);
}

#[test]
fn every_floor_episode_is_heard_once() {
  let params = SimParams::default();
  let bodies = bounce_playground::initialize::create_bodies(
    bounce_playground::initialize::Scenario::Single,
    &params,
  )
  .unwrap();
  let mut playground = Playground::new(params, bodies).unwrap();
  let mut episodes = 0;
  let mut y_events = 0;
  let mut was_overlapping = false;
  for _ in 0..900 {
    let events = playground.frame(&FrameInput::default());
    y_events += events.iter().filter(|event| event.axes[1]).count();
    let overlapping = playground.bodies()[0].bounce.is_overlapping(1);
    if overlapping && !was_overlapping {
      episodes += 1;
    }
    was_overlapping = overlapping;
  }
  assert!(episodes >= 2);
  assert_eq!(y_events, episodes);
}

#[test]
fn squash_keeps_the_area_on_every_overlap_frame() {
  let mut params = weightless();
  params.contact.squash = SquashMode::AreaConserving;
  let body = Body::new(
    10.0,
    Vector2::new(400.0, 40.0),
    Vector2::new(0.0, -100.0),
    Vector2::new(32.0, 32.0),
    5000.0,
    500.0,
  )
  .unwrap()
  .with_max_size(Vector2::new(1000.0, 1000.0));
  let area = body.rest_size.x * body.rest_size.y;
  let mut playground = Playground::new(params, vec![body]).unwrap();
  let mut squashed_frames = 0;
  for _ in 0..120 {
    playground.frame(&FrameInput::default());
    let body = &playground.bodies()[0];
    if body.bounce.is_overlapping(1) {
      squashed_frames += 1;
      assert!((body.size.x * body.size.y - area).abs() < 1e-2 * area);
    } else {
      assert_eq!(body.size, body.rest_size);
    }
  }
  assert!(squashed_frames > 0);
}

#[test]
fn relaxing_size_never_exceeds_rest() {
  let mut params = weightless();
  params.contact.squash = SquashMode::Relax { rate: 0.5 };
  let mut playground = Playground::new(params, vec![falling(50.0, 300.0)]).unwrap();
  let mut was_squashed = false;
  for _ in 0..120 {
    playground.frame(&FrameInput::default());
    let body = &playground.bodies()[0];
    was_squashed |= body.size.y < body.rest_size.y;
    assert!(body.size.x <= body.max_size.x && body.size.y <= body.max_size.y);
    assert!(body.size.y <= body.rest_size.y);
  }
  assert!(was_squashed);
  assert_eq!(playground.bodies()[0].size, playground.bodies()[0].rest_size);
}
