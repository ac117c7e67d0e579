use crate::project::Tint;
use crate::{Body, ContactParams, ForceParams, PlaygroundError, SimParams, SquashMode};
use cgmath::Vector2;
use log::info;

/// Starting setups of the playground.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
  /// One heavy, stiff body thrown sideways, drawn with the sprite.
  Single,
  /// Two light bodies attracting each other either side of the centre.
  Twin,
}

impl Scenario {
  pub fn from_body_count(count: usize) -> Result<Self, PlaygroundError> {
    match count {
      1 => Ok(Scenario::Single),
      2 => Ok(Scenario::Twin),
      _ => Err(PlaygroundError::UnsupportedBodyCount(count)),
    }
  }

  /// Default parameters for the scenario, before command line overrides.
  pub fn params(self) -> SimParams {
    match self {
      Scenario::Single => SimParams::default(),
      Scenario::Twin => SimParams {
        delta_t: 1.0 / 120.0,
        iterations: 2,
        contact: ContactParams {
          friction: 0.1,
          squash: SquashMode::AreaConserving,
        },
        forces: ForceParams {
          attraction: 5e5,
          min_separation: 32.0,
          ..ForceParams::default()
        },
        ..SimParams::default()
      },
    }
  }
}

pub fn create_bodies(scenario: Scenario, params: &SimParams) -> Result<Vec<Body>, PlaygroundError> {
  let bodies = match scenario {
    Scenario::Single => {
      let size = Vector2::new(64.0, 64.0);
      vec![Body::new(
        1e3,
        Vector2::new(512.0, 512.0),
        Vector2::new(128.0, 0.0),
        size,
        5e5,
        5e2,
      )?]
    }
    Scenario::Twin => {
      let center = params.viewport / 2.0;
      let offset = Vector2::new(150.0, 0.0);
      let size = Vector2::new(32.0, 32.0);
      [(center - offset, 0.0), (center + offset, 0.5)]
        .into_iter()
        .map(|(position, phase)| {
          Body::new(10.0, position, Vector2::new(0.0, 0.0), size, 5e3, 50.0)
            .map(|body| body.with_tint(Tint::Palette { phase }))
        })
        .collect::<Result<Vec<_>, _>>()?
    }
  };
  for body in &bodies {
    info!(
      "body mass {} at {:?} moving {:?}",
      body.mass(),
      body.position,
      body.velocity
    );
  }
  Ok(bodies)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn body_count_maps_to_scenario() {
    assert_eq!(Scenario::from_body_count(1).unwrap(), Scenario::Single);
    assert_eq!(Scenario::from_body_count(2).unwrap(), Scenario::Twin);
    assert!(Scenario::from_body_count(3).is_err());
  }

  #[test]
  fn twin_bodies_mirror_each_other() {
    let params = Scenario::Twin.params();
    let bodies = create_bodies(Scenario::Twin, &params).unwrap();
    assert_eq!(bodies.len(), 2);
    let center = params.viewport / 2.0;
    assert_eq!(bodies[0].position + bodies[1].position, center * 2.0);
    assert_ne!(bodies[0].tint, bodies[1].tint);
  }

  #[test]
  fn bodies_start_inside_the_viewport() {
    for scenario in [Scenario::Single, Scenario::Twin] {
      let params = scenario.params();
      for body in create_bodies(scenario, &params).unwrap() {
        for axis in 0..2 {
          let depth = crate::collision::penetration(
            body.position[axis],
            body.rest_size[axis],
            params.viewport[axis],
          );
          assert_eq!(depth, 0.0);
        }
      }
    }
  }
}
