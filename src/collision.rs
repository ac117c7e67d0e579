//! Penalty (spring-damper) response against the viewport walls.

use crate::{Body, ContactParams, SquashMode};
use cgmath::Vector2;

/// Squashing never takes a half-extent below this.
pub const MIN_EXTENT: f32 = 1.0;

/// Signed overlap of `[position - extent, position + extent]` with the outside
/// of `[0, bound]`. Negative past the low wall, positive past the high wall.
pub fn penetration(position: f32, extent: f32, bound: f32) -> f32 {
  (position - extent).min(0.0) + (position + extent - bound).max(0.0)
}

/// Direction of motion for friction purposes. Zero (and NaN) velocity has no
/// direction, so it yields no friction at all.
pub fn friction_sign(velocity: f32) -> f32 {
  if velocity > 0.0 {
    1.0
  } else if velocity < 0.0 {
    -1.0
  } else {
    0.0
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisContact {
  pub depth: f32,
  /// Spring-damper force pushing the body back inside.
  pub normal: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
  /// External force plus penalty and friction terms.
  pub force: Vector2<f32>,
  /// `[x, y]`, `None` when the axis is inside its bounds.
  pub axes: [Option<AxisContact>; 2],
}

impl Contact {
  pub fn is_overlapping(&self, axis: usize) -> bool {
    self.axes[axis].is_some()
  }
}

/// Resolves wall overlap for one step. Y is tested before X, and with
/// [`SquashMode::AreaConserving`] the X test sees the width inflated by the Y
/// squash. An axis that overlaps keeps its own squash and is never inflated.
///
/// Updates `body.size` and the body's bounce tracker, returns the net force for
/// the integrator.
pub fn respond(
  body: &mut Body,
  external: Vector2<f32>,
  viewport: Vector2<f32>,
  params: &ContactParams,
) -> Contact {
  let mut force = external;
  let mut extent = body.rest_size;
  // pi cancels out of area / (pi * squashed)
  let area = body.rest_size.x * body.rest_size.y;
  let mut axes = [None; 2];

  for axis in [1, 0] {
    let depth = penetration(body.position[axis], extent[axis], viewport[axis]);
    if depth.abs() > 0.0 {
      let normal = -body.stiffness * depth - body.damping * body.velocity[axis];
      force[axis] += normal;
      extent[axis] = (extent[axis] - depth.abs()).max(MIN_EXTENT);
      axes[axis] = Some(AxisContact { depth, normal });
      let other = 1 - axis;
      if params.squash == SquashMode::AreaConserving && axes[other].is_none() {
        extent[other] = (area / extent[axis]).min(body.max_size[other]);
      }
    }
    body.bounce.record(axis, axes[axis].is_some());
  }

  if params.friction > 0.0 {
    for (axis, contact) in axes.iter().enumerate() {
      if let Some(contact) = contact {
        let other = 1 - axis;
        force[other] -= friction_sign(body.velocity[other]) * params.friction * contact.normal.abs();
      }
    }
  }

  match params.squash {
    SquashMode::Relax { rate } => {
      for axis in 0..2 {
        body.size[axis] = if axes[axis].is_some() {
          extent[axis]
        } else {
          (body.size[axis] + rate).min(body.rest_size[axis])
        };
      }
    }
    SquashMode::Instant | SquashMode::AreaConserving => body.size = extent,
  }
  body.size.x = body.size.x.min(body.max_size.x);
  body.size.y = body.size.y.min(body.max_size.y);

  Contact { force, axes }
}
