//! Simulation space (Y up) to screen space (Y down) draw parameters.

use crate::Body;
use cgmath::Vector2;
use std::f32::consts::TAU;

/// Palette phase advance per second of wall time.
pub const PALETTE_RATE: f32 = 0.1;

const PALETTE_A: [f32; 3] = [0.5, 0.5, 0.5];
const PALETTE_B: [f32; 3] = [0.5, 0.5, 0.5];
const PALETTE_C: [f32; 3] = [1.0, 1.0, 1.0];
const PALETTE_D: [f32; 3] = [0.0, 0.33, 0.67];

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tint {
  Fixed([f32; 4]),
  /// Cosine palette, offset per body so two bodies never share a colour.
  Palette { phase: f32 },
}

impl Default for Tint {
  fn default() -> Self {
    Tint::Fixed([1.0; 4])
  }
}

impl Tint {
  pub fn color(&self, elapsed: f32) -> [f32; 4] {
    match *self {
      Tint::Fixed(color) => color,
      Tint::Palette { phase } => palette(elapsed * PALETTE_RATE + phase),
    }
  }
}

/// `a + b * cos(2π(c·t + d))` per channel, opaque.
pub fn palette(t: f32) -> [f32; 4] {
  let channel = |i: usize| PALETTE_A[i] + PALETTE_B[i] * (TAU * (PALETTE_C[i] * t + PALETTE_D[i])).cos();
  [channel(0), channel(1), channel(2), 1.0]
}

pub fn to_screen(position: Vector2<f32>, viewport: Vector2<f32>) -> Vector2<f32> {
  Vector2::new(position.x, viewport.y - position.y)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ellipse {
  pub center: Vector2<f32>,
  pub radii: Vector2<f32>,
  pub color: [f32; 4],
}

/// Screen-space rectangle the sprite is stretched over.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpriteQuad {
  pub origin: Vector2<f32>,
  pub extent: Vector2<f32>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
  pub ellipse: Ellipse,
  pub sprite: Option<SpriteQuad>,
}

pub fn project(body: &Body, viewport: Vector2<f32>, elapsed: f32, with_sprite: bool) -> Projection {
  let center = to_screen(body.position, viewport);
  let sprite = with_sprite.then(|| SpriteQuad {
    origin: center - body.size,
    extent: body.size * 2.0,
  });
  Projection {
    ellipse: Ellipse {
      center,
      radii: body.size,
      color: body.tint.color(elapsed),
    },
    sprite,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn y_axis_is_flipped() {
    let viewport = Vector2::new(800.0, 600.0);
    assert_eq!(to_screen(Vector2::new(10.0, 0.0), viewport), Vector2::new(10.0, 600.0));
    assert_eq!(to_screen(Vector2::new(10.0, 450.0), viewport), Vector2::new(10.0, 150.0));
  }

  #[test]
  fn sprite_covers_the_squashed_ellipse() {
    let mut body = Body::new(
      1.0,
      Vector2::new(200.0, 100.0),
      Vector2::new(0.0, 0.0),
      Vector2::new(64.0, 64.0),
      0.0,
      0.0,
    )
    .unwrap();
    body.size = Vector2::new(70.0, 50.0);
    let projection = project(&body, Vector2::new(800.0, 600.0), 0.0, true);
    assert_eq!(projection.ellipse.center, Vector2::new(200.0, 500.0));
    assert_eq!(projection.ellipse.radii, Vector2::new(70.0, 50.0));
    assert_eq!(projection.ellipse.color, [1.0; 4]);
    let sprite = projection.sprite.unwrap();
    assert_eq!(sprite.origin, Vector2::new(130.0, 450.0));
    assert_eq!(sprite.extent, Vector2::new(140.0, 100.0));

    assert_eq!(project(&body, Vector2::new(800.0, 600.0), 0.0, false).sprite, None);
  }

  #[test]
  fn palette_stays_in_unit_range_and_cycles() {
    for step in 0..100 {
      let color = palette(step as f32 * 0.037);
      assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
    }
    let a = palette(0.25);
    let b = palette(1.25);
    for (x, y) in a.iter().zip(b.iter()) {
      assert!((x - y).abs() < 1e-4);
    }
    assert!((palette(0.0)[0] - 1.0).abs() < 1e-6);
  }
}
