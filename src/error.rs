use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
  #[error("mass must be positive and finite, got {0}")]
  InvalidMass(f32),
  #[error("half-extents must be positive and finite, got ({x}, {y})")]
  InvalidExtent { x: f32, y: f32 },
  #[error("the playground supports 1 or 2 bodies, got {0}")]
  UnsupportedBodyCount(usize),
  #[error("failed to read {path}")]
  Asset {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to decode sound clip {path}")]
  Sound {
    path: PathBuf,
    #[source]
    source: rodio::decoder::DecoderError,
  },
  #[error("failed to decode sprite {path}")]
  Sprite {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
}
