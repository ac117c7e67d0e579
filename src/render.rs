use crate::project::Projection;
use crate::PlaygroundError;
use cgmath::Vector2;
use std::borrow::Cow;
use std::path::Path;
use wgpu::{util::DeviceExt, PipelineCompilationOptions};

/// Two bodies, each an ellipse plus a sprite, with room to spare.
const MAX_INSTANCES: usize = 8;

#[rustfmt::skip]
const QUAD: [f32; 12] = [
  -1.0, -1.0,
   1.0, -1.0,
   1.0,  1.0,
  -1.0, -1.0,
   1.0,  1.0,
  -1.0,  1.0,
];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
  viewport: [f32; 2],
  _padding: [f32; 2],
}

/// One ellipse or sprite, in screen pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
  pub center: [f32; 2],
  pub radii: [f32; 2],
  pub color: [f32; 4],
  /// 1.0 samples the sprite over the whole quad, 0.0 fills the inscribed ellipse.
  pub textured: f32,
}

/// Ellipses first so sprites are drawn on top of their body.
pub fn instances(projections: &[Projection]) -> Vec<Instance> {
  let ellipses = projections.iter().map(|projection| Instance {
    center: projection.ellipse.center.into(),
    radii: projection.ellipse.radii.into(),
    color: projection.ellipse.color,
    textured: 0.0,
  });
  let sprites = projections
    .iter()
    .filter_map(|projection| projection.sprite)
    .map(|sprite| {
      let half = sprite.extent * 0.5;
      Instance {
        center: (sprite.origin + half).into(),
        radii: half.into(),
        color: [1.0; 4],
        textured: 1.0,
      }
    });
  ellipses.chain(sprites).take(MAX_INSTANCES).collect()
}

pub fn load_sprite(path: &Path) -> Result<image::RgbaImage, PlaygroundError> {
  let image = image::open(path).map_err(|source| PlaygroundError::Sprite {
    path: path.to_owned(),
    source,
  })?;
  Ok(image.to_rgba8())
}

pub struct Render {
  render_pipeline: wgpu::RenderPipeline,
  bind_group: wgpu::BindGroup,
  quad_buffer: wgpu::Buffer,
  instance_buffer: wgpu::Buffer,
  has_sprite: bool,
}

impl Render {
  #[must_use]
  pub fn init(
    config: &wgpu::SurfaceConfiguration,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    viewport: Vector2<f32>,
    sprite: Option<&image::RgbaImage>,
  ) -> Self {
    let draw_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: None,
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/draw.wgsl"))),
    });
    let globals = Globals {
      viewport: viewport.into(),
      _padding: [0.0; 2],
    };
    let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Globals Buffer"),
      contents: bytemuck::cast_slice(&[globals]),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    // ========================================================================
    // sprite texture, a white texel when no sprite was loaded
    // ========================================================================

    let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255; 4]));
    let pixels = sprite.unwrap_or(&white);
    let texture_size = wgpu::Extent3d {
      width: pixels.width(),
      height: pixels.height(),
      depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
      label: Some("Sprite Texture"),
      size: texture_size,
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: wgpu::TextureFormat::Rgba8UnormSrgb,
      usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
      view_formats: &[],
    });
    queue.write_texture(
      wgpu::ImageCopyTexture {
        texture: &texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
      },
      pixels.as_raw(),
      wgpu::ImageDataLayout {
        offset: 0,
        bytes_per_row: Some(4 * pixels.width()),
        rows_per_image: Some(pixels.height()),
      },
      texture_size,
    );
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
      label: Some("Sprite Sampler"),
      mag_filter: wgpu::FilterMode::Linear,
      min_filter: wgpu::FilterMode::Linear,
      ..Default::default()
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      entries: &[
        wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as _),
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 1,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 2,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
          count: None,
        },
      ],
      label: Some("draw_bind_group_layout"),
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &bind_group_layout,
      entries: &[
        wgpu::BindGroupEntry {
          binding: 0,
          resource: globals_buffer.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
          binding: 1,
          resource: wgpu::BindingResource::TextureView(&texture_view),
        },
        wgpu::BindGroupEntry {
          binding: 2,
          resource: wgpu::BindingResource::Sampler(&sampler),
        },
      ],
      label: Some("draw_bind_group"),
    });

    // ========================================================================
    // render pipeline stuff
    // ========================================================================

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("render"),
      bind_group_layouts: &[&bind_group_layout],
      push_constant_ranges: &[],
    });
    let instance_layout = wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<Instance>() as wgpu::BufferAddress,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4, 3 => Float32],
    };
    let quad_layout = wgpu::VertexBufferLayout {
      array_stride: 2 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![4 => Float32x2],
    };
    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("Render Pipeline"),
      layout: Some(&render_pipeline_layout),
      vertex: wgpu::VertexState {
        module: &draw_shader,
        entry_point: "main_vs",
        compilation_options: PipelineCompilationOptions::default(),
        buffers: &[instance_layout, quad_layout],
      },
      fragment: Some(wgpu::FragmentState {
        module: &draw_shader,
        entry_point: "main_fs",
        compilation_options: PipelineCompilationOptions::default(),
        targets: &[Some(wgpu::ColorTargetState {
          format: config.view_formats[0],
          blend: Some(wgpu::BlendState::ALPHA_BLENDING),
          write_mask: wgpu::ColorWrites::ALL,
        })],
      }),
      primitive: wgpu::PrimitiveState::default(),
      depth_stencil: None,
      multisample: wgpu::MultisampleState::default(),
      multiview: None,
      cache: None,
    });

    let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Quad Buffer"),
      contents: bytemuck::cast_slice(&QUAD),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("Instance Buffer"),
      size: (MAX_INSTANCES * std::mem::size_of::<Instance>()) as wgpu::BufferAddress,
      usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });

    Render {
      render_pipeline,
      bind_group,
      quad_buffer,
      instance_buffer,
      has_sprite: sprite.is_some(),
    }
  }

  pub fn has_sprite(&self) -> bool {
    self.has_sprite
  }

  pub fn render(
    &mut self,
    view: &wgpu::TextureView,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    projections: &[Projection],
  ) {
    let instances = instances(projections);
    queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view,
      resolve_target: None,
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        store: wgpu::StoreOp::Store,
      },
    })];
    let render_pass_descriptor = wgpu::RenderPassDescriptor {
      label: None,
      color_attachments: &color_attachments,
      depth_stencil_attachment: None,
      timestamp_writes: None,
      occlusion_query_set: None,
    };
    let mut command_encoder =
      device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
      let mut rpass = command_encoder.begin_render_pass(&render_pass_descriptor);
      rpass.set_pipeline(&self.render_pipeline);
      rpass.set_bind_group(0, &self.bind_group, &[]);
      rpass.set_vertex_buffer(0, self.instance_buffer.slice(..));
      rpass.set_vertex_buffer(1, self.quad_buffer.slice(..));
      rpass.draw(0..6, 0..instances.len() as u32);
    }
    queue.submit(Some(command_encoder.finish()));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::{Ellipse, SpriteQuad};

  fn projection(sprite: bool) -> Projection {
    Projection {
      ellipse: Ellipse {
        center: Vector2::new(100.0, 200.0),
        radii: Vector2::new(30.0, 20.0),
        color: [0.5, 0.5, 0.5, 1.0],
      },
      sprite: sprite.then_some(SpriteQuad {
        origin: Vector2::new(70.0, 180.0),
        extent: Vector2::new(60.0, 40.0),
      }),
    }
  }

  #[test]
  fn sprites_follow_all_ellipses() {
    let instances = instances(&[projection(true), projection(false)]);
    assert_eq!(instances.len(), 3);
    assert_eq!(instances[0].textured, 0.0);
    assert_eq!(instances[1].textured, 0.0);
    assert_eq!(instances[2].textured, 1.0);
    assert_eq!(instances[2].center, [100.0, 200.0]);
    assert_eq!(instances[2].radii, [30.0, 20.0]);
  }

  #[test]
  fn bundled_sprite_decodes() {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/logo.png"));
    let sprite = load_sprite(path).unwrap();
    assert_eq!(sprite.dimensions(), (128, 128));
    // corners are transparent so only the disc shows over the ellipse
    assert_eq!(sprite.get_pixel(0, 0)[3], 0);
    assert_eq!(sprite.get_pixel(64, 64)[3], 255);
  }

  #[test]
  fn missing_sprite_is_an_error() {
    assert!(matches!(
      load_sprite(Path::new("./assets/does-not-exist.png")),
      Err(PlaygroundError::Sprite { .. })
    ));
  }

  #[test]
  fn instance_layout_is_tightly_packed() {
    assert_eq!(std::mem::size_of::<Instance>(), 9 * 4);
    assert_eq!(std::mem::size_of::<Globals>(), 16);
  }
}
