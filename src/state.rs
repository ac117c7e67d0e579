use crate::audio::{self, AudioOutput, SoundPolicy};
use crate::initialize::{self, Scenario};
use crate::input::KeyController;
use crate::render::{self, Render};
use crate::world::{FrameInput, Playground};
use crate::SimParams;
use anyhow::{anyhow, Context};
use cgmath::Vector2;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::event::ElementState;
use winit::keyboard::*;
use winit::{
  dpi::PhysicalSize,
  event::{Event, KeyEvent, StartCause, WindowEvent},
  event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
  window::Window,
};

const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);
/// Frames simulated by a headless run without an explicit limit.
const HEADLESS_FRAMES: u64 = 600;

/// Everything the frontends need besides the window.
#[derive(Clone, Debug)]
pub struct Options {
  pub scenario: Scenario,
  pub params: SimParams,
  pub sound: PathBuf,
  pub sprite: Option<PathBuf>,
  pub voices: usize,
  pub sound_policy: SoundPolicy,
  /// Stop after this many frames.
  pub frames: Option<u64>,
}

struct EventLoopWrapper {
  event_loop: EventLoop<()>,
  window: Arc<Window>,
}

impl EventLoopWrapper {
  pub fn new(title: &str, viewport: Vector2<f32>) -> anyhow::Result<Self> {
    let event_loop = EventLoop::new()?;
    let builder = winit::window::WindowBuilder::new()
      .with_title(title)
      .with_inner_size(PhysicalSize::new(viewport.x as u32, viewport.y as u32))
      .with_resizable(false);
    let window = Arc::new(builder.build(&event_loop)?);

    Ok(Self { event_loop, window })
  }
}

struct SurfaceWrapper {
  surface: wgpu::Surface<'static>,
  config: wgpu::SurfaceConfiguration,
}

impl SurfaceWrapper {
  fn configure(
    surface: wgpu::Surface<'static>,
    context: &State,
    window: &Window,
  ) -> anyhow::Result<Self> {
    let window_size = window.inner_size();
    let width = window_size.width.max(1);
    let height = window_size.height.max(1);
    let mut config = surface
      .get_default_config(&context.adapter, width, height)
      .ok_or_else(|| anyhow!("surface is not supported by the adapter"))?;
    let view_format = config.format.add_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(&context.device, &config);
    Ok(Self { surface, config })
  }

  fn acquire(&mut self, context: &State) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
    match self.surface.get_current_texture() {
      Ok(frame) => Ok(frame),
      Err(wgpu::SurfaceError::Timeout) => self.surface.get_current_texture(),
      Err(_) => {
        self.surface.configure(&context.device, &self.config);
        self.surface.get_current_texture()
      }
    }
  }

  fn config(&self) -> &wgpu::SurfaceConfiguration {
    &self.config
  }
}

struct State {
  adapter: wgpu::Adapter,
  device: wgpu::Device,
  queue: wgpu::Queue,
}

impl State {
  async fn init(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
  ) -> anyhow::Result<Self> {
    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(surface),
        force_fallback_adapter: false,
      })
      .await
      .context("no graphics adapter")?;

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::default(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await
      .context("failed to open the graphics device")?;

    Ok(Self {
      adapter,
      device,
      queue,
    })
  }
}

/// Window position in simulation space, Y flipped against the viewport height.
fn window_position(window: &Window, viewport_height: f32) -> Option<Vector2<f32>> {
  let position = window.outer_position().ok()?;
  Some(Vector2::new(
    position.x as f32,
    viewport_height - position.y as f32,
  ))
}

fn create_playground(options: &Options) -> anyhow::Result<Playground> {
  info!("{:?} scenario, {:?}", options.scenario, options.params);
  let bodies = initialize::create_bodies(options.scenario, &options.params)?;
  Ok(Playground::new(options.params, bodies)?)
}

async fn start(options: Options) -> anyhow::Result<()> {
  let mut playground = create_playground(&options)?;
  let viewport = options.params.viewport;

  let window_loop = EventLoopWrapper::new("Playground", viewport)?;
  let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
    #[cfg(not(target_arch = "wasm32"))]
    backends: wgpu::Backends::PRIMARY,
    ..Default::default()
  });
  let surface = instance.create_surface(window_loop.window.clone())?;
  let context = State::init(&instance, &surface).await?;
  let mut surface = SurfaceWrapper::configure(surface, &context, &window_loop.window)?;

  let sprite = options.sprite.as_deref().and_then(|path| match render::load_sprite(path) {
    Ok(sprite) => Some(sprite),
    Err(err) => {
      warn!("{err}, drawing plain ellipses");
      None
    }
  });
  let mut renderer = Render::init(
    surface.config(),
    &context.device,
    &context.queue,
    viewport,
    sprite.as_ref(),
  );

  let output = AudioOutput::open(&options.sound);
  let mut banks = audio::sound_banks(
    output.as_ref(),
    playground.bodies().len(),
    options.voices,
    options.sound_policy,
  );

  let mut controller = KeyController::init();
  let started = Instant::now();
  let mut next_frame = started;
  let mut frames = 0u64;

  window_loop.event_loop.run(
    move |event, target: &EventLoopWindowTarget<()>| match event {
      Event::NewEvents(StartCause::Init) => {
        info!("sub-steps per frame: {}", playground.iterations());
      }
      Event::AboutToWait => {
        let now = Instant::now();
        if now >= next_frame {
          next_frame += FRAME_INTERVAL;
          if next_frame < now {
            next_frame = now + FRAME_INTERVAL;
          }
          window_loop.window.request_redraw();
        }
        target.set_control_flow(ControlFlow::WaitUntil(next_frame));
      }
      Event::WindowEvent { event, window_id } if window_id == window_loop.window.id() => {
        if !controller.process_events(&event) {
          match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
              event:
                KeyEvent {
                  state: ElementState::Pressed,
                  physical_key: PhysicalKey::Code(KeyCode::Escape),
                  ..
                },
              ..
            } => target.exit(),
            WindowEvent::RedrawRequested => {
              let input = controller.take_input(window_position(&window_loop.window, viewport.y));
              let events = playground.frame(&input);
              audio::play_bounces(&mut banks, &events);

              let projections = playground.project(started.elapsed().as_secs_f32(), renderer.has_sprite());
              match surface.acquire(&context) {
                Ok(frame) => {
                  let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
                    format: Some(surface.config().view_formats[0]),
                    ..wgpu::TextureViewDescriptor::default()
                  });
                  renderer.render(&view, &context.device, &context.queue, &projections);
                  frame.present();
                }
                Err(err) => error!("dropped frame: {err}"),
              }

              frames += 1;
              if options.frames.is_some_and(|limit| frames >= limit) {
                target.exit();
              }
            }
            _ => {}
          }
        }
      }
      _ => {}
    },
  )?;
  // the audio stream must outlive every queued bounce
  drop(output);
  Ok(())
}

pub fn run(options: Options) -> anyhow::Result<()> {
  pollster::block_on(start(options))
}

/// Runs the simulation without a window or audio device until the frame limit
/// or Ctrl-C.
pub fn run_headless(options: Options) -> anyhow::Result<()> {
  let mut playground = create_playground(&options)?;
  let mut banks = audio::sound_banks(
    None,
    playground.bodies().len(),
    options.voices,
    options.sound_policy,
  );

  let running = Arc::new(AtomicBool::new(true));
  let handler_flag = running.clone();
  ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
    .context("failed to install the Ctrl-C handler")?;

  let limit = options.frames.unwrap_or(HEADLESS_FRAMES);
  let input = FrameInput::default();
  let mut frames = 0u64;
  let mut sounds = 0usize;
  while frames < limit && running.load(Ordering::SeqCst) {
    let events = playground.frame(&input);
    sounds += audio::play_bounces(&mut banks, &events);
    frames += 1;
  }

  info!(
    "{frames} frames ({:.1}s simulated), {sounds} bounce sounds",
    frames as f32 * playground.frame_time()
  );
  for (index, body) in playground.bodies().iter().enumerate() {
    info!(
      "body {index}: position {:?} velocity {:?}",
      body.position, body.velocity
    );
  }
  Ok(())
}
