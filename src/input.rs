use crate::forces::GravityDirection;
use crate::world::FrameInput;
use cgmath::Vector2;
use winit::{
  event::{ElementState, KeyEvent, WindowEvent},
  keyboard::{KeyCode, PhysicalKey},
};

/// Tracks the keys the playground listens to between two frames.
#[derive(Debug, Default)]
pub struct KeyController {
  is_up_pressed: bool,
  is_down_pressed: bool,
  iteration_delta: i32,
}

impl KeyController {
  pub fn init() -> Self {
    Self::default()
  }

  pub fn process_events(&mut self, event: &WindowEvent) -> bool {
    match event {
      WindowEvent::KeyboardInput {
        event:
          KeyEvent {
            state,
            physical_key: PhysicalKey::Code(keycode),
            repeat,
            ..
          },
        ..
      } => self.process_key(*keycode, *state == ElementState::Pressed, *repeat),
      _ => false,
    }
  }

  pub fn process_key(&mut self, keycode: KeyCode, is_pressed: bool, repeat: bool) -> bool {
    match keycode {
      KeyCode::ArrowUp => {
        self.is_up_pressed = is_pressed;
        true
      }
      KeyCode::ArrowDown => {
        self.is_down_pressed = is_pressed;
        true
      }
      KeyCode::BracketRight => {
        if is_pressed && !repeat {
          self.iteration_delta += 1;
        }
        true
      }
      KeyCode::BracketLeft => {
        if is_pressed && !repeat {
          self.iteration_delta -= 1;
        }
        true
      }
      _ => false,
    }
  }

  /// Builds this frame's input and clears the accumulated key presses. Down
  /// wins when both gravity keys are held.
  pub fn take_input(&mut self, window_position: Option<Vector2<f32>>) -> FrameInput {
    let gravity = if self.is_down_pressed {
      Some(GravityDirection::Down)
    } else if self.is_up_pressed {
      Some(GravityDirection::Up)
    } else {
      None
    };
    FrameInput {
      gravity,
      iteration_delta: std::mem::take(&mut self.iteration_delta),
      window_position,
    }
  }
}
