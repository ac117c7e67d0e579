//! Bounce sounds: maps an impact to pitch and volume and hands it to a voice.

use crate::world::BounceEvent;
use crate::PlaygroundError;
use cgmath::Vector2;
use log::{debug, warn};
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::path::Path;

pub const PITCH_RANGE: (f32, f32) = (0.75, 2.0);
pub const VOLUME_RANGE: (f32, f32) = (0.1, 1.0);
/// Impact speed that maps to a pitch and volume of 1.
pub const SPEED_SCALE: f32 = 1e2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tone {
  pub pitch: f32,
  pub volume: f32,
}

impl Tone {
  /// Sums the speed contribution of every axis that just bounced. `None` when
  /// neither axis bounced.
  pub fn for_bounce(edges: [bool; 2], velocity: Vector2<f32>) -> Option<Self> {
    if !edges[0] && !edges[1] {
      return None;
    }
    let raw: f32 = edges
      .iter()
      .zip([velocity.x, velocity.y])
      .filter(|(bounced, _)| **bounced)
      .map(|(_, speed)| (speed / SPEED_SCALE).abs())
      .sum();
    Some(Self {
      pitch: raw.clamp(PITCH_RANGE.0, PITCH_RANGE.1),
      volume: raw.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1),
    })
  }
}

/// One playable instance of a sound.
pub trait Voice {
  fn set_pitch(&mut self, pitch: f32);
  fn set_volume(&mut self, volume: f32);
  fn play(&mut self);
  fn stop(&mut self);
  fn is_playing(&self) -> bool;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SoundPolicy {
  /// Cycle through every voice so overlapping bounces do not cut each other.
  #[default]
  RoundRobin,
  /// Stop and restart the first voice on every bounce.
  StopReplay,
}

pub struct SoundBank<V> {
  voices: Vec<V>,
  next: usize,
  policy: SoundPolicy,
}

impl<V: Voice> SoundBank<V> {
  pub fn new(voices: Vec<V>, policy: SoundPolicy) -> Self {
    Self {
      voices,
      next: 0,
      policy,
    }
  }

  pub fn voices(&self) -> &[V] {
    &self.voices
  }

  /// Plays `tone` on the voice picked by the policy. Returns the voice index.
  pub fn trigger(&mut self, tone: Tone) -> Option<usize> {
    if self.voices.is_empty() {
      return None;
    }
    let index = match self.policy {
      SoundPolicy::RoundRobin => {
        let index = self.next % self.voices.len();
        self.next = self.next.wrapping_add(1);
        index
      }
      SoundPolicy::StopReplay => 0,
    };
    let voice = &mut self.voices[index];
    if self.policy == SoundPolicy::StopReplay && voice.is_playing() {
      voice.stop();
    }
    voice.set_pitch(tone.pitch);
    voice.set_volume(tone.volume);
    voice.play();
    debug!(
      "voice {index} pitch {:.2} volume {:.2}",
      tone.pitch, tone.volume
    );
    Some(index)
  }
}

/// Sounds every event on its body's bank. Returns how many voices were started.
pub fn play_bounces<V: Voice>(banks: &mut [SoundBank<V>], events: &[BounceEvent]) -> usize {
  events
    .iter()
    .filter_map(|event| {
      let tone = Tone::for_bounce(event.axes, event.velocity)?;
      banks.get_mut(event.body)?.trigger(tone)
    })
    .count()
}

/// Stand-in voice for headless runs and machines without an audio device.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SilentVoice {
  pub pitch: f32,
  pub volume: f32,
  pub plays: u32,
  pub stops: u32,
  pub playing: bool,
}

impl Voice for SilentVoice {
  fn set_pitch(&mut self, pitch: f32) {
    self.pitch = pitch;
  }

  fn set_volume(&mut self, volume: f32) {
    self.volume = volume;
  }

  fn play(&mut self) {
    self.plays += 1;
    self.playing = true;
  }

  fn stop(&mut self) {
    self.stops += 1;
    self.playing = false;
  }

  fn is_playing(&self) -> bool {
    self.playing
  }
}

pub type Clip = Buffered<Decoder<Cursor<Vec<u8>>>>;

/// Decodes a clip once so every voice can replay it without touching the disk.
pub fn load_clip(path: &Path) -> Result<Clip, PlaygroundError> {
  let bytes = std::fs::read(path).map_err(|source| PlaygroundError::Asset {
    path: path.to_owned(),
    source,
  })?;
  let decoder = Decoder::new(Cursor::new(bytes)).map_err(|source| PlaygroundError::Sound {
    path: path.to_owned(),
    source,
  })?;
  Ok(decoder.buffered())
}

/// A rodio sink replaying a shared clip. Pitch is applied as playback speed.
pub struct RodioVoice {
  sink: Sink,
  clip: Clip,
}

impl RodioVoice {
  pub fn new(handle: &OutputStreamHandle, clip: Clip) -> Option<Self> {
    match Sink::try_new(handle) {
      Ok(sink) => Some(Self { sink, clip }),
      Err(err) => {
        warn!("could not open an audio sink: {err}");
        None
      }
    }
  }
}

impl Voice for RodioVoice {
  fn set_pitch(&mut self, pitch: f32) {
    self.sink.set_speed(pitch);
  }

  fn set_volume(&mut self, volume: f32) {
    self.sink.set_volume(volume);
  }

  fn play(&mut self) {
    // restart right away instead of queueing behind a clip still playing
    self.sink.clear();
    self.sink.append(self.clip.clone());
    self.sink.play();
  }

  fn stop(&mut self) {
    self.sink.clear();
  }

  fn is_playing(&self) -> bool {
    !self.sink.empty() && !self.sink.is_paused()
  }
}

/// Either real playback or the silent fallback, picked at startup.
pub enum AnyVoice {
  Rodio(RodioVoice),
  Silent(SilentVoice),
}

impl Voice for AnyVoice {
  fn set_pitch(&mut self, pitch: f32) {
    match self {
      AnyVoice::Rodio(voice) => voice.set_pitch(pitch),
      AnyVoice::Silent(voice) => voice.set_pitch(pitch),
    }
  }

  fn set_volume(&mut self, volume: f32) {
    match self {
      AnyVoice::Rodio(voice) => voice.set_volume(volume),
      AnyVoice::Silent(voice) => voice.set_volume(volume),
    }
  }

  fn play(&mut self) {
    match self {
      AnyVoice::Rodio(voice) => voice.play(),
      AnyVoice::Silent(voice) => voice.play(),
    }
  }

  fn stop(&mut self) {
    match self {
      AnyVoice::Rodio(voice) => voice.stop(),
      AnyVoice::Silent(voice) => voice.stop(),
    }
  }

  fn is_playing(&self) -> bool {
    match self {
      AnyVoice::Rodio(voice) => voice.is_playing(),
      AnyVoice::Silent(voice) => voice.is_playing(),
    }
  }
}

/// Keeps the output stream alive for as long as any voice may play.
pub struct AudioOutput {
  _stream: OutputStream,
  handle: OutputStreamHandle,
  clip: Clip,
}

impl AudioOutput {
  /// Opens the default device and decodes `clip_path`. Failures are logged and
  /// leave the playground silent.
  pub fn open(clip_path: &Path) -> Option<Self> {
    let clip = match load_clip(clip_path) {
      Ok(clip) => clip,
      Err(err) => {
        warn!("{err}, bounces will be silent");
        return None;
      }
    };
    match OutputStream::try_default() {
      Ok((stream, handle)) => Some(Self {
        _stream: stream,
        handle,
        clip,
      }),
      Err(err) => {
        warn!("no audio output ({err}), bounces will be silent");
        None
      }
    }
  }

  pub fn voices(&self, count: usize) -> Vec<AnyVoice> {
    (0..count)
      .map(|_| match RodioVoice::new(&self.handle, self.clip.clone()) {
        Some(voice) => AnyVoice::Rodio(voice),
        None => AnyVoice::Silent(SilentVoice::default()),
      })
      .collect()
  }
}

/// One bank per body, falling back to silent voices without an output.
pub fn sound_banks(
  output: Option<&AudioOutput>,
  bodies: usize,
  voices: usize,
  policy: SoundPolicy,
) -> Vec<SoundBank<AnyVoice>> {
  (0..bodies)
    .map(|_| {
      let voices = match output {
        Some(output) => output.voices(voices),
        None => (0..voices)
          .map(|_| AnyVoice::Silent(SilentVoice::default()))
          .collect(),
      };
      SoundBank::new(voices, policy)
    })
    .collect()
}
