use bounce_playground::audio::SoundPolicy;
use bounce_playground::bounce::BouncePolicy;
use bounce_playground::initialize::Scenario;
use bounce_playground::state::{self, Options};
use bounce_playground::SquashMode;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Bouncing spring-damper bodies in a window, with sound on every impact
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Number of bodies to simulate (1 or 2)
  #[arg(short, long, default_value_t = 1)]
  bodies: usize,
  /// Run in headless mode (no window, no audio)
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Stop after this many frames
  #[arg(long)]
  frames: Option<u64>,
  /// Clip played on every bounce
  #[arg(long, default_value = "./assets/bounce.wav")]
  sound: PathBuf,
  /// Image stretched over each body
  #[arg(long, default_value = "./assets/logo.png")]
  sprite: PathBuf,
  /// Draw plain ellipses without the sprite
  #[arg(long, default_value_t = false)]
  no_sprite: bool,
  /// Concurrent voices per body
  #[arg(long, default_value_t = 3)]
  voices: usize,
  /// Coulomb friction coefficient against the walls
  #[arg(long)]
  friction: Option<f32>,
  /// How bodies deform against the walls
  #[arg(long, value_enum)]
  squash: Option<Squash>,
  #[arg(long, value_enum, default_value_t = Edge::Counter)]
  bounce_policy: Edge,
  #[arg(long, value_enum, default_value_t = Retrigger::RoundRobin)]
  sound_policy: Retrigger,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Squash {
  Instant,
  Relax,
  Area,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Edge {
  Counter,
  Latch,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Retrigger {
  RoundRobin,
  StopReplay,
}

impl Args {
  fn options(&self) -> anyhow::Result<Options> {
    let scenario = Scenario::from_body_count(self.bodies)?;
    let mut params = scenario.params();
    if let Some(friction) = self.friction {
      params.contact.friction = friction.max(0.0);
    }
    if let Some(squash) = self.squash {
      params.contact.squash = match squash {
        Squash::Instant => SquashMode::Instant,
        Squash::Relax => SquashMode::Relax { rate: 0.5 },
        Squash::Area => SquashMode::AreaConserving,
      };
    }
    params.bounce_policy = match self.bounce_policy {
      Edge::Counter => BouncePolicy::Counter,
      Edge::Latch => BouncePolicy::Latch,
    };
    Ok(Options {
      scenario,
      params,
      sound: self.sound.clone(),
      sprite: (!self.no_sprite).then(|| self.sprite.clone()),
      voices: self.voices.max(1),
      sound_policy: match self.sound_policy {
        Retrigger::RoundRobin => SoundPolicy::RoundRobin,
        Retrigger::StopReplay => SoundPolicy::StopReplay,
      },
      frames: self.frames,
    })
  }
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return Ok(());
  }

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let options = args.options()?;
  if args.headless {
    state::run_headless(options)
  } else {
    state::run(options)
  }
}
