use physics_core::{Config, GravityPreset, OutputMode};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which simulation the window runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModuleKind {
    #[default]
    Gravity,
    Particle,
    Pendulum,
    /// CC sweep for checking the MIDI connection.
    Sweep,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Gravity,
        ModuleKind::Particle,
        ModuleKind::Pendulum,
        ModuleKind::Sweep,
    ];
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleKind::Gravity => "gravity",
            ModuleKind::Particle => "particle",
            ModuleKind::Pendulum => "pendulum",
            ModuleKind::Sweep => "sweep",
        })
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown module `{s}`"))
    }
}

/// Command-line options. Simulation values override the config file and are
/// range-checked together with it.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub module: ModuleKind,
    pub config_path: Option<PathBuf>,
    pub device: Option<String>,
    pub channel: Option<u8>,
    pub preset: Option<GravityPreset>,
    pub mode: Option<OutputMode>,
    pub length: Option<f32>,
    pub temperature: Option<f32>,
    pub seed: Option<u64>,
    pub list_devices: bool,
    pub dry_run: bool,
}

impl Options {
    pub fn apply(&self, config: &mut Config) {
        if let Some(device) = &self.device {
            config.midi.device = Some(device.clone());
        }
        if let Some(channel) = self.channel {
            config.midi.channel = channel;
        }
        if let Some(preset) = self.preset {
            config.gravity.preset = preset;
        }
        if let Some(mode) = self.mode {
            config.pendulum.mode = mode;
        }
        if let Some(length) = self.length {
            config.pendulum.length = length;
        }
        if let Some(temperature) = self.temperature {
            config.particle.temperature = temperature;
        }
        if let Some(seed) = self.seed {
            config.particle.seed = seed;
        }
    }
}

fn print_usage() {
    println!(
        "midi-physics - physics simulations as MIDI controllers

Usage: midi-physics [OPTIONS]

Options:
  --module <NAME>        gravity | particle | pendulum | sweep (default: gravity)
  --config <PATH>        JSON configuration file
  --device <PORT>        MIDI output port index or name fragment
  --channel <1-16>       MIDI channel
  --preset <NAME>        zero-g | moon | earth | jupiter | black-hole
  --mode <MODE>          pendulum output: cc | pitch-bend
  --length <100-300>     pendulum length
  --temperature <0-1>    particle temperature
  --seed <N>             particle spawn seed
  --test-sweep           sweep CC 74 up and down to check the MIDI connection
  --list-devices         print MIDI output ports and exit
  --dry-run              do not open a MIDI port; log messages at debug level
  -h, --help             show this help

Keys:
  1 / 2 / 3 / 4          switch to gravity / particle / pendulum / sweep
  Esc                    quit"
    );
}

/// Parse a required argument value, returning None with error message if missing or invalid.
fn parse_arg<T: FromStr>(args: &[String], i: &mut usize, opt_name: &str) -> Option<T> {
    *i += 1;
    if *i >= args.len() {
        eprintln!("Error: {opt_name} requires an argument");
        return None;
    }
    args[*i].parse().ok().or_else(|| {
        eprintln!("Error: {opt_name} requires a valid value");
        None
    })
}

/// Parse process arguments, or None if invalid/help requested.
pub fn parse_args() -> Option<Options> {
    let args: Vec<String> = env::args().collect();
    parse_from(&args)
}

pub fn parse_from(args: &[String]) -> Option<Options> {
    let mut opts = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--module" => opts.module = parse_arg(args, &mut i, "--module")?,
            "--config" => opts.config_path = Some(parse_arg(args, &mut i, "--config")?),
            "--device" => opts.device = Some(parse_arg(args, &mut i, "--device")?),
            "--channel" => opts.channel = Some(parse_arg(args, &mut i, "--channel")?),
            "--preset" => opts.preset = Some(parse_arg(args, &mut i, "--preset")?),
            "--mode" => opts.mode = Some(parse_arg(args, &mut i, "--mode")?),
            "--length" => opts.length = Some(parse_arg(args, &mut i, "--length")?),
            "--temperature" => {
                opts.temperature = Some(parse_arg(args, &mut i, "--temperature")?);
            }
            "--seed" => opts.seed = Some(parse_arg(args, &mut i, "--seed")?),
            "--test-sweep" => opts.module = ModuleKind::Sweep,
            "--list-devices" => opts.list_devices = true,
            "--dry-run" => opts.dry_run = true,
            "--help" | "-h" => {
                print_usage();
                return None;
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                return None;
            }
        }
        i += 1;
    }

    Some(opts)
}
