//! Command-line interface for lipcook
//!
//! Provides argument parsing using clap derive macros.

use crate::config::{Config, ConsonantPolicy};
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Cook raw viseme inference into animation-ready frame sequences
#[derive(Parser, Debug)]
#[command(
    name = "lipcook",
    version,
    about = "Cook raw viseme inference into animation-ready frame sequences"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress the summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: stage details, -vv: everything)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post-process recorded inference for a WAV file into a frame sequence
    Cook(CookArgs),

    /// Show the decoded format and chunking of a WAV file
    Inspect {
        /// WAV file to inspect
        #[arg(value_name = "WAV")]
        wav: PathBuf,
    },

    /// Show or locate the configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `lipcook cook`.
#[derive(Args, Debug)]
pub struct CookArgs {
    /// WAV file the inference was recorded from
    #[arg(value_name = "WAV")]
    pub wav: PathBuf,

    /// Recorded raw inference (JSON, one entry per 10 ms chunk)
    #[arg(long, short = 'f', value_name = "JSON")]
    pub frames: PathBuf,

    /// Output file (default: stdout)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Skip temporal smoothing
    #[arg(long)]
    pub no_interpolation: bool,

    /// Skip dominant-viseme clustering and blending
    #[arg(long)]
    pub no_clustering: bool,

    /// Block size and smoothing window in frames (1-24)
    #[arg(long, value_name = "FRAMES")]
    pub max_frames: Option<u32>,

    /// Minimum activation length in frames
    #[arg(long, value_name = "FRAMES")]
    pub min_hold: Option<u32>,

    /// Smooth consonants like any other channel
    #[arg(long)]
    pub no_consonant_lock: bool,

    /// How locked consonants are treated
    #[arg(long, value_enum, value_name = "POLICY")]
    pub consonant_policy: Option<PolicyArg>,

    /// Resize the smoothing window from the speech tempo
    #[arg(long)]
    pub tempo_adaptive: bool,

    /// Fail on an unparseable WAV header instead of assuming 44.1 kHz stereo
    #[arg(long)]
    pub strict_header: bool,

    /// Inference worker threads
    #[arg(long, value_name = "N")]
    pub parallelism: Option<usize>,
}

/// Command-line spelling of [`ConsonantPolicy`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    Rescale,
    Bypass,
}

impl From<PolicyArg> for ConsonantPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Rescale => ConsonantPolicy::Rescale,
            PolicyArg::Bypass => ConsonantPolicy::Bypass,
        }
    }
}

impl CookArgs {
    /// Layer the command-line overrides on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        let settings = &mut config.interpolation;
        if self.no_interpolation {
            settings.enable_interpolation = false;
        }
        if self.no_clustering {
            settings.enable_clustering = false;
        }
        if let Some(frames) = self.max_frames {
            settings.max_interpolation_frames = frames;
        }
        if let Some(frames) = self.min_hold {
            settings.min_hold_frames = frames;
        }
        if self.no_consonant_lock {
            settings.strict_consonant_lock = false;
        }
        if let Some(policy) = self.consonant_policy {
            settings.consonant_policy = policy.into();
        }
        if self.tempo_adaptive {
            settings.tempo_adaptive = true;
        }
        if self.strict_header {
            config.wav.strict_header = true;
        }
        if let Some(n) = self.parallelism {
            config.inference.parallelism = n;
        }
    }

    /// Explicit format, else guessed from the output path, else JSON.
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or_default()
    }
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
