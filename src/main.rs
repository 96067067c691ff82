use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use lipcook::audio::{ChunkSegmenter, WavOptions, load_wav_file};
use lipcook::cli::{Cli, Commands, ConfigAction, CookArgs};
use lipcook::config::Config;
use lipcook::inference::ReplayEngine;
use lipcook::output::{save_sequence, write_sequence};
use lipcook::pipeline::{FrameSequence, Pipeline};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "warn,lipcook=info",
        1 => "warn,lipcook=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    tracing::debug!(version = %lipcook::version_string(), "starting");

    match cli.command {
        Commands::Cook(args) => {
            let config = load_config(cli.config.as_deref())?;
            handle_cook(config, &args, cli.quiet)
        }
        Commands::Inspect { wav } => {
            let config = load_config(cli.config.as_deref())?;
            handle_inspect(&wav, &config.wav)
        }
        Commands::Config { action } => handle_config_command(action, cli.config.as_deref()),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "lipcook", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

fn config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    custom_path.map(Path::to_path_buf).or_else(Config::default_path)
}

fn handle_cook(mut config: Config, args: &CookArgs, quiet: bool) -> Result<()> {
    args.apply_to(&mut config);
    let pipeline = Pipeline::from_config(&config)?;

    let decoded = load_wav_file(&args.wav, &config.wav)
        .with_context(|| format!("Failed to decode {}", args.wav.display()))?;
    let engine = ReplayEngine::from_path(&args.frames)
        .with_context(|| format!("Failed to read recorded inference {}", args.frames.display()))?;

    let buffer = Arc::new(decoded.buffer);
    let sequence = pipeline.spawn(buffer, Arc::new(engine)).wait()?;

    let format = args.output_format();
    match &args.output {
        Some(path) => save_sequence(path, &sequence, format)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            write_sequence(&mut stdout, &sequence, format)?;
            stdout.flush()?;
        }
    }

    if !quiet {
        print_summary(&sequence, decoded.header_fallback, args.output.as_deref());
    }
    Ok(())
}

fn print_summary(sequence: &FrameSequence, header_fallback: bool, output: Option<&Path>) {
    eprintln!(
        "{} {} frames ({:.2}s at {} fps)",
        "cooked".green().bold(),
        sequence.len(),
        sequence.duration_ms() as f64 / 1000.0,
        sequence.frame_rate()
    );
    if header_fallback {
        eprintln!(
            "  {} WAV header unreadable, assumed 44100 Hz stereo 16-bit",
            "note:".yellow()
        );
    }
    if let Some(path) = output {
        eprintln!("  written to {}", path.display().dimmed());
    }
}

fn handle_inspect(path: &Path, options: &WavOptions) -> Result<()> {
    let decoded = load_wav_file(path, options)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let buffer = &decoded.buffer;

    println!("{}", path.display().bold());
    println!("  sample rate:   {} Hz", buffer.sample_rate());
    println!("  channels:      {}", buffer.channels());
    println!("  bits/sample:   {}", buffer.bits_per_sample());
    println!("  samples:       {}", buffer.len());
    println!("  duration:      {:.3}s", buffer.duration().as_secs_f64());
    if decoded.header_fallback {
        println!("  header:        {}", "fallback (unparseable)".yellow());
    }

    match ChunkSegmenter::new(buffer) {
        Ok(segmenter) => {
            println!(
                "  chunks:        {} x {} samples",
                segmenter.chunk_count(),
                segmenter.chunk_len()
            );
        }
        Err(e) => println!("  chunks:        {}", e.red()),
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => match config_path(custom_path) {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("no configuration directory on this platform"),
        },
    }
    Ok(())
}
