//! keyscribe: transcribe MIDI files into timed key presses

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use keyscribe_core::{TranscribeConfig, Transcriber, Transcription, VoicePolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::CliConfig;

/// MIDI to keyboard transcription
#[derive(Parser)]
#[command(name = "keyscribe")]
#[command(about = "Turn MIDI files into key press sequences for a 21-key instrument")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a MIDI file and print or export the events
    Transcribe {
        /// Input MIDI file
        input: PathBuf,

        /// Write the full transcription as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file to use instead of the user config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Shift by this many semitones instead of detecting the key
        #[arg(short, long, allow_hyphen_values = true)]
        transpose: Option<i32>,

        /// Keep the original key
        #[arg(long)]
        no_auto: bool,

        /// Voice allocation policy
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        /// Chord grouping window in seconds
        #[arg(short, long)]
        window: Option<f64>,

        /// Print every event
        #[arg(long)]
        events: bool,
    },
    /// Show the effective configuration
    ShowConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to the user config path
    InitConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    ThreeVoice,
    HandSeparation,
    Direct,
}

impl From<PolicyArg> for VoicePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::ThreeVoice => Self::ThreeVoice,
            PolicyArg::HandSeparation => Self::HandSeparation,
            PolicyArg::Direct => Self::Direct,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Transcribe {
            input,
            output,
            config,
            transpose,
            no_auto,
            policy,
            window,
            events,
        } => {
            let mut settings = resolve_config(config)?.transcribe;
            if no_auto {
                settings.auto_transpose = false;
            }
            if transpose.is_some() {
                settings.manual_transpose = transpose;
            }
            if let Some(policy) = policy {
                settings.voice_policy = policy.into();
            }
            if window.is_some() {
                settings.chord_window = window;
            }
            run_transcribe(&input, output.as_deref(), settings, events)?;
        }
        Commands::ShowConfig { config } => {
            let config = resolve_config(config)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::InitConfig => {
            let path = config::save_config(&CliConfig::default())?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "keyscribe=debug" } else { "keyscribe=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();
    Ok(())
}

fn resolve_config(path: Option<PathBuf>) -> anyhow::Result<CliConfig> {
    match path {
        Some(path) => config::load_config_from(&path),
        None => Ok(config::load_config()),
    }
}

fn run_transcribe(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    settings: TranscribeConfig,
    print_events: bool,
) -> anyhow::Result<()> {
    let transcriber = Transcriber::new(settings).context("Invalid transcription settings")?;
    let score = keyscribe_services::read_midi(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    tracing::debug!(
        "{} instruments, {} pitched notes",
        score.instruments.len(),
        score.pitched_notes().len()
    );

    let transcription = transcriber.transcribe(&score)?;
    print_summary(&transcription);
    if print_events {
        for e in &transcription.events {
            let modifier = e.modifier.map(|m| format!("{}+", m.name())).unwrap_or_default();
            println!("{:>9.3}  {:<7}  {}{}", e.time, format!("{:?}", e.action), modifier, e.key);
        }
    }

    if let Some(path) = output {
        keyscribe_services::export_json(&transcription, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn print_summary(t: &Transcription) {
    let Some(d) = &t.diagnostics else {
        println!("No pitched notes, nothing to play");
        return;
    };
    println!("Key:       {}", d.estimated_key);
    println!(
        "Shift:     {:+} semitones (key {:+}, octave {:+})",
        d.total_shift, d.key_shift, d.octave_shift
    );
    println!(
        "Notes:     {} ({} in range, {} folded)",
        d.total_notes, d.in_range, d.out_of_range
    );
    println!("Policy:    {} ({} chords)", d.voice_policy.name(), d.chords);
    println!("Events:    {}", t.events.len());
    println!("Duration:  {:.2}s", t.total_duration);
}
