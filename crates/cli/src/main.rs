use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use slot_engine::{
    Command, Editor, EditorConfig, Event, JsonFileStore, MediaPlayer, Slot, SlotStore, active_at,
    format_timecode,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slot-cli")]
#[command(about = "Headless import, export and inspection of timed slots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Editor config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode JSON or CSV text and print the normalized slots as JSON
    Normalize {
        /// Input file, or `-` for stdin
        input: PathBuf,

        /// Media duration in seconds; slots are clamped to it
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Decode JSON or CSV text and store it as the slots of a video
    Import {
        /// Input file, or `-` for stdin
        input: PathBuf,

        #[arg(long)]
        video_id: String,

        /// Store directory
        #[arg(short, long, default_value = "slot-data")]
        store: PathBuf,

        /// Media duration in seconds; slots are clamped to it
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Print the stored slots of a video as JSON
    Export {
        #[arg(long)]
        video_id: String,

        /// Store directory
        #[arg(short, long, default_value = "slot-data")]
        store: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the stored slots active at a playback time
    Active {
        #[arg(long)]
        video_id: String,

        /// Store directory
        #[arg(short, long, default_value = "slot-data")]
        store: PathBuf,

        /// Playback time in seconds
        #[arg(long)]
        at: f64,
    },
}

/// Media with a fixed duration and no playback.
#[derive(Debug, Clone, Copy)]
struct StaticMedia {
    duration: f64,
}

impl MediaPlayer for StaticMedia {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek(&mut self, _t: f64) {}
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    let output = match cli.command {
        Commands::Normalize { input, duration } => {
            let text = read_input(&input)?;
            let slots = normalize(&text, "stdin", duration.unwrap_or(0.0), config)?;
            slot_engine::codec::encode(&slots)?
        }
        Commands::Import {
            input,
            video_id,
            store,
            duration,
        } => {
            let text = read_input(&input)?;
            import(&text, &video_id, &store, duration.unwrap_or(0.0), config)?
        }
        Commands::Export {
            video_id,
            store,
            output,
        } => {
            let text = export(&video_id, &store, config)?;
            if let Some(path) = output {
                std::fs::write(&path, &text)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = ?path, "slots written");
                return Ok(());
            }
            text
        }
        Commands::Active {
            video_id,
            store,
            at,
        } => active(&video_id, &store, at)?,
    };

    println!("{output}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Runs `text` through the editor's import path: decode, snap, clamp and
/// drop what is too short.
fn normalize(text: &str, video_id: &str, duration: f64, config: EditorConfig) -> Result<Vec<Slot>> {
    let mut editor = Editor::new(StaticMedia { duration }, video_id, config);
    editor.handle_command(Command::Import {
        text: text.to_owned(),
    })?;
    debug!(slot_count = editor.slots().len(), "text normalized");
    Ok(editor.slots().to_vec())
}

fn import(
    text: &str,
    video_id: &str,
    store_root: &Path,
    duration: f64,
    config: EditorConfig,
) -> Result<String> {
    let slots = normalize(text, video_id, duration, config)?;
    let stored = JsonFileStore::new(store_root).save(video_id, &slots)?;
    Ok(format!(
        "stored {} slots for {} at {}",
        stored.slots.len(),
        stored.video_id,
        stored.saved_at_ms
    ))
}

fn export(video_id: &str, store_root: &Path, config: EditorConfig) -> Result<String> {
    let slots = JsonFileStore::new(store_root).load(video_id)?;
    let mut editor = Editor::new(StaticMedia { duration: 0.0 }, video_id, config);
    editor.handle_command(Command::Restore { slots })?;
    let events = editor.handle_command(Command::Export)?;
    match events.into_iter().next() {
        Some(Event::Exported { text }) => Ok(text),
        _ => bail!("export produced no text"),
    }
}

fn active(video_id: &str, store_root: &Path, at: f64) -> Result<String> {
    let slots = JsonFileStore::new(store_root).load(video_id)?;
    let ids = active_at(&slots, at);
    let lines: Vec<String> = slots
        .iter()
        .filter(|slot| ids.contains(&slot.id))
        .map(|slot| {
            format!(
                "{}\t{} - {}\t{}\t{}",
                slot.id,
                format_timecode(slot.start),
                format_timecode(slot.end),
                slot.category.as_str(),
                slot.label
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
