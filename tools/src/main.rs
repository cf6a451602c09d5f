use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use rdpsnd_tools::{
    format_inspect_pretty, format_replay_pretty, inspect_stream, replay, WavSink,
};
use session::{AudioChunk, SessionConfig};

#[derive(Parser)]
#[command(
    name = "rdpsnd-tools",
    version,
    about = "rdpsnd capture inspection and replay tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect the PDU structure of captured inbound bytes.
    Inspect {
        /// Path to a capture file or a directory of captures.
        capture_path: PathBuf,
        /// Optional session config JSON (only its limits are used).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected captures.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected captures (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Replay a capture through a client session.
    Replay {
        /// Path to the capture file.
        capture_file: PathBuf,
        /// Optional session config JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Feed the capture in chunks of this many bytes (0 feeds it whole).
        #[arg(long, default_value_t = 0)]
        chunk_size: usize,
        /// Write played PCM audio to this WAV file.
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            capture_path,
            config,
            glob,
            sort,
            limit,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            if capture_path.is_dir() {
                let entries = collect_capture_entries(&capture_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read capture {}", entry.path.display()))?;
                    let report = inspect_stream(&bytes, &config.limits);
                    if format == OutputFormat::Pretty {
                        println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    }
                    print_output(&report, format, format_inspect_pretty)?;
                }
            } else {
                let bytes = fs::read(&capture_path)
                    .with_context(|| format!("read capture {}", capture_path.display()))?;
                let report = inspect_stream(&bytes, &config.limits);
                print_output(&report, format, format_inspect_pretty)?;
            }
        }
        Command::Replay {
            capture_file,
            config,
            chunk_size,
            wav,
            format,
        } => {
            let bytes = fs::read(&capture_file)
                .with_context(|| format!("read capture {}", capture_file.display()))?;
            let config = load_config(config.as_deref())?;
            let report = match wav {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("create wav {}", path.display()))?;
                    let (report, sink) =
                        replay(&bytes, config, chunk_size, WavSink::new(BufWriter::new(file)));
                    let summary = sink
                        .finish()
                        .with_context(|| format!("write wav {}", path.display()))?;
                    log::info!(
                        "wrote {} samples to {} ({} chunks skipped)",
                        summary.samples_written,
                        path.display(),
                        summary.skipped_chunks
                    );
                    report
                }
                None => replay(&bytes, config, chunk_size, Vec::<AudioChunk>::new()).0,
            };
            print_output(&report, format, format_replay_pretty)?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config: SessionConfig =
        serde_json::from_str(&contents).context("parse session config json")?;
    Ok(config)
}

fn print_output<R: serde::Serialize>(
    report: &R,
    format: OutputFormat,
    pretty: fn(&R) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", pretty(report)),
    }
    Ok(())
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(CaptureEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<CaptureEntry>,
    sort: Option<InspectSort>,
) -> Vec<CaptureEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}
