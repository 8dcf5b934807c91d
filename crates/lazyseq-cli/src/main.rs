//! lazyseq CLI: streaming merge, chunking and grouping over line files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lazyseq_core::source::generate;
use lazyseq_core::{Cursor, CursorError, PipelineConfig};
use lazyseq_exec::{spawn_producer, CancelToken};
use lazyseq_operators::{interleave, CursorExt};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lazyseq")]
#[command(about = "Lazy, single-pass pipelines over line-oriented files", long_about = None)]
struct Cli {
    /// JSON configuration file (overridden by LAZYSEQ_* env vars and flags)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hand-off queue capacity per producer (overrides config)
    #[arg(long, global = true)]
    channel_capacity: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge files whose lines are already sorted into one sorted stream
    Merge {
        /// Sorted input files, one producer thread each
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Split a file into JSON batches of at most `target_bytes` bytes
    Chunk {
        file: PathBuf,

        /// Byte target per batch (overrides config)
        #[arg(long)]
        target_bytes: Option<u64>,
    },

    /// Count runs of adjacent lines sharing a key field
    Group {
        file: PathBuf,

        /// Zero-based index of the key field
        #[arg(long, default_value_t = 0)]
        field: usize,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delim: String,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChunkRecord {
    batch: usize,
    bytes: u64,
    lines: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct GroupRecord {
    key: String,
    count: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.channel_capacity) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = match cli.command {
        Commands::Merge { files } => run_merge(&files, &config, &mut out).map(|n| {
            tracing::info!(lines = n, "merge finished");
        }),
        Commands::Chunk { file, target_bytes } => {
            let target = target_bytes.unwrap_or(config.chunk_target_bytes);
            run_chunk(&file, target, &mut out).map(|n| {
                tracing::info!(batches = n, "chunk finished");
            })
        }
        Commands::Group { file, field, delim } => {
            run_group(&file, field, &delim, &mut out).map(|n| {
                tracing::info!(groups = n, "group finished");
            })
        }
        Commands::Config => show_config(&config, &mut out),
    };

    if let Err(e) = result.and_then(|()| out.flush().map_err(Into::into)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve configuration: JSON file, then env, then command-line flags.
fn load_config(
    path: Option<&Path>,
    channel_capacity: Option<usize>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    config.apply_env();
    if let Some(capacity) = channel_capacity {
        config.channel_capacity = capacity;
    }
    config.validate()?;
    Ok(config)
}

fn show_config<W: Write>(
    config: &PipelineConfig,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(&mut *out, config)?;
    writeln!(out)?;
    Ok(())
}

/// Read `reader` one line at a time, stripping the line terminator.
fn lines_of<R: BufRead>(mut reader: R) -> impl Cursor<Item = String> {
    generate(move || {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    })
}

fn open_lines(path: &Path) -> io::Result<impl Cursor<Item = String>> {
    Ok(lines_of(BufReader::new(File::open(path)?)))
}

fn run_merge<W: Write>(
    files: &[PathBuf],
    config: &PipelineConfig,
    out: &mut W,
) -> Result<u64, Box<dyn std::error::Error>> {
    if files.len() > config.merge_max_sources {
        return Err(format!(
            "{} inputs exceed merge_max_sources ({})",
            files.len(),
            config.merge_max_sources
        )
        .into());
    }

    let token = CancelToken::new();
    let mut sources = Vec::with_capacity(files.len());
    let mut handles = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let path = path.clone();
        let name = format!("{}-{}", config.producer_thread_prefix, i);
        let (cursor, handle) =
            spawn_producer(token.clone(), config.channel_capacity, name, move |publisher| {
                let mut lines = open_lines(&path)?;
                while lines.advance() {
                    if !publisher.publish(lines.current()?.clone()) {
                        break;
                    }
                }
                lazyseq_core::consume(&mut lines)
            })?;
        sources.push(cursor);
        handles.push(handle);
    }
    tracing::debug!(sources = sources.len(), "merge producers started");

    let mut merged = interleave(sources, |line: &String| Ok(line.clone()));
    let mut written = 0u64;
    let mut outcome: Result<(), Box<dyn std::error::Error>> = Ok(());
    while merged.advance() {
        let line = match merged.current() {
            Ok(line) => line,
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        };
        if let Err(e) = writeln!(out, "{}", line) {
            outcome = Err(e.into());
            break;
        }
        written += 1;
    }
    if outcome.is_ok() {
        if let Some(e) = merged.error() {
            outcome = Err(e.clone().into());
        }
    }

    if outcome.is_err() {
        token.cancel();
    }
    // Disposal releases every producer still blocked on a full queue.
    merged.dispose();
    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!("producer thread panicked");
        }
    }
    outcome.map(|()| written)
}

fn run_chunk<W: Write>(
    file: &Path,
    target_bytes: u64,
    out: &mut W,
) -> Result<usize, Box<dyn std::error::Error>> {
    // Each line counts its terminator so batch sizes match the bytes on disk.
    let mut batches = open_lines(file)?.chunk(target_bytes, |line: &String| Ok(line.len() as u64 + 1));
    let mut batch = 0;
    while batches.advance() {
        let mut window = batches.current()?.clone();
        let mut lines = Vec::new();
        while window.advance() {
            lines.push(window.current()?.clone());
        }
        if let Some(e) = window.error() {
            return Err(e.clone().into());
        }
        let bytes: u64 = lines.iter().map(|l| l.len() as u64 + 1).sum();
        serde_json::to_writer(&mut *out, &ChunkRecord { batch, bytes, lines })?;
        writeln!(out)?;
        batch += 1;
    }
    let result = batches.error().cloned();
    batches.dispose();
    match result {
        Some(e) => Err(e.into()),
        None => Ok(batch),
    }
}

fn run_group<W: Write>(
    file: &Path,
    field: usize,
    delim: &str,
    out: &mut W,
) -> Result<usize, Box<dyn std::error::Error>> {
    let delim = delim.to_string();
    let mut groups = open_lines(file)?.group_by(move |line: &String| {
        line.split(delim.as_str())
            .nth(field)
            .map(str::to_string)
            .ok_or_else(|| CursorError::callback(format!("line {:?} has no field {}", line, field)))
    });
    let mut emitted = 0;
    while groups.advance() {
        let grouping = groups.current()?.clone();
        let mut items = grouping.items;
        let mut count = 0;
        while items.advance() {
            count += 1;
        }
        if let Some(e) = items.error() {
            return Err(e.clone().into());
        }
        serde_json::to_writer(
            &mut *out,
            &GroupRecord {
                key: grouping.key,
                count,
            },
        )?;
        writeln!(out)?;
        emitted += 1;
    }
    let result = groups.error().cloned();
    groups.dispose();
    match result {
        Some(e) => Err(e.into()),
        None => Ok(emitted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lazyseq-cli-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn merge_interleaves_sorted_files() {
        let a = temp_file("merge-a.txt", "apple\ncherry\nfig\n");
        let b = temp_file("merge-b.txt", "banana\ncherry\ngrape\n");
        let config = PipelineConfig {
            channel_capacity: 1,
            ..PipelineConfig::default()
        };
        let mut out = Vec::new();
        let n = run_merge(&[a.clone(), b.clone()], &config, &mut out).unwrap();
        assert_eq!(n, 6);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "apple\nbanana\ncherry\ncherry\nfig\ngrape\n"
        );
        let _ = std::fs::remove_file(a);
        let _ = std::fs::remove_file(b);
    }

    #[test]
    fn merge_rejects_too_many_inputs() {
        let config = PipelineConfig {
            merge_max_sources: 1,
            ..PipelineConfig::default()
        };
        let files = vec![PathBuf::from("x"), PathBuf::from("y")];
        let err = run_merge(&files, &config, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("merge_max_sources"));
    }

    #[test]
    fn merge_reports_missing_file() {
        let a = temp_file("merge-present.txt", "a\nb\n");
        let missing = std::env::temp_dir().join("lazyseq-cli-definitely-missing.txt");
        let err = run_merge(&[a.clone(), missing], &PipelineConfig::default(), &mut Vec::new())
            .unwrap_err();
        assert!(!err.to_string().is_empty());
        let _ = std::fs::remove_file(a);
    }

    #[test]
    fn chunk_batches_by_bytes() {
        let f = temp_file("chunk.txt", "aa\nbb\ncccccc\nd\n");
        let mut out = Vec::new();
        let n = run_chunk(&f, 6, &mut out).unwrap();
        assert_eq!(n, 3);
        let records: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records[0]["lines"], serde_json::json!(["aa", "bb"]));
        assert_eq!(records[1]["lines"], serde_json::json!(["cccccc"]));
        assert_eq!(records[2]["bytes"], serde_json::json!(2));
        let _ = std::fs::remove_file(f);
    }

    #[test]
    fn group_counts_adjacent_runs() {
        let f = temp_file("group.csv", "a,1\na,2\nb,3\na,4\n");
        let mut out = Vec::new();
        let n = run_group(&f, 0, ",", &mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"key\":\"a\",\"count\":2}\n{\"key\":\"b\",\"count\":1}\n{\"key\":\"a\",\"count\":1}\n"
        );
        let _ = std::fs::remove_file(f);
    }

    #[test]
    fn group_missing_field_is_an_error() {
        let f = temp_file("group-short.csv", "a,1\nb\n");
        let err = run_group(&f, 1, ",", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("has no field 1"));
        let _ = std::fs::remove_file(f);
    }

    #[test]
    fn flag_overrides_config_file() {
        let f = temp_file("config.json", r#"{ "channel_capacity": 8, "merge_max_sources": 4 }"#);
        let config = load_config(Some(&f), Some(2)).unwrap();
        assert_eq!(config.channel_capacity, 2);
        assert_eq!(config.merge_max_sources, 4);
        let _ = std::fs::remove_file(f);
    }

    #[test]
    fn config_prints_as_json() {
        let mut out = Vec::new();
        show_config(&PipelineConfig::default(), &mut out).unwrap();
        let parsed: PipelineConfig = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, PipelineConfig::default());
    }

    #[test]
    fn lines_strip_crlf() {
        let mut lines = lines_of(io::Cursor::new("one\r\ntwo"));
        assert!(lines.advance());
        assert_eq!(lines.current().unwrap(), "one");
        assert!(lines.advance());
        assert_eq!(lines.current().unwrap(), "two");
        assert!(!lines.advance());
    }
}
