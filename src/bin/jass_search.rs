//! Thin `clap`-derived CLI over the evaluator library (§6). The library
//! crate has no CLI dependency of its own; this binary is its only
//! consumer of `clap`.

use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use jass_core::codec::Codec;
use jass_core::core::config::Config;
use jass_core::core::error::ErrorKind;
use jass_core::export::TrecExporter;
use jass_core::index::Index;
use jass_core::query::Query;
use jass_core::topk::HeapSelector;

#[derive(Parser)]
#[command(name = "jass-search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reads queries one per line from stdin, writes a TREC run to stdout.
    Search {
        #[arg(long = "index")]
        index: PathBuf,
        #[arg(short = 'k', default_value_t = 10)]
        k: usize,
        #[arg(long = "codec")]
        codec: Option<String>,
        #[arg(long = "run-tag", default_value = "jass")]
        run_tag: String,
    },
    /// Runs a single query given on the command line.
    Query {
        #[arg(long = "index")]
        index: PathBuf,
        #[arg(short = 'k', default_value_t = 10)]
        k: usize,
        #[arg(long = "codec")]
        codec: Option<String>,
        #[arg(long = "run-tag", default_value = "jass")]
        run_tag: String,
        query_text: String,
    },
}

fn parse_codec(name: &str) -> Option<Codec> {
    match name.to_ascii_lowercase().as_str() {
        "vbyte" => Some(Codec::VByte),
        "stream-vbyte" | "streamvbyte" => Some(Codec::StreamVByte),
        "simple9" => Some(Codec::Simple9),
        "simple16" => Some(Codec::Simple16),
        "relative10" => Some(Codec::RelativeTen),
        "carryover12" => Some(Codec::Carryover12),
        "carry8b" => Some(Codec::Carry8b),
        "elias-gamma" | "eliasgamma" => Some(Codec::EliasGamma),
        "elias-delta" | "eliasdelta" => Some(Codec::EliasDelta),
        "bitpack32" => Some(Codec::BitPack32),
        "qmx" => Some(Codec::Qmx),
        _ => None,
    }
}

fn run_one(index: &Index, config: &Config, run_tag: &str, k: usize, query_text: &str, out: &mut impl Write) -> jass_core::core::error::Result<()> {
    let mut query: Query<HeapSelector> = Query::new(index, k, config);
    let result = query.execute(query_text)?;
    let qid = result.query_id.unwrap_or_else(|| "0".to_string());
    let exporter = TrecExporter::new(run_tag);
    exporter
        .write(out, &qid, index, result.results)
        .map_err(|e| jass_core::core::error::Error::new(ErrorKind::Io, e.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            index,
            k,
            codec,
            run_tag,
        } => {
            let mut config = Config::default();
            if let Some(name) = codec {
                match parse_codec(&name) {
                    Some(c) => config.default_codec = c,
                    None => {
                        eprintln!("unknown codec: {name}");
                        return ExitCode::from(3);
                    }
                }
            }
            let index = match Index::open(&index) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("failed to open index: {e}");
                    return ExitCode::from(1);
                }
            };

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        eprintln!("read error: {e}");
                        return ExitCode::from(1);
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = run_one(&index, &config, &run_tag, k, &line, &mut out) {
                    eprintln!("query failed: {e}");
                    return ExitCode::from(match e.kind {
                        ErrorKind::Decode | ErrorKind::Vocabulary | ErrorKind::Overflow => 2,
                        _ => 1,
                    });
                }
            }
            ExitCode::SUCCESS
        }

        Command::Query {
            index,
            k,
            codec,
            run_tag,
            query_text,
        } => {
            let mut config = Config::default();
            if let Some(name) = codec {
                match parse_codec(&name) {
                    Some(c) => config.default_codec = c,
                    None => {
                        eprintln!("unknown codec: {name}");
                        return ExitCode::from(3);
                    }
                }
            }
            let index = match Index::open(&index) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("failed to open index: {e}");
                    return ExitCode::from(1);
                }
            };

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            if let Err(e) = run_one(&index, &config, &run_tag, k, &query_text, &mut out) {
                eprintln!("query failed: {e}");
                return ExitCode::from(match e.kind {
                    ErrorKind::Decode | ErrorKind::Vocabulary | ErrorKind::Overflow => 2,
                    _ => 1,
                });
            }
            ExitCode::SUCCESS
        }
    }
}
