// CVVC phonemizer CLI entry point.
//
// Reads a voicebank table and a score (both JSON), phonemizes every note
// group, and prints the resulting alias events as JSON on stdout. Logs go to
// stderr; `RUST_LOG` overrides the level chosen by `--verbose`.
//
// Usage:
//   cargo run -p cvvc_phonemizer -- --voicebank data/demo_voicebank.json \
//     --score data/demo_score.json [--config FILE] [--tables FILE] [--bpm N] [-v]

use anyhow::{Context, Result};
use clap::Parser;
use cvvc_lang::LookupTables;
use cvvc_phonemizer::config::load_tables;
use cvvc_phonemizer::score::{Score, phonemize_score};
use cvvc_phonemizer::{PhonemeSequencer, PhonemizerConfig, VoicebankTable};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "phonemize")]
#[command(version, about = "Phonemize a score against a CVVC voicebank", long_about = None)]
struct Args {
    /// Voicebank alias table (JSON)
    #[arg(long)]
    voicebank: PathBuf,

    /// Score to phonemize (JSON)
    #[arg(long)]
    score: PathBuf,

    /// Phonemizer configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Custom lookup table definitions (JSON) replacing the built-in tables
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Tempo override for millisecond-to-tick conversion
    #[arg(long)]
    bpm: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => PhonemizerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PhonemizerConfig::default(),
    };
    if let Some(bpm) = args.bpm {
        config.tempo.bpm = bpm;
    }

    let custom_tables = match &args.tables {
        Some(path) => {
            Some(load_tables(path).with_context(|| format!("loading tables {}", path.display()))?)
        }
        None => None,
    };
    let tables: &LookupTables = match &custom_tables {
        Some(tables) => tables,
        None => LookupTables::builtin(),
    };

    let voicebank = VoicebankTable::load(&args.voicebank)
        .with_context(|| format!("loading voicebank {}", args.voicebank.display()))?;
    let score = Score::load(&args.score)
        .with_context(|| format!("loading score {}", args.score.display()))?;
    info!(
        "Loaded {} aliases in {} subbanks, {} notes",
        voicebank.otos.len(),
        voicebank.subbanks.len(),
        score.notes().len()
    );

    let sequencer = PhonemeSequencer::new(tables, &voicebank, &config.tempo, &config);
    let groups = phonemize_score(&score, &sequencer);
    let events: usize = groups.iter().map(|g| g.events.len()).sum();
    info!("Phonemized {} note groups into {} events", groups.len(), events);

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}
