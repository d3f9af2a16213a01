//! Kifu command line.
//!
//! ## Usage
//!
//! - `kifu parse game.sgf` - Parse and re-serialize a record
//! - `kifu replay game.sgf 0:37.1` - Print the board at a treepath
//! - `kifu flatten game.sgf 0:40` - Print the problem cut from a treepath
//! - `kifu blunders game.sgf analysis.json` - List blunders and their problems
//! - `kifu path 0.0.0.1` - Normalize a treepath

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kifu::analysis::{TurnAnalysis, attach_all, find_blunders};
use kifu::board::Board;
use kifu::config::{Config, parse_threshold};
use kifu::movetree::MoveTree;
use kifu::problems::flatten_to_sgf;
use kifu::serializer::serialize;
use kifu::treepath::Treepath;

/// Kifu: SGF game records for Go
#[derive(Parser)]
#[command(name = "kifu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an SGF file and print it back out
    Parse { file: PathBuf },
    /// Replay a treepath on an empty board and print the position
    Replay {
        file: PathBuf,
        path: String,
        /// Reject setup stones that have no liberties
        #[arg(long)]
        strict: bool,
    },
    /// Print the problem obtained by flattening a treepath
    Flatten { file: PathBuf, path: String },
    /// Attach analysis JSON and list the blunders it reveals
    Blunders {
        file: PathBuf,
        analysis: PathBuf,
        /// Win-rate drop that counts as a blunder
        #[arg(long)]
        threshold: Option<String>,
    },
    /// Print a treepath in compact form
    Path { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse { file } => {
            let tree = load(&file)?;
            println!("{}", serialize(&tree)?);
        }
        Commands::Replay { file, path, strict } => {
            let tree = load(&file)?;
            let path: Treepath = path.parse()?;
            let board = Board::new(tree.game_info().size);
            let strict = strict || config.strict_placements;
            let (board, captures) = if strict {
                path.apply_to_board_strict(&tree, tree.root(), &board)?
            } else {
                path.apply_to_board(&tree, tree.root(), &board)?
            };
            print!("{board}");
            let captured: Vec<String> = captures.iter().map(|m| m.to_string()).collect();
            println!("captures: {}", captured.join(" "));
        }
        Commands::Flatten { file, path } => {
            let tree = load(&file)?;
            let path: Treepath = path.parse()?;
            println!("{}", flatten_to_sgf(&tree, &path)?);
        }
        Commands::Blunders {
            file,
            analysis,
            threshold,
        } => {
            let mut tree = load(&file)?;
            let threshold = match threshold {
                Some(t) => parse_threshold(&t)?,
                None => config.blunder_threshold,
            };
            let text = fs::read_to_string(&analysis)
                .with_context(|| format!("reading {}", analysis.display()))?;
            let records: Vec<TurnAnalysis> = serde_json::from_str(&text)
                .with_context(|| format!("decoding {}", analysis.display()))?;
            let attached = attach_all(&mut tree, records);
            info!(attached, "attached analysis");

            for blunder in find_blunders(&tree, threshold) {
                println!(
                    "move {} ({}) lost {:.1}% at {}",
                    blunder.move_num,
                    blunder.color,
                    blunder.delta * 100.0,
                    blunder.path
                );
                println!("{}", flatten_to_sgf(&tree, &blunder.path)?);
            }
        }
        Commands::Path { path } => {
            let path: Treepath = path.parse()?;
            println!("{path}");
        }
    }
    Ok(())
}

fn load(file: &Path) -> Result<MoveTree> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let tree = kifu::parser::parse(&text).with_context(|| format!("parsing {}", file.display()))?;
    info!(file = %file.display(), nodes = tree.len(), "loaded game");
    Ok(tree)
}
