//! CLI tool for xlmerge - lists, merges and unmerges cell ranges in XLSX files
//!
//! Usage:
//!   xlmerge_cli <input.xlsx> --sheet Sheet1 list [--json]
//!   xlmerge_cli <input.xlsx> --sheet Sheet1 merge D3 E9 [-o out.xlsx]
//!   xlmerge_cli <input.xlsx> --sheet Sheet1 unmerge A1 C3 [-o out.xlsx]

#![allow(clippy::exit)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use xlmerge::{MergeEditor, Result, XlmergeError};

#[derive(Parser)]
#[command(about = "Inspect and edit merged cell ranges of an XLSX workbook.")]
struct Args {
    /// Workbook to read.
    input: PathBuf,

    /// Worksheet name (matched case-insensitively).
    #[arg(long, short)]
    sheet: String,

    /// Where to write the edited workbook. Defaults to overwriting the input.
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Print merged ranges as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List merged ranges with the value of each top-left cell.
    List,
    /// Merge the area between two corner cells.
    Merge { h_cell: String, v_cell: String },
    /// Remove every merged range intersecting the area between two corner cells.
    Unmerge { h_cell: String, v_cell: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let data = fs::read(&args.input)?;
    let mut editor = MergeEditor::new();
    editor.load(&data)?;

    match &args.command {
        Command::List => {}
        Command::Merge { h_cell, v_cell } => editor.merge_cell(&args.sheet, h_cell, v_cell)?,
        Command::Unmerge { h_cell, v_cell } => {
            editor.unmerge_cell(&args.sheet, h_cell, v_cell)?;
        }
    }

    let merges = editor.get_merge_cells(&args.sheet)?;
    let mut stdout = io::stdout().lock();
    if args.json {
        let json = serde_json::to_string_pretty(&merges)
            .map_err(|e| XlmergeError::Other(format!("JSON serialization error: {e}")))?;
        writeln!(stdout, "{json}")?;
    } else {
        for merged in &merges {
            writeln!(stdout, "{}\t{}", merged.reference(), merged.cell_value())?;
        }
    }

    if matches!(args.command, Command::List) {
        return Ok(());
    }
    let output: &Path = args.output.as_deref().unwrap_or(&args.input);
    fs::write(output, editor.save()?)?;
    info!("wrote {}", output.display());
    Ok(())
}
