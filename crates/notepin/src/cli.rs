#![forbid(unsafe_code)]

//! Command-line front end: one board operation per invocation.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use notepin_core::{Direction, FONT_SIZES, ItemId};
use notepin_runtime::{FileStorage, MonotonicClock, RuntimeConfig, init_logging};
use notepin_widgets::StackView;

use crate::board::{Board, BoardOptions};
use crate::{Error, Rejection, Result};

#[derive(Debug, Parser)]
#[command(name = "notepin", about = "Sticky-note to-do list", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data file; overrides the configured one.
    #[arg(long = "data-file", global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print every item with its completion mark.
    List,

    /// Add an item at the end, or after another item.
    Add {
        #[arg(long)]
        after: Option<u64>,
        text: String,
    },

    /// Flip an item's completion.
    Toggle { id: u64 },

    /// Replace an item's text.
    Edit { id: u64, text: String },

    /// Delete an item.
    Remove { id: u64 },

    /// Swap an item with its neighbour.
    Move { id: u64, direction: MoveDirection },

    /// Delete every completed item.
    #[command(name = "clear-completed")]
    ClearCompleted,

    /// Set the font size.
    Font { size: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Self::Up,
            MoveDirection::Down => Self::Down,
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.log_filter);
    let stdout = std::io::stdout();
    execute(cli.command, &config, &mut stdout.lock())
}

/// Run `cli`, writing user-facing output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = resolve_config(&cli)?;
    execute(cli.command, &config, out)
}

fn resolve_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(path) = &cli.data_file {
        config.data_file = Some(path.clone());
    }
    Ok(config.validated()?)
}

fn require(board: &Board<FileStorage, StackView>, raw: u64) -> Result<ItemId> {
    let id = ItemId::new(raw);
    match board.document().position(id) {
        Some(_) => Ok(id),
        None => Err(Error::UnknownItem(id)),
    }
}

fn execute(command: Commands, config: &RuntimeConfig, out: &mut dyn Write) -> Result<()> {
    let storage = FileStorage::new(config.data_path());
    // A data file that cannot be read is reported, never overwritten.
    let mut board = Board::try_open(
        storage,
        StackView::new(),
        MonotonicClock,
        BoardOptions::from_config(config),
    )?;

    let read_only = matches!(command, Commands::List);
    let outcome = apply(&mut board, command, out);
    if !read_only {
        board.close();
    }
    outcome?;
    print_list(&board, out)
}

fn apply(
    board: &mut Board<FileStorage, StackView>,
    command: Commands,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::List => {}
        Commands::Add { after, text } => {
            let after = match after {
                Some(raw) => Some(require(board, raw)?),
                None => None,
            };
            let id = board
                .add_item_with_text(after, &text)
                .ok_or(Error::Rejected(Rejection::IdsExhausted))?;
            writeln!(out, "added {id}")?;
        }
        Commands::Toggle { id } => {
            let id = require(board, id)?;
            board.toggle_completion(id);
        }
        Commands::Edit { id, text } => {
            let id = require(board, id)?;
            board.edit_text(id, &text);
        }
        Commands::Remove { id } => {
            let id = require(board, id)?;
            board.delete_item(id);
            writeln!(out, "removed {id}")?;
        }
        Commands::Move { id, direction } => {
            let id = require(board, id)?;
            let direction = Direction::from(direction);
            if !board.swap_items(id, direction) {
                return Err(Error::Rejected(Rejection::MoveAtEdge { id, direction }));
            }
        }
        Commands::ClearCompleted => {
            let removed = board.clear_completed();
            writeln!(out, "cleared {}", removed.len())?;
        }
        Commands::Font { size } => {
            if !FONT_SIZES.contains(&size) {
                return Err(Error::Rejected(Rejection::UnsupportedFontSize(size)));
            }
            board.change_font_size(size);
        }
    }
    Ok(())
}

fn print_list(board: &Board<FileStorage, StackView>, out: &mut dyn Write) -> Result<()> {
    let width = board
        .host()
        .packed_order()
        .iter()
        .map(|id| id.to_string().len())
        .max()
        .unwrap_or(1);
    for row in board.host().packed_rows() {
        let mark = if row.completed { 'x' } else { ' ' };
        let mut lines = row.text.split('\n');
        let first = lines.next().unwrap_or_default();
        writeln!(out, "[{mark}] {:>width$}  {first}", row.id.get())?;
        for line in lines {
            writeln!(out, "    {:>width$}  {line}", "")?;
        }
    }
    let doc = board.document();
    writeln!(
        out,
        "{}/{} done ({:.0}%)",
        doc.completed_count(),
        doc.len(),
        board.progress() * 100.0
    )?;
    Ok(())
}
