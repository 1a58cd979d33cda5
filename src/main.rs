//! Blockfall — classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod highscores;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Resolved options that shape a round.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub tick_rate: f64,
    pub seed: u32,
}

/// Seed from the wall clock, for when --seed is not given.
pub fn seed_from_time() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    // Smallest grid every spawn layout fits into (spawn column is width / 2).
    let config = GameConfig {
        width: args.width.max(6),
        height: args.height.max(6),
        tick_rate: args.tick_rate.max(1.0),
        seed: args.seed.unwrap_or_else(seed_from_time),
    };
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Stack the pieces; complete horizontal rows to clear them and score.",
    long_about = "Blockfall is a terminal puzzle game.\n\n\
        Guide falling four-cell pieces down the well. A piece settles where it lands; \
        filling a row from edge to edge clears it, and everything above drops down. \
        The round ends when a new piece no longer fits at the spawn point.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move    Up (k)  Rotate    Down (j)  Soft drop\n  Q / Esc           Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme), and --seed for a reproducible shape sequence."
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Playfield height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Simulation ticks per second (gravity advances every 40th tick).
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Seed for the shape sequence (wall clock when not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u32>,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
