//! hexstack: stack-sorting puzzle on a hex board, in the terminal.

mod animation;
mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use animation::TerminalPresenter;
use app::App;
use clap::{Parser, ValueEnum};
use hexstack::{Session, SessionConfig, Slot};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let config = args.session_config();
    let session = Session::new(config).context("invalid board options")?;

    if let Some(moves) = args.autoplay {
        return autoplay(session, moves);
    }

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let mut app = App::new(&args, session, theme);
    app.run()
}

/// Logs go to a file only; the terminal belongs to the board.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot open log file {}", path.display()))?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

/// Place `moves` options on random open cells with every animation settling
/// instantly, then report the result.
fn autoplay(mut session: Session, moves: usize) -> Result<()> {
    let mut presenter = TerminalPresenter::instant();
    let mut placed = 0;
    while placed < moves {
        if session.progress().is_complete() {
            session.advance_level(&mut presenter)?;
        }
        let open = session.board().open_cells();
        if open.is_empty() {
            tracing::info!(placed, "board full");
            break;
        }
        let Some(slot) = session.slots().iter().position(Slot::is_ready) else {
            break;
        };
        let at = open[session.spawner_mut().pick(open.len())];
        session.place(slot, at, &mut presenter)?;
        presenter.settle(&mut session);
        placed += 1;
    }
    let progress = session.progress();
    println!(
        "placed {placed} stacks: score {} level {} ({}/{})",
        progress.score, progress.level, progress.progress, progress.target
    );
    Ok(())
}

/// Hex stack-sorting puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "hexstack",
    version,
    about = "Hex stack-sorting puzzle in the terminal. Drop stacks, let matching colours slide together, pop runs of ten.",
    long_about = "hexstack is a terminal puzzle played on a hexagonal board.\n\n\
        Drop a stack of coloured tiles from the tray onto an empty cell. Neighbouring stacks \
        with the same top colour pour their top runs onto one of them. When a single colour \
        run reaches ten tiles it pops and scores.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor    1-3 / Tab   Pick option\n  \
        Enter / Space  Place          n           Next level   q / Esc   Quit\n\n\
        Use --theme to load a btop-style theme file."
)]
pub struct Args {
    /// Board radius in cells from the centre.
    #[arg(short, long, default_value = "2", value_name = "N")]
    pub radius: u32,

    /// Number of tile colours in play (1-6).
    #[arg(short, long, default_value = "6", value_name = "N")]
    pub colors: u8,

    /// Smallest generated stack.
    #[arg(long, default_value = "3", value_name = "N")]
    pub min_stack: usize,

    /// Largest generated stack.
    #[arg(long, default_value = "6", value_name = "N")]
    pub max_stack: usize,

    /// Fewest colours picked for one generated stack.
    #[arg(long, default_value = "1", value_name = "N")]
    pub min_distinct: usize,

    /// Most colours picked for one generated stack.
    #[arg(long, default_value = "3", value_name = "N")]
    pub max_distinct: usize,

    /// Seed for stack generation; same seed, same stacks.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the neon palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip animations; every move lands at once.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write logs to this file (level via RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Play N random moves without a terminal UI and print the score.
    #[arg(long, value_name = "N")]
    pub autoplay: Option<usize>,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            radius: self.radius,
            palette_size: self.colors,
            stack_size: self.min_stack..=self.max_stack,
            distinct_colors: self.min_distinct..=self.max_distinct,
            seed: self.seed,
            ..SessionConfig::default()
        }
    }
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
