#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use clap::{Parser, ValueEnum};
#[cfg(not(target_arch = "wasm32"))]
use serde::Serialize;
#[cfg(not(target_arch = "wasm32"))]
use tetris3d_engine::{GameConfig, GameEvent, RandomizerKind, Session, autoplay};
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

#[cfg(not(target_arch = "wasm32"))]
#[derive(ValueEnum, Debug, Clone, Copy)]
enum Policy {
    Bag,
    Uniform,
}

/// Plays seeded sessions with the greedy placement policy and reports the
/// outcome as JSON.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug, Clone)]
struct Opts {
    /// Seed for the first game; later games use consecutive seeds
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,
    /// Piece limit per game
    #[arg(long, default_value_t = 1000)]
    pieces: u32,
    #[arg(long, default_value_t = 10)]
    cols: usize,
    #[arg(long, default_value_t = 20)]
    rows: usize,
    #[arg(long, value_enum, default_value_t = Policy::Bag)]
    randomizer: Policy,
    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Serialize, Debug)]
struct GameReport {
    seed: u64,
    pieces: u32,
    lines: u32,
    level: u32,
    score: u32,
    blocked: u32,
    game_over: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn play_game(config: GameConfig, seed: u64, piece_limit: u32) -> anyhow::Result<GameReport> {
    let mut session = Session::seeded(config, seed)?;
    session.start();
    let mut pieces = 0;
    let mut blocked = 0;
    while pieces < piece_limit && !session.state().game_over {
        for event in autoplay::play_one(&mut session) {
            match event {
                GameEvent::Locked => pieces += 1,
                GameEvent::Blocked => blocked += 1,
                GameEvent::LevelUp { level } => tracing::info!(seed, level, "level up"),
                _ => {}
            }
        }
    }
    let state = session.state();
    Ok(GameReport {
        seed,
        pieces,
        lines: state.lines,
        level: state.level,
        score: state.score,
        blocked,
        game_over: state.game_over,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let config = GameConfig {
        cols: opts.cols,
        rows: opts.rows,
        randomizer: match opts.randomizer {
            Policy::Bag => RandomizerKind::SevenBag,
            Policy::Uniform => RandomizerKind::Uniform,
        },
        ..GameConfig::default()
    };
    config.validate()?;

    let mut reports = Vec::with_capacity(opts.games as usize);
    for game in 0..opts.games {
        let seed = opts.seed.wrapping_add(u64::from(game));
        let report = play_game(config.clone(), seed, opts.pieces)?;
        tracing::info!(
            seed,
            pieces = report.pieces,
            lines = report.lines,
            game_over = report.game_over,
            "game finished"
        );
        reports.push(report);
    }

    let out = if opts.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{out}");
    Ok(())
}
