//! Catchup-Rust: a Catchup engine driven by MCTS with RAVE.
//!
//! ## Usage
//!
//! - `catchup-rust` - Show a demo
//! - `catchup-rust console` - Start the text protocol on stdin/stdout
//! - `catchup-rust selfplay` - Play automated seats against each other
//! - `catchup-rust demo` - Run the MCTS demo

use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use log::info;

use catchup_rust::board::Move;
use catchup_rust::config::{Budget, FinalMovePolicy, SearchConfig};
use catchup_rust::console::ConsoleEngine;
use catchup_rust::constants::{DEFAULT_SIDE, MAX_SIDE, SEARCH_TIME_MS};
use catchup_rust::game::{Game, Seat};
use catchup_rust::player::{MctsPlayer, RandomPlayer};
use catchup_rust::position::Position;

/// Catchup-Rust: a Catchup engine with Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "catchup-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SearchArgs {
    /// Board side length
    #[arg(long, global = true, default_value_t = DEFAULT_SIDE)]
    side: usize,

    /// Thinking time per move in milliseconds
    #[arg(long, global = true, default_value_t = SEARCH_TIME_MS)]
    time_ms: u64,

    /// Fixed number of iterations per move (overrides --time-ms)
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Random seed
    #[arg(long, global = true, default_value_t = 1)]
    seed: u64,

    /// Disable RAVE and use plain UCB1
    #[arg(long, global = true)]
    no_rave: bool,

    /// Final move policy: best, robust or worst
    #[arg(long, global = true, default_value_t = FinalMovePolicy::Robust)]
    policy: FinalMovePolicy,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        let budget = match self.iterations {
            Some(n) => Budget::Iterations(n),
            None => Budget::Time(Duration::from_millis(self.time_ms)),
        };
        let mut config = SearchConfig {
            budget,
            policy: self.policy,
            ..SearchConfig::default()
        };
        if self.no_rave {
            config.rave = None;
        }
        config
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeatKind {
    Mcts,
    Random,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol on stdin/stdout
    Console,
    /// Play automated seats against each other and tally the wins
    Selfplay {
        /// Black seat
        #[arg(long, value_enum, default_value_t = SeatKind::Mcts)]
        black: SeatKind,
        /// White seat
        #[arg(long, value_enum, default_value_t = SeatKind::Random)]
        white: SeatKind,
        /// Number of games
        #[arg(long, default_value_t = 10)]
        games: u32,
    },
    /// Run a simple demo of the engine
    Demo,
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let cli = Cli::parse();
    let side = cli.search.side;
    if !(1..=MAX_SIDE).contains(&side) {
        bail!("board side must be in 1..={MAX_SIDE}, got {side}");
    }
    let config = cli.search.config();
    let seed = cli.search.seed;

    match cli.command {
        Some(Commands::Console) => ConsoleEngine::new(side, config, seed).run(),
        Some(Commands::Selfplay { black, white, games }) => {
            selfplay(side, &config, seed, [black, white], games);
            Ok(())
        }
        Some(Commands::Demo) | None => {
            run_demo(side, config, seed);
            Ok(())
        }
    }
}

fn make_seat(kind: SeatKind, config: &SearchConfig, seed: u64) -> Seat {
    match kind {
        SeatKind::Mcts => Seat::Ai(Box::new(MctsPlayer::new(config.clone(), seed))),
        SeatKind::Random => Seat::Ai(Box::new(RandomPlayer::new(seed))),
    }
}

fn selfplay(side: usize, config: &SearchConfig, seed: u64, kinds: [SeatKind; 2], games: u32) {
    let mut wins = [0u32; 2];
    for game_no in 0..games {
        let base = seed.wrapping_add(2 * u64::from(game_no));
        let seats = [
            make_seat(kinds[0], config, base),
            make_seat(kinds[1], config, base.wrapping_add(1)),
        ];
        let names = [seats[0].name().to_string(), seats[1].name().to_string()];
        let game = Game::new(side, seats);
        if let Some(winner) = game.winner() {
            wins[winner] += 1;
            info!(
                "game {}: {} ({}) wins, score {:?}",
                game_no + 1,
                ["black", "white"][winner],
                names[winner],
                game.position().score()
            );
        }
    }
    println!("black {} - {} white", wins[0], wins[1]);
}

fn run_demo(side: usize, config: SearchConfig, seed: u64) {
    println!("Catchup-Rust: Catchup MCTS Engine\n");

    let mut pos = Position::new(side);
    let mut player = MctsPlayer::new(config, seed);
    while !pos.is_game_over() {
        let mover = pos.current_player();
        let report = player.search(&pos);
        pos.play_move(report.chosen);
        println!(
            "{}: {:<5} {} iterations, winrate {:.1}%",
            ["Black", "White"][mover],
            pos.board().format_move(report.chosen),
            report.iterations,
            report.winrate * 100.0
        );
        if report.chosen == Move::Pass || pos.current_player() != mover {
            println!("{pos}");
        }
    }

    let score = pos.score();
    println!("Black groups: {:?}", score[0]);
    println!("White groups: {:?}", score[1]);
    println!("{} wins", ["Black", "White"][pos.winner()]);
}
