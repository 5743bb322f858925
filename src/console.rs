//! Line-oriented text protocol for driving the engine.
//!
//! Modeled on the Go Text Protocol: each line is an optional numeric id,
//! a command and its arguments. Replies start with `=` on success or `?`
//! on failure, followed by the id (if any) and the reply text, and end with
//! a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <side>` - Start an empty board of the given side
//! - `clear_board` - Reset the board to empty
//! - `play <color> <vertex>` - Place a stone (or `pass`) for the player to move
//! - `pass` - Pass for the player to move
//! - `genmove <color>` - Search and play a move for the player to move
//! - `showboard` - Print the board
//! - `score` - Group sizes of both players, largest first
//! - `status` - Player to move and plays left, or the winner
//! - `hint` - Placements the engine expects after its last move
//!
//! ## Example
//!
//! ```no_run
//! use catchup_rust::config::SearchConfig;
//! use catchup_rust::console::ConsoleEngine;
//!
//! let mut engine = ConsoleEngine::new(5, SearchConfig::default(), 42);
//! engine.run().unwrap();
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Result;
use log::{debug, info};

use crate::board::Move;
use crate::config::SearchConfig;
use crate::constants::MAX_SIDE;
use crate::player::{MctsPlayer, Player};
use crate::position::Position;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "hint",
    "known_command",
    "list_commands",
    "name",
    "pass",
    "play",
    "protocol_version",
    "quit",
    "score",
    "showboard",
    "status",
    "version",
];

const COLOR_NAMES: [&str; 2] = ["black", "white"];

/// Console engine state.
pub struct ConsoleEngine {
    pos: Position,
    player: MctsPlayer,
    /// Whether the last move on the board came from `genmove`
    engine_moved_last: bool,
}

impl ConsoleEngine {
    pub fn new(side: usize, config: SearchConfig, seed: u64) -> Self {
        Self {
            pos: Position::new(side),
            player: MctsPlayer::new(config, seed),
            engine_moved_last: false,
        }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the command loop on any reader and writer until `quit` or EOF.
    pub fn serve(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            debug!("console <- {command_line}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Check that `color` names the player to move.
    fn check_color(&self, color: &str) -> Result<(), String> {
        let player = match color.to_lowercase().as_str() {
            "b" | "black" => 0,
            "w" | "white" => 1,
            _ => return Err(format!("invalid color '{color}'")),
        };
        let to_move = self.pos.current_player();
        if player != to_move {
            return Err(format!("{} is to move", COLOR_NAMES[to_move]));
        }
        Ok(())
    }

    fn reset(&mut self, side: usize) {
        self.pos = Position::new(side);
        self.engine_moved_last = false;
    }

    fn apply(&mut self, mv: Move) -> (bool, String) {
        match self.pos.try_play(mv) {
            Ok(()) => {
                self.engine_moved_last = false;
                (true, String::new())
            }
            Err(e) => (false, e.to_string()),
        }
    }

    fn status(&self) -> String {
        if self.pos.is_game_over() {
            format!("game over, {} wins", COLOR_NAMES[self.pos.winner()])
        } else {
            format!(
                "{} to move, {} left{}",
                COLOR_NAMES[self.pos.current_player()],
                self.pos.remaining_plays(),
                if self.pos.may_pass() { ", may pass" } else { "" }
            )
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(side) if (1..=MAX_SIDE).contains(&side) => {
                        self.reset(side);
                        (true, String::new())
                    }
                    Ok(side) => (
                        false,
                        format!("unacceptable size, side must be in 1..={MAX_SIDE} (got {side})"),
                    ),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.reset(self.pos.board().side());
                (true, String::new())
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                if let Err(e) = self.check_color(color) {
                    return (false, e);
                }
                match self.pos.board().parse_move(vertex) {
                    Ok(mv) => self.apply(mv),
                    Err(e) => (false, e.to_string()),
                }
            }

            "pass" => self.apply(Move::Pass),

            "genmove" => {
                let Some(color) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                if self.pos.is_game_over() {
                    return (false, "game over".to_string());
                }
                if let Err(e) = self.check_color(color) {
                    return (false, e);
                }
                let report = self.player.search(&self.pos);
                info!(
                    "genmove {}: {} ({} visits, winrate {:.3})",
                    COLOR_NAMES[self.pos.current_player()],
                    self.pos.board().format_move(report.chosen),
                    report.visits,
                    report.winrate
                );
                self.pos.play_move(report.chosen);
                self.engine_moved_last = true;
                (true, self.pos.board().format_move(report.chosen))
            }

            "showboard" => (true, format!("\n{}{}", self.pos, self.status())),

            "score" => {
                let score = self.pos.score();
                let line = |sizes: &[u32]| {
                    sizes.iter().map(u32::to_string).collect::<Vec<_>>().join(" ")
                };
                (
                    true,
                    format!("black: {}\nwhite: {}", line(&score[0]), line(&score[1])),
                )
            }

            "status" => (true, self.status()),

            "hint" => {
                if !self.engine_moved_last {
                    return (true, String::new());
                }
                let board = self.pos.board();
                let line: Vec<String> = self
                    .player
                    .expected_response()
                    .into_iter()
                    .map(|pt| board.format_move(Move::Place(pt)))
                    .collect();
                (true, line.join(" "))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
