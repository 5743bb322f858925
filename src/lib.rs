//! Catchup-Rust: a Catchup engine driven by Monte Carlo Tree Search.
//!
//! Catchup is played on a hexagonal board. Players place one stone on the
//! opening turn, two on every later turn, and three right after the opponent
//! grows a group larger than any seen before. When the board is full the
//! player with the larger groups (compared largest first) wins.
//!
//! ## Modules
//!
//! - [`board`] - Hex geometry, stones, moves, text coordinates
//! - [`union_find`] - Group tracking with union by size
//! - [`position`] - Game state and the turn rules
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Search tree with UCB1 and RAVE
//! - [`config`] - Search budget and final move policy
//! - [`player`] - Random and MCTS players
//! - [`game`] - Human and automated seats
//! - [`console`] - Text protocol front end
//! - [`constants`] - Rule and engine parameters
//!
//! ## Example
//!
//! ```
//! use catchup_rust::config::SearchConfig;
//! use catchup_rust::player::MctsPlayer;
//! use catchup_rust::position::Position;
//!
//! // Create a new game and play the opening stone
//! let mut pos = Position::new(5);
//! let mv = pos.board().parse_move("e5").unwrap();
//! pos.play_move(mv);
//!
//! // Run MCTS to find White's first placement
//! let mut player = MctsPlayer::new(SearchConfig::with_iterations(100), 42);
//! let report = player.search(&pos);
//! println!("Best move: {}", pos.board().format_move(report.chosen));
//! ```

pub mod board;
pub mod config;
pub mod console;
pub mod constants;
pub mod game;
pub mod mcts;
pub mod player;
pub mod playout;
pub mod position;
pub mod union_find;
