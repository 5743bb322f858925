//! Automated players.
//!
//! A [`Player`] is handed the live position whenever it is its turn and must
//! apply exactly one legal move to it.
//!
//! - [`RandomPlayer`] - uniform choice among legal moves, a baseline opponent
//! - [`MctsPlayer`] - time- or iteration-boxed Monte Carlo Tree Search

use std::time::{Duration, Instant};

use fastrand::Rng;
use log::{debug, info, trace};

use crate::board::{Move, Point};
use crate::config::{FinalMovePolicy, SearchConfig};
use crate::mcts::{ROOT, SearchTree};
use crate::position::Position;

/// An automated seat.
pub trait Player {
    fn name(&self) -> &str;

    /// Apply exactly one legal move (or pass) to `pos`.
    ///
    /// Only called while the game is not over.
    fn play(&mut self, pos: &mut Position);

    /// Placements this player expects the opponent to make next.
    fn expected_response(&self) -> Vec<Point> {
        Vec::new()
    }
}

/// Plays a uniformly random legal move, passing included.
pub struct RandomPlayer {
    rng: Rng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn play(&mut self, pos: &mut Position) {
        let moves = pos.legal_moves(true);
        let mv = moves[self.rng.usize(..moves.len())];
        pos.play_move(mv);
    }
}

/// Summary of one search.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub iterations: u32,
    pub elapsed: Duration,
    /// Move committed by the configured policy
    pub chosen: Move,
    /// Visits of the chosen child
    pub visits: u32,
    /// Black winrate of the chosen child
    pub winrate: f64,
}

/// MCTS player.
///
/// Each call builds a fresh tree from the current position, iterates until
/// the budget is spent, and commits one move.
pub struct MctsPlayer {
    config: SearchConfig,
    rng: Rng,
    /// Scratch position reused by every iteration
    scratch: Option<Position>,
    /// Tree of the last search, kept for hints
    last: Option<SearchTree>,
}

impl MctsPlayer {
    pub fn new(config: SearchConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Rng::with_seed(seed),
            scratch: None,
            last: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// The tree built by the last search.
    pub fn last_tree(&self) -> Option<&SearchTree> {
        self.last.as_ref()
    }

    /// Search `pos` and return the chosen move without playing it.
    ///
    /// At least one iteration always runs, so some move is found for any
    /// budget.
    ///
    /// # Panics
    /// If the game is already over.
    pub fn search(&mut self, pos: &Position) -> SearchReport {
        assert!(!pos.is_game_over(), "search started on a finished game");

        let start = Instant::now();
        let mut tree = SearchTree::new(pos.board(), &self.config);
        let mut scratch = match self.scratch.take() {
            Some(s) if s.board() == pos.board() => s,
            _ => pos.clone(),
        };

        let mut iterations = 0;
        loop {
            pos.copy_into(&mut scratch);
            tree.iterate(&mut scratch, &mut self.rng);
            iterations += 1;
            if self.config.budget.exhausted(iterations, start.elapsed()) {
                break;
            }
        }
        self.scratch = Some(scratch);
        let elapsed = start.elapsed();

        info!(
            "MCTS ran {iterations} iterations in {} ms ({} nodes)",
            elapsed.as_millis(),
            tree.len()
        );
        if log::log_enabled!(log::Level::Trace) {
            trace!("root child winrates:\n{}", tree.dump_children(pos.board()));
        }
        if log::log_enabled!(log::Level::Debug) {
            for policy in [FinalMovePolicy::Best, FinalMovePolicy::Robust, FinalMovePolicy::Worst] {
                if let Some((mv, child)) = tree.select_child(ROOT, policy) {
                    debug!(
                        "{policy:>6}: {} v={} w={} wr={:.3}",
                        pos.board().format_move(mv),
                        child.v,
                        child.w,
                        child.winrate()
                    );
                }
            }
        }

        // The first iteration always creates a visited root child.
        let (chosen, child) = tree
            .select_child(ROOT, self.config.policy)
            .expect("root has a visited child after one iteration");
        let report = SearchReport {
            iterations,
            elapsed,
            chosen,
            visits: child.v,
            winrate: child.winrate(),
        };
        self.last = Some(tree);
        report
    }
}

impl Player for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn play(&mut self, pos: &mut Position) {
        let report = self.search(pos);
        pos.play_move(report.chosen);
    }

    fn expected_response(&self) -> Vec<Point> {
        self.last
            .as_ref()
            .map(SearchTree::expected_line)
            .unwrap_or_default()
    }
}
