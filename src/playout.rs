//! Monte Carlo playouts (random game simulation).
//!
//! A playout fills every remaining empty cell in random order, which is the
//! only way a Catchup game ends. Passing is never chosen: it cannot change
//! the final board, only who fills which cell.

use fastrand::Rng;

use crate::board::{Move, Point};
use crate::position::Position;

/// Outcome of a finished game from Black's point of view: 1 if Black
/// (player 0) won, 0 if White won.
#[inline]
pub fn outcome(pos: &Position) -> u32 {
    1 - pos.winner() as u32
}

/// Play random placements until the board is full.
///
/// Every move made is appended to `played` as `(player, move)` when given,
/// for AMAF bookkeeping. Returns the [`outcome`] of the finished game.
pub fn mcplayout(pos: &mut Position, rng: &mut Rng, mut played: Option<&mut Vec<(usize, Move)>>) -> u32 {
    let mut empties: Vec<Point> = pos.empty_points().collect();
    rng.shuffle(&mut empties);

    while !pos.is_game_over() {
        let pt = empties
            .pop()
            .expect("empty cells remain while the game is not over");
        let mv = Move::Place(pt);
        if let Some(played) = played.as_deref_mut() {
            played.push((pos.current_player(), mv));
        }
        pos.play_move(mv);
    }
    debug_assert!(empties.is_empty());

    outcome(pos)
}
