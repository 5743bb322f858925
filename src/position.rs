//! Catchup game state and rules.
//!
//! This module provides the core game logic:
//! - Stone placement with incremental group tracking
//! - The variable turn length ("catchup" rule)
//! - Pass eligibility and game end detection
//! - Group-size scoring and winner determination
//!
//! Players take turns placing stones of their color. The first turn is a
//! single placement; afterwards every turn allows two placements, or three if
//! the opponent just created a group strictly larger than any group seen
//! before in the game. After the first placement of a turn the player may
//! pass to end it early. The game ends when the board is full.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::board::{Board, Move, Point, Stone};
use crate::constants::{
    CATCHUP_TURN_PLAYS, FIRST_TURN_PLAYS, INITIAL_CATCHUP_THRESHOLD, NORMAL_TURN_PLAYS,
};
use crate::union_find::UnionFind;

/// Reasons a move is rejected by [`Position::try_play`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: cell {0} is not on the board")]
    OffBoard(Point),
    #[error("illegal move: cell {0} is not empty")]
    Occupied(Point),
    #[error("illegal move: passing is not allowed now")]
    CannotPass,
    #[error("illegal move: the game is over")]
    GameOver,
}

/// Per-player group sizes, each sorted largest first. Indexed by player.
pub type Score = [Vec<u32>; 2];

/// A Catchup position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    stones: Vec<Stone>,
    groups: UnionFind,
    /// Player to move (0 = Black, 1 = White)
    player: usize,
    /// Placements left in the current turn
    remaining: u32,
    /// Whether the current player has placed a stone this turn
    may_pass: bool,
    /// Whether the next turn gets the catchup bonus placement
    trigger_catchup: bool,
    /// Largest group size seen so far in the game
    catchup_threshold: u32,
    /// Number of empty playable cells
    empty: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_SIDE)
    }
}

impl Position {
    /// Create an empty board of the given side, Black to play one stone.
    pub fn new(side: usize) -> Self {
        let board = Board::new(side);
        Self {
            board,
            stones: vec![Stone::Empty; board.len()],
            groups: UnionFind::new(board.len()),
            player: 0,
            remaining: FIRST_TURN_PLAYS,
            may_pass: false,
            trigger_catchup: false,
            catchup_threshold: INITIAL_CATCHUP_THRESHOLD,
            empty: board.cell_count(),
        }
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    /// Stone on `pt`. Cells outside the hexagon are always empty.
    #[inline]
    pub fn stone(&self, pt: Point) -> Stone {
        self.stones[pt]
    }

    /// Player to move, 0 (Black) or 1 (White).
    #[inline]
    pub fn current_player(&self) -> usize {
        self.player
    }

    /// Placements left in the current turn.
    #[inline]
    pub fn remaining_plays(&self) -> u32 {
        self.remaining
    }

    /// Whether passing is currently legal.
    #[inline]
    pub fn may_pass(&self) -> bool {
        self.may_pass && !self.is_game_over()
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.empty == 0
    }

    /// Number of empty playable cells.
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty
    }

    /// Largest group size seen so far.
    #[inline]
    pub fn catchup_threshold(&self) -> u32 {
        self.catchup_threshold
    }

    /// Whether the next turn will allow the catchup bonus placement.
    #[inline]
    pub fn catchup_pending(&self) -> bool {
        self.trigger_catchup
    }

    /// Size of the group containing the stone on `pt`.
    pub fn group_size(&self, pt: Point) -> u32 {
        let root = self.groups.root(pt);
        self.groups.size_if_root(root)
    }

    /// Apply a move for the current player.
    ///
    /// This is the only way a position changes.
    ///
    /// # Panics
    /// If the move is illegal: placing on an occupied or off-board cell,
    /// passing when not allowed, or any move after the game is over.
    pub fn play_move(&mut self, mv: Move) {
        assert!(!self.is_game_over(), "move {mv:?} played after the game is over");
        match mv {
            Move::Pass => {
                assert!(self.may_pass, "pass played when passing is not allowed");
                self.end_turn();
            }
            Move::Place(pt) => self.place(pt),
        }
    }

    /// Validate and apply a move, for callers handling untrusted input.
    pub fn try_play(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        match mv {
            Move::Pass if !self.may_pass => return Err(MoveError::CannotPass),
            Move::Place(pt) if !self.board.contains(pt) => return Err(MoveError::OffBoard(pt)),
            Move::Place(pt) if self.stones[pt] != Stone::Empty => {
                return Err(MoveError::Occupied(pt));
            }
            _ => {}
        }
        self.play_move(mv);
        Ok(())
    }

    fn place(&mut self, pt: Point) {
        assert!(self.board.contains(pt), "cell {pt} is not on the board");
        assert_eq!(self.stones[pt], Stone::Empty, "cell {pt} is not empty");
        debug_assert!(self.remaining > 0);

        let stone = Stone::of_player(self.player);
        self.stones[pt] = stone;

        let board = self.board;
        for n in board.neighbors(pt) {
            if self.stones[n] == stone {
                self.groups.union(pt, n);
            }
        }

        let joined = self.groups.group_size(pt);
        if joined > self.catchup_threshold {
            self.trigger_catchup = true;
            self.catchup_threshold = joined;
        }

        self.may_pass = true;
        self.remaining -= 1;
        self.empty -= 1;

        if self.empty == 0 {
            return;
        }
        if self.remaining == 0 {
            self.end_turn();
        }
    }

    fn end_turn(&mut self) {
        self.player = 1 - self.player;
        self.may_pass = false;
        self.remaining = if self.trigger_catchup {
            CATCHUP_TURN_PLAYS
        } else {
            NORMAL_TURN_PLAYS
        };
        self.trigger_catchup = false;
    }

    /// Empty playable cells in index order.
    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.board
            .points()
            .filter(move |&pt| self.stones[pt] == Stone::Empty)
    }

    /// All legal moves. Pass is included only if `include_pass` is set and
    /// passing is currently legal.
    pub fn legal_moves(&self, include_pass: bool) -> Vec<Move> {
        let mut moves: Vec<Move> = self.empty_points().map(Move::Place).collect();
        if include_pass && self.may_pass() {
            moves.push(Move::Pass);
        }
        moves
    }

    /// Sizes of every connected group, per player, largest first.
    pub fn score(&self) -> Score {
        let mut score: Score = [Vec::new(), Vec::new()];
        for pt in self.board.points() {
            let Some(owner) = self.stones[pt].owner() else {
                continue;
            };
            let size = self.groups.size_if_root(pt);
            if size > 0 {
                score[owner].push(size);
            }
        }
        for sizes in &mut score {
            sizes.sort_unstable_by(|a, b| b.cmp(a));
        }
        score
    }

    /// Winner of a finished game, 0 (Black) or 1 (White).
    ///
    /// # Panics
    /// If the game is not over.
    pub fn winner(&self) -> usize {
        assert!(self.is_game_over(), "winner queried before the game is over");
        let [black, white] = self.score();
        match compare_scores(&black, &white) {
            Ordering::Greater => 0,
            Ordering::Less => 1,
            // Stone counts differ on a full board (odd cell count), so the
            // multisets cannot be equal.
            Ordering::Equal => unreachable!("tied score on a full board"),
        }
    }

    /// Overwrite `other` with this position without reallocating.
    ///
    /// # Panics
    /// If the two positions have different board sizes.
    pub fn copy_into(&self, other: &mut Position) {
        assert_eq!(self.board, other.board, "board size mismatch");
        other.stones.copy_from_slice(&self.stones);
        self.groups.copy_into(&mut other.groups);
        other.player = self.player;
        other.remaining = self.remaining;
        other.may_pass = self.may_pass;
        other.trigger_catchup = self.trigger_catchup;
        other.catchup_threshold = self.catchup_threshold;
        other.empty = self.empty;
    }
}

/// Compare two largest-first lists of group sizes.
///
/// The first differing size decides; if one list runs out first, the longer
/// list wins. `Greater` means `a` wins.
pub fn compare_scores(a: &[u32], b: &[u32]) -> Ordering {
    // Slice ordering is lexicographic with a strict prefix ordered first,
    // which is exactly the rule.
    a.cmp(b)
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.board
            .render(f, 1, |pt| self.stones[pt].symbol().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(pos: &Position, s: &str) -> Move {
        pos.board().parse_move(s).unwrap()
    }

    fn count_empty(pos: &Position) -> usize {
        pos.board()
            .points()
            .filter(|&pt| pos.stone(pt) == Stone::Empty)
            .count()
    }

    #[test]
    fn test_new_position() {
        let pos = Position::new(5);
        assert_eq!(pos.current_player(), 0);
        assert_eq!(pos.remaining_plays(), 1);
        assert!(!pos.may_pass());
        assert!(!pos.is_game_over());
        assert_eq!(pos.empty_count(), 61);
        assert_eq!(pos.catchup_threshold(), 1);
        assert_eq!(pos.legal_moves(true).len(), 61);
    }

    #[test]
    fn test_first_turn_is_one_stone() {
        let mut pos = Position::new(5);
        let mv = at(&pos, "e5");
        pos.play_move(mv);
        assert_eq!(pos.stone(pos.board().to_index(4, 4)), Stone::Black);
        assert_eq!(pos.current_player(), 1);
        assert_eq!(pos.remaining_plays(), 2);
        assert!(!pos.may_pass());
    }

    #[test]
    fn test_pass_after_one_placement() {
        let mut pos = Position::new(5);
        pos.play_move(at(&pos, "a1"));
        pos.play_move(at(&pos, "e5"));
        assert!(pos.may_pass());
        assert!(pos.legal_moves(true).contains(&Move::Pass));
        assert!(!pos.legal_moves(false).contains(&Move::Pass));
        pos.play_move(Move::Pass);
        assert_eq!(pos.current_player(), 0);
        assert_eq!(pos.remaining_plays(), 2);
        assert!(!pos.may_pass());
    }

    #[test]
    #[should_panic(expected = "pass played")]
    fn test_pass_at_turn_start_panics() {
        let mut pos = Position::new(5);
        pos.play_move(Move::Pass);
    }

    #[test]
    #[should_panic(expected = "not empty")]
    fn test_double_play_panics() {
        let mut pos = Position::new(5);
        let mv = at(&pos, "c3");
        pos.play_move(mv);
        pos.play_move(mv);
    }

    #[test]
    #[should_panic(expected = "not on the board")]
    fn test_off_board_panics() {
        let mut pos = Position::new(5);
        let outside = pos.board().to_index(8, 0);
        pos.play_move(Move::Place(outside));
    }

    #[test]
    fn test_try_play_errors() {
        let mut pos = Position::new(3);
        assert_eq!(pos.try_play(Move::Pass), Err(MoveError::CannotPass));
        let outside = pos.board().to_index(4, 0);
        assert_eq!(pos.try_play(Move::Place(outside)), Err(MoveError::OffBoard(outside)));
        assert_eq!(pos.try_play(Move::Place(999)), Err(MoveError::OffBoard(999)));
        let mv = at(&pos, "a1");
        assert_eq!(pos.try_play(mv), Ok(()));
        assert_eq!(pos.try_play(mv), Err(MoveError::Occupied(0)));
    }

    #[test]
    fn test_catchup_triggered_by_new_largest_group() {
        let mut pos = Position::new(5);
        pos.play_move(at(&pos, "a1")); // Black, size 1
        pos.play_move(at(&pos, "e5")); // White
        pos.play_move(at(&pos, "f5")); // White joins: size 2 > 1
        assert_eq!(pos.catchup_threshold(), 2);
        assert_eq!(pos.current_player(), 0);
        assert_eq!(pos.remaining_plays(), 3);
    }

    #[test]
    fn test_catchup_not_triggered_by_tie() {
        let mut pos = Position::new(5);
        pos.play_move(at(&pos, "a1"));
        pos.play_move(at(&pos, "e5"));
        pos.play_move(at(&pos, "f5")); // White group of 2
        // Black: a1 + b1 makes 2 (tie), then a lone stone.
        pos.play_move(at(&pos, "b1"));
        pos.play_move(at(&pos, "h8"));
        pos.play_move(at(&pos, "c5"));
        assert_eq!(pos.catchup_threshold(), 2);
        assert_eq!(pos.current_player(), 1);
        assert_eq!(pos.remaining_plays(), 2);
    }

    #[test]
    fn test_catchup_survives_pass() {
        let mut pos = Position::new(5);
        pos.play_move(at(&pos, "a1"));
        pos.play_move(at(&pos, "e5"));
        pos.play_move(at(&pos, "f5")); // White triggers catchup
        pos.play_move(at(&pos, "b1")); // Black
        pos.play_move(at(&pos, "c1")); // Black group of 3 > 2
        pos.play_move(Move::Pass);
        assert_eq!(pos.current_player(), 1);
        assert_eq!(pos.remaining_plays(), 3);
    }

    #[test]
    fn test_group_size_tracking() {
        let mut pos = Position::new(5);
        pos.play_move(at(&pos, "c3"));
        pos.play_move(at(&pos, "g7"));
        pos.play_move(at(&pos, "a5"));
        pos.play_move(at(&pos, "d3")); // Black joins c3
        let c3 = pos.board().to_index(2, 2);
        let d3 = pos.board().to_index(3, 2);
        assert_eq!(pos.group_size(c3), 2);
        assert_eq!(pos.group_size(d3), 2);
        // White stones on g7 and a5 are not adjacent to Black.
        assert_eq!(pos.group_size(pos.board().to_index(6, 6)), 1);
    }

    #[test]
    fn test_full_game_small_board() {
        let mut pos = Position::new(2);
        let mut moves = 0;
        while !pos.is_game_over() {
            let mv = pos.legal_moves(false)[0];
            pos.play_move(mv);
            moves += 1;
            assert_eq!(pos.empty_count(), count_empty(&pos));
        }
        assert_eq!(moves, 7);
        assert!(!pos.may_pass());
        assert!(pos.legal_moves(true).is_empty());
        let score = pos.score();
        let stones: u32 = score.iter().flatten().sum();
        assert_eq!(stones, 7);
        let _ = pos.winner();
    }

    #[test]
    #[should_panic(expected = "before the game is over")]
    fn test_winner_before_end_panics() {
        Position::new(3).winner();
    }

    #[test]
    fn test_compare_scores() {
        assert_eq!(compare_scores(&[5, 3, 1], &[5, 2, 2]), Ordering::Greater);
        assert_eq!(compare_scores(&[4], &[4, 1]), Ordering::Less);
        assert_eq!(compare_scores(&[3, 3], &[4]), Ordering::Less);
        // Total stone count is not what matters.
        assert_eq!(compare_scores(&[2, 1, 1, 1], &[3]), Ordering::Less);
    }

    #[test]
    fn test_winner_by_largest_group() {
        // Side 1: a single cell, Black fills it and wins.
        let mut pos = Position::new(1);
        pos.play_move(Move::Place(0));
        assert!(pos.is_game_over());
        assert_eq!(pos.winner(), 0);
        assert_eq!(pos.score(), [vec![1], vec![]]);
    }

    #[test]
    fn test_copy_into() {
        let mut pos = Position::new(4);
        pos.play_move(at(&pos, "d4"));
        pos.play_move(at(&pos, "a1"));
        let mut copy = Position::new(4);
        pos.copy_into(&mut copy);
        assert_eq!(pos, copy);
    }

    #[test]
    fn test_display() {
        let mut pos = Position::new(2);
        pos.play_move(Move::Place(0));
        assert_eq!(pos.to_string(), " 1  X . \n 2 . . . \n 3  . . \n");
    }
}
