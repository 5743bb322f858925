//! A game between two seats, each human or automated.
//!
//! Automated seats move as soon as it is their turn: when the game is
//! created and after every human move. Human moves go through
//! [`Game::user_play`], which rejects moves while an automated seat is to
//! move.

use thiserror::Error;

use crate::board::{Move, Point};
use crate::player::Player;
use crate::position::{MoveError, Position};

/// Who controls a color.
pub enum Seat {
    Human,
    Ai(Box<dyn Player>),
}

impl Seat {
    pub fn is_human(&self) -> bool {
        matches!(self, Seat::Human)
    }

    pub fn name(&self) -> &str {
        match self {
            Seat::Human => "human",
            Seat::Ai(player) => player.name(),
        }
    }
}

/// Errors from a human move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("it is not a human player's turn")]
    NotYourTurn,
    #[error(transparent)]
    Illegal(#[from] MoveError),
}

/// A position plus the two seats playing it.
pub struct Game {
    pos: Position,
    seats: [Seat; 2],
    /// Seat of the last automated move, for hints
    last_ai: Option<usize>,
}

impl Game {
    /// Start a game on a board of side `side`. If Black is automated it
    /// moves immediately.
    pub fn new(side: usize, seats: [Seat; 2]) -> Self {
        let mut game = Self {
            pos: Position::new(side),
            seats,
            last_ai: None,
        };
        game.run_automated();
        game
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn seat(&self, player: usize) -> &Seat {
        &self.seats[player]
    }

    /// Play a human move for the player to move, then let automated seats
    /// respond.
    pub fn user_play(&mut self, mv: Move) -> Result<(), PlayError> {
        if !self.seats[self.pos.current_player()].is_human() {
            return Err(PlayError::NotYourTurn);
        }
        self.pos.try_play(mv)?;
        self.run_automated();
        Ok(())
    }

    /// Let automated seats move until a human is to move or the game ends.
    fn run_automated(&mut self) {
        while !self.pos.is_game_over() {
            let player = self.pos.current_player();
            let Seat::Ai(ai) = &mut self.seats[player] else {
                break;
            };
            let before = self.pos.empty_count();
            ai.play(&mut self.pos);
            debug_assert!(
                self.pos.empty_count() < before || self.pos.current_player() != player,
                "{} did not move",
                ai.name()
            );
            self.last_ai = Some(player);
        }
    }

    /// Placements the last automated seat expects next.
    pub fn hint(&self) -> Vec<Point> {
        match self.last_ai.map(|p| &self.seats[p]) {
            Some(Seat::Ai(ai)) => ai.expected_response(),
            _ => Vec::new(),
        }
    }

    /// Winner of a finished game.
    pub fn winner(&self) -> Option<usize> {
        self.pos.is_game_over().then(|| self.pos.winner())
    }
}
