//! Integration tests for catchup-rust
//!
//! Games are set up from text coordinates the same way the console does.

use catchup_rust::board::{Move, Stone};
use catchup_rust::config::SearchConfig;
use catchup_rust::game::{Game, PlayError, Seat};
use catchup_rust::mcts::{ROOT, SearchTree};
use catchup_rust::player::{MctsPlayer, Player, RandomPlayer};
use catchup_rust::playout::mcplayout;
use catchup_rust::position::{MoveError, Position, compare_scores};

use fastrand::Rng;
use std::cmp::Ordering;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Apply a sequence of moves in text form to a fresh board of side `side`.
fn setup_position(side: usize, moves: &[&str]) -> Position {
    let mut pos = Position::new(side);
    for mv in moves {
        let mv = pos.board().parse_move(mv).unwrap();
        pos.play_move(mv);
    }
    pos
}

fn random_game(side: usize, seed: u64) -> Position {
    let mut pos = Position::new(side);
    let mut player = RandomPlayer::new(seed);
    while !pos.is_game_over() {
        player.play(&mut pos);
    }
    pos
}

// =============================================================================
// Turn structure
// =============================================================================

#[test]
fn test_empty_position() {
    let pos = Position::new(5);
    assert_eq!(pos.empty_count(), 61);
    assert_eq!(pos.current_player(), 0);
    assert_eq!(pos.remaining_plays(), 1);
    assert!(!pos.may_pass());
    assert!(!pos.is_game_over());
    assert_eq!(pos.legal_moves(true).len(), 61);
}

#[test]
fn test_opening_turns() {
    // Black's single opening stone hands the move to White.
    let pos = setup_position(5, &["e5"]);
    assert_eq!(pos.current_player(), 1);
    assert_eq!(pos.remaining_plays(), 2);
    assert!(!pos.may_pass());

    // White may pass after its first placement.
    let pos = setup_position(5, &["e5", "a1"]);
    assert_eq!(pos.current_player(), 1);
    assert_eq!(pos.remaining_plays(), 1);
    assert!(pos.may_pass());
    assert!(pos.legal_moves(true).contains(&Move::Pass));

    let pos = setup_position(5, &["e5", "a1", "pass"]);
    assert_eq!(pos.current_player(), 0);
    assert_eq!(pos.remaining_plays(), 2);
    assert_eq!(pos.empty_count(), 59);
}

#[test]
fn test_catchup_gives_three_plays() {
    // White opens far from Black's row, then Black grows a group of three.
    let pos = setup_position(5, &["a1", "e5", "i9", "b1", "c1"]);
    assert_eq!(pos.current_player(), 1);
    assert_eq!(pos.remaining_plays(), 3);
    assert_eq!(pos.catchup_threshold(), 3);

    let b1 = pos.board().parse_move("b1").unwrap();
    let Move::Place(b1) = b1 else { unreachable!() };
    assert_eq!(pos.group_size(b1), 3);
}

#[test]
fn test_equal_group_does_not_trigger_catchup() {
    // Black's pair earns White three plays.
    let pos = setup_position(5, &["a1", "e5", "i9", "b1", "c3"]);
    assert_eq!(pos.current_player(), 1);
    assert_eq!(pos.remaining_plays(), 3);

    // White answers with two pairs, neither larger than Black's.
    let pos = setup_position(5, &["a1", "e5", "i9", "b1", "c3", "e6", "h9", "pass"]);
    assert_eq!(pos.catchup_threshold(), 2);
    assert_eq!(pos.current_player(), 0);
    assert_eq!(pos.remaining_plays(), 2);
}

#[test]
fn test_illegal_moves_are_reported() {
    let mut pos = setup_position(5, &["e5"]);
    let e5 = pos.board().parse_move("e5").unwrap();
    assert!(matches!(pos.try_play(e5), Err(MoveError::Occupied(_))));
    assert_eq!(pos.try_play(Move::Pass), Err(MoveError::CannotPass));
    assert!(matches!(pos.try_play(Move::Place(8)), Err(MoveError::OffBoard(8))));
    assert_eq!(pos.empty_count(), 60);
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_compare_scores_examples() {
    assert_eq!(compare_scores(&[5, 3, 1], &[5, 2, 2]), Ordering::Greater);
    assert_eq!(compare_scores(&[4], &[4, 1]), Ordering::Less);
    assert_eq!(compare_scores(&[2, 2], &[2, 2]), Ordering::Equal);
}

#[test]
fn test_random_games_end_full() {
    for seed in 0..20 {
        let pos = random_game(5, seed);
        assert_eq!(pos.empty_count(), 0);
        let [black, white] = pos.score();
        let stones: u32 = black.iter().chain(&white).sum();
        assert_eq!(stones, 61);
        let winner = pos.winner();
        let expected = if compare_scores(&black, &white) == Ordering::Greater { 0 } else { 1 };
        assert_eq!(winner, expected, "seed {seed}");
    }
}

#[test]
fn test_empty_count_matches_board() {
    let mut pos = Position::new(4);
    let mut rng = Rng::with_seed(3);
    while !pos.is_game_over() {
        let board = pos.board();
        let empties = board.points().filter(|&pt| pos.stone(pt) == Stone::Empty).count();
        assert_eq!(pos.empty_count(), empties);
        let moves = pos.legal_moves(true);
        pos.play_move(moves[rng.usize(..moves.len())]);
    }
    assert_eq!(pos.empty_count(), 0);
}

#[test]
fn test_playout_leaves_source_untouched() {
    let pos = setup_position(5, &["e5", "a1", "b1"]);
    let mut scratch = Position::new(5);
    pos.copy_into(&mut scratch);
    assert_eq!(scratch, pos);

    let mut rng = Rng::with_seed(5);
    mcplayout(&mut scratch, &mut rng, None);
    assert!(scratch.is_game_over());
    assert_eq!(pos.empty_count(), 58);

    // The scratch can be reset for another playout.
    pos.copy_into(&mut scratch);
    assert_eq!(scratch, pos);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_seeded_search_is_reproducible() {
    let pos = setup_position(4, &["d4"]);
    let config = SearchConfig::with_iterations(300);
    let a = MctsPlayer::new(config.clone(), 99).search(&pos);
    let b = MctsPlayer::new(config, 99).search(&pos);
    assert_eq!(a.chosen, b.chosen);
    assert_eq!(a.visits, b.visits);
}

#[test]
fn test_search_tree_counts_iterations() {
    let pos = Position::new(3);
    let mut tree = SearchTree::new(pos.board(), &SearchConfig::default());
    let mut scratch = pos.clone();
    let mut rng = Rng::with_seed(1);
    for _ in 0..100 {
        pos.copy_into(&mut scratch);
        tree.iterate(&mut scratch, &mut rng);
    }
    assert_eq!(tree.root().v, 100);
    assert!(tree.robust_move(ROOT).is_some());
}

#[test]
fn test_search_finds_only_move() {
    // One cell left: the search must take it.
    let mut pos = Position::new(2);
    let cells: Vec<_> = pos.empty_points().collect();
    for &pt in &cells[..6] {
        pos.play_move(Move::Place(pt));
    }
    if pos.may_pass() {
        pos.play_move(Move::Pass);
    }
    assert_eq!(pos.empty_count(), 1);
    assert!(!pos.may_pass());
    let report = MctsPlayer::new(SearchConfig::with_iterations(10), 1).search(&pos);
    assert_eq!(report.chosen, Move::Place(cells[6]));
}

#[test]
fn test_mcts_beats_random_on_small_board() {
    let mut wins = 0;
    for seed in 0..8 {
        let game = Game::new(
            3,
            [
                Seat::Ai(Box::new(MctsPlayer::new(SearchConfig::with_iterations(400), seed))),
                Seat::Ai(Box::new(RandomPlayer::new(seed + 100))),
            ],
        );
        if game.winner() == Some(0) {
            wins += 1;
        }
    }
    assert!(wins >= 5, "mcts won only {wins} of 8");
}

// =============================================================================
// Seats
// =============================================================================

#[test]
fn test_human_vs_ai_game() {
    let ai = MctsPlayer::new(SearchConfig::with_iterations(50), 2);
    let mut game = Game::new(3, [Seat::Human, Seat::Ai(Box::new(ai))]);
    let mut rng = Rng::with_seed(8);
    while !game.position().is_game_over() {
        assert_eq!(game.position().current_player(), 0);
        let moves = game.position().legal_moves(false);
        game.user_play(moves[rng.usize(..moves.len())]).unwrap();
    }
    assert!(game.winner().is_some());
    assert!(matches!(
        game.user_play(Move::Pass),
        Err(PlayError::Illegal(MoveError::GameOver)) | Err(PlayError::NotYourTurn)
    ));
}
