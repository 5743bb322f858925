//! Constants for board geometry, turn rules, and MCTS parameters.
//!
//! The board side is chosen at runtime (see [`crate::board::Board`]); the
//! values here are the defaults and the fixed rule constants.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board side (number of cells along each edge of the hexagon).
pub const DEFAULT_SIDE: usize = 5;

/// Largest supported side. Keeps the board width within the 26 column letters.
pub const MAX_SIDE: usize = 13;

/// Offsets `(dx, dy)` to the six neighbors of a hex cell.
/// Order: East, North, North-West, West, South, South-East
pub const HEX_DIRECTIONS: [(isize, isize); 6] = [
    (1, 0),   // East
    (0, -1),  // North
    (-1, -1), // North-West
    (-1, 0),  // West
    (0, 1),   // South
    (1, 1),   // South-East
];

// =============================================================================
// Turn Rules
// =============================================================================

/// Placements allowed on the very first turn of the game.
pub const FIRST_TURN_PLAYS: u32 = 1;

/// Placements allowed on a normal turn.
pub const NORMAL_TURN_PLAYS: u32 = 2;

/// Placements allowed on a turn that follows a new largest group.
pub const CATCHUP_TURN_PLAYS: u32 = 3;

/// Initial value of the largest-group threshold (a single stone).
pub const INITIAL_CATCHUP_THRESHOLD: u32 = 1;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default thinking time per move, in milliseconds.
pub const SEARCH_TIME_MS: u64 = 2000;

/// UCB1 exploration constant (the `2` in `sqrt(2 ln N / n)`).
pub const EXPLORATION: f64 = 2.0;

/// RAVE equivalence parameter `k` in `beta = sqrt(k / (3N + k))`.
pub const RAVE_K: f64 = 1000.0;

/// Criteria closer than this are treated as tied.
pub const TIE_EPSILON: f64 = 1e-8;

/// Minimum visits before a node is trusted for the expected-response hint.
pub const HINT_MIN_VISITS: u32 = 8;
