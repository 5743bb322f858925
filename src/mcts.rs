//! Monte Carlo Tree Search (MCTS) implementation with RAVE.
//!
//! This module implements MCTS with:
//! - Lazy expansion: each visit to a node tries one untried move, followed by
//!   a random playout, until every move has been tried once
//! - UCB1 selection among fully tried nodes, optionally blended with
//!   All-Moves-As-First (RAVE) statistics
//! - Backpropagation through the return value of the recursive descent
//!
//! Nodes live in an arena (`Vec<TreeNode>`) and refer to their children by
//! index. All win counts are from Black's (player 0) point of view.

use std::fmt::Write as _;

use fastrand::Rng;

use crate::board::{Board, Move, Point};
use crate::config::{FinalMovePolicy, SearchConfig};
use crate::constants::{HINT_MIN_VISITS, TIE_EPSILON};
use crate::playout::{mcplayout, outcome};
use crate::position::Position;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The root is always the first node allocated.
pub const ROOT: NodeId = 0;

/// A node in the MCTS search tree.
#[derive(Clone, Debug, Default)]
pub struct TreeNode {
    /// Player to move at this node
    pub player: usize,
    /// Legal moves, fixed on the first visit
    pub actions: Vec<Move>,
    /// Child node per action, created when the action is first tried
    pub children: Vec<Option<NodeId>>,
    /// Indices into `actions` that were never tried
    untried: Vec<usize>,
    expanded: bool,
    /// Number of visits
    pub v: u32,
    /// Number of Black wins (winrate = w/v)
    pub w: u32,
    /// AMAF (All Moves As First) visits
    pub av: u32,
    /// AMAF Black wins
    pub aw: u32,
}

impl TreeNode {
    pub fn new(player: usize) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    /// Capture the legal moves of `pos`. Called on the first visit.
    fn expand(&mut self, pos: &Position) {
        debug_assert!(!self.expanded);
        self.player = pos.current_player();
        self.actions = pos.legal_moves(true);
        self.children = vec![None; self.actions.len()];
        self.untried = (0..self.actions.len()).collect();
        self.expanded = true;
    }

    #[inline]
    fn update(&mut self, outcome: u32) {
        self.v += 1;
        self.w += outcome;
    }

    /// Fraction of visits won by Black.
    ///
    /// # Panics
    /// If the node was never visited.
    #[inline]
    pub fn winrate(&self) -> f64 {
        assert!(self.v > 0, "winrate of an unvisited node");
        self.w as f64 / self.v as f64
    }

    /// Whether any move was tried from this node.
    pub fn any_expanded(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    /// Whether every legal move has been tried at least once.
    pub fn fully_expanded(&self) -> bool {
        self.expanded && self.untried.is_empty()
    }
}

/// Convert Black's win probability to the point of view of `player`.
#[inline]
pub fn subjective(mean: f64, player: usize) -> f64 {
    if player == 0 { mean } else { 1.0 - mean }
}

/// UCB1 criterion. Unvisited children are infinitely urgent.
#[inline]
pub fn ucb1(subjective_mean: f64, parent_visits: u32, child_visits: u32, exploration: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }
    let parent = parent_visits.max(1) as f64;
    subjective_mean + (exploration * parent.ln() / child_visits as f64).sqrt()
}

/// Weight of the RAVE estimate, `sqrt(k / (3N + k))`.
#[inline]
pub fn rave_beta(parent_visits: u32, k: f64) -> f64 {
    (k / (3.0 * parent_visits as f64 + k)).sqrt()
}

#[inline]
fn is_tie(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= TIE_EPSILON
}

/// Nodes offering each `(player, move)` along the current iteration's path.
///
/// Holds non-owning node indices; cleared at the start of every iteration.
#[derive(Clone, Debug)]
pub struct RaveTable {
    stride: usize,
    nodes: Vec<Vec<NodeId>>,
    credited: Vec<bool>,
}

impl RaveTable {
    pub fn new(board_len: usize) -> Self {
        let stride = board_len + 1;
        Self {
            stride,
            nodes: vec![Vec::new(); 2 * stride],
            credited: vec![false; 2 * stride],
        }
    }

    #[inline]
    fn slot(&self, player: usize, mv: Move) -> usize {
        player * self.stride + mv.slot(self.stride - 1)
    }

    pub fn clear(&mut self) {
        for list in &mut self.nodes {
            list.clear();
        }
        self.credited.fill(false);
    }

    /// Record that `node` is reached when `player` plays `mv`.
    pub fn register(&mut self, player: usize, mv: Move, node: NodeId) {
        let slot = self.slot(player, mv);
        self.nodes[slot].push(node);
    }

    pub fn lookup(&self, player: usize, mv: Move) -> &[NodeId] {
        &self.nodes[self.slot(player, mv)]
    }

    /// Like [`RaveTable::lookup`], but empty after the first call for the
    /// same key in this iteration.
    fn take_once(&mut self, player: usize, mv: Move) -> &[NodeId] {
        let slot = self.slot(player, mv);
        if std::mem::replace(&mut self.credited[slot], true) {
            &[]
        } else {
            &self.nodes[slot]
        }
    }
}

#[derive(Clone, Debug)]
struct Rave {
    k: f64,
    table: RaveTable,
}

/// An MCTS tree rooted at the position the search started from.
#[derive(Clone, Debug)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    exploration: f64,
    rave: Option<Rave>,
    /// Moves made by the current iteration's playout, as `(player, move)`
    played: Vec<(usize, Move)>,
}

impl SearchTree {
    /// Create an empty tree for positions on `board`.
    pub fn new(board: Board, config: &SearchConfig) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(TreeNode::default());
        Self {
            nodes,
            exploration: config.exploration,
            rave: config.rave.map(|k| Rave {
                k,
                table: RaveTable::new(board.len()),
            }),
            played: Vec::with_capacity(board.len()),
        }
    }

    #[inline]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rave_enabled(&self) -> bool {
        self.rave.is_some()
    }

    /// The child reached from `id` by `mv`, if it was ever tried.
    pub fn child(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        let node = &self.nodes[id];
        let a = node.actions.iter().position(|&m| m == mv)?;
        node.children[a]
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Run one select, expand, simulate, backpropagate iteration.
    ///
    /// `pos` must be a scratch copy of the root position; it is left at the
    /// end of the simulated game. Returns the outcome (1 if Black won).
    pub fn iterate(&mut self, pos: &mut Position, rng: &mut Rng) -> u32 {
        self.played.clear();
        if let Some(rave) = self.rave.as_mut() {
            rave.table.clear();
        }

        let result = self.select(ROOT, pos, rng);
        self.credit_rave(result);
        result
    }

    /// Descend from `id`, trying an untried move if there is one, otherwise
    /// following the most urgent child. The outcome is added to every node
    /// on the way back up.
    fn select(&mut self, id: NodeId, pos: &mut Position, rng: &mut Rng) -> u32 {
        if !self.nodes[id].expanded {
            self.nodes[id].expand(pos);
        }
        self.register_children(id);

        let result = if !self.nodes[id].untried.is_empty() {
            let node = &mut self.nodes[id];
            let k = rng.usize(..node.untried.len());
            let a = node.untried.swap_remove(k);
            let mv = node.actions[a];
            let player = node.player;

            pos.play_move(mv);

            let child = self.alloc(TreeNode::new(pos.current_player()));
            self.nodes[id].children[a] = Some(child);
            if let Some(rave) = self.rave.as_mut() {
                rave.table.register(player, mv, child);
            }

            let record = self.rave.is_some().then_some(&mut self.played);
            let result = mcplayout(pos, rng, record);
            self.nodes[child].update(result);
            result
        } else if self.nodes[id].actions.is_empty() {
            assert!(pos.is_game_over(), "node without moves in an unfinished game");
            outcome(pos)
        } else {
            let a = self.most_urgent(id, rng);
            let node = &self.nodes[id];
            let mv = node.actions[a];
            let child = node.children[a].expect("fully expanded node has a child for every move");

            pos.play_move(mv);
            self.select(child, pos, rng)
        };

        self.nodes[id].update(result);
        result
    }

    fn register_children(&mut self, id: NodeId) {
        let Some(rave) = self.rave.as_mut() else {
            return;
        };
        let node = &self.nodes[id];
        for (&mv, child) in node.actions.iter().zip(&node.children) {
            if let Some(child) = *child {
                rave.table.register(node.player, mv, child);
            }
        }
    }

    /// Credit the outcome to the AMAF statistics of every node offering a
    /// move that the same player made during this iteration's playout.
    /// Moves chosen inside the tree are not credited.
    fn credit_rave(&mut self, result: u32) {
        let Some(rave) = self.rave.as_mut() else {
            return;
        };
        for &(player, mv) in &self.played {
            for &id in rave.table.take_once(player, mv) {
                let node = &mut self.nodes[id];
                node.av += 1;
                node.aw += result;
            }
        }
    }

    /// Selection criterion of `child` seen from `parent`'s player to move.
    fn urgency(&self, parent: &TreeNode, child: &TreeNode) -> f64 {
        if child.v == 0 {
            return f64::INFINITY;
        }
        let mean = subjective(child.winrate(), parent.player);
        let ucb = ucb1(mean, parent.v, child.v, self.exploration);
        match &self.rave {
            Some(rave) if child.av > 0 => {
                let amaf = subjective(child.aw as f64 / child.av as f64, parent.player);
                let beta = rave_beta(parent.v, rave.k);
                beta * amaf + (1.0 - beta) * ucb
            }
            _ => ucb,
        }
    }

    /// Index of the action to follow from `id`.
    ///
    /// Untried actions are infinitely urgent. Actions whose criteria are tied
    /// within [`TIE_EPSILON`] are chosen uniformly by reservoir sampling.
    fn most_urgent(&self, id: NodeId, rng: &mut Rng) -> usize {
        let node = &self.nodes[id];
        assert!(!node.children.is_empty(), "selecting from a node without moves");

        let mut best = f64::NEG_INFINITY;
        let mut chosen = 0;
        let mut ties = 0u32;
        for (a, child) in node.children.iter().enumerate() {
            let u = match child {
                Some(c) => self.urgency(node, &self.nodes[*c]),
                None => f64::INFINITY,
            };
            if is_tie(u, best) {
                ties += 1;
                if rng.u32(..ties) == 0 {
                    chosen = a;
                }
            } else if u > best {
                best = u;
                chosen = a;
                ties = 1;
            }
        }
        chosen
    }

    /// Tried moves from `id` with their child nodes.
    fn visited_children(&self, id: NodeId) -> impl Iterator<Item = (Move, &TreeNode)> + '_ {
        let node = &self.nodes[id];
        node.actions
            .iter()
            .zip(&node.children)
            .filter_map(|(&mv, child)| child.map(|c| (mv, &self.nodes[c])))
            .filter(|(_, child)| child.v > 0)
    }

    /// Move from `id` with the highest mean for the player to move, or the
    /// lowest when `invert` is set.
    fn extreme_move(&self, id: NodeId, invert: bool) -> Option<Move> {
        let player = self.nodes[id].player;
        let mut best: Option<(Move, f64)> = None;
        for (mv, child) in self.visited_children(id) {
            let mut mean = subjective(child.winrate(), player);
            if invert {
                mean = 1.0 - mean;
            }
            if best.is_none_or(|(_, b)| mean > b) {
                best = Some((mv, mean));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Move with the highest mean for the player to move at `id`.
    pub fn best_move(&self, id: NodeId) -> Option<Move> {
        self.extreme_move(id, false)
    }

    /// Most visited move from `id`.
    pub fn robust_move(&self, id: NodeId) -> Option<Move> {
        let mut best: Option<(Move, u32)> = None;
        for (mv, child) in self.visited_children(id) {
            if best.is_none_or(|(_, v)| child.v > v) {
                best = Some((mv, child.v));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Move with the lowest mean for the player to move at `id`.
    pub fn worst_move(&self, id: NodeId) -> Option<Move> {
        self.extreme_move(id, true)
    }

    /// Move chosen from `id` by `policy`; `None` if no child was visited.
    pub fn select_move(&self, id: NodeId, policy: FinalMovePolicy) -> Option<Move> {
        match policy {
            FinalMovePolicy::Best => self.best_move(id),
            FinalMovePolicy::Robust => self.robust_move(id),
            FinalMovePolicy::Worst => self.worst_move(id),
        }
    }

    /// Like [`SearchTree::select_move`], also returning the child node.
    pub fn select_child(&self, id: NodeId, policy: FinalMovePolicy) -> Option<(Move, &TreeNode)> {
        let mv = self.select_move(id, policy)?;
        let child = self.child(id, mv)?;
        Some((mv, &self.nodes[child]))
    }

    /// Placements the tree expects the opponent to make next.
    ///
    /// Starts at the best-mean root child and keeps following best-mean
    /// children while the player to move there stays to move and nodes have
    /// enough visits.
    pub fn expected_line(&self) -> Vec<Point> {
        let mut line = Vec::new();
        let Some(mut id) = self.best_move(ROOT).and_then(|mv| self.child(ROOT, mv)) else {
            return line;
        };
        let player = self.nodes[id].player;

        loop {
            let node = &self.nodes[id];
            if node.player != player || !node.any_expanded() || node.v < HINT_MIN_VISITS {
                break;
            }
            let Some(mv) = self.best_move(id) else {
                break;
            };
            let Some(next) = self.child(id, mv) else {
                break;
            };
            if let Move::Place(pt) = mv {
                line.push(pt);
            }
            id = next;
        }
        line
    }

    /// Hex grid of the root children's Black winrates, for debugging.
    pub fn dump_children(&self, board: Board) -> String {
        let root = self.root();
        let mean_of = |mv: Move| {
            self.child(ROOT, mv)
                .map(|c| &self.nodes[c])
                .filter(|c| c.v > 0)
                .map(|c| c.winrate())
        };

        let mut out = String::new();
        let _ = board.render(&mut out, 5, |pt| match mean_of(Move::Place(pt)) {
            Some(m) => format!("{m:5.2}"),
            None => "  -  ".into(),
        });
        if root.actions.contains(&Move::Pass) {
            let _ = match mean_of(Move::Pass) {
                Some(m) => writeln!(out, "pass {m:.2}"),
                None => writeln!(out, "pass -"),
            };
        }
        out
    }
}
