//! UCT tree nodes and their arena
//!
//! Nodes live in one preallocated `Vec` and are only ever appended. A node's
//! children are a contiguous block in that `Vec`, so they are referenced by a
//! `(start, len)` range rather than a list of ids.
//!
//! ## Architecture
//! - Level 2: Tree operations (expand, best_child, backpropagate)
//! - Level 3: UCB1 calculation, node accessors
//! - Level 4: Allocation

use dots_core::{Board, Player, Vertex};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Kocsis and Szepesvari's exploration constant
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Largest arena a `NodeId` can address
pub const MAX_CAPACITY: usize = u32::MAX as usize;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into the arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous block of sibling nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildRange {
    pub start: NodeId,
    pub len: u32,
}

impl ChildRange {
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        let start = self.start.0;
        (start..start + self.len).map(NodeId)
    }

    fn as_range(&self) -> std::ops::Range<usize> {
        self.start.index()..self.start.index() + self.len as usize
    }
}

/// One position in the search tree, reached by playing `vertex` as `mover`
#[derive(Clone, Debug)]
pub struct Node {
    /// Starts at 1 so UCB1 never divides by zero
    pub visits: f64,
    /// +1 per win for `mover`, -1 per loss
    pub score: f64,
    pub children: Option<ChildRange>,
    /// Set when the arena refused this node's children; it stays a leaf
    pub out_of_space: bool,
    /// `None` only for the synthetic root
    pub mover: Option<Player>,
    pub vertex: Vertex,
}

impl Node {
    pub fn new(mover: Player, vertex: Vertex) -> Self {
        Self {
            visits: 1.0,
            score: 0.0,
            children: None,
            out_of_space: false,
            mover: Some(mover),
            vertex,
        }
    }

    /// Synthetic root: no mover, no move
    pub fn root() -> Self {
        Self {
            visits: 1.0,
            score: 0.0,
            children: None,
            out_of_space: false,
            mover: None,
            vertex: 0,
        }
    }

    /// Exploration coefficient this node hands to its children
    pub fn exploration_coeff(&self) -> f64 {
        EXPLORATION * self.visits.ln()
    }

    /// UCB1 value given the parent's exploration coefficient
    pub fn ucb(&self, coeff: f64) -> f64 {
        self.score / self.visits + (coeff / self.visits).sqrt()
    }

    /// Record one simulated outcome
    pub fn update(&mut self, winner: Option<Player>) {
        self.visits += 1.0;
        match winner {
            Some(w) if Some(w) == self.mover => self.score += 1.0,
            Some(_) => self.score -= 1.0,
            None => {}
        }
    }
}

/// Outcome of trying to expand a leaf
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Children were created
    Expanded(ChildRange),
    /// The position has no free lines
    NoMoves,
    /// The arena cannot hold one child per free line
    OutOfSpace,
}

// ============================================================================
// NODE ARENA (Level 2 - Tree Operations)
// ============================================================================

/// Fixed-capacity, append-only node storage
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    capacity: usize,
}

impl NodeArena {
    /// Reserve storage for `capacity` nodes up front.
    ///
    /// Capacities above [`MAX_CAPACITY`] are clamped to it.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = clamp_capacity(capacity);
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that can still be allocated
    pub fn remaining(&self) -> usize {
        self.capacity - self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Children of a node, empty if unexpanded
    pub fn children(&self, id: NodeId) -> &[Node] {
        match self.get(id).children {
            Some(range) => &self.nodes[range.as_range()],
            None => &[],
        }
    }

    /// Drop every node. Outstanding `NodeId`s become dangling.
    pub fn rewind(&mut self) {
        self.nodes.clear();
    }

    // ========================================================================
    // Level 4: Allocation
    // ========================================================================

    /// Bump-allocate a single node.
    pub fn alloc(&mut self, node: Node) -> Option<NodeId> {
        if self.remaining() == 0 {
            return None;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Some(id)
    }

    /// Bump-allocate a contiguous block, all or nothing.
    fn alloc_block<I>(&mut self, nodes: I) -> Option<ChildRange>
    where
        I: ExactSizeIterator<Item = Node>,
    {
        let len = nodes.len();
        if len > self.remaining() {
            return None;
        }
        let start = NodeId(self.nodes.len() as u32);
        self.nodes.extend(nodes);
        Some(ChildRange {
            start,
            len: len as u32,
        })
    }

    // ========================================================================
    // Level 2: Expansion
    // ========================================================================

    /// Give `id` one child per free line of `board`, each to be played by
    /// the board's current mover.
    ///
    /// On `OutOfSpace` the node is flagged `out_of_space`.
    pub fn expand(&mut self, id: NodeId, board: &Board) -> Expansion {
        if board.free_vertices() == 0 {
            return Expansion::NoMoves;
        }

        let mover = board.current_player();
        let children = board
            .free_list()
            .iter()
            .map(|&vertex| Node::new(mover, vertex));

        match self.alloc_block(children) {
            Some(range) => {
                self.get_mut(id).children = Some(range);
                Expansion::Expanded(range)
            }
            None => {
                self.get_mut(id).out_of_space = true;
                Expansion::OutOfSpace
            }
        }
    }

    // ========================================================================
    // Level 3: Selection
    // ========================================================================

    /// Child with the highest UCB1 value; the first one wins ties.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let range = self.get(id).children?;
        let coeff = self.get(id).exploration_coeff();

        let mut ids = range.ids();
        let mut best = ids.next()?;
        let mut best_score = self.get(best).ucb(coeff);

        for child in ids {
            let score = self.get(child).ucb(coeff);
            if score > best_score {
                best_score = score;
                best = child;
            }
        }
        Some(best)
    }

    /// Child with the most visits; the first one wins ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let range = self.get(id).children?;

        let mut ids = range.ids();
        let mut best = ids.next()?;
        for child in ids {
            if self.get(child).visits > self.get(best).visits {
                best = child;
            }
        }
        Some(best)
    }

    // ========================================================================
    // Level 2: Backpropagation
    // ========================================================================

    /// Credit an outcome to every node on a root-to-leaf path.
    pub fn backpropagate(&mut self, path: &[NodeId], winner: Option<Player>) {
        for &id in path {
            self.get_mut(id).update(winner);
        }
    }
}

fn clamp_capacity(requested: usize) -> usize {
    if requested > MAX_CAPACITY {
        tracing::warn!(requested, max = MAX_CAPACITY, "arena capacity clamped");
        MAX_CAPACITY
    } else {
        requested
    }
}

// ============================================================================
// TESTS
// ============================================================================
