use anyhow::Context;
use log::{debug, info};

use crate::Point;
use crate::clause::{Clause, Literal};
use crate::deadlock::Stagnation;
use crate::knowledge_base::KnowledgeBase;
use crate::matching::{DuplicatePolicy, MatchingStrategy};

/// The board the agent plays on. The agent only ever sees it through these
/// queries.
pub trait Board {
    /// Cells known to be safe before play begins.
    fn initial_safe_cells(&self) -> Vec<Point>;

    /// Reveals a cell. Must be a no-op on cells already revealed or marked.
    fn mark_safe(&mut self, at: Point);

    /// Flags a cell as a mine. Must be a no-op on cells already revealed or marked.
    fn mark_mine(&mut self, at: Point);

    /// The neighbors of `at` that are neither revealed nor marked, and the
    /// number of mines among them.
    fn unmarked_neighbors_and_mine_count(&self, at: Point) -> (Vec<Point>, usize);
}

/// Tuning knobs of the decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Number of turns with an unchanged KB size before the agent guesses.
    pub stagnation_window: usize,
    pub matching: MatchingStrategy,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            stagnation_window: 5,
            matching: MatchingStrategy::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// The result of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// A cell proven safe was revealed.
    Revealed(Point),
    /// A cell proven to hold a mine was flagged.
    Flagged(Point),
    /// A cell was assumed safe and revealed.
    Guessed(Point),
    /// No board action; the knowledge base was refined.
    Reasoned,
    /// No proven fact and no guess available. The agent cannot proceed.
    Stuck,
}

impl Move {
    /// The cell acted on this turn, if any.
    pub fn cell(&self) -> Option<Point> {
        match *self {
            Move::Revealed(at) | Move::Flagged(at) | Move::Guessed(at) => Some(at),
            Move::Reasoned | Move::Stuck => None,
        }
    }
}

/// Counters over the turns played so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentStats {
    pub revealed: usize,
    pub flagged: usize,
    pub guessed: usize,
    pub reasoned: usize,
}

/// A Minesweeper player that decides every move from its CNF knowledge base.
pub struct Agent<B: Board> {
    board: B,
    knowledge: KnowledgeBase,
    stagnation: Stagnation,
    config: AgentConfig,
    stats: AgentStats,
}

impl<B: Board> Agent<B> {
    /// Creates an agent and seeds its knowledge with the board's initial safe cells.
    pub fn new(board: B, config: AgentConfig) -> Self {
        let mut knowledge = KnowledgeBase::new();
        for cell in board.initial_safe_cells() {
            knowledge.insert(Clause::unit(Literal::safe(cell)));
        }
        debug!("Agent starts with {} known safe cells", knowledge.len());

        Agent {
            board,
            knowledge,
            stagnation: Stagnation::new(config.stagnation_window),
            config,
            stats: AgentStats::default(),
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    /// Plays one turn.
    ///
    /// 1. Stuck for a full window with no unit clause: guess a safe cell.
    /// 2. A unit clause is available: act on it.
    /// 3. Otherwise: run a matching pass without touching the board.
    pub fn step(&mut self) -> anyhow::Result<Move> {
        let has_unit = self.knowledge.unit_clause().is_some();

        // --- 1. Deadlock: guess ---
        if self.stagnation.is_stuck(self.knowledge.len()) && !has_unit {
            let Some(guess) = self.knowledge.guess() else {
                info!("No fact and no guess available, agent is stuck");
                return Ok(Move::Stuck);
            };
            let cell = guess.literal.cell;
            info!("Guessing ({}, {}) is safe from {}", cell.x, cell.y, guess.clause);

            self.knowledge.remove(&guess.clause);
            self.reveal(cell)?;
            self.knowledge.commit(guess.literal);
            self.stats.guessed += 1;
            return Ok(Move::Guessed(cell));
        }

        // --- 2. Act on a known fact ---
        if let Some(literal) = self.knowledge.pop_unit() {
            let cell = literal.cell;
            let action = if literal.mine {
                self.board.mark_mine(cell);
                self.stats.flagged += 1;
                Move::Flagged(cell)
            } else {
                self.reveal(cell)?;
                self.stats.revealed += 1;
                Move::Revealed(cell)
            };
            self.knowledge.commit(literal);
            debug!("{:?}; KB holds {} clauses", action, self.knowledge.len());
            return Ok(action);
        }

        // --- 3. Reasoning-only turn ---
        self.knowledge
            .run_matching(self.config.matching, self.config.duplicate_policy);
        self.stats.reasoned += 1;
        Ok(Move::Reasoned)
    }

    /// Reveals a cell and feeds the resulting hint to the knowledge base.
    fn reveal(&mut self, cell: Point) -> anyhow::Result<()> {
        self.board.mark_safe(cell);
        let (neighbors, mines) = self.board.unmarked_neighbors_and_mine_count(cell);
        self.knowledge
            .generate(&neighbors, mines)
            .with_context(|| format!("hint at ({}, {})", cell.x, cell.y))
    }
}
