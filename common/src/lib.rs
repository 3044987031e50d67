//! A Minesweeper player that reasons over CNF clauses derived from hints.
//!
//! Every revealed number becomes an "exactly n of these m cells are mines"
//! constraint, encoded as clauses in a [`KnowledgeBase`]. The knowledge base
//! simplifies itself on every insertion (unit propagation, resolution against
//! committed facts, subsumption), and the [`Agent`] acts on the single-literal
//! clauses that fall out. When logic stalls the agent guesses from the
//! shortest clause.

mod agent;
mod audit;
mod clause;
mod deadlock;
mod encoding;
mod game;
mod knowledge_base;
mod matching;

pub use agent::{Agent, AgentConfig, AgentStats, Board, Move};
pub use clause::{Clause, Literal, resolve, subsumes};
pub use deadlock::{Guess, Stagnation};
pub use encoding::{encode_at_least_k, encode_at_most_k};
pub use game::{Cell, Game, GameState};
pub use knowledge_base::{Insertion, KnowledgeBase};
pub use matching::{DuplicatePolicy, MatchReport, MatchingStrategy};

/// Represents a 2D coordinate on the minesweeper board.
/// `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}
