use std::collections::VecDeque;

use crate::clause::{Clause, Literal};
use crate::knowledge_base::KnowledgeBase;

/// Sliding window of KB sizes, one entry per turn.
#[derive(Debug, Clone)]
pub struct Stagnation {
    capacity: usize,
    history: VecDeque<usize>,
}

impl Stagnation {
    pub fn new(capacity: usize) -> Self {
        Stagnation {
            capacity: capacity.max(1),
            history: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Records this turn's KB size and reports whether the last `capacity`
    /// turns all saw the same size.
    pub fn is_stuck(&mut self, kb_len: usize) -> bool {
        self.history.push_back(kb_len);
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.history.len() == self.capacity && self.history.iter().all(|&len| len == kb_len)
    }
}

impl Default for Stagnation {
    fn default() -> Self {
        Stagnation::new(5)
    }
}

/// A literal assumed true when logic alone cannot progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub literal: Literal,
    /// The active clause the literal was taken from.
    pub clause: Clause,
}

impl KnowledgeBase {
    /// Picks a safe-cell literal from the shortest active clause (two literals
    /// or more) that has one.
    ///
    /// Returns `None` when no active clause holds a negative literal; the agent
    /// then has nothing left to try.
    pub fn guess(&self) -> Option<Guess> {
        let clause = self
            .clauses()
            .filter(|c| c.len() >= 2 && c.iter().any(|lit| !lit.mine))
            .min_by_key(|c| c.len())?;
        let literal = clause.iter().copied().find(|lit| !lit.mine)?;
        Some(Guess {
            literal,
            clause: clause.clone(),
        })
    }
}
