use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use crate::clause::{Clause, resolve, subsumes};
use crate::knowledge_base::KnowledgeBase;

/// Which pairwise matching pass runs on a reasoning-only turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingStrategy {
    /// Committed facts against every active clause.
    #[default]
    AgainstCommitted,
    /// Active clause pairs where both sides have at most two literals.
    WithinKnowledgeBase,
}

/// What the against-committed pass does when an active clause equals a
/// committed fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Drop the duplicate and keep scanning the remaining pairs.
    #[default]
    FinishPass,
    /// Drop the duplicate and end the pass immediately, discarding whatever
    /// the scan had collected so far.
    EarlyExit,
}

/// Summary of one matching pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchReport {
    /// Active clauses dropped as duplicates or subsumed.
    pub removed: usize,
    /// Resolvents handed to [`KnowledgeBase::insert`].
    pub derived: usize,
}

impl KnowledgeBase {
    /// Runs the configured matching pass.
    pub fn run_matching(
        &mut self,
        strategy: MatchingStrategy,
        policy: DuplicatePolicy,
    ) -> MatchReport {
        match strategy {
            MatchingStrategy::AgainstCommitted => self.match_against_committed(policy),
            MatchingStrategy::WithinKnowledgeBase => self.match_within(),
        }
    }

    /// Matches every committed fact against every active clause.
    ///
    /// The scan runs over snapshots of both sets. Removals are applied once
    /// the scan is over and the collected resolvents are then inserted, each
    /// going through the usual simplification chain.
    pub fn match_against_committed(&mut self, policy: DuplicatePolicy) -> MatchReport {
        let facts: Vec<Clause> = self.committed.iter().copied().map(Clause::unit).collect();
        let active: Vec<Clause> = self.active.iter().cloned().collect();

        let mut to_remove = BTreeSet::new();
        let mut to_add = BTreeSet::new();

        for fact in &facts {
            for clause in &active {
                if clause == fact {
                    if policy == DuplicatePolicy::EarlyExit {
                        self.active.remove(clause);
                        debug!("Matching stopped at committed duplicate {}", clause);
                        return MatchReport {
                            removed: 1,
                            derived: 0,
                        };
                    }
                    to_remove.insert(clause.clone());
                    continue;
                }

                match subsumes(fact, clause) {
                    Some(stricter) if stricter == fact => {
                        to_remove.insert(clause.clone());
                    }
                    Some(_) => {}
                    None => {
                        if let Some(resolvent) = resolve(fact, clause) {
                            to_add.insert(resolvent);
                        }
                    }
                }
            }
        }

        self.apply_matches(to_remove, to_add)
    }

    /// Matches pairs of short active clauses against each other.
    ///
    /// Only clauses with at most two literals take part, which keeps the number
    /// of derived clauses from growing combinatorially.
    pub fn match_within(&mut self) -> MatchReport {
        let short: Vec<Clause> = self.active.iter().filter(|c| c.len() <= 2).cloned().collect();

        let mut to_remove = BTreeSet::new();
        let mut to_add = BTreeSet::new();

        for (a, b) in short.iter().tuple_combinations() {
            match subsumes(a, b) {
                Some(stricter) if stricter == a => {
                    to_remove.insert(b.clone());
                }
                Some(_) => {
                    to_remove.insert(a.clone());
                }
                None => {
                    if let Some(resolvent) = resolve(a, b) {
                        to_add.insert(resolvent);
                    }
                }
            }
        }

        self.apply_matches(to_remove, to_add)
    }

    fn apply_matches(
        &mut self,
        to_remove: BTreeSet<Clause>,
        to_add: BTreeSet<Clause>,
    ) -> MatchReport {
        let report = MatchReport {
            removed: to_remove.len(),
            derived: to_add.len(),
        };
        for clause in &to_remove {
            self.active.remove(clause);
        }
        for clause in to_add {
            self.insert(clause);
        }
        debug!(
            "Matching removed {} clauses, derived {}; KB now holds {}",
            report.removed,
            report.derived,
            self.len()
        );
        report
    }
}
