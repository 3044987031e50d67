use std::collections::BTreeSet;

use log::{trace, warn};

use crate::clause::{Clause, Literal};

/// The outcome of a single [`KnowledgeBase::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The (possibly simplified) clause was stored.
    Added(Clause),
    /// An identical clause is already active or committed.
    Duplicate,
    /// The clause contains a committed literal and is already satisfied.
    Redundant,
    /// An active clause is at least as strict as the incoming one.
    Subsumed,
    /// The clause holds a literal and its negation, so it says nothing.
    Tautology,
    /// Every literal of the clause is refuted by committed facts.
    Contradiction,
}

/// The agent's knowledge: active clauses (KB) and committed facts (KB0).
///
/// KB holds the clauses not yet acted upon and is kept subsumption-minimal: no
/// active clause is a subset of another. KB0 holds the literals the agent has
/// already acted on; they are ground truth and never removed.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub(crate) active: BTreeSet<Clause>,
    pub(crate) committed: BTreeSet<Literal>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active clauses.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.active.iter()
    }

    pub fn committed(&self) -> impl Iterator<Item = &Literal> {
        self.committed.iter()
    }

    pub fn contains(&self, clause: &Clause) -> bool {
        self.active.contains(clause)
    }

    pub fn is_committed(&self, literal: &Literal) -> bool {
        self.committed.contains(literal)
    }

    /// The first single-literal clause in KB, if any.
    pub fn unit_clause(&self) -> Option<Literal> {
        self.active.iter().find_map(Clause::as_unit)
    }

    /// Removes and returns the first single-literal clause in KB.
    pub fn pop_unit(&mut self) -> Option<Literal> {
        let literal = self.unit_clause()?;
        self.active.remove(&Clause::unit(literal));
        Some(literal)
    }

    pub fn remove(&mut self, clause: &Clause) -> bool {
        self.active.remove(clause)
    }

    /// Records a literal the agent has acted on. Repeated commits are no-ops.
    pub fn commit(&mut self, literal: Literal) {
        self.committed.insert(literal);
    }

    /// Inserts a clause into KB, simplifying it and KB along the way.
    ///
    /// 1. Skips tautologies and clauses already present in KB or KB0.
    /// 2. Unit propagation: a unit clause deletes the active clauses it
    ///    satisfies and shortens those holding its negation.
    /// 3. Resolution against committed facts: a wider clause holding a
    ///    committed literal is already satisfied, and every literal refuted by
    ///    a committed fact is dropped.
    /// 4. Subsumption against KB: a stricter active clause discards the
    ///    incoming one, weaker active clauses are deleted.
    /// 5. Stores the clause.
    pub fn insert(&mut self, clause: Clause) -> Insertion {
        // --- 1. Idempotence ---
        if clause.is_tautology() {
            return Insertion::Tautology;
        }
        if self.active.contains(&clause) {
            return Insertion::Duplicate;
        }
        if let Some(literal) = clause.as_unit() {
            if self.committed.contains(&literal) {
                return Insertion::Duplicate;
            }
        }

        // --- 2 & 3. Unit propagation, resolution against committed facts ---
        let working = match clause.as_unit() {
            Some(literal) => {
                if self.committed.contains(&literal.negated()) {
                    warn!("Unit {} contradicts a committed fact", literal);
                    return Insertion::Contradiction;
                }
                self.propagate_unit(literal);
                Clause::unit(literal)
            }
            None => {
                if clause.iter().any(|lit| self.committed.contains(lit)) {
                    return Insertion::Redundant;
                }
                self.resolve_with_committed(&clause)
            }
        };
        if working.is_empty() {
            warn!("Clause {} is refuted by committed facts", clause);
            return Insertion::Contradiction;
        }

        // --- 4 & 5. Subsumption and storage ---
        self.admit(working)
    }

    /// Applies a unit fact to every multi-literal active clause.
    ///
    /// Removals and replacements are collected over the whole scan and applied
    /// afterwards; the shortened clauses go back through the subsumption check.
    fn propagate_unit(&mut self, literal: Literal) {
        let complement = literal.negated();
        let mut removed = Vec::new();
        let mut shortened = Vec::new();

        for clause in self.active.iter().filter(|c| c.len() > 1) {
            if clause.contains(&literal) {
                removed.push(clause.clone());
            } else if clause.contains(&complement) {
                removed.push(clause.clone());
                shortened.push(clause.without(&complement));
            }
        }

        for clause in &removed {
            self.active.remove(clause);
        }
        for clause in shortened {
            trace!("Unit {} shortened a clause to {}", literal, clause);
            self.admit(clause);
        }
    }

    /// Resolves `clause` against every committed fact. Each fact whose
    /// negation the clause holds removes that literal; unrelated facts are
    /// passed over, so the order of KB0 does not matter.
    fn resolve_with_committed(&self, clause: &Clause) -> Clause {
        clause
            .iter()
            .filter(|lit| !self.committed.contains(&lit.negated()))
            .copied()
            .collect()
    }

    /// Stores `clause` unless an active clause subsumes it, deleting every
    /// active clause it subsumes.
    pub(crate) fn admit(&mut self, clause: Clause) -> Insertion {
        if self.active.iter().any(|existing| existing.is_subset(&clause)) {
            return Insertion::Subsumed;
        }
        self.active.retain(|existing| !clause.is_subset(existing));
        self.active.insert(clause.clone());
        Insertion::Added(clause)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Point;

    pub(crate) fn p(x: usize, y: usize) -> Point {
        Point { x, y }
    }

    /// Asserts that no active clause is a strict subset of another.
    pub(crate) fn assert_minimal(kb: &KnowledgeBase) {
        for a in kb.clauses() {
            for b in kb.clauses() {
                if a != b {
                    assert!(!a.is_subset(b), "{} subsumes {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        // Inserting the same clause twice leaves KB as after one insertion
        let mut kb = KnowledgeBase::new();
        let clause = Clause::new([Literal::mine(p(0, 0)), Literal::mine(p(1, 0))]);
        assert_eq!(kb.insert(clause.clone()), Insertion::Added(clause.clone()));
        let before: Vec<Clause> = kb.clauses().cloned().collect();
        assert_eq!(kb.insert(clause), Insertion::Duplicate);
        let after: Vec<Clause> = kb.clauses().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_committed_unit_is_duplicate() {
        // A unit whose literal is already committed is a no-op
        let mut kb = KnowledgeBase::new();
        kb.commit(Literal::safe(p(2, 2)));
        assert_eq!(
            kb.insert(Clause::unit(Literal::safe(p(2, 2)))),
            Insertion::Duplicate
        );
        assert!(kb.is_empty());
    }

    #[test]
    fn test_unit_propagation_removes_satisfied_clause() {
        // Inserting L removes a stored {L, X}
        let mut kb = KnowledgeBase::new();
        let l = Literal::mine(p(0, 0));
        let x = Literal::mine(p(1, 0));
        kb.insert(Clause::new([l, x]));
        kb.insert(Clause::unit(l));
        assert!(!kb.contains(&Clause::new([l, x])));
        assert!(kb.contains(&Clause::unit(l)));
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_unit_propagation_shortens_clause() {
        // Inserting L replaces a stored {¬L, X} with {X}
        let mut kb = KnowledgeBase::new();
        let l = Literal::mine(p(0, 0));
        let x = Literal::safe(p(1, 0));
        kb.insert(Clause::new([l.negated(), x]));
        kb.insert(Clause::unit(l));
        assert!(kb.contains(&Clause::unit(x)));
        assert!(kb.contains(&Clause::unit(l)));
        assert!(!kb.contains(&Clause::new([l.negated(), x])));
    }

    #[test]
    fn test_shortened_clause_keeps_minimality() {
        // A shortened clause that subsumes others removes them
        let mut kb = KnowledgeBase::new();
        let l = Literal::mine(p(0, 0));
        let x = Literal::mine(p(1, 0));
        let y = Literal::mine(p(2, 0));
        kb.insert(Clause::new([l.negated(), x]));
        kb.insert(Clause::new([x, y]));
        kb.insert(Clause::unit(l));
        assert!(kb.contains(&Clause::unit(x)));
        assert!(!kb.contains(&Clause::new([x, y])));
        assert_minimal(&kb);
    }

    #[test]
    fn test_committed_literal_makes_clause_redundant() {
        // A clause holding a committed literal verbatim is already satisfied
        let mut kb = KnowledgeBase::new();
        kb.commit(Literal::mine(p(0, 0)));
        let clause = Clause::new([Literal::mine(p(0, 0)), Literal::mine(p(1, 1))]);
        assert_eq!(kb.insert(clause), Insertion::Redundant);
        assert!(kb.is_empty());
    }

    #[test]
    fn test_committed_negation_is_stripped() {
        // Ground truth removes refuted literals before storage
        let mut kb = KnowledgeBase::new();
        kb.commit(Literal::safe(p(0, 0)));
        let clause = Clause::new([
            Literal::mine(p(0, 0)),
            Literal::mine(p(1, 0)),
            Literal::mine(p(2, 0)),
        ]);
        let expected = Clause::new([Literal::mine(p(1, 0)), Literal::mine(p(2, 0))]);
        assert_eq!(kb.insert(clause), Insertion::Added(expected.clone()));
        assert!(kb.contains(&expected));
    }

    #[test]
    fn test_fully_refuted_clause_is_contradiction() {
        // A clause whose literals are all refuted is never stored
        let mut kb = KnowledgeBase::new();
        kb.commit(Literal::safe(p(0, 0)));
        kb.commit(Literal::safe(p(1, 0)));
        let clause = Clause::new([Literal::mine(p(0, 0)), Literal::mine(p(1, 0))]);
        assert_eq!(kb.insert(clause), Insertion::Contradiction);
        assert_eq!(
            kb.insert(Clause::unit(Literal::mine(p(0, 0)))),
            Insertion::Contradiction
        );
        assert!(kb.is_empty());
    }

    #[test]
    fn test_subsumption_discards_weaker_incoming() {
        // An existing stricter clause makes the incoming superset redundant
        let mut kb = KnowledgeBase::new();
        let a = Literal::mine(p(0, 0));
        let b = Literal::mine(p(1, 0));
        let c = Literal::mine(p(2, 0));
        kb.insert(Clause::new([a, b]));
        assert_eq!(kb.insert(Clause::new([a, b, c])), Insertion::Subsumed);
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_subsumption_deletes_every_weaker_clause() {
        // A stricter incoming clause deletes all of its stored supersets
        let mut kb = KnowledgeBase::new();
        let a = Literal::safe(p(0, 0));
        let b = Literal::safe(p(1, 0));
        kb.insert(Clause::new([a, b, Literal::safe(p(2, 0))]));
        kb.insert(Clause::new([a, b, Literal::safe(p(3, 0))]));
        kb.insert(Clause::new([Literal::safe(p(5, 5)), Literal::safe(p(6, 6))]));
        kb.insert(Clause::new([a, b]));
        assert_eq!(kb.len(), 2);
        assert!(kb.contains(&Clause::new([a, b])));
        assert_minimal(&kb);
    }

    #[test]
    fn test_pop_unit() {
        // Units are popped one by one and wider clauses stay in place
        let mut kb = KnowledgeBase::new();
        kb.insert(Clause::unit(Literal::safe(p(0, 0))));
        kb.insert(Clause::new([Literal::mine(p(3, 3)), Literal::mine(p(4, 4))]));
        assert_eq!(kb.pop_unit(), Some(Literal::safe(p(0, 0))));
        assert_eq!(kb.pop_unit(), None);
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_tautology_is_discarded() {
        // A clause with a literal and its negation is never stored
        let mut kb = KnowledgeBase::new();
        let a = Literal::mine(p(0, 0));
        let clause = Clause::new([a, a.negated(), Literal::mine(p(1, 1))]);
        assert_eq!(kb.insert(clause.clone()), Insertion::Tautology);
        assert!(!kb.contains(&clause));
        assert!(kb.is_empty());
        assert_eq!(kb.guess(), None);
    }

    #[test]
    fn test_every_committed_fact_is_applied() {
        // Unrelated facts earlier in KB0 do not stop later ones from resolving
        let mut kb = KnowledgeBase::new();
        kb.commit(Literal::safe(p(0, 0)));
        kb.commit(Literal::safe(p(4, 4)));
        kb.commit(Literal::mine(p(9, 9)));
        let clause = Clause::new([
            Literal::safe(p(9, 9)),
            Literal::mine(p(4, 4)),
            Literal::mine(p(5, 5)),
            Literal::mine(p(6, 6)),
        ]);
        let expected = Clause::new([Literal::mine(p(5, 5)), Literal::mine(p(6, 6))]);
        assert_eq!(kb.insert(clause), Insertion::Added(expected.clone()));
        assert!(kb.contains(&expected));
        assert_eq!(kb.len(), 1);
    }
}
