use std::collections::{BTreeSet, HashMap};

use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::Point;
use crate::clause::{Clause, Literal};
use crate::knowledge_base::KnowledgeBase;

impl KnowledgeBase {
    /// Checks that the active clauses and committed facts admit at least one
    /// mine layout. A `false` result means the agent has reasoned from a wrong
    /// assumption, typically an unlucky guess.
    pub fn audit(&self) -> anyhow::Result<bool> {
        let (formula, _) = self.encode();
        let mut solver = Solver::new();
        solver.add_formula(&formula);
        Ok(solver.solve()?)
    }

    /// Checks whether `literal` holds in every layout consistent with the
    /// knowledge base.
    pub fn entails(&self, literal: Literal) -> anyhow::Result<bool> {
        let (formula, var_map) = self.encode();
        let mut solver = Solver::new();
        solver.add_formula(&formula);

        let Some(&var) = var_map.get(&literal.cell) else {
            // Nothing is known about the cell, so only an inconsistent base entails it.
            return Ok(!solver.solve()?);
        };

        // The literal is entailed iff its negation cannot be satisfied.
        solver.assume(&[to_lit(var, !literal.mine)]);
        let counterexample = solver.solve()?;
        solver.assume(&[]);
        Ok(!counterexample)
    }

    /// Literals the solver proves for cells of the active clauses that the
    /// store has not reduced to a unit clause, in cell order. On a stuck turn
    /// these are the facts clause matching failed to derive.
    pub fn missed_facts(&self) -> anyhow::Result<Vec<Literal>> {
        let cells: BTreeSet<Point> = self
            .clauses()
            .flat_map(|clause| clause.iter().map(|lit| lit.cell))
            .collect();

        let mut missed = Vec::new();
        for cell in cells {
            for literal in [Literal::safe(cell), Literal::mine(cell)] {
                if !self.contains(&Clause::unit(literal)) && self.entails(literal)? {
                    missed.push(literal);
                }
            }
        }
        Ok(missed)
    }

    /// Encodes KB and KB0 as a CNF formula with one variable per cell.
    fn encode(&self) -> (CnfFormula, HashMap<Point, Var>) {
        let mut formula = CnfFormula::new();
        let mut var_map: HashMap<Point, Var> = HashMap::new();

        let facts = self.committed().copied().map(Clause::unit);
        for clause in self.clauses().cloned().chain(facts) {
            let lits: Vec<Lit> = clause
                .iter()
                .map(|lit| {
                    let var = *var_map
                        .entry(lit.cell)
                        .or_insert_with(|| formula.new_var());
                    to_lit(var, lit.mine)
                })
                .collect();
            formula.add_clause(&lits);
        }

        (formula, var_map)
    }
}

/// A cell variable is true when the cell holds a mine.
fn to_lit(var: Var, mine: bool) -> Lit {
    let lit = Lit::from_var(var, true);
    if mine { lit } else { !lit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::tests::p;

    #[test]
    fn test_empty_base_is_consistent() {
        // No knowledge admits any layout
        let kb = KnowledgeBase::new();
        assert!(kb.audit().unwrap());
        assert!(!kb.entails(Literal::mine(p(0, 0))).unwrap());
    }

    #[test]
    fn test_hint_entailment() {
        // Two cells, two mines: both cells are entailed mines
        let mut kb = KnowledgeBase::new();
        kb.insert(Clause::new([Literal::mine(p(0, 0)), Literal::mine(p(1, 0))]));
        kb.insert(Clause::new([Literal::safe(p(0, 0)), Literal::safe(p(1, 0))]));
        kb.commit(Literal::safe(p(1, 0)));
        assert!(kb.audit().unwrap());
        assert!(kb.entails(Literal::mine(p(0, 0))).unwrap());
        assert!(!kb.entails(Literal::safe(p(0, 0))).unwrap());
    }

    #[test]
    fn test_generated_clauses_are_consistent() {
        // A real hint stays satisfiable and entails nothing on its own
        let mut kb = KnowledgeBase::new();
        let neighbors = [p(0, 0), p(1, 0), p(2, 0), p(0, 1)];
        kb.generate(&neighbors, 2).unwrap();
        assert!(kb.audit().unwrap());
        for cell in neighbors {
            assert!(!kb.entails(Literal::mine(cell)).unwrap());
            assert!(!kb.entails(Literal::safe(cell)).unwrap());
        }
    }

    #[test]
    fn test_wrong_assumption_is_detected() {
        // A committed fact contradicting the clauses makes the base unsatisfiable
        let mut kb = KnowledgeBase::new();
        kb.insert(Clause::unit(Literal::mine(p(3, 3))));
        kb.commit(Literal::safe(p(3, 3)));
        assert!(!kb.audit().unwrap());
    }

    #[test]
    fn test_missed_facts() {
        // Three binary clauses pin both cells, yet none of them is a unit
        let (a, b) = (p(0, 0), p(1, 0));
        let mut kb = KnowledgeBase::new();
        kb.insert(Clause::new([Literal::mine(a), Literal::mine(b)]));
        kb.insert(Clause::new([Literal::safe(a), Literal::safe(b)]));
        kb.insert(Clause::new([Literal::mine(a), Literal::safe(b)]));
        kb.insert(Clause::unit(Literal::mine(p(5, 5))));
        assert_eq!(kb.len(), 4);
        assert_eq!(
            kb.missed_facts().unwrap(),
            vec![Literal::mine(a), Literal::safe(b)]
        );
    }
}
