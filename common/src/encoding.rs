use itertools::Itertools;
use log::trace;

use crate::Point;
use crate::clause::{Clause, Literal};
use crate::knowledge_base::KnowledgeBase;

impl KnowledgeBase {
    /// Turns a revealed hint into clauses: exactly `mines` of the
    /// `unmarked_neighbors` are mines.
    ///
    /// Each clause is inserted on its own, so every one of them goes through
    /// the full simplification chain of [`KnowledgeBase::insert`].
    pub fn generate(
        &mut self,
        unmarked_neighbors: &[Point],
        mines: usize,
    ) -> anyhow::Result<()> {
        let cells: Vec<Point> = unmarked_neighbors.iter().copied().unique().collect();
        let m = cells.len();
        anyhow::ensure!(
            mines <= m,
            "invalid hint: {} mines among {} unmarked neighbors",
            mines,
            m
        );

        let clauses: Box<dyn Iterator<Item = Clause> + '_> = if mines == m {
            Box::new(cells.iter().map(|&cell| Clause::unit(Literal::mine(cell))))
        } else if mines == 0 {
            Box::new(cells.iter().map(|&cell| Clause::unit(Literal::safe(cell))))
        } else {
            Box::new(
                encode_at_least_k(&cells, mines).chain(encode_at_most_k(&cells, mines)),
            )
        };

        for clause in clauses {
            let outcome = self.insert(clause);
            trace!("Hint clause: {:?}", outcome);
        }
        Ok(())
    }
}

/// Encodes "at least k of `cells` are mines": every choice of m-k+1 cells
/// holds a mine.
///
/// With k > m the constraint cannot hold and a single empty clause comes out.
pub fn encode_at_least_k(cells: &[Point], k: usize) -> impl Iterator<Item = Clause> + '_ {
    let width = (cells.len() + 1).saturating_sub(k);
    cells
        .iter()
        .copied()
        .combinations(width)
        .map(|combo| Clause::new(combo.into_iter().map(Literal::mine)))
}

/// Encodes "at most k of `cells` are mines": every choice of k+1 cells holds
/// a safe cell.
pub fn encode_at_most_k(cells: &[Point], k: usize) -> impl Iterator<Item = Clause> + '_ {
    cells
        .iter()
        .copied()
        .combinations(k + 1)
        .map(|combo| Clause::new(combo.into_iter().map(Literal::safe)))
}
