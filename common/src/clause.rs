use std::collections::BTreeSet;
use std::fmt;

use crate::Point;

/// A Boolean fact about a single cell.
///
/// `mine == true` asserts that the cell holds a mine, `mine == false` asserts
/// that it is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub cell: Point,
    pub mine: bool,
}

impl Literal {
    pub fn mine(cell: Point) -> Self {
        Literal { cell, mine: true }
    }

    pub fn safe(cell: Point) -> Self {
        Literal { cell, mine: false }
    }

    /// The literal for the same cell with the opposite polarity.
    #[must_use]
    pub fn negated(self) -> Self {
        Literal {
            cell: self.cell,
            mine: !self.mine,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mine { "" } else { "¬" };
        write!(f, "{}({},{})", sign, self.cell.x, self.cell.y)
    }
}

/// A disjunction of literals. At least one of them holds on the real board.
///
/// Literals are kept in a `BTreeSet`, so duplicates collapse and two clauses
/// with the same literals compare equal regardless of construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: BTreeSet<Literal>,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Clause {
            literals: literals.into_iter().collect(),
        }
    }

    pub fn unit(literal: Literal) -> Self {
        Clause {
            literals: BTreeSet::from([literal]),
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// The single literal of a unit clause.
    pub fn as_unit(&self) -> Option<Literal> {
        if self.is_unit() {
            self.literals.first().copied()
        } else {
            None
        }
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.literals.contains(literal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn is_subset(&self, other: &Clause) -> bool {
        self.literals.is_subset(&other.literals)
    }

    /// True when the clause holds a literal together with its negation.
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|lit| lit.mine && self.literals.contains(&lit.negated()))
    }

    /// A copy of this clause without `literal`.
    #[must_use]
    pub fn without(&self, literal: &Literal) -> Clause {
        let mut literals = self.literals.clone();
        literals.remove(literal);
        Clause { literals }
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<I: IntoIterator<Item = Literal>>(iter: I) -> Self {
        Clause::new(iter)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " ∨ ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ")")
    }
}

/// Returns whichever of `a` and `b` is a subset of the other, i.e. the stricter
/// clause. Equal clauses subsume each other and `a` is returned.
pub fn subsumes<'a>(a: &'a Clause, b: &'a Clause) -> Option<&'a Clause> {
    if a.is_subset(b) {
        Some(a)
    } else if b.is_subset(a) {
        Some(b)
    } else {
        None
    }
}

/// Resolves two clauses on their single complementary pair.
///
/// Returns `None` when there is no complementary pair, when there is more than
/// one (the resolvent would be a tautology), or when the resolvent is empty.
pub fn resolve(a: &Clause, b: &Clause) -> Option<Clause> {
    let mut pivots = a.iter().filter(|lit| b.contains(&lit.negated()));
    let pivot = *pivots.next()?;
    if pivots.next().is_some() {
        return None;
    }

    let complement = pivot.negated();
    let resolvent: Clause = a
        .iter()
        .filter(|&&lit| lit != pivot)
        .chain(b.iter().filter(|&&lit| lit != complement))
        .copied()
        .collect();

    if resolvent.is_empty() {
        None
    } else {
        Some(resolvent)
    }
}
