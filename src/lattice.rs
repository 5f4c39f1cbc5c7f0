//! Core lattice trait and the product construction.

use std::fmt::{self, Debug};

/// Outcome of comparing two lattice elements under the partial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessThan,
    Equal,
    MoreThan,
    NonComparable,
}

impl Comparison {
    /// `a ⊑ b`.
    pub fn is_le(self) -> bool {
        matches!(self, Comparison::LessThan | Comparison::Equal)
    }

    /// `a ⊒ b`.
    pub fn is_ge(self) -> bool {
        matches!(self, Comparison::MoreThan | Comparison::Equal)
    }

    /// The comparison seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::MoreThan,
            Comparison::MoreThan => Comparison::LessThan,
            other => other,
        }
    }

    /// Combines two pointwise comparisons into the comparison of the pair.
    pub fn combine(self, other: Comparison) -> Comparison {
        match (self, other) {
            (Comparison::Equal, x) | (x, Comparison::Equal) => x,
            (x, y) if x == y => x,
            _ => Comparison::NonComparable,
        }
    }
}

/// Lattice interface.
///
/// A lattice value is a stateless (or configuration-only) object describing
/// how its elements relate. Elements are plain values: all operations take
/// them by reference and return fresh ones.
///
/// # Lattice Properties
///
/// A lattice must satisfy:
/// - Bounds: `∀a. ⊥ ⊑ a ⊑ ⊤`
/// - Join is the least upper bound, meet the greatest lower bound
/// - `compare(a, b) == Equal` iff `a ⊑ b ∧ b ⊑ a`
pub trait Lattice: Clone + Debug {
    /// The type representing lattice elements.
    type Element: Clone + Debug + PartialEq;

    /// Create the bottom element (⊥): the empty set of states.
    fn bottom(&self) -> Self::Element;

    /// Create the top element (⊤): all possible states.
    fn top(&self) -> Self::Element;

    /// Meet (`⊓`): greatest lower bound.
    fn meet(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element;

    /// Join (`⊔`): least upper bound.
    fn join(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element;

    /// Compare two elements under the partial order.
    fn compare(&self, elem1: &Self::Element, elem2: &Self::Element) -> Comparison;

    /// Partial order: `elem1 ⊑ elem2`.
    fn le(&self, elem1: &Self::Element, elem2: &Self::Element) -> bool {
        self.compare(elem1, elem2).is_le()
    }

    fn is_bottom(&self, elem: &Self::Element) -> bool {
        self.compare(elem, &self.bottom()) == Comparison::Equal
    }

    fn is_top(&self, elem: &Self::Element) -> bool {
        self.compare(elem, &self.top()) == Comparison::Equal
    }

    /// Join multiple elements.
    fn join_many<I>(&self, elems: I) -> Self::Element
    where
        I: IntoIterator<Item = Self::Element>,
    {
        elems.into_iter().fold(self.bottom(), |acc, e| self.join(&acc, &e))
    }

    /// Meet multiple elements.
    fn meet_many<I>(&self, elems: I) -> Self::Element
    where
        I: IntoIterator<Item = Self::Element>,
    {
        elems.into_iter().fold(self.top(), |acc, e| self.meet(&acc, &e))
    }
}

/// Element of a product lattice.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductElement<E1, E2>(pub E1, pub E2);

impl<E1: fmt::Display, E2: fmt::Display> fmt::Display for ProductElement<E1, E2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Cartesian product of two lattices, ordered componentwise.
///
/// No reduction is performed: `(⊥, x)` and `(⊥, ⊥)` are distinct elements.
/// Analyses built on top decide how to treat partially-bottom pairs.
#[derive(Clone, Debug, Default)]
pub struct ProductLattice<L1, L2> {
    pub first: L1,
    pub second: L2,
}

impl<L1: Lattice, L2: Lattice> ProductLattice<L1, L2> {
    pub fn new(first: L1, second: L2) -> Self {
        Self { first, second }
    }

    /// Returns true if either component is bottom.
    pub fn has_bottom(&self, elem: &ProductElement<L1::Element, L2::Element>) -> bool {
        self.first.is_bottom(&elem.0) || self.second.is_bottom(&elem.1)
    }
}

impl<L1: Lattice, L2: Lattice> Lattice for ProductLattice<L1, L2> {
    type Element = ProductElement<L1::Element, L2::Element>;

    fn bottom(&self) -> Self::Element {
        ProductElement(self.first.bottom(), self.second.bottom())
    }

    fn top(&self) -> Self::Element {
        ProductElement(self.first.top(), self.second.top())
    }

    fn meet(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        ProductElement(self.first.meet(&elem1.0, &elem2.0), self.second.meet(&elem1.1, &elem2.1))
    }

    fn join(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        ProductElement(self.first.join(&elem1.0, &elem2.0), self.second.join(&elem1.1, &elem2.1))
    }

    fn compare(&self, elem1: &Self::Element, elem2: &Self::Element) -> Comparison {
        let c1 = self.first.compare(&elem1.0, &elem2.0);
        if c1 == Comparison::NonComparable {
            return c1;
        }
        c1.combine(self.second.compare(&elem1.1, &elem2.1))
    }
}
