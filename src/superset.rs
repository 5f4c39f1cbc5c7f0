//! Disjunctive completion of a lattice.
//!
//! A [`Disjunction`] is a finite set of inner elements read as their union.
//! Sets are ordered by inclusion, which is coarser than the semantic order
//! but cheap; analyses keep their sets reduced so the two rarely disagree.

use std::collections::BTreeSet;
use std::fmt;

use crate::lattice::{Comparison, Lattice};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Disjunction<T> {
    /// No disjuncts: unreachable.
    Bottom,
    /// Stands for the singleton set holding the inner top.
    Top,
    /// A non-empty set of disjuncts, none of them the inner top.
    Any(BTreeSet<T>),
}

impl<T: Ord> Disjunction<T> {
    pub fn is_bottom(&self) -> bool {
        matches!(self, Disjunction::Bottom)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Disjunction::Top)
    }

    /// The stored disjuncts, if the set is neither bottom nor top.
    pub fn disjuncts(&self) -> Option<&BTreeSet<T>> {
        match self {
            Disjunction::Any(set) => Some(set),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Disjunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disjunction::Bottom => write!(f, "⊥"),
            Disjunction::Top => write!(f, "⊤"),
            Disjunction::Any(set) => {
                for (i, item) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ∨ ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// The lattice of [`Disjunction`]s over an inner lattice.
#[derive(Debug, Clone, Default)]
pub struct SupersetLattice<L> {
    inner: L,
}

impl<L> SupersetLattice<L>
where
    L: Lattice,
    L::Element: Ord,
{
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Builds a normalized disjunction.
    ///
    /// Inner bottoms are dropped. An empty set becomes [`Disjunction::Bottom`]
    /// and a set containing the inner top becomes [`Disjunction::Top`].
    pub fn from_disjuncts(&self, items: impl IntoIterator<Item = L::Element>) -> Disjunction<L::Element> {
        let mut set = BTreeSet::new();
        for item in items {
            if self.inner.is_top(&item) {
                return Disjunction::Top;
            }
            if !self.inner.is_bottom(&item) {
                set.insert(item);
            }
        }
        if set.is_empty() {
            Disjunction::Bottom
        } else {
            Disjunction::Any(set)
        }
    }

    /// The disjuncts as an explicit set: empty for bottom, the inner top for top.
    pub fn expand(&self, elem: &Disjunction<L::Element>) -> BTreeSet<L::Element> {
        match elem {
            Disjunction::Bottom => BTreeSet::new(),
            Disjunction::Top => BTreeSet::from([self.inner.top()]),
            Disjunction::Any(set) => set.clone(),
        }
    }
}

impl<L> Lattice for SupersetLattice<L>
where
    L: Lattice,
    L::Element: Ord,
{
    type Element = Disjunction<L::Element>;

    fn bottom(&self) -> Self::Element {
        Disjunction::Bottom
    }

    fn top(&self) -> Self::Element {
        Disjunction::Top
    }

    fn meet(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        match (elem1, elem2) {
            (Disjunction::Bottom, _) | (_, Disjunction::Bottom) => Disjunction::Bottom,
            (Disjunction::Top, other) | (other, Disjunction::Top) => other.clone(),
            (Disjunction::Any(a), Disjunction::Any(b)) => self.from_disjuncts(a.intersection(b).cloned()),
        }
    }

    fn join(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        match (elem1, elem2) {
            (Disjunction::Top, _) | (_, Disjunction::Top) => Disjunction::Top,
            (Disjunction::Bottom, other) | (other, Disjunction::Bottom) => other.clone(),
            (Disjunction::Any(a), Disjunction::Any(b)) => Disjunction::Any(a.union(b).cloned().collect()),
        }
    }

    fn compare(&self, elem1: &Self::Element, elem2: &Self::Element) -> Comparison {
        match (elem1, elem2) {
            (Disjunction::Bottom, Disjunction::Bottom) | (Disjunction::Top, Disjunction::Top) => Comparison::Equal,
            (Disjunction::Bottom, _) | (_, Disjunction::Top) => Comparison::LessThan,
            (_, Disjunction::Bottom) | (Disjunction::Top, _) => Comparison::MoreThan,
            (Disjunction::Any(a), Disjunction::Any(b)) => {
                if a == b {
                    Comparison::Equal
                } else if a.is_subset(b) {
                    Comparison::LessThan
                } else if a.is_superset(b) {
                    Comparison::MoreThan
                } else {
                    Comparison::NonComparable
                }
            }
        }
    }

    fn is_bottom(&self, elem: &Self::Element) -> bool {
        elem.is_bottom()
    }

    fn is_top(&self, elem: &Self::Element) -> bool {
        elem.is_top()
    }
}
