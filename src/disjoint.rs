//! Pointwise lifting of a lattice over a key space.
//!
//! A [`DisjointItem`] maps every key to an element of an inner lattice. Only
//! keys whose value differs from a shared default are stored, so the map
//! stays small even though its domain is conceptually infinite.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::lattice::{Comparison, Lattice};

/// A total map from keys to values, stored as a default plus overrides.
///
/// # Invariants
///
/// No override equals the default. Two items denoting the same map are
/// therefore structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisjointItem<K, V> {
    default: V,
    overrides: BTreeMap<K, V>,
}

impl<K: Ord + Clone, V: Clone + PartialEq> DisjointItem<K, V> {
    /// The map sending every key to `default`.
    pub fn uniform(default: V) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Builds an item from a default and explicit entries.
    pub fn from_entries(default: V, entries: impl IntoIterator<Item = (K, V)>) -> Self {
        entries
            .into_iter()
            .fold(Self::uniform(default), |item, (k, v)| item.with(k, v))
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    pub fn get(&self, key: &K) -> &V {
        self.overrides.get(key).unwrap_or(&self.default)
    }

    /// Returns a copy with `key` mapped to `value`.
    pub fn with(&self, key: K, value: V) -> Self {
        let mut item = self.clone();
        if value == item.default {
            item.overrides.remove(&key);
        } else {
            item.overrides.insert(key, value);
        }
        item
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&K, &V)> {
        self.overrides.iter()
    }

    /// The default followed by every override.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        std::iter::once(&self.default).chain(self.overrides.values())
    }

    /// Keys overridden in either item.
    fn keys_of_both<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a K> {
        let mut keys: Vec<&K> = self.overrides.keys().chain(other.overrides.keys()).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for DisjointItem<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.overrides.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        if !self.overrides.is_empty() {
            write!(f, ", ")?;
        }
        write!(f, "*: {}}}", self.default)
    }
}

/// The lattice of [`DisjointItem`]s over an inner lattice, ordered pointwise.
#[derive(Debug, Clone, Default)]
pub struct DisjointLattice<L, K> {
    inner: L,
    _key: PhantomData<K>,
}

impl<L: Lattice, K: Ord + Clone> DisjointLattice<L, K> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            _key: PhantomData,
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    fn pointwise<F>(&self, a: &DisjointItem<K, L::Element>, b: &DisjointItem<K, L::Element>, op: F) -> DisjointItem<K, L::Element>
    where
        F: Fn(&L::Element, &L::Element) -> L::Element,
    {
        let mut result = DisjointItem::uniform(op(&a.default, &b.default));
        for key in a.keys_of_both(b) {
            result = result.with(key.clone(), op(a.get(key), b.get(key)));
        }
        result
    }
}

impl<L, K> Lattice for DisjointLattice<L, K>
where
    L: Lattice,
    K: Ord + Clone + fmt::Debug,
{
    type Element = DisjointItem<K, L::Element>;

    fn bottom(&self) -> Self::Element {
        DisjointItem::uniform(self.inner.bottom())
    }

    fn top(&self) -> Self::Element {
        DisjointItem::uniform(self.inner.top())
    }

    fn meet(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        self.pointwise(elem1, elem2, |a, b| self.inner.meet(a, b))
    }

    fn join(&self, elem1: &Self::Element, elem2: &Self::Element) -> Self::Element {
        self.pointwise(elem1, elem2, |a, b| self.inner.join(a, b))
    }

    fn compare(&self, elem1: &Self::Element, elem2: &Self::Element) -> Comparison {
        let mut result = self.inner.compare(&elem1.default, &elem2.default);
        for key in elem1.keys_of_both(elem2) {
            if result == Comparison::NonComparable {
                break;
            }
            result = result.combine(self.inner.compare(elem1.get(key), elem2.get(key)));
        }
        result
    }
}
