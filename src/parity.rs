//! Parity abstract domain.
//!
//! Tracks whether each variable is even or odd. A state is a disjunction of
//! parity maps, which lets the analysis keep correlations such as "x and y
//! have the same parity" that a single map would lose.
//!
//! # Elements
//!
//! ```text
//!        ⊤
//!      /   \
//!   Even   Odd
//!      \   /
//!        ⊥
//! ```

use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

use crate::analysis::{Analysis, Verdict};
use crate::ast::{Assertion, AssertionAtom, Assumption, Statement, Value};
use crate::disjoint::{DisjointItem, DisjointLattice};
use crate::lattice::{Comparison, Lattice};
use crate::superset::{Disjunction, SupersetLattice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parity {
    Bottom,
    Even,
    Odd,
    Top,
}

impl Parity {
    /// Parity of a concrete integer.
    pub fn of(value: &BigInt) -> Self {
        if value.is_even() {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    pub fn from_is_even(is_even: bool) -> Self {
        if is_even {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Parity of `x + offset` given the parity of `x`.
    pub fn shift(self, offset: &BigInt) -> Self {
        match self {
            Parity::Even | Parity::Odd if offset.is_odd() => self.flip(),
            _ => self,
        }
    }

    /// Swaps even and odd; bottom and top are fixed.
    pub fn flip(self) -> Self {
        match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
            other => other,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Bottom => write!(f, "⊥"),
            Parity::Even => write!(f, "even"),
            Parity::Odd => write!(f, "odd"),
            Parity::Top => write!(f, "⊤"),
        }
    }
}

/// The four-element parity lattice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityLattice;

impl Lattice for ParityLattice {
    type Element = Parity;

    fn bottom(&self) -> Parity {
        Parity::Bottom
    }

    fn top(&self) -> Parity {
        Parity::Top
    }

    fn meet(&self, elem1: &Parity, elem2: &Parity) -> Parity {
        match (*elem1, *elem2) {
            (Parity::Top, x) | (x, Parity::Top) => x,
            (x, y) if x == y => x,
            _ => Parity::Bottom,
        }
    }

    fn join(&self, elem1: &Parity, elem2: &Parity) -> Parity {
        match (*elem1, *elem2) {
            (Parity::Bottom, x) | (x, Parity::Bottom) => x,
            (x, y) if x == y => x,
            _ => Parity::Top,
        }
    }

    fn compare(&self, elem1: &Parity, elem2: &Parity) -> Comparison {
        match (*elem1, *elem2) {
            (x, y) if x == y => Comparison::Equal,
            (Parity::Bottom, _) | (_, Parity::Top) => Comparison::LessThan,
            (_, Parity::Bottom) | (Parity::Top, _) => Comparison::MoreThan,
            _ => Comparison::NonComparable,
        }
    }
}

/// One disjunct: a parity for every variable.
pub type ParityMap = DisjointItem<String, Parity>;

/// A parity state: a disjunction of parity maps.
pub type ParityState = Disjunction<ParityMap>;

pub type ParityDomain = SupersetLattice<DisjointLattice<ParityLattice, String>>;

/// The disjunctive parity analysis.
#[derive(Debug, Clone)]
pub struct ParityAnalysis {
    domain: ParityDomain,
}

impl Default for ParityAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl ParityAnalysis {
    pub fn new() -> Self {
        Self {
            domain: SupersetLattice::new(DisjointLattice::new(ParityLattice)),
        }
    }

    fn maps(&self) -> &DisjointLattice<ParityLattice, String> {
        self.domain.inner()
    }

    /// Builds a state from explicit disjuncts, reducing it.
    pub fn state_of(&self, disjuncts: impl IntoIterator<Item = ParityMap>) -> ParityState {
        self.reduce(disjuncts)
    }

    /// Normalizes a set of disjuncts.
    ///
    /// Disjuncts with a bottom entry denote no state and are dropped, as are
    /// disjuncts below another disjunct. An empty result is bottom.
    pub fn reduce(&self, disjuncts: impl IntoIterator<Item = ParityMap>) -> ParityState {
        let mut live: Vec<ParityMap> = disjuncts
            .into_iter()
            .filter(|d| d.values().all(|&p| p != Parity::Bottom))
            .collect();
        live.sort();
        live.dedup();

        let kept: Vec<ParityMap> = live
            .iter()
            .filter(|d| !live.iter().any(|e| e != *d && self.maps().le(d, e)))
            .cloned()
            .collect();
        self.domain.from_disjuncts(kept)
    }

    /// Applies `f` to every disjunct of a non-bottom state and reduces the union.
    fn map_disjuncts<F>(&self, state: &ParityState, f: F) -> ParityState
    where
        F: Fn(&ParityMap, &mut Vec<ParityMap>),
    {
        if state.is_bottom() {
            return Disjunction::Bottom;
        }
        let mut out = Vec::new();
        for d in self.domain.expand(state) {
            f(&d, &mut out);
        }
        self.reduce(out)
    }

    fn assign(&self, state: &ParityState, variable: &str, value: &Value) -> ParityState {
        self.map_disjuncts(state, |d, out| match value {
            Value::Const(c) => out.push(d.with(variable.to_string(), Parity::of(c))),
            Value::Unknown => out.push(d.with(variable.to_string(), Parity::Top)),
            Value::Var(u) | Value::VarOpConst(u, _, _) => {
                let offset = value.offset();
                let pu = *d.get(u);
                if u == variable || pu != Parity::Top {
                    out.push(d.with(variable.to_string(), pu.shift(&offset)));
                } else {
                    for p in [Parity::Even, Parity::Odd] {
                        out.push(d.with(u.clone(), p).with(variable.to_string(), p.shift(&offset)));
                    }
                }
            }
        })
    }

    fn assume(&self, state: &ParityState, assumption: &Assumption) -> ParityState {
        let (variable, is_equal, value) = match assumption {
            Assumption::True => return state.clone(),
            Assumption::False => return Disjunction::Bottom,
            Assumption::Relation {
                variable,
                is_equal,
                value,
            } => (variable, *is_equal, value),
        };

        let self_relation = value.variable() == Some(variable.as_str());
        if !is_equal {
            // Only `v != v` is refutable from parities alone.
            return if self_relation && value.offset().is_zero() {
                Disjunction::Bottom
            } else {
                state.clone()
            };
        }

        match value {
            Value::Unknown => state.clone(),
            Value::Const(c) => {
                let expected = Parity::of(c);
                self.map_disjuncts(state, |d, out| {
                    let met = ParityLattice.meet(d.get(variable), &expected);
                    out.push(d.with(variable.clone(), met));
                })
            }
            Value::Var(_) | Value::VarOpConst(..) if self_relation => {
                if value.offset().is_zero() {
                    state.clone()
                } else {
                    Disjunction::Bottom
                }
            }
            Value::Var(u) | Value::VarOpConst(u, _, _) => {
                let offset = value.offset();
                self.map_disjuncts(state, |d, out| {
                    let pv = *d.get(variable);
                    let pu = *d.get(u);
                    if pv == Parity::Top && pu == Parity::Top {
                        for p in [Parity::Even, Parity::Odd] {
                            out.push(d.with(u.clone(), p).with(variable.clone(), p.shift(&offset)));
                        }
                    } else {
                        let met = ParityLattice.meet(&pv, &pu.shift(&offset));
                        out.push(d.with(variable.clone(), met).with(u.clone(), met.shift(&offset)));
                    }
                })
            }
        }
    }

    /// The parity map required by a conjunction of parity atoms.
    ///
    /// Atoms are combined with meet, so `EVEN x ODD x` yields a map with a
    /// bottom entry that nothing but the bottom state satisfies.
    pub fn clause_fact<'a>(&self, atoms: impl IntoIterator<Item = &'a AssertionAtom>) -> ParityMap {
        let mut fact = ParityMap::uniform(Parity::Top);
        for atom in atoms {
            if let AssertionAtom::Parity { is_even, variable } = atom {
                let met = ParityLattice.meet(fact.get(variable), &Parity::from_is_even(*is_even));
                fact = fact.with(variable.clone(), met);
            }
        }
        fact
    }

    /// Returns true if every disjunct of `state` satisfies some clause fact.
    pub fn satisfies(&self, state: &ParityState, facts: &[ParityMap]) -> bool {
        self.domain
            .expand(state)
            .iter()
            .all(|d| facts.iter().any(|fact| self.maps().le(d, fact)))
    }
}

impl Analysis for ParityAnalysis {
    type State = ParityState;
    type Domain = ParityDomain;

    fn domain(&self) -> &ParityDomain {
        &self.domain
    }

    fn transfer(&self, statement: &Statement, state: &ParityState) -> ParityState {
        let result = match statement {
            Statement::Skip | Statement::Assert(_) => state.clone(),
            Statement::Assign { variable, value } => self.assign(state, variable, value),
            Statement::Assume(assumption) => self.assume(state, assumption),
        };
        debug!("parity: {} : {} -> {}", statement, state, result);
        result
    }

    fn check(&self, assertion: &Assertion, state: &ParityState) -> Verdict {
        if state.is_bottom() {
            return Verdict::Proved;
        }
        if assertion.has_sum_atoms() {
            return Verdict::Unsupported;
        }
        let facts: Vec<ParityMap> = assertion.clauses.iter().map(|c| self.clause_fact(c)).collect();
        Verdict::from_bool(self.satisfies(state, &facts))
    }

    fn render(&self, state: &ParityState) -> String {
        state.to_string()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::lattice::tests::test_lattice_axioms;

    fn map(entries: &[(&str, Parity)]) -> ParityMap {
        ParityMap::from_entries(Parity::Top, entries.iter().map(|&(k, v)| (k.to_string(), v)))
    }

    fn assign(var: &str, value: Value) -> Statement {
        Statement::assign(var, value)
    }

    fn assume(assumption: Assumption) -> Statement {
        Statement::Assume(assumption)
    }

    #[test]
    fn test_parity_lattice_axioms() {
        test_lattice_axioms(&ParityLattice, &[Parity::Bottom, Parity::Even, Parity::Odd, Parity::Top]);
    }

    #[test]
    fn test_parity_lattice() {
        let l = ParityLattice;
        assert_eq!(l.join(&Parity::Even, &Parity::Odd), Parity::Top);
        assert_eq!(l.meet(&Parity::Even, &Parity::Odd), Parity::Bottom);
        assert_eq!(l.meet(&Parity::Top, &Parity::Odd), Parity::Odd);
        assert_eq!(l.compare(&Parity::Even, &Parity::Odd), Comparison::NonComparable);
        assert_eq!(l.compare(&Parity::Bottom, &Parity::Even), Comparison::LessThan);
        assert_eq!(Parity::Even.shift(&BigInt::from(-3)), Parity::Odd);
        assert_eq!(Parity::Top.shift(&BigInt::from(1)), Parity::Top);
    }

    #[test]
    fn test_state_lattice_axioms() {
        let a = ParityAnalysis::new();
        let samples = vec![
            Disjunction::Bottom,
            Disjunction::Top,
            a.state_of([map(&[("x", Parity::Even)])]),
            a.state_of([map(&[("x", Parity::Odd)])]),
            a.state_of([map(&[("x", Parity::Even), ("y", Parity::Even)]), map(&[("x", Parity::Odd), ("y", Parity::Odd)])]),
        ];
        test_lattice_axioms(a.domain(), &samples);
    }

    #[test]
    fn test_assign_shifts_parity() {
        let a = ParityAnalysis::new();
        let top = a.domain().top();

        // From top, `x := x + 2` keeps x unconstrained.
        assert_eq!(a.transfer(&assign("x", Value::plus("x", 2)), &top), Disjunction::Top);

        // From {x: even}, `x := x + 1` yields {x: odd}.
        let even = a.state_of([map(&[("x", Parity::Even)])]);
        let odd = a.transfer(&assign("x", Value::plus("x", 1)), &even);
        assert_eq!(odd, a.state_of([map(&[("x", Parity::Odd)])]));

        // Subtraction of an odd constant also flips.
        let back = a.transfer(&assign("x", Value::minus("x", 3)), &odd);
        assert_eq!(back, even);
    }

    #[test]
    fn test_assign_constant_and_unknown() {
        let a = ParityAnalysis::new();
        let s = a.transfer(&assign("x", Value::constant(7)), &Disjunction::Top);
        assert_eq!(s, a.state_of([map(&[("x", Parity::Odd)])]));
        let s = a.transfer(&assign("x", Value::Unknown), &s);
        assert_eq!(s, Disjunction::Top);
        assert_eq!(a.transfer(&assign("x", Value::constant(1)), &Disjunction::Bottom), Disjunction::Bottom);
    }

    #[test]
    fn test_assign_from_unknown_variable_splits() {
        let a = ParityAnalysis::new();
        let s = a.transfer(&assign("y", Value::plus("x", 1)), &Disjunction::Top);
        let expected = a.state_of([
            map(&[("x", Parity::Even), ("y", Parity::Odd)]),
            map(&[("x", Parity::Odd), ("y", Parity::Even)]),
        ]);
        assert_eq!(s, expected);
        let verdict = a.check(&Assertion::all(vec![AssertionAtom::even("y")]), &s);
        assert_eq!(verdict, Verdict::Violated);
    }

    #[test]
    fn test_assume_constant() {
        let a = ParityAnalysis::new();
        let s = a.transfer(&assume(Assumption::eq("x", Value::constant(4))), &Disjunction::Top);
        assert_eq!(s, a.state_of([map(&[("x", Parity::Even)])]));

        let s2 = a.transfer(&assume(Assumption::eq("x", Value::constant(3))), &s);
        assert_eq!(s2, Disjunction::Bottom);
    }

    #[test]
    fn test_assume_relation() {
        let a = ParityAnalysis::new();
        let even_x = a.state_of([map(&[("x", Parity::Even)])]);
        let s = a.transfer(&assume(Assumption::eq("y", Value::plus("x", 1))), &even_x);
        assert_eq!(s, a.state_of([map(&[("x", Parity::Even), ("y", Parity::Odd)])]));

        let s = a.transfer(&assume(Assumption::eq("y", Value::var("x"))), &Disjunction::Top);
        assert_eq!(
            s,
            a.state_of([
                map(&[("x", Parity::Even), ("y", Parity::Even)]),
                map(&[("x", Parity::Odd), ("y", Parity::Odd)]),
            ])
        );

        let clash = a.state_of([map(&[("x", Parity::Even), ("y", Parity::Odd)])]);
        let s = a.transfer(&assume(Assumption::eq("y", Value::var("x"))), &clash);
        assert_eq!(s, Disjunction::Bottom);
    }

    #[test]
    fn test_assume_self_relations() {
        let a = ParityAnalysis::new();
        let top = Disjunction::Top;
        assert_eq!(a.transfer(&assume(Assumption::ne("x", Value::var("x"))), &top), Disjunction::Bottom);
        assert_eq!(a.transfer(&assume(Assumption::ne("x", Value::plus("x", 0))), &top), Disjunction::Bottom);
        assert_eq!(a.transfer(&assume(Assumption::ne("x", Value::plus("x", 2))), &top), Disjunction::Top);
        assert_eq!(a.transfer(&assume(Assumption::eq("x", Value::plus("x", 1))), &top), Disjunction::Bottom);
        assert_eq!(a.transfer(&assume(Assumption::eq("x", Value::plus("x", 2))), &top), Disjunction::Bottom);
        assert_eq!(a.transfer(&assume(Assumption::eq("x", Value::var("x"))), &top), Disjunction::Top);
        assert_eq!(a.transfer(&assume(Assumption::ne("x", Value::constant(3))), &top), Disjunction::Top);
        assert_eq!(a.transfer(&assume(Assumption::False), &top), Disjunction::Bottom);
        assert_eq!(a.transfer(&assume(Assumption::True), &top), Disjunction::Top);
    }

    #[test]
    fn test_reduce_drops_dominated_disjuncts() {
        let a = ParityAnalysis::new();
        let s = a.reduce([
            map(&[("x", Parity::Even), ("y", Parity::Odd)]),
            map(&[("x", Parity::Even)]),
            map(&[("y", Parity::Bottom)]),
        ]);
        assert_eq!(s, a.state_of([map(&[("x", Parity::Even)])]));
        assert_eq!(a.reduce([map(&[("x", Parity::Even)]), map(&[])]), Disjunction::Top);
        assert_eq!(a.reduce([]), Disjunction::Bottom);
    }

    #[test]
    fn test_check() {
        let a = ParityAnalysis::new();
        let even_x = a.state_of([map(&[("x", Parity::Even), ("y", Parity::Odd)])]);

        let assert_even = Assertion::all(vec![AssertionAtom::even("x")]);
        assert_eq!(a.check(&assert_even, &even_x), Verdict::Proved);
        assert_eq!(a.check(&assert_even, &Disjunction::Top), Verdict::Violated);
        assert_eq!(a.check(&assert_even, &Disjunction::Bottom), Verdict::Proved);

        let contradictory = Assertion::all(vec![AssertionAtom::even("x"), AssertionAtom::odd("x")]);
        assert_eq!(a.check(&contradictory, &even_x), Verdict::Violated);

        let either = Assertion::new(vec![vec![AssertionAtom::odd("x")], vec![AssertionAtom::odd("y")]]);
        assert_eq!(a.check(&either, &even_x), Verdict::Proved);

        let sum = Assertion::all(vec![AssertionAtom::sum(&["x"], &["y"])]);
        assert_eq!(a.check(&sum, &even_x), Verdict::Unsupported);

        let empty_clause = Assertion::new(vec![vec![]]);
        assert_eq!(a.check(&empty_clause, &Disjunction::Top), Verdict::Proved);
        assert_eq!(a.check(&Assertion::new(vec![]), &even_x), Verdict::Violated);
    }

    #[test]
    fn test_check_needs_every_disjunct() {
        let a = ParityAnalysis::new();
        let s = a.state_of([
            map(&[("x", Parity::Even), ("y", Parity::Even)]),
            map(&[("x", Parity::Odd), ("y", Parity::Odd)]),
        ]);
        let same = Assertion::new(vec![
            vec![AssertionAtom::even("x"), AssertionAtom::even("y")],
            vec![AssertionAtom::odd("x"), AssertionAtom::odd("y")],
        ]);
        assert_eq!(a.check(&same, &s), Verdict::Proved);
        let only_even = Assertion::all(vec![AssertionAtom::even("x")]);
        assert_eq!(a.check(&only_even, &s), Verdict::Violated);
    }
}
