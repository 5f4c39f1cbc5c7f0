//! Analyses combining parity and linear relations.
//!
//! [`ProductAnalysis`] runs both domains side by side and splits each
//! assertion clause between them. [`ParityLiftAnalysis`] runs only the sum
//! domain and derives parities from it: the equations, read modulo 2, pin
//! down which parity assignments are possible.
//!
//! The lift is strictly more precise on assertions that need both kinds of
//! facts at once. After `x := y + y`, the product only knows `x = 2y` in the
//! sum component and nothing about the parity of `x`; the lift sees
//! `x ≡ 0 (mod 2)` and proves `EVEN x`.

use log::debug;
use num_integer::Integer;

use crate::analysis::{Analysis, Verdict};
use crate::ast::{Assertion, AssertionAtom, Statement};
use crate::disjoint::DisjointItem;
use crate::gf2::{BitMatrix, BitRow};
use crate::lattice::{ProductElement, ProductLattice};
use crate::parity::{Parity, ParityAnalysis, ParityDomain, ParityMap, ParityState};
use crate::relations::{RelationLattice, VariableRelations};
use crate::sum::SumAnalysis;

/// Parity atoms of the clauses whose SUM atoms are all proved.
///
/// A clause without SUM atoms is kept as is. Clauses failing a SUM atom are
/// dropped.
fn discharge_sums<'a>(assertion: &'a Assertion, proves: impl Fn(&[AssertionAtom]) -> bool) -> Vec<Vec<&'a AssertionAtom>> {
    assertion
        .clauses
        .iter()
        .filter(|clause| !clause.iter().any(AssertionAtom::is_sum) || proves(clause.as_slice()))
        .map(|clause| clause.iter().filter(|atom| atom.is_parity()).collect())
        .collect()
}

pub type ProductState = ProductElement<ParityState, VariableRelations>;

/// Parity and sum analyses run independently on the same program.
#[derive(Debug, Clone)]
pub struct ProductAnalysis {
    parity: ParityAnalysis,
    sum: SumAnalysis,
    domain: ProductLattice<ParityDomain, RelationLattice>,
}

impl ProductAnalysis {
    pub fn new(parity: ParityAnalysis, sum: SumAnalysis) -> Self {
        let domain = ProductLattice::new(parity.domain().clone(), *sum.domain());
        Self { parity, sum, domain }
    }

    pub fn parity(&self) -> &ParityAnalysis {
        &self.parity
    }

    pub fn sum(&self) -> &SumAnalysis {
        &self.sum
    }
}

impl Analysis for ProductAnalysis {
    type State = ProductState;
    type Domain = ProductLattice<ParityDomain, RelationLattice>;

    fn domain(&self) -> &Self::Domain {
        &self.domain
    }

    fn transfer(&self, statement: &Statement, state: &ProductState) -> ProductState {
        ProductElement(
            self.parity.transfer(statement, &state.0),
            self.sum.transfer(statement, &state.1),
        )
    }

    fn check(&self, assertion: &Assertion, state: &ProductState) -> Verdict {
        if self.domain.has_bottom(state) {
            return Verdict::Proved;
        }
        let remaining = discharge_sums(assertion, |clause| self.sum.proves_sums(&state.1, clause));
        if remaining.iter().any(Vec::is_empty) {
            return Verdict::Proved;
        }
        if remaining.is_empty() {
            return Verdict::Violated;
        }
        let facts: Vec<ParityMap> = remaining
            .iter()
            .map(|atoms| self.parity.clause_fact(atoms.iter().copied()))
            .collect();
        Verdict::from_bool(self.parity.satisfies(&state.0, &facts))
    }

    fn render(&self, state: &ProductState) -> String {
        format!("{} | {}", self.parity.render(&state.0), self.sum.render(&state.1))
    }
}

/// Sum analysis whose parity assertions are answered by reasoning modulo 2.
///
/// Works with either sum encoding.
#[derive(Debug, Clone)]
pub struct ParityLiftAnalysis {
    sum: SumAnalysis,
    parity: ParityAnalysis,
}

impl ParityLiftAnalysis {
    pub fn new(sum: SumAnalysis) -> Self {
        Self {
            sum,
            parity: ParityAnalysis::new(),
        }
    }

    pub fn sum(&self) -> &SumAnalysis {
        &self.sum
    }

    /// Every parity assignment of `relevant` variables compatible with the
    /// equations read modulo 2.
    ///
    /// Returns `None` if the equations have no solution modulo 2, which means
    /// they have no integer solution either.
    pub fn parity_points(&self, state: &VariableRelations, relevant: &[usize]) -> Option<Vec<ParityMap>> {
        let n = self.sum.variables().len();
        let Some(equations) = state.equations() else {
            return match state {
                VariableRelations::Bottom => None,
                _ => Some(vec![ParityMap::uniform(Parity::Top)]),
            };
        };

        let rows = equations
            .to_integer_rows()
            .iter()
            .map(|row| BitRow::from_bits(row.iter().map(|x| x.is_odd())))
            .collect();
        let system = BitMatrix::from_rows(n + 1, rows).rref_minimal();
        let particular = system.back_substitute()?;
        let kernel = system.drop_last_column().kernel();

        let origin = particular.project(relevant);
        let directions = BitMatrix::from_rows(relevant.len(), kernel.iter().map(|k| k.project(relevant)).collect()).rref_minimal();
        let k = directions.rows();
        assert!(k < usize::BITS as usize, "too many free parity directions: {}", k);
        debug!(
            "parity lift: {} equations, {} relevant variables, {} free directions",
            equations.rows(),
            relevant.len(),
            k
        );

        let points = (0..1usize << k)
            .map(|mask| {
                let mut point = origin.clone();
                for (i, direction) in directions.iter_rows().enumerate() {
                    if mask >> i & 1 == 1 {
                        point.xor_assign(direction);
                    }
                }
                let entries = relevant.iter().zip(point.iter()).map(|(&var, bit)| {
                    let parity = if bit { Parity::Odd } else { Parity::Even };
                    (self.sum.variables()[var].clone(), parity)
                });
                DisjointItem::from_entries(Parity::Top, entries)
            })
            .collect();
        Some(points)
    }
}

impl Analysis for ParityLiftAnalysis {
    type State = VariableRelations;
    type Domain = RelationLattice;

    fn domain(&self) -> &RelationLattice {
        self.sum.domain()
    }

    fn transfer(&self, statement: &Statement, state: &VariableRelations) -> VariableRelations {
        self.sum.transfer(statement, state)
    }

    fn check(&self, assertion: &Assertion, state: &VariableRelations) -> Verdict {
        if state.is_bottom() {
            return Verdict::Proved;
        }
        let remaining = discharge_sums(assertion, |clause| self.sum.proves_sums(state, clause));
        if remaining.iter().any(Vec::is_empty) {
            return Verdict::Proved;
        }
        if remaining.is_empty() || state.is_top() {
            return Verdict::Violated;
        }

        let mut relevant: Vec<usize> = remaining
            .iter()
            .flatten()
            .filter_map(|atom| match atom {
                AssertionAtom::Parity { variable, .. } => Some(self.sum.column(variable)),
                AssertionAtom::Sum { .. } => None,
            })
            .collect();
        relevant.sort_unstable();
        relevant.dedup();

        let Some(points) = self.parity_points(state, &relevant) else {
            return Verdict::Proved;
        };
        let facts: Vec<ParityMap> = remaining
            .iter()
            .map(|atoms| self.parity.clause_fact(atoms.iter().copied()))
            .collect();
        let parity_domain = self.parity.domain();
        let holds = points
            .into_iter()
            .all(|point| self.parity.satisfies(&parity_domain.from_disjuncts([point]), &facts));
        Verdict::from_bool(holds)
    }

    fn render(&self, state: &VariableRelations) -> String {
        self.sum.render(state)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::ast::Value;
    use crate::lattice::Lattice;
    use crate::superset::Disjunction;

    fn run<A: Analysis>(analysis: &A, statements: &[Statement]) -> A::State {
        statements
            .iter()
            .fold(analysis.domain().top(), |state, s| analysis.transfer(s, &state))
    }

    fn even(v: &str) -> Assertion {
        Assertion::all(vec![AssertionAtom::even(v)])
    }

    #[test]
    fn test_product_splits_clauses() {
        let p = ProductAnalysis::new(ParityAnalysis::new(), SumAnalysis::new(["x", "y"]));
        let s = run(
            &p,
            &[
                Statement::assign("x", Value::constant(2)),
                Statement::assign("y", Value::var("x")),
            ],
        );
        let both = Assertion::all(vec![AssertionAtom::sum(&["x"], &["y"]), AssertionAtom::even("y")]);
        assert_eq!(p.check(&both, &s), Verdict::Proved);

        let failing_sum = Assertion::all(vec![AssertionAtom::sum(&["x"], &["y", "y"]), AssertionAtom::even("y")]);
        assert_eq!(p.check(&failing_sum, &s), Verdict::Violated);

        let sum_only = Assertion::all(vec![AssertionAtom::sum(&["x"], &["y"])]);
        assert_eq!(p.check(&sum_only, &s), Verdict::Proved);

        let odd = Assertion::all(vec![AssertionAtom::odd("x")]);
        assert_eq!(p.check(&odd, &s), Verdict::Violated);
    }

    #[test]
    fn test_product_bottom_component_proves() {
        let p = ProductAnalysis::new(ParityAnalysis::new(), SumAnalysis::new(["x"]));
        let s = ProductElement(Disjunction::Top, VariableRelations::Bottom);
        assert_eq!(p.check(&even("x"), &s), Verdict::Proved);
    }

    #[test]
    fn test_lift_proves_cross_domain_fact() {
        let statements = [
            Statement::assign("x", Value::var("y")),
            Statement::assign("z", Value::plus("x", 1)),
        ];
        // z = y + 1 and x = y: x + z is odd, so exactly one of them is even.
        let assertion = Assertion::new(vec![
            vec![AssertionAtom::even("x"), AssertionAtom::odd("z")],
            vec![AssertionAtom::odd("x"), AssertionAtom::even("z")],
        ]);

        let lift = ParityLiftAnalysis::new(SumAnalysis::new(["x", "y", "z"]));
        let s = run(&lift, &statements);
        assert_eq!(lift.check(&assertion, &s), Verdict::Proved);
        assert_eq!(lift.check(&even("x"), &s), Verdict::Violated);
    }

    #[test]
    fn test_lift_beats_product_on_equal_variables() {
        let same_parity = Assertion::new(vec![
            vec![AssertionAtom::even("x"), AssertionAtom::even("y")],
            vec![AssertionAtom::odd("x"), AssertionAtom::odd("y")],
        ]);
        let equal = VariableRelations::from_equations(crate::matrix::Matrix::from_integers(3, &[&[1, -1, 0]]));

        let product = ProductAnalysis::new(ParityAnalysis::new(), SumAnalysis::new(["x", "y"]));
        let s = ProductElement(Disjunction::Top, equal.clone());
        assert_eq!(product.check(&same_parity, &s), Verdict::Violated);

        let lift = ParityLiftAnalysis::new(SumAnalysis::new(["x", "y"]));
        assert_eq!(lift.check(&same_parity, &equal), Verdict::Proved);
        assert_eq!(lift.check(&even("x"), &equal), Verdict::Violated);
    }

    #[test]
    fn test_lift_reads_constants_modulo_two() {
        let lift = ParityLiftAnalysis::new(SumAnalysis::new(["x", "y"]));
        // x = 2y + 1
        let s = VariableRelations::from_equations(crate::matrix::Matrix::from_integers(3, &[&[1, -2, -1]]));
        let points = lift.parity_points(&s, &[0]).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].get(&"x".to_string()), &Parity::Odd);
        assert_eq!(lift.check(&Assertion::all(vec![AssertionAtom::odd("x")]), &s), Verdict::Proved);
    }

    #[test]
    fn test_lift_top_is_violated() {
        let lift = ParityLiftAnalysis::new(SumAnalysis::new(["x"]));
        assert_eq!(lift.check(&even("x"), &VariableRelations::Top), Verdict::Violated);
        assert_eq!(lift.check(&even("x"), &VariableRelations::Bottom), Verdict::Proved);
        assert_eq!(lift.check(&Assertion::new(vec![]), &VariableRelations::Top), Verdict::Violated);
    }

    #[test]
    fn test_lift_with_homogeneous_encoding() {
        let lift = ParityLiftAnalysis::new(SumAnalysis::homogeneous(["x", "y"]));
        let s = run(&lift, &[Statement::assign("x", Value::constant(0)), Statement::assign("y", Value::var("x"))]);
        assert_eq!(lift.check(&even("y"), &s), Verdict::Proved);

        // Odd constants are invisible to the homogeneous encoding.
        let s = run(&lift, &[Statement::assign("x", Value::constant(1))]);
        assert_eq!(lift.check(&Assertion::all(vec![AssertionAtom::odd("x")]), &s), Verdict::Violated);
    }

    #[test]
    fn test_discharge_sums() {
        let assertion = Assertion::new(vec![
            vec![AssertionAtom::sum(&["x"], &["y"]), AssertionAtom::even("x")],
            vec![AssertionAtom::odd("y")],
        ]);
        let kept = discharge_sums(&assertion, |_| false);
        assert_eq!(kept, vec![vec![&AssertionAtom::odd("y")]]);
        let kept = discharge_sums(&assertion, |_| true);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], vec![&AssertionAtom::even("x")]);
    }
}
