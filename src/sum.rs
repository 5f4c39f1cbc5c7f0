//! Linear-equality (sum) analysis.
//!
//! States are [`VariableRelations`]: affine subspaces over the program
//! variables, in a fixed column order. Two encodings are available:
//!
//! - [`SumEncoding::Affine`] keeps equations with constant terms, so it knows
//!   `x = 4` and `y = x + 1`.
//! - [`SumEncoding::Homogeneous`] only keeps relations through the origin
//!   (`x = 0`, `x = y`). Every homogeneous state is also an affine one, so
//!   this variant is a coarser instance of the same lattice.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::analysis::{Analysis, Verdict};
use crate::ast::{Assertion, AssertionAtom, Assumption, Statement, Value};
use crate::fraction::Fraction;
use crate::lattice::Lattice;
use crate::matrix::Matrix;
use crate::relations::{RelationLattice, VariableRelations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SumEncoding {
    #[default]
    Affine,
    Homogeneous,
}

impl fmt::Display for SumEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumEncoding::Affine => write!(f, "affine"),
            SumEncoding::Homogeneous => write!(f, "homogeneous"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SumAnalysis {
    variables: Vec<String>,
    index: BTreeMap<String, usize>,
    encoding: SumEncoding,
    domain: RelationLattice,
}

impl SumAnalysis {
    /// An affine sum analysis over the given variables, in column order.
    pub fn new<S: Into<String>>(variables: impl IntoIterator<Item = S>) -> Self {
        Self::with_encoding(variables, SumEncoding::Affine)
    }

    pub fn homogeneous<S: Into<String>>(variables: impl IntoIterator<Item = S>) -> Self {
        Self::with_encoding(variables, SumEncoding::Homogeneous)
    }

    pub fn with_encoding<S: Into<String>>(variables: impl IntoIterator<Item = S>, encoding: SumEncoding) -> Self {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        let index = variables.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        Self {
            variables,
            index,
            encoding,
            domain: RelationLattice,
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn encoding(&self) -> SumEncoding {
        self.encoding
    }

    /// Column of a variable.
    ///
    /// # Panics
    ///
    /// Panics if the variable was not declared.
    pub fn column(&self, variable: &str) -> usize {
        match self.index.get(variable) {
            Some(&i) => i,
            None => panic!("undeclared variable `{}`", variable),
        }
    }

    /// Width of an augmented row: one column per variable plus the constant.
    fn width(&self) -> usize {
        self.variables.len() + 1
    }

    fn single_equation(&self, row: Vec<Fraction>) -> VariableRelations {
        VariableRelations::from_equations(Matrix::from_rows(self.width(), vec![row]))
    }

    /// The equation `variable = value` in this encoding, if it is representable
    /// and informative.
    fn equality(&self, variable: &str, value: &Value) -> Option<VariableRelations> {
        let v = self.column(variable);
        let mut row = vec![Fraction::zero(); self.width()];
        row[v] = Fraction::one();
        match value {
            Value::Unknown => return None,
            Value::Const(c) => {
                if self.encoding == SumEncoding::Homogeneous && !c.is_zero() {
                    return None;
                }
                row[self.variables.len()] = Fraction::integer(-c);
            }
            Value::Var(u) | Value::VarOpConst(u, _, _) => {
                let offset = value.offset();
                if u == variable || (self.encoding == SumEncoding::Homogeneous && !offset.is_zero()) {
                    return None;
                }
                row[self.column(u)] = Fraction::minus_one();
                row[self.variables.len()] = Fraction::integer(-offset);
            }
        }
        Some(self.single_equation(row))
    }

    /// Projects a variable out: eliminates its column using the first equation
    /// that mentions it, then drops that equation.
    pub fn forget(&self, state: &VariableRelations, variable: &str) -> VariableRelations {
        let VariableRelations::System(m) = state else {
            return state.clone();
        };
        let col = self.column(variable);
        let Some(pivot) = (0..m.rows()).find(|&r| !m.get(r, col).is_zero()) else {
            return state.clone();
        };

        let mut m = m.clone();
        for r in 0..m.rows() {
            if r != pivot && !m.get(r, col).is_zero() {
                let factor = -(m.get(r, col) / m.get(pivot, col));
                m.add_scaled_row(pivot, r, &factor);
            }
        }
        let rows = m
            .into_rows()
            .into_iter()
            .enumerate()
            .filter(|&(r, _)| r != pivot)
            .map(|(_, row)| row)
            .collect();
        VariableRelations::from_equations(Matrix::from_rows(self.width(), rows))
    }

    /// `v := v + offset` in the affine encoding: rewrites every equation in
    /// terms of the old value of `v`.
    fn shift(&self, state: &VariableRelations, variable: &str, offset: &BigInt) -> VariableRelations {
        let VariableRelations::System(m) = state else {
            return state.clone();
        };
        let col = self.column(variable);
        let last = self.variables.len();
        let offset = Fraction::integer(offset.clone());
        let rows = m
            .iter_rows()
            .map(|row| {
                let mut row = row.to_vec();
                row[last] = &row[last] - &(&row[col] * &offset);
                row
            })
            .collect();
        VariableRelations::from_equations(Matrix::from_rows(self.width(), rows))
    }

    fn assign(&self, state: &VariableRelations, variable: &str, value: &Value) -> VariableRelations {
        if state.is_bottom() {
            return VariableRelations::Bottom;
        }
        if value.variable() == Some(variable) {
            let offset = value.offset();
            if offset.is_zero() {
                return state.clone();
            }
            return match self.encoding {
                SumEncoding::Affine => self.shift(state, variable, &offset),
                SumEncoding::Homogeneous => self.forget(state, variable),
            };
        }
        match self.equality(variable, value) {
            Some(eq) if self.domain.le(state, &eq) => state.clone(),
            Some(eq) => self.domain.meet(&self.forget(state, variable), &eq),
            None => self.forget(state, variable),
        }
    }

    fn assume(&self, state: &VariableRelations, assumption: &Assumption) -> VariableRelations {
        let (variable, is_equal, value) = match assumption {
            Assumption::True => return state.clone(),
            Assumption::False => return VariableRelations::Bottom,
            Assumption::Relation {
                variable,
                is_equal,
                value,
            } => (variable, *is_equal, value),
        };

        if value.variable() == Some(variable.as_str()) {
            // `v = v + c` holds iff `c = 0`.
            let holds = value.offset().is_zero();
            return if holds == is_equal { state.clone() } else { VariableRelations::Bottom };
        }

        match (is_equal, self.equality(variable, value)) {
            (true, Some(eq)) => self.domain.meet(state, &eq),
            (false, Some(eq)) if self.domain.le(state, &eq) => VariableRelations::Bottom,
            _ => state.clone(),
        }
    }

    /// The homogeneous equation `Σ left - Σ right = 0`.
    pub fn sum_equation(&self, left: &[String], right: &[String]) -> VariableRelations {
        let mut row = vec![Fraction::zero(); self.width()];
        for v in left {
            row[self.column(v)] += &Fraction::one();
        }
        for v in right {
            row[self.column(v)] -= &Fraction::one();
        }
        self.single_equation(row)
    }

    /// Returns true if the SUM atoms among `atoms` all hold in `state`.
    ///
    /// The atoms are conjoined by intersecting their equations first.
    pub fn proves_sums<'a>(&self, state: &VariableRelations, atoms: impl IntoIterator<Item = &'a AssertionAtom>) -> bool {
        let constraint = self.domain.meet_many(atoms.into_iter().filter_map(|atom| match atom {
            AssertionAtom::Sum { left, right } => Some(self.sum_equation(left, right)),
            AssertionAtom::Parity { .. } => None,
        }));
        self.domain.le(state, &constraint)
    }

    /// Renders a state as named equations, e.g. `x - y = 2 ∧ z = 0`.
    pub fn describe(&self, state: &VariableRelations) -> String {
        match state {
            VariableRelations::Bottom => "⊥".to_string(),
            VariableRelations::Top => "⊤".to_string(),
            VariableRelations::System(m) => m
                .iter_rows()
                .map(|row| self.describe_row(row))
                .collect::<Vec<_>>()
                .join(" ∧ "),
        }
    }

    fn describe_row(&self, row: &[Fraction]) -> String {
        let last = self.variables.len();
        let mut text = String::new();
        for (name, coefficient) in self.variables.iter().zip(row).filter(|(_, c)| !c.is_zero()) {
            let negative = coefficient.numer().is_negative();
            let magnitude = if negative { -coefficient } else { coefficient.clone() };
            if text.is_empty() {
                if negative {
                    text.push('-');
                }
            } else {
                text.push_str(if negative { " - " } else { " + " });
            }
            if !magnitude.is_one() {
                text.push_str(&magnitude.to_string());
            }
            text.push_str(name);
        }
        format!("{} = {}", text, -&row[last])
    }
}

impl Analysis for SumAnalysis {
    type State = VariableRelations;
    type Domain = RelationLattice;

    fn domain(&self) -> &RelationLattice {
        &self.domain
    }

    fn transfer(&self, statement: &Statement, state: &VariableRelations) -> VariableRelations {
        let result = match statement {
            Statement::Skip | Statement::Assert(_) => state.clone(),
            Statement::Assign { variable, value } => self.assign(state, variable, value),
            Statement::Assume(assumption) => self.assume(state, assumption),
        };
        debug!("sum ({}): {} : {} -> {}", self.encoding, statement, self.describe(state), self.describe(&result));
        result
    }

    fn check(&self, assertion: &Assertion, state: &VariableRelations) -> Verdict {
        if state.is_bottom() {
            return Verdict::Proved;
        }
        if assertion.has_parity_atoms() {
            return Verdict::Unsupported;
        }
        Verdict::from_bool(assertion.clauses.iter().any(|clause| self.proves_sums(state, clause)))
    }

    fn render(&self, state: &VariableRelations) -> String {
        self.describe(state)
    }
}
