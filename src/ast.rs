use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Plus,
    Minus,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Plus => write!(f, "+"),
            Op::Minus => write!(f, "-"),
        }
    }
}

/// Right-hand side of an assignment or relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Const(BigInt),
    Var(String),
    VarOpConst(String, Op, BigInt),
    /// `?`: any integer.
    Unknown,
}

impl Value {
    pub fn constant(value: impl Into<BigInt>) -> Self {
        Value::Const(value.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Value::Var(name.into())
    }

    pub fn plus(name: impl Into<String>, offset: impl Into<BigInt>) -> Self {
        Value::VarOpConst(name.into(), Op::Plus, offset.into())
    }

    pub fn minus(name: impl Into<String>, offset: impl Into<BigInt>) -> Self {
        Value::VarOpConst(name.into(), Op::Minus, offset.into())
    }

    /// The variable read by this value, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Value::Var(name) | Value::VarOpConst(name, _, _) => Some(name),
            Value::Const(_) | Value::Unknown => None,
        }
    }

    /// Signed constant added to the variable: `u - c` has offset `-c`.
    ///
    /// Zero for plain variables, constants and `?`.
    pub fn offset(&self) -> BigInt {
        match self {
            Value::VarOpConst(_, Op::Plus, c) => c.clone(),
            Value::VarOpConst(_, Op::Minus, c) => -c,
            _ => BigInt::zero(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Const(c) => write!(f, "{}", c),
            Value::Var(name) => write!(f, "{}", name),
            Value::VarOpConst(name, op, c) => write!(f, "{} {} {}", name, op, c),
            Value::Unknown => write!(f, "?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Assumption {
    True,
    False,
    /// `variable = value` when `is_equal`, otherwise `variable != value`.
    Relation { variable: String, is_equal: bool, value: Value },
}

impl Assumption {
    pub fn eq(variable: impl Into<String>, value: Value) -> Self {
        Assumption::Relation {
            variable: variable.into(),
            is_equal: true,
            value,
        }
    }

    pub fn ne(variable: impl Into<String>, value: Value) -> Self {
        Assumption::Relation {
            variable: variable.into(),
            is_equal: false,
            value,
        }
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assumption::True => write!(f, "true"),
            Assumption::False => write!(f, "false"),
            Assumption::Relation {
                variable,
                is_equal,
                value,
            } => write!(f, "{} {} {}", variable, if *is_equal { "=" } else { "!=" }, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssertionAtom {
    Parity { is_even: bool, variable: String },
    /// `Σ left = Σ right`.
    Sum { left: Vec<String>, right: Vec<String> },
}

impl AssertionAtom {
    pub fn even(variable: impl Into<String>) -> Self {
        AssertionAtom::Parity {
            is_even: true,
            variable: variable.into(),
        }
    }

    pub fn odd(variable: impl Into<String>) -> Self {
        AssertionAtom::Parity {
            is_even: false,
            variable: variable.into(),
        }
    }

    pub fn sum(left: &[&str], right: &[&str]) -> Self {
        AssertionAtom::Sum {
            left: left.iter().map(|s| s.to_string()).collect(),
            right: right.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_parity(&self) -> bool {
        matches!(self, AssertionAtom::Parity { .. })
    }

    pub fn is_sum(&self) -> bool {
        matches!(self, AssertionAtom::Sum { .. })
    }
}

impl fmt::Display for AssertionAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionAtom::Parity { is_even, variable } => {
                write!(f, "{} {}", if *is_even { "EVEN" } else { "ODD" }, variable)
            }
            AssertionAtom::Sum { left, right } => {
                write!(f, "SUM {} = SUM {}", left.join(" "), right.join(" "))
            }
        }
    }
}

/// A conjunction of atoms.
pub type Clause = Vec<AssertionAtom>;

/// An assertion in disjunctive normal form: holds if some clause holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assertion {
    pub clauses: Vec<Clause>,
}

impl Assertion {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// An assertion with a single clause.
    pub fn all(atoms: Vec<AssertionAtom>) -> Self {
        Self { clauses: vec![atoms] }
    }

    pub fn atoms(&self) -> impl Iterator<Item = &AssertionAtom> {
        self.clauses.iter().flatten()
    }

    pub fn has_sum_atoms(&self) -> bool {
        self.atoms().any(AssertionAtom::is_sum)
    }

    pub fn has_parity_atoms(&self) -> bool {
        self.atoms().any(AssertionAtom::is_parity)
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for (j, atom) in clause.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", atom)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Skip,
    Assign { variable: String, value: Value },
    Assume(Assumption),
    Assert(Assertion),
}

impl Statement {
    pub fn assign(variable: impl Into<String>, value: Value) -> Self {
        Statement::Assign {
            variable: variable.into(),
            value,
        }
    }

    pub fn is_assume(&self) -> bool {
        matches!(self, Statement::Assume(_))
    }

    /// Every variable mentioned by the statement.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut vars = BTreeSet::new();
        match self {
            Statement::Skip => {}
            Statement::Assign { variable, value } => {
                vars.insert(variable.as_str());
                vars.extend(value.variable());
            }
            Statement::Assume(Assumption::Relation { variable, value, .. }) => {
                vars.insert(variable.as_str());
                vars.extend(value.variable());
            }
            Statement::Assume(_) => {}
            Statement::Assert(assertion) => {
                for atom in assertion.atoms() {
                    match atom {
                        AssertionAtom::Parity { variable, .. } => {
                            vars.insert(variable.as_str());
                        }
                        AssertionAtom::Sum { left, right } => {
                            vars.extend(left.iter().chain(right).map(String::as_str));
                        }
                    }
                }
            }
        }
        vars
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Skip => write!(f, "skip"),
            Statement::Assign { variable, value } => write!(f, "{} := {}", variable, value),
            Statement::Assume(assumption) => write!(f, "assume({})", assumption),
            Statement::Assert(assertion) => write!(f, "assert {}", assertion),
        }
    }
}

/// Returns true if the offset of `value` is odd.
pub fn has_odd_offset(value: &Value) -> bool {
    value.offset().is_odd()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(Value::plus("x", 3).offset(), BigInt::from(3));
        assert_eq!(Value::minus("x", 3).offset(), BigInt::from(-3));
        assert_eq!(Value::var("x").offset(), BigInt::zero());
        assert!(has_odd_offset(&Value::minus("x", 1)));
        assert!(!has_odd_offset(&Value::plus("x", 4)));
        assert!(!has_odd_offset(&Value::constant(3)));
    }

    #[test]
    fn test_statement_variables() {
        let s = Statement::assign("x", Value::plus("y", 1));
        assert_eq!(s.variables(), BTreeSet::from(["x", "y"]));

        let a = Statement::Assert(Assertion::new(vec![
            vec![AssertionAtom::even("a")],
            vec![AssertionAtom::sum(&["b", "c"], &["a"])],
        ]));
        assert_eq!(a.variables(), BTreeSet::from(["a", "b", "c"]));
        assert!(Statement::Assume(Assumption::True).variables().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Statement::assign("x", Value::minus("y", 2)).to_string(), "x := y - 2");
        assert_eq!(Statement::Assume(Assumption::ne("x", Value::Unknown)).to_string(), "assume(x != ?)");
        let assertion = Assertion::new(vec![
            vec![AssertionAtom::even("x"), AssertionAtom::odd("y")],
            vec![AssertionAtom::sum(&["x", "y"], &["z"])],
        ]);
        assert_eq!(assertion.to_string(), "(EVEN x ODD y) (SUM x y = SUM z)");
    }
}
