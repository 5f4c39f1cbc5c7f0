//! Affine relations between variables.
//!
//! An element is an affine subspace of `ℚ^N`, stored as the set of its
//! defining equations in minimal reduced row echelon form. Because reduced
//! systems are canonical, two equal subspaces are structurally equal.

use std::fmt;

use log::debug;

use crate::fraction::Fraction;
use crate::lattice::{Comparison, Lattice};
use crate::matrix::{difference, midpoint, span_equations, Matrix};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariableRelations {
    /// The empty set.
    Bottom,
    /// No equations: every point.
    Top,
    /// A non-empty, consistent system in minimal reduced form.
    System(Matrix),
}

impl VariableRelations {
    /// Reduces an augmented system and classifies the result.
    pub fn from_equations(equations: Matrix) -> Self {
        let reduced = equations.rref_minimal();
        if reduced.is_empty() {
            VariableRelations::Top
        } else if reduced.is_inconsistent() {
            VariableRelations::Bottom
        } else {
            VariableRelations::System(reduced)
        }
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, VariableRelations::Bottom)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, VariableRelations::Top)
    }

    pub fn equations(&self) -> Option<&Matrix> {
        match self {
            VariableRelations::System(m) => Some(m),
            _ => None,
        }
    }

    /// Some point of the subspace.
    pub fn point(&self) -> Option<Vec<Fraction>> {
        match self {
            VariableRelations::System(m) => m.back_substitute(),
            _ => None,
        }
    }
}

impl fmt::Display for VariableRelations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableRelations::Bottom => write!(f, "⊥"),
            VariableRelations::Top => write!(f, "⊤"),
            VariableRelations::System(m) => write!(f, "{}", m),
        }
    }
}

/// The lattice of affine subspaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationLattice;

impl RelationLattice {
    /// The smallest affine subspace containing both systems.
    ///
    /// If the systems share a point `p`, the hull is `p` plus the span of both
    /// direction spaces. Otherwise it is the midpoint of one point from each
    /// system plus the span of both direction spaces and their difference.
    fn affine_hull(&self, a: &Matrix, b: &Matrix) -> VariableRelations {
        let columns = a.columns() - 1;
        let mut directions = a.drop_last_column().kernel();
        directions.extend(b.drop_last_column().kernel());

        let combined = a.stack(b).rref_minimal();
        let origin = match combined.back_substitute() {
            Some(point) => point,
            None => {
                let v = solution(a);
                let w = solution(b);
                directions.push(difference(&v, &w));
                midpoint(&v, &w)
            }
        };

        VariableRelations::from_equations(span_equations(columns, &directions).with_offset(&origin))
    }
}

fn solution(system: &Matrix) -> Vec<Fraction> {
    system
        .back_substitute()
        .expect("stored systems are consistent")
}

impl Lattice for RelationLattice {
    type Element = VariableRelations;

    fn bottom(&self) -> VariableRelations {
        VariableRelations::Bottom
    }

    fn top(&self) -> VariableRelations {
        VariableRelations::Top
    }

    fn meet(&self, elem1: &VariableRelations, elem2: &VariableRelations) -> VariableRelations {
        let result = match (elem1, elem2) {
            (VariableRelations::Bottom, _) | (_, VariableRelations::Bottom) => VariableRelations::Bottom,
            (VariableRelations::Top, other) | (other, VariableRelations::Top) => other.clone(),
            (VariableRelations::System(a), VariableRelations::System(b)) => VariableRelations::from_equations(a.stack(b)),
        };
        debug!("relations meet: {} ⊓ {} = {}", elem1, elem2, result);
        result
    }

    fn join(&self, elem1: &VariableRelations, elem2: &VariableRelations) -> VariableRelations {
        let result = match (elem1, elem2) {
            (VariableRelations::Top, _) | (_, VariableRelations::Top) => VariableRelations::Top,
            (VariableRelations::Bottom, other) | (other, VariableRelations::Bottom) => other.clone(),
            (VariableRelations::System(a), VariableRelations::System(b)) => {
                if a == b {
                    elem1.clone()
                } else {
                    self.affine_hull(a, b)
                }
            }
        };
        debug!("relations join: {} ⊔ {} = {}", elem1, elem2, result);
        result
    }

    fn compare(&self, elem1: &VariableRelations, elem2: &VariableRelations) -> Comparison {
        match (elem1, elem2) {
            (VariableRelations::Bottom, VariableRelations::Bottom) | (VariableRelations::Top, VariableRelations::Top) => {
                Comparison::Equal
            }
            (VariableRelations::Bottom, _) | (_, VariableRelations::Top) => Comparison::LessThan,
            (_, VariableRelations::Bottom) | (VariableRelations::Top, _) => Comparison::MoreThan,
            (VariableRelations::System(a), VariableRelations::System(b)) => {
                let rank = a.stack(b).rref_minimal().rows();
                match (rank == a.rows(), rank == b.rows()) {
                    (true, true) => Comparison::Equal,
                    // Every equation of `a` follows from `b`: b ⊆ a.
                    (false, true) => Comparison::MoreThan,
                    (true, false) => Comparison::LessThan,
                    (false, false) => Comparison::NonComparable,
                }
            }
        }
    }

    fn is_bottom(&self, elem: &VariableRelations) -> bool {
        elem.is_bottom()
    }

    fn is_top(&self, elem: &VariableRelations) -> bool {
        elem.is_top()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::lattice::tests::test_lattice_axioms;

    fn system(columns: usize, rows: &[&[i64]]) -> VariableRelations {
        VariableRelations::from_equations(Matrix::from_integers(columns, rows))
    }

    #[test]
    fn test_from_equations() {
        assert_eq!(system(3, &[]), VariableRelations::Top);
        assert_eq!(system(3, &[&[0, 0, 0]]), VariableRelations::Top);
        // x = 1 and x = 2
        assert_eq!(system(3, &[&[1, 0, -1], &[1, 0, -2]]), VariableRelations::Bottom);
        // 2x - 4 = 0 reduces to x - 2 = 0
        assert_eq!(system(3, &[&[2, 0, -4]]), system(3, &[&[1, 0, -2]]));
    }

    #[test]
    fn test_meet() {
        let l = RelationLattice;
        let x1 = system(3, &[&[1, 0, -1]]);
        let y2 = system(3, &[&[0, 1, -2]]);
        let met = l.meet(&x1, &y2);
        assert_eq!(met.point(), Some(vec![Fraction::integer(1), Fraction::integer(2)]));
        assert_eq!(l.meet(&x1, &system(3, &[&[1, 0, -3]])), VariableRelations::Bottom);
    }

    #[test]
    fn test_join_of_points_is_line() {
        let l = RelationLattice;
        // (0, 0) ⊔ (2, 2) = { x = y }
        let origin = system(3, &[&[1, 0, 0], &[0, 1, 0]]);
        let twos = system(3, &[&[1, 0, -2], &[0, 1, -2]]);
        assert_eq!(l.join(&origin, &twos), system(3, &[&[1, -1, 0]]));
    }

    #[test]
    fn test_join_of_parallel_lines() {
        let l = RelationLattice;
        // x - y = 0 ⊔ x - y = 2 covers the whole plane.
        let a = system(3, &[&[1, -1, 0]]);
        let b = system(3, &[&[1, -1, -2]]);
        assert_eq!(l.join(&a, &b), VariableRelations::Top);
    }

    #[test]
    fn test_join_of_intersecting_lines() {
        let l = RelationLattice;
        // In 3D: {x = 0, y = 0} ⊔ {x = 0, z = 0} = {x = 0}
        let a = system(4, &[&[1, 0, 0, 0], &[0, 1, 0, 0]]);
        let b = system(4, &[&[1, 0, 0, 0], &[0, 0, 1, 0]]);
        assert_eq!(l.join(&a, &b), system(4, &[&[1, 0, 0, 0]]));
    }

    #[test]
    fn test_join_keeps_common_offset() {
        let l = RelationLattice;
        // {x = 1, y = 3} ⊔ {x = 2, y = 4} = {y = x + 2}
        let a = system(3, &[&[1, 0, -1], &[0, 1, -3]]);
        let b = system(3, &[&[1, 0, -2], &[0, 1, -4]]);
        assert_eq!(l.join(&a, &b), system(3, &[&[1, -1, 2]]));
    }

    #[test]
    fn test_compare() {
        let l = RelationLattice;
        let point = system(3, &[&[1, 0, -1], &[0, 1, -1]]);
        let line = system(3, &[&[1, -1, 0]]);
        let other = system(3, &[&[1, 1, 0]]);
        assert_eq!(l.compare(&point, &line), Comparison::LessThan);
        assert_eq!(l.compare(&line, &point), Comparison::MoreThan);
        assert_eq!(l.compare(&line, &other), Comparison::NonComparable);
        assert_eq!(l.compare(&line, &line.clone()), Comparison::Equal);
        let off_line = system(3, &[&[1, 0, -1], &[0, 1, -2]]);
        assert_eq!(l.compare(&off_line, &line), Comparison::NonComparable);
    }

    #[test]
    fn test_relation_lattice_axioms() {
        let samples = vec![
            VariableRelations::Bottom,
            VariableRelations::Top,
            system(3, &[&[1, 0, -1], &[0, 1, -1]]),
            system(3, &[&[1, 0, 0], &[0, 1, -3]]),
            system(3, &[&[1, -1, 0]]),
            system(3, &[&[1, 1, -2]]),
            system(3, &[&[0, 1, -5]]),
        ];
        test_lattice_axioms(&RelationLattice, &samples);
    }
}
