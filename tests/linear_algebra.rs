//! Property tests for the exact and GF(2) linear algebra on seeded random systems.

use absint_rs::fraction::Fraction;
use absint_rs::gf2::{BitMatrix, BitRow};
use absint_rs::lattice::Lattice;
use absint_rs::matrix::{dot, Matrix};
use absint_rs::relations::{RelationLattice, VariableRelations};
use num_traits::Zero;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

const SAMPLES: usize = 200;

fn random_matrix(rng: &mut impl Rng, rows: usize, columns: usize) -> Matrix {
    let rows = (0..rows)
        .map(|_| (0..columns).map(|_| Fraction::integer(rng.random_range(-3i64..=3))).collect())
        .collect();
    Matrix::from_rows(columns, rows)
}

fn random_point(rng: &mut impl Rng, size: usize) -> Vec<Fraction> {
    (0..size).map(|_| Fraction::integer(rng.random_range(-5i64..=5))).collect()
}

fn point_system(point: &[Fraction]) -> VariableRelations {
    VariableRelations::from_equations(Matrix::identity(point.len()).with_offset(point))
}

/// Returns true if `point` satisfies every equation of `relations`.
fn contains(relations: &VariableRelations, point: &[Fraction]) -> bool {
    match relations {
        VariableRelations::Bottom => false,
        VariableRelations::Top => true,
        VariableRelations::System(m) => {
            let n = point.len();
            m.iter_rows().all(|row| (dot(&row[..n], point) + &row[n]).is_zero())
        }
    }
}

// ─── Rationals ─────────────────────────────────────────────────────────────────

#[test]
fn rref_is_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let m = random_matrix(&mut rng, 3, 4);
        let once = m.rref();
        assert_eq!(once.clone().rref(), once);
    }
}

#[test]
fn kernel_vectors_are_solutions() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let m = random_matrix(&mut rng, 2, 4).rref_minimal();
        let kernel = m.kernel();
        assert_eq!(kernel.len() + m.rows(), m.columns());
        for v in &kernel {
            assert!(m.mul_vector(v).iter().all(Zero::is_zero), "{:?} not in kernel of\n{}", v, m);
        }
    }
}

#[test]
fn back_substitution_solves_consistent_systems() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..SAMPLES {
        let m = random_matrix(&mut rng, 3, 4);
        let reduced = m.clone().rref_minimal();
        match reduced.back_substitute() {
            Some(solution) => {
                assert!(!reduced.is_inconsistent());
                assert!(contains(&VariableRelations::System(m), &solution));
            }
            None => assert!(reduced.is_inconsistent()),
        }
    }
}

// ─── Affine hull ───────────────────────────────────────────────────────────────

#[test]
fn join_contains_both_sides() {
    let lattice = RelationLattice;
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for _ in 0..SAMPLES {
        let points: Vec<Vec<Fraction>> = (0..3).map(|_| random_point(&mut rng, 3)).collect();
        let line = lattice.join(&point_system(&points[1]), &point_system(&points[2]));
        let hull = lattice.join(&point_system(&points[0]), &line);
        for p in &points {
            assert!(contains(&hull, p));
        }
        assert!(lattice.le(&line, &hull));
        assert!(lattice.le(&point_system(&points[0]), &hull));
    }
}

#[test]
fn join_is_minimal() {
    let lattice = RelationLattice;
    let p = |coords: [i64; 3]| point_system(&coords.map(Fraction::integer));

    // Three points span the plane z = 1, not more.
    let plane = lattice.join_many([p([0, 0, 1]), p([1, 0, 1]), p([0, 1, 1])]);
    assert_eq!(
        plane,
        VariableRelations::from_equations(Matrix::from_integers(4, &[&[0, 0, 1, -1]]))
    );

    // Two points span a line: two equations remain.
    let line = lattice.join(&p([1, 1, 1]), &p([3, 3, 3]));
    assert_eq!(line.equations().map(Matrix::rows), Some(2));
    assert!(contains(&line, &vec![Fraction::integer(2); 3]));
    assert!(!contains(&line, &[Fraction::integer(2), Fraction::integer(2), Fraction::integer(0)]));

    // A fourth point off the plane gives everything.
    assert_eq!(lattice.join(&plane, &p([0, 0, 0])), VariableRelations::Top);
}

// ─── GF(2) ─────────────────────────────────────────────────────────────────────

fn random_bits(rng: &mut impl Rng, rows: usize, columns: usize) -> Vec<BitRow> {
    (0..rows)
        .map(|_| BitRow::from_bits((0..columns).map(|_| rng.random_bool(0.5))))
        .collect()
}

fn parity_of(row: &BitRow, point: &BitRow) -> bool {
    (0..point.len()).fold(false, |acc, j| acc ^ (row.get(j) & point.get(j)))
}

#[test]
fn gf2_solutions_and_kernels() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..SAMPLES {
        let rows = random_bits(&mut rng, 3, 6);
        let reduced = BitMatrix::from_rows(6, rows.clone()).rref_minimal();

        if let Some(solution) = reduced.back_substitute() {
            assert_eq!(solution.len(), 5);
            for row in &rows {
                // Σ a_j x_j + c = 0 over GF(2).
                assert_eq!(parity_of(row, &solution), row.get(5));
            }
        }

        let homogeneous = reduced.drop_last_column();
        for v in homogeneous.kernel() {
            for row in homogeneous.iter_rows() {
                assert!(!parity_of(row, &v));
            }
        }
    }
}
