//! Lattice laws on seeded random elements.

use absint_rs::lattice::{Comparison, Lattice, ProductElement, ProductLattice};
use absint_rs::matrix::Matrix;
use absint_rs::parity::{Parity, ParityLattice};
use absint_rs::relations::{RelationLattice, VariableRelations};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

fn check_laws<L: Lattice>(lattice: &L, samples: &[L::Element]) {
    let bottom = lattice.bottom();
    let top = lattice.top();
    for a in samples {
        assert_eq!(lattice.compare(a, a), Comparison::Equal, "{:?}", a);
        assert!(lattice.le(&bottom, a));
        assert!(lattice.le(a, &top));
        assert_eq!(&lattice.join(a, &bottom), a);
        assert_eq!(&lattice.meet(a, &top), a);

        for b in samples {
            let join = lattice.join(a, b);
            let meet = lattice.meet(a, b);
            assert_eq!(join, lattice.join(b, a), "{:?} ⊔ {:?}", a, b);
            assert_eq!(meet, lattice.meet(b, a), "{:?} ⊓ {:?}", a, b);
            assert!(lattice.le(a, &join) && lattice.le(b, &join));
            assert!(lattice.le(&meet, a) && lattice.le(&meet, b));
            assert_eq!(&lattice.join(a, &meet), a);
            assert_eq!(&lattice.meet(a, &join), a);
            assert_eq!(lattice.le(a, b), &join == b, "{:?} ⊑ {:?}", a, b);
            assert_eq!(lattice.compare(a, b), lattice.compare(b, a).reverse());
        }
    }
}

fn random_relations(rng: &mut impl Rng) -> VariableRelations {
    let count = rng.random_range(0..=2);
    let rows: Vec<Vec<i64>> = (0..count)
        .map(|_| (0..3).map(|_| rng.random_range(-2i64..=2)).collect())
        .collect();
    let rows: Vec<&[i64]> = rows.iter().map(Vec::as_slice).collect();
    VariableRelations::from_equations(Matrix::from_integers(3, &rows))
}

fn random_parity(rng: &mut impl Rng) -> Parity {
    [Parity::Bottom, Parity::Even, Parity::Odd, Parity::Top][rng.random_range(0..4)]
}

// ─── Laws ──────────────────────────────────────────────────────────────────────

#[test]
fn parity_lattice_laws() {
    check_laws(&ParityLattice, &[Parity::Bottom, Parity::Even, Parity::Odd, Parity::Top]);
}

#[test]
fn relation_lattice_laws() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let samples: Vec<VariableRelations> = (0..24).map(|_| random_relations(&mut rng)).collect();
    check_laws(&RelationLattice, &samples);
}

#[test]
fn relation_join_is_associative() {
    let lattice = RelationLattice;
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..100 {
        let (a, b, c) = (random_relations(&mut rng), random_relations(&mut rng), random_relations(&mut rng));
        assert_eq!(
            lattice.join(&lattice.join(&a, &b), &c),
            lattice.join(&a, &lattice.join(&b, &c))
        );
        assert_eq!(
            lattice.meet(&lattice.meet(&a, &b), &c),
            lattice.meet(&a, &lattice.meet(&b, &c))
        );
    }
}

#[test]
fn product_lattice_laws() {
    let lattice = ProductLattice::new(ParityLattice, RelationLattice);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let samples: Vec<_> = (0..16)
        .map(|_| ProductElement(random_parity(&mut rng), random_relations(&mut rng)))
        .collect();
    check_laws(&lattice, &samples);
}
