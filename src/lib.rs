//! # absint-rs: Abstract interpretation of small integer programs
//!
//! **`absint-rs`** proves parity and linear-sum assertions about programs made
//! of assignments, assumptions and assertions over unbounded integers.
//!
//! ## How it works
//!
//! A program is a control-flow graph whose edges carry statements. An
//! *analysis* maps every program point to an element of a lattice that
//! over-approximates the reachable states, and the [`solver`] iterates the
//! statements' transfer functions until nothing changes. Assertions are then
//! decided against the final states: a *proved* assertion holds in every run.
//!
//! ## Analyses
//!
//! - **Parity** ([`parity`]): every variable is even, odd, or unknown, with
//!   disjunctions keeping paths apart.
//! - **Sum** ([`sum`]): the affine subspace of `ℚ^N` containing every state,
//!   kept as equations with exact rational coefficients ([`relations`]).
//! - **Product** ([`combined`]): both of the above, side by side.
//! - **Parity lift** ([`combined`]): the sum analysis, with parity questions
//!   answered by reading its equations modulo 2 ([`gf2`]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use absint_rs::analysis::{analyze_source, AnalysisKind, Verdict};
//! use absint_rs::solver::SolverConfig;
//!
//! let source = "
//!     x y
//!     L0 x := 0 L1
//!     L1 y := x + 1 L2
//!     L2 assert (EVEN x ODD y) L3
//! ";
//! let report = analyze_source(source, AnalysisKind::Parity, &SolverConfig::default()).unwrap();
//! assert_eq!(report.verdicts(), vec![Verdict::Proved]);
//! ```
//!
//! ## Core Components
//!
//! - **[`lattice`]**: the [`Lattice`][crate::lattice::Lattice] contract and
//!   the generic lifters [`disjoint`] and [`superset`].
//! - **[`program`]** and **[`cfg`]**: the textual format and the validated
//!   graph built from it.
//! - **[`analysis`]**: the [`Analysis`][crate::analysis::Analysis] contract
//!   and the closed set of analyses.
//! - **[`dot`]**: rendering graphs and their states with Graphviz.

pub mod analysis;
pub mod ast;
pub mod cfg;
pub mod combined;
pub mod disjoint;
pub mod dot;
pub mod error;
pub mod fraction;
pub mod gf2;
pub mod lattice;
pub mod matrix;
pub mod parity;
pub mod program;
pub mod relations;
pub mod solver;
pub mod sum;
pub mod superset;
