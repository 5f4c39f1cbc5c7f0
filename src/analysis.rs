//! The analysis contract and the closed set of analyses.
//!
//! An [`Analysis`] bundles a lattice with transfer functions for statements
//! and a way to decide assertions. The solver in [`crate::solver`] works with
//! any of them; [`analyze`] picks one by [`AnalysisKind`] and runs it.

use std::fmt::{self, Debug};
use std::str::FromStr;

use log::info;

use crate::ast::{Assertion, Statement};
use crate::cfg::Cfg;
use crate::combined::{ParityLiftAnalysis, ProductAnalysis};
use crate::error::Result;
use crate::lattice::Lattice;
use crate::parity::ParityAnalysis;
use crate::program::parse_program;
use crate::solver::{AssertionResult, FixedPoint, Solver, SolverConfig};
use crate::sum::SumAnalysis;

/// Result of checking one assertion against one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Every concrete state described by the abstract state satisfies the assertion.
    Proved,
    /// The abstract state does not entail the assertion.
    Violated,
    /// The assertion uses atoms this analysis cannot decide.
    Unsupported,
}

impl Verdict {
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            Verdict::Proved
        } else {
            Verdict::Violated
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Proved => write!(f, "proved"),
            Verdict::Violated => write!(f, "violated"),
            Verdict::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// An abstract interpretation of statements over a lattice.
pub trait Analysis {
    type State: Clone + Debug + PartialEq;
    type Domain: Lattice<Element = Self::State>;

    fn domain(&self) -> &Self::Domain;

    /// State at the entry node.
    fn initial(&self) -> Self::State {
        self.domain().top()
    }

    /// Abstract effect of running `statement` from `state`.
    fn transfer(&self, statement: &Statement, state: &Self::State) -> Self::State;

    /// Decides `assertion` in `state`. A bottom state proves everything.
    fn check(&self, assertion: &Assertion, state: &Self::State) -> Verdict;

    /// Human-readable form of a state.
    fn render(&self, state: &Self::State) -> String;
}

/// The analyses available over a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Parity,
    Sum,
    Product,
    SumWithParityLift,
    HomogeneousSumWithParityLift,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Parity,
        AnalysisKind::Sum,
        AnalysisKind::Product,
        AnalysisKind::SumWithParityLift,
        AnalysisKind::HomogeneousSumWithParityLift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::Parity => "parity",
            AnalysisKind::Sum => "sum",
            AnalysisKind::Product => "product",
            AnalysisKind::SumWithParityLift => "sum-parity",
            AnalysisKind::HomogeneousSumWithParityLift => "homogeneous-sum-parity",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown analysis `{}`", s))
    }
}

/// Outcome of an analysis run with states rendered to text.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: AnalysisKind,
    /// Labels of the nodes, in the order of `states`.
    pub labels: Vec<usize>,
    pub states: Vec<String>,
    pub assertions: Vec<AssertionResult<String>>,
    pub rounds: usize,
    pub converged: bool,
}

impl Report {
    fn from_fixed_point<A: Analysis>(kind: AnalysisKind, cfg: &Cfg, analysis: &A, fixed_point: FixedPoint<A::State>) -> Self {
        let fixed_point = fixed_point.map_states(|s| analysis.render(s));
        Self {
            kind,
            labels: cfg.nodes().iter().map(|n| n.label).collect(),
            states: fixed_point.states,
            assertions: fixed_point.assertions,
            rounds: fixed_point.rounds,
            converged: fixed_point.converged,
        }
    }

    /// Returns true if every assertion was proved.
    pub fn all_proved(&self) -> bool {
        self.assertions.iter().all(|a| a.verdict() == Verdict::Proved)
    }

    /// Verdicts in edge order.
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.assertions.iter().map(AssertionResult::verdict).collect()
    }
}

/// Runs the analysis of the given kind over a validated graph.
pub fn analyze(cfg: &Cfg, kind: AnalysisKind, config: &SolverConfig) -> Report {
    let variables = cfg.variables();
    let solver = Solver::new(config.clone());
    let report = match kind {
        AnalysisKind::Parity => run(kind, cfg, &solver, &ParityAnalysis::new()),
        AnalysisKind::Sum => run(kind, cfg, &solver, &SumAnalysis::new(variables)),
        AnalysisKind::Product => {
            let analysis = ProductAnalysis::new(ParityAnalysis::new(), SumAnalysis::new(variables));
            run(kind, cfg, &solver, &analysis)
        }
        AnalysisKind::SumWithParityLift => run(kind, cfg, &solver, &ParityLiftAnalysis::new(SumAnalysis::new(variables))),
        AnalysisKind::HomogeneousSumWithParityLift => {
            run(kind, cfg, &solver, &ParityLiftAnalysis::new(SumAnalysis::homogeneous(variables)))
        }
    };
    info!(
        "{} analysis: {} assertions, {} proved",
        kind,
        report.assertions.len(),
        report.verdicts().iter().filter(|&&v| v == Verdict::Proved).count()
    );
    report
}

fn run<A: Analysis>(kind: AnalysisKind, cfg: &Cfg, solver: &Solver, analysis: &A) -> Report {
    let fixed_point = solver.solve(cfg, analysis);
    Report::from_fixed_point(kind, cfg, analysis, fixed_point)
}

/// Parses, validates and analyzes a program given as text.
pub fn analyze_source(source: &str, kind: AnalysisKind, config: &SolverConfig) -> Result<Report> {
    let program = parse_program(source)?;
    let cfg = Cfg::new(&program)?;
    Ok(analyze(&cfg, kind, config))
}
