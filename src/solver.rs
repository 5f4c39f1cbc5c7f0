//! Worklist fixed-point solver.
//!
//! The entry node starts at the analysis' initial state and every other node
//! at bottom. Nodes are re-evaluated by joining the transfer of every incoming
//! edge until no state changes, or until the round cap is reached. Assertions
//! are checked once, against the final states.

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};

use crate::analysis::{Analysis, Verdict};
use crate::ast::{Assertion, Statement};
use crate::cfg::Cfg;
use crate::lattice::{Comparison, Lattice};

pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of node evaluations before giving up.
    pub max_rounds: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Outcome of one assertion, carrying the offending state when violated.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S> {
    Proved,
    Violated(S),
    Unsupported,
}

impl<S> Outcome<S> {
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Proved => Verdict::Proved,
            Outcome::Violated(_) => Verdict::Violated,
            Outcome::Unsupported => Verdict::Unsupported,
        }
    }

    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Outcome<T> {
        match self {
            Outcome::Proved => Outcome::Proved,
            Outcome::Violated(s) => Outcome::Violated(f(s)),
            Outcome::Unsupported => Outcome::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertionResult<S> {
    /// Label of the node the assertion edge leaves.
    pub node: usize,
    pub assertion: Assertion,
    pub outcome: Outcome<S>,
}

impl<S> AssertionResult<S> {
    pub fn verdict(&self) -> Verdict {
        self.outcome.verdict()
    }
}

impl<S: fmt::Display> fmt::Display for AssertionResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} assert {}: ", self.node, self.assertion)?;
        match &self.outcome {
            Outcome::Proved => write!(f, "passed"),
            Outcome::Violated(state) => write!(f, "failed in state {}", state),
            Outcome::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Final states of a solver run.
#[derive(Debug, Clone)]
pub struct FixedPoint<S> {
    /// Indexed like [`Cfg::nodes`].
    pub states: Vec<S>,
    /// One result per assertion edge, in edge order.
    pub assertions: Vec<AssertionResult<S>>,
    /// Number of node evaluations performed.
    pub rounds: usize,
    /// False if the round cap stopped the iteration.
    pub converged: bool,
}

impl<S> FixedPoint<S> {
    pub fn map_states<T>(self, mut f: impl FnMut(&S) -> T) -> FixedPoint<T> {
        let states = self.states.iter().map(&mut f).collect();
        let assertions = self
            .assertions
            .into_iter()
            .map(|result| AssertionResult {
                node: result.node,
                assertion: result.assertion,
                outcome: result.outcome.map(|s| f(&s)),
            })
            .collect();
        FixedPoint {
            states,
            assertions,
            rounds: self.rounds,
            converged: self.converged,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve<A: Analysis>(&self, cfg: &Cfg, analysis: &A) -> FixedPoint<A::State> {
        let domain = analysis.domain();
        let mut states: Vec<A::State> = (0..cfg.nodes().len())
            .map(|n| {
                if n == cfg.entry() {
                    analysis.initial()
                } else {
                    domain.bottom()
                }
            })
            .collect();

        let mut worklist: VecDeque<usize> = (0..cfg.nodes().len()).collect();
        let mut rounds = 0;
        let mut converged = true;

        while let Some(node) = worklist.pop_front() {
            if cfg.node(node).incoming.is_empty() {
                continue;
            }
            if rounds == self.config.max_rounds {
                warn!("fixed point not reached after {} rounds", rounds);
                converged = false;
                break;
            }
            rounds += 1;

            let next = domain.join_many(
                cfg.incoming(node)
                    .map(|edge| analysis.transfer(&edge.statement, &states[edge.source])),
            );
            if domain.compare(&next, &states[node]) != Comparison::Equal {
                debug!(
                    "round {}: L{} := {}",
                    rounds,
                    cfg.node(node).label,
                    analysis.render(&next)
                );
                states[node] = next;
                worklist.extend(cfg.successors(node));
            }
        }

        info!("solver finished after {} rounds (converged: {})", rounds, converged);

        let assertions = cfg
            .edges()
            .iter()
            .filter_map(|edge| match &edge.statement {
                Statement::Assert(assertion) => {
                    let state = &states[edge.source];
                    let outcome = match analysis.check(assertion, state) {
                        Verdict::Proved => Outcome::Proved,
                        Verdict::Violated => Outcome::Violated(state.clone()),
                        Verdict::Unsupported => Outcome::Unsupported,
                    };
                    Some(AssertionResult {
                        node: cfg.node(edge.source).label,
                        assertion: assertion.clone(),
                        outcome,
                    })
                }
                _ => None,
            })
            .collect();

        FixedPoint {
            states,
            assertions,
            rounds,
            converged,
        }
    }
}

/// Solves with the default configuration.
pub fn run<A: Analysis>(cfg: &Cfg, analysis: &A) -> FixedPoint<A::State> {
    Solver::default().solve(cfg, analysis)
}
