use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use absint_rs::analysis::{analyze, AnalysisKind};
use absint_rs::cfg::Cfg;
use absint_rs::program::Program;
use absint_rs::solver::{Outcome, SolverConfig, DEFAULT_MAX_ROUNDS};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Parity,
    Sum,
    Product,
    SumParity,
    HomogeneousSumParity,
}

impl From<Mode> for AnalysisKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Parity => AnalysisKind::Parity,
            Mode::Sum => AnalysisKind::Sum,
            Mode::Product => AnalysisKind::Product,
            Mode::SumParity => AnalysisKind::SumWithParityLift,
            Mode::HomogeneousSumParity => AnalysisKind::HomogeneousSumWithParityLift,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Program file.
    #[arg(value_name = "FILE")]
    program: PathBuf,

    /// Analysis to run.
    #[arg(long, value_enum, default_value = "parity")]
    analysis: Mode,

    /// Maximum number of node evaluations.
    #[arg(long, value_name = "INT", default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Write the annotated graph in DOT format to this file.
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Log every transfer and join.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let program = Program::load(&args.program)?;
    let cfg = Cfg::new(&program)?;
    println!(
        "{}: {} variables, {} nodes, {} edges",
        args.program.display(),
        cfg.variables().len(),
        cfg.nodes().len(),
        cfg.edges().len()
    );

    let kind = AnalysisKind::from(args.analysis);
    let config = SolverConfig {
        max_rounds: args.max_rounds,
    };
    let report = analyze(&cfg, kind, &config);
    if !report.converged {
        println!("warning: no fixed point after {} rounds, results are incomplete", report.rounds);
    }

    for (label, state) in report.labels.iter().zip(&report.states) {
        println!("L{}: {}", label, state);
    }
    for result in &report.assertions {
        match &result.outcome {
            Outcome::Proved => println!("L{} assert {}: passed", result.node, result.assertion),
            Outcome::Violated(state) => println!("L{} assert {}: failed in state {}", result.node, result.assertion, state),
            Outcome::Unsupported => println!("L{} assert {}: unsupported by {}", result.node, result.assertion, kind),
        }
    }

    if let Some(path) = &args.dot {
        let dot = cfg.to_dot(Some(&report.states))?;
        std::fs::write(path, dot)?;
        println!("DOT in {}", path.display());
    }

    println!("{} analysis done in {} rounds, {:.3} s", kind, report.rounds, time_total.elapsed().as_secs_f64());
    Ok(())
}
