//! Error types.

use thiserror::Error;

/// A malformed control-flow graph, detected before any analysis runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    #[error("variable mismatch: undeclared {undeclared:?}, declared but unused {unused:?}")]
    VariableMismatch { undeclared: Vec<String>, unused: Vec<String> },

    #[error("node L{node} mixes a non-assume statement with other outgoing edges")]
    AmbiguousBranch { node: usize },

    #[error("no entry node: every node has an incoming edge")]
    NoEntry,

    #[error("multiple entry nodes: {}", fmt_labels(.nodes))]
    MultipleEntries { nodes: Vec<usize> },
}

fn fmt_labels(nodes: &[usize]) -> String {
    nodes.iter().map(|n| format!("L{}", n)).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Cfg(#[from] CfgError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_messages() {
        let e = CfgError::MultipleEntries { nodes: vec![0, 3] };
        assert_eq!(e.to_string(), "multiple entry nodes: L0, L3");

        let e = CfgError::AmbiguousBranch { node: 2 };
        assert_eq!(e.to_string(), "node L2 mixes a non-assume statement with other outgoing edges");

        let e: Error = CfgError::NoEntry.into();
        assert_eq!(e.to_string(), "no entry node: every node has an incoming edge");

        let e = Error::Parse {
            line: 3,
            message: "unexpected `)`".to_string(),
        };
        assert_eq!(e.to_string(), "parse error at line 3: unexpected `)`");
    }
}
