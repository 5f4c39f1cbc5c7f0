//! CFG to DOT (Graphviz) conversion.
//!
//! Nodes are drawn as boxes labelled with their program label and, when
//! given, the state computed for them. Edges carry their statement; `assume`
//! edges and `assert` edges get their own styles.
//!
//! # Examples
//!
//! ```
//! use absint_rs::cfg::Cfg;
//! use absint_rs::program::parse_program;
//!
//! let program = parse_program("x\nL0 x := 1 L1").unwrap();
//! let cfg = Cfg::new(&program).unwrap();
//! let dot = cfg.to_dot(None).unwrap();
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::fmt::Write as _;

use crate::ast::Statement;
use crate::cfg::Cfg;

/// Configuration options for DOT output generation.
///
/// ```
/// use absint_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     node_shape: "ellipse",
///     ..DotConfig::default()
/// };
/// assert_eq!(config.entry_shape, "doublecircle");
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for program points (default: "box")
    pub node_shape: &'static str,
    /// Shape for the entry node (default: "doublecircle")
    pub entry_shape: &'static str,
    /// Style for assignment and `skip` edges (default: "solid")
    pub edge_style: &'static str,
    /// Style for `assume` edges (default: "dashed")
    pub assume_edge_style: &'static str,
    /// Style for `assert` edges (default: "bold")
    pub assert_edge_style: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "box",
            entry_shape: "doublecircle",
            edge_style: "solid",
            assume_edge_style: "dashed",
            assert_edge_style: "bold",
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Cfg {
    /// Converts the graph to DOT format.
    ///
    /// `states`, if given, holds one rendered state per node, indexed like
    /// [`Cfg::nodes`].
    pub fn to_dot(&self, states: Option<&[String]>) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(states, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, states: Option<&[String]>, config: &DotConfig) -> Result<String, std::fmt::Error> {
        if let Some(states) = states {
            assert_eq!(states.len(), self.nodes().len(), "one state per node");
        }

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        for (id, node) in self.nodes().iter().enumerate() {
            let mut label = format!("L{}", node.label);
            if let Some(states) = states {
                label.push_str("\\n");
                label.push_str(&escape(&states[id]));
            }
            if id == self.entry() {
                writeln!(dot, "{} [shape={}, label=\"{}\"];", id, config.entry_shape, label)?;
            } else {
                writeln!(dot, "{} [label=\"{}\"];", id, label)?;
            }
        }

        for edge in self.edges() {
            let style = match edge.statement {
                Statement::Assume(_) => config.assume_edge_style,
                Statement::Assert(_) => config.assert_edge_style,
                Statement::Skip | Statement::Assign { .. } => config.edge_style,
            };
            writeln!(
                dot,
                "{} -> {} [style={}, label=\"{}\"];",
                edge.source,
                edge.target,
                style,
                escape(&edge.statement.to_string())
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::program::parse_program;

    fn cfg(source: &str) -> Cfg {
        Cfg::new(&parse_program(source).unwrap()).unwrap()
    }

    #[test]
    fn test_to_dot_basic() {
        let cfg = cfg("x\nL0 x := 1 L1\nL1 assume(x = 1) L2\nL1 assume(x != 1) L3");
        let dot = cfg.to_dot(None).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("0 [shape=doublecircle, label=\"L0\"];"));
        assert!(dot.contains("0 -> 1 [style=solid, label=\"x := 1\"];"));
        assert!(dot.contains("1 -> 3 [style=dashed, label=\"assume(x != 1)\"];"));
    }

    #[test]
    fn test_to_dot_with_states() {
        let cfg = cfg("x\nL0 x := 1 L1");
        let states = vec!["⊤".to_string(), "{x: \"odd\"}".to_string()];
        let dot = cfg.to_dot(Some(&states)).unwrap();
        assert!(dot.contains("1 [label=\"L1\\n{x: \\\"odd\\\"}\"];"));
    }

    #[test]
    fn test_to_dot_custom_config() {
        let cfg = cfg("x\nL0 assert (EVEN x) L1");
        let config = DotConfig {
            assert_edge_style: "dotted",
            ..DotConfig::default()
        };
        let dot = cfg.to_dot_with_config(None, &config).unwrap();
        assert!(dot.contains("style=dotted"));
    }
}
