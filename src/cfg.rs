//! Control-flow graphs.
//!
//! A [`Cfg`] is built from a [`Program`] and validated once: afterwards every
//! analysis may assume a unique entry, branch discipline and a consistent
//! variable set.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::ast::Statement;
use crate::error::CfgError;
use crate::program::Program;

/// Index of a node in [`Cfg::nodes`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub statement: Statement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgNode {
    /// Label number from the program text.
    pub label: usize,
    /// Indices into [`Cfg::edges`].
    pub incoming: Vec<usize>,
    /// Indices into [`Cfg::edges`].
    pub outgoing: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Cfg {
    variables: Vec<String>,
    nodes: Vec<CfgNode>,
    edges: Vec<CfgEdge>,
    entry: NodeId,
}

impl Cfg {
    /// Builds and validates the graph of a program.
    ///
    /// Nodes are ordered by label. Checks, in order:
    /// - the declared variables are exactly the variables used by statements;
    /// - a node with several outgoing edges has only `assume` edges;
    /// - exactly one node has no incoming edge.
    pub fn new(program: &Program) -> Result<Self, CfgError> {
        let used: BTreeSet<&str> = program.edges.iter().flat_map(|e| e.statement.variables()).collect();
        let declared: BTreeSet<&str> = program.variables.iter().map(String::as_str).collect();
        if used != declared {
            return Err(CfgError::VariableMismatch {
                undeclared: used.difference(&declared).map(|s| s.to_string()).collect(),
                unused: declared.difference(&used).map(|s| s.to_string()).collect(),
            });
        }

        let labels: BTreeSet<usize> = program.edges.iter().flat_map(|e| [e.source, e.target]).collect();
        let index: BTreeMap<usize, NodeId> = labels.iter().enumerate().map(|(i, &label)| (label, i)).collect();
        let mut nodes: Vec<CfgNode> = labels
            .iter()
            .map(|&label| CfgNode {
                label,
                incoming: Vec::new(),
                outgoing: Vec::new(),
            })
            .collect();

        let mut edges = Vec::with_capacity(program.edges.len());
        for (i, edge) in program.edges.iter().enumerate() {
            let source = index[&edge.source];
            let target = index[&edge.target];
            nodes[source].outgoing.push(i);
            nodes[target].incoming.push(i);
            edges.push(CfgEdge {
                source,
                target,
                statement: edge.statement.clone(),
            });
        }

        for node in &nodes {
            if node.outgoing.len() > 1 && node.outgoing.iter().any(|&e| !edges[e].statement.is_assume()) {
                return Err(CfgError::AmbiguousBranch { node: node.label });
            }
        }

        let entries: Vec<NodeId> = (0..nodes.len()).filter(|&n| nodes[n].incoming.is_empty()).collect();
        let entry = match entries.as_slice() {
            [] => return Err(CfgError::NoEntry),
            [entry] => *entry,
            _ => {
                return Err(CfgError::MultipleEntries {
                    nodes: entries.iter().map(|&n| nodes[n].label).collect(),
                })
            }
        };

        debug!(
            "Cfg::new: {} nodes, {} edges, entry L{}",
            nodes.len(),
            edges.len(),
            nodes[entry].label
        );

        Ok(Self {
            variables: declared.into_iter().map(str::to_string).collect(),
            nodes,
            edges,
            entry,
        })
    }

    /// Declared variables, sorted.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn nodes(&self) -> &[CfgNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &CfgNode {
        &self.nodes[id]
    }

    pub fn edges(&self) -> &[CfgEdge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> &CfgEdge {
        &self.edges[index]
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Node id of the given label.
    pub fn find(&self, label: usize) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.label == label)
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &CfgEdge> {
        self.nodes[id].incoming.iter().map(|&e| &self.edges[e])
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &CfgEdge> {
        self.nodes[id].outgoing.iter().map(|&e| &self.edges[e])
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing(id).map(|e| e.target)
    }
}
