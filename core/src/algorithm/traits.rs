//! Core algorithm trait definitions for blossom matching
//!
//! This module establishes the shared vocabulary of the crate: the vertex
//! identifier, the error taxonomy every structure reports through, and the
//! `Algorithm` trait the matching driver implements.
//!
//! # Key Design Principles
//! - Vertex identifiers are a newtype, never a bare integer
//! - Every fallible operation returns `Result<_, AlgorithmError>`
//! - Errors are classified into a small set of `ErrorKind`s so callers can
//!   separate recoverable input errors from internal contract violations

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data_structures::graph::{Edge, Graph};
use crate::data_structures::matching::Matching;

/// Universal algorithm identifier for type-safe dispatch
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub description: String,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Boolean,
}

/// Coarse classification of [`AlgorithmError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AlreadyMatched,
    Unmatched,
    InvalidBlossom,
    MalformedBlossom,
    InvalidInput,
}

/// Comprehensive error types for graph, matching and search operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Vertex not found: {0}")]
    VertexNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(Edge),

    #[error("Vertex already exists: {0}")]
    VertexExists(NodeId),

    #[error("Edge already exists: {0}")]
    EdgeExists(Edge),

    #[error("Self-loop rejected at vertex {0}")]
    SelfLoop(NodeId),

    #[error("Vertex id {0} leaves no room for pseudo-vertex ids")]
    IdOverflow(NodeId),

    #[error("Vertex {vertex} is already matched to {partner}")]
    AlreadyMatched { vertex: NodeId, partner: NodeId },

    #[error("Vertex {0} is unmatched")]
    Unmatched(NodeId),

    #[error("Invalid blossom: {0}")]
    InvalidBlossom(String),

    #[error("Malformed blossom during lift: {0}")]
    MalformedBlossom(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl AlgorithmError {
    /// Maps the concrete error onto its kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VertexNotFound(_) | Self::EdgeNotFound(_) => ErrorKind::NotFound,
            Self::VertexExists(_) | Self::EdgeExists(_) => ErrorKind::AlreadyExists,
            Self::AlreadyMatched { .. } => ErrorKind::AlreadyMatched,
            Self::Unmatched(_) => ErrorKind::Unmatched,
            Self::InvalidBlossom(_) => ErrorKind::InvalidBlossom,
            Self::MalformedBlossom(_) => ErrorKind::MalformedBlossom,
            Self::SelfLoop(_)
            | Self::IdOverflow(_)
            | Self::InvalidPath(_)
            | Self::InvalidParameter { .. } => ErrorKind::InvalidInput,
        }
    }

    /// True when the error signals a broken search/lift pairing rather than bad input
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidBlossom | ErrorKind::MalformedBlossom
        )
    }
}

/// Algorithm complexity information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmComplexity {
    pub time_complexity: String,
    pub space_complexity: String,
}

/// Algorithm execution metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    pub steps_executed: usize,
    pub nodes_explored: usize,
    pub execution_time: Duration,
    pub custom_metrics: HashMap<String, f64>,
}

/// Main algorithm trait
///
/// # Invariants
/// - State isolation between runs
/// - Deterministic behavior for given inputs
pub trait Algorithm: Debug + Send + Sync {
    /// Result produced by one execution
    type Output;

    /// Returns the algorithm's unique identifier
    fn id(&self) -> AlgorithmId;

    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., graph_matching)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description
    fn description(&self) -> String;

    /// Returns the algorithm's asymptotic complexity in Big-O notation
    fn complexity(&self) -> AlgorithmComplexity;

    /// Returns supported parameters with type information
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;

    /// Runs the algorithm from the given starting matching
    fn execute(&mut self, graph: &Graph, initial: Matching) -> Result<Self::Output, AlgorithmError>;

    /// Metrics of the most recent execution
    fn metrics(&self) -> AlgorithmMetrics;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_id_uniqueness() {
        let id1 = AlgorithmId::new("edmonds");
        let id2 = AlgorithmId::new("hopcroft_karp");
        let id3 = AlgorithmId::new("edmonds");

        assert_ne!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(id1.as_str(), "edmonds");
    }

    #[test]
    fn test_node_id_type_safety() {
        let node1 = NodeId(42);
        let node2 = NodeId::from(42);
        let node3 = NodeId(43);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
        assert!(node1 < node3);
        assert_eq!(node1.as_usize(), 42);
        assert_eq!(node1.to_string(), "42");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(AlgorithmError::VertexNotFound(NodeId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(
            AlgorithmError::EdgeExists(Edge::new(NodeId(0), NodeId(1))).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(AlgorithmError::Unmatched(NodeId(3)).kind(), ErrorKind::Unmatched);
        assert_eq!(AlgorithmError::SelfLoop(NodeId(3)).kind(), ErrorKind::InvalidInput);
        assert_eq!(AlgorithmError::IdOverflow(NodeId(usize::MAX)).kind(), ErrorKind::InvalidInput);

        assert!(AlgorithmError::InvalidBlossom("even cycle".into()).is_contract_violation());
        assert!(AlgorithmError::MalformedBlossom("no exit".into()).is_contract_violation());
        assert!(!AlgorithmError::Unmatched(NodeId(0)).is_contract_violation());
    }

    #[test]
    fn test_error_messages() {
        let err = AlgorithmError::AlreadyMatched { vertex: NodeId(1), partner: NodeId(2) };
        assert_eq!(err.to_string(), "Vertex 1 is already matched to 2");

        let err = AlgorithmError::EdgeNotFound(Edge::new(NodeId(5), NodeId(4)));
        assert_eq!(err.to_string(), "Edge not found: (4, 5)");
    }
}
