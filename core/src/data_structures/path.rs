//! Simple paths over graph vertices
//!
//! A [`Path`] is a non-empty sequence of distinct vertices with at least one
//! edge. Augmenting paths are the special case of odd length whose edges
//! alternate non-matching/matching and whose endpoints are both exposed.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Edge, Graph};
use crate::data_structures::matching::Matching;

/// Simple path stored as its vertex sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NodeId>", into = "Vec<NodeId>")]
pub struct Path {
    vertices: Vec<NodeId>,
}

impl Path {
    /// Creates a path from a vertex sequence
    pub fn new(vertices: Vec<NodeId>) -> Result<Self, AlgorithmError> {
        if vertices.len() < 2 {
            return Err(AlgorithmError::InvalidPath(
                "a path needs at least one edge".into(),
            ));
        }
        let mut seen = HashSet::with_capacity(vertices.len());
        if let Some(repeated) = vertices.iter().find(|v| !seen.insert(**v)) {
            return Err(AlgorithmError::InvalidPath(format!(
                "vertex {} appears more than once",
                repeated
            )));
        }
        Ok(Self { vertices })
    }

    /// Reconstructs a path from an unordered set of edges
    pub fn from_edges<I, E>(edges: I) -> Result<Self, AlgorithmError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut incidence: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for edge in edges {
            let edge = edge.into();
            if edge.is_loop() || !seen.insert(edge) {
                return Err(AlgorithmError::InvalidPath(format!(
                    "edge {} is a loop or repeated",
                    edge
                )));
            }
            let (u, v) = edge.endpoints();
            incidence.entry(u).or_default().push(v);
            incidence.entry(v).or_default().push(u);
        }

        if incidence.values().any(|adjacent| adjacent.len() > 2) {
            return Err(AlgorithmError::InvalidPath("edge set branches".into()));
        }
        let start = incidence
            .iter()
            .find(|(_, adjacent)| adjacent.len() == 1)
            .map(|(vertex, _)| *vertex)
            .ok_or_else(|| AlgorithmError::InvalidPath("edge set has no endpoint".into()))?;

        let mut vertices = vec![start];
        let mut previous: Option<NodeId> = None;
        let mut current = start;
        while let Some(next) = incidence[&current]
            .iter()
            .copied()
            .find(|&u| Some(u) != previous)
        {
            vertices.push(next);
            previous = Some(current);
            current = next;
        }

        // A walk that stops short means the edges fall into several pieces
        if vertices.len() != incidence.len() {
            return Err(AlgorithmError::InvalidPath(
                "edge set is not connected".into(),
            ));
        }

        Self::new(vertices)
    }

    #[inline]
    pub fn vertices(&self) -> &[NodeId] {
        &self.vertices
    }

    /// Number of edges
    #[inline]
    pub fn length(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.vertices.windows(2).map(|pair| Edge::new(pair[0], pair[1]))
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.vertices[0], self.vertices[self.vertices.len() - 1])
    }

    #[inline]
    pub fn contains(&self, vertex: NodeId) -> bool {
        self.vertices.contains(&vertex)
    }

    pub fn position(&self, vertex: NodeId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    pub fn reversed(&self) -> Self {
        Self {
            vertices: self.vertices.iter().rev().copied().collect(),
        }
    }

    /// Edges alternate non-matching/matching, starting with a non-matching edge
    pub fn is_alternating(&self, matching: &Matching) -> bool {
        self.edges()
            .enumerate()
            .all(|(i, edge)| matching.contains_edge(edge) == (i % 2 == 1))
    }

    /// Odd, alternating, and joining two exposed vertices
    pub fn is_augmenting(&self, matching: &Matching) -> bool {
        let (first, last) = self.endpoints();
        self.length() % 2 == 1
            && matching.is_exposed(first)
            && matching.is_exposed(last)
            && self.is_alternating(matching)
    }

    /// Checks every edge of the path against `graph`
    pub fn validate_against(&self, graph: &Graph) -> Result<(), AlgorithmError> {
        match self.edges().find(|edge| !graph.contains_edge(*edge)) {
            Some(missing) => Err(AlgorithmError::EdgeNotFound(missing)),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<NodeId>> for Path {
    type Error = AlgorithmError;

    fn try_from(vertices: Vec<NodeId>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Path> for Vec<NodeId> {
    fn from(path: Path) -> Self {
        path.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[usize]) -> Vec<NodeId> {
        values.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_path_construction() {
        let path = Path::new(ids(&[4, 2, 7])).unwrap();
        assert_eq!(path.length(), 2);
        assert_eq!(path.endpoints(), (NodeId(4), NodeId(7)));
        assert_eq!(path.position(NodeId(2)), Some(1));
        assert_eq!(path.reversed().vertices(), ids(&[7, 2, 4]).as_slice());
        assert_eq!(
            path.edges().collect::<Vec<_>>(),
            vec![Edge::new(NodeId(2), NodeId(4)), Edge::new(NodeId(2), NodeId(7))]
        );

        assert!(Path::new(ids(&[1])).is_err());
        assert!(Path::new(ids(&[1, 2, 1])).is_err());
    }

    #[test]
    fn test_from_edges_recovers_order() {
        let path = Path::from_edges([(3, 4), (1, 2), (2, 3)]).unwrap();
        let forward = ids(&[1, 2, 3, 4]);
        let backward = ids(&[4, 3, 2, 1]);
        assert!(path.vertices() == forward.as_slice() || path.vertices() == backward.as_slice());
    }

    #[test]
    fn test_from_edges_rejects_non_paths() {
        assert!(Path::from_edges([(0, 1), (1, 2), (2, 0)]).is_err());
        assert!(Path::from_edges([(0, 1), (0, 2), (0, 3)]).is_err());
        assert!(Path::from_edges([(0, 1), (2, 3)]).is_err());
        assert!(Path::from_edges([(0, 1), (1, 0)]).is_err());
        assert!(Path::from_edges(Vec::<Edge>::new()).is_err());
    }

    #[test]
    fn test_augmenting_classification() {
        let matching = Matching::from_edges([(1, 2)]).unwrap();

        let augmenting = Path::new(ids(&[0, 1, 2, 3])).unwrap();
        assert!(augmenting.is_alternating(&matching));
        assert!(augmenting.is_augmenting(&matching));

        // Starts on a matched edge
        let wrong_phase = Path::new(ids(&[1, 2, 3])).unwrap();
        assert!(!wrong_phase.is_alternating(&matching));

        // Even length never augments
        let even = Path::new(ids(&[0, 1, 2])).unwrap();
        assert!(!even.is_augmenting(&matching));
    }

    #[test]
    fn test_validate_against_graph() {
        let graph = Graph::from_edges([(0, 1), (1, 2)]).unwrap();
        assert!(Path::new(ids(&[0, 1, 2])).unwrap().validate_against(&graph).is_ok());
        assert_eq!(
            Path::new(ids(&[0, 2])).unwrap().validate_against(&graph),
            Err(AlgorithmError::EdgeNotFound(Edge::new(NodeId(0), NodeId(2))))
        );
    }

    #[test]
    fn test_serde_validates() {
        let path: Path = serde_json::from_str("[0, 1, 2]").unwrap();
        assert_eq!(path.length(), 2);
        assert!(serde_json::from_str::<Path>("[0, 1, 0]").is_err());
    }
}
