//! Matchings: sets of pairwise vertex-disjoint edges
//!
//! # Invariants
//! 1. **Disjointness**: every vertex is covered by at most one matched edge
//! 2. **Partner symmetry**: `partner(u) = v` iff `partner(v) = u` iff
//!    `{u, v}` is a matched edge
//!
//! All mutating operations that can break an invariant check it first and
//! leave the matching unchanged on error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::blossom::Blossom;
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Edge, Graph};
use crate::data_structures::path::Path;

/// Set of vertex-disjoint edges with O(log n) partner lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Edge>", into = "Vec<Edge>")]
pub struct Matching {
    edges: BTreeSet<Edge>,
    partners: BTreeMap<NodeId, NodeId>,
}

impl Matching {
    /// Creates the empty matching
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matching from an edge list, rejecting shared endpoints
    pub fn from_edges<I, E>(edges: I) -> Result<Self, AlgorithmError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut matching = Self::new();
        for edge in edges {
            matching.add_edge(edge.into())?;
        }
        Ok(matching)
    }

    /// Adds `edge`; both endpoints must currently be exposed
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), AlgorithmError> {
        let (u, v) = edge.endpoints();
        if edge.is_loop() {
            return Err(AlgorithmError::SelfLoop(u));
        }
        for vertex in [u, v] {
            if let Some(&partner) = self.partners.get(&vertex) {
                return Err(AlgorithmError::AlreadyMatched { vertex, partner });
            }
        }

        self.edges.insert(edge);
        self.partners.insert(u, v);
        self.partners.insert(v, u);
        Ok(())
    }

    pub fn remove_edge(&mut self, edge: Edge) -> Result<(), AlgorithmError> {
        if !self.edges.remove(&edge) {
            return Err(AlgorithmError::EdgeNotFound(edge));
        }
        let (u, v) = edge.endpoints();
        self.partners.remove(&u);
        self.partners.remove(&v);
        Ok(())
    }

    /// Partner of `vertex`, failing when it is exposed
    pub fn partner(&self, vertex: NodeId) -> Result<NodeId, AlgorithmError> {
        self.mate(vertex).ok_or(AlgorithmError::Unmatched(vertex))
    }

    /// Partner of `vertex`, if any
    #[inline]
    pub fn mate(&self, vertex: NodeId) -> Option<NodeId> {
        self.partners.get(&vertex).copied()
    }

    /// The matched edge covering `vertex`, if any
    pub fn matched_edge(&self, vertex: NodeId) -> Option<Edge> {
        self.mate(vertex).map(|partner| Edge::new(vertex, partner))
    }

    #[inline]
    pub fn is_exposed(&self, vertex: NodeId) -> bool {
        !self.partners.contains_key(&vertex)
    }

    #[inline]
    pub fn contains_edge(&self, edge: Edge) -> bool {
        self.edges.contains(&edge)
    }

    /// Matched vertices in ascending order
    pub fn covered_vertices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.partners.keys().copied()
    }

    /// Vertices of `graph` the matching leaves exposed, ascending
    pub fn exposed_vertices<'a>(&'a self, graph: &'a Graph) -> impl Iterator<Item = NodeId> + 'a {
        graph.vertices().filter(move |v| self.is_exposed(*v))
    }

    /// Number of matched edges
    #[inline]
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Matched edges in canonical order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().copied()
    }

    /// Symmetric difference with the edges of `path`
    ///
    /// Along an augmenting path this grows the matching by one edge. Any
    /// other path is accepted as long as the result is still a matching;
    /// when it is not, the error names a vertex left with two partners.
    pub fn augment(&self, path: &Path) -> Result<Matching, AlgorithmError> {
        let mut edges = self.edges.clone();
        for edge in path.edges() {
            if !edges.remove(&edge) {
                edges.insert(edge);
            }
        }

        let mut partners = BTreeMap::new();
        for edge in &edges {
            let (u, v) = edge.endpoints();
            for (vertex, other) in [(u, v), (v, u)] {
                if let Some(partner) = partners.insert(vertex, other) {
                    return Err(AlgorithmError::AlreadyMatched { vertex, partner });
                }
            }
        }

        Ok(Matching { edges, partners })
    }

    /// Projects the matching onto the graph with `blossom` contracted into `pseudo`
    ///
    /// Edges inside the cycle disappear and the base's outside edge (its
    /// stem), if any, is re-attached to `pseudo`. Only the base may be
    /// matched to a vertex off the cycle.
    pub fn contract_blossom(
        &self,
        blossom: &Blossom,
        pseudo: NodeId,
    ) -> Result<Matching, AlgorithmError> {
        let base = blossom.base();
        let mut contracted = Matching::new();

        for edge in self.edges() {
            let (u, v) = edge.endpoints();
            match (blossom.contains(u), blossom.contains(v)) {
                (true, true) => {}
                (false, false) => contracted.add_edge(edge)?,
                (true, false) | (false, true) => {
                    let (inside, outside) = if blossom.contains(u) { (u, v) } else { (v, u) };
                    if inside != base {
                        return Err(AlgorithmError::InvalidBlossom(format!(
                            "non-base cycle vertex {} is matched to {} outside the cycle",
                            inside, outside
                        )));
                    }
                    contracted.add_edge(Edge::new(pseudo, outside))?;
                }
            }
        }

        Ok(contracted)
    }

    /// Checks that every matched edge is an edge of `graph`
    pub fn validate_against(&self, graph: &Graph) -> Result<(), AlgorithmError> {
        match self.edges().find(|edge| !graph.contains_edge(*edge)) {
            Some(missing) => Err(AlgorithmError::EdgeNotFound(missing)),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<Edge>> for Matching {
    type Error = AlgorithmError;

    fn try_from(edges: Vec<Edge>) -> Result<Self, Self::Error> {
        Self::from_edges(edges)
    }
}

impl From<Matching> for Vec<Edge> {
    fn from(matching: Matching) -> Self {
        matching.edges.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(values: &[usize]) -> Path {
        Path::new(values.iter().copied().map(NodeId).collect()).unwrap()
    }

    fn assert_partner_symmetry(matching: &Matching) {
        for edge in matching.edges() {
            let (u, v) = edge.endpoints();
            assert_eq!(matching.mate(u), Some(v));
            assert_eq!(matching.mate(v), Some(u));
        }
        assert_eq!(matching.covered_vertices().count(), 2 * matching.size());
    }

    #[test]
    fn test_add_and_remove() {
        let mut matching = Matching::new();
        matching.add_edge(Edge::new(NodeId(1), NodeId(2))).unwrap();

        assert_eq!(matching.partner(NodeId(2)), Ok(NodeId(1)));
        assert_eq!(matching.partner(NodeId(3)), Err(AlgorithmError::Unmatched(NodeId(3))));
        assert_eq!(matching.matched_edge(NodeId(1)), Some(Edge::new(NodeId(1), NodeId(2))));
        assert!(matching.is_exposed(NodeId(0)));

        assert_eq!(
            matching.add_edge(Edge::new(NodeId(2), NodeId(3))),
            Err(AlgorithmError::AlreadyMatched { vertex: NodeId(2), partner: NodeId(1) })
        );
        assert_eq!(matching.size(), 1);

        matching.remove_edge(Edge::new(NodeId(2), NodeId(1))).unwrap();
        assert!(matching.is_empty());
        assert!(matching.is_exposed(NodeId(1)));
        assert!(matches!(
            matching.remove_edge(Edge::new(NodeId(1), NodeId(2))),
            Err(AlgorithmError::EdgeNotFound(_))
        ));
    }

    #[test]
    fn test_augment_along_path() {
        let matching = Matching::from_edges([(1, 2), (3, 4)]).unwrap();
        let augmented = matching.augment(&path(&[0, 1, 2, 3, 4, 5])).unwrap();

        assert_eq!(augmented.size(), 3);
        assert_eq!(
            augmented.edges().collect::<Vec<_>>(),
            [(0, 1), (2, 3), (4, 5)].map(Edge::from).to_vec()
        );
        assert_partner_symmetry(&augmented);

        // The receiver is untouched
        assert_eq!(matching.size(), 2);
    }

    #[test]
    fn test_augment_rejects_conflicts() {
        let matching = Matching::from_edges([(1, 2)]).unwrap();
        let result = matching.augment(&path(&[2, 3]));
        assert!(matches!(result, Err(AlgorithmError::AlreadyMatched { .. })));
    }

    #[test]
    fn test_contract_blossom_moves_stem() {
        let matching = Matching::from_edges([(0, 3), (1, 2), (5, 6)]).unwrap();
        let blossom = Blossom::from_cycle(vec![NodeId(0), NodeId(1), NodeId(2)]).unwrap();

        let contracted = matching.contract_blossom(&blossom, NodeId(9)).unwrap();
        assert_eq!(
            contracted.edges().collect::<Vec<_>>(),
            [(3, 9), (5, 6)].map(Edge::from).to_vec()
        );
        assert_partner_symmetry(&contracted);
    }

    #[test]
    fn test_contract_blossom_rejects_non_base_stem() {
        let matching = Matching::from_edges([(1, 3)]).unwrap();
        let blossom = Blossom::from_cycle(vec![NodeId(0), NodeId(1), NodeId(2)]).unwrap();
        assert!(matches!(
            matching.contract_blossom(&blossom, NodeId(9)),
            Err(AlgorithmError::InvalidBlossom(_))
        ));
    }

    #[test]
    fn test_exposed_vertices_and_validation() {
        let graph = Graph::from_edges([(0, 1), (1, 2), (2, 3)]).unwrap();
        let matching = Matching::from_edges([(1, 2)]).unwrap();

        assert_eq!(
            matching.exposed_vertices(&graph).collect::<Vec<_>>(),
            vec![NodeId(0), NodeId(3)]
        );
        assert!(matching.validate_against(&graph).is_ok());

        let foreign = Matching::from_edges([(0, 3)]).unwrap();
        assert_eq!(
            foreign.validate_against(&graph),
            Err(AlgorithmError::EdgeNotFound(Edge::new(NodeId(0), NodeId(3))))
        );
    }

    #[test]
    fn test_serde_rejects_overlap() {
        let matching: Matching = serde_json::from_str("[[0,1],[2,3]]").unwrap();
        assert_eq!(matching.size(), 2);
        assert_eq!(serde_json::to_string(&matching).unwrap(), "[[0,1],[2,3]]");
        assert!(serde_json::from_str::<Matching>("[[0,1],[1,2]]").is_err());
    }
}
