//! Undirected simple graph with per-run marks and blossom contraction
//!
//! This module implements the adjacency structure the matching algorithms
//! operate on. Vertices and edges live in ordered collections so every
//! listing operation, and every search driven by one, is deterministic.
//!
//! # Invariants
//! 1. **Symmetry**: `v ∈ adj(u)` iff `u ∈ adj(v)`
//! 2. **Simplicity**: no self-loops, no parallel edges
//! 3. **Mark domain**: the vertex mark table covers exactly the vertex set and
//!    the edge mark table covers exactly the edge set
//! 4. **Identifier watermark**: `next_id` is strictly greater than every
//!    vertex id ever inserted, so freshly allocated pseudo-vertices never
//!    collide with a live or previously contracted vertex

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::blossom::Blossom;
use crate::algorithm::traits::{AlgorithmError, NodeId};

/// Unordered pair of distinct vertices, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId)", into = "(NodeId, NodeId)")]
pub struct Edge {
    low: NodeId,
    high: NodeId,
}

impl Edge {
    /// Creates the canonical edge between `a` and `b`, in either order
    #[inline]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[inline]
    pub fn low(&self) -> NodeId {
        self.low
    }

    #[inline]
    pub fn high(&self) -> NodeId {
        self.high
    }

    #[inline]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.low, self.high)
    }

    #[inline]
    pub fn contains(&self, vertex: NodeId) -> bool {
        self.low == vertex || self.high == vertex
    }

    /// The endpoint opposite `vertex`, if `vertex` is an endpoint
    pub fn other(&self, vertex: NodeId) -> Option<NodeId> {
        if vertex == self.low {
            Some(self.high)
        } else if vertex == self.high {
            Some(self.low)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((a, b): (NodeId, NodeId)) -> Self {
        Self::new(a, b)
    }
}

impl From<(usize, usize)> for Edge {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(NodeId(a), NodeId(b))
    }
}

impl From<Edge> for (NodeId, NodeId) {
    fn from(edge: Edge) -> Self {
        edge.endpoints()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Simple undirected graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord", into = "GraphRecord")]
pub struct Graph {
    /// Adjacency sets keyed by vertex
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Vertex marks, default unmarked
    vertex_marks: BTreeMap<NodeId, bool>,

    /// Edge marks; the key set doubles as the edge set
    edge_marks: BTreeMap<Edge, bool>,

    /// Smallest id guaranteed unused by this graph and its ancestors
    next_id: usize,
}

/// Serialized form of a [`Graph`]: vertex list plus edge list, marks omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    pub vertices: Vec<NodeId>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from an edge list, inserting endpoints as needed
    pub fn from_edges<I, E>(edges: I) -> Result<Self, AlgorithmError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            let edge = edge.into();
            graph.add_edge(edge.low(), edge.high())?;
        }
        Ok(graph)
    }

    /// Adds an isolated vertex
    pub fn add_vertex(&mut self, vertex: NodeId) -> Result<(), AlgorithmError> {
        if self.adjacency.contains_key(&vertex) {
            return Err(AlgorithmError::VertexExists(vertex));
        }
        self.insert_vertex(vertex)
    }

    /// Watermark after admitting `vertex`; the top id is reserved
    fn watermark_with(&self, vertex: NodeId) -> Result<usize, AlgorithmError> {
        vertex
            .0
            .checked_add(1)
            .map(|bound| self.next_id.max(bound))
            .ok_or(AlgorithmError::IdOverflow(vertex))
    }

    fn insert_vertex(&mut self, vertex: NodeId) -> Result<(), AlgorithmError> {
        self.next_id = self.watermark_with(vertex)?;
        self.adjacency.entry(vertex).or_default();
        self.vertex_marks.entry(vertex).or_insert(false);
        Ok(())
    }

    /// Removes a vertex together with its incident edges and their marks
    pub fn remove_vertex(&mut self, vertex: NodeId) -> Result<(), AlgorithmError> {
        let neighbors = self
            .adjacency
            .remove(&vertex)
            .ok_or(AlgorithmError::VertexNotFound(vertex))?;

        for neighbor in neighbors {
            if let Some(adjacent) = self.adjacency.get_mut(&neighbor) {
                adjacent.remove(&vertex);
            }
            self.edge_marks.remove(&Edge::new(vertex, neighbor));
        }
        self.vertex_marks.remove(&vertex);

        Ok(())
    }

    /// Adds the edge `{u, v}`; missing endpoints are inserted
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<Edge, AlgorithmError> {
        if u == v {
            return Err(AlgorithmError::SelfLoop(u));
        }
        let edge = Edge::new(u, v);
        if self.edge_marks.contains_key(&edge) {
            return Err(AlgorithmError::EdgeExists(edge));
        }
        // Both ids are checked before either endpoint is inserted
        self.watermark_with(edge.high())?;

        self.insert_vertex(u)?;
        self.insert_vertex(v)?;
        self.adjacency.entry(u).or_default().insert(v);
        self.adjacency.entry(v).or_default().insert(u);
        self.edge_marks.insert(edge, false);

        Ok(edge)
    }

    /// Removes the edge `{u, v}`, keeping both endpoints
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<(), AlgorithmError> {
        let edge = Edge::new(u, v);
        if self.edge_marks.remove(&edge).is_none() {
            return Err(AlgorithmError::EdgeNotFound(edge));
        }
        if let Some(adjacent) = self.adjacency.get_mut(&u) {
            adjacent.remove(&v);
        }
        if let Some(adjacent) = self.adjacency.get_mut(&v) {
            adjacent.remove(&u);
        }
        Ok(())
    }

    /// Neighbors of `vertex` in ascending order
    pub fn neighbors(&self, vertex: NodeId) -> Result<&BTreeSet<NodeId>, AlgorithmError> {
        self.adjacency
            .get(&vertex)
            .ok_or(AlgorithmError::VertexNotFound(vertex))
    }

    pub fn degree(&self, vertex: NodeId) -> Result<usize, AlgorithmError> {
        self.neighbors(vertex).map(BTreeSet::len)
    }

    #[inline]
    pub fn contains_vertex(&self, vertex: NodeId) -> bool {
        self.adjacency.contains_key(&vertex)
    }

    #[inline]
    pub fn contains_edge(&self, edge: Edge) -> bool {
        self.edge_marks.contains_key(&edge)
    }

    #[inline]
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.contains_edge(Edge::new(u, v))
    }

    /// Vertices in ascending order
    pub fn vertices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Edges in canonical order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edge_marks.keys().copied()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_marks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// An id not used by this graph or any graph it was contracted from
    #[inline]
    pub fn next_vertex_id(&self) -> NodeId {
        NodeId(self.next_id)
    }

    pub fn mark_vertex(&mut self, vertex: NodeId, mark: bool) -> Result<(), AlgorithmError> {
        let slot = self
            .vertex_marks
            .get_mut(&vertex)
            .ok_or(AlgorithmError::VertexNotFound(vertex))?;
        *slot = mark;
        Ok(())
    }

    pub fn is_vertex_marked(&self, vertex: NodeId) -> Result<bool, AlgorithmError> {
        self.vertex_marks
            .get(&vertex)
            .copied()
            .ok_or(AlgorithmError::VertexNotFound(vertex))
    }

    pub fn mark_edge(&mut self, edge: Edge, mark: bool) -> Result<(), AlgorithmError> {
        let slot = self
            .edge_marks
            .get_mut(&edge)
            .ok_or(AlgorithmError::EdgeNotFound(edge))?;
        *slot = mark;
        Ok(())
    }

    pub fn is_edge_marked(&self, edge: Edge) -> Result<bool, AlgorithmError> {
        self.edge_marks
            .get(&edge)
            .copied()
            .ok_or(AlgorithmError::EdgeNotFound(edge))
    }

    /// First unmarked edge incident to `vertex`, as the opposite endpoint
    pub fn unmarked_neighbor(&self, vertex: NodeId) -> Result<Option<NodeId>, AlgorithmError> {
        Ok(self
            .neighbors(vertex)?
            .iter()
            .copied()
            .find(|&u| !self.edge_marks.get(&Edge::new(vertex, u)).copied().unwrap_or(false)))
    }

    /// Clears every vertex and edge mark
    pub fn unmark_all(&mut self) {
        self.vertex_marks.values_mut().for_each(|mark| *mark = false);
        self.edge_marks.values_mut().for_each(|mark| *mark = false);
    }

    /// Collapses the blossom's cycle into a single pseudo-vertex
    ///
    /// Returns the contracted graph and the id of the pseudo-vertex. Every
    /// edge from a cycle vertex to an outside vertex `u` becomes `(p, u)`;
    /// edges with both endpoints on the cycle disappear. `self` is left
    /// untouched and the contracted graph starts with all marks cleared.
    pub fn contract_blossom(&self, blossom: &Blossom) -> Result<(Graph, NodeId), AlgorithmError> {
        for vertex in blossom.cycle() {
            if !self.contains_vertex(*vertex) {
                return Err(AlgorithmError::InvalidBlossom(format!(
                    "vertex {} is not in the graph",
                    vertex
                )));
            }
        }
        if let Some(missing) = blossom.edges().find(|edge| !self.contains_edge(*edge)) {
            return Err(AlgorithmError::InvalidBlossom(format!(
                "cycle edge {} is not in the graph",
                missing
            )));
        }

        let pseudo = self.next_vertex_id();
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(AlgorithmError::IdOverflow(pseudo))?;
        let mut contracted = Graph {
            next_id,
            ..Graph::default()
        };

        for vertex in self.vertices().filter(|v| !blossom.contains(*v)) {
            contracted.insert_vertex(vertex)?;
        }
        contracted.insert_vertex(pseudo)?;

        for edge in self.edges() {
            let (u, v) = edge.endpoints();
            match (blossom.contains(u), blossom.contains(v)) {
                (false, false) => {
                    contracted.add_edge(u, v)?;
                }
                (true, false) => {
                    if !contracted.has_edge(pseudo, v) {
                        contracted.add_edge(pseudo, v)?;
                    }
                }
                (false, true) => {
                    if !contracted.has_edge(pseudo, u) {
                        contracted.add_edge(pseudo, u)?;
                    }
                }
                (true, true) => {}
            }
        }

        Ok((contracted, pseudo))
    }
}

impl PartialEq for Graph {
    /// Structural equality; marks and the id watermark are ignored
    fn eq(&self, other: &Self) -> bool {
        self.adjacency == other.adjacency
    }
}

impl Eq for Graph {}

impl From<Graph> for GraphRecord {
    fn from(graph: Graph) -> Self {
        Self {
            vertices: graph.vertices().collect(),
            edges: graph.edges().collect(),
        }
    }
}

impl TryFrom<GraphRecord> for Graph {
    type Error = AlgorithmError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let mut graph = Graph::new();
        for vertex in record.vertices {
            graph.insert_vertex(vertex)?;
        }
        for edge in record.edges {
            graph.add_edge(edge.low(), edge.high())?;
        }
        Ok(graph)
    }
}
