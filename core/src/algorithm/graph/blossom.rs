//! Blossoms and path lifting
//!
//! A blossom is an odd cycle found while growing an alternating tree: a
//! search edge joins two outer vertices of the same tree, and the cycle runs
//! from their lowest common ancestor (the *base*) down to one of them, across
//! the edge, and back up to the base. Contracting it lets the search continue
//! on a smaller graph; lifting re-expands any path that crosses the
//! pseudo-vertex into a path through the cycle.
//!
//! # Cycle layout
//! A [`Blossom`] stores its vertices in cycle order starting at the base:
//! `c0 = base, c1, ..., c2k`. With respect to the matching of the level it
//! was found on, the edges `(c1,c2), (c3,c4), ...` are matched and the base is
//! matched only outside the cycle (or exposed). From the base, both arcs to
//! any `cj` start with a non-matching edge, and the one with an even number
//! of edges ends with a matching edge, which is what makes it the arc to
//! splice into an alternating path.
//!
//! # Nesting
//! Blossoms discovered on an already contracted graph may contain earlier
//! pseudo-vertices. [`ContractionStack`] keeps every level's graph and
//! matching together with a record per contraction, and lifts a path from
//! the innermost level outward.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Edge, Graph};
use crate::data_structures::matching::Matching;
use crate::data_structures::path::Path;

/// Odd cycle with a distinguished base vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blossom {
    /// Cycle order, `cycle[0]` is the base
    cycle: Vec<NodeId>,
    members: BTreeSet<NodeId>,
}

impl Blossom {
    /// Builds a blossom from vertices listed in cycle order, base first
    pub fn from_cycle(cycle: Vec<NodeId>) -> Result<Self, AlgorithmError> {
        if cycle.len() < 3 || cycle.len() % 2 == 0 {
            return Err(AlgorithmError::InvalidBlossom(format!(
                "a blossom needs an odd cycle of at least 3 vertices, got {}",
                cycle.len()
            )));
        }

        let members: BTreeSet<NodeId> = cycle.iter().copied().collect();
        if members.len() != cycle.len() {
            return Err(AlgorithmError::InvalidBlossom(
                "cycle visits a vertex more than once".into(),
            ));
        }

        Ok(Self { cycle, members })
    }

    /// Builds a blossom from an unordered edge set and its base
    ///
    /// The edges must form exactly one simple cycle of odd length that
    /// passes through `base`.
    pub fn from_edges<I>(edges: I, base: NodeId) -> Result<Self, AlgorithmError>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut incidence: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for edge in edges {
            if edge.is_loop() || !seen.insert(edge) {
                return Err(AlgorithmError::InvalidBlossom(format!(
                    "edge {} is a loop or repeated",
                    edge
                )));
            }
            let (u, v) = edge.endpoints();
            incidence.entry(u).or_default().push(v);
            incidence.entry(v).or_default().push(u);
        }

        if let Some((vertex, _)) = incidence.iter().find(|(_, adjacent)| adjacent.len() != 2) {
            return Err(AlgorithmError::InvalidBlossom(format!(
                "vertex {} does not have exactly two cycle edges",
                vertex
            )));
        }
        let first_step = incidence
            .get(&base)
            .and_then(|adjacent| adjacent.first().copied())
            .ok_or_else(|| {
                AlgorithmError::InvalidBlossom(format!("base {} is not on the cycle", base))
            })?;

        // Walk the cycle from the base; a shortfall means several components
        let mut cycle = vec![base];
        let mut previous = base;
        let mut current = first_step;
        while current != base {
            cycle.push(current);
            let adjacent = &incidence[&current];
            let next = if adjacent[0] == previous { adjacent[1] } else { adjacent[0] };
            previous = current;
            current = next;
        }

        if cycle.len() != incidence.len() {
            return Err(AlgorithmError::InvalidBlossom(
                "edge set splits into more than one cycle".into(),
            ));
        }

        Self::from_cycle(cycle)
    }

    #[inline]
    pub fn base(&self) -> NodeId {
        self.cycle[0]
    }

    /// Vertices in cycle order, base first
    #[inline]
    pub fn cycle(&self) -> &[NodeId] {
        &self.cycle
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cycle.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cycle.is_empty()
    }

    #[inline]
    pub fn contains(&self, vertex: NodeId) -> bool {
        self.members.contains(&vertex)
    }

    pub fn vertices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    /// Cycle edges, closing edge last
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let n = self.cycle.len();
        (0..n).map(move |i| Edge::new(self.cycle[i], self.cycle[(i + 1) % n]))
    }

    /// The even-length arc from `vertex` back to the base, `vertex` first
    pub fn even_arc_to_base(&self, vertex: NodeId) -> Option<Vec<NodeId>> {
        let index = self.cycle.iter().position(|&v| v == vertex)?;
        if index % 2 == 0 {
            // c_index, c_index-1, ..., c0
            Some(self.cycle[..=index].iter().rev().copied().collect())
        } else {
            // c_index, c_index+1, ..., c2k, c0
            let mut arc: Vec<NodeId> = self.cycle[index..].to_vec();
            arc.push(self.base());
            Some(arc)
        }
    }
}

/// Expands the pseudo-vertex of one contraction inside `path`
///
/// `graph` and `matching` describe the level the blossom was found on;
/// `path` lives on the contracted level. Paths that avoid `pseudo` come back
/// unchanged.
pub fn lift_path(
    graph: &Graph,
    matching: &Matching,
    blossom: &Blossom,
    pseudo: NodeId,
    path: Path,
) -> Result<Path, AlgorithmError> {
    let Some(index) = path.position(pseudo) else {
        return Ok(path);
    };

    let vertices = path.vertices();
    let base = blossom.base();
    let stem = matching.mate(base);
    let before = index.checked_sub(1).map(|i| vertices[i]);
    let after = vertices.get(index + 1).copied();

    // The neighbor reached over a non-matching edge, and whether it precedes p
    let (exit, exit_precedes) = match (before, after) {
        (Some(b), Some(a)) => {
            let stem = stem.ok_or_else(|| {
                AlgorithmError::MalformedBlossom(format!(
                    "pseudo-vertex {} is interior to the path but base {} is exposed",
                    pseudo, base
                ))
            })?;
            if b == stem {
                (a, false)
            } else if a == stem {
                (b, true)
            } else {
                return Err(AlgorithmError::MalformedBlossom(format!(
                    "neither path neighbor of {} is the stem {} of base {}",
                    pseudo, stem, base
                )));
            }
        }
        (Some(neighbor), None) | (None, Some(neighbor)) => {
            if let Some(stem) = stem {
                return Err(AlgorithmError::MalformedBlossom(format!(
                    "pseudo-vertex {} ends the path but base {} is matched to {}",
                    pseudo, base, stem
                )));
            }
            (neighbor, before.is_some())
        }
        (None, None) => {
            return Err(AlgorithmError::MalformedBlossom(format!(
                "path through {} has no edges",
                pseudo
            )));
        }
    };

    let entry = blossom
        .cycle()
        .iter()
        .copied()
        .find(|&v| graph.has_edge(v, exit))
        .ok_or_else(|| {
            AlgorithmError::MalformedBlossom(format!(
                "no blossom vertex is adjacent to exit neighbor {}",
                exit
            ))
        })?;
    let mut arc = blossom.even_arc_to_base(entry).ok_or_else(|| {
        AlgorithmError::MalformedBlossom(format!("entry {} is not on the cycle", entry))
    })?;
    if !exit_precedes {
        arc.reverse();
    }

    debug!(
        "lifting {} through blossom at base {}: exit {} enters at {} over {} cycle edges",
        pseudo,
        base,
        exit,
        entry,
        arc.len() - 1
    );

    let mut lifted = Vec::with_capacity(vertices.len() + arc.len());
    lifted.extend_from_slice(&vertices[..index]);
    lifted.extend(arc);
    lifted.extend_from_slice(&vertices[index + 1..]);

    Path::new(lifted).map_err(|e| AlgorithmError::MalformedBlossom(e.to_string()))
}

/// One contraction performed during a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionRecord {
    pub blossom: Blossom,
    pub pseudo: NodeId,
    /// Index of the level the blossom was found on
    pub level: usize,
}

/// Graph and matching of one contraction level
#[derive(Debug, Clone)]
struct ContractionLevel<'g> {
    graph: Cow<'g, Graph>,
    matching: Cow<'g, Matching>,
}

/// Explicit stack of contraction levels, level 0 borrowing the caller's data
#[derive(Debug, Clone)]
pub struct ContractionStack<'g> {
    levels: Vec<ContractionLevel<'g>>,
    records: Vec<ContractionRecord>,
}

impl<'g> ContractionStack<'g> {
    pub fn new(graph: &'g Graph, matching: &'g Matching) -> Self {
        Self {
            levels: vec![ContractionLevel {
                graph: Cow::Borrowed(graph),
                matching: Cow::Borrowed(matching),
            }],
            records: Vec::new(),
        }
    }

    /// Graph of the innermost level
    pub fn graph(&self) -> &Graph {
        &self.innermost().graph
    }

    /// Matching of the innermost level
    pub fn matching(&self) -> &Matching {
        &self.innermost().matching
    }

    fn innermost(&self) -> &ContractionLevel<'g> {
        // levels is never empty: new() seeds level 0 and nothing pops
        &self.levels[self.levels.len() - 1]
    }

    /// Number of contractions performed so far
    #[inline]
    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ContractionRecord] {
        &self.records
    }

    /// Contracts `blossom` on the innermost level and pushes the result
    pub fn contract(&mut self, blossom: Blossom) -> Result<NodeId, AlgorithmError> {
        let level = self.levels.len() - 1;
        let current = self.innermost();
        let (graph, pseudo) = current.graph.contract_blossom(&blossom)?;
        let matching = current.matching.contract_blossom(&blossom, pseudo)?;

        debug!(
            "contracted blossom of {} vertices at base {} into {} (level {} -> {}, {} vertices left)",
            blossom.len(),
            blossom.base(),
            pseudo,
            level,
            level + 1,
            graph.vertex_count()
        );

        self.records.push(ContractionRecord { blossom, pseudo, level });
        self.levels.push(ContractionLevel {
            graph: Cow::Owned(graph),
            matching: Cow::Owned(matching),
        });
        Ok(pseudo)
    }

    /// Lifts a path found on the innermost level back to level 0
    pub fn lift(&self, path: Path) -> Result<Path, AlgorithmError> {
        self.records.iter().rev().try_fold(path, |path, record| {
            let level = &self.levels[record.level];
            lift_path(
                &level.graph,
                &level.matching,
                &record.blossom,
                record.pseudo,
                path,
            )
        })
    }
}
