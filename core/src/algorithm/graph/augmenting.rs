//! Augmenting-path search with blossom contraction
//!
//! # Theoretical Foundation
//! By Berge's theorem a matching is maximum iff no augmenting path exists.
//! The search grows an alternating forest from every exposed vertex and
//! scans outer vertices breadth-first. An edge between outer vertices of two
//! different trees closes an augmenting path; an edge between outer vertices
//! of the same tree closes an odd cycle, which is contracted before the
//! search starts over on the smaller graph. A path found after contraction
//! is lifted back through every blossom in reverse order of contraction.
//!
//! # Complexity
//! Each pass scans every edge at most once, and each contraction removes at
//! least two vertices, so a full search is O(V·E).

use std::collections::HashSet;

use log::{debug, trace};

use crate::algorithm::graph::blossom::{Blossom, ContractionStack};
use crate::algorithm::graph::forest::Forest;
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Edge, Graph};
use crate::data_structures::matching::Matching;
use crate::data_structures::path::Path;

/// Result of growing one forest on a single contraction level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// Augmenting path on the level that was searched
    Augmenting(Path),
    /// Odd cycle to contract before searching again
    Blossom(Blossom),
    /// No outer vertex has an unscanned edge left
    Exhausted,
}

/// Per-level search state, discarded when the level is done
#[derive(Debug, Default)]
struct GrowthState {
    forest: Forest,
    /// Edges already scanned on this level
    visited: HashSet<Edge>,
    edges_examined: usize,
}

/// Outcome of a full search plus the work it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Augmenting path over the original graph, if one exists
    pub path: Option<Path>,
    pub blossoms_contracted: usize,
    /// Deepest alternating-tree layer reached on any level
    pub max_tree_depth: usize,
    pub edges_examined: usize,
}

/// Grows one alternating forest over `graph` until it finds a path or a blossom
///
/// Returns the outcome together with the number of edges scanned and the
/// height of the forest at the time the outcome was decided.
pub fn grow_forest(
    graph: &Graph,
    matching: &Matching,
) -> Result<(GrowthOutcome, usize, usize), AlgorithmError> {
    let mut state = GrowthState::default();
    for root in matching.exposed_vertices(graph) {
        state.forest.plant(root)?;
    }
    trace!("planted {} trees", state.forest.tree_count());

    let outcome = scan(graph, matching, &mut state)?;
    Ok((outcome, state.edges_examined, state.forest.height()))
}

fn scan(
    graph: &Graph,
    matching: &Matching,
    state: &mut GrowthState,
) -> Result<GrowthOutcome, AlgorithmError> {
    while let Some(v) = state.forest.next_outer() {
        for &w in graph.neighbors(v)? {
            if !state.visited.insert(Edge::new(v, w)) {
                continue;
            }
            state.edges_examined += 1;

            let forest = &state.forest;
            match forest.tree_of(w) {
                None => match matching.mate(w) {
                    Some(mate) => {
                        trace!("edge ({}, {}): grow through matched pair {}={}", v, w, w, mate);
                        state.forest.grow(v, w, mate)?;
                    }
                    None => {
                        // Not hit while every exposed vertex is planted as a root
                        let mut vertices = forest.tree_containing(v)?.root_path(v)?;
                        vertices.reverse();
                        vertices.push(w);
                        trace!("edge ({}, {}): reached exposed vertex", v, w);
                        return Ok(GrowthOutcome::Augmenting(Path::new(vertices)?));
                    }
                },
                Some(w_tree) if forest.is_outer(w) => {
                    let v_tree = forest.tree_of(v).ok_or(AlgorithmError::VertexNotFound(v))?;
                    if v_tree != w_tree {
                        trace!("edge ({}, {}): joins two trees", v, w);
                        return join_trees(forest, v, w).map(GrowthOutcome::Augmenting);
                    }
                    trace!("edge ({}, {}): closes an odd cycle", v, w);
                    return close_blossom(forest, v, w).map(GrowthOutcome::Blossom);
                }
                Some(_) => {
                    trace!("edge ({}, {}): inner endpoint, skipped", v, w);
                }
            }
        }
    }
    Ok(GrowthOutcome::Exhausted)
}

/// Root of `v`'s tree to `v`, across `(v, w)`, then `w` up to its root
fn join_trees(forest: &Forest, v: NodeId, w: NodeId) -> Result<Path, AlgorithmError> {
    let mut vertices = forest.tree_containing(v)?.root_path(v)?;
    vertices.reverse();
    vertices.extend(forest.tree_containing(w)?.root_path(w)?);
    Path::new(vertices)
}

/// Odd cycle through `(v, w)` based at the lowest common ancestor
fn close_blossom(forest: &Forest, v: NodeId, w: NodeId) -> Result<Blossom, AlgorithmError> {
    let tree = forest.tree_containing(v)?;
    let base = tree.lowest_common_ancestor(v, w)?;

    // w ... base ... v, closed by (v, w); rotate so the base leads
    let mut cycle = tree.path_between(w, v)?;
    let offset = cycle
        .iter()
        .position(|&u| u == base)
        .ok_or(AlgorithmError::VertexNotFound(base))?;
    cycle.rotate_left(offset);

    Blossom::from_cycle(cycle)
}

/// Finds an augmenting path for one matching, contracting blossoms as needed
#[derive(Debug, Clone, Copy)]
pub struct AugmentingPathSearch<'g> {
    graph: &'g Graph,
    matching: &'g Matching,
}

impl<'g> AugmentingPathSearch<'g> {
    pub fn new(graph: &'g Graph, matching: &'g Matching) -> Self {
        Self { graph, matching }
    }

    /// Runs the search to completion
    ///
    /// Each blossom pushes a new level on an explicit contraction stack and
    /// the forest is regrown from scratch on that level. The returned path,
    /// if any, is expressed over the original graph's vertices.
    pub fn run(&self) -> Result<SearchReport, AlgorithmError> {
        let mut stack = ContractionStack::new(self.graph, self.matching);
        let mut edges_examined = 0;
        let mut max_tree_depth = 0;

        loop {
            let (outcome, examined, height) = grow_forest(stack.graph(), stack.matching())?;
            edges_examined += examined;
            max_tree_depth = max_tree_depth.max(height);

            match outcome {
                GrowthOutcome::Augmenting(path) => {
                    let lifted = stack.lift(path)?;
                    debug!(
                        "augmenting path of length {} found after {} contractions",
                        lifted.length(),
                        stack.depth()
                    );
                    return Ok(SearchReport {
                        path: Some(lifted),
                        blossoms_contracted: stack.depth(),
                        max_tree_depth,
                        edges_examined,
                    });
                }
                GrowthOutcome::Blossom(blossom) => {
                    stack.contract(blossom)?;
                }
                GrowthOutcome::Exhausted => {
                    debug!("no augmenting path after {} contractions", stack.depth());
                    return Ok(SearchReport {
                        path: None,
                        blossoms_contracted: stack.depth(),
                        max_tree_depth,
                        edges_examined,
                    });
                }
            }
        }
    }
}

/// Augmenting path for `matching` in `graph`, or `None` if it is maximum
pub fn find_augmenting_path(
    graph: &Graph,
    matching: &Matching,
) -> Result<Option<Path>, AlgorithmError> {
    AugmentingPathSearch::new(graph, matching)
        .run()
        .map(|report| report.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[usize]) -> Vec<NodeId> {
        values.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_single_edge() {
        let graph = Graph::from_edges([(0, 1)]).unwrap();
        let path = find_augmenting_path(&graph, &Matching::new()).unwrap().unwrap();
        assert_eq!(path.vertices(), ids(&[0, 1]).as_slice());
    }

    #[test]
    fn test_path_between_trees() {
        // 0-1=2-3 with the middle edge matched
        let graph = Graph::from_edges([(0, 1), (1, 2), (2, 3)]).unwrap();
        let matching = Matching::from_edges([(1, 2)]).unwrap();

        let report = AugmentingPathSearch::new(&graph, &matching).run().unwrap();
        let path = report.path.unwrap();
        // Root 3 is scanned before outer vertex 2, so the path starts at 3
        assert_eq!(path.vertices(), ids(&[3, 2, 1, 0]).as_slice());
        assert!(path.is_augmenting(&matching));
        assert_eq!(report.blossoms_contracted, 0);
    }

    #[test]
    fn test_grow_forest_reports_blossom() {
        // Triangle 0-1-2 hanging off the tail 2=3-4, with 0=1 matched
        let graph = Graph::from_edges([(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]).unwrap();
        let matching = Matching::from_edges([(0, 1), (2, 3)]).unwrap();

        let (outcome, _, height) = grow_forest(&graph, &matching).unwrap();
        let blossom = Blossom::from_cycle(ids(&[2, 1, 0])).unwrap();
        assert_eq!(outcome, GrowthOutcome::Blossom(blossom));
        assert_eq!(height, 4);
    }

    #[test]
    fn test_blossom_without_path() {
        let graph = Graph::from_edges([(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]).unwrap();
        let matching = Matching::from_edges([(0, 1), (2, 3)]).unwrap();

        let report = AugmentingPathSearch::new(&graph, &matching).run().unwrap();
        assert_eq!(report.path, None);
        assert_eq!(report.blossoms_contracted, 1);
        assert!(report.edges_examined > 0);
    }

    #[test]
    fn test_path_lifted_through_blossom() {
        // Five-cycle 4-1=2-0=3-4 closes first, then 6 reaches its pseudo-vertex
        let graph = Graph::from_edges([(0, 1), (1, 2), (0, 2), (0, 3), (3, 4), (1, 4), (3, 6)])
            .unwrap();
        let matching = Matching::from_edges([(1, 2), (0, 3)]).unwrap();

        let report = AugmentingPathSearch::new(&graph, &matching).run().unwrap();
        let path = report.path.unwrap();
        assert_eq!(report.blossoms_contracted, 1);
        assert_eq!(path.vertices(), ids(&[6, 3, 0, 2, 1, 4]).as_slice());
        assert!(path.is_augmenting(&matching));
        assert!(path.validate_against(&graph).is_ok());
    }

    #[test]
    fn test_nested_blossoms_lift_across_two_levels() {
        // Triangle 0-1-2 (stem 3) nests inside the five-cycle 5-3-*-7-6,
        // and the chain 10-11=12-13=14-15=16 reaches the triangle at 2
        let graph = Graph::from_edges([
            (0, 1), (1, 2), (0, 2), (0, 3), (3, 5), (5, 6), (6, 7), (1, 7),
            (10, 11), (11, 12), (12, 13), (13, 14), (14, 15), (15, 16), (2, 16),
        ])
        .unwrap();
        let matching = Matching::from_edges([
            (0, 3), (1, 2), (6, 7), (11, 12), (13, 14), (15, 16),
        ])
        .unwrap();

        let report = AugmentingPathSearch::new(&graph, &matching).run().unwrap();
        assert_eq!(report.blossoms_contracted, 2);

        let path = report.path.unwrap();
        assert_eq!(
            path.vertices(),
            ids(&[5, 3, 0, 1, 2, 16, 15, 14, 13, 12, 11, 10]).as_slice()
        );
        assert!(path.is_augmenting(&matching));
        assert!(path.validate_against(&graph).is_ok());
    }

    #[test]
    fn test_search_leaves_inputs_untouched() {
        let graph = Graph::from_edges([(0, 1), (1, 2), (0, 2), (2, 3)]).unwrap();
        let matching = Matching::from_edges([(0, 1)]).unwrap();
        let (graph_before, matching_before) = (graph.clone(), matching.clone());

        let _ = find_augmenting_path(&graph, &matching).unwrap();

        assert_eq!(graph, graph_before);
        assert_eq!(matching, matching_before);
        assert!(graph.vertices().all(|v| graph.is_vertex_marked(v) == Ok(false)));
        assert!(graph.edges().all(|e| graph.is_edge_marked(e) == Ok(false)));
    }

    #[test]
    fn test_empty_and_edgeless_graphs() {
        assert_eq!(find_augmenting_path(&Graph::new(), &Matching::new()), Ok(None));

        let mut graph = Graph::new();
        graph.add_vertex(NodeId(4)).unwrap();
        assert_eq!(find_augmenting_path(&graph, &Matching::new()), Ok(None));
    }
}
