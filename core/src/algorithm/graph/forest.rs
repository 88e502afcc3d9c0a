//! Alternating trees and the forest grown by one search pass
//!
//! # Theoretical Foundation
//! Every tree is rooted at a vertex exposed by the current matching. A
//! vertex's root path alternates non-matching/matching edges starting from
//! the root, so its layer parity tells which kind of edge leads to it:
//! outer (even layer) vertices are reached over a matching edge, or are the
//! root, and inner (odd layer) vertices over a non-matching edge.
//!
//! # Invariants
//! - Trees of one forest are vertex-disjoint
//! - Inner vertices always have exactly one child, their partner
//! - Outer vertices are handed out for scanning in the order they became
//!   outer

use std::collections::{HashMap, VecDeque};

use crate::algorithm::traits::{AlgorithmError, NodeId};

/// Rooted tree with parent pointers and per-vertex layer
#[derive(Debug, Clone)]
pub struct AlternatingTree {
    root: NodeId,
    /// Parent of every non-root vertex
    parents: HashMap<NodeId, NodeId>,
    layers: HashMap<NodeId, usize>,
}

impl AlternatingTree {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            parents: HashMap::new(),
            layers: HashMap::from([(root, 0)]),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn contains(&self, vertex: NodeId) -> bool {
        self.layers.contains_key(&vertex)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Hangs `child` below `parent`
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), AlgorithmError> {
        let parent_layer = self.layer(parent).ok_or(AlgorithmError::VertexNotFound(parent))?;
        if self.contains(child) {
            return Err(AlgorithmError::VertexExists(child));
        }
        self.parents.insert(child, parent);
        self.layers.insert(child, parent_layer + 1);
        Ok(())
    }

    #[inline]
    pub fn parent(&self, vertex: NodeId) -> Option<NodeId> {
        self.parents.get(&vertex).copied()
    }

    #[inline]
    pub fn layer(&self, vertex: NodeId) -> Option<usize> {
        self.layers.get(&vertex).copied()
    }

    pub fn is_outer(&self, vertex: NodeId) -> bool {
        self.layer(vertex).map_or(false, |layer| layer % 2 == 0)
    }

    pub fn is_inner(&self, vertex: NodeId) -> bool {
        self.layer(vertex).map_or(false, |layer| layer % 2 == 1)
    }

    /// Deepest layer in the tree
    pub fn height(&self) -> usize {
        self.layers.values().copied().max().unwrap_or(0)
    }

    /// Vertices from `vertex` up to and including the root
    pub fn root_path(&self, vertex: NodeId) -> Result<Vec<NodeId>, AlgorithmError> {
        let layer = self.layer(vertex).ok_or(AlgorithmError::VertexNotFound(vertex))?;
        let mut path = Vec::with_capacity(layer + 1);
        let mut current = vertex;
        path.push(current);
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        Ok(path)
    }

    /// Deepest vertex that is an ancestor of both `a` and `b`
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Result<NodeId, AlgorithmError> {
        let mut a_layer = self.layer(a).ok_or(AlgorithmError::VertexNotFound(a))?;
        let mut b_layer = self.layer(b).ok_or(AlgorithmError::VertexNotFound(b))?;
        let (mut a, mut b) = (a, b);

        while a_layer > b_layer {
            a = self.climb(a)?;
            a_layer -= 1;
        }
        while b_layer > a_layer {
            b = self.climb(b)?;
            b_layer -= 1;
        }
        while a != b {
            a = self.climb(a)?;
            b = self.climb(b)?;
        }
        Ok(a)
    }

    fn climb(&self, vertex: NodeId) -> Result<NodeId, AlgorithmError> {
        self.parent(vertex).ok_or(AlgorithmError::VertexNotFound(vertex))
    }

    /// Tree path from `a` to `b` through their lowest common ancestor
    pub fn path_between(&self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>, AlgorithmError> {
        let ancestor = self.lowest_common_ancestor(a, b)?;
        let mut path: Vec<NodeId> = self
            .root_path(a)?
            .into_iter()
            .take_while(|&v| v != ancestor)
            .collect();
        path.push(ancestor);
        let mut descent: Vec<NodeId> = self
            .root_path(b)?
            .into_iter()
            .take_while(|&v| v != ancestor)
            .collect();
        descent.reverse();
        path.extend(descent);
        Ok(path)
    }
}

/// Vertex-disjoint alternating trees plus the queue of outer vertices to scan
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: Vec<AlternatingTree>,
    membership: HashMap<NodeId, usize>,
    pending_outer: VecDeque<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new singleton tree at an exposed vertex
    pub fn plant(&mut self, root: NodeId) -> Result<usize, AlgorithmError> {
        if self.membership.contains_key(&root) {
            return Err(AlgorithmError::VertexExists(root));
        }
        let index = self.trees.len();
        self.trees.push(AlternatingTree::new(root));
        self.membership.insert(root, index);
        self.pending_outer.push_back(root);
        Ok(index)
    }

    /// Index of the tree holding `vertex`
    #[inline]
    pub fn tree_of(&self, vertex: NodeId) -> Option<usize> {
        self.membership.get(&vertex).copied()
    }

    /// The tree holding `vertex`
    pub fn tree_containing(&self, vertex: NodeId) -> Result<&AlternatingTree, AlgorithmError> {
        self.tree_of(vertex)
            .and_then(|index| self.trees.get(index))
            .ok_or(AlgorithmError::VertexNotFound(vertex))
    }

    #[inline]
    pub fn contains(&self, vertex: NodeId) -> bool {
        self.membership.contains_key(&vertex)
    }

    pub fn is_outer(&self, vertex: NodeId) -> bool {
        self.tree_containing(vertex)
            .map_or(false, |tree| tree.is_outer(vertex))
    }

    pub fn is_inner(&self, vertex: NodeId) -> bool {
        self.tree_containing(vertex)
            .map_or(false, |tree| tree.is_inner(vertex))
    }

    #[inline]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Deepest layer over all trees
    pub fn height(&self) -> usize {
        self.trees.iter().map(AlternatingTree::height).max().unwrap_or(0)
    }

    /// Extends the tree of outer vertex `outer` by the non-matching edge
    /// `(outer, inner)` and the matching edge `(inner, mate)`
    ///
    /// `mate` becomes outer and is queued for scanning.
    pub fn grow(&mut self, outer: NodeId, inner: NodeId, mate: NodeId) -> Result<(), AlgorithmError> {
        let index = self.tree_of(outer).ok_or(AlgorithmError::VertexNotFound(outer))?;
        for vertex in [inner, mate] {
            if self.contains(vertex) {
                return Err(AlgorithmError::VertexExists(vertex));
            }
        }
        if !self.trees[index].is_outer(outer) {
            return Err(AlgorithmError::InvalidPath(format!(
                "cannot grow from inner vertex {}",
                outer
            )));
        }

        let tree = &mut self.trees[index];
        tree.attach(inner, outer)?;
        tree.attach(mate, inner)?;
        self.membership.insert(inner, index);
        self.membership.insert(mate, index);
        self.pending_outer.push_back(mate);
        Ok(())
    }

    /// Next outer vertex to scan, in the order vertices became outer
    #[inline]
    pub fn next_outer(&mut self) -> Option<NodeId> {
        self.pending_outer.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root 0 with branches 0-1=2-3=4 and 0-5=6
    fn sample_tree() -> AlternatingTree {
        let mut tree = AlternatingTree::new(NodeId(0));
        for (child, parent) in [(1, 0), (2, 1), (3, 2), (4, 3), (5, 0), (6, 5)] {
            tree.attach(NodeId(child), NodeId(parent)).unwrap();
        }
        tree
    }

    #[test]
    fn test_layers_and_parity() {
        let tree = sample_tree();

        assert_eq!(tree.layer(NodeId(0)), Some(0));
        assert_eq!(tree.layer(NodeId(4)), Some(4));
        assert!(tree.is_outer(NodeId(0)));
        assert!(tree.is_outer(NodeId(6)));
        assert!(tree.is_inner(NodeId(3)));
        assert!(!tree.is_outer(NodeId(9)));
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_attach_rejects_bad_input() {
        let mut tree = sample_tree();
        assert_eq!(tree.attach(NodeId(2), NodeId(0)), Err(AlgorithmError::VertexExists(NodeId(2))));
        assert_eq!(tree.attach(NodeId(8), NodeId(9)), Err(AlgorithmError::VertexNotFound(NodeId(9))));
    }

    #[test]
    fn test_root_path_and_ancestors() {
        let tree = sample_tree();

        assert_eq!(
            tree.root_path(NodeId(4)).unwrap(),
            vec![NodeId(4), NodeId(3), NodeId(2), NodeId(1), NodeId(0)]
        );
        assert_eq!(tree.root_path(NodeId(0)).unwrap(), vec![NodeId(0)]);
        assert!(tree.root_path(NodeId(7)).is_err());

        assert_eq!(tree.lowest_common_ancestor(NodeId(4), NodeId(6)), Ok(NodeId(0)));
        assert_eq!(tree.lowest_common_ancestor(NodeId(4), NodeId(2)), Ok(NodeId(2)));
        assert_eq!(tree.lowest_common_ancestor(NodeId(3), NodeId(3)), Ok(NodeId(3)));

        assert_eq!(
            tree.path_between(NodeId(4), NodeId(6)).unwrap(),
            vec![NodeId(4), NodeId(3), NodeId(2), NodeId(1), NodeId(0), NodeId(5), NodeId(6)]
        );
        assert_eq!(
            tree.path_between(NodeId(2), NodeId(4)).unwrap(),
            vec![NodeId(2), NodeId(3), NodeId(4)]
        );
    }

    #[test]
    fn test_forest_growth_and_queue_order() {
        let mut forest = Forest::new();
        assert_eq!(forest.plant(NodeId(0)), Ok(0));
        assert_eq!(forest.plant(NodeId(7)), Ok(1));
        assert!(forest.plant(NodeId(7)).is_err());

        assert_eq!(forest.next_outer(), Some(NodeId(0)));
        forest.grow(NodeId(0), NodeId(1), NodeId(2)).unwrap();

        assert_eq!(forest.tree_of(NodeId(2)), Some(0));
        assert!(forest.is_inner(NodeId(1)));
        assert!(forest.is_outer(NodeId(2)));
        assert!(!forest.contains(NodeId(3)));
        assert_eq!(forest.height(), 2);

        // Roots first, then vertices in the order they became outer
        assert_eq!(forest.next_outer(), Some(NodeId(7)));
        assert_eq!(forest.next_outer(), Some(NodeId(2)));
        assert_eq!(forest.next_outer(), None);
    }

    #[test]
    fn test_grow_rejects_invalid_extensions() {
        let mut forest = Forest::new();
        forest.plant(NodeId(0)).unwrap();
        forest.plant(NodeId(5)).unwrap();
        forest.grow(NodeId(0), NodeId(1), NodeId(2)).unwrap();

        // Already in the forest
        assert!(forest.grow(NodeId(2), NodeId(5), NodeId(6)).is_err());
        // Inner vertices do not grow
        assert!(forest.grow(NodeId(1), NodeId(3), NodeId(4)).is_err());
        // Not in the forest at all
        assert!(forest.grow(NodeId(9), NodeId(3), NodeId(4)).is_err());
        assert_eq!(forest.tree_count(), 2);
    }
}
