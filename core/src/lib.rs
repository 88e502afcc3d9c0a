//! Maximum-cardinality matching in general graphs
//!
//! Implements Edmonds' blossom algorithm over a simple undirected [`Graph`]:
//! alternating forests are grown from every exposed vertex, odd cycles are
//! contracted into pseudo-vertices, and augmenting paths found on the
//! contracted graph are lifted back through each blossom.
//!
//! ```
//! use blossom_core::{find_maximum_matching, Graph, Matching};
//!
//! let graph = Graph::from_edges([(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)])?;
//! let matching = find_maximum_matching(&graph, Matching::new())?;
//! assert_eq!(matching.size(), 2);
//! # Ok::<(), blossom_core::AlgorithmError>(())
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;

pub use crate::algorithm::graph::{
    find_augmenting_path, find_maximum_matching, AugmentingPathSearch, Blossom,
    EdmondsMatching, MatchingConfig, MatchingStatistics, SearchReport,
};
pub use crate::algorithm::traits::{Algorithm, AlgorithmError, ErrorKind, NodeId};
pub use crate::data_structures::{Edge, Graph, Matching, Path};

/// Installs an `env_logger` backend defaulting to the `info` level
///
/// `RUST_LOG` overrides the default. Calling it more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
