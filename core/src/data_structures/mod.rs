//! Graph, matching and path containers
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod matching;
pub mod path;

pub use self::graph::{Edge, Graph, GraphRecord};
pub use self::matching::Matching;
pub use self::path::Path;
