//! Matching algorithms on general graphs
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod forest;
pub mod blossom;
pub mod augmenting;
pub mod matching;

pub use self::forest::{AlternatingTree, Forest};
pub use self::blossom::{lift_path, Blossom, ContractionRecord, ContractionStack};
pub use self::augmenting::{
    find_augmenting_path, grow_forest, AugmentingPathSearch, GrowthOutcome, SearchReport,
};
pub use self::matching::{
    find_maximum_matching, EdmondsMatching, MatchingConfig, MatchingStatistics,
};
