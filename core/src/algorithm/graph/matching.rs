//! Maximum-cardinality matching driver
//!
//! Repeatedly searches for an augmenting path and augments along it until
//! the search comes back empty. Each augmentation grows the matching by one
//! edge, so the loop runs at most ⌊|V|/2⌋ times, and by Berge's theorem the
//! matching it stops at is maximum.
//!
//! # Configuration
//! Parameters follow the string-map convention of the [`Algorithm`] trait:
//! - `verify_result`: validate the initial matching and every lifted path
//! - `track_statistics`: keep [`MatchingStatistics`] for the last run
//! - `max_augmentations`: `none` or a positive cap on augmentations
//!
//! [`MatchingConfig`] is the serde form of the same parameters.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::augmenting::{AugmentingPathSearch, SearchReport};
use crate::algorithm::traits::{
    Algorithm, AlgorithmComplexity, AlgorithmError, AlgorithmId, AlgorithmMetrics,
    AlgorithmParameter, ParameterType,
};
use crate::data_structures::graph::Graph;
use crate::data_structures::matching::Matching;

// ═══════════════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════════════

const VERIFY_RESULT: &str = "verify_result";
const TRACK_STATISTICS: &str = "track_statistics";
const MAX_AUGMENTATIONS: &str = "max_augmentations";

/// Serializable driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    pub verify_result: bool,
    pub track_statistics: bool,
    /// Stop after this many augmentations, `None` for no limit
    pub max_augmentations: Option<usize>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            verify_result: true,
            track_statistics: true,
            max_augmentations: None,
        }
    }
}

impl MatchingConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        let config: Self = serde_json::from_str(json).map_err(|e| AlgorithmError::InvalidParameter {
            name: "config".into(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlgorithmError> {
        if self.max_augmentations == Some(0) {
            return Err(AlgorithmError::InvalidParameter {
                name: MAX_AUGMENTATIONS.into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    fn to_parameters(&self) -> HashMap<String, String> {
        HashMap::from([
            (VERIFY_RESULT.to_string(), self.verify_result.to_string()),
            (TRACK_STATISTICS.to_string(), self.track_statistics.to_string()),
            (
                MAX_AUGMENTATIONS.to_string(),
                self.max_augmentations
                    .map_or_else(|| "none".to_string(), |cap| cap.to_string()),
            ),
        ])
    }
}

/// Counters collected over one driver run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingStatistics {
    pub searches: usize,
    pub augmentations: usize,
    pub blossoms_contracted: usize,
    /// Most contractions stacked up within a single search
    pub max_contraction_depth: usize,
    pub max_tree_depth: usize,
    pub edges_examined: usize,
    pub matching_size: usize,
    pub execution_time_ms: f64,
}

impl MatchingStatistics {
    fn record(&mut self, report: &SearchReport) {
        self.searches += 1;
        self.blossoms_contracted += report.blossoms_contracted;
        self.max_contraction_depth = self.max_contraction_depth.max(report.blossoms_contracted);
        self.max_tree_depth = self.max_tree_depth.max(report.max_tree_depth);
        self.edges_examined += report.edges_examined;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════════════
// EDMONDS' BLOSSOM ALGORITHM
// ═══════════════════════════════════════════════════════════════════════════════════════

/// Edmonds' blossom algorithm for maximum-cardinality matching
#[derive(Debug, Clone)]
pub struct EdmondsMatching {
    /// Algorithm parameters
    parameters: HashMap<String, String>,

    /// Statistics of the most recent run
    statistics: MatchingStatistics,
}

impl EdmondsMatching {
    pub fn new() -> Self {
        Self {
            parameters: MatchingConfig::default().to_parameters(),
            statistics: MatchingStatistics::default(),
        }
    }

    /// Creates a driver with the given configuration
    pub fn with_config(config: &MatchingConfig) -> Result<Self, AlgorithmError> {
        config.validate()?;
        Ok(Self {
            parameters: config.to_parameters(),
            statistics: MatchingStatistics::default(),
        })
    }

    /// Current parameters as a [`MatchingConfig`]
    pub fn config(&self) -> MatchingConfig {
        MatchingConfig {
            verify_result: self.flag(VERIFY_RESULT, true),
            track_statistics: self.flag(TRACK_STATISTICS, true),
            max_augmentations: self.augmentation_cap(),
        }
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        self.parameters
            .get(name)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    fn augmentation_cap(&self) -> Option<usize> {
        self.parameters
            .get(MAX_AUGMENTATIONS)
            .and_then(|value| value.parse().ok())
    }

    pub fn statistics(&self) -> &MatchingStatistics {
        &self.statistics
    }

    pub fn reset_statistics(&mut self) {
        self.statistics = MatchingStatistics::default();
    }

    /// Grows `initial` into a maximum matching of `graph`
    ///
    /// With a `max_augmentations` cap the result may stop short of maximum.
    pub fn find_maximum_matching(
        &mut self,
        graph: &Graph,
        initial: Matching,
    ) -> Result<Matching, AlgorithmError> {
        let start_time = Instant::now();
        let verify = self.flag(VERIFY_RESULT, true);
        let cap = self.augmentation_cap();

        if verify {
            initial.validate_against(graph)?;
        }

        let mut statistics = MatchingStatistics::default();
        let mut matching = initial;

        loop {
            if cap.map_or(false, |cap| statistics.augmentations >= cap) {
                info!(
                    "stopping at the cap of {} augmentations with matching size {}",
                    statistics.augmentations,
                    matching.size()
                );
                break;
            }

            let report = AugmentingPathSearch::new(graph, &matching)
                .run()
                .map_err(Self::log_failure)?;
            statistics.record(&report);

            let Some(path) = report.path else {
                break;
            };

            if verify {
                if let Err(e) = path.validate_against(graph) {
                    return Err(Self::log_failure(AlgorithmError::MalformedBlossom(format!(
                        "lifted path leaves the graph: {}",
                        e
                    ))));
                }
                if !path.is_augmenting(&matching) {
                    return Err(Self::log_failure(AlgorithmError::MalformedBlossom(format!(
                        "lifted path {:?} is not augmenting",
                        path.vertices()
                    ))));
                }
            }

            matching = matching.augment(&path)?;
            statistics.augmentations += 1;
            debug!(
                "augmented along a path of length {}, matching size now {}",
                path.length(),
                matching.size()
            );
        }

        statistics.matching_size = matching.size();
        statistics.execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        info!(
            "matching of size {} on {} vertices / {} edges: {} augmentations, {} blossoms",
            matching.size(),
            graph.vertex_count(),
            graph.edge_count(),
            statistics.augmentations,
            statistics.blossoms_contracted
        );

        if self.flag(TRACK_STATISTICS, true) {
            self.statistics = statistics;
        }

        Ok(matching)
    }

    fn log_failure(e: AlgorithmError) -> AlgorithmError {
        if e.is_contract_violation() {
            error!("blossom contract violated: {}", e);
        }
        e
    }

    /// Solves independent instances in parallel with this driver's parameters
    ///
    /// Results come back in input order; the receiver's statistics are not
    /// touched.
    pub fn solve_batch(&self, instances: &[(Graph, Matching)]) -> Vec<Result<Matching, AlgorithmError>> {
        instances
            .par_iter()
            .map(|(graph, initial)| {
                let mut solver = Self {
                    parameters: self.parameters.clone(),
                    statistics: MatchingStatistics::default(),
                };
                solver.find_maximum_matching(graph, initial.clone())
            })
            .collect()
    }
}

impl Default for EdmondsMatching {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum matching of `graph` grown from `initial` with default settings
pub fn find_maximum_matching(graph: &Graph, initial: Matching) -> Result<Matching, AlgorithmError> {
    EdmondsMatching::new().find_maximum_matching(graph, initial)
}

// ═══════════════════════════════════════════════════════════════════════════════════════
// ALGORITHM TRAIT IMPLEMENTATION
// ═══════════════════════════════════════════════════════════════════════════════════════

impl Algorithm for EdmondsMatching {
    type Output = Matching;

    fn id(&self) -> AlgorithmId {
        AlgorithmId::new("edmonds_blossom")
    }

    fn name(&self) -> &'static str {
        "Edmonds' Blossom Maximum-Cardinality Matching"
    }

    fn category(&self) -> &'static str {
        "graph_matching"
    }

    fn description(&self) -> String {
        "Maximum-cardinality matching in general graphs. Grows alternating trees from \
         every exposed vertex, contracts odd cycles into pseudo-vertices, and lifts \
         augmenting paths back through the contracted blossoms."
            .to_string()
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(V^2 * E)".to_string(),
            space_complexity: "O(V + E) per contraction level".to_string(),
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        let value = |name: &str| self.parameters.get(name).cloned().unwrap_or_default();
        vec![
            AlgorithmParameter {
                name: VERIFY_RESULT.to_string(),
                value: value(VERIFY_RESULT),
                value_type: ParameterType::Boolean,
                description: "Validate the initial matching and every lifted path".to_string(),
            },
            AlgorithmParameter {
                name: TRACK_STATISTICS.to_string(),
                value: value(TRACK_STATISTICS),
                value_type: ParameterType::Boolean,
                description: "Record statistics for the most recent run".to_string(),
            },
            AlgorithmParameter {
                name: MAX_AUGMENTATIONS.to_string(),
                value: value(MAX_AUGMENTATIONS),
                value_type: ParameterType::Integer,
                description: "Upper bound on augmentations, or none".to_string(),
            },
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            VERIFY_RESULT | TRACK_STATISTICS => match value {
                "true" | "false" => {
                    self.parameters.insert(name.to_string(), value.to_string());
                    Ok(())
                }
                _ => Err(AlgorithmError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("expected true or false, got {}", value),
                }),
            },
            MAX_AUGMENTATIONS => match value.parse::<usize>() {
                _ if value == "none" => {
                    self.parameters.insert(name.to_string(), value.to_string());
                    Ok(())
                }
                Ok(cap) if cap > 0 => {
                    self.parameters.insert(name.to_string(), cap.to_string());
                    Ok(())
                }
                _ => Err(AlgorithmError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("expected none or a positive integer, got {}", value),
                }),
            },
            _ => Err(AlgorithmError::InvalidParameter {
                name: name.to_string(),
                reason: format!(
                    "unknown parameter; valid parameters: {}, {}, {}",
                    VERIFY_RESULT, TRACK_STATISTICS, MAX_AUGMENTATIONS
                ),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    fn execute(&mut self, graph: &Graph, initial: Matching) -> Result<Matching, AlgorithmError> {
        self.find_maximum_matching(graph, initial)
    }

    fn metrics(&self) -> AlgorithmMetrics {
        let stats = &self.statistics;
        AlgorithmMetrics {
            steps_executed: stats.searches,
            nodes_explored: stats.edges_examined,
            execution_time: Duration::from_secs_f64(stats.execution_time_ms / 1000.0),
            custom_metrics: HashMap::from([
                ("augmentations".to_string(), stats.augmentations as f64),
                ("blossoms_contracted".to_string(), stats.blossoms_contracted as f64),
                ("max_contraction_depth".to_string(), stats.max_contraction_depth as f64),
                ("matching_size".to_string(), stats.matching_size as f64),
            ]),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════════════
// UNIT TESTS WITH PROPERTY-BASED VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════════════
