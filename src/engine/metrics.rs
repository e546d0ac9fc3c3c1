//! Extraction run metrics.
//!
//! The intended usage is:
//!
//! - `Extractor::extract` for normal operation.
//! - `Extractor::extract_with_metrics` for profiling, debugging grammars, and
//!   inspecting how much backtracking an input caused.
//!
//! Collecting counters is cheap (the matcher always keeps them); only timing
//! and the result bundle are specific to the metrics path.

use std::time::Duration;

use super::matcher::MatchStats;
use crate::api::Match;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    /// Total elapsed time for the extraction call.
    pub total: Duration,
    /// Start positions attempted.
    pub positions: usize,
    /// Rule nodes entered by the matcher.
    pub node_visits: usize,
    /// Alternatives that failed and made the matcher try the next one.
    pub backtracks: usize,
    /// Match candidates dropped because a transform rejected their text.
    pub transform_rejections: usize,
    /// Branches cut by the left-recursion guard.
    pub recursion_cuts: usize,
}

impl RunMetrics {
    pub(crate) fn absorb(&mut self, stats: MatchStats) {
        self.node_visits += stats.node_visits;
        self.backtracks += stats.backtracks;
        self.transform_rejections += stats.transform_rejections;
        self.recursion_cuts += stats.recursion_cuts;
    }
}

/// Extractor output bundled with run metrics.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub matches: Vec<Match>,
    pub metrics: RunMetrics,
}
