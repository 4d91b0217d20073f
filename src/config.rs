use serde::{Deserialize, Serialize};

/// How a candidate that fails some example is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScorePolicy {
    /// Stop at the first mismatching example and report its shortfall only.
    #[default]
    FirstMismatch,
    /// Check every example and sum the shortfalls of the mismatching ones.
    Aggregate,
}

/// Search settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Maximum operator count of an enumerated pipeline.
    pub depth: usize,
    /// Stop after this many satisfying expressions.
    pub max_results: usize,
    pub score_policy: ScorePolicy,
    /// Re-check records assembled by the per-field fallback against the
    /// original examples.
    pub verify_union: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            max_results: 1,
            score_policy: ScorePolicy::FirstMismatch,
            verify_union: true,
        }
    }
}

impl SynthConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}
