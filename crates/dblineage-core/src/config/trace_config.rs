//! Column usage tracer configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the usage tracer's heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TraceConfig {
    /// Lines on each side of a match used for context checks. Default: 5.
    pub context_radius: Option<usize>,
    /// Lines on each side of a match kept as the stored snippet. Default: 2.
    pub snippet_radius: Option<usize>,
    /// Max characters of a stored snippet. Default: 500.
    pub snippet_max_chars: Option<usize>,
    /// Max characters of a stored context window. Default: 1000.
    pub context_max_chars: Option<usize>,
    /// Variants shorter than this are never indexed. Default: 2.
    pub min_variant_len: Option<usize>,
    /// Indexed variants shorter than this never match. Default: 4.
    pub min_match_len: Option<usize>,
    /// Column names at least this long match without table context. Default: 5.
    pub distinctive_name_len: Option<usize>,
    /// Trace files in parallel. Default: true.
    pub parallel: Option<bool>,
}

impl TraceConfig {
    pub fn effective_context_radius(&self) -> usize {
        self.context_radius.unwrap_or(5)
    }

    pub fn effective_snippet_radius(&self) -> usize {
        self.snippet_radius.unwrap_or(2)
    }

    pub fn effective_snippet_max_chars(&self) -> usize {
        self.snippet_max_chars.unwrap_or(500)
    }

    pub fn effective_context_max_chars(&self) -> usize {
        self.context_max_chars.unwrap_or(1000)
    }

    pub fn effective_min_variant_len(&self) -> usize {
        self.min_variant_len.unwrap_or(2)
    }

    pub fn effective_min_match_len(&self) -> usize {
        self.min_match_len.unwrap_or(4)
    }

    pub fn effective_distinctive_name_len(&self) -> usize {
        self.distinctive_name_len.unwrap_or(5)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}
