//! Bounded text rendering of the loaded dataset for the reasoning service.

pub mod builder;

use serde::{Deserialize, Serialize};

pub use builder::{build_context, build_glossary_context, build_main_context, SearchContext};

/// Size bounds applied when rendering context and stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    /// Character cap on the rendered sheets
    pub main_context_chars: usize,
    /// Character cap on the rendered glossary
    pub glossary_context_chars: usize,
    pub sample_rows: usize,
    pub max_formulas: usize,
    pub max_concepts: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            main_context_chars: 4000,
            glossary_context_chars: 1000,
            sample_rows: 5,
            max_formulas: 10,
            max_concepts: 20,
        }
    }
}
