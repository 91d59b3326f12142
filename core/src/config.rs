//! Resynthesis configuration: the numeric and boolean knobs consumed by the
//! window manager, dependency finder, decomposer and driver (spec §6.3).

use serde::{Deserialize, Serialize};

use rinox_util::diagnostics::Diagnostics;

/// How the database matches a query function against stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchingMode {
    Boolean,
    Structural,
    Hybrid,
}

impl Default for MatchingMode {
    fn default() -> Self {
        MatchingMode::Boolean
    }
}

impl MatchingMode {
    /// Parses a matching mode from a configuration string. Unknown values
    /// are rejected with a `Warning` diagnostic and fall back to
    /// `MatchingMode::Boolean` (design note (c)).
    pub fn parse(s: &str, diag: &dyn Diagnostics) -> Self {
        match s {
            "boolean" => MatchingMode::Boolean,
            "structural" => MatchingMode::Structural,
            "hybrid" => MatchingMode::Hybrid,
            other => {
                diag.warning(&format!(
                    "unknown matching mode {other:?}, defaulting to \"boolean\""
                ));
                MatchingMode::Boolean
            }
        }
    }
}

/// Either a numeric slack budget or an explicitly unconstrained ("INF")
/// output required time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RequiredTime {
    Bounded(f64),
    Inf,
}

impl RequiredTime {
    pub fn value(&self) -> f64 {
        match self {
            RequiredTime::Bounded(v) => *v,
            RequiredTime::Inf => f64::INFINITY,
        }
    }
}

/// All knobs the driver, window manager, dependency finder and decomposer
/// read from. Defaults match `default_resynthesis_params` in the original
/// source's resynthesis algorithm header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResynthesisConfig {
    pub max_num_leaves: usize,
    pub max_num_divisors: usize,
    pub max_cuts_size: usize,
    pub max_cube_spfd: usize,
    pub odc_levels: usize,
    pub fanout_limit: usize,
    pub skip_fanout_limit_for_divisors: usize,
    pub preserve_depth: bool,
    pub try_rewire: bool,
    pub try_struct: bool,
    pub try_window: bool,
    pub try_simula: bool,
    pub dynamic_database: bool,
    pub max_num_roots: usize,
    pub matching_mode: MatchingMode,
    pub input_arrivals: Vec<f64>,
    pub output_required: Vec<RequiredTime>,
    pub eps: f64,
}

impl Default for ResynthesisConfig {
    fn default() -> Self {
        Self {
            max_num_leaves: 12,
            max_num_divisors: 128,
            max_cuts_size: 6,
            max_cube_spfd: 12,
            odc_levels: 0,
            fanout_limit: 12,
            skip_fanout_limit_for_divisors: 100,
            preserve_depth: false,
            try_rewire: true,
            try_struct: true,
            try_window: true,
            try_simula: false,
            dynamic_database: true,
            max_num_roots: usize::MAX,
            matching_mode: MatchingMode::Boolean,
            input_arrivals: Vec::new(),
            output_required: Vec::new(),
            eps: 1e-6,
        }
    }
}
