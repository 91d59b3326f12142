use crate::library::AugmentedLibrary;
use crate::network::BoundNetwork;

use super::forward_sweep;

/// Forward-propagated sensing times: like `arrival_times`, but takes the
/// minimum instead of the maximum over fanins, estimating the earliest
/// possible glitch rather than the worst-case stable arrival (spec §4.4).
pub fn sensing_times(ntk: &BoundNetwork, library: &AugmentedLibrary, input_arrivals: &[f64]) -> Vec<f64> {
    forward_sweep(ntk, library, input_arrivals, f64::min)
}
