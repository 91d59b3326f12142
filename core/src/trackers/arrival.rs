use crate::library::AugmentedLibrary;
use crate::network::BoundNetwork;

use super::forward_sweep;

/// Forward-propagated arrival times: each gate's arrival is the latest of
/// its fanins' arrivals plus the corresponding input pin delay (spec §4.4).
pub fn arrival_times(ntk: &BoundNetwork, library: &AugmentedLibrary, input_arrivals: &[f64]) -> Vec<f64> {
    forward_sweep(ntk, library, input_arrivals, f64::max)
}
