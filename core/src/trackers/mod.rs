//! Per-signal timing/load annotations over a network view (C6). Each
//! tracker is a dense `Vec<f64>` indexed by `NodeId`, built in one sweep
//! over the arena; node creation order is already topological (a fanin's
//! `NodeId` always precedes its user's, spec §9 "cyclic graphs and
//! ownership"), so no separate topological sort is needed.

pub mod arrival;
pub mod load;
pub mod required;
pub mod sensing;

pub use arrival::arrival_times;
pub use load::load;
pub use required::required_times;
pub use sensing::sensing_times;

use crate::library::AugmentedLibrary;
use crate::network::{BoundNetwork, NodeId};

/// The average pin delay a gate node presents at fanin position `pin_index`,
/// using output pin 0's binding as the representative gate for timing
/// purposes.
fn input_pin_delay(ntk: &BoundNetwork, library: &AugmentedLibrary, user: NodeId, pin_index: usize) -> f64 {
    let gate_id = ntk.binding(user).gate_id(0);
    library.gate(gate_id).pins[pin_index].avg_delay()
}

fn forward_sweep(
    ntk: &BoundNetwork,
    library: &AugmentedLibrary,
    pi_values: &[f64],
    combine: impl Fn(f64, f64) -> f64,
) -> Vec<f64> {
    let mut values = vec![0.0f64; ntk.num_nodes()];
    let mut pi_index = 0usize;
    for i in 0..ntk.num_nodes() {
        let n = NodeId(i as u32);
        if ntk.is_pi(n) {
            values[i] = pi_values.get(pi_index).copied().unwrap_or(0.0);
            pi_index += 1;
        } else if ntk.is_constant(n) {
            values[i] = 0.0;
        } else if ntk.is_po(n) {
            values[i] = values[ntk.po_driver(n).node().0 as usize];
        } else {
            let fanins: Vec<_> = ntk.foreach_fanin(n).collect();
            let candidates = fanins
                .iter()
                .enumerate()
                .map(|(k, f)| values[f.node().0 as usize] + input_pin_delay(ntk, library, n, k));
            values[i] = candidates.reduce(|a, b| combine(a, b)).unwrap_or(0.0);
        }
    }
    values
}
