use crate::library::AugmentedLibrary;
use crate::network::{BoundNetwork, NodeId};

/// Backward-propagated required times: each node's required time is the
/// tightest constraint imposed by its users, namely the minimum over fanout
/// edges of (user's required time minus that edge's pin delay). Primary
/// outputs are seeded from `output_required`, one entry per PO in
/// `foreach_po` order; unconstrained POs default to `f64::INFINITY`. Required
/// times propagate backward from this global slack budget (spec §4.4), so
/// the sweep runs over node indices in reverse (node creation order is
/// topological, so reverse order is a valid reverse-topological order).
pub fn required_times(ntk: &BoundNetwork, library: &AugmentedLibrary, output_required: &[f64]) -> Vec<f64> {
    let mut values = vec![f64::INFINITY; ntk.num_nodes()];
    for (po, &req) in ntk.foreach_po().zip(output_required.iter()) {
        values[po.0 as usize] = req;
    }

    for i in (0..ntk.num_nodes()).rev() {
        let n = NodeId(i as u32);
        if ntk.is_po(n) {
            let driver = ntk.po_driver(n);
            tighten(&mut values, driver.node(), values[i]);
            continue;
        }
        if !ntk.is_gate(n) {
            continue;
        }
        let fanins: Vec<_> = ntk.foreach_fanin(n).collect();
        for (k, f) in fanins.iter().enumerate() {
            let pin_delay = input_pin_delay(ntk, library, n, k);
            let via_this_edge = values[i] - pin_delay;
            tighten(&mut values, f.node(), via_this_edge);
        }
    }
    values
}

fn tighten(values: &mut [f64], n: NodeId, candidate: f64) {
    let slot = &mut values[n.0 as usize];
    if candidate < *slot {
        *slot = candidate;
    }
}

fn input_pin_delay(ntk: &BoundNetwork, library: &AugmentedLibrary, user: NodeId, pin_index: usize) -> f64 {
    let gate_id = ntk.binding(user).gate_id(0);
    library.gate(gate_id).pins[pin_index].avg_delay()
}
