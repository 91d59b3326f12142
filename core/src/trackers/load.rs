use crate::library::AugmentedLibrary;
use crate::network::{BoundNetwork, NodeId, Signal};

/// For each node's pin-0 output, the sum of input capacitances of its live
/// fanouts (spec §4.4). Uses the same representative-gate simplification as
/// `arrival_times`/`sensing_times` for which pin's capacitance table to read.
pub fn load(ntk: &BoundNetwork, library: &AugmentedLibrary) -> Vec<f64> {
    let mut values = vec![0.0f64; ntk.num_nodes()];
    for i in 0..ntk.num_nodes() {
        let n = NodeId(i as u32);
        if !ntk.is_gate(n) && !ntk.is_pi(n) && !ntk.is_constant(n) {
            continue;
        }
        let sig = Signal::new(n, 0);
        let mut total = 0.0;
        for &user in ntk.fanout(n, 0) {
            if !ntk.is_gate(user) {
                continue;
            }
            let fanins: Vec<_> = ntk.foreach_fanin(user).collect();
            if let Some(slot) = fanins.iter().position(|f| *f == sig) {
                total += input_pin_capacitance(ntk, library, user, slot);
            }
        }
        values[i] = total;
    }
    values
}

fn input_pin_capacitance(ntk: &BoundNetwork, library: &AugmentedLibrary, user: NodeId, pin_index: usize) -> f64 {
    let gate_id = ntk.binding(user).gate_id(0);
    library.gate(gate_id).pins[pin_index].avg_capacitance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{GateFunction, GateId, InnerChain, LibraryGate, Pin, Primitive};
    use crate::chain::{ChainGate, Literal};
    use rinox_truth::TruthTable;
    use rinox_util::diagnostics::NullDiagnostics;

    fn and2_library() -> AugmentedLibrary {
        let mut lib = AugmentedLibrary::new();
        let a = GateFunction::nth_var(2, 0);
        let b = GateFunction::nth_var(2, 1);
        let pin = Pin {
            name: "a".into(),
            rise_delay: 1.0,
            fall_delay: 1.0,
            rise_capacitance: 0.2,
            fall_capacitance: 0.2,
        };
        let gate = LibraryGate::new("and2", 1.0, 2, a.bit_and(&b), vec![pin.clone(), pin]);
        let inner = InnerChain::new(
            2,
            vec![ChainGate {
                fanins: vec![Literal(0), Literal(1)],
                binding: Primitive::And { neg_a: false, neg_b: false },
            }],
            vec![Literal(2)],
        );
        lib.add_gate(gate, inner);
        lib
    }

    #[test]
    fn load_sums_fanout_pin_capacitances() {
        let lib = and2_library();
        let diag = NullDiagnostics;
        let mut ntk = BoundNetwork::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        ntk.create_node(vec![a, b], vec![GateId(0)], &lib, &diag);

        let loads = load(&ntk, &lib);
        assert_eq!(loads[a.node().0 as usize], 0.2);
        assert_eq!(loads[b.node().0 as usize], 0.2);
    }
}
