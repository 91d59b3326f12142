use rinox_truth::Permutation;

use crate::library::AugmentedLibrary;

use super::bound_chain::{Chain, ChainGate, Literal};
use super::BoundChain;

/// Renames input literals of `chain` by `perm.inverse()`, so that
/// re-simulating the result with inputs given in canonical order yields the
/// function's canonical truth table (spec §4.2). Gate-result literals are
/// untouched; only references to inputs are relabeled.
pub fn perm_canonize<B: Clone>(chain: &Chain<B>, perm: &Permutation) -> Chain<B> {
    let inv = perm.inverse();
    relabel_inputs(chain, &inv)
}

fn relabel_inputs<B: Clone>(chain: &Chain<B>, perm: &Permutation) -> Chain<B> {
    let remap = |lit: Literal| -> Literal {
        if chain.is_input(lit) {
            Literal(perm.image(lit.0))
        } else {
            lit
        }
    };
    let gates = chain
        .gates()
        .iter()
        .map(|g| ChainGate {
            fanins: g.fanins.iter().map(|&l| remap(l)).collect(),
            binding: g.binding.clone(),
        })
        .collect();
    let outputs = chain.outputs().iter().map(|&l| remap(l)).collect();
    Chain::new(chain.num_inputs(), gates, outputs)
}

/// For each literal of `chain`, the longest accumulated average-delay path
/// from that literal to any chain output, computed via a reverse
/// topological sweep (spec §4.2's `get_longest_paths`). Index `i < num_inputs`
/// gives input `i`'s criticality; later entries give each gate's.
pub fn get_longest_paths(chain: &BoundChain, library: &AugmentedLibrary) -> Vec<f64> {
    let mut dist = vec![0.0f64; chain.num_inputs() + chain.num_gates()];
    for (lit, gate) in chain.foreach_gate_rev() {
        let delay = library.gate(gate.binding).avg_delay();
        let downstream = dist[lit.0];
        for fanin in &gate.fanins {
            let candidate = downstream + delay;
            if candidate > dist[fanin.0] {
                dist[fanin.0] = candidate;
            }
        }
    }
    dist.truncate(chain.num_inputs());
    dist
}

/// Among inputs that are functionally symmetric (each inner `Vec<usize>` of
/// `symmetry_groups` names a group of interchangeable input positions),
/// permutes `chain`'s inputs so the most timing-critical input of each
/// group (by `get_longest_paths`) lands on the group's lowest-indexed
/// ("fastest") position. A pure reordering: the chain's Boolean function is
/// unchanged (spec §4.2).
pub fn time_canonize(
    chain: &BoundChain,
    library: &AugmentedLibrary,
    symmetry_groups: &[Vec<usize>],
) -> (BoundChain, Permutation) {
    let criticality = get_longest_paths(chain, library);
    let mut image: Vec<usize> = (0..chain.num_inputs()).collect();
    for group in symmetry_groups {
        let mut positions = group.clone();
        positions.sort_unstable();
        let mut by_criticality = group.clone();
        by_criticality.sort_by(|&a, &b| criticality[b].partial_cmp(&criticality[a]).unwrap());
        for (&slot, &input) in positions.iter().zip(by_criticality.iter()) {
            image[input] = slot;
        }
    }
    let perm = Permutation::from_image(image);
    (relabel_inputs(chain, &perm), perm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{GateFunction, InnerChain, LibraryGate, Pin, Primitive};
    use rinox_truth::TruthTable;

    fn and2_library() -> AugmentedLibrary {
        let mut lib = AugmentedLibrary::new();
        let a = GateFunction::nth_var(2, 0);
        let b = GateFunction::nth_var(2, 1);
        let pin = Pin {
            name: "a".into(),
            rise_delay: 1.0,
            fall_delay: 1.0,
            rise_capacitance: 0.1,
            fall_capacitance: 0.1,
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

    fn and_chain() -> BoundChain {
        Chain::new(
            2,
            vec![ChainGate {
                fanins: vec![Literal(0), Literal(1)],
                binding: crate::library::GateId(0),
            }],
            vec![Literal(2)],
        )
    }

    #[test]
    fn perm_canonize_swaps_input_references() {
        let chain = and_chain();
        let swap = Permutation::from_image(vec![1, 0]);
        let swapped = perm_canonize(&chain, &swap);
        assert_eq!(swapped.gate(Literal(2)).fanins, vec![Literal(1), Literal(0)]);
    }

    #[test]
    fn longest_paths_reach_every_input_through_the_single_gate() {
        let lib = and2_library();
        let chain = and_chain();
        let paths = get_longest_paths(&chain, &lib);
        assert_eq!(paths, vec![1.0, 1.0]);
    }

    #[test]
    fn time_canonize_is_identity_on_an_already_symmetric_and() {
        let lib = and2_library();
        let chain = and_chain();
        let (canon, perm) = time_canonize(&chain, &lib, &[vec![0, 1]]);
        assert_eq!(perm.image(0), 0);
        assert_eq!(perm.image(1), 1);
        assert_eq!(canon, chain);
    }
}
