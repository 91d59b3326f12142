use hashbrown::HashMap;

use crate::library::{AugmentedLibrary, GateId};
use rinox_util::diagnostics::Diagnostics;

use crate::network::{BoundNetwork, Signal};

use super::bound_chain::Literal;
use super::BoundChain;

/// Builds fresh nodes in `ntk` by walking `chain` in declaration order,
/// substituting `inputs[k]` for input literal `k` (spec §4.2). Two or more
/// gates that share both their fanins and their library `cell_name` are
/// distinct output pins of one multi-output cell (`LibraryGate`'s own
/// doc comment: "multiple `LibraryGate`s sharing a `cell_name` model a
/// multi-output cell"), and are realized as a single `create_node` call
/// with one `GateId` per pin rather than one node per gate. Duplicate
/// `(binding_ids, fanins)` keys within the inserted chain are structurally
/// hashed to a single node.
pub fn insert(
    ntk: &mut BoundNetwork,
    inputs: &[Signal],
    chain: &BoundChain,
    library: &AugmentedLibrary,
    diag: &dyn Diagnostics,
) -> Signal {
    let values = insert_values(ntk, inputs, chain, library, diag);
    let output = chain.outputs()[0];
    values[output.0].expect("output literal must already be assigned")
}

/// Like `insert`, but returns every one of `chain`'s declared outputs rather
/// than only the first. A chain whose outputs all land on the same physical
/// node (the multi-output-cell scenario of spec §8) yields signals that
/// share a `node()` and differ only in `pin()`.
pub fn insert_all(
    ntk: &mut BoundNetwork,
    inputs: &[Signal],
    chain: &BoundChain,
    library: &AugmentedLibrary,
    diag: &dyn Diagnostics,
) -> Vec<Signal> {
    let values = insert_values(ntk, inputs, chain, library, diag);
    chain
        .outputs()
        .iter()
        .map(|o| values[o.0].expect("output literal must already be assigned"))
        .collect()
}

fn insert_values(
    ntk: &mut BoundNetwork,
    inputs: &[Signal],
    chain: &BoundChain,
    library: &AugmentedLibrary,
    diag: &dyn Diagnostics,
) -> Vec<Option<Signal>> {
    assert_eq!(inputs.len(), chain.num_inputs(), "input count must match the chain's arity");

    let mut values: Vec<Option<Signal>> = vec![None; chain.num_inputs() + chain.num_gates()];
    for (i, &s) in inputs.iter().enumerate() {
        values[i] = Some(s);
    }
    let mut struct_hash: HashMap<(Vec<GateId>, Vec<Signal>), Signal> = HashMap::new();

    for (lit, gate) in chain.foreach_gate() {
        if values[lit.0].is_some() {
            continue;
        }
        let fanins: Vec<Signal> = gate.fanins.iter().map(|l| values[l.0].expect("fanin must already be assigned")).collect();
        let cell_name = library.gate(gate.binding).cell_name.clone();

        let mut group: Vec<(Literal, GateId)> = vec![(lit, gate.binding)];
        for (other_lit, other_gate) in chain.foreach_gate() {
            if other_lit.0 <= lit.0 || values[other_lit.0].is_some() || other_gate.binding == gate.binding {
                continue;
            }
            if library.gate(other_gate.binding).cell_name != cell_name {
                continue;
            }
            let other_fanins: Vec<Signal> =
                other_gate.fanins.iter().map(|l| values[l.0].expect("fanin must already be assigned")).collect();
            if other_fanins == fanins {
                group.push((other_lit, other_gate.binding));
            }
        }

        let binding_ids: Vec<GateId> = group.iter().map(|&(_, g)| g).collect();
        let key = (binding_ids.clone(), fanins.clone());
        let node = match struct_hash.get(&key) {
            Some(sig) => sig.node(),
            None => {
                let sig0 = ntk.create_node(fanins.clone(), binding_ids.clone(), library, diag);
                struct_hash.insert(key, sig0);
                sig0.node()
            }
        };
        for (pin, &(member_lit, _)) in group.iter().enumerate() {
            values[member_lit.0] = Some(Signal::new(node, pin as u8));
        }
    }

    values
}
