//! Chain simulator (C5): topological simulation of a `Chain<B>` over any
//! truth-table representation, given a way to evaluate one gate's binding
//! from its already-simulated fanins. The same `simulate` walk serves both
//! an inner AIG/XAG chain (bindings are `Primitive`s) and a bound chain
//! (bindings are `GateId`s, evaluated by recursing into the library's own
//! inner chain) — composition keeps the outer simulator agnostic of gate
//! count (spec §4.3).

use rinox_truth::TruthTable;

use crate::chain::bound_chain::Chain;
use crate::chain::BoundChain;
use crate::library::{AugmentedLibrary, GateId, Primitive};

/// Simulates `chain`, given already-assigned values for its inputs and a
/// per-gate evaluator. Returns one value per literal: the first
/// `chain.num_inputs()` entries are `inputs` verbatim, followed by one
/// entry per gate in declaration order.
pub fn simulate<B, T: TruthTable>(chain: &Chain<B>, inputs: &[T], mut eval: impl FnMut(&B, &[T]) -> T) -> Vec<T> {
    assert_eq!(inputs.len(), chain.num_inputs(), "input count must match the chain's arity");
    let mut values: Vec<T> = inputs.to_vec();
    for (_, gate) in chain.foreach_gate() {
        let fanin_values: Vec<T> = gate.fanins.iter().map(|lit| values[lit.0].clone()).collect();
        values.push(eval(&gate.binding, &fanin_values));
    }
    values
}

/// Evaluates one AND/XOR primitive from its (already-polarity-resolved at
/// the gate level) operand values. Polarity is absorbed into `Primitive`
/// itself, not a separate inverter literal (spec §3.3).
pub fn eval_primitive<T: TruthTable>(binding: &Primitive, fanins: &[T]) -> T {
    match binding {
        Primitive::And { neg_a, neg_b } => {
            let a = if *neg_a { fanins[0].bit_not() } else { fanins[0].clone() };
            let b = if *neg_b { fanins[1].bit_not() } else { fanins[1].clone() };
            a.bit_and(&b)
        }
        Primitive::Xor => fanins[0].bit_xor(&fanins[1]),
    }
}

/// Simulates an inner AIG/XAG chain directly.
pub fn simulate_inner_chain<T: TruthTable>(chain: &Chain<Primitive>, inputs: &[T]) -> Vec<T> {
    simulate(chain, inputs, |b, f| eval_primitive(b, f))
}

/// Simulates one library gate by composing over its precomputed inner
/// chain, feeding `fanins` as the inner chain's inputs and returning the
/// inner chain's sole output value.
pub fn simulate_gate<T: TruthTable>(gate_id: GateId, fanins: &[T], library: &AugmentedLibrary) -> T {
    let inner = library.inner_chain(gate_id);
    let values = simulate_inner_chain(inner, fanins);
    values[inner.outputs()[0].0].clone()
}

/// Simulates a bound chain (library-gate bindings), composing each gate via
/// its augmented library inner chain.
pub fn simulate_bound_chain<T: TruthTable>(chain: &BoundChain, inputs: &[T], library: &AugmentedLibrary) -> Vec<T> {
    simulate(chain, inputs, |gate_id, fanins| simulate_gate(*gate_id, fanins, library))
}

/// Switching metric (spec §4.3): sum over gate results (excluding the
/// `num_inputs` leading input values) of `ones(sim) * zeros(sim)`, a proxy
/// for dynamic switching activity under a fixed simulation pattern set.
pub fn switching_activity<T: TruthTable>(values: &[T], num_inputs: usize) -> usize {
    values[num_inputs..].iter().map(|t| t.count_ones() * t.count_zeros()).sum()
}
