use hashbrown::HashMap;

use crate::library::GateId;
use crate::network::{BoundNetwork, Signal};

use super::bound_chain::{Chain, ChainGate, Literal};
use super::BoundChain;

/// A reference to a not-yet-numbered chain value: either one of the
/// (possibly still growing) input slots, or the output of a gate already
/// emitted during this extraction. Kept distinct from `Literal` because the
/// final input count — and hence the input/gate literal split point — is
/// only known once the whole cone has been walked.
#[derive(Clone, Copy)]
enum Ref {
    Input(usize),
    Gate(usize),
}

struct Extractor<'a> {
    ntk: &'a BoundNetwork,
    inputs: Vec<Signal>,
    memo: HashMap<Signal, Ref>,
    gates: Vec<(Vec<Ref>, GateId)>,
}

impl<'a> Extractor<'a> {
    fn visit(&mut self, sig: Signal) -> Option<Ref> {
        if let Some(&r) = self.memo.get(&sig) {
            return Some(r);
        }
        if let Some(idx) = self.inputs.iter().position(|s| *s == sig) {
            let r = Ref::Input(idx);
            self.memo.insert(sig, r);
            return Some(r);
        }
        let node = sig.node();
        if self.ntk.is_pi(node) || self.ntk.is_constant(node) {
            // A network boundary reached without being declared as an
            // input: extend the input set rather than fail, so a caller
            // that under-specified `inputs` for a leaf still gets a usable
            // chain (the window manager's own leaves always cover this).
            let idx = self.inputs.len();
            self.inputs.push(sig);
            let r = Ref::Input(idx);
            self.memo.insert(sig, r);
            return Some(r);
        }
        if !self.ntk.is_gate(node) {
            // Reached a PO or otherwise non-combinational boundary mid-cone:
            // dangling reference, extraction fails.
            return None;
        }
        let fanins: Vec<Signal> = self.ntk.foreach_fanin(node).collect();
        let fanin_refs: Vec<Ref> = fanins
            .into_iter()
            .map(|f| self.visit(f))
            .collect::<Option<Vec<_>>>()?;
        let gate_id = self.ntk.binding(node).gate_id(sig.pin());
        let gate_index = self.gates.len();
        self.gates.push((fanin_refs, gate_id));
        let r = Ref::Gate(gate_index);
        self.memo.insert(sig, r);
        Some(r)
    }

    fn finish(self, output: Ref) -> (BoundChain, Vec<Signal>) {
        let num_inputs = self.inputs.len();
        let to_literal = |r: Ref| match r {
            Ref::Input(i) => Literal(i),
            Ref::Gate(i) => Literal(num_inputs + i),
        };
        let gates = self
            .gates
            .into_iter()
            .map(|(refs, binding)| ChainGate {
                fanins: refs.into_iter().map(to_literal).collect(),
                binding,
            })
            .collect();
        let chain = Chain::new(num_inputs, gates, vec![to_literal(output)]);
        (chain, self.inputs)
    }
}

/// Extracts the transitive fanin cone of `root`, bounded by `inputs`, into
/// a `BoundChain` (spec §4.2). Returns the chain together with the final
/// (possibly input-set-extended) signal-to-input-literal mapping, or `None`
/// if the cone reaches a non-combinational boundary (a PO) before any
/// input or PI.
pub fn extract(ntk: &BoundNetwork, inputs: &[Signal], root: Signal) -> Option<(BoundChain, Vec<Signal>)> {
    let mut extractor = Extractor {
        ntk,
        inputs: inputs.to_vec(),
        memo: HashMap::new(),
        gates: Vec::new(),
    };
    let output = extractor.visit(root)?;
    Some(extractor.finish(output))
}
