//! The augmented technology library (C2): per-gate metadata plus a
//! precomputed inner AIG/XAG chain per gate, used by the chain simulator to
//! evaluate a bound gate's effect on a truth table without re-deriving its
//! function from scratch every time.

pub mod gate;

use serde::{Deserialize, Serialize};

use crate::chain::bound_chain::Chain;
pub use gate::{GateFunction, GateId, LibraryGate, Pin};

/// An AND or XOR primitive in a gate's inner decomposition chain. Input
/// polarity is absorbed into the primitive (no separate inverter literal),
/// matching the bound-chain convention that inversion lives in the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    And { neg_a: bool, neg_b: bool },
    Xor,
}

/// A gate's output decomposed into AND/XOR primitives over its own pins,
/// used by the chain simulator to compose bound-gate simulation from
/// primitive operations (spec §3.3, §4.3).
pub type InnerChain = Chain<Primitive>;

/// A technology library together with each gate's inner decomposition
/// chain (spec §3.3 "augmented library").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmentedLibrary {
    gates: Vec<LibraryGate>,
    inner_chains: Vec<InnerChain>,
}

impl AugmentedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a gate together with its inner decomposition chain, returning
    /// the assigned `GateId`.
    pub fn add_gate(&mut self, gate: LibraryGate, inner_chain: InnerChain) -> GateId {
        assert_eq!(
            inner_chain.num_inputs(),
            gate.arity(),
            "inner chain arity must match the gate's pin count"
        );
        assert_eq!(inner_chain.outputs().len(), 1, "a single-output gate binding has one output");
        let id = GateId(self.gates.len());
        self.gates.push(gate);
        self.inner_chains.push(inner_chain);
        id
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn gate(&self, id: GateId) -> &LibraryGate {
        &self.gates[id.0]
    }

    pub fn inner_chain(&self, id: GateId) -> &InnerChain {
        &self.inner_chains[id.0]
    }

    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> {
        (0..self.gates.len()).map(GateId)
    }

    /// All gates sharing a cell name (a multi-output cell's constituent
    /// pins), in declared order.
    pub fn gates_of_cell<'a>(&'a self, cell_name: &'a str) -> impl Iterator<Item = GateId> + 'a {
        self.gate_ids().filter(move |id| self.gate(*id).cell_name == cell_name)
    }
}
