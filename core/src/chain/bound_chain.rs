use serde::{Deserialize, Serialize};

/// A small integer identifying either a chain input or a gate's result.
/// Values `0..num_inputs` denote inputs; values `>= num_inputs` denote the
/// output of gate `value - num_inputs`, in declaration order (spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal(pub usize);

/// One gate of a chain: its fanin literals and the binding that realizes
/// it. `B` is `GateId` for a bound chain (§3.2/§3.3) or a primitive AND/XOR
/// operation for an inner decomposition chain (§3.3's "inner XAG chain").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainGate<B> {
    pub fanins: Vec<Literal>,
    pub binding: B,
}

/// A linear, index-list encoding of a small mapped subnetwork (spec §3.2).
/// Chains are immutable once built, cheap to copy, and carry no separate
/// inverter nodes — any needed polarity is absorbed into the gate binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain<B> {
    num_inputs: usize,
    gates: Vec<ChainGate<B>>,
    outputs: Vec<Literal>,
}

impl<B> Chain<B> {
    pub fn new(num_inputs: usize, gates: Vec<ChainGate<B>>, outputs: Vec<Literal>) -> Self {
        let chain = Self {
            num_inputs,
            gates,
            outputs,
        };
        chain.check_well_formed();
        chain
    }

    fn check_well_formed(&self) {
        let total = self.num_inputs + self.gates.len();
        for (i, gate) in self.gates.iter().enumerate() {
            for fanin in &gate.fanins {
                assert!(
                    fanin.0 < self.num_inputs + i,
                    "gate {i} fans into a literal that has not been defined yet"
                );
            }
        }
        for output in &self.outputs {
            assert!(output.0 < total, "output literal out of range");
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn gates(&self) -> &[ChainGate<B>] {
        &self.gates
    }

    pub fn outputs(&self) -> &[Literal] {
        &self.outputs
    }

    pub fn is_input(&self, lit: Literal) -> bool {
        lit.0 < self.num_inputs
    }

    /// Index into `gates()` for a non-input literal.
    pub fn gate_index(&self, lit: Literal) -> usize {
        assert!(!self.is_input(lit), "literal {lit:?} is an input, not a gate");
        lit.0 - self.num_inputs
    }

    pub fn gate(&self, lit: Literal) -> &ChainGate<B> {
        &self.gates[self.gate_index(lit)]
    }

    pub fn literal_of_gate(&self, gate_index: usize) -> Literal {
        Literal(self.num_inputs + gate_index)
    }

    /// Iterates gates in declaration (topological) order, innermost first.
    pub fn foreach_gate(&self) -> impl Iterator<Item = (Literal, &ChainGate<B>)> {
        self.gates
            .iter()
            .enumerate()
            .map(|(i, g)| (self.literal_of_gate(i), g))
    }

    /// Iterates gates in reverse declaration order.
    pub fn foreach_gate_rev(&self) -> impl Iterator<Item = (Literal, &ChainGate<B>)> {
        self.gates
            .iter()
            .enumerate()
            .rev()
            .map(|(i, g)| (self.literal_of_gate(i), g))
    }
}

impl Chain<crate::library::gate::GateId> {
    /// Sum of gate areas, looked up in `library`.
    pub fn area(&self, library: &crate::library::AugmentedLibrary) -> f64 {
        self.gates
            .iter()
            .map(|g| library.gate(g.binding).area)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy;

    #[test]
    fn well_formed_chain_accepted() {
        let chain = Chain::new(
            2,
            vec![ChainGate {
                fanins: vec![Literal(0), Literal(1)],
                binding: Dummy,
            }],
            vec![Literal(2)],
        );
        assert_eq!(chain.num_gates(), 1);
        assert_eq!(chain.literal_of_gate(0), Literal(2));
        assert!(chain.is_input(Literal(0)));
        assert!(!chain.is_input(Literal(2)));
    }

    #[test]
    #[should_panic(expected = "has not been defined yet")]
    fn forward_reference_rejected() {
        let _ = Chain::new(
            1,
            vec![ChainGate {
                fanins: vec![Literal(5)],
                binding: Dummy,
            }],
            vec![Literal(1)],
        );
    }
}
