use rinox_truth::DynamicTruthTable;

use crate::library::GateId;

use super::signal::{NodeId, Signal};

/// What kind of thing a node represents (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Constant(bool),
    Pi,
    Po,
    Gate,
}

/// How a gate node's output pins are bound to library gates. A single-output
/// cell has one binding; a multi-output cell (e.g. a full adder) has one
/// binding per output pin, in pin order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    None,
    Single(GateId),
    Multi(Vec<GateId>),
}

impl Binding {
    pub fn len(&self) -> usize {
        match self {
            Binding::None => 0,
            Binding::Single(_) => 1,
            Binding::Multi(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn gate_id(&self, pin: u8) -> GateId {
        match self {
            Binding::None => panic!("node has no binding"),
            Binding::Single(id) => {
                assert_eq!(pin, 0);
                *id
            }
            Binding::Multi(ids) => ids[pin as usize],
        }
    }
}

/// One output pin of a node: the live fanout nodes whose fanin references
/// this exact `(node, pin)` signal (spec §3.1).
#[derive(Debug, Clone, Default)]
pub struct OutputPin {
    pub fanout: Vec<NodeId>,
}

impl OutputPin {
    pub fn fanout_size(&self) -> usize {
        self.fanout.len()
    }
}

/// An arena entry (spec §3.1). `is_dead` nodes are never physically removed
/// within a pass — their `NodeId` simply becomes unreachable from any live
/// fanin or PO.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub fanins: Vec<Signal>,
    pub output_pins: Vec<OutputPin>,
    pub binding: Binding,
    pub level: usize,
    pub visited: u64,
    pub value: Option<DynamicTruthTable>,
    pub is_dead: bool,
}

impl Node {
    pub fn new_pi() -> Self {
        Self {
            kind: NodeKind::Pi,
            fanins: Vec::new(),
            output_pins: vec![OutputPin::default()],
            binding: Binding::None,
            level: 0,
            visited: 0,
            value: None,
            is_dead: false,
        }
    }

    pub fn new_constant(value: bool) -> Self {
        Self {
            kind: NodeKind::Constant(value),
            fanins: Vec::new(),
            output_pins: vec![OutputPin::default()],
            binding: Binding::None,
            level: 0,
            visited: 0,
            value: None,
            is_dead: false,
        }
    }

    pub fn new_gate(fanins: Vec<Signal>, binding: Binding, level: usize) -> Self {
        let num_pins = binding.len().max(1);
        Self {
            kind: NodeKind::Gate,
            fanins,
            output_pins: (0..num_pins).map(|_| OutputPin::default()).collect(),
            binding,
            level,
            visited: 0,
            value: None,
            is_dead: false,
        }
    }

    pub fn num_output_pins(&self) -> usize {
        self.output_pins.len()
    }
}
