use serde::{Deserialize, Serialize};

use rinox_truth::{DynamicTruthTable, TruthTable};

/// Identifies a gate within a library by position. Distinct from `NodeId`:
/// many nodes in a network can be bound to the same `GateId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GateId(pub usize);

/// One input pin of a library gate (spec §3.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub rise_delay: f64,
    pub fall_delay: f64,
    pub rise_capacitance: f64,
    pub fall_capacitance: f64,
}

impl Pin {
    pub fn avg_delay(&self) -> f64 {
        0.5 * (self.rise_delay + self.fall_delay)
    }

    pub fn avg_capacitance(&self) -> f64 {
        0.5 * (self.rise_capacitance + self.fall_capacitance)
    }
}

/// A library gate's output function. Variable-width because library gates
/// span a range of arities (a 2-input `and2` to a 5-input `FA` carry); cuts
/// and database rows, which are bounded to `max_cuts_size` <= 6 variables,
/// use the fixed-width kernel instead.
pub type GateFunction = DynamicTruthTable;

/// One gate of a technology library: area, pin timing, and output function
/// (spec §3.3). Multiple `LibraryGate`s sharing a `cell_name` model a
/// multi-output cell (e.g. a full adder's carry and sum).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryGate {
    pub name: String,
    pub cell_name: String,
    pub area: f64,
    pub output_fn: GateFunction,
    pub num_vars: usize,
    pub pins: Vec<Pin>,
}

impl LibraryGate {
    pub fn new(name: impl Into<String>, area: f64, num_vars: usize, output_fn: GateFunction, pins: Vec<Pin>) -> Self {
        assert_eq!(pins.len(), num_vars, "pin count must match function arity");
        assert_eq!(output_fn.num_vars(), num_vars, "output function arity must match pin count");
        let name = name.into();
        Self {
            cell_name: name.clone(),
            name,
            area,
            output_fn,
            num_vars,
            pins,
        }
    }

    pub fn arity(&self) -> usize {
        self.pins.len()
    }

    pub fn avg_delay(&self) -> f64 {
        if self.pins.is_empty() {
            0.0
        } else {
            self.pins.iter().map(Pin::avg_delay).sum::<f64>() / self.pins.len() as f64
        }
    }
}
