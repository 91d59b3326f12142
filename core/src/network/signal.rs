use std::fmt;

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// Dense index into the network's node arena (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

const PIN_BITS: u32 = 2;
const PIN_MASK: u64 = (1 << PIN_BITS) - 1;

const_assert!(PIN_BITS as u64 + u32::BITS as u64 <= u64::BITS as u64);

/// A `(NodeId, output pin)` pair packed into one 64-bit word (design note
/// "bitfield signals"): a transparent wrapper with explicit shift/mask
/// accessors rather than a union, since Rust gives no layout guarantee for
/// the latter. Two signals on the same node but different output pins are
/// distinct, which is what lets a multi-output cell's pins be referenced
/// independently.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(u64);

impl Signal {
    pub fn new(node: NodeId, pin: u8) -> Self {
        assert!((pin as u64) <= PIN_MASK, "pin index {pin} exceeds 2-bit field");
        Self(((node.0 as u64) << PIN_BITS) | pin as u64)
    }

    pub fn node(&self) -> NodeId {
        NodeId((self.0 >> PIN_BITS) as u32)
    }

    pub fn pin(&self) -> u8 {
        (self.0 & PIN_MASK) as u8
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal(node={}, pin={})", self.node().0, self.pin())
    }
}
