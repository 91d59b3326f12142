//! The bound network (C3): an arena-based DAG of multi-output cells.

pub mod bound_network;
pub mod node;
pub mod signal;

pub use bound_network::BoundNetwork;
pub use node::{Binding, Node, NodeKind, OutputPin};
pub use signal::{NodeId, Signal};
