//! The bound chain (C4): a linear, literal-indexed encoding of a small
//! mapped subnetwork, and the operations that move subnetworks between a
//! chain and the bound network (`extract`/`insert`), and reorder a chain's
//! inputs without changing its function (`perm_canonize`/`time_canonize`).

pub mod bound_chain;
pub mod canonize;
pub mod extract;
pub mod insert;

pub use bound_chain::{Chain, ChainGate, Literal};
pub use canonize::{get_longest_paths, perm_canonize, time_canonize};
pub use extract::extract;
pub use insert::{insert, insert_all};

/// A bound chain: gates are library gate bindings.
pub type BoundChain = Chain<crate::library::GateId>;
