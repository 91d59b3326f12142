use rinox_util::diagnostics::Diagnostics;

use crate::library::{AugmentedLibrary, GateId};

use super::node::{Binding, Node, NodeKind};
use super::signal::{NodeId, Signal};

/// An arena-based DAG of multi-output cells (C3). Fanin edges point toward
/// lower creation order; fanout lists are maintained incrementally so no
/// reference cycle can arise. Dead nodes are flagged, never physically
/// removed, so `NodeId`s stay stable within a pass (spec §5 "Memory").
#[derive(Debug, Clone)]
pub struct BoundNetwork {
    nodes: Vec<Node>,
    pis: Vec<NodeId>,
    pos: Vec<NodeId>,
    const0: NodeId,
    const1: NodeId,
    trav_id: u64,
}

impl BoundNetwork {
    pub fn new() -> Self {
        let const0 = Node::new_constant(false);
        let const1 = Node::new_constant(true);
        Self {
            nodes: vec![const0, const1],
            pis: Vec::new(),
            pos: Vec::new(),
            const0: NodeId(0),
            const1: NodeId(1),
            trav_id: 0,
        }
    }

    fn node(&self, n: NodeId) -> &Node {
        &self.nodes[n.0 as usize]
    }

    fn node_mut(&mut self, n: NodeId) -> &mut Node {
        &mut self.nodes[n.0 as usize]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_pis(&self) -> usize {
        self.pis.len()
    }

    pub fn num_pos(&self) -> usize {
        self.pos.len()
    }

    pub fn num_gates(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Gate && !n.is_dead)
            .count()
    }

    pub fn fanin_size(&self, n: NodeId) -> usize {
        self.node(n).fanins.len()
    }

    pub fn level(&self, n: NodeId) -> usize {
        self.node(n).level
    }

    pub fn is_pi(&self, n: NodeId) -> bool {
        self.node(n).kind == NodeKind::Pi
    }

    pub fn is_po(&self, n: NodeId) -> bool {
        self.node(n).kind == NodeKind::Po
    }

    pub fn is_constant(&self, n: NodeId) -> bool {
        matches!(self.node(n).kind, NodeKind::Constant(_))
    }

    pub fn is_dead(&self, n: NodeId) -> bool {
        self.node(n).is_dead
    }

    pub fn is_gate(&self, n: NodeId) -> bool {
        self.node(n).kind == NodeKind::Gate
    }

    pub fn fanins(&self, n: NodeId) -> &[Signal] {
        &self.node(n).fanins
    }

    pub fn binding(&self, n: NodeId) -> &Binding {
        &self.node(n).binding
    }

    pub fn num_output_pins(&self, n: NodeId) -> usize {
        self.node(n).num_output_pins()
    }

    pub fn fanout(&self, n: NodeId, pin: u8) -> &[NodeId] {
        &self.node(n).output_pins[pin as usize].fanout
    }

    pub fn fanout_size(&self, n: NodeId, pin: u8) -> usize {
        self.fanout(n, pin).len()
    }

    pub fn get_constant(&self, value: bool) -> Signal {
        Signal::new(if value { self.const1 } else { self.const0 }, 0)
    }

    pub fn create_pi(&mut self) -> Signal {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new_pi());
        self.pis.push(id);
        Signal::new(id, 0)
    }

    /// Registers `driver` as a primary output, creating a `Po` node whose
    /// sole fanin is `driver`.
    pub fn create_po(&mut self, driver: Signal) -> NodeId {
        let level = self.node(driver.node()).level + 1;
        let mut node = Node::new_gate(vec![driver], Binding::None, level);
        node.kind = NodeKind::Po;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.register_fanin(id, driver);
        self.pos.push(id);
        id
    }

    /// Allocates a gate node bound to `binding_ids` (one `GateId` per
    /// output pin; `binding_ids.len() > 1` makes the node multi-output) and
    /// registers it in each fanin's fanout set. Panics (after reporting a
    /// `Fatal` diagnostic) on arity mismatch, per spec §7 "library-gate
    /// mismatches... fails loudly".
    pub fn create_node(
        &mut self,
        fanins: Vec<Signal>,
        binding_ids: Vec<GateId>,
        library: &AugmentedLibrary,
        diag: &dyn Diagnostics,
    ) -> Signal {
        if binding_ids.is_empty() {
            diag.fatal("create_node requires at least one gate binding");
            panic!("create_node requires at least one gate binding");
        }
        for &gate_id in &binding_ids {
            if library.gate(gate_id).arity() != fanins.len() {
                diag.fatal(&format!(
                    "gate {} expects {} fanins, got {}",
                    library.gate(gate_id).name,
                    library.gate(gate_id).arity(),
                    fanins.len()
                ));
                panic!("library-gate arity mismatch");
            }
        }
        let level = 1 + fanins.iter().map(|s| self.node(s.node()).level).max().unwrap_or(0);
        let binding = if binding_ids.len() == 1 {
            Binding::Single(binding_ids[0])
        } else {
            Binding::Multi(binding_ids)
        };
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new_gate(fanins.clone(), binding, level));
        for &f in &fanins {
            self.register_fanin(id, f);
        }
        Signal::new(id, 0)
    }

    fn register_fanin(&mut self, user: NodeId, sig: Signal) {
        let fanout = &mut self.node_mut(sig.node()).output_pins[sig.pin() as usize].fanout;
        if !fanout.contains(&user) {
            fanout.push(user);
        }
    }

    /// Removes `user` from `sig`'s fanout set, then recursively marks
    /// `sig.node()` dead if it becomes unreferenced (and is not a PI/PO/
    /// constant).
    fn unregister_fanin(&mut self, user: NodeId, sig: Signal) {
        let fanout = &mut self.node_mut(sig.node()).output_pins[sig.pin() as usize].fanout;
        fanout.retain(|&n| n != user);
        self.try_take_out(sig.node());
    }

    fn try_take_out(&mut self, n: NodeId) {
        let node = self.node(n);
        if node.is_dead {
            return;
        }
        if matches!(node.kind, NodeKind::Pi | NodeKind::Po | NodeKind::Constant(_)) {
            return;
        }
        if node.output_pins.iter().any(|p| !p.fanout.is_empty()) {
            return;
        }
        self.node_mut(n).is_dead = true;
        let fanins: Vec<Signal> = self.node(n).fanins.clone();
        let mut distinct: Vec<Signal> = Vec::new();
        for f in fanins {
            if !distinct.contains(&f) {
                distinct.push(f);
            }
        }
        for f in distinct {
            self.unregister_fanin(n, f);
        }
    }

    /// Rewrites every live fanout of `old`'s output pins to `new_signals`
    /// (one replacement signal per pin), then releases `old` and
    /// recursively any now-unreferenced fanin (its former MFFC). Spec §4.1.
    pub fn substitute_node(&mut self, old: NodeId, new_signals: &[Signal]) {
        assert_eq!(
            new_signals.len(),
            self.node(old).num_output_pins(),
            "substitution must supply one signal per output pin"
        );
        for pin in 0..new_signals.len() {
            let users = std::mem::take(&mut self.node_mut(old).output_pins[pin].fanout);
            let old_sig = Signal::new(old, pin as u8);
            let new_sig = new_signals[pin];
            for u in users {
                self.rewire_fanin(u, old_sig, new_sig);
            }
        }
        self.try_take_out(old);
    }

    fn rewire_fanin(&mut self, user: NodeId, old_sig: Signal, new_sig: Signal) {
        let fanins = &mut self.node_mut(user).fanins;
        let mut touched = false;
        for f in fanins.iter_mut() {
            if *f == old_sig {
                *f = new_sig;
                touched = true;
            }
        }
        assert!(touched, "fanout list referenced a node without a matching fanin");
        self.register_fanin(user, new_sig);
    }

    pub fn incr_trav_id(&mut self) -> u64 {
        self.trav_id += 1;
        self.trav_id
    }

    pub fn trav_id(&self) -> u64 {
        self.trav_id
    }

    pub fn visited(&self, n: NodeId) -> u64 {
        self.node(n).visited
    }

    pub fn set_visited(&mut self, n: NodeId, id: u64) {
        self.node_mut(n).visited = id;
    }

    pub fn foreach_pi(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pis.iter().copied()
    }

    pub fn foreach_po(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pos.iter().copied()
    }

    /// The signal each PO drives (its sole fanin).
    pub fn po_driver(&self, po: NodeId) -> Signal {
        debug_assert!(self.is_po(po));
        self.node(po).fanins[0]
    }

    pub fn foreach_gate(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            (n.kind == NodeKind::Gate && !n.is_dead).then_some(NodeId(i as u32))
        })
    }

    pub fn foreach_fanin(&self, n: NodeId) -> impl Iterator<Item = Signal> + '_ {
        self.node(n).fanins.iter().copied()
    }

    pub fn foreach_fanout(&self, n: NodeId, pin: u8) -> impl Iterator<Item = NodeId> + '_ {
        self.fanout(n, pin).iter().copied()
    }

    /// Renumbers live nodes into a dense prefix, dropping dead entries
    /// (spec §3 "Dead-node compaction", added). Never called mid-pass.
    pub fn compact(&mut self) -> hashbrown::HashMap<NodeId, NodeId> {
        let mut remap = hashbrown::HashMap::new();
        let mut new_nodes = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_dead {
                remap.insert(NodeId(i as u32), NodeId(new_nodes.len() as u32));
                new_nodes.push(node.clone());
            }
        }
        for node in &mut new_nodes {
            for f in &mut node.fanins {
                let new_node = remap[&f.node()];
                *f = Signal::new(new_node, f.pin());
            }
            for pin in &mut node.output_pins {
                for u in &mut pin.fanout {
                    *u = remap[u];
                }
            }
        }
        self.nodes = new_nodes;
        self.pis = self.pis.iter().filter_map(|n| remap.get(n).copied()).collect();
        self.pos = self.pos.iter().filter_map(|n| remap.get(n).copied()).collect();
        self.const0 = remap[&self.const0];
        self.const1 = remap[&self.const1];
        remap
    }
}

impl Default for BoundNetwork {
    fn default() -> Self {
        Self::new()
    }
}
