//! Window manager (C7): for a pivot node, collects the maximum fanout-free
//! cone (MFFC), an optional transitive-fanout cone bounded by `odc_levels`,
//! and the divisors/leaves a replacement may draw on (spec §4.5).

pub mod simulate;

pub use simulate::{WindowSimulation, WindowSimulator};

use std::collections::VecDeque;

use crate::config::ResynthesisConfig;
use crate::network::{BoundNetwork, NodeId, Signal};

/// A pivot's bounded neighborhood (spec §3.4). All five lists are sorted by
/// ascending `level` once `WindowManager::run` returns.
#[derive(Debug, Clone)]
pub struct Window {
    pub pivot: NodeId,
    pub mffc: Vec<NodeId>,
    pub tfo: Vec<NodeId>,
    pub outputs: Vec<Signal>,
    pub inputs: Vec<Signal>,
    pub divisors: Vec<Signal>,
}

impl Window {
    /// `inputs.len() <= max_num_leaves` and `divisors.len() <=
    /// max_num_divisors` (spec §3.4, §4.5 step 5).
    pub fn valid(&self, config: &ResynthesisConfig) -> bool {
        self.inputs.len() <= config.max_num_leaves && self.divisors.len() <= config.max_num_divisors
    }
}

const TAG_BITS: u32 = 3;
const TAG_MASK: u32 = (1 << TAG_BITS) - 1;
const TAG_MFFC: u32 = 1;
const TAG_DIVISOR: u32 = 2;
const TAG_INPUT: u32 = 3;
const TAG_TFO: u32 = 4;

/// Per-node paint epoch (spec §4.5 supplement, §5 "paint epoch"): a node's
/// tag is `(epoch << 3) | category`; it belongs to the current window iff
/// `tag >> 3 == current_epoch`. Bumping the epoch invalidates every old
/// mark in O(1), so the manager never clears its tag vector between runs.
pub struct WindowManager {
    tags: Vec<u32>,
    epoch: u32,
}

impl WindowManager {
    pub fn new() -> Self {
        Self { tags: Vec::new(), epoch: 0 }
    }

    fn ensure_len(&mut self, n: usize) {
        if self.tags.len() < n {
            self.tags.resize(n, 0);
        }
    }

    fn tag_of(&self, n: NodeId) -> u32 {
        self.tags.get(n.0 as usize).copied().unwrap_or(0)
    }

    fn in_window(&self, n: NodeId) -> bool {
        (self.tag_of(n) >> TAG_BITS) == self.epoch
    }

    fn has_tag(&self, n: NodeId, tag: u32) -> bool {
        let t = self.tag_of(n);
        (t >> TAG_BITS) == self.epoch && (t & TAG_MASK) == tag
    }

    fn paint(&mut self, n: NodeId, tag: u32) {
        self.ensure_len(n.0 as usize + 1);
        self.tags[n.0 as usize] = (self.epoch << TAG_BITS) | tag;
    }

    /// All output-pin fanouts of `n`, pins merged into one list (the window
    /// manager reasons about nodes, not individual multi-output pins).
    fn all_fanouts(ntk: &BoundNetwork, n: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for pin in 0..ntk.num_output_pins(n) {
            out.extend_from_slice(ntk.fanout(n, pin as u8));
        }
        out
    }

    /// Builds the window rooted at `pivot` (spec §4.5 steps 1-5).
    pub fn run(&mut self, pivot: NodeId, ntk: &BoundNetwork, config: &ResynthesisConfig) -> Window {
        self.epoch += 1;
        self.ensure_len(ntk.num_nodes());

        let mut mffc = vec![pivot];
        let mut inputs: Vec<Signal> = Vec::new();
        self.paint(pivot, TAG_MFFC);

        // Step 1: MFFC collection.
        let mut queue = VecDeque::from([pivot]);
        while let Some(n) = queue.pop_front() {
            let fanins: Vec<Signal> = ntk.foreach_fanin(n).collect();
            for f in fanins {
                let fn_ = f.node();
                if self.in_window(fn_) {
                    continue;
                }
                let joins_mffc = !ntk.is_pi(fn_)
                    && !ntk.is_po(fn_)
                    && !ntk.is_constant(fn_)
                    && Self::all_fanouts(ntk, fn_).iter().all(|&u| self.has_tag(u, TAG_MFFC));
                if joins_mffc {
                    self.paint(fn_, TAG_MFFC);
                    mffc.push(fn_);
                    queue.push_back(fn_);
                } else {
                    self.paint(fn_, TAG_INPUT);
                    inputs.push(f);
                }
            }
        }

        // Step 2: TFO collection.
        let mut tfo: Vec<NodeId> = Vec::new();
        let mut outputs: Vec<Signal> = Vec::new();
        if config.odc_levels > 0 {
            let mut frontier = vec![pivot];
            for _ in 0..config.odc_levels {
                let mut next = Vec::new();
                for n in &frontier {
                    for u in Self::all_fanouts(ntk, *n) {
                        if self.in_window(u) {
                            continue;
                        }
                        self.paint(u, TAG_TFO);
                        tfo.push(u);
                        next.push(u);
                        let fanins: Vec<Signal> = ntk.foreach_fanin(u).collect();
                        for f in fanins {
                            if !self.in_window(f.node()) {
                                self.paint(f.node(), TAG_INPUT);
                                inputs.push(f);
                            }
                        }
                    }
                }
                if next.is_empty() {
                    break;
                }
                frontier = next;
            }
            for &n in &tfo {
                if ntk.is_po(n) {
                    outputs.push(Signal::new(n, 0));
                    continue;
                }
                for pin in 0..ntk.num_output_pins(n) {
                    let fanout = ntk.fanout(n, pin as u8);
                    let escapes = fanout.is_empty() || fanout.iter().any(|&u| !self.in_window(u));
                    if escapes {
                        outputs.push(Signal::new(n, pin as u8));
                    }
                }
            }
        } else {
            for pin in 0..ntk.num_output_pins(pivot) {
                outputs.push(Signal::new(pivot, pin as u8));
            }
        }

        // Step 3: divisor expansion. Every current input also starts as a
        // divisor; the worklist below grows both sets with an OR'd
        // `changed` flag (REDESIGN FLAG (a): never AND the sub-steps'
        // progress together, or the loop can stop while one sub-step still
        // had work left).
        let mut divisors: Vec<Signal> = inputs.clone();
        for d in &divisors {
            self.paint(d.node(), TAG_DIVISOR);
        }
        loop {
            let mut changed = false;

            let current: Vec<NodeId> = divisors.iter().map(|s| s.node()).collect();
            for dn in current {
                for pin in 0..ntk.num_output_pins(dn) {
                    if ntk.fanout_size(dn, pin as u8) > config.skip_fanout_limit_for_divisors {
                        continue;
                    }
                    for &u in ntk.fanout(dn, pin as u8) {
                        if self.in_window(u) {
                            continue;
                        }
                        let fanins: Vec<Signal> = ntk.foreach_fanin(u).collect();
                        let ready = fanins.iter().all(|f| self.in_window(f.node()));
                        if !ready {
                            continue;
                        }
                        if config.preserve_depth {
                            let max_output_level = outputs.iter().map(|o| ntk.level(o.node())).max().unwrap_or(0);
                            if ntk.level(u) >= max_output_level {
                                continue;
                            }
                        }
                        self.paint(u, TAG_DIVISOR);
                        divisors.push(Signal::new(u, 0));
                        changed = true;
                    }
                }
            }

            let mut best: Option<(i64, usize)> = None;
            for (i, inp) in inputs.iter().enumerate() {
                let n = inp.node();
                if ntk.is_pi(n) || ntk.is_constant(n) {
                    continue;
                }
                let fanins: Vec<Signal> = ntk.foreach_fanin(n).collect();
                let new_leaves = fanins.iter().filter(|f| !inputs.contains(f)).count();
                if inputs.len() - 1 + new_leaves > config.max_num_leaves {
                    continue;
                }
                let cost = new_leaves as i64 - 1;
                if cost < 0 && best.map(|(bc, _)| cost < bc).unwrap_or(true) {
                    best = Some((cost, i));
                }
            }
            if let Some((_, idx)) = best {
                let expanded = inputs.remove(idx);
                self.paint(expanded.node(), TAG_DIVISOR);
                let fanins: Vec<Signal> = ntk.foreach_fanin(expanded.node()).collect();
                for f in fanins {
                    if !inputs.contains(&f) {
                        inputs.push(f);
                        if !self.in_window(f.node()) {
                            self.paint(f.node(), TAG_INPUT);
                        }
                    }
                    if !divisors.contains(&f) {
                        divisors.push(f);
                    }
                }
                changed = true;
            }

            if !changed || divisors.len() > config.max_num_divisors {
                break;
            }
        }

        // Step 4: sort everything by level ascending.
        mffc.sort_by_key(|n| ntk.level(*n));
        tfo.sort_by_key(|n| ntk.level(*n));
        inputs.sort_by_key(|s| ntk.level(s.node()));
        divisors.sort_by_key(|s| ntk.level(s.node()));
        outputs.sort_by_key(|s| ntk.level(s.node()));

        Window { pivot, mffc, tfo, outputs, inputs, divisors }
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}
