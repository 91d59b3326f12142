//! Replacement profilers (C11): score a candidate chain or rewiring by how
//! much cost it would save relative to the pivot's current MFFC, guiding
//! the driver's accept/reject decision (spec §4.10). Three variants share
//! one contract (`init`, `evaluate`, `evaluate_rewiring`, `foreach_gate`)
//! but differ in cost metric. Grounded on `power_profiler.hpp`'s
//! `evaluate`/`evaluate_rewiring`/`foreach_gate` trio and its sibling area
//! and delay profilers.

use hashbrown::HashSet;
use std::collections::VecDeque;

use crate::chain::{get_longest_paths, BoundChain};
use crate::config::ResynthesisConfig;
use crate::library::AugmentedLibrary;
use crate::network::{BoundNetwork, NodeId, Signal};
use crate::sim::switching_activity;
use crate::trackers::{arrival_times, load, required_times, sensing_times};
use crate::window::{Window, WindowSimulation};

/// Number of discrete samples a power profiler's timestep clamp (design
/// note (b)) can resolve a signal's settling window into. Matches the
/// teacher's `power_profiler::max_num_steps`.
pub const TIME_STEPS: usize = 10;

/// Maps a real-valued time `t` onto a `0..TIME_STEPS` index between
/// `sensing` (earliest possible switching) and `arrival` (latest stable
/// value), clamped to the valid range. `arrival <= sensing` collapses to
/// timestep `0` (no glitch window to sample): the signal settles before or
/// at the same time it could start switching, so there's nothing to
/// resolve (spec §9 design note (b)).
pub fn timestep(t: f64, sensing: f64, arrival: f64) -> usize {
    if arrival <= sensing {
        return 0;
    }
    let scaled = (TIME_STEPS - 1) as f64 * (t - sensing) / (arrival - sensing);
    if !scaled.is_finite() {
        return 0;
    }
    scaled.round().clamp(0.0, (TIME_STEPS - 1) as f64) as usize
}

/// Whether a signal's transition window is wide enough to admit glitching
/// (its arrival strictly follows its sensing time).
fn glitches(sensing: f64, arrival: f64) -> bool {
    arrival > sensing
}

/// Common contract for the area, delay and power profilers (spec §4.10).
/// `init` runs once per window, before any candidate is scored against it;
/// `evaluate`/`evaluate_rewiring` are pure cost-delta queries scored
/// against that cached state; `foreach_gate` supplies the driver's outer
/// iteration order, typically sorted by each variant's own cost key.
pub trait Profiler {
    /// Caches whatever per-window state the variant needs (MFFC cost,
    /// arrival/required sweeps, switching activity) before any candidate is
    /// scored.
    fn init(&mut self, window: &Window, sim: &WindowSimulation, ntk: &BoundNetwork, library: &AugmentedLibrary, config: &ResynthesisConfig);

    /// Cost delta of replacing the pivot's MFFC with `candidate`, wired
    /// from `leaves` in order. Positive means gain (the candidate is
    /// cheaper).
    fn evaluate(&self, candidate: &BoundChain, leaves: &[Signal], ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64;

    /// Cheaper, specialized cost delta for a rewire candidate: the pivot's
    /// own binding is kept, only its fanins change to `new_children`.
    fn evaluate_rewiring(&self, new_children: &[Signal], ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64;

    /// Gates in the order this variant prefers to visit them as pivots,
    /// typically sorted by a per-gate cost key (MFFC area, slack, MFFC
    /// power).
    fn foreach_gate(&self, ntk: &BoundNetwork, library: &AugmentedLibrary) -> Vec<NodeId>;
}

/// A lightweight standalone MFFC walk (duplicates the shape of
/// `WindowManager`'s own MFFC collection, spec §4.5 step 1) used by
/// profilers to cost a node before any window has been built for it, e.g.
/// while ranking `foreach_gate`'s visiting order.
fn single_fanout_mffc(ntk: &BoundNetwork, root: NodeId) -> Vec<NodeId> {
    let mut mffc = vec![root];
    let mut seen: HashSet<NodeId> = HashSet::new();
    seen.insert(root);
    let mut queue = VecDeque::from([root]);
    while let Some(n) = queue.pop_front() {
        for f in ntk.foreach_fanin(n) {
            let fn_ = f.node();
            if seen.contains(&fn_) {
                continue;
            }
            if ntk.is_pi(fn_) || ntk.is_po(fn_) || ntk.is_constant(fn_) {
                continue;
            }
            let single_fanout = (0..ntk.num_output_pins(fn_)).all(|p| ntk.fanout_size(fn_, p as u8) <= 1);
            if single_fanout {
                seen.insert(fn_);
                mffc.push(fn_);
                queue.push_back(fn_);
            }
        }
    }
    mffc
}

fn mffc_area(ntk: &BoundNetwork, library: &AugmentedLibrary, root: NodeId) -> f64 {
    single_fanout_mffc(ntk, root)
        .iter()
        .map(|&n| library.gate(ntk.binding(n).gate_id(0)).area)
        .sum()
}

/// Area profiler: cost is the sum of gate areas in the pivot's MFFC, and
/// `evaluate` compares it against the candidate chain's own area sum
/// (spec §4.10, area variant).
pub struct AreaProfiler {
    pivot: NodeId,
    old_area: f64,
}

impl Default for AreaProfiler {
    fn default() -> Self {
        Self { pivot: NodeId(0), old_area: 0.0 }
    }
}

impl Profiler for AreaProfiler {
    fn init(&mut self, window: &Window, _sim: &WindowSimulation, ntk: &BoundNetwork, library: &AugmentedLibrary, _config: &ResynthesisConfig) {
        self.pivot = window.pivot;
        self.old_area = mffc_area(ntk, library, window.pivot);
    }

    fn evaluate(&self, candidate: &BoundChain, _leaves: &[Signal], _ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64 {
        self.old_area - candidate.area(library)
    }

    fn evaluate_rewiring(&self, new_children: &[Signal], ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64 {
        let current_fanins: Vec<Signal> = ntk.foreach_fanin(self.pivot).collect();
        let mut reclaimed = 0.0;
        for f in &current_fanins {
            if new_children.contains(f) {
                continue;
            }
            let n = f.node();
            if ntk.is_pi(n) || ntk.is_constant(n) {
                continue;
            }
            if ntk.fanout_size(n, f.pin()) <= 1 {
                reclaimed += mffc_area(ntk, library, n);
            }
        }
        reclaimed
    }

    fn foreach_gate(&self, ntk: &BoundNetwork, library: &AugmentedLibrary) -> Vec<NodeId> {
        let mut gates: Vec<(NodeId, f64)> = ntk.foreach_gate().map(|n| (n, mffc_area(ntk, library, n))).collect();
        gates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        gates.into_iter().map(|(n, _)| n).collect()
    }
}

/// Delay profiler: caches arrival/required sweeps over the whole network at
/// `init`, then compares the pivot's current arrival against a candidate's
/// own longest-path delays added to its leaves' cached arrivals (spec
/// §4.10, delay variant).
pub struct DelayProfiler {
    pivot: NodeId,
    arrival: Vec<f64>,
    required: Vec<f64>,
}

impl Default for DelayProfiler {
    fn default() -> Self {
        Self { pivot: NodeId(0), arrival: Vec::new(), required: Vec::new() }
    }
}

impl Profiler for DelayProfiler {
    fn init(&mut self, window: &Window, _sim: &WindowSimulation, ntk: &BoundNetwork, library: &AugmentedLibrary, config: &ResynthesisConfig) {
        self.pivot = window.pivot;
        self.arrival = arrival_times(ntk, library, &config.input_arrivals);
        let output_required: Vec<f64> = config.output_required.iter().map(|r| r.value()).collect();
        self.required = required_times(ntk, library, &output_required);
    }

    fn evaluate(&self, candidate: &BoundChain, leaves: &[Signal], _ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64 {
        let paths = get_longest_paths(candidate, library);
        let new_arrival = leaves
            .iter()
            .zip(paths.iter())
            .map(|(s, &path)| self.arrival[s.node().0 as usize] + path)
            .fold(f64::NEG_INFINITY, f64::max);
        self.arrival[self.pivot.0 as usize] - new_arrival
    }

    fn evaluate_rewiring(&self, new_children: &[Signal], ntk: &BoundNetwork, library: &AugmentedLibrary) -> f64 {
        let gate_id = ntk.binding(self.pivot).gate_id(0);
        let pins = &library.gate(gate_id).pins;
        let new_arrival = new_children
            .iter()
            .enumerate()
            .map(|(k, s)| self.arrival[s.node().0 as usize] + pins[k].avg_delay())
            .fold(f64::NEG_INFINITY, f64::max);
        self.arrival[self.pivot.0 as usize] - new_arrival
    }

    fn foreach_gate(&self, ntk: &BoundNetwork, _library: &AugmentedLibrary) -> Vec<NodeId> {
        let mut gates: Vec<(NodeId, f64)> = ntk
            .foreach_gate()
            .map(|n| {
                let slack = self.required[n.0 as usize] - self.arrival[n.0 as usize];
                (n, slack)
            })
            .collect();
        gates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        gates.into_iter().map(|(n, _)| n).collect()
    }
}

/// Power profiler: caches the window's own Boolean simulation values
/// (standing in for the teacher's per-timestep clock-cycle activity
/// record, spec §9 design note (b)) plus arrival/sensing/load sweeps, and
/// costs a signal as `switching(signal) * load(signal)` the way
/// `power_profiler::evaluate_rewiring` does. A signal whose arrival
/// strictly follows its sensing time (`glitches`) is treated as carrying
/// its full switching count; one that can't glitch contributes only its
/// settled (zero-delay) switching, matching the teacher's `step` branch.
pub struct PowerProfiler {
    pivot: NodeId,
    values: hashbrown::HashMap<Signal, crate::library::GateFunction>,
    arrival: Vec<f64>,
    sensing: Vec<f64>,
    load: Vec<f64>,
}

impl Default for PowerProfiler {
    fn default() -> Self {
        Self {
            pivot: NodeId(0),
            values: hashbrown::HashMap::new(),
            arrival: Vec::new(),
            sensing: Vec::new(),
            load: Vec::new(),
        }
    }
}

impl PowerProfiler {
    fn switching_of(&self, s: Signal) -> f64 {
        self.values.get(&s).map(|v| switching_activity(std::slice::from_ref(v), 0) as f64).unwrap_or(0.0)
    }

    fn cost_of(&self, s: Signal) -> f64 {
        let n = s.node();
        let raw = self.switching_of(s);
        let scaled = if glitches(self.sensing_of(n), self.arrival_of(n)) { raw } else { raw * 0.5 };
        scaled * self.load.get(n.0 as usize).copied().unwrap_or(0.0)
    }

    fn arrival_of(&self, n: NodeId) -> f64 {
        self.arrival.get(n.0 as usize).copied().unwrap_or(0.0)
    }

    fn sensing_of(&self, n: NodeId) -> f64 {
        self.sensing.get(n.0 as usize).copied().unwrap_or(0.0)
    }
}

impl Profiler for PowerProfiler {
    fn init(&mut self, window: &Window, sim: &WindowSimulation, ntk: &BoundNetwork, library: &AugmentedLibrary, config: &ResynthesisConfig) {
        self.pivot = window.pivot;
        self.values = sim.values.clone();
        self.arrival = arrival_times(ntk, library, &config.input_arrivals);
        self.sensing = sensing_times(ntk, library, &config.input_arrivals);
        self.load = load(ntk, library);
    }

    fn evaluate(&self, candidate: &BoundChain, leaves: &[Signal], ntk: &BoundNetwork, _library: &AugmentedLibrary) -> f64 {
        // Like `AreaProfiler::old_area`, the baseline is the whole MFFC being
        // replaced, not just the pivot's own node: a single-node `old_cost`
        // would always lose against a leaves_cost sum over several inputs.
        let old_cost: f64 = single_fanout_mffc(ntk, self.pivot).iter().map(|&n| self.cost_of(Signal::new(n, 0))).sum();
        let leaves_cost: f64 = leaves.iter().map(|s| self.cost_of(*s)).sum();
        // a candidate's own internal switching isn't observable until it's
        // inserted; approximate its load contribution by its gate count
        // weighted by the pivot's own output load.
        let candidate_cost = candidate.num_gates() as f64 * self.load.get(self.pivot.0 as usize).copied().unwrap_or(0.0);
        old_cost - (leaves_cost + candidate_cost)
    }

    fn evaluate_rewiring(&self, new_children: &[Signal], ntk: &BoundNetwork, _library: &AugmentedLibrary) -> f64 {
        let pivot_sig = Signal::new(self.pivot, 0);
        let mut cost_curr = self.cost_of(pivot_sig);
        for f in ntk.foreach_fanin(self.pivot) {
            cost_curr += self.cost_of(f);
        }

        let mut cost_cand = self.cost_of(pivot_sig);
        for f in new_children {
            cost_cand += self.cost_of(*f);
        }

        cost_curr - cost_cand
    }

    /// Unlike the area and delay variants, the power profiler's own
    /// `foreach_gate` does not reorder by cost (grounded on
    /// `power_profiler.hpp::foreach_gate`, a bare forward over
    /// `ntk_.foreach_gate`): per-node power cost depends on switching
    /// activity cached from a specific pivot's window, which isn't
    /// available before that pivot's own `init` runs.
    fn foreach_gate(&self, ntk: &BoundNetwork, _library: &AugmentedLibrary) -> Vec<NodeId> {
        ntk.foreach_gate().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainGate, Literal};
    use crate::library::{AugmentedLibrary, GateFunction as GF, GateId, InnerChain, LibraryGate, Pin, Primitive};
    use crate::network::BoundNetwork;
    use crate::window::{WindowManager, WindowSimulator};
    use rinox_truth::TruthTable;
    use rinox_util::diagnostics::NullDiagnostics;

    fn and2_library() -> AugmentedLibrary {
        let mut lib = AugmentedLibrary::new();
        let a = GF::nth_var(2, 0);
        let b = GF::nth_var(2, 1);
        let pin = Pin {
            name: "a".into(),
            rise_delay: 1.0,
            fall_delay: 1.0,
            rise_capacitance: 0.1,
            fall_capacitance: 0.1,
        };
        let gate = LibraryGate::new("and2", 2.0, 2, a.bit_and(&b), vec![pin.clone(), pin]);
        let inner = InnerChain::new(
            2,
            vec![ChainGate {
                fanins: vec![Literal(0), Literal(1)],
                binding: Primitive::And { neg_a: false, neg_b: false },
            }],
            vec![Literal(2)],
        );
        lib.add_gate(gate, inner);
        lib
    }

    fn chain_of(ntk: &BoundNetwork, root: Signal) -> BoundChain {
        let leaves: Vec<Signal> = ntk.foreach_fanin(root.node()).collect();
        crate::chain::extract(ntk, &leaves, root).unwrap().0
    }

    #[test]
    fn timestep_collapses_to_zero_when_arrival_does_not_exceed_sensing() {
        assert_eq!(timestep(1.0, 2.0, 2.0), 0);
        assert_eq!(timestep(1.0, 2.0, 1.0), 0);
    }

    #[test]
    fn timestep_clamps_to_the_last_step_at_arrival() {
        assert_eq!(timestep(5.0, 0.0, 5.0), TIME_STEPS - 1);
    }

    #[test]
    fn area_profiler_prefers_a_smaller_candidate() {
        let lib = and2_library();
        let diag = NullDiagnostics;
        let mut ntk = BoundNetwork::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let c = ntk.create_pi();
        let g1 = ntk.create_node(vec![a, b], vec![GateId(0)], &lib, &diag);
        let g2 = ntk.create_node(vec![g1, c], vec![GateId(0)], &lib, &diag);
        ntk.create_po(g2);

        let config = ResynthesisConfig::default();
        let mut wm = WindowManager::new();
        let window = wm.run(g2.node(), &ntk, &config);
        let sim = WindowSimulator::new().run(&window, &ntk, &lib);

        let mut profiler = AreaProfiler::default();
        profiler.init(&window, &sim, &ntk, &lib, &config);
        assert_eq!(profiler.old_area, 4.0);

        let single_gate_chain = chain_of(&ntk, crate::network::Signal::new(g1.node(), 0));
        let gain = profiler.evaluate(&single_gate_chain, &[a, b], &ntk, &lib);
        assert_eq!(gain, 2.0);
    }

    #[test]
    fn delay_profiler_reports_positive_gain_for_a_shallower_candidate() {
        let lib = and2_library();
        let diag = NullDiagnostics;
        let mut ntk = BoundNetwork::new();
        let a = ntk.create_pi();
        let b = ntk.create_pi();
        let c = ntk.create_pi();
        let g1 = ntk.create_node(vec![a, b], vec![GateId(0)], &lib, &diag);
        let g2 = ntk.create_node(vec![g1, c], vec![GateId(0)], &lib, &diag);
        ntk.create_po(g2);

        let config = ResynthesisConfig::default();
        let mut wm = WindowManager::new();
        let window = wm.run(g2.node(), &ntk, &config);
        let sim = WindowSimulator::new().run(&window, &ntk, &lib);

        let mut profiler = DelayProfiler::default();
        profiler.init(&window, &sim, &ntk, &lib, &config);

        let single_gate_chain = chain_of(&ntk, crate::network::Signal::new(g1.node(), 0));
        let gain = profiler.evaluate(&single_gate_chain, &[a, b], &ntk, &lib);
        assert_eq!(gain, 1.0);
    }
}
