//! Resynthesis driver (C13): the outer per-pivot loop that ties every other
//! module together (spec §4.11). Visits gates in the profiler's own order,
//! builds and simulates a window, enumerates candidate cuts, decomposes and
//! matches each against the database, and substitutes the best
//! positive-reward candidate for the pivot's MFFC.

use rinox_truth::TernaryTruthTable;
use rinox_util::diagnostics::Diagnostics;

use crate::chain::extract;
use crate::config::ResynthesisConfig;
use crate::database::MappedDatabase;
use crate::decompose::{decompose, DecomposeInput};
use crate::dependency::{foreach_dont_care_assignment, rewire_cuts, structural_cuts, window_cuts, DependencyCut};
use crate::library::AugmentedLibrary;
use crate::network::{BoundNetwork, NodeId, Signal};
use crate::profiler::Profiler;
use crate::trackers::arrival_times;
use crate::window::{WindowManager, WindowSimulator};

/// Per-pass totals (spec §4.11).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub pivots_visited: usize,
    pub substitutions: usize,
}

/// The state machine driving one pivot (spec §4.11: `idle -> window_built
/// -> simulated -> scored -> {substituted | rejected}`). Only
/// `Substituted` mutates the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotOutcome {
    Skipped,
    Rejected,
    Substituted,
}

/// Ties the window manager, dependency finder, decomposer, database and a
/// profiler variant together into the per-pass resynthesis loop.
pub struct Driver<'a> {
    config: &'a ResynthesisConfig,
    database: &'a mut MappedDatabase,
    library: &'a AugmentedLibrary,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a ResynthesisConfig, database: &'a mut MappedDatabase, library: &'a AugmentedLibrary) -> Self {
        Self { config, database, library }
    }

    /// Runs one pass over every gate, in the order `P::foreach_gate`
    /// prefers, mutating `ntk` in place (spec §4.11).
    pub fn run_pass<P: Profiler + Default>(&mut self, ntk: &mut BoundNetwork, diag: &dyn Diagnostics) -> DriverStats {
        let mut stats = DriverStats::default();
        let pivots = self.ordered_pivots::<P>(ntk);
        let arrival = arrival_times(ntk, self.library, &self.config.input_arrivals);

        let mut window_manager = WindowManager::new();
        let simulator = WindowSimulator::new();

        for pivot in pivots {
            stats.pivots_visited += 1;
            let outcome = self.try_pivot::<P>(pivot, ntk, &arrival, &mut window_manager, &simulator, diag);
            if outcome == PivotOutcome::Substituted {
                stats.substitutions += 1;
            }
        }
        stats
    }

    /// Bootstraps a throwaway profiler on the network's first gate purely
    /// to read off `foreach_gate`'s visiting order (spec §4.11 outer loop).
    /// Arrival/required sweeps are whole-network regardless of which node
    /// seeds the window, so this yields the same order a fully-initialized
    /// per-pivot profiler would.
    fn ordered_pivots<P: Profiler + Default>(&self, ntk: &BoundNetwork) -> Vec<NodeId> {
        let Some(seed) = ntk.foreach_gate().next() else {
            return Vec::new();
        };
        let mut wm = WindowManager::new();
        let window = wm.run(seed, ntk, self.config);
        let sim = WindowSimulator::new().run(&window, ntk, self.library);
        let mut profiler = P::default();
        profiler.init(&window, &sim, ntk, self.library, self.config);
        profiler.foreach_gate(ntk, self.library)
    }

    fn try_pivot<P: Profiler + Default>(
        &mut self,
        pivot: NodeId,
        ntk: &mut BoundNetwork,
        arrival: &[f64],
        window_manager: &mut WindowManager,
        simulator: &WindowSimulator,
        diag: &dyn Diagnostics,
    ) -> PivotOutcome {
        // Step 1.
        if ntk.is_dead(pivot) || ntk.is_pi(pivot) || ntk.is_constant(pivot) || !ntk.is_gate(pivot) {
            return PivotOutcome::Skipped;
        }
        let total_fanout: usize = (0..ntk.num_output_pins(pivot)).map(|p| ntk.fanout_size(pivot, p as u8)).sum();
        if total_fanout > self.config.fanout_limit {
            return PivotOutcome::Skipped;
        }

        // Step 2.
        let window = window_manager.run(pivot, ntk, self.config);
        if !window.valid(self.config) {
            return PivotOutcome::Skipped;
        }

        // Step 3.
        let simulation = simulator.run(&window, ntk, self.library);

        let mut profiler = P::default();
        profiler.init(&window, &simulation, ntk, self.library, self.config);

        // Steps 4-5.
        let mut best: Option<(f64, Signal)> = None;
        let mut consider = |candidate: Option<(f64, Signal)>, best: &mut Option<(f64, Signal)>| {
            if let Some((reward, signal)) = candidate {
                if best.as_ref().map(|(r, _)| reward > *r).unwrap_or(true) {
                    *best = Some((reward, signal));
                }
            }
        };

        if self.config.try_rewire {
            for cut in rewire_cuts(&window, &simulation, ntk, self.library, self.config) {
                consider(self.try_rewire_cut(&cut, pivot, ntk, &profiler, diag), &mut best);
            }
        } else {
            let mut cuts = structural_cuts(&window, &simulation, ntk, self.library, self.config);
            cuts.extend(window_cuts(&window, &simulation, ntk, self.library, self.config));
            for cut in cuts {
                consider(self.try_cut::<P>(&cut, ntk, arrival, &profiler, diag), &mut best);
            }
        }

        // Step 6.
        match best {
            Some((reward, signal)) if reward > 0.0 => {
                ntk.substitute_node(pivot, &[signal]);
                PivotOutcome::Substituted
            }
            _ => PivotOutcome::Rejected,
        }
    }

    /// A rewire candidate keeps the pivot's own gate binding, only its
    /// fanins change; `evaluate_rewiring` is the profiler's cheap
    /// specialization for exactly this (spec §4.10, §4.11 step 4).
    fn try_rewire_cut(
        &self,
        cut: &DependencyCut,
        pivot: NodeId,
        ntk: &mut BoundNetwork,
        profiler: &impl Profiler,
        diag: &dyn Diagnostics,
    ) -> Option<(f64, Signal)> {
        let reward = profiler.evaluate_rewiring(&cut.leaves, ntk, self.library);
        if reward <= 0.0 {
            return None;
        }
        let gate_id = ntk.binding(pivot).gate_id(0);
        let signal = ntk.create_node(cut.leaves.clone(), vec![gate_id], self.library, diag);
        Some((reward, signal))
    }

    /// Structural/window candidate: tries every care-respecting completion
    /// of the cut's function (spec §4.7's `foreach_dont_care_assignment`,
    /// §4.11 step 5), decomposing and matching each against the database.
    fn try_cut<P: Profiler>(
        &mut self,
        cut: &DependencyCut,
        ntk: &mut BoundNetwork,
        arrival: &[f64],
        profiler: &P,
        diag: &dyn Diagnostics,
    ) -> Option<(f64, Signal)> {
        let mut best: Option<(f64, Signal)> = None;
        for completion in foreach_dont_care_assignment(&cut.func) {
            let completed = TernaryTruthTable::from_binary(completion);
            if let Some(candidate) = self.try_cut_completion(&completed, &cut.leaves, ntk, arrival, profiler, diag) {
                if best.as_ref().map(|(r, _)| candidate.0 > *r).unwrap_or(true) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn try_cut_completion<P: Profiler>(
        &mut self,
        func: &TernaryTruthTable<crate::library::GateFunction>,
        leaves: &[Signal],
        ntk: &mut BoundNetwork,
        arrival: &[f64],
        profiler: &P,
        diag: &dyn Diagnostics,
    ) -> Option<(f64, Signal)> {
        let times = leaf_times(leaves, arrival);
        let specs = decompose(func, leaves, &times, self.config.max_cuts_size)?;

        let mut spec_outputs: Vec<Signal> = Vec::new();
        for spec in &specs {
            let mut spec_leaves = Vec::with_capacity(spec.inputs.len());
            let mut spec_times = Vec::with_capacity(spec.inputs.len());
            for input in &spec.inputs {
                match *input {
                    DecomposeInput::Leaf(sig) => {
                        spec_leaves.push(sig);
                        spec_times.push(arrival.get(sig.node().0 as usize).copied().unwrap_or(0.0));
                    }
                    DecomposeInput::FromSpec(idx) => {
                        spec_leaves.push(spec_outputs[idx]);
                        spec_times.push(0.0);
                    }
                }
            }

            let (row_idx, perm) = self.database.boolean_matching(&spec.func, &mut spec_times)?;
            let mut permuted_leaves = spec_leaves.clone();
            for (i, &leaf) in spec_leaves.iter().enumerate() {
                permuted_leaves[perm.image(i)] = leaf;
            }

            let num_entries = self.database.row(row_idx).entries.len();
            let mut best_entry: Option<(f64, Signal)> = None;
            for entry_idx in 0..num_entries {
                let candidate_signal = self.database.write_entry(ntk, row_idx, entry_idx, &permuted_leaves, diag);
                if let Some((chain, _)) = extract(ntk, &permuted_leaves, candidate_signal) {
                    let reward = profiler.evaluate(&chain, &permuted_leaves, ntk, self.library);
                    if best_entry.as_ref().map(|(r, _)| reward > *r).unwrap_or(true) {
                        best_entry = Some((reward, candidate_signal));
                    }
                }
            }
            let (_, signal) = best_entry?;
            spec_outputs.push(signal);
        }

        let final_signal = *spec_outputs.last()?;
        let (final_chain, _) = extract(ntk, leaves, final_signal)?;
        let reward = profiler.evaluate(&final_chain, leaves, ntk, self.library);
        Some((reward, final_signal))
    }
}

fn leaf_times(leaves: &[Signal], arrival: &[f64]) -> Vec<f64> {
    leaves.iter().map(|s| arrival.get(s.node().0 as usize).copied().unwrap_or(0.0)).collect()
}
