//! Dependency finder (C9): given a simulated window, enumerates candidate
//! cuts a replacement could realize (spec §4.7). Grounded on
//! `dependency_cut.hpp`'s `dependency_cut_t { type, root, leaves, func }`.

use itertools::Itertools;
use rinox_truth::{TernaryTruthTable, TruthTable};

use crate::chain::extract;
use crate::config::ResynthesisConfig;
use crate::library::{AugmentedLibrary, GateFunction};
use crate::network::{BoundNetwork, Signal};
use crate::sim::{simulate_bound_chain, simulate_gate};
use crate::window::{Window, WindowSimulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Rewire,
    Structural,
    Window,
}

/// A candidate cut: a function the pivot must realize from `leaves`,
/// possibly with don't-cares where the window's care mask leaves freedom.
#[derive(Debug, Clone)]
pub struct DependencyCut {
    pub kind: DependencyKind,
    pub leaves: Vec<Signal>,
    pub func: TernaryTruthTable<GateFunction>,
}

/// Enumerates all completions of a ternary function's don't-care minterms
/// by brute-force bit assignment (grounded on
/// `function_enumerator::foreach_dont_care_assignment`). Used to try
/// multiple care-respecting completions of a cut's function against the
/// database (spec §4.11 step 5). Bounded to at most `2^20` completions;
/// beyond that only the all-zero and all-one completions are tried.
pub fn foreach_dont_care_assignment(func: &TernaryTruthTable<GateFunction>) -> Vec<GateFunction> {
    let dont_cares: Vec<usize> = (0..func.bits().num_bits()).filter(|&m| !func.is_cared(m)).collect();
    if dont_cares.len() > 20 {
        return vec![func.completion_all_zero(), func.completion_all_one()];
    }
    let mut out = Vec::with_capacity(1usize << dont_cares.len());
    for assignment in 0..(1usize << dont_cares.len()) {
        let mut f = func.bits().clone();
        for (i, &m) in dont_cares.iter().enumerate() {
            let bit = (assignment >> i) & 1 == 1;
            f.set_bit(m, bit);
        }
        out.push(f);
    }
    out
}

/// Rewire candidates: alternative fanin sets of the pivot's existing
/// arity, drawn from the window's divisors, whose induced joint signature
/// matches the pivot's output signature under the care mask, keeping the
/// pivot's own gate binding (spec §4.7 "Rewire").
pub fn rewire_cuts(
    window: &Window,
    sim: &WindowSimulation,
    ntk: &BoundNetwork,
    library: &AugmentedLibrary,
    config: &ResynthesisConfig,
) -> Vec<DependencyCut> {
    if !config.try_rewire {
        return Vec::new();
    }
    let arity = ntk.fanin_size(window.pivot);
    if arity == 0 || arity > config.max_cuts_size {
        return Vec::new();
    }
    let target = sim.output_values.first().cloned().unwrap_or_else(|| GateFunction::const0(1));
    let target_ternary = TernaryTruthTable::new(target, sim.care.clone());

    let mut cuts = Vec::new();
    for combo in combinations(window.divisors.len(), arity) {
        let leaves: Vec<Signal> = combo.iter().map(|&i| window.divisors[i]).collect();
        if leaves.iter().all(|l| ntk.foreach_fanin(window.pivot).any(|f| f == *l)) {
            continue;
        }
        let values: Vec<GateFunction> = combo.iter().map(|&i| sim.values[&window.divisors[i]].clone()).collect();
        if let Some(joint) = combine_same_gate(ntk, window.pivot, &values, library) {
            if target_ternary.is_compatible_with(&joint) {
                cuts.push(DependencyCut { kind: DependencyKind::Rewire, leaves, func: target_ternary.clone() });
            }
        }
    }
    cuts
}

/// Simulates the pivot's own gate binding against substituted fanin
/// signatures, so a rewire candidate's functional agreement can be checked
/// without rebuilding a node (spec §8's substitution-equivalence invariant).
fn combine_same_gate(
    ntk: &BoundNetwork,
    pivot: crate::network::NodeId,
    fanins: &[GateFunction],
    library: &AugmentedLibrary,
) -> Option<GateFunction> {
    if fanins.len() != ntk.fanin_size(pivot) {
        return None;
    }
    let gate_id = ntk.binding(pivot).gate_id(0);
    Some(simulate_gate(gate_id, fanins, library))
}

/// Re-derives a cut's own Boolean function directly from `leaves`, rather
/// than reusing the window's full-input-width signature: a cut's leaf set
/// is usually narrower than (and differently ordered from) `window.inputs`,
/// so the two alphabets don't line up bit-for-bit. Extracts the pivot's
/// cone bounded by `leaves` and simulates it fresh over `leaves.len()`
/// projection variables. Returns `None` if `leaves` doesn't actually bound
/// the cone (extraction had to grow past it) rather than produce a
/// function over the wrong variables.
///
/// The window's own care mask is reused only when `leaves` is exactly
/// `window.inputs` (same sequence); any narrower or reordered cut is
/// treated as fully cared. That undercounts don't-care opportunity for
/// such cuts but never misattributes one, since over-constraining care
/// only loses candidate matches, it never accepts a wrong one.
fn local_function(
    ntk: &BoundNetwork,
    library: &AugmentedLibrary,
    leaves: &[Signal],
    root: Signal,
    window: &Window,
    sim: &WindowSimulation,
) -> Option<TernaryTruthTable<GateFunction>> {
    let (chain, final_inputs) = extract(ntk, leaves, root)?;
    if final_inputs.len() != leaves.len() {
        return None;
    }
    let n = final_inputs.len();
    let inputs: Vec<GateFunction> = (0..n).map(|i| GateFunction::nth_var(n.max(1), i)).collect();
    let values = simulate_bound_chain(&chain, &inputs, library);
    let bits = values[chain.outputs()[0].0].clone();
    let care = if final_inputs == window.inputs { sim.care.clone() } else { GateFunction::const1(n.max(1)) };
    Some(TernaryTruthTable::new(bits, care))
}

/// Structural cuts (spec §4.7 "Structural"): bottom-up cut enumeration
/// rooted at the pivot, bounded by `max_cuts_size`, over the window's MFFC
/// topology. A node's cuts are either the trivial `{node}` leaf cut or the
/// union of one cut from each fanin, when the union size stays within
/// bound.
pub fn structural_cuts(
    window: &Window,
    sim: &WindowSimulation,
    ntk: &BoundNetwork,
    library: &AugmentedLibrary,
    config: &ResynthesisConfig,
) -> Vec<DependencyCut> {
    if !config.try_struct {
        return Vec::new();
    }
    let mut per_node_cuts: hashbrown::HashMap<crate::network::NodeId, Vec<Vec<Signal>>> = hashbrown::HashMap::new();
    let mut mffc_sorted = window.mffc.clone();
    mffc_sorted.sort_by_key(|n| ntk.level(*n));

    for &n in &mffc_sorted {
        let mut cuts = vec![vec![Signal::new(n, 0)]];
        let fanins: Vec<Signal> = ntk.foreach_fanin(n).collect();
        let fanin_cut_lists: Vec<Vec<Vec<Signal>>> = fanins
            .iter()
            .map(|f| {
                per_node_cuts
                    .get(&f.node())
                    .cloned()
                    .unwrap_or_else(|| vec![vec![*f]])
            })
            .collect();
        for combo in cartesian_product(&fanin_cut_lists) {
            let mut merged: Vec<Signal> = combo.into_iter().flatten().collect();
            merged.sort_by_key(|s| s.node().0);
            merged.dedup();
            if merged.len() <= config.max_cuts_size {
                cuts.push(merged);
            }
        }
        cuts.sort_by_key(|c| c.len());
        cuts.truncate(16);
        per_node_cuts.insert(n, cuts);
    }

    let empty = Vec::new();
    let pivot_cuts = per_node_cuts.get(&window.pivot).unwrap_or(&empty);
    let root = Signal::new(window.pivot, 0);

    pivot_cuts
        .iter()
        .filter(|leaves| leaves.len() > 1 || leaves[0] != root)
        .filter_map(|leaves| {
            let func = local_function(ntk, library, leaves, root, window, sim)?;
            Some(DependencyCut { kind: DependencyKind::Structural, leaves: leaves.clone(), func })
        })
        .collect()
}

/// Window cuts (spec §4.7 "Window"): subsets of divisors (not necessarily
/// structural) whose joint signature functionally dominates the pivot's
/// output signature under the care mask.
pub fn window_cuts(window: &Window, sim: &WindowSimulation, ntk: &BoundNetwork, library: &AugmentedLibrary, config: &ResynthesisConfig) -> Vec<DependencyCut> {
    if !config.try_window {
        return Vec::new();
    }
    let target = sim.output_values.first().cloned().unwrap_or_else(|| GateFunction::const0(1));
    let root = Signal::new(window.pivot, 0);

    let mut cuts = Vec::new();
    let max_size = config.max_cuts_size.min(window.divisors.len());
    for size in 1..=max_size {
        for combo in combinations(window.divisors.len(), size) {
            let leaves: Vec<Signal> = combo.iter().map(|&i| window.divisors[i]).collect();
            let signature_dominates = leaves
                .iter()
                .any(|l| sim.values.get(l).map(|v| *v == target).unwrap_or(false));
            if signature_dominates || size == max_size {
                if let Some(func) = local_function(ntk, library, &leaves, root, window, sim) {
                    cuts.push(DependencyCut { kind: DependencyKind::Window, leaves, func });
                }
            }
        }
        if cuts.len() > 64 {
            break;
        }
    }
    cuts
}

fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    (0..n).combinations(k).collect()
}

fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().map(|l| l.iter().cloned()).multi_cartesian_product().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_of_three_choose_two_has_three_entries() {
        let combos = combinations(3, 2);
        assert_eq!(combos.len(), 3);
        assert!(combos.contains(&vec![0, 1]));
        assert!(combos.contains(&vec![1, 2]));
    }

    #[test]
    fn foreach_dont_care_assignment_yields_every_completion_for_one_dont_care() {
        use rinox_truth::StaticTruthTable;
        let mut bits = StaticTruthTable::<1>::const0(1);
        bits.set_bit(0, true);
        let mut care = StaticTruthTable::<1>::const1(1);
        care.set_bit(1, false);
        let func: TernaryTruthTable<rinox_truth::DynamicTruthTable> = TernaryTruthTable::new(
            widen(&bits),
            widen(&care),
        );
        let completions = foreach_dont_care_assignment(&func);
        assert_eq!(completions.len(), 2);
    }

    fn widen(t: &rinox_truth::StaticTruthTable<1>) -> rinox_truth::DynamicTruthTable {
        let mut out = rinox_truth::DynamicTruthTable::new(1);
        for m in 0..2 {
            out.set_bit(m, t.get_bit(m));
        }
        out
    }
}
