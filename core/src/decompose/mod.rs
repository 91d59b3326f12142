//! LUT decomposer (C12): reduces a cut's function to a sequence of
//! subfunctions each narrow enough for the database's `max_num_vars`
//! (spec §4.9).

use rinox_truth::{Permutation, TernaryTruthTable, TruthTable};

use crate::library::GateFunction;
use crate::network::Signal;

/// One input to a `DecomposeSpec`: either an existing window leaf, or the
/// not-yet-synthesized output of an earlier spec in the same sequence
/// (referenced by index). Avoids needing a placeholder `Signal` for a gate
/// that doesn't exist until the driver actually synthesizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecomposeInput {
    Leaf(Signal),
    FromSpec(usize),
}

/// One subfunction to synthesize, over `inputs.len() <= max_num_vars`
/// variables. A caller walks the returned sequence in order, synthesizing
/// each spec's `func` via the database and wiring `FromSpec` references to
/// the signal produced by the earlier spec.
#[derive(Debug, Clone)]
pub struct DecomposeSpec {
    pub inputs: Vec<DecomposeInput>,
    pub func: GateFunction,
}

fn insert_bit(m: usize, pos: usize, bit: bool) -> usize {
    let low = m & ((1 << pos) - 1);
    let high = m >> pos;
    (high << (pos + 1)) | ((bit as usize) << pos) | low
}

/// Rebuilds a function one variable narrower from a cofactor already known
/// to be independent of `var`, reindexing minterms to skip bit position
/// `var`.
fn drop_var<T: TruthTable>(f: &T, var: usize) -> T {
    let n = f.num_vars();
    let mut out = T::const0(n - 1);
    for m in 0..out.num_bits() {
        let full = insert_bit(m, var, false);
        out.set_bit(m, f.get_bit(full));
    }
    out
}

/// Checks whether `var` can be dropped under the function's don't-cares,
/// returning a version of `bits`/`care` (same width) with `var` resolved to
/// be provably independent if so.
fn try_merge_var<T: TruthTable>(bits: &T, care: &T, var: usize) -> Option<(T, T)> {
    let n = bits.num_vars();
    let b0 = bits.cofactor0(var);
    let b1 = bits.cofactor1(var);
    let c0 = care.cofactor0(var);
    let c1 = care.cofactor1(var);
    let mut new_bits = T::const0(n);
    let mut new_care = T::const0(n);
    for m in 0..new_bits.num_bits() {
        let both_cared = c0.get_bit(m) && c1.get_bit(m);
        if both_cared && b0.get_bit(m) != b1.get_bit(m) {
            return None;
        }
        let (cared, val) = if c0.get_bit(m) {
            (true, b0.get_bit(m))
        } else if c1.get_bit(m) {
            (true, b1.get_bit(m))
        } else {
            (false, false)
        };
        new_bits.set_bit(m, val);
        new_care.set_bit(m, cared);
    }
    Some((new_bits, new_care))
}

/// Support minimization (spec §4.9 step 1): repeatedly drops any variable
/// whose two cofactors agree everywhere both are cared about, updating
/// `leaves`/`times` in lockstep.
pub fn minimize_support(
    func: &TernaryTruthTable<GateFunction>,
    leaves: &mut Vec<Signal>,
    times: &mut Vec<f64>,
) -> TernaryTruthTable<GateFunction> {
    let mut bits = func.bits().clone();
    let mut care = func.care().clone();
    let mut var = 0;
    while leaves.len() > 1 && var < leaves.len() {
        if let Some((merged_bits, merged_care)) = try_merge_var(&bits, &care, var) {
            bits = drop_var(&merged_bits, var);
            care = drop_var(&merged_care, var);
            leaves.remove(var);
            times.remove(var);
        } else {
            var += 1;
        }
    }
    TernaryTruthTable::new(bits, care)
}

/// Top-level entry point (spec §4.9): minimizes support, then emits a
/// single spec if it already fits `max_num_vars`, else recursively
/// 2-decomposes. Returns `None` if decomposition cannot bring the function
/// within `max_num_vars` (step 4, "fail: the cut is rejected").
pub fn decompose(
    func: &TernaryTruthTable<GateFunction>,
    leaves: &[Signal],
    times: &[f64],
    max_num_vars: usize,
) -> Option<Vec<DecomposeSpec>> {
    let mut leaves = leaves.to_vec();
    let mut times = times.to_vec();
    let minimized = minimize_support(func, &mut leaves, &mut times);
    let mut specs = Vec::new();
    decompose_rec(minimized.bits().clone(), minimized.care().clone(), leaves, times, max_num_vars, &mut specs)?;
    Some(specs)
}

/// One 2-decomposition step (spec §4.9 step 3): the `free_count =
/// max_num_vars - 1` most timing-critical variables stay at the top level;
/// the rest form the bound set. Column-multiplicity test: enumerate every
/// bound-set assignment's row (over free-set assignments); if at most two
/// distinct rows occur, the bound set collapses into one synthesized input
/// `g`, and a top function `h` over the free inputs plus `g` reproduces
/// `f` exactly. `g` is emitted first (so its spec index is known) and
/// recursed into if it is still too wide; `h` is emitted last, referencing
/// `g`'s spec by index.
fn decompose_rec(
    bits: GateFunction,
    care: GateFunction,
    leaves: Vec<Signal>,
    times: Vec<f64>,
    max_num_vars: usize,
    specs: &mut Vec<DecomposeSpec>,
) -> Option<()> {
    let n = leaves.len();
    if n <= max_num_vars {
        specs.push(DecomposeSpec {
            inputs: leaves.iter().map(|&s| DecomposeInput::Leaf(s)).collect(),
            func: bits,
        });
        return Some(());
    }
    if max_num_vars < 2 {
        return None;
    }

    let free_count = max_num_vars - 1;
    let bound_size = n - free_count;
    if bound_size > 20 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| times[a].partial_cmp(&times[b]).unwrap());
    let bound_vars = order[..bound_size].to_vec();
    let free_vars = order[bound_size..].to_vec();

    let mut perm_image = vec![0usize; n];
    for (pos, &v) in free_vars.iter().enumerate() {
        perm_image[v] = pos;
    }
    for (pos, &v) in bound_vars.iter().enumerate() {
        perm_image[v] = free_count + pos;
    }
    let perm = Permutation::from_image(perm_image);
    let pbits = bits.permute_inputs(&perm);
    let pcare = care.permute_inputs(&perm);

    let total_bound = 1usize << bound_size;
    let total_free = 1usize << free_count;
    let mut distinct_rows: Vec<(Vec<bool>, Vec<bool>)> = Vec::new();
    let mut row_of_bound = vec![0usize; total_bound];

    for bv in 0..total_bound {
        let mut values = vec![false; total_free];
        let mut cares = vec![false; total_free];
        for fv in 0..total_free {
            let m = (bv << free_count) | fv;
            if pcare.get_bit(m) {
                cares[fv] = true;
                values[fv] = pbits.get_bit(m);
            }
        }
        let matched = distinct_rows.iter().position(|(vals, crs)| {
            (0..total_free).all(|fv| !(cares[fv] && crs[fv]) || values[fv] == vals[fv])
        });
        match matched {
            Some(i) => {
                for fv in 0..total_free {
                    if cares[fv] && !distinct_rows[i].1[fv] {
                        distinct_rows[i].1[fv] = true;
                        distinct_rows[i].0[fv] = values[fv];
                    }
                }
                row_of_bound[bv] = i;
            }
            None => {
                if distinct_rows.len() >= 2 {
                    return None;
                }
                distinct_rows.push((values, cares));
                row_of_bound[bv] = distinct_rows.len() - 1;
            }
        }
    }

    let mut g_bits = GateFunction::const0(bound_size);
    for bv in 0..total_bound {
        g_bits.set_bit(bv, row_of_bound[bv] == 1);
    }
    let g_care = GateFunction::const1(bound_size);
    let g_leaves: Vec<Signal> = bound_vars.iter().map(|&v| leaves[v]).collect();
    let g_times: Vec<f64> = bound_vars.iter().map(|&v| times[v]).collect();

    decompose_rec(g_bits, g_care, g_leaves, g_times, max_num_vars, specs)?;
    let residual_spec_index = specs.len() - 1;

    let mut h_bits = GateFunction::const0(free_count + 1);
    for (y, (vals, crs)) in distinct_rows.iter().enumerate() {
        for fv in 0..total_free {
            if crs[fv] {
                h_bits.set_bit((y << free_count) | fv, vals[fv]);
            }
        }
    }
    let mut h_inputs: Vec<DecomposeInput> = free_vars.iter().map(|&v| DecomposeInput::Leaf(leaves[v])).collect();
    h_inputs.push(DecomposeInput::FromSpec(residual_spec_index));
    specs.push(DecomposeSpec { inputs: h_inputs, func: h_bits });
    Some(())
}
