//! Mapped database (C10): indexes Pareto-optimal chains per P-canonical
//! function and answers Boolean-matching queries (spec §4.8). Grounded on
//! `original_source/include/rinox/databases/mapped_database.hpp`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rinox_truth::{p_canonize, Permutation, TruthTable};
use rinox_util::diagnostics::Diagnostics;

use crate::chain::{extract, get_longest_paths, insert, perm_canonize, time_canonize, BoundChain};
use crate::library::{AugmentedLibrary, GateFunction};
use crate::network::{BoundNetwork, Signal};
use crate::sim::{simulate_bound_chain, switching_activity};

/// One Pareto-optimal realization of a row's canonical function.
#[derive(Debug, Clone)]
pub struct DatabaseEntry {
    pub area: f64,
    pub switches: usize,
    pub delays: Vec<f64>,
    pub impl_signal: Signal,
}

impl DatabaseEntry {
    /// Whether `self` is at least as good as `other` on every metric, and
    /// strictly better on at least one (spec §4.8 step 4).
    fn dominates(&self, other: &DatabaseEntry) -> bool {
        let area_ok = self.area <= other.area;
        let switches_ok = self.switches <= other.switches;
        let delays_ok = self.delays.iter().zip(&other.delays).all(|(a, b)| a <= b);
        if !(area_ok && switches_ok && delays_ok) {
            return false;
        }
        self.area < other.area
            || self.switches < other.switches
            || self.delays.iter().zip(&other.delays).any(|(a, b)| a < b)
    }
}

/// All entries sharing one P-canonical function, plus the symmetry groups
/// of that function (used to align arrival times during matching).
#[derive(Debug, Clone)]
pub struct DatabaseRow {
    pub repr: GateFunction,
    pub symmetry_groups: Vec<Vec<usize>>,
    pub entries: Vec<DatabaseEntry>,
}

/// Groups of pairwise input-symmetric variables of `f`: `i` and `j` are
/// symmetric if swapping them leaves `f` unchanged. Symmetry is treated as
/// transitive (a simplification valid for the input-symmetric standard-cell
/// functions this database actually stores).
fn symmetry_groups(f: &GateFunction) -> Vec<Vec<usize>> {
    let n = f.num_vars();
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let mut image: Vec<usize> = (0..n).collect();
            image.swap(i, j);
            let swapped = f.permute_inputs(&Permutation::from_image(image));
            if swapped == *f {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }
    let mut groups: std::collections::BTreeMap<usize, Vec<usize>> = std::collections::BTreeMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

/// Per-canonical-function Pareto chain storage with a cache of prior
/// matching decisions (spec §4.8). Owns an internal network that holds
/// every stored chain's implementation, rooted at a shared set of
/// canonical primary inputs.
pub struct MappedDatabase {
    library: AugmentedLibrary,
    network: BoundNetwork,
    canonical_pis: Vec<Signal>,
    func_to_match: Vec<(GateFunction, usize, Permutation)>,
    rows: Vec<DatabaseRow>,
}

impl MappedDatabase {
    pub fn new(library: AugmentedLibrary) -> Self {
        Self {
            library,
            network: BoundNetwork::new(),
            canonical_pis: Vec::new(),
            func_to_match: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> &DatabaseRow {
        &self.rows[idx]
    }

    fn ensure_canonical_pis(&mut self, n: usize) {
        while self.canonical_pis.len() < n {
            self.canonical_pis.push(self.network.create_pi());
        }
    }

    /// Caches `tt`'s P-canonical row and recovering permutation, computing
    /// it on first sight (spec §4.8 step 2). `func_to_match` is a flat
    /// association list rather than a hash map because `GateFunction`
    /// (`DynamicTruthTable`) does not derive `Hash`.
    fn memoize_func(&mut self, tt: &GateFunction) -> (usize, Permutation) {
        if let Some((_, row, perm)) = self.func_to_match.iter().find(|(f, _, _)| f == tt) {
            return (*row, perm.clone());
        }
        let canon = p_canonize(tt);
        let row_idx = self
            .rows
            .iter()
            .position(|r| r.repr == canon.repr)
            .unwrap_or_else(|| {
                let idx = self.rows.len();
                self.rows.push(DatabaseRow {
                    repr: canon.repr.clone(),
                    symmetry_groups: symmetry_groups(&canon.repr),
                    entries: Vec::new(),
                });
                idx
            });
        self.func_to_match.push((tt.clone(), row_idx, canon.perm.clone()));
        (row_idx, canon.perm)
    }

    /// Inserts `chain` (spec §4.8 "Insertion"). Returns whether the
    /// database changed: `false` if an existing entry of the row dominates
    /// it, `true` if it was appended (possibly displacing dominated
    /// entries).
    pub fn add(&mut self, chain: &BoundChain, diag: &dyn Diagnostics) -> bool {
        let n = chain.num_inputs();
        let inputs: Vec<GateFunction> = (0..n).map(|i| GateFunction::nth_var(n, i)).collect();
        let values = simulate_bound_chain(chain, &inputs, &self.library);
        let tt = values[chain.outputs()[0].0].clone();

        let (row_idx, perm) = self.memoize_func(&tt);
        let canon_chain = perm_canonize(chain, &perm);
        // Among functionally symmetric inputs, canonicalize further on the
        // chain's own internal criticality so two chains that differ only in
        // how they happened to order symmetric inputs insert identically.
        let groups = self.rows[row_idx].symmetry_groups.clone();
        let (canon_chain, _) = time_canonize(&canon_chain, &self.library, &groups);

        self.ensure_canonical_pis(n);
        let leaves = &self.canonical_pis[..n];
        let impl_signal = insert(&mut self.network, leaves, &canon_chain, &self.library, diag);

        let area = canon_chain.area(&self.library);
        let switches = switching_activity(&values, n);
        let delays = get_longest_paths(&canon_chain, &self.library);
        let candidate = DatabaseEntry { area, switches, delays, impl_signal };

        let row = &mut self.rows[row_idx];
        if row.entries.iter().any(|e| e.dominates(&candidate)) {
            return false;
        }
        let dominated: Vec<usize> = row
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| candidate.dominates(e))
            .map(|(i, _)| i)
            .collect();
        for &i in dominated.iter().rev() {
            let old = row.entries.remove(i);
            self.network.substitute_node(old.impl_signal.node(), &[candidate.impl_signal]);
        }
        self.rows[row_idx].entries.push(candidate);
        true
    }

    /// Boolean matching (spec §4.8): resolves `q`'s canonical row,
    /// permutes `times` into canonical order in place, then sorts each
    /// symmetry group of the row by descending time so the latest-arriving
    /// input lands on the group's fastest (lowest-indexed) slot. Returns
    /// the combined permutation the caller must also apply to its own
    /// parallel arrays (fanin signals, signatures), and the matched row id.
    pub fn boolean_matching(&mut self, q: &GateFunction, times: &mut [f64]) -> Option<(usize, Permutation)> {
        let (row_idx, perm) = self.memoize_func(q);
        let n = perm.len();
        if times.len() != n {
            return None;
        }
        let mut permuted = vec![0.0; n];
        for i in 0..n {
            permuted[perm.image(i)] = times[i];
        }

        let groups = self.rows[row_idx].symmetry_groups.clone();
        let mut slot_perm: Vec<usize> = (0..n).collect();
        for group in &groups {
            let mut positions = group.clone();
            positions.sort_unstable();
            let mut by_time = group.clone();
            by_time.sort_by(|&a, &b| permuted[b].partial_cmp(&permuted[a]).unwrap());
            for (&slot, &member) in positions.iter().zip(by_time.iter()) {
                slot_perm[member] = slot;
            }
        }
        let time_perm = Permutation::from_image(slot_perm);
        let mut final_times = vec![0.0; n];
        for i in 0..n {
            final_times[time_perm.image(i)] = permuted[i];
        }
        times.copy_from_slice(&final_times);

        Some((row_idx, perm.then(&time_perm)))
    }

    /// Writes one of a matched row's entries into `host`, mapping the
    /// database's canonical PIs to `leaves` (spec §4.8 "Write"). `leaves`
    /// must already be in the order the returned permutation expects.
    pub fn write_entry(
        &self,
        host: &mut BoundNetwork,
        row_idx: usize,
        entry_idx: usize,
        leaves: &[Signal],
        diag: &dyn Diagnostics,
    ) -> Signal {
        let entry = &self.rows[row_idx].entries[entry_idx];
        let n = leaves.len();
        let (chain, final_inputs) = extract(&self.network, &self.canonical_pis[..n], entry.impl_signal)
            .expect("a stored entry's implementation must be extractable");
        let mapped: Vec<Signal> = final_inputs
            .iter()
            .map(|pi| {
                let idx = self.canonical_pis[..n].iter().position(|p| p == pi).unwrap_or(0);
                leaves[idx]
            })
            .collect();
        insert(host, &mapped, &chain, &self.library, diag)
    }

    /// Persists every stored entry as `{chain, delays}` (spec §6.4). The
    /// row/canonical-repr structure is not itself serialized; reloading
    /// rebuilds it from scratch by re-`add`ing each chain.
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Persisted {
            chain: BoundChain,
            delays: Vec<f64>,
        }
        let mut persisted = Vec::new();
        for row in &self.rows {
            for entry in &row.entries {
                let n = entry.delays.len();
                let (chain, _) = extract(&self.network, &self.canonical_pis[..n], entry.impl_signal)
                    .context("stored entry's implementation was not extractable")?;
                persisted.push(Persisted { chain, delays: entry.delays.clone() });
            }
        }
        serde_json::to_string(&persisted).context("serializing mapped database")
    }

    /// Reloads a database previously written by `to_json`, re-inserting
    /// each persisted chain (spec §6.4).
    pub fn from_json_str(s: &str, library: AugmentedLibrary, diag: &dyn Diagnostics) -> Result<Self> {
        #[derive(Deserialize)]
        struct Persisted {
            chain: BoundChain,
            #[serde(rename = "delays")]
            _delays: Vec<f64>,
        }
        let persisted: Vec<Persisted> = serde_json::from_str(s).context("parsing mapped database json")?;
        let mut db = Self::new(library);
        for entry in persisted {
            db.add(&entry.chain, diag);
        }
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{bound_chain::Chain, ChainGate, Literal};
    use crate::library::{GateId, InnerChain, LibraryGate, Pin, Primitive};
    use rinox_util::diagnostics::NullDiagnostics;

    fn and2_library() -> AugmentedLibrary {
        let mut lib = AugmentedLibrary::new();
        let a = GateFunction::nth_var(2, 0);
        let b = GateFunction::nth_var(2, 1);
        let pin = Pin {
            name: "a".into(),
            rise_delay: 1.0,
            fall_delay: 1.0,
            rise_capacitance: 0.1,
            fall_capacitance: 0.1,
        };
        let gate = LibraryGate::new("and2", 1.0, 2, a.bit_and(&b), vec![pin.clone(), pin]);
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

    fn and_chain() -> BoundChain {
        Chain::new(
            2,
            vec![ChainGate {
                fanins: vec![Literal(0), Literal(1)],
                binding: GateId(0),
            }],
            vec![Literal(2)],
        )
    }

    #[test]
    fn adding_the_same_chain_twice_leaves_the_database_unchanged() {
        let lib = and2_library();
        let diag = NullDiagnostics;
        let mut db = MappedDatabase::new(lib);
        assert!(db.add(&and_chain(), &diag));
        assert_eq!(db.num_rows(), 1);
        assert_eq!(db.row(0).entries.len(), 1);
        assert!(!db.add(&and_chain(), &diag));
        assert_eq!(db.row(0).entries.len(), 1);
    }

    #[test]
    fn and_truth_table_is_symmetric_in_both_inputs() {
        let a = GateFunction::nth_var(2, 0);
        let b = GateFunction::nth_var(2, 1);
        let groups = symmetry_groups(&a.bit_and(&b));
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn boolean_matching_finds_the_row_just_added() {
        let lib = and2_library();
        let diag = NullDiagnostics;
        let mut db = MappedDatabase::new(lib);
        db.add(&and_chain(), &diag);

        let q = GateFunction::nth_var(2, 0).bit_and(&GateFunction::nth_var(2, 1));
        let mut times = vec![1.0, 2.0];
        let result = db.boolean_matching(&q, &mut times);
        assert!(result.is_some());
    }
}
