use serde::{Deserialize, Serialize};

use crate::TruthTable;

/// A Boolean function over `{0, 1, X}`: a bit table plus a care mask, used
/// wherever a function is only partially specified, e.g. a window's local
/// observability don't-cares or a dependency cut's free minterms.
///
/// `bits` holds the function's value where `care` is set; the value at a
/// don't-care minterm is unspecified (conventionally `0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TernaryTruthTable<T> {
    bits: T,
    care: T,
}

impl<T: TruthTable> TernaryTruthTable<T> {
    /// Wraps a fully-specified function: every minterm is cared about.
    pub fn from_binary(bits: T) -> Self {
        let care = T::const1(bits.num_vars());
        Self { bits, care }
    }

    pub fn new(bits: T, care: T) -> Self {
        assert_eq!(bits.num_vars(), care.num_vars());
        Self { bits, care }
    }

    pub fn num_vars(&self) -> usize {
        self.bits.num_vars()
    }

    pub fn bits(&self) -> &T {
        &self.bits
    }

    pub fn care(&self) -> &T {
        &self.care
    }

    /// Whether minterm `m` is cared about.
    pub fn is_cared(&self, m: usize) -> bool {
        self.care.get_bit(m)
    }

    /// The ternary value at minterm `m`: `Some(bit)` if cared, `None` if a
    /// don't-care.
    pub fn get(&self, m: usize) -> Option<bool> {
        if self.is_cared(m) {
            Some(self.bits.get_bit(m))
        } else {
            None
        }
    }

    pub fn set_care(&mut self, m: usize, value: Option<bool>) {
        match value {
            Some(b) => {
                self.care.set_bit(m, true);
                self.bits.set_bit(m, b);
            }
            None => {
                self.care.set_bit(m, false);
                self.bits.set_bit(m, false);
            }
        }
    }

    /// Whether `other` agrees with `self` on every minterm `self` cares
    /// about (`other` may additionally specify or leave open don't-cares of
    /// its own). Used to check that a candidate replacement function is
    /// compatible with a cut's required behavior.
    pub fn is_compatible_with(&self, other: &T) -> bool {
        (0..self.bits.num_bits()).all(|m| !self.is_cared(m) || self.bits.get_bit(m) == other.get_bit(m))
    }

    /// One fully-specified completion of this ternary function, setting
    /// every don't-care minterm to `0`.
    pub fn completion_all_zero(&self) -> T {
        self.bits.clone()
    }

    /// One fully-specified completion of this ternary function, setting
    /// every don't-care minterm to `1`.
    pub fn completion_all_one(&self) -> T {
        self.bits.bit_or(&self.care.bit_not())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticTruthTable;

    #[test]
    fn fully_cared_ternary_round_trips_to_binary() {
        let f = StaticTruthTable::<2>::nth_var(2, 0);
        let t = TernaryTruthTable::from_binary(f.clone());
        assert!(t.is_compatible_with(&f));
        assert_eq!(t.completion_all_zero(), f);
        assert_eq!(t.completion_all_one(), f);
    }

    #[test]
    fn dont_care_minterm_accepts_either_completion() {
        let bits = StaticTruthTable::<2>::const0(2);
        let mut care = StaticTruthTable::<2>::const1(2);
        care.set_bit(3, false);
        let t = TernaryTruthTable::new(bits, care);
        assert_eq!(t.get(3), None);
        assert_eq!(t.get(0), Some(false));

        let mut candidate = StaticTruthTable::<2>::const0(2);
        assert!(t.is_compatible_with(&candidate));
        candidate.set_bit(3, true);
        assert!(t.is_compatible_with(&candidate));
        candidate.set_bit(0, true);
        assert!(!t.is_compatible_with(&candidate));
    }
}
