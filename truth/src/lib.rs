//! Fixed- and variable-width Boolean truth tables, ternary (don't-care)
//! truth tables, permutations, and NPN/P canonization.
//!
//! This is the truth-table kernel (component C1): everything above it in
//! the resynthesis core treats Boolean functions as values of the types
//! defined here, simulated bit-parallel over 64-bit words.

mod dynamic_tt;
mod npn;
mod perm;
mod static_tt;
mod ternary;

pub use dynamic_tt::DynamicTruthTable;
pub use npn::{p_canonize, PCanonResult};
pub use perm::Permutation;
pub use static_tt::StaticTruthTable;
pub use ternary::TernaryTruthTable;

/// Common bit-parallel operations shared by fixed- and variable-width truth
/// tables. A truth table over `n` variables is a length `2^n` bit vector;
/// bit `m` (read as an `n`-bit binary number, LSB = variable 0) holds the
/// function's value at the minterm where variable `i` is `(m >> i) & 1`.
pub trait TruthTable: Clone + PartialEq + Eq {
    /// Number of Boolean variables.
    fn num_vars(&self) -> usize;

    /// Number of minterms, `2^num_vars`.
    fn num_bits(&self) -> usize {
        1usize << self.num_vars()
    }

    /// Value of the function at minterm `m`.
    fn get_bit(&self, m: usize) -> bool;

    /// Set the value of the function at minterm `m`.
    fn set_bit(&mut self, m: usize, value: bool);

    /// Number of minterms at which the function is `1`.
    fn count_ones(&self) -> usize {
        (0..self.num_bits()).filter(|&m| self.get_bit(m)).count()
    }

    /// Number of minterms at which the function is `0`.
    fn count_zeros(&self) -> usize {
        self.num_bits() - self.count_ones()
    }

    /// Positive cofactor with respect to variable `var`: the sub-function
    /// obtained by fixing `var = 1`, replicated back to `num_vars` bits.
    fn cofactor1(&self, var: usize) -> Self;

    /// Negative cofactor with respect to variable `var` (`var = 0`).
    fn cofactor0(&self, var: usize) -> Self;

    /// Bitwise complement.
    fn bit_not(&self) -> Self;

    /// Bitwise AND with another truth table of equal arity.
    fn bit_and(&self, other: &Self) -> Self;

    /// Bitwise OR with another truth table of equal arity.
    fn bit_or(&self, other: &Self) -> Self;

    /// Bitwise XOR with another truth table of equal arity.
    fn bit_xor(&self, other: &Self) -> Self;

    /// Whether `var` is in the support of the function: whether the two
    /// cofactors with respect to `var` differ.
    fn depends_on(&self, var: usize) -> bool {
        self.cofactor0(var) != self.cofactor1(var)
    }

    /// Creates the projection function (`nth` variable), `f(x) = x_n`.
    fn nth_var(num_vars: usize, n: usize) -> Self;

    /// The constant-zero function over `num_vars` variables.
    fn const0(num_vars: usize) -> Self;

    /// The constant-one function over `num_vars` variables.
    fn const1(num_vars: usize) -> Self;

    /// Whether the function is constant (0 or 1 for every minterm).
    fn is_const(&self) -> bool {
        self.count_ones() == 0 || self.count_zeros() == 0
    }

    /// Applies an input permutation: `result(x) = self(perm.apply(x))`, i.e.
    /// variable `i` of `result` reads from variable `perm.image(i)` of
    /// `self`.
    fn permute_inputs(&self, perm: &Permutation) -> Self {
        let n = self.num_vars();
        let mut out = Self::const0(n);
        for m in 0..self.num_bits() {
            let mut m2 = 0usize;
            for i in 0..n {
                if (m >> i) & 1 == 1 {
                    m2 |= 1 << perm.image(i);
                }
            }
            out.set_bit(m2, self.get_bit(m));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_depends_on<T: TruthTable>(f: T, var: usize, expect: bool) {
        assert_eq!(f.depends_on(var), expect);
    }

    #[test]
    fn projection_depends_only_on_its_own_variable() {
        let f = StaticTruthTable::<3>::nth_var(3, 1);
        generic_depends_on(f.clone(), 0, false);
        generic_depends_on(f.clone(), 1, true);
        generic_depends_on(f, 2, false);
    }
}
