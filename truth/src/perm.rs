use serde::{Deserialize, Serialize};

/// A permutation of variable indices `0..n`, used both to canonize truth
/// tables (bring a function to a canonical input order) and to re-order the
/// leaves of a matched database entry back onto the leaves of a cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    /// `image[i]` is the position that input `i` is mapped to.
    image: Vec<usize>,
}

impl Permutation {
    /// The identity permutation over `n` variables.
    pub fn identity(n: usize) -> Self {
        Self {
            image: (0..n).collect(),
        }
    }

    /// Builds a permutation from an explicit image vector; each value in
    /// `0..image.len()` must appear exactly once.
    pub fn from_image(image: Vec<usize>) -> Self {
        debug_assert!(Self::is_valid(&image), "not a permutation: {image:?}");
        Self { image }
    }

    fn is_valid(image: &[usize]) -> bool {
        let mut seen = vec![false; image.len()];
        for &v in image {
            if v >= image.len() || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Where input `i` is sent under this permutation.
    pub fn image(&self, i: usize) -> usize {
        self.image[i]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.image
    }

    /// The inverse permutation, `inv.image(p.image(i)) == i`.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0usize; self.image.len()];
        for (i, &v) in self.image.iter().enumerate() {
            inv[v] = i;
        }
        Self { image: inv }
    }

    /// Composes two permutations: `(self.then(other)).image(i) ==
    /// other.image(self.image(i))`.
    pub fn then(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len());
        Self {
            image: self.image.iter().map(|&v| other.image[v]).collect(),
        }
    }

    /// Every permutation of `0..n`, in lexicographic order of the image
    /// vector. Used by exhaustive P-canonization for small `n`.
    pub fn all(n: usize) -> Vec<Self> {
        let mut items: Vec<usize> = (0..n).collect();
        let mut out = Vec::new();
        loop {
            out.push(Self::from_image(items.clone()));
            if !next_permutation(&mut items) {
                break;
            }
        }
        out
    }
}

/// Advances `items` to the next permutation in lexicographic order in
/// place; returns `false` once the last (descending) permutation is
/// reached, leaving `items` unchanged in meaning (caller stops iterating).
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}
