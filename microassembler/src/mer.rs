//! k-mers and small sequence utilities.
use std::collections::HashSet;

const fn revcmp_table() -> [u8; 256] {
    let mut table = [b'N'; 256];
    table[b'A' as usize] = b'T';
    table[b'C' as usize] = b'G';
    table[b'G' as usize] = b'C';
    table[b'T' as usize] = b'A';
    table[b'a' as usize] = b't';
    table[b'c' as usize] = b'g';
    table[b'g' as usize] = b'c';
    table[b't' as usize] = b'a';
    table[b'-' as usize] = b'-';
    table
}
const REVCMP: [u8; 256] = revcmp_table();

pub fn revcmp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&x| REVCMP[x as usize]).collect()
}

pub fn is_dna(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Orientation of a k-mer (or a node) with respect to its stored sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ori {
    F,
    R,
}

impl std::fmt::Display for Ori {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x = match self {
            Ori::F => 'F',
            Ori::R => 'R',
        };
        write!(f, "{}", x)
    }
}

impl std::ops::Not for Ori {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Ori::F => Ori::R,
            Ori::R => Ori::F,
        }
    }
}

/// A k-mer as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mer(Vec<u8>);

impl Mer {
    pub fn new(kmer: &[u8]) -> Self {
        Self(kmer.to_vec())
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn revcmp(&self) -> Self {
        Self(revcmp(&self.0))
    }
    /// The canonical form and the orientation of this k-mer relative to it.
    pub fn canonical(&self) -> (CanonicalMer, Ori) {
        CanonicalMer::from_kmer(&self.0)
    }
}

impl std::fmt::Display for Mer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// The smaller of a k-mer and its reverse complement.
/// A k-mer and its reverse complement share the same canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalMer(Vec<u8>);

impl CanonicalMer {
    pub fn from_kmer(kmer: &[u8]) -> (Self, Ori) {
        let rc = revcmp(kmer);
        if kmer <= rc.as_slice() {
            (Self(kmer.to_vec()), Ori::F)
        } else {
            (Self(rc), Ori::R)
        }
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for CanonicalMer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

pub fn hamming_distance(xs: &[u8], ys: &[u8]) -> usize {
    std::iter::zip(xs, ys).filter(|(x, y)| x != y).count()
        + xs.len().max(ys.len())
        - xs.len().min(ys.len())
}

/// True if some canonical k-mer occurs twice in `seq`.
pub fn is_repeat(seq: &[u8], k: usize) -> bool {
    let mut seen = HashSet::new();
    seq.windows(k)
        .any(|w| !seen.insert(CanonicalMer::from_kmer(w).0))
}

/// True if two k-mers of `seq` differ by at most `max_mismatch` bases.
pub fn is_almost_repeat(seq: &[u8], k: usize, max_mismatch: usize) -> bool {
    let kmers: Vec<_> = seq.windows(k).collect();
    kmers.iter().enumerate().any(|(i, x)| {
        kmers
            .iter()
            .skip(i + 1)
            .any(|y| hamming_distance(x, y) <= max_mismatch)
    })
}
