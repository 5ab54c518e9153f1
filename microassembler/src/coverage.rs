//! Per-base coverage of a node.
use definitions::{PositionCoverage, Sample, Strand};

/// Coverage of one base of one sample.
/// `*_qv` counts only the bases at or above the calling quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cov {
    pub fwd: u32,
    pub rev: u32,
    pub fwd_qv: u32,
    pub rev_qv: u32,
}

impl Cov {
    pub fn add(&mut self, strand: Strand, passes_qv: bool) {
        match strand {
            Strand::Forward => {
                self.fwd += 1;
                self.fwd_qv += passes_qv as u32;
            }
            Strand::Reverse => {
                self.rev += 1;
                self.rev_qv += passes_qv as u32;
            }
        }
    }
    pub fn total(&self) -> u32 {
        self.fwd + self.rev
    }
    pub fn total_qv(&self) -> u32 {
        self.fwd_qv + self.rev_qv
    }
    /// Field-wise maximum. Used where the walks or the reference project
    /// two nodes onto the same base.
    pub fn max(&self, other: &Self) -> Self {
        Self {
            fwd: self.fwd.max(other.fwd),
            rev: self.rev.max(other.rev),
            fwd_qv: self.fwd_qv.max(other.fwd_qv),
            rev_qv: self.rev_qv.max(other.rev_qv),
        }
    }
}

impl std::ops::AddAssign for Cov {
    fn add_assign(&mut self, other: Self) {
        self.fwd += other.fwd;
        self.rev += other.rev;
        self.fwd_qv += other.fwd_qv;
        self.rev_qv += other.rev_qv;
    }
}

/// Which samples cover a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CovStatus {
    Empty,
    Tumor,
    Normal,
    Both,
}

impl std::default::Default for CovStatus {
    fn default() -> Self {
        CovStatus::Empty
    }
}

impl CovStatus {
    pub fn with(self, sample: Sample) -> Self {
        let other = match sample {
            Sample::Tumor => CovStatus::Tumor,
            Sample::Normal => CovStatus::Normal,
        };
        self.union(other)
    }
    pub fn union(self, other: Self) -> Self {
        use CovStatus::*;
        match (self, other) {
            (Empty, x) | (x, Empty) => x,
            (Tumor, Tumor) => Tumor,
            (Normal, Normal) => Normal,
            _ => Both,
        }
    }
    pub fn as_char(&self) -> char {
        match self {
            CovStatus::Empty => 'E',
            CovStatus::Tumor => 'T',
            CovStatus::Normal => 'N',
            CovStatus::Both => 'B',
        }
    }
}

/// Build the per-position coverage handed to the caller.
/// With `use_qv`, only bases at or above the calling quality are counted.
pub fn position_coverage(tumor: &Cov, normal: &Cov, use_qv: bool) -> PositionCoverage {
    match use_qv {
        true => PositionCoverage {
            tumor_fwd: tumor.fwd_qv,
            tumor_rev: tumor.rev_qv,
            normal_fwd: normal.fwd_qv,
            normal_rev: normal.rev_qv,
        },
        false => PositionCoverage {
            tumor_fwd: tumor.fwd,
            tumor_rev: tumor.rev,
            normal_fwd: normal.fwd,
            normal_rev: normal.rev,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn status_union() {
        use CovStatus::*;
        assert_eq!(Empty.with(Sample::Tumor), Tumor);
        assert_eq!(Tumor.with(Sample::Tumor), Tumor);
        assert_eq!(Tumor.with(Sample::Normal), Both);
        assert_eq!(Normal.union(Empty), Normal);
        assert_eq!(Both.union(Normal), Both);
    }
    #[test]
    fn cov_add_and_max() {
        let mut cov = Cov::default();
        cov.add(Strand::Forward, true);
        cov.add(Strand::Forward, false);
        cov.add(Strand::Reverse, true);
        assert_eq!((cov.fwd, cov.rev, cov.fwd_qv, cov.rev_qv), (2, 1, 1, 1));
        let other = Cov {
            fwd: 1,
            rev: 4,
            fwd_qv: 0,
            rev_qv: 3,
        };
        let max = cov.max(&other);
        assert_eq!((max.fwd, max.rev, max.fwd_qv, max.rev_qv), (2, 4, 1, 3));
        assert_eq!(max.total(), 6);
        cov += other;
        assert_eq!((cov.fwd, cov.rev, cov.fwd_qv, cov.rev_qv), (3, 5, 1, 4));
    }
}
