//! Global alignment with affine gaps, between a reference window `s` and a path `t`.
use crate::error::AlignError;
use serde::{Deserialize, Serialize};

/// Scores of the alignment. A gap of length L costs `gap_open + (L-1) * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl std::default::Default for AlignParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch: -6,
            gap_open: -5,
            gap_extend: -1,
        }
    }
}

/// How the ends of the path are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndMode {
    /// Both sequences are aligned end to end.
    Anchored,
    /// The bases of the path hanging over either end of the reference are free.
    FreeTargetEnds,
}

/// An alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Match,
    Mismatch,
    /// A reference base facing a gap, i.e., deleted from the path.
    Del,
    /// A path base facing a gap, i.e., inserted into the path.
    Ins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub ops: Vec<Op>,
    pub score: i32,
    /// The aligned part of the path is `t[path_start..path_end]`.
    pub path_start: usize,
    pub path_end: usize,
}

impl Alignment {
    /// The two gapped strings, reference first.
    pub fn gapped(&self, s: &[u8], t: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let (mut i, mut j) = (0, self.path_start);
        let (mut s_aln, mut t_aln) = (vec![], vec![]);
        for op in self.ops.iter() {
            match op {
                Op::Match | Op::Mismatch => {
                    s_aln.push(s[i]);
                    t_aln.push(t[j]);
                    i += 1;
                    j += 1;
                }
                Op::Del => {
                    s_aln.push(s[i]);
                    t_aln.push(b'-');
                    i += 1;
                }
                Op::Ins => {
                    s_aln.push(b'-');
                    t_aln.push(t[j]);
                    j += 1;
                }
            }
        }
        (s_aln, t_aln)
    }
}

/// An alignment carrying a value of each path base into its column. Gap columns get None.
#[derive(Debug, Clone)]
pub struct CovAlignment<C> {
    pub alignment: Alignment,
    pub cov: Vec<Option<C>>,
}

/// `seq[start..end]`, or an error if the window is inverted or out of range.
pub fn window(seq: &[u8], start: usize, end: usize) -> Result<&[u8], AlignError> {
    match start <= end && end <= seq.len() {
        true => Ok(&seq[start..end]),
        false => Err(AlignError::InvertedWindow { start, end }),
    }
}

const LOWER: i32 = i32::MIN / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Mat,
    Ins,
    Del,
}

fn max((mat, ins, del): (i32, i32, i32)) -> i32 {
    mat.max(ins).max(del)
}

/// The best state of a cell. Ties go to the diagonal, then to deletions.
fn best_state((mat, ins, del): (i32, i32, i32)) -> State {
    if ins <= mat && del <= mat {
        State::Mat
    } else if ins <= del {
        State::Del
    } else {
        State::Ins
    }
}

/// Align `s` (reference) and `t` (path). Ties in the traceback prefer matches over gaps.
/// With [EndMode::FreeTargetEnds], the overhangs of the path are trimmed, and an alignment
/// leaving a reference end uncovered is rejected.
pub fn global_align_aff(
    s: &[u8],
    t: &[u8],
    mode: EndMode,
    params: &AlignParams,
) -> Result<Alignment, AlignError> {
    if s.is_empty() || t.is_empty() {
        return Err(AlignError::EmptySequence);
    }
    let AlignParams {
        match_score,
        mismatch,
        gap_open,
        gap_extend,
    } = *params;
    let (len1, len2) = (s.len(), t.len());
    // Match, insertion (gap in s), deletion (gap in t).
    let mut dp = vec![vec![(LOWER, LOWER, LOWER); len2 + 1]; len1 + 1];
    dp[0][0].0 = 0;
    for (i, row) in dp.iter_mut().enumerate().skip(1) {
        row[0].2 = gap_open + (i as i32 - 1) * gap_extend;
    }
    for j in 1..len2 + 1 {
        dp[0][j].1 = match mode {
            EndMode::Anchored => gap_open + (j as i32 - 1) * gap_extend,
            EndMode::FreeTargetEnds => 0,
        };
    }
    for (i, x) in s.iter().enumerate() {
        let i = i + 1;
        for (j, y) in t.iter().enumerate() {
            let j = j + 1;
            let sub = if x == y { match_score } else { mismatch };
            let mat = max(dp[i - 1][j - 1]) + sub;
            let ins = {
                let (mat, ins, del) = dp[i][j - 1];
                (mat + gap_open).max(ins + gap_extend).max(del + gap_open)
            };
            let del = {
                let (mat, ins, del) = dp[i - 1][j];
                (mat + gap_open).max(ins + gap_open).max(del + gap_extend)
            };
            dp[i][j] = (mat, ins, del);
        }
    }
    let path_end = match mode {
        EndMode::Anchored => len2,
        EndMode::FreeTargetEnds => {
            let mut best = 1;
            for j in 2..len2 + 1 {
                if max(dp[len1][best]) < max(dp[len1][j]) {
                    best = j;
                }
            }
            best
        }
    };
    let score = max(dp[len1][path_end]);
    let mut state = best_state(dp[len1][path_end]);
    let (mut i, mut j) = (len1, path_end);
    let mut ops = vec![];
    while 0 < i || 0 < j {
        if i == 0 {
            if mode == EndMode::FreeTargetEnds {
                break;
            }
            ops.push(Op::Ins);
            j -= 1;
            continue;
        }
        if j == 0 {
            ops.push(Op::Del);
            i -= 1;
            continue;
        }
        match state {
            State::Mat => {
                let is_match = s[i - 1] == t[j - 1];
                let sub = if is_match { match_score } else { mismatch };
                let target = dp[i][j].0 - sub;
                let (mat, ins, del) = dp[i - 1][j - 1];
                state = if mat == target {
                    State::Mat
                } else if del == target {
                    State::Del
                } else {
                    debug_assert_eq!(ins, target);
                    State::Ins
                };
                ops.push(if is_match { Op::Match } else { Op::Mismatch });
                i -= 1;
                j -= 1;
            }
            State::Del => {
                let current = dp[i][j].2;
                let (mat, ins, del) = dp[i - 1][j];
                state = if mat + gap_open == current {
                    State::Mat
                } else if del + gap_extend == current {
                    State::Del
                } else {
                    debug_assert_eq!(ins + gap_open, current);
                    State::Ins
                };
                ops.push(Op::Del);
                i -= 1;
            }
            State::Ins => {
                let current = dp[i][j].1;
                let (mat, ins, del) = dp[i][j - 1];
                state = if mat + gap_open == current {
                    State::Mat
                } else if del + gap_open == current {
                    State::Del
                } else {
                    debug_assert_eq!(ins + gap_extend, current);
                    State::Ins
                };
                ops.push(Op::Ins);
                j -= 1;
            }
        }
    }
    ops.reverse();
    let path_start = j;
    if mode == EndMode::FreeTargetEnds
        && (ops.first() == Some(&Op::Del) || ops.last() == Some(&Op::Del))
    {
        return Err(AlignError::PathShorterThanWindow);
    }
    Ok(Alignment {
        ops,
        score,
        path_start,
        path_end,
    })
}

/// Same as [global_align_aff], carrying `cov_t[j]` into the column of `t[j]`.
pub fn global_cov_align_aff<C: Clone>(
    s: &[u8],
    t: &[u8],
    cov_t: &[C],
    mode: EndMode,
    params: &AlignParams,
) -> Result<CovAlignment<C>, AlignError> {
    if cov_t.len() != t.len() {
        return Err(AlignError::CoverageLength {
            cov: cov_t.len(),
            len: t.len(),
        });
    }
    let alignment = global_align_aff(s, t, mode, params)?;
    let mut j = alignment.path_start;
    let cov = alignment
        .ops
        .iter()
        .map(|op| match op {
            Op::Del => None,
            _ => {
                j += 1;
                Some(cov_t[j - 1].clone())
            }
        })
        .collect();
    Ok(CovAlignment { alignment, cov })
}

#[cfg(test)]
mod tests {
    use super::*;
    const REFR: &[u8] = b"ACGTTGCAAGCTTACG";
    fn align(s: &[u8], t: &[u8], mode: EndMode) -> Result<Alignment, AlignError> {
        global_align_aff(s, t, mode, &AlignParams::default())
    }
    fn to_string(seq: &[u8]) -> String {
        String::from_utf8_lossy(seq).to_string()
    }
    #[test]
    fn self_alignment() {
        let aln = align(REFR, REFR, EndMode::Anchored).unwrap();
        assert!(aln.ops.iter().all(|&op| op == Op::Match));
        assert_eq!(aln.ops.len(), REFR.len());
        assert_eq!(aln.score, 2 * REFR.len() as i32);
        let aln = align(REFR, REFR, EndMode::FreeTargetEnds).unwrap();
        assert_eq!((aln.path_start, aln.path_end), (0, REFR.len()));
    }
    #[test]
    fn insertion() {
        let mut t = REFR[..8].to_vec();
        t.extend_from_slice(b"GGG");
        t.extend_from_slice(&REFR[8..]);
        let aln = align(REFR, &t, EndMode::Anchored).unwrap();
        assert_eq!(aln.score, 2 * 16 - 5 - 2);
        let (s_aln, t_aln) = aln.gapped(REFR, &t);
        assert_eq!(to_string(&s_aln), "ACGTTGCA---AGCTTACG");
        assert_eq!(to_string(&t_aln), "ACGTTGCAGGGAGCTTACG");
    }
    #[test]
    fn deletion() {
        let t = b"ACGTTAAGCTTACG";
        let aln = align(REFR, t, EndMode::Anchored).unwrap();
        assert_eq!(aln.ops.iter().filter(|&&op| op == Op::Del).count(), 2);
        let (s_aln, t_aln) = aln.gapped(REFR, t);
        assert_eq!(to_string(&s_aln), "ACGTTGCAAGCTTACG");
        assert_eq!(to_string(&t_aln), "ACGTT--AAGCTTACG");
    }
    #[test]
    fn mismatch_is_preferred_over_two_gaps() {
        let t = b"ACGTTGCATGCTTACG";
        let aln = align(REFR, t, EndMode::Anchored).unwrap();
        assert_eq!(aln.ops.len(), REFR.len());
        assert_eq!(aln.ops[8], Op::Mismatch);
        assert_eq!(aln.score, 2 * 15 - 6);
    }
    #[test]
    fn free_ends() {
        let s = b"GTTGCAAGCT";
        let t = b"ACGTTGCAAGCTTA";
        let aln = align(s, t, EndMode::FreeTargetEnds).unwrap();
        assert_eq!((aln.path_start, aln.path_end), (2, 12));
        assert!(aln.ops.iter().all(|&op| op == Op::Match));
        // The path misses the first two reference bases.
        let short = b"GTTGCAAG";
        let err = align(b"ACGTTGCAAG", short, EndMode::FreeTargetEnds);
        assert_eq!(err, Err(AlignError::PathShorterThanWindow));
        assert!(align(b"ACGTTGCAAG", short, EndMode::Anchored).is_ok());
    }
    #[test]
    fn errors() {
        assert_eq!(align(b"", b"ACGT", EndMode::Anchored), Err(AlignError::EmptySequence));
        assert_eq!(align(b"ACGT", b"", EndMode::Anchored), Err(AlignError::EmptySequence));
        assert_eq!(
            window(b"ACGT", 3, 1),
            Err(AlignError::InvertedWindow { start: 3, end: 1 })
        );
        assert_eq!(window(b"ACGT", 1, 3), Ok(&b"CG"[..]));
        let cov = vec![1u32; 3];
        let params = AlignParams::default();
        let res = global_cov_align_aff(b"ACGT", b"ACGT", &cov, EndMode::Anchored, &params);
        assert_eq!(res.err(), Some(AlignError::CoverageLength { cov: 3, len: 4 }));
    }
    #[test]
    fn coverage_follows_columns() {
        let mut t = REFR[..8].to_vec();
        t.extend_from_slice(b"GGG");
        t.extend_from_slice(&REFR[8..]);
        let cov: Vec<usize> = (0..t.len()).collect();
        let params = AlignParams::default();
        let aln = global_cov_align_aff(REFR, &t, &cov, EndMode::Anchored, &params).unwrap();
        assert_eq!(aln.cov.len(), aln.alignment.ops.len());
        assert_eq!(aln.cov[8..11].to_vec(), vec![Some(8), Some(9), Some(10)]);
        assert!(aln.cov.iter().all(|c| c.is_some()));
        let t = b"ACGTTAAGCTTACG";
        let cov = vec![(); t.len()];
        let aln = global_cov_align_aff(REFR, t, &cov, EndMode::Anchored, &AlignParams::default())
            .unwrap();
        assert_eq!(aln.cov.iter().filter(|c| c.is_none()).count(), 2);
    }
}
