//! Turning an alignment into a list of edits against the reference.
use crate::align::{Alignment, Op};
use crate::tandem::{find_tandems, TandemParams};
use definitions::{CoverageSummary, Edit, EditCode, PositionCoverage};

/// Everything an edit needs besides the alignment itself.
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    /// The aligned reference window.
    pub ref_seq: &'a [u8],
    /// Genomic position of `ref_seq[0]`.
    pub ref_start: u64,
    /// The whole path, including the bases hanging over the window.
    pub path_seq: &'a [u8],
    /// Coverage of each alignment column. May be empty.
    pub col_cov: &'a [Option<PositionCoverage>],
    /// Coverage of each base of the window. May be empty.
    pub ref_cov: &'a [PositionCoverage],
    pub tandem: &'a TandemParams,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub edits: Vec<Edit>,
    pub match_bp: usize,
    pub snp_bp: usize,
    pub ins_bp: usize,
    pub del_bp: usize,
}

/// A maximal run of non-matching columns.
#[derive(Debug, Clone, Copy)]
struct Run {
    col: (usize, usize),
    refr: (usize, usize),
    path: (usize, usize),
}

impl Transcript {
    pub fn from_alignment(aln: &Alignment, ctx: &EditContext) -> Self {
        let mut transcript = Self::default();
        let (mut ri, mut pi) = (0, aln.path_start);
        let mut col = 0;
        while col < aln.ops.len() {
            if aln.ops[col] == Op::Match {
                transcript.match_bp += 1;
                ri += 1;
                pi += 1;
                col += 1;
                continue;
            }
            let (c0, r0, p0) = (col, ri, pi);
            while col < aln.ops.len() && aln.ops[col] != Op::Match {
                match aln.ops[col] {
                    Op::Mismatch => {
                        transcript.snp_bp += 1;
                        ri += 1;
                        pi += 1;
                    }
                    Op::Ins => {
                        transcript.ins_bp += 1;
                        pi += 1;
                    }
                    Op::Del => {
                        transcript.del_bp += 1;
                        ri += 1;
                    }
                    Op::Match => {}
                }
                col += 1;
            }
            let ops = &aln.ops[c0..col];
            if ops.iter().all(|&op| op == Op::Mismatch) {
                // Each substitution is reported by itself.
                for i in 0..ops.len() {
                    let run = Run {
                        col: (c0 + i, c0 + i + 1),
                        refr: (r0 + i, r0 + i + 1),
                        path: (p0 + i, p0 + i + 1),
                    };
                    transcript.edits.push(edit(EditCode::Snp, run, ctx));
                }
            } else {
                let code = if ops.iter().all(|&op| op == Op::Ins) {
                    EditCode::Insertion
                } else if ops.iter().all(|&op| op == Op::Del) {
                    EditCode::Deletion
                } else {
                    EditCode::Complex
                };
                let run = Run {
                    col: (c0, col),
                    refr: (r0, ri),
                    path: (p0, pi),
                };
                transcript.edits.push(edit(code, run, ctx));
            }
        }
        transcript
    }
}

fn base_before(seq: &[u8], pos: usize) -> char {
    match pos.checked_sub(1).and_then(|p| seq.get(p)) {
        Some(&b) => b as char,
        None => 'N',
    }
}

fn edit(code: EditCode, run: Run, ctx: &EditContext) -> Edit {
    let (c0, c1) = run.col;
    let (r0, r1) = run.refr;
    let (p0, p1) = run.path;
    let alt_coverage = {
        let mut covs: Vec<_> = ctx.col_cov.iter().take(c1).skip(c0).flatten().copied().collect();
        if covs.is_empty() {
            let flank = c0.checked_sub(1).into_iter().chain(std::iter::once(c1));
            covs = flank
                .filter_map(|c| ctx.col_cov.get(c).copied().flatten())
                .collect();
        }
        CoverageSummary::from_positions(&covs)
    };
    let ref_coverage = if r0 < r1 {
        let end = r1.min(ctx.ref_cov.len());
        CoverageSummary::from_positions(ctx.ref_cov.get(r0..end).unwrap_or(&[]))
    } else {
        let flank: Vec<_> = r0
            .checked_sub(1)
            .into_iter()
            .chain(std::iter::once(r0))
            .filter_map(|r| ctx.ref_cov.get(r).copied())
            .collect();
        CoverageSummary::from_positions(&flank)
    };
    let ref_allele = String::from_utf8_lossy(&ctx.ref_seq[r0..r1]).to_string();
    let alt_allele = String::from_utf8_lossy(&ctx.path_seq[p0..p1]).to_string();
    trace!(
        "EDIT\t{}\t{}\t{}\t{}",
        code,
        ctx.ref_start + r0 as u64,
        ref_allele,
        alt_allele
    );
    Edit {
        code,
        ref_pos: ctx.ref_start + r0 as u64,
        ref_end_pos: ctx.ref_start + r1 as u64,
        path_pos: p0,
        path_end_pos: p1,
        ref_allele,
        alt_allele,
        prev_ref: base_before(ctx.ref_seq, r0),
        prev_alt: base_before(ctx.path_seq, p0),
        alt_coverage,
        ref_coverage,
        tandem: find_tandems(ctx.ref_seq, r0, ctx.tandem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{global_cov_align_aff, AlignParams, EndMode};
    const REFR: &[u8] = b"ACGTTGCAAGCTTACG";
    const TANDEM: TandemParams = TandemParams {
        max_unit_len: 4,
        min_report_units: 3,
        min_report_len: 7,
        dist_from_str: 1,
    };
    fn transcript(t: &[u8]) -> Transcript {
        let cov: Vec<_> = (0..t.len() as u32)
            .map(|i| PositionCoverage {
                tumor_fwd: i,
                ..PositionCoverage::default()
            })
            .collect();
        let params = AlignParams::default();
        let aln = global_cov_align_aff(REFR, t, &cov, EndMode::Anchored, &params).unwrap();
        let ctx = EditContext {
            ref_seq: REFR,
            ref_start: 1000,
            path_seq: t,
            col_cov: &aln.cov,
            ref_cov: &[],
            tandem: &TANDEM,
        };
        Transcript::from_alignment(&aln.alignment, &ctx)
    }
    #[test]
    fn no_edit() {
        let ts = transcript(REFR);
        assert!(ts.edits.is_empty());
        assert_eq!(ts.match_bp, REFR.len());
        assert_eq!(ts.snp_bp + ts.ins_bp + ts.del_bp, 0);
    }
    #[test]
    fn snp() {
        let ts = transcript(b"ACGTTGCATGCTTACG");
        assert_eq!(ts.edits.len(), 1);
        let edit = &ts.edits[0];
        assert_eq!(edit.code, EditCode::Snp);
        assert_eq!((edit.ref_pos, edit.ref_end_pos), (1008, 1009));
        assert_eq!((edit.ref_allele.as_str(), edit.alt_allele.as_str()), ("A", "T"));
        assert_eq!((edit.prev_ref, edit.prev_alt), ('A', 'A'));
        assert_eq!(edit.alt_coverage.tumor_fwd.min, 8);
        assert_eq!(ts.snp_bp, 1);
        assert_eq!(ts.match_bp, 15);
    }
    #[test]
    fn insertion() {
        let ts = transcript(b"ACGTTGCAGGGAGCTTACG");
        assert_eq!(ts.edits.len(), 1);
        let edit = &ts.edits[0];
        assert_eq!(edit.code, EditCode::Insertion);
        assert_eq!(edit.ref_allele, "");
        assert_eq!(edit.alt_allele, "GGG");
        assert_eq!((edit.ref_pos, edit.ref_end_pos), (1008, 1008));
        assert_eq!((edit.path_pos, edit.path_end_pos), (8, 11));
        assert_eq!(edit.alt_coverage.tumor_fwd.min, 8);
        assert_eq!(edit.alt_coverage.tumor_fwd.median, 9);
        assert_eq!(ts.ins_bp, 3);
    }
    #[test]
    fn deletion() {
        let ts = transcript(b"ACGTTAAGCTTACG");
        assert_eq!(ts.edits.len(), 1);
        let edit = &ts.edits[0];
        assert_eq!(edit.code, EditCode::Deletion);
        assert_eq!(edit.code.as_char(), 'v');
        assert_eq!(edit.ref_allele, "GC");
        assert_eq!(edit.alt_allele, "");
        assert_eq!(edit.ref_pos, 1005);
        assert_eq!((edit.prev_ref, edit.prev_alt), ('T', 'T'));
        // Flanking columns of a deletion carry the coverage of path bases 4 and 5.
        assert_eq!(edit.alt_coverage.tumor_fwd.min, 4);
        assert_eq!(ts.del_bp, 2);
    }
    #[test]
    fn complex() {
        let ts = transcript(b"ACGTTGCTTTGCTTACG");
        assert_eq!(ts.edits.len(), 1);
        let edit = &ts.edits[0];
        assert_eq!(edit.code, EditCode::Complex);
        assert_eq!(edit.ref_allele, "AA");
        assert_eq!(edit.alt_allele, "TTT");
        assert_eq!(edit.ref_pos, 1007);
        assert_eq!((ts.ins_bp, ts.del_bp), (3, 2));
    }
    #[test]
    fn tandem_near_edit() {
        let refr = b"GGATCACACACACTTG";
        let path = b"GGATCACACACTTG";
        let params = AlignParams::default();
        let aln = crate::align::global_align_aff(refr, path, EndMode::Anchored, &params).unwrap();
        let ctx = EditContext {
            ref_seq: refr,
            ref_start: 0,
            path_seq: path,
            col_cov: &[],
            ref_cov: &[],
            tandem: &TANDEM,
        };
        let ts = Transcript::from_alignment(&aln, &ctx);
        assert_eq!(ts.edits.len(), 1);
        let tandem = ts.edits[0].tandem.as_ref().unwrap();
        assert_eq!(tandem.motif, "CA");
        assert_eq!(tandem.len, 8);
    }
}
