//! Short tandem repeats around an edit.
use definitions::TandemRepeat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TandemParams {
    /// Longest motif to look for.
    pub max_unit_len: usize,
    pub min_report_units: usize,
    pub min_report_len: usize,
    /// A repeat is reported only if it lies within this many bases of the position.
    pub dist_from_str: usize,
}

/// The longest tandem repeat of `seq` lying near `pos`, if any.
pub fn find_tandems(seq: &[u8], pos: usize, params: &TandemParams) -> Option<TandemRepeat> {
    let mut best: Option<TandemRepeat> = None;
    for unit in 1..=params.max_unit_len {
        if seq.len() < unit {
            break;
        }
        for start in 0..=seq.len() - unit {
            let motif = &seq[start..start + unit];
            // Only the leftmost copy starts a repeat.
            if unit <= start && &seq[start - unit..start] == motif {
                continue;
            }
            let mut units = 1;
            while start + (units + 1) * unit <= seq.len()
                && &seq[start + units * unit..start + (units + 1) * unit] == motif
            {
                units += 1;
            }
            let len = units * unit;
            if units < params.min_report_units || len < params.min_report_len {
                continue;
            }
            let end = start + len;
            let near = !(pos + params.dist_from_str < start || end + params.dist_from_str < pos);
            if !near || best.as_ref().map_or(false, |b| len <= b.len) {
                continue;
            }
            trace!("TANDEM\t{}\t{}\t{}", String::from_utf8_lossy(motif), start, len);
            best = Some(TandemRepeat {
                motif: String::from_utf8_lossy(motif).to_string(),
                start,
                len,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    const PARAMS: TandemParams = TandemParams {
        max_unit_len: 4,
        min_report_units: 3,
        min_report_len: 7,
        dist_from_str: 1,
    };
    #[test]
    fn dinucleotide() {
        let seq = b"GGATCACACACACTTG";
        let repeat = find_tandems(seq, 5, &PARAMS).unwrap();
        assert_eq!(repeat.motif, "CA");
        assert_eq!((repeat.start, repeat.len), (4, 8));
        assert!(find_tandems(seq, 15, &PARAMS).is_none());
    }
    #[test]
    fn homopolymer() {
        let seq = b"ACGTAAAAAAAACGT";
        let repeat = find_tandems(seq, 12, &PARAMS).unwrap();
        assert_eq!(repeat.motif, "A");
        assert_eq!((repeat.start, repeat.len), (4, 8));
    }
    #[test]
    fn no_repeat() {
        assert!(find_tandems(b"ACGTTGCAAG", 3, &PARAMS).is_none());
        assert!(find_tandems(b"", 0, &PARAMS).is_none());
    }
}
