//! Definitions -- A tiny interface for the local micro-assembler.
//! Roughly speaking, we incorporate with other programs via JSON objects. A batch of
//! loci comes in as [LocusBatch](LocusBatch), each locus carrying its reference window and the reads
//! falling on it, and the assembler answers with one [LocusReport](LocusReport) per locus.

use serde::{Deserialize, Serialize};

/// The sample a read comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sample {
    Tumor,
    Normal,
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x = match self {
            Sample::Tumor => 'T',
            Sample::Normal => 'N',
        };
        write!(f, "{}", x)
    }
}

/// The strand a read is aligned to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl std::ops::Not for Strand {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }
}

fn default_mapped() -> bool {
    true
}

/// A read falling on a locus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRecord {
    /// Name of the read. Both mates of a pair share the same name.
    pub name: String,
    /// Sequence. It is a string on an alphabet of A,C,G,T,N (lowercase included).
    pub seq: String,
    /// Phred+33 base qualities. Empty if not available.
    #[serde(default)]
    pub qual: String,
    pub sample: Sample,
    pub strand: Strand,
    /// 1 for the first mate, 2 for the second, 0 if unpaired.
    #[serde(default)]
    pub mate_order: u8,
    /// True if this record is (a piece of) the reference rather than a sequenced read.
    #[serde(default)]
    pub is_reference: bool,
    /// False if the read was pulled in only because its mate was aligned nearby.
    #[serde(default = "default_mapped")]
    pub mapped: bool,
}

impl ReadRecord {
    pub fn new(name: &str, seq: &str, sample: Sample, strand: Strand) -> Self {
        Self {
            name: name.to_string(),
            seq: seq.to_string(),
            qual: String::new(),
            sample,
            strand,
            mate_order: 0,
            is_reference: false,
            mapped: true,
        }
    }
    pub fn seq(&self) -> &[u8] {
        self.seq.as_bytes()
    }
    pub fn qual(&self) -> &[u8] {
        self.qual.as_bytes()
    }
}

impl std::fmt::Display for ReadRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {:?} {}\n{}",
            self.name, self.sample, self.strand, self.mate_order, self.seq
        )
    }
}

/// One contiguous reference sequence and the genomic coordinate of its first base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub name: String,
    pub start: u64,
    pub seq: String,
}

impl ReferenceWindow {
    pub fn new(name: &str, start: u64, seq: &str) -> Self {
        Self {
            name: name.to_string(),
            start,
            seq: seq.to_string(),
        }
    }
    pub fn seq(&self) -> &[u8] {
        self.seq.as_bytes()
    }
    pub fn len(&self) -> usize {
        self.seq.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
    /// Genomic coordinate just past the last base.
    pub fn end(&self) -> u64 {
        self.start + self.seq.len() as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusInput {
    pub reference: ReferenceWindow,
    pub reads: Vec<ReadRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocusBatch {
    pub loci: Vec<LocusInput>,
}

/// Coverage of a single base, split by sample and strand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PositionCoverage {
    pub tumor_fwd: u32,
    pub tumor_rev: u32,
    pub normal_fwd: u32,
    pub normal_rev: u32,
}

impl PositionCoverage {
    pub fn tumor(&self) -> u32 {
        self.tumor_fwd + self.tumor_rev
    }
    pub fn normal(&self) -> u32 {
        self.normal_fwd + self.normal_rev
    }
    pub fn total(&self) -> u32 {
        self.tumor() + self.normal()
    }
}

/// Summary statistics of a coverage distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CoverageStats {
    pub min: u32,
    pub min_non_zero: u32,
    pub mean: f64,
    pub mean_non_zero: f64,
    pub median: u32,
}

impl CoverageStats {
    pub fn from_distr(distr: &[u32]) -> Self {
        if distr.is_empty() {
            return Self::default();
        }
        let mut sorted = distr.to_vec();
        sorted.sort_unstable();
        let min = sorted[0];
        let non_zero: Vec<_> = sorted.iter().copied().filter(|&x| x != 0).collect();
        let min_non_zero = non_zero.first().copied().unwrap_or(0);
        let mean = sorted.iter().sum::<u32>() as f64 / sorted.len() as f64;
        let mean_non_zero = match non_zero.is_empty() {
            true => 0f64,
            false => non_zero.iter().sum::<u32>() as f64 / non_zero.len() as f64,
        };
        let median = sorted[sorted.len() / 2];
        Self {
            min,
            min_non_zero,
            mean,
            mean_non_zero,
            median,
        }
    }
}

/// Coverage statistics for each sample and strand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct CoverageSummary {
    pub tumor_fwd: CoverageStats,
    pub tumor_rev: CoverageStats,
    pub normal_fwd: CoverageStats,
    pub normal_rev: CoverageStats,
}

impl CoverageSummary {
    pub fn from_positions(covs: &[PositionCoverage]) -> Self {
        let take = |f: fn(&PositionCoverage) -> u32| -> CoverageStats {
            let distr: Vec<_> = covs.iter().map(f).collect();
            CoverageStats::from_distr(&distr)
        };
        Self {
            tumor_fwd: take(|c| c.tumor_fwd),
            tumor_rev: take(|c| c.tumor_rev),
            normal_fwd: take(|c| c.normal_fwd),
            normal_rev: take(|c| c.normal_rev),
        }
    }
}

/// The type of an edit in a transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EditCode {
    Snp,
    Insertion,
    Deletion,
    Complex,
}

impl EditCode {
    pub fn as_char(&self) -> char {
        match self {
            EditCode::Snp => 'x',
            EditCode::Insertion => '^',
            EditCode::Deletion => 'v',
            EditCode::Complex => 'c',
        }
    }
}

impl std::fmt::Display for EditCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A short tandem repeat found close to an edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TandemRepeat {
    pub motif: String,
    /// Offset of the first base of the repeat in the reference window.
    pub start: usize,
    pub len: usize,
}

/// A single edit between a path and the reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub code: EditCode,
    /// Genomic coordinate of the first reference base involved.
    /// For insertions, the base just after the insertion point.
    pub ref_pos: u64,
    pub ref_end_pos: u64,
    /// Offset of the first path base involved.
    pub path_pos: usize,
    pub path_end_pos: usize,
    pub ref_allele: String,
    pub alt_allele: String,
    /// Reference base preceding the edit (`N` at the window start).
    pub prev_ref: char,
    /// Path base preceding the edit (`N` at the path start).
    pub prev_alt: char,
    pub alt_coverage: CoverageSummary,
    pub ref_coverage: CoverageSummary,
    pub tandem: Option<TandemRepeat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathReport {
    pub component: usize,
    pub sequence: String,
    pub coverage: Vec<PositionCoverage>,
    pub edits: Vec<Edit>,
    pub match_bp: usize,
    pub snp_bp: usize,
    pub ins_bp: usize,
    pub del_bp: usize,
    pub has_cycle: bool,
    pub touches_only_tumor: bool,
}

/// Counters of the records absorbed while loading a locus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoadCounters {
    pub reads_loaded: usize,
    pub reads_too_short: usize,
    pub reads_ambiguous: usize,
    pub windows_skipped: usize,
    pub loaded_bp: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocusStatus {
    /// Every component was searched exhaustively.
    Complete,
    /// At least one component hit the search limit.
    Truncated,
    /// The reference stayed repetitive up to the largest k.
    Repetitive,
    /// The locus could not be processed.
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocusReport {
    pub name: String,
    pub k: usize,
    pub status: LocusStatus,
    pub components: usize,
    pub counters: LoadCounters,
    pub paths: Vec<PathReport>,
    /// Components chained by mate pairs. Paths are reported in this order.
    #[serde(default)]
    pub scaffolds: Vec<Vec<usize>>,
}

impl LocusReport {
    pub fn failed(name: &str, k: usize, why: String) -> Self {
        Self {
            name: name.to_string(),
            k,
            status: LocusStatus::Failed(why),
            components: 0,
            counters: LoadCounters::default(),
            paths: vec![],
            scaffolds: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn coverage_stats() {
        let stats = CoverageStats::from_distr(&[0, 3, 1, 0, 4]);
        assert_eq!(stats.min, 0);
        assert_eq!(stats.min_non_zero, 1);
        assert_eq!(stats.median, 1);
        assert!((stats.mean - 1.6).abs() < 1e-9);
        assert!((stats.mean_non_zero - 8f64 / 3f64).abs() < 1e-9);
        let empty = CoverageStats::from_distr(&[]);
        assert_eq!(empty, CoverageStats::default());
    }
    #[test]
    fn read_record_defaults() {
        let json = r#"{"name":"r1","seq":"ACGT","sample":"Tumor","strand":"Reverse"}"#;
        let read: ReadRecord = serde_json::from_str(json).unwrap();
        assert!(read.qual.is_empty());
        assert!(read.mapped);
        assert!(!read.is_reference);
        assert_eq!(read.mate_order, 0);
        assert_eq!(!read.strand, Strand::Forward);
    }
    #[test]
    fn edit_codes() {
        let codes: String = [
            EditCode::Snp,
            EditCode::Insertion,
            EditCode::Deletion,
            EditCode::Complex,
        ]
        .iter()
        .map(|c| c.as_char())
        .collect();
        assert_eq!(codes, "x^vc");
    }
}
