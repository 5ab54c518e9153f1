//! A unitig of the de Bruijn graph.
use crate::coverage::{Cov, CovStatus};
use crate::edge::{Edge, EdgeDir};
use crate::mer::{is_repeat, revcmp, CanonicalMer, Ori};
use definitions::{PositionCoverage, Sample, Strand};
use std::collections::BTreeSet;

#[derive(Clone)]
pub struct Node {
    /// Merged k-mers. The first k-mer loaded is stored in its canonical form
    /// and every later extension keeps this frame.
    seq: Vec<u8>,
    k: usize,
    /// How many k-mers of reads were counted on this node, by sample and strand.
    pub counts: PositionCoverage,
    /// Per base coverage from tumor reads. Same length as `seq`.
    tumor_cov: Vec<Cov>,
    normal_cov: Vec<Cov>,
    /// Ids of the reads touching this node.
    pub reads: BTreeSet<usize>,
    pub edges: Vec<Edge>,
    pub is_ref: bool,
    pub is_source: bool,
    pub is_sink: bool,
    pub dead: bool,
    pub component: usize,
    pub on_ref_path: bool,
    /// Number of reference k-mers landing on this node, duplicates included.
    pub ref_kmers: usize,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let edges: Vec<_> = self.edges.iter().map(|e| format!("{}", e)).collect();
        let flags: String = [
            (self.is_ref, 'r'),
            (self.is_source, 's'),
            (self.is_sink, 't'),
            (self.dead, 'x'),
        ]
        .iter()
        .map(|&(b, c)| if b { c } else { '-' })
        .collect();
        write!(
            f,
            "{}\t{}\t{}\t{:.2}\t{}\t[{}]",
            self.component,
            flags,
            self.seq.len(),
            self.mean_cov(),
            String::from_utf8_lossy(&self.seq),
            edges.join(",")
        )
    }
}

impl Node {
    /// A node holding a single canonical k-mer.
    pub fn new(kmer: &CanonicalMer) -> Self {
        let seq = kmer.as_bytes().to_vec();
        let k = seq.len();
        Self {
            seq,
            k,
            counts: PositionCoverage::default(),
            tumor_cov: vec![Cov::default(); k],
            normal_cov: vec![Cov::default(); k],
            reads: BTreeSet::new(),
            edges: vec![],
            is_ref: false,
            is_source: false,
            is_sink: false,
            dead: false,
            component: 0,
            on_ref_path: false,
            ref_kmers: 0,
        }
    }
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }
    pub fn k(&self) -> usize {
        self.k
    }
    pub fn len(&self) -> usize {
        self.seq.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
    /// Number of k-mers merged into this node.
    pub fn size(&self) -> usize {
        self.seq.len() + 1 - self.k
    }
    pub fn is_special(&self) -> bool {
        self.is_ref || self.is_source || self.is_sink
    }
    pub fn mean_cov(&self) -> f64 {
        let total = self.counts.tumor() + self.counts.normal();
        total as f64 / self.size() as f64
    }
    /// The sequence read in the given orientation.
    pub fn oriented_seq(&self, ori: Ori) -> Vec<u8> {
        match ori {
            Ori::F => self.seq.clone(),
            Ori::R => revcmp(&self.seq),
        }
    }
    pub fn tumor_cov(&self) -> &[Cov] {
        &self.tumor_cov
    }
    pub fn normal_cov(&self) -> &[Cov] {
        &self.normal_cov
    }
    /// Per base (tumor, normal) coverage read in the given orientation.
    pub fn oriented_cov(&self, ori: Ori) -> (Vec<Cov>, Vec<Cov>) {
        match ori {
            Ori::F => (self.tumor_cov.clone(), self.normal_cov.clone()),
            Ori::R => self.rev_cov_distr(),
        }
    }
    pub fn rev_cov_distr(&self) -> (Vec<Cov>, Vec<Cov>) {
        let tumor = self.tumor_cov.iter().rev().copied().collect();
        let normal = self.normal_cov.iter().rev().copied().collect();
        (tumor, normal)
    }
    pub fn cov_status(&self, pos: usize) -> CovStatus {
        let mut status = CovStatus::Empty;
        if self.tumor_cov.get(pos).map(|c| c.total() > 0) == Some(true) {
            status = status.with(Sample::Tumor);
        }
        if self.normal_cov.get(pos).map(|c| c.total() > 0) == Some(true) {
            status = status.with(Sample::Normal);
        }
        status
    }
    /// Total per base coverage, both samples and both strands.
    pub fn total_cov_distr(&self) -> Vec<u32> {
        std::iter::zip(&self.tumor_cov, &self.normal_cov)
            .map(|(t, n)| t.total() + n.total())
            .collect()
    }
    pub fn min_cov(&self) -> u32 {
        self.total_cov_distr().into_iter().min().unwrap_or(0)
    }
    pub fn min_non_zero_cov(&self) -> u32 {
        self.total_cov_distr()
            .into_iter()
            .filter(|&x| x > 0)
            .min()
            .unwrap_or(0)
    }
    pub fn avg_cov_distr(&self) -> f64 {
        let distr = self.total_cov_distr();
        distr.iter().sum::<u32>() as f64 / distr.len().max(1) as f64
    }
    /// True if only tumor reads support this node.
    pub fn is_tumor_only(&self) -> bool {
        !self.is_ref && self.counts.normal() == 0 && self.counts.tumor() > 0
    }
    /// True if the node repeats one of its own k-mers.
    pub fn is_tandem(&self) -> bool {
        is_repeat(&self.seq, self.k)
    }
    /// Count a k-mer of a read landing on this node in the orientation `ori`.
    /// `passes_qv[i]` tells whether the i-th base of the k-mer (read frame) is of calling quality.
    pub fn add_kmer_cov(&mut self, sample: Sample, strand: Strand, ori: Ori, passes_qv: &[bool]) {
        match (sample, strand) {
            (Sample::Tumor, Strand::Forward) => self.counts.tumor_fwd += 1,
            (Sample::Tumor, Strand::Reverse) => self.counts.tumor_rev += 1,
            (Sample::Normal, Strand::Forward) => self.counts.normal_fwd += 1,
            (Sample::Normal, Strand::Reverse) => self.counts.normal_rev += 1,
        }
        let len = self.seq.len();
        let covs = match sample {
            Sample::Tumor => &mut self.tumor_cov,
            Sample::Normal => &mut self.normal_cov,
        };
        for (i, &qv) in passes_qv.iter().enumerate().take(len) {
            let pos = match ori {
                Ori::F => i,
                Ori::R => len - 1 - i,
            };
            covs[pos].add(strand, qv);
        }
    }
    /// The number of edges leaving the node when walked in `ori`.
    pub fn degree(&self, ori: Ori) -> usize {
        self.edges.iter().filter(|e| e.dir.from == ori).count()
    }
    /// The single edge leaving the node when walked in `ori`, if there is exactly one.
    pub fn buddy(&self, ori: Ori) -> Option<&Edge> {
        let mut edges = self.edges.iter().filter(|e| e.dir.from == ori);
        match (edges.next(), edges.next()) {
            (Some(edge), None) => Some(edge),
            _ => None,
        }
    }
    pub fn edges_from(&self, ori: Ori) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.dir.from == ori)
    }
    /// Add an edge or increase the count of an existing one.
    pub fn add_edge(&mut self, to: usize, dir: EdgeDir, count: u32) {
        match self.edges.iter_mut().find(|e| e.to == to && e.dir == dir) {
            Some(edge) => edge.count += count,
            None => self.edges.push(Edge::new(to, dir, count)),
        }
    }
    pub fn remove_edge(&mut self, to: usize, dir: EdgeDir) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| e.to == to && e.dir == dir)?;
        Some(self.edges.remove(idx))
    }
    pub fn remove_edges_to(&mut self, to: usize) -> usize {
        let len = self.edges.len();
        self.edges.retain(|e| e.to != to);
        len - self.edges.len()
    }
    /// Where `kmer` sits in this node: the offset in the stored frame and
    /// the orientation in which it reads as given.
    pub fn locate(&self, kmer: &[u8]) -> Option<(usize, Ori)> {
        if let Some(pos) = self.seq.windows(kmer.len()).position(|w| w == kmer) {
            return Some((pos, Ori::F));
        }
        let rev = revcmp(kmer);
        let pos = self.seq.windows(rev.len()).position(|w| w == rev.as_slice())?;
        Some((pos, Ori::R))
    }
    /// Absorb `other`, read in `other_ori`, on the `side` end of this node.
    /// `Ori::F` appends it, `Ori::R` prepends it. The two overlap by k-1 bases,
    /// where the coverage of both is added up, so the total per base coverage
    /// of the pair is kept.
    pub fn absorb(&mut self, other: &Node, other_ori: Ori, side: Ori) {
        let overlap = self.k - 1;
        let seq = other.oriented_seq(other_ori);
        let (tumor, normal) = other.oriented_cov(other_ori);
        match side {
            Ori::F => {
                let start = self.seq.len() - overlap;
                for i in 0..overlap {
                    self.tumor_cov[start + i] += tumor[i];
                    self.normal_cov[start + i] += normal[i];
                }
                self.seq.extend_from_slice(&seq[overlap..]);
                self.tumor_cov.extend_from_slice(&tumor[overlap..]);
                self.normal_cov.extend_from_slice(&normal[overlap..]);
            }
            Ori::R => {
                let head = seq.len() - overlap;
                for i in 0..overlap {
                    self.tumor_cov[i] += tumor[head + i];
                    self.normal_cov[i] += normal[head + i];
                }
                let mut merged = seq[..head].to_vec();
                merged.extend_from_slice(&self.seq);
                self.seq = merged;
                let mut t = tumor[..head].to_vec();
                t.extend_from_slice(&self.tumor_cov);
                self.tumor_cov = t;
                let mut n = normal[..head].to_vec();
                n.extend_from_slice(&self.normal_cov);
                self.normal_cov = n;
            }
        }
        self.counts.tumor_fwd += other.counts.tumor_fwd;
        self.counts.tumor_rev += other.counts.tumor_rev;
        self.counts.normal_fwd += other.counts.normal_fwd;
        self.counts.normal_rev += other.counts.normal_rev;
        self.reads.extend(other.reads.iter().copied());
        self.is_ref |= other.is_ref;
        self.on_ref_path |= other.on_ref_path;
        self.ref_kmers += other.ref_kmers;
    }
}
