//! Bi-directed de Bruijn graph of a single locus.
//!
//! Nodes live in an arena and are addressed by their index. Removing a node only
//! marks it dead; [Graph::clean_dead] compacts the arena and remaps every index.
//! Each edge is stored on both endpoints. The mirror of `(u -> v, ab)` is `(v -> u, !b!a)`.
use crate::config::AssemblyConfig;
use crate::coverage::{position_coverage, Cov};
use crate::edge::{Edge, EdgeDir};
use crate::error::AssemblyError;
use crate::find_union::FindUnion;
use crate::mer::{is_dna, CanonicalMer, Mer, Ori};
use crate::node::Node;
use crate::read_info::ReadRegistry;
use definitions::{LoadCounters, PositionCoverage, ReadRecord, ReferenceWindow, Sample, Strand};
use std::collections::HashMap;
pub mod export;
pub mod scaffold;
pub mod search;
pub mod simplify;
pub use scaffold::MateBundle;
pub use search::SearchStatus;

/// A reference k-mer bounding the walks of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub node: usize,
    /// The orientation in which the node reads as the reference.
    pub ori: Ori,
    /// Offset of the k-mer in the reference window.
    pub ref_pos: usize,
}

#[derive(Clone)]
pub struct Graph {
    k: usize,
    config: AssemblyConfig,
    nodes: Vec<Node>,
    indexer: HashMap<CanonicalMer, usize>,
    ref_name: String,
    ref_start: u64,
    ref_seq: Vec<u8>,
    source: Option<Anchor>,
    sink: Option<Anchor>,
    reads: ReadRegistry,
    counters: LoadCounters,
    /// Chains of components linked by mates, filled when scaffolding is enabled.
    scaffolds: Vec<Vec<usize>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (idx, node) in self.nodes.iter().enumerate() {
            writeln!(f, "{}\t{:?}", idx, node)?;
        }
        write!(f, "K:{}\tSource:{:?}\tSink:{:?}", self.k, self.source, self.sink)
    }
}

impl Graph {
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            k: config.k,
            config: config.clone(),
            nodes: vec![],
            indexer: HashMap::new(),
            ref_name: String::new(),
            ref_start: 0,
            ref_seq: vec![],
            source: None,
            sink: None,
            reads: ReadRegistry::new(),
            counters: LoadCounters::default(),
            scaffolds: vec![],
        }
    }
    pub fn k(&self) -> usize {
        self.k
    }
    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }
    pub fn alive_nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate().filter(|(_, n)| !n.dead)
    }
    pub fn num_alive(&self) -> usize {
        self.alive_nodes().count()
    }
    pub fn source(&self) -> Option<Anchor> {
        self.source
    }
    pub fn sink(&self) -> Option<Anchor> {
        self.sink
    }
    pub fn reference(&self) -> &[u8] {
        &self.ref_seq
    }
    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }
    pub fn ref_start(&self) -> u64 {
        self.ref_start
    }
    pub fn scaffolds(&self) -> &[Vec<usize>] {
        &self.scaffolds
    }
    pub fn counters(&self) -> &LoadCounters {
        &self.counters
    }
    pub fn reads(&self) -> &ReadRegistry {
        &self.reads
    }
    /// The live node holding `kmer`, in either orientation.
    pub fn lookup(&self, kmer: &[u8]) -> Option<usize> {
        let (canonical, _) = CanonicalMer::from_kmer(kmer);
        let &id = self.indexer.get(&canonical)?;
        match self.nodes[id].dead {
            true => None,
            false => Some(id),
        }
    }
    fn get_or_insert(&mut self, kmer: CanonicalMer) -> usize {
        match self.indexer.get(&kmer) {
            Some(&id) => id,
            None => {
                let id = self.nodes.len();
                self.nodes.push(Node::new(&kmer));
                self.indexer.insert(kmer, id);
                id
            }
        }
    }
    /// Add `count` to the edge `from -> to` and to its mirror.
    pub fn add_edge(&mut self, from: usize, to: usize, dir: EdgeDir, count: u32) {
        self.nodes[from].add_edge(to, dir, count);
        let mirror = dir.mirror();
        if from != to || mirror != dir {
            self.nodes[to].add_edge(from, mirror, count);
        }
    }
    pub fn add_read(&mut self, record: &ReadRecord) -> usize {
        self.reads.add_read(record)
    }
    pub fn load_reference(&mut self, reference: &ReferenceWindow) -> Result<(), AssemblyError> {
        let seq = reference.seq().to_ascii_uppercase();
        if seq.len() < self.k {
            return Err(AssemblyError::ReferenceTooShort {
                len: seq.len(),
                k: self.k,
            });
        }
        self.ref_name = reference.name.clone();
        self.ref_start = reference.start;
        self.load_sequence(&seq, &[], None, true, Sample::Normal, Strand::Forward);
        self.ref_seq = seq;
        Ok(())
    }
    /// Thread every k-mer of `seq` into the graph. Windows with a non ACGT base
    /// are skipped and break the chain of edges.
    pub fn load_sequence(
        &mut self,
        seq: &[u8],
        qual: &[u8],
        read: Option<usize>,
        is_ref: bool,
        sample: Sample,
        strand: Strand,
    ) {
        let k = self.k;
        let min_qual = self.config.min_qual_call;
        let mut prev: Option<(usize, Ori)> = None;
        for (i, kmer) in seq.windows(k).enumerate() {
            if !kmer.iter().all(|&b| is_dna(b)) {
                self.counters.windows_skipped += 1;
                prev = None;
                continue;
            }
            let (canonical, ori) = Mer::new(kmer).canonical();
            let id = self.get_or_insert(canonical);
            let node = &mut self.nodes[id];
            if is_ref {
                node.is_ref = true;
                node.ref_kmers += read.is_none() as usize;
            } else {
                let passes: Vec<_> = (i..i + k)
                    .map(|j| qual.get(j).map_or(true, |&q| q.saturating_sub(33) >= min_qual))
                    .collect();
                node.add_kmer_cov(sample, strand, ori, &passes);
                if let Some(read) = read {
                    node.reads.insert(read);
                }
            }
            if let Some((from, from_ori)) = prev {
                let count = if is_ref { 0 } else { 1 };
                self.add_edge(from, id, EdgeDir::new(from_ori, ori), count);
            }
            prev = Some((id, ori));
        }
    }
    /// Trim the low quality ends of a registered read and load it.
    /// Returns false if the read was dropped.
    pub fn trim_and_load(&mut self, read_id: usize) -> Result<bool, AssemblyError> {
        let read = self
            .reads
            .get(read_id)
            .ok_or(AssemblyError::MissingRead(read_id))?;
        let (sample, strand) = (read.sample, read.strand);
        let (start, end) = trim_range(&read.qual, read.seq.len(), self.config.min_qual_trim);
        let seq = read.seq[start..end].to_vec();
        let qual = match read.qual.len() == read.seq.len() {
            true => read.qual[start..end].to_vec(),
            false => vec![],
        };
        let ambiguous = seq.iter().filter(|&&b| !is_dna(b)).count();
        if self.config.max_ambiguous_bases < ambiguous {
            trace!("AMBIGUOUS\t{}\t{}", read.name, ambiguous);
            self.counters.reads_ambiguous += 1;
            return Ok(false);
        }
        if seq.len() < self.k.max(self.config.min_read_len) {
            trace!("SHORT\t{}\t{}", read.name, seq.len());
            self.counters.reads_too_short += 1;
            return Ok(false);
        }
        self.load_sequence(&seq, &qual, Some(read_id), false, sample, strand);
        if let Some(read) = self.reads.get_mut(read_id) {
            read.loaded = Some((start, end));
        }
        self.counters.reads_loaded += 1;
        self.counters.loaded_bp += seq.len();
        Ok(true)
    }
    /// Load the reference, then every read, then link mates.
    pub fn load(
        &mut self,
        reference: &ReferenceWindow,
        reads: &[ReadRecord],
    ) -> Result<(), AssemblyError> {
        self.load_reference(reference)?;
        for record in reads {
            let id = self.add_read(record);
            if record.is_reference {
                let seq = record.seq().to_ascii_uppercase();
                self.load_sequence(&seq, &[], Some(id), true, record.sample, record.strand);
            } else {
                self.trim_and_load(id)?;
            }
        }
        let pairs = self.reads.add_mates();
        let c = &self.counters;
        debug!(
            "LOAD\t{}\t{}\t{}\t{}\t{}\t{}",
            self.ref_name,
            c.reads_loaded,
            c.reads_too_short,
            c.reads_ambiguous,
            pairs,
            self.nodes.len()
        );
        Ok(())
    }
    /// Load everything and simplify each component having reference anchors.
    /// Returns the number of connected components.
    pub fn build_graph(
        &mut self,
        reference: &ReferenceWindow,
        reads: &[ReadRecord],
    ) -> Result<usize, AssemblyError> {
        self.load(reference, reads)?;
        self.mark_ref_nodes();
        let num_comp = self.mark_connected_components();
        for comp in 1..=num_comp {
            match self.mark_ref_ends(comp) {
                Some(_) => self.simplify_component(comp),
                None => debug!("SKIP\t{}\t{}", self.ref_name, comp),
            }
        }
        self.clean_dead();
        let num_comp = self.mark_connected_components();
        if self.config.scaffold_contigs {
            self.scaffolds = self.scaffold_contigs();
            debug!("SCAFFOLD\t{}\t{:?}", self.ref_name, self.scaffolds);
        }
        self.check_integrity()?;
        self.print_stats();
        Ok(num_comp)
    }
    /// Flag every node a reference k-mer lands on. Returns the number of such nodes.
    pub fn mark_ref_nodes(&mut self) -> usize {
        let ids: Vec<_> = self
            .ref_seq
            .windows(self.k)
            .filter_map(|kmer| self.lookup(kmer))
            .collect();
        for &id in ids.iter() {
            self.nodes[id].is_ref = true;
            self.nodes[id].on_ref_path = true;
        }
        self.nodes.iter().filter(|n| n.on_ref_path).count()
    }
    /// Label live nodes by undirected reachability. Components are numbered from 1,
    /// dead nodes get 0. Returns the number of components.
    pub fn mark_connected_components(&mut self) -> usize {
        let mut fu = FindUnion::new(self.nodes.len());
        for (from, node) in self.nodes.iter().enumerate().filter(|(_, n)| !n.dead) {
            for edge in node.edges.iter() {
                fu.unite(from, edge.to);
            }
        }
        let mut ids: HashMap<usize, usize> = HashMap::new();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.component = 0;
            if node.dead {
                continue;
            }
            if let Some(root) = fu.find(i) {
                let next = ids.len() + 1;
                node.component = *ids.entry(root).or_insert(next);
            }
        }
        debug!("COMPONENTS\t{}\t{}", self.ref_name, ids.len());
        ids.len()
    }
    /// Set the source and the sink of `comp`: the nodes of its first and last reference k-mers.
    /// None if the component has no reference k-mer or both ends land on the same node.
    pub fn mark_ref_ends(&mut self, comp: usize) -> Option<(Anchor, Anchor)> {
        for node in self.nodes.iter_mut() {
            node.is_source = false;
            node.is_sink = false;
        }
        self.source = None;
        self.sink = None;
        let (mut first, mut last) = (None, None);
        for (ref_pos, kmer) in self.ref_seq.windows(self.k).enumerate() {
            let node = match self.lookup(kmer) {
                Some(id) if self.nodes[id].component == comp => id,
                _ => continue,
            };
            if let Some((_, ori)) = self.nodes[node].locate(kmer) {
                let anchor = Anchor { node, ori, ref_pos };
                first = first.or(Some(anchor));
                last = Some(anchor);
            }
        }
        let (source, sink) = (first?, last?);
        if source.node == sink.node {
            debug!("SAMEENDS\t{}\t{}\t{}", self.ref_name, comp, source.node);
            return None;
        }
        self.nodes[source.node].is_source = true;
        self.nodes[sink.node].is_sink = true;
        self.source = Some(source);
        self.sink = Some(sink);
        Some((source, sink))
    }
    /// Compact the arena. Returns the number of nodes erased.
    pub fn clean_dead(&mut self) -> usize {
        let before = self.nodes.len();
        let mut map = vec![None; before];
        let mut alive = vec![];
        for (i, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            if !node.dead {
                map[i] = Some(alive.len());
                alive.push(node);
            }
        }
        for node in alive.iter_mut() {
            node.edges = node
                .edges
                .iter()
                .filter_map(|e| map[e.to].map(|to| Edge::new(to, e.dir, e.count)))
                .collect();
        }
        self.nodes = alive;
        self.indexer.retain(|_, id| match map[*id] {
            Some(new) => {
                *id = new;
                true
            }
            None => false,
        });
        let remap = |a: Anchor| map[a.node].map(|node| Anchor { node, ..a });
        self.source = self.source.and_then(remap);
        self.sink = self.sink.and_then(remap);
        debug!("CLEAN\t{}\t{}\t{}", self.ref_name, before, self.nodes.len());
        before - self.nodes.len()
    }
    /// Every edge points to a live node and has its mirror; anchors are live.
    pub fn check_integrity(&self) -> Result<(), AssemblyError> {
        for (from, node) in self.alive_nodes() {
            for edge in node.edges.iter() {
                let target = self
                    .nodes
                    .get(edge.to)
                    .filter(|n| !n.dead)
                    .ok_or(AssemblyError::DanglingEdge { from, to: edge.to })?;
                let mirror = edge.dir.mirror();
                if !target.edges.iter().any(|f| f.to == from && f.dir == mirror) {
                    return Err(AssemblyError::AsymmetricEdge { from, to: edge.to });
                }
            }
        }
        for anchor in self.source.iter().chain(self.sink.iter()) {
            match self.nodes.get(anchor.node) {
                Some(node) if !node.dead => {}
                _ => return Err(AssemblyError::MissingNode(anchor.node)),
            }
        }
        Ok(())
    }
    /// Per base coverage of the reference window, read off the nodes it threads through.
    pub fn reference_coverage(&self) -> Vec<PositionCoverage> {
        let k = self.k;
        let len = self.ref_seq.len();
        let (mut tumor, mut normal) = (vec![Cov::default(); len], vec![Cov::default(); len]);
        for (pos, kmer) in self.ref_seq.windows(k).enumerate() {
            let node = match self.lookup(kmer) {
                Some(id) => &self.nodes[id],
                None => continue,
            };
            let (offset, ori) = match node.locate(kmer) {
                Some(hit) => hit,
                None => continue,
            };
            for i in 0..k {
                let at = match ori {
                    Ori::F => offset + i,
                    Ori::R => offset + k - 1 - i,
                };
                tumor[pos + i] = tumor[pos + i].max(&node.tumor_cov()[at]);
                normal[pos + i] = normal[pos + i].max(&node.normal_cov()[at]);
            }
        }
        std::iter::zip(&tumor, &normal)
            .map(|(t, n)| position_coverage(t, n, false))
            .collect()
    }
    /// True if some live node is supported by tumor reads only.
    pub fn has_tumor_only_kmer(&self) -> bool {
        self.alive_nodes().any(|(_, n)| n.is_tumor_only())
    }
    pub fn print_stats(&self) {
        let alive = self.num_alive();
        let refs = self.alive_nodes().filter(|(_, n)| n.is_ref).count();
        let edges: usize = self.alive_nodes().map(|(_, n)| n.edges.len()).sum();
        let tandem = self.alive_nodes().filter(|(_, n)| n.is_tandem()).count();
        debug!(
            "STATS\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.ref_name,
            alive,
            refs,
            edges,
            tandem,
            self.reads.count_mapped_reads(),
            self.reads.count_unmapped_reads()
        );
    }
}

/// The range of bases between the first and the last base of at least `min_qual`.
fn trim_range(qual: &[u8], len: usize, min_qual: u8) -> (usize, usize) {
    if qual.len() != len {
        return (0, len);
    }
    let passes = |&q: &u8| q.saturating_sub(33) >= min_qual;
    let start = qual.iter().position(passes).unwrap_or(len);
    let end = qual.iter().rposition(passes).map_or(start, |e| e + 1);
    (start, end.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn trim() {
        assert_eq!(trim_range(b"", 4, 20), (0, 4));
        assert_eq!(trim_range(b"##II#I##", 8, 20), (2, 6));
        assert_eq!(trim_range(b"####", 4, 20), (4, 4));
    }
}
