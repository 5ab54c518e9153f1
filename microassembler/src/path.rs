//! A walk through the graph.
use crate::coverage::{position_coverage, Cov};
use crate::edge::EdgeDir;
use crate::graph::Graph;
use crate::mer::{revcmp, Ori};
use crate::node::Node;
use crate::transcript::Transcript;
use definitions::PositionCoverage;

/// An ordered walk of `(node, orientation)` steps. It borrows the graph, so it
/// cannot outlive it nor survive a pass that changes the nodes.
#[derive(Clone)]
pub struct Path<'a> {
    graph: &'a Graph,
    steps: Vec<(usize, Ori)>,
    /// `dirs[i]` is the edge between `steps[i]` and `steps[i+1]`.
    dirs: Vec<EdgeDir>,
    /// `Ori::R` if the walk goes from the sink to the source.
    dir: Ori,
    len: usize,
    pub has_cycle: bool,
    pub match_bp: usize,
    pub snp_bp: usize,
    pub ins_bp: usize,
    pub del_bp: usize,
}

impl std::fmt::Debug for Path<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let steps: Vec<_> = self
            .steps
            .iter()
            .map(|(node, ori)| format!("{}{}", node, ori))
            .collect();
        write!(f, "{}\t{}\t{}", self.dir, self.len, steps.join("-"))
    }
}

impl<'a> Path<'a> {
    pub fn new(
        graph: &'a Graph,
        steps: Vec<(usize, Ori)>,
        dirs: Vec<EdgeDir>,
        dir: Ori,
        has_cycle: bool,
    ) -> Self {
        let overlap = graph.k() - 1;
        let len = steps
            .iter()
            .filter_map(|&(node, _)| graph.node(node))
            .map(|n| n.len())
            .sum::<usize>()
            - overlap * steps.len().saturating_sub(1);
        Self {
            graph,
            steps,
            dirs,
            dir,
            len,
            has_cycle,
            match_bp: 0,
            snp_bp: 0,
            ins_bp: 0,
            del_bp: 0,
        }
    }
    pub fn steps(&self) -> &[(usize, Ori)] {
        &self.steps
    }
    pub fn dirs(&self) -> &[EdgeDir] {
        &self.dirs
    }
    pub fn dir(&self) -> Ori {
        self.dir
    }
    /// Number of bases.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    pub fn num_nodes(&self) -> usize {
        self.steps.len()
    }
    fn nodes(&self) -> impl Iterator<Item = (&'a Node, Ori)> + '_ {
        let graph = self.graph;
        self.steps
            .iter()
            .filter_map(move |&(id, ori)| graph.node(id).map(|n| (n, ori)))
    }
    /// The spelled sequence, in the direction of the walk.
    pub fn sequence(&self) -> Vec<u8> {
        let overlap = self.graph.k() - 1;
        let mut seq = Vec::with_capacity(self.len);
        for (i, (node, ori)) in self.nodes().enumerate() {
            let oriented = node.oriented_seq(ori);
            let skip = if i == 0 { 0 } else { overlap };
            seq.extend_from_slice(&oriented[skip..]);
        }
        seq
    }
    /// The spelled sequence on the reference strand.
    pub fn forward_sequence(&self) -> Vec<u8> {
        match self.dir {
            Ori::F => self.sequence(),
            Ori::R => revcmp(&self.sequence()),
        }
    }
    /// Per base (tumor, normal) coverage along the walk. Where two nodes
    /// overlap, the larger value is kept.
    pub fn cov_distr(&self) -> (Vec<Cov>, Vec<Cov>) {
        let overlap = self.graph.k() - 1;
        let (mut tumor, mut normal): (Vec<Cov>, Vec<Cov>) = (vec![], vec![]);
        for (i, (node, ori)) in self.nodes().enumerate() {
            let (t, n) = node.oriented_cov(ori);
            let skip = if i == 0 { 0 } else { overlap };
            let start = tumor.len() - skip;
            for j in 0..skip {
                tumor[start + j] = tumor[start + j].max(&t[j]);
                normal[start + j] = normal[start + j].max(&n[j]);
            }
            tumor.extend_from_slice(&t[skip..]);
            normal.extend_from_slice(&n[skip..]);
        }
        (tumor, normal)
    }
    /// Per base coverage along the walk. With `use_qv`, low quality bases are not counted.
    pub fn coverage(&self, use_qv: bool) -> Vec<PositionCoverage> {
        let (tumor, normal) = self.cov_distr();
        std::iter::zip(&tumor, &normal)
            .map(|(t, n)| position_coverage(t, n, use_qv))
            .collect()
    }
    pub fn forward_coverage(&self, use_qv: bool) -> Vec<PositionCoverage> {
        let mut cov = self.coverage(use_qv);
        if self.dir == Ori::R {
            cov.reverse();
        }
        cov
    }
    fn total_cov(&self) -> Vec<u32> {
        self.coverage(false).iter().map(|c| c.total()).collect()
    }
    pub fn mean_cov(&self) -> f64 {
        let covs = self.total_cov();
        covs.iter().sum::<u32>() as f64 / covs.len().max(1) as f64
    }
    pub fn min_cov(&self) -> u32 {
        self.total_cov().into_iter().min().unwrap_or(0)
    }
    pub fn max_cov(&self) -> u32 {
        self.total_cov().into_iter().max().unwrap_or(0)
    }
    /// True if a node on the walk is supported by tumor reads only.
    pub fn has_tumor_only_node(&self) -> bool {
        self.nodes().any(|(node, _)| node.is_tumor_only())
    }
    /// The node spelling the `pos`-th base. At an overlap, the earlier node.
    pub fn node_at(&self, pos: usize) -> Option<usize> {
        let overlap = self.graph.k() - 1;
        let mut end = 0;
        for (i, (node, _)) in self.nodes().enumerate() {
            end += if i == 0 { node.len() } else { node.len() - overlap };
            if pos < end {
                return Some(self.steps[i].0);
            }
        }
        None
    }
    /// The smallest number of reads supporting a node of the walk.
    pub fn min_read_support(&self) -> usize {
        self.nodes()
            .map(|(node, _)| node.reads.len())
            .min()
            .unwrap_or(0)
    }
    pub fn set_counts(&mut self, transcript: &Transcript) {
        self.match_bp = transcript.match_bp;
        self.snp_bp = transcript.snp_bp;
        self.ins_bp = transcript.ins_bp;
        self.del_bp = transcript.del_bp;
    }
}
