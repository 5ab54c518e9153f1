//! Removing erroneous nodes and merging unbranched chains.
//! Every pass works on a single component, and nodes of other components are never touched.
use super::Graph;
use crate::edge::{Edge, EdgeDir};
use crate::mer::{CanonicalMer, Ori};

impl Graph {
    /// The fixed pipeline run on each component with anchors:
    /// low coverage nodes, then tips, then short links, then a final compression.
    pub fn simplify_component(&mut self, comp: usize) {
        let low_cov = self.remove_low_cov(true, comp);
        let tips = self.remove_tips(comp);
        let links = self.remove_short_links(comp);
        let merged = self.compress(comp);
        debug!(
            "SIMPLIFY\t{}\t{}\t{}\t{}\t{}\t{}",
            self.ref_name, comp, low_cov, tips, links, merged
        );
    }
    pub fn component_nodes(&self, comp: usize) -> Vec<usize> {
        self.alive_nodes()
            .filter(|(_, n)| n.component == comp)
            .map(|(id, _)| id)
            .collect()
    }
    /// Mark the node dead and drop every edge touching it.
    pub fn remove_node(&mut self, id: usize) {
        let edges = std::mem::take(&mut self.nodes[id].edges);
        for edge in edges.iter().filter(|e| e.to != id) {
            self.nodes[edge.to].remove_edges_to(id);
        }
        self.nodes[id].dead = true;
        trace!("REMOVE\t{}\t{}", id, self.nodes[id].len());
    }
    /// Remove nodes whose coverage is below the threshold, or tiny compared with
    /// the heaviest of their neighbours. The decisions are taken before any removal.
    pub fn remove_low_cov(&mut self, compress: bool, comp: usize) -> usize {
        let (thr, min_ratio) = (self.config.cov_threshold, self.config.min_cov_ratio);
        let to_remove: Vec<_> = self
            .component_nodes(comp)
            .into_iter()
            .filter(|&id| {
                let node = &self.nodes[id];
                if node.is_special() {
                    return false;
                }
                let cov = node.mean_cov();
                let max = node
                    .edges
                    .iter()
                    .map(|e| self.nodes[e.to].mean_cov())
                    .fold(cov, f64::max);
                cov < thr || (0f64 < max && cov / max < min_ratio)
            })
            .collect();
        for &id in to_remove.iter() {
            self.remove_node(id);
        }
        if compress {
            self.compress(comp);
        }
        debug!("LOWCOV\t{}\t{}\t{}", self.ref_name, comp, to_remove.len());
        to_remove.len()
    }
    fn is_tip(&self, id: usize) -> bool {
        let node = &self.nodes[id];
        !node.is_special()
            && node.size() < self.config.max_tip_len
            && (node.degree(Ori::F) == 0 || node.degree(Ori::R) == 0)
    }
    /// Remove short dead ends until none is left. Removing a tip can merge
    /// its parent into a new tip, so compression runs between rounds.
    pub fn remove_tips(&mut self, comp: usize) -> usize {
        let mut removed = 0;
        loop {
            self.compress(comp);
            let tips: Vec<_> = self
                .component_nodes(comp)
                .into_iter()
                .filter(|&id| self.is_tip(id))
                .collect();
            if tips.is_empty() {
                break;
            }
            removed += tips.len();
            for id in tips {
                self.remove_node(id);
            }
        }
        debug!("TIPS\t{}\t{}\t{}", self.ref_name, comp, removed);
        removed
    }
    fn is_short_link(&self, id: usize) -> bool {
        let node = &self.nodes[id];
        !node.dead
            && !node.is_special()
            && node.size() <= self.config.max_link_len()
            && 0 < node.degree(Ori::F)
            && 0 < node.degree(Ori::R)
            && node.mean_cov() <= self.config.low_cov_threshold
            && node
                .edges
                .iter()
                .all(|e| e.to != id && 1 < self.nodes[e.to].degree(!e.dir.to))
    }
    /// Remove short, weakly supported nodes bridging two nodes that keep another
    /// route on the side facing them.
    pub fn remove_short_links(&mut self, comp: usize) -> usize {
        let candidates: Vec<_> = self
            .component_nodes(comp)
            .into_iter()
            .filter(|&id| self.is_short_link(id))
            .collect();
        let mut removed = 0;
        for id in candidates {
            if self.is_short_link(id) {
                self.remove_node(id);
                removed += 1;
            }
        }
        debug!("LINKS\t{}\t{}\t{}", self.ref_name, comp, removed);
        removed
    }
    /// Merge unbranched chains until no more merge is possible.
    /// Returns the number of merges.
    pub fn compress(&mut self, comp: usize) -> usize {
        let mut merged = 0;
        loop {
            let mut changed = false;
            for id in self.component_nodes(comp) {
                for ori in [Ori::F, Ori::R] {
                    while self.compress_node(id, ori) {
                        merged += 1;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        merged
    }
    /// Merge the single neighbour of `id` on its `ori` side into it.
    /// The neighbour must have `id` as its only neighbour on the facing side.
    /// Neither node may be the source or the sink, and self loops stop the merge.
    /// Returns true if merged.
    pub fn compress_node(&mut self, id: usize, ori: Ori) -> bool {
        let node = &self.nodes[id];
        if node.dead || node.is_source || node.is_sink {
            return false;
        }
        let edge = match node.buddy(ori) {
            Some(&edge) if edge.to != id => edge,
            _ => return false,
        };
        let (buddy_id, buddy_ori) = (edge.to, edge.dir.to);
        let buddy = &self.nodes[buddy_id];
        if buddy.dead || buddy.is_source || buddy.is_sink || buddy.degree(!buddy_ori) != 1 {
            return false;
        }
        let mirror = edge.dir.mirror();
        let touches = buddy
            .edges
            .iter()
            .any(|e| e.to == buddy_id || (e.to == id && e.dir != mirror));
        if touches {
            return false;
        }
        let far: Vec<Edge> = buddy.edges_from(buddy_ori).copied().collect();
        let absorbed = buddy.clone();
        // The orientation of the buddy in the stored frame of the node.
        let frame_ori = match ori {
            Ori::F => buddy_ori,
            Ori::R => !buddy_ori,
        };
        self.nodes[id].remove_edge(buddy_id, edge.dir);
        self.nodes[id].absorb(&absorbed, frame_ori, ori);
        for e in far {
            self.nodes[e.to].remove_edge(buddy_id, e.dir.mirror());
            self.add_edge(id, e.to, EdgeDir::new(ori, e.dir.to), e.count);
        }
        for kmer in absorbed.seq().windows(self.k) {
            let (canonical, _) = CanonicalMer::from_kmer(kmer);
            self.indexer.insert(canonical, id);
        }
        let buddy = &mut self.nodes[buddy_id];
        buddy.edges.clear();
        buddy.dead = true;
        trace!("MERGE\t{}\t{}\t{}", id, buddy_id, self.nodes[id].len());
        true
    }
}
