//! Read threading, and ordering components by the mates linking them.
use super::Graph;
use crate::find_union::FindUnion;
use std::collections::HashMap;

/// Mate pairs linking two components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MateBundle {
    pub count: usize,
    /// Sum of the lengths of both mates over all pairs.
    pub total_len: usize,
}

impl MateBundle {
    pub fn mean_pair_len(&self) -> f64 {
        match self.count {
            0 => 0f64,
            _ => self.total_len as f64 / self.count as f64,
        }
    }
}

impl Graph {
    /// Re-associate the loaded reads with the (merged) nodes of `comp`,
    /// using only the trimmed part of each read.
    /// Returns the number of reads touching the component.
    pub fn thread_reads(&mut self, comp: usize) -> usize {
        for node in self.nodes.iter_mut().filter(|n| n.component == comp) {
            node.reads.clear();
        }
        let mut hits = vec![];
        let mut threaded = 0;
        let loaded = self
            .reads
            .iter()
            .filter(|(_, r)| !r.is_ref)
            .filter_map(|(id, r)| r.loaded_seq().map(|seq| (id, seq)));
        for (id, seq) in loaded {
            let len = hits.len();
            for kmer in seq.windows(self.k) {
                match self.lookup(kmer) {
                    Some(node) if self.nodes[node].component == comp => hits.push((node, id)),
                    _ => {}
                }
            }
            threaded += (len < hits.len()) as usize;
        }
        for (node, read) in hits {
            self.nodes[node].reads.insert(read);
        }
        trace!("THREAD\t{}\t{}\t{}", self.ref_name, comp, threaded);
        threaded
    }
    /// The component of the first k-mer of the loaded read found in the graph.
    pub fn read_component(&self, read: usize) -> Option<usize> {
        self.reads
            .get(read)?
            .loaded_seq()?
            .windows(self.k)
            .find_map(|kmer| self.lookup(kmer))
            .map(|node| self.nodes[node].component)
    }
    /// Count the mate pairs whose mates land on two different components.
    pub fn bundle_mates(&self) -> HashMap<(usize, usize), MateBundle> {
        let mut bundles: HashMap<_, MateBundle> = HashMap::new();
        for (id, read) in self.reads.iter() {
            let mate_id = match read.mate {
                Some(mate) if id < mate => mate,
                _ => continue,
            };
            let comps = (self.read_component(id), self.read_component(mate_id));
            let (comp, mate_comp) = match comps {
                (Some(x), Some(y)) if x != y => (x, y),
                _ => continue,
            };
            let loaded_len = |id: usize| {
                let read = self.reads.get(id);
                read.and_then(|r| r.loaded_seq()).map_or(0, |s| s.len())
            };
            let bundle = bundles
                .entry((comp.min(mate_comp), comp.max(mate_comp)))
                .or_default();
            bundle.count += 1;
            bundle.total_len += loaded_len(id) + loaded_len(mate_id);
        }
        bundles
    }
    /// Components in the order of the scaffolds: every chain in turn, then the
    /// components no chain reaches, in increasing order.
    pub fn component_order(&self, num_comp: usize) -> Vec<usize> {
        let mut placed = vec![false; num_comp + 1];
        let mut order = vec![];
        for &comp in self.scaffolds.iter().flatten() {
            if comp <= num_comp && !placed[comp] {
                placed[comp] = true;
                order.push(comp);
            }
        }
        order.extend((1..=num_comp).filter(|&comp| !placed[comp]));
        order
    }
    /// Chain components along the strongest mate bundles. Bundles implying a gap
    /// far outside the insert size distribution are ignored. Each component
    /// joins at most two bundles and chains never close into a loop.
    pub fn scaffold_contigs(&self) -> Vec<Vec<usize>> {
        let insert = self.config.insert_size as f64;
        let max_gap = insert + 3f64 * self.config.insert_stdev as f64;
        let mut bundles: Vec<_> = self
            .bundle_mates()
            .into_iter()
            .filter(|(_, b)| (insert - b.mean_pair_len()).abs() <= max_gap)
            .collect();
        bundles.sort_by(|(x, b1), (y, b2)| b2.count.cmp(&b1.count).then(x.cmp(y)));
        let num_comp = self.alive_nodes().map(|(_, n)| n.component).max().unwrap_or(0);
        let mut fu = FindUnion::new(num_comp + 1);
        let mut degree = vec![0; num_comp + 1];
        let mut adj = vec![vec![]; num_comp + 1];
        for ((a, b), bundle) in bundles {
            if degree[a] < 2 && degree[b] < 2 && fu.same(a, b) == Some(false) {
                fu.unite(a, b);
                degree[a] += 1;
                degree[b] += 1;
                adj[a].push(b);
                adj[b].push(a);
                debug!("LINK\t{}\t{}\t{}\t{}", self.ref_name, a, b, bundle.count);
            }
        }
        let mut visited = vec![false; num_comp + 1];
        let mut chains = vec![];
        for start in 1..=num_comp {
            if visited[start] || degree[start] != 1 {
                continue;
            }
            visited[start] = true;
            let mut chain = vec![start];
            let mut current = start;
            while let Some(&next) = adj[current].iter().find(|&&n| !visited[n]) {
                visited[next] = true;
                chain.push(next);
                current = next;
            }
            chains.push(chain);
        }
        chains
    }
}
