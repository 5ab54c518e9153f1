//! Walks between the source and the sink.
use super::Graph;
use crate::edge::EdgeDir;
use crate::error::AssemblyError;
use crate::mer::Ori;
use crate::path::Path;
use std::collections::{HashSet, VecDeque};

/// Whether a search visited everything it could.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Complete,
    /// The search stopped after `dfs_limit` steps.
    Truncated,
}

type State = (usize, Ori);

fn slot(ori: Ori) -> usize {
    match ori {
        Ori::F => 0,
        Ori::R => 1,
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    ori: Ori,
    next: usize,
    len: usize,
}

impl Graph {
    /// Start and goal of a walk. `Ori::R` walks from the sink back to the source.
    fn search_ends(&self, dir: Ori) -> Option<(State, State)> {
        let (source, sink) = (self.source?, self.sink?);
        match dir {
            Ori::F => Some(((source.node, source.ori), (sink.node, sink.ori))),
            Ori::R => Some(((sink.node, !sink.ori), (source.node, !source.ori))),
        }
    }
    /// True if a walk from the source can come back to a (node, orientation) it is on.
    pub fn has_cycle(&self) -> bool {
        let (start, _) = match self.search_ends(Ori::F) {
            Some(ends) => ends,
            None => return false,
        };
        // 0: unvisited, 1: in progress, 2: done.
        let mut color = vec![[0u8; 2]; self.nodes.len()];
        color[start.0][slot(start.1)] = 1;
        let mut stack: Vec<(State, usize)> = vec![(start, 0)];
        while let Some(top) = stack.last_mut() {
            let ((node, ori), next) = *top;
            match self.nodes[node].edges_from(ori).nth(next) {
                Some(edge) => {
                    top.1 += 1;
                    let (to, to_ori) = (edge.to, edge.dir.to);
                    match color[to][slot(to_ori)] {
                        0 => {
                            color[to][slot(to_ori)] = 1;
                            stack.push(((to, to_ori), 0));
                        }
                        1 => {
                            debug!("CYCLE\t{}\t{}\t{}", self.ref_name, to, to_ori);
                            return true;
                        }
                        _ => {}
                    }
                }
                None => {
                    color[node][slot(ori)] = 2;
                    stack.pop();
                }
            }
        }
        false
    }
    /// Enumerate the walks between the source and the sink, handing each one to `emit`
    /// as soon as it is found. A walk never visits a node twice, and walks longer than the
    /// reference plus `max_indel_len` are abandoned. After `dfs_limit` steps the search
    /// stops and reports [SearchStatus::Truncated].
    pub fn dfs<F: FnMut(Path<'_>)>(
        &self,
        dir: Ori,
        mut emit: F,
    ) -> Result<SearchStatus, AssemblyError> {
        let (start, goal) = self.search_ends(dir).ok_or(AssemblyError::NoSourceOrSink)?;
        let overlap = self.k - 1;
        let max_len = self.ref_seq.len() + self.config.max_indel_len;
        let limit = self.config.dfs_limit;
        let has_cycle = self.has_cycle();
        let mut on_walk = vec![false; self.nodes.len()];
        on_walk[start.0] = true;
        let mut walk: Vec<State> = vec![start];
        let mut dirs: Vec<EdgeDir> = vec![];
        let mut stack = vec![Frame {
            node: start.0,
            ori: start.1,
            next: 0,
            len: self.nodes[start.0].len(),
        }];
        let (mut steps, mut paths) = (0, 0);
        while let Some(frame) = stack.last_mut() {
            let Frame { node, ori, next, len } = *frame;
            frame.next += 1;
            let edge = match self.nodes[node].edges_from(ori).nth(next) {
                Some(&edge) => edge,
                None => {
                    on_walk[node] = false;
                    stack.pop();
                    walk.pop();
                    dirs.pop();
                    continue;
                }
            };
            let (to, to_ori) = (edge.to, edge.dir.to);
            if self.nodes[to].dead {
                continue;
            }
            steps += 1;
            if limit < steps {
                warn!("TRUNCATED\t{}\t{}\t{}", self.ref_name, limit, paths);
                return Ok(SearchStatus::Truncated);
            }
            if to == goal.0 {
                if to_ori == goal.1 {
                    let mut nodes = walk.clone();
                    nodes.push((to, to_ori));
                    let mut path_dirs = dirs.clone();
                    path_dirs.push(edge.dir);
                    emit(Path::new(self, nodes, path_dirs, dir, has_cycle));
                    paths += 1;
                }
                continue;
            }
            if on_walk[to] {
                continue;
            }
            let len = len + self.nodes[to].len() - overlap;
            if max_len < len {
                continue;
            }
            on_walk[to] = true;
            walk.push((to, to_ori));
            dirs.push(edge.dir);
            stack.push(Frame {
                node: to,
                ori: to_ori,
                next: 0,
                len,
            });
        }
        debug!("DFS\t{}\t{}\t{}\t{}", self.ref_name, dir, steps, paths);
        Ok(SearchStatus::Complete)
    }
    /// A walk with the fewest nodes between the source and the sink.
    pub fn bfs(&self, dir: Ori) -> Option<Path<'_>> {
        let (start, goal) = self.search_ends(dir)?;
        let mut parent: Vec<Option<(State, EdgeDir)>> = vec![None; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        visited[start.0] = true;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some((node, ori)) = queue.pop_front() {
            for edge in self.nodes[node].edges_from(ori) {
                if edge.to == goal.0 {
                    if edge.dir.to != goal.1 {
                        continue;
                    }
                    let mut steps = vec![goal];
                    let mut dirs = vec![edge.dir];
                    let mut current = (node, ori);
                    loop {
                        steps.push(current);
                        match parent[current.0] {
                            Some((prev, edge_dir)) => {
                                dirs.push(edge_dir);
                                current = prev;
                            }
                            None => break,
                        }
                    }
                    steps.reverse();
                    dirs.reverse();
                    return Some(Path::new(self, steps, dirs, dir, self.has_cycle()));
                }
                if visited[edge.to] || self.nodes[edge.to].dead {
                    continue;
                }
                visited[edge.to] = true;
                parent[edge.to] = Some(((node, ori), edge.dir));
                queue.push_back((edge.to, edge.dir.to));
            }
        }
        None
    }
    /// Nodes the reference leaves and enters again, and nodes holding
    /// more reference k-mers than they have distinct k-mers.
    pub fn find_repeats_in_graph_paths(&self) -> Vec<usize> {
        let mut repeats = vec![];
        let mut seen = HashSet::new();
        let mut prev = None;
        for kmer in self.ref_seq.windows(self.k) {
            let id = match self.lookup(kmer) {
                Some(id) => id,
                None => continue,
            };
            if prev == Some(id) {
                continue;
            }
            if !seen.insert(id) {
                repeats.push(id);
            }
            prev = Some(id);
        }
        repeats.extend(
            self.alive_nodes()
                .filter(|(_, n)| n.size() < n.ref_kmers)
                .map(|(id, _)| id),
        );
        repeats.sort_unstable();
        repeats.dedup();
        repeats
    }
    pub fn has_repeats_in_graph_paths(&self) -> bool {
        let repeats = self.find_repeats_in_graph_paths();
        if !repeats.is_empty() {
            debug!("REPEATS\t{}\t{:?}", self.ref_name, repeats);
        }
        !repeats.is_empty()
    }
}
