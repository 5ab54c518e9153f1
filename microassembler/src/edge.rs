use crate::mer::Ori;

/// The direction of an edge: the orientation in which the source node is walked,
/// followed by the orientation in which the target node is entered.
/// In other words, if you see (u, FR, v), the last k-1 bases of u are the
/// first k-1 bases of the reverse complement of v.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeDir {
    pub from: Ori,
    pub to: Ori,
}

impl EdgeDir {
    pub const FF: EdgeDir = EdgeDir::new(Ori::F, Ori::F);
    pub const FR: EdgeDir = EdgeDir::new(Ori::F, Ori::R);
    pub const RF: EdgeDir = EdgeDir::new(Ori::R, Ori::F);
    pub const RR: EdgeDir = EdgeDir::new(Ori::R, Ori::R);
    pub const fn new(from: Ori, to: Ori) -> Self {
        Self { from, to }
    }
    /// The direction of the same link seen from the target.
    /// FF <-> RR, while FR and RF are their own mirrors.
    pub fn mirror(&self) -> Self {
        Self {
            from: !self.to,
            to: !self.from,
        }
    }
}

impl std::fmt::Display for EdgeDir {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// An edge stored in the adjacency list of its source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: usize,
    pub dir: EdgeDir,
    /// Number of reads supporting this edge. Zero for reference-only edges.
    pub count: u32,
}

impl Edge {
    pub fn new(to: usize, dir: EdgeDir, count: u32) -> Self {
        Self { to, dir, count }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(->{},{},{})", self.to, self.dir, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn mirror() {
        assert_eq!(EdgeDir::FF.mirror(), EdgeDir::RR);
        assert_eq!(EdgeDir::RR.mirror(), EdgeDir::FF);
        assert_eq!(EdgeDir::FR.mirror(), EdgeDir::FR);
        assert_eq!(EdgeDir::RF.mirror(), EdgeDir::RF);
        for dir in [EdgeDir::FF, EdgeDir::FR, EdgeDir::RF, EdgeDir::RR] {
            assert_eq!(dir.mirror().mirror(), dir);
        }
        assert_eq!(format!("{}", EdgeDir::RF), "RF");
    }
}
