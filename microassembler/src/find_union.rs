//! Disjoint sets over node indices, used to label connected components.
#[derive(Debug, Clone, Default)]
pub struct FindUnion {
    /// If parents[i] = j, the j-th element represents the set containing i.
    parents: Vec<usize>,
    /// Size of the set. Valid only at representatives.
    sizes: Vec<usize>,
}

impl FindUnion {
    pub fn new(size: usize) -> Self {
        Self {
            parents: (0..size).collect(),
            sizes: vec![1; size],
        }
    }
    pub fn len(&self) -> usize {
        self.parents.len()
    }
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
    /// The representative of `index`, or None if out of range.
    pub fn find(&mut self, index: usize) -> Option<usize> {
        if self.len() <= index {
            return None;
        }
        let mut root = index;
        while root != self.parents[root] {
            root = self.parents[root];
        }
        let mut index = index;
        while index != root {
            let next = self.parents[index];
            self.parents[index] = root;
            index = next;
        }
        Some(root)
    }
    /// Merge the sets of `x` and `y`. None if either is out of range.
    pub fn unite(&mut self, x: usize, y: usize) -> Option<()> {
        let (x, y) = (self.find(x)?, self.find(y)?);
        if x == y {
            return Some(());
        }
        let (large, small) = match self.sizes[x] < self.sizes[y] {
            true => (y, x),
            false => (x, y),
        };
        self.parents[small] = large;
        self.sizes[large] += self.sizes[small];
        Some(())
    }
    pub fn same(&mut self, x: usize, y: usize) -> Option<bool> {
        Some(self.find(x)? == self.find(y)?)
    }
    pub fn size(&mut self, x: usize) -> Option<usize> {
        let root = self.find(x)?;
        Some(self.sizes[root])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn out_of_range() {
        let mut fu = FindUnion::new(10);
        assert!(FindUnion::new(0).is_empty());
        assert_eq!(fu.unite(1, 3), Some(()));
        assert_eq!(fu.unite(10, 3), None);
        assert_eq!(fu.same(213, 2), None);
        assert_eq!(fu.size(100), None);
    }
    #[test]
    fn unite_and_find() {
        let mut fu = FindUnion::new(10);
        fu.unite(0, 1);
        fu.unite(4, 2);
        assert_eq!(fu.same(0, 2), Some(false));
        fu.unite(1, 4);
        assert_eq!(fu.same(0, 2), Some(true));
        assert_eq!(fu.size(2), Some(4));
        assert_eq!(fu.size(3), Some(1));
    }
    #[test]
    fn chain() {
        let mut fu = FindUnion::new(10);
        for i in 0..9 {
            fu.unite(i, i + 1);
        }
        let root = fu.find(0);
        assert!((0..10).all(|i| fu.find(i) == root));
        assert_eq!(fu.size(5), Some(10));
    }
}
