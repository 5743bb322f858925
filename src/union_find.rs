//! Disjoint-set forest used to track connected stone groups.
//!
//! Union-by-size with path compression. Every cell starts as its own
//! singleton group; the game only ever unions cells holding stones, so the
//! group of a stone is exactly its connected group on the board.

/// Union-find over `len` elements.
///
/// For a root `r`, `size[r]` is the number of elements in its group. The
/// slot of a non-root is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionFind {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            size: vec![1; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `i`'s group, compressing the path on the way.
    pub fn find(&mut self, i: usize) -> usize {
        let root = self.root(i);
        let mut cur = i;
        while cur != root {
            let next = self.parent[cur] as usize;
            self.parent[cur] = root as u32;
            cur = next;
        }
        root
    }

    /// Representative of `i`'s group without modifying the forest.
    pub fn root(&self, i: usize) -> usize {
        let mut cur = i;
        while self.parent[cur] as usize != cur {
            cur = self.parent[cur] as usize;
        }
        cur
    }

    /// Merge the groups of `i` and `j`, returning the new representative.
    ///
    /// The smaller group is attached under the root of the larger one.
    pub fn union(&mut self, i: usize, j: usize) -> usize {
        let mut a = self.find(i);
        let mut b = self.find(j);
        if a == b {
            return a;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a as u32;
        self.size[a] += self.size[b];
        self.size[b] = 0;
        a
    }

    /// Size of the group containing `i`.
    #[inline]
    pub fn group_size(&mut self, i: usize) -> u32 {
        let r = self.find(i);
        self.size[r]
    }

    /// Size of `i`'s group if `i` is its root, otherwise 0.
    ///
    /// Summing this over all elements visits each group exactly once.
    #[inline]
    pub fn size_if_root(&self, i: usize) -> u32 {
        if self.parent[i] as usize == i { self.size[i] } else { 0 }
    }

    /// Overwrite `other` with this forest without reallocating.
    ///
    /// # Panics
    /// If the two forests differ in length.
    pub fn copy_into(&self, other: &mut UnionFind) {
        assert_eq!(self.len(), other.len(), "union-find length mismatch");
        other.parent.copy_from_slice(&self.parent);
        other.size.copy_from_slice(&self.size);
    }
}
