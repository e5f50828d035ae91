use core::iter::FusedIterator;

use crate::{
    node::{Dir, Link},
    Tree,
};

/// An in-order iterator over the keys of a [`Tree`].
///
/// Created by [`Tree::iter`]. Steps between nodes by following parent links, so no auxiliary
/// stack is kept.
pub struct Iter<'tree, K, B> {
    tree: &'tree Tree<K, B>,

    front: Link,
    back: Link,

    len: usize,
}

impl<'tree, K, B> Iter<'tree, K, B> {
    pub(crate) fn new(tree: &'tree Tree<K, B>) -> Self {
        Iter {
            tree,

            front: tree.minimum(),
            back: tree.maximum(),
            len: tree.len(),
        }
    }
}

impl<'tree, K, B> Iterator for Iter<'tree, K, B> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        // `front` and `back` meet in the middle; the remaining count decides when to stop.
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.front = self.tree.neighbor(cur, Dir::Right);
        self.len -= 1;

        Some(self.tree.nodes[cur].key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, K, B> DoubleEndedIterator for Iter<'tree, K, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.back = self.tree.neighbor(cur, Dir::Left);
        self.len -= 1;

        Some(self.tree.nodes[cur].key())
    }
}

impl<K, B> ExactSizeIterator for Iter<'_, K, B> {}

impl<K, B> FusedIterator for Iter<'_, K, B> {}

impl<K, B> Clone for Iter<'_, K, B> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}
