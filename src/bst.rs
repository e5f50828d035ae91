//! Structural primitives shared by every balancing strategy.
//!
//! Nothing in here looks at balance factors. Rotations refresh the cached heights of the two
//! nodes they move; every other primitive leaves height maintenance to the caller.

use core::{borrow::Borrow, cmp::Ordering};

use crate::{
    node::{Dir, Link, Node, NodeRef},
    Tree,
};

/// Outcome of a structural insert.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// A new node was allocated for the key.
    Vacant(NodeRef),
    /// The key was already present; nothing changed.
    Occupied(NodeRef),
}

impl<K, B> Tree<K, B> {
    pub(crate) fn search_raw<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            match key.cmp(self.nodes[cur].key().borrow()) {
                Ordering::Less => opt_cur = self.nodes[cur].left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = self.nodes[cur].right(),
            }
        }
    }

    /// Places `key` at the empty position reached by a search, linking it to its parent.
    ///
    /// No heights are updated.
    pub(crate) fn insert_structural(&mut self, key: K) -> Placement
    where
        K: Ord,
    {
        let Some(mut cur) = self.root else {
            let node = self.nodes.alloc(Node::new(key, None));
            self.root = Some(node);
            return Placement::Vacant(node);
        };

        loop {
            let dir = match key.cmp(self.nodes[cur].key()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Placement::Occupied(cur),
                Ordering::Greater => Dir::Right,
            };

            match self.nodes[cur].child(dir) {
                Some(child) => cur = child,
                None => {
                    let node = self.nodes.alloc(Node::new(key, Some(cur)));
                    self.nodes[cur].set_child(dir, Some(node));
                    return Placement::Vacant(node);
                }
            }
        }
    }

    #[inline]
    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        if let Some(node) = opt_node {
            self.nodes[node].set_parent(parent);
        }
    }

    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeRef, new_child: Link) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child(&mut self, parent: NodeRef, old_child: NodeRef, new_child: Link) {
        let dir = self.which_child(parent, old_child);

        debug_assert_eq!(
            self.nodes[parent].child(dir),
            Some(old_child),
            "`old_child` must be a child of `parent`"
        );
        debug_assert!(
            new_child.is_none() || self.nodes[parent].child(!dir) != new_child,
            "`new_child` must not be a child of `parent`"
        );

        self.nodes[parent].set_child(dir, new_child);
    }

    #[inline]
    pub(crate) fn which_child(&self, parent: NodeRef, child: NodeRef) -> Dir {
        if self.nodes[parent].left() == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    /// Puts the subtree rooted at `v` in the place of the subtree rooted at `u`.
    ///
    /// The children of `u` and `v` are left alone.
    pub(crate) fn transplant(&mut self, u: NodeRef, v: Link) {
        let parent = self.nodes[u].parent();
        self.replace_child_or_set_root(parent, u, v);
        self.maybe_set_parent(v, parent);
    }

    /// Unlinks `node` from the tree and frees it.
    ///
    /// Returns the removed node and the lowest node whose subtree changed shape, which is where a
    /// rebalancing walk has to start. The start is `None` only when the tree became empty.
    pub(crate) fn delete_structural(&mut self, node: NodeRef) -> (Node<K>, Link) {
        let parent = self.nodes[node].parent();
        let left = self.nodes[node].left();
        let right = self.nodes[node].right();

        let start = match (left, right) {
            (None, _) => {
                self.transplant(node, right);
                right.or(parent)
            }

            (Some(left), None) => {
                self.transplant(node, Some(left));
                Some(left)
            }

            (Some(left), Some(right)) => {
                let successor = self.extreme(right, Dir::Left);

                let start = if self.nodes[successor].parent() != Some(node) {
                    let successor_parent = self.nodes[successor].parent();
                    let successor_right = self.nodes[successor].right();

                    // Elevate the successor's right child to replace it.
                    self.transplant(successor, successor_right);
                    self.nodes[successor].set_right(Some(right));
                    self.nodes[right].set_parent(Some(successor));

                    successor_parent
                } else {
                    Some(successor)
                };

                self.transplant(node, Some(successor));
                self.nodes[successor].set_left(Some(left));
                self.nodes[left].set_parent(Some(successor));

                start
            }
        };

        let removed = self
            .nodes
            .free(node)
            .expect("node being deleted must be live");

        (removed, start)
    }

    /// Returns the node furthest in direction `dir` within the subtree rooted at `root`.
    #[inline]
    pub(crate) fn extreme(&self, root: NodeRef, dir: Dir) -> NodeRef {
        let mut cur = root;

        while let Some(child) = self.nodes[cur].child(dir) {
            cur = child;
        }

        cur
    }

    /// Returns the in-order neighbour of `node` in direction `dir`, if any.
    ///
    /// `Dir::Right` gives the successor and `Dir::Left` the predecessor.
    pub(crate) fn neighbor(&self, node: NodeRef, dir: Dir) -> Link {
        if let Some(child) = self.nodes[node].child(dir) {
            return Some(self.extreme(child, !dir));
        }

        let mut cur = node;
        let mut opt_parent = self.nodes[node].parent();

        while let Some(parent) = opt_parent {
            if self.nodes[parent].child(dir) != Some(cur) {
                return Some(parent);
            }

            cur = parent;
            opt_parent = self.nodes[parent].parent();
        }

        None
    }

    #[inline]
    pub(crate) fn height_of(&self, node: Link) -> usize {
        node.map_or(0, |n| self.nodes[n].height())
    }

    #[inline]
    pub(crate) fn balance_of(&self, node: NodeRef) -> isize {
        let left = self.height_of(self.nodes[node].left()) as isize;
        let right = self.height_of(self.nodes[node].right()) as isize;
        left - right
    }

    #[inline]
    pub(crate) fn update_height(&mut self, node: NodeRef) {
        let left = self.height_of(self.nodes[node].left());
        let right = self.height_of(self.nodes[node].right());
        self.nodes[node].set_height(left.max(right) + 1);
    }

    // Rotates the subtree rooted at `down` so that `down` moves in direction `dir` and its
    // `!dir` child takes its place. Returns the new subtree root.
    fn rotate(&mut self, down: NodeRef, dir: Dir) -> NodeRef {
        let up = self.nodes[down]
            .child(!dir)
            .expect("rotation requires a child opposite the rotation direction");

        // `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let across = self.nodes[up].child(dir);
        self.nodes[down].set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));

        self.nodes[up].set_child(dir, Some(down));
        let parent = self.nodes[down].set_parent(Some(up));
        self.nodes[up].set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.update_height(down);
        self.update_height(up);

        up
    }

    /// Single left rotation: `z`'s right child becomes the subtree root.
    pub(crate) fn rotate_left(&mut self, z: NodeRef) -> NodeRef {
        self.rotate(z, Dir::Left)
    }

    /// Single right rotation: `z`'s left child becomes the subtree root.
    pub(crate) fn rotate_right(&mut self, z: NodeRef) -> NodeRef {
        self.rotate(z, Dir::Right)
    }
}
