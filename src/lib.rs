//! An AVL tree whose nodes live in a handle-addressed store.
//!
//! The tree is built in two layers. The structural layer supplies the primitives every binary
//! search tree needs (search, transplant, in-order neighbours, single rotations) and knows nothing
//! about balance. A [`Balance`] strategy wraps insertion and deletion and repairs the tree on the
//! way back up: [`Avl`] applies the four classic rotation cases, [`Unbalanced`] only keeps cached
//! heights current.
//!
//! Nodes reference each other through [`NodeRef`] handles rather than pointers. Child links own
//! their subtree in the logical sense; parent links are back-references used by upward walks.
//!
//! ```
//! use avl_arena::AvlTree;
//!
//! let mut tree: AvlTree<u32> = [10, 20, 30].into_iter().collect();
//!
//! // Inserting in ascending order triggered a left rotation.
//! let root = tree.root().unwrap();
//! assert_eq!(tree.key(root), Some(&20));
//! assert_eq!(tree.height(Some(root)), 2);
//!
//! assert!(tree.search(&30).is_some());
//! assert_eq!(tree.remove(&30), Some(30));
//! assert!(tree.search(&30).is_none());
//! ```

// Invariants maintained after every public operation:
// 1. Order: keys in a node's left subtree are smaller and keys in its right subtree are larger.
// 2. Balance (AVL only): `height(left) - height(right)` is -1, 0 or 1 at every node.
// 3. Height: every cached height equals `1 + max(height(left), height(right))`, where an absent
//    subtree has height 0.
// 4. Parent links: a non-root node is its parent's left or right child; the root has no parent.

use core::{borrow::Borrow, fmt, marker::PhantomData};

use thiserror::Error;

mod balance;
mod bst;
mod iter;
mod node;
mod render;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use balance::{Avl, Balance, Unbalanced};
pub use iter::Iter;
pub use node::{Node, NodeRef};

use bst::Placement;
use node::{Dir, Link, NodeStore};

/// An ordered set of keys stored in a binary search tree, balanced by the strategy `B`.
pub struct Tree<K, B = Avl> {
    nodes: NodeStore<K>,
    root: Link,
    _balance: PhantomData<B>,
}

/// A self-balancing AVL tree.
pub type AvlTree<K> = Tree<K, Avl>;

/// A binary search tree that performs no rebalancing.
pub type BinarySearchTree<K> = Tree<K, Unbalanced>;

/// A violated tree invariant, reported by [`Tree::check_invariants`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("root {root} has a parent link")]
    RootHasParent { root: String },

    #[error("a child link of {parent} points at a freed node")]
    DanglingLink { parent: String },

    #[error("child {child} does not link back to its parent {parent}")]
    ParentMismatch { parent: String, child: String },

    #[error("node {key} caches height {cached}, expected {expected}")]
    HeightMismatch {
        key: String,
        cached: usize,
        expected: usize,
    },

    #[error("node {key} has balance factor {balance}")]
    Unbalanced { key: String, balance: isize },

    #[error("key {next} follows {prev} in order")]
    OutOfOrder { prev: String, next: String },

    #[error("{reachable} nodes are reachable from the root but the tree holds {stored}")]
    LenMismatch { reachable: usize, stored: usize },
}

impl<K, B> Tree<K, B> {
    /// Returns a new empty tree.
    pub const fn new() -> Tree<K, B> {
        Tree {
            nodes: NodeStore::new(),
            root: None,
            _balance: PhantomData,
        }
    }

    /// Returns `true` if the tree contains no keys.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    /// Returns the node behind `node`, or `None` if the handle is stale.
    pub fn node(&self, node: NodeRef) -> Option<&Node<K>> {
        self.nodes.get(node)
    }

    /// Returns the key stored at `node`, or `None` if the handle is stale.
    pub fn key(&self, node: NodeRef) -> Option<&K> {
        self.node(node).map(Node::key)
    }

    /// Returns the node holding `key`.
    ///
    /// This operation completes in _O(log(n))_ time for an AVL tree.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.search_raw(key)
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.search_raw(key).is_some()
    }

    /// Returns the node with the smallest key.
    pub fn minimum(&self) -> Option<NodeRef> {
        self.root.map(|root| self.extreme(root, Dir::Left))
    }

    /// Returns the node with the largest key.
    pub fn maximum(&self) -> Option<NodeRef> {
        self.root.map(|root| self.extreme(root, Dir::Right))
    }

    /// Returns the smallest key in the tree.
    pub fn first(&self) -> Option<&K> {
        self.minimum().map(|node| self.nodes[node].key())
    }

    /// Returns the largest key in the tree.
    pub fn last(&self) -> Option<&K> {
        self.maximum().map(|node| self.nodes[node].key())
    }

    /// Returns the node holding the smallest key greater than `key`.
    ///
    /// The successor of the largest key is that key's own node. Returns `None` only if `key` is
    /// not in the tree.
    pub fn successor<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let node = self.search_raw(key)?;
        Some(self.neighbor(node, Dir::Right).unwrap_or(node))
    }

    /// Returns the node holding the largest key smaller than `key`.
    ///
    /// The predecessor of the smallest key is that key's own node. Returns `None` only if `key`
    /// is not in the tree.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let node = self.search_raw(key)?;
        Some(self.neighbor(node, Dir::Left).unwrap_or(node))
    }

    /// Returns the height of the subtree rooted at `node`; 0 for an absent subtree or a stale
    /// handle.
    pub fn height(&self, node: Option<NodeRef>) -> usize {
        node.and_then(|n| self.nodes.get(n)).map_or(0, Node::height)
    }

    /// Returns `height(left) - height(right)` for `node`; 0 for an absent subtree or a stale
    /// handle.
    pub fn balance_factor(&self, node: Option<NodeRef>) -> isize {
        match node.filter(|&n| self.nodes.get(n).is_some()) {
            Some(n) => self.balance_of(n),
            None => 0,
        }
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K, B> {
        Iter::new(self)
    }

    /// Removes every key. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }
}

impl<K: Ord, B: Balance> Tree<K, B> {
    /// Inserts `key` into the tree. Returns `false` and leaves the tree untouched if the key is
    /// already present.
    ///
    /// This operation completes in _O(log(n))_ time for an AVL tree.
    pub fn insert(&mut self, key: K) -> bool {
        match self.insert_structural(key) {
            Placement::Vacant(node) => {
                B::rebalance_after_insert(self, node);
                true
            }
            Placement::Occupied(_) => false,
        }
    }

    /// Removes `key` from the tree and returns it. Removing an absent key does nothing.
    ///
    /// This operation completes in _O(log(n))_ time for an AVL tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.search_raw(key)?;
        let (removed, start) = self.delete_structural(node);
        B::rebalance_after_remove(self, start);

        Some(removed.into_key())
    }
}

impl<K: fmt::Debug, B: Balance> Tree<K, B> {
    #[doc(hidden)]
    pub fn assert_invariants(&self)
    where
        K: Ord,
    {
        if let Err(err) = self.check_invariants() {
            panic!("tree invariant violated: {err}");
        }
    }

    /// Walks the whole tree and reports the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            return match self.len() {
                0 => Ok(()),
                stored => Err(InvariantError::LenMismatch {
                    reachable: 0,
                    stored,
                }),
            };
        };

        let root_node = self.nodes.get(root).ok_or(InvariantError::DanglingLink {
            parent: "<tree>".into(),
        })?;
        if root_node.parent().is_some() {
            return Err(InvariantError::RootHasParent {
                root: format!("{:?}", root_node.key()),
            });
        }

        let mut reachable = 0;
        let mut stack = vec![root];

        while let Some(cur) = stack.pop() {
            reachable += 1;
            if reachable > self.len() {
                // More nodes than stored means a node is linked twice.
                return Err(InvariantError::LenMismatch {
                    reachable,
                    stored: self.len(),
                });
            }

            let node = &self.nodes[cur];
            let key = || format!("{:?}", node.key());

            for child in [node.left(), node.right()].into_iter().flatten() {
                let child_node = self
                    .nodes
                    .get(child)
                    .ok_or_else(|| InvariantError::DanglingLink { parent: key() })?;

                if child_node.parent() != Some(cur) {
                    return Err(InvariantError::ParentMismatch {
                        parent: key(),
                        child: format!("{:?}", child_node.key()),
                    });
                }

                stack.push(child);
            }

            let expected = self.height_of(node.left()).max(self.height_of(node.right())) + 1;
            if node.height() != expected {
                return Err(InvariantError::HeightMismatch {
                    key: key(),
                    cached: node.height(),
                    expected,
                });
            }

            let balance = self.balance_of(cur);
            if B::HEIGHT_BALANCED && !(-1..=1).contains(&balance) {
                return Err(InvariantError::Unbalanced {
                    key: key(),
                    balance,
                });
            }
        }

        if reachable != self.len() {
            return Err(InvariantError::LenMismatch {
                reachable,
                stored: self.len(),
            });
        }

        // Links are consistent at this point, so the in-order walk is safe.
        let mut keys = self.iter();
        if let Some(mut prev) = keys.next() {
            for next in keys {
                if prev >= next {
                    return Err(InvariantError::OutOfOrder {
                        prev: format!("{prev:?}"),
                        next: format!("{next:?}"),
                    });
                }
                prev = next;
            }
        }

        Ok(())
    }
}

impl<K, B> Default for Tree<K, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, B> Clone for Tree<K, B> {
    fn clone(&self) -> Self {
        Tree {
            nodes: self.nodes.clone(),
            root: self.root,
            _balance: PhantomData,
        }
    }
}

impl<K: fmt::Debug, B> fmt::Debug for Tree<K, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, B> PartialEq for Tree<K, B> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, B> Eq for Tree<K, B> {}

impl<K: Ord, B: Balance> Extend<K> for Tree<K, B> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord, B: Balance> FromIterator<K> for Tree<K, B> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, B: Balance, const N: usize> From<[K; N]> for Tree<K, B> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'tree, K, B> IntoIterator for &'tree Tree<K, B> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
