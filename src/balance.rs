//! Balancing strategies plugged into [`Tree`].
//!
//! A strategy is told where the structure changed and repairs heights (and, for AVL, balance) on
//! the way from that point up to the root.

use core::cmp::Ordering;

use crate::{
    node::{Link, NodeRef},
    Tree,
};

mod sealed {
    pub trait Sealed {}
}

/// A rebalancing policy for [`Tree`].
///
/// This trait is sealed; the crate provides [`Avl`] and [`Unbalanced`].
pub trait Balance: sealed::Sealed + Sized {
    /// Whether trees using this strategy keep every balance factor within `-1..=1`.
    const HEIGHT_BALANCED: bool;

    /// Called after `inserted` was linked into the tree as a new leaf.
    #[doc(hidden)]
    fn rebalance_after_insert<K: Ord>(tree: &mut Tree<K, Self>, inserted: NodeRef);

    /// Called after a node was unlinked. `start` is the lowest node whose subtree changed.
    #[doc(hidden)]
    fn rebalance_after_remove<K: Ord>(tree: &mut Tree<K, Self>, start: Option<NodeRef>);
}

/// AVL balancing: after every mutation, each node's subtree heights differ by at most one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Avl;

/// No balancing. Heights are still maintained so diagnostics stay accurate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Unbalanced;

impl sealed::Sealed for Avl {}
impl sealed::Sealed for Unbalanced {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Case {
    LeftLeft,
    LeftRight,
    RightRight,
    RightLeft,
}

impl Balance for Avl {
    const HEIGHT_BALANCED: bool = true;

    fn rebalance_after_insert<K: Ord>(tree: &mut Tree<K, Self>, inserted: NodeRef) {
        let mut opt_cur = tree.nodes[inserted].parent();

        while let Some(cur) = opt_cur {
            tree.update_height(cur);

            let top = match insertion_case(tree, cur, inserted) {
                Some(case) => rotate_case(tree, cur, case),
                None => cur,
            };

            opt_cur = tree.nodes[top].parent();
        }
    }

    fn rebalance_after_remove<K: Ord>(tree: &mut Tree<K, Self>, start: Link) {
        let mut opt_cur = start;

        // Deletion can unbalance every ancestor, so the walk always runs to the root.
        while let Some(cur) = opt_cur {
            tree.update_height(cur);

            let top = match removal_case(tree, cur) {
                Some(case) => rotate_case(tree, cur, case),
                None => cur,
            };

            opt_cur = tree.nodes[top].parent();
        }
    }
}

impl Balance for Unbalanced {
    const HEIGHT_BALANCED: bool = false;

    fn rebalance_after_insert<K: Ord>(tree: &mut Tree<K, Self>, inserted: NodeRef) {
        let parent = tree.nodes[inserted].parent();
        refresh_heights(tree, parent);
    }

    fn rebalance_after_remove<K: Ord>(tree: &mut Tree<K, Self>, start: Link) {
        refresh_heights(tree, start);
    }
}

fn refresh_heights<K, B>(tree: &mut Tree<K, B>, start: Link) {
    let mut opt_cur = start;

    while let Some(cur) = opt_cur {
        tree.update_height(cur);
        opt_cur = tree.nodes[cur].parent();
    }
}

// Picks the rotation case at `node` by where the inserted key sits relative to the heavy child.
fn insertion_case<K: Ord, B>(tree: &Tree<K, B>, node: NodeRef, inserted: NodeRef) -> Option<Case> {
    let balance = tree.balance_of(node);
    let key = tree.nodes[inserted].key();

    if balance > 1 {
        let left = tree.nodes[node]
            .left()
            .expect("left-heavy node must have a left child");

        match key.cmp(tree.nodes[left].key()) {
            Ordering::Less => Some(Case::LeftLeft),
            Ordering::Greater => Some(Case::LeftRight),
            Ordering::Equal => unreachable!("a freshly inserted leaf cannot unbalance its parent"),
        }
    } else if balance < -1 {
        let right = tree.nodes[node]
            .right()
            .expect("right-heavy node must have a right child");

        match key.cmp(tree.nodes[right].key()) {
            Ordering::Greater => Some(Case::RightRight),
            Ordering::Less => Some(Case::RightLeft),
            Ordering::Equal => unreachable!("a freshly inserted leaf cannot unbalance its parent"),
        }
    } else {
        None
    }
}

// Picks the rotation case at `node` from the heavy child's own balance factor.
//
// A heavy child that is itself balanced takes the single rotation: a double rotation would need
// an inner grandchild, and the single one already restores balance.
fn removal_case<K, B>(tree: &Tree<K, B>, node: NodeRef) -> Option<Case> {
    let balance = tree.balance_of(node);

    if balance > 1 {
        let left = tree.nodes[node]
            .left()
            .expect("left-heavy node must have a left child");

        if tree.balance_of(left) >= 0 {
            Some(Case::LeftLeft)
        } else {
            Some(Case::LeftRight)
        }
    } else if balance < -1 {
        let right = tree.nodes[node]
            .right()
            .expect("right-heavy node must have a right child");

        if tree.balance_of(right) <= 0 {
            Some(Case::RightRight)
        } else {
            Some(Case::RightLeft)
        }
    } else {
        None
    }
}

// Applies `case` at `node` and returns the root of the rotated subtree.
fn rotate_case<K, B>(tree: &mut Tree<K, B>, node: NodeRef, case: Case) -> NodeRef {
    match case {
        Case::LeftLeft => tree.rotate_right(node),
        Case::RightRight => tree.rotate_left(node),
        Case::LeftRight => {
            let left = tree.nodes[node]
                .left()
                .expect("left-heavy node must have a left child");
            tree.rotate_left(left);
            tree.rotate_right(node)
        }
        Case::RightLeft => {
            let right = tree.nodes[node]
                .right()
                .expect("right-heavy node must have a right child");
            tree.rotate_right(right);
            tree.rotate_left(node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvlTree;

    fn case_at(keys: &[u32], key: u32) -> Option<Case> {
        // Build the pre-rotation shape with the unbalanced strategy, then ask AVL what it would do.
        let tree: crate::BinarySearchTree<u32> = keys.iter().copied().collect();
        let node = tree.search_raw(&keys[0]).unwrap();
        let inserted = tree.search_raw(&key).unwrap();
        insertion_case(&tree, node, inserted)
    }

    #[test]
    fn insertion_cases() {
        assert_eq!(case_at(&[30, 20, 10], 10), Some(Case::LeftLeft));
        assert_eq!(case_at(&[10, 20, 30], 30), Some(Case::RightRight));
        assert_eq!(case_at(&[30, 10, 20], 20), Some(Case::LeftRight));
        assert_eq!(case_at(&[10, 30, 20], 20), Some(Case::RightLeft));
        assert_eq!(case_at(&[20, 10, 30], 30), None);
    }

    #[test]
    fn removal_prefers_single_rotation_for_balanced_child() {
        // 40 ends up with a left child 20 that has both 10 and 30 below it.
        let tree: crate::BinarySearchTree<u32> = [40, 20, 10, 30].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(removal_case(&tree, root), Some(Case::LeftLeft));

        let tree: crate::BinarySearchTree<u32> = [10, 30, 20, 40].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(removal_case(&tree, root), Some(Case::RightRight));

        let tree: crate::BinarySearchTree<u32> = [40, 20, 30].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(removal_case(&tree, root), Some(Case::LeftRight));

        let tree: crate::BinarySearchTree<u32> = [20, 40, 30].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(removal_case(&tree, root), Some(Case::RightLeft));
    }

    #[test]
    fn insert_walk_reaches_root() {
        let mut tree = AvlTree::new();
        for key in 0..64u32 {
            tree.insert(key);
            tree.assert_invariants();
        }

        // A perfectly sequential load must still produce a logarithmic height.
        assert_eq!(tree.height(tree.root()), 7);
    }

    #[test]
    fn remove_walk_reaches_root() {
        // A minimal AVL tree of height 5 (Fibonacci shape). Removing from the short side forces
        // rotations at more than one level.
        let mut tree: AvlTree<u32> = [
            8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1,
        ]
        .into_iter()
        .collect();
        tree.assert_invariants();
        assert_eq!(tree.height(tree.root()), 5);

        tree.remove(&12);
        tree.assert_invariants();
        assert_eq!(tree.height(tree.root()), 4);
        assert_eq!(tree.key(tree.root().unwrap()), Some(&5));
    }

    #[test]
    fn unbalanced_refreshes_heights() {
        let mut tree: crate::BinarySearchTree<u32> = (0..10).collect();
        tree.assert_invariants();
        assert_eq!(tree.height(tree.root()), 10);

        tree.remove(&9);
        tree.assert_invariants();
        assert_eq!(tree.height(tree.root()), 9);
    }
}
