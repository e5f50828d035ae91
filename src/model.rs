//! A reference model for differential testing against [`BTreeSet`].
//!
//! Shared by the crate's property tests and the fuzz targets.

use std::{
    collections::BTreeSet,
    ops::Bound::{Excluded, Unbounded},
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{Balance, Tree};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks an existing key by position, so removals and lookups hit the tree often.
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Search(ItemValue),
    Remove(ItemValue),
    Successor(ItemValue),
    Predecessor(ItemValue),
    Minimum,
    Maximum,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Search(item) => FinalOp::Search(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::Successor(item) => FinalOp::Successor(get_value(sorted, item)),
            Op::Predecessor(item) => FinalOp::Predecessor(get_value(sorted, item)),
            Op::Minimum => FinalOp::Minimum,
            Op::Maximum => FinalOp::Maximum,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Search(u32),
    Remove(u32),
    Successor(u32),
    Predecessor(u32),
    Minimum,
    Maximum,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Search),
        value_strategy().prop_map(Op::Remove),
        value_strategy().prop_map(Op::Successor),
        value_strategy().prop_map(Op::Predecessor),
        Just(Op::Minimum),
        Just(Op::Maximum),
    ]
}

/// Runs `ops` against an AVL tree and a `BTreeSet`, panicking on the first divergence or
/// invariant violation.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    run_equivalence::<crate::Avl>(ops);
}

/// Like [`run_btree_equivalence`], for any balancing strategy.
pub fn run_equivalence<B: Balance>(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut tree: Tree<u32, B> = Tree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_tree = tree.insert(value);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(value) => {
                let from_btree = btree.get(&value);
                let from_tree = tree.search(&value).and_then(|node| tree.key(node));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value).then_some(value);
                let from_tree = tree.remove(&value);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
                assert!(tree.search(&value).is_none(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Successor(value) => {
                let from_btree = btree.contains(&value).then(|| {
                    btree
                        .range((Excluded(value), Unbounded))
                        .next()
                        .copied()
                        .unwrap_or(value)
                });
                let from_tree = tree.successor(&value).and_then(|node| tree.key(node).copied());

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Predecessor(value) => {
                let from_btree = btree.contains(&value).then(|| {
                    btree
                        .range(..value)
                        .next_back()
                        .copied()
                        .unwrap_or(value)
                });
                let from_tree = tree
                    .predecessor(&value)
                    .and_then(|node| tree.key(node).copied());

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Minimum => {
                let from_btree = btree.first();
                let from_tree = tree.minimum().and_then(|node| tree.key(node));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Maximum => {
                let from_btree = btree.last();
                let from_tree = tree.maximum().and_then(|node| tree.key(node));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        tree.assert_invariants();
        assert_eq!(btree.len(), tree.len());
        assert!(btree.iter().eq(tree.iter()));
    }
}
