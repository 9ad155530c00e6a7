//! A reference model for randomized testing: operation sequences replayed against both an
//! [`AvlTree`] and a [`BTreeSet`], asserting identical results after every step.
extern crate std;

use std::{
    collections::{BTreeMap, BTreeSet},
    prelude::v1::*,
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Error, Node};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
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
    Retrieve(ItemValue),
    Contains(ItemValue),
    Depth(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
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
            Op::Retrieve(item) => FinalOp::Retrieve(get_value(sorted, item)),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::Depth(item) => FinalOp::Depth(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Retrieve(u32),
    Contains(u32),
    Depth(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Retrieve),
        value_strategy().prop_map(Op::Contains),
        value_strategy().prop_map(Op::Depth),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// Returns the greatest height an AVL tree with `len` nodes can have.
///
/// The sparsest AVL tree of height `h` has `N(h) = N(h - 1) + N(h - 2) + 1` nodes.
pub fn max_height(len: usize) -> isize {
    let (mut sparse, mut sparser) = (1_usize, 0_usize);
    let mut height = 0;

    while sparse <= len {
        (sparse, sparser) = (sparse + sparser + 1, sparse);
        height += 1;
    }

    height - 1
}

/// Returns the depth of every node of `tree`, found by visiting the whole tree.
pub fn node_depths(tree: &AvlTree<u32>) -> BTreeMap<u32, isize> {
    fn walk(opt_node: Option<&Node<u32>>, depth: isize, depths: &mut BTreeMap<u32, isize>) {
        if let Some(node) = opt_node {
            depths.insert(node.data, depth);
            walk(node.left(), depth + 1, depths);
            walk(node.right(), depth + 1, depths);
        }
    }

    let mut depths = BTreeMap::new();
    walk(tree.root.as_deref(), 0, &mut depths);
    depths
}

/// Returns the value [`AvlTree::depth`] should report for `key`, given the depths of all nodes.
///
/// An absent key would be inserted as a child of its in-order predecessor or successor, whichever
/// is deeper.
pub fn expected_depth(depths: &BTreeMap<u32, isize>, key: u32) -> isize {
    if let Some(&depth) = depths.get(&key) {
        return depth;
    }

    let pred = depths.range(..key).next_back().map(|(_, &d)| d);
    let succ = depths.range(key..).next().map(|(_, &d)| d);
    let slot = pred.max(succ).map_or(0, |d| d + 1);

    -1 - slot
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();

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

    let mut final_ops = Vec::with_capacity(ops.len());
    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);
        final_ops.push(final_op);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let height = avl.height();
                let from_btree = if btree.insert(value) {
                    None
                } else {
                    Some(value)
                };
                let from_avl = avl.insert(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");

                if from_avl.is_some() {
                    assert_eq!(height, avl.height(), "FinalOp #{op_id}: {final_op:?}");
                }
            }

            FinalOp::Retrieve(value) => {
                let from_btree = btree.get(&value).ok_or(Error::KeyNotFound);
                let from_avl = avl.retrieve(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Contains(value) => {
                let from_btree = btree.contains(&value);
                let from_avl = avl.contains(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Depth(value) => {
                let depth = avl.depth(&value);

                assert_eq!(depth >= 0, btree.contains(&value), "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(
                    depth,
                    expected_depth(&node_depths(&avl), value),
                    "FinalOp #{op_id}: {final_op:?}"
                );
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value).then_some(value);
                let from_avl = avl.remove(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first();
                let from_avl = avl.first();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last();
                let from_avl = avl.last();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(avl.height() <= max_height(avl.len()));
        assert!(btree.iter().eq(avl.iter()));
    }
}
