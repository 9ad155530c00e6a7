//! An owning AVL tree.
#![cfg_attr(not(feature = "std"), no_std)]

// Conventions used in comments:
// - The height of a subtree `x` is denoted `h(x)`. An empty subtree has height -1, so a leaf has
//   height 0.
// - A node is `X`-high if its `X` subtree is one level taller than its other subtree, and even if
//   both subtrees have the same height.
// - The `heavy` side of a node is the side whose subtree is (or has just become) the taller one.
//
// The fundamental invariants of an AVL tree are:
// 1. For every node `n`, `|h(n.left) - h(n.right)| <= 1`.
// 2. Every node's balance tag equals the sign of `h(n.left) - h(n.right)`.
//
// Both insertion and removal change the height of at most one subtree by exactly one level, so a
// violation of (1) is always a difference of exactly two, and is repaired at the lowest violating
// node with a single or double rotation.
//
// After an insertion the repaired subtree always has the height it had before the insertion, so
// the "taller" signal stops there. After a removal the repaired subtree may or may not be shorter
// than before: a single rotation around an even sibling preserves the height, every other repair
// loses one level and the "shorter" signal keeps propagating.

extern crate alloc;

// `arbitrary`'s derive expands to paths under `::std`.
#[cfg(all(not(feature = "std"), any(test, feature = "model")))]
extern crate std;

use alloc::{boxed::Box, vec::Vec};
use core::{borrow::Borrow, cmp::Ordering, fmt, mem, ops::Not};

use log::{debug, trace};

mod balance;
mod debug;
mod error;
mod iter;
mod map;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use balance::Balance;
pub use error::{Error, Result};
pub use iter::{Iter, LevelIter};
pub use map::AvlMap;

/// A self-balancing binary search tree with AVL balancing.
///
/// Elements are ordered by their [`Ord`] implementation and double as their own search keys. Each
/// key is stored at most once; inserting an element equal to a stored one replaces it in place.
///
/// Insertion, removal and lookup complete in _O(log(n))_ time in the worst case.
pub struct AvlTree<E> {
    root: Link<E>,
    len: usize,
}

struct Node<E> {
    data: E,
    children: [Link<E>; 2],
    balance: Balance,
}

type Link<E> = Option<Box<Node<E>>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

// Outcome of inserting into a subtree.
struct Insertion<E> {
    root: Box<Node<E>>,
    taller: bool,
    replaced: Option<E>,
}

// Outcome of removing a key from a subtree. The key was found iff `removed` is `Some`.
struct Removal<E> {
    root: Link<E>,
    shorter: bool,
    removed: Option<E>,
}

// Outcome of unlinking the minimum or maximum node of a non-empty subtree.
struct Extraction<E> {
    root: Link<E>,
    shorter: bool,
    data: E,
}

impl<E> AvlTree<E> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<E> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree.
    ///
    /// The height of an empty tree is -1 and the height of a single-element tree is 0.
    pub fn height(&self) -> isize {
        height_of(self.root.as_deref())
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<&E> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<&E> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<&E> {
        let mut cur = self.root.as_deref()?;

        while let Some(next) = cur.child(dir) {
            cur = next;
        }

        Some(&cur.data)
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<E> {
        self.pop(Dir::Left)
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<E> {
        self.pop(Dir::Right)
    }

    fn pop(&mut self, dir: Dir) -> Option<E> {
        let root = self.root.take()?;
        let extracted = remove_extreme(root, dir);

        self.root = extracted.root;
        self.len -= 1;

        Some(extracted.data)
    }

    /// Returns an iterator over the elements of the tree in ascending order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter::new(self)
    }

    /// Returns an iterator over the elements of the tree in level order: the root first, then
    /// every element at depth 1 from left to right, and so on.
    pub fn level_iter(&self) -> LevelIter<'_, E> {
        LevelIter::new(self)
    }

    /// Calls `visit` on every element of the tree in ascending order.
    pub fn traverse<F>(&self, visit: F)
    where
        F: FnMut(&E),
    {
        self.iter().for_each(visit);
    }

    /// Calls `visit` on every element of the tree in level order.
    pub fn level_traverse<F>(&self, visit: F)
    where
        F: FnMut(&E),
    {
        self.level_iter().for_each(visit);
    }

    /// Clears the tree, removing all elements.
    ///
    /// Nodes are released in post-order, children before their parent.
    pub fn clear(&mut self) {
        let mut released = 0_usize;
        let mut pending: Vec<Box<Node<E>>> = self.root.take().into_iter().collect();

        // The stack only ever holds a single path down from the root.
        while let Some(mut node) = pending.pop() {
            let child = node
                .take_child(Dir::Left)
                .or_else(|| node.take_child(Dir::Right));

            match child {
                Some(child) => {
                    pending.push(node);
                    pending.push(child);
                }

                None => {
                    drop(node);
                    released += 1;
                }
            }
        }

        if released > 0 {
            debug!("released {released} nodes");
        }

        debug_assert_eq!(released, self.len);
        self.len = 0;
    }
}

impl<E: Ord> AvlTree<E> {
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let (count, _height) = self.assert_invariants_at(self.root.as_deref(), None, None);

        assert_eq!(count, self.len, "`len` does not match the number of nodes");
    }

    // Returns the number of nodes in the subtree and its height.
    #[allow(clippy::only_used_in_recursion)]
    fn assert_invariants_at(
        &self,
        node: Option<&Node<E>>,
        lower: Option<&E>,
        upper: Option<&E>,
    ) -> (usize, isize) {
        let Some(node) = node else {
            return (0, -1);
        };

        // Ensure the node lies strictly between its ancestors' keys.
        if let Some(lower) = lower {
            assert!(*lower < node.data, "right subtree contains a key that is not greater");
        }
        if let Some(upper) = upper {
            assert!(node.data < *upper, "left subtree contains a key that is not smaller");
        }

        let (left_len, left_height) =
            self.assert_invariants_at(node.left(), lower, Some(&node.data));
        let (right_len, right_height) =
            self.assert_invariants_at(node.right(), Some(&node.data), upper);

        // Ensure the heights differ by at most one and the tag agrees with them.
        let balance = Balance::from_height_diff(left_height - right_height)
            .expect("subtree heights differ by more than one");
        assert_eq!(node.balance, balance, "balance tag does not match subtree heights");

        (left_len + right_len + 1, 1 + left_height.max(right_height))
    }

    /// Returns a reference to the element matching `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|node| &node.data)
    }

    fn get_raw<Q>(&self, key: &Q) -> Option<&Node<E>>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root.as_deref();

        loop {
            let cur = opt_cur?;

            match key.cmp(cur.data.borrow()) {
                Ordering::Less => opt_cur = cur.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = cur.right(),
            }
        }
    }

    // Changing the returned element's ordering is a logic error, so this stays crate-private.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root.as_deref_mut();

        while let Some(cur) = opt_cur {
            let dir = match key.cmp(cur.data.borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Some(&mut cur.data),
                Ordering::Greater => Dir::Right,
            };

            opt_cur = cur.children[dir as usize].as_deref_mut();
        }

        None
    }

    /// Returns the element matching `key`, or [`Error::KeyNotFound`] if there is none.
    pub fn retrieve<Q>(&self, key: &Q) -> Result<&E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the tree contains an element matching `key`.
    #[doc(alias = "in_tree")]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns the depth of `key` in the tree.
    ///
    /// If `key` is present, this is the number of edges between the root and its node. Otherwise
    /// this is `-1 - d`, where `d` is the depth at which `key` would be inserted.
    pub fn depth<Q>(&self, key: &Q) -> isize
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root.as_deref();
        let mut depth = 0;

        while let Some(cur) = opt_cur {
            opt_cur = match key.cmp(cur.data.borrow()) {
                Ordering::Less => cur.left(),
                Ordering::Equal => return depth,
                Ordering::Greater => cur.right(),
            };

            depth += 1;
        }

        -1 - depth
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already contains an element equal to `item`, that element is replaced and
    /// returned. The shape of the tree is unchanged in that case.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: E) -> Option<E> {
        let inserted = insert_at(self.root.take(), item);
        self.root = Some(inserted.root);

        if inserted.replaced.is_none() {
            self.len += 1;
        }

        inserted.replaced
    }

    /// Removes the element matching `key` from the tree and returns it.
    ///
    /// Returns `None`, leaving the tree untouched, if there is no such element.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<E>
    where
        E: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removal = remove_at(self.root.take(), key);
        self.root = removal.root;

        if removal.removed.is_some() {
            self.len -= 1;
        }

        removal.removed
    }
}

impl<E> Drop for AvlTree<E> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<E> Default for AvlTree<E> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for AvlTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<E: Ord> FromIterator<E> for AvlTree<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<E: Ord> Extend<E> for AvlTree<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'tree, E> IntoIterator for &'tree AvlTree<E> {
    type Item = &'tree E;
    type IntoIter = Iter<'tree, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E> Node<E> {
    fn new(data: E) -> Box<Node<E>> {
        Box::new(Node {
            data,
            children: [None, None],
            balance: Balance::Even,
        })
    }

    #[inline]
    fn child(&self, dir: Dir) -> Option<&Node<E>> {
        self.children[dir as usize].as_deref()
    }

    #[inline]
    fn left(&self) -> Option<&Node<E>> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Option<&Node<E>> {
        self.child(Dir::Right)
    }

    #[inline]
    fn take_child(&mut self, dir: Dir) -> Link<E> {
        self.children[dir as usize].take()
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<E>) {
        self.children[dir as usize] = child;
    }
}

fn height_of<E>(node: Option<&Node<E>>) -> isize {
    match node {
        Some(node) => 1 + height_of(node.left()).max(height_of(node.right())),
        None => -1,
    }
}

// Inserts `item` into the subtree rooted at `link`, returning the new subtree root.
fn insert_at<E: Ord>(link: Link<E>, item: E) -> Insertion<E> {
    let Some(mut node) = link else {
        return Insertion {
            root: Node::new(item),
            taller: true,
            replaced: None,
        };
    };

    let dir = match item.cmp(&node.data) {
        Ordering::Less => Dir::Left,
        Ordering::Greater => Dir::Right,
        Ordering::Equal => {
            // Update in place. No node is added, so no height changes.
            let replaced = mem::replace(&mut node.data, item);

            return Insertion {
                root: node,
                taller: false,
                replaced: Some(replaced),
            };
        }
    };

    let below = insert_at(node.take_child(dir), item);
    node.set_child(dir, Some(below.root));

    if !below.taller {
        return Insertion {
            root: node,
            taller: false,
            replaced: below.replaced,
        };
    }

    // The `dir` subtree grew by one level.
    let (root, taller) = match node.balance {
        Balance::Even => {
            node.balance = Balance::leaning(dir);
            (node, true)
        }
        balance if balance.leans(!dir) => {
            node.balance = Balance::Even;
            (node, false)
        }
        _ => (balance_after_insert(node, dir), false),
    };

    Insertion {
        root,
        taller,
        replaced: None,
    }
}

// Repairs a node whose `heavy` subtree is two levels taller than the other after an insertion.
//
// This is left-balance for `Dir::Left` and right-balance for `Dir::Right`. The repaired subtree
// has the height it had before the insertion.
fn balance_after_insert<E>(mut node: Box<Node<E>>, heavy: Dir) -> Box<Node<E>> {
    let child_balance = node
        .child(heavy)
        .map(|child| child.balance)
        .expect("heavy side of an unbalanced node must not be empty");

    if child_balance.leans(heavy) {
        trace!("insert: single rotation {:?}", !heavy);

        node.balance = Balance::Even;
        let mut root = rotate(node, !heavy);
        root.balance = Balance::Even;
        root
    } else {
        // A subtree that just grew taller is never even unless it is a new leaf, and a new leaf
        // cannot make its parent two levels heavier.
        debug_assert!(child_balance.leans(!heavy));

        rotate_twice(node, heavy)
    }
}

// Removes the element matching `key` from the subtree rooted at `link`.
fn remove_at<E, Q>(link: Link<E>, key: &Q) -> Removal<E>
where
    E: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let Some(mut node) = link else {
        return Removal {
            root: None,
            shorter: false,
            removed: None,
        };
    };

    let dir = match key.cmp(node.data.borrow()) {
        Ordering::Less => Dir::Left,
        Ordering::Greater => Dir::Right,
        Ordering::Equal => return unlink(node),
    };

    let below = remove_at(node.take_child(dir), key);
    node.set_child(dir, below.root);

    let (root, shorter) = if below.shorter {
        shrink(node, dir)
    } else {
        (node, false)
    };

    Removal {
        root: Some(root),
        shorter,
        removed: below.removed,
    }
}

// Removes `node` from its subtree, returning the subtree that takes its place.
fn unlink<E>(mut node: Box<Node<E>>) -> Removal<E> {
    match (node.take_child(Dir::Left), node.take_child(Dir::Right)) {
        (Some(left), Some(right)) => {
            // The in-order predecessor is unlinked instead, and its payload takes the place of
            // `node`'s.
            let predecessor = remove_extreme(left, Dir::Right);
            node.set_child(Dir::Left, predecessor.root);
            node.set_child(Dir::Right, Some(right));

            let removed = mem::replace(&mut node.data, predecessor.data);

            let (root, shorter) = if predecessor.shorter {
                shrink(node, Dir::Left)
            } else {
                (node, false)
            };

            Removal {
                root: Some(root),
                shorter,
                removed: Some(removed),
            }
        }

        (child, None) | (None, child) => {
            let Node { data, .. } = *node;

            Removal {
                root: child,
                shorter: true,
                removed: Some(data),
            }
        }
    }
}

// Unlinks the furthest node in direction `dir` from the subtree rooted at `node`.
fn remove_extreme<E>(mut node: Box<Node<E>>, dir: Dir) -> Extraction<E> {
    match node.take_child(dir) {
        Some(child) => {
            let below = remove_extreme(child, dir);
            node.set_child(dir, below.root);

            let (root, shorter) = if below.shorter {
                shrink(node, dir)
            } else {
                (node, false)
            };

            Extraction {
                root: Some(root),
                shorter,
                data: below.data,
            }
        }

        None => {
            let rest = node.take_child(!dir);
            let Node { data, .. } = *node;

            Extraction {
                root: rest,
                shorter: true,
                data,
            }
        }
    }
}

// Updates `node` after its `dir` subtree lost one level, returning the new subtree root and
// whether the subtree as a whole became shorter.
fn shrink<E>(mut node: Box<Node<E>>, dir: Dir) -> (Box<Node<E>>, bool) {
    match node.balance {
        balance if balance.leans(dir) => {
            node.balance = Balance::Even;
            (node, true)
        }
        Balance::Even => {
            node.balance = Balance::leaning(!dir);
            (node, false)
        }
        _ => balance_after_remove(node, !dir),
    }
}

// Repairs a node whose `heavy` subtree is two levels taller than the other after a removal.
//
// This is delete-right-balance for `Dir::Right` (a removal on the left) and delete-left-balance
// for `Dir::Left`. Unlike insertion, the repaired subtree keeps its height only when the heavy
// child was even.
fn balance_after_remove<E>(mut node: Box<Node<E>>, heavy: Dir) -> (Box<Node<E>>, bool) {
    let sibling_balance = node
        .child(heavy)
        .map(|sibling| sibling.balance)
        .expect("heavy side of an unbalanced node must not be empty");

    match sibling_balance {
        Balance::Even => {
            trace!("remove: single rotation {:?}, height kept", !heavy);

            // `node` keeps leaning toward `heavy`.
            let mut root = rotate(node, !heavy);
            root.balance = Balance::leaning(!heavy);
            (root, false)
        }
        balance if balance.leans(heavy) => {
            trace!("remove: single rotation {:?}", !heavy);

            node.balance = Balance::Even;
            let mut root = rotate(node, !heavy);
            root.balance = Balance::Even;
            (root, true)
        }
        _ => (rotate_twice(node, heavy), true),
    }
}

// Performs a double rotation at `node`, whose `heavy` child leans away from `heavy`, and
// recomputes the balance tags of the three nodes involved.
//
// The inner grandchild becomes the subtree root.
fn rotate_twice<E>(mut node: Box<Node<E>>, heavy: Dir) -> Box<Node<E>> {
    trace!("double rotation {:?} then {:?}", heavy, !heavy);

    let mut child = node
        .take_child(heavy)
        .expect("heavy side of an unbalanced node must not be empty");
    let grandchild_balance = child
        .child(!heavy)
        .map(|grandchild| grandchild.balance)
        .expect("inner grandchild of a double rotation must not be empty");

    (node.balance, child.balance) = match grandchild_balance {
        Balance::Even => (Balance::Even, Balance::Even),
        balance if balance.leans(heavy) => (Balance::leaning(!heavy), Balance::Even),
        _ => (Balance::Even, Balance::leaning(heavy)),
    };

    node.set_child(heavy, Some(rotate(child, heavy)));

    let mut root = rotate(node, !heavy);
    root.balance = Balance::Even;
    root
}

// Performs a rotation, moving `down` down in direction `dir` and its `!dir` child up.
//
// `rotate(node, Dir::Left)` is a left rotation and `rotate(node, Dir::Right)` a right rotation.
// Balance tags are not updated.
fn rotate<E>(mut down: Box<Node<E>>, dir: Dir) -> Box<Node<E>> {
    let mut up = down
        .take_child(!dir)
        .expect("rotation requires a child to move up");

    // `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
    let across = up.take_child(dir);
    down.set_child(!dir, across);
    up.set_child(dir, Some(down));

    up
}
