use alloc::{collections::VecDeque, vec::Vec};
use core::iter::FusedIterator;

use crate::{AvlTree, Node};

/// An in-order iterator over the elements of an [`AvlTree`].
pub struct Iter<'tree, E> {
    // The nodes whose left subtrees are being visited, deepest last.
    stack: Vec<&'tree Node<E>>,
    len: usize,
}

impl<'tree, E> Iter<'tree, E> {
    pub(crate) fn new(tree: &'tree AvlTree<E>) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            len: tree.len(),
        };

        iter.descend(tree.root.as_deref());
        iter
    }

    // Upon entering a new subtree, find the minimum element, stacking every node on the way.
    fn descend(&mut self, mut opt_cur: Option<&'tree Node<E>>) {
        while let Some(cur) = opt_cur {
            self.stack.push(cur);
            opt_cur = cur.left();
        }
    }
}

impl<'tree, E> Iterator for Iter<'tree, E> {
    type Item = &'tree E;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        // The left subtree of `cur` has been exhausted. Its successor is the minimum of its right
        // subtree, or else the nearest stacked ancestor.
        self.descend(cur.right());
        self.len -= 1;

        Some(&cur.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

/// A breadth-first iterator over the elements of an [`AvlTree`].
pub struct LevelIter<'tree, E> {
    queue: VecDeque<&'tree Node<E>>,
    len: usize,
}

impl<'tree, E> LevelIter<'tree, E> {
    pub(crate) fn new(tree: &'tree AvlTree<E>) -> Self {
        LevelIter {
            queue: tree.root.as_deref().into_iter().collect(),
            len: tree.len(),
        }
    }
}

impl<'tree, E> Iterator for LevelIter<'tree, E> {
    type Item = &'tree E;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.queue.pop_front()?;

        self.queue.extend(cur.left());
        self.queue.extend(cur.right());
        self.len -= 1;

        Some(&cur.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<E> ExactSizeIterator for LevelIter<'_, E> {}

impl<E> FusedIterator for LevelIter<'_, E> {}
