//! In-order traversal over the dictionary's trees.

use std::iter::FusedIterator;

use crate::key::{decode, KeyBuf};
use crate::node::{Link, Node};

enum Frame<'a, V> {
    /// Subtree still to expand, with the labels of the path above it.
    Visit(&'a Node<V>, KeyBuf),
    /// Complete key ready to be yielded.
    Emit(KeyBuf, &'a V),
}

/// Iterator over `(key, value)` pairs, created by
/// [`HybridTst::iter`](crate::HybridTst::iter) and
/// [`HybridTst::prefix_iter`](crate::HybridTst::prefix_iter).
///
/// Each subtree is visited `left`, self, `mid`, `right`, and the root slots in
/// ascending order, so keys come out ordered by character code.
pub struct Iter<'a, V> {
    stack: Vec<Frame<'a, V>>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn empty() -> Self {
        Iter { stack: Vec::new() }
    }

    pub(crate) fn over_roots(roots: &'a [Link<V>]) -> Self {
        let stack = roots
            .iter()
            .rev()
            .filter_map(|root| root.as_deref())
            .map(|node| Frame::Visit(node, KeyBuf::new()))
            .collect();
        Iter { stack }
    }

    /// Keys in the subtree at `link`, each prefixed with `path`.
    pub(crate) fn below(link: &'a Link<V>, path: KeyBuf) -> Self {
        let mut iter = Self::empty();
        if let Some(node) = link.as_deref() {
            iter.stack.push(Frame::Visit(node, path));
        }
        iter
    }

    /// Queues a key that precedes everything already queued.
    pub(crate) fn push_front(&mut self, path: KeyBuf, value: &'a V) {
        self.stack.push(Frame::Emit(path, value));
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (String, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let (node, path) = match frame {
                Frame::Emit(path, value) => return Some((decode(&path), value)),
                Frame::Visit(node, path) => (node, path),
            };

            // Pushed in reverse so that left comes off the stack first.
            if let Some(right) = node.right.as_deref() {
                self.stack.push(Frame::Visit(right, path.clone()));
            }
            let mut here = path.clone();
            here.push(node.label);
            if let Some(mid) = node.mid.as_deref() {
                self.stack.push(Frame::Visit(mid, here.clone()));
            }
            if let Some(value) = node.value.as_ref() {
                self.stack.push(Frame::Emit(here, value));
            }
            if let Some(left) = node.left.as_deref() {
                self.stack.push(Frame::Visit(left, path));
            }
        }
        None
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
