//! Ternary search tree nodes.
//!
//! Each node matches a single character at one position of a key:
//!
//! - `left`: siblings at the same position with a smaller label
//! - `right`: siblings at the same position with a larger label
//! - `mid`: the next position, for keys that matched `label` here

/// An owning link to a subtree; `None` means no key passes this way.
pub(crate) type Link<V> = Option<Box<Node<V>>>;

/// A node in one of the dictionary's ternary search trees.
///
/// Subtrees are owned through nested boxes, so anything walking a whole tree
/// (drop, clone, checks) must use an explicit stack: the `mid` chain is as
/// deep as the longest key.
pub(crate) struct Node<V> {
    /// Character code matched at this position.
    pub(crate) label: u8,
    pub(crate) left: Link<V>,
    pub(crate) mid: Link<V>,
    pub(crate) right: Link<V>,
    /// Set iff some inserted key ends at this node.
    pub(crate) value: Option<V>,
}

impl<V> Node<V> {
    pub(crate) fn new(label: u8) -> Self {
        Node {
            label,
            left: None,
            mid: None,
            right: None,
            value: None,
        }
    }

    #[inline]
    pub(crate) fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Follows the descent rule for `key` starting at `link`, returning the node
/// holding the key's last character if the whole path exists.
///
/// `key` must be non-empty.
pub(crate) fn descend<'a, V>(mut link: &'a Link<V>, key: &[u8]) -> Option<&'a Node<V>> {
    debug_assert!(!key.is_empty());
    let last = key.len() - 1;
    let mut d = 0;
    while let Some(node) = link.as_deref() {
        let c = key[d];
        if c < node.label {
            link = &node.left;
        } else if c > node.label {
            link = &node.right;
        } else if d < last {
            d += 1;
            link = &node.mid;
        } else {
            return Some(node);
        }
    }
    None
}
