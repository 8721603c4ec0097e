//! # hybrid-tst
//!
//! An in-memory string dictionary built from 256 ternary search trees, one
//! per possible leading character.
//!
//! Supports exact lookup, prefix enumeration, single-character wildcard
//! matching and longest-prefix queries, plus structural statistics.
//!
//! Keys are strings over the first 256 Unicode scalar values. Lookups are
//! case-sensitive; any case folding belongs to whoever loads the data (see
//! [`loader`]).
//!
//! ## Example
//!
//! ```rust
//! use hybrid_tst::HybridTst;
//!
//! let mut dict = HybridTst::new();
//! dict.put("car", "vehicle")?;
//! dict.put("cart", "vehicle with wheels")?;
//! dict.put("cat", "feline")?;
//!
//! assert_eq!(dict.get("cat")?, Some(&"feline"));
//! assert_eq!(dict.keys_with_prefix("ca")?, ["car", "cart", "cat"]);
//! assert_eq!(dict.keys_that_match("c.t")?, ["cat"]);
//! assert_eq!(dict.longest_prefix_of("cats")?, Some("cat"));
//! # Ok::<(), hybrid_tst::Error>(())
//! ```

mod debug;
mod error;
mod iter;
mod key;
mod node;

pub mod loader;

pub use error::{Error, Result};
pub use iter::Iter;
pub use key::{ALPHABET, WILDCARD};

use key::{decode, KeyBuf, WILDCARD_LABEL};
use node::{descend, Link, Node};

/// Snapshot of a dictionary's shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TstStats {
    /// Number of keys stored
    pub len: usize,
    /// Number of tree nodes across all root slots
    pub node_count: usize,
    /// Number of non-empty root slots
    pub root_slots: usize,
    /// Largest hop count of any insertion, plus one
    pub height: usize,
    /// Sum of the hop counts of all insertions
    pub total_depth: u64,
    /// `total_depth / len`, or `None` when empty
    pub average_depth: Option<f64>,
}

/// A string-keyed dictionary made of 256 ternary search trees.
///
/// Root slot `i` holds the tree for every key whose first character has code
/// `i`. Within a tree, `left`/`right` links order siblings at one character
/// position and `mid` links advance to the next position.
///
/// Keys are never removed, and a value once stored is never replaced:
/// [`put`](Self::put) on an existing key leaves the dictionary unchanged.
pub struct HybridTst<V> {
    roots: Box<[Link<V>; ALPHABET]>,
    len: usize,
    node_count: usize,
    /// Largest `hops + 1` over all insertions.
    max_height: usize,
    total_depth: u64,
}

impl<V> HybridTst<V> {
    pub fn new() -> Self {
        Self {
            roots: Box::new(std::array::from_fn(|_| None)),
            len: 0,
            node_count: 0,
            max_height: 0,
            total_depth: 0,
        }
    }

    /// Number of distinct keys inserted.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.get(key).map(|value| value.is_some())
    }

    /// Returns the value stored for `key`.
    ///
    /// A well-formed key that is not present yields `Ok(None)`; only keys
    /// breaking the alphabet contract are errors.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        let labels = key::encode(key)?;
        Ok(self.find(&labels).and_then(|node| node.value.as_ref()))
    }

    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns `Ok(true)` if the key was new. An existing key keeps its
    /// original value and `Ok(false)` is returned. The key is validated
    /// before anything is touched, so an error leaves the dictionary as it
    /// was.
    pub fn put(&mut self, key: &str, value: V) -> Result<bool> {
        let labels = key::encode(key)?;
        let last = labels.len() - 1;

        let mut link = &mut self.roots[usize::from(labels[0])];
        let mut d = 0;
        let mut hops = 0usize;
        let mut created = 0usize;
        loop {
            let c = labels[d];
            let node = link.get_or_insert_with(|| {
                created += 1;
                Box::new(Node::new(c))
            });
            if c < node.label {
                link = &mut node.left;
            } else if c > node.label {
                link = &mut node.right;
            } else if d < last {
                d += 1;
                link = &mut node.mid;
            } else {
                if node.has_value() {
                    // A set value implies the whole path already existed.
                    debug_assert_eq!(created, 0);
                    return Ok(false);
                }
                node.value = Some(value);
                break;
            }
            hops += 1;
        }

        self.len += 1;
        self.node_count += created;
        self.max_height = self.max_height.max(hops + 1);
        self.total_depth += hops as u64;
        Ok(true)
    }

    /// Inserts every pair in order, stopping at the first invalid key.
    ///
    /// Pairs before the invalid one stay inserted. Returns how many keys
    /// were new.
    pub fn try_extend<K, I>(&mut self, pairs: I) -> Result<usize>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut inserted = 0;
        for (key, value) in pairs {
            if self.put(key.as_ref(), value)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Longest prefix of `query` that is itself a stored key.
    pub fn longest_prefix_of<'q>(&self, query: &'q str) -> Result<Option<&'q str>> {
        let labels = key::encode(query)?;

        let mut link = &self.roots[usize::from(labels[0])];
        let mut matched = 0;
        let mut i = 0;
        while i < labels.len() {
            let Some(node) = link.as_deref() else {
                break;
            };
            let c = labels[i];
            if c < node.label {
                link = &node.left;
            } else if c > node.label {
                link = &node.right;
            } else {
                i += 1;
                if node.has_value() {
                    matched = i;
                }
                link = &node.mid;
            }
        }

        if matched == 0 {
            return Ok(None);
        }
        Ok(Some(&query[..key::char_boundary(query, matched)]))
    }

    /// All keys, ordered by character code.
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Keys starting with `prefix`: `prefix` itself first if stored, then
    /// the longer matches in order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.prefix_iter(prefix)?.map(|(key, _)| key).collect())
    }

    /// Keys of exactly `pattern`'s length matching it position by position,
    /// where [`WILDCARD`] matches any character.
    pub fn keys_that_match(&self, pattern: &str) -> Result<Vec<String>> {
        let labels = key::encode(pattern)?;
        let mut out = Vec::new();
        let mut path = KeyBuf::new();

        // A leading wildcard can't pick a slot, so every tree is searched.
        if labels[0] == WILDCARD_LABEL {
            for root in self.roots.iter() {
                collect_matches(root.as_deref(), &labels, &mut path, &mut out);
            }
        } else {
            let root = self.roots[usize::from(labels[0])].as_deref();
            collect_matches(root, &labels, &mut path, &mut out);
        }
        Ok(out)
    }

    /// Largest `hops + 1` over all insertions, where a hop is one
    /// `left`, `mid` or `right` link followed. Zero when empty.
    pub fn tree_height(&self) -> usize {
        self.max_height
    }

    /// Mean hop count of all insertions, or `None` when empty.
    pub fn average_node_depth(&self) -> Option<f64> {
        (self.len > 0).then(|| self.total_depth as f64 / self.len as f64)
    }

    pub fn stats(&self) -> TstStats {
        TstStats {
            len: self.len,
            node_count: self.node_count,
            root_slots: self.roots.iter().filter(|root| root.is_some()).count(),
            height: self.max_height,
            total_depth: self.total_depth,
            average_depth: self.average_node_depth(),
        }
    }

    /// Iterates `(key, value)` pairs in the same order as [`keys`](Self::keys).
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::over_roots(&self.roots[..])
    }

    /// Lazy form of [`keys_with_prefix`](Self::keys_with_prefix) that also
    /// yields values.
    pub fn prefix_iter(&self, prefix: &str) -> Result<Iter<'_, V>> {
        let labels = key::encode(prefix)?;
        let Some(node) = self.find(&labels) else {
            return Ok(Iter::empty());
        };

        let mut iter = Iter::below(&node.mid, labels.clone());
        if let Some(value) = node.value.as_ref() {
            iter.push_front(labels, value);
        }
        Ok(iter)
    }

    fn find(&self, labels: &[u8]) -> Option<&Node<V>> {
        descend(&self.roots[usize::from(labels[0])], labels)
    }
}

enum Step<'a, V> {
    /// Node to test against pattern position `i`.
    Visit(&'a Node<V>, usize),
    /// Node that matched position `i`; its label becomes `path[i]`.
    Take(&'a Node<V>, usize),
}

/// Appends every key under `root` matching `pattern`, in key order.
///
/// `path` is shared by all steps: a step at position `i` only ever writes
/// `path[i..]`, and steps run in depth-first order, so `path[..i]` always
/// holds the labels leading to the current node.
fn collect_matches<V>(
    root: Option<&Node<V>>,
    pattern: &[u8],
    path: &mut KeyBuf,
    out: &mut Vec<String>,
) {
    let mut stack: Vec<Step<'_, V>> = root.map(|node| Step::Visit(node, 0)).into_iter().collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(node, i) => {
                let c = pattern[i];
                let any = c == WILDCARD_LABEL;
                // Reverse order: left comes off the stack first.
                if any || c > node.label {
                    stack.extend(node.right.as_deref().map(|right| Step::Visit(right, i)));
                }
                if any || c == node.label {
                    if i + 1 < pattern.len() {
                        stack.extend(node.mid.as_deref().map(|mid| Step::Visit(mid, i + 1)));
                    }
                    stack.push(Step::Take(node, i));
                }
                if any || c < node.label {
                    stack.extend(node.left.as_deref().map(|left| Step::Visit(left, i)));
                }
            }
            Step::Take(node, i) => {
                path.truncate(i);
                path.push(node.label);
                if i + 1 == pattern.len() && node.has_value() {
                    out.push(decode(path));
                }
            }
        }
    }
}

impl<V> Drop for HybridTst<V> {
    fn drop(&mut self) {
        // Detach children before each node is freed so no drop recurses.
        let mut stack: Vec<Box<Node<V>>> = self.roots.iter_mut().filter_map(Option::take).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.mid.take());
            stack.extend(node.right.take());
        }
    }
}

impl<V: Clone> Clone for HybridTst<V> {
    fn clone(&self) -> Self {
        let mut roots: Box<[Link<V>; ALPHABET]> = Box::new(std::array::from_fn(|_| None));
        {
            let mut stack: Vec<(&Node<V>, &mut Link<V>)> = self
                .roots
                .iter()
                .zip(roots.iter_mut())
                .filter_map(|(src, dst)| src.as_deref().map(|src| (src, dst)))
                .collect();
            while let Some((src, dst)) = stack.pop() {
                let mut copy = Node::new(src.label);
                copy.value = src.value.clone();
                let Node {
                    left, mid, right, ..
                } = &mut **dst.insert(Box::new(copy));
                for (from, to) in [(&src.left, left), (&src.mid, mid), (&src.right, right)] {
                    if let Some(child) = from.as_deref() {
                        stack.push((child, to));
                    }
                }
            }
        }

        Self {
            roots,
            len: self.len,
            node_count: self.node_count,
            max_height: self.max_height,
            total_depth: self.total_depth,
        }
    }
}

impl<V> Default for HybridTst<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for HybridTst<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a HybridTst<V> {
    type Item = (String, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
