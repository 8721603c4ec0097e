//! Debug utilities for inspecting and checking the trees.

use std::fmt;

use crate::key::{decode, KeyBuf};
use crate::node::Node;
use crate::HybridTst;

#[derive(Default)]
struct Tally {
    nodes: usize,
    values: usize,
}

impl<V> HybridTst<V> {
    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut tally = Tally::default();

        for (slot, root) in self.roots.iter().enumerate() {
            let Some(node) = root.as_deref() else {
                continue;
            };
            if usize::from(node.label) != slot {
                issues.push(format!(
                    "root slot {} holds a tree starting with {:?}",
                    slot,
                    char::from(node.label)
                ));
            }
            Self::verify_tree(node, &mut tally, &mut issues);
        }

        if tally.values != self.len {
            issues.push(format!(
                "{} nodes hold values but len={}",
                tally.values, self.len
            ));
        }
        if tally.nodes != self.node_count {
            issues.push(format!(
                "{} nodes reachable but node_count={}",
                tally.nodes, self.node_count
            ));
        }
        issues
    }

    /// Checks one root tree. Each entry carries the node, the exclusive label
    /// bounds imposed by ancestors at the same character position, and that
    /// position; `path[..position]` is the key prefix above the node.
    fn verify_tree(root: &Node<V>, tally: &mut Tally, issues: &mut Vec<String>) {
        let mut path = KeyBuf::new();
        let mut stack = vec![(root, None::<u8>, None::<u8>, 0usize)];

        while let Some((node, lo, hi, position)) = stack.pop() {
            path.truncate(position);
            tally.nodes += 1;
            if node.has_value() {
                tally.values += 1;
            }

            let label = node.label;
            if lo.is_some_and(|lo| label <= lo) || hi.is_some_and(|hi| label >= hi) {
                issues.push(format!(
                    "node {:?} after {:?} is out of sibling order (bounds {:?}..{:?})",
                    char::from(label),
                    decode(&path),
                    lo.map(char::from),
                    hi.map(char::from)
                ));
            }
            if !node.has_value() && node.mid.is_none() {
                issues.push(format!(
                    "node {:?} after {:?} neither ends nor continues a key",
                    char::from(label),
                    decode(&path)
                ));
            }

            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some(label), hi, position));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, lo, Some(label), position));
            }
            // Popped next, before anything else can overwrite `path[position]`.
            if let Some(mid) = node.mid.as_deref() {
                path.push(label);
                stack.push((mid, None, None, position + 1));
            }
        }
    }
}

impl<V: fmt::Debug> HybridTst<V> {
    /// Indented rendering of every tree, one node per line.
    ///
    /// Each line shows how the node was reached (`<` left, `=` mid, `>`
    /// right), its label, and its value if a key ends there.
    pub fn debug_tree(&self) -> String {
        TreeDump(self).to_string()
    }
}

struct TreeDump<'a, V>(&'a HybridTst<V>);

impl<V: fmt::Debug> fmt::Display for TreeDump<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.0;
        writeln!(f, "HybridTst: {} keys, {} nodes", tree.len, tree.node_count)?;
        if tree.is_empty() {
            return writeln!(f, "(empty)");
        }
        for (slot, root) in tree.roots.iter().enumerate() {
            if let Some(node) = root.as_deref() {
                writeln!(f, "[{}]", slot)?;
                dump_tree(f, node)?;
            }
        }
        Ok(())
    }
}

fn dump_tree<V: fmt::Debug>(f: &mut fmt::Formatter<'_>, root: &Node<V>) -> fmt::Result {
    let mut stack = vec![(root, 1usize, '=')];
    while let Some((node, depth, via)) = stack.pop() {
        let indent = "  ".repeat(depth);
        match &node.value {
            Some(value) => writeln!(f, "{}{} {:?} -> {:?}", indent, via, char::from(node.label), value)?,
            None => writeln!(f, "{}{} {:?}", indent, via, char::from(node.label))?,
        }
        if let Some(right) = node.right.as_deref() {
            stack.push((right, depth + 1, '>'));
        }
        if let Some(mid) = node.mid.as_deref() {
            stack.push((mid, depth + 1, '='));
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((left, depth + 1, '<'));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::node::Node;
    use crate::HybridTst;

    #[test]
    fn test_sound_tree_has_no_issues() {
        let mut t: HybridTst<u64> = HybridTst::new();
        for (i, key) in ["she", "sells", "sea", "shells", "by", "the", "shore"]
            .iter()
            .enumerate()
        {
            t.put(key, i as u64).unwrap();
        }
        assert_eq!(t.verify_integrity(), Vec::<String>::new());
    }

    #[test]
    fn test_detects_broken_sibling_order() {
        let mut t: HybridTst<u64> = HybridTst::new();
        t.put("ma", 1).unwrap();

        // Graft a node whose label belongs on the other side.
        let root = t.roots[usize::from(b'm')].as_mut().unwrap();
        let mid = root.mid.as_mut().unwrap();
        let mut stray = Node::new(b'z');
        stray.value = Some(2);
        mid.left = Some(Box::new(stray));
        t.len += 1;
        t.node_count += 1;

        let issues = t.verify_integrity();
        assert_eq!(issues.len(), 1, "{:?}", issues);
        assert!(issues[0].contains("out of sibling order"), "{}", issues[0]);
    }

    #[test]
    fn test_detects_counter_mismatch() {
        let mut t: HybridTst<u64> = HybridTst::new();
        t.put("ab", 1).unwrap();
        t.len = 5;
        let issues = t.verify_integrity();
        assert_eq!(issues, ["1 nodes hold values but len=5"]);
    }

    #[test]
    fn test_detects_misplaced_root() {
        let mut t: HybridTst<u64> = HybridTst::new();
        t.put("a", 1).unwrap();
        let tree = t.roots[usize::from(b'a')].take();
        t.roots[usize::from(b'b')] = tree;
        let issues = t.verify_integrity();
        assert_eq!(issues, ["root slot 98 holds a tree starting with 'a'"]);
    }

    #[test]
    fn test_debug_tree() {
        let mut t: HybridTst<u64> = HybridTst::new();
        t.put("car", 1).unwrap();
        t.put("cat", 2).unwrap();
        t.put("ca", 3).unwrap();

        let expected = "\
HybridTst: 3 keys, 4 nodes
[99]
  = 'c'
    = 'a' -> 3
      = 'r' -> 1
        > 't' -> 2
";
        assert_eq!(t.debug_tree(), expected);
    }

    #[test]
    fn test_debug_tree_empty() {
        let t: HybridTst<u64> = HybridTst::new();
        assert_eq!(t.debug_tree(), "HybridTst: 0 keys, 0 nodes\n(empty)\n");
    }
}
