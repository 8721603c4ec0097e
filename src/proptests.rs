use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_tree<V>(t: &HybridTst<V>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {:?}", issues);
    assert_eq!(t.iter().count(), t.len(), "iteration must visit every key");
}

#[derive(Clone, Debug)]
enum Op {
    Put(String, u64),
    Get(String),
    Prefix(String),
    Match(String),
    Longest(String),
}

/// Small alphabet so keys collide and share prefixes, with a few codes above
/// 0x7F that take two UTF-8 bytes but a single label.
fn char_strategy() -> impl Strategy<Value = char> + Clone {
    prop::sample::select(vec!['a', 'b', 'c', 'A', '.', '\u{e9}', '\u{ff}'])
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    prop::collection::vec(char_strategy(), 1..=6).prop_map(|cs| cs.into_iter().collect())
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Put(k, v)),
        15 => key.clone().prop_map(Op::Get),
        15 => prop::collection::vec(char_strategy(), 1..=3)
            .prop_map(|cs| Op::Prefix(cs.into_iter().collect())),
        10 => key.clone().prop_map(Op::Match),
        10 => prop::collection::vec(char_strategy(), 1..=9)
            .prop_map(|cs| Op::Longest(cs.into_iter().collect())),
    ];
    prop::collection::vec(op, 0..=500)
}

fn model_matches(key: &str, pattern: &str) -> bool {
    key.chars().count() == pattern.chars().count()
        && key
            .chars()
            .zip(pattern.chars())
            .all(|(k, p)| p == WILDCARD || p == k)
}

fn model_longest_prefix<'q>(m: &BTreeMap<String, u64>, query: &'q str) -> Option<&'q str> {
    query
        .char_indices()
        .map(|(i, c)| &query[..i + c.len_utf8()])
        .filter(|prefix| m.contains_key(*prefix))
        .last()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: HybridTst<u64> = HybridTst::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let before = t.stats();
                    let is_new = !m.contains_key(&key);
                    m.entry(key.clone()).or_insert(value);
                    prop_assert_eq!(t.put(&key, value), Ok(is_new));
                    if !is_new {
                        prop_assert_eq!(t.stats(), before);
                    }
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), Ok(m.get(&key)));
                    prop_assert_eq!(t.contains(&key), Ok(m.contains_key(&key)));
                }
                Op::Prefix(prefix) => {
                    let expected: Vec<String> = m
                        .keys()
                        .filter(|k| k.starts_with(prefix.as_str()))
                        .cloned()
                        .collect();
                    prop_assert_eq!(t.keys_with_prefix(&prefix), Ok(expected));
                }
                Op::Match(pattern) => {
                    let expected: Vec<String> = m
                        .keys()
                        .filter(|k| model_matches(k, &pattern))
                        .cloned()
                        .collect();
                    prop_assert_eq!(t.keys_that_match(&pattern), Ok(expected));
                }
                Op::Longest(query) => {
                    prop_assert_eq!(
                        t.longest_prefix_of(&query),
                        Ok(model_longest_prefix(&m, &query))
                    );
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(String, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(t.keys(), m.keys().cloned().collect::<Vec<_>>());

        let longest = m.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        prop_assert!(t.tree_height() >= longest);
        prop_assert_eq!(t.average_node_depth().is_some(), !m.is_empty());
    }

    #[test]
    fn prop_rejects_out_of_range(prefix in key_strategy(), code in 0x100u32..0x2000) {
        let ch = char::from_u32(code).unwrap();
        let key = format!("{prefix}{ch}");
        let position = prefix.chars().count();
        let expected = Error::InvalidKey { ch, position };

        let mut t: HybridTst<u64> = HybridTst::new();
        t.put(&prefix, 1).unwrap();
        let before = t.stats();

        prop_assert_eq!(t.put(&key, 2), Err(expected.clone()));
        prop_assert_eq!(t.get(&key), Err(expected.clone()));
        prop_assert_eq!(t.keys_with_prefix(&key), Err(expected.clone()));
        prop_assert_eq!(t.keys_that_match(&key), Err(expected.clone()));
        prop_assert_eq!(t.longest_prefix_of(&key), Err(expected));
        prop_assert_eq!(t.stats(), before);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = ["a", "b", "c", "aa", "ab", "ba"];

    for_each_permutation(&keys, |perm| {
        let mut t: HybridTst<usize> = HybridTst::new();
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(t.put(k, i), Ok(true));
        }

        validate_tree(&t);
        // Shape depends on insertion order; enumeration order does not.
        assert_eq!(t.keys(), ["a", "aa", "ab", "b", "ba", "c"]);
        assert_eq!(t.keys_with_prefix("a").unwrap(), ["a", "aa", "ab"]);
        assert_eq!(t.keys_that_match(".a").unwrap(), ["aa", "ba"]);
        assert_eq!(t.longest_prefix_of("abba"), Ok(Some("ab")));
        assert_eq!(t.stats().node_count, 6);
    });
}
