use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// The `n` most frequent groups, most frequent first.
/// Ties keep the order in which groups were first seen.
pub fn top_n<R, K, G>(rows: &[R], group: G, n: usize) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    G: Fn(&R) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for row in rows {
        let key = group(row);
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // sort_by is stable, so first-seen order survives among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Row counts per group, skipping rows without a key.
pub fn count_by<R, K, G>(rows: &[R], group: G) -> BTreeMap<K, usize>
where
    K: Ord,
    G: Fn(&R) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for key in rows.iter().filter_map(group) {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

pub fn distinct_count<R, K, G>(rows: &[R], group: G) -> usize
where
    K: Eq + Hash,
    G: Fn(&R) -> K,
{
    rows.iter().map(group).collect::<HashSet<K>>().len()
}
