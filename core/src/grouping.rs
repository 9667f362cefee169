//! Ordered grouping shared by the aggregator and the device detector.

use std::{collections::HashMap, hash::Hash};

/// Group `items` by `key`, keeping groups in first-seen key order and
/// members in input order.
pub(crate) fn group_first_seen<'a, T, K, F>(
    items: impl IntoIterator<Item = &'a T>,
    mut key: F,
) -> Vec<(K, Vec<&'a T>)>
where
    T: 'a,
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();

    for item in items {
        let k = key(item);
        match slots.get(&k) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_keep_first_seen_order() {
        let words = ["bb", "a", "cc", "d", "ee"];
        let groups = group_first_seen(words.iter(), |w| w.len());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, 2);
        assert_eq!(groups[0].1, vec![&"bb", &"cc", &"ee"]);
        assert_eq!(groups[1].1, vec![&"a", &"d"]);
    }
}
