use std::hash::{BuildHasher, Hash};

use hashbrown::HashMap;

/// Creates a new map with the same keys as `map` and every value passed through `f`. The input
/// map is left untouched.
///
/// # Examples
/// ```rust
/// use hashbrown::HashMap;
/// use multi_dict::functions::map_values;
///
/// let mut prices: HashMap<&str, u32> = HashMap::new();
/// prices.insert("apple", 3);
/// prices.insert("pear", 4);
///
/// let doubled = map_values(|p| p * 2, &prices);
/// assert_eq!(doubled.get("apple"), Some(&6));
/// assert_eq!(doubled.get("pear"), Some(&8));
/// assert_eq!(prices.get("apple"), Some(&3));
/// ```
pub fn map_values<K, V, W, S, F>(mut f: F, map: &HashMap<K, V, S>) -> HashMap<K, W, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Clone,
    F: FnMut(&V) -> W,
{
    let mut digest = HashMap::with_capacity_and_hasher(map.len(), map.hasher().clone());
    for (k, v) in map.iter() {
        digest.insert(k.clone(), f(v));
    }
    digest
}
