//! Lenses over collection elements and optional values.
//!
//! Element lenses focus on `Option<T>`: reading an absent element yields
//! `None`, and writes that cannot land (an index past the end, or `None` for
//! a positional element) leave the collection unchanged. The laws therefore
//! hold for every element that exists.

use std::collections::BTreeMap;

use super::Lens;
use crate::model::Vector;

/// Element `index` of a persistent [`Vector`].
pub fn at<T>(index: usize) -> Lens<Vector<T>, Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Lens::new(
        move |items: &Vector<T>| items.get(index).cloned(),
        move |items: Vector<T>, value: Option<T>| match value {
            Some(value) => items.try_set(index, value).unwrap_or(items),
            None => items,
        },
    )
}

/// Element `index` of a `Vec`.
pub fn at_vec<T>(index: usize) -> Lens<Vec<T>, Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Lens::new(
        move |items: &Vec<T>| items.get(index).cloned(),
        move |mut items: Vec<T>, value: Option<T>| {
            if let (Some(slot), Some(value)) = (items.get_mut(index), value) {
                *slot = value;
            }
            items
        },
    )
}

/// Entry `k` of a `BTreeMap`. Writing `None` removes the entry.
pub fn key<K, V>(k: K) -> Lens<BTreeMap<K, V>, Option<V>>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let lookup = k.clone();
    Lens::new(
        move |map: &BTreeMap<K, V>| map.get(&lookup).cloned(),
        move |mut map: BTreeMap<K, V>, value: Option<V>| {
            match value {
                Some(value) => {
                    map.insert(k.clone(), value);
                }
                None => {
                    map.remove(&k);
                }
            }
            map
        },
    )
}

/// Treat a missing value as `T::default()`; writes always store `Some`.
pub fn or_default<T>() -> Lens<Option<T>, T>
where
    T: Clone + Default + 'static,
{
    Lens::new(
        |value: &Option<T>| value.clone().unwrap_or_default(),
        |_, value| Some(value),
    )
}
