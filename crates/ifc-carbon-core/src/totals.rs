// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Insertion-ordered carbon accumulator

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;
use std::hash::Hash;

/// Additive mapping from key to carbon
///
/// Keys keep the order they were first added in. [`Tally::ranked`] orders by
/// descending value and falls back to that insertion order for ties.
#[derive(Clone, Debug)]
pub struct Tally<K> {
    entries: Vec<(K, f64)>,
    index: FxHashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a key, creating it at zero first
    pub fn add(&mut self, key: K, value: f64) {
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].1 += value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| self.entries[idx].1)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Entries by descending value, ties in insertion order
    pub fn ranked(&self) -> Vec<(&K, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl<K: Clone + Eq + Hash> PartialEq for Tally<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Clone + Eq + Hash> FromIterator<(K, f64)> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (key, value) in iter {
            tally.add(key, value);
        }
        tally
    }
}

/// Serialized as a map in ranked order
impl<K: Clone + Eq + Hash + Serialize> Serialize for Tally<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ranked = self.ranked();
        let mut map = serializer.serialize_map(Some(ranked.len()))?;
        for (key, value) in ranked {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}
