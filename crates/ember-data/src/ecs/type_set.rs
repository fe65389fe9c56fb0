// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A growable bitset of component type indices.

/// A set of component type indices backed by `u64` words.
///
/// Each entity slot keeps one to describe which components it carries, and
/// every [`ComponentFilter`](crate::ecs::ComponentFilter) compiles its
/// required and excluded types into two of them, so matching is a handful of
/// word-wise `AND`s.
///
/// Equality ignores trailing zero words: a set that grew and shrank back is
/// equal to one that never grew.
#[derive(Debug, Default, Clone)]
pub struct TypeSet {
    words: Vec<u64>,
}

impl TypeSet {
    /// Creates a new, empty set.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Adds a type index to the set.
    pub fn insert(&mut self, index: usize) {
        let (word, bit) = (index / 64, index % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << bit;
    }

    /// Removes a type index from the set.
    pub fn remove(&mut self, index: usize) {
        let (word, bit) = (index / 64, index % 64);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1 << bit);
        }
    }

    /// Returns `true` if the type index is in the set.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        let (word, bit) = (index / 64, index % 64);
        self.words.get(word).is_some_and(|w| w & (1 << bit) != 0)
    }

    /// Returns `true` if every index of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &TypeSet) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, &w)| w & !other.word(i) == 0)
    }

    /// Returns `true` if `self` and `other` share no index.
    #[must_use]
    pub fn is_disjoint(&self, other: &TypeSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Returns `true` if the set holds no index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of indices in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Removes every index.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Iterates over the indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }

    fn word(&self, index: usize) -> u64 {
        self.words.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for TypeSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| self.word(i) == other.word(i))
    }
}

impl Eq for TypeSet {}

impl FromIterator<usize> for TypeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_contains() {
        let mut set = TypeSet::new();
        set.insert(3);
        set.insert(130);
        assert!(set.contains(3));
        assert!(set.contains(130));
        assert!(!set.contains(4));
        assert_eq!(set.len(), 2);

        set.remove(130);
        assert!(!set.contains(130));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn subset_and_disjoint_across_word_boundaries() {
        let small: TypeSet = [1, 70].into_iter().collect();
        let large: TypeSet = [1, 2, 70, 200].into_iter().collect();
        let other: TypeSet = [3, 71].into_iter().collect();

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert!(TypeSet::new().is_subset(&small));
        assert!(small.is_disjoint(&other));
        assert!(!small.is_disjoint(&large));
    }

    #[test]
    fn equality_ignores_trailing_zero_words() {
        let mut grown = TypeSet::new();
        grown.insert(500);
        grown.remove(500);
        grown.insert(1);

        let plain: TypeSet = [1].into_iter().collect();
        assert_eq!(grown, plain);
    }
}
