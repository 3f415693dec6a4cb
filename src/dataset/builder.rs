use std::hash::Hash;

use crate::dataset::Ratings;
use crate::prelude::*;

/// Collects ratings keyed by arbitrary user and item identifiers
/// and assigns them dense indices in the first-seen order.
pub struct RatingsBuilder<U, I> {
    user_ids: Vec<U>,
    item_ids: Vec<I>,
    user_indices: AHashMap<U, usize>,
    item_indices: AHashMap<I, usize>,
    triples: Vec<(usize, usize, f64)>,
}

impl<U: Hash + Eq + Clone, I: Hash + Eq + Clone> Default for RatingsBuilder<U, I> {
    fn default() -> Self {
        Self {
            user_ids: Vec::new(),
            item_ids: Vec::new(),
            user_indices: AHashMap::default(),
            item_indices: AHashMap::default(),
            triples: Vec::new(),
        }
    }
}

impl<U: Hash + Eq + Clone, I: Hash + Eq + Clone> RatingsBuilder<U, I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user_id: U, item_id: I, rating: f64) -> Result<&mut Self> {
        ensure!(rating.is_finite(), "rating {} is not finite", rating);
        let user = index_of(&mut self.user_indices, &mut self.user_ids, user_id);
        let item = index_of(&mut self.item_indices, &mut self.item_ids, item_id);
        self.triples.push((user, item, rating));
        Ok(self)
    }

    /// Registers the user without ratings, so that it still gets factors.
    pub fn add_user(&mut self, user_id: U) -> usize {
        index_of(&mut self.user_indices, &mut self.user_ids, user_id)
    }

    /// Registers the item without ratings, so that it can still be recommended.
    pub fn add_item(&mut self, item_id: I) -> usize {
        index_of(&mut self.item_indices, &mut self.item_ids, item_id)
    }

    pub fn build(self) -> Result<IndexedRatings<U, I>> {
        let ratings =
            Ratings::from_triples(self.user_ids.len(), self.item_ids.len(), self.triples)?;
        Ok(IndexedRatings {
            ratings,
            user_ids: self.user_ids,
            item_ids: self.item_ids,
            user_indices: self.user_indices,
            item_indices: self.item_indices,
        })
    }
}

fn index_of<K: Hash + Eq + Clone>(
    indices: &mut AHashMap<K, usize>,
    ids: &mut Vec<K>,
    id: K,
) -> usize {
    *indices.entry(id).or_insert_with_key(|id| {
        ids.push(id.clone());
        ids.len() - 1
    })
}

/// Ratings along with the mapping between the external identifiers and the dense indices.
pub struct IndexedRatings<U, I> {
    pub ratings: Ratings,
    user_ids: Vec<U>,
    item_ids: Vec<I>,
    user_indices: AHashMap<U, usize>,
    item_indices: AHashMap<I, usize>,
}

impl<U: Hash + Eq, I: Hash + Eq> IndexedRatings<U, I> {
    #[must_use]
    pub fn user_index(&self, user_id: &U) -> Option<usize> {
        self.user_indices.get(user_id).copied()
    }

    #[must_use]
    pub fn item_index(&self, item_id: &I) -> Option<usize> {
        self.item_indices.get(item_id).copied()
    }

    #[must_use]
    pub fn user_id(&self, index: usize) -> Option<&U> {
        self.user_ids.get(index)
    }

    #[must_use]
    pub fn item_id(&self, index: usize) -> Option<&I> {
        self.item_ids.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RatingSource;

    #[test]
    fn build_ok() -> crate::Result {
        let mut builder = RatingsBuilder::new();
        builder
            .push("alice", 42, 5.0)?
            .push("bob", 7, 3.0)?
            .push("alice", 7, 1.0)?;
        builder.add_item(100);
        let indexed = builder.build()?;

        assert_eq!(indexed.user_index(&"alice"), Some(0));
        assert_eq!(indexed.user_index(&"bob"), Some(1));
        assert_eq!(indexed.item_index(&7), Some(1));
        assert_eq!(indexed.item_id(2), Some(&100));
        assert_eq!(indexed.user_id(5), None);

        assert_eq!(indexed.ratings.n_users(), 2);
        assert_eq!(indexed.ratings.n_items(), 3);
        assert_eq!(indexed.ratings.ratings_of(0), &[(0, 5.0), (1, 1.0)]);
        Ok(())
    }

    #[test]
    fn push_non_finite() {
        let mut builder = RatingsBuilder::<u32, u32>::new();
        assert!(builder.push(1, 1, f64::INFINITY).is_err());
    }
}
