//! Rating observations the recommender is trained on.

pub use self::builder::RatingsBuilder;
use crate::prelude::*;

pub mod builder;

/// Source of observed ratings, indexed by dense user and item indices.
pub trait RatingSource {
    fn n_users(&self) -> usize;

    fn n_items(&self) -> usize;

    /// `(item, rating)` pairs observed for the user, in a stable order.
    fn ratings_of(&self, user: usize) -> &[(usize, f64)];

    fn n_ratings(&self) -> usize {
        (0..self.n_users()).map(|user| self.ratings_of(user).len()).sum()
    }

    /// All observations as `(user, item, rating)` in user order.
    fn iter_ratings(&self) -> Box<dyn Iterator<Item = (usize, usize, f64)> + '_> {
        Box::new((0..self.n_users()).flat_map(move |user| {
            self.ratings_of(user)
                .iter()
                .map(move |(item, rating)| (user, *item, *rating))
        }))
    }

    /// Checks that every observation refers to the population and is finite.
    fn validate(&self) -> Result {
        for (user, item, rating) in self.iter_ratings() {
            ensure!(
                item < self.n_items(),
                "user #{} rated item #{} which is out of range 0..{}",
                user,
                item,
                self.n_items(),
            );
            ensure!(rating.is_finite(), "rating {} of user #{} is not finite", rating, user);
        }
        Ok(())
    }
}

impl<T: RatingSource + ?Sized> RatingSource for &T {
    fn n_users(&self) -> usize {
        (**self).n_users()
    }

    fn n_items(&self) -> usize {
        (**self).n_items()
    }

    fn ratings_of(&self, user: usize) -> &[(usize, f64)] {
        (**self).ratings_of(user)
    }
}

/// In-memory ratings grouped by user.
#[derive(Debug, Clone, Default)]
pub struct Ratings {
    by_user: Vec<Vec<(usize, f64)>>,
    n_items: usize,
}

impl Ratings {
    /// Builds the ratings from `(user, item, rating)` triples over fixed population sizes.
    pub fn from_triples(
        n_users: usize,
        n_items: usize,
        triples: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self> {
        let mut by_user = vec![Vec::new(); n_users];
        for (user, item, rating) in triples {
            ensure!(item < n_items, "item #{} is out of range 0..{}", item, n_items);
            ensure!(rating.is_finite(), "rating {} of user #{} is not finite", rating, user);
            by_user
                .get_mut(user)
                .ok_or_else(|| anyhow!("user #{} is out of range 0..{}", user, n_users))?
                .push((item, rating));
        }
        Ok(Self { by_user, n_items })
    }
}

impl RatingSource for Ratings {
    fn n_users(&self) -> usize {
        self.by_user.len()
    }

    fn n_items(&self) -> usize {
        self.n_items
    }

    fn ratings_of(&self, user: usize) -> &[(usize, f64)] {
        &self.by_user[user]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_triples_ok() -> crate::Result {
        let ratings = Ratings::from_triples(2, 3, [(1, 2, 4.0), (0, 0, 1.0), (1, 0, 5.0)])?;
        assert_eq!(ratings.n_users(), 2);
        assert_eq!(ratings.n_items(), 3);
        assert_eq!(ratings.n_ratings(), 3);
        assert_eq!(ratings.ratings_of(1), &[(2, 4.0), (0, 5.0)]);
        assert_eq!(
            ratings.iter_ratings().collect::<Vec<_>>(),
            vec![(0, 0, 1.0), (1, 2, 4.0), (1, 0, 5.0)],
        );
        Ok(())
    }

    #[test]
    fn from_triples_out_of_range() {
        assert!(Ratings::from_triples(1, 1, [(1, 0, 1.0)]).is_err());
        assert!(Ratings::from_triples(1, 1, [(0, 1, 1.0)]).is_err());
    }

    #[test]
    fn from_triples_non_finite() {
        assert!(Ratings::from_triples(1, 1, [(0, 0, f64::NAN)]).is_err());
    }

    #[test]
    fn empty_user_ok() -> crate::Result {
        let ratings = Ratings::from_triples(3, 1, [(2, 0, 1.0)])?;
        assert!(ratings.ratings_of(0).is_empty());
        ratings.validate()
    }

    struct Rows(Vec<Vec<(usize, f64)>>);

    impl RatingSource for Rows {
        fn n_users(&self) -> usize {
            self.0.len()
        }

        fn n_items(&self) -> usize {
            2
        }

        fn ratings_of(&self, user: usize) -> &[(usize, f64)] {
            &self.0[user]
        }
    }

    #[test]
    fn validate_custom_source_ok() -> crate::Result {
        Rows(vec![vec![(0, 1.0)], vec![(1, 2.0)]]).validate()?;
        assert!(Rows(vec![vec![(2, 1.0)]]).validate().is_err());
        assert!(Rows(vec![vec![(0, f64::INFINITY)]]).validate().is_err());
        Ok(())
    }
}
