//! Latent factor tables.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::expr::Binding;

/// Dense row-major table of latent factors, every row is exactly `n_factors` long.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    n_rows: usize,
    n_factors: usize,
    values: Vec<f64>,
}

impl FactorTable {
    /// # Panics
    ///
    /// Panics if `n_factors` is zero.
    #[must_use]
    pub fn zeros(n_rows: usize, n_factors: usize) -> Self {
        assert_ne!(n_factors, 0, "factor rows must not be empty");
        Self {
            n_rows,
            n_factors,
            values: vec![0.0; n_rows * n_factors],
        }
    }

    /// Fills the table with uniform values from `[0, 1)` in the row-major order.
    fn random(n_rows: usize, n_factors: usize, rng: &mut impl Rng) -> Self {
        assert_ne!(n_factors, 0, "factor rows must not be empty");
        Self {
            n_rows,
            n_factors,
            values: (0..n_rows * n_factors).map(|_| rng.gen::<f64>()).collect(),
        }
    }

    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.n_factors
    }

    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        assert!(index < self.n_rows, "row #{} is out of range 0..{}", index, self.n_rows);
        &self.values[index * self.n_factors..(index + 1) * self.n_factors]
    }

    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[inline]
    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        assert!(index < self.n_rows, "row #{} is out of range 0..{}", index, self.n_rows);
        &mut self.values[index * self.n_factors..(index + 1) * self.n_factors]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_factors)
    }

    pub fn add_assign(&mut self, rhs: &Self) {
        assert_eq!((self.n_rows, self.n_factors), (rhs.n_rows, rhs.n_factors));
        for (left, right) in self.values.iter_mut().zip(&rhs.values) {
            *left += right;
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|value| value.is_finite())
    }
}

/// User and item factors of the model.
///
/// Both tables keep the shape they are created with, only the values are mutable.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorStore {
    users: FactorTable,
    items: FactorTable,
}

impl FactorStore {
    /// Initializes the factors from the seeded stream: users first, then items.
    ///
    /// # Panics
    ///
    /// Panics if `n_factors` is zero.
    #[must_use]
    pub fn initialize(n_users: usize, n_items: usize, n_factors: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let users = FactorTable::random(n_users, n_factors, &mut rng);
        let items = FactorTable::random(n_items, n_factors, &mut rng);
        Self { users, items }
    }

    /// # Panics
    ///
    /// Panics if `n_factors` is zero.
    #[must_use]
    pub fn zeros(n_users: usize, n_items: usize, n_factors: usize) -> Self {
        Self {
            users: FactorTable::zeros(n_users, n_factors),
            items: FactorTable::zeros(n_items, n_factors),
        }
    }

    #[must_use]
    pub const fn users(&self) -> &FactorTable {
        &self.users
    }

    #[must_use]
    pub const fn items(&self) -> &FactorTable {
        &self.items
    }

    #[must_use]
    pub const fn n_users(&self) -> usize {
        self.users.n_rows()
    }

    #[must_use]
    pub const fn n_items(&self) -> usize {
        self.items.n_rows()
    }

    #[must_use]
    pub const fn n_factors(&self) -> usize {
        self.users.n_factors()
    }

    #[inline]
    #[must_use]
    pub fn user(&self, user: usize) -> &[f64] {
        self.users.row(user)
    }

    #[inline]
    #[must_use]
    pub fn item(&self, item: usize) -> &[f64] {
        self.items.row(item)
    }

    pub fn user_mut(&mut self, user: usize) -> &mut [f64] {
        self.users.row_mut(user)
    }

    pub fn item_mut(&mut self, item: usize) -> &mut [f64] {
        self.items.row_mut(item)
    }

    #[inline]
    #[must_use]
    pub fn binding(&self, user: usize, item: usize) -> Binding<'_> {
        Binding::new(self.user(user), self.item(item))
    }

    /// Adds the accumulated deltas to the factors.
    pub fn apply(&mut self, deltas: &Self) {
        self.users.add_assign(&deltas.users);
        self.items.add_assign(&deltas.items);
    }

    /// Checks that none of the factors is `NaN` or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.users.is_finite() && self.items.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_reproducible_ok() {
        let store = FactorStore::initialize(3, 4, 2, 42);
        assert_eq!(store, FactorStore::initialize(3, 4, 2, 42));
        assert_ne!(store, FactorStore::initialize(3, 4, 2, 43));
    }

    #[test]
    fn initialize_consumes_users_first_ok() {
        let store = FactorStore::initialize(2, 3, 2, 7);
        let mut rng = StdRng::seed_from_u64(7);
        let expected: Vec<f64> = (0..10).map(|_| rng.gen()).collect();
        let actual: Vec<f64> = store
            .users()
            .rows()
            .chain(store.items().rows())
            .flatten()
            .copied()
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn initialize_range_ok() {
        let store = FactorStore::initialize(10, 10, 4, 1);
        assert!(store
            .users()
            .rows()
            .chain(store.items().rows())
            .flatten()
            .all(|value| (0.0..1.0).contains(value)));
    }

    #[test]
    fn shape_ok() {
        let store = FactorStore::initialize(3, 5, 4, 0);
        assert_eq!(store.n_users(), 3);
        assert_eq!(store.n_items(), 5);
        assert!(store.users().rows().chain(store.items().rows()).all(|row| row.len() == 4));
    }

    #[test]
    #[should_panic]
    fn zero_factors() {
        let _ = FactorStore::initialize(2, 2, 0, 42);
    }

    #[test]
    #[should_panic]
    fn row_out_of_range() {
        let _ = FactorStore::zeros(2, 2, 3).user(2);
    }

    #[test]
    fn apply_ok() {
        let mut store = FactorStore::zeros(1, 2, 2);
        store.user_mut(0).copy_from_slice(&[1.0, 2.0]);
        let mut deltas = FactorStore::zeros(1, 2, 2);
        deltas.user_mut(0).copy_from_slice(&[0.5, -2.0]);
        deltas.item_mut(1).copy_from_slice(&[3.0, 4.0]);
        store.apply(&deltas);
        assert_eq!(store.user(0), &[1.5, 0.0]);
        assert_eq!(store.item(0), &[0.0, 0.0]);
        assert_eq!(store.item(1), &[3.0, 4.0]);
    }

    #[test]
    fn is_finite_ok() {
        let mut store = FactorStore::zeros(2, 2, 2);
        assert!(store.is_finite());
        store.item_mut(1)[0] = f64::INFINITY;
        assert!(!store.is_finite());
        store.item_mut(1)[0] = f64::NAN;
        assert!(!store.is_finite());
    }
}
