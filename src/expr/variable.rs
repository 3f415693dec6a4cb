use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::expr::error::ParseError;

const USER_PREFIX: &str = "pu";
const ITEM_PREFIX: &str = "qi";

/// Latent factor variable of a prediction formula.
///
/// `pu<k>` is the `k`-th factor of the user, `qi<k>` is the `k`-th factor of the item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    User(usize),
    Item(usize),
}

impl Variable {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::User(index) | Self::Item(index) => index,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(index) => write!(formatter, "{}{}", USER_PREFIX, index),
            Self::Item(index) => write!(formatter, "{}{}", ITEM_PREFIX, index),
        }
    }
}

impl FromStr for Variable {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let variable = if let Some(digits) = name.strip_prefix(USER_PREFIX) {
            parse_index(digits).map(Self::User)
        } else if let Some(digits) = name.strip_prefix(ITEM_PREFIX) {
            parse_index(digits).map(Self::Item)
        } else {
            None
        };
        variable.ok_or_else(|| ParseError::UnknownIdentifier {
            name: name.to_string(),
            offset: 0,
        })
    }
}

fn parse_index(digits: &str) -> Option<usize> {
    if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) {
        usize::from_str(digits).ok()
    } else {
        None
    }
}

/// Variable values for a single evaluation: the user's and the item's factor rows.
#[derive(Copy, Clone)]
pub struct Binding<'a> {
    pub user: &'a [f64],
    pub item: &'a [f64],
}

impl<'a> Binding<'a> {
    #[must_use]
    pub const fn new(user: &'a [f64], item: &'a [f64]) -> Self {
        Self { user, item }
    }

    /// Looks up the variable value, `None` means the variable is not bound.
    #[inline]
    #[must_use]
    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::User(index) => self.user.get(index).copied(),
            Variable::Item(index) => self.item.get(index).copied(),
        }
    }
}
