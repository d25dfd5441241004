use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const PKR_CURRENCY_CODE: &str = "PKR";

//--------------------------------------        Pkr        ---------------------------------------------------------
/// An amount of Pakistani rupees, stored as a whole number of rupees.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Pkr(i64);

op!(binary Pkr, Add, add);
op!(binary Pkr, Sub, sub);
op!(inplace Pkr, SubAssign, sub_assign);
op!(unary Pkr, Neg, neg);

impl Mul<i64> for Pkr {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Pkr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in rupees: {0}")]
pub struct PkrConversionError(String);

impl From<i64> for Pkr {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Pkr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Pkr {}

impl TryFrom<u64> for Pkr {
    type Error = PkrConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(PkrConversionError(format!("Value {} is too large to convert to Pkr", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Pkr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {PKR_CURRENCY_CODE}", self.0)
    }
}

impl Pkr {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
