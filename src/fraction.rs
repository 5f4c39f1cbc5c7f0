//! Exact rational numbers.
//!
//! A [`Fraction`] is always kept in lowest terms with a strictly positive
//! denominator, so structural equality coincides with numeric equality and
//! matrices built from fractions have a canonical representation.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// A rational number `numer / denom` in lowest terms.
///
/// # Invariants
///
/// - `denom > 0`
/// - `gcd(numer, denom) == 1` (and zero is stored as `0 / 1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    numer: BigInt,
    denom: BigInt,
}

impl Fraction {
    /// Creates the fraction `numer / denom`, reducing it to lowest terms.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
        let numer = numer.into();
        let denom = denom.into();
        assert!(!denom.is_zero(), "fraction with zero denominator");
        Self::reduced(numer, denom)
    }

    /// Creates the integer fraction `value / 1`.
    pub fn integer(value: impl Into<BigInt>) -> Self {
        Fraction {
            numer: value.into(),
            denom: BigInt::one(),
        }
    }

    /// The fraction `-1`.
    pub fn minus_one() -> Self {
        Self::integer(-1)
    }

    fn reduced(numer: BigInt, denom: BigInt) -> Self {
        if numer.is_zero() {
            return Self::zero();
        }
        let g = numer.gcd(&denom);
        let (mut numer, mut denom) = (numer / &g, denom / &g);
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        Fraction { numer, denom }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    /// Returns true if the denominator is one.
    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    /// Multiplicative inverse.
    ///
    /// # Panics
    ///
    /// Panics if `self` is zero.
    pub fn recip(&self) -> Self {
        assert!(!self.numer.is_zero(), "division by zero fraction");
        Self::reduced(self.denom.clone(), self.numer.clone())
    }
}

impl Zero for Fraction {
    fn zero() -> Self {
        Fraction {
            numer: BigInt::zero(),
            denom: BigInt::one(),
        }
    }

    fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }
}

impl One for Fraction {
    fn one() -> Self {
        Self::integer(1)
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<BigInt> for Fraction {
    fn from(value: BigInt) -> Self {
        Self::integer(value)
    }
}

impl<'a> Add<&'a Fraction> for &'a Fraction {
    type Output = Fraction;

    fn add(self, rhs: &'a Fraction) -> Fraction {
        if self.denom == rhs.denom {
            return Fraction::reduced(&self.numer + &rhs.numer, self.denom.clone());
        }
        Fraction::reduced(&self.numer * &rhs.denom + &rhs.numer * &self.denom, &self.denom * &rhs.denom)
    }
}

impl<'a> Sub<&'a Fraction> for &'a Fraction {
    type Output = Fraction;

    fn sub(self, rhs: &'a Fraction) -> Fraction {
        if self.denom == rhs.denom {
            return Fraction::reduced(&self.numer - &rhs.numer, self.denom.clone());
        }
        Fraction::reduced(&self.numer * &rhs.denom - &rhs.numer * &self.denom, &self.denom * &rhs.denom)
    }
}

impl<'a> Mul<&'a Fraction> for &'a Fraction {
    type Output = Fraction;

    fn mul(self, rhs: &'a Fraction) -> Fraction {
        Fraction::reduced(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl<'a> Div<&'a Fraction> for &'a Fraction {
    type Output = Fraction;

    fn div(self, rhs: &'a Fraction) -> Fraction {
        assert!(!rhs.numer.is_zero(), "division by zero fraction");
        Fraction::reduced(&self.numer * &rhs.denom, &self.denom * &rhs.numer)
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, rhs: Fraction) -> Fraction {
                (&self).$method(&rhs)
            }
        }

        impl<'a> $imp<&'a Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, rhs: &'a Fraction) -> Fraction {
                (&self).$method(rhs)
            }
        }

        impl<'a> $imp<Fraction> for &'a Fraction {
            type Output = Fraction;

            fn $method(self, rhs: Fraction) -> Fraction {
                self.$method(&rhs)
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);

impl AddAssign<&Fraction> for Fraction {
    fn add_assign(&mut self, rhs: &Fraction) {
        *self = &*self + rhs;
    }
}

impl SubAssign<&Fraction> for Fraction {
    fn sub_assign(&mut self, rhs: &Fraction) {
        *self = &*self - rhs;
    }
}

impl MulAssign<&Fraction> for Fraction {
    fn mul_assign(&mut self, rhs: &Fraction) {
        *self = &*self * rhs;
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction {
            numer: -self.numer,
            denom: self.denom,
        }
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        -self.clone()
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves the order.
        (&self.numer * &other.denom).cmp(&(&other.numer * &self.denom))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}
