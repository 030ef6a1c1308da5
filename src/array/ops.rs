//! Binary arithmetic
//!
//! Array-array operators return `Result` because the lengths must match.
//! Array-scalar operators always succeed. Scalar-left subtraction and
//! division broadcast the scalar first and then apply the element, so
//! `(s - a)[i] == s - a[i]` and `(s / a)[i] == s / a[i]`.

use super::TypedArray;
use crate::error::ArrayError;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Primitive element types that may appear on either side of an operator.
///
/// Scalar operator impls are bounded on this trait so they stay disjoint
/// from the array-array impls.
pub trait Scalar: Copy {}

impl<T: Clone> TypedArray<T> {
    /// `s - a[i]` for every element
    pub fn scalar_sub(&self, s: T) -> TypedArray<T>
    where
        T: SubAssign,
    {
        self.map(|x| {
            let mut out = s.clone();
            out -= x.clone();
            out
        })
    }

    /// `s / a[i]` for every element
    pub fn scalar_div(&self, s: T) -> TypedArray<T>
    where
        T: DivAssign,
    {
        self.map(|x| {
            let mut out = s.clone();
            out /= x.clone();
            out
        })
    }
}

macro_rules! array_binary {
    ($($trait:ident, $method:ident, $try_fn:ident, $assign:ident, $assign_method:ident;)*) => {$(
        impl<T: Clone + $assign> $trait<&TypedArray<T>> for &TypedArray<T> {
            type Output = Result<TypedArray<T>, ArrayError>;

            fn $method(self, rhs: &TypedArray<T>) -> Self::Output {
                let mut out = self.clone();
                out.$try_fn(rhs)?;
                Ok(out)
            }
        }

        impl<T: Scalar + $assign> $trait<T> for TypedArray<T> {
            type Output = TypedArray<T>;

            fn $method(mut self, rhs: T) -> TypedArray<T> {
                self.$assign_method(rhs);
                self
            }
        }

        impl<T: Scalar + $assign> $trait<T> for &TypedArray<T> {
            type Output = TypedArray<T>;

            fn $method(self, rhs: T) -> TypedArray<T> {
                self.clone().$method(rhs)
            }
        }
    )*};
}

array_binary! {
    Add, add, try_add_assign, AddAssign, add_assign;
    Sub, sub, try_sub_assign, SubAssign, sub_assign;
    Mul, mul, try_mul_assign, MulAssign, mul_assign;
    Div, div, try_div_assign, DivAssign, div_assign;
}

impl<T: Clone + Neg<Output = T>> Neg for TypedArray<T> {
    type Output = TypedArray<T>;

    fn neg(mut self) -> TypedArray<T> {
        self.negate();
        self
    }
}

impl<T: Clone + Neg<Output = T>> Neg for &TypedArray<T> {
    type Output = TypedArray<T>;

    fn neg(self) -> TypedArray<T> {
        -self.clone()
    }
}

macro_rules! scalar_left {
    ($($t:ty),*) => {$(
        impl Scalar for $t {}

        impl Add<&TypedArray<$t>> for $t {
            type Output = TypedArray<$t>;

            fn add(self, rhs: &TypedArray<$t>) -> TypedArray<$t> {
                rhs + self
            }
        }

        impl Sub<&TypedArray<$t>> for $t {
            type Output = TypedArray<$t>;

            fn sub(self, rhs: &TypedArray<$t>) -> TypedArray<$t> {
                rhs.scalar_sub(self)
            }
        }

        impl Mul<&TypedArray<$t>> for $t {
            type Output = TypedArray<$t>;

            fn mul(self, rhs: &TypedArray<$t>) -> TypedArray<$t> {
                rhs * self
            }
        }

        impl Div<&TypedArray<$t>> for $t {
            type Output = TypedArray<$t>;

            fn div(self, rhs: &TypedArray<$t>) -> TypedArray<$t> {
                rhs.scalar_div(self)
            }
        }
    )*};
}

scalar_left!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
