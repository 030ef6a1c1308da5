//! Element-wise math
//!
//! Domain errors follow the float convention (NaN); nothing extra is checked.

use super::TypedArray;
use crate::error::ArrayError;
use std::ops::{Add, Mul};

/// Real-valued functions available to array elements
pub trait Real: Copy {
    fn sqrt(self) -> Self;
    fn ln(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
}

macro_rules! impl_real {
    ($($t:ty),*) => {$(
        impl Real for $t {
            #[inline] fn sqrt(self) -> Self { <$t>::sqrt(self) }
            #[inline] fn ln(self) -> Self { <$t>::ln(self) }
            #[inline] fn sin(self) -> Self { <$t>::sin(self) }
            #[inline] fn cos(self) -> Self { <$t>::cos(self) }
            #[inline] fn tan(self) -> Self { <$t>::tan(self) }
            #[inline] fn asin(self) -> Self { <$t>::asin(self) }
            #[inline] fn acos(self) -> Self { <$t>::acos(self) }
            #[inline] fn atan(self) -> Self { <$t>::atan(self) }
        }
    )*};
}

impl_real!(f32, f64);

macro_rules! elementwise {
    ($($name:ident),*) => {
        impl<T: Real> TypedArray<T> {
            $(
                pub fn $name(&self) -> TypedArray<T> {
                    self.map(|&x| Real::$name(x))
                }
            )*
        }
    };
}

elementwise!(sqrt, ln, sin, cos, tan, asin, acos, atan);

impl<T> TypedArray<T>
where
    T: Clone + Add<Output = T> + Mul<Output = T>,
{
    /// Sum of squared elements
    pub fn norm2(&self) -> Result<T, ArrayError> {
        let (first, rest) = self.as_slice().split_first().ok_or(ArrayError::Empty)?;
        let seed = first.clone() * first.clone();
        Ok(rest.iter().fold(seed, |acc, x| acc + x.clone() * x.clone()))
    }
}
