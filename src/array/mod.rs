//! Typed Arrays
//!
//! A resizable, value-semantic 1-D container for homogeneous query results,
//! e.g. the numbers held by a run of repeated elements.
//!
//! Storage is an optional boxed slice: `None` marks an array that was never
//! sized, and a boxed slice can never carry spare capacity, so the buffer
//! always holds exactly `len()` elements. Clones are deep.

mod compare;
mod math;
mod ops;

pub use compare::concat;
pub use math::Real;
pub use ops::Scalar;

use crate::error::ArrayError;
use std::fmt;
use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

#[derive(Debug, Clone)]
pub struct TypedArray<T> {
    data: Option<Box<[T]>>,
}

impl<T> TypedArray<T> {
    /// An empty array that has never been sized
    pub const fn new() -> Self {
        TypedArray { data: None }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        TypedArray {
            data: Some(values.into_boxed_slice()),
        }
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False only for a default-constructed array that was never resized
    pub fn is_sized(&self) -> bool {
        self.data.is_some()
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data.map(Vec::from).unwrap_or_default()
    }

    /// Apply `f` to every element, producing a new array of the same length
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> TypedArray<U> {
        TypedArray::from_vec(self.iter().map(f).collect())
    }
}

impl<T: Default> TypedArray<T> {
    /// An array of `len` default-valued elements
    pub fn with_len(len: usize) -> Result<Self, ArrayError> {
        Ok(TypedArray {
            data: Some(allocate(len)?),
        })
    }

    /// Discard the contents and reallocate to `len` default-valued elements.
    ///
    /// On allocation failure the array keeps its previous contents.
    pub fn resize(&mut self, len: usize) -> Result<(), ArrayError> {
        self.data = Some(allocate(len)?);
        Ok(())
    }
}

impl<T: Clone> TypedArray<T> {
    /// Deep-copy `other` into `self`, reallocating only when the lengths differ.
    ///
    /// Equal lengths never reallocate, so an unsized array assigned from
    /// another empty array stays unsized.
    pub fn assign(&mut self, other: &TypedArray<T>) -> Result<(), ArrayError> {
        if self.len() == other.len() {
            if let Some(dst) = self.data.as_deref_mut() {
                dst.clone_from_slice(other.as_slice());
            }
            return Ok(());
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(other.len())
            .map_err(|_| ArrayError::Allocation(other.len()))?;
        buf.extend_from_slice(other.as_slice());
        self.data = Some(buf.into_boxed_slice());
        Ok(())
    }

    /// Set every element to `value`
    pub fn fill(&mut self, value: T) -> Result<(), ArrayError> {
        let data = self.data.as_deref_mut().ok_or(ArrayError::Uninitialized)?;
        data.fill(value);
        Ok(())
    }

    /// Copy the first `len()` values of `values` into the array
    pub fn assign_slice(&mut self, values: &[T]) -> Result<(), ArrayError> {
        let data = self.data.as_deref_mut().ok_or(ArrayError::Uninitialized)?;
        if values.len() < data.len() {
            return Err(ArrayError::LengthMismatch {
                op: "=",
                left: data.len(),
                right: values.len(),
            });
        }
        data.clone_from_slice(&values[..data.len()]);
        Ok(())
    }

    pub fn negate(&mut self)
    where
        T: std::ops::Neg<Output = T>,
    {
        for x in self.as_mut_slice() {
            *x = -x.clone();
        }
    }
}

fn allocate<T: Default>(len: usize) -> Result<Box<[T]>, ArrayError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ArrayError::Allocation(len))?;
    buf.resize_with(len, T::default);
    Ok(buf.into_boxed_slice())
}

// =============================================================================
// Compound assignment
// =============================================================================

macro_rules! compound_assign {
    ($($try_fn:ident, $trait:ident, $method:ident, $op:literal;)*) => {$(
        impl<T: Clone + $trait> TypedArray<T> {
            #[doc = concat!("Element-wise `", $op, "`; fails without touching `self` when the lengths differ.")]
            pub fn $try_fn(&mut self, rhs: &TypedArray<T>) -> Result<(), ArrayError> {
                ArrayError::check_len($op, self.len(), rhs.len())?;
                for (x, y) in self.as_mut_slice().iter_mut().zip(rhs.iter()) {
                    x.$method(y.clone());
                }
                Ok(())
            }
        }

        /// Broadcast the scalar to every element
        impl<T: Clone + $trait> $trait<T> for TypedArray<T> {
            fn $method(&mut self, rhs: T) {
                for x in self.as_mut_slice() {
                    x.$method(rhs.clone());
                }
            }
        }
    )*};
}

compound_assign! {
    try_add_assign, AddAssign, add_assign, "+=";
    try_sub_assign, SubAssign, sub_assign, "-=";
    try_mul_assign, MulAssign, mul_assign, "*=";
    try_div_assign, DivAssign, div_assign, "/=";
}

// =============================================================================
// Conversions and access
// =============================================================================

impl<T> Default for TypedArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for TypedArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Clone> From<&[T]> for TypedArray<T> {
    fn from(values: &[T]) -> Self {
        Self::from_vec(values.to_vec())
    }
}

impl<T> FromIterator<T> for TypedArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a TypedArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bounds are the caller's responsibility; out-of-range access panics.
impl<T> Index<usize> for TypedArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for TypedArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: fmt::Display> fmt::Display for TypedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        Ok(())
    }
}
