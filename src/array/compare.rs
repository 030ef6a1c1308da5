//! Comparisons and recombination
//!
//! Ordering follows string comparison: the first differing element decides,
//! and when one array is a prefix of the other the shorter sorts first.
//! Empty arrays are never equal, not even to each other, and are unordered
//! with respect to each other.

use super::TypedArray;
use std::cmp::Ordering;

impl<T: PartialEq> PartialEq for TypedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        !self.is_empty() && self.as_slice() == other.as_slice()
    }
}

impl<T: PartialOrd> PartialOrd for TypedArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        for (a, b) in self.iter().zip(other.iter()) {
            if a != b {
                return a.partial_cmp(b);
            }
        }
        match self.len().cmp(&other.len()) {
            Ordering::Equal if self.is_empty() => None,
            ord => Some(ord),
        }
    }
}

/// The elements of `l` followed by those of `r`
pub fn concat<T: Clone>(l: &TypedArray<T>, r: &TypedArray<T>) -> TypedArray<T> {
    let mut out = Vec::with_capacity(l.len() + r.len());
    out.extend_from_slice(l.as_slice());
    out.extend_from_slice(r.as_slice());
    TypedArray::from_vec(out)
}

impl<T: Clone> TypedArray<T> {
    pub fn concat(&self, other: &TypedArray<T>) -> TypedArray<T> {
        concat(self, other)
    }
}
