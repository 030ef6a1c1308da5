//! Parallel extraction
//!
//! Uses Rayon to evaluate several array requests against one shared tree.
//! The reader's share covers every worker; no extra shares are taken.

use super::reader::{ArrayRequest, DocumentReader};
use crate::array::TypedArray;
use crate::error::QueryError;
use rayon::prelude::*;
use std::str::FromStr;

/// Evaluate every request, one result per request in input order
pub fn extract_parallel<T>(
    reader: &DocumentReader,
    requests: &[ArrayRequest],
) -> Vec<Result<TypedArray<T>, QueryError>>
where
    T: FromStr + Default + Send,
{
    requests
        .par_iter()
        .map(|request| reader.extract(request))
        .collect()
}

/// Keyed arrays for every request, or the first failure
pub fn extract_map<T>(
    reader: &DocumentReader,
    requests: &[ArrayRequest],
) -> Result<Vec<(String, TypedArray<T>)>, QueryError>
where
    T: FromStr + Default + Send,
{
    requests
        .par_iter()
        .map(|request| reader.extract(request).map(|values| (request.key.clone(), values)))
        .collect()
}
