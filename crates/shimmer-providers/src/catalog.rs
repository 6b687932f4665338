// ABOUTME: Closed per-shim catalogs of supported data types and their native stream identifiers
// ABOUTME: Case-insensitive, trimmed key resolution that rejects unknown keys instead of defaulting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use shimmer_core::errors::{ShimError, ShimResult};

/// A data type supported by one shim
///
/// Implemented by a closed enum per provider; `ALL` lists every variant in
/// catalog order.
pub trait ShimDataType: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every supported data type, in catalog order
    const ALL: &'static [Self];

    /// Caller-facing key in upper snake case (e.g. `STEP_COUNT`)
    fn key(self) -> &'static str;

    /// Provider-native stream identifier queried for this data type
    fn stream_id(self) -> &'static str;

    /// Name attached to normalized data points (e.g. `step_count`)
    fn normalized_name(self) -> String {
        self.key().to_ascii_lowercase()
    }
}

/// Static catalog for one shim's data types
#[derive(Debug, Clone, Copy)]
pub struct DataTypeCatalog<T: ShimDataType> {
    provider: &'static str,
    marker: PhantomData<T>,
}

impl<T: ShimDataType> DataTypeCatalog<T> {
    /// Catalog for `provider`
    #[must_use]
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            marker: PhantomData,
        }
    }

    /// Resolve a caller-supplied key (trimmed, case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataTypeKey` carrying the offending value when the key is
    /// absent, blank, or not in the catalog
    pub fn resolve(&self, key: Option<&str>) -> ShimResult<T> {
        let trimmed = key.map(str::trim).filter(|k| !k.is_empty());
        trimmed
            .and_then(|wanted| {
                T::ALL
                    .iter()
                    .copied()
                    .find(|data_type| data_type.key().eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ShimError::invalid_data_type(self.provider, key))
    }

    /// Stream identifier for `key`
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataTypeKey` if `key` is not in the catalog
    pub fn stream_id(&self, key: &str) -> ShimResult<&'static str> {
        self.resolve(Some(key)).map(T::stream_id)
    }

    /// Every supported key, in catalog order
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        T::ALL.iter().map(|data_type| data_type.key()).collect()
    }

    /// Every supported data type
    #[must_use]
    pub const fn data_types(&self) -> &'static [T] {
        T::ALL
    }
}
