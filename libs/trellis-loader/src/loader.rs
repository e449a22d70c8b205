// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Debug, hash::Hash};

use async_trait::async_trait;

/// A source of values that can be fetched many keys at a time.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the values for `keys`.
    ///
    /// The returned vector must have the same length as `keys`, with the value at index `i`
    /// belonging to `keys[i]`. Keys are distinct within one call.
    async fn load_many(&self, keys: &[Self::Key]) -> Result<Vec<Self::Value>, Self::Error>;
}
