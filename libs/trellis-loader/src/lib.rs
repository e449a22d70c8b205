// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Batched and cached loading of keyed data.
//!
//! Resolvers for sibling fields typically each need one record (the author of each book in a
//! list, say). Calling the data source once per field is the N+1 problem. A [`BatchLoader`]
//! collects the keys requested while sibling futures make progress and hands them to the
//! [`Loader::load_many`] implementation in a single call once they have all suspended.
//!
//! Loaded values are cached by key for the lifetime of the `BatchLoader`. The execution engine
//! creates fresh batch loaders for every operation from a [`LoaderRegistry`], so the cache never
//! outlives a single request.

mod batch_loader;
mod error;
mod loader;
mod registry;

pub use batch_loader::{BatchConfig, BatchLoader};
pub use error::LoaderError;
pub use loader::Loader;
pub use registry::{LoaderRegistry, Loaders};
