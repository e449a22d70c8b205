// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use thiserror::Error;

// Every key of a failed batch receives a clone of the same error
#[derive(Error, Debug, Clone)]
pub enum LoaderError {
    #[error("Batch function returned {actual} values for {expected} keys")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    Batch(Arc<dyn std::error::Error + Send + Sync>),
}
