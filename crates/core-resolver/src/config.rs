// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use common::env_const::{
    DEFAULT_MAX_QUERY_DEPTH, DEFAULT_TIMEOUT_GRACE, get_execution_timeout,
    get_loader_max_batch_size, get_max_query_depth, get_timeout_grace,
};
use trellis_env::{EnvError, Environment};
use trellis_loader::BatchConfig;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Once this much time has passed since the operation started, no new resolver is invoked.
    pub timeout: Option<Duration>,
    /// How long resolvers that started before the deadline may keep running past it.
    pub grace_period: Duration,
    pub max_depth: usize,
    /// Defaults for loaders registered without their own batch configuration.
    pub batch: BatchConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            grace_period: DEFAULT_TIMEOUT_GRACE,
            max_depth: DEFAULT_MAX_QUERY_DEPTH,
            batch: BatchConfig::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self {
            timeout: get_execution_timeout(env)?,
            grace_period: get_timeout_grace(env)?,
            max_depth: get_max_query_depth(env)?,
            batch: BatchConfig {
                max_batch_size: get_loader_max_batch_size(env)?,
                ..BatchConfig::default()
            },
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
