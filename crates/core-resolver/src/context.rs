// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    any::Any,
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_graphql_parser::{Pos, Positioned, types::FragmentDefinition};
use async_graphql_value::Name;
use core_model::{ResponsePath, Schema};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::warn;
use trellis_loader::Loaders;

use crate::{error::ExecutionError, response::GraphQLError};

/// State shared by every field of one operation execution.
pub(crate) struct ExecutionContext<'a> {
    pub schema: &'a Schema,
    pub fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    /// Coerced variable values.
    pub variables: Map<String, Value>,
    pub user_context: &'a (dyn Any + Send + Sync),
    pub loaders: Loaders,
    pub deadline: Option<Instant>,
    pub grace_period: Duration,
    errors: Mutex<Vec<GraphQLError>>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        schema: &'a Schema,
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        variables: Map<String, Value>,
        user_context: &'a (dyn Any + Send + Sync),
        loaders: Loaders,
        deadline: Option<Instant>,
        grace_period: Duration,
    ) -> Self {
        Self {
            schema,
            fragments,
            variables,
            user_context,
            loaders,
            deadline,
            grace_period,
            errors: Mutex::new(vec![]),
        }
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Latest instant at which an in-flight resolver may still deliver its value.
    pub fn hard_deadline(&self) -> Option<Instant> {
        self.deadline.map(|deadline| deadline + self.grace_period)
    }

    pub fn record_error(&self, error: ExecutionError, path: &ResponsePath, pos: Pos) {
        warn!(%error, %path, "Field execution failed");

        let error = GraphQLError::new(error.user_error_message(), &[pos], path.clone());
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    pub fn into_errors(self) -> Vec<GraphQLError> {
        self.errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
