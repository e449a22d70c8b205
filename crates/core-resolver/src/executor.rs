// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_graphql_parser::types::OperationType;
use core_model::{ResponsePath, Schema};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::{
    config::ExecutorConfig,
    context::ExecutionContext,
    error::RequestError,
    operation::{check_depth, coerce_variables, select_operation},
    request::Request,
    response::Response,
    result::{NullCause, ResultNode},
};

/// Executes requests against one schema.
#[derive(Debug, Clone)]
pub struct Executor {
    schema: Arc<Schema>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_config(schema, ExecutorConfig::default())
    }

    pub fn with_config(schema: Arc<Schema>, config: ExecutorConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn execute(&self, request: &Request) -> Response {
        execute_operation(&self.schema, request, &self.config).await
    }

    /// Execute the request's subscription operation for one event, with the event as the root
    /// value. Produces one response per event.
    pub async fn execute_subscription_event(&self, request: &Request, event: &Value) -> Response {
        execute(&self.schema, request, Some(event), &self.config).await
    }
}

/// Execute the operation of `request`. Never fails: request-level errors produce a response with
/// null `data`, field-level errors a partial one.
pub async fn execute_operation(
    schema: &Schema,
    request: &Request,
    config: &ExecutorConfig,
) -> Response {
    execute(schema, request, None, config).await
}

#[instrument(
    name = "execute_operation",
    skip_all,
    fields(operation_name = ?request.operation_name)
)]
async fn execute(
    schema: &Schema,
    request: &Request,
    subscription_event: Option<&Value>,
    config: &ExecutorConfig,
) -> Response {
    match try_execute(schema, request, subscription_event, config).await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "Request could not be executed");
            Response::from(error)
        }
    }
}

async fn try_execute(
    schema: &Schema,
    request: &Request,
    subscription_event: Option<&Value>,
    config: &ExecutorConfig,
) -> Result<Response, RequestError> {
    let operation = select_operation(&request.document, request.operation_name.as_deref())?;
    let operation_type = operation.node.ty;

    if subscription_event.is_some() && operation_type != OperationType::Subscription {
        return Err(RequestError::NotASubscription(operation.pos));
    }

    let root_type = schema
        .root_type_name(operation_type)
        .ok_or(RequestError::UnsupportedOperation(operation_type, operation.pos))?;

    let variables = coerce_variables(schema, &operation.node, &request.variables)?;
    check_depth(
        &operation.node.selection_set,
        &request.document.fragments,
        config.max_depth,
    )?;

    let ctx = ExecutionContext::new(
        schema,
        &request.document.fragments,
        variables,
        request.context.as_ref(),
        request.loaders.instantiate(&config.batch),
        config.timeout.map(|timeout| Instant::now() + timeout),
        config.grace_period,
    );

    let root_value = subscription_event.unwrap_or(&request.root_value);
    let data = ctx
        .execute_selection_set(
            root_type,
            root_value,
            &[&operation.node.selection_set],
            &ResponsePath::root(),
            operation_type == OperationType::Mutation,
        )
        .await
        .map(ResultNode::Object)
        .unwrap_or(ResultNode::Null(NullCause::Error));

    let errors = ctx.into_errors();
    debug!(error_count = errors.len(), "Operation executed");

    Ok(Response::assemble(data, errors))
}
