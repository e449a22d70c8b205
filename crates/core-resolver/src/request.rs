// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{any::Any, fmt, sync::Arc};

use async_graphql_parser::{Pos, types::ExecutableDocument};
use serde_json::{Map, Value};
use tracing::{instrument, warn};
use trellis_loader::LoaderRegistry;

use crate::error::RequestError;

/// Everything needed to execute one operation.
#[derive(Clone)]
pub struct Request {
    pub document: ExecutableDocument,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
    /// Parent value of the root fields.
    pub root_value: Value,
    /// Opaque user context, available to resolvers through [`core_model::ResolverContext::data`].
    pub context: Arc<dyn Any + Send + Sync>,
    pub loaders: LoaderRegistry,
}

impl Request {
    pub fn new(document: ExecutableDocument) -> Self {
        Self {
            document,
            operation_name: None,
            variables: Map::new(),
            root_value: Value::Object(Map::new()),
            context: Arc::new(()),
            loaders: LoaderRegistry::new(),
        }
    }

    pub fn parse(query: &str) -> Result<Self, RequestError> {
        parse_query(query).map(Self::new)
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn with_context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Arc::new(context);
        self
    }

    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .field("loaders", &self.loaders)
            .finish_non_exhaustive()
    }
}

#[instrument(name = "parse_query", skip_all)]
pub fn parse_query(query: &str) -> Result<ExecutableDocument, RequestError> {
    async_graphql_parser::parse_query(query).map_err(|error| {
        warn!(%error, "Failed to parse query");
        let (message, pos1, pos2) = match error {
            async_graphql_parser::Error::Syntax {
                message,
                start,
                end,
            } => (format!("Syntax error: {}", message.trim_end()), start, end),
            async_graphql_parser::Error::MultipleRoots { root, schema, pos } => {
                (format!("Multiple roots of {root} type"), schema, Some(pos))
            }
            async_graphql_parser::Error::MissingQueryRoot { pos } => {
                ("Missing query root".to_string(), pos, None)
            }
            async_graphql_parser::Error::MultipleOperations {
                anonymous,
                operation,
            } => (
                "Multiple operations".to_string(),
                anonymous,
                Some(operation),
            ),
            async_graphql_parser::Error::OperationDuplicated {
                operation,
                first,
                second,
            } => (
                format!("Operation {operation} duplicated"),
                first,
                Some(second),
            ),
            async_graphql_parser::Error::FragmentDuplicated {
                fragment,
                first,
                second,
            } => (
                format!("Fragment {fragment} duplicated"),
                first,
                Some(second),
            ),
            async_graphql_parser::Error::MissingOperation => {
                ("Missing operation".to_string(), Pos::default(), None)
            }
            _ => ("Unknown error".to_string(), Pos::default(), None),
        };

        RequestError::QueryParsing {
            message,
            positions: std::iter::once(pos1).chain(pos2).collect(),
        }
    })
}
