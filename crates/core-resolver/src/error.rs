// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{Pos, types::OperationType};
use core_model::{ResolverError, SchemaError};
use thiserror::Error;
use trellis_loader::LoaderError;

/// A failure while resolving or completing one field. Recorded in the response with the field's
/// path; never aborts the rest of the operation.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Argument '{argument}' is invalid: {message}")]
    ArgumentCoercion { argument: String, message: String },

    #[error("{0}")]
    ScalarSerialization(String),

    #[error("Expected a list for a field of type '{expected}', got {actual}")]
    ListCoercion { expected: String, actual: String },

    #[error("{0}")]
    AmbiguousType(#[source] SchemaError),

    #[error("{0}")]
    UnknownField(#[source] SchemaError),

    #[error("Batch function returned {actual} values for {expected} keys")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("Field resolution timed out")]
    Timeout,

    #[error("Cannot return null for non-nullable field {type_name}.{field_name}")]
    NonNullSafety {
        type_name: String,
        field_name: String,
    },

    #[error("Introspection is not supported")]
    IntrospectionNotSupported,

    #[error("{0}")]
    Resolver(#[source] ResolverError),
}

impl ExecutionError {
    // Message that should be emitted when the error is returned to the user.
    // This should hide any internal details of the error.
    pub fn user_error_message(&self) -> String {
        self.explicit_message()
            .unwrap_or_else(|| "Internal server error".to_string())
    }

    pub fn explicit_message(&self) -> Option<String> {
        match self {
            ExecutionError::Resolver(error) => error.explicit_message(),
            _ => Some(self.to_string()),
        }
    }
}

impl From<SchemaError> for ExecutionError {
    fn from(error: SchemaError) -> Self {
        match error {
            SchemaError::UnknownType(_) | SchemaError::UnknownField { .. } => {
                ExecutionError::UnknownField(error)
            }
            _ => ExecutionError::AmbiguousType(error),
        }
    }
}

impl From<ResolverError> for ExecutionError {
    fn from(error: ResolverError) -> Self {
        match error {
            ResolverError::Loader(LoaderError::BatchSizeMismatch { expected, actual }) => {
                ExecutionError::BatchSizeMismatch { expected, actual }
            }
            error => ExecutionError::Resolver(error),
        }
    }
}

/// A failure that prevents execution from starting. The response carries only this error and a
/// null `data`.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{message}")]
    QueryParsing {
        message: String,
        positions: Vec<Pos>,
    },

    #[error("No operation found")]
    NoOperationFound,

    #[error("Must provide operation name if query contains multiple operations")]
    MultipleOperationsNoOperationName,

    #[error("operationName '{0}' doesn't match any operation")]
    MultipleOperationsUnmatchedOperationName(String),

    #[error("Schema does not support {} operations", operation_kind(.0))]
    UnsupportedOperation(OperationType, Pos),

    #[error("Operation is not a subscription")]
    NotASubscription(Pos),

    #[error("Variable '${0}' of required type '{1}' was not provided")]
    VariableNotProvided(String, String, Pos),

    #[error("Variable '${name}' got an invalid value: {message}")]
    InvalidVariable {
        name: String,
        message: String,
        pos: Pos,
    },

    #[error("Fragment definition '{0}' not found")]
    FragmentDefinitionNotFound(String, Pos),

    #[error("Selection set too deep (maximum depth is {0})")]
    SelectionSetTooDeep(usize, Pos),
}

impl RequestError {
    pub fn positions(&self) -> Vec<Pos> {
        match self {
            RequestError::QueryParsing { positions, .. } => positions.clone(),
            RequestError::UnsupportedOperation(_, pos)
            | RequestError::NotASubscription(pos)
            | RequestError::VariableNotProvided(_, _, pos)
            | RequestError::InvalidVariable { pos, .. }
            | RequestError::FragmentDefinitionNotFound(_, pos)
            | RequestError::SelectionSetTooDeep(_, pos) => vec![*pos],
            RequestError::NoOperationFound
            | RequestError::MultipleOperationsNoOperationName
            | RequestError::MultipleOperationsUnmatchedOperationName(_) => vec![],
        }
    }
}

pub(crate) fn operation_kind(operation_type: &OperationType) -> &'static str {
    match operation_type {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}
