// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use core_model::ResponsePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::RequestError, result::ResultNode};

/// The response envelope: `{"data": ..., "errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "ResponsePath::is_empty")]
    pub path: ResponsePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Response {
    /// Assemble the envelope from a completed result tree and the errors recorded while producing
    /// it.
    pub fn assemble(data: ResultNode, errors: Vec<GraphQLError>) -> Self {
        Self {
            data: data.into_json(),
            errors,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<RequestError> for Response {
    fn from(error: RequestError) -> Self {
        Self {
            data: Value::Null,
            errors: vec![GraphQLError::new(
                error.to_string(),
                &error.positions(),
                ResponsePath::root(),
            )],
        }
    }
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, positions: &[Pos], path: ResponsePath) -> Self {
        Self {
            message: message.into(),
            locations: positions
                .iter()
                // The parser uses a zero position when it has no location to report
                .filter(|pos| pos.line > 0)
                .map(|pos| Location::from(*pos))
                .collect(),
            path,
        }
    }
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}
