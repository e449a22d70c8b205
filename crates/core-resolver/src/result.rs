// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Why a cell of the result is null. Both serialize as `null`; only an error-induced null may
/// have to propagate to the nearest nullable ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullCause {
    Value,
    Error,
}

/// The completed result tree, mirroring the shape of the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultNode {
    Null(NullCause),
    Scalar(Value),
    List(Vec<ResultNode>),
    Object(IndexMap<String, ResultNode>),
}

impl ResultNode {
    pub fn into_json(self) -> Value {
        match self {
            ResultNode::Null(_) => Value::Null,
            ResultNode::Scalar(value) => value,
            ResultNode::List(items) => {
                Value::Array(items.into_iter().map(ResultNode::into_json).collect())
            }
            ResultNode::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, node)| (key, node.into_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}
