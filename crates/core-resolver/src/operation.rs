// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use async_graphql_parser::{
    Positioned,
    types::{
        DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition,
        Selection, SelectionSet,
    },
};
use async_graphql_value::Name;
use core_model::{Schema, TypeRef};
use serde_json::{Map, Value};

use crate::{coercion::coerce_input_value, error::RequestError};

/// Pick the operation to execute.
///
/// A document with a single operation needs no `operation_name` (even if the operation itself is
/// named). Otherwise the name must match one of the operations.
pub(crate) fn select_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'a Positioned<OperationDefinition>, RequestError> {
    match &document.operations {
        DocumentOperations::Single(operation) => Ok(operation),
        DocumentOperations::Multiple(operations) => {
            if operations.is_empty() {
                return Err(RequestError::NoOperationFound);
            }

            match operation_name {
                // async-graphql parses a lone named operation into `Multiple`
                None if operations.len() == 1 => operations
                    .values()
                    .next()
                    .ok_or(RequestError::NoOperationFound),
                None => Err(RequestError::MultipleOperationsNoOperationName),
                Some(operation_name) => operations.get(operation_name).ok_or_else(|| {
                    RequestError::MultipleOperationsUnmatchedOperationName(
                        operation_name.to_string(),
                    )
                }),
            }
        }
    }
}

/// Coerce the provided variables against the operation's variable definitions, applying defaults.
/// Variables without a value or default are left out, so arguments bound to them count as absent.
pub(crate) fn coerce_variables(
    schema: &Schema,
    operation: &OperationDefinition,
    provided: &Map<String, Value>,
) -> Result<Map<String, Value>, RequestError> {
    let mut coerced = Map::new();

    for definition in &operation.variable_definitions {
        let name = definition.node.name.node.as_str();
        let ty = TypeRef::from(&definition.node.var_type.node);
        let invalid = |message: String| RequestError::InvalidVariable {
            name: name.to_string(),
            message,
            pos: definition.pos,
        };

        let value = match provided.get(name) {
            Some(value) => value.clone(),
            None => match &definition.node.default_value {
                Some(default_value) => default_value
                    .node
                    .clone()
                    .into_json()
                    .map_err(|error| invalid(error.to_string()))?,
                None if ty.is_non_null() => {
                    return Err(RequestError::VariableNotProvided(
                        name.to_string(),
                        ty.to_string(),
                        definition.pos,
                    ));
                }
                None => continue,
            },
        };

        let value = coerce_input_value(schema, &value, &ty).map_err(invalid)?;
        coerced.insert(name.to_string(), value);
    }

    Ok(coerced)
}

/// Check that no field is nested deeper than `max_depth`, counting through fragments.
pub(crate) fn check_depth(
    selection_set: &Positioned<SelectionSet>,
    fragments: &HashMap<Name, Positioned<FragmentDefinition>>,
    max_depth: usize,
) -> Result<(), RequestError> {
    DepthChecker {
        fragments,
        max_depth,
        visiting: vec![],
    }
    .check(selection_set, 1)
}

struct DepthChecker<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    max_depth: usize,
    // Fragments being expanded on the current path
    visiting: Vec<&'a str>,
}

impl<'a> DepthChecker<'a> {
    fn check(
        &mut self,
        selection_set: &'a Positioned<SelectionSet>,
        depth: usize,
    ) -> Result<(), RequestError> {
        for selection in &selection_set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    if depth > self.max_depth {
                        return Err(RequestError::SelectionSetTooDeep(
                            self.max_depth,
                            field.pos,
                        ));
                    }
                    self.check(&field.node.selection_set, depth + 1)?;
                }
                Selection::InlineFragment(fragment) => {
                    self.check(&fragment.node.selection_set, depth)?;
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    let fragment = self.fragments.get(name).ok_or_else(|| {
                        RequestError::FragmentDefinitionNotFound(name.to_string(), spread.pos)
                    })?;

                    if self.visiting.contains(&name) {
                        continue;
                    }

                    self.visiting.push(name);
                    self.check(&fragment.node.selection_set, depth)?;
                    self.visiting.pop();
                }
            }
        }

        Ok(())
    }
}
