// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::{
    Positioned,
    types::{Field, SelectionSet},
};
use async_recursion::async_recursion;
use core_model::{
    EnumType, FieldDefinition, ResolverContext, ResponsePath, ScalarType, SchemaError, TypeKind,
    TypeRef,
};
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    coercion::coerce_arguments,
    context::ExecutionContext,
    error::ExecutionError,
    result::{NullCause, ResultNode},
    selection::collect_fields,
};

/// A null reached a non-null position and must be propagated to the nearest nullable ancestor.
/// The error that caused it has already been recorded.
#[derive(Debug)]
pub(crate) struct NonNullViolation;

type Completion = Result<ResultNode, NonNullViolation>;

impl<'a> ExecutionContext<'a> {
    /// Execute the fields selected on `object_type` against `parent_value`.
    ///
    /// With `serial` set (top-level mutation fields) each field is resolved and completed before
    /// the next one starts. Otherwise the fields run concurrently and are joined before returning.
    /// Every field runs to completion even if a sibling violates non-nullability.
    pub(crate) async fn execute_selection_set(
        &self,
        object_type: &str,
        parent_value: &Value,
        selection_sets: &[&'a Positioned<SelectionSet>],
        path: &ResponsePath,
        serial: bool,
    ) -> Result<IndexMap<String, ResultNode>, NonNullViolation> {
        let collected = collect_fields(self, object_type, selection_sets);

        let completions: Vec<Completion> = if serial {
            let mut completions = Vec::with_capacity(collected.len());
            for (response_key, fields) in &collected {
                completions.push(
                    self.execute_field(object_type, parent_value, response_key, fields, path)
                        .await,
                );
            }
            completions
        } else {
            join_all(collected.iter().map(|(response_key, fields)| {
                self.execute_field(object_type, parent_value, response_key, fields, path)
            }))
            .await
        };

        collected
            .keys()
            .zip(completions)
            .map(|(response_key, completion)| Ok((response_key.to_string(), completion?)))
            .collect()
    }

    async fn execute_field(
        &self,
        object_type: &str,
        parent_value: &Value,
        response_key: &str,
        fields: &[&'a Positioned<Field>],
        path: &ResponsePath,
    ) -> Completion {
        let path = path.with_key(response_key);
        // Fields sharing a response key have the same name and arguments
        let field = fields[0];

        match field.node.name.node.as_str() {
            "__typename" => return Ok(ResultNode::Scalar(Value::from(object_type))),
            "__schema" | "__type" => {
                self.record_error(ExecutionError::IntrospectionNotSupported, &path, field.pos);
                return Ok(ResultNode::Null(NullCause::Error));
            }
            _ => {}
        }

        let field_definition = match self
            .schema
            .field_definition(object_type, &field.node.name.node)
        {
            Ok(field_definition) => field_definition,
            Err(error) => {
                self.record_error(error.into(), &path, field.pos);
                return Ok(ResultNode::Null(NullCause::Error));
            }
        };

        match self
            .resolve_field(object_type, field_definition, field, parent_value, &path)
            .await
        {
            Ok(value) => {
                self.complete_value(
                    &field_definition.ty,
                    object_type,
                    fields,
                    value,
                    &path,
                )
                .await
            }
            Err(error) => {
                self.record_error(error, &path, field.pos);
                if field_definition.ty.is_non_null() {
                    Err(NonNullViolation)
                } else {
                    Ok(ResultNode::Null(NullCause::Error))
                }
            }
        }
    }

    /// Invoke the field's resolver.
    ///
    /// Past the deadline no resolver is started. A resolver that started in time may run until the
    /// deadline plus the grace period, after which its future is dropped.
    async fn resolve_field(
        &self,
        object_type: &str,
        field_definition: &FieldDefinition,
        field: &Positioned<Field>,
        parent_value: &Value,
        path: &ResponsePath,
    ) -> Result<Value, ExecutionError> {
        if self.deadline_passed() {
            return Err(ExecutionError::Timeout);
        }

        let arguments =
            coerce_arguments(self.schema, field_definition, &field.node, &self.variables)?;
        let context = ResolverContext::new(
            object_type,
            &field_definition.name,
            path,
            self.user_context,
            &self.loaders,
        );

        let resolution = field_definition
            .resolver
            .resolve(parent_value, &arguments, &context);

        let value = match self.hard_deadline() {
            Some(hard_deadline) => tokio::time::timeout_at(hard_deadline, resolution)
                .await
                .map_err(|_| ExecutionError::Timeout)?,
            None => resolution.await,
        }?;

        Ok(value)
    }

    /// Shape a resolved value according to `ty`.
    ///
    /// Completing a nullable type never fails: errors below it turn it into null. A null (of either
    /// cause) in a non-null position is a [`NonNullViolation`] for the caller to propagate.
    #[async_recursion]
    async fn complete_value(
        &self,
        ty: &TypeRef,
        parent_type: &str,
        fields: &[&'a Positioned<Field>],
        value: Value,
        path: &ResponsePath,
    ) -> Completion {
        let field = fields[0];

        match ty {
            TypeRef::NonNull(inner) => {
                match self
                    .complete_value(inner, parent_type, fields, value, path)
                    .await?
                {
                    ResultNode::Null(NullCause::Value) => {
                        self.record_error(
                            ExecutionError::NonNullSafety {
                                type_name: parent_type.to_string(),
                                field_name: field.node.name.node.to_string(),
                            },
                            path,
                            field.pos,
                        );
                        Err(NonNullViolation)
                    }
                    ResultNode::Null(NullCause::Error) => Err(NonNullViolation),
                    completed => Ok(completed),
                }
            }
            _ if value.is_null() => Ok(ResultNode::Null(NullCause::Value)),
            TypeRef::List(inner) => {
                let Value::Array(elements) = value else {
                    self.record_error(
                        ExecutionError::ListCoercion {
                            expected: ty.to_string(),
                            actual: value_kind(&value).to_string(),
                        },
                        path,
                        field.pos,
                    );
                    return Ok(ResultNode::Null(NullCause::Error));
                };

                let completions = join_all(elements.into_iter().enumerate().map(
                    |(index, element)| async move {
                        let path = path.with_index(index);
                        self.complete_value(inner, parent_type, fields, element, &path)
                            .await
                    },
                ))
                .await;

                Ok(completions
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()
                    .map(ResultNode::List)
                    .unwrap_or(ResultNode::Null(NullCause::Error)))
            }
            TypeRef::Named(type_name) => {
                self.complete_named(type_name, fields, value, path).await
            }
        }
    }

    async fn complete_named(
        &self,
        type_name: &str,
        fields: &[&'a Positioned<Field>],
        value: Value,
        path: &ResponsePath,
    ) -> Completion {
        let field = fields[0];
        let fail = |error: ExecutionError| -> Completion {
            self.record_error(error, path, field.pos);
            Ok(ResultNode::Null(NullCause::Error))
        };

        let Some(type_definition) = self.schema.type_definition(type_name) else {
            return fail(SchemaError::UnknownType(type_name.to_string()).into());
        };

        let object_type = match &type_definition.kind {
            TypeKind::Scalar(ScalarType { coercion }) => {
                return match coercion.serialize(&value) {
                    Ok(serialized) => Ok(ResultNode::Scalar(serialized)),
                    Err(error) => fail(ExecutionError::ScalarSerialization(error.0)),
                };
            }
            TypeKind::Enum(EnumType { values }) => {
                let is_member = matches!(&value, Value::String(name) if values.contains(name));
                return if is_member {
                    Ok(ResultNode::Scalar(value))
                } else {
                    fail(ExecutionError::ScalarSerialization(format!(
                        "Enum '{type_name}' cannot represent value: {value}"
                    )))
                };
            }
            TypeKind::Object(_) => type_name,
            TypeKind::Interface(_) | TypeKind::Union(_) => {
                match self.schema.resolve_type(&value, type_name) {
                    Ok(concrete_type) => concrete_type,
                    Err(error) => return fail(error.into()),
                }
            }
            TypeKind::InputObject(_) => {
                return fail(ExecutionError::ScalarSerialization(format!(
                    "Input type '{type_name}' cannot be used as a field type"
                )));
            }
        };

        let selection_sets: Vec<_> = fields
            .iter()
            .copied()
            .map(|field| &field.node.selection_set)
            .collect();

        Ok(self
            .execute_selection_set(object_type, &value, &selection_sets, path, false)
            .await
            .map(ResultNode::Object)
            .unwrap_or(ResultNode::Null(NullCause::Error)))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
