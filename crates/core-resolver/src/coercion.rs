// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::Field;
use async_graphql_value::Value as AstValue;
use core_model::{
    Arguments, EnumType, FieldDefinition, InputObjectType, ScalarType, Schema, TypeKind, TypeRef,
};
use serde_json::{Map, Value};

use crate::error::ExecutionError;

/// Coerce an input value (an argument or a variable) to `ty`. The error is a message describing
/// the first mismatch.
pub(crate) fn coerce_input_value(
    schema: &Schema,
    value: &Value,
    ty: &TypeRef,
) -> Result<Value, String> {
    match ty {
        TypeRef::NonNull(inner) => match value {
            Value::Null => Err(format!("Expected a non-null value of type '{ty}'")),
            value => coerce_input_value(schema, value, inner),
        },
        _ if value.is_null() => Ok(Value::Null),
        TypeRef::List(inner) => match value {
            Value::Array(elements) => elements
                .iter()
                .map(|element| coerce_input_value(schema, element, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            // A single value stands for a list of one
            value => Ok(Value::Array(vec![coerce_input_value(schema, value, inner)?])),
        },
        TypeRef::Named(type_name) => {
            let type_definition = schema
                .type_definition(type_name)
                .ok_or_else(|| format!("Unknown type '{type_name}'"))?;

            match &type_definition.kind {
                TypeKind::Scalar(ScalarType { coercion }) => {
                    coercion.parse(value).map_err(|error| error.to_string())
                }
                TypeKind::Enum(EnumType { values }) => match value {
                    Value::String(name) if values.contains(name) => Ok(value.clone()),
                    _ => Err(format!(
                        "Value {value} is not a member of enum '{type_name}'"
                    )),
                },
                TypeKind::InputObject(input_object) => {
                    coerce_input_object(schema, value, type_name, input_object)
                }
                _ => Err(format!("Type '{type_name}' is not an input type")),
            }
        }
    }
}

fn coerce_input_object(
    schema: &Schema,
    value: &Value,
    type_name: &str,
    input_object: &InputObjectType,
) -> Result<Value, String> {
    let Value::Object(provided) = value else {
        return Err(format!("Expected an object of type '{type_name}', got {value}"));
    };

    if let Some(unknown) = provided
        .keys()
        .find(|key| !input_object.fields.contains_key(key.as_str()))
    {
        return Err(format!(
            "Field '{unknown}' is not defined by type '{type_name}'"
        ));
    }

    let mut coerced = Map::new();
    for (name, field) in &input_object.fields {
        match provided.get(name) {
            Some(value) => {
                let value = coerce_input_value(schema, value, &field.ty)
                    .map_err(|message| format!("{type_name}.{name}: {message}"))?;
                coerced.insert(name.clone(), value);
            }
            None => match &field.default_value {
                Some(default_value) => {
                    coerced.insert(name.clone(), default_value.clone());
                }
                None if field.ty.is_non_null() => {
                    return Err(format!(
                        "Field '{type_name}.{name}' of required type '{}' was not provided",
                        field.ty
                    ));
                }
                None => {}
            },
        }
    }

    Ok(Value::Object(coerced))
}

/// Convert an argument literal, substituting variables. Object fields bound to an absent variable
/// are left out so that their defaults apply.
pub(crate) fn literal_to_json(value: &AstValue, variables: &Map<String, Value>) -> Value {
    match value {
        AstValue::Variable(name) => variables.get(name.as_str()).cloned().unwrap_or(Value::Null),
        AstValue::Null => Value::Null,
        AstValue::Number(number) => Value::Number(number.clone()),
        AstValue::String(string) => Value::String(string.clone()),
        AstValue::Boolean(boolean) => Value::Bool(*boolean),
        AstValue::Binary(bytes) => Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()),
        AstValue::Enum(name) => Value::String(name.to_string()),
        AstValue::List(elements) => Value::Array(
            elements
                .iter()
                .map(|element| literal_to_json(element, variables))
                .collect(),
        ),
        AstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(_, value)| match value {
                    AstValue::Variable(name) => variables.contains_key(name.as_str()),
                    _ => true,
                })
                .map(|(name, value)| (name.to_string(), literal_to_json(value, variables)))
                .collect(),
        ),
    }
}

/// Coerce the arguments of `field` against their definitions in `field_definition`.
pub(crate) fn coerce_arguments(
    schema: &Schema,
    field_definition: &FieldDefinition,
    field: &Field,
    variables: &Map<String, Value>,
) -> Result<Arguments, ExecutionError> {
    let argument_error = |argument: &str, message: String| ExecutionError::ArgumentCoercion {
        argument: argument.to_string(),
        message,
    };

    if let Some((unknown, _)) = field
        .arguments
        .iter()
        .find(|(name, _)| !field_definition.arguments.contains_key(name.node.as_str()))
    {
        return Err(argument_error(
            unknown.node.as_str(),
            format!(
                "Field '{}' has no argument named '{}'",
                field_definition.name, unknown.node
            ),
        ));
    }

    let mut arguments = Arguments::new();

    for (name, definition) in &field_definition.arguments {
        let provided = field
            .get_argument(name)
            .and_then(|value| match &value.node {
                // Variables were coerced against their own declared type already
                AstValue::Variable(variable) => variables
                    .get(variable.as_str())
                    .cloned()
                    .map(|value| (value, true)),
                literal => Some((literal_to_json(literal, variables), false)),
            });

        match provided {
            Some((value, true)) => {
                if value.is_null() && definition.ty.is_non_null() {
                    return Err(argument_error(
                        name,
                        format!("Expected a non-null value of type '{}'", definition.ty),
                    ));
                }
                arguments.insert(name.clone(), value);
            }
            Some((value, false)) => {
                let value = coerce_input_value(schema, &value, &definition.ty)
                    .map_err(|message| argument_error(name, message))?;
                arguments.insert(name.clone(), value);
            }
            None => match &definition.default_value {
                Some(default_value) => arguments.insert(name.clone(), default_value.clone()),
                None if definition.ty.is_non_null() => {
                    return Err(argument_error(
                        name,
                        format!(
                            "Required argument of type '{}' was not provided",
                            definition.ty
                        ),
                    ));
                }
                None => {}
            },
        }
    }

    Ok(arguments)
}
