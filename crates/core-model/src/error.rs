// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

/// Lookup failures against a built schema. Executions of validated queries should only ever see
/// the abstract type errors, which depend on runtime values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Type '{0}' is not defined")]
    UnknownType(String),

    #[error("Field '{field_name}' is not defined on type '{type_name}'")]
    UnknownField {
        type_name: String,
        field_name: String,
    },

    #[error("Type '{0}' is not a union or interface")]
    NotAbstract(String),

    #[error("Could not determine the concrete type of a value of abstract type '{0}'")]
    UnresolvedType(String),

    #[error("Abstract type '{abstract_type}' resolved to '{concrete_type}', which is not a possible type")]
    AmbiguousType {
        abstract_type: String,
        concrete_type: String,
    },
}

#[derive(Error, Debug)]
pub enum SchemaBuildError {
    #[error("Could not parse schema: {0}")]
    Parse(#[from] async_graphql_parser::Error),

    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Field '{field_name}' is defined more than once on '{type_name}'")]
    DuplicateField {
        type_name: String,
        field_name: String,
    },

    #[error("Type '{name}' referenced by '{referenced_by}' is not defined")]
    UnknownType { name: String, referenced_by: String },

    #[error("Cannot extend '{name}': {reason}")]
    InvalidExtension { name: String, reason: String },

    #[error("'{referenced_by}' must have an output type, but '{type_name}' is an input object")]
    NotAnOutputType {
        type_name: String,
        referenced_by: String,
    },

    #[error("'{referenced_by}' must have an input type, but '{type_name}' is not one")]
    NotAnInputType {
        type_name: String,
        referenced_by: String,
    },

    #[error("Union '{union_type}' includes '{member}', which is not an object type")]
    InvalidUnionMember { union_type: String, member: String },

    #[error("'{object_type}' implements '{interface}', which is not an interface")]
    NotAnInterface {
        object_type: String,
        interface: String,
    },

    #[error("'{object_type}' does not correctly implement '{interface}': {reason}")]
    InterfaceNotSatisfied {
        object_type: String,
        interface: String,
        reason: String,
    },

    #[error("Root type '{0}' for queries is not defined")]
    MissingQueryRoot(String),

    #[error("Root type '{type_name}' for {operation} operations must be an object type")]
    InvalidRootType { operation: String, type_name: String },

    #[error("Resolver registered for '{type_name}.{field_name}', which is not a field of an object type")]
    UnknownResolverTarget {
        type_name: String,
        field_name: String,
    },

    #[error("Discriminator registered for '{0}', which is not a union or interface")]
    InvalidDiscriminatorTarget(String),

    #[error("Scalar coercion registered for '{0}', which is not a scalar")]
    InvalidScalarTarget(String),

    #[error("Invalid default value for '{referenced_by}': {message}")]
    InvalidDefaultValue {
        referenced_by: String,
        message: String,
    },

    #[error("Input types form a cycle of required fields: {}", .0.join(" -> "))]
    UnsatisfiableInputCycle(Vec<String>),
}
