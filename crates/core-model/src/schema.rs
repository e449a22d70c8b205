// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::OperationType;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    error::SchemaError,
    field::FieldDefinition,
    type_definition::{InterfaceType, TypeDefinition, TypeKind, UnionType},
};

pub const QUERY_ROOT_TYPENAME: &str = "Query";
pub const MUTATION_ROOT_TYPENAME: &str = "Mutation";
pub const SUBSCRIPTION_ROOT_TYPENAME: &str = "Subscription";

/// A validated, immutable type system.
///
/// Built through [`crate::SchemaBuilder`]. Executions share it (typically behind an `Arc`) and
/// only ever read it.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: IndexMap<String, TypeDefinition>,
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
}

impl Schema {
    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn field_definition(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Result<&FieldDefinition, SchemaError> {
        let type_definition = self
            .type_definition(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;

        type_definition
            .fields()
            .and_then(|fields| fields.get(field_name))
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            })
    }

    /// Determine the concrete object type of `value`, a runtime value of the union or interface
    /// `abstract_type`.
    pub fn resolve_type(&self, value: &Value, abstract_type: &str) -> Result<&str, SchemaError> {
        let (possible_types, discriminator) = match self.type_definition(abstract_type) {
            Some(TypeDefinition {
                kind:
                    TypeKind::Union(UnionType {
                        members,
                        discriminator,
                    }),
                ..
            }) => (members, discriminator),
            Some(TypeDefinition {
                kind:
                    TypeKind::Interface(InterfaceType {
                        implementers,
                        discriminator,
                        ..
                    }),
                ..
            }) => (implementers, discriminator),
            Some(_) => return Err(SchemaError::NotAbstract(abstract_type.to_string())),
            None => return Err(SchemaError::UnknownType(abstract_type.to_string())),
        };

        let concrete_type = discriminator
            .concrete_type(value)
            .ok_or_else(|| SchemaError::UnresolvedType(abstract_type.to_string()))?;

        possible_types
            .get(&concrete_type)
            .map(String::as_str)
            .ok_or_else(|| SchemaError::AmbiguousType {
                abstract_type: abstract_type.to_string(),
                concrete_type,
            })
    }

    /// Whether `object_type` is a member (union) or implementer (interface) of `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &str, object_type: &str) -> bool {
        match self.type_definition(abstract_type).map(|td| &td.kind) {
            Some(TypeKind::Union(UnionType { members, .. })) => members.contains(object_type),
            Some(TypeKind::Interface(InterfaceType { implementers, .. })) => {
                implementers.contains(object_type)
            }
            _ => false,
        }
    }

    pub fn root_type_name(&self, operation_type: OperationType) -> Option<&str> {
        match operation_type {
            OperationType::Query => Some(self.query_type.as_str()),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn root_type(&self, operation_type: OperationType) -> Option<&TypeDefinition> {
        self.root_type_name(operation_type)
            .and_then(|name| self.type_definition(name))
    }
}
