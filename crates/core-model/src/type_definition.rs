// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};

use crate::{
    discriminator::TypeDiscriminator,
    field::{FieldDefinition, InputValueDefinition},
    scalar::ScalarCoercion,
};

#[derive(Debug)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub kind: TypeKind,
}

#[derive(Debug)]
pub enum TypeKind {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

pub struct ScalarType {
    pub coercion: Arc<dyn ScalarCoercion>,
}

#[derive(Debug)]
pub struct ObjectType {
    pub fields: IndexMap<String, FieldDefinition>,
    pub implements: Vec<String>,
}

pub struct InterfaceType {
    pub fields: IndexMap<String, FieldDefinition>,
    /// Object types implementing this interface, computed when the schema is built
    pub implementers: IndexSet<String>,
    pub discriminator: Arc<dyn TypeDiscriminator>,
}

pub struct UnionType {
    pub members: IndexSet<String>,
    pub discriminator: Arc<dyn TypeDiscriminator>,
}

#[derive(Debug)]
pub struct EnumType {
    pub values: IndexSet<String>,
}

#[derive(Debug)]
pub struct InputObjectType {
    pub fields: IndexMap<String, InputValueDefinition>,
}

impl TypeDefinition {
    /// Fields of an object or interface type.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDefinition>> {
        match &self.kind {
            TypeKind::Object(ObjectType { fields, .. })
            | TypeKind::Interface(InterfaceType { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    pub fn is_input_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Scalar(_) | TypeKind::Enum(_) | TypeKind::InputObject(_)
        )
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self.kind, TypeKind::InputObject(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Interface(_) | TypeKind::Union(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeKind::Scalar(_) => "scalar",
            TypeKind::Object(_) => "object",
            TypeKind::Interface(_) => "interface",
            TypeKind::Union(_) => "union",
            TypeKind::Enum(_) => "enum",
            TypeKind::InputObject(_) => "input object",
        }
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType").finish_non_exhaustive()
    }
}

impl fmt::Debug for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceType")
            .field("fields", &self.fields)
            .field("implementers", &self.implementers)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionType")
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
