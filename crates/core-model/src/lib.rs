// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The schema registry: an immutable type system with a resolver bound to every field.
//!
//! A [`Schema`] is built once (usually from SDL through [`SchemaBuilder`]) and then shared by
//! any number of concurrent executions. All checks that do not depend on a particular query
//! (unknown types, interface conformance, resolver targets and so on) happen at build time.

mod builder;
mod discriminator;
mod error;
mod field;
mod path;
mod resolver;
mod scalar;
mod schema;
mod type_definition;
mod types;

pub use builder::SchemaBuilder;
pub use discriminator::{
    FnDiscriminator, PropertyDiscriminator, TypeDiscriminator, TypenameDiscriminator,
    discriminator_fn,
};
pub use error::{SchemaBuildError, SchemaError};
pub use field::{FieldDefinition, InputValueDefinition};
pub use path::{PathSegment, ResponsePath};
pub use resolver::{
    Arguments, FieldResolver, FnResolver, PropertyResolver, ResolverContext, ResolverError,
    resolver_fn,
};
pub use scalar::{BuiltinScalar, CoercionError, OpaqueScalar, ScalarCoercion};
pub use schema::{MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, SUBSCRIPTION_ROOT_TYPENAME, Schema};
pub use type_definition::{
    EnumType, InputObjectType, InterfaceType, ObjectType, ScalarType, TypeDefinition, TypeKind,
    UnionType,
};
pub use types::TypeRef;
