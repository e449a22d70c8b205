// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use async_graphql_parser::types::{BaseType, Type};

/// Reference to a type in a field, argument or variable position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Wrap in `NonNull`. Wrapping a type that is already non-null returns it unchanged.
    pub fn non_null(inner: TypeRef) -> Self {
        match inner {
            non_null @ TypeRef::NonNull(_) => non_null,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    /// Parse a type reference such as `[Book!]!`.
    pub fn parse(ty: &str) -> Option<Self> {
        Type::new(ty).map(|ty| Self::from(&ty))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// The type with any outer `NonNull` removed.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    /// The named type at the core of any list/non-null wrapping.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => TypeRef::Named(name.to_string()),
            BaseType::List(inner) => TypeRef::list(inner.as_ref().into()),
        };

        if ty.nullable {
            base
        } else {
            TypeRef::non_null(base)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_parser_types() {
        let ty = TypeRef::parse("[Book!]!").unwrap();

        assert_eq!(
            ty,
            TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("Book"))))
        );
        assert_eq!(ty.named_type(), "Book");
        assert_eq!(ty.to_string(), "[Book!]!");
    }

    #[test]
    fn non_null_is_idempotent() {
        let once = TypeRef::non_null(TypeRef::named("Int"));
        let twice = TypeRef::non_null(once.clone());

        assert_eq!(once, twice);
        assert_eq!(twice.nullable(), &TypeRef::named("Int"));
    }
}
