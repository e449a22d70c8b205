// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::any::{Any, type_name};

use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use trellis_loader::{BatchLoader, Loader, LoaderError, Loaders};

use crate::path::ResponsePath;

/// Produces the value of a field from its parent's value.
///
/// Resolvers are bound to fields when the schema is built; a field without an explicit resolver
/// gets a [`PropertyResolver`] reading the same-named key of its parent.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Arguments,
        context: &ResolverContext<'_>,
    ) -> Result<Value, ResolverError>;
}

/// Reads a property of an object parent. Missing properties (and non-object parents) resolve to
/// null.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    property: String,
}

impl PropertyResolver {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

#[async_trait]
impl FieldResolver for PropertyResolver {
    async fn resolve(
        &self,
        parent: &Value,
        _arguments: &Arguments,
        _context: &ResolverContext<'_>,
    ) -> Result<Value, ResolverError> {
        Ok(parent.get(&self.property).cloned().unwrap_or(Value::Null))
    }
}

pub struct FnResolver<F>(F);

/// Adapt a closure returning a boxed future into a [`FieldResolver`].
///
/// ```ignore
/// resolver_fn(|parent, arguments, context| {
///     async move { Ok::<_, ResolverError>(json!(arguments.require::<i64>("id")?)) }.boxed()
/// })
/// ```
pub fn resolver_fn<F>(f: F) -> FnResolver<F>
where
    F: for<'r> Fn(
            &'r Value,
            &'r Arguments,
            &'r ResolverContext<'r>,
        ) -> BoxFuture<'r, Result<Value, ResolverError>>
        + Send
        + Sync,
{
    FnResolver(f)
}

#[async_trait]
impl<F> FieldResolver for FnResolver<F>
where
    F: for<'r> Fn(
            &'r Value,
            &'r Arguments,
            &'r ResolverContext<'r>,
        ) -> BoxFuture<'r, Result<Value, ResolverError>>
        + Send
        + Sync,
{
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Arguments,
        context: &ResolverContext<'_>,
    ) -> Result<Value, ResolverError> {
        (self.0)(parent, arguments, context).await
    }
}

/// What a resolver knows about the field being resolved, plus access to per-request state.
pub struct ResolverContext<'a> {
    pub parent_type: &'a str,
    pub field_name: &'a str,
    pub path: &'a ResponsePath,
    data: &'a (dyn Any + Send + Sync),
    loaders: &'a Loaders,
}

impl<'a> ResolverContext<'a> {
    pub fn new(
        parent_type: &'a str,
        field_name: &'a str,
        path: &'a ResponsePath,
        data: &'a (dyn Any + Send + Sync),
        loaders: &'a Loaders,
    ) -> Self {
        Self {
            parent_type,
            field_name,
            path,
            data,
            loaders,
        }
    }

    /// The request's user context, if it is a `T`.
    pub fn data<T: Any>(&self) -> Option<&'a T> {
        self.data.downcast_ref()
    }

    /// The operation's batch loader for `L`.
    pub fn loader<L: Loader>(&self) -> Result<&'a BatchLoader<L>, ResolverError> {
        self.loaders
            .get::<L>()
            .ok_or(ResolverError::MissingLoader(type_name::<L>()))
    }
}

/// Coerced arguments of a field, in declaration order. Arguments that were neither supplied nor
/// defaulted are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize an optional argument. Absent and null arguments are `None`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ResolverError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ResolverError::InvalidArgument(name.to_string(), e.to_string())),
        }
    }

    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T, ResolverError> {
        self.get_as(name)?.ok_or_else(|| {
            ResolverError::InvalidArgument(name.to_string(), "value is required".to_string())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Error, Debug)]
pub enum ResolverError {
    /// A message meant for the client.
    #[error("{0}")]
    User(String),

    #[error("Invalid argument '{0}': {1}")]
    InvalidArgument(String, String),

    #[error("{0}")]
    Loader(#[from] LoaderError),

    #[error("No batch loader registered for {0}")]
    MissingLoader(&'static str),

    #[error("{0}")]
    Delegate(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ResolverError {
    pub fn user(message: impl Into<String>) -> Self {
        ResolverError::User(message.into())
    }

    // Message that should be emitted when the error is returned to the user.
    // This should hide any internal details of the error.
    pub fn user_error_message(&self) -> String {
        self.explicit_message()
            .unwrap_or_else(|| "Internal server error".to_string())
    }

    pub fn explicit_message(&self) -> Option<String> {
        match self {
            ResolverError::User(_) | ResolverError::InvalidArgument(..) => Some(self.to_string()),
            ResolverError::Loader(LoaderError::BatchSizeMismatch { .. }) => Some(self.to_string()),
            ResolverError::Delegate(error) => error
                .downcast_ref::<ResolverError>()
                .and_then(|error| error.explicit_message()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use serde_json::json;

    use super::*;

    fn context<'a>(path: &'a ResponsePath, loaders: &'a Loaders) -> ResolverContext<'a> {
        ResolverContext::new("Query", "book", path, &"reader", loaders)
    }

    #[tokio::test]
    async fn property_resolver_reads_parent_key() {
        let path = ResponsePath::root();
        let loaders = Loaders::default();
        let context = context(&path, &loaders);
        let resolver = PropertyResolver::new("title");

        let title = resolver
            .resolve(&json!({"title": "Dune"}), &Arguments::new(), &context)
            .await
            .unwrap();
        assert_eq!(title, json!("Dune"));

        let missing = resolver
            .resolve(&json!([1, 2]), &Arguments::new(), &context)
            .await
            .unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[tokio::test]
    async fn closure_resolver_sees_arguments_and_context() {
        let path = ResponsePath::root().with_key("book");
        let loaders = Loaders::default();
        let context = context(&path, &loaders);

        let resolver = resolver_fn(|_parent, arguments, context| {
            async move {
                let id: i64 = arguments.require("id")?;
                let reader = context.data::<&str>().copied().unwrap_or_default();
                Ok::<_, ResolverError>(json!(format!("{reader}:{id}@{}", context.path)))
            }
            .boxed()
        });

        let arguments = Arguments::from_iter([("id".to_string(), json!(3))]);
        let value = resolver
            .resolve(&Value::Null, &arguments, &context)
            .await
            .unwrap();
        assert_eq!(value, json!("reader:3@book"));

        let error = resolver
            .resolve(&Value::Null, &Arguments::new(), &context)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Invalid argument 'id': value is required");
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let user = ResolverError::user("Book is checked out");
        assert_eq!(user.user_error_message(), "Book is checked out");

        let internal = ResolverError::Delegate(Box::new(std::io::Error::other("disk on fire")));
        assert_eq!(internal.user_error_message(), "Internal server error");

        let missing = ResolverError::MissingLoader("AuthorLoader");
        assert_eq!(missing.user_error_message(), "Internal server error");
    }

    #[test]
    fn typed_argument_access() {
        let arguments = Arguments::from_iter([
            ("limit".to_string(), json!(5)),
            ("after".to_string(), Value::Null),
        ]);

        assert_eq!(arguments.get_as::<u32>("limit").unwrap(), Some(5));
        assert_eq!(arguments.get_as::<String>("after").unwrap(), None);
        assert!(arguments.get_as::<String>("limit").is_err());
    }
}
