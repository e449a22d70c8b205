// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;

/// Determines which concrete object type a runtime value of a union or interface represents.
pub trait TypeDiscriminator: Send + Sync {
    fn concrete_type(&self, value: &Value) -> Option<String>;
}

/// Reads the `__typename` key of an object value. The default for abstract types without a
/// registered discriminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypenameDiscriminator;

impl TypeDiscriminator for TypenameDiscriminator {
    fn concrete_type(&self, value: &Value) -> Option<String> {
        value
            .get("__typename")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Reads a tag property (such as `kind`) of an object value.
#[derive(Debug, Clone)]
pub struct PropertyDiscriminator {
    property: String,
}

impl PropertyDiscriminator {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl TypeDiscriminator for PropertyDiscriminator {
    fn concrete_type(&self, value: &Value) -> Option<String> {
        value
            .get(&self.property)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

pub struct FnDiscriminator<F>(F);

pub fn discriminator_fn<F>(f: F) -> FnDiscriminator<F>
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    FnDiscriminator(f)
}

impl<F> TypeDiscriminator for FnDiscriminator<F>
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    fn concrete_type(&self, value: &Value) -> Option<String> {
        (self.0)(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn discriminators() {
        let value = json!({"__typename": "Book", "kind": "Movie", "pages": 300});

        assert_eq!(
            TypenameDiscriminator.concrete_type(&value).as_deref(),
            Some("Book")
        );
        assert_eq!(
            PropertyDiscriminator::new("kind")
                .concrete_type(&value)
                .as_deref(),
            Some("Movie")
        );

        let by_shape = discriminator_fn(|value: &Value| {
            value.get("pages").map(|_| "Book".to_string())
        });
        assert_eq!(by_shape.concrete_type(&value).as_deref(), Some("Book"));
        assert_eq!(by_shape.concrete_type(&json!({"minutes": 90})), None);
    }
}
