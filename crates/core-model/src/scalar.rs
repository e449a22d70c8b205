// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct CoercionError(pub String);

/// Converts scalar values between their runtime and wire representations.
pub trait ScalarCoercion: Send + Sync {
    /// Coerce a resolved value for the response.
    fn serialize(&self, value: &Value) -> Result<Value, CoercionError>;

    /// Coerce an input value (argument literal or variable).
    fn parse(&self, value: &Value) -> Result<Value, CoercionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScalar {
    Int,
    Float,
    String,
    Boolean,
    ID,
}

impl BuiltinScalar {
    pub const ALL: [BuiltinScalar; 5] = [
        BuiltinScalar::Int,
        BuiltinScalar::Float,
        BuiltinScalar::String,
        BuiltinScalar::Boolean,
        BuiltinScalar::ID,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scalar| scalar.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinScalar::Int => "Int",
            BuiltinScalar::Float => "Float",
            BuiltinScalar::String => "String",
            BuiltinScalar::Boolean => "Boolean",
            BuiltinScalar::ID => "ID",
        }
    }

    fn error(&self, value: &Value) -> CoercionError {
        CoercionError(format!("{} cannot represent value: {value}", self.name()))
    }
}

fn as_i32(number: &Number) -> Option<i32> {
    if let Some(int) = number.as_i64() {
        return i32::try_from(int).ok();
    }
    number
        .as_f64()
        .filter(|float| float.fract() == 0.0)
        .filter(|float| *float >= i32::MIN as f64 && *float <= i32::MAX as f64)
        .map(|float| float as i32)
}

fn float_value(float: f64) -> Option<Value> {
    Number::from_f64(float).map(Value::Number)
}

impl ScalarCoercion for BuiltinScalar {
    fn serialize(&self, value: &Value) -> Result<Value, CoercionError> {
        let serialized = match (self, value) {
            (BuiltinScalar::Int, Value::Number(number)) => as_i32(number).map(Value::from),
            (BuiltinScalar::Int, Value::Bool(b)) => Some(Value::from(*b as i32)),
            (BuiltinScalar::Int, Value::String(s)) => s.trim().parse::<i32>().ok().map(Value::from),

            (BuiltinScalar::Float, Value::Number(number)) => Some(Value::Number(number.clone())),
            (BuiltinScalar::Float, Value::Bool(b)) => float_value(if *b { 1.0 } else { 0.0 }),
            (BuiltinScalar::Float, Value::String(s)) => {
                s.trim().parse::<f64>().ok().and_then(float_value)
            }

            (BuiltinScalar::String, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::String, Value::Number(number)) => Some(Value::from(number.to_string())),
            (BuiltinScalar::String, Value::Bool(b)) => Some(Value::from(b.to_string())),

            (BuiltinScalar::Boolean, Value::Bool(_)) => Some(value.clone()),
            (BuiltinScalar::Boolean, Value::Number(number)) => {
                number.as_f64().map(|float| Value::Bool(float != 0.0))
            }

            (BuiltinScalar::ID, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::ID, Value::Number(number)) if number.is_i64() || number.is_u64() => {
                Some(Value::from(number.to_string()))
            }

            _ => None,
        };

        serialized.ok_or_else(|| self.error(value))
    }

    fn parse(&self, value: &Value) -> Result<Value, CoercionError> {
        let parsed = match (self, value) {
            (BuiltinScalar::Int, Value::Number(number)) => as_i32(number).map(Value::from),
            (BuiltinScalar::Float, Value::Number(_)) => Some(value.clone()),
            (BuiltinScalar::String, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::Boolean, Value::Bool(_)) => Some(value.clone()),
            (BuiltinScalar::ID, Value::String(_)) => Some(value.clone()),
            (BuiltinScalar::ID, Value::Number(number)) if number.is_i64() || number.is_u64() => {
                Some(Value::from(number.to_string()))
            }
            _ => None,
        };

        parsed.ok_or_else(|| self.error(value))
    }
}

/// Coercion for custom scalars without a registered implementation: values pass through as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueScalar;

impl ScalarCoercion for OpaqueScalar {
    fn serialize(&self, value: &Value) -> Result<Value, CoercionError> {
        Ok(value.clone())
    }

    fn parse(&self, value: &Value) -> Result<Value, CoercionError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn int_serialization() {
        let int = BuiltinScalar::Int;

        assert_eq!(int.serialize(&json!(42)).unwrap(), json!(42));
        assert_eq!(int.serialize(&json!(42.0)).unwrap(), json!(42));
        assert_eq!(int.serialize(&json!(true)).unwrap(), json!(1));
        assert_eq!(int.serialize(&json!("7")).unwrap(), json!(7));

        assert_eq!(
            int.serialize(&json!(1.5)).unwrap_err().to_string(),
            "Int cannot represent value: 1.5"
        );
        assert!(int.serialize(&json!(i64::from(i32::MAX) + 1)).is_err());
        assert!(int.serialize(&json!("seven")).is_err());
    }

    #[test]
    fn id_accepts_strings_and_integers() {
        let id = BuiltinScalar::ID;

        assert_eq!(id.serialize(&json!(12)).unwrap(), json!("12"));
        assert_eq!(id.parse(&json!("abc")).unwrap(), json!("abc"));
        assert!(id.serialize(&json!(1.5)).is_err());
        assert!(id.parse(&json!(true)).is_err());
    }

    #[test]
    fn parsing_is_strict() {
        assert!(BuiltinScalar::Int.parse(&json!("7")).is_err());
        assert!(BuiltinScalar::String.parse(&json!(7)).is_err());
        assert!(BuiltinScalar::Boolean.parse(&json!(1)).is_err());
        assert_eq!(BuiltinScalar::Float.parse(&json!(2)).unwrap(), json!(2));
    }

    #[test]
    fn scalar_names() {
        assert_eq!(BuiltinScalar::from_name("ID"), Some(BuiltinScalar::ID));
        assert_eq!(BuiltinScalar::from_name("Date"), None);
    }
}
