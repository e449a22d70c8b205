// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use core_model::SchemaBuilder;
use core_resolver::{Executor, ExecutorConfig, Request, Response, parse_query};
use serde_json::{Value, json};
use test_log::test;

mod common;

use common::{assert_response, execute, execute_with_config, library_request, library_schema};

#[test]
fn parse_failures_become_responses() {
    let error = parse_query("{ books { title }").unwrap_err();
    let response = Response::from(error);

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.starts_with("Syntax error"));
    assert!(!response.errors[0].locations.is_empty());
    assert!(response.errors[0].path.is_empty());
}

#[test(tokio::test)]
async fn operation_selection_errors() {
    let query = "query First { fast } query Second { slow: fast }";

    let response = execute(query).await;
    assert_response(
        &response,
        json!({
            "data": null,
            "errors": [{"message": "Must provide operation name if query contains multiple operations"}]
        }),
    );

    let (request, _) = library_request(query);
    let executor = Executor::new(library_schema());

    let response = executor
        .execute(&request.clone().with_operation_name("Third"))
        .await;
    assert_eq!(
        response.errors[0].message,
        "operationName 'Third' doesn't match any operation"
    );

    let response = executor
        .execute(&request.with_operation_name("Second"))
        .await;
    assert_response(&response, json!({"data": {"slow": "done"}}));
}

#[test(tokio::test)]
async fn variable_errors() {
    let response = execute("query ($id: ID!) { book(id: $id) { title } }").await;
    assert_response(
        &response,
        json!({
            "data": null,
            "errors": [{
                "message": "Variable '$id' of required type 'ID!' was not provided",
                "locations": [{"line": 1, "column": 8}]
            }]
        }),
    );

    let (request, _) = library_request("query ($id: ID!) { book(id: $id) { title } }");
    let request = request.with_variables(serde_json::Map::from_iter([(
        "id".to_string(),
        json!({"isbn": "x"}),
    )]));
    let response = Executor::new(library_schema()).execute(&request).await;
    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        r#"Variable '$id' got an invalid value: ID cannot represent value: {"isbn":"x"}"#
    );
}

#[test(tokio::test)]
async fn unsupported_operations() {
    let schema = SchemaBuilder::from_sdl("type Query { ping: String }")
        .unwrap()
        .build()
        .unwrap();
    let executor = Executor::new(Arc::new(schema));

    let response = executor
        .execute(&Request::parse("mutation { ping }").unwrap())
        .await;
    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        "Schema does not support mutation operations"
    );
}

#[test(tokio::test)]
async fn depth_limit() {
    let query = "{ nested { shelf { shelf { label } } } }";
    let config = || ExecutorConfig::default().with_timeout(Duration::from_secs(5));

    let response = execute_with_config(query, config().with_max_depth(3)).await;
    assert_response(
        &response,
        json!({
            "data": null,
            "errors": [{
                "message": "Selection set too deep (maximum depth is 3)",
                "locations": [{"line": 1, "column": 28}]
            }]
        }),
    );

    let response = execute_with_config(query, config().with_max_depth(4)).await;
    assert_response(
        &response,
        json!({"data": {"nested": {"shelf": {"shelf": {"label": "c"}}}}}),
    );
}

#[test(tokio::test)]
async fn missing_fragments() {
    let response = execute("{ books { ...Details } }").await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].message,
        "Fragment definition 'Details' not found"
    );
}
