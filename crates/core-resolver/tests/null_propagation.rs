// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use core_resolver::Executor;
use serde_json::json;
use test_log::test;

mod common;

use common::{Library, assert_response, execute, library_request, library_schema};

#[test(tokio::test)]
async fn failed_field_nulls_nullable_list_element() {
    let response = execute("{ books { title author { name } } }").await;

    assert_response(
        &response,
        json!({
            "data": {
                "books": [
                    {"title": "Dune", "author": {"name": "Frank Herbert"}},
                    null,
                    {"title": "Persuasion", "author": {"name": "Jane Austen"}},
                    {"title": "Children of Dune", "author": {"name": "Frank Herbert"}}
                ]
            },
            "errors": [{
                "message": "Author 99 not found",
                "locations": [{"line": 1, "column": 17}],
                "path": ["books", 1, "author"]
            }]
        }),
    );
}

#[test(tokio::test)]
async fn failed_field_nulls_list_with_non_null_elements() {
    let response = execute("{ strictBooks { title author { name } } fast }").await;

    assert_eq!(response.data, json!({"strictBooks": null, "fast": "done"}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Author 99 not found");
    assert_eq!(
        serde_json::to_value(&response.errors[0].path).unwrap(),
        json!(["strictBooks", 1, "author"])
    );
}

#[test(tokio::test)]
async fn failure_without_nullable_ancestor_nulls_data() {
    let response = execute("{ requiredBooks { title author { name } } fast }").await;

    assert_eq!(response.data, serde_json::Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        serde_json::to_value(&response.errors[0].path).unwrap(),
        json!(["requiredBooks", 1, "author"])
    );
}

#[test(tokio::test)]
async fn null_for_non_null_field_records_one_error() {
    let (mut request, _) = library_request("{ books { id title } }");
    request.context = Arc::new(Library {
        books: vec![json!({"id": "5", "authorId": "10"})],
        ..Default::default()
    });

    let response = Executor::new(library_schema()).execute(&request).await;

    assert_response(
        &response,
        json!({
            "data": {"books": [null]},
            "errors": [{
                "message": "Cannot return null for non-nullable field Book.title",
                "locations": [{"line": 1, "column": 14}],
                "path": ["books", 0, "title"]
            }]
        }),
    );
}

#[test(tokio::test)]
async fn sibling_fields_survive_failures() {
    let response = execute(
        r#"{
            missing: book(id: "2") { title author { name } }
            found: book(id: "1") { title author { name } }
        }"#,
    )
    .await;

    assert_eq!(
        response.data,
        json!({
            "missing": null,
            "found": {"title": "Dune", "author": {"name": "Frank Herbert"}}
        })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        serde_json::to_value(&response.errors[0].path).unwrap(),
        json!(["missing", "author"])
    );
}
