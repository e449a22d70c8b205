// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_resolver::Executor;
use serde_json::json;
use test_log::test;

mod common;

use common::{library_request, library_schema};

fn batches(calls: &common::LoaderCalls) -> Vec<Vec<String>> {
    calls.lock().unwrap().clone()
}

#[test(tokio::test)]
async fn sibling_loads_are_coalesced() {
    let (request, calls) = library_request("{ books { author { name } } }");

    Executor::new(library_schema()).execute(&request).await;

    assert_eq!(batches(&calls), vec![vec!["10", "99", "11"]]);
}

#[test(tokio::test)]
async fn repeated_keys_across_fields_share_a_batch() {
    let (request, calls) = library_request(
        r#"{
            books { author { name } }
            again: books { author { id } }
            book(id: "3") { author { name } }
        }"#,
    );

    let response = Executor::new(library_schema()).execute(&request).await;

    assert_eq!(batches(&calls), vec![vec!["10", "99", "11"]]);
    assert_eq!(
        response.data["book"],
        json!({"author": {"name": "Jane Austen"}})
    );
    // One failure per occurrence of the missing author
    assert_eq!(response.errors.len(), 2);
}

#[test(tokio::test(start_paused = true))]
async fn cached_keys_are_not_reloaded() {
    let (request, calls) =
        library_request("{ books { author { name } } lateBook { author { name } } }");

    let response = Executor::new(library_schema()).execute(&request).await;

    // `lateBook` asks for author 10 long after the first batch completed
    assert_eq!(
        response.data["lateBook"],
        json!({"author": {"name": "Frank Herbert"}})
    );
    assert_eq!(batches(&calls), vec![vec!["10", "99", "11"]]);
}

#[test(tokio::test)]
async fn each_execution_gets_fresh_loaders() {
    let (request, calls) = library_request(r#"{ book(id: "1") { author { name } } }"#);
    let executor = Executor::new(library_schema());

    executor.execute(&request).await;
    executor.execute(&request).await;

    assert_eq!(batches(&calls), vec![vec!["10"], vec!["10"]]);
}
