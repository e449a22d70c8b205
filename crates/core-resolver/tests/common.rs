#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use core_model::{PropertyDiscriminator, ResolverError, Schema, SchemaBuilder, resolver_fn};
use core_resolver::{Executor, ExecutorConfig, Request, Response};
use futures::FutureExt;
use serde_json::{Value, json};
use trellis_loader::{Loader, LoaderRegistry};

pub const LIBRARY_SDL: &str = r#"
    type Query {
        books: [Book]
        strictBooks: [Book!]
        requiredBooks: [Book!]!
        book(id: ID!): Book
        search(term: String = "", limit: Int = 10): [SearchResult!]!
        greeting(name: String = "reader", excited: Boolean): String!
        slow: String
        fast: String
        lateBook: Book
        nested: Shelf
        nodes: [Node!]!
        mixedNodes: [Node!]!
    }

    type Mutation {
        checkout(bookId: ID!): Checkout!
    }

    type Subscription {
        bookAdded: Book
    }

    interface Node {
        id: ID!
    }

    type Book implements Node {
        id: ID!
        title: String!
        authorId: ID!
        author: Author!
        genre: Genre
        pages: Int
    }

    type Author implements Node {
        id: ID!
        name: String!
    }

    type Shelf {
        label: String
        shelf: Shelf
    }

    type Checkout {
        bookId: ID!
        sequence: Int!
    }

    enum Genre { FICTION HISTORY }

    union SearchResult = Book | Author
"#;

/// Data visible to resolvers through the request context.
#[derive(Default)]
pub struct Library {
    pub books: Vec<Value>,
    pub checkouts: Mutex<Vec<String>>,
}

pub type LoaderCalls = Arc<Mutex<Vec<Vec<String>>>>;

pub struct AuthorLoader {
    authors: HashMap<String, Value>,
    calls: LoaderCalls,
}

#[derive(Debug, thiserror::Error)]
#[error("author store is unavailable")]
pub struct AuthorStoreError;

#[async_trait]
impl Loader for AuthorLoader {
    type Key = String;
    type Value = Value;
    type Error = AuthorStoreError;

    async fn load_many(&self, keys: &[String]) -> Result<Vec<Value>, AuthorStoreError> {
        self.calls.lock().unwrap().push(keys.to_vec());

        Ok(keys
            .iter()
            .map(|key| self.authors.get(key).cloned().unwrap_or(Value::Null))
            .collect())
    }
}

pub fn books() -> Vec<Value> {
    vec![
        json!({"id": "1", "title": "Dune", "authorId": "10", "genre": "FICTION", "pages": 412}),
        json!({"id": "2", "title": "Emma", "authorId": "99", "genre": "FICTION"}),
        json!({"id": "3", "title": "Persuasion", "authorId": "11"}),
        json!({"id": "4", "title": "Children of Dune", "authorId": "10"}),
    ]
}

fn authors() -> HashMap<String, Value> {
    HashMap::from([
        ("10".to_string(), json!({"id": "10", "name": "Frank Herbert"})),
        ("11".to_string(), json!({"id": "11", "name": "Jane Austen"})),
    ])
}

pub fn library_schema() -> Arc<Schema> {
    let list_books = || {
        resolver_fn(|_, _, context| {
            async move {
                let books = context
                    .data::<Library>()
                    .map(|library| library.books.clone())
                    .unwrap_or_default();
                Ok::<_, ResolverError>(Value::Array(books))
            }
            .boxed()
        })
    };

    let schema = SchemaBuilder::from_sdl(LIBRARY_SDL)
        .unwrap()
        .resolver("Query", "books", list_books())
        .resolver("Query", "strictBooks", list_books())
        .resolver("Query", "requiredBooks", list_books())
        .resolver(
            "Query",
            "book",
            resolver_fn(|_, arguments, context| {
                async move {
                    let id: String = arguments.require("id")?;
                    let book = context
                        .data::<Library>()
                        .and_then(|library| library.books.iter().find(|book| book["id"] == id))
                        .cloned();
                    Ok::<_, ResolverError>(book.unwrap_or(Value::Null))
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "search",
            resolver_fn(|_, arguments, _| {
                async move {
                    let limit: usize = arguments.require("limit")?;
                    let results = vec![
                        json!({"kind": "Book", "id": "1", "title": "Dune", "authorId": "10"}),
                        json!({"kind": "Author", "id": "11", "name": "Jane Austen"}),
                    ];
                    Ok::<_, ResolverError>(Value::Array(
                        results.into_iter().take(limit).collect(),
                    ))
                }
                .boxed()
            }),
        )
        .discriminator("SearchResult", PropertyDiscriminator::new("kind"))
        .resolver(
            "Query",
            "greeting",
            resolver_fn(|_, arguments, _| {
                async move {
                    let name: String = arguments.require("name")?;
                    let excited = arguments.get_as::<bool>("excited")?.unwrap_or(false);
                    let punctuation = if excited { "!" } else { "." };
                    Ok::<_, ResolverError>(json!(format!("Hello, {name}{punctuation}")))
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "slow",
            resolver_fn(|_, _, _| {
                async move {
                    futures::future::pending::<()>().await;
                    Ok::<_, ResolverError>(json!("never"))
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "fast",
            resolver_fn(|_, _, _| async move { Ok::<_, ResolverError>(json!("done")) }.boxed()),
        )
        .resolver(
            "Query",
            "lateBook",
            resolver_fn(|_, _, _| {
                async move {
                    tokio::time::sleep(Duration::from_millis(60)).await;
                    Ok::<_, ResolverError>(books()[0].clone())
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "nested",
            resolver_fn(|_, _, _| {
                async move {
                    Ok::<_, ResolverError>(
                        json!({"label": "a", "shelf": {"label": "b", "shelf": {"label": "c"}}}),
                    )
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "nodes",
            resolver_fn(|_, _, _| {
                async move {
                    Ok::<_, ResolverError>(json!([
                        {"__typename": "Book", "id": "1", "title": "Dune", "authorId": "10"},
                        {"__typename": "Author", "id": "11", "name": "Jane Austen"}
                    ]))
                }
                .boxed()
            }),
        )
        .resolver(
            "Query",
            "mixedNodes",
            resolver_fn(|_, _, _| {
                async move {
                    Ok::<_, ResolverError>(json!([
                        {"__typename": "Book", "id": "1", "title": "Dune", "authorId": "10"},
                        {"__typename": "Podcast", "id": "p1"},
                        {"__typename": "Podcast", "id": "p2"}
                    ]))
                }
                .boxed()
            }),
        )
        .resolver(
            "Book",
            "author",
            resolver_fn(|parent, _, context| {
                async move {
                    let author_id = parent["authorId"].as_str().unwrap_or_default().to_string();
                    let author = context
                        .loader::<AuthorLoader>()?
                        .load(author_id.clone())
                        .await?;

                    if author.is_null() {
                        Err(ResolverError::user(format!("Author {author_id} not found")))
                    } else {
                        Ok::<_, ResolverError>(author)
                    }
                }
                .boxed()
            }),
        )
        .resolver(
            "Mutation",
            "checkout",
            resolver_fn(|_, arguments, context| {
                async move {
                    let book_id: String = arguments.require("bookId")?;
                    // The first checkout is the slowest, so concurrent execution would reorder
                    if book_id == "1" {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }

                    let library = context
                        .data::<Library>()
                        .ok_or_else(|| ResolverError::user("No library"))?;
                    let mut checkouts = library.checkouts.lock().unwrap();
                    checkouts.push(book_id.clone());

                    Ok::<_, ResolverError>(json!({"bookId": book_id, "sequence": checkouts.len()}))
                }
                .boxed()
            }),
        )
        .build()
        .unwrap();

    Arc::new(schema)
}

/// A request against the library fixture, plus the record of author batches it triggers.
pub fn library_request(query: &str) -> (Request, LoaderCalls) {
    let calls = LoaderCalls::default();
    let mut loaders = LoaderRegistry::new();
    loaders.register(AuthorLoader {
        authors: authors(),
        calls: calls.clone(),
    });

    let request = Request::parse(query)
        .unwrap()
        .with_context(Library {
            books: books(),
            ..Default::default()
        })
        .with_loaders(loaders);

    (request, calls)
}

pub async fn execute(query: &str) -> Response {
    let (request, _) = library_request(query);
    Executor::new(library_schema()).execute(&request).await
}

pub async fn execute_with_config(query: &str, config: ExecutorConfig) -> Response {
    let (request, _) = library_request(query);
    Executor::with_config(library_schema(), config)
        .execute(&request)
        .await
}

pub fn assert_response(response: &Response, expected: Value) {
    let actual = response.to_json().unwrap();

    println!(
        "!! expected: {}",
        serde_json::to_string_pretty(&expected).unwrap()
    );
    println!(
        "!! actual: {}",
        serde_json::to_string_pretty(&actual).unwrap()
    );

    assert_eq!(expected, actual)
}
