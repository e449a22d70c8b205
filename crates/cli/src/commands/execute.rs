// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::{Arg, ArgMatches, Command};
use common::env_const::{TRELLIS_EXECUTION_TIMEOUT_MS, TRELLIS_MAX_QUERY_DEPTH};
use core_model::SchemaBuilder;
use core_resolver::{Executor, ExecutorConfig, Request, Response, parse_query};
use serde_json::{Map, Value};
use tracing::info;
use trellis_env::{CompositeEnvironment, Environment, MapEnvironment};

use crate::commands::command::{CommandDefinition, file_arg, get, get_required, output_arg};

pub(crate) struct ExecuteCommandDefinition {}

#[async_trait]
impl CommandDefinition for ExecuteCommandDefinition {
    fn command(&self) -> Command {
        Command::new("execute")
            .about("Execute a GraphQL query against a schema and a JSON root value")
            .arg(file_arg("schema", "Path to the GraphQL schema (SDL)").required(true))
            .arg(file_arg("query", "Path to the GraphQL query document").required(true))
            .arg(file_arg("variables", "Path to a JSON object with the variable values"))
            .arg(file_arg("root", "Path to a JSON document to use as the root value"))
            .arg(
                Arg::new("operation")
                    .help("Name of the operation to execute")
                    .long("operation")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("timeout")
                    .help("Execution timeout in milliseconds")
                    .long_help("Execution timeout in milliseconds. Overrides TRELLIS_EXECUTION_TIMEOUT_MS.")
                    .long("timeout")
                    .required(false)
                    .value_parser(clap::value_parser!(u64))
                    .num_args(1),
            )
            .arg(
                Arg::new("max-depth")
                    .help("Maximum selection depth")
                    .long_help("Maximum selection depth. Overrides TRELLIS_MAX_QUERY_DEPTH.")
                    .long("max-depth")
                    .required(false)
                    .value_parser(clap::value_parser!(u64))
                    .num_args(1),
            )
            .arg(output_arg())
    }

    async fn execute(&self, matches: &ArgMatches, env: Arc<dyn Environment>) -> Result<()> {
        let options = ExecuteOptions {
            schema: get_required(matches, "schema")?,
            query: get_required(matches, "query")?,
            variables: get(matches, "variables"),
            root: get(matches, "root"),
            operation: get(matches, "operation"),
        };

        let config = ExecutorConfig::from_env(&flag_environment(matches, env))?;

        let response = execute_files(&options, config).await?;
        let output = serde_json::to_string_pretty(&response)?;

        match get::<PathBuf>(matches, "output") {
            Some(path) => {
                let mut file = fs::File::create(&path)?;
                writeln!(file, "{output}")?;
                info!(path = %path.display(), "Response written");
            }
            None => println!("{output}"),
        }

        Ok(())
    }
}

/// The flags that mirror environment variables, layered over `env`.
fn flag_environment(matches: &ArgMatches, env: Arc<dyn Environment>) -> CompositeEnvironment {
    let mut flags = MapEnvironment::new();
    for (arg_id, key) in [
        ("timeout", TRELLIS_EXECUTION_TIMEOUT_MS),
        ("max-depth", TRELLIS_MAX_QUERY_DEPTH),
    ] {
        if let Some(value) = get::<u64>(matches, arg_id) {
            flags.set(key, &value.to_string());
        }
    }

    CompositeEnvironment::new(vec![Arc::new(flags), env])
}

struct ExecuteOptions {
    schema: PathBuf,
    query: PathBuf,
    variables: Option<PathBuf>,
    root: Option<PathBuf>,
    operation: Option<String>,
}

/// Execute the query with default property resolvers, so the root value is queried directly.
async fn execute_files(options: &ExecuteOptions, config: ExecutorConfig) -> Result<Response> {
    let sdl = read(&options.schema)?;
    let schema = SchemaBuilder::from_sdl(&sdl)
        .and_then(SchemaBuilder::build)
        .with_context(|| format!("Invalid schema {}", options.schema.display()))?;

    let document = match parse_query(&read(&options.query)?) {
        Ok(document) => document,
        Err(error) => return Ok(Response::from(error)),
    };

    let mut request = Request::new(document);

    if let Some(operation) = &options.operation {
        request = request.with_operation_name(operation);
    }

    if let Some(path) = &options.variables {
        match read_json(path)? {
            Value::Object(variables) => request = request.with_variables(variables),
            Value::Null => request = request.with_variables(Map::new()),
            _ => bail!("Variables in {} must be a JSON object", path.display()),
        }
    }

    if let Some(path) = &options.root {
        request = request.with_root_value(read_json(path)?);
    }

    Ok(Executor::with_config(Arc::new(schema), config)
        .execute(&request)
        .await)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    serde_json::from_str(&read(path)?)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}
