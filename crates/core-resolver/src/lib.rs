// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Executes GraphQL operations against a [`core_model::Schema`].
//!
//! The entry points are [`Executor::execute`] (or the free function [`execute_operation`]) and
//! [`Executor::execute_subscription_event`]. Execution never fails as a whole: every problem ends
//! up in the `errors` of the returned [`Response`], with `data` partially (or entirely) nulled
//! according to the schema's nullability.

mod coercion;
mod config;
mod context;
mod error;
mod execution;
mod executor;
mod operation;
mod request;
mod response;
mod result;
mod selection;

pub use config::ExecutorConfig;
pub use error::{ExecutionError, RequestError};
pub use executor::{Executor, execute_operation};
pub use request::{Request, parse_query};
pub use response::{GraphQLError, Location, Response};
pub use result::{NullCause, ResultNode};
