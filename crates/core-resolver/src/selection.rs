// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use async_graphql_parser::{
    Positioned,
    types::{Directive, Field, Selection, SelectionSet},
};
use async_graphql_value::Value as AstValue;
use indexmap::IndexMap;
use serde_json::Value;

use crate::context::ExecutionContext;

/// Fields sharing a response key, in document order.
pub(crate) type CollectedFields<'a> = IndexMap<&'a str, Vec<&'a Positioned<Field>>>;

/// Merge the selections that apply to `object_type` into an ordered map keyed by response key
/// (alias or field name). Fields with the same response key are merged so their sub-selections
/// can be executed together.
pub(crate) fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &str,
    selection_sets: &[&'a Positioned<SelectionSet>],
) -> CollectedFields<'a> {
    let mut collected = IndexMap::new();
    let mut visited_fragments = HashSet::new();

    for selection_set in selection_sets {
        collect_into(
            ctx,
            object_type,
            selection_set,
            &mut visited_fragments,
            &mut collected,
        );
    }

    collected
}

fn collect_into<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &str,
    selection_set: &'a Positioned<SelectionSet>,
    visited_fragments: &mut HashSet<&'a str>,
    collected: &mut CollectedFields<'a>,
) {
    for selection in &selection_set.node.items {
        if !should_include(ctx, selection.node.directives()) {
            continue;
        }

        match &selection.node {
            Selection::Field(field) => {
                collected
                    .entry(field.node.response_key().node.as_str())
                    .or_default()
                    .push(field);
            }
            Selection::InlineFragment(fragment) => {
                let applies = fragment
                    .node
                    .type_condition
                    .as_ref()
                    .is_none_or(|condition| {
                        does_fragment_apply(ctx, object_type, &condition.node.on.node)
                    });

                if applies {
                    collect_into(
                        ctx,
                        object_type,
                        &fragment.node.selection_set,
                        visited_fragments,
                        collected,
                    );
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !visited_fragments.insert(name) {
                    continue;
                }

                // Unknown fragments are rejected before execution starts
                let Some(fragment) = ctx.fragments.get(name) else {
                    continue;
                };

                let type_condition = &fragment.node.type_condition.node.on.node;
                if does_fragment_apply(ctx, object_type, type_condition) {
                    collect_into(
                        ctx,
                        object_type,
                        &fragment.node.selection_set,
                        visited_fragments,
                        collected,
                    );
                }
            }
        }
    }
}

fn does_fragment_apply(ctx: &ExecutionContext, object_type: &str, type_condition: &str) -> bool {
    type_condition == object_type || ctx.schema.is_possible_type(type_condition, object_type)
}

/// Evaluate `@skip(if:)` and `@include(if:)`.
fn should_include(ctx: &ExecutionContext, directives: &[Positioned<Directive>]) -> bool {
    let condition = |directive_name: &str| {
        directives
            .iter()
            .find(|directive| directive.node.name.node.as_str() == directive_name)
            .and_then(|directive| directive.node.get_argument("if"))
            .map(|value| match &value.node {
                AstValue::Boolean(boolean) => *boolean,
                AstValue::Variable(name) => {
                    matches!(ctx.variables.get(name.as_str()), Some(Value::Bool(true)))
                }
                _ => false,
            })
    };

    let skipped = condition("skip").unwrap_or(false);
    let included = condition("include").unwrap_or(true);

    !skipped && included
}
