// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_graphql_parser::{
    Positioned, parse_schema,
    types::{self as ast, ServiceDocument, TypeSystemDefinition},
};
use async_graphql_value::Name;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, instrument};

use crate::{
    discriminator::{TypeDiscriminator, TypenameDiscriminator},
    error::SchemaBuildError,
    field::{FieldDefinition, InputValueDefinition},
    resolver::{FieldResolver, PropertyResolver},
    scalar::{BuiltinScalar, OpaqueScalar, ScalarCoercion},
    schema::{MUTATION_ROOT_TYPENAME, QUERY_ROOT_TYPENAME, SUBSCRIPTION_ROOT_TYPENAME, Schema},
    type_definition::{
        EnumType, InputObjectType, InterfaceType, ObjectType, ScalarType, TypeDefinition,
        TypeKind, UnionType,
    },
    types::TypeRef,
};

/// Builds a [`Schema`] from SDL plus the capabilities (resolvers, discriminators, scalar
/// coercions) bound to it.
///
/// ```ignore
/// let schema = SchemaBuilder::from_sdl(sdl)?
///     .resolver("Query", "books", BooksResolver)
///     .discriminator("Resource", PropertyDiscriminator::new("kind"))
///     .build()?;
/// ```
pub struct SchemaBuilder {
    document: ServiceDocument,
    resolvers: HashMap<(String, String), Arc<dyn FieldResolver>>,
    discriminators: HashMap<String, Arc<dyn TypeDiscriminator>>,
    scalars: HashMap<String, Arc<dyn ScalarCoercion>>,
}

#[derive(Default)]
struct RootNames {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl SchemaBuilder {
    pub fn from_sdl(sdl: &str) -> Result<Self, SchemaBuildError> {
        Ok(Self {
            document: parse_schema(sdl)?,
            resolvers: HashMap::new(),
            discriminators: HashMap::new(),
            scalars: HashMap::new(),
        })
    }

    pub fn resolver(
        mut self,
        type_name: &str,
        field_name: &str,
        resolver: impl FieldResolver + 'static,
    ) -> Self {
        self.resolvers.insert(
            (type_name.to_string(), field_name.to_string()),
            Arc::new(resolver),
        );
        self
    }

    pub fn discriminator(
        mut self,
        abstract_type: &str,
        discriminator: impl TypeDiscriminator + 'static,
    ) -> Self {
        self.discriminators
            .insert(abstract_type.to_string(), Arc::new(discriminator));
        self
    }

    pub fn scalar(mut self, name: &str, coercion: impl ScalarCoercion + 'static) -> Self {
        self.scalars.insert(name.to_string(), Arc::new(coercion));
        self
    }

    /// Build and validate the schema.
    ///
    /// Validations performed:
    /// - Each type is defined once, and every extension targets a defined type of the same kind
    /// - Every referenced type exists and is used in a matching (input or output) position
    /// - Union members are object types
    /// - Objects implement their interfaces' fields with covariant types and identical arguments
    /// - Every registered resolver, discriminator and scalar coercion has a valid target
    /// - The root types exist and are object types
    /// - Input objects do not form a cycle through non-null fields
    #[instrument(name = "SchemaBuilder::build", skip_all)]
    pub fn build(self) -> Result<Schema, SchemaBuildError> {
        let SchemaBuilder {
            document,
            mut resolvers,
            mut discriminators,
            mut scalars,
        } = self;

        let mut roots = RootNames::default();
        let mut definitions: IndexMap<String, ast::TypeDefinition> = IndexMap::new();
        let mut extensions = vec![];

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    let root_name = |name: Option<Positioned<Name>>| {
                        name.map(|name| name.node.to_string())
                    };
                    roots.query = root_name(schema.query).or(roots.query);
                    roots.mutation = root_name(schema.mutation).or(roots.mutation);
                    roots.subscription = root_name(schema.subscription).or(roots.subscription);
                }
                TypeSystemDefinition::Type(definition) => {
                    let definition = definition.node;
                    let name = definition.name.node.to_string();

                    if definition.extend {
                        extensions.push(definition);
                    } else if BuiltinScalar::from_name(&name).is_some() {
                        // Redeclaring a built-in scalar is harmless; anything else is a clash
                        if !matches!(definition.kind, ast::TypeKind::Scalar) {
                            return Err(SchemaBuildError::DuplicateType(name));
                        }
                    } else if definitions.contains_key(&name) {
                        return Err(SchemaBuildError::DuplicateType(name));
                    } else {
                        definitions.insert(name, definition);
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        for extension in extensions {
            apply_extension(&mut definitions, extension)?;
        }

        let mut implementers: HashMap<String, IndexSet<String>> = HashMap::new();
        for (name, definition) in &definitions {
            if let ast::TypeKind::Object(object) = &definition.kind {
                for interface in &object.implements {
                    implementers
                        .entry(interface.node.to_string())
                        .or_default()
                        .insert(name.clone());
                }
            }
        }

        let mut types = IndexMap::new();

        for scalar in BuiltinScalar::ALL {
            let coercion = scalars
                .remove(scalar.name())
                .unwrap_or_else(|| Arc::new(scalar));
            types.insert(
                scalar.name().to_string(),
                TypeDefinition {
                    name: scalar.name().to_string(),
                    description: None,
                    kind: TypeKind::Scalar(ScalarType { coercion }),
                },
            );
        }

        for (name, definition) in definitions {
            let mut discriminator = || {
                discriminators
                    .remove(&name)
                    .unwrap_or_else(|| Arc::new(TypenameDiscriminator))
            };

            let kind = match definition.kind {
                ast::TypeKind::Scalar => TypeKind::Scalar(ScalarType {
                    coercion: scalars
                        .remove(&name)
                        .unwrap_or_else(|| Arc::new(OpaqueScalar)),
                }),
                ast::TypeKind::Object(object) => TypeKind::Object(ObjectType {
                    fields: build_fields(&name, object.fields, Some(&mut resolvers))?,
                    implements: object
                        .implements
                        .into_iter()
                        .map(|interface| interface.node.to_string())
                        .collect(),
                }),
                ast::TypeKind::Interface(interface) => TypeKind::Interface(InterfaceType {
                    fields: build_fields(&name, interface.fields, None)?,
                    implementers: implementers.remove(&name).unwrap_or_default(),
                    discriminator: discriminator(),
                }),
                ast::TypeKind::Union(union) => TypeKind::Union(UnionType {
                    members: union
                        .members
                        .into_iter()
                        .map(|member| member.node.to_string())
                        .collect(),
                    discriminator: discriminator(),
                }),
                ast::TypeKind::Enum(enum_type) => TypeKind::Enum(EnumType {
                    values: enum_type
                        .values
                        .into_iter()
                        .map(|value| value.node.value.node.to_string())
                        .collect(),
                }),
                ast::TypeKind::InputObject(input) => TypeKind::InputObject(InputObjectType {
                    fields: build_input_values(&name, input.fields)?,
                }),
            };

            types.insert(
                name.clone(),
                TypeDefinition {
                    name,
                    description: definition.description.map(|description| description.node),
                    kind,
                },
            );
        }

        if let Some((type_name, field_name)) = resolvers.into_keys().next() {
            return Err(SchemaBuildError::UnknownResolverTarget {
                type_name,
                field_name,
            });
        }
        if let Some(name) = discriminators.into_keys().next() {
            return Err(SchemaBuildError::InvalidDiscriminatorTarget(name));
        }
        if let Some(name) = scalars.into_keys().next() {
            return Err(SchemaBuildError::InvalidScalarTarget(name));
        }

        let query_type = roots
            .query
            .unwrap_or_else(|| QUERY_ROOT_TYPENAME.to_string());
        if !types.contains_key(&query_type) {
            return Err(SchemaBuildError::MissingQueryRoot(query_type));
        }
        let mutation_type = root_type_name(&types, roots.mutation, MUTATION_ROOT_TYPENAME)?;
        let subscription_type =
            root_type_name(&types, roots.subscription, SUBSCRIPTION_ROOT_TYPENAME)?;

        let schema = Schema {
            types,
            query_type,
            mutation_type,
            subscription_type,
        };

        for (operation, name) in [
            ("query", Some(schema.query_type.as_str())),
            ("mutation", schema.mutation_type.as_deref()),
            ("subscription", schema.subscription_type.as_deref()),
        ] {
            if let Some(name) = name
                && !matches!(
                    schema.type_definition(name).map(|td| &td.kind),
                    Some(TypeKind::Object(_))
                )
            {
                return Err(SchemaBuildError::InvalidRootType {
                    operation: operation.to_string(),
                    type_name: name.to_string(),
                });
            }
        }

        validate(&schema)?;

        debug!(types = schema.types.len(), "Built schema");

        Ok(schema)
    }
}

/// A root declared in a `schema { ... }` block must exist. Otherwise the conventional name is
/// used if such a type is defined.
fn root_type_name(
    types: &IndexMap<String, TypeDefinition>,
    declared: Option<String>,
    default_name: &str,
) -> Result<Option<String>, SchemaBuildError> {
    match declared {
        Some(name) if types.contains_key(&name) => Ok(Some(name)),
        Some(name) => Err(SchemaBuildError::UnknownType {
            name,
            referenced_by: "schema".to_string(),
        }),
        None => Ok(types
            .contains_key(default_name)
            .then(|| default_name.to_string())),
    }
}

fn apply_extension(
    definitions: &mut IndexMap<String, ast::TypeDefinition>,
    extension: ast::TypeDefinition,
) -> Result<(), SchemaBuildError> {
    let name = extension.name.node.to_string();
    let invalid = |reason: &str| SchemaBuildError::InvalidExtension {
        name: name.clone(),
        reason: reason.to_string(),
    };

    let target = definitions
        .get_mut(&name)
        .ok_or_else(|| invalid("the type is not defined"))?;

    match (&mut target.kind, extension.kind) {
        (ast::TypeKind::Scalar, ast::TypeKind::Scalar) => {}
        (ast::TypeKind::Object(target), ast::TypeKind::Object(extension)) => {
            target.implements.extend(extension.implements);
            target.fields.extend(extension.fields);
        }
        (ast::TypeKind::Interface(target), ast::TypeKind::Interface(extension)) => {
            target.implements.extend(extension.implements);
            target.fields.extend(extension.fields);
        }
        (ast::TypeKind::Union(target), ast::TypeKind::Union(extension)) => {
            target.members.extend(extension.members);
        }
        (ast::TypeKind::Enum(target), ast::TypeKind::Enum(extension)) => {
            target.values.extend(extension.values);
        }
        (ast::TypeKind::InputObject(target), ast::TypeKind::InputObject(extension)) => {
            target.fields.extend(extension.fields);
        }
        _ => return Err(invalid("the extension is of a different kind")),
    }

    Ok(())
}

/// Resolvers are taken from `resolvers` (for object types). Fields without one read the
/// same-named property of their parent.
fn build_fields(
    type_name: &str,
    fields: Vec<Positioned<ast::FieldDefinition>>,
    mut resolvers: Option<&mut HashMap<(String, String), Arc<dyn FieldResolver>>>,
) -> Result<IndexMap<String, FieldDefinition>, SchemaBuildError> {
    let mut built = IndexMap::new();

    for field in fields {
        let field = field.node;
        let name = field.name.node.to_string();

        if built.contains_key(&name) {
            return Err(SchemaBuildError::DuplicateField {
                type_name: type_name.to_string(),
                field_name: name,
            });
        }

        let resolver = resolvers
            .as_mut()
            .and_then(|resolvers| resolvers.remove(&(type_name.to_string(), name.clone())))
            .unwrap_or_else(|| Arc::new(PropertyResolver::new(name.clone())));

        let definition = FieldDefinition {
            name: name.clone(),
            description: field.description.map(|description| description.node),
            ty: TypeRef::from(&field.ty.node),
            arguments: build_input_values(&format!("{type_name}.{name}"), field.arguments)?,
            resolver,
        };
        built.insert(name, definition);
    }

    Ok(built)
}

fn build_input_values(
    owner: &str,
    values: Vec<Positioned<ast::InputValueDefinition>>,
) -> Result<IndexMap<String, InputValueDefinition>, SchemaBuildError> {
    let mut built = IndexMap::new();

    for value in values {
        let value = value.node;
        let name = value.name.node.to_string();

        if built.contains_key(&name) {
            return Err(SchemaBuildError::DuplicateField {
                type_name: owner.to_string(),
                field_name: name,
            });
        }

        let default_value = value
            .default_value
            .map(|default_value| default_value.node.into_json())
            .transpose()
            .map_err(|e| SchemaBuildError::InvalidDefaultValue {
                referenced_by: format!("{owner}.{name}"),
                message: e.to_string(),
            })?;

        built.insert(
            name.clone(),
            InputValueDefinition {
                name,
                ty: TypeRef::from(&value.ty.node),
                default_value,
            },
        );
    }

    Ok(built)
}

fn validate(schema: &Schema) -> Result<(), SchemaBuildError> {
    for definition in schema.types() {
        match &definition.kind {
            TypeKind::Object(object) => {
                validate_fields(schema, &definition.name, &object.fields)?;
                for interface in &object.implements {
                    validate_implementation(schema, &definition.name, object, interface)?;
                }
            }
            TypeKind::Interface(interface) => {
                validate_fields(schema, &definition.name, &interface.fields)?;
            }
            TypeKind::Union(union) => {
                for member in &union.members {
                    match schema.type_definition(member) {
                        None => {
                            return Err(SchemaBuildError::UnknownType {
                                name: member.clone(),
                                referenced_by: definition.name.clone(),
                            });
                        }
                        Some(TypeDefinition {
                            kind: TypeKind::Object(_),
                            ..
                        }) => {}
                        Some(_) => {
                            return Err(SchemaBuildError::InvalidUnionMember {
                                union_type: definition.name.clone(),
                                member: member.clone(),
                            });
                        }
                    }
                }
            }
            TypeKind::InputObject(input) => {
                for field in input.fields.values() {
                    validate_input_type(
                        schema,
                        &field.ty,
                        &format!("{}.{}", definition.name, field.name),
                    )?;
                }
            }
            TypeKind::Scalar(_) | TypeKind::Enum(_) => {}
        }
    }

    check_input_cycles(schema)
}

fn validate_fields(
    schema: &Schema,
    type_name: &str,
    fields: &IndexMap<String, FieldDefinition>,
) -> Result<(), SchemaBuildError> {
    for field in fields.values() {
        let referenced_by = format!("{type_name}.{}", field.name);
        let field_type = field.ty.named_type();

        match schema.type_definition(field_type) {
            None => {
                return Err(SchemaBuildError::UnknownType {
                    name: field_type.to_string(),
                    referenced_by,
                });
            }
            Some(definition) if !definition.is_output_type() => {
                return Err(SchemaBuildError::NotAnOutputType {
                    type_name: field_type.to_string(),
                    referenced_by,
                });
            }
            Some(_) => {}
        }

        for argument in field.arguments.values() {
            validate_input_type(
                schema,
                &argument.ty,
                &format!("{referenced_by}({})", argument.name),
            )?;
        }
    }

    Ok(())
}

fn validate_input_type(
    schema: &Schema,
    ty: &TypeRef,
    referenced_by: &str,
) -> Result<(), SchemaBuildError> {
    let type_name = ty.named_type();

    match schema.type_definition(type_name) {
        None => Err(SchemaBuildError::UnknownType {
            name: type_name.to_string(),
            referenced_by: referenced_by.to_string(),
        }),
        Some(definition) if !definition.is_input_type() => Err(SchemaBuildError::NotAnInputType {
            type_name: type_name.to_string(),
            referenced_by: referenced_by.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn validate_implementation(
    schema: &Schema,
    object_name: &str,
    object: &ObjectType,
    interface_name: &str,
) -> Result<(), SchemaBuildError> {
    let interface = match schema.type_definition(interface_name).map(|td| &td.kind) {
        Some(TypeKind::Interface(interface)) => interface,
        Some(_) => {
            return Err(SchemaBuildError::NotAnInterface {
                object_type: object_name.to_string(),
                interface: interface_name.to_string(),
            });
        }
        None => {
            return Err(SchemaBuildError::UnknownType {
                name: interface_name.to_string(),
                referenced_by: object_name.to_string(),
            });
        }
    };

    let not_satisfied = |reason: String| SchemaBuildError::InterfaceNotSatisfied {
        object_type: object_name.to_string(),
        interface: interface_name.to_string(),
        reason,
    };

    for (field_name, interface_field) in &interface.fields {
        let Some(object_field) = object.fields.get(field_name) else {
            return Err(not_satisfied(format!("field '{field_name}' is missing")));
        };

        if !is_subtype(schema, &object_field.ty, &interface_field.ty) {
            return Err(not_satisfied(format!(
                "field '{field_name}' has type '{}', which is not compatible with '{}'",
                object_field.ty, interface_field.ty
            )));
        }

        for (argument_name, interface_argument) in &interface_field.arguments {
            match object_field.arguments.get(argument_name) {
                None => {
                    return Err(not_satisfied(format!(
                        "argument '{field_name}({argument_name})' is missing"
                    )));
                }
                Some(object_argument) if object_argument.ty != interface_argument.ty => {
                    return Err(not_satisfied(format!(
                        "argument '{field_name}({argument_name})' has type '{}', expected '{}'",
                        object_argument.ty, interface_argument.ty
                    )));
                }
                Some(_) => {}
            }
        }

        for (argument_name, object_argument) in &object_field.arguments {
            if !interface_field.arguments.contains_key(argument_name)
                && object_argument.ty.is_non_null()
            {
                return Err(not_satisfied(format!(
                    "additional argument '{field_name}({argument_name})' must be nullable"
                )));
            }
        }
    }

    Ok(())
}

/// Whether a field of type `sub` may implement an interface field of type `sup`.
fn is_subtype(schema: &Schema, sub: &TypeRef, sup: &TypeRef) -> bool {
    match (sub, sup) {
        (TypeRef::NonNull(sub), TypeRef::NonNull(sup)) => is_subtype(schema, sub, sup),
        (TypeRef::NonNull(sub), sup) => is_subtype(schema, sub, sup),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::List(sub), TypeRef::List(sup)) => is_subtype(schema, sub, sup),
        (TypeRef::Named(sub), TypeRef::Named(sup)) => {
            sub == sup || schema.is_possible_type(sup, sub)
        }
        _ => false,
    }
}

/// Reject input objects that can never be constructed: a cycle in which every edge is a non-null,
/// non-list field. Cycles broken by a nullable or list field are finite in practice and allowed.
fn check_input_cycles(schema: &Schema) -> Result<(), SchemaBuildError> {
    let mut done = HashSet::new();

    for definition in schema.types() {
        if let TypeKind::InputObject(_) = definition.kind {
            visit_input(schema, &definition.name, &mut vec![], &mut done)?;
        }
    }

    Ok(())
}

fn visit_input<'a>(
    schema: &'a Schema,
    name: &'a str,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), SchemaBuildError> {
    if done.contains(name) {
        return Ok(());
    }

    if let Some(start) = stack.iter().position(|visiting| *visiting == name) {
        let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(name.to_string());
        return Err(SchemaBuildError::UnsatisfiableInputCycle(cycle));
    }

    let Some(TypeDefinition {
        kind: TypeKind::InputObject(input),
        ..
    }) = schema.type_definition(name)
    else {
        return Ok(());
    };

    stack.push(name);
    for field in input.fields.values() {
        if let TypeRef::NonNull(inner) = &field.ty
            && let TypeRef::Named(target) = inner.as_ref()
        {
            visit_input(schema, target, stack, done)?;
        }
    }
    stack.pop();

    done.insert(name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use serde_json::{Value, json};
    use trellis_loader::Loaders;

    use super::*;
    use crate::{
        discriminator::PropertyDiscriminator,
        error::SchemaError,
        path::ResponsePath,
        resolver::{Arguments, ResolverContext, resolver_fn},
    };

    const LIBRARY: &str = r#"
        schema {
            query: Library
        }

        "A book or a movie"
        union Resource = Book | Movie

        interface Item {
            id: ID!
            related(limit: Int): [Item]
        }

        type Book implements Item {
            id: ID!
            title: String!
            related(limit: Int, lang: String): [Book!]
        }

        type Movie implements Item {
            id: ID!
            minutes: Int
            related(limit: Int): [Item]
        }

        enum Genre {
            FICTION
            HISTORY
        }

        input BookFilter {
            genre: Genre = FICTION
            after: BookFilter
        }

        type Library {
            resources(filter: BookFilter, first: Int = 10): [Resource!]!
            item(id: ID!): Item
        }

        extend type Library {
            genres: [Genre!]!
        }
    "#;

    fn build(sdl: &str) -> Result<Schema, SchemaBuildError> {
        SchemaBuilder::from_sdl(sdl)?.build()
    }

    #[test]
    fn builds_schema_from_sdl() {
        let schema = SchemaBuilder::from_sdl(LIBRARY)
            .unwrap()
            .discriminator("Resource", PropertyDiscriminator::new("kind"))
            .build()
            .unwrap();

        assert_eq!(
            schema.root_type_name(ast::OperationType::Query),
            Some("Library")
        );
        assert_eq!(schema.root_type_name(ast::OperationType::Mutation), None);

        let library = schema.type_definition("Library").unwrap();
        let field_names: Vec<_> = library.fields().unwrap().keys().collect();
        assert_eq!(field_names, ["resources", "item", "genres"]);

        let resources = schema.field_definition("Library", "resources").unwrap();
        assert_eq!(resources.ty.to_string(), "[Resource!]!");
        assert_eq!(
            resources.arguments["first"].default_value,
            Some(json!(10))
        );

        match &schema.type_definition("Item").unwrap().kind {
            TypeKind::Interface(interface) => {
                let implementers: Vec<_> = interface.implementers.iter().collect();
                assert_eq!(implementers, ["Book", "Movie"]);
            }
            other => panic!("Expected an interface, got {other:?}"),
        }

        match &schema.type_definition("BookFilter").unwrap().kind {
            TypeKind::InputObject(input) => {
                assert_eq!(input.fields["genre"].default_value, Some(json!("FICTION")));
            }
            other => panic!("Expected an input object, got {other:?}"),
        }

        assert_eq!(
            schema.type_definition("Resource").unwrap().description.as_deref(),
            Some("A book or a movie")
        );
    }

    #[test]
    fn resolves_abstract_types() {
        let schema = SchemaBuilder::from_sdl(LIBRARY)
            .unwrap()
            .discriminator("Resource", PropertyDiscriminator::new("kind"))
            .build()
            .unwrap();

        assert_eq!(
            schema.resolve_type(&json!({"kind": "Movie"}), "Resource"),
            Ok("Movie")
        );
        assert_eq!(
            schema.resolve_type(&json!({"__typename": "Book"}), "Item"),
            Ok("Book")
        );
        assert_eq!(
            schema.resolve_type(&json!({"kind": "Podcast"}), "Resource"),
            Err(SchemaError::AmbiguousType {
                abstract_type: "Resource".to_string(),
                concrete_type: "Podcast".to_string(),
            })
        );
        assert_eq!(
            schema.resolve_type(&json!({}), "Item"),
            Err(SchemaError::UnresolvedType("Item".to_string()))
        );
        assert_eq!(
            schema.resolve_type(&json!({}), "Book"),
            Err(SchemaError::NotAbstract("Book".to_string()))
        );

        assert!(schema.is_possible_type("Item", "Movie"));
        assert!(!schema.is_possible_type("Resource", "Library"));
    }

    #[test]
    fn unknown_fields_are_reported() {
        let schema = build(LIBRARY).unwrap();

        assert_eq!(
            schema.field_definition("Book", "isbn").unwrap_err(),
            SchemaError::UnknownField {
                type_name: "Book".to_string(),
                field_name: "isbn".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn binds_resolvers_at_build_time() {
        let schema = SchemaBuilder::from_sdl("type Query { greeting(name: String!): String! }")
            .unwrap()
            .resolver(
                "Query",
                "greeting",
                resolver_fn(|_, arguments, _| {
                    async move {
                        let name: String = arguments.require("name")?;
                        Ok::<_, crate::ResolverError>(json!(format!("Hello, {name}")))
                    }
                    .boxed()
                }),
            )
            .build()
            .unwrap();

        let field = schema.field_definition("Query", "greeting").unwrap();
        let path = ResponsePath::root();
        let loaders = Loaders::default();
        let context = ResolverContext::new("Query", "greeting", &path, &(), &loaders);
        let arguments = Arguments::from_iter([("name".to_string(), json!("Ada"))]);

        let value = field
            .resolver
            .resolve(&Value::Null, &arguments, &context)
            .await
            .unwrap();
        assert_eq!(value, json!("Hello, Ada"));
    }

    #[test]
    fn rejects_invalid_schemas() {
        let cases = [
            ("type Query { a: Int } type Query { b: Int }", "Type 'Query' is defined more than once"),
            ("type Query { a: Author }", "Type 'Author' referenced by 'Query.a' is not defined"),
            (
                "input Filter { a: Int } type Query { a: Filter }",
                "'Query.a' must have an output type, but 'Filter' is an input object",
            ),
            (
                "type Book { id: ID } type Query { a(book: Book): Int }",
                "'Query.a(book)' must have an input type, but 'Book' is not one",
            ),
            (
                "union U = Query | Int type Query { a: U }",
                "Union 'U' includes 'Int', which is not an object type",
            ),
            ("type Mutation { a: Int }", "Root type 'Query' for queries is not defined"),
            ("extend type Query { a: Int }", "Cannot extend 'Query': the type is not defined"),
            (
                "type Query { a: Int } extend input Query { b: Int }",
                "Cannot extend 'Query': the extension is of a different kind",
            ),
            (
                "type Query { a: Int a: String }",
                "Field 'a' is defined more than once on 'Query'",
            ),
            (
                "schema { query: Query mutation: Mutation } type Query { a: Int }",
                "Type 'Mutation' referenced by 'schema' is not defined",
            ),
            (
                "schema { query: Root } union Root = Query type Query { a: Int }",
                "Root type 'Root' for query operations must be an object type",
            ),
        ];

        for (sdl, expected) in cases {
            assert_eq!(build(sdl).unwrap_err().to_string(), expected, "{sdl}");
        }
    }

    #[test]
    fn checks_interface_implementations() {
        let cases = [
            (
                "interface Node { id: ID! } type Query implements Node { name: String }",
                "'Query' does not correctly implement 'Node': field 'id' is missing",
            ),
            (
                "interface Node { id: ID! } type Query implements Node { id: ID }",
                "'Query' does not correctly implement 'Node': field 'id' has type 'ID', which is not compatible with 'ID!'",
            ),
            (
                "interface Node { id(format: String): ID } type Query implements Node { id(format: Int): ID }",
                "'Query' does not correctly implement 'Node': argument 'id(format)' has type 'Int', expected 'String'",
            ),
            (
                "interface Node { id: ID } type Query implements Node { id(format: String!): ID }",
                "'Query' does not correctly implement 'Node': additional argument 'id(format)' must be nullable",
            ),
            (
                "type Node { id: ID } type Query implements Node { id: ID }",
                "'Query' implements 'Node', which is not an interface",
            ),
        ];

        for (sdl, expected) in cases {
            assert_eq!(build(sdl).unwrap_err().to_string(), expected, "{sdl}");
        }

        // Covariant return types (non-null and possible types) are accepted
        build(LIBRARY).unwrap();
    }

    #[test]
    fn checks_capability_targets() {
        let sdl = "union U = Query type Query { a: Int u: U }";

        let resolver = SchemaBuilder::from_sdl(sdl)
            .unwrap()
            .resolver("Query", "missing", PropertyResolver::new("a"))
            .build();
        assert!(matches!(
            resolver,
            Err(SchemaBuildError::UnknownResolverTarget { .. })
        ));

        let discriminator = SchemaBuilder::from_sdl(sdl)
            .unwrap()
            .discriminator("Query", TypenameDiscriminator)
            .build();
        assert!(matches!(
            discriminator,
            Err(SchemaBuildError::InvalidDiscriminatorTarget(name)) if name == "Query"
        ));

        let scalar = SchemaBuilder::from_sdl(sdl)
            .unwrap()
            .scalar("Date", OpaqueScalar)
            .build();
        assert!(matches!(
            scalar,
            Err(SchemaBuildError::InvalidScalarTarget(name)) if name == "Date"
        ));
    }

    #[test]
    fn input_cycles() {
        let required_cycle = r#"
            input A { b: B! }
            input B { a: A! }
            type Query { f(a: A): Int }
        "#;
        assert_eq!(
            build(required_cycle).unwrap_err().to_string(),
            "Input types form a cycle of required fields: A -> B -> A"
        );

        let broken_cycles = r#"
            input A { b: B! }
            input B { a: A }
            input C { c: [C!]! }
            type Query { f(a: A, c: C): Int }
        "#;
        build(broken_cycles).unwrap();
    }
}
