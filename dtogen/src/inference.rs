//! Type Inference Engine.
//!
//! Walks a [`SchemaDocument`] depth-first and reduces every node to a
//! [`TypeRef`], materializing a class for each distinct object schema.
//!
//! The pass runs in two phases:
//!
//! 1. every object or enum definition gets an id reserved up front, so
//!    references to definitions declared later, or to the definition being
//!    compiled, resolve to a `ClassRef` instead of being inlined;
//! 2. definition bodies and the root are compiled, each property resolved in
//!    schema order.
//!
//! The first error aborts the compilation; nothing partial is returned.

use crate::error::{CompileError, CompileResult};
use crate::ir::{
    ClassSet, EnumLiteral, Format, PrimitiveKind, PropertyModel, SerializationDirective, TypeRef,
};
use crate::naming;
use crate::registry::ClassRegistry;
use crate::schema::{Items, SchemaDocument, SchemaKind, SchemaNode};

/// Default name of the class generated for the root schema.
pub const DEFAULT_ROOT_NAME: &str = "Root";

/// Compile a schema document into its class set.
pub fn infer(document: &SchemaDocument, root_name: &str) -> CompileResult<ClassSet> {
    TypeInference::new(document).run(root_name)
}

/// Single-use inference pass over one document.
#[derive(Debug)]
pub struct TypeInference<'a> {
    document: &'a SchemaDocument,
    registry: ClassRegistry,

    /// Alias definitions currently being expanded
    alias_stack: Vec<String>,
}

impl<'a> TypeInference<'a> {
    /// Create a pass over `document`.
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self {
            document,
            registry: ClassRegistry::new(),
            alias_stack: Vec::new(),
        }
    }

    /// Run the pass and freeze the result.
    pub fn run(mut self, root_name: &str) -> CompileResult<ClassSet> {
        let document = self.document;

        for (name, node) in &document.definitions {
            if is_nominal(node) {
                let candidate = naming::identifier(name, "Definition");
                self.registry
                    .reserve_definition(name, &candidate, &node.pointer)?;
            }
        }

        for (name, node) in &document.definitions {
            self.compile_definition(name, node)?;
        }

        let root_name = naming::identifier(root_name, DEFAULT_ROOT_NAME);
        let root = &document.root;
        let root_ty = if root.kind == SchemaKind::Object {
            ensure_supported(root)?;
            // Claimed before the properties so inline classes cannot take it.
            let root_name = self.registry.reserve_name(&root_name)?;
            let properties = self.properties(root)?;
            let id = self.registry.register_nominal_class(
                root_name,
                &root.pointer,
                properties,
                root.description.clone(),
            )?;
            TypeRef::ClassRef(id)
        } else {
            self.resolve(root, &root_name)?
        };

        let classes = self.registry.finish(root_ty)?;
        tracing::debug!(types = classes.len(), "inference finished");
        Ok(classes)
    }

    /// Compile the body of one named definition.
    fn compile_definition(&mut self, name: &str, node: &SchemaNode) -> CompileResult<()> {
        ensure_supported(node)?;
        match (node.kind, self.registry.definition(name)) {
            (SchemaKind::Object, Some(id)) => {
                let properties = self.properties(node)?;
                self.registry
                    .fill_class(id, properties, node.description.clone())?;
            }
            (SchemaKind::Enum, Some(id)) => {
                let literals = enum_literals(node)?;
                self.registry
                    .fill_enum(id, literals, node.description.clone())?;
            }
            _ => {
                // Aliases have no class of their own, but whatever they
                // contain is still emitted.
                self.resolve_alias(name, node)?;
            }
        }
        Ok(())
    }

    /// Resolve every property of an object node, in schema order.
    fn properties(&mut self, node: &SchemaNode) -> CompileResult<Vec<PropertyModel>> {
        let mut properties = Vec::with_capacity(node.properties.len());
        for (json_name, property) in &node.properties {
            let candidate = naming::identifier(json_name, "Property");
            let ty = self.resolve(property, &candidate)?;
            let required = node.is_required(json_name);
            let directive =
                SerializationDirective::for_property(required, &ty, property.default_value.as_ref());

            if property.default_value.is_some() && directive.default_literal.is_none() {
                tracing::debug!(
                    pointer = %property.pointer,
                    "default value not emitted for this property type"
                );
            }

            properties.push(PropertyModel {
                json_name: json_name.clone(),
                display_name: String::new(),
                ty,
                required,
                default_value: property.default_value.clone(),
                description: property.description.clone(),
                directive,
            });
        }
        Ok(properties)
    }

    /// Reduce a schema node to its type, registering classes as needed.
    ///
    /// `candidate` is the name a class or enum created for this node gets.
    pub fn resolve(&mut self, node: &SchemaNode, candidate: &str) -> CompileResult<TypeRef> {
        ensure_supported(node)?;
        tracing::trace!(pointer = %node.pointer, kind = ?node.kind, "resolving schema node");

        match node.kind {
            SchemaKind::String => Ok(node
                .format
                .as_deref()
                .and_then(Format::from_keyword)
                .map(TypeRef::FormattedPrimitive)
                .unwrap_or(TypeRef::Primitive(PrimitiveKind::String))),
            SchemaKind::Number => Ok(TypeRef::Primitive(PrimitiveKind::Number)),
            SchemaKind::Integer => Ok(TypeRef::Primitive(PrimitiveKind::Integer)),
            SchemaKind::Boolean => Ok(TypeRef::Primitive(PrimitiveKind::Boolean)),
            SchemaKind::Null => Err(CompileError::unsupported(
                "null type outside a nullable union",
                &node.pointer,
            )),
            SchemaKind::Array => match &node.items {
                None => Err(CompileError::missing_items(&node.pointer)),
                Some(Items::Tuple(_)) => Err(CompileError::unsupported(
                    "tuple-typed array items",
                    &node.pointer,
                )),
                Some(Items::Single(items)) => {
                    let item_candidate = format!("{}Item", candidate);
                    Ok(TypeRef::array_of(self.resolve(items, &item_candidate)?))
                }
            },
            SchemaKind::Enum => {
                let literals = enum_literals(node)?;
                let id = self.registry.intern_enum(
                    candidate,
                    &node.pointer,
                    literals,
                    node.description.clone(),
                )?;
                Ok(TypeRef::EnumRef(id))
            }
            SchemaKind::Union => self.collapse_union(node, candidate),
            SchemaKind::Ref => {
                let target = node.ref_target.as_deref().unwrap_or_default();
                self.resolve_reference(target, &node.pointer)
            }
            SchemaKind::Object => {
                let properties = self.properties(node)?;
                let id = self.registry.intern_class(
                    candidate,
                    &node.pointer,
                    properties,
                    node.description.clone(),
                )?;
                Ok(TypeRef::ClassRef(id))
            }
        }
    }

    /// Collapse a `{T, null}` union into `Nullable(T)`.
    ///
    /// No class is allocated for the union itself. Every other union shape is
    /// rejected.
    fn collapse_union(&mut self, node: &SchemaNode, candidate: &str) -> CompileResult<TypeRef> {
        let branches = &node.union_branches;
        let null_count = branches
            .iter()
            .filter(|b| b.kind == SchemaKind::Null)
            .count();

        if branches.len() != 2 || null_count != 1 {
            let construct = if branches.len() != 2 {
                format!("union of {} branches", branches.len())
            } else {
                "union without exactly one null branch".to_string()
            };
            return Err(CompileError::unsupported(construct, &node.pointer));
        }

        let other = branches
            .iter()
            .find(|b| b.kind != SchemaKind::Null)
            .ok_or_else(|| CompileError::unsupported("union of null types", &node.pointer))?;

        let inner = self.resolve(other, candidate)?;
        Ok(match inner {
            nullable @ TypeRef::Nullable(_) => nullable,
            inner => TypeRef::nullable(inner),
        })
    }

    /// Resolve a `$ref` to a named definition.
    fn resolve_reference(&mut self, target: &str, pointer: &str) -> CompileResult<TypeRef> {
        if let Some(id) = self.registry.definition(target) {
            let is_enum = self
                .document
                .definitions
                .get(target)
                .is_some_and(|d| d.kind == SchemaKind::Enum);
            return Ok(if is_enum {
                TypeRef::EnumRef(id)
            } else {
                TypeRef::ClassRef(id)
            });
        }

        match self.document.definitions.get(target) {
            Some(definition) => self.resolve_alias(target, definition),
            None => Err(CompileError::unresolved(target, pointer)),
        }
    }

    /// Resolve a definition that is not an object or enum to its type.
    fn resolve_alias(&mut self, name: &str, definition: &SchemaNode) -> CompileResult<TypeRef> {
        if self.alias_stack.iter().any(|n| n == name) {
            return Err(CompileError::unsupported("circular alias", &definition.pointer));
        }
        self.alias_stack.push(name.to_string());
        let candidate = naming::identifier(name, "Definition");
        let result = self.resolve(definition, &candidate);
        self.alias_stack.pop();
        result
    }
}

/// Definitions that own a class or enum of their own.
fn is_nominal(node: &SchemaNode) -> bool {
    matches!(node.kind, SchemaKind::Object | SchemaKind::Enum)
}

fn ensure_supported(node: &SchemaNode) -> CompileResult<()> {
    match node.unsupported.first() {
        Some(keyword) => Err(CompileError::unsupported(keyword.as_str(), &node.pointer)),
        None => Ok(()),
    }
}

/// Literal set of an enum node, in schema order without duplicates.
///
/// All literals must be strings, or all must be integers.
fn enum_literals(node: &SchemaNode) -> CompileResult<Vec<EnumLiteral>> {
    if node.enum_values.is_empty() {
        return Err(CompileError::unsupported("empty enum", &node.pointer));
    }

    let mut literals: Vec<EnumLiteral> = Vec::with_capacity(node.enum_values.len());
    for value in &node.enum_values {
        let literal = match value {
            serde_json::Value::String(s) => EnumLiteral::String(s.clone()),
            serde_json::Value::Number(n) if n.as_i64().is_some() => {
                EnumLiteral::Integer(n.as_i64().unwrap_or_default())
            }
            _ => {
                return Err(CompileError::unsupported(
                    "enum literal that is not a string or an integer",
                    &node.pointer,
                ))
            }
        };
        if !literals.contains(&literal) {
            literals.push(literal);
        }
    }

    let all_strings = literals.iter().all(|l| matches!(l, EnumLiteral::String(_)));
    let all_integers = literals.iter().all(|l| matches!(l, EnumLiteral::Integer(_)));
    if !all_strings && !all_integers {
        return Err(CompileError::unsupported(
            "enum mixing string and integer literals",
            &node.pointer,
        ));
    }
    Ok(literals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ir::{ClassId, TypeModel};
    use serde_json::json;

    fn compile(value: serde_json::Value) -> CompileResult<ClassSet> {
        let document = SchemaDocument::from_value(&value)?;
        infer(&document, DEFAULT_ROOT_NAME)
    }

    #[test]
    fn test_primitives_and_formats() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "s": { "type": "string" },
                "n": { "type": "number" },
                "i": { "type": "integer" },
                "b": { "type": "boolean" },
                "when": { "type": "string", "format": "date-time" },
                "link": { "type": "string", "format": "uri-reference" },
                "mail": { "type": "string", "format": "email" }
            }
        }))
        .unwrap();

        let root = set.root_class().unwrap();
        let types: Vec<&TypeRef> = root.properties.iter().map(|p| &p.ty).collect();
        assert_eq!(
            types,
            vec![
                &TypeRef::Primitive(PrimitiveKind::String),
                &TypeRef::Primitive(PrimitiveKind::Number),
                &TypeRef::Primitive(PrimitiveKind::Integer),
                &TypeRef::Primitive(PrimitiveKind::Boolean),
                &TypeRef::FormattedPrimitive(Format::DateTime),
                &TypeRef::FormattedPrimitive(Format::Uri),
                &TypeRef::Primitive(PrimitiveKind::String),
            ]
        );
        assert!(!root.needs_comparer());
    }

    #[test]
    fn test_nullable_array_collapse_allocates_no_class() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "p": { "type": ["array", "null"], "items": { "type": "integer" } }
            }
        }))
        .unwrap();

        assert_eq!(set.len(), 1);
        let p = set.root_class().unwrap().property("p").unwrap();
        assert_eq!(
            p.ty,
            TypeRef::nullable(TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Integer)))
        );
        assert!(!p.required);
    }

    #[test]
    fn test_deeply_nested_arrays() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "grid": {
                    "type": "array",
                    "items": { "type": "array", "items": { "type": "array", "items": { "type": "number" } } }
                }
            }
        }))
        .unwrap();
        let grid = set.root_class().unwrap().property("grid").unwrap();
        assert_eq!(grid.ty.array_depth(), 3);
    }

    #[test]
    fn test_inline_objects_are_deduplicated() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "home": { "type": "object", "properties": { "street": { "type": "string" } } },
                "work": { "type": "object", "properties": { "street": { "type": "string" } } }
            }
        }))
        .unwrap();

        let root = set.root_class().unwrap();
        assert_eq!(root.property("home").unwrap().ty, root.property("work").unwrap().ty);
        assert_eq!(set.classes().count(), 2);
        assert!(set.find("Home").is_some());
        assert!(set.find("Work").is_none());
    }

    #[test]
    fn test_forward_and_recursive_references() {
        let set = compile(json!({
            "type": "object",
            "properties": { "head": { "$ref": "#/definitions/Node" } },
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "next": { "oneOf": [{ "$ref": "#/definitions/Node" }, { "type": "null" }] },
                        "tag": { "$ref": "#/definitions/Tag" }
                    }
                },
                "Tag": { "type": "object", "properties": { "label": { "type": "string" } } }
            }
        }))
        .unwrap();

        let node = match set.find("Node").unwrap() {
            TypeModel::Class(c) => c,
            TypeModel::Enum(_) => panic!("Node should be a class"),
        };
        assert_eq!(
            node.property("next").unwrap().ty,
            TypeRef::nullable(TypeRef::ClassRef(node.id))
        );
        assert_eq!(node.property("tag").unwrap().ty, TypeRef::ClassRef(ClassId(1)));
        assert_eq!(set.get(ClassId(1)).unwrap().name(), "Tag");
    }

    #[test]
    fn test_unreferenced_definitions_are_emitted() {
        let set = compile(json!({
            "type": "object",
            "properties": {},
            "definitions": {
                "Unused": { "type": "object", "properties": { "x": { "type": "integer" } } }
            }
        }))
        .unwrap();
        assert!(set.find("Unused").is_some());
    }

    #[test]
    fn test_alias_definitions_resolve_to_their_type() {
        let set = compile(json!({
            "type": "object",
            "properties": { "ids": { "$ref": "#/definitions/IdList" } },
            "definitions": {
                "IdList": { "type": "array", "items": { "type": "integer" } }
            }
        }))
        .unwrap();
        assert_eq!(
            set.root_class().unwrap().property("ids").unwrap().ty,
            TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Integer))
        );
    }

    #[test]
    fn test_circular_alias_is_rejected() {
        let err = compile(json!({
            "type": "object",
            "properties": { "a": { "$ref": "#/definitions/A" } },
            "definitions": {
                "A": { "type": "array", "items": { "$ref": "#/definitions/B" } },
                "B": { "type": "array", "items": { "$ref": "#/definitions/A" } }
            }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSchemaConstruct);
    }

    #[test]
    fn test_enum_definitions_and_inline_enums() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "status": { "enum": ["open", "closed"] },
                "level": { "$ref": "#/definitions/Level" }
            },
            "definitions": { "Level": { "enum": [1, 2, 3] } }
        }))
        .unwrap();

        let root = set.root_class().unwrap();
        let status = &root.property("status").unwrap().ty;
        let level = &root.property("level").unwrap().ty;
        assert!(matches!(status, TypeRef::EnumRef(_)));
        assert!(matches!(level, TypeRef::EnumRef(_)));
        assert!(root.needs_comparer());
        assert_eq!(set.enums().count(), 2);
    }

    #[test]
    fn test_failures() {
        let err = compile(json!({
            "type": "object",
            "properties": { "list": { "type": "array" } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArrayItemSchema);
        assert_eq!(err.pointer(), Some("#/properties/list"));

        let err = compile(json!({
            "type": "object",
            "properties": { "x": { "$ref": "#/definitions/Nope" } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);

        let err = compile(json!({
            "type": "object",
            "properties": { "x": { "type": ["string", "integer"] } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSchemaConstruct);

        let err = compile(json!({
            "type": "object",
            "properties": { "x": { "anyOf": [{ "type": "string" }, { "type": "integer" }, { "type": "null" }] } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSchemaConstruct);

        let err = compile(json!({
            "type": "object",
            "properties": { "t": { "type": "array", "items": [{ "type": "string" }] } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSchemaConstruct);

        let err = compile(json!({
            "type": "object",
            "properties": { "e": { "enum": ["a", 1] } }
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSchemaConstruct);
    }

    #[test]
    fn test_errors_inside_unreferenced_definitions_abort() {
        let err = compile(json!({
            "type": "object",
            "properties": {},
            "definitions": { "Broken": { "type": "object", "properties": { "l": { "type": "array" } } } }
        }))
        .unwrap_err();
        assert_eq!(err.pointer(), Some("#/definitions/Broken/properties/l"));
    }

    #[test]
    fn test_non_object_root() {
        let set = compile(json!({
            "type": "array",
            "items": { "type": "object", "properties": { "id": { "type": "integer" } } }
        }))
        .unwrap();
        assert!(matches!(&set.root, TypeRef::ArrayOf(inner) if matches!(**inner, TypeRef::ClassRef(_))));
        assert!(set.find("RootItem").is_some());
    }
}
