//! Schema loader.
//!
//! Turns JSON text (or an already parsed [`serde_json::Value`]) into a
//! [`SchemaDocument`]. This is a plain structural translation; it does not
//! decide target types. Keywords the compiler cannot translate are recorded on
//! the node and rejected later by inference, so the error points at the node
//! that is actually used.

use serde_json::{Map, Value};

use super::{Items, SchemaDocument, SchemaKind, SchemaNode};
use crate::error::{CompileError, CompileResult};

/// Keywords that are recognised but not translated.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "patternProperties",
    "additionalItems",
    "allOf",
    "not",
    "if",
    "dependentSchemas",
];

/// Reference prefixes that resolve to named definitions.
const DEFINITION_PREFIXES: &[&str] = &["#/definitions/", "#/$defs/"];

/// Loader from JSON into the schema tree.
#[derive(Debug, Clone, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from JSON text.
    pub fn parse_str(&self, source: &str) -> CompileResult<SchemaDocument> {
        let value: Value = serde_json::from_str(source).map_err(|e| CompileError::syntax(&e))?;
        self.parse_value(&value)
    }

    /// Parse a document from a JSON value.
    pub fn parse_value(&self, value: &Value) -> CompileResult<SchemaDocument> {
        let map = value
            .as_object()
            .ok_or_else(|| CompileError::invalid("schema root must be an object", "#"))?;

        let mut document = SchemaDocument::new(self.parse_node(value, "#".to_string())?);

        for keyword in ["definitions", "$defs"] {
            let Some(defs) = map.get(keyword) else {
                continue;
            };
            let defs = defs.as_object().ok_or_else(|| {
                CompileError::invalid(format!("'{}' must be an object", keyword), "#")
            })?;
            for (name, def) in defs {
                let pointer = format!("#/{}/{}", keyword, escape_pointer(name));
                let mut node = self.parse_node(def, pointer)?;
                node.definition_name = Some(name.clone());
                document.definitions.insert(name.clone(), node);
            }
        }

        tracing::debug!(
            definitions = document.definitions.len(),
            "schema document loaded"
        );

        Ok(document)
    }

    /// Parse one schema node.
    fn parse_node(&self, value: &Value, pointer: String) -> CompileResult<SchemaNode> {
        let map = value
            .as_object()
            .ok_or_else(|| CompileError::invalid("schema must be an object", pointer.clone()))?;

        if let Some(reference) = map.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| CompileError::invalid("'$ref' must be a string", pointer.clone()))?;
            let target = parse_reference(reference)
                .ok_or_else(|| CompileError::unresolved(reference, pointer.clone()))?;
            let mut node = self.annotated(SchemaKind::Ref, map, &pointer)?;
            node.ref_target = Some(target);
            return Ok(node);
        }

        if let Some(values) = map.get("enum") {
            let values = values
                .as_array()
                .ok_or_else(|| CompileError::invalid("'enum' must be an array", pointer.clone()))?;
            let mut node = self.annotated(SchemaKind::Enum, map, &pointer)?;
            node.enum_values = values.clone();
            return Ok(node);
        }

        let one_of = map.get("oneOf");
        let any_of = map.get("anyOf");
        if one_of.is_some() && any_of.is_some() {
            return Err(CompileError::unsupported(
                "both oneOf and anyOf on one schema",
                pointer,
            ));
        }
        if let Some((keyword, branches)) = one_of
            .map(|b| ("oneOf", b))
            .or_else(|| any_of.map(|b| ("anyOf", b)))
        {
            let branches = branches.as_array().ok_or_else(|| {
                CompileError::invalid(format!("'{}' must be an array", keyword), pointer.clone())
            })?;
            let mut node = self.annotated(SchemaKind::Union, map, &pointer)?;
            for (i, branch) in branches.iter().enumerate() {
                let branch_pointer = format!("{}/{}/{}", pointer, keyword, i);
                node.union_branches.push(self.parse_node(branch, branch_pointer)?);
            }
            return Ok(node);
        }

        match map.get("type") {
            Some(Value::String(name)) => {
                let kind = type_kind(name, &pointer)?;
                self.typed(kind, map, &pointer)
            }
            Some(Value::Array(names)) => {
                let mut kinds = Vec::with_capacity(names.len());
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        CompileError::invalid("'type' entries must be strings", pointer.clone())
                    })?;
                    kinds.push(type_kind(name, &pointer)?);
                }
                match kinds.as_slice() {
                    [] => Err(CompileError::invalid("'type' must not be empty", pointer)),
                    [kind] => self.typed(*kind, map, &pointer),
                    _ => {
                        // Each branch is the same node narrowed to one type.
                        let mut node = self.annotated(SchemaKind::Union, map, &pointer)?;
                        for kind in kinds {
                            node.union_branches.push(self.typed(kind, map, &pointer)?);
                        }
                        Ok(node)
                    }
                }
            }
            Some(_) => Err(CompileError::invalid(
                "'type' must be a string or an array of strings",
                pointer,
            )),
            None if map.contains_key("properties") => self.typed(SchemaKind::Object, map, &pointer),
            None if map.contains_key("items") => self.typed(SchemaKind::Array, map, &pointer),
            None => Err(CompileError::unsupported("untyped schema", pointer)),
        }
    }

    /// Build a node of `kind`, reading the structural keywords for that kind.
    fn typed(
        &self,
        kind: SchemaKind,
        map: &Map<String, Value>,
        pointer: &str,
    ) -> CompileResult<SchemaNode> {
        let mut node = self.annotated(kind, map, pointer)?;

        match kind {
            SchemaKind::Object => {
                if let Some(properties) = map.get("properties") {
                    let properties = properties.as_object().ok_or_else(|| {
                        CompileError::invalid("'properties' must be an object", pointer)
                    })?;
                    for (name, property) in properties {
                        let property_pointer =
                            format!("{}/properties/{}", pointer, escape_pointer(name));
                        node.properties
                            .insert(name.clone(), self.parse_node(property, property_pointer)?);
                    }
                }
                if let Some(required) = map.get("required") {
                    let required = required.as_array().ok_or_else(|| {
                        CompileError::invalid("'required' must be an array", pointer)
                    })?;
                    for name in required {
                        let name = name.as_str().ok_or_else(|| {
                            CompileError::invalid("'required' entries must be strings", pointer)
                        })?;
                        node.required_names.insert(name.to_string());
                    }
                }
            }
            SchemaKind::Array => {
                node.items = match map.get("items") {
                    None => None,
                    Some(items @ Value::Object(_)) => Some(Items::Single(Box::new(
                        self.parse_node(items, format!("{}/items", pointer))?,
                    ))),
                    Some(Value::Array(entries)) => {
                        let mut tuple = Vec::with_capacity(entries.len());
                        for (i, entry) in entries.iter().enumerate() {
                            tuple.push(self.parse_node(entry, format!("{}/items/{}", pointer, i))?);
                        }
                        Some(Items::Tuple(tuple))
                    }
                    Some(_) => {
                        return Err(CompileError::invalid(
                            "'items' must be a schema or an array of schemas",
                            pointer,
                        ))
                    }
                };
            }
            _ => {}
        }

        Ok(node)
    }

    /// Build a node of `kind` carrying only the annotation keywords.
    fn annotated(
        &self,
        kind: SchemaKind,
        map: &Map<String, Value>,
        pointer: &str,
    ) -> CompileResult<SchemaNode> {
        let mut node = SchemaNode::new(kind, pointer);
        node.description = optional_string(map, "description", pointer)?;
        node.title = optional_string(map, "title", pointer)?;
        node.format = optional_string(map, "format", pointer)?;
        node.default_value = map.get("default").cloned();
        node.unsupported = UNSUPPORTED_KEYWORDS
            .iter()
            .filter(|keyword| map.contains_key(**keyword))
            .map(|keyword| keyword.to_string())
            .collect();
        Ok(node)
    }
}

fn type_kind(name: &str, pointer: &str) -> CompileResult<SchemaKind> {
    SchemaKind::from_type_name(name)
        .ok_or_else(|| CompileError::invalid(format!("unknown type '{}'", name), pointer))
}

fn optional_string(
    map: &Map<String, Value>,
    key: &str,
    pointer: &str,
) -> CompileResult<Option<String>> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CompileError::invalid(
            format!("'{}' must be a string", key),
            pointer,
        )),
    }
}

/// Extract the definition name from a local `$ref`.
pub fn parse_reference(reference: &str) -> Option<String> {
    DEFINITION_PREFIXES.iter().find_map(|prefix| {
        reference
            .strip_prefix(prefix)
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .map(unescape_pointer)
    })
}

/// Escape a JSON pointer reference token.
pub fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
