//! Schema Tree.
//!
//! The in-memory form of a JSON Schema document as consumed by the compiler.
//! Nodes are immutable once loaded; every node remembers the JSON pointer it
//! was read from so that errors can be located.

pub mod parser;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

pub use parser::SchemaParser;

/// Shape of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Enum,
    Union,
    Ref,
}

impl SchemaKind {
    /// Map a JSON Schema `type` keyword to a kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "object" => Some(SchemaKind::Object),
            "array" => Some(SchemaKind::Array),
            "string" => Some(SchemaKind::String),
            "number" => Some(SchemaKind::Number),
            "integer" => Some(SchemaKind::Integer),
            "boolean" => Some(SchemaKind::Boolean),
            "null" => Some(SchemaKind::Null),
            _ => None,
        }
    }
}

/// The `items` keyword of an array schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema for every element.
    Single(Box<SchemaNode>),
    /// Positional (tuple) item schemas.
    Tuple(Vec<SchemaNode>),
}

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,

    /// Object properties in document order
    pub properties: IndexMap<String, SchemaNode>,

    pub required_names: IndexSet<String>,

    pub items: Option<Items>,

    /// Enum literals in document order
    pub enum_values: Vec<Value>,

    /// Branches of a union (`oneOf`, `anyOf` or a multi-valued `type`)
    pub union_branches: Vec<SchemaNode>,

    pub default_value: Option<Value>,

    pub format: Option<String>,

    pub description: Option<String>,

    pub title: Option<String>,

    /// Set when the node is the body of a named definition
    pub definition_name: Option<String>,

    /// Name of the definition this node aliases (`kind == Ref`)
    pub ref_target: Option<String>,

    /// JSON pointer of this node within the document
    pub pointer: String,

    /// Keywords present on the node that the compiler does not translate
    pub unsupported: Vec<String>,
}

impl SchemaNode {
    /// Create an empty node of the given kind at `pointer`.
    pub fn new(kind: SchemaKind, pointer: impl Into<String>) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            required_names: IndexSet::new(),
            items: None,
            enum_values: Vec::new(),
            union_branches: Vec::new(),
            default_value: None,
            format: None,
            description: None,
            title: None,
            definition_name: None,
            ref_target: None,
            pointer: pointer.into(),
            unsupported: Vec::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties.insert(name.into(), node);
        self
    }

    /// Mark a property name as required.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required_names.insert(name.into());
        self
    }

    /// Set a single item schema.
    pub fn with_items(mut self, items: SchemaNode) -> Self {
        self.items = Some(Items::Single(Box::new(items)));
        self
    }

    /// Set the default literal.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set the format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if a property is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required_names.contains(name)
    }
}

/// A loaded schema document: the root node plus its named definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub root: SchemaNode,

    /// `definitions` and `$defs`, in document order
    pub definitions: IndexMap<String, SchemaNode>,
}

impl SchemaDocument {
    /// Create a document without definitions.
    pub fn new(root: SchemaNode) -> Self {
        Self {
            root,
            definitions: IndexMap::new(),
        }
    }

    /// Add a named definition.
    pub fn with_definition(mut self, name: impl Into<String>, mut node: SchemaNode) -> Self {
        let name = name.into();
        node.definition_name = Some(name.clone());
        self.definitions.insert(name, node);
        self
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(source: &str) -> crate::error::CompileResult<Self> {
        SchemaParser::new().parse_str(source)
    }

    /// Parse a document from an already deserialized JSON value.
    pub fn from_value(value: &Value) -> crate::error::CompileResult<Self> {
        SchemaParser::new().parse_value(value)
    }

    /// Title of the root schema, if any.
    pub fn title(&self) -> Option<&str> {
        self.root.title.as_deref()
    }
}
