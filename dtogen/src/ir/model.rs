//! Class model definitions.
//!
//! The output of inference: one [`ClassModel`] per distinct object schema, one
//! [`EnumModel`] per distinct enumeration, each holding [`PropertyModel`]s in
//! schema order. The set is frozen into a [`ClassSet`] once inference ends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{ClassId, PrimitiveKind, TypeRef};

/// Whether a property must be present when (de)serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// Always serialized, even at its zero value
    Always,
    /// May be absent
    Optional,
}

/// Default literal in the shape of its primitive type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DefaultLiteral {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    String(String),
}

impl DefaultLiteral {
    /// Convert a schema default to a literal of `kind`.
    ///
    /// Returns `None` when the JSON value does not fit the primitive kind.
    pub fn from_value(kind: PrimitiveKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (PrimitiveKind::Integer, Value::Number(n)) => n.as_i64().map(DefaultLiteral::Integer),
            (PrimitiveKind::Number, Value::Number(n)) => n.as_f64().map(DefaultLiteral::Number),
            (PrimitiveKind::Boolean, Value::Bool(b)) => Some(DefaultLiteral::Boolean(*b)),
            (PrimitiveKind::String, Value::String(s)) => Some(DefaultLiteral::String(s.clone())),
            _ => None,
        }
    }
}

/// Per-property serialization behavior, decided at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializationDirective {
    pub requirement: Requirement,

    /// Omit the property when it is absent or holds its default
    pub omit_when_default: bool,

    /// Default literal to emit, only for primitive properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_literal: Option<DefaultLiteral>,
}

impl SerializationDirective {
    /// Compute the directive for a property.
    ///
    /// A default is carried only when the type is a primitive once any
    /// nullable wrapper is removed; defaults on other types are dropped.
    pub fn for_property(required: bool, ty: &TypeRef, default: Option<&Value>) -> Self {
        let default_literal = match (ty.unwrap_nullable(), default) {
            (TypeRef::Primitive(kind), Some(value)) => DefaultLiteral::from_value(*kind, value),
            _ => None,
        };

        Self {
            requirement: if required {
                Requirement::Always
            } else {
                Requirement::Optional
            },
            omit_when_default: !required,
            default_literal,
        }
    }

    /// Check if the property is always serialized.
    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Always
    }
}

/// One property of a generated class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyModel {
    /// Schema key, used verbatim for serialization
    pub json_name: String,

    /// Identifier in the generated code
    pub display_name: String,

    pub ty: TypeRef,

    pub required: bool,

    /// Schema default as written, kept even when the directive drops it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub directive: SerializationDirective,
}

/// A generated class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModel {
    pub id: ClassId,

    /// Collision-resolved display name
    pub name: String,

    /// Properties in schema order
    pub properties: Vec<PropertyModel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub source_is_named_definition: bool,

    /// JSON pointer of the defining schema
    pub pointer: String,
}

impl ClassModel {
    /// Check if a structural equality comparer is generated for this class.
    ///
    /// Named definitions always get one. Other classes get one when at least
    /// one property is not a directly comparable primitive.
    pub fn needs_comparer(&self) -> bool {
        self.source_is_named_definition
            || self
                .properties
                .iter()
                .any(|p| !p.ty.is_directly_comparable())
    }

    /// Look up a property by its schema key.
    pub fn property(&self, json_name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.json_name == json_name)
    }
}

/// Literal of an enumeration member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    String(String),
    Integer(i64),
}

impl EnumLiteral {
    /// Check if a JSON value is this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (EnumLiteral::String(s), Value::String(v)) => s == v,
            (EnumLiteral::Integer(i), Value::Number(n)) => n.as_i64() == Some(*i),
            _ => false,
        }
    }
}

/// One member of a generated enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Identifier in the generated code
    pub name: String,
    pub literal: EnumLiteral,
}

/// A generated enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumModel {
    pub id: ClassId,

    pub name: String,

    /// Members in schema order
    pub members: Vec<EnumMember>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub source_is_named_definition: bool,

    pub pointer: String,
}

impl EnumModel {
    /// Check if every literal is a string.
    pub fn is_string_enum(&self) -> bool {
        self.members
            .iter()
            .all(|m| matches!(m.literal, EnumLiteral::String(_)))
    }

    /// Position of the member matching a JSON value.
    pub fn position_of(&self, value: &Value) -> Option<usize> {
        self.members.iter().position(|m| m.literal.matches(value))
    }
}

/// Either kind of generated type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeModel {
    Class(ClassModel),
    Enum(EnumModel),
}

impl TypeModel {
    /// Id of the generated type.
    pub fn id(&self) -> ClassId {
        match self {
            TypeModel::Class(c) => c.id,
            TypeModel::Enum(e) => e.id,
        }
    }

    /// Display name of the generated type.
    pub fn name(&self) -> &str {
        match self {
            TypeModel::Class(c) => &c.name,
            TypeModel::Enum(e) => &e.name,
        }
    }
}

/// The frozen result of one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSet {
    /// Generated types in registration order, indexed by [`ClassId`]
    pub types: Vec<TypeModel>,

    /// Type of the root schema
    pub root: TypeRef,
}

impl ClassSet {
    /// Get a generated type by id.
    pub fn get(&self, id: ClassId) -> Option<&TypeModel> {
        self.types.get(id.index())
    }

    /// Get a class by id.
    pub fn class(&self, id: ClassId) -> Option<&ClassModel> {
        match self.get(id) {
            Some(TypeModel::Class(c)) => Some(c),
            _ => None,
        }
    }

    /// Get an enumeration by id.
    pub fn enumeration(&self, id: ClassId) -> Option<&EnumModel> {
        match self.get(id) {
            Some(TypeModel::Enum(e)) => Some(e),
            _ => None,
        }
    }

    /// All classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassModel> {
        self.types.iter().filter_map(|t| match t {
            TypeModel::Class(c) => Some(c),
            TypeModel::Enum(_) => None,
        })
    }

    /// All enumerations in registration order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumModel> {
        self.types.iter().filter_map(|t| match t {
            TypeModel::Enum(e) => Some(e),
            TypeModel::Class(_) => None,
        })
    }

    /// Find a generated type by display name.
    pub fn find(&self, name: &str) -> Option<&TypeModel> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Class the root schema compiled to, when the root is an object.
    pub fn root_class(&self) -> Option<&ClassModel> {
        match self.root.unwrap_nullable() {
            TypeRef::ClassRef(id) => self.class(*id),
            _ => None,
        }
    }

    /// Number of generated types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types were generated.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
