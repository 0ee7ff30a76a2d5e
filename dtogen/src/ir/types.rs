//! Type reference definitions.
//!
//! A [`TypeRef`] is what a schema node reduces to. It is structurally acyclic:
//! recursion in the schema graph is expressed through [`ClassId`]s, never by
//! nesting a class inside itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a class or enumeration in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub usize);

impl ClassId {
    /// Arena index of this id.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
}

/// String formats with a dedicated target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// `date-time`
    DateTime,
    /// `uri` and `uri-reference`
    Uri,
}

impl Format {
    /// Map a JSON Schema `format` value to a dedicated format.
    ///
    /// Formats without a dedicated target type return `None` and stay plain strings.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "date-time" => Some(Format::DateTime),
            "uri" | "uri-reference" => Some(Format::Uri),
            _ => None,
        }
    }
}

/// Target type of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypeRef {
    Primitive(PrimitiveKind),

    FormattedPrimitive(Format),

    /// Homogeneous array, nestable to any depth
    ArrayOf(Box<TypeRef>),

    ClassRef(ClassId),

    EnumRef(ClassId),

    /// Only produced by collapsing a `{T, null}` union
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    /// Wrap in an array.
    pub fn array_of(inner: TypeRef) -> Self {
        TypeRef::ArrayOf(Box::new(inner))
    }

    /// Wrap in a nullable.
    pub fn nullable(inner: TypeRef) -> Self {
        TypeRef::Nullable(Box::new(inner))
    }

    /// The type with any outer `Nullable` removed.
    pub fn unwrap_nullable(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner.unwrap_nullable(),
            other => other,
        }
    }

    /// Check if this is a nullable wrapper.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// Check if values of this type compare directly by value.
    ///
    /// True for primitives and formatted primitives, also when nullable.
    pub fn is_directly_comparable(&self) -> bool {
        matches!(
            self.unwrap_nullable(),
            TypeRef::Primitive(_) | TypeRef::FormattedPrimitive(_)
        )
    }

    /// Number of array levels at the top of this type.
    pub fn array_depth(&self) -> usize {
        match self.unwrap_nullable() {
            TypeRef::ArrayOf(inner) => 1 + inner.array_depth(),
            _ => 0,
        }
    }

    /// Collect every class or enum id this type mentions.
    pub fn referenced_ids(&self, out: &mut Vec<ClassId>) {
        match self {
            TypeRef::ClassRef(id) | TypeRef::EnumRef(id) => out.push(*id),
            TypeRef::ArrayOf(inner) | TypeRef::Nullable(inner) => inner.referenced_ids(out),
            TypeRef::Primitive(_) | TypeRef::FormattedPrimitive(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keywords() {
        assert_eq!(Format::from_keyword("date-time"), Some(Format::DateTime));
        assert_eq!(Format::from_keyword("uri"), Some(Format::Uri));
        assert_eq!(Format::from_keyword("uri-reference"), Some(Format::Uri));
        assert_eq!(Format::from_keyword("email"), None);
    }

    #[test]
    fn test_directly_comparable() {
        let int = TypeRef::Primitive(PrimitiveKind::Integer);
        assert!(int.is_directly_comparable());
        assert!(TypeRef::nullable(int.clone()).is_directly_comparable());
        assert!(TypeRef::FormattedPrimitive(Format::Uri).is_directly_comparable());
        assert!(!TypeRef::array_of(int.clone()).is_directly_comparable());
        assert!(!TypeRef::nullable(TypeRef::array_of(int)).is_directly_comparable());
        assert!(!TypeRef::ClassRef(ClassId(0)).is_directly_comparable());
        assert!(!TypeRef::EnumRef(ClassId(0)).is_directly_comparable());
    }

    #[test]
    fn test_array_depth_and_references() {
        let ty = TypeRef::nullable(TypeRef::array_of(TypeRef::array_of(TypeRef::ClassRef(
            ClassId(3),
        ))));
        assert_eq!(ty.array_depth(), 2);

        let mut ids = Vec::new();
        ty.referenced_ids(&mut ids);
        assert_eq!(ids, vec![ClassId(3)]);
    }
}
