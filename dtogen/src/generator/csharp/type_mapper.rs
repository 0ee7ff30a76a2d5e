//! Type reference to C# type mappings.
//!
//! | TypeRef | C# type |
//! |---------|---------|
//! | `Primitive(string)` | `string` |
//! | `Primitive(integer)` | `long` |
//! | `Primitive(number)` | `double` |
//! | `Primitive(boolean)` | `bool` |
//! | `FormattedPrimitive(date-time)` | `DateTimeOffset` |
//! | `FormattedPrimitive(uri)` | `Uri` |
//! | `ArrayOf(T)` | `IList<T>` |
//! | `ClassRef` / `EnumRef` | the generated type name |
//! | `Nullable(T)` | `T?` for value types, `T` otherwise |

use crate::error::{CompileError, CompileResult};
use crate::ir::{ClassId, ClassSet, Format, PrimitiveKind, TypeRef};

/// Maps type references of one class set to C# type names.
#[derive(Debug, Clone, Copy)]
pub struct CSharpTypeMapper<'a> {
    classes: &'a ClassSet,
}

impl<'a> CSharpTypeMapper<'a> {
    pub fn new(classes: &'a ClassSet) -> Self {
        Self { classes }
    }

    /// Map a type reference to its C# spelling.
    pub fn map_type(&self, ty: &TypeRef) -> CompileResult<String> {
        Ok(match ty {
            TypeRef::Primitive(kind) => primitive_name(*kind).to_string(),
            TypeRef::FormattedPrimitive(format) => format_name(*format).to_string(),
            TypeRef::ArrayOf(inner) => format!("IList<{}>", self.map_type(inner)?),
            TypeRef::ClassRef(id) | TypeRef::EnumRef(id) => self.type_name(*id)?.to_string(),
            TypeRef::Nullable(inner) => {
                let mapped = self.map_type(inner)?;
                if is_value_type(inner) {
                    format!("{}?", mapped)
                } else {
                    mapped
                }
            }
        })
    }

    /// Name of a generated class or enum.
    pub fn type_name(&self, id: ClassId) -> CompileResult<&'a str> {
        self.classes
            .get(id)
            .map(|t| t.name())
            .ok_or_else(|| CompileError::invalid(format!("unknown type id {}", id), "#"))
    }
}

/// Check if a type maps to a C# value type.
pub fn is_value_type(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Primitive(kind) => *kind != PrimitiveKind::String,
        TypeRef::FormattedPrimitive(format) => *format == Format::DateTime,
        TypeRef::EnumRef(_) => true,
        TypeRef::Nullable(_) | TypeRef::ArrayOf(_) | TypeRef::ClassRef(_) => false,
    }
}

fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Integer => "long",
        PrimitiveKind::Number => "double",
        PrimitiveKind::Boolean => "bool",
    }
}

fn format_name(format: Format) -> &'static str {
    match format {
        Format::DateTime => "DateTimeOffset",
        Format::Uri => "Uri",
    }
}
