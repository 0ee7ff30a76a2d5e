//! C# code emitter.
//!
//! Renders each class as a `partial class` with Newtonsoft.Json attributes
//! and each enumeration as an `enum`, one file per type.
//!
//! Property attributes follow the serialization directive computed at
//! inference time:
//!
//! - required: `Required.Always`, or `Required.AllowNull` when nullable
//! - optional: `Required.Default` with null and default values ignored, or
//!   `IgnoreAndPopulate` together with `[DefaultValue(...)]` when the
//!   property carries a default literal

use crate::error::CompileResult;
use crate::generator::csharp::comparer::{comparer_name, ComparerSynthesizer};
use crate::generator::csharp::formatter::{default_literal, escape_string, SourceBuffer};
use crate::generator::csharp::type_mapper::CSharpTypeMapper;
use crate::generator::traits::{
    CodeGenerator, FileKind, GeneratedFile, GeneratorConfig, RenderedClass,
};
use crate::ir::{ClassModel, ClassSet, EnumLiteral, EnumModel, PropertyModel, TypeRef};

/// C# code generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpGenerator;

impl CSharpGenerator {
    pub fn new() -> Self {
        Self
    }

    fn property_lines(
        &self,
        buf: &mut SourceBuffer<'_>,
        property: &PropertyModel,
        mapper: &CSharpTypeMapper<'_>,
    ) -> CompileResult<()> {
        buf.summary(property.description.as_deref());
        if let Some(literal) = &property.directive.default_literal {
            buf.line(format!("[DefaultValue({})]", default_literal(literal)));
        }
        buf.line(json_property_attribute(property));
        buf.line(format!(
            "public {} {} {{ get; set; }}",
            mapper.map_type(&property.ty)?,
            property.display_name
        ));
        Ok(())
    }
}

impl CodeGenerator for CSharpGenerator {
    fn id(&self) -> &'static str {
        "csharp"
    }

    fn name(&self) -> &'static str {
        "C# (Newtonsoft.Json)"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn render_class(
        &self,
        class: &ClassModel,
        classes: &ClassSet,
        config: &GeneratorConfig,
    ) -> CompileResult<RenderedClass> {
        let mapper = CSharpTypeMapper::new(classes);
        let has_comparer = class.needs_comparer();
        let name = &class.name;

        let mut buf = SourceBuffer::new(config);
        buf.header();
        buf.usings(class_usings(class, has_comparer));
        buf.line(format!("namespace {}", config.namespace)).open();
        buf.summary(class.description.as_deref());
        if has_comparer {
            buf.line(format!("public partial class {0} : IEquatable<{0}>", name));
        } else {
            buf.line(format!("public partial class {}", name));
        }
        buf.open();

        for (i, property) in class.properties.iter().enumerate() {
            if i > 0 {
                buf.blank();
            }
            self.property_lines(&mut buf, property, &mapper)?;
        }

        if has_comparer {
            if !class.properties.is_empty() {
                buf.blank();
            }
            buf.line(format!(
                "public static IEqualityComparer<{}> ValueComparer => {}.Instance;",
                name,
                comparer_name(name)
            ));
            buf.blank();
            buf.line(format!(
                "public bool Equals({} other) => ValueComparer.Equals(this, other);",
                name
            ));
            buf.blank();
            buf.line(format!(
                "public override bool Equals(object obj) => Equals(obj as {});",
                name
            ));
            buf.blank();
            buf.line("public override int GetHashCode() => ValueComparer.GetHashCode(this);");
        }

        buf.close().close();
        let class_file = GeneratedFile::new(
            self.file_name(name),
            name.as_str(),
            FileKind::Class,
            buf.finish(),
        );

        let comparer = if has_comparer {
            let comparer = comparer_name(name);
            let contents = ComparerSynthesizer::new(classes).render(class, config)?;
            Some(GeneratedFile::new(
                self.file_name(&comparer),
                comparer,
                FileKind::Comparer,
                contents,
            ))
        } else {
            None
        };

        tracing::trace!(class = %name, comparer = has_comparer, "rendered class");
        Ok(RenderedClass {
            class: class_file,
            comparer,
        })
    }

    fn render_enum(
        &self,
        enumeration: &EnumModel,
        config: &GeneratorConfig,
    ) -> CompileResult<GeneratedFile> {
        let name = &enumeration.name;
        let string_enum = enumeration.is_string_enum();

        let mut buf = SourceBuffer::new(config);
        buf.header();
        if string_enum {
            buf.usings([
                "System.Runtime.Serialization",
                "Newtonsoft.Json",
                "Newtonsoft.Json.Converters",
            ]);
        }
        buf.line(format!("namespace {}", config.namespace)).open();
        buf.summary(enumeration.description.as_deref());

        if string_enum {
            buf.line("[JsonConverter(typeof(StringEnumConverter))]");
            buf.line(format!("public enum {}", name));
        } else {
            buf.line(format!("public enum {} : long", name));
        }
        buf.open();
        for member in &enumeration.members {
            match &member.literal {
                EnumLiteral::String(value) => {
                    buf.line(format!("[EnumMember(Value = \"{}\")]", escape_string(value)));
                    buf.line(format!("{},", member.name));
                }
                EnumLiteral::Integer(value) => {
                    buf.line(format!("{} = {},", member.name, value));
                }
            }
        }
        buf.close().close();

        Ok(GeneratedFile::new(
            self.file_name(name),
            name.as_str(),
            FileKind::Enum,
            buf.finish(),
        ))
    }
}

/// `[JsonProperty]` attribute for a property.
pub fn json_property_attribute(property: &PropertyModel) -> String {
    let name = escape_string(&property.json_name);
    let directive = &property.directive;

    if directive.is_required() {
        let required = if property.ty.is_nullable() {
            "AllowNull"
        } else {
            "Always"
        };
        return format!(
            "[JsonProperty(\"{}\", Required = Required.{})]",
            name, required
        );
    }

    if !directive.omit_when_default {
        return format!("[JsonProperty(\"{}\", Required = Required.Default)]", name);
    }

    let default_handling = if directive.default_literal.is_some() {
        "IgnoreAndPopulate"
    } else {
        "Ignore"
    };
    format!(
        "[JsonProperty(\"{}\", Required = Required.Default, NullValueHandling = NullValueHandling.Ignore, DefaultValueHandling = DefaultValueHandling.{})]",
        name, default_handling
    )
}

/// `using` directives a class file needs.
fn class_usings(class: &ClassModel, has_comparer: bool) -> Vec<&'static str> {
    let mentions = |pred: fn(&TypeRef) -> bool| class.properties.iter().any(|p| pred(&p.ty));

    let mut usings = Vec::new();
    if has_comparer || mentions(|ty: &TypeRef| matches!(ty.unwrap_nullable(), TypeRef::FormattedPrimitive(_)))
    {
        usings.push("System");
    }
    if has_comparer || mentions(|ty: &TypeRef| ty.array_depth() > 0) {
        usings.push("System.Collections.Generic");
    }
    if class
        .properties
        .iter()
        .any(|p| p.directive.default_literal.is_some())
    {
        usings.push("System.ComponentModel");
    }
    usings.push("Newtonsoft.Json");
    usings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ClassId, EnumMember, PrimitiveKind, SerializationDirective, TypeModel};
    use serde_json::json;

    fn property(name: &str, ty: TypeRef, required: bool, default: Option<serde_json::Value>) -> PropertyModel {
        PropertyModel {
            json_name: name.to_string(),
            display_name: crate::naming::identifier(name, "Property"),
            directive: SerializationDirective::for_property(required, &ty, default.as_ref()),
            ty,
            required,
            default_value: default,
            description: None,
        }
    }

    #[test]
    fn test_required_attributes() {
        let p = property("id", TypeRef::Primitive(PrimitiveKind::Integer), true, None);
        assert_eq!(
            json_property_attribute(&p),
            "[JsonProperty(\"id\", Required = Required.Always)]"
        );

        let p = property(
            "id",
            TypeRef::nullable(TypeRef::Primitive(PrimitiveKind::Integer)),
            true,
            None,
        );
        assert_eq!(
            json_property_attribute(&p),
            "[JsonProperty(\"id\", Required = Required.AllowNull)]"
        );
    }

    #[test]
    fn test_optional_attributes() {
        let p = property("n", TypeRef::Primitive(PrimitiveKind::Integer), false, None);
        assert!(json_property_attribute(&p).ends_with("DefaultValueHandling = DefaultValueHandling.Ignore)]"));

        let p = property(
            "n",
            TypeRef::Primitive(PrimitiveKind::Integer),
            false,
            Some(json!(5)),
        );
        assert!(json_property_attribute(&p)
            .ends_with("DefaultValueHandling = DefaultValueHandling.IgnoreAndPopulate)]"));
    }

    #[test]
    fn test_inline_primitive_class_has_no_comparer() {
        let class = ClassModel {
            id: ClassId(0),
            name: "Root".to_string(),
            properties: vec![
                property("name", TypeRef::Primitive(PrimitiveKind::String), true, None),
                property(
                    "count",
                    TypeRef::Primitive(PrimitiveKind::Integer),
                    false,
                    Some(json!(3)),
                ),
            ],
            description: Some("The root.".to_string()),
            source_is_named_definition: false,
            pointer: "#".to_string(),
        };
        let set = ClassSet {
            types: vec![TypeModel::Class(class.clone())],
            root: TypeRef::ClassRef(ClassId(0)),
        };

        let rendered = CSharpGenerator::new()
            .render_class(&class, &set, &GeneratorConfig::default())
            .unwrap();
        assert!(rendered.comparer.is_none());
        assert_eq!(rendered.class.file_name, "Root.cs");

        let text = &rendered.class.contents;
        assert!(text.starts_with("// <auto-generated />\n\nusing System.ComponentModel;\nusing Newtonsoft.Json;\n"));
        assert!(text.contains("    public partial class Root\n"));
        assert!(text.contains("        [DefaultValue(3L)]\n"));
        assert!(text.contains("        public long Count { get; set; }\n"));
        assert!(text.contains("    /// The root.\n"));
        assert!(!text.contains("ValueComparer"));
    }

    #[test]
    fn test_named_definition_gets_comparer_members() {
        let class = ClassModel {
            id: ClassId(0),
            name: "Def2".to_string(),
            properties: vec![property("x", TypeRef::Primitive(PrimitiveKind::Boolean), false, None)],
            description: None,
            source_is_named_definition: true,
            pointer: "#/definitions/Def2".to_string(),
        };
        let set = ClassSet {
            types: vec![TypeModel::Class(class.clone())],
            root: TypeRef::ClassRef(ClassId(0)),
        };

        let rendered = CSharpGenerator::new()
            .render_class(&class, &set, &GeneratorConfig::default())
            .unwrap();
        let comparer = rendered.comparer.unwrap();
        assert_eq!(comparer.file_name, "Def2EqualityComparer.cs");
        assert_eq!(comparer.kind, FileKind::Comparer);
        assert!(rendered
            .class
            .contents
            .contains("public static IEqualityComparer<Def2> ValueComparer => Def2EqualityComparer.Instance;"));
        assert!(rendered.class.contents.contains("public partial class Def2 : IEquatable<Def2>"));
    }

    #[test]
    fn test_enums() {
        let generator = CSharpGenerator::new();
        let config = GeneratorConfig::default().with_header(None);

        let status = EnumModel {
            id: ClassId(0),
            name: "Status".to_string(),
            members: vec![EnumMember {
                name: "InProgress".to_string(),
                literal: EnumLiteral::String("in-progress".to_string()),
            }],
            description: None,
            source_is_named_definition: false,
            pointer: "#/properties/status".to_string(),
        };
        let text = generator.render_enum(&status, &config).unwrap().contents;
        assert!(text.contains("    [JsonConverter(typeof(StringEnumConverter))]\n    public enum Status\n"));
        assert!(text.contains("        [EnumMember(Value = \"in-progress\")]\n        InProgress,\n"));

        let level = EnumModel {
            id: ClassId(1),
            name: "Level".to_string(),
            members: vec![EnumMember {
                name: "Value2".to_string(),
                literal: EnumLiteral::Integer(2),
            }],
            description: None,
            source_is_named_definition: true,
            pointer: "#/definitions/Level".to_string(),
        };
        let text = generator.render_enum(&level, &config).unwrap().contents;
        assert!(text.starts_with("namespace Generated\n{\n    public enum Level : long\n"));
        assert!(text.contains("        Value2 = 2,\n"));
    }
}
