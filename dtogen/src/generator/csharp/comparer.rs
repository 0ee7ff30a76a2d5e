//! Structural equality comparer synthesis.
//!
//! Every class that needs structural equality gets a companion
//! `<Name>EqualityComparer` implementing `IEqualityComparer<Name>`.
//!
//! Equality walks the properties in declaration order and stops at the first
//! mismatch. Primitives and enums compare by value. Class references
//! short-circuit on identity, then delegate to the referenced class's
//! comparer, so comparers of mutually recursive classes call each other
//! directly. Arrays go through one generic `SequenceEquals` helper; the
//! element comparison is a lambda built recursively, one lambda per nesting
//! level, so any depth is handled by the same four checks (identity, null,
//! count, elements).
//!
//! Hashing starts at [`HASH_SEED`] and folds each property as
//! `hash = hash * 31 + h`. A null value contributes `0` but the multiply
//! still happens. An array multiplies once for itself and then folds each of
//! its elements into the same accumulator through `FoldSequence`, again one
//! lambda per nesting level.
//!
//! Inline classes whose properties are all directly comparable get no
//! comparer of their own; a class referencing one compares it through a
//! private member-wise helper instead.

use crate::error::CompileResult;
use crate::generator::csharp::formatter::SourceBuffer;
use crate::generator::csharp::type_mapper::{is_value_type, CSharpTypeMapper};
use crate::generator::traits::GeneratorConfig;
use crate::ir::{ClassId, ClassModel, ClassSet, PropertyModel, TypeRef};
use crate::naming;

/// Initial accumulator of every generated hash routine.
pub const HASH_SEED: i32 = 17;

/// Odd multiplier applied once per folded value.
pub const HASH_MULTIPLIER: i32 = 31;

/// Name of the comparer generated for a class.
pub fn comparer_name(class_name: &str) -> String {
    format!("{}{}", class_name, naming::COMPARER_SUFFIX)
}

/// Builds comparer source for the classes of one set.
#[derive(Debug, Clone, Copy)]
pub struct ComparerSynthesizer<'a> {
    classes: &'a ClassSet,
    mapper: CSharpTypeMapper<'a>,
}

impl<'a> ComparerSynthesizer<'a> {
    pub fn new(classes: &'a ClassSet) -> Self {
        Self {
            classes,
            mapper: CSharpTypeMapper::new(classes),
        }
    }

    /// Render the comparer file body for `class`.
    pub fn render(&self, class: &ClassModel, config: &GeneratorConfig) -> CompileResult<String> {
        let name = &class.name;
        let comparer = comparer_name(name);
        let uses_arrays = class.properties.iter().any(|p| p.ty.array_depth() > 0);
        let shallow = self.shallow_classes(class);

        let mut buf = SourceBuffer::new(config);
        buf.header();
        buf.usings(["System", "System.Collections.Generic"]);
        buf.line(format!("namespace {}", config.namespace)).open();
        buf.summary(Some(format!("Structural equality and hashing for {}.", name).as_str()));
        buf.line(format!(
            "public sealed class {} : IEqualityComparer<{}>",
            comparer, name
        ))
        .open();

        buf.line(format!(
            "public static readonly {0} Instance = new {0}();",
            comparer
        ));
        buf.blank();
        buf.line(format!("private {}()", comparer)).open().close();
        buf.blank();

        buf.line(format!("public bool Equals({} left, {} right)", name, name))
            .open();
        buf.line("if (ReferenceEquals(left, right)) return true;");
        self.equality_body(&mut buf, &class.properties)?;
        buf.close();
        buf.blank();

        buf.line(format!("public int GetHashCode({} obj)", name)).open();
        self.hash_body(&mut buf, &class.properties)?;
        buf.close();

        for target in &shallow {
            buf.blank();
            buf.line(format!(
                "private static bool {}({} left, {} right)",
                value_equals_name(&target.name),
                target.name,
                target.name
            ))
            .open();
            self.equality_body(&mut buf, &target.properties)?;
            buf.close();
            buf.blank();
            buf.line(format!(
                "private static int {}({} obj)",
                value_hash_name(&target.name),
                target.name
            ))
            .open();
            self.hash_body(&mut buf, &target.properties)?;
            buf.close();
        }

        if uses_arrays {
            buf.blank();
            sequence_helpers(&mut buf);
        }

        buf.close().close();
        Ok(buf.finish())
    }

    /// Null check, then one short-circuiting check per property.
    fn equality_body(
        &self,
        buf: &mut SourceBuffer<'_>,
        properties: &[PropertyModel],
    ) -> CompileResult<()> {
        buf.line("if (left is null || right is null) return false;");
        for property in properties {
            let left = format!("left.{}", property.display_name);
            let right = format!("right.{}", property.display_name);
            if compares_by_value(&property.ty) {
                buf.line(format!("if ({} != {}) return false;", left, right));
            } else {
                let expr = self.equals_expr(&property.ty, &left, &right, 1)?;
                buf.line(format!("if (!{}) return false;", expr));
            }
        }
        buf.line("return true;");
        Ok(())
    }

    fn hash_body(
        &self,
        buf: &mut SourceBuffer<'_>,
        properties: &[PropertyModel],
    ) -> CompileResult<()> {
        buf.line("if (obj is null) return 0;");
        buf.line(format!("int hash = {};", HASH_SEED));
        for property in properties {
            let value = format!("obj.{}", property.display_name);
            buf.line(format!(
                "hash = {};",
                self.fold_expr(&property.ty, "hash", &value, 1)?
            ));
        }
        buf.line("return hash;");
        Ok(())
    }

    /// Boolean expression that is true when `left` and `right` are equal.
    ///
    /// `depth` numbers the lambda parameters of nested array levels.
    pub fn equals_expr(
        &self,
        ty: &TypeRef,
        left: &str,
        right: &str,
        depth: usize,
    ) -> CompileResult<String> {
        Ok(match ty {
            TypeRef::Nullable(inner) => self.equals_expr(inner, left, right, depth)?,
            TypeRef::Primitive(_) | TypeRef::FormattedPrimitive(_) | TypeRef::EnumRef(_) => {
                format!("{} == {}", left, right)
            }
            TypeRef::ClassRef(id) => {
                let (delegate, _) = self.class_delegates(*id)?;
                format!(
                    "(ReferenceEquals({l}, {r}) || {d}({l}, {r}))",
                    l = left,
                    r = right,
                    d = delegate
                )
            }
            TypeRef::ArrayOf(inner) => {
                let (l, r) = (format!("l{}", depth), format!("r{}", depth));
                format!(
                    "SequenceEquals({}, {}, ({}, {}) => {})",
                    left,
                    right,
                    l,
                    r,
                    self.equals_expr(inner, &l, &r, depth + 1)?
                )
            }
        })
    }

    /// Expression for the accumulator after folding `value` into `acc`.
    pub fn fold_expr(
        &self,
        ty: &TypeRef,
        acc: &str,
        value: &str,
        depth: usize,
    ) -> CompileResult<String> {
        Ok(match ty {
            TypeRef::Nullable(inner) => self.fold_expr(inner, acc, value, depth)?,
            TypeRef::ArrayOf(inner) => {
                let (h, e) = (format!("h{}", depth), format!("e{}", depth));
                format!(
                    "FoldSequence({}, {}, ({}, {}) => {})",
                    acc,
                    value,
                    h,
                    e,
                    self.fold_expr(inner, &h, &e, depth + 1)?
                )
            }
            leaf => format!(
                "unchecked({} * {} + {})",
                acc,
                HASH_MULTIPLIER,
                self.leaf_hash(leaf, value)?
            ),
        })
    }

    /// Hash contribution of a non-array value; `0` when it is null.
    fn leaf_hash(&self, ty: &TypeRef, value: &str) -> CompileResult<String> {
        Ok(match ty {
            TypeRef::ClassRef(id) => {
                let (_, hasher) = self.class_delegates(*id)?;
                if self.has_comparer(*id) {
                    format!("({v} is null ? 0 : {h}({v}))", v = value, h = hasher)
                } else {
                    format!("{}({})", hasher, value)
                }
            }
            // Nullable<T>.GetHashCode() is 0 when there is no value.
            ty if is_value_type(ty) => format!("{}.GetHashCode()", value),
            _ => format!("({v} is null ? 0 : {v}.GetHashCode())", v = value),
        })
    }

    /// Equality and hash callables for a referenced class.
    fn class_delegates(&self, id: ClassId) -> CompileResult<(String, String)> {
        let name = self.mapper.type_name(id)?;
        if self.has_comparer(id) {
            let comparer = comparer_name(name);
            Ok((
                format!("{}.Instance.Equals", comparer),
                format!("{}.Instance.GetHashCode", comparer),
            ))
        } else {
            Ok((value_equals_name(name), value_hash_name(name)))
        }
    }

    fn has_comparer(&self, id: ClassId) -> bool {
        self.classes
            .class(id)
            .map(ClassModel::needs_comparer)
            .unwrap_or(false)
    }

    /// Referenced classes without a comparer, in first-use order.
    fn shallow_classes(&self, class: &ClassModel) -> Vec<&'a ClassModel> {
        let mut ids = Vec::new();
        for property in &class.properties {
            property.ty.referenced_ids(&mut ids);
        }
        let mut seen = Vec::new();
        let mut shallow = Vec::new();
        for id in ids {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if let Some(target) = self.classes.class(id) {
                if !target.needs_comparer() {
                    shallow.push(target);
                }
            }
        }
        shallow
    }
}

/// Types compared with `!=` at the top level of `Equals`.
fn compares_by_value(ty: &TypeRef) -> bool {
    matches!(
        ty.unwrap_nullable(),
        TypeRef::Primitive(_) | TypeRef::FormattedPrimitive(_) | TypeRef::EnumRef(_)
    )
}

fn value_equals_name(class_name: &str) -> String {
    format!("{}ValueEquals", class_name)
}

fn value_hash_name(class_name: &str) -> String {
    format!("{}ValueHash", class_name)
}

/// The depth-generic sequence helpers shared by every array property.
fn sequence_helpers(buf: &mut SourceBuffer<'_>) {
    buf.line(
        "private static bool SequenceEquals<T>(IList<T> left, IList<T> right, Func<T, T, bool> elementEquals)",
    )
    .open();
    buf.line("if (ReferenceEquals(left, right)) return true;");
    buf.line("if (left is null || right is null) return false;");
    buf.line("if (left.Count != right.Count) return false;");
    buf.line("for (int i = 0; i < left.Count; i++)").open();
    buf.line("if (!elementEquals(left[i], right[i])) return false;");
    buf.close();
    buf.line("return true;");
    buf.close();
    buf.blank();

    buf.line(
        "private static int FoldSequence<T>(int hash, IList<T> items, Func<int, T, int> fold)",
    )
    .open();
    buf.line(format!("hash = unchecked(hash * {});", HASH_MULTIPLIER));
    buf.line("if (items is null) return hash;");
    buf.line("for (int i = 0; i < items.Count; i++)").open();
    buf.line("hash = fold(hash, items[i]);");
    buf.close();
    buf.line("return hash;");
    buf.close();
}
