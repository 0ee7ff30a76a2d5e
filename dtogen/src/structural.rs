//! Structural equality and hashing over JSON instances.
//!
//! [`StructuralComparer`] runs the algorithm the generated comparers run,
//! with the same short-circuit order and the same fold shape, directly over
//! `serde_json::Value` instances of a compiled class set. It lets the
//! compiler's own tests and the CLI check what generated code will decide
//! without a C# toolchain.
//!
//! Primitive hash contributions are fixed here rather than borrowed from a
//! runtime:
//!
//! | value | contribution |
//! |-------|--------------|
//! | integer `v` | `(v as i32) ^ ((v >> 32) as i32)` |
//! | number | the same over the IEEE-754 bits; `0.0` and `-0.0` give `0` |
//! | boolean | `1` / `0` |
//! | string | FNV-1a (32-bit) of the UTF-8 bytes |
//! | enum | index of the literal |
//! | null | `0` |
//!
//! A property missing from an instance is treated as null.

use serde_json::Value;

use crate::generator::csharp::{HASH_MULTIPLIER, HASH_SEED};
use crate::ir::{ClassId, ClassSet, PrimitiveKind, TypeRef};

static NULL: Value = Value::Null;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Evaluates structural equality and hashes for one class set.
#[derive(Debug, Clone, Copy)]
pub struct StructuralComparer<'a> {
    classes: &'a ClassSet,
}

impl<'a> StructuralComparer<'a> {
    pub fn new(classes: &'a ClassSet) -> Self {
        Self { classes }
    }

    /// Equality of two instances of class `id`.
    pub fn equals(&self, id: ClassId, left: &Value, right: &Value) -> bool {
        if std::ptr::eq(left, right) {
            return true;
        }
        if left.is_null() || right.is_null() {
            return left.is_null() && right.is_null();
        }
        let Some(class) = self.classes.class(id) else {
            return left == right;
        };
        class.properties.iter().all(|p| {
            self.equals_value(&p.ty, field(left, &p.json_name), field(right, &p.json_name))
        })
    }

    /// Hash of an instance of class `id`; `0` for null.
    pub fn hash(&self, id: ClassId, value: &Value) -> i32 {
        if value.is_null() {
            return 0;
        }
        let Some(class) = self.classes.class(id) else {
            return json_hash(value);
        };
        class.properties.iter().fold(HASH_SEED, |acc, p| {
            self.fold(&p.ty, acc, field(value, &p.json_name))
        })
    }

    /// Equality of two values of any type.
    pub fn equals_value(&self, ty: &TypeRef, left: &Value, right: &Value) -> bool {
        match ty {
            TypeRef::Nullable(inner) => self.equals_value(inner, left, right),
            TypeRef::Primitive(PrimitiveKind::Number) => match (left.as_f64(), right.as_f64()) {
                (Some(l), Some(r)) => l == r,
                _ => left == right,
            },
            TypeRef::Primitive(_) | TypeRef::FormattedPrimitive(_) | TypeRef::EnumRef(_) => {
                left == right
            }
            TypeRef::ClassRef(id) => std::ptr::eq(left, right) || self.equals(*id, left, right),
            TypeRef::ArrayOf(inner) => {
                if std::ptr::eq(left, right) {
                    return true;
                }
                match (left, right) {
                    (Value::Null, Value::Null) => true,
                    (Value::Null, _) | (_, Value::Null) => false,
                    (Value::Array(l), Value::Array(r)) => {
                        l.len() == r.len()
                            && l.iter().zip(r).all(|(a, b)| self.equals_value(inner, a, b))
                    }
                    _ => left == right,
                }
            }
        }
    }

    /// Hash of a value of any type: a class hashes as itself, anything else
    /// is folded into a fresh accumulator.
    pub fn hash_value(&self, ty: &TypeRef, value: &Value) -> i32 {
        match ty.unwrap_nullable() {
            TypeRef::ClassRef(id) => self.hash(*id, value),
            _ => self.fold(ty, HASH_SEED, value),
        }
    }

    /// Fold one value into an accumulator.
    fn fold(&self, ty: &TypeRef, acc: i32, value: &Value) -> i32 {
        match ty {
            TypeRef::Nullable(inner) => self.fold(inner, acc, value),
            TypeRef::ArrayOf(inner) => {
                let acc = acc.wrapping_mul(HASH_MULTIPLIER);
                match value {
                    Value::Array(items) => items
                        .iter()
                        .fold(acc, |acc, item| self.fold(inner, acc, item)),
                    _ => acc,
                }
            }
            leaf => acc
                .wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(self.leaf_hash(leaf, value)),
        }
    }

    fn leaf_hash(&self, ty: &TypeRef, value: &Value) -> i32 {
        if value.is_null() {
            return 0;
        }
        match ty {
            TypeRef::ClassRef(id) => self.hash(*id, value),
            TypeRef::EnumRef(id) => self
                .classes
                .enumeration(*id)
                .and_then(|e| e.position_of(value))
                .map(|i| i as i32)
                .unwrap_or(0),
            TypeRef::Primitive(PrimitiveKind::Number) => match value.as_f64() {
                Some(n) => float_hash(n),
                None => json_hash(value),
            },
            _ => json_hash(value),
        }
    }
}

fn field<'v>(object: &'v Value, name: &str) -> &'v Value {
    object.get(name).unwrap_or(&NULL)
}

fn int_hash(v: i64) -> i32 {
    (v as i32) ^ ((v >> 32) as i32)
}

fn float_hash(n: f64) -> i32 {
    if n == 0.0 {
        0
    } else {
        int_hash(n.to_bits() as i64)
    }
}

/// FNV-1a over the UTF-8 bytes of `s`.
pub fn fnv1a(s: &str) -> i32 {
    s.bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u32::from(b)).wrapping_mul(FNV_PRIME)) as i32
}

/// Contribution of a scalar by its JSON shape alone.
fn json_hash(value: &Value) -> i32 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i32::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => int_hash(i),
            None => n.as_f64().map(float_hash).unwrap_or(0),
        },
        Value::String(s) => fnv1a(s),
        other => fnv1a(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer;
    use crate::schema::SchemaDocument;
    use serde_json::json;

    fn compile(schema: Value) -> ClassSet {
        infer(&SchemaDocument::from_value(&schema).unwrap(), "Root").unwrap()
    }

    fn root_id(set: &ClassSet) -> ClassId {
        set.root_class().unwrap().id
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(""), 0x811c_9dc5_u32 as i32);
        assert_eq!(fnv1a("a"), 0xe40c_292c_u32 as i32);
    }

    #[test]
    fn test_primitive_contributions() {
        assert_eq!(int_hash(1), 1);
        assert_eq!(int_hash(-1), 0);
        assert_eq!(float_hash(0.0), 0);
        assert_eq!(float_hash(-0.0), 0);
        assert_eq!(json_hash(&json!(true)), 1);
        assert_eq!(json_hash(&json!(false)), 0);
    }

    #[test]
    fn test_null_still_multiplies() {
        let set = compile(json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);

        // 17 * 31 + 0, then * 31 + 5
        assert_eq!(cmp.hash(id, &json!({ "b": 5 })), (17 * 31) * 31 + 5);
        assert_eq!(cmp.hash(id, &Value::Null), 0);
    }

    #[test]
    fn test_array_multiplies_once_then_folds_elements() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "grid": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } }
            }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);

        let empty = 17 * 31;
        assert_eq!(cmp.hash(id, &json!({ "grid": [] })), empty);
        assert_eq!(cmp.hash(id, &json!({})), empty);
        // outer multiply, inner multiply, then one element fold
        assert_eq!(cmp.hash(id, &json!({ "grid": [[2]] })), (empty * 31) * 31 + 2);
    }

    #[test]
    fn test_nested_arrays_compare_deeply() {
        let set = compile(json!({
            "type": "object",
            "properties": {
                "grid": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } }
            }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);

        let a = json!({ "grid": [[1, 2], [3]] });
        let b = json!({ "grid": [[1, 2], [3]] });
        let c = json!({ "grid": [[1, 2], [4]] });
        let d = json!({ "grid": [[1, 2]] });

        assert!(cmp.equals(id, &a, &b));
        assert_eq!(cmp.hash(id, &a), cmp.hash(id, &b));
        assert!(!cmp.equals(id, &a, &c));
        assert!(!cmp.equals(id, &a, &d));
        assert!(!cmp.equals(id, &a, &Value::Null));
        assert!(cmp.equals(id, &Value::Null, &Value::Null));
    }

    #[test]
    fn test_recursive_classes() {
        let set = compile(json!({
            "type": "object",
            "properties": { "head": { "$ref": "#/definitions/Node" } },
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "integer" },
                        "next": { "oneOf": [{ "$ref": "#/definitions/Node" }, { "type": "null" }] }
                    }
                }
            }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);

        let a = json!({ "head": { "value": 1, "next": { "value": 2, "next": null } } });
        let b = json!({ "head": { "value": 1, "next": { "value": 2 } } });
        let c = json!({ "head": { "value": 1, "next": { "value": 3 } } });

        assert!(cmp.equals(id, &a, &b));
        assert_eq!(cmp.hash(id, &a), cmp.hash(id, &b));
        assert!(!cmp.equals(id, &a, &c));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let set = compile(json!({
            "type": "object",
            "properties": { "x": { "type": "number" } }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);

        let a = json!({ "x": 2 });
        let b = json!({ "x": 2.0 });
        assert!(cmp.equals(id, &a, &b));
        assert_eq!(cmp.hash(id, &a), cmp.hash(id, &b));
    }

    #[test]
    fn test_enums_hash_by_index() {
        let set = compile(json!({
            "type": "object",
            "properties": { "s": { "enum": ["a", "b", "c"] } }
        }));
        let cmp = StructuralComparer::new(&set);
        let id = root_id(&set);
        assert_eq!(cmp.hash(id, &json!({ "s": "c" })), 17 * 31 + 2);
    }
}
