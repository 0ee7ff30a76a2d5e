//! Identifier casing and collision resolution.
//!
//! Schema keys and definition names are free-form strings; generated code
//! needs identifiers. Casing is Pascal case throughout. Collisions are
//! resolved by appending `2`, `3`, ... in claim order.

use std::collections::HashSet;

use convert_case::{Case, Casing};

use crate::error::{CompileError, CompileResult};

/// Upper bound on numeric suffixes tried before giving up.
const MAX_SUFFIX: usize = 10_000;

/// Suffix of the comparer type generated alongside a class.
pub const COMPARER_SUFFIX: &str = "EqualityComparer";

/// Member names a generated class already defines.
pub const RESERVED_MEMBERS: &[&str] = &[
    "ValueComparer",
    "Equals",
    "GetHashCode",
    "GetType",
    "ToString",
    "MemberwiseClone",
    "ReferenceEquals",
    "Finalize",
];

/// Convert a raw schema string into a Pascal-case identifier.
///
/// Characters that cannot appear in an identifier act as word separators.
/// Returns `fallback` when nothing usable remains; prefixes `_` when the
/// result would start with a digit.
pub fn identifier(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let cased = cleaned.trim().to_case(Case::Pascal);

    if cased.is_empty() {
        return fallback.to_string();
    }
    if cased.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", cased);
    }
    cased
}

/// Set of claimed names within one scope.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    used: HashSet<String>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with some names already taken.
    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// Claim `candidate`, or the first free `candidate{n}` for n >= 2.
    pub fn claim(&mut self, candidate: &str) -> CompileResult<String> {
        if self.used.insert(candidate.to_string()) {
            return Ok(candidate.to_string());
        }
        for n in 2..=MAX_SUFFIX {
            let suffixed = format!("{}{}", candidate, n);
            if self.used.insert(suffixed.clone()) {
                return Ok(suffixed);
            }
        }
        Err(CompileError::NameCollisionUnresolvable {
            name: candidate.to_string(),
        })
    }

    /// Claim `candidate` together with `candidate` + `suffix`.
    ///
    /// Both names are taken from the same suffix step, so a type and its
    /// companion never end up with mismatched numbers or clash with another
    /// type's companion.
    pub fn claim_with_companion(&mut self, candidate: &str, suffix: &str) -> CompileResult<String> {
        for n in 1..=MAX_SUFFIX {
            let name = if n == 1 {
                candidate.to_string()
            } else {
                format!("{}{}", candidate, n)
            };
            let companion = format!("{}{}", name, suffix);
            if !self.used.contains(&name) && !self.used.contains(&companion) {
                self.used.insert(companion);
                self.used.insert(name.clone());
                return Ok(name);
            }
        }
        Err(CompileError::NameCollisionUnresolvable {
            name: candidate.to_string(),
        })
    }

    /// Check if a name is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_casing() {
        assert_eq!(identifier("address", "X"), "Address");
        assert_eq!(identifier("first_name", "X"), "FirstName");
        assert_eq!(identifier("first-name", "X"), "FirstName");
        assert_eq!(identifier("firstName", "X"), "FirstName");
        assert_eq!(identifier("Def1", "X"), "Def1");
    }

    #[test]
    fn test_identifier_edge_cases() {
        assert_eq!(identifier("", "Property"), "Property");
        assert_eq!(identifier("$$", "Property"), "Property");
        assert_eq!(identifier("9", "X"), "_9");
        assert_eq!(identifier("a.b", "X"), "AB");
    }

    #[test]
    fn test_claim_suffixes_in_order() {
        let mut table = NameTable::new();
        assert_eq!(table.claim("Address").unwrap(), "Address");
        assert_eq!(table.claim("Address").unwrap(), "Address2");
        assert_eq!(table.claim("Address").unwrap(), "Address3");
        assert!(table.contains("Address2"));
    }

    #[test]
    fn test_claim_with_companion_takes_both_names() {
        let mut table = NameTable::new();
        assert_eq!(table.claim_with_companion("Foo", COMPARER_SUFFIX).unwrap(), "Foo");
        assert!(table.contains("FooEqualityComparer"));
        assert_eq!(
            table.claim_with_companion("FooEqualityComparer", COMPARER_SUFFIX).unwrap(),
            "FooEqualityComparer2"
        );
        assert_eq!(table.claim("FooEqualityComparer").unwrap(), "FooEqualityComparer3");
    }

    #[test]
    fn test_claim_with_companion_skips_taken_companion() {
        let mut table = NameTable::with_reserved(["BarEqualityComparer"]);
        assert_eq!(table.claim_with_companion("Bar", COMPARER_SUFFIX).unwrap(), "Bar2");
        assert!(table.contains("Bar2EqualityComparer"));
        assert!(!table.contains("Bar"));
    }

    #[test]
    fn test_claim_skips_taken_suffix() {
        let mut table = NameTable::with_reserved(["Item", "Item2"]);
        assert_eq!(table.claim("Item").unwrap(), "Item3");
    }
}
