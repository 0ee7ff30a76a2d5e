//! Class Registry.
//!
//! Arena of generated types keyed by [`ClassId`]. Inline object schemas are
//! interned by structural signature so identical shapes share one class;
//! named definitions are nominal and always own their class. Names are
//! claimed in registration order, so collisions resolve deterministically.
//! A class name is claimed together with the name of its comparer, so no
//! generated type can take the name of another type's comparer.

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::ir::{
    ClassId, ClassModel, ClassSet, EnumLiteral, EnumMember, EnumModel, PropertyModel, TypeModel,
    TypeRef,
};
use crate::naming::{self, NameTable, COMPARER_SUFFIX, RESERVED_MEMBERS};

/// Structural identity of an object schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    /// `(json name, type, required)` in property order
    pub properties: Vec<(String, TypeRef, bool)>,

    pub description: Option<String>,
}

impl ClassSignature {
    /// Compute the signature of a property list and its class description.
    pub fn of(properties: &[PropertyModel], description: Option<&str>) -> Self {
        Self {
            properties: properties
                .iter()
                .map(|p| (p.json_name.clone(), p.ty.clone(), p.required))
                .collect(),
            description: description.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    /// Named definition whose body is not compiled yet
    Reserved { name: String, pointer: String },
    Class(ClassModel),
    Enum(EnumModel),
}

/// Registry that owns every generated type of one compilation.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    slots: Vec<Slot>,

    /// Inline classes by structural signature
    by_signature: HashMap<ClassSignature, ClassId>,

    /// Inline enumerations by ordered literal set
    by_literals: HashMap<Vec<EnumLiteral>, ClassId>,

    /// Named definitions by definition name
    by_definition: HashMap<String, ClassId>,

    names: NameTable,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered types, reserved slots included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reserve an id for a named definition before its body is compiled.
    ///
    /// Reserving first is what lets definitions refer to each other, and to
    /// themselves, regardless of declaration order.
    pub fn reserve_definition(
        &mut self,
        definition: &str,
        candidate: &str,
        pointer: &str,
    ) -> CompileResult<ClassId> {
        if let Some(id) = self.by_definition.get(definition) {
            return Ok(*id);
        }
        let name = self.names.claim_with_companion(candidate, COMPARER_SUFFIX)?;
        let id = ClassId(self.slots.len());
        tracing::debug!(definition, name = %name, id = %id, "reserved definition");
        self.slots.push(Slot::Reserved {
            name,
            pointer: pointer.to_string(),
        });
        self.by_definition.insert(definition.to_string(), id);
        Ok(id)
    }

    /// Id reserved for a named definition.
    pub fn definition(&self, definition: &str) -> Option<ClassId> {
        self.by_definition.get(definition).copied()
    }

    /// Display name of a registered type.
    pub fn name_of(&self, id: ClassId) -> Option<&str> {
        self.slots.get(id.index()).map(|slot| match slot {
            Slot::Reserved { name, .. } => name.as_str(),
            Slot::Class(c) => c.name.as_str(),
            Slot::Enum(e) => e.name.as_str(),
        })
    }

    /// Look up a completed class.
    pub fn class(&self, id: ClassId) -> Option<&ClassModel> {
        match self.slots.get(id.index()) {
            Some(Slot::Class(c)) => Some(c),
            _ => None,
        }
    }

    /// Look up an inline class by signature.
    pub fn lookup_signature(&self, signature: &ClassSignature) -> Option<ClassId> {
        self.by_signature.get(signature).copied()
    }

    /// Complete a reserved definition as a class.
    pub fn fill_class(
        &mut self,
        id: ClassId,
        mut properties: Vec<PropertyModel>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        let (name, pointer) = self.take_reserved(id)?;
        assign_display_names(&name, &mut properties)?;
        tracing::debug!(class = %name, id = %id, properties = properties.len(), "compiled definition");
        self.slots[id.index()] = Slot::Class(ClassModel {
            id,
            name,
            properties,
            description,
            source_is_named_definition: true,
            pointer,
        });
        Ok(id)
    }

    /// Complete a reserved definition as an enumeration.
    pub fn fill_enum(
        &mut self,
        id: ClassId,
        literals: Vec<EnumLiteral>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        let (name, pointer) = self.take_reserved(id)?;
        let members = enum_members(&literals)?;
        tracing::debug!(enumeration = %name, id = %id, "compiled definition");
        self.slots[id.index()] = Slot::Enum(EnumModel {
            id,
            name,
            members,
            description,
            source_is_named_definition: true,
            pointer,
        });
        Ok(id)
    }

    /// Intern an inline object schema.
    ///
    /// Returns the existing class when an inline class with the same
    /// signature is already registered; `candidate` is then ignored.
    pub fn intern_class(
        &mut self,
        candidate: &str,
        pointer: &str,
        properties: Vec<PropertyModel>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        let signature = ClassSignature::of(&properties, description.as_deref());
        if let Some(id) = self.lookup_signature(&signature) {
            tracing::debug!(candidate, id = %id, "reused structurally identical class");
            return Ok(id);
        }
        let id = self.push_class(candidate, pointer, properties, description)?;
        self.by_signature.insert(signature, id);
        Ok(id)
    }

    /// Claim a class name now for a class registered later with
    /// [`register_nominal_class`](Self::register_nominal_class).
    pub fn reserve_name(&mut self, candidate: &str) -> CompileResult<String> {
        self.names.claim_with_companion(candidate, COMPARER_SUFFIX)
    }

    /// Register a class under a name from [`reserve_name`](Self::reserve_name).
    ///
    /// The class never takes part in structural dedup.
    pub fn register_nominal_class(
        &mut self,
        name: String,
        pointer: &str,
        properties: Vec<PropertyModel>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        self.insert_class(name, pointer, properties, description)
    }

    /// Intern an inline enumeration by its ordered literal set.
    pub fn intern_enum(
        &mut self,
        candidate: &str,
        pointer: &str,
        literals: Vec<EnumLiteral>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        if let Some(id) = self.by_literals.get(&literals) {
            tracing::debug!(candidate, id = %id, "reused identical enumeration");
            return Ok(*id);
        }
        let members = enum_members(&literals)?;
        let name = self.names.claim(candidate)?;
        let id = ClassId(self.slots.len());
        tracing::debug!(enumeration = %name, id = %id, "registered enumeration");
        self.slots.push(Slot::Enum(EnumModel {
            id,
            name,
            members,
            description,
            source_is_named_definition: false,
            pointer: pointer.to_string(),
        }));
        self.by_literals.insert(literals, id);
        Ok(id)
    }

    /// Freeze the registry into an immutable class set.
    pub fn finish(self, root: TypeRef) -> CompileResult<ClassSet> {
        let mut types = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            match slot {
                Slot::Class(c) => types.push(TypeModel::Class(c)),
                Slot::Enum(e) => types.push(TypeModel::Enum(e)),
                Slot::Reserved { name, pointer } => {
                    return Err(CompileError::invalid(
                        format!("definition '{}' was never compiled", name),
                        pointer,
                    ))
                }
            }
        }
        Ok(ClassSet { types, root })
    }

    fn push_class(
        &mut self,
        candidate: &str,
        pointer: &str,
        properties: Vec<PropertyModel>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        let name = self.names.claim_with_companion(candidate, COMPARER_SUFFIX)?;
        self.insert_class(name, pointer, properties, description)
    }

    fn insert_class(
        &mut self,
        name: String,
        pointer: &str,
        mut properties: Vec<PropertyModel>,
        description: Option<String>,
    ) -> CompileResult<ClassId> {
        assign_display_names(&name, &mut properties)?;
        let id = ClassId(self.slots.len());
        tracing::debug!(class = %name, id = %id, properties = properties.len(), "registered class");
        self.slots.push(Slot::Class(ClassModel {
            id,
            name,
            properties,
            description,
            source_is_named_definition: false,
            pointer: pointer.to_string(),
        }));
        Ok(id)
    }

    fn take_reserved(&self, id: ClassId) -> CompileResult<(String, String)> {
        match self.slots.get(id.index()) {
            Some(Slot::Reserved { name, pointer }) => Ok((name.clone(), pointer.clone())),
            Some(Slot::Class(ClassModel { name, pointer, .. }))
            | Some(Slot::Enum(EnumModel { name, pointer, .. })) => Err(CompileError::invalid(
                format!("definition '{}' compiled twice", name),
                pointer.clone(),
            )),
            None => Err(CompileError::invalid(
                format!("unknown class id {}", id),
                "#",
            )),
        }
    }
}

/// Give every property a unique identifier within its class.
fn assign_display_names(class_name: &str, properties: &mut [PropertyModel]) -> CompileResult<()> {
    let mut table = NameTable::with_reserved(RESERVED_MEMBERS.iter().copied());
    for property in properties.iter_mut() {
        let mut candidate = naming::identifier(&property.json_name, "Property");
        // A member cannot share its enclosing type's name.
        if candidate == class_name {
            candidate.push_str("Value");
        }
        property.display_name = table.claim(&candidate)?;
    }
    Ok(())
}

fn enum_members(literals: &[EnumLiteral]) -> CompileResult<Vec<EnumMember>> {
    let mut table = NameTable::new();
    literals
        .iter()
        .map(|literal| {
            let candidate = match literal {
                EnumLiteral::String(s) => naming::identifier(s, "Empty"),
                EnumLiteral::Integer(i) if *i < 0 => format!("ValueMinus{}", i.unsigned_abs()),
                EnumLiteral::Integer(i) => format!("Value{}", i),
            };
            Ok(EnumMember {
                name: table.claim(&candidate)?,
                literal: literal.clone(),
            })
        })
        .collect()
}
