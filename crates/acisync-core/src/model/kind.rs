// ── Resource kinds ──
//
// A kind is a zero-sized marker that binds an APIC class to its typed
// attribute struct, its rn prefix, where its parent DN comes from, and the
// relations it owns. The attribute mapping table (`FIELDS`) is the only place
// declared keys, wire keys and struct fields meet.

use std::fmt;

use crate::model::dn::Dn;

/// One row of a kind's attribute mapping table.
///
/// `get` returning `None` means "not set"; `set(None)` clears the field.
pub struct Field<A> {
    /// Key in the flat declared-attribute set (e.g. `name_alias`).
    pub key: &'static str,
    /// Attribute name on the wire (e.g. `nameAlias`).
    pub wire: &'static str,
    pub get: fn(&A) -> Option<&str>,
    pub set: fn(&mut A, Option<String>),
}

/// Where a kind's parent DN comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentScope {
    /// Root kinds live under a well-known container.
    Fixed(&'static str),
    /// The parent is a required declared attribute named `key`.
    Declared { key: &'static str },
}

impl ParentScope {
    /// Name of the declared parent attribute, if the kind has one.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Fixed(_) => None,
            Self::Declared { key } => Some(key),
        }
    }
}

/// How a relation object's rn is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationRn {
    /// One relation object per primary, at a fixed rn (single-valued).
    Fixed(&'static str),
    /// One relation object per target, rn `prefix[target]` (multi-valued).
    PerTarget { prefix: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

/// A named relation from a primary object to other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec {
    /// Declared attribute name, e.g. `relation_vz_rs_if`.
    pub key: &'static str,
    /// APIC class of the relation object, e.g. `vzRsIf`.
    pub class: &'static str,
    pub rn: RelationRn,
    /// Attribute carrying the target locator.
    pub target_attr: &'static str,
}

impl RelationSpec {
    pub fn cardinality(&self) -> Cardinality {
        match self.rn {
            RelationRn::Fixed(_) => Cardinality::Single,
            RelationRn::PerTarget { .. } => Cardinality::Multiple,
        }
    }

    /// DN of the relation object linking `primary` to `target`.
    pub fn child_dn(&self, primary: &Dn, target: &str) -> Dn {
        match self.rn {
            RelationRn::Fixed(rn) => primary.join(rn),
            RelationRn::PerTarget { prefix } => primary.join(&format!("{prefix}[{target}]")),
        }
    }
}

/// Static description of one APIC object kind.
pub trait ResourceKind: fmt::Debug + Clone + Copy + PartialEq + Eq + Send + Sync + 'static {
    /// Declared-state kind name, e.g. `imported_contract`.
    const KIND: &'static str;
    /// APIC class name, e.g. `vzCPIf`.
    const CLASS: &'static str;
    /// Prefix prepended to the name to form the rn, e.g. `cif-`.
    const RN_PREFIX: &'static str;
    const PARENT: ParentScope;
    const RELATIONS: &'static [RelationSpec] = &[];

    type Attributes: Default + Clone + fmt::Debug + PartialEq + Eq + Send + Sync;

    /// Mapping table for the optional, kind-specific attributes.
    const FIELDS: &'static [Field<Self::Attributes>];

    fn relation(key: &str) -> Option<&'static RelationSpec> {
        Self::RELATIONS.iter().find(|spec| spec.key == key)
    }

    fn field(key: &str) -> Option<&'static Field<Self::Attributes>> {
        Self::FIELDS.iter().find(|field| field.key == key)
    }
}
