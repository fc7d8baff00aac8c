// ── Attribute mapping ──
//
// Conversions between the flat declared-attribute set (string keys, string
// values) and typed `ManagedObject`s. Absent optional attributes decode to
// the empty string; empty declared values are never sent.

use crate::model::declared::FlatAttributes;
use crate::model::dn::{Dn, DnError};
use crate::model::kind::ResourceKind;
use crate::model::object::{ManagedObject, ObjectStatus};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";

/// Project a remote object onto the flat attribute set. Every key the kind
/// defines is present in the result.
pub fn decode<K: ResourceKind>(obj: &ManagedObject<K>) -> FlatAttributes {
    let mut flat = FlatAttributes::new();
    flat.insert(NAME.into(), obj.name.clone());
    flat.insert(
        DESCRIPTION.into(),
        obj.description.clone().unwrap_or_default(),
    );
    for field in K::FIELDS {
        let value = (field.get)(&obj.attributes).unwrap_or_default();
        flat.insert(field.key.into(), value.to_owned());
    }
    flat
}

/// Build the object to save under `parent` from flat declared attributes.
pub fn encode<K: ResourceKind>(
    flat: &FlatAttributes,
    parent: &Dn,
    description: Option<&str>,
    status: ObjectStatus,
) -> Result<ManagedObject<K>, DnError> {
    let name = flat.get(NAME).map(String::as_str).unwrap_or_default();
    let dn = Dn::child(parent, K::RN_PREFIX, name)?;

    let mut obj = ManagedObject::<K>::new(dn, name);
    obj.description = description.map(str::to_owned);
    obj.status = Some(status);
    obj.attributes = attributes_from_flat::<K>(flat);
    Ok(obj)
}

/// Typed attributes from a flat set. Only non-empty values count as set.
pub fn attributes_from_flat<K: ResourceKind>(flat: &FlatAttributes) -> K::Attributes {
    let mut attrs = K::Attributes::default();
    for field in K::FIELDS {
        let value = flat.get(field.key).filter(|v| !v.is_empty()).cloned();
        (field.set)(&mut attrs, value);
    }
    attrs
}

/// Write every set attribute into `flat`, keyed by declared name.
pub fn attributes_to_flat<K: ResourceKind>(attrs: &K::Attributes, flat: &mut FlatAttributes) {
    for field in K::FIELDS {
        if let Some(value) = (field.get)(attrs) {
            flat.insert(field.key.into(), value.to_owned());
        }
    }
}
