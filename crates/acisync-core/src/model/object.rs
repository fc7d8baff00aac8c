// ── Managed objects ──
//
// The typed wire form of one APIC object: the common attributes every class
// carries plus the kind's own attribute struct. Conversion to and from the
// `imdata` envelope goes through the kind's field table.

use std::marker::PhantomData;

use acisync_api::{Attributes, Container, mo_payload};
use serde_json::Value;

use crate::model::kind::ResourceKind;

/// Value of the `status` attribute on a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum ObjectStatus {
    #[strum(serialize = "created,modified")]
    CreatedModified,
    #[strum(serialize = "modified")]
    Modified,
    #[strum(serialize = "deleted")]
    Deleted,
}

/// One APIC object of kind `K` in wire form.
///
/// An empty `dn` means the lookup that produced this object found nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject<K: ResourceKind> {
    pub dn: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ObjectStatus>,
    pub attributes: K::Attributes,
    kind: PhantomData<K>,
}

impl<K: ResourceKind> ManagedObject<K> {
    pub fn new(dn: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            name: name.into(),
            description: None,
            status: None,
            attributes: K::Attributes::default(),
            kind: PhantomData,
        }
    }

    /// True when this object came from a lookup that matched something.
    pub fn exists(&self) -> bool {
        !self.dn.is_empty()
    }

    /// Build from the first `K::CLASS` entry of a lookup response. Yields an
    /// object with an empty `dn` when the container has no such entry.
    pub fn from_container(container: &Container) -> Self {
        container
            .first(K::CLASS)
            .map_or_else(|| Self::new(String::new(), String::new()), Self::from_attributes)
    }

    pub fn from_attributes(attrs: &Attributes) -> Self {
        let text = |key: &str| attrs.get(key).and_then(Value::as_str).map(str::to_owned);

        let mut attributes = K::Attributes::default();
        for field in K::FIELDS {
            (field.set)(&mut attributes, text(field.wire));
        }

        Self {
            dn: text("dn").unwrap_or_default(),
            name: text("name").unwrap_or_default(),
            description: text("descr"),
            status: text("status").and_then(|s| s.parse().ok()),
            attributes,
            kind: PhantomData,
        }
    }

    /// Wire attribute map. Optional attributes that are unset or empty are
    /// omitted so the controller keeps its own value.
    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("dn".into(), Value::String(self.dn.clone()));
        attrs.insert("name".into(), Value::String(self.name.clone()));
        if let Some(ref descr) = self.description {
            attrs.insert("descr".into(), Value::String(descr.clone()));
        }
        for field in K::FIELDS {
            if let Some(value) = (field.get)(&self.attributes).filter(|v| !v.is_empty()) {
                attrs.insert(field.wire.into(), Value::String(value.to_owned()));
            }
        }
        if let Some(status) = self.status {
            attrs.insert("status".into(), Value::String(status.to_string()));
        }
        attrs
    }

    /// `{ "<class>": { "attributes": {..} } }` body for a save.
    pub fn to_payload(&self) -> Value {
        mo_payload(K::CLASS, self.to_attributes())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::kinds::FirmwareGroup;

    #[test]
    fn payload_uses_wire_names_and_skips_unset() {
        let mut obj = ManagedObject::<FirmwareGroup>::new("uni/fabric/fwgrp-fw1", "fw1");
        obj.status = Some(ObjectStatus::CreatedModified);
        obj.attributes.firmware_group_type = Some("ALL".into());
        obj.attributes.annotation = Some(String::new());

        assert_eq!(
            obj.to_payload(),
            json!({
                "firmwareFwGrp": {
                    "attributes": {
                        "dn": "uni/fabric/fwgrp-fw1",
                        "name": "fw1",
                        "type": "ALL",
                        "status": "created,modified"
                    }
                }
            })
        );
    }

    #[test]
    fn from_container_reads_first_matching_entry() {
        let cont: Container = serde_json::from_value(json!({
            "totalCount": "1",
            "imdata": [{
                "firmwareFwGrp": {
                    "attributes": {
                        "dn": "uni/fabric/fwgrp-fw1",
                        "name": "fw1",
                        "descr": "edge",
                        "type": "range",
                        "nameAlias": "alias",
                        "status": ""
                    }
                }
            }]
        }))
        .unwrap();

        let obj = ManagedObject::<FirmwareGroup>::from_container(&cont);
        assert!(obj.exists());
        assert_eq!(obj.description.as_deref(), Some("edge"));
        assert_eq!(obj.attributes.firmware_group_type.as_deref(), Some("range"));
        assert_eq!(obj.attributes.name_alias.as_deref(), Some("alias"));
        assert_eq!(obj.attributes.annotation, None);
        assert_eq!(obj.status, None);
    }

    #[test]
    fn empty_container_yields_absent_object() {
        let obj = ManagedObject::<FirmwareGroup>::from_container(&Container::empty());
        assert!(!obj.exists());
    }

    #[test]
    fn status_strings() {
        assert_eq!(ObjectStatus::CreatedModified.to_string(), "created,modified");
        assert_eq!("deleted".parse::<ObjectStatus>().unwrap(), ObjectStatus::Deleted);
    }
}
