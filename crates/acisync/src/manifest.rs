//! YAML manifest of desired resources.
//!
//! ```yaml
//! resources:
//!   - kind: imported_contract
//!     address: web            # optional, defaults to <kind>.<name>
//!     attributes:
//!       name: web
//!       tenant_dn: uni/tn-t1
//!     relations:
//!       relation_vz_rs_if: uni/tn-common/brc-web
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use acisync_core::{FlatAttributes, FlatState, Operation, RelationValue};

use crate::error::CliError;
use crate::kind::{KindName, with_kind};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDecl {
    pub kind: KindName,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub attributes: FlatAttributes,
    #[serde(default)]
    pub relations: BTreeMap<String, RelationValue>,
}

impl ResourceDecl {
    pub fn name(&self) -> &str {
        self.attributes.get("name").map_or("", String::as_str)
    }

    /// State address: the explicit `address`, or `<kind>.<name>`.
    pub fn address(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| self.kind.address(self.name()))
    }

    /// Desired state with no identity.
    pub fn to_flat(&self) -> FlatState {
        FlatState {
            id: None,
            attributes: self.attributes.clone(),
            relations: self.relations.clone(),
        }
    }
}

impl Manifest {
    pub fn parse(raw: &str, origin: &Path) -> Result<Self, CliError> {
        let manifest: Self = serde_yaml::from_str(raw).map_err(|e| manifest_error(origin, e))?;
        manifest.validate(origin)?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|e| manifest_error(path, e))?;
        Self::parse(&raw, path)
    }

    /// Check every declaration against its kind's schema and reject
    /// duplicate addresses.
    fn validate(&self, origin: &Path) -> Result<(), CliError> {
        let mut seen = BTreeSet::new();
        for decl in &self.resources {
            let address = decl.address();
            with_kind!(decl.kind, K => {
                acisync_core::Declared::<K>::from_flat(decl.to_flat())
                    .and_then(|declared| declared.target_dn(Operation::Create).map(|_| ()))
                    .map_err(|e| manifest_error(origin, format!("{address}: {e}")))
            })?;
            if !seen.insert(address.clone()) {
                return Err(manifest_error(
                    origin,
                    format!("address '{address}' is declared more than once"),
                ));
            }
        }
        Ok(())
    }
}

fn manifest_error(
    path: &Path,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> CliError {
    CliError::Manifest {
        path: path.display().to_string(),
        source: source.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn origin() -> PathBuf {
        PathBuf::from("test.yaml")
    }

    fn reason(err: &CliError) -> String {
        match err {
            CliError::Manifest { source, .. } => source.to_string(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_every_kind() {
        let manifest = Manifest::parse(
            r"
resources:
  - kind: firmware_group
    attributes:
      name: fw1
      firmware_group_type: range
  - kind: imported_contract
    address: web-import
    attributes:
      name: web
      tenant_dn: uni/tn-t1
    relations:
      relation_vz_rs_if: uni/tn-common/brc-web
  - kind: attachable_entity_profile
    attributes:
      name: esx
    relations:
      relation_infra_rs_dom_p:
        - uni/phys-a
        - uni/vmmp-VMware/dom-b
",
            &origin(),
        )
        .unwrap();

        let addresses: Vec<_> = manifest.resources.iter().map(ResourceDecl::address).collect();
        assert_eq!(
            addresses,
            ["firmware_group.fw1", "web-import", "attachable_entity_profile.esx"]
        );
        assert_eq!(
            manifest.resources[2].relations["relation_infra_rs_dom_p"],
            RelationValue::Many(BTreeSet::from([
                "uni/phys-a".to_owned(),
                "uni/vmmp-VMware/dom-b".to_owned()
            ]))
        );
    }

    #[test]
    fn empty_document_has_no_resources() {
        let manifest = Manifest::parse("resources: []\n", &origin()).unwrap();
        assert!(manifest.resources.is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Manifest::parse(
            "resources:\n  - kind: bridge_domain\n    attributes: {name: bd}\n",
            &origin(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Manifest { .. }));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = Manifest::parse(
            "resources:\n  - kind: firmware_group\n    attributes: {name: fw1, colour: red}\n",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("colour"));
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = Manifest::parse(
            "resources:\n  - kind: firmware_group\n    attributes: {annotation: x}\n",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("name"));
    }

    #[test]
    fn missing_tenant_is_rejected() {
        let err = Manifest::parse(
            "resources:\n  - kind: imported_contract\n    attributes: {name: web}\n",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("tenant_dn"));
    }

    #[test]
    fn name_spanning_two_rns_is_rejected() {
        let err = Manifest::parse(
            "resources:\n  - kind: firmware_group\n    attributes: {name: fw/1}\n",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("not a single rn"));
    }

    #[test]
    fn single_relation_with_two_targets_is_rejected() {
        let err = Manifest::parse(
            r"
resources:
  - kind: imported_contract
    attributes: {name: web, tenant_dn: uni/tn-t1}
    relations:
      relation_vz_rs_if: [uni/tn-common/brc-a, uni/tn-common/brc-b]
",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("relation_vz_rs_if"));
    }

    #[test]
    fn duplicate_addresses_are_rejected() {
        let err = Manifest::parse(
            r"
resources:
  - kind: firmware_group
    attributes: {name: fw1}
  - kind: firmware_group
    attributes: {name: fw1, annotation: again}
",
            &origin(),
        )
        .unwrap_err();
        assert!(reason(&err).contains("more than once"));
    }
}
