use crate::model::kind::{Field, ParentScope, RelationRn, RelationSpec, ResourceKind};

/// `vzCPIf`: a contract interface importing a contract into a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedContract;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedContractAttributes {
    pub annotation: Option<String>,
    pub name_alias: Option<String>,
}

impl ResourceKind for ImportedContract {
    const KIND: &'static str = "imported_contract";
    const CLASS: &'static str = "vzCPIf";
    const RN_PREFIX: &'static str = "cif-";
    const PARENT: ParentScope = ParentScope::Declared { key: "tenant_dn" };
    const RELATIONS: &'static [RelationSpec] = &[RelationSpec {
        key: "relation_vz_rs_if",
        class: "vzRsIf",
        rn: RelationRn::Fixed("rsif"),
        target_attr: "tDn",
    }];

    type Attributes = ImportedContractAttributes;

    const FIELDS: &'static [Field<ImportedContractAttributes>] = &[
        Field {
            key: "annotation",
            wire: "annotation",
            get: |a| a.annotation.as_deref(),
            set: |a, v| a.annotation = v,
        },
        Field {
            key: "name_alias",
            wire: "nameAlias",
            get: |a| a.name_alias.as_deref(),
            set: |a, v| a.name_alias = v,
        },
    ];
}
