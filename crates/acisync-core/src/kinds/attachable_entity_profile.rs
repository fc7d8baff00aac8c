use crate::model::kind::{Field, ParentScope, RelationRn, RelationSpec, ResourceKind};

/// `infraAttEntityP`: groups domains for attachment to access ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachableEntityProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachableEntityProfileAttributes {
    pub annotation: Option<String>,
    pub name_alias: Option<String>,
}

impl ResourceKind for AttachableEntityProfile {
    const KIND: &'static str = "attachable_entity_profile";
    const CLASS: &'static str = "infraAttEntityP";
    const RN_PREFIX: &'static str = "attentp-";
    const PARENT: ParentScope = ParentScope::Fixed("uni/infra");
    const RELATIONS: &'static [RelationSpec] = &[RelationSpec {
        key: "relation_infra_rs_dom_p",
        class: "infraRsDomP",
        rn: RelationRn::PerTarget { prefix: "rsdomP-" },
        target_attr: "tDn",
    }];

    type Attributes = AttachableEntityProfileAttributes;

    const FIELDS: &'static [Field<AttachableEntityProfileAttributes>] = &[
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
