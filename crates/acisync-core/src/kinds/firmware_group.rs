use crate::model::kind::{Field, ParentScope, ResourceKind};

/// `firmwareFwGrp`: a fabric firmware group, rooted at `uni/fabric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareGroup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareGroupAttributes {
    pub annotation: Option<String>,
    pub name_alias: Option<String>,
    /// Group type, sent on the wire as `type`.
    pub firmware_group_type: Option<String>,
}

impl ResourceKind for FirmwareGroup {
    const KIND: &'static str = "firmware_group";
    const CLASS: &'static str = "firmwareFwGrp";
    const RN_PREFIX: &'static str = "fwgrp-";
    const PARENT: ParentScope = ParentScope::Fixed("uni/fabric");

    type Attributes = FirmwareGroupAttributes;

    const FIELDS: &'static [Field<FirmwareGroupAttributes>] = &[
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
        Field {
            key: "firmware_group_type",
            wire: "type",
            get: |a| a.firmware_group_type.as_deref(),
            set: |a, v| a.firmware_group_type = v,
        },
    ];
}
