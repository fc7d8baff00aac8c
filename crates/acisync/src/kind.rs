//! Resource kind names as they appear on the command line, in manifests
//! and in the state file.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use acisync_core::{AttachableEntityProfile, FirmwareGroup, ImportedContract, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindName {
    #[value(name = "firmware_group")]
    FirmwareGroup,
    #[value(name = "imported_contract")]
    ImportedContract,
    #[value(name = "attachable_entity_profile")]
    AttachableEntityProfile,
}

impl KindName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirmwareGroup => FirmwareGroup::KIND,
            Self::ImportedContract => ImportedContract::KIND,
            Self::AttachableEntityProfile => AttachableEntityProfile::KIND,
        }
    }

    /// Default state address for an object of this kind.
    pub fn address(self, name: &str) -> String {
        format!("{}.{name}", self.as_str())
    }
}

impl fmt::Display for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run `$body` with `K` bound to the core type behind `$kind`.
macro_rules! with_kind {
    ($kind:expr, $K:ident => $body:expr) => {
        match $kind {
            $crate::kind::KindName::FirmwareGroup => {
                type $K = ::acisync_core::FirmwareGroup;
                $body
            }
            $crate::kind::KindName::ImportedContract => {
                type $K = ::acisync_core::ImportedContract;
                $body
            }
            $crate::kind::KindName::AttachableEntityProfile => {
                type $K = ::acisync_core::AttachableEntityProfile;
                $body
            }
        }
    };
}

pub(crate) use with_kind;
