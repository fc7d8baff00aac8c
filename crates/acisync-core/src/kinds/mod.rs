// ── Supported object kinds ──

mod attachable_entity_profile;
mod firmware_group;
mod imported_contract;

pub use attachable_entity_profile::{AttachableEntityProfile, AttachableEntityProfileAttributes};
pub use firmware_group::{FirmwareGroup, FirmwareGroupAttributes};
pub use imported_contract::{ImportedContract, ImportedContractAttributes};
