#![allow(clippy::unwrap_used)]
// Lifecycle tests for `Reconciler` against the in-memory APIC.

mod common;

use pretty_assertions::assert_eq;

use acisync_core::{
    AttachableEntityProfile, CoreError, Declared, Dn, FirmwareGroup, ImportedContract, Operation,
    Reconciler,
};
use common::{Call, FakeApic};

fn dn(s: &str) -> Dn {
    Dn::new(s).unwrap()
}

fn firmware_group(name: &str, group_type: Option<&str>) -> Declared<FirmwareGroup> {
    let mut declared = Declared::<FirmwareGroup>::new(name);
    declared.attributes.firmware_group_type = group_type.map(str::to_owned);
    declared
}

// ── Create / read / delete ──────────────────────────────────────────

#[tokio::test]
async fn test_firmware_group_end_to_end() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("fw1", Some("ALL")).with_parent(dn("uni/fabric"));
    rec.create(&mut state).await.unwrap();

    assert_eq!(state.id, Some(dn("uni/fabric/fwgrp-fw1")));
    assert!(apic.exists("uni/fabric/fwgrp-fw1"));

    rec.read(&mut state).await.unwrap();
    assert_eq!(state.attributes.firmware_group_type.as_deref(), Some("ALL"));
    assert_eq!(state.parent, Some(dn("uni/fabric")));

    rec.delete(&mut state).await.unwrap();
    assert_eq!(state.id, None);
    assert!(!apic.exists("uni/fabric/fwgrp-fw1"));

    // Deleted remotely: a read against the old identity clears it quietly.
    state.id = Some(dn("uni/fabric/fwgrp-fw1"));
    rec.read(&mut state).await.unwrap();
    assert_eq!(state.id, None);
}

#[tokio::test]
async fn test_create_refreshes_server_defaults() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("fw2", None);
    rec.create(&mut state).await.unwrap();

    assert_eq!(state.attributes.firmware_group_type.as_deref(), Some("range"));
    assert_eq!(state.attributes.annotation.as_deref(), Some(""));
    assert_eq!(state.description.as_deref(), Some(""));
}

#[tokio::test]
async fn test_create_save_failure_leaves_state_absent() {
    let apic = FakeApic::new();
    apic.fail_on(Call::Save, "fwgrp-bad");
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("bad", None);
    let err = rec.create(&mut state).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Transport { operation: Operation::Create, ref dn, .. } if dn == "uni/fabric/fwgrp-bad"
    ));
    assert_eq!(state.id, None);
}

#[tokio::test]
async fn test_create_under_missing_tenant_propagates_api_fault() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut state = Declared::<ImportedContract>::new("web").with_parent(dn("uni/tn-ghost"));
    let err = rec.create(&mut state).await.unwrap_err();

    match err {
        CoreError::Transport { source, .. } => assert_eq!(source.api_error_code(), Some("103")),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(state.id, None);
}

#[tokio::test]
async fn test_create_requires_declared_parent() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut state = Declared::<ImportedContract>::new("web");
    let err = rec.create(&mut state).await.unwrap_err();

    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "tenant_dn"));
    assert!(apic.log().is_empty());
}

#[tokio::test]
async fn test_read_of_missing_object_is_idempotent() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("ghost", None);
    state.id = Some(dn("uni/fabric/fwgrp-ghost"));

    rec.read(&mut state).await.unwrap();
    assert_eq!(state.id, None);
    rec.read(&mut state).await.unwrap();
    assert_eq!(state.id, None);
}

#[tokio::test]
async fn test_read_transport_error_keeps_identity() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("fw1", None);
    rec.create(&mut state).await.unwrap();

    apic.fail_on(Call::Get, "fwgrp-fw1");
    let err = rec.read(&mut state).await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::Read));
    assert_eq!(state.id, Some(dn("uni/fabric/fwgrp-fw1")));
}

#[tokio::test]
async fn test_read_malformed_identity_is_surfaced() {
    let apic = FakeApic::new();
    apic.insert(
        "fwgrp-orphan",
        "firmwareFwGrp",
        serde_json::Map::from_iter([("name".to_owned(), serde_json::json!("orphan"))]),
    );
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("orphan", None);
    state.id = Some(dn("fwgrp-orphan"));
    let err = rec.read(&mut state).await.unwrap_err();

    assert!(matches!(err, CoreError::Identity { operation: Operation::Read, .. }));
}

#[tokio::test]
async fn test_delete_without_identity_is_noop() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("never", None);
    rec.delete(&mut state).await.unwrap();
    assert!(apic.log().is_empty());
}

#[tokio::test]
async fn test_delete_failure_retains_identity() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut state = firmware_group("fw1", None);
    rec.create(&mut state).await.unwrap();

    apic.fail_on(Call::Delete, "fwgrp-fw1");
    let err = rec.delete(&mut state).await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::Delete));
    assert_eq!(state.id, Some(dn("uni/fabric/fwgrp-fw1")));

    apic.heal();
    rec.delete(&mut state).await.unwrap();
    assert_eq!(state.id, None);
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_does_not_clobber_unset_attributes() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut prior = firmware_group("fw1", None);
    rec.create(&mut prior).await.unwrap();
    apic.tamper("uni/fabric/fwgrp-fw1", "nameAlias", "set-elsewhere");

    let mut state = firmware_group("fw1", None).with_description("edge");
    rec.update(&prior, &mut state).await.unwrap();

    assert_eq!(apic.attr("uni/fabric/fwgrp-fw1", "descr").as_deref(), Some("edge"));
    assert_eq!(apic.attr("uni/fabric/fwgrp-fw1", "type").as_deref(), Some("range"));
    assert_eq!(
        apic.attr("uni/fabric/fwgrp-fw1", "nameAlias").as_deref(),
        Some("set-elsewhere")
    );
    assert_eq!(state.attributes.name_alias.as_deref(), Some("set-elsewhere"));
}

#[tokio::test]
async fn test_update_sends_modified_status() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut prior = firmware_group("fw1", Some("range"));
    rec.create(&mut prior).await.unwrap();
    apic.clear_log();

    let mut state = firmware_group("fw1", Some("ALL"));
    rec.update(&prior, &mut state).await.unwrap();

    assert_eq!(apic.log()[0], "POST uni/fabric/fwgrp-fw1");
    assert_eq!(apic.attr("uni/fabric/fwgrp-fw1", "type").as_deref(), Some("ALL"));
    let body = apic.last_save("uni/fabric/fwgrp-fw1").unwrap();
    assert_eq!(body["firmwareFwGrp"]["attributes"]["status"], "modified");
}

#[tokio::test]
async fn test_update_rejects_rename() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let mut prior = firmware_group("fw1", None);
    rec.create(&mut prior).await.unwrap();

    let mut state = firmware_group("fw9", None);
    let err = rec.update(&prior, &mut state).await.unwrap_err();

    assert!(matches!(err, CoreError::Immutable { field: "name", .. }));
    assert!(!apic.exists("uni/fabric/fwgrp-fw9"));
}

#[tokio::test]
async fn test_update_rejects_tenant_move() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut prior = Declared::<ImportedContract>::new("web").with_parent(dn("uni/tn-t1"));
    rec.create(&mut prior).await.unwrap();

    let mut state = Declared::<ImportedContract>::new("web").with_parent(dn("uni/tn-common"));
    let err = rec.update(&prior, &mut state).await.unwrap_err();

    assert!(matches!(err, CoreError::Immutable { field: "tenant_dn", .. }));
}

#[tokio::test]
async fn test_update_without_identity_is_rejected() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let prior = firmware_group("fw1", None);
    let mut state = firmware_group("fw1", Some("ALL"));
    let err = rec.update(&prior, &mut state).await.unwrap_err();

    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(apic.log().is_empty());
}

#[tokio::test]
async fn test_update_save_failure_propagates() {
    let apic = FakeApic::new();
    let rec = Reconciler::<AttachableEntityProfile>::new(apic.transport());

    let mut prior = Declared::<AttachableEntityProfile>::new("a1");
    rec.create(&mut prior).await.unwrap();
    apic.fail_on(Call::Save, "attentp-a1");

    let mut state = Declared::<AttachableEntityProfile>::new("a1").with_description("x");
    let err = rec.update(&prior, &mut state).await.unwrap_err();
    assert!(matches!(err, CoreError::Transport { operation: Operation::Update, .. }));
    assert_eq!(apic.attr("uni/infra/attentp-a1", "descr").as_deref(), Some(""));
}

// ── Import / lookup ─────────────────────────────────────────────────

#[tokio::test]
async fn test_import_populates_parent_and_relations() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut created = Declared::<ImportedContract>::new("web").with_parent(dn("uni/tn-t1"));
    created.attributes.annotation = Some("team:net".into());
    created
        .set_relation("relation_vz_rs_if", ["uni/tn-common/brc-default"])
        .unwrap();
    rec.create(&mut created).await.unwrap();

    let imported = rec.import("uni/tn-t1/cif-web").await.unwrap();

    assert_eq!(imported.id, Some(dn("uni/tn-t1/cif-web")));
    assert_eq!(imported.parent, Some(dn("uni/tn-t1")));
    assert_eq!(imported.name, "web");
    assert_eq!(imported.attributes.annotation.as_deref(), Some("team:net"));
    assert_eq!(
        imported.relation("relation_vz_rs_if").unwrap().first().map(String::as_str),
        Some("uni/tn-common/brc-default")
    );
}

#[tokio::test]
async fn test_import_of_missing_object_aborts() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let err = rec.import("uni/tn-t1/cif-ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.operation(), Some(Operation::Import));
}

#[tokio::test]
async fn test_import_relation_failure_aborts() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut created = Declared::<ImportedContract>::new("web").with_parent(dn("uni/tn-t1"));
    rec.create(&mut created).await.unwrap();
    apic.fail_on(Call::List, "vzRsIf");

    let err = rec.import("uni/tn-t1/cif-web").await.unwrap_err();
    assert!(matches!(err, CoreError::Transport { operation: Operation::Import, .. }));
}

#[tokio::test]
async fn test_import_rejects_empty_dn() {
    let apic = FakeApic::new();
    let rec = Reconciler::<FirmwareGroup>::new(apic.transport());

    let err = rec.import("").await.unwrap_err();
    assert!(matches!(err, CoreError::Identity { .. }));
}

#[tokio::test]
async fn test_lookup_finds_existing_and_errors_on_missing() {
    let apic = FakeApic::new();
    let rec = Reconciler::<ImportedContract>::new(apic.transport());

    let mut created = Declared::<ImportedContract>::new("web")
        .with_parent(dn("uni/tn-t1"))
        .with_description("front");
    rec.create(&mut created).await.unwrap();

    let found = rec.lookup("web", Some(dn("uni/tn-t1"))).await.unwrap();
    assert_eq!(found.id, Some(dn("uni/tn-t1/cif-web")));
    assert_eq!(found.description.as_deref(), Some("front"));

    let err = rec.lookup("web", Some(dn("uni/tn-common"))).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound { operation: Operation::Lookup, class: "vzCPIf", .. }
    ));
}
