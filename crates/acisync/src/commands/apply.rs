//! `apply`: converge the controller on a manifest.
//!
//! Resources are applied in manifest order. The state file is saved after
//! each one so a failure later in the run never loses an identity the
//! controller already committed.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use acisync_api::Transport;

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::engine;
use crate::error::CliError;
use crate::kind::with_kind;
use crate::manifest::{Manifest, ResourceDecl};
use crate::state::StateStore;

use super::{Batch, util};

pub async fn handle(
    args: &ApplyArgs,
    manifest: &Manifest,
    transport: Arc<dyn Transport>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut store = util::open_state(global)?;
    let mut batch = Batch::new(global);

    for decl in &manifest.resources {
        let address = decl.address();
        let prior = match store.get(&address) {
            Some(entry) if entry.kind != decl.kind => {
                let err = CliError::Conflict {
                    address: address.clone(),
                    dn: entry.dn().to_owned(),
                };
                batch.fail(&address, decl.kind, "", err);
                continue;
            }
            Some(entry) => Some(entry.state.clone()),
            None => None,
        };

        debug!(address = %address, "applying");
        let applied = with_kind!(decl.kind, K => {
            engine::apply_resource::<K>(Arc::clone(&transport), prior, decl.to_flat()).await
        });
        let dn = applied.state.id.as_ref().map_or_else(String::new, ToString::to_string);
        store.track(&address, decl.kind, applied.state);
        store.save()?;

        match applied.result {
            Ok(action) => batch.ok(&address, decl.kind, &dn, action),
            Err(e) => batch.fail(&address, decl.kind, &dn, e.into()),
        }
    }

    if args.prune {
        let declared: BTreeSet<String> = manifest.resources.iter().map(ResourceDecl::address).collect();
        prune(&mut store, &declared, &transport, global, &mut batch).await?;
    }

    batch.finish(&global.output)
}

/// Destroy tracked resources whose address the manifest no longer declares.
async fn prune(
    store: &mut StateStore,
    declared: &BTreeSet<String>,
    transport: &Arc<dyn Transport>,
    global: &GlobalOpts,
    batch: &mut Batch,
) -> Result<(), CliError> {
    let orphans: Vec<String> = store
        .addresses()
        .into_iter()
        .filter(|a| !declared.contains(a))
        .collect();
    if orphans.is_empty() {
        return Ok(());
    }
    let prompt = format!(
        "Destroy {} tracked resource(s) missing from the manifest?",
        orphans.len()
    );
    if !util::confirm(&prompt, "apply --prune", global.yes)? {
        return Ok(());
    }

    for address in orphans {
        let Some(entry) = store.get(&address).cloned() else {
            continue;
        };
        let dn = entry.dn().to_owned();
        let applied = with_kind!(entry.kind, K => {
            engine::destroy_resource::<K>(Arc::clone(transport), entry.state).await
        });
        store.track(&address, entry.kind, applied.state);
        store.save()?;
        match applied.result {
            Ok(()) => batch.ok(&address, entry.kind, &dn, "destroyed"),
            Err(e) => batch.fail(&address, entry.kind, &dn, e.into()),
        }
    }
    Ok(())
}
