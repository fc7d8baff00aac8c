//! `refresh`: re-read every tracked resource.

use std::sync::Arc;

use acisync_api::Transport;

use crate::cli::GlobalOpts;
use crate::engine;
use crate::error::CliError;
use crate::kind::with_kind;

use super::{Batch, util};

pub async fn handle(transport: Arc<dyn Transport>, global: &GlobalOpts) -> Result<(), CliError> {
    let mut store = util::open_state(global)?;
    let mut batch = Batch::new(global);

    for address in store.addresses() {
        let Some(entry) = store.get(&address).cloned() else {
            continue;
        };
        let dn = entry.dn().to_owned();
        let applied = with_kind!(entry.kind, K => {
            engine::refresh_resource::<K>(Arc::clone(&transport), entry.state).await
        });
        store.track(&address, entry.kind, applied.state);

        match applied.result {
            Ok(true) => batch.ok(&address, entry.kind, &dn, "in sync"),
            Ok(false) => batch.warn(&address, entry.kind, &dn, "gone; dropped from state"),
            Err(e) => batch.fail(&address, entry.kind, &dn, e.into()),
        }
    }

    store.save()?;
    batch.finish(&global.output)
}
