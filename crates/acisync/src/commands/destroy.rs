//! `destroy`: delete tracked resources from the controller.

use std::sync::Arc;

use acisync_api::Transport;

use crate::cli::{DestroyArgs, GlobalOpts};
use crate::engine;
use crate::error::CliError;
use crate::kind::with_kind;

use super::{Batch, util};

pub async fn handle(
    args: DestroyArgs,
    transport: Arc<dyn Transport>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut store = util::open_state(global)?;

    let addresses = if args.all {
        store.addresses()
    } else {
        args.addresses
    };
    if let Some(missing) = addresses.iter().find(|a| store.get(a).is_none()) {
        return Err(CliError::AddressNotFound {
            address: missing.clone(),
        });
    }
    if addresses.is_empty() {
        if !global.quiet {
            eprintln!("Nothing to destroy");
        }
        return Ok(());
    }

    let prompt = match addresses.as_slice() {
        [one] => format!("Delete {one} from the controller? This is destructive."),
        many => format!(
            "Delete {} resources from the controller? This is destructive.",
            many.len()
        ),
    };
    if !util::confirm(&prompt, "destroy", global.yes)? {
        return Ok(());
    }

    let mut batch = Batch::new(global);
    for address in addresses {
        let Some(entry) = store.get(&address).cloned() else {
            continue;
        };
        let dn = entry.dn().to_owned();
        let applied = with_kind!(entry.kind, K => {
            engine::destroy_resource::<K>(Arc::clone(&transport), entry.state).await
        });
        store.track(&address, entry.kind, applied.state);
        store.save()?;

        match applied.result {
            Ok(()) => batch.ok(&address, entry.kind, &dn, "destroyed"),
            Err(e) => batch.fail(&address, entry.kind, &dn, e.into()),
        }
    }
    batch.finish(&global.output)
}
