//! `import`: start tracking an object that already exists.

use std::sync::Arc;

use acisync_api::Transport;

use crate::cli::{GlobalOpts, ImportArgs};
use crate::engine;
use crate::error::CliError;
use crate::kind::with_kind;
use crate::output;

use super::{ResourceView, util};

pub async fn handle(
    args: ImportArgs,
    transport: Arc<dyn Transport>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut store = util::open_state(global)?;
    if let Some(existing) = store.address_of(&args.dn) {
        return Err(CliError::Conflict {
            address: existing.to_owned(),
            dn: args.dn,
        });
    }

    let state = with_kind!(args.kind, K => {
        engine::import_resource::<K>(transport, &args.dn).await
    })?;
    let name = state.attributes.get("name").cloned().unwrap_or_default();
    let address = args.address.unwrap_or_else(|| args.kind.address(&name));
    if let Some(entry) = store.get(&address) {
        return Err(CliError::Conflict {
            address,
            dn: entry.dn().to_owned(),
        });
    }

    store.track(&address, args.kind, state);
    store.save()?;
    if !global.quiet {
        eprintln!(
            "{} imported {} as {address}",
            output::mark_ok(output::should_color(&global.color)),
            args.dn
        );
    }

    if let Some(entry) = store.get(&address) {
        let view = ResourceView::tracked(&address, entry);
        let out = output::render_single(&global.output, &view, ResourceView::detail, |v| {
            v.address.clone().unwrap_or_default()
        });
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
