//! `lookup`: fetch one object by name. Nothing is written to state.

use std::sync::Arc;

use acisync_api::Transport;

use crate::cli::{GlobalOpts, LookupArgs};
use crate::engine;
use crate::error::CliError;
use crate::kind::with_kind;
use crate::output;

use super::ResourceView;

pub async fn handle(
    args: LookupArgs,
    transport: Arc<dyn Transport>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = with_kind!(args.kind, K => {
        engine::lookup_resource::<K>(transport, &args.name, args.parent.as_deref()).await
    })?;

    let view = ResourceView::untracked(args.kind, state);
    let out = output::render_single(&global.output, &view, ResourceView::detail, |v| {
        v.dn().to_owned()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
