//! `show`: list tracked resources, or one in detail. Offline.

use tabled::Tabled;

use crate::cli::{GlobalOpts, ShowArgs};
use crate::error::CliError;
use crate::output;
use crate::state::StateStore;

use super::{ResourceView, relation_text};

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "DN")]
    dn: String,
    #[tabled(rename = "Relations")]
    relations: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&ResourceView> for ResourceRow {
    fn from(v: &ResourceView) -> Self {
        Self {
            address: v.address.clone().unwrap_or_default(),
            kind: v.kind.to_string(),
            dn: v.dn().to_owned(),
            relations: v
                .state
                .relations
                .values()
                .map(|r| relation_text(r, "\n"))
                .collect::<Vec<_>>()
                .join("\n"),
            updated: v.updated_at.map_or_else(String::new, |t| {
                t.format("%Y-%m-%d %H:%M:%S").to_string()
            }),
        }
    }
}

pub fn handle(args: &ShowArgs, store: &StateStore, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref address) = args.address {
        let entry = store.get(address).ok_or_else(|| CliError::AddressNotFound {
            address: address.clone(),
        })?;
        let view = ResourceView::tracked(address, entry);
        let out = output::render_single(&global.output, &view, ResourceView::detail, |v| {
            v.dn().to_owned()
        });
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    if store.is_empty() && matches!(global.output, crate::cli::OutputFormat::Table) {
        if !global.quiet {
            eprintln!("No tracked resources in {}", store.path().display());
        }
        return Ok(());
    }

    let views: Vec<ResourceView> = store
        .iter()
        .map(|(address, entry)| ResourceView::tracked(address, entry))
        .collect();
    let out = output::render_list(&global.output, &views, |v| ResourceRow::from(v), |v| {
        v.address.clone().unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
