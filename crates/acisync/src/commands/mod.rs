//! Command handlers and the shared views they render.

pub mod apply;
pub mod config_cmd;
pub mod destroy;
pub mod import;
pub mod lookup;
pub mod refresh;
pub mod show;
pub mod util;

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use acisync_core::{Dn, FlatState, RelationValue};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::{CliError, exit_code};
use crate::kind::KindName;
use crate::output;
use crate::state::StateEntry;

// ── Shared views ────────────────────────────────────────────────────

/// One resource as shown by `show`, `import` and `lookup`.
#[derive(Debug, Serialize)]
pub struct ResourceView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub kind: KindName,
    #[serde(flatten)]
    pub state: FlatState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResourceView {
    pub fn tracked(address: &str, entry: &StateEntry) -> Self {
        Self {
            address: Some(address.to_owned()),
            kind: entry.kind,
            state: entry.state.clone(),
            updated_at: Some(entry.updated_at),
        }
    }

    pub fn untracked(kind: KindName, state: FlatState) -> Self {
        Self {
            address: None,
            kind,
            state,
            updated_at: None,
        }
    }

    pub fn dn(&self) -> &str {
        self.state.id.as_ref().map_or("", Dn::as_str)
    }

    /// Aligned key/value listing for table output.
    pub fn detail(&self) -> String {
        let mut lines: Vec<(String, String)> = Vec::new();
        if let Some(ref address) = self.address {
            lines.push(("address".into(), address.clone()));
        }
        lines.push(("kind".into(), self.kind.to_string()));
        lines.push(("dn".into(), self.dn().to_owned()));
        for (key, value) in &self.state.attributes {
            lines.push((key.clone(), value.clone()));
        }
        for (key, value) in &self.state.relations {
            lines.push((key.clone(), relation_text(value, ", ")));
        }
        if let Some(updated) = self.updated_at {
            lines.push(("updated_at".into(), updated.to_rfc3339()));
        }

        let width = lines.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let mut out = String::new();
        for (key, value) in lines {
            let _ = writeln!(out, "{key:<width$}  {value}");
        }
        out.trim_end().to_owned()
    }
}

pub fn relation_text(value: &RelationValue, sep: &str) -> String {
    match value {
        RelationValue::One(target) => target.clone(),
        RelationValue::Many(targets) => targets.iter().cloned().collect::<Vec<_>>().join(sep),
    }
}

/// Per-resource outcome row for `apply`, `refresh` and `destroy`.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Kind")]
    pub kind: KindName,
    #[tabled(rename = "DN")]
    pub dn: String,
    #[tabled(rename = "Result")]
    pub result: String,
}

// ── Batch runs ──────────────────────────────────────────────────────

/// Collects per-resource outcomes so a batch keeps going after one fails.
#[derive(Debug)]
pub struct Batch {
    rows: Vec<OutcomeRow>,
    failures: Vec<CliError>,
    color: bool,
    quiet: bool,
}

impl Batch {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            rows: Vec::new(),
            failures: Vec::new(),
            color: output::should_color(&global.color),
            quiet: global.quiet,
        }
    }

    pub fn ok(&mut self, address: &str, kind: KindName, dn: &str, result: impl fmt::Display) {
        let result = result.to_string();
        if !self.quiet {
            eprintln!("{} {address}: {result}", output::mark_ok(self.color));
        }
        self.push(address, kind, dn, result);
    }

    pub fn warn(&mut self, address: &str, kind: KindName, dn: &str, result: impl fmt::Display) {
        let result = result.to_string();
        if !self.quiet {
            eprintln!("{} {address}: {result}", output::mark_warn(self.color));
        }
        self.push(address, kind, dn, result);
    }

    pub fn fail(&mut self, address: &str, kind: KindName, dn: &str, err: CliError) {
        if !self.quiet {
            eprintln!("{} {address}: {err}", output::mark_err(self.color));
        }
        self.push(address, kind, dn, format!("failed: {err}"));
        self.failures.push(err);
    }

    fn push(&mut self, address: &str, kind: KindName, dn: &str, result: String) {
        self.rows.push(OutcomeRow {
            address: address.to_owned(),
            kind,
            dn: dn.to_owned(),
            result,
        });
    }

    /// Render the outcome table, then fail if anything failed. A lone
    /// failure is returned as-is; several are printed and summarised.
    pub fn finish(self, format: &OutputFormat) -> Result<(), CliError> {
        let out = output::render_list(format, &self.rows, OutcomeRow::clone, |r| r.address.clone());
        output::print_output(&out, self.quiet);

        let total = self.rows.len();
        let failed = self.failures.len();
        let mut failures = self.failures;
        if failed == 0 {
            return Ok(());
        }
        if total == 1 {
            if let Some(err) = failures.pop() {
                return Err(err);
            }
        }

        let code = failures.first().map_or(exit_code::GENERAL, CliError::exit_code);
        for err in failures {
            eprintln!("{:?}", miette::Report::new(err));
        }
        Err(CliError::ApplyFailed {
            failed,
            total,
            code,
        })
    }
}
