//! Provision shared guest collections on a GCS endpoint from a
//! `{collection-name: contact}` mapping, driving the `globus` CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod globus;
pub mod parse;
pub mod provision;
pub mod report;

use command_runner::{CommandRunner, ProcessRunner};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::{
    ffi::OsString,
    io::{stdin, IsTerminal},
    path::PathBuf,
};

use crate::{
    config::CollectionMap,
    globus::{GlobusCli, OutputFormat},
    provision::Provisioner,
    report::ItemReport,
};

/// Public configuration passed in from the CLI (or tests).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base local directory collections are created in.
    pub local_dir: PathBuf,
    /// Same base directory as seen from the parent collection.
    pub share_dir: String,
    /// GCS endpoint to log in to.
    pub endpoint_id: String,
    /// Parent (mapped) collection id.
    pub collection_id: String,
    /// Mapping file.
    pub config_file: PathBuf,
    /// Only grant permissions on the parent collection.
    pub permissions_only: bool,
    /// `globus` program to run.
    pub globus_bin: OsString,
    /// Output format requested from `globus`.
    pub format: OutputFormat,
    /// Print the report as JSON.
    pub json: bool,
    /// Ask the operator to confirm after a successful login.
    pub confirm: bool,
    /// Do not log in.
    pub skip_login: bool,
}

/// Run a batch with real child processes.
pub fn run(cfg: Config) -> Result<Vec<ItemReport>, Box<dyn std::error::Error>> {
    run_with(cfg, ProcessRunner)
}

/// Run a batch, sending every external command through `runner`.
///
/// Per entry failures end up in the returned reports; only setup problems
/// (bad ids, unreadable mapping, an operator declining the opt-in
/// confirmation) are errors. A confirmation that cannot be shown is skipped.
pub fn run_with<R: CommandRunner>(
    cfg: Config,
    runner: R,
) -> Result<Vec<ItemReport>, Box<dyn std::error::Error>> {
    if cfg.endpoint_id.trim().is_empty() {
        return Err("endpoint id must not be empty".into());
    }
    if cfg.collection_id.trim().is_empty() {
        return Err("collection id must not be empty".into());
    }
    tracing::info!("collection id is {}", cfg.collection_id);

    let map = CollectionMap::load(&cfg.config_file)?;
    let globus = GlobusCli::new(runner, cfg.globus_bin, cfg.format);

    if !cfg.skip_login {
        let login = globus.login(&cfg.endpoint_id);
        if !login.success() {
            tracing::warn!(code = login.code, "login error");
        } else if cfg.confirm {
            let prompt = format!("Logged in. Provision {} entries?", map.len());
            match confirm_yes(&prompt, true) {
                Ok(true) => {}
                Ok(false) => return Err("operator declined to continue after login".into()),
                Err(e) => tracing::warn!(error = %e, "confirmation skipped"),
            }
        }
    }

    let provisioner = Provisioner::new(globus, cfg.local_dir, cfg.share_dir, cfg.collection_id);
    let reports = if cfg.permissions_only {
        provisioner.process_permissions(&map)
    } else {
        provisioner.process_collections(&map)
    };

    let failed = reports.iter().filter(|r| !r.success()).count();
    if failed > 0 {
        tracing::warn!(failed, total = reports.len(), "some entries failed");
    }
    report::print_report(cfg.json, &reports)?;
    Ok(reports)
}

fn confirm_yes(prompt: &str, default_yes: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if !stdin().is_terminal() {
        return Err("stdin is not a terminal".into());
    }
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{prompt} [yes/no]"))
        .default(default_yes)
        .show_default(true)
        .wait_for_newline(true)
        .report(false)
        .interact()?)
}
