//! CLI for guest collection provisioning.

use clap::{ArgAction, Parser};
use std::{ffi::OsString, path::PathBuf};
use tracing_subscriber::EnvFilter;

use crate::{
    config::DEFAULT_CONFIG_FILE,
    globus::{OutputFormat, DEFAULT_GLOBUS_BIN},
    run, Config,
};

#[derive(Parser, Debug)]
#[command(
    name = "collections_provision",
    version,
    about = "Create guest collections and grant their contacts read/write access"
)]
struct Args {
    /// Base local directory for collections
    #[arg(short = 'd', long, default_value = ".")]
    local_dir: PathBuf,

    /// Base share directory, as seen from the parent collection
    #[arg(short = 's', long, default_value = ".")]
    share_dir: String,

    /// GCS endpoint id to log in to
    #[arg(short = 'g', long, env = "GCS_ENDPOINT_ID")]
    endpoint_id: String,

    /// Parent (mapped) collection id
    #[arg(short = 'c', long, env = "GCS_COLLECTION_ID")]
    collection_id: String,

    /// JSON file mapping collection names to contact identities
    #[arg(short = 'f', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Only grant permissions on the parent collection
    #[arg(short = 'p', long)]
    permissions_only: bool,

    /// Path or name of the globus CLI
    #[arg(long, env = "GLOBUS_CLI", default_value = DEFAULT_GLOBUS_BIN)]
    globus_bin: OsString,

    /// Output format to request from the globus CLI
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Ask for confirmation after a successful login
    #[arg(long)]
    confirm: bool,

    /// Assume the session is already logged in
    #[arg(long)]
    skip_login: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Provision binary command line interface.
pub struct CLI;
impl CLI {
    /// Execute the command line interface.
    pub fn execute() {
        let args = Args::parse();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();

        let cfg = Config {
            local_dir: args.local_dir,
            share_dir: args.share_dir,
            endpoint_id: args.endpoint_id,
            collection_id: args.collection_id,
            config_file: args.config_file,
            permissions_only: args.permissions_only,
            globus_bin: args.globus_bin,
            format: args.format,
            json: args.json,
            confirm: args.confirm,
            skip_login: args.skip_login,
        };
        if let Err(e) = run(cfg) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
