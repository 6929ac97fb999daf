//! Utils for e2e tests. See `/tests` for e2e tests.
//! Each test gets a scratch directory holding a fake `globus` executable that
//! logs its argv and answers with canned output.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use collections_provision::{globus::OutputFormat, Config};
use tempdir::TempDir;

/// Parent collection id used by every test.
pub const PARENT_COLLECTION: &str = "9f3f8b64-2d67-4cad-829e-d0715dab7cdd";
/// Endpoint id used by every test.
pub const ENDPOINT: &str = "ff4297b5-e45b-48f9-877e-5943d1f1a090";

/// Field separator between logged arguments.
const ARG_SEP: char = '\u{1f}';

// Tests run one at a time so no other test thread forks while a fake CLI
// script is still open for writing.
static SERIAL: Mutex<()> = Mutex::new(());

/// How the fake `globus` behaves.
#[derive(Debug, Clone, Default)]
pub struct FakeGlobus {
    /// Exit code of `globus login`.
    pub login_code: i32,
    /// Collection names whose `collection create guest` exits 1.
    pub failing_collections: Vec<String>,
    /// Identities whose `get-identities` exits 1.
    pub unknown_identities: Vec<String>,
}

/// Arguments passed to the user test callback.
pub struct TestArgs {
    /// Scratch root.
    pub root: PathBuf,
    /// The fake CLI.
    pub globus_bin: PathBuf,
    /// Mapping file.
    pub config_file: PathBuf,
    /// Where the fake CLI logs invocations.
    pub log: PathBuf,
}

impl TestArgs {
    /// Local base directory collections are created in.
    pub fn local_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// A non-interactive config pointing at the fake CLI.
    pub fn config(&self) -> Config {
        Config {
            local_dir: self.local_dir(),
            share_dir: "/~/data".to_string(),
            endpoint_id: ENDPOINT.to_string(),
            collection_id: PARENT_COLLECTION.to_string(),
            config_file: self.config_file.clone(),
            permissions_only: false,
            globus_bin: self.globus_bin.clone().into_os_string(),
            format: OutputFormat::Text,
            json: false,
            confirm: false,
            skip_login: false,
        }
    }

    /// Every argv the fake CLI saw, in order.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        parse_invocations(&fs::read_to_string(&self.log).unwrap_or_default())
    }

    /// Invocations whose first argument is `subcommand`.
    pub fn invocations_of(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.invocations()
            .into_iter()
            .filter(|argv| argv.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

/// Set up the scratch directory with `mapping` and a fake CLI, run `test`,
/// then tear down.
pub fn execute<F>(fake: FakeGlobus, mapping: &str, test: F)
where
    F: FnOnce(TestArgs),
{
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let tmp_dir = TempDir::new("provision_e2e").unwrap();

    let config_file = tmp_dir.path().join("collections.json");
    fs::write(&config_file, mapping).expect("write mapping");

    let log = tmp_dir.path().join("globus.log");
    let globus_bin = tmp_dir.path().join("globus");
    write_fake_globus(&globus_bin, &log, &fake);

    let test_args = TestArgs {
        root: tmp_dir.path().to_path_buf(),
        globus_bin,
        config_file,
        log,
    };

    // Run the user test and ensure cleanup.
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test(test_args)));
    drop(tmp_dir);
    assert!(res.is_ok(), "test body panicked");
}

// Every argument is followed by one separator, so only the piece after the
// last separator is padding. Empty arguments in between are kept.
fn parse_invocations(raw: &str) -> Vec<Vec<String>> {
    raw.lines()
        .map(|line| match line.strip_suffix(ARG_SEP) {
            Some(args) => args.split(ARG_SEP).map(str::to_string).collect(),
            None => Vec::new(),
        })
        .collect()
}

fn case_pattern(names: &[String]) -> String {
    if names.is_empty() {
        "__never__".to_string()
    } else {
        names.join("|")
    }
}

fn write_fake_globus(path: &Path, log: &Path, fake: &FakeGlobus) {
    let script = format!(
        r#"#!/bin/sh
for a in "$@"; do printf '%s\037' "$a" >> '{log}'; done
printf '\n' >> '{log}'

case "$1" in
  login)
    exit {login_code}
    ;;
  collection)
    case "$6" in
      {failing}) echo "Globus CLI Error: could not create collection"; exit 1 ;;
    esac
    printf 'Message:     Collection created successfully\n'
    printf 'ID:          coll-%s\n' "$6"
    printf 'Display Name: %s\n' "$6"
    ;;
  get-identities)
    case "$3" in
      {unknown}) exit 1 ;;
    esac
    user="${{3%%@*}}"
    printf 'ID                                   | Username | Full Name | Organization | Email Address\n'
    printf '%s\n' '------------------------------------ | -------- | --------- | ------------ | -------------'
    printf '83b35b59-0000-0000-0000-000000000000 | %s | Test User | Test Org | %s@example.org\n' "$3" "$user"
    ;;
  endpoint)
    printf 'Message: Access rule created successfully.\n'
    printf 'Rule ID: rule-%s-%s\n' "$7" "${{10}}"
    ;;
  *)
    exit 64
    ;;
esac
"#,
        log = log.display(),
        login_code = fake.login_code,
        failing = case_pattern(&fake.failing_collections),
        unknown = case_pattern(&fake.unknown_identities),
    );
    fs::write(path, script).expect("write fake globus");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod fake globus");
    }
}
