//! Thin client over the `globus` command line tool.

use std::ffi::OsString;

use clap::ValueEnum;
use command_runner::{CommandResult, CommandRunner};

use crate::{
    error::{CollectionError, IdentityError},
    parse,
};

/// Default name of the external CLI program.
pub const DEFAULT_GLOBUS_BIN: &str = "globus";

/// Output layout requested from the external CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable tables and `Key: value` lines.
    #[default]
    Text,
    /// `-F json`.
    Json,
}

/// Runs `globus` subcommands through a [`CommandRunner`].
#[derive(Debug)]
pub struct GlobusCli<R> {
    runner: R,
    program: OsString,
    format: OutputFormat,
}

impl<R: CommandRunner> GlobusCli<R> {
    /// Client invoking `program` through `runner`.
    pub fn new(runner: R, program: impl Into<OsString>, format: OutputFormat) -> Self {
        Self {
            runner,
            program: program.into(),
            format,
        }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `globus login --gcs <endpoint_id>`. Success is the exit code alone.
    pub fn login(&self, endpoint_id: &str) -> CommandResult {
        self.run(args(["login", "--gcs", endpoint_id]))
    }

    /// `globus collection create guest <parent_id> <share_path> <name>`,
    /// returning the new collection id.
    pub fn create_guest_collection(
        &self,
        parent_id: &str,
        share_path: &str,
        name: &str,
    ) -> Result<String, CollectionError> {
        let mut argv = args(["collection", "create", "guest", parent_id, share_path, name]);
        self.push_format(&mut argv);

        let res = self.run(argv);
        if !res.success() {
            return Err(CollectionError::CommandFailed(res.code));
        }
        let id = match self.format {
            OutputFormat::Text => parse::collection_id_from_text(&res.output),
            OutputFormat::Json => parse::collection_id_from_json(&res.output),
        }?;
        Ok(id)
    }

    /// Look up `identity` and return its registered email.
    pub fn resolve_email(&self, identity: &str) -> Result<String, IdentityError> {
        let argv = match self.format {
            OutputFormat::Text => args(["get-identities", "-v", identity]),
            OutputFormat::Json => args(["get-identities", identity, "-F", "json"]),
        };

        let res = self.run(argv);
        if !res.success() {
            return Err(IdentityError::Lookup(res));
        }
        let email = match self.format {
            OutputFormat::Text => parse::email_from_table(&res.output),
            OutputFormat::Json => parse::email_from_json(&res.output),
        }?;
        Ok(email)
    }

    /// Grant `identity` read/write on the root of `collection_id`,
    /// provisioning the identity if needed and emailing `email`.
    pub fn create_permission(&self, collection_id: &str, identity: &str, email: &str) -> CommandResult {
        let target = format!("{collection_id}:/");
        self.run(args([
            "endpoint",
            "permission",
            "create",
            "--permissions",
            "rw",
            "--provision-identity",
            identity,
            "--notify-email",
            email,
            target.as_str(),
        ]))
    }

    fn push_format(&self, argv: &mut Vec<OsString>) {
        if self.format == OutputFormat::Json {
            argv.extend(args(["-F", "json"]));
        }
    }

    fn run(&self, argv: Vec<OsString>) -> CommandResult {
        self.runner.run(&self.program, &argv)
    }
}

fn args<const N: usize>(a: [&str; N]) -> Vec<OsString> {
    a.into_iter().map(OsString::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_runner::mock::ScriptedRunner;

    const TABLE: &str = "ID | Username | Full Name | Organization | Email\n-- | -- | -- | -- | --\n83b3 | pi@globusid.org | P I | Pitt | pi@pitt.edu\n";

    fn cli(responses: Vec<CommandResult>, format: OutputFormat) -> GlobusCli<ScriptedRunner> {
        GlobusCli::new(ScriptedRunner::new(responses), DEFAULT_GLOBUS_BIN, format)
    }

    #[test]
    fn login_argv() {
        let g = cli(vec![CommandResult::ok("")], OutputFormat::Text);
        assert!(g.login("ff4297b5").success());
        let calls = g.runner().calls();
        let call = &calls[0];
        assert_eq!(call.program, "globus");
        assert_eq!(call.args, ["login", "--gcs", "ff4297b5"]);
    }

    #[test]
    fn create_guest_collection_text() {
        let g = cli(vec![CommandResult::ok("ID: new-id\n")], OutputFormat::Text);
        assert_eq!(
            g.create_guest_collection("parent", "/share/lab one", "lab one").unwrap(),
            "new-id"
        );
        assert_eq!(
            g.runner().calls()[0].args,
            ["collection", "create", "guest", "parent", "/share/lab one", "lab one"]
        );
    }

    #[test]
    fn create_guest_collection_json_adds_format_flag() {
        let g = cli(vec![CommandResult::ok(r#"{"id": "j-id"}"#)], OutputFormat::Json);
        assert_eq!(g.create_guest_collection("p", "/s/x", "x").unwrap(), "j-id");
        assert_eq!(g.runner().calls()[0].args[6..], ["-F", "json"]);
    }

    #[test]
    fn create_failure_codes() {
        let g = cli(
            vec![
                CommandResult::new(1, "ID: ignored\n"),
                CommandResult::ok("nothing useful"),
                CommandResult::ok("ID:\n"),
            ],
            OutputFormat::Text,
        );
        let codes: Vec<_> = (0..3)
            .map(|_| g.create_guest_collection("p", "/s", "n").unwrap_err().code())
            .collect();
        assert_eq!(codes, [-1, -2, -3]);
    }

    #[test]
    fn resolve_email_text_and_failure() {
        let g = cli(
            vec![CommandResult::ok(TABLE), CommandResult::new(2, "Unauthorized")],
            OutputFormat::Text,
        );
        assert_eq!(g.resolve_email("pi@globusid.org").unwrap(), "pi@pitt.edu");
        assert_eq!(g.runner().calls()[0].args, ["get-identities", "-v", "pi@globusid.org"]);

        let err = g.resolve_email("pi@globusid.org").unwrap_err();
        assert_eq!(err.into_result(), CommandResult::new(2, "Unauthorized"));
    }

    #[test]
    fn permission_argv_keeps_values_whole() {
        let g = cli(vec![CommandResult::ok("done")], OutputFormat::Text);
        let hostile = "x'; rm -rf /; '";
        let res = g.create_permission("coll", hostile, "pi@pitt.edu");
        assert_eq!(res, CommandResult::ok("done"));
        assert_eq!(
            g.runner().calls()[0].args,
            [
                "endpoint",
                "permission",
                "create",
                "--permissions",
                "rw",
                "--provision-identity",
                hostile,
                "--notify-email",
                "pi@pitt.edu",
                "coll:/",
            ]
        );
    }
}
