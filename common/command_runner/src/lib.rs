//! Primitives for running external command line tools and capturing their output.

use std::{
    ffi::{OsStr, OsString},
    process::{Command, ExitStatus, Stdio},
};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Exit code reported when the program could not be spawned at all.
pub const SPAWN_FAILED: i32 = 127;

/// Base added to a signal number when the child was killed by a signal.
pub const SIGNAL_BASE: i32 = 128;

/// Exit code plus decoded standard output of a finished command.
///
/// A `code` of `0` means success. Callers layer their own negative sentinels on
/// top of whatever the external program returned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code of the command, or a caller defined sentinel.
    pub code: i32,
    /// Standard output, decoded lossily as UTF-8.
    pub output: String,
}

impl CommandResult {
    /// Create a new result.
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    /// Successful result carrying `output`.
    pub fn ok(output: impl Into<String>) -> Self {
        Self::new(0, output)
    }

    /// Whether the command exited with code `0`.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Something that can run a program with an argument vector.
///
/// Implementations never fail: every problem is folded into the returned
/// [`CommandResult`] so batch callers can keep going.
pub trait CommandRunner {
    /// Run `program` with `args` and wait for it to finish.
    fn run(&self, program: &OsStr, args: &[OsString]) -> CommandResult;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &OsStr, args: &[OsString]) -> CommandResult {
        (**self).run(program, args)
    }
}

/// Runs commands as child processes of the current process.
///
/// Arguments are handed to the OS as a vector and never pass through a shell,
/// so caller supplied values cannot change the shape of the command.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> CommandResult {
        let line = display_command(program, args);
        tracing::info!(command = %line, "trying command");

        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(command = %line, error = %e, "spawn failed");
                return CommandResult::new(SPAWN_FAILED, e.to_string());
            }
        };

        let result = CommandResult::new(
            exit_code(output.status),
            String::from_utf8_lossy(&output.stdout),
        );
        tracing::info!(code = result.code, "result");
        tracing::debug!(output = %result.output, "command output");
        result
    }
}

/// Render a command for logs. Arguments containing whitespace or quotes are
/// shown in debug quotes.
pub fn display_command(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| {
            let a = a.to_string_lossy();
            if a.is_empty() || a.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                format!("{a:?}")
            } else {
                a.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_BASE + signal;
        }
    }
    SIGNAL_BASE
}
