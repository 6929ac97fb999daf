//! Scripted [`CommandRunner`] for tests. Should never be used in production.

use std::{
    cell::RefCell,
    collections::VecDeque,
    ffi::{OsStr, OsString},
};

use crate::{CommandResult, CommandRunner};

/// Code returned when a [`ScriptedRunner`] runs out of queued results.
pub const UNSCRIPTED: i32 = 99;

/// A single recorded invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Program that was asked for.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
}

/// Hands out queued results in order and records every call.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<CommandResult>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    /// Runner that will answer with `responses`, first to last.
    pub fn new(responses: impl IntoIterator<Item = CommandResult>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every invocation seen so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Number of responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> CommandResult {
        self.calls.borrow_mut().push(Invocation {
            program: program.to_string_lossy().into_owned(),
            args: args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| CommandResult::new(UNSCRIPTED, "unscripted call"))
    }
}
