//! Per entry results and how they are printed at the end of a batch.

use command_runner::CommandResult;
use serde::Serialize;

use crate::config::CollectionEntry;

/// Result of processing one mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// Collection name from the mapping.
    pub name: String,
    /// Contact from the mapping.
    pub contact: String,
    /// Exit code or sentinel.
    pub code: i32,
    /// Output of the last command run for this entry.
    pub output: String,
}

impl ItemReport {
    /// Attach `result` to the entry it belongs to.
    pub fn new(entry: &CollectionEntry, result: CommandResult) -> Self {
        Self {
            name: entry.name.clone(),
            contact: entry.contact.clone(),
            code: result.code,
            output: result.output,
        }
    }

    /// Whether the entry went through.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

/// Render the batch report as tab separated rows plus a summary, or as JSON.
pub fn render(json: bool, reports: &[ItemReport]) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&JsonOut {
            ok: true,
            data: reports,
        });
    }

    let mut out = String::new();
    for r in reports {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            r.name,
            r.contact,
            r.code,
            r.output.split_whitespace().collect::<Vec<_>>().join(" ")
        ));
    }
    let ok = reports.iter().filter(|r| r.success()).count();
    out.push_str(&format!("{ok}/{} succeeded", reports.len()));
    Ok(out)
}

/// Print the report to stdout.
pub fn print_report(json: bool, reports: &[ItemReport]) -> Result<(), serde_json::Error> {
    println!("{}", render(json, reports)?);
    Ok(())
}
