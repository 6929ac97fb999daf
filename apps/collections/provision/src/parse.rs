//! Extract facts from `globus` CLI output.
//!
//! The text parsers read the human oriented layout and break silently if it
//! drifts, which is why everything that depends on that layout lives here.
//! Prefer the JSON parsers when the CLI is asked for `-F json`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;

/// Zero based line of the first data row in `get-identities -v` output,
/// after the header and separator lines.
pub const IDENTITY_ROW: usize = 2;

// First `ID:` anywhere, then whitespace (which may span a line break), then
// the rest of that line.
static ID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ID:\s+(.*)").expect("ID regex is valid"));

/// Collection id from the text output of `collection create guest`.
///
/// ```text
/// Message:  Collection created successfully
/// ID:       9f3f8b64-2d67-4cad-829e-d0715dab7cdd
/// ```
pub fn collection_id_from_text(output: &str) -> Result<String, ParseError> {
    let captures = ID_LINE.captures(output).ok_or(ParseError::NotFound)?;
    match captures.get(1).map(|m| m.as_str().trim()) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ParseError::Empty),
    }
}

/// Collection id from `collection create guest -F json`.
pub fn collection_id_from_json(output: &str) -> Result<String, ParseError> {
    let doc: Value = serde_json::from_str(output).map_err(|_| ParseError::NotFound)?;
    non_empty_str(doc.get("id").ok_or(ParseError::NotFound)?)
}

/// Email from the text output of `get-identities -v`.
///
/// The data row is `ID | Username | Full Name | Organization | Email`; the
/// last field, trimmed, is returned. Its shape is not checked.
pub fn email_from_table(output: &str) -> Result<String, ParseError> {
    let row = output
        .split('\n')
        .nth(IDENTITY_ROW)
        .filter(|row| !row.trim().is_empty())
        .ok_or(ParseError::NotFound)?;

    match row.rsplit('|').next().map(str::trim) {
        Some(email) if !email.is_empty() => Ok(email.to_string()),
        _ => Err(ParseError::Empty),
    }
}

/// Email of the first identity in `get-identities -F json`.
pub fn email_from_json(output: &str) -> Result<String, ParseError> {
    let doc: Value = serde_json::from_str(output).map_err(|_| ParseError::NotFound)?;
    let identity = doc
        .get("identities")
        .and_then(|ids| ids.get(0))
        .ok_or(ParseError::NotFound)?;
    non_empty_str(identity.get("email").ok_or(ParseError::NotFound)?)
}

fn non_empty_str(value: &Value) -> Result<String, ParseError> {
    match value.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ParseError::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITIES: &str = "\
ID                                   | Username            | Full Name        | Organization             | Email Address
------------------------------------ | ------------------- | ---------------- | ------------------------ | ----------------
83b35b59-0000-4c3d-9c1e-3f2d1d5a8f10 | hshoch@globusid.org | Harry Hochheiser | University of Pittsburgh | hshoch@gmail.com
";

    #[test]
    fn email_is_last_field_of_third_line() {
        assert_eq!(email_from_table(IDENTITIES).unwrap(), "hshoch@gmail.com");
    }

    #[test]
    fn only_the_third_line_is_read() {
        let two_rows = format!("{IDENTITIES}aaaa | other@globusid.org | Other | Org | other@example.org\n");
        assert_eq!(email_from_table(&two_rows).unwrap(), "hshoch@gmail.com");
    }

    #[test]
    fn short_table_is_not_found() {
        assert_eq!(email_from_table("ID | Email\n---- | ----\n"), Err(ParseError::NotFound));
        assert_eq!(email_from_table(""), Err(ParseError::NotFound));
    }

    #[test]
    fn blank_email_field_is_empty() {
        let out = "h\n-\nid | user | name | org |   \n";
        assert_eq!(email_from_table(out), Err(ParseError::Empty));
    }

    #[test]
    fn row_without_pipes_returns_whole_line() {
        assert_eq!(email_from_table("h\n-\n  someone@example.org \n").unwrap(), "someone@example.org");
    }

    #[test]
    fn collection_id_from_create_output() {
        let out = "Message:     Collection created successfully\nID:          1b0ea6b2-f1f4-11ee-8e3b-0242ac110002\n";
        assert_eq!(
            collection_id_from_text(out).unwrap(),
            "1b0ea6b2-f1f4-11ee-8e3b-0242ac110002"
        );
    }

    #[test]
    fn collection_id_missing_or_blank() {
        assert_eq!(collection_id_from_text("Message: ok\n"), Err(ParseError::NotFound));
        assert_eq!(collection_id_from_text("ID:abc\n"), Err(ParseError::NotFound));
        assert_eq!(collection_id_from_text("ID:\n"), Err(ParseError::Empty));
        assert_eq!(collection_id_from_text("ID:   \t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn collection_id_takes_first_match_and_rest_of_line() {
        assert_eq!(collection_id_from_text("GUID: abc\nID: other\n").unwrap(), "abc");
        assert_eq!(collection_id_from_text("ID: abc def  \n").unwrap(), "abc def");
        assert_eq!(collection_id_from_text("ID:\nabc\n").unwrap(), "abc");
    }

    #[test]
    fn json_outputs() {
        assert_eq!(collection_id_from_json(r#"{"id": "abc", "DATA_TYPE": "collection"}"#).unwrap(), "abc");
        assert_eq!(collection_id_from_json(r#"{"code": "Created"}"#), Err(ParseError::NotFound));
        assert_eq!(collection_id_from_json(r#"{"id": null}"#), Err(ParseError::Empty));
        assert_eq!(collection_id_from_json("ID: abc"), Err(ParseError::NotFound));

        let ids = r#"{"identities": [{"id": "83b3", "username": "hshoch@globusid.org", "email": "hshoch@gmail.com"}]}"#;
        assert_eq!(email_from_json(ids).unwrap(), "hshoch@gmail.com");
        assert_eq!(email_from_json(r#"{"identities": []}"#), Err(ParseError::NotFound));
        assert_eq!(email_from_json(r#"{"identities": [{"email": null}]}"#), Err(ParseError::Empty));
    }
}
