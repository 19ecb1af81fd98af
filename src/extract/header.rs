//! Positional header fields: company, title, location.
//!
//! Exports put these on the first three non-empty lines. Anything smarter
//! (layout detection) belongs here and nowhere else.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
}

pub fn from_lines(lines: &[String]) -> Header {
    Header {
        company_name: lines.first().cloned(),
        job_title: lines.get(1).map(|l| normalize_whitespace(l)),
        location: lines.get(2).cloned(),
    }
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}
