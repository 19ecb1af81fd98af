//! Description body: everything under the "About the job" heading, or the
//! lines after the header block when that heading is missing or empty.

use tracing::debug;

pub const MARKER: &str = "about the job";

/// Company, title, location.
const HEADER_LINES: usize = 3;

pub struct Input<'a> {
    /// Untrimmed rendering.
    pub text: &'a str,
    pub lines: &'a [String],
    /// Byte offset of the first marker occurrence in `text`.
    pub marker: Option<usize>,
}

type Strategy = fn(&Input) -> Option<String>;

/// Tried in order, first hit wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("after_marker", after_marker),
    ("trailing_lines", trailing_lines),
];

pub fn extract(input: &Input) -> Option<String> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(input)?;
        debug!(strategy = name, chars = found.len(), "description extracted");
        Some(found)
    })
}

pub fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// First ASCII-case-insensitive occurrence of [`MARKER`].
pub fn find_marker(text: &str) -> Option<usize> {
    text.as_bytes()
        .windows(MARKER.len())
        .position(|w| w.eq_ignore_ascii_case(MARKER.as_bytes()))
}

fn starts_with_marker(s: &str) -> bool {
    s.as_bytes()
        .get(..MARKER.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(MARKER.as_bytes()))
}

/// From the start of the marker's line to the end, minus the heading line.
fn after_marker(input: &Input) -> Option<String> {
    let at = input.marker?;
    let line_start = input.text[..at].rfind(is_line_break).map_or(0, |i| i + 1);
    let candidate = input.text[line_start..].trim();

    let body = if starts_with_marker(candidate) {
        match candidate.find(is_line_break) {
            Some(i) => candidate[i..].trim(),
            None => "",
        }
    } else {
        candidate
    };

    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

fn trailing_lines(input: &Input) -> Option<String> {
    if input.lines.len() > HEADER_LINES {
        Some(input.lines[HEADER_LINES..].join("\n"))
    } else {
        None
    }
}

// ── Tests ──
