pub mod description;
pub mod header;

use serde::Serialize;
use tracing::warn;

/// One output row of the dataset. Absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub job_description: Option<String>,
    pub source_file: String,
}

impl JobRecord {
    fn empty(source_file: &str) -> Self {
        JobRecord {
            company_name: None,
            job_title: None,
            location: None,
            job_description: None,
            source_file: source_file.to_string(),
        }
    }

    /// Only records with a usable title are written out.
    pub fn is_keepable(&self) -> bool {
        self.job_title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Split on `\n`, `\r\n` or bare `\r`, trim, drop blank lines.
pub fn non_empty_lines(text: &str) -> Vec<String> {
    text.split(description::is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort extraction. Never fails: anything missing is left as `None`.
pub fn extract_job_details(plain_text: Option<&str>, filename: &str) -> JobRecord {
    let text = match plain_text {
        Some(t) if !t.is_empty() => t,
        _ => return JobRecord::empty(filename),
    };

    let lines = non_empty_lines(text);
    let header = header::from_lines(&lines);

    let marker = description::find_marker(text);
    if marker.is_none() {
        warn!(
            file = filename,
            "'About the job' marker not found, description may be incomplete or missing"
        );
    }
    let job_description = description::extract(&description::Input {
        text,
        lines: &lines,
        marker,
    });

    JobRecord {
        company_name: header.company_name,
        job_title: header.job_title,
        location: header.location,
        job_description,
        source_file: filename.to_string(),
    }
}

// ── Tests ──
