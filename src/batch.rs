//! Directory → JSONL driver.
//!
//! Every per-file problem (unreadable, not RTF, no title) is logged and
//! counted, and the run moves on. Only a missing or unreadable source
//! directory, or a failing output file, stops the run.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract;
use crate::output::{self, JsonlWriter};
use crate::render::Renderer;

pub const EXTENSION: &str = ".rtf";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("source directory '{}' not found", .0.display())]
    SourceMissing(PathBuf),
    #[error("failed to read source directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub errors: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.processed += 1,
            Outcome::RenderFailed | Outcome::Incomplete => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Written,
    RenderFailed,
    /// Rendered, but no job title.
    Incomplete,
}

pub fn is_candidate(filename: &str) -> bool {
    filename.to_lowercase().ends_with(EXTENSION)
}

/// `.rtf` entries of `dir` as `(filename, path)`, sorted by filename.
pub fn list_candidates(dir: &Path) -> Result<Vec<(String, PathBuf)>, BatchError> {
    let read_dir_err = |source| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let raw = entry.file_name();
        let name = raw.to_string_lossy().into_owned();
        if raw.to_str().is_none() {
            debug!(name = ?raw, "non UTF-8 file name, recorded lossily");
        }
        if is_candidate(&name) {
            files.push((name, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

pub fn check_source(source_dir: &Path) -> Result<(), BatchError> {
    if source_dir.is_dir() {
        Ok(())
    } else {
        Err(BatchError::SourceMissing(source_dir.to_path_buf()))
    }
}

/// Render, extract and write every `.rtf` file in `source_dir`.
///
/// The output file is only created (and truncated) once the source
/// directory is known to exist and has been listed.
pub fn run<R: Renderer>(
    renderer: &R,
    source_dir: &Path,
    output_path: &Path,
    show_progress: bool,
) -> Result<BatchSummary, BatchError> {
    check_source(source_dir)?;

    let files = list_candidates(source_dir)?;
    info!(
        source = %source_dir.display(),
        files = files.len(),
        "found RTF files"
    );

    let write_err = |source| BatchError::Write {
        path: output_path.to_path_buf(),
        source,
    };
    let mut writer = output::create(output_path).map_err(write_err)?;

    let pb = progress_bar(files.len(), show_progress);
    let mut summary = BatchSummary::default();

    for (name, path) in &files {
        pb.set_message(name.clone());
        // Keep per-file log lines from tearing the bar.
        let outcome = pb
            .suspend(|| process_file(renderer, name, path, &mut writer))
            .map_err(write_err)?;
        summary.record(outcome);
        pb.inc(1);
    }

    pb.finish_and_clear();
    let lines = writer.lines_written();
    writer.finish().map_err(write_err)?;

    info!(
        processed = summary.processed,
        errors = summary.errors,
        lines,
        output = %output_path.display(),
        "batch complete"
    );
    Ok(summary)
}

/// The only error surfaced is a failed write; everything else is an `Outcome`.
fn process_file<R: Renderer, W: Write>(
    renderer: &R,
    name: &str,
    path: &Path,
    writer: &mut JsonlWriter<W>,
) -> io::Result<Outcome> {
    info!(file = name, "processing");

    let text = match renderer.render_file(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(file = name, error = %e, "failed to render document");
            return Ok(Outcome::RenderFailed);
        }
    };

    let record = extract::extract_job_details(Some(&text), name);
    if !record.is_keepable() {
        warn!(file = name, "skipping, missing essential details (job title)");
        return Ok(Outcome::Incomplete);
    }

    writer.write(&record)?;
    Ok(Outcome::Written)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::render::{RenderError, RtfRenderer};

    fn fixture(name: &str) -> Vec<u8> {
        fs::read(format!("tests/fixtures/{}", name)).unwrap()
    }

    fn read_rows(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Treats file contents as already-rendered text.
    struct PlainText;

    impl Renderer for PlainText {
        fn render(&self, bytes: &[u8]) -> Result<String, RenderError> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    #[test]
    fn candidate_extension_case_insensitive() {
        assert!(is_candidate("posting.rtf"));
        assert!(is_candidate("POSTING.RTF"));
        assert!(is_candidate("Posting.Rtf"));
        assert!(!is_candidate("posting.rtf.bak"));
        assert!(!is_candidate("posting.txt"));
        assert!(!is_candidate("rtf"));
    }

    #[test]
    fn mixed_directory() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");

        fs::write(src.path().join("acme.rtf"), fixture("acme_senior_engineer.rtf")).unwrap();
        fs::write(src.path().join("globex.RTF"), fixture("globex_no_marker.rtf")).unwrap();
        fs::write(src.path().join("initech.rtf"), fixture("initech_header_only.rtf")).unwrap();
        fs::write(src.path().join("broken.rtf"), b"this is not rich text").unwrap();
        fs::write(src.path().join("notes.txt"), fixture("acme_senior_engineer.rtf")).unwrap();

        let summary = run(&RtfRenderer, src.path(), &out, false).unwrap();
        assert_eq!(summary, BatchSummary { processed: 2, errors: 2 });
        assert_eq!(summary.total(), 4);

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 2);

        assert_eq!(
            rows[0],
            serde_json::json!({
                "company_name": "Acme Corp",
                "job_title": "Senior Engineer",
                "location": "Remote",
                "job_description": "Build things.\nOwn outcomes.",
                "source_file": "acme.rtf",
            })
        );
        assert_eq!(rows[1]["source_file"], "globex.RTF");
        assert_eq!(rows[1]["job_title"], "Staff Designer");
        assert_eq!(rows[1]["location"], "Berlin");
        assert_eq!(rows[1]["job_description"], "Design systems.\nMentor juniors.");

        for row in &rows {
            let keys: Vec<&String> = row.as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 5);
            assert!(!row["job_title"].as_str().unwrap().is_empty());
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_still_counted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        let name = OsStr::from_bytes(b"caf\xe9.rtf");
        // Some filesystems refuse non UTF-8 names outright.
        if fs::write(src.path().join(name), fixture("acme_senior_engineer.rtf")).is_err() {
            return;
        }

        let summary = run(&RtfRenderer, src.path(), &out, false).unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, errors: 0 });
        assert_eq!(read_rows(&out)[0]["source_file"], "caf\u{fffd}.rtf");
    }

    #[test]
    fn check_source_reports_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_source(dir.path()).is_ok());
        let missing = dir.path().join("absent");
        assert!(matches!(
            check_source(&missing),
            Err(BatchError::SourceMissing(ref p)) if p == &missing
        ));
    }

    #[test]
    fn progress_bar_visible_run() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        fs::write(src.path().join("a.rtf"), "Acme\nEngineer").unwrap();
        fs::write(src.path().join("b.rtf"), "No title").unwrap();

        let summary = run(&PlainText, src.path(), &out, true).unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, errors: 1 });
        assert_eq!(read_rows(&out).len(), 1);
    }

    #[test]
    fn missing_source_leaves_output_untouched() {
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        let missing = out_dir.path().join("nope");

        let err = run(&RtfRenderer, &missing, &out, false).unwrap_err();
        assert!(matches!(err, BatchError::SourceMissing(ref p) if p == &missing));
        assert!(err.to_string().contains("nope"));
        assert!(!out.exists());
    }

    #[test]
    fn output_is_overwritten() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        fs::write(&out, "stale line\n").unwrap();
        fs::write(src.path().join("a.rtf"), "Acme\nEngineer\n").unwrap();

        let summary = run(&PlainText, src.path(), &out, false).unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, errors: 0 });
        let body = fs::read_to_string(&out).unwrap();
        assert!(!body.contains("stale"));
        assert_eq!(read_rows(&out)[0]["company_name"], "Acme");
    }

    #[test]
    fn empty_directory_writes_empty_file() {
        let src = tempfile::tempdir().unwrap();
        let out = src.path().join("output.jsonl");
        let summary = run(&PlainText, src.path(), &out, false).unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn unreadable_entry_is_counted_not_fatal() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        fs::create_dir(src.path().join("folder.rtf")).unwrap();
        fs::write(src.path().join("ok.rtf"), "Acme\nEngineer\nRemote\nAbout the job\nShip.").unwrap();
        fs::write(src.path().join("title_less.rtf"), "Only a company").unwrap();

        let summary = run(&PlainText, src.path(), &out, false).unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, errors: 2 });
        let rows = read_rows(&out);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["job_description"], "Ship.");
    }

    #[test]
    fn files_processed_in_name_order() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("output.jsonl");
        for name in ["c.rtf", "a.rtf", "b.rtf"] {
            fs::write(src.path().join(name), "Co\nTitle").unwrap();
        }

        run(&PlainText, src.path(), &out, false).unwrap();
        let order: Vec<String> = read_rows(&out)
            .iter()
            .map(|r| r["source_file"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order, ["a.rtf", "b.rtf", "c.rtf"]);
    }
}
