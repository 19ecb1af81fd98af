use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// One JSON document per line.
pub struct JsonlWriter<W: Write> {
    inner: W,
    lines: usize,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        JsonlWriter { inner, lines: 0 }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Create (or truncate) `path` for writing.
pub fn create(path: &Path) -> io::Result<JsonlWriter<BufWriter<File>>> {
    let file = File::create(path)?;
    Ok(JsonlWriter::new(BufWriter::new(file)))
}
