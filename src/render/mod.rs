pub mod rtf;

use std::path::Path;

use thiserror::Error;

pub use rtf::RtfRenderer;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an RTF document")]
    NotRtf,
    #[error("malformed RTF: {0}")]
    Malformed(String),
}

/// Turns raw document bytes into plain text.
///
/// Field extraction only ever sees the rendered text, so a different
/// export format only needs a new implementor.
pub trait Renderer {
    fn render(&self, bytes: &[u8]) -> Result<String, RenderError>;

    fn render_file(&self, path: &Path) -> Result<String, RenderError> {
        let bytes = std::fs::read(path)?;
        self.render(&bytes)
    }
}
