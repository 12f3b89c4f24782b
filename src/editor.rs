/// The code buffer: the text the user is working on, plus local file loading.
///
/// File contents are taken as opaque text; only the extension is checked.
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Extensions accepted by [`CodeBuffer::load_file`].
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "py", "java", "c", "cpp", "html", "css",
];

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("unsupported file type: {0} (allowed: .js .jsx .ts .tsx .py .java .c .cpp .html .css)")]
    UnsupportedExtension(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether `path` carries an allow-listed extension (case-insensitive).
#[must_use]
pub fn is_allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone)]
pub struct CodeBuffer {
    text: String,
    source: Option<PathBuf>,
}

impl CodeBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File the current text was loaded from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// True when there is nothing but whitespace to send.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace the buffer with pasted text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.source = None;
    }

    /// Replace the buffer with the contents of `path`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), EditorError> {
        if !is_allowed_file(path) {
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| path.display().to_string());
            return Err(EditorError::UnsupportedExtension(ext));
        }

        let text = std::fs::read_to_string(path).map_err(|source| EditorError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded {} ({} bytes)", path.display(), text.len());
        self.text = text;
        self.source = Some(path.to_path_buf());
        Ok(())
    }
}
