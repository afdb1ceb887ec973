use std::fs;
use std::io;
use std::path::Path;

use harvest_logging::harvest_info;
use thiserror::Error;

use crate::decode::{decode_thread_bytes, DecodeError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Source of decoded thread markup.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<String, LoadError>;
}

/// Reads a saved thread page from disk and decodes it to text.
#[derive(Debug, Default, Clone)]
pub struct FileLoader {
    charset_hint: Option<String>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset_hint(hint: impl Into<String>) -> Self {
        Self {
            charset_hint: Some(hint.into()),
        }
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        let bytes = fs::read(path)?;
        let decoded = decode_thread_bytes(&bytes, self.charset_hint.as_deref())?;
        harvest_info!(
            "Read {:?} ({} bytes) using encoding {}",
            path,
            bytes.len(),
            decoded.encoding_label
        );
        Ok(decoded.html)
    }
}
