//! File references.
//!
//! A file reference names a file a stream may later be opened over: a
//! path, a text-vs-binary flag, and the client's rock. Path resolution
//! and prompting belong to the surrounding runtime; this record only
//! carries what the file-stream open call needs.

use std::path::PathBuf;

use fictui_core::Id;

/// Handle to a [`FileRef`].
pub type FileRefId = Id<FileRef>;

/// A named file a stream can be opened over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Path to open.
    pub path: PathBuf,
    /// Text mode (as opposed to binary). Recorded for the stream; byte
    /// translation is a platform concern outside this crate.
    pub textmode: bool,
    /// Client-supplied tag, never interpreted.
    pub rock: u32,
}

impl FileRef {
    /// Create a file reference.
    pub fn new(path: impl Into<PathBuf>, textmode: bool, rock: u32) -> Self {
        Self {
            path: path.into(),
            textmode,
            rock,
        }
    }
}
