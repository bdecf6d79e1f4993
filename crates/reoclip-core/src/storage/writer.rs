//! Sequential writer for one clip's temp file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::FetchError;

/// Temp file a download streams into. Counts bytes written so the caller
/// can compare against the camera's size hint.
pub struct ClipFile {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl ClipFile {
    pub(super) fn new(file: File, temp_path: PathBuf) -> Self {
        Self {
            file,
            temp_path,
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Cut off any preallocated tail, sync, and rename onto `final_path`.
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> Result<(), FetchError> {
        let temp_path = self.temp_path.clone();
        let res = self
            .file
            .set_len(self.written)
            .and_then(|()| self.file.sync_all())
            .map_err(|e| FetchError::file_system(&temp_path, e));
        drop(self.file);
        if let Err(e) = res {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&temp_path, final_path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(FetchError::file_system(final_path, e));
        }
        Ok(())
    }

    /// Close and delete the temp file. Errors are logged, not returned.
    pub fn discard(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
            }
        }
    }
}

impl Write for ClipFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
