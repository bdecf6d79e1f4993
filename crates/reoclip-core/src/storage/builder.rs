//! Builder for creating and preallocating clip temp files.

use std::fs::File;
use std::path::{Path, PathBuf};

use super::writer::ClipFile;
use crate::error::FetchError;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Builder for a new temp clip file. Call `preallocate` (optional) then
/// `build` to get a `ClipFile` to stream the download into.
pub struct ClipFileBuilder {
    file: File,
    temp_path: PathBuf,
}

impl ClipFileBuilder {
    /// Create a new temp file at `temp_path` (e.g. `destination.part`).
    /// Overwrites a stale temp file from an earlier interrupted run.
    pub fn create(temp_path: &Path) -> Result<Self, FetchError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| FetchError::file_system(temp_path, e))?;
        Ok(ClipFileBuilder {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Reserve `size` bytes. On Unix tries `posix_fallocate` for real block
    /// allocation; falls back to `set_len` on failure or non-Unix.
    pub fn preallocate(&mut self, size: u64) -> Result<(), FetchError> {
        if size == 0 {
            return Ok(());
        }
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file
            .set_len(size)
            .map_err(|e| FetchError::file_system(&self.temp_path, e))
    }

    pub fn build(self) -> ClipFile {
        ClipFile::new(self.file, self.temp_path)
    }
}
