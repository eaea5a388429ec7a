//! Log sink opening with file locking

use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Open the persistent event log for writing, starting from empty.
///
/// The file is created if missing. An exclusive advisory lock is taken
/// before truncating, so a second process pointed at the same log fails
/// with [`Error::LockFailed`] instead of clobbering it. The lock is released
/// when the returned file is dropped.
pub fn open_log_sink(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.try_lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    file.set_len(0).map_err(|e| Error::io(path, e))?;
    Ok(file)
}
