//! Exclusive claim on an output file for the duration of a build.

use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use std::fs::{File, OpenOptions};

use crate::error::{Error, Result};

/// Advisory lock held on `<dir>/.<file name>.lock`.
///
/// Released when dropped. The lock file itself is left in place: removing a
/// file another process still holds open would let a third process lock a
/// fresh inode at the same path.
#[derive(Debug)]
pub struct OutputLock {
    _file: File,
    path: Utf8PathBuf,
}

impl OutputLock {
    /// Try to claim `output`. Fails immediately with [`Error::OutputInUse`]
    /// if another build holds it.
    pub fn acquire(output: &Utf8Path) -> Result<Self> {
        let dir = output
            .parent()
            .ok_or_else(|| Error::InvalidInput(format!("output {} has no parent", output)))?;
        let file_name = output
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("output {} has no file name", output)))?;
        std::fs::create_dir_all(dir.as_std_path())?;

        let path = dir.join(format!(".{}.lock", file_name));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path.as_std_path())?;

        if file.try_lock_exclusive().is_err() {
            return Err(Error::OutputInUse(output.to_path_buf()));
        }

        tracing::debug!("Locked output via {}", path);
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let output = Utf8PathBuf::from_path_buf(dir.path().join("app-swarm.jar")).unwrap();

        let first = OutputLock::acquire(&output).unwrap();
        assert!(first.path().as_str().ends_with(".app-swarm.jar.lock"));

        let second = OutputLock::acquire(&output);
        assert!(matches!(second, Err(Error::OutputInUse(p)) if p == output));

        drop(first);
        assert!(OutputLock::acquire(&output).is_ok());
    }
}
