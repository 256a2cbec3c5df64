//! Self-executing archives.
//!
//! A zip reader finds the end-of-central-directory record by scanning
//! backwards from the end of the file and derives where the archive starts
//! from it, so any bytes placed in front of the archive are ignored. Putting a
//! shell script there produces one file that is both a valid archive and a
//! program `sh` can run.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;

use crate::config::BuildConfiguration;
use crate::error::{Error, Result};
use crate::signal::BuildSignal;

/// Launcher prepended when no custom script is configured.
pub const DEFAULT_LAUNCH_SCRIPT: &str = r#"#!/bin/sh

JAVA_CMD=java
if [ -n "$JAVA_HOME" ]; then
  JAVA_CMD="$JAVA_HOME/bin/java"
fi

exec "$JAVA_CMD" $JAVA_OPTS -jar "$0" "$@"
exit 1
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapOutcome {
    pub path: Utf8PathBuf,
    /// Whether a launch script was prepended.
    pub wrapped: bool,
    /// Length of the prepended script in bytes.
    pub prefix_len: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutableWrapper {
    enabled: bool,
    script: Option<Utf8PathBuf>,
}

impl ExecutableWrapper {
    pub fn new(enabled: bool, script: Option<Utf8PathBuf>) -> Self {
        Self { enabled, script }
    }

    pub fn from_config(config: &BuildConfiguration) -> Self {
        Self::new(config.executable, config.executable_script.clone())
    }

    /// Prepend the launch script to `archive` in place.
    ///
    /// Returns the input unchanged when wrapping is disabled. On cancellation
    /// the archive is left as it was.
    pub fn wrap(&self, archive: &Utf8Path, signal: &BuildSignal) -> Result<WrapOutcome> {
        if !self.enabled {
            return Ok(WrapOutcome {
                path: archive.to_path_buf(),
                wrapped: false,
                prefix_len: 0,
            });
        }

        let script = self.launch_script()?;
        let dir = archive
            .parent()
            .ok_or_else(|| Error::InvalidInput(format!("archive {} has no parent", archive)))?;

        signal.check()?;
        let temp = NamedTempFile::new_in(dir.as_std_path())?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            writer.write_all(&script)?;
            let mut reader = BufReader::new(File::open(archive.as_std_path())?);
            io::copy(&mut reader, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        make_executable(temp.as_file())?;
        signal.check()?;
        temp.persist(archive.as_std_path()).map_err(|e| e.error)?;

        tracing::info!(
            "Prepended {} byte launch script to {}",
            script.len(),
            archive
        );
        Ok(WrapOutcome {
            path: archive.to_path_buf(),
            wrapped: true,
            prefix_len: script.len() as u64,
        })
    }

    fn launch_script(&self) -> Result<Vec<u8>> {
        match &self.script {
            Some(path) if path.as_std_path().is_file() => {
                tracing::debug!("Using launch script {}", path);
                Ok(fs::read(path.as_std_path())?)
            }
            Some(path) => {
                tracing::warn!(
                    "Launch script {} does not exist, using the default launcher",
                    path
                );
                Ok(DEFAULT_LAUNCH_SCRIPT.as_bytes().to_vec())
            }
            None => Ok(DEFAULT_LAUNCH_SCRIPT.as_bytes().to_vec()),
        }
    }
}

#[cfg(unix)]
fn make_executable(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::open_archive;
    use crate::signal::CancellationToken;
    use std::io::Read;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn fixture() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("app-swarm.jar")).unwrap();
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("META-INF/MANIFEST.MF", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"Manifest-Version: 1.0\r\n").unwrap();
        zip.start_file("com/example/App.class", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"app").unwrap();
        zip.finish().unwrap();
        (dir, path)
    }

    fn names(path: &Utf8Path) -> Vec<String> {
        let archive = open_archive(path).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn disabled_is_noop() {
        let (_dir, jar) = fixture();
        let before = fs::read(&jar).unwrap();

        let outcome = ExecutableWrapper::new(false, None)
            .wrap(&jar, &BuildSignal::none())
            .unwrap();

        assert!(!outcome.wrapped);
        assert_eq!(outcome.path, jar);
        assert_eq!(fs::read(&jar).unwrap(), before);
    }

    #[test]
    fn default_script_keeps_archive_readable() {
        let (_dir, jar) = fixture();
        let original = fs::read(&jar).unwrap();
        let mut expected = names(&jar);
        expected.sort();

        let outcome = ExecutableWrapper::new(true, None)
            .wrap(&jar, &BuildSignal::none())
            .unwrap();
        assert!(outcome.wrapped);
        assert_eq!(outcome.prefix_len, DEFAULT_LAUNCH_SCRIPT.len() as u64);

        let wrapped = fs::read(&jar).unwrap();
        assert!(wrapped.starts_with(DEFAULT_LAUNCH_SCRIPT.as_bytes()));
        assert_eq!(&wrapped[DEFAULT_LAUNCH_SCRIPT.len()..], &original[..]);

        let mut archive = open_archive(&jar).unwrap();
        assert_eq!(archive.offset(), outcome.prefix_len);
        let mut content = String::new();
        archive
            .by_name("com/example/App.class")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "app");

        let mut actual = names(&jar);
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn custom_script_and_missing_fallback() {
        let (dir, jar) = fixture();
        let script = Utf8PathBuf::from_path_buf(dir.path().join("launch.sh")).unwrap();
        fs::write(&script, "#!/bin/bash\nexec java -jar \"$0\"\n").unwrap();

        ExecutableWrapper::new(true, Some(script))
            .wrap(&jar, &BuildSignal::none())
            .unwrap();
        assert!(fs::read(&jar).unwrap().starts_with(b"#!/bin/bash\n"));

        let (_dir2, other) = fixture();
        let missing = Utf8PathBuf::from("/definitely/not/here.sh");
        let outcome = ExecutableWrapper::new(true, Some(missing))
            .wrap(&other, &BuildSignal::none())
            .unwrap();
        assert_eq!(outcome.prefix_len, DEFAULT_LAUNCH_SCRIPT.len() as u64);
    }

    #[test]
    fn cancelled_wrap_leaves_archive_untouched() {
        let (dir, jar) = fixture();
        let before = fs::read(&jar).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result =
            ExecutableWrapper::new(true, None).wrap(&jar, &BuildSignal::new(token, None));

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(fs::read(&jar).unwrap(), before);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn wrapped_file_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, jar) = fixture();
        ExecutableWrapper::new(true, None).wrap(&jar, &BuildSignal::none()).unwrap();
        let mode = fs::metadata(&jar).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
