//! Re-embedding the built archive into a web archive's library directory.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::archive::open_archive;
use crate::error::{Error, Result};
use crate::signal::BuildSignal;

/// Library directory of a web archive.
pub const WEB_LIB_DIR: &str = "WEB-INF/lib/";

/// Packaging type whose archive gets repackaged.
pub const WEB_PACKAGING: &str = "war";

#[derive(Debug, Default, Clone, Copy)]
pub struct RepackageStep;

impl RepackageStep {
    pub fn new() -> Self {
        Self
    }

    pub fn applies_to(packaging: &str) -> bool {
        packaging.eq_ignore_ascii_case(WEB_PACKAGING)
    }

    /// Put `archive` into `WEB-INF/lib/` of `package`, replacing any previous
    /// copy with the same file name, and rewrite `package` in place.
    ///
    /// Existing entries are copied without recompression. Failures are
    /// reported as [`Error::Repackage`]; cancellation stays [`Error::Cancelled`].
    /// Either way `package` is left untouched.
    pub fn repackage(
        &self,
        package: &Utf8Path,
        archive: &Utf8Path,
        signal: &BuildSignal,
    ) -> Result<Utf8PathBuf> {
        match self.rewrite(package, archive, signal) {
            Ok(()) => Ok(package.to_path_buf()),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => Err(Error::repackage(package, e)),
        }
    }

    fn rewrite(&self, package: &Utf8Path, archive: &Utf8Path, signal: &BuildSignal) -> Result<()> {
        let file_name = archive
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("archive {} has no file name", archive)))?;
        let target = format!("{}{}", WEB_LIB_DIR, file_name);
        let dir = package
            .parent()
            .ok_or_else(|| Error::InvalidInput(format!("package {} has no parent", package)))?;

        let mut source = open_archive(package)?;
        let temp = NamedTempFile::new_in(dir.as_std_path())?;
        {
            let mut zip = ZipWriter::new(BufWriter::new(temp.as_file()));

            for i in 0..source.len() {
                signal.check()?;
                let entry = source.by_index_raw(i)?;
                if entry.name() == target {
                    tracing::debug!("Replacing previous {} in {}", target, package);
                    continue;
                }
                zip.raw_copy_file(entry)?;
            }

            signal.check()?;
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .last_modified_time(DateTime::default())
                .unix_permissions(0o644)
                .large_file(archive.as_std_path().metadata()?.len() >= u32::MAX as u64);
            zip.start_file(target.as_str(), options)?;
            let mut reader = BufReader::new(File::open(archive.as_std_path())?);
            io::copy(&mut reader, &mut zip)?;

            let mut writer = zip.finish()?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        if let Ok(metadata) = package.as_std_path().metadata() {
            temp.as_file().set_permissions(metadata.permissions())?;
        }
        temp.persist(package.as_std_path()).map_err(|e| e.error)?;

        tracing::info!("Repackaged {} with {}", package, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::CancellationToken;
    use std::fs;
    use std::io::Read;

    fn write_zip(path: &Utf8Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn setup() -> (tempfile::TempDir, Utf8PathBuf, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let war = root.join("app-1.0.war");
        write_zip(
            &war,
            &[
                ("WEB-INF/web.xml", &b"<web-app/>"[..]),
                ("WEB-INF/lib/app-1.0-swarm.jar", &b"stale"[..]),
                ("index.html", &b"<html/>"[..]),
            ],
        );
        let fat = root.join("app-1.0-swarm.jar");
        write_zip(&fat, &[("App.class", &b"app"[..])]);
        (dir, war, fat)
    }

    #[test]
    fn replaces_previous_copy() {
        let (_dir, war, fat) = setup();

        let result = RepackageStep::new()
            .repackage(&war, &fat, &BuildSignal::none())
            .unwrap();
        assert_eq!(result, war);

        let mut archive = open_archive(&war).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"index.html".to_string()));

        let mut embedded = Vec::new();
        archive
            .by_name("WEB-INF/lib/app-1.0-swarm.jar")
            .unwrap()
            .read_to_end(&mut embedded)
            .unwrap();
        assert_eq!(embedded, fs::read(&fat).unwrap());
    }

    #[test]
    fn invalid_package_is_repackage_error() {
        let (_dir, war, fat) = setup();
        fs::write(&war, b"not a zip").unwrap();

        let result = RepackageStep::new().repackage(&war, &fat, &BuildSignal::none());
        assert!(matches!(result, Err(Error::Repackage { path, .. }) if path == war));
        assert_eq!(fs::read(&war).unwrap(), b"not a zip");
    }

    #[test]
    fn cancellation_leaves_package_untouched() {
        let (_dir, war, fat) = setup();
        let before = fs::read(&war).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = RepackageStep::new().repackage(&war, &fat, &BuildSignal::new(token, None));
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(fs::read(&war).unwrap(), before);
    }

    #[test]
    fn applies_only_to_war() {
        assert!(RepackageStep::applies_to("war"));
        assert!(!RepackageStep::applies_to("jar"));
    }
}
