//! Mirroring of export files between directories by content hash.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::takeout::is_export_filename;

/// Outcome of mirroring one export directory into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files copied because the target copy was absent or differed.
    pub copied: usize,
    /// Files left alone because the content already matched.
    pub skipped: usize,
    /// Per-file failures, as `Error processing <file>: <message>` lines.
    pub errors: Vec<String>,
}

/// Errors fatal to a directory sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source directory could not be listed.
    #[error("failed to list source directory {path}")]
    ListSource {
        /// Directory that failed to list.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The target directory could not be created.
    #[error("failed to create target directory {path}")]
    CreateTarget {
        /// Directory that failed to create.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// Mirror the export files of `source_dir` into `target_dir`.
///
/// Only files named per an export convention are considered. A file is
/// copied when the target copy is absent or its BLAKE3 content hash
/// differs; identical content is skipped, which keeps repeated syncs cheap
/// and leaves target timestamps alone. Per-file failures are recorded in
/// the report and the scan continues.
///
/// # Errors
/// Returns [`SyncError::CreateTarget`] when the target directory cannot be
/// created and [`SyncError::ListSource`] when the source directory cannot
/// be listed.
pub fn sync_exports(source_dir: &Utf8Path, target_dir: &Utf8Path) -> Result<SyncReport, SyncError> {
    tastepin_fs::ensure_dir(target_dir).map_err(|source| SyncError::CreateTarget {
        path: target_dir.to_owned(),
        source,
    })?;
    let names =
        tastepin_fs::dir_file_names(source_dir).map_err(|source| SyncError::ListSource {
            path: source_dir.to_owned(),
            source,
        })?;

    let mut report = SyncReport::default();
    for name in names {
        if !is_export_filename(&name) {
            continue;
        }
        match sync_file(&source_dir.join(&name), &target_dir.join(&name)) {
            Ok(true) => report.copied += 1,
            Ok(false) => report.skipped += 1,
            Err(error) => {
                log::warn!("sync of {name} failed: {error}");
                report
                    .errors
                    .push(format!("Error processing {name}: {error}"));
            }
        }
    }
    Ok(report)
}

/// Copy `source` over `target` unless the content already matches.
///
/// Returns whether a copy happened.
fn sync_file(source: &Utf8Path, target: &Utf8Path) -> io::Result<bool> {
    let source_bytes = tastepin_fs::read_file_bytes(source)?;
    let matches = match tastepin_fs::read_file_bytes(target) {
        Ok(target_bytes) => blake3::hash(&target_bytes) == blake3::hash(&source_bytes),
        Err(error) if error.kind() == io::ErrorKind::NotFound => false,
        Err(error) => return Err(error),
    };
    if matches {
        return Ok(false);
    }
    tastepin_fs::copy_file(source, target)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
        (dir, path)
    }

    #[rstest]
    fn copies_new_files_and_skips_identical_ones(
        #[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf),
    ) {
        let source = root.join("exports");
        let target = root.join("mirror");
        std::fs::create_dir(&source).expect("create source dir");
        std::fs::write(source.join("Tokyo-food.csv"), "tokyo v1").expect("write Tokyo export");
        std::fs::write(source.join("Osaka-food.csv"), "osaka v1").expect("write Osaka export");
        std::fs::write(source.join("notes.txt"), "not an export").expect("write stray file");

        let first = sync_exports(&source, &target).expect("first sync should work");
        assert_eq!((first.copied, first.skipped), (2, 0));
        assert!(!target.join("notes.txt").as_std_path().exists());

        let second = sync_exports(&source, &target).expect("second sync should work");
        assert_eq!((second.copied, second.skipped), (0, 2));

        std::fs::write(source.join("Tokyo-food.csv"), "tokyo v2").expect("rewrite Tokyo export");
        let third = sync_exports(&source, &target).expect("third sync should work");
        assert_eq!((third.copied, third.skipped), (1, 1));
        assert_eq!(
            std::fs::read_to_string(target.join("Tokyo-food.csv")).expect("read mirror"),
            "tokyo v2"
        );
    }

    #[rstest]
    fn creates_missing_target_directories(#[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf)) {
        let source = root.join("exports");
        std::fs::create_dir(&source).expect("create source dir");
        std::fs::write(source.join("Tokyo-food.csv"), "tokyo").expect("write export");

        let target = root.join("nested/mirror");
        let report = sync_exports(&source, &target).expect("sync should work");
        assert_eq!(report.copied, 1);
        assert!(target.join("Tokyo-food.csv").as_std_path().is_file());
    }

    #[rstest]
    fn missing_source_directory_is_fatal(#[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf)) {
        let error = sync_exports(&root.join("absent"), &root.join("mirror"))
            .expect_err("sync should fail");
        assert!(matches!(error, SyncError::ListSource { .. }));
    }
}
