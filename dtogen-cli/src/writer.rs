//! Output writer for generated files.
//!
//! Writing is all-or-nothing. Every file is first staged as a temporary file
//! in the destination directory; targets are only touched once every file
//! staged cleanly. Staged files that are never persisted are removed when
//! they drop. Files about to be replaced are copied aside first, so when a
//! later persist fails, created files are removed and replaced files get
//! their previous contents back.

use std::io::Write;
use std::path::{Path, PathBuf};

use dtogen::GeneratedFile;
use tempfile::NamedTempFile;

use crate::config::OverwritePolicy;
use crate::error::{CliResult, WriteError};

/// Result of writing one file.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Path where content would have been written.
        path: PathBuf,
    },
}

/// State of a generated file compared with the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    Missing(PathBuf),
    Changed(PathBuf),
}

/// Writes a set of generated files into one directory.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    policy: OverwritePolicy,
    dry_run: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, policy: OverwritePolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
            dry_run: false,
        }
    }

    /// Report what would be written instead of writing it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every file or none of them.
    pub fn write_all(&self, files: &[GeneratedFile]) -> CliResult<Vec<WriteResult>> {
        if self.dry_run {
            return Ok(files
                .iter()
                .map(|file| WriteResult::DryRun {
                    content: file.contents.clone(),
                    path: self.dir.join(&file.file_name),
                })
                .collect());
        }

        if self.policy == OverwritePolicy::Fail {
            if let Some(existing) = files
                .iter()
                .map(|file| self.dir.join(&file.file_name))
                .find(|path| path.exists())
            {
                return Err(WriteError::FileExists { path: existing }.into());
            }
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| WriteError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            let target = self.dir.join(&file.file_name);
            staged.push((self.stage(&target, &file.contents)?, target, file.contents.len()));
        }

        let mut backups = Vec::with_capacity(staged.len());
        for (_, target, _) in &staged {
            backups.push(if target.is_file() {
                Some(self.backup(target)?)
            } else {
                None
            });
        }

        let mut results = Vec::with_capacity(staged.len());
        let mut persisted_targets = Vec::new();
        for ((temp, target, bytes), backup) in staged.into_iter().zip(backups) {
            let persisted = match self.policy {
                OverwritePolicy::Fail => temp.persist_noclobber(&target),
                OverwritePolicy::Replace => temp.persist(&target),
            };
            if let Err(e) = persisted {
                // Remaining staged files and backups are dropped with the iterator.
                roll_back(persisted_targets);
                return Err(if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                    WriteError::FileExists { path: target }
                } else {
                    WriteError::WriteFile {
                        path: target,
                        source: e.error,
                    }
                }
                .into());
            }
            tracing::info!(path = %target.display(), bytes, "wrote file");
            persisted_targets.push((target.clone(), backup));
            results.push(WriteResult::Written {
                path: target,
                bytes,
            });
        }
        Ok(results)
    }

    /// Compare generated files against the files on disk.
    pub fn diff(&self, files: &[GeneratedFile]) -> CliResult<Vec<Drift>> {
        let mut drift = Vec::new();
        for file in files {
            let path = self.dir.join(&file.file_name);
            if !path.exists() {
                drift.push(Drift::Missing(path));
                continue;
            }
            let on_disk = std::fs::read_to_string(&path)?;
            if on_disk != file.contents {
                drift.push(Drift::Changed(path));
            }
        }
        Ok(drift)
    }

    fn stage(&self, target: &Path, contents: &str) -> Result<NamedTempFile, WriteError> {
        let write_error = |source| WriteError::WriteFile {
            path: target.to_path_buf(),
            source,
        };
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        temp.write_all(contents.as_bytes()).map_err(write_error)?;
        temp.flush().map_err(write_error)?;
        Ok(temp)
    }

    /// Copy the current contents of `target` into a temporary file beside it.
    fn backup(&self, target: &Path) -> Result<NamedTempFile, WriteError> {
        let write_error = |source| WriteError::WriteFile {
            path: target.to_path_buf(),
            source,
        };
        let temp = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        std::fs::copy(target, temp.path()).map_err(write_error)?;
        Ok(temp)
    }
}

/// Best-effort rollback of the targets a failed write already persisted.
///
/// Targets with a backup get it back; the others did not exist before and
/// are removed.
fn roll_back(persisted: Vec<(PathBuf, Option<NamedTempFile>)>) {
    for (path, backup) in persisted.into_iter().rev() {
        let restored = match backup {
            Some(backup) => backup.persist(&path).map(drop).map_err(|e| e.error),
            None => std::fs::remove_file(&path),
        };
        if let Err(e) = restored {
            tracing::warn!(path = %path.display(), error = %e, "rollback failed");
        }
    }
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } => path,
            WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Check if the write was successful (not dry-run).
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Get the number of bytes written (0 for dry-run).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            WriteResult::DryRun { .. } => 0,
        }
    }
}

impl Drift {
    pub fn path(&self) -> &Path {
        match self {
            Drift::Missing(path) | Drift::Changed(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtogen::generator::FileKind;
    use tempfile::TempDir;

    fn file(name: &str, contents: &str) -> GeneratedFile {
        GeneratedFile::new(format!("{}.cs", name), name, FileKind::Class, contents.to_string())
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_files() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Fail);

        let results = writer
            .write_all(&[file("A", "class A {}"), file("B", "class B {}")])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(WriteResult::was_written));
        assert_eq!(results[0].bytes(), 10);
        assert_eq!(entries(dir.path()), ["A.cs", "B.cs"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("B.cs")).unwrap(),
            "class B {}"
        );
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/out");
        let writer = OutputWriter::new(&out, OverwritePolicy::Fail);

        writer.write_all(&[file("A", "class A {}")]).unwrap();
        assert!(out.join("A.cs").exists());
    }

    #[test]
    fn test_existing_file_fails_without_touching_anything() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("B.cs"), "old").unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Fail);

        let err = writer
            .write_all(&[file("A", "class A {}"), file("B", "class B {}")])
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::CliError::Write(WriteError::FileExists { .. })
        ));
        assert_eq!(entries(dir.path()), ["B.cs"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("B.cs")).unwrap(), "old");
    }

    #[test]
    fn test_replace_policy_overwrites() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.cs"), "old").unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Replace);

        writer.write_all(&[file("A", "new")]).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("A.cs")).unwrap(), "new");
        assert_eq!(entries(dir.path()), ["A.cs"]);
    }

    #[test]
    fn test_failed_replace_restores_replaced_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.cs"), "old A").unwrap();
        // A non-empty directory where C.cs should go makes the last persist fail.
        std::fs::create_dir(dir.path().join("C.cs")).unwrap();
        std::fs::write(dir.path().join("C.cs").join("keep"), "").unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Replace);

        let err = writer
            .write_all(&[file("A", "new A"), file("B", "new B"), file("C", "new C")])
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::CliError::Write(WriteError::WriteFile { .. })
        ));
        assert_eq!(entries(dir.path()), ["A.cs", "C.cs"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("A.cs")).unwrap(), "old A");
        assert!(dir.path().join("C.cs").is_dir());
    }

    #[test]
    fn test_successful_replace_leaves_no_backups() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.cs"), "old").unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Replace);

        writer.write_all(&[file("A", "new"), file("B", "b")]).unwrap();
        assert_eq!(entries(dir.path()), ["A.cs", "B.cs"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("A.cs")).unwrap(), "new");
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let writer = OutputWriter::new(&out, OverwritePolicy::Fail).with_dry_run(true);

        let results = writer.write_all(&[file("A", "class A {}")]).unwrap();

        assert!(writer.is_dry_run());
        assert!(!out.exists());
        match &results[0] {
            WriteResult::DryRun { content, path } => {
                assert_eq!(content, "class A {}");
                assert_eq!(path, &out.join("A.cs"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(results[0].bytes(), 0);
    }

    #[test]
    fn test_diff_reports_missing_and_changed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.cs"), "class A {}").unwrap();
        std::fs::write(dir.path().join("B.cs"), "stale").unwrap();
        let writer = OutputWriter::new(dir.path(), OverwritePolicy::Fail);

        let drift = writer
            .diff(&[file("A", "class A {}"), file("B", "class B {}"), file("C", "class C {}")])
            .unwrap();
        assert_eq!(
            drift,
            [
                Drift::Changed(dir.path().join("B.cs")),
                Drift::Missing(dir.path().join("C.cs")),
            ]
        );
    }
}
