use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;

use crate::error::ExamplesError;

/// Temporary directory holding hard links (or copies) of input files, so that
/// they can be referred to by basename. Removed on drop.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    pub fn link_or_copy<P: AsRef<Path>>(suffix: &str, files: &[P]) -> Result<Self, ExamplesError> {
        let dir = Builder::new()
            .suffix(suffix)
            .tempdir()
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;

        for file in files {
            let source = file.as_ref();
            let name = source.file_name().ok_or_else(|| {
                ExamplesError::Filesystem(format!("not a file: {}", source.display()))
            })?;
            let target = dir.path().join(name);
            if let Err(err) = fs::hard_link(source, &target) {
                // e.g. "Invalid cross-device link"
                debug!("linking {} failed ({err}), copying", source.display());
                fs::copy(source, &target).map_err(|err| {
                    ExamplesError::Filesystem(format!("copy {}: {err}", source.display()))
                })?;
            }
        }

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// The file name of `path` as a string, or the whole path when it has none.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_files_by_basename_and_cleans_up() {
        let src = tempfile::tempdir().unwrap();
        let a = src.path().join("top.pdb");
        let b = src.path().join("traj.xtc");
        fs::write(&a, "ATOM").unwrap();
        fs::write(&b, "xtc").unwrap();

        let staged = StagingDir::link_or_copy("_example_test", &[&a, &b]).unwrap();
        let root = staged.path().to_path_buf();
        assert!(root.to_string_lossy().ends_with("_example_test"));
        assert_eq!(fs::read_to_string(staged.join("top.pdb")).unwrap(), "ATOM");
        assert!(staged.join("traj.xtc").exists());

        drop(staged);
        assert!(!root.exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let src = tempfile::tempdir().unwrap();
        let missing = src.path().join("nope.pdb");
        assert!(StagingDir::link_or_copy("_x", &[missing]).is_err());
    }
}
