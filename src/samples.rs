use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExamplesError;

/// Locations of the sample inputs shipped with mdciao.
#[derive(Debug, Clone)]
pub struct SampleFiles {
    pub root: PathBuf,
    pub traj_xtc: PathBuf,
    pub top_pdb: PathBuf,
    pub tip_json: PathBuf,
    pub adrb2_human_xlsx: PathBuf,
    pub gnas2_human_xlsx: PathBuf,
    pub klifs_p31751_xlsx: PathBuf,
    pub rcsb_3sn6_pdb: PathBuf,
    pub rcsb_3e8d_pdb: PathBuf,
    pub rcsb_3cap_pdb: PathBuf,
    pub notebooks_dir: PathBuf,
}

impl SampleFiles {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let examples = root.join("examples");
        let nomenclature = root.join("nomenclature");
        Self {
            traj_xtc: examples.join("gs-b2ar.noH.stride.5.xtc"),
            top_pdb: examples.join("gs-b2ar.noH.pdb"),
            tip_json: examples.join("tip.json"),
            rcsb_3sn6_pdb: examples.join("3SN6.pdb.gz"),
            rcsb_3e8d_pdb: examples.join("3E8D.pdb.gz"),
            rcsb_3cap_pdb: examples.join("3CAP.pdb.gz"),
            adrb2_human_xlsx: nomenclature.join("GPCRdb_adrb2_human.xlsx"),
            gnas2_human_xlsx: nomenclature.join("CGN_gnas2_human.xlsx"),
            klifs_p31751_xlsx: nomenclature.join("KLIFS_P31751.xlsx"),
            notebooks_dir: root.join("notebooks"),
            root,
        }
    }

    pub fn with_notebooks_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.notebooks_dir = dir.into();
        self
    }

    /// The bundled Jupyter notebooks, sorted by path.
    pub fn notebooks(&self) -> Result<Vec<PathBuf>, ExamplesError> {
        list_with_extension(&self.notebooks_dir, "ipynb")
    }
}

fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ExamplesError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| ExamplesError::Filesystem(format!("read {}: {err}", dir.display())))?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?
            .path();
        if path.is_file() && path.extension().map(|ext| ext == extension).unwrap_or(false) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let files = SampleFiles::from_root("/opt/mdciao");
        assert!(files.top_pdb.ends_with("examples/gs-b2ar.noH.pdb"));
        assert!(files.adrb2_human_xlsx.ends_with("nomenclature/GPCRdb_adrb2_human.xlsx"));
        assert_eq!(files.notebooks_dir, PathBuf::from("/opt/mdciao/notebooks"));
    }

    #[test]
    fn notebooks_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let files = SampleFiles::from_root(dir.path());
        fs::create_dir(&files.notebooks_dir).unwrap();
        fs::write(files.notebooks_dir.join("02.Missing.ipynb"), "{}").unwrap();
        fs::write(files.notebooks_dir.join("01.Tutorial.ipynb"), "{}").unwrap();
        fs::write(files.notebooks_dir.join("README.md"), "").unwrap();

        let found = files.notebooks().unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["01.Tutorial.ipynb", "02.Missing.ipynb"]);
    }
}
