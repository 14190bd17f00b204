use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::Builder;
use tracing::info;

use crate::archive::unzip_to_dir;
use crate::datasets::{self, url_file_name};
use crate::download::{DatasetClient, ProgressSink};
use crate::error::ExamplesError;
use crate::resolver::{PathRequest, RenameDecider, resolve};
use crate::samples::SampleFiles;
use crate::staging::basename;

pub const DEFAULT_NOTEBOOKS_FOLDER: &str = "mdciao_notebooks";

/// What to do with a downloaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unzip {
    /// Keep the zip file only.
    No,
    /// Extract next to the zip, into a folder named after it.
    Yes,
    /// Save the download as `<name>.zip` and extract into `<name>/`.
    Into(String),
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub unzip: Unzip,
    /// Reuse existing files instead of asking for new names.
    pub skip_on_existing: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            unzip: Unzip::Yes,
            skip_on_existing: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub alias: String,
    pub url: String,
    pub archive_path: String,
    pub downloaded: bool,
    pub extracted_dir: Option<String>,
    pub extracted: Vec<String>,
    pub skipped: Vec<String>,
    pub fetched_at: String,
}

impl FetchResult {
    /// The extraction folder, or the archive when nothing was extracted.
    pub fn output_path(&self) -> &str {
        self.extracted_dir.as_deref().unwrap_or(&self.archive_path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotebooksResult {
    pub destination: String,
    pub copied: Vec<String>,
}

pub struct App<C: DatasetClient> {
    files: SampleFiles,
    base_dir: PathBuf,
    client: C,
}

impl<C: DatasetClient> App<C> {
    /// `base_dir` is where downloads and notebook copies land.
    pub fn new(files: SampleFiles, base_dir: impl Into<PathBuf>, client: C) -> Self {
        Self {
            files,
            base_dir: base_dir.into(),
            client,
        }
    }

    pub fn files(&self) -> &SampleFiles {
        &self.files
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Downloads an example dataset and, unless told otherwise, unzips it.
    ///
    /// Existing files are never overwritten: a fresh name is negotiated
    /// through `decider`, or, with `skip_on_existing`, the existing archive is
    /// reused and already-extracted files are left alone.
    pub fn fetch_example_data(
        &self,
        alias_or_url: &str,
        options: &FetchOptions,
        decider: &mut dyn RenameDecider,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, ExamplesError> {
        let dataset = datasets::resolve_url(alias_or_url)?;
        let rename_to = match &options.unzip {
            Unzip::Into(name) => Some(
                Path::new(name)
                    .with_extension("zip")
                    .to_string_lossy()
                    .into_owned(),
            ),
            Unzip::No | Unzip::Yes => None,
        };

        let (archive, downloaded) = self.download_safely(
            dataset.url,
            rename_to.as_deref(),
            options.skip_on_existing,
            decider,
            sink,
        )?;

        let mut result = FetchResult {
            alias: dataset.alias.to_string(),
            url: dataset.url.to_string(),
            archive_path: archive.display().to_string(),
            downloaded,
            extracted_dir: None,
            extracted: Vec::new(),
            skipped: Vec::new(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        if options.unzip != Unzip::No {
            let report = unzip_to_dir(&archive)?;
            result.extracted_dir = Some(report.directory.display().to_string());
            result.extracted = report.extracted;
            result.skipped = report.skipped;
        }
        Ok(result)
    }

    /// Returns the local archive path and whether it was downloaded now.
    fn download_safely(
        &self,
        url: &str,
        rename_to: Option<&str>,
        skip_on_existing: bool,
        decider: &mut dyn RenameDecider,
        sink: &dyn ProgressSink,
    ) -> Result<(PathBuf, bool), ExamplesError> {
        let original_name = url_file_name(url);
        let target = rename_to.unwrap_or(original_name);
        let pattern = Path::new(target)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.to_string());

        let destination = resolve(
            PathRequest::new(self.base_dir.join(target), pattern, &self.base_dir)
                .file()
                .skip_on_existing(skip_on_existing),
            decider,
        )?;
        if skip_on_existing && destination.exists() {
            info!("reusing {}", destination.display());
            return Ok((destination, false));
        }

        let temp_dir = Builder::new()
            .suffix("_mdciao_download")
            .tempdir()
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
        let local_name = basename(&destination);
        let temp_file = temp_dir.path().join(&local_name);
        let label = format!("Downloading {original_name} to {local_name}");
        let bytes = self.client.download(url, &temp_file, &label, sink)?;
        fs::copy(&temp_file, &destination).map_err(|err| {
            ExamplesError::Filesystem(format!("copy to {}: {err}", destination.display()))
        })?;
        info!("downloaded {bytes} bytes to {}", destination.display());
        Ok((destination, true))
    }

    /// Copies the bundled notebooks into a new folder under the base directory.
    /// An existing folder is never reused.
    pub fn notebooks(
        &self,
        folder: &str,
        decider: &mut dyn RenameDecider,
    ) -> Result<NotebooksResult, ExamplesError> {
        let notebooks = self.files.notebooks()?;
        let destination = resolve(
            PathRequest::new(self.base_dir.join(folder), folder, &self.base_dir),
            decider,
        )?;
        fs::create_dir(&destination).map_err(|err| {
            ExamplesError::Filesystem(format!("create {}: {err}", destination.display()))
        })?;

        let mut copied = Vec::new();
        for notebook in &notebooks {
            let target = destination.join(basename(notebook));
            fs::copy(notebook, &target)
                .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
            copied.push(target.display().to_string());
        }
        info!("copied {} notebook(s) to {}", copied.len(), destination.display());

        Ok(NotebooksResult {
            destination: destination.display().to_string(),
            copied,
        })
    }
}
