use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::ExamplesError;
use crate::samples::SampleFiles;

pub const CONFIG_FILE: &str = "mdc-examples.json";
pub const DATA_ENV: &str = "MDCIAO_DATA";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub notebooks_dir: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_root: Utf8PathBuf,
    pub notebooks_dir: Option<Utf8PathBuf>,
    pub timeout: Duration,
}

impl ResolvedConfig {
    pub fn sample_files(&self) -> SampleFiles {
        let files = SampleFiles::from_root(self.data_root.as_std_path());
        match &self.notebooks_dir {
            Some(dir) => files.with_notebooks_dir(dir.as_std_path()),
            None => files,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `mdc-examples.json` from the working directory when it
    /// exists. An explicitly given path must be readable.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ExamplesError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| ExamplesError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| ExamplesError::ConfigParse(err.to_string()))?
        };

        Self::resolve_config(config, std::env::var(DATA_ENV).ok())
    }

    pub fn resolve_config(
        config: Config,
        env_data_root: Option<String>,
    ) -> Result<ResolvedConfig, ExamplesError> {
        let data_root = match env_data_root
            .filter(|value| !value.trim().is_empty())
            .or(config.data_root)
        {
            Some(root) => Utf8PathBuf::from(root),
            None => default_data_root()?,
        };

        Ok(ResolvedConfig {
            data_root,
            notebooks_dir: config.notebooks_dir.map(Utf8PathBuf::from),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(60)),
        })
    }
}

fn default_data_root() -> Result<Utf8PathBuf, ExamplesError> {
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().join("mdciao")).ok())
        .ok_or_else(|| ExamplesError::Filesystem("unable to resolve data directory".to_string()))
}
