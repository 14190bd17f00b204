use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error raised by a collaborator (contact engine, nomenclature backend).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error, Diagnostic)]
pub enum ExamplesError {
    #[error("over {max} files/folders exist with the '{pattern}' pattern, aborting")]
    #[diagnostic(help("remove or rename some of the existing '{pattern}_NN' entries"))]
    PathsExhausted { pattern: String, max: u32 },

    #[error("cannot find {input} in the known aliases or in the known urls:\n{known}")]
    UnknownDataset { input: String, known: String },

    #[error("input method {name} is not in existing methods {available}")]
    UnknownClt { name: String, available: String },

    #[error("download request failed: {0}")]
    Http(String),

    #[error("download server returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read operator answer: {0}")]
    Prompt(String),

    #[error("no neighborhood for residue index {0} in the contact engine result")]
    MissingNeighborhood(usize),

    #[error("failed to run example command `{command}`: {message}")]
    Command { command: String, message: String },

    #[error(transparent)]
    Collaborator(CollaboratorError),
}
