//! Collision-free path selection.
//!
//! [`resolve`] checks whether a desired path is free. When it is not, numbered
//! alternatives (`name_01`, `name_02.zip`, ...) are generated in the request's
//! base directory and the first free one is offered to a [`RenameDecider`],
//! which may accept it or name a replacement.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ExamplesError;

/// Highest numbered alternative tried before giving up.
pub const MAX_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone)]
pub struct PathRequest {
    pub desired_path: PathBuf,
    pub pattern: String,
    pub base_dir: PathBuf,
    pub is_file: bool,
    pub attempt_count: u32,
    pub skip_on_existing: bool,
}

impl PathRequest {
    pub fn new(
        desired_path: impl Into<PathBuf>,
        pattern: impl Into<String>,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            desired_path: desired_path.into(),
            pattern: pattern.into(),
            base_dir: base_dir.into(),
            is_file: false,
            attempt_count: 1,
            skip_on_existing: false,
        }
    }

    pub fn file(mut self) -> Self {
        self.is_file = true;
        self
    }

    pub fn skip_on_existing(mut self, skip: bool) -> Self {
        self.skip_on_existing = skip;
        self
    }

    fn candidate(&self, extension: Option<&str>) -> PathBuf {
        let mut name = format!("{}_{:02}", self.pattern, self.attempt_count);
        if self.is_file {
            if let Some(ext) = extension {
                name.push('.');
                name.push_str(ext);
            }
        }
        self.base_dir.join(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    /// A replacement path, relative to the request's base directory.
    Rename(String),
}

pub trait RenameDecider {
    fn confirm(&mut self, candidate: &Path, base_dir: &Path) -> Result<Decision, ExamplesError>;
}

/// Accepts every proposed candidate. Used in non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptDecider;

impl RenameDecider for AcceptDecider {
    fn confirm(&mut self, _candidate: &Path, _base_dir: &Path) -> Result<Decision, ExamplesError> {
        Ok(Decision::Accept)
    }
}

/// Prompts on a writer and reads one line of answer from a reader.
pub struct ConsoleDecider<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleDecider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsoleDecider<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> RenameDecider for ConsoleDecider<R, W> {
    fn confirm(&mut self, candidate: &Path, base_dir: &Path) -> Result<Decision, ExamplesError> {
        let prompt_err = |err: std::io::Error| ExamplesError::Prompt(err.to_string());
        writeln!(self.output, "{} will be created", candidate.display()).map_err(prompt_err)?;
        writeln!(
            self.output,
            "Hit Enter to accept or provide another path from {}{}:",
            base_dir.display(),
            std::path::MAIN_SEPARATOR
        )
        .map_err(prompt_err)?;
        self.output.flush().map_err(prompt_err)?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).map_err(prompt_err)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Decision::Accept);
        }
        writeln!(
            self.output,
            "OK, your suggestion is {}",
            base_dir.join(answer).display()
        )
        .map_err(prompt_err)?;
        Ok(Decision::Rename(answer.to_string()))
    }
}

/// Returns a path that does not exist yet, unless `skip_on_existing` accepts an
/// existing `desired_path` as-is.
pub fn resolve(
    mut request: PathRequest,
    decider: &mut dyn RenameDecider,
) -> Result<PathBuf, ExamplesError> {
    let mut current = request.desired_path.clone();

    loop {
        let extension = current
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        while current.exists() {
            info!("{} exists", current.display());
            if request.skip_on_existing {
                return Ok(current);
            }
            if request.attempt_count > MAX_ATTEMPTS {
                return Err(ExamplesError::PathsExhausted {
                    pattern: request.pattern.clone(),
                    max: MAX_ATTEMPTS,
                });
            }
            current = request.candidate(extension.as_deref());
            request.attempt_count += 1;
        }

        if request.attempt_count == 1 {
            return Ok(current);
        }

        match decider.confirm(&current, &request.base_dir)? {
            Decision::Accept => return Ok(current),
            Decision::Rename(answer) => {
                current = request.base_dir.join(answer);
                if !current.exists() {
                    return Ok(current);
                }
                warn!("{} already exists. Next suggestion:", current.display());
                // the operator's own name is never skipped over
                request.skip_on_existing = false;
            }
        }
    }
}
