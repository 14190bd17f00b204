use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchResult, NotebooksResult};
use crate::clt::Clt;
use crate::datasets::Dataset;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Serialize)]
pub struct CltListing {
    pub clts: Vec<String>,
}

impl CltListing {
    pub fn from_clts(clts: &[Clt]) -> Self {
        Self {
            clts: clts.iter().map(|clt| clt.name().to_string()).collect(),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_notebooks(result: &NotebooksResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_datasets(datasets: &[Dataset]) -> io::Result<()> {
        Self::print_json(&datasets)
    }

    pub fn print_clts(listing: &CltListing) -> io::Result<()> {
        Self::print_json(listing)
    }

    fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
