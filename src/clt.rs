//! Example invocations of the `mdc_*` command-line tools.
//!
//! [`ExampleClts`] knows one ready-to-run call per tool, built on the bundled
//! sample files. Calls can be rendered for the user ([`ExampleClts::show`]) or
//! executed directly ([`ExampleClts::run`]).

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::ExamplesError;
use crate::samples::SampleFiles;
use crate::staging::basename;

/// Separates consecutive commands inside one example.
const COMMAND_BREAK: &str = "\n\n";

static CLT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(mdc_[A-Za-z_]+)(?:\.py)?$").expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Clt {
    CgnOverview,
    GpcrOverview,
    KlifsOverview,
    Compare,
    Fragments,
    Interface,
    Neighborhoods,
    Notebooks,
    Pdb,
    Residues,
    Sites,
}

impl Clt {
    /// All tools, sorted by name.
    pub const ALL: [Clt; 11] = [
        Clt::CgnOverview,
        Clt::GpcrOverview,
        Clt::KlifsOverview,
        Clt::Compare,
        Clt::Fragments,
        Clt::Interface,
        Clt::Neighborhoods,
        Clt::Notebooks,
        Clt::Pdb,
        Clt::Residues,
        Clt::Sites,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Clt::CgnOverview => "mdc_CGN_overview",
            Clt::GpcrOverview => "mdc_GPCR_overview",
            Clt::KlifsOverview => "mdc_KLIFS_overview",
            Clt::Compare => "mdc_compare",
            Clt::Fragments => "mdc_fragments",
            Clt::Interface => "mdc_interface",
            Clt::Neighborhoods => "mdc_neighborhoods",
            Clt::Notebooks => "mdc_notebooks",
            Clt::Pdb => "mdc_pdb",
            Clt::Residues => "mdc_residues",
            Clt::Sites => "mdc_sites",
        }
    }

    /// Whether the tool never prompts, so `-ni` is pointless.
    fn is_non_interactive(self) -> bool {
        matches!(
            self,
            Clt::CgnOverview
                | Clt::GpcrOverview
                | Clt::KlifsOverview
                | Clt::Fragments
                | Clt::Pdb
                | Clt::Compare
                | Clt::Notebooks
        )
    }
}

impl fmt::Display for Clt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Clt {
    type Err = ExamplesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let unknown = || ExamplesError::UnknownClt {
            name: trimmed.to_string(),
            available: Clt::ALL
                .iter()
                .map(|clt| clt.name())
                .collect::<Vec<_>>()
                .join(", "),
        };
        let name = CLT_NAME
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .ok_or_else(unknown)?
            .as_str();
        Clt::ALL
            .into_iter()
            .find(|clt| clt.name() == name)
            .ok_or_else(unknown)
    }
}

#[derive(Debug, Clone)]
pub struct ExampleClts {
    xtc: String,
    pdb: String,
    gpcr_labels: String,
    cgn_labels: String,
    site_file: String,
    klifs_labels: String,
    klifs_pdb: String,
    test: bool,
    short: bool,
}

impl ExampleClts {
    /// With `test`, input files are referred to by basename (the caller runs
    /// from a staging directory) and `-ni` is appended where the tool would
    /// otherwise prompt. Otherwise paths under `cwd` are made relative to it;
    /// paths outside `cwd` stay absolute rather than becoming `../` paths.
    pub fn new(files: &SampleFiles, cwd: &Path, test: bool, short: bool) -> Self {
        let shown = |path: &PathBuf| {
            if test {
                basename(path)
            } else {
                relative_to(path, cwd)
            }
        };
        Self {
            xtc: shown(&files.traj_xtc),
            pdb: shown(&files.top_pdb),
            gpcr_labels: shown(&files.adrb2_human_xlsx),
            cgn_labels: shown(&files.gnas2_human_xlsx),
            site_file: shown(&files.tip_json),
            klifs_labels: files.klifs_p31751_xlsx.display().to_string(),
            klifs_pdb: files.rcsb_3e8d_pdb.display().to_string(),
            test,
            short,
        }
    }

    pub fn clts(&self) -> &'static [Clt] {
        &Clt::ALL
    }

    fn opt(&self, long: &'static str) -> &'static str {
        if !self.short {
            return long;
        }
        match long {
            "--residues" => "-r",
            "--n_smooth_hw" => "-ns",
            "--table_ext" => "-tx",
            "--GPCR_UniProt" => "--GPCR",
            "--CGN_UniProt" => "--CGN",
            other => other,
        }
    }

    fn neighborhood_segments(&self) -> Vec<String> {
        vec![
            "mdc_neighborhoods.py".to_string(),
            format!("{} {}", self.pdb, self.xtc),
            format!("{} L394", self.opt("--residues")),
            format!("{} 1", self.opt("--n_smooth_hw")),
            format!("{} xlsx", self.opt("--table_ext")),
        ]
    }

    /// The pieces of the example call, before joining.
    pub fn segments(&self, clt: Clt) -> Vec<String> {
        match clt {
            Clt::Neighborhoods => {
                let mut segments = self.neighborhood_segments();
                segments.push(format!("{} {}", self.opt("--GPCR_UniProt"), self.gpcr_labels));
                segments.push(format!("{} {}", self.opt("--CGN_UniProt"), self.cgn_labels));
                segments
            }
            Clt::Sites => vec![
                "mdc_sites.py".to_string(),
                format!("{} {}", self.pdb, self.xtc),
                format!("--site_files {}", self.site_file),
                format!("--GPCR_UniProt {}", self.gpcr_labels),
                format!("--CGN_UniProt {}", self.cgn_labels),
            ],
            Clt::Interface => vec![
                "mdc_interface.py".to_string(),
                format!("{} {}", self.pdb, self.xtc),
                "--interface_selection_1 0-2".to_string(),
                "--interface_selection_2 3".to_string(),
                "--ctc_control 20".to_string(),
                format!("--GPCR_UniProt {}", self.gpcr_labels),
                format!("--CGN_UniProt {}", self.cgn_labels),
            ],
            Clt::GpcrOverview => vec![
                "mdc_GPCR_overview.py".to_string(),
                self.gpcr_labels.clone(),
                format!("-t {}", self.pdb),
            ],
            Clt::KlifsOverview => vec![
                "mdc_KLIFS_overview.py".to_string(),
                self.klifs_labels.clone(),
                format!("-t {}", self.klifs_pdb),
            ],
            // the only example that needs network access
            Clt::CgnOverview => vec![
                "mdc_CGN_overview.py".to_string(),
                "gnas2_human".to_string(),
                format!("-t {}", self.pdb),
            ],
            Clt::Compare => {
                let mut segments = self.neighborhood_segments();
                segments.push("--ctc_cutoff_Ang 3".to_string());
                segments.push(COMMAND_BREAK.to_string());
                segments.extend(self.neighborhood_segments());
                segments.push("--ctc_cutoff_Ang 4".to_string());
                segments.push(COMMAND_BREAK.to_string());
                segments.extend([
                    "mdc_compare.py".to_string(),
                    "neighborhood.LEU394@frag0@3.0_Ang.xlsx".to_string(),
                    "neighborhood.LEU394@frag0@4.0_Ang.xlsx".to_string(),
                ]);
                segments
            }
            Clt::Fragments => vec!["mdc_fragments.py".to_string(), self.pdb.clone()],
            Clt::Pdb => vec!["mdc_pdb.py 3SN6".to_string()],
            Clt::Residues => vec![
                "mdc_residues.py".to_string(),
                format!("P0G,380-394,3.5* {}", self.pdb),
                format!("--GPCR_UniProt {}", self.gpcr_labels),
                "-ni".to_string(),
            ],
            Clt::Notebooks => vec!["mdc_notebooks.py".to_string()],
        }
    }

    pub fn command_line(&self, clt: Clt) -> String {
        let mut segments = self.segments(clt);
        if self.test && !clt.is_non_interactive() && !segments.iter().any(|s| s == "-ni") {
            segments.push("-ni".to_string());
        }
        segments.join(" ")
    }

    /// Human-readable rendering of the example call, ending with the one-liner.
    pub fn show(&self, clt: Clt) -> String {
        let oneline = self.command_line(clt);
        let name = clt.name();
        let mut text = String::new();
        let _ = writeln!(text, "{name} example call:");
        let _ = writeln!(text, "{}--------------", "-".repeat(name.len()));
        let _ = writeln!(text, "{}", oneline.replace(" -", " \n-"));
        let _ = writeln!(
            text,
            "\n\nYou can re-run 'mdc-examples run {name}' to execute the command directly\n\
             or you can paste the line below into your terminal, add/edit options and then execute:\n"
        );
        let _ = writeln!(text, "{oneline}");
        text
    }

    /// The separate commands of the example, in execution order.
    pub fn commands(&self, clt: Clt) -> Vec<String> {
        self.command_line(clt)
            .split(COMMAND_BREAK)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Executes every command of the example in `workdir`. Output is captured
    /// in test mode and inherited otherwise.
    pub fn run(&self, clt: Clt, workdir: &Path) -> Result<Vec<Output>, ExamplesError> {
        self.commands(clt)
            .iter()
            .map(|line| run_line(line, workdir, self.test))
            .collect()
    }
}

fn run_line(line: &str, workdir: &Path, capture: bool) -> Result<Output, ExamplesError> {
    let mut parts = line.split_whitespace();
    let program = parts.next().ok_or_else(|| ExamplesError::Command {
        command: line.to_string(),
        message: "empty command".to_string(),
    })?;
    debug!("running {line:?} in {}", workdir.display());
    let mut command = Command::new(program);
    command.args(parts).current_dir(workdir);
    let failed = |err: std::io::Error| ExamplesError::Command {
        command: line.to_string(),
        message: err.to_string(),
    };
    if capture {
        command.stdin(Stdio::null()).output().map_err(failed)
    } else {
        let status = command.status().map_err(failed)?;
        Ok(Output {
            status,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

fn relative_to(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
