use std::fmt::Write as _;

use serde::Serialize;

use crate::error::ExamplesError;

pub const DEFAULT_ALIAS: &str = "b2ar@Gs";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dataset {
    pub alias: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

pub static DATASETS: &[Dataset] = &[
    Dataset {
        alias: "b2ar@Gs",
        url: "https://proteinformatics.uni-leipzig.de//mdciao/mdciao_example.zip",
        description: "Beta 2 adrenergic receptor in complex with Gs-protein \
                      (1 traj, ca. 10 MB, 280 frames, dt = 10 ps)",
    },
    Dataset {
        alias: "EGFR",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/example_kinases.zip",
        description: "EGFR kinase with the inhibitors P31@3POZ, W321@3W32, EUX1@6LUB \
                      and 7VH1@7VRE (4 trajs, ca. 10 MB each, dt = 1 ns)",
    },
    Dataset {
        alias: "cov19",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/example_cov19.zip",
        description: "SARS-CoV-2 spike RBD bound to ACE2, precomputed contact groups \
                      plus one sample trajectory (ca. 42 MB)",
    },
    Dataset {
        alias: "test",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/mdciao_test_small.zip",
        description: "Small archive used by the test-suite",
    },
    Dataset {
        alias: "ghrelin@ghsr",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/ghrelin_receptor.zip",
        description: "Ghrelin receptor bound to ghrelin \
                      (1 traj, ca. 10 MB, 411 frames, dt = 100 ns)",
    },
    Dataset {
        alias: "mor@muor",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/muor_199.zip",
        description: "Active mu-opioid receptor bound to morphine, GPCRmd id 199 \
                      (1 traj, ca. 7 MB, 400 frames, dt = 100 ns)",
    },
    Dataset {
        alias: "y1_apo",
        url: "https://proteinformatics.uni-leipzig.de/mdciao/y1_apo.zip",
        description: "Neuropeptide Y receptor type 1 in apo form \
                      (1 traj, ca. 11 MB, 528 frames, dt = 50 ns)",
    },
];

pub fn find_alias(alias: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|dataset| dataset.alias == alias)
}

/// Maps an alias to its url; known urls are accepted verbatim.
pub fn resolve_url(alias_or_url: &str) -> Result<&'static Dataset, ExamplesError> {
    let trimmed = alias_or_url.trim();
    find_alias(trimmed)
        .or_else(|| DATASETS.iter().find(|dataset| dataset.url == trimmed))
        .ok_or_else(|| ExamplesError::UnknownDataset {
            input: alias_or_url.to_string(),
            known: known_table(),
        })
}

fn known_table() -> String {
    let mut table = String::new();
    for dataset in DATASETS {
        let _ = writeln!(table, "  {} : {}", dataset.alias, dataset.url);
    }
    table
}

/// Last path segment of a url, used as the download's file name.
pub fn url_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
