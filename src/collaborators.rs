//! Seams to the analysis code that the example helpers drive.
//!
//! Contact computation and consensus nomenclature live outside this crate.
//! The helpers in [`crate::helpers`] only assemble inputs for them, so both
//! are expressed as traits here.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CollaboratorError;

/// Where a labeler reads its consensus labels from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSource {
    /// A local table, e.g. `GPCRdb_adrb2_human.xlsx`.
    File(PathBuf),
    /// An identifier looked up online, e.g. `OPSD_BOVIN`.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodRequest {
    pub residues: String,
    pub trajectory: PathBuf,
    pub topology: PathBuf,
    /// Directory against which relative input paths are resolved.
    pub working_dir: Option<PathBuf>,
    pub n_smooth_hw: usize,
    pub ctc_cutoff_ang: f64,
    pub figures: bool,
    pub no_disk: bool,
    pub accept_guess: bool,
    pub gpcr_uniprot: Option<LabelSource>,
    pub cgn_uniprot: Option<LabelSource>,
}

#[derive(Debug, Clone)]
pub struct InterfaceRequest<L> {
    pub trajectory: PathBuf,
    pub topology: PathBuf,
    pub interface_selection_1: Vec<usize>,
    pub interface_selection_2: Vec<usize>,
    pub ctc_control: f64,
    pub ctc_cutoff_ang: f64,
    pub figures: bool,
    pub no_disk: bool,
    pub accept_guess: bool,
    pub gpcr_labeler: Option<L>,
    pub cgn_labeler: Option<L>,
}

pub trait ContactEngine {
    type ContactGroup;
    type Labeler;

    /// Neighborhoods keyed by residue index. Progress and warnings go to
    /// `diagnostics`.
    fn residue_neighborhoods(
        &self,
        request: &NeighborhoodRequest,
        diagnostics: &mut dyn Write,
    ) -> Result<BTreeMap<usize, Self::ContactGroup>, CollaboratorError>;

    fn interface(
        &self,
        request: InterfaceRequest<Self::Labeler>,
        diagnostics: &mut dyn Write,
    ) -> Result<Self::ContactGroup, CollaboratorError>;
}

pub trait Labeler<T> {
    /// One consensus label (or none) per residue of `top`.
    fn top2labels(&self, top: &T) -> Vec<Option<String>>;
}

pub trait Nomenclature {
    type Topology;
    type Labeler: Labeler<Self::Topology>;
    type Aligner;

    fn load_topology(&self, path: &Path) -> Result<Self::Topology, CollaboratorError>;

    fn gpcr(&self, source: &LabelSource) -> Result<Self::Labeler, CollaboratorError>;

    fn cgn(&self, source: &LabelSource) -> Result<Self::Labeler, CollaboratorError>;

    /// KLIFS labels for `uniprot`, read from files found in `local_dir`.
    fn klifs(
        &self,
        uniprot: &str,
        local_dir: &Path,
        try_web_lookup: bool,
    ) -> Result<Self::Labeler, CollaboratorError>;

    fn consensus_aligner(
        &self,
        maps: BTreeMap<String, Vec<Option<String>>>,
        tops: BTreeMap<String, Self::Topology>,
    ) -> Result<Self::Aligner, CollaboratorError>;
}
