//! Ready-made analysis objects built from the bundled sample files.
//!
//! Each helper fixes the inputs of a documented example and lets the caller
//! adjust the request through a closure before it is sent to the collaborator.

use std::collections::BTreeMap;
use std::io::{self, Write};

use tracing::debug;

use crate::collaborators::{
    ContactEngine, InterfaceRequest, LabelSource, Labeler, NeighborhoodRequest, Nomenclature,
};
use crate::error::{CollaboratorError, ExamplesError};
use crate::samples::SampleFiles;
use crate::staging::{StagingDir, basename};

/// Residue index of LEU394 in the sample topology.
pub const L394_INDEX: usize = 353;

/// Runs `call` with an in-memory diagnostics buffer. The buffer is shown on
/// stderr only when the call fails; the error itself is passed through.
fn with_buffered_diagnostics<T>(
    call: impl FnOnce(&mut dyn Write) -> Result<T, CollaboratorError>,
) -> Result<T, ExamplesError> {
    let mut buffer = Vec::new();
    match call(&mut buffer) {
        Ok(value) => Ok(value),
        Err(err) => {
            let mut stderr = io::stderr();
            let _ = stderr.write_all(&buffer);
            let _ = stderr.flush();
            Err(ExamplesError::Collaborator(err))
        }
    }
}

/// The LEU394 neighborhood of the short sample trajectory.
pub fn contact_group_l394<E: ContactEngine>(
    engine: &E,
    files: &SampleFiles,
    customize: impl FnOnce(&mut NeighborhoodRequest),
) -> Result<E::ContactGroup, ExamplesError> {
    let staged = StagingDir::link_or_copy(
        "_mdciao_example_CG",
        &[
            &files.traj_xtc,
            &files.top_pdb,
            &files.adrb2_human_xlsx,
            &files.gnas2_human_xlsx,
        ],
    )?;
    debug!("staged neighborhood inputs in {}", staged.path().display());

    let mut request = NeighborhoodRequest {
        residues: "L394".to_string(),
        trajectory: basename(&files.traj_xtc).into(),
        topology: basename(&files.top_pdb).into(),
        working_dir: Some(staged.path().to_path_buf()),
        n_smooth_hw: 1,
        ctc_cutoff_ang: 4.5,
        figures: false,
        no_disk: true,
        accept_guess: true,
        gpcr_uniprot: Some(LabelSource::File(basename(&files.adrb2_human_xlsx).into())),
        cgn_uniprot: Some(LabelSource::File(basename(&files.gnas2_human_xlsx).into())),
    };
    customize(&mut request);

    let mut neighborhoods =
        with_buffered_diagnostics(|diag| engine.residue_neighborhoods(&request, diag))?;
    neighborhoods
        .remove(&L394_INDEX)
        .ok_or(ExamplesError::MissingNeighborhood(L394_INDEX))
}

/// The interface between the receptor (fragment 0) and Galpha (fragment 3).
pub fn interface_b2ar_gas<E, N>(
    engine: &E,
    nomenclature: &N,
    files: &SampleFiles,
    customize: impl FnOnce(&mut InterfaceRequest<N::Labeler>),
) -> Result<E::ContactGroup, ExamplesError>
where
    E: ContactEngine<Labeler = N::Labeler>,
    N: Nomenclature,
{
    with_buffered_diagnostics(|diag| {
        let gpcr_source = LabelSource::File(files.adrb2_human_xlsx.clone());
        let cgn_source = LabelSource::File(files.gnas2_human_xlsx.clone());
        let gpcr_labeler = nomenclature.gpcr(&gpcr_source)?;
        let cgn_labeler = nomenclature.cgn(&cgn_source)?;
        let mut request = InterfaceRequest {
            trajectory: files.traj_xtc.clone(),
            topology: files.top_pdb.clone(),
            interface_selection_1: vec![0],
            interface_selection_2: vec![3],
            ctc_control: 1.0,
            ctc_cutoff_ang: 4.5,
            figures: false,
            no_disk: true,
            accept_guess: true,
            gpcr_labeler: Some(gpcr_labeler),
            cgn_labeler: Some(cgn_labeler),
        };
        customize(&mut request);
        engine.interface(request, diag)
    })
}

pub fn gpcr_labeler_adrb2_human<N: Nomenclature>(
    nomenclature: &N,
    files: &SampleFiles,
) -> Result<N::Labeler, ExamplesError> {
    nomenclature
        .gpcr(&LabelSource::File(files.adrb2_human_xlsx.clone()))
        .map_err(ExamplesError::Collaborator)
}

pub fn cgn_labeler_gnas2_human<N: Nomenclature>(
    nomenclature: &N,
    files: &SampleFiles,
) -> Result<N::Labeler, ExamplesError> {
    nomenclature
        .cgn(&LabelSource::File(files.gnas2_human_xlsx.clone()))
        .map_err(ExamplesError::Collaborator)
}

/// KLIFS labeler for P31751, read offline from the bundled table and 3E8D.
pub fn klifs_labeler_p31751<N: Nomenclature>(
    nomenclature: &N,
    files: &SampleFiles,
) -> Result<N::Labeler, ExamplesError> {
    let staged = StagingDir::link_or_copy(
        "_mdciao_example_KLIFS",
        &[&files.klifs_p31751_xlsx, &files.rcsb_3e8d_pdb],
    )?;
    nomenclature
        .klifs("P31751", staged.path(), false)
        .map_err(ExamplesError::Collaborator)
}

/// Consensus aligner between the B2AR in 3SN6 and bovine rhodopsin in 3CAP.
pub fn aligner_b2ar_vs_opsd<N: Nomenclature>(
    nomenclature: &N,
    files: &SampleFiles,
) -> Result<N::Aligner, ExamplesError> {
    let top_3sn6 = nomenclature
        .load_topology(&files.rcsb_3sn6_pdb)
        .map_err(ExamplesError::Collaborator)?;
    let top_3cap = nomenclature
        .load_topology(&files.rcsb_3cap_pdb)
        .map_err(ExamplesError::Collaborator)?;

    let b2ar = gpcr_labeler_adrb2_human(nomenclature, files)?;
    let ops = nomenclature
        .gpcr(&LabelSource::Remote("OPSD_BOVIN".to_string()))
        .map_err(ExamplesError::Collaborator)?;

    let maps = BTreeMap::from([
        ("B2AR".to_string(), b2ar.top2labels(&top_3sn6)),
        ("OPS".to_string(), ops.top2labels(&top_3cap)),
    ]);
    let tops = BTreeMap::from([("B2AR".to_string(), top_3sn6), ("OPS".to_string(), top_3cap)]);

    nomenclature
        .consensus_aligner(maps, tops)
        .map_err(ExamplesError::Collaborator)
}
