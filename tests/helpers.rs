use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;

use mdciao_examples::collaborators::{
    ContactEngine, InterfaceRequest, LabelSource, Labeler, NeighborhoodRequest, Nomenclature,
};
use mdciao_examples::error::{CollaboratorError, ExamplesError};
use mdciao_examples::helpers::{
    L394_INDEX, aligner_b2ar_vs_opsd, cgn_labeler_gnas2_human, contact_group_l394,
    interface_b2ar_gas, klifs_labeler_p31751,
};
use mdciao_examples::samples::SampleFiles;

#[derive(Debug)]
struct EngineFailure;

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "residue L394 not found")
    }
}

impl std::error::Error for EngineFailure {}

#[derive(Debug, Clone, PartialEq)]
struct MockLabeler(LabelSource);

impl Labeler<String> for MockLabeler {
    fn top2labels(&self, top: &String) -> Vec<Option<String>> {
        vec![Some(format!("{top}:1.50")), None]
    }
}

#[derive(Default)]
struct MockNomenclature {
    fail_cgn: bool,
    klifs_dir_contents: RefCell<Vec<String>>,
}

impl Nomenclature for MockNomenclature {
    type Topology = String;
    type Labeler = MockLabeler;
    type Aligner = (BTreeMap<String, Vec<Option<String>>>, Vec<String>);

    fn load_topology(&self, path: &Path) -> Result<String, CollaboratorError> {
        Ok(path.file_name().unwrap().to_string_lossy().into_owned())
    }

    fn gpcr(&self, source: &LabelSource) -> Result<MockLabeler, CollaboratorError> {
        Ok(MockLabeler(source.clone()))
    }

    fn cgn(&self, source: &LabelSource) -> Result<MockLabeler, CollaboratorError> {
        if self.fail_cgn {
            return Err("CGN table unreadable".into());
        }
        Ok(MockLabeler(source.clone()))
    }

    fn klifs(
        &self,
        uniprot: &str,
        local_dir: &Path,
        try_web_lookup: bool,
    ) -> Result<MockLabeler, CollaboratorError> {
        assert!(!try_web_lookup);
        let mut names: Vec<_> = fs::read_dir(local_dir)?
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        *self.klifs_dir_contents.borrow_mut() = names;
        Ok(MockLabeler(LabelSource::Remote(uniprot.to_string())))
    }

    fn consensus_aligner(
        &self,
        maps: BTreeMap<String, Vec<Option<String>>>,
        tops: BTreeMap<String, String>,
    ) -> Result<Self::Aligner, CollaboratorError> {
        Ok((maps, tops.into_values().collect()))
    }
}

#[derive(Default)]
struct MockEngine {
    fail: bool,
    seen_request: RefCell<Option<NeighborhoodRequest>>,
    staged_inputs_present: RefCell<bool>,
    interface_called: RefCell<bool>,
}

impl ContactEngine for MockEngine {
    type ContactGroup = String;
    type Labeler = MockLabeler;

    fn residue_neighborhoods(
        &self,
        request: &NeighborhoodRequest,
        diagnostics: &mut dyn Write,
    ) -> Result<BTreeMap<usize, String>, CollaboratorError> {
        writeln!(diagnostics, "loading {}", request.trajectory.display())?;
        let workdir = request.working_dir.clone().unwrap();
        *self.staged_inputs_present.borrow_mut() =
            workdir.join(&request.trajectory).exists() && workdir.join(&request.topology).exists();
        *self.seen_request.borrow_mut() = Some(request.clone());
        if self.fail {
            return Err(Box::new(EngineFailure));
        }
        Ok(BTreeMap::from([
            (L394_INDEX, format!("neighborhood of {}", request.residues)),
            (10, "other".to_string()),
        ]))
    }

    fn interface(
        &self,
        request: InterfaceRequest<MockLabeler>,
        _diagnostics: &mut dyn Write,
    ) -> Result<String, CollaboratorError> {
        *self.interface_called.borrow_mut() = true;
        Ok(format!(
            "{:?} vs {:?} ctc_control={} gpcr={:?}",
            request.interface_selection_1,
            request.interface_selection_2,
            request.ctc_control,
            request.gpcr_labeler.map(|labeler| labeler.0)
        ))
    }
}

fn sample_files(root: &Path) -> SampleFiles {
    let files = SampleFiles::from_root(root);
    for path in [
        &files.traj_xtc,
        &files.top_pdb,
        &files.adrb2_human_xlsx,
        &files.gnas2_human_xlsx,
        &files.klifs_p31751_xlsx,
        &files.rcsb_3e8d_pdb,
    ] {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "sample").unwrap();
    }
    files
}

#[test]
fn contact_group_is_computed_from_staged_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());
    let engine = MockEngine::default();

    let group = contact_group_l394(&engine, &files, |_| {}).unwrap();

    assert_eq!(group, "neighborhood of L394");
    assert!(*engine.staged_inputs_present.borrow());
    let request = engine.seen_request.borrow().clone().unwrap();
    assert_eq!(request.topology, PathBuf::from("gs-b2ar.noH.pdb"));
    assert_eq!(request.n_smooth_hw, 1);
    assert!(request.no_disk && request.accept_guess && !request.figures);
    assert_eq!(
        request.gpcr_uniprot,
        Some(LabelSource::File(PathBuf::from("GPCRdb_adrb2_human.xlsx")))
    );
    // staging is gone once the helper returns
    assert!(!request.working_dir.unwrap().exists());
}

#[test]
fn contact_group_request_can_be_customized() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());
    let engine = MockEngine::default();

    contact_group_l394(&engine, &files, |request| {
        request.ctc_cutoff_ang = 3.0;
        request.n_smooth_hw = 0;
    })
    .unwrap();

    let request = engine.seen_request.borrow().clone().unwrap();
    assert_eq!(request.ctc_cutoff_ang, 3.0);
    assert_eq!(request.n_smooth_hw, 0);
}

#[test]
fn engine_errors_are_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());
    let engine = MockEngine {
        fail: true,
        ..MockEngine::default()
    };

    let err = contact_group_l394(&engine, &files, |_| {}).unwrap_err();

    assert_eq!(err.to_string(), "residue L394 not found");
    assert_matches!(err, ExamplesError::Collaborator(ref inner) if inner.downcast_ref::<EngineFailure>().is_some());
}

#[test]
fn missing_staged_file_fails_before_engine_runs() {
    let dir = tempfile::tempdir().unwrap();
    let files = SampleFiles::from_root(dir.path());
    let engine = MockEngine::default();

    let err = contact_group_l394(&engine, &files, |_| {}).unwrap_err();

    assert_matches!(err, ExamplesError::Filesystem(_));
    assert!(engine.seen_request.borrow().is_none());
}

#[test]
fn interface_uses_bundled_labelers() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());

    let interface =
        interface_b2ar_gas(&MockEngine::default(), &MockNomenclature::default(), &files, |_| {})
            .unwrap();

    assert!(interface.starts_with("[0] vs [3] ctc_control=1"));
    assert!(interface.contains("GPCRdb_adrb2_human.xlsx"));
}

#[test]
fn interface_labeler_errors_are_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());
    let engine = MockEngine::default();
    let nomenclature = MockNomenclature {
        fail_cgn: true,
        ..MockNomenclature::default()
    };

    let err = interface_b2ar_gas(&engine, &nomenclature, &files, |_| {}).unwrap_err();

    assert_matches!(err, ExamplesError::Collaborator(_));
    assert_eq!(err.to_string(), "CGN table unreadable");
    assert!(!*engine.interface_called.borrow());
}

#[test]
fn cgn_labeler_reads_bundled_table() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());

    let labeler = cgn_labeler_gnas2_human(&MockNomenclature::default(), &files).unwrap();

    assert_eq!(labeler.0, LabelSource::File(files.gnas2_human_xlsx.clone()));
}

#[test]
fn klifs_labeler_sees_staged_files() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());
    let nomenclature = MockNomenclature::default();

    let labeler = klifs_labeler_p31751(&nomenclature, &files).unwrap();

    assert_eq!(labeler.0, LabelSource::Remote("P31751".to_string()));
    assert_eq!(
        *nomenclature.klifs_dir_contents.borrow(),
        vec!["3E8D.pdb.gz".to_string(), "KLIFS_P31751.xlsx".to_string()]
    );
}

#[test]
fn aligner_maps_both_structures() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample_files(dir.path());

    let (maps, tops) = aligner_b2ar_vs_opsd(&MockNomenclature::default(), &files).unwrap();

    assert_eq!(maps.keys().collect::<Vec<_>>(), vec!["B2AR", "OPS"]);
    assert_eq!(maps["B2AR"][0].as_deref(), Some("3SN6.pdb.gz:1.50"));
    assert_eq!(tops, vec!["3SN6.pdb.gz".to_string(), "3CAP.pdb.gz".to_string()]);
}
