use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use mdciao_examples::config::{Config, ConfigLoader};
use mdciao_examples::error::ExamplesError;

#[test]
fn explicit_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mdc-examples.json");
    fs::write(
        &path,
        r#"{"data_root": "/srv/mdciao", "notebooks_dir": "/srv/nbs", "timeout_secs": 12}"#,
    )
    .unwrap();

    let config: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let resolved = ConfigLoader::resolve_config(config, None).unwrap();

    assert_eq!(resolved.data_root.as_str(), "/srv/mdciao");
    assert_eq!(resolved.timeout, Duration::from_secs(12));
    assert!(
        resolved
            .sample_files()
            .traj_xtc
            .starts_with("/srv/mdciao/examples")
    );
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, ExamplesError::ConfigRead(_));
}

#[test]
fn malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ data_root: ").unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();
    assert_matches!(err, ExamplesError::ConfigParse(_));
}
