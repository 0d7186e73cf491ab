use assert_matches::assert_matches;

use avrc_data::config::{Config, ConfigLoader, DEFAULT_RECORD_URL, RECORD_URL_ENV, Settings};
use avrc_data::error::AvrcError;

fn env_record_url() -> Option<String> {
    std::env::var(RECORD_URL_ENV).ok()
}

#[test]
fn config_file_values_are_applied() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("avrc.json");
    std::fs::write(
        &path,
        r#"{"record_url": "https://sandbox.zenodo.org/api/records/42", "connect_timeout_secs": 5}"#,
    )
    .unwrap();

    let settings = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap();

    let expected = ConfigLoader::resolve_config(
        Config {
            record_url: Some("https://sandbox.zenodo.org/api/records/42".to_string()),
            ..Config::default()
        },
        env_record_url().as_deref(),
    );
    assert_eq!(settings.record_url, expected.record_url);
    assert_eq!(settings.connect_timeout_secs, 5);
    assert_eq!(settings.user_agent, Settings::default().user_agent);
}

// Only test in this binary that depends on the working directory.
#[test]
fn missing_default_file_yields_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp.path()).unwrap();

    let result = ConfigLoader::resolve(None);
    std::env::set_current_dir(previous).unwrap();

    let settings = result.unwrap();
    assert_eq!(
        settings,
        ConfigLoader::resolve_config(Config::default(), env_record_url().as_deref())
    );
    if env_record_url().is_none() {
        assert_eq!(settings, Settings::default());
    }
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("missing.json");

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();

    assert_matches!(err, AvrcError::ConfigRead(p) if p == path);
}

#[test]
fn invalid_json_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("avrc.json");
    std::fs::write(&path, "{ record_url: ").unwrap();

    let err = ConfigLoader::resolve(Some(path.to_str().unwrap())).unwrap_err();

    assert_matches!(err, AvrcError::ConfigParse(_));
}

#[test]
fn defaults_point_at_avrc_record() {
    assert_eq!(
        Settings::default().record_url,
        "https://zenodo.org/api/records/11426065"
    );
    assert_eq!(DEFAULT_RECORD_URL, Settings::default().record_url);
}
