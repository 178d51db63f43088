//! Integration tests for properties files through to the rendered command

use splunk_consumer::config::{Configuration, Properties};
use splunk_consumer::error::ConfigError;
use splunk_consumer::search::SearchCommand;
use tempfile::TempDir;

fn write_props(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("consumer.yml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_yaml_to_command() {
    let dir = TempDir::new().unwrap();
    let path = write_props(
        &dir,
        "install_path: /opt/splunk/\n\
         index: firewall\n\
         output_format: JSON\n\
         max_output: 250\n\
         username: exporter\n\
         password: s3cret\n",
    );

    let props = Properties::read(&path).unwrap();
    let config = Configuration::from_properties(&props).unwrap();
    let command = SearchCommand::from_config(&config).unwrap();

    assert_eq!(
        command.to_shell(),
        "/opt/splunk/bin/splunk search \"index=firewall\" -output json -maxout 250 -auth 'exporter:s3cret'"
    );
    assert!(!command.redacted().contains("s3cret"));
    assert!(!format!("{:?}", config).contains("s3cret"));
}

#[test]
fn test_yaml_username_without_password_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_props(&dir, "install_path: /opt/splunk\nindex: main\nusername: exporter\n");

    let props = Properties::read(&path).unwrap();
    let err = Configuration::from_properties(&props).unwrap_err();
    assert!(err.is_missing_credential());
}

#[test]
fn test_yaml_invalid_format_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_props(&dir, "install_path: /opt/splunk\nindex: main\noutput_format: xml\n");

    let props = Properties::read(&path).unwrap();
    let err = Configuration::from_properties(&props).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_yaml_unknown_key_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_props(&dir, "install_path: /opt/splunk\nindx: main\n");

    assert!(Properties::read(&path).is_err());
}

#[test]
fn test_template_round_trips_after_filling_required() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("consumer.yml");
    Properties::write_template(&path).unwrap();

    let template = std::fs::read_to_string(&path).unwrap();
    let filled = template
        .replace("install_path: \n", "install_path: /opt/splunk\n")
        .replace("index: \n", "index: main\n");
    std::fs::write(&path, filled).unwrap();

    let props = Properties::read(&path).unwrap();
    let config = Configuration::from_properties(&props).unwrap();
    assert_eq!(config.index(), "main");
    assert_eq!(config.output_format().as_str(), "csv");
}
