use csvserve::config::{AppConfig, DataSection, LogFormat};

#[test]
fn missing_data_path_is_a_config_error() {
    let config = AppConfig::default();

    let result = config.data_path();
    assert!(
        matches!(result, Err(csvserve::Error::Config(_))),
        "Expected unset data path to fail"
    );
}

#[test]
fn blank_data_path_is_treated_as_unset() {
    let config = AppConfig {
        data: DataSection {
            path: Some("   ".into()),
        },
        ..Default::default()
    };

    assert!(config.data_path().is_err());
}

#[test]
fn data_path_is_trimmed() {
    let config = AppConfig {
        data: DataSection {
            path: Some(" /srv/data/Filecao.csv ".into()),
        },
        ..Default::default()
    };

    let path = config.data_path().expect("path should resolve");
    assert_eq!(path.to_str(), Some("/srv/data/Filecao.csv"));
}

#[test]
fn defaults_are_sensible() {
    let config = AppConfig::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 5000);
    assert!(config.server.cors);
    assert!(matches!(config.logging.format, LogFormat::Text));
}

#[test]
fn load_reads_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("csvserve.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 8080
cors = false

[data]
path = "/srv/data/Filecao.csv"

[logging]
format = "json"
"#,
    )
    .unwrap();

    std::env::set_var("CSVSERVE_CONFIG", &path);
    let config = AppConfig::load().expect("config file should load");
    std::env::remove_var("CSVSERVE_CONFIG");

    assert_eq!(config.server.port, 8080);
    assert!(!config.server.cors);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(
        config.data_path().unwrap().to_str(),
        Some("/srv/data/Filecao.csv")
    );
    assert!(matches!(config.logging.format, LogFormat::Json));
    assert_eq!(config.logging.level, "info");
}
