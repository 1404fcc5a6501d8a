use std::time::{SystemTime, UNIX_EPOCH};

use tabspot_core::config::{self, Config, ConfigError};

fn scratch_path(name: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join("tabspot-config-tests")
        .join(format!("{name}-{unique}.toml"))
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.command, "open-tab-switcher");
    assert!(cfg.privileged_schemes.contains(&"chrome://".to_string()));
    assert!(cfg.config_path.to_string_lossy().contains("tabspot"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_element_id_with_whitespace() {
    let cfg = Config {
        overlay_element_id: "tab switcher".into(),
        ..Default::default()
    };
    assert!(matches!(config::validate(&cfg), Err(ConfigError::Invalid(_))));
}

#[test]
fn rejects_unknown_log_level() {
    let cfg = Config {
        log_level: "loud".into(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn missing_file_loads_defaults() {
    let path = scratch_path("missing");
    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.command, Config::default().command);
    assert_eq!(cfg.config_path, path);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let path = scratch_path("partial");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "command = \"jump-to-tab\"\nprivileged_schemes = [\"chrome://\"]\n").unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.command, "jump-to-tab");
    assert_eq!(cfg.privileged_schemes, vec!["chrome://".to_string()]);
    assert_eq!(cfg.placeholder, Config::default().placeholder);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = scratch_path("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "command = [").unwrap();

    let result = config::load(Some(&path));
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn saved_config_loads_back() {
    let cfg = Config {
        command: "quick-switch".into(),
        config_path: scratch_path("saved"),
        ..Default::default()
    };
    config::save(&cfg).unwrap();

    let loaded = config::load(Some(&cfg.config_path)).unwrap();
    std::fs::remove_file(&cfg.config_path).unwrap();

    assert_eq!(loaded, cfg);
}
