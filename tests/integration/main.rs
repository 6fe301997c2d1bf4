//! Integration tests for shellcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const BUNDLE: &str = r#"{
        "resources": {
            "/": "root-v1",
            "index.html": "index-v1",
            "main.dart.js": "main-v1",
            "assets/logo.png": "logo-v1"
        },
        "core": ["main.dart.js", "index.html"]
    }"#;

    fn shellcache() -> Command {
        cargo_bin_cmd!("shellcache")
    }

    /// Write a config pointing at an unreachable origin and a temp cache dir
    fn workspace() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("resources.json"), BUNDLE).unwrap();
        let config = temp.path().join("config.toml");
        fs::write(
            &config,
            r#"
[worker]
origin = "http://127.0.0.1:9"
bundle = "resources.json"

[storage]
dir = "caches"
"#,
        )
        .unwrap();
        (temp, config)
    }

    fn with_config(config: &Path) -> Command {
        let mut cmd = shellcache();
        cmd.arg("--config").arg(config);
        cmd
    }

    #[test]
    fn help_displays() {
        shellcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline resource cache manager"))
            .stdout(predicate::str::contains("Usage: shellcache"));
    }

    #[test]
    fn version_displays() {
        shellcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shellcache"));
    }

    #[test]
    fn config_path() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[worker]"))
            .stdout(predicate::str::contains("http://127.0.0.1:9"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_init_creates_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("nested").join("config.toml");
        with_config(&config)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(config.exists());
    }

    #[test]
    fn activate_cold_start_without_install() {
        let (_temp, config) = workspace();
        with_config(&config)
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Activated"));
    }

    #[test]
    fn status_json_after_activate() {
        let (_temp, config) = workspace();
        with_config(&config).arg("activate").assert().success();
        with_config(&config)
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"current\""))
            .stdout(predicate::str::contains("main.dart.js"));
    }

    #[test]
    fn status_plain_lists_missing() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("missing index.html"));
    }

    #[test]
    fn install_fails_offline() {
        let (_temp, config) = workspace();
        with_config(&config)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed"));
    }

    #[test]
    fn fetch_unmanaged_path_passes_through() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["fetch", "/api/session"])
            .assert()
            .success()
            .stdout(predicate::str::contains("passthrough"));
    }

    #[test]
    fn fetch_non_get_passes_through() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["fetch", "-X", "POST", "main.dart.js"])
            .assert()
            .success()
            .stdout(predicate::str::contains("passthrough"));
    }

    #[test]
    fn message_unknown_is_ignored() {
        let (_temp, config) = workspace();
        with_config(&config)
            .args(["message", "hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Ignored"));
    }

    #[test]
    fn clear_with_yes() {
        let (_temp, config) = workspace();
        with_config(&config).arg("activate").assert().success();
        with_config(&config)
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted"));
    }

    #[test]
    fn clear_without_terminal_keeps_caches() {
        let (temp, config) = workspace();
        with_config(&config).arg("activate").assert().success();
        with_config(&config)
            .arg("clear")
            .write_stdin("y\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
        assert!(temp.path().join("caches").join("app-cache").exists());
    }

    #[test]
    fn status_does_not_create_caches() {
        let (temp, config) = workspace();
        with_config(&config)
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"state\": \"missing\""));
        assert!(!temp.path().join("caches").join("app-cache").exists());
    }

    #[test]
    fn missing_bundle_is_reported() {
        let (temp, config) = workspace();
        fs::remove_file(temp.path().join("resources.json")).unwrap();
        with_config(&config)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Resource bundle not found"));
    }
}
