//! Tests for the `rendercell` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from any user config file.
fn rendercell(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rendercell").unwrap();
    cmd.env("RENDERCELL_CONFIG_PATH", config).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_formal_greeter() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "formal-greeter", "--set", "name=Macron"])
        .assert()
        .success()
        .stdout("<h1>Hi, President Macron.</h1>\n");
}

#[test]
fn test_render_with_title_override() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "formal-greeter", "--set", "name=Merkel", "--set", "title=Chancellor"])
        .assert()
        .success()
        .stdout("<h1>Hi, Chancellor Merkel.</h1>\n");
}

#[test]
fn test_render_layout_with_nested_text() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "layout", "--set", "heading=Summit", "--nested-text", "<p>agenda</p>"])
        .assert()
        .success()
        .stdout("<main><header>Summit</header><p>agenda</p></main>\n");
}

#[test]
fn test_card_keeps_nested_input_without_producer() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "card", "--set", "nested=<p>given</p>"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<div><p>given</p></div>"));
}

#[test]
fn test_oversized_integer_input_rejected() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "formal-greeter", "--set", "name=18446744073709551615"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the 64-bit signed range"));
}

#[test]
fn test_memoized_repeat_reports_hits() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "formal-greeter", "--set", "name=Macron", "--memoized", "--repeat", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Hi, President Macron.</h1>").count(3))
        .stderr(predicate::str::contains("2 hit(s), 1 miss(es)"));
}

#[test]
fn test_missing_input_shows_suggestion() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "formal-greeter", "--set", "nme=Macron"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing input 'name'"))
        .stderr(predicate::str::contains("Did you mean 'nme'?"));
}

#[test]
fn test_unknown_component_suggests_builtin() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["render", "leyout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown component 'leyout'"))
        .stderr(predicate::str::contains("Did you mean 'layout'?"));
}

#[test]
fn test_disabled_templating_prints_card_source() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[templating]\nenabled = false\n").unwrap();

    rendercell(&config)
        .args(["render", "card"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{{ heading }}"));
}

#[test]
fn test_cache_demo_with_small_capacity() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["cache", "demo", "--capacity", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity 2, per-key locking"))
        .stdout(predicate::str::contains("entries:   2/2"))
        .stdout(predicate::str::contains("evictions: 3"));
}

#[test]
fn test_cache_demo_rejects_zero_capacity() {
    let temp = TempDir::new().unwrap();
    rendercell(&temp.path().join("config.toml"))
        .args(["cache", "demo", "--capacity", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("capacity must be at least 1"));
}

#[test]
fn test_config_file_sets_capacity_and_policy() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[cache]\ncapacity = 3\nlock_policy = \"global\"\n").unwrap();

    rendercell(&config)
        .args(["cache", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity 3, global locking"));

    rendercell(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity = 3"))
        .stdout(predicate::str::contains("lock_policy = \"global\""));
}

#[test]
fn test_invalid_config_reports_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[cache]\ncapacity = 0\n").unwrap();

    rendercell(&config)
        .args(["render", "layout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn test_config_path_prints_override() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");

    rendercell(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_flag_beats_environment() {
    let temp = TempDir::new().unwrap();
    let flag_config = temp.path().join("flag.toml");

    rendercell(&temp.path().join("env.toml"))
        .args(["--config", flag_config.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flag.toml"));
}
