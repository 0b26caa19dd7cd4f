//! Tests for the hb binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn hb(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hb").expect("hb binary should build");
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_source(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const CONFIG: &str = r#"
options:
  namespace: JST
targets:
  - name: app
    files:
      - src: ["views/*.hbs"]
        dest: build/app.js
  - name: empty
    files:
      - src: ["missing/one.hbs"]
        dest: build/empty.js
"#;

#[test]
fn test_build_all_targets() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);
    write_source(temp.path(), "views/index.hbs", "<h1>{{title}}</h1>");
    write_source(temp.path(), "views/_item.hbs", "<li>{{this}}</li>");

    hb(temp.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("File \"build/app.js\" created."))
        .stderr(predicate::str::contains("Source file \"missing/one.hbs\" not found."))
        .stderr(predicate::str::contains("build/empty.js"));

    let content = fs::read_to_string(temp.path().join("build/app.js")).unwrap();
    assert!(content.contains(r#"Handlebars.registerPartial("item", "#));
    assert!(content.contains(r#"this["JST"]["views/index.hbs"] = "#));
    assert!(!temp.path().join("build/empty.js").exists());
}

#[test]
fn test_build_reports_each_artifact_once() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);
    write_source(temp.path(), "views/index.hbs", "<h1>{{title}}</h1>");

    hb(temp.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("build/app.js").count(1))
        .stderr(predicate::str::contains("created.").not());
}

#[test]
fn test_build_warns_without_precompiler_command() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);
    write_source(temp.path(), "views/index.hbs", "{{^if items}}none{{/if}}");

    hb(temp.path())
        .args(["build", "app"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No precompiler.command configured"));

    let content = fs::read_to_string(temp.path().join("build/app.js")).unwrap();
    assert!(content.contains(r#"{{^if items}}none{{/if}}"#));
}

#[test]
fn test_build_unknown_target_fails() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);

    hb(temp.path())
        .args(["build", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target not found: nope"));
}

#[test]
fn test_compile_without_config() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "t/hello.hbs", "Hello {{name}}");

    hb(temp.path())
        .args(["compile", "-o", "out/hello.js", "--amd", "--no-wrap", "t/*.hbs"])
        .assert()
        .success();

    let content = fs::read_to_string(temp.path().join("out/hello.js")).unwrap();
    let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines[0], "define(['handlebars'], function(Handlebars) {");
    assert_eq!(lines[lines.len() - 2], r#"return this["JST"];"#);
    assert_eq!(lines[lines.len() - 1], "});");
    assert!(!content.contains("Handlebars.template("));
}

#[test]
fn test_compile_error_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), "t/bad.hbs", "{{#each items}}<li>");

    hb(temp.path())
        .args(["compile", "-o", "out.js", "t/bad.hbs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("t/bad.hbs"));

    assert!(!temp.path().join("out.js").exists());
}

#[test]
fn test_targets_lists_config() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);

    hb(temp.path())
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("views/*.hbs -> build/app.js"));
}

#[test]
fn test_options_shows_resolved_values() {
    let temp = TempDir::new().unwrap();
    write_source(temp.path(), ".hb.yml", CONFIG);

    hb(temp.path())
        .args(["options", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"this[\"JST\"]"#))
        .stdout(predicate::str::contains("wrapped: true"));
}
