use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    // independent of init.defaultBranch
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", &format!("add {name}")]);
}

fn analyze_json(dir: &Path, extra: &[&str]) -> serde_json::Value {
    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.env("NO_COLOR", "1")
        .arg("analyze")
        .arg(dir)
        .args(["--output", "json"])
        .args(extra);
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn analyze_json_reports_commits_and_languages() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/a.rs", "fn a() {}\n");
    commit_file(dir.path(), "src/b.rs", "fn b() {}\nfn c() {}\n");
    commit_file(dir.path(), "README.md", "# demo\n");

    let v = analyze_json(dir.path(), &[]);
    let insights = &v["insights"];
    assert_eq!(insights["summary"]["total_commits"].as_u64(), Some(3));
    assert_eq!(insights["summary"]["total_contributors"].as_u64(), Some(1));
    assert_eq!(insights["summary"]["total_insertions"].as_u64(), Some(4));
    assert_eq!(insights["summary"]["primary_language"].as_str(), Some("Rust"));
    assert_eq!(insights["contributors"][0]["identity"].as_str(), Some("you@example.com"));

    let total: f64 = insights["languages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["percentage"].as_f64().unwrap())
        .sum();
    assert!((total - 100.0).abs() < 1e-6);
    assert_eq!(insights["branches"][0]["name"].as_str(), Some("main"));

    let code = &v["code"];
    assert_eq!(code["total_files"].as_u64(), Some(3));
    assert_eq!(code["total_lines"].as_u64(), Some(4));
    assert_eq!(code["files"][0]["path"].as_str(), Some("src/b.rs"));
}

#[test]
fn orphan_checkout_still_walks_other_branches() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "a\n");
    commit_file(dir.path(), "b.txt", "b\n");
    git(dir.path(), &["checkout", "--orphan", "fresh"]);

    let v = analyze_json(dir.path(), &[]);
    assert_eq!(v["insights"]["summary"]["total_commits"].as_u64(), Some(2));
    assert_eq!(v["insights"]["branches"][0]["name"].as_str(), Some("main"));
    assert_eq!(v["code"]["total_files"].as_u64(), Some(0));
}

#[test]
fn empty_repository_yields_zero_summary() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());

    let v = analyze_json(dir.path(), &[]);
    assert_eq!(v["insights"]["summary"]["total_commits"].as_u64(), Some(0));
    assert!(v["insights"]["contributors"].as_array().unwrap().is_empty());
    assert!(v["insights"]["trend"]["points"].as_array().unwrap().is_empty());
}

#[test]
fn inverted_range_fails() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "a\n");

    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("analyze")
        .arg(dir.path())
        .args(["--since", "2024-03-01", "--until", "2024-01-01"]);
    cmd.assert().failure();
}

#[test]
fn nonexistent_repository_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("analyze").arg(dir.path().join("missing"));
    cmd.assert().failure();
}

#[test]
fn export_json_feeds_analyze_input() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "lib.py", "print('hi')\n");
    commit_file(dir.path(), "lib.py", "print('hi')\nprint('bye')\n");

    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("export").arg(dir.path()).arg("--json");
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["entries"].as_array().map(Vec::len), Some(2));

    let export_file = dir.path().join("export.json");
    fs::write(&export_file, &out).unwrap();

    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("analyze")
        .arg(dir.path())
        .args(["--output", "json", "--input"])
        .arg(&export_file);
    let out = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["insights"]["summary"]["total_commits"].as_u64(), Some(2));
    assert_eq!(report["insights"]["languages"][0]["language"].as_str(), Some("Python"));
}

#[test]
fn html_report_written_to_file() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "index.js", "console.log(1)\n");

    let out_file = dir.path().join("report.html");
    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("analyze")
        .arg(dir.path())
        .args(["--output", "html", "--out"])
        .arg(&out_file);
    cmd.assert().success();

    let html = fs::read_to_string(&out_file).unwrap();
    assert!(html.contains("<h2>Contributors</h2>"));
    assert!(html.contains("JavaScript"));
}

#[test]
fn no_merges_flag_drops_merge_commits() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "file.txt", "a\n");

    git(dir.path(), &["checkout", "-b", "feat"]);
    commit_file(dir.path(), "feat.txt", "f1\n");

    git(dir.path(), &["checkout", "main"]);
    commit_file(dir.path(), "file.txt", "a\nc\n");
    git(dir.path(), &["merge", "--no-ff", "feat", "-m", "merge feat"]);

    let with_merges = analyze_json(dir.path(), &[]);
    let without = analyze_json(dir.path(), &["--no-merges"]);

    let count = |v: &serde_json::Value| v["insights"]["summary"]["total_commits"].as_u64().unwrap();
    assert_eq!(count(&with_merges), 4);
    assert_eq!(count(&without), 3);
    assert_eq!(with_merges["insights"]["summary"]["total_branches"].as_u64(), Some(2));
}

#[test]
fn bad_period_in_config_file_is_configuration_error() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "a\n");
    fs::write(dir.path().join(".gitinsights.toml"), "period = \"fortnight\"\n").unwrap();

    let mut cmd = Command::cargo_bin("gitinsights").unwrap();
    cmd.arg("analyze").arg(dir.path());
    let out = cmd.assert().failure().get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&out);
    assert!(stderr.contains("Configuration error"), "stderr: {stderr}");

    fs::write(dir.path().join(".gitinsights.toml"), "period = \"weekly\"\n").unwrap();
    let v = analyze_json(dir.path(), &[]);
    assert_eq!(v["insights"]["trend"]["period"].as_str(), Some("week"));
}
