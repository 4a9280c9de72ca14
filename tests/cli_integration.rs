//! Integration tests for the `tl` CLI.
//!
//! Each test works in a temp directory, runs `tl` as a subprocess against
//! `scene.tln`, and checks stdout or the resulting tree.

use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Run `tl -f scene.tln <args>` in `dir`, returning (stdout, stderr, success)
fn run_tl(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_tl"))
        .args(["-f", "scene.tln"])
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("TRACKLINE_LOG")
        .output()
        .expect("failed to run tl");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_tl_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tl(dir, args);
    if !success {
        panic!(
            "tl {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn run_tl_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tl(dir, args);
    assert!(!success, "tl {:?} should fail, got: {}", args, stdout);
    stderr
}

/// Fresh timeline with the given root folders
fn timeline_with_folders(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    run_tl_ok(tmp.path(), &["new"]);
    for name in names {
        run_tl_ok(tmp.path(), &["add", "folder", name]);
    }
    tmp
}

fn tree(dir: &Path) -> Vec<String> {
    run_tl_ok(dir, &["tree"])
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Creating and reading
// ---------------------------------------------------------------------------

#[test]
fn new_timeline_is_empty() {
    let tmp = timeline_with_folders(&[]);
    assert!(tmp.path().join("scene.tln").exists());
    assert_eq!(tree(tmp.path()), vec!["(no tracks)"]);
}

#[test]
fn new_refuses_to_overwrite() {
    let tmp = timeline_with_folders(&["Keep"]);
    let stderr = run_tl_err(tmp.path(), &["new"]);
    assert!(stderr.contains("already exists"));
    run_tl_ok(tmp.path(), &["new", "--force"]);
    assert_eq!(tree(tmp.path()), vec!["(no tracks)"]);
}

#[test]
fn missing_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    let stderr = run_tl_err(tmp.path(), &["tree"]);
    assert!(stderr.contains("could not read"));
}

#[test]
fn add_nests_and_spawns_media() {
    let tmp = timeline_with_folders(&["Shots"]);
    let name = run_tl_ok(tmp.path(), &["add", "camera-cut", "Cam", "--parent", "Shots"]);
    assert_eq!(name.trim(), "Cam");
    assert_eq!(
        tree(tmp.path()),
        vec!["\u{25be} Shots [folder]", "    Cam [camera-cut] media:1"]
    );
}

#[test]
fn add_makes_names_unique() {
    let tmp = timeline_with_folders(&[]);
    assert_eq!(run_tl_ok(tmp.path(), &["add", "folder"]).trim(), "Folder");
    assert_eq!(run_tl_ok(tmp.path(), &["add", "folder"]).trim(), "Folder 0");
    assert_eq!(run_tl_ok(tmp.path(), &["add", "folder", "Folder"]).trim(), "Folder 1");
}

#[test]
fn add_rejects_child_kind_the_parent_refuses() {
    let tmp = timeline_with_folders(&[]);
    run_tl_ok(tmp.path(), &["add", "actor", "Hero"]);
    let stderr = run_tl_err(tmp.path(), &["add", "audio", "--parent", "Hero"]);
    assert!(stderr.contains("can't hold"));
    let stderr = run_tl_err(tmp.path(), &["add", "spaceship"]);
    assert!(stderr.contains("unknown track kind"));
}

#[test]
fn tree_json_nests_children() {
    let tmp = timeline_with_folders(&["Shots"]);
    run_tl_ok(tmp.path(), &["add", "audio", "Music", "--parent", "Shots"]);
    let out = run_tl_ok(tmp.path(), &["--json", "tree"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["fps"], 30.0);
    assert_eq!(json["tracks"][0]["children"][0]["name"], "Music");
    assert_eq!(json["tracks"][0]["children"][0]["archetype"], "audio");
    assert_eq!(json["tracks"][0]["children"][0]["media"][0]["duration"], 30);
}

// ---------------------------------------------------------------------------
// Moving
// ---------------------------------------------------------------------------

#[test]
fn mv_into_reparents() {
    let tmp = timeline_with_folders(&["A", "B"]);
    let out = run_tl_ok(tmp.path(), &["mv", "B", "--into", "A"]);
    assert_eq!(out.trim(), "moved 1 track(s)");
    assert_eq!(tree(tmp.path()), vec!["\u{25be} A [folder]", "    B [folder]"]);
}

#[test]
fn mv_above_reorders_roots() {
    let tmp = timeline_with_folders(&["A", "B", "C"]);
    run_tl_ok(tmp.path(), &["mv", "C", "--above", "A"]);
    assert_eq!(
        tree(tmp.path()),
        vec!["  C [folder]", "  A [folder]", "  B [folder]"]
    );
}

#[test]
fn mv_below_keeps_candidate_order() {
    let tmp = timeline_with_folders(&["A", "B", "C", "D"]);
    run_tl_ok(tmp.path(), &["mv", "A", "B", "--below", "D"]);
    assert_eq!(
        tree(tmp.path()),
        vec!["  C [folder]", "  D [folder]", "  A [folder]", "  B [folder]"]
    );
}

#[test]
fn mv_into_own_subtree_is_refused() {
    let tmp = timeline_with_folders(&["A"]);
    run_tl_ok(tmp.path(), &["add", "folder", "Inner", "--parent", "A"]);
    let stderr = run_tl_err(tmp.path(), &["mv", "A", "--into", "Inner"]);
    assert!(stderr.contains("own subtree"));
    assert_eq!(tree(tmp.path()), vec!["\u{25be} A [folder]", "    Inner [folder]"]);
}

#[test]
fn mv_into_refusing_parent_changes_nothing() {
    let tmp = timeline_with_folders(&["F"]);
    run_tl_ok(tmp.path(), &["add", "actor", "Hero"]);
    let stderr = run_tl_err(tmp.path(), &["mv", "F", "--into", "Hero"]);
    assert!(stderr.contains("can't take"));
    assert_eq!(tree(tmp.path()), vec!["  F [folder]", "  Hero [actor]"]);
}

#[test]
fn mv_needs_a_position() {
    let tmp = timeline_with_folders(&["A", "B"]);
    run_tl_err(tmp.path(), &["mv", "A"]);
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[test]
fn rename_sanitizes_and_dedupes() {
    let tmp = timeline_with_folders(&["A", "Taken"]);
    assert_eq!(run_tl_ok(tmp.path(), &["rename", "A", " Cam;era "]).trim(), "Camera");
    assert_eq!(run_tl_ok(tmp.path(), &["rename", "Camera", "Taken"]).trim(), "Taken 0");
}

#[test]
fn rename_refuses_script_tracks() {
    let tmp = timeline_with_folders(&[]);
    run_tl_ok(tmp.path(), &["add", "script", "Walk"]);
    let stderr = run_tl_err(tmp.path(), &["rename", "Walk", "Run"]);
    assert!(stderr.contains("can't be renamed"));
}

#[test]
fn rm_cascades_to_children() {
    let tmp = timeline_with_folders(&["A", "B"]);
    run_tl_ok(tmp.path(), &["add", "folder", "Inner", "--parent", "A"]);
    let out = run_tl_ok(tmp.path(), &["rm", "A"]);
    assert_eq!(out.trim(), "deleted 2 track(s)");
    assert_eq!(tree(tmp.path()), vec!["  B [folder]"]);
}

#[test]
fn collapse_all_is_saved() {
    let tmp = timeline_with_folders(&["A"]);
    run_tl_ok(tmp.path(), &["add", "folder", "Inner", "--parent", "A"]);
    run_tl_ok(tmp.path(), &["add", "folder", "Deep", "--parent", "Inner"]);
    run_tl_ok(tmp.path(), &["collapse", "--all"]);
    assert_eq!(
        tree(tmp.path()),
        vec![
            "\u{25b8} A [folder]",
            "  \u{25b8} Inner [folder]",
            "      Deep [folder]"
        ]
    );
    run_tl_ok(tmp.path(), &["expand", "Inner"]);
    assert_eq!(
        tree(tmp.path()),
        vec![
            "\u{25be} A [folder]",
            "  \u{25be} Inner [folder]",
            "      Deep [folder]"
        ]
    );
    run_tl_err(tmp.path(), &["collapse"]);
}

#[test]
fn mute_toggles() {
    let tmp = timeline_with_folders(&["A"]);
    run_tl_ok(tmp.path(), &["mute", "A"]);
    assert_eq!(tree(tmp.path()), vec!["  A [folder] muted"]);
    run_tl_ok(tmp.path(), &["mute", "A", "--off"]);
    assert_eq!(tree(tmp.path()), vec!["  A [folder]"]);
}

#[test]
fn media_add_move_and_remove() {
    let tmp = timeline_with_folders(&[]);
    run_tl_ok(tmp.path(), &["add", "audio", "Music"]);
    run_tl_ok(tmp.path(), &["add", "audio", "Voice"]);
    run_tl_ok(tmp.path(), &["media", "add", "Music", "60", "15"]);

    let out = run_tl_ok(tmp.path(), &["media", "ls", "Music"]);
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec!["0  0..30  (30f, 1.00s)", "1  60..75  (15f, 0.50s)"]
    );

    run_tl_ok(tmp.path(), &["media", "mv", "Music", "1", "Voice"]);
    let out = run_tl_ok(tmp.path(), &["media", "ls", "Voice"]);
    assert_eq!(out.lines().count(), 2);

    run_tl_ok(tmp.path(), &["media", "rm", "Music", "0"]);
    assert_eq!(run_tl_ok(tmp.path(), &["media", "ls", "Music"]), "");

    let stderr = run_tl_err(tmp.path(), &["media", "rm", "Music", "0"]);
    assert!(stderr.contains("no index 0"));

    run_tl_ok(tmp.path(), &["add", "folder", "F"]);
    let stderr = run_tl_err(tmp.path(), &["media", "add", "F", "0", "10"]);
    assert!(stderr.contains("don't hold media"));
}

#[test]
fn check_reports_valid_tree() {
    let tmp = timeline_with_folders(&["A", "B"]);
    assert_eq!(run_tl_ok(tmp.path(), &["check"]).trim(), "ok");
    let out = run_tl_ok(tmp.path(), &["--json", "check"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["valid"], true);
}

#[test]
fn config_sets_default_fps() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("trackline.toml"), "[timeline]\nfps = 24.0\n").unwrap();
    run_tl_ok(tmp.path(), &["new"]);
    run_tl_ok(tmp.path(), &["add", "audio", "Music"]);
    let out = run_tl_ok(tmp.path(), &["--json", "tree"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["fps"], 24.0);
    assert_eq!(json["tracks"][0]["media"][0]["duration"], 24);
}
