use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;

const LOOKUP: &str = r#"{
    "homo_sapiens_core": {"database": "homo_sapiens_core", "path": "/pub/release-110/mysql/homo_sapiens_core_110_38", "server": "ftp.ensembl.org"},
    "homo_sapiens_variation": {"database": "homo_sapiens_variation", "path": "/pub/release-110/mysql/homo_sapiens_variation_110_38", "server": "ftp.ensembl.org"},
    "mus_musculus_core": {"database": "mus_musculus_core", "path": "/pub/release-110/mysql/mus_musculus_core_110_39", "server": "ftp.ensembl.org"}
}"#;

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("dblookup.json").write_str(LOOKUP).unwrap();
    tmp
}

fn cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ensembl-mirror").unwrap();
    cmd.env("ENSEMBL_DBLOOKUP", tmp.child("dblookup.json").path())
        .env_remove("RUST_LOG")
        .arg("--basedir")
        .arg(tmp.path());
    cmd
}

fn write_dataset(dir: &Path, manifest: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("a.txt"), b"hello").unwrap();
    let file = std::fs::File::create(dir.join("CHECKSUMS.gz")).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(manifest.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn list_without_pattern_prints_all_names_in_table_order() {
    let tmp = setup();
    cmd(&tmp)
        .arg("--list")
        .assert()
        .success()
        .stdout("homo_sapiens_core\nhomo_sapiens_variation\nmus_musculus_core\n");
}

#[test]
fn list_filters_with_glob() {
    let tmp = setup();
    cmd(&tmp)
        .args(["-l", "homo_sapiens_*"])
        .assert()
        .success()
        .stdout("homo_sapiens_core\nhomo_sapiens_variation\n");
}

#[test]
fn info_prints_json_records() {
    let tmp = setup();
    let output = cmd(&tmp).args(["--info", "mus_*"]).output().unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["database"], "mus_musculus_core");
    assert_eq!(records[0]["server"], "ftp.ensembl.org");
}

#[test]
fn info_without_pattern_is_empty() {
    let tmp = setup();
    cmd(&tmp).arg("-i").assert().success().stdout("[]\n");
}

#[test]
fn validate_correct_dataset() {
    let tmp = setup();
    write_dataset(&tmp.child("homo_sapiens_core").path(), "8403 1 a.txt\n");

    cmd(&tmp)
        .args(["--validate", "homo_sapiens_core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All files are correct"));
}

#[test]
fn validate_reports_mismatch() {
    let tmp = setup();
    write_dataset(&tmp.child("homo_sapiens_core").path(), "9999 1 a.txt\n");

    cmd(&tmp)
        .args(["-v", "homo_sapiens_core"])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("Checksum check failed for")
                .and(predicate::str::contains("a.txt. Expected '9999 1' but got '8403 1'"))
                .and(predicate::str::contains("All files are correct").not()),
        );
}

#[test]
fn validate_reports_missing_directory() {
    let tmp = setup();

    cmd(&tmp)
        .args(["--validate", "mus_musculus_core"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Cannot find database directory"));
}

#[test]
fn validate_with_nothing_selected_exits_cleanly() {
    let tmp = setup();

    cmd(&tmp)
        .args(["--validate", "danio_*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No databases found to test"));
}

#[test]
fn missing_lookup_table_is_fatal() {
    let tmp = TempDir::new().unwrap();

    Command::cargo_bin("ensembl-mirror")
        .unwrap()
        .env("ENSEMBL_DBLOOKUP", tmp.child("missing.json").path())
        .arg("--list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load lookup table"));
}

#[test]
fn validate_prints_earlier_mismatches_before_fatal_error() {
    let tmp = setup();
    write_dataset(&tmp.child("homo_sapiens_core").path(), "9999 1 a.txt\n");
    tmp.child("homo_sapiens_variation").create_dir_all().unwrap();

    cmd(&tmp)
        .args(["--validate", "homo_sapiens_*"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "a.txt. Expected '9999 1' but got '8403 1'",
        ))
        .stderr(predicate::str::contains("homo_sapiens_variation").and(
            predicate::str::contains("CHECKSUMS.gz"),
        ));
}

#[test]
fn list_matches_malformed_glob_literally() {
    let tmp = setup();
    cmd(&tmp)
        .args(["-l", "mus_musculus_core", "b[core"])
        .assert()
        .success()
        .stdout("mus_musculus_core\n");
}

#[test]
fn info_keeps_original_key_order() {
    let tmp = TempDir::new().unwrap();
    tmp.child("dblookup.json")
        .write_str(r#"{"a_core": {"server": "ftp.ensembl.org", "path": "/pub/a", "database": "a_core"}}"#)
        .unwrap();

    let output = cmd(&tmp).args(["--info", "a_core"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let server = stdout.find("\"server\"").unwrap();
    let path = stdout.find("\"path\"").unwrap();
    let database = stdout.find("\"database\"").unwrap();
    assert!(server < path && path < database, "{}", stdout);
}
