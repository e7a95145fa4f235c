//! Integration tests for the exporter and inspector binaries.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const MANIFEST_HEADER: &str =
    "batch_id,batch_name,transaction_id,processed_at,amount,currency_type,micr,front_image,back_image\n";

/// Write a configuration, manifest and images into `dir`.
fn write_inputs(dir: &Path, rows: &str) {
    fs::write(
        dir.join("config.json"),
        r#"{
            "destination_key": "first-bank",
            "routing_number": "071000288",
            "account_number": "445566778",
            "destination_name": "First Bank",
            "origin_name": "Shepherd Church"
        }"#,
    )
    .unwrap();
    fs::write(dir.join("deposit.csv"), format!("{}{}", MANIFEST_HEADER, rows)).unwrap();
    fs::write(dir.join("front.tif"), [0x49, 0x49, 0x2a, 0x00, 1]).unwrap();
    fs::write(dir.join("back.tif"), [0x49, 0x49, 0x2a, 0x00, 2]).unwrap();
}

fn export_command(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("x937_export").unwrap();
    cmd.arg("--config")
        .arg(dir.join("config.json"))
        .arg("--transactions")
        .arg(dir.join("deposit.csv"))
        .arg("--state")
        .arg(dir.join("state.json"))
        .arg("--export-time")
        .arg("2019-01-15T13:58:08");
    cmd
}

#[test]
fn test_export_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Sunday,1001,2019-01-13 09:15:00,125.00,check,d123456780d   123-456-7c  5431,front.tif,back.tif\n\
         1,Sunday,1002,2019-01-13 09:20:00,20.50,check,d123456780d   765-432-1c  0042,front.tif,back.tif\n",
    );
    let output = dir.path().join("deposit.x937");

    export_command(dir.path())
        .arg("--destination")
        .arg("dstu")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let state = fs::read_to_string(dir.path().join("state.json")).unwrap();
    assert!(state.contains("first-bank.LastFileModifier"));
    assert!(state.contains("first-bank.NextCashLetterId"));

    Command::cargo_bin("x937_inspect")
        .unwrap()
        .arg("--file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("CheckDetail"))
        .stdout(predicate::str::contains("2 checks totaling 145.50"))
        .stdout(predicate::str::contains("totals match"));
}

#[test]
fn test_export_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "");

    let assert = export_command(dir.path())
        .arg("--destination")
        .arg("wells-fargo")
        .assert()
        .success();

    let stdout = &assert.get_output().stdout;
    assert_eq!(stdout.len(), 4 * (4 + 80));
    assert_eq!(&stdout[4..6], b"01");
}

#[test]
fn test_non_check_transactions_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Sunday,1001,2019-01-13 09:15:00,125.00,cash,,,\n\
         1,Sunday,1002,2019-01-13 09:20:00,20.50,credit_card,,,\n",
    );

    export_command(dir.path())
        .arg("--destination")
        .arg("dstu")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Transaction 1001"))
        .stderr(predicate::str::contains("Transaction 1002"));

    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn test_unknown_destination() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "");

    export_command(dir.path())
        .arg("--destination")
        .arg("first-national")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format: first-national"));
}

#[test]
fn test_inspect_missing_file() {
    Command::cargo_bin("x937_inspect")
        .unwrap()
        .arg("--file")
        .arg("does-not-exist.x937")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
