#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

#[allow(deprecated)]
fn timesheet(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.current_dir(workdir)
        .env_remove("RUST_LOG")
        .env_remove("TIMESHEET_PROFILE")
        .env_remove("TIMESHEET_STORAGE__BACKEND")
        .env_remove("TIMESHEET_STORAGE__PATH")
        .args(["--data-dir", "data", "--export-dir", "out"]);
    cmd
}

#[test]
fn add_then_summary_reports_totals() {
    let dir = tempfile::tempdir().unwrap();
    timesheet(dir.path())
        .write_stdin(
            "add 2024-01-02 6 project Build the API\n\
             add 2024-01-02 2 Training Course\n\
             summary\nquit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Timesheet (daily profile)"))
        .stdout(predicate::str::contains("Added entry"))
        .stdout(predicate::str::contains("Billable: 6h"))
        .stdout(predicate::str::contains("Non-billable: 2h"))
        .stdout(predicate::str::contains("Total: 8h"));
}

#[test]
fn entries_persist_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    timesheet(dir.path())
        .write_stdin("add 2024-01-02 3 MS Support rotation\n")
        .assert()
        .success();
    assert!(dir.path().join("data/timesheet_entries.json").exists());

    timesheet(dir.path())
        .args(["--profile", "classic"])
        .write_stdin("show\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Support rotation"))
        .stdout(predicate::str::contains("billable"));
}

#[test]
fn invalid_input_is_reported_and_nothing_saved() {
    let dir = tempfile::tempdir().unwrap();
    timesheet(dir.path())
        .write_stdin("add 2024-01-02 lots project Build\nsummary\nfrobnicate\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: invalid hours 'lots'"))
        .stdout(predicate::str::contains("Total: 0h"))
        .stdout(predicate::str::contains("Unknown command. Type 'help'."));
}

#[test]
fn export_asks_then_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    timesheet(dir.path())
        .write_stdin("add 2024-01-02 8 project Build\nexport\nn\nexport\ny\nsummary\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export cancelled."))
        .stdout(predicate::str::contains("Exported 1 entries to"))
        .stdout(predicate::str::contains("Total: 0h"));

    let path = dir.path().join("out/timesheet_2024-01-02_to_2024-01-02.csv");
    let csv = std::fs::read_to_string(path).unwrap();
    assert!(csv.starts_with("Day,Date,Task,Description,Category,Effort,Hours\n"));
    assert!(csv.contains("Tuesday,2024-01-02,\"Build\",\"\",project,Billable,8"));
}

#[test]
fn triage_commands_need_triage_profile() {
    let dir = tempfile::tempdir().unwrap();
    timesheet(dir.path())
        .write_stdin("triage add 2024-01-02 s1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Error: triage log is not enabled for this profile",
        ));

    timesheet(dir.path())
        .args(["--profile", "triage"])
        .write_stdin("triage add 2024-01-02 s2\ntriage show\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged s2 shift on 2024-01-02"))
        .stdout(predicate::str::contains("Shifts: s1=0, s2=1, s3=0"));
}
