//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn registra() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("registra").unwrap()
}

const SCHEME: &str = r#"
[scheme]
course = "MATH-201"
description = "Calculus II grading"

[[entries]]
label = "Midterm 1"
weight = 10.0

[[entries]]
label = "Midterm 2"
weight = 10.0

[[entries]]
label = "Labs"
weight = 20.0

[[entries]]
label = "Midpoint Exam"
weight = 20.0

[[entries]]
label = "Final Exam"
weight = 20.0

[[entries]]
label = "Attitude"
weight = 5.0

[[entries]]
label = "Assignments"
weight = 15.0
"#;

// Fixed ids from the demo seed.
const AVERY_2026_ENROLLMENT: &str = "dddd4444-eeee-4fff-8aaa-bbbb5555cccc";
const JULES_2026_ENROLLMENT: &str = "eeee5555-ffff-4aaa-8bbb-cccc6666dddd";

#[test]
fn help_output() {
    registra()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Academic evaluation and grade engine",
        ));
}

#[test]
fn version_output() {
    registra()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("registra"));
}

#[test]
fn init_creates_files_and_skips_existing() {
    let dir = TempDir::new().unwrap();

    registra()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created schemes/example.toml"));
    assert!(dir.path().join("schemes/example.toml").exists());

    registra()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_accepts_a_complete_scheme() {
    let dir = TempDir::new().unwrap();
    let scheme = dir.path().join("math.toml");
    std::fs::write(&scheme, SCHEME).unwrap();

    registra()
        .arg("validate")
        .arg("--scheme")
        .arg(&scheme)
        .assert()
        .success()
        .stdout(predicate::str::contains("7 entries"));
}

#[test]
fn validate_rejects_bad_weight_totals() {
    let dir = TempDir::new().unwrap();
    let scheme = dir.path().join("bad.toml");
    std::fs::write(
        &scheme,
        "[scheme]\ncourse = \"MATH-201\"\n\n[[entries]]\nlabel = \"Final Exam\"\nweight = 90.0\n",
    )
    .unwrap();

    registra()
        .arg("validate")
        .arg("--scheme")
        .arg(&scheme)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_nonexistent_file() {
    registra()
        .arg("validate")
        .arg("--scheme")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn seed_writes_the_data_file() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("registra.json");

    registra()
        .arg("--data")
        .arg(&data)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 students"));
    assert!(data.exists());
}

#[test]
fn configure_applies_a_scheme_to_a_seeded_course() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("registra.json");
    let scheme = dir.path().join("math.toml");
    std::fs::write(&scheme, SCHEME).unwrap();

    registra().arg("--data").arg(&data).arg("seed").assert().success();

    registra()
        .arg("--data")
        .arg(&data)
        .arg("configure")
        .arg("--scheme")
        .arg(&scheme)
        .assert()
        .success()
        .stdout(predicate::str::contains("7 created"));
}

#[test]
fn full_period_flow() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("registra.json");
    let run = |args: &[&str]| {
        let mut cmd = registra();
        cmd.arg("--data").arg(&data);
        for arg in args {
            cmd.arg(arg);
        }
        cmd
    };

    run(&["seed"]).assert().success();

    // Promotion sweep runs off the closed 2025-II grades.
    run(&["open-period", "--period", "2026-I"])
        .assert()
        .success()
        .stdout(predicate::str::contains("promoted 2 students"));

    // Jules' attendance in MATH-201 blocks the final exam.
    run(&[
        "record",
        "--enrollment",
        JULES_2026_ENROLLMENT,
        "--label",
        "Final Exam",
        "--value",
        "15",
        "--weight",
        "20",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("final exam"));

    // A non-gated label records fine.
    run(&[
        "record",
        "--enrollment",
        AVERY_2026_ENROLLMENT,
        "--label",
        "Midterm 1",
        "--value",
        "15",
        "--weight",
        "10",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Recorded Midterm 1"));

    run(&["grades", "--enrollment", AVERY_2026_ENROLLMENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("Midterm 1"))
        .stdout(predicate::str::contains("Complete: no"));

    // Incomplete ledgers block the close unless forced.
    run(&["close-period", "--period", "2026-I"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    run(&["close-period", "--period", "2026-I", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closed 2026-I"));

    let report = dir.path().join("2026-i.md");
    run(&[
        "report",
        "--period",
        "2026-I",
        "--output",
        report.to_str().unwrap(),
    ])
    .assert()
    .success();
    let markdown = std::fs::read_to_string(&report).unwrap();
    assert!(markdown.contains("# Period Report — 2026-I"));

    // The prior period's frozen grades still rank.
    run(&["ranking", "--period", "2025-II"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kiara Patel"));
}

#[test]
fn import_reports_recorded_and_rejected_rows() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("registra.json");
    let csv = dir.path().join("scores.csv");

    registra().arg("--data").arg(&data).arg("seed").assert().success();

    std::fs::write(
        &csv,
        format!(
            "enrollment_id,label,value,weight,notes\n\
             {AVERY_2026_ENROLLMENT},Midterm 1,15,10,\n\
             {AVERY_2026_ENROLLMENT},Labs,18,20,late submission\n\
             {JULES_2026_ENROLLMENT},Final Exam,15,20,\n"
        ),
    )
    .unwrap();

    registra()
        .arg("--data")
        .arg(&data)
        .arg("import")
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 scores"))
        .stdout(predicate::str::contains("1 rejected"));
}
