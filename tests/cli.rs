use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn spendtrack(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendtrack").unwrap();
    cmd.env("SPENDTRACK_DATA_DIR", data_dir.path())
        .env_remove("SPENDTRACK_OWNER")
        .env_remove("SPENDTRACK_TODAY")
        .args(["--as-of", "2025-03-10"]);
    cmd
}

fn as_owner(data_dir: &TempDir, owner: &str) -> Command {
    let mut cmd = spendtrack(data_dir);
    cmd.args(["--owner", owner]);
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn init_creates_ledgers() {
    let dir = TempDir::new().unwrap();

    spendtrack(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("expenses.json").exists());
    assert!(dir.path().join("data").join("bills.json").exists());

    spendtrack(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

#[test]
fn add_and_list_expenses() {
    let dir = TempDir::new().unwrap();

    as_owner(&dir, "alice")
        .args(["expense", "add", "12.50", "food", "--date", "2025-01-15", "--note", "lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded Food $12.50 on 2025-01-15"));

    as_owner(&dir, "alice")
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lunch"))
        .stdout(predicate::str::contains("1 expense(s), total $12.50"));

    as_owner(&dir, "bob")
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));
}

#[test]
fn report_json_export() {
    let dir = TempDir::new().unwrap();

    for (amount, category, date) in [
        ("100", "food", "2024-03-05"),
        ("80", "food", "2025-03-02"),
        ("30", "shopping", "2025-03-04"),
    ] {
        as_owner(&dir, "alice")
            .args(["expense", "add", amount, category, "--date", date])
            .assert()
            .success();
    }

    let out = dir.path().join("report.json");
    as_owner(&dir, "alice")
        .args(["report", "--type", "expenses", "--year", "2025", "--month", "3"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let totals = &report["expenses"]["totals"];
    assert_eq!(totals["current"], 110.0);
    assert_eq!(totals["previous"], 100.0);
    assert_eq!(totals["trend"], "up");
    assert_eq!(report["expenses"]["transactionCount"], 2);
    assert_eq!(report["expenses"]["categoryBreakdown"][0]["category"], "food");
    assert_eq!(report["window"]["start"], "2025-03-01");
    assert_eq!(report["previousWindow"]["start"], "2024-03-01");
}

#[test]
fn report_csv_to_stdout() {
    let dir = TempDir::new().unwrap();

    as_owner(&dir, "alice")
        .args(["expense", "add", "20", "education", "--date", "2025-02-01"])
        .assert()
        .success();

    as_owner(&dir, "alice")
        .args(["report", "--year", "2025", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Type,Start Date,End Date,Category"))
        .stdout(predicate::str::contains("expenses,2025-01-01,2025-12-31,education,20.00,1,20.00,100.00"));
}

#[test]
fn bill_lifecycle() {
    let dir = TempDir::new().unwrap();

    as_owner(&dir, "alice")
        .args(["bill", "add", "Electricity", "84.50", "2025-03-09", "--category", "utilities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[overdue]"));

    as_owner(&dir, "alice")
        .args(["bill", "add", "Rent", "900", "2025-03-12", "-c", "rent", "--every", "monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[pending]"));

    let upcoming = stdout_json(
        as_owner(&dir, "alice").args(["report", "--type", "bills", "--year", "2025", "--month", "3", "--format", "json"]),
    );
    assert_eq!(upcoming["bills"]["statusBreakdown"]["overdue"], 1);
    assert_eq!(upcoming["bills"]["statusBreakdown"]["pending"], 1);

    as_owner(&dir, "alice")
        .args(["bill", "upcoming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overdue: 1"))
        .stdout(predicate::str::contains("Rent"));

    let export = dir.path().join("ledger.json");
    as_owner(&dir, "alice")
        .args(["export", "all"])
        .arg(&export)
        .assert()
        .success();
    let ledger: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    let electricity = ledger["bills"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["title"] == "Electricity")
        .unwrap();
    let id = electricity["id"].as_str().unwrap().to_string();

    as_owner(&dir, "alice")
        .args(["bill", "pay", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paid 'Electricity'"));

    as_owner(&dir, "alice")
        .args(["bill", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status:    Paid"));

    as_owner(&dir, "alice")
        .args(["audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Electricity"));
}

#[test]
fn foreign_entry_is_not_found() {
    let dir = TempDir::new().unwrap();

    as_owner(&dir, "alice")
        .args(["expense", "add", "5", "other"])
        .assert()
        .success();

    let export = dir.path().join("alice.json");
    as_owner(&dir, "alice")
        .args(["export", "all"])
        .arg(&export)
        .assert()
        .success();
    let ledger: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    let id = ledger["expenses"][0]["id"].as_str().unwrap().to_string();

    as_owner(&dir, "bob")
        .args(["expense", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [not_found]"));

    as_owner(&dir, "bob")
        .args(["expense", "delete", &id])
        .assert()
        .failure();

    as_owner(&dir, "alice")
        .args(["expense", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("$5.00"));
}

#[test]
fn missing_owner_is_a_validation_error() {
    let dir = TempDir::new().unwrap();

    spendtrack(&dir)
        .args(["expense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [validation]"));
}

#[test]
fn owner_from_environment() {
    let dir = TempDir::new().unwrap();

    spendtrack(&dir)
        .env("SPENDTRACK_OWNER", "carol")
        .args(["expense", "add", "7", "healthcare"])
        .assert()
        .success();

    as_owner(&dir, "carol")
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalAmount\": 7.0"));
}

#[test]
fn bad_input_is_rejected() {
    let dir = TempDir::new().unwrap();

    as_owner(&dir, "alice")
        .args(["expense", "add", "0", "food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [validation]"));

    as_owner(&dir, "alice")
        .args(["expense", "add", "10", "snacks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [validation]"));

    as_owner(&dir, "alice")
        .args(["bill", "add", "Water", "20", "2025-13-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [validation]"));

    as_owner(&dir, "alice")
        .args(["report", "--month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [validation]"));
}
