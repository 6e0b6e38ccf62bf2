use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn doughflow_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("doughflow"))
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn table_row<'a>(out: &'a str, date: &str) -> &'a str {
    out.lines()
        .find(|l| l.starts_with(&format!("| {date}")))
        .unwrap_or_else(|| panic!("no row for {date} in:\n{out}"))
}

#[test]
fn logged_entries_are_listed_with_signs() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &["bill", "Rent", "1200", "--date", "2024-03-01", "--frequency", "monthly"],
    );
    run_ok(
        &home,
        &["paycheck", "Salary", "2500.5", "--date", "2024-03-08", "-f", "bi-weekly"],
    );

    let out = run_ok_out(&home, &["list"]);
    assert!(out.contains("\tbill\tRent\t-1200.00\t2024-03-01\tmonthly"));
    assert!(out.contains("\tpaycheck\tSalary\t+2500.50\t2024-03-08\tbi-weekly"));
}

#[test]
fn list_can_be_filtered_by_entry_type() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["bill", "Rent", "1200", "--date", "2024-03-01"]);
    run_ok(&home, &["paycheck", "Salary", "2500", "--date", "2024-03-08"]);

    let bills = run_ok_out(&home, &["list", "--kind", "bill"]);
    assert!(bills.contains("\tRent\t"));
    assert!(!bills.contains("Salary"));

    let paychecks = run_ok_out(&home, &["list", "--kind", "paycheck"]);
    assert!(paychecks.contains("\tSalary\t"));
    assert!(!paychecks.contains("Rent"));

    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(["list", "--kind", "loan"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown entry type"));
}

#[test]
fn list_filter_with_no_matches_says_so() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["bill", "Rent", "1200", "--date", "2024-03-01"]);
    assert!(run_ok_out(&home, &["list", "--kind", "paycheck"]).contains("(no entries)"));
}

#[test]
fn monthly_forecast_shows_every_day_of_the_selected_month() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["paycheck", "Gift", "500", "--date", "2024-03-10", "--frequency", "one-time"],
    );

    let out = run_ok_out(
        &home,
        &["forecast", "--date", "2024-03-15", "--interval", "monthly"],
    );

    assert!(out.contains("Window 2024-03-01 to 2024-03-31 (monthly, reference 2024-03-15)"));
    let before = table_row(&out, "2024-03-09");
    assert!(before.contains(" 0.00 ") && before.contains("surplus"));
    let on = table_row(&out, "2024-03-10");
    assert!(on.contains(" 500.00 "));
    let day_rows = out.lines().filter(|l| l.starts_with("| 2024-03-")).count();
    assert_eq!(day_rows, 31);
    assert!(out.contains("Occurrences: 1, closing reserve: 500.00"));
}

#[test]
fn weekly_forecast_with_breakdown_reports_flows_per_week() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["bill", "Food", "100", "--date", "2024-01-01", "--frequency", "weekly"],
    );

    let out = run_ok_out(
        &home,
        &[
            "forecast",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--interval",
            "weekly",
            "--breakdown",
            "--date",
            "2024-01-01",
        ],
    );

    let first = table_row(&out, "2024-01-01");
    assert!(first.contains("-100.00") && first.contains("deficit"));
    let last = table_row(&out, "2024-01-29");
    assert!(last.contains("-500.00"));
    assert!(last.contains(" 100.00 "));
    assert!(out.contains("Occurrences: 5, closing reserve: -500.00"));
}

#[test]
fn day_breakdown_lists_contributing_entries() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(
        &home,
        &["paycheck", "Salary", "1000", "--date", "2024-05-01", "-f", "monthly"],
    );
    run_ok(
        &home,
        &["bill", "Car", "250", "--date", "2024-05-01", "-f", "one-time"],
    );
    run_ok(
        &home,
        &["bill", "Food", "40", "--date", "2024-05-02", "-f", "one-time"],
    );

    let out = run_ok_out(&home, &["day", "2024-05-02"]);
    assert!(out.contains("Previous reserve: 750.00"));
    assert!(out.contains("- Expenditures:   40.00"));
    assert!(out.contains("= Final reserve:  710.00"));
    assert!(out.contains("  - Food (40.00)"));
    assert!(out.contains("Acquisitions:\n  (none)"));
}

#[test]
fn rm_deletes_by_id_and_rejects_unknown_ids() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["bill", "Gym", "30", "--date", "2024-01-01"]);

    let listed = run_ok_out(&home, &["list"]);
    let id = listed
        .lines()
        .next()
        .and_then(|l| l.split('\t').next())
        .expect("entry id")
        .to_string();

    let out = run_ok_out(&home, &["rm", &id]);
    assert!(out.contains("Removed bill 'Gym'."));
    assert!(run_ok_out(&home, &["list"]).contains("(no entries)"));

    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(["rm", &id]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No such entry"));
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(["bill", "Rent", "12x"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid decimal for amount"));

    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(["bill", "Rent", "10", "--frequency", "yearly"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown frequency"));

    let mut cmd = doughflow_cmd();
    cmd.env("DOUGHFLOW_HOME", home.path());
    cmd.args(["bill", "  ", "10"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));

    assert!(run_ok_out(&home, &["list"]).contains("(no entries)"));
}

#[test]
fn config_default_interval_drives_forecast() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(&home, &["config", "show"]);
    assert!(out.contains("default_interval\tmonthly"));
    assert!(out.contains("storage_key\tfinancialEntries"));

    run_ok(&home, &["config", "set-interval", "annually"]);
    assert!(run_ok_out(&home, &["config", "show"]).contains("default_interval\tannually"));

    let out = run_ok_out(&home, &["forecast", "--date", "2024-06-01"]);
    assert!(out.contains("Window 2024-01-01 to 2024-12-31 (annually, reference 2024-06-01)"));
    assert!(table_row(&out, "2024-01-01").contains("| 2024 "));
}
