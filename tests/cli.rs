mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{GSC_FIXTURE, TestWorkspace, fixture_path};

fn bin() -> Command {
    Command::cargo_bin("gsc-ctr-stats").expect("binary exists")
}

#[test]
fn analyze_writes_csv_summary_to_stdout() {
    let input = fixture_path(GSC_FIXTURE);
    bin()
        .args([
            "analyze",
            "-i",
            input.to_str().unwrap(),
            "--max-position",
            "5",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(
            contains("Position,Sum Clicks,Sum Impressions,Avg CTR,Min CTR,Max CTR,Max CTR KW")
                .and(contains("1,295,2750,11%,9%,12%,seo tips"))
                .and(contains("4,25,1150,2%,1%,2%,position tracking"))
                .and(contains("long tail query").not()),
        );
}

#[test]
fn analyze_default_output_is_a_text_table() {
    let input = fixture_path(GSC_FIXTURE);
    bin()
        .args(["analyze", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Max CTR KW").and(contains("search console")))
        .stdout(contains("long tail query").not());
}

#[test]
fn analyze_writes_json_file_by_extension() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("stats.json");
    let input = fixture_path(GSC_FIXTURE);
    bin()
        .args([
            "analyze",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-p",
            "2",
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read json");
    let rows: serde_json::Value = serde_json::from_str(&contents).expect("parse json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["Position"], 2);
    assert_eq!(rows[1]["Avg CTR"], "7%");
    assert_eq!(rows[1]["Max CTR KW"], "search console");
}

#[test]
fn analyze_reads_settings_from_config_file() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "queries.csv",
        "Query;Clicks;Impressions;CTR;Position\nalpha;5;100;0.05;1.4\nbeta;1;100;0.01;2.2\n",
    );
    let config = workspace.write("settings.yml", "max_position: 1\ndelimiter: \";\"\nformat: csv\n");
    bin()
        .args([
            "analyze",
            "-i",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--output-delimiter",
            ",",
        ])
        .assert()
        .success()
        .stdout(contains("1,5,100,5%,5%,5%,alpha").and(contains("beta").not()));
}

#[test]
fn analyze_reports_missing_columns() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "queries.csv",
        "Query,Clicks,CTR,Position\nalpha,5,5%,1.4\n",
    );
    bin()
        .args(["analyze", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Missing required columns: Impressions"));
}

#[test]
fn analyze_reports_empty_result() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "queries.csv",
        "Query,Clicks,Impressions,CTR,Position\nalpha,5,100,5%,8.4\n",
    );
    bin()
        .args(["analyze", "-i", input.to_str().unwrap(), "-p", "3"])
        .assert()
        .failure()
        .stderr(contains("No results were generated"));
}

#[test]
fn analyze_rejects_out_of_range_max_position() {
    let input = fixture_path(GSC_FIXTURE);
    bin()
        .args(["analyze", "-i", input.to_str().unwrap(), "-p", "21"])
        .assert()
        .failure()
        .stderr(contains("Maximum position must be between 1 and 20"));
}

#[test]
fn analyze_reads_stdin() {
    bin()
        .args(["analyze", "-i", "-", "-p", "1", "--format", "csv"])
        .write_stdin("keyword,clicks,impressions,CTR,pos\nbeta,2,40,5%,1.0\n")
        .assert()
        .success()
        .stdout(contains("1,2,40,5%,5%,5%,beta"));
}

#[test]
fn columns_without_input_lists_aliases() {
    bin()
        .args(["columns"])
        .assert()
        .success()
        .stdout(contains("Top queries").and(contains("Avg.Position")));
}

#[test]
fn columns_with_input_shows_mapping() {
    let input = fixture_path(GSC_FIXTURE);
    bin()
        .args(["columns", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Top queries").and(contains("<missing>")));
}

#[test]
fn sample_output_round_trips_through_analyze() {
    let workspace = TestWorkspace::new();
    let sample = workspace.path().join("sample.csv");
    bin()
        .args(["sample", "-o", sample.to_str().unwrap()])
        .assert()
        .success();
    bin()
        .args([
            "analyze",
            "-i",
            sample.to_str().unwrap(),
            "-p",
            "5",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(contains("3,60,1350,4%,3%,5%,seo reporting"));
}
