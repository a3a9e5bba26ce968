use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn write_model(dir: &Path, recovery: f64, seed: Option<u64>) -> std::path::PathBuf {
    let mut edges = String::from("v1,v2\n");
    for i in 0..20 {
        edges.push_str(&format!("{},{}\n", i, (i + 1) % 20));
    }
    fs::write(dir.join("ring.csv"), edges).unwrap();

    let seed = seed.map_or(String::new(), |seed| format!("\"random_seed\": {seed},"));
    let config = format!(
        r#"{{
            "ticks": 10,
            {seed}
            "parameters": {{
                "Prob hospitalization": 0.5,
                "Prob recovery": {recovery},
                "Discharge infected": 0.1
            }},
            "pathogen": {{"name": "MRSA", "prob_infecting": 0.1}},
            "prevalence": 0.1,
            "network": {{"population": 20, "edge_list": "ring.csv"}}
        }}"#
    );
    let path = dir.join("config.json");
    fs::write(&path, config).unwrap();
    path
}

fn run(args: &[&str]) -> std::process::Output {
    Command::cargo_bin("hospital-model")
        .unwrap()
        .args(args)
        .output()
        .unwrap()
}

fn distribution_total(stdout: &str) -> usize {
    let (_, distribution) = stdout
        .split_once("Location-wise distribution of states:")
        .unwrap();
    distribution
        .lines()
        .filter_map(|line| line.trim().split_once(": "))
        .filter_map(|(_, count)| count.parse::<usize>().ok())
        .sum()
}

#[test]
fn prints_overview_events_and_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_model(dir.path(), 0.1, None);
    let output = run(&["--config", config.to_str().unwrap(), "--random-seed", "3"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Model parameters:\n  Prob hospitalization: 0.5\n"));
    assert!(stdout.contains("Pathogen MRSA"));
    assert!(stdout.contains("20 people, 20 contacts"));
    assert!(stdout.contains("10 ticks completed"));
    assert!(stdout.contains("Infection Events:"));
    for state in ["Susceptible", "Infected", "Infected_Hospitalized"] {
        assert!(stdout.contains(&format!("  {state}:\n")));
    }
    assert_eq!(distribution_total(&stdout), 20);
}

#[test]
fn same_seed_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_model(dir.path(), 0.1, None);
    let config = config.to_str().unwrap();
    let first = run(&["--config", config, "--random-seed", "11", "--ticks", "25"]);
    let second = run(&["--config", config, "--random-seed", "11", "--ticks", "25"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn configured_seed_matches_command_line_seed() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_model(dir.path(), 0.1, Some(11));
    let config = config.to_str().unwrap();
    let from_file = run(&["--config", config, "--ticks", "25"]);
    let from_flag = run(&["--config", config, "--random-seed", "11", "--ticks", "25"]);
    assert!(from_file.status.success());
    assert_eq!(from_file.stdout, from_flag.stdout);
}

#[test]
fn default_configuration_is_found_from_any_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::cargo_bin("hospital-model")
        .unwrap()
        .current_dir(dir.path())
        .args(["--ticks", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1000 people, 2000 contacts"));
    assert_eq!(distribution_total(&stdout), 1000);
}

#[test]
fn invalid_configuration_fails_without_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_model(dir.path(), 0.7, None);
    let output = run(&["--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("Location-wise distribution"));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Sampling error"));
}

#[test]
fn missing_configuration_file_fails() {
    let output = run(&["--config", "/nonexistent/config.json"]);
    assert!(!output.status.success());
}
