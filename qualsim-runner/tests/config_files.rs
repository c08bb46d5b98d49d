//! Scenario files on disk: load, validate, run.

use std::io::Write;

use qualsim_runner::{
    load_pool, run_monte_carlo, ConfigError, LoadError, ScenarioFile,
};
use tempfile::NamedTempFile;

const SCENARIOS: &str = r#"
[monte_carlo]
seasons = 8
master_seed = 7
threads = 1
thresholds = [2750.0]

[events.quick_cup]
format = "knockout"
capacity = 16

[[scenarios]]
name = "cup then rating"
target_candidates = 4

[[scenarios.slots]]
event = "quick_cup"
max_spots = 2

[[scenarios.slots]]
event = "rating"
max_spots = 2
strategy = { type = "rating", guaranteed_spots = 1 }

[[scenarios]]
name = "rating only"
target_candidates = 4

[[scenarios.slots]]
event = "rating"
max_spots = 4
strategy = { type = "rating" }
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn pool_json() -> String {
    let records: Vec<String> = (1..=24)
        .map(|i| format!(r#"{{"id": {i}, "name": "GM {i}", "elo": {}}}"#, 2800 - i * 6))
        .collect();
    format!("[{}]", records.join(","))
}

#[test]
fn scenario_file_round_trip_through_disk() {
    let scenarios = write_temp(SCENARIOS);
    let players = write_temp(&pool_json());

    let file = ScenarioFile::load(scenarios.path()).unwrap();
    let pool = load_pool(players.path()).unwrap();
    let configs = file.validate().unwrap();
    assert_eq!(configs.len(), 2);

    for config in &configs {
        let summary = run_monte_carlo(&pool, config, &file.monte_carlo).unwrap();
        assert_eq!(summary.total_seasons, 8);
        assert_eq!(summary.thresholds.len(), 1);
        assert!(summary.qualification.iter().all(|o| o.probability <= 1.0));
    }

    let rating_only = run_monte_carlo(&pool, &configs[1], &file.monte_carlo).unwrap();
    assert_eq!(rating_only.top_k_hit_rate, 1.0);
}

#[test]
fn config_errors_surface_before_running() {
    let broken = SCENARIOS.replace("max_spots = 2\n\n[[scenarios.slots]]\nevent = \"rating\"", "max_spots = -2\n\n[[scenarios.slots]]\nevent = \"rating\"");
    let file = ScenarioFile::from_toml_str(&broken).unwrap();
    assert!(matches!(
        file.validate(),
        Err(ConfigError::NegativeSpots { slot: 0, value: -2, .. })
    ));

    let unknown = SCENARIOS.replace("event = \"quick_cup\"", "event = \"candidates\"");
    let file = ScenarioFile::from_toml_str(&unknown).unwrap();
    assert!(matches!(file.validate(), Err(ConfigError::UnknownEvent { .. })));

    let zero_target = SCENARIOS.replace("target_candidates = 4", "target_candidates = 0");
    let file = ScenarioFile::from_toml_str(&zero_target).unwrap();
    assert!(matches!(file.validate(), Err(ConfigError::NonPositiveTarget { .. })));
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(ScenarioFile::load(&missing), Err(ConfigError::Io { .. })));
    assert!(matches!(load_pool(&missing), Err(LoadError::Io { .. })));
}
