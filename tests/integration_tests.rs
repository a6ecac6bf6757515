//! Integration tests for the tripplanner library and CLI

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::NamedTempFile;

use tripplanner::geo;
use tripplanner::location_resolver::DatasetResolver;
use tripplanner::routing::LegTimer;
use tripplanner::{
    DayRoute, DayRouteAssembler, ItineraryPlanner, RecommendationSet, TravelMode, TripRequest,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[fixture]
fn recommendations() -> RecommendationSet {
    RecommendationSet::load(fixture_path("vancouver.json")).unwrap()
}

#[fixture]
fn resolver() -> DatasetResolver {
    DatasetResolver::new(fixture_path("dataset"), 5)
}

/// Config that keeps the binary offline and points it at the fixture dataset
#[fixture]
fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(
        file,
        "[resolver]\ndataset_dir = '{}'\n\n[traffic]\nenabled = false\n\n[weather]\nenabled = false\n\n[cache]\nenabled = false\n",
        fixture_path("dataset").display()
    )
    .unwrap();
    file
}

fn tripplanner(config: &NamedTempFile, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tripplanner"))
        .arg("--config")
        .arg(config.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute tripplanner")
}

/// Every next stop is the closest of the stops not yet visited
fn assert_nearest_neighbor_order(route: &DayRoute) {
    let coordinates: Vec<_> = route
        .stops
        .iter()
        .map(|s| s.venue.coordinate.unwrap())
        .collect();
    for i in 0..coordinates.len().saturating_sub(1) {
        let chosen = geo::distance(&coordinates[i], &coordinates[i + 1]).unwrap();
        for later in &coordinates[i + 2..] {
            assert!(chosen <= geo::distance(&coordinates[i], later).unwrap());
        }
    }
}

#[rstest]
fn test_assembled_plan(recommendations: RecommendationSet, resolver: DatasetResolver) {
    let plan = DayRouteAssembler::new(&resolver, TravelMode::Driving)
        .assemble(&recommendations)
        .unwrap();

    assert_eq!(plan.venues.len(), 11);
    assert_eq!(plan.days.len(), 2);

    let day1: Vec<&str> = plan.day(1).unwrap().venue_names().collect();
    assert_eq!(day1.len(), 6);
    assert_eq!(day1[0], "Fairmont Pacific Rim");
    assert!(day1.contains(&"Sylvia Hotel"));

    let unlocated: Vec<&str> = plan.unlocated().map(|v| v.name.as_str()).collect();
    assert_eq!(unlocated, ["Nowhere Inn", "Mystery Diner"]);

    for route in plan.days.values() {
        let sum: f64 = route.stops.iter().map(|s| s.distance_to_next_km).sum();
        assert_eq!(route.total_distance_km, sum);
        assert_eq!(route.stops.last().unwrap().distance_to_next_km, 0.0);
        assert_nearest_neighbor_order(route);
    }
}

#[rstest]
fn test_plan_is_stable(recommendations: RecommendationSet, resolver: DatasetResolver) {
    let assembler = DayRouteAssembler::new(&resolver, TravelMode::Walking);
    let first = assembler.assemble(&recommendations).unwrap();
    let second = assembler.assemble(&recommendations).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[rstest]
#[tokio::test]
async fn test_offline_itinerary(recommendations: RecommendationSet, resolver: DatasetResolver) {
    let planner = ItineraryPlanner::new(Box::new(resolver), LegTimer::offline(), None, 5.0);
    let request = TripRequest {
        destination: "Vancouver".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        days: 3,
        mode: TravelMode::Driving,
    };

    let itinerary = planner.plan(&request, &recommendations).await.unwrap();

    assert_eq!(itinerary.days.len(), 3);
    assert_eq!(itinerary.end_date, NaiveDate::from_ymd_opt(2025, 7, 3).unwrap());
    let day3: Vec<&str> = itinerary.days[2].route.venue_names().collect();
    assert_eq!(day3.len(), 2);
    assert!(day3.contains(&"Capilano Suspension Bridge"));
    assert!(day3.contains(&"Lynn Canyon"));
    assert!(itinerary.days[0].notes.iter().any(|n| n.contains("Nowhere Inn")));
    assert!(itinerary.days[1].notes.iter().any(|n| n.contains("Mystery Diner")));
    for day in &itinerary.days {
        assert_nearest_neighbor_order(&day.route);
    }
}

#[rstest]
fn test_cli_route_json(config_file: NamedTempFile) {
    let input = fixture_path("vancouver.json");
    let output = tripplanner(&config_file, &["route", "--input", input.to_str().unwrap(), "--json"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["venues"].as_array().unwrap().len(), 11);
    let routes = json["routes"].as_object().unwrap();
    assert!(routes.contains_key("Day 1"));
    assert!(routes.contains_key("Day 2"));
    let day2 = &routes["Day 2"];
    assert_eq!(day2["locations"].as_array().unwrap().len(), 3);
    assert!(day2["total_distance_km"].as_f64().unwrap() > 0.0);
    assert_eq!(day2["locations"][0]["type"], "attraction");
}

#[rstest]
fn test_cli_plan_offline(config_file: NamedTempFile) {
    let input = fixture_path("vancouver.json");
    let output = tripplanner(
        &config_file,
        &[
            "plan",
            "--input",
            input.to_str().unwrap(),
            "--destination",
            "Vancouver",
            "--start-date",
            "2025-07-01",
            "--days",
            "3",
            "--mode",
            "walking",
            "--offline",
            "--json",
        ],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["destination"], "Vancouver");
    assert_eq!(json["end_date"], "2025-07-03");
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["notes"][0], "Great weather for outdoor activities!");
    assert_eq!(days[1]["weather"]["forecast"], false);
}

#[rstest]
fn test_cli_plan_text(config_file: NamedTempFile) {
    let input = fixture_path("vancouver.json");
    let output = tripplanner(
        &config_file,
        &[
            "plan",
            "--input",
            input.to_str().unwrap(),
            "--destination",
            "Vancouver",
            "--start-date",
            "2025-07-01",
            "--days",
            "2",
            "--offline",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Day 1 - 2025-07-01"));
    assert!(stdout.contains("Day 2 - 2025-07-02"));
    assert!(stdout.contains("Stanley Park"));
}

#[rstest]
fn test_cli_cluster(config_file: NamedTempFile) {
    let input = fixture_path("vancouver.json");
    let output = tripplanner(
        &config_file,
        &["cluster", "--input", input.to_str().unwrap(), "--radius", "2.5"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("13 venues in"));
    assert!(stdout.contains("Lynn Canyon"));
}

#[rstest]
fn test_cli_missing_input(config_file: NamedTempFile) {
    let output = tripplanner(&config_file, &["route", "--input", "/no/such/file.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read recommendations"));
}

#[rstest]
fn test_cli_negative_radius_rejected(config_file: NamedTempFile) {
    let input = fixture_path("vancouver.json");
    let output = tripplanner(
        &config_file,
        &["cluster", "--input", input.to_str().unwrap(), "--radius=-1"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_tripplanner"))
        .arg("--help")
        .output()
        .expect("Failed to execute tripplanner");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tripplanner"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("route"));
    assert!(stdout.contains("cluster"));
}
