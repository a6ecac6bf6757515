//! Command line interface for the tripplanner binary

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::routing::TravelMode;

#[derive(Parser, Debug)]
#[command(
    name = "tripplanner",
    version,
    about = "Order recommended venues into efficient day-by-day routes"
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a dated itinerary with routes, travel times and weather notes
    Plan {
        /// Recommendations JSON file
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        destination: String,
        /// First trip day, YYYY-MM-DD
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=30))]
        days: u32,
        /// driving, walking, transit or cycling; defaults to the configured mode
        #[arg(long)]
        mode: Option<TravelMode>,
        /// Do not call any network service
        #[arg(long)]
        offline: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Order each day's venues and print the map-ready route plan
    Route {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Group venues by proximity
    Cluster {
        #[arg(long)]
        input: PathBuf,
        /// Maximum distance to a cluster seed; defaults to the configured radius
        #[arg(long)]
        radius: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_command_parses() {
        let cli = Cli::parse_from([
            "tripplanner",
            "plan",
            "--input",
            "recs.json",
            "--destination",
            "Vancouver",
            "--start-date",
            "2025-07-01",
            "--days",
            "2",
            "--mode",
            "walking",
            "--offline",
        ]);
        match cli.command {
            Command::Plan {
                days,
                mode,
                offline,
                start_date,
                json,
                ..
            } => {
                assert_eq!(days, 2);
                assert_eq!(mode, Some(TravelMode::Walking));
                assert!(offline);
                assert!(!json);
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tripplanner", "route", "--input", "r.json", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Route { json: false, .. }));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(
            Cli::try_parse_from([
                "tripplanner",
                "plan",
                "--input",
                "r.json",
                "--destination",
                "X",
                "--start-date",
                "01/07/2025",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "tripplanner",
                "plan",
                "--input",
                "r.json",
                "--destination",
                "X",
                "--start-date",
                "2025-07-01",
                "--days",
                "0",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_unknown_mode_falls_back_to_driving() {
        let cli = Cli::parse_from([
            "tripplanner",
            "plan",
            "--input",
            "r.json",
            "--destination",
            "X",
            "--start-date",
            "2025-07-01",
            "--mode",
            "teleport",
        ]);
        assert!(matches!(
            cli.command,
            Command::Plan {
                mode: Some(TravelMode::Driving),
                ..
            }
        ));
    }
}
