use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use tripplanner::assembler::DayRouteAssembler;
use tripplanner::cache;
use tripplanner::cli::{Cli, Command};
use tripplanner::config::PlannerConfig;
use tripplanner::itinerary::{Itinerary, ItineraryPlanner, TripRequest};
use tripplanner::location_resolver::DatasetResolver;
use tripplanner::logging;
use tripplanner::models::{DayRoute, RoutePlan};
use tripplanner::recommendations::RecommendationSet;
use tripplanner::routing::cluster_by_proximity;
use tripplanner::{PlannerError, VERSION};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<PlannerError>() {
            Some(planner_error) => eprintln!("❌ {}\n   {e:#}", planner_error.user_message()),
            None => eprintln!("❌ {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = PlannerConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("tripplanner {} starting", VERSION);

    match cli.command {
        Command::Plan {
            input,
            destination,
            start_date,
            days,
            mode,
            offline,
            json,
        } => {
            if !offline && config.cache.enabled {
                let location = config.cache.resolved_location();
                if let Err(e) = cache::init(&location) {
                    warn!("{}", PlannerError::cache(format!("{e:#}")));
                }
            }

            let recommendations = RecommendationSet::load(&input)?;
            let planner = ItineraryPlanner::from_config(&config, offline)?;
            let request = TripRequest {
                destination,
                start_date,
                days,
                mode: mode.unwrap_or(config.routing.travel_mode),
            };
            let itinerary = planner
                .plan(&request, &recommendations)
                .await
                .with_context(|| format!("Failed to plan trip to {}", request.destination))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&itinerary)?);
            } else {
                print_itinerary(&itinerary);
            }
        }
        Command::Route { input, json } => {
            let recommendations = RecommendationSet::load(&input)?;
            let resolver = DatasetResolver::from_config(&config.resolver);
            let plan = DayRouteAssembler::new(&resolver, config.routing.travel_mode)
                .assemble(&recommendations)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_route_plan(&plan);
            }
        }
        Command::Cluster { input, radius } => {
            let recommendations = RecommendationSet::load(&input)?;
            let resolver = DatasetResolver::from_config(&config.resolver);
            let assembler = DayRouteAssembler::new(&resolver, config.routing.travel_mode);
            let mut venues = assembler.extract_locations(&recommendations)?;
            venues.extend(assembler.extract_unscheduled(&recommendations)?);

            let radius = radius.unwrap_or(config.routing.cluster_max_distance_km);
            let clusters = cluster_by_proximity(&venues, radius)?;
            println!(
                "📍 {} venues in {} clusters (radius {:.1} km)",
                venues.len(),
                clusters.len(),
                radius
            );
            for (i, cluster) in clusters.iter().enumerate() {
                let names: Vec<&str> = cluster.members.iter().map(|v| v.name.as_str()).collect();
                println!("  {}. [{}] {}", i + 1, cluster.len(), names.join(", "));
            }
        }
    }

    Ok(())
}

fn print_day_route(route: &DayRoute) {
    if route.is_empty() {
        println!("   Nothing scheduled");
        return;
    }
    for (i, stop) in route.stops.iter().enumerate() {
        if i + 1 < route.stops.len() {
            println!(
                "   {}. {} → {:.2} km",
                i + 1,
                stop.venue,
                stop.distance_to_next_km
            );
        } else {
            println!("   {}. {}", i + 1, stop.venue);
        }
    }
    println!(
        "   Total: {:.2} km, ~{:.1} min travel{}",
        route.total_distance_km,
        route.estimated_time_minutes,
        if route.fully_measured() { " (live)" } else { "" }
    );
}

fn print_route_plan(plan: &RoutePlan) {
    for route in plan.days.values() {
        println!("\n📅 {}", route.label());
        print_day_route(route);
    }
    let unlocated: Vec<&str> = plan.unlocated().map(|v| v.name.as_str()).collect();
    if !unlocated.is_empty() {
        println!("\n⚠️  Not on the map: {}", unlocated.join(", "));
    }
    println!("\nTotal distance: {:.2} km", plan.total_distance_km());
}

fn print_itinerary(itinerary: &Itinerary) {
    println!(
        "🗺️  {} ({} to {})",
        itinerary.destination, itinerary.start_date, itinerary.end_date
    );
    for day in &itinerary.days {
        println!(
            "\n📅 Day {} - {}: {}, {}{}",
            day.day,
            day.date,
            day.weather.description,
            day.weather.format_temperature(),
            if day.weather.forecast { "" } else { " (no forecast)" }
        );
        print_day_route(&day.route);
        for note in &day.notes {
            println!("   📝 {note}");
        }
    }
    println!(
        "\nTotal: {:.2} km, ~{:.0} min travel",
        itinerary.total_distance_km(),
        itinerary.total_travel_minutes()
    );
}
