#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line toolchain for hardhat housing.
//!
//! ```text
//! hardhat migrate
//! hardhat seed [--file seed.toml]
//! hardhat rank <hubs.json> [--budget-min 600] [--budget-max 1000] [--commute-max 45]
//! hardhat scarcity --listings-14d 3 [--avg-response-hours 6.5]
//! hardhat plan --jobsite taylor-fab [--budget-min 600] [--budget-max 1000]
//! hardhat serve
//! ```
//!
//! Running `hardhat` with no subcommand opens an interactive menu.

mod menu;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hardhat_database::seed::{DEMO_SEED, SeedStats, apply_seed, parse_seed};
use hardhat_database::{db, run_migrations};
use hardhat_hub_models::{FilterCriteria, HubMetrics, JobsiteMetrics, RankedHub, RoomType, Shift};
use hardhat_planner::DEFAULT_COMMUTE_MAX_MINUTES;
use hardhat_server::store::PgHousingStore;
use hardhat_server_models::PlanMoveParams;

#[derive(Parser)]
#[command(
    name = "hardhat",
    about = "Housing near job sites: migrations, seeding, hub ranking, and the API server"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Load job sites, hubs, and listings from a TOML seed file
    Seed {
        /// Seed file; the embedded demo data is used when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Rank hub metrics from a JSON file without a database
    Rank {
        /// JSON array of hub metrics
        hubs: PathBuf,
        #[arg(long)]
        budget_min: Option<f64>,
        #[arg(long)]
        budget_max: Option<f64>,
        /// Commute ceiling in minutes
        #[arg(long, default_value_t = DEFAULT_COMMUTE_MAX_MINUTES)]
        commute_max: i32,
    },
    /// Classify a job site's 14-day listing volume
    Scarcity {
        #[arg(long)]
        listings_14d: u32,
        #[arg(long)]
        avg_response_hours: Option<f64>,
    },
    /// Plan a move against the database and print the JSON response
    Plan {
        /// Job site slug
        #[arg(long)]
        jobsite: String,
        #[arg(long)]
        budget_min: Option<f64>,
        #[arg(long)]
        budget_max: Option<f64>,
        /// Commute ceiling in minutes
        #[arg(long)]
        commute_max: Option<i32>,
        /// `private_room`, `shared_room`, `entire_unit`, or `rv_spot`
        #[arg(long)]
        room_type: Option<RoomType>,
        /// `day`, `night`, `swing`, `rotating`, or `any`
        #[arg(long)]
        shift: Option<Shift>,
        /// Desired move-in date (YYYY-MM-DD)
        #[arg(long)]
        move_in_date: Option<NaiveDate>,
    },
    /// Start the API server
    Serve,
}

/// Reads hub metrics from a JSON file and ranks them.
fn rank_file(
    path: &Path,
    filters: &FilterCriteria,
) -> Result<Vec<RankedHub>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let hubs: Vec<HubMetrics> = serde_json::from_str(&contents)?;
    log::info!("Ranking {} hubs from {}", hubs.len(), path.display());
    Ok(hardhat_ranking::rank_hubs(hubs, filters))
}

fn print_seed_stats(stats: &SeedStats) {
    println!(
        "Seeded {} job sites, {} hubs, {} listings, {} introductions",
        stats.jobsites, stats.hubs, stats.listings, stats.introductions
    );
}

/// Connects to the database, migrates, and loads a seed document.
async fn seed(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEMO_SEED.to_string(),
    };
    let seed = parse_seed(&contents)?;

    let db = db::connect_from_env().await?;
    run_migrations(db.as_ref()).await?;
    let stats = apply_seed(db.as_ref(), &seed).await?;
    print_seed_stats(&stats);
    Ok(())
}

async fn migrate() -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_from_env().await?;
    run_migrations(db.as_ref()).await?;
    println!("Migrations applied");
    Ok(())
}

async fn plan(params: &PlanMoveParams) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_from_env().await?;
    let store = PgHousingStore::new(Arc::from(db));
    let response = hardhat_planner::plan_move(&store, params).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Runs the API server on actix's own runtime.
async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                hardhat_server::interactive::run().await
            } else {
                hardhat_server::run_server().await
            }
        })
    })
    .await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return menu::run().await;
    };

    match command {
        Commands::Migrate => migrate().await?,
        Commands::Seed { file } => seed(file.as_deref()).await?,
        Commands::Rank {
            hubs,
            budget_min,
            budget_max,
            commute_max,
        } => {
            let filters = FilterCriteria {
                budget_min,
                budget_max,
                commute_max,
            };
            let ranked = rank_file(&hubs, &filters)?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Commands::Scarcity {
            listings_14d,
            avg_response_hours,
        } => {
            let signal = hardhat_ranking::classify_scarcity(&JobsiteMetrics {
                jobsite_id: String::new(),
                listings_14d,
                avg_response_hours,
            });
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }
        Commands::Plan {
            jobsite,
            budget_min,
            budget_max,
            commute_max,
            room_type,
            shift,
            move_in_date,
        } => {
            let params = PlanMoveParams {
                jobsite_id: None,
                jobsite_slug: Some(jobsite),
                budget_min,
                budget_max,
                commute_max,
                room_type,
                shift,
                move_in_date,
            };
            plan(&params).await?;
        }
        Commands::Serve => serve(false).await?,
    }

    Ok(())
}
