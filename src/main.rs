use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use flyrely_lib::{
    catalog,
    history::{self, FlightCard, HistoryPeriod, HistoryStats},
    FlightTracker,
};

#[derive(Parser, Debug)]
#[command(version, about = "Track flights and their delay risk", long_about = None)]
struct Cli {
    /// Directory holding the database and config.json.
    #[arg(long, env = "FLYRELY_DATA_DIR", default_value = "./flyrely-data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flights that have not departed, soonest first.
    Upcoming,
    /// Completed flights by month, with on-time stats.
    History {
        /// all, week, month or 3months.
        #[arg(long, default_value = "all")]
        period: HistoryPeriod,
    },
    /// Delete completed flights.
    ClearHistory,
    /// Stop tracking a flight.
    Remove { id: String },
    /// Search the airport catalog by code, city or name.
    Airports { query: String },
    /// Search the airline catalog by code or name.
    Airlines { query: String },
    /// Suggested origin/destination pairs.
    Routes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryView {
    stats: HistoryStats,
    on_time_percent: Option<u32>,
    months: Vec<MonthView>,
}

#[derive(Serialize)]
struct MonthView {
    month: String,
    flights: Vec<FlightCard>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cards(flights: &[flyrely_lib::models::Flight]) -> Vec<FlightCard> {
    flights.iter().map(FlightCard::from_flight).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    flyrely_lib::init_logging();
    let cli = Cli::parse();

    // Catalog searches never touch the data directory.
    let tracker = match &cli.command {
        Command::Airports { query } => return print_json(&catalog::search_airports(query)),
        Command::Airlines { query } => return print_json(&catalog::search_airlines(query)),
        Command::Routes => return print_json(catalog::POPULAR_ROUTES),
        _ => FlightTracker::open(&cli.data_dir).await?,
    };
    let store = tracker.store();

    match cli.command {
        Command::Upcoming => print_json(&cards(&store.get_upcoming().await)),
        Command::History { period } => {
            let completed = period.filter(store.get_completed().await, Utc::now());
            let stats = HistoryStats::from_flights(&completed);
            let months = history::group_by_month(&completed)
                .into_iter()
                .map(|(month, flights)| MonthView {
                    month,
                    flights: cards(&flights),
                })
                .collect();
            print_json(&HistoryView {
                stats,
                on_time_percent: stats.on_time_percent(),
                months,
            })
        }
        Command::ClearHistory => {
            let removed = store.clear_completed().await?;
            info!("Cleared {removed} completed flight(s)");
            Ok(())
        }
        Command::Remove { id } => store.remove(&id).await,
        Command::Airports { .. } | Command::Airlines { .. } | Command::Routes => Ok(()),
    }
}
