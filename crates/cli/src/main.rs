use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Catalog, CustomerId, load_retail_csv};
use engine::{Recommendation, Snapshot};
use std::path::PathBuf;
use std::time::Instant;

/// BasketRecs - item-based collaborative filtering for retail baskets
#[derive(Parser)]
#[command(name = "basket-recs")]
#[command(about = "Recommend items from purchase co-occurrence", long_about = None)]
struct Cli {
    /// Path to the online-retail CSV export
    #[arg(short, long, default_value = "data/online_retail.csv")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get item recommendations for a customer
    Recommend {
        /// Customer ID to recommend for
        #[arg(long)]
        customer_id: CustomerId,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Emit the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a customer's purchase history
    Customer {
        /// Customer ID to display
        #[arg(long)]
        customer_id: CustomerId,
    },

    /// Show snapshot statistics (matrix sizes, density)
    Stats,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load and clean the export, then build the snapshot
    println!("Loading retail export from {}...", cli.data.display());
    let start = Instant::now();
    let dataset = load_retail_csv(&cli.data).context("Failed to load retail export")?;
    let snapshot = Snapshot::build(&dataset.events);
    println!(
        "{} Built snapshot from {} events in {:?}",
        "✓".green(),
        dataset.events.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            customer_id,
            top_n,
            json,
        } => handle_recommend(&snapshot, &dataset.catalog, customer_id, top_n, json)?,
        Commands::Customer { customer_id } => {
            handle_customer(&snapshot, &dataset.catalog, customer_id)?
        }
        Commands::Stats => handle_stats(&snapshot),
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    snapshot: &Snapshot,
    catalog: &Catalog,
    customer_id: CustomerId,
    top_n: usize,
    json: bool,
) -> Result<()> {
    let recommendations = snapshot
        .recommend(customer_id, top_n)
        .with_context(|| format!("Could not recommend for customer {customer_id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    print_history(snapshot, catalog, customer_id);
    println!();
    print_recommendations(&recommendations, catalog);

    if recommendations.is_empty() {
        println!(
            "{}",
            "No candidates: this customer's items are not co-purchased with anything.".yellow()
        );
    }
    Ok(())
}

/// Handle the 'customer' command
fn handle_customer(snapshot: &Snapshot, catalog: &Catalog, customer_id: CustomerId) -> Result<()> {
    if !snapshot.interactions().contains_customer(customer_id) {
        anyhow::bail!("Customer {customer_id} has no purchase history in this snapshot");
    }
    print_history(snapshot, catalog, customer_id);
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(snapshot: &Snapshot) {
    let matrix = snapshot.interactions();
    let customers = matrix.num_customers();
    let items = matrix.num_items();
    let entries = matrix.num_entries();
    let density = if customers * items > 0 {
        entries as f64 / (customers as f64 * items as f64)
    } else {
        0.0
    };

    println!("{}", "Snapshot statistics:".bold().blue());
    println!("{}Customers: {}", "• ".green(), customers);
    println!("{}Items: {}", "• ".green(), items);
    println!("{}Interaction entries: {}", "• ".green(), entries);
    println!("{}Density: {:.4}%", "• ".cyan(), density * 100.0);
    println!(
        "{}Similarity matrix: {} x {}",
        "• ".cyan(),
        snapshot.similarity().num_items(),
        snapshot.similarity().num_items()
    );
}

/// Print a customer's purchased items with catalog descriptions
fn print_history(snapshot: &Snapshot, catalog: &Catalog, customer_id: CustomerId) {
    let purchased = snapshot
        .interactions()
        .purchased_items(customer_id)
        .unwrap_or_default();

    println!(
        "{}",
        format!("Purchase history for customer {customer_id}:").bold().blue()
    );
    for item_id in purchased {
        println!(
            "  - {} {}",
            item_id,
            catalog.describe(item_id).unwrap_or("(no description)")
        );
    }
}

/// Print ranked recommendations with catalog descriptions
fn print_recommendations(recommendations: &[Recommendation], catalog: &Catalog) {
    println!("{}", "Recommendations:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} {} - score {:.3}",
            (rank + 1).to_string().green(),
            rec.item_id,
            catalog.describe(&rec.item_id).unwrap_or("(no description)"),
            rec.score
        );
    }
}
