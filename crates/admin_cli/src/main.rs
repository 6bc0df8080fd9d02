use std::{error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, ExpenseFilter};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

const DEFAULT_CURRENCY: &str = "₹";

#[derive(Parser, Debug)]
#[command(name = "expenses_admin")]
#[command(about = "Admin utilities for the travel expenses database")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the xlsx report for a date range to a file.
    Export(ExportArgs),
    /// Print the expenses, newest first.
    List(RangeArgs),
    /// Print the known locations and clients.
    Options,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,
    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn parse_range(range: &RangeArgs) -> Result<ExpenseFilter, Box<dyn Error + Send + Sync>> {
    Ok(ExpenseFilter::parse(
        range.start.as_deref(),
        range.end.as_deref(),
    )?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Export(args) => {
            let filter = parse_range(&args.range)?;
            let bytes = engine.export_report(&filter, &args.currency).await?;
            tokio::fs::write(&args.out, &bytes).await?;
            println!("wrote {} ({} bytes)", args.out.display(), bytes.len());
        }
        Command::List(range) => {
            let filter = parse_range(&range)?;
            let expenses = engine.list_expenses(&filter).await?;
            for expense in &expenses {
                println!(
                    "{}  {}  {} -> {}  {}  {:.2} km x {:.2} = {:.2}",
                    expense.id,
                    expense.date,
                    expense.from_location,
                    expense.to_location,
                    expense.client_name,
                    expense.kilometers,
                    expense.rate_per_km,
                    expense.total
                );
            }
            let sum: f64 = expenses.iter().map(|e| e.total).sum();
            println!("{} expenses, total {:.2}", expenses.len(), sum);
        }
        Command::Options => {
            let options = engine.list_options().await?;
            println!("locations:");
            for location in &options.locations {
                println!("  {location}");
            }
            println!("clients:");
            for client in &options.clients {
                println!("  {client}");
            }
        }
    }

    Ok(())
}
