use std::error::Error;

use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};

use engine::Ledger;
use migration::MigratorTrait;

#[derive(Parser, Debug)]
#[command(name = "caja_admin")]
#[command(about = "Admin utilities for Caja (one-off data maintenance)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./caja.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move daily-sale documents out of the accounting collection into
    /// their own collection. Safe to re-run; already-moved documents are
    /// not touched.
    RelocateSales {
        /// Report what would move without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Count sale documents still sitting in the accounting collection.
    Verify,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let ledger = Ledger::new(db);

    match cli.command {
        Command::RelocateSales { dry_run } => {
            let misfiled = ledger.misfiled_sales_count().await?;
            if dry_run {
                println!("would relocate {misfiled} sale document(s)");
                return Ok(());
            }

            println!("relocating {misfiled} sale document(s)...");
            let report = ledger.relocate_daily_sales().await?;
            println!("migrated: {}, errors: {}", report.migrated, report.errors);
            if report.errors > 0 {
                std::process::exit(1);
            }
        }
        Command::Verify => {
            let misfiled = ledger.misfiled_sales_count().await?;
            if misfiled == 0 {
                println!("clean: no sale documents in the accounting collection");
            } else {
                println!("{misfiled} sale document(s) still in the accounting collection");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
