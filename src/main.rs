// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use car_inventory::{
    export_csv, flush_logs, import_csv, init_logging, submit_add, submit_delete, CarError,
    CarInput, CarStore, Config,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "car-inventory", version, about = "Manage the cars table of a local SQLite database")]
struct Cli {
    /// SQLite database file (default: cars.db)
    #[arg(long, global = true, env = "CARS_DB_PATH")]
    db: Option<PathBuf>,

    /// Log level spec, e.g. `info` or `car_inventory=debug`
    #[arg(long, global = true, env = "CARS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the terminal form (default)
    Ui,
    /// Print every car
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate and add a car
    Add {
        brand: String,
        model: String,
        #[arg(allow_hyphen_values = true)]
        year: String,
        #[arg(allow_hyphen_values = true)]
        price: String,
    },
    /// Delete a car by id
    Delete { id: Option<i64> },
    /// Add every row of a CSV file with a brand,model,year,price header
    Import { path: PathBuf },
    /// Write all cars as CSV (stdout when no path is given)
    Export { path: Option<PathBuf> },
}

fn main() -> ExitCode {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            log::error!("event=app_exit module=cli status=error error={:#}", err);
            eprintln!("❌ {:#}", err);
            ExitCode::FAILURE
        }
    };
    flush_logs();
    code
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let command = cli.command.unwrap_or(Command::Ui);
    let interactive = matches!(command, Command::Ui);
    init_logging(&config.log_level, &config.log_dir, !interactive)?;

    let store = CarStore::open(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;

    match command {
        Command::Ui => run_ui_mode(store),
        Command::List { json } => run_list(&store, json),
        Command::Add {
            brand,
            model,
            year,
            price,
        } => {
            let input = CarInput::new(brand, model, year, price);
            report(submit_add(&store, &input).map(|id| format!("✓ car added with id {}", id)))
        }
        Command::Delete { id } => report(submit_delete(&store, id).map(|removed| {
            if removed == 0 {
                "✓ no car with that id (nothing to delete)".to_string()
            } else {
                "✓ car deleted".to_string()
            }
        })),
        Command::Import { path } => run_import(&store, &path),
        Command::Export { path } => run_export(&store, path),
    }
}

/// Rejections go to stderr with exit code 2; store failures propagate.
fn report(result: Result<String, CarError>) -> Result<ExitCode> {
    match result {
        Ok(message) => {
            println!("{}", message);
            Ok(ExitCode::SUCCESS)
        }
        Err(CarError::Rejected(reason)) => {
            eprintln!("⚠️  {}", reason);
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_list(store: &CarStore, json: bool) -> Result<ExitCode> {
    let cars = store.list_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cars)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:>6}  {:<20} {:<24} {:>4}  {:>12}", "id", "brand", "model", "year", "price");
    println!("{}", "━".repeat(72));
    for car in &cars {
        println!(
            "{:>6}  {:<20} {:<24} {:>4}  {:>12.2}",
            car.id, car.brand, car.model, car.year, car.price
        );
    }
    println!("{}", "━".repeat(72));
    println!("{} cars", cars.len());

    Ok(ExitCode::SUCCESS)
}

fn run_import(store: &CarStore, path: &Path) -> Result<ExitCode> {
    println!("📂 Importing {}...", path.display());
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let report = import_csv(store, &data)?;

    println!("✓ Inserted {} cars", report.inserted);
    for row in &report.rejected {
        println!("  line {}: {}", row.line, row.reason);
    }
    if report.rejected.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("⚠️  {} rows rejected", report.rejected.len());
        Ok(ExitCode::from(2))
    }
}

fn run_export(store: &CarStore, path: Option<PathBuf>) -> Result<ExitCode> {
    let cars = store.list_all()?;

    match path {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
            export_csv(&cars, file)?;
            eprintln!("✓ Exported {} cars to {}", cars.len(), path.display());
        }
        None => export_csv(&cars, io::stdout().lock())?,
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: CarStore) -> Result<ExitCode> {
    let form = car_inventory::CarForm::load(store)?;
    let mut app = ui::App::new(form);
    ui::run_ui(&mut app)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: CarStore) -> Result<ExitCode> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the subcommands: list, add, delete, import, export");
    Ok(ExitCode::FAILURE)
}
