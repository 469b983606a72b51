use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use drink_log::aggregator::Granularity;
use drink_log::chart::{render_bars, render_dashboard, title_for};
use drink_log::config::Config;
use drink_log::drinks::DrinkType;
use drink_log::error::DynError;
use drink_log::estimator::{compute_metrics, format_clear_time, project_clear_time};
use drink_log::form::{parse_date_input, FormInput, Logbook};
use drink_log::serve::{serve_api, AppState};
use drink_log::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log drinks, estimate metabolism time and chart the totals")]
struct Args {
    /// Path to config file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite drink log (overrides config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the drinks and their strengths
    Drinks,
    /// Estimate pure alcohol and metabolism time without saving
    Estimate {
        /// Drink type (default: first in the list)
        #[arg(short, long, value_enum)]
        drink: Option<DrinkType>,

        /// Volume in ml: 0, 100, 180, 350, 500, 750 or 1000
        #[arg(short, long)]
        amount: Option<u32>,

        /// Body weight in kg (minimum 30)
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Save one entry, then show the estimate and the charts
    Log {
        /// Date of drinking, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Drink type (default: first in the list)
        #[arg(short, long, value_enum)]
        drink: Option<DrinkType>,

        /// Volume in ml: 0, 100, 180, 350, 500, 750 or 1000
        #[arg(short, long)]
        amount: Option<u32>,

        /// Body weight in kg (minimum 30)
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Show the logged totals as bar charts
    Summary {
        /// Only show one granularity
        #[arg(short, long, value_enum)]
        granularity: Option<Granularity>,
    },
    /// Serve the JSON API over HTTP
    Serve {
        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> Result<(), DynError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.database = database;
    }

    match args.command {
        Command::Drinks => drinks(),
        Command::Estimate {
            drink,
            amount,
            weight,
        } => estimate(&config, drink, amount, weight),
        Command::Log {
            date,
            drink,
            amount,
            weight,
        } => log_entry(&config, date, drink, amount, weight),
        Command::Summary { granularity } => summary(&config, granularity),
        Command::Serve { port } => serve(&config, port),
    }
}

fn open_logbook(config: &Config) -> Logbook {
    let path = config.database.clone();
    Logbook::open_or_degrade(move || SqliteStore::open(&path))
}

fn build_form(
    config: &Config,
    date: Option<String>,
    drink: Option<DrinkType>,
    amount: Option<u32>,
    weight: Option<f64>,
) -> Result<FormInput, DynError> {
    let mut form = FormInput::with_defaults(
        Local::now().date_naive(),
        config.default_weight_kg,
        config.default_amount_ml,
    );
    if let Some(date) = date {
        form.date = parse_date_input(&date)?;
    }
    if let Some(drink) = drink {
        form.drink = drink;
    }
    if let Some(amount) = amount {
        form.amount_ml = amount;
    }
    if let Some(weight) = weight {
        form.weight_kg = weight;
    }
    form.validate()?;
    Ok(form)
}

fn drinks() -> Result<(), DynError> {
    for drink in DrinkType::ALL {
        println!(
            "{:<14} {:<22} {:>4}%",
            drink.key(),
            drink.label(),
            drink.strength_pct()
        );
    }
    Ok(())
}

fn estimate(
    config: &Config,
    drink: Option<DrinkType>,
    amount: Option<u32>,
    weight: Option<f64>,
) -> Result<(), DynError> {
    let form = build_form(config, None, drink, amount, weight)?;
    let metrics = compute_metrics(
        form.drink.strength_pct(),
        form.amount_ml as f64,
        form.weight_kg,
    )?;
    let clear_time = project_clear_time(metrics.hours, Local::now());

    println!("Drink:          {} x {} ml", form.drink, form.amount_ml);
    println!("Body weight:    {} kg", form.weight_kg);
    println!("Pure alcohol:   {}", metrics.grams_display());
    println!("Metabolism:     {}", metrics.hours_display());
    println!("Clear around:   {}", format_clear_time(&clear_time));
    Ok(())
}

fn log_entry(
    config: &Config,
    date: Option<String>,
    drink: Option<DrinkType>,
    amount: Option<u32>,
    weight: Option<f64>,
) -> Result<(), DynError> {
    let form = build_form(config, date, drink, amount, weight)?;
    let mut logbook = open_logbook(config);

    let dashboard = logbook.submit(&form, Local::now())?;
    println!(
        "Saved {} x {} ml on {}",
        form.drink,
        form.amount_ml,
        form.date.format("%Y-%m-%d")
    );
    println!();
    print!("{}", render_dashboard(&dashboard));
    Ok(())
}

fn summary(config: &Config, granularity: Option<Granularity>) -> Result<(), DynError> {
    let mut logbook = open_logbook(config);
    let snapshot = logbook.snapshot();
    if let Some(warning) = &snapshot.warning {
        eprintln!("WARNING: {}", warning);
    }
    if snapshot.skipped_rows > 0 {
        eprintln!(
            "WARNING: skipped {} unreadable row(s), see log",
            snapshot.skipped_rows
        );
    }

    let granularities: Vec<Granularity> = match granularity {
        Some(g) => vec![g],
        None => Granularity::ALL.to_vec(),
    };
    for (i, g) in granularities.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let series = drink_log::aggregate(&snapshot.entries, g);
        print!("{}", render_bars(title_for(g), &series));
    }
    Ok(())
}

fn serve(config: &Config, port: Option<u16>) -> Result<(), DynError> {
    let logbook = open_logbook(config);
    if !logbook.is_available() {
        eprintln!("WARNING: drink log store is unavailable; entries cannot be saved");
    }
    let state = AppState::new(logbook, config.default_weight_kg, config.default_amount_ml);
    serve_api(state, port.unwrap_or(config.api_port))
}
