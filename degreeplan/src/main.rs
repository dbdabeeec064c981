// --- Planificador de carreras - CLI ---

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use degreeplan::api_json;
use degreeplan::models::Specialization;
use degreeplan::{Catalog, PlanStore, PlannerConfig};

#[derive(Parser)]
#[command(author, version, about = "Degree plan builder and checker", long_about = None)]
struct Cli {
    /// Catalog JSON file (array of courses)
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// SQLite database (overrides DEGREEPLAN_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a plan from specialization files and print it as JSON
    Build {
        /// Specialization JSON files (majors and minors)
        #[arg(required = true)]
        specializations: Vec<PathBuf>,

        #[arg(short, long, default_value = "My plan")]
        title: String,

        #[arg(short, long)]
        user: Option<String>,

        /// Fixed random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Store the plan in the database
        #[arg(long)]
        save: bool,
    },

    /// Print a stored plan as JSON
    Show { plan_id: String },

    /// Print the prerequisite report of a stored plan
    Check { plan_id: String },
}

fn read_specializations(paths: &[PathBuf]) -> degreeplan::Result<Vec<Specialization>> {
    let mut out = Vec::new();
    for path in paths {
        let s = std::fs::read_to_string(path)?;
        out.push(serde_json::from_str(&s)?);
    }
    Ok(out)
}

fn load_stored(store: &PlanStore, plan_id: &str, catalog: &Catalog) -> Result<degreeplan::CoursePlan, Box<dyn std::error::Error>> {
    store
        .load_plan(plan_id, catalog)?
        .ok_or_else(|| format!("plan {} not found", plan_id).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PlannerConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let catalog = Catalog::from_path(&cli.catalog)?;
    info!(courses = catalog.len(), path = %cli.catalog.display(), "catalog loaded");

    match cli.command {
        Commands::Build { specializations, title, user, seed, save } => {
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            let specs = read_specializations(&specializations)?;
            let (plan, report) = api_json::build_plan(&catalog, &config, &title, user.as_deref(), &specs);
            if !report.clamped.is_empty() {
                info!(clamped = ?report.clamped, "some courses did not fit and were placed in the last available term");
            }
            if save {
                let mut store = PlanStore::open(&config.db_path)?;
                store.save_plan(&plan)?;
            }
            println!("{}", plan.to_json()?);
        }
        Commands::Show { plan_id } => {
            let store = PlanStore::open(&config.db_path)?;
            let plan = load_stored(&store, &plan_id, &catalog)?;
            println!("{}", plan.to_json()?);
        }
        Commands::Check { plan_id } => {
            let store = PlanStore::open(&config.db_path)?;
            let plan = load_stored(&store, &plan_id, &catalog)?;
            let report = api_json::validate_plan(&plan);
            println!("{}", serde_json::to_string_pretty(&report)?);
            info!(credits = api_json::total_credits(&plan), "plan checked");
        }
    }
    Ok(())
}
