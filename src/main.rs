use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use southern_pine_sim::{
    config::{SpeciesConfig, SpeciesLibrary},
    growth::HeightDiameterModel,
    stand::Stand,
    visualization::{
        print_hd_comparison, print_hd_parameters, print_species_table, print_stand_summary,
        print_yield_table,
    },
};

#[derive(Parser)]
#[command(
    name = "pine-sim",
    about = "Southern pine stand growth and yield simulator",
    version,
    author
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to a TOML file with species coefficient overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a planted stand and display the yield table
    Simulate {
        /// Species code (LP, SP, SA, or LL)
        #[arg(short, long)]
        species: String,

        /// Site index at base age 25 (feet)
        #[arg(long, default_value = "70.0")]
        site_index: f64,

        /// Planting density (trees per acre)
        #[arg(short, long, default_value = "500")]
        trees_per_acre: u32,

        /// Projection length (years)
        #[arg(short, long, default_value = "50")]
        years: u32,

        /// Growth cycle length (years)
        #[arg(long, default_value = "5")]
        time_step: u32,

        /// Ecological unit code (222, 231, 232, 234, 255, or M231)
        #[arg(long)]
        ecounit: Option<String>,

        /// Forest type group code (FTYLPN, FTOKPN, FTLOHD, or FTUPHD)
        #[arg(long)]
        forest_type: Option<String>,

        /// Emit the metrics history as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Compare the two height-diameter models across a diameter range
    CompareHd {
        /// Species code (LP, SP, SA, or LL)
        #[arg(short, long)]
        species: String,

        /// Diameters to evaluate, inches (comma separated)
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_values_t = vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 16.0, 20.0, 24.0]
        )]
        dbh: Vec<f64>,

        /// Also print each model's coefficient set
        #[arg(long, conflicts_with = "json")]
        model_table: bool,

        /// Emit the comparison as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the supported species
    ListSpecies {
        /// Include key coefficient columns
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print the full coefficient set for one species
    ShowConfig {
        /// Species code (LP, SP, SA, or LL)
        #[arg(short, long)]
        species: String,

        /// Emit JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_library(path: Option<&Path>) -> Result<SpeciesLibrary> {
    match path {
        Some(p) => Ok(SpeciesLibrary::from_path(p)?),
        None => Ok(SpeciesLibrary::builtin()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let library = load_library(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            species,
            site_index,
            trees_per_acre,
            years,
            time_step,
            ecounit,
            forest_type,
            json,
        } => {
            let mut stand =
                Stand::initialize_planted(trees_per_acre, site_index, &species, &library)?
                    .with_time_step(time_step)?;
            if let Some(code) = ecounit {
                stand = stand.with_ecounit(Some(code.parse()?));
            }
            if let Some(code) = forest_type {
                stand = stand.with_forest_type(Some(code.parse()?));
            }

            stand.grow(years)?;

            if json {
                println!("{}", serde_json::to_string_pretty(stand.metrics_history())?);
            } else {
                println!(
                    "\n{}",
                    format!(
                        "Stand Projection: {} at site index {:.0}, {} years",
                        stand.species().common_name(),
                        stand.site_index(),
                        years
                    )
                    .bold()
                    .cyan()
                );
                print_yield_table(stand.metrics_history());
                print_stand_summary(&stand);
                println!();
            }
        }

        Commands::CompareHd {
            species,
            dbh,
            model_table,
            json,
        } => {
            if dbh.is_empty() || dbh.iter().any(|d| !d.is_finite() || *d < 0.0) {
                anyhow::bail!("diameters must be non-negative numbers");
            }
            let model = HeightDiameterModel::for_species(&species, &library)?;
            let comparison = model.compare_models(&dbh);
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_hd_comparison(&comparison);
                if model_table {
                    print_hd_parameters(&model);
                }
                println!();
            }
        }

        Commands::ListSpecies { detailed } => {
            print_species_table(&library, detailed);
            println!();
        }

        Commands::ShowConfig { species, json } => {
            let (code, config) = library.lookup(&species)?;
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                // Keyed the same way override files are, so the output can
                // be saved and passed back through --config.
                let doc: BTreeMap<&str, BTreeMap<&str, &SpeciesConfig>> =
                    BTreeMap::from([("species", BTreeMap::from([(code.code(), config)]))]);
                print!("{}", toml::to_string_pretty(&doc)?);
            }
        }
    }

    Ok(())
}
