//! Joule-Calc command line front end.
//!
//! Results go to stdout; logging goes to stderr through `env_logger`
//! (default level `warn`, `RUST_LOG` honored, `--verbose` for `debug`).

use clap::{Args, Parser, Subcommand, ValueEnum};
use joule_calc::calculators::{
    compute_inverse_velocity, compute_sight_correction, AxisCorrection, OpticUnit, SightParams,
};
use joule_calc::commands::{HistorySession, SaveOutcome};
use joule_calc::config::{get_config, load_config_file, update_config};
use joule_calc::history::{
    csv_file_name, format_best_result, format_projection, group_text, share_text, to_csv,
    SortMode, ViewMode,
};
use joule_calc::units::UnitSystem;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "joule-calc")]
#[command(version)]
#[command(about = "Airsoft ballistic calculator: energy, velocity and sight corrections", long_about = None)]
struct Cli {
    /// Settings file with a "joule-calc" section
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file to use instead of the configured one
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the energy of a shot and save it to history
    Joule {
        /// BB weight (g, or gr with --imperial)
        #[arg(short = 'w', long)]
        weight: f64,

        /// Muzzle velocity (m/s, or fps with --imperial)
        #[arg(short = 's', long)]
        velocity: f64,

        #[command(flatten)]
        units: UnitArgs,

        /// Do not save the result to history
        #[arg(long)]
        no_save: bool,
    },

    /// Compute the velocity needed to reach an energy
    Velocity {
        /// Target energy (J)
        #[arg(short = 'j', long)]
        joule: f64,

        /// BB weight (g, or gr with --imperial)
        #[arg(short = 'w', long)]
        weight: f64,

        #[command(flatten)]
        units: UnitArgs,
    },

    /// Compute turret clicks for an observed impact deviation
    Sight {
        /// Distance to target (m)
        #[arg(short = 'd', long)]
        distance: f64,

        /// Vertical deviation (cm)
        #[arg(long, default_value = "0.0")]
        drop: f64,

        /// Horizontal deviation (cm)
        #[arg(long, default_value = "0.0")]
        drift: f64,

        /// Angular value of one click
        #[arg(long)]
        click_value: Option<f64>,

        /// Turrets in milliradians
        #[arg(long, conflicts_with = "moa")]
        mrad: bool,

        /// Turrets in minutes of angle
        #[arg(long)]
        moa: bool,
    },

    /// Inspect and manage the calculation history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Show history grouped by BB weight
    Show {
        /// Show every record instead of paginating
        #[arg(long)]
        all: bool,

        /// Number of pages to show
        #[arg(long, default_value = "1")]
        pages: usize,

        /// Sort a group, e.g. 0.20=energyDesc
        #[arg(long = "sort", value_parser = parse_sort)]
        sorts: Vec<(String, SortMode)>,

        /// Collapse a group by its weight key
        #[arg(long = "collapse")]
        collapsed: Vec<String>,
    },

    /// Delete one record by id
    Delete {
        id: String,

        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete every record of a weight group
    DeleteGroup {
        /// Weight key with two decimals, e.g. 0.20
        key: String,

        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete all records
    Clear {
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Export the history
    Export {
        #[arg(short = 'f', long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file or directory (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print the shareable text of one weight group
    CopyGroup {
        key: String,
    },

    /// Show the highest recorded energy
    Best,
}

#[derive(Args)]
struct UnitArgs {
    /// Weight in grains, velocity in fps
    #[arg(long, conflicts_with = "metric")]
    imperial: bool,

    /// Weight in grams, velocity in m/s
    #[arg(long)]
    metric: bool,
}

impl UnitArgs {
    fn resolve(&self) -> UnitSystem {
        if self.imperial {
            UnitSystem::Imperial
        } else if self.metric {
            UnitSystem::Metric
        } else {
            get_config().unit_system
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Text,
}

fn parse_sort(s: &str) -> Result<(String, SortMode), String> {
    let (key, mode) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=MODE, got '{}'", s))?;
    Ok((key.to_string(), mode.parse()?))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &cli.config {
        load_config_file(path)?;
    }
    if let Some(path) = cli.history_file {
        update_config(|config| config.history_file = Some(path));
    }

    match cli.command {
        Commands::Joule {
            weight,
            velocity,
            units,
            no_save,
        } => run_joule(weight, velocity, units.resolve(), no_save),
        Commands::Velocity {
            joule,
            weight,
            units,
        } => {
            let pair = compute_inverse_velocity(joule, weight, units.resolve())?;
            println!("Required velocity: {:.2} m/s | {:.2} fps", pair.mps, pair.fps);
            Ok(())
        }
        Commands::Sight {
            distance,
            drop,
            drift,
            click_value,
            mrad,
            moa,
        } => run_sight(distance, drop, drift, click_value, mrad, moa),
        Commands::History { command } => run_history(command),
    }
}

fn run_joule(weight: f64, velocity: f64, system: UnitSystem, no_save: bool) -> Result<(), Box<dyn Error>> {
    if no_save {
        let joule = joule_calc::compute_joule(weight, velocity, system)?;
        println!("Energy: {:.2} J", joule);
        return Ok(());
    }

    let mut session = HistorySession::from_config()?;
    let result = session.calculate_and_save(weight, velocity, system)?;
    println!("Energy: {:.2} J", result.joule);

    match &result.outcome {
        SaveOutcome::Saved { id } => {
            log::debug!("Saved record {}", id);
            println!("{}", result.outcome.status_message());
        }
        _ => eprintln!("{}", result.outcome.status_message()),
    }
    Ok(())
}

fn run_sight(
    distance: f64,
    drop: f64,
    drift: f64,
    click_value: Option<f64>,
    mrad: bool,
    moa: bool,
) -> Result<(), Box<dyn Error>> {
    let config = get_config();
    let unit = if mrad {
        OpticUnit::Mrad
    } else if moa {
        OpticUnit::Moa
    } else {
        config.optic_unit
    };
    let click_value = click_value.unwrap_or(if unit == config.optic_unit {
        config.click_value
    } else {
        unit.default_click_value()
    });

    let correction = compute_sight_correction(&SightParams {
        unit,
        distance,
        drop,
        drift,
        click_value,
    })?;

    println!("{}", format_axis("Elevation", &correction.elevation, unit));
    println!("{}", format_axis("Windage", &correction.windage, unit));
    Ok(())
}

fn format_axis(name: &str, axis: &AxisCorrection, unit: OpticUnit) -> String {
    if axis.clicks > 0.0 {
        format!("{}: {:.1} clicks ({:.2} {})", name, axis.clicks, axis.value, unit)
    } else {
        format!("{}: no correction", name)
    }
}

fn run_history(command: HistoryCommands) -> Result<(), Box<dyn Error>> {
    let mut session = HistorySession::from_config()?;

    match command {
        HistoryCommands::Show {
            all,
            pages,
            sorts,
            collapsed,
        } => {
            for (key, mode) in sorts {
                session.set_sort_mode(&key, mode);
            }
            for key in collapsed {
                session.toggle_collapsed(&key);
            }
            for _ in 1..pages.max(1) {
                session.load_more();
            }
            let mode = if all { ViewMode::Full } else { ViewMode::Paginated };
            print!("{}", format_projection(&session.projection(mode)));
        }
        HistoryCommands::Delete { id, yes } => {
            if session.store().get(&id).is_none() {
                return Err(format!("no record with id '{}'", id).into());
            }
            if yes || confirm("Delete this record?")? {
                session.remove(&id)?;
                println!("Record deleted.");
            }
        }
        HistoryCommands::DeleteGroup { key, yes } => {
            let count = session.store().group(&key).len();
            if count == 0 {
                return Err(format!("no records with weight {}", key).into());
            }
            let prompt = format!("Delete all {} record(s) with weight {}?", count, key);
            if yes || confirm(&prompt)? {
                let removed = session.remove_group(&key)?;
                println!("Deleted {} record(s).", removed);
            }
        }
        HistoryCommands::Clear { yes } => {
            if session.store().is_empty() {
                println!("History is already empty.");
            } else if yes || confirm("Clear the entire history?")? {
                session.clear()?;
                println!("History cleared.");
            }
        }
        HistoryCommands::Export { format, output } => {
            let (contents, default_name) = match format {
                ExportFormat::Csv => match to_csv(session.records())? {
                    Some(csv) => (csv, csv_file_name(&chrono::Utc::now())),
                    None => {
                        println!("No calculations in history to export.");
                        return Ok(());
                    }
                },
                ExportFormat::Text => (share_text(session.records()), "joule_history.txt".to_string()),
            };

            match output {
                Some(path) => {
                    let path = if path.is_dir() { path.join(default_name) } else { path };
                    std::fs::write(&path, contents)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", contents),
            }
        }
        HistoryCommands::CopyGroup { key } => match group_text(session.records(), &key) {
            Some(text) => println!("{}", text),
            None => return Err(format!("no records with weight {}", key).into()),
        },
        HistoryCommands::Best => match format_best_result(session.store().best()) {
            Some(text) => println!("{}", text),
            None => println!("No calculations in history yet."),
        },
    }

    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
