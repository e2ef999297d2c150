use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use colored::Colorize;
use fleetdeck_lib::{
    Session,
    collaborators::Collaborators,
    config::CoreConfig,
    fs::state_dir,
    repository::{LocalDb, entities::VehicleStatus},
};
use parking_lot::RwLock;
use sysexits::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::Error;

mod error;
mod profile;
mod stats;
mod vehicle;

#[derive(Parser, Debug)]
#[command(name = "fleetdeck")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use this configuration file instead of the default one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use this database file instead of the default one
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Show fleet statistics and recent activity
    Stats,
    /// Operate on vehicles
    #[command(subcommand)]
    Vehicle(vehicle::Command),
    /// Operate on your profile
    #[command(subcommand)]
    Profile(profile::Command),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => CoreConfig::load_from(path),
        None => CoreConfig::load(),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::Config;
        }
    };

    // Logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{} logging is already initialized", "warning:".yellow());
    }

    match run(cli, cfg).await {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            error!("{err}");
            eprintln!("{} {err}", "error:".red().bold());
            err.exit_code()
        }
    }
}

async fn run(cli: Cli, cfg: CoreConfig) -> Result<(), Error> {
    let db_path = match cli.database {
        Some(path) => path,
        None => state_dir().map_err(Error::StateDir)?.join("fleet.db"),
    };
    let db = Arc::new(
        LocalDb::open(
            &db_path,
            cfg.user_id(),
            cfg.default_profile(),
            cfg.fleet.seed_sample_data,
        )
        .map_err(fleetdeck_lib::Error::from)?,
    );

    let collaborators = Collaborators {
        auth: db.clone(),
        vehicles: db.clone(),
        profiles: db,
        avatars: None,
    };

    let mut session = Session::init(collaborators, Arc::new(RwLock::new(cfg))).await?;
    session.load_fleet().await?;

    match cli.command {
        Command::Stats => stats::handle(&session)?,
        Command::Vehicle(cmd) => vehicle::handle(&mut session, cmd).await?,
        Command::Profile(cmd) => profile::handle(&mut session, cmd).await?,
    }

    Ok(())
}

/// Vehicle status, colored by how much attention it needs.
pub(crate) fn status_label(status: VehicleStatus) -> colored::ColoredString {
    match status {
        VehicleStatus::Active => status.label().green(),
        VehicleStatus::Maintenance => status.label().red(),
        VehicleStatus::Idle => status.label().yellow(),
    }
}
