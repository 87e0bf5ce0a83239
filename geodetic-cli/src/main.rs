//! Point d'entrée CLI pour geodetic

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use geodetic::DEFAULT_MAX_ITERATIONS;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;
mod config;
mod output;

use cli::Commands;
use config::Settings;
use output::Output;

/// Calculs géodésiques sur l'ellipsoïde et projection de Gauss-Krüger
#[derive(Parser)]
#[command(name = "geodetic")]
#[command(author, version)]
#[command(about = "Calculs sur l'ellipsoïde, problèmes géodésiques et projection de Gauss-Krüger")]
#[command(
    long_about = "Calculs sur l'ellipsoïde, problèmes géodésiques et projection de Gauss-Krüger.\n\nLes angles se saisissent en degrés décimaux ou sexagésimaux (114°20'0\", 114:20:00, -37d43m44.1353s) et s'affichent en DMS à 4 décimales de seconde."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sortie JSON
    #[arg(long, global = true)]
    json: bool,

    /// Afficher les estimations successives des solveurs itératifs
    #[arg(long, global = true)]
    steps: bool,

    /// Fichier de registre JSON fusionné avec les ellipsoïdes et projections embarqués
    #[arg(long, env = "GEODETIC_REGISTRY", global = true)]
    registry: Option<PathBuf>,

    /// Seuil de convergence entre deux estimations successives (radians)
    #[arg(long, env = "GEODETIC_PRECISION", default_value_t = 1e-13, global = true)]
    precision: f64,

    /// Nombre maximal d'itérations des solveurs
    #[arg(
        long,
        env = "GEODETIC_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS,
        global = true
    )]
    max_iterations: usize,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let settings = Settings::load(cli.registry.as_deref(), cli.precision, cli.max_iterations)?;
    let output = Output::new(cli.json, cli.steps);

    cli::run(cli.command, &settings, &output)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (_, 0) => Level::WARN,
        (_, 1) => Level::INFO,
        (_, 2) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Les résultats vont sur stdout, les logs sur stderr
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
