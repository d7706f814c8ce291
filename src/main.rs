// ============================================================================
// PriceDump - Téléchargement des historiques de prix
// ============================================================================
// Deux jobs :
// - currencies : DXY, EUR/USD, CAD/USD, NOK/USD, RUB/USD (2021-01-01 -> 2024-01-14)
// - futures : pétrole brut et gaz naturel (2021-01-01 -> 2024-12-31)
//
// Un fichier CSV par instrument, nommé avec la date du jour.
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use pricedump::api::YahooProvider;
use pricedump::config::{self, PipelineJob};
use pricedump::models::PREVIEW_ROWS;
use pricedump::report::ConsoleReporter;
use pricedump::Pipeline;

// ============================================================================
// Ligne de commande
// ============================================================================
// CONCEPT RUST : clap derive
// - Les attributs #[arg] / #[command] génèrent le parsing et l'aide (--help)
// - Sans option, chaque job reproduit exactement ses valeurs par défaut
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "pricedump", version, about = "Télécharge des historiques de prix en CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Dossier où écrire les fichiers CSV
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Remplace la date de début du job (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,

    /// Remplace la date de fin exclusive du job (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    end: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Paires de devises (échec = arrêt immédiat, code de sortie non nul)
    Currencies,

    /// Futures pétrole / gaz (échec = erreur loggée, aucun fichier)
    Futures,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    config::parse_date(value).map_err(|e| e.to_string())
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les logs vont dans un fichier avec rotation quotidienne, stdout reste
// réservé aux diagnostics lisibles du pipeline.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/pricedump/logs/pricedump.log
/// - macOS : ~/Library/Application Support/pricedump/logs/pricedump.log
/// - Sinon : ./logs/pricedump.log
///
/// # Utilisation
/// ```bash
/// RUST_LOG=debug pricedump futures
/// RUST_LOG=pricedump=trace pricedump currencies
/// ```
fn init_logging() -> Result<PathBuf> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("pricedump").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "pricedump.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour pricedump, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricedump=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(log_dir)
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Un logging cassé ne doit pas empêcher le téléchargement
    if let Err(e) = init_logging() {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    }

    info!(command = ?cli.command, output_dir = %cli.output_dir.display(), "PriceDump starting up");

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let result = runtime.block_on(run(cli));

    match &result {
        Ok(()) => info!("PriceDump exited normally"),
        Err(e) => error!(error = ?e, "PriceDump exited with error"),
    }

    result
}

async fn run(cli: Cli) -> Result<()> {
    let run_date = chrono::Local::now().date_naive();
    let provider = YahooProvider::new().context("Échec de la création du client HTTP")?;
    let pipeline = Pipeline::new(provider, ConsoleReporter, cli.output_dir, run_date);

    match cli.command {
        Command::Currencies => {
            let job = PipelineJob::currencies()?.with_window_override(cli.start, cli.end)?;
            // Toute erreur remonte jusqu'à main : code de sortie non nul
            pipeline.run_fail_fast(&job).await?;
        }
        Command::Futures => {
            let job = PipelineJob::futures()?.with_window_override(cli.start, cli.end)?;
            // L'échec est déjà reporté par le pipeline, on sort normalement
            if let Some(records) = pipeline.run_all_or_nothing(&job).await {
                if let Some(first) = records.first() {
                    println!("\nAperçu {} :", first.instrument.label);
                    println!("{}", first.series.preview(PREVIEW_ROWS));
                }
            }
        }
    }

    Ok(())
}
