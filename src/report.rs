// ============================================================================
// Module : report
// ============================================================================
// Diagnostics du pipeline sous forme d'événements structurés
//
// CONCEPT : Callback de reporting
// - Le pipeline émet des PipelineEvent au lieu d'imprimer directement
// - ConsoleReporter les affiche (stdout) et les trace (fichier de logs)
// - Les tests branchent un reporter qui enregistre les événements
// ============================================================================

use std::path::PathBuf;

use tracing::{error, info};

/// Événement émis pendant un run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Début du run
    RunStarted {
        job: String,
        instruments: usize,
        window: String,
    },

    /// Téléchargement d'un instrument
    Fetching {
        label: String,
        symbol: String,
        index: usize,
        total: usize,
    },

    /// Fichier écrit pour un instrument
    Saved {
        label: String,
        symbol: String,
        path: PathBuf,
        shape: (usize, usize),
        preview: String,
    },

    /// Le run a échoué (émis une seule fois par run)
    RunFailed { job: String, error: String },

    /// Le run s'est terminé avec succès
    RunCompleted { job: String, artifacts: usize },
}

/// Récepteur des événements du pipeline
///
/// CONCEPT RUST : Trait objects et génériques
/// - Le pipeline est générique sur R: Reporter
/// - &R implémente aussi Reporter, on peut donc prêter un reporter
pub trait Reporter: Send + Sync {
    fn report(&self, event: &PipelineEvent);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &PipelineEvent) {
        (**self).report(event)
    }
}

/// Reporter par défaut : lignes lisibles sur stdout + événements tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted {
                job,
                instruments,
                window,
            } => {
                info!(job = %job, instruments, window = %window, "Run started");
                println!("📥 Téléchargement {} ({} instruments, {})", job, instruments, window);
            }
            PipelineEvent::Fetching {
                label,
                symbol,
                index,
                total,
            } => {
                info!(label = %label, symbol = %symbol, progress = index + 1, total, "Fetching");
                println!("\n  [{}/{}] {} (ticker : {})", index + 1, total, label, symbol);
            }
            PipelineEvent::Saved {
                label,
                symbol,
                path,
                shape,
                preview,
            } => {
                info!(
                    label = %label,
                    symbol = %symbol,
                    path = %path.display(),
                    rows = shape.0,
                    columns = shape.1,
                    "Artifact saved"
                );
                println!("    ✓ Sauvegardé : {}", path.display());
                println!("    Shape : ({}, {})", shape.0, shape.1);
                println!("    Premières lignes :");
                for line in preview.lines() {
                    println!("      {}", line);
                }
            }
            PipelineEvent::RunFailed { job, error } => {
                error!(job = %job, error = %error, "Run failed");
                println!("\n❌ Erreur : {}", error);
            }
            PipelineEvent::RunCompleted { job, artifacts } => {
                info!(job = %job, artifacts, "Run completed");
                println!("\n✅ {} fichier(s) écrit(s)", artifacts);
            }
        }
    }
}
