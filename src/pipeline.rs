// ============================================================================
// Module : pipeline
// ============================================================================
// Boucle "télécharger puis sauvegarder" sur un registre d'instruments
//
// Pour chaque instrument, dans l'ordre du registre :
// 1. fetch (symbole, start, end) auprès du fournisseur
// 2. ajout de la colonne d'annotation si le job en a une
// 3. calcul du nom de fichier (identifiant + date du run)
// 4. écriture CSV (écrase un fichier existant)
// 5. diagnostics : label, ticker, fichier, shape, aperçu
//
// CONCEPT RUST : Exécution séquentielle en async
// - Chaque .await se termine avant l'instrument suivant
// - Une seule requête HTTP et une seule écriture à la fois
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::api::PriceProvider;
use crate::config::{FailurePolicy, PipelineJob};
use crate::models::{Instrument, TimeSeries, PREVIEW_ROWS};
use crate::report::{PipelineEvent, Reporter};
use crate::storage;

/// Série écrite sur disque pour un instrument
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSeries {
    pub instrument: Instrument,
    pub series: TimeSeries,
    pub path: PathBuf,
}

/// Pipeline de téléchargement
///
/// CONCEPT RUST : Injection de dépendances par génériques
/// - P : source des données (Yahoo en production, faux fournisseur en test)
/// - R : destination des diagnostics
pub struct Pipeline<P, R> {
    provider: P,
    reporter: R,
    output_dir: PathBuf,
    run_date: NaiveDate,
}

impl<P: PriceProvider, R: Reporter> Pipeline<P, R> {
    /// Crée un pipeline qui écrit dans output_dir avec la date de run donnée
    pub fn new(provider: P, reporter: R, output_dir: impl Into<PathBuf>, run_date: NaiveDate) -> Self {
        Self {
            provider,
            reporter,
            output_dir: output_dir.into(),
            run_date,
        }
    }

    /// Exécute le job selon sa politique d'échec
    ///
    /// - FailFast : l'erreur remonte à l'appelant
    /// - AllOrNothing : l'erreur est reportée, le résultat est vide
    pub async fn run(&self, job: &PipelineJob) -> Result<Vec<PersistedSeries>> {
        match job.policy {
            FailurePolicy::FailFast => self.run_fail_fast(job).await,
            FailurePolicy::AllOrNothing => Ok(self.run_all_or_nothing(job).await.unwrap_or_default()),
        }
    }

    /// Aucune isolation : la première erreur arrête le run.
    /// Les fichiers des instruments déjà traités restent sur disque.
    /// L'erreur est reportée (RunFailed) puis remonte à l'appelant.
    #[instrument(skip_all, fields(job = %job.name, run_date = %self.run_date))]
    pub async fn run_fail_fast(&self, job: &PipelineJob) -> Result<Vec<PersistedSeries>> {
        self.report_start(job);

        match self.run_sequential(job).await {
            Ok(persisted) => {
                self.reporter.report(&PipelineEvent::RunCompleted {
                    job: job.name.clone(),
                    artifacts: persisted.len(),
                });
                Ok(persisted)
            }
            Err(e) => {
                self.report_failure(job, &e);
                Err(e)
            }
        }
    }

    async fn run_sequential(&self, job: &PipelineJob) -> Result<Vec<PersistedSeries>> {
        let total = job.registry.len();
        let mut persisted = Vec::with_capacity(total);

        for (index, instrument) in job.registry.iter().enumerate() {
            let series = self.fetch(job, instrument, index, total).await?;
            let saved = self.persist(job, instrument, series)?;
            self.report_saved(&saved);
            persisted.push(saved);
        }

        Ok(persisted)
    }

    /// Le run entier est une seule frontière d'échec.
    ///
    /// Tous les téléchargements d'abord, puis toutes les écritures.
    /// En cas d'erreur : un seul RunFailed, aucun fichier laissé, None.
    #[instrument(skip_all, fields(job = %job.name, run_date = %self.run_date))]
    pub async fn run_all_or_nothing(&self, job: &PipelineJob) -> Option<Vec<PersistedSeries>> {
        self.report_start(job);

        match self.run_batch(job).await {
            Ok(persisted) => {
                for saved in &persisted {
                    self.report_saved(saved);
                }
                self.reporter.report(&PipelineEvent::RunCompleted {
                    job: job.name.clone(),
                    artifacts: persisted.len(),
                });
                Some(persisted)
            }
            Err(e) => {
                self.report_failure(job, &e);
                None
            }
        }
    }

    async fn run_batch(&self, job: &PipelineJob) -> Result<Vec<PersistedSeries>> {
        let total = job.registry.len();
        let mut fetched = Vec::with_capacity(total);

        for (index, instrument) in job.registry.iter().enumerate() {
            let series = self.fetch(job, instrument, index, total).await?;
            fetched.push((instrument, series));
        }

        let mut persisted: Vec<PersistedSeries> = Vec::with_capacity(total);
        for (instrument, series) in fetched {
            match self.persist(job, instrument, series) {
                Ok(saved) => persisted.push(saved),
                Err(e) => {
                    let written: Vec<PathBuf> = persisted.into_iter().map(|p| p.path).collect();
                    warn!(removed = written.len(), "Write failed, rolling back artifacts of this run");
                    storage::remove_artifacts(&written);
                    return Err(e);
                }
            }
        }

        Ok(persisted)
    }

    /// Télécharge un instrument et ajoute l'annotation du job
    async fn fetch(
        &self,
        job: &PipelineJob,
        instrument: &Instrument,
        index: usize,
        total: usize,
    ) -> Result<TimeSeries> {
        self.reporter.report(&PipelineEvent::Fetching {
            label: instrument.label.clone(),
            symbol: instrument.symbol.clone(),
            index,
            total,
        });

        let mut series = self
            .provider
            .fetch(&instrument.symbol, job.window)
            .await
            .with_context(|| {
                format!(
                    "Échec du téléchargement de {} ({}) via {}",
                    instrument.label,
                    instrument.symbol,
                    self.provider.name()
                )
            })?;

        if let Some(column) = &job.annotation_column {
            series.annotate(column.as_str(), instrument.label.as_str());
        }

        debug!(label = %instrument.label, rows = series.len(), "Instrument fetched");
        Ok(series)
    }

    /// Écrit la série dans son fichier
    fn persist(
        &self,
        job: &PipelineJob,
        instrument: &Instrument,
        series: TimeSeries,
    ) -> Result<PersistedSeries> {
        let filename = job.naming.filename(&instrument.file_id(), self.run_date);
        let path = self.output_dir.join(filename);

        storage::write_csv(&path, &series)
            .with_context(|| format!("Échec de la sauvegarde de {}", instrument.label))?;

        info!(label = %instrument.label, path = %path.display(), "Artifact written");
        Ok(PersistedSeries {
            instrument: instrument.clone(),
            series,
            path,
        })
    }

    fn report_start(&self, job: &PipelineJob) {
        if job.registry.is_empty() {
            warn!("Registry is empty, nothing to download");
        }
        self.reporter.report(&PipelineEvent::RunStarted {
            job: job.name.clone(),
            instruments: job.registry.len(),
            window: job.window.to_string(),
        });
    }

    fn report_failure(&self, job: &PipelineJob, error: &anyhow::Error) {
        self.reporter.report(&PipelineEvent::RunFailed {
            job: job.name.clone(),
            error: format!("{:#}", error),
        });
    }

    fn report_saved(&self, saved: &PersistedSeries) {
        self.reporter.report(&PipelineEvent::Saved {
            label: saved.instrument.label.clone(),
            symbol: saved.instrument.symbol.clone(),
            path: saved.path.clone(),
            shape: saved.series.shape(),
            preview: saved.series.preview(PREVIEW_ROWS),
        });
    }
}
