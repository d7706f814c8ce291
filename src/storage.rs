// ============================================================================
// Module : storage
// ============================================================================
// Nommage et écriture des fichiers de sortie (un CSV par instrument)
//
// Nom : <prefix>_<instrument-id>_<suffix>_<YYYYMMDD>.csv, parties vides omises
// - currency_EUR_USD_20240101.csv
// - crude_oil_futures_20240101.csv
//
// Un fichier existant avec le même nom est écrasé (relance le même jour).
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{TimeSeries, INDEX_COLUMN};

/// Extension des fichiers de sortie
pub const ARTIFACT_EXTENSION: &str = "csv";

/// Format de la date du run dans les noms de fichiers
pub const RUN_DATE_FORMAT: &str = "%Y%m%d";

/// Schéma de nommage des fichiers d'un job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingScheme {
    /// Placé avant l'identifiant (ex: "currency")
    pub prefix: Option<String>,

    /// Placé après l'identifiant (ex: "futures")
    pub suffix: Option<String>,
}

impl NamingScheme {
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            suffix: None,
        }
    }

    pub fn suffixed(suffix: impl Into<String>) -> Self {
        Self {
            prefix: None,
            suffix: Some(suffix.into()),
        }
    }

    /// Construit le nom de fichier pour un instrument et une date de run
    ///
    /// Déterministe : même identifiant + même date => même nom
    pub fn filename(&self, instrument_id: &str, run_date: NaiveDate) -> String {
        let date = run_date.format(RUN_DATE_FORMAT).to_string();

        // CONCEPT RUST : Iterator chain sur des Option
        // - .flatten() ignore les None (parties absentes)
        let stem = [
            self.prefix.as_deref(),
            Some(instrument_id),
            self.suffix.as_deref(),
            Some(date.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

        format!("{}.{}", stem, ARTIFACT_EXTENSION)
    }
}

/// Écrit la série (index compris) dans un fichier CSV
///
/// Colonnes : Date, Open, High, Low, Close, Adj Close, Volume [, annotation]
pub fn write_csv(path: &Path, series: &TimeSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Échec de la création du fichier {}", path.display()))?;

    let mut header = vec![INDEX_COLUMN];
    header.extend(series.columns());
    writer
        .write_record(&header)
        .with_context(|| format!("Échec de l'écriture de l'en-tête dans {}", path.display()))?;

    for row in series.rows() {
        writer
            .write_record(&row)
            .with_context(|| format!("Échec de l'écriture d'une ligne dans {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Échec du flush de {}", path.display()))?;

    debug!(path = %path.display(), rows = series.len(), "CSV written");
    Ok(())
}

/// Supprime les fichiers écrits par un run interrompu
///
/// Best effort : une suppression ratée est seulement loggée
pub fn remove_artifacts(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed artifact"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove artifact"),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sanitize_label, Bar};

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_currency_filename() {
        let scheme = NamingScheme::prefixed("currency");
        let id = sanitize_label("EUR/USD");
        assert_eq!(scheme.filename(&id, run_date()), "currency_EUR_USD_20240101.csv");
    }

    #[test]
    fn test_futures_filename() {
        let scheme = NamingScheme::suffixed("futures");
        assert_eq!(
            scheme.filename("natural_gas", run_date()),
            "natural_gas_futures_20240101.csv"
        );
    }

    #[test]
    fn test_filename_is_deterministic() {
        let scheme = NamingScheme::prefixed("currency");
        let first = scheme.filename("DXY", run_date());
        let second = scheme.filename("DXY", run_date());
        assert_eq!(first, second);
        assert_ne!(first, scheme.filename("DXY", run_date().succ_opt().unwrap()));
    }

    #[test]
    fn test_write_csv_with_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crude_oil_futures_20240101.csv");

        let mut series = TimeSeries::with_bars(
            "CL=F",
            vec![Bar::new(run_date(), 71.5, 72.0, 70.25, 71.75, 71.75, 1200)],
        );
        series.annotate("Product", "Crude Oil");

        write_csv(&path, &series).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Adj Close,Volume,Product");
        assert_eq!(lines[1], "2024-01-01,71.5,72,70.25,71.75,71.75,1200,Crude Oil");
    }

    #[test]
    fn test_write_csv_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("currency_DXY_20240101.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n".repeat(50)).unwrap();

        let series = TimeSeries::with_bars(
            "DX-Y.NYB",
            vec![Bar::new(run_date(), 101.0, 102.0, 100.0, 101.5, 101.5, 0)],
        );
        write_csv(&path, &series).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_write_csv_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("file.csv");
        let series = TimeSeries::new("X");
        assert!(write_csv(&path, &series).is_err());
    }

    #[test]
    fn test_remove_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x").unwrap();

        remove_artifacts(&[path.clone(), dir.path().join("never_written.csv")]);
        assert!(!path.exists());
    }
}
