// ============================================================================
// Module : config
// ============================================================================
// Jobs préconfigurés : registre d'instruments, fenêtre de dates,
// schéma de nommage, colonne d'annotation et politique d'échec.
//
// Rien n'est lu depuis l'environnement : les valeurs par défaut sont ici,
// la ligne de commande ne peut que remplacer la fenêtre et le dossier de sortie.
// ============================================================================

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::models::{DateWindow, Instrument, InstrumentRegistry};
use crate::storage::NamingScheme;

/// Paires de devises : (label, symbole Yahoo)
pub const CURRENCY_PAIRS: [(&str, &str); 5] = [
    ("DXY", "DX-Y.NYB"),   // US Dollar Index
    ("EUR/USD", "EURUSD=X"),
    ("CAD/USD", "CADUSD=X"),
    ("NOK/USD", "NOKUSD=X"),
    ("RUB/USD", "RUBUSD=X"),
];

/// Contrats futures : (label, symbole Yahoo, identifiant de fichier)
pub const FUTURES: [(&str, &str, &str); 2] = [
    ("Crude Oil", "CL=F", "crude_oil"),
    ("Natural Gas", "NG=F", "natural_gas"),
];

pub const CURRENCY_START: &str = "2021-01-01";
pub const CURRENCY_END: &str = "2024-01-14";
pub const FUTURES_START: &str = "2021-01-01";
pub const FUTURES_END: &str = "2024-12-31";

/// Nom de la colonne constante ajoutée aux futures
pub const PRODUCT_COLUMN: &str = "Product";

/// Comportement du pipeline quand une étape échoue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Première erreur propagée à l'appelant, les fichiers déjà écrits restent
    FailFast,

    /// Le run entier échoue : erreur loggée une fois, aucun fichier, aucun résultat
    AllOrNothing,
}

/// Description complète d'un run
#[derive(Debug, Clone)]
pub struct PipelineJob {
    /// Nom du job (logs)
    pub name: String,

    pub registry: InstrumentRegistry,

    pub window: DateWindow,

    pub naming: NamingScheme,

    /// Colonne constante dont la valeur est le label de l'instrument
    pub annotation_column: Option<String>,

    pub policy: FailurePolicy,
}

impl PipelineJob {
    /// Job des paires de devises (DXY, EUR, CAD, NOK, RUB)
    pub fn currencies() -> Result<Self> {
        Ok(Self {
            name: "currencies".to_string(),
            registry: InstrumentRegistry::from_pairs(&CURRENCY_PAIRS),
            window: parse_window(CURRENCY_START, CURRENCY_END)?,
            naming: NamingScheme::prefixed("currency"),
            annotation_column: None,
            policy: FailurePolicy::FailFast,
        })
    }

    /// Job des futures (pétrole brut, gaz naturel)
    pub fn futures() -> Result<Self> {
        let instruments = FUTURES
            .iter()
            .map(|&(label, symbol, id)| Instrument::new(label, symbol).with_file_id(id))
            .collect();

        Ok(Self {
            name: "futures".to_string(),
            registry: InstrumentRegistry::new(instruments),
            window: parse_window(FUTURES_START, FUTURES_END)?,
            naming: NamingScheme::suffixed("futures"),
            annotation_column: Some(PRODUCT_COLUMN.to_string()),
            policy: FailurePolicy::AllOrNothing,
        })
    }

    /// Remplace la fenêtre (bornes absentes = valeurs du preset)
    pub fn with_window_override(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self> {
        if start.is_some() || end.is_some() {
            self.window = DateWindow::new(
                start.unwrap_or(self.window.start()),
                end.unwrap_or(self.window.end()),
            )?;
        }
        Ok(self)
    }
}

/// Parse une date au format YYYY-MM-DD
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Date invalide (attendu YYYY-MM-DD) : {}", value))
}

fn parse_window(start: &str, end: &str) -> Result<DateWindow> {
    DateWindow::new(parse_date(start)?, parse_date(end)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_preset() {
        let job = PipelineJob::currencies().unwrap();
        assert_eq!(job.registry.len(), 5);
        assert_eq!(job.window.to_string(), "2021-01-01 -> 2024-01-14");
        assert_eq!(job.policy, FailurePolicy::FailFast);
        assert!(job.annotation_column.is_none());

        let first = job.registry.iter().next().unwrap();
        assert_eq!((first.label.as_str(), first.symbol.as_str()), ("DXY", "DX-Y.NYB"));
    }

    #[test]
    fn test_futures_preset() {
        let job = PipelineJob::futures().unwrap();
        let ids: Vec<String> = job.registry.iter().map(|i| i.file_id().into_owned()).collect();
        assert_eq!(ids, vec!["crude_oil", "natural_gas"]);
        assert_eq!(job.window.end(), parse_date("2024-12-31").unwrap());
        assert_eq!(job.annotation_column.as_deref(), Some("Product"));
        assert_eq!(job.policy, FailurePolicy::AllOrNothing);
    }

    #[test]
    fn test_window_override() {
        let job = PipelineJob::currencies()
            .unwrap()
            .with_window_override(None, Some(parse_date("2022-01-01").unwrap()))
            .unwrap();
        assert_eq!(job.window.to_string(), "2021-01-01 -> 2022-01-01");

        let reversed = PipelineJob::currencies()
            .unwrap()
            .with_window_override(Some(parse_date("2030-01-01").unwrap()), None);
        assert!(reversed.is_err());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("01/02/2024").is_err());
    }
}
