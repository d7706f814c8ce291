// ============================================================================
// Trait : PriceProvider
// ============================================================================
// Capacité de téléchargement minimale : (symbole, fenêtre) -> série ou erreur
//
// Le pipeline ne connaît que ce trait, ce qui permet de lui injecter
// Yahoo Finance en production et un faux fournisseur déterministe en test.
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateWindow, TimeSeries};

/// Erreurs du fournisseur de données
///
/// CONCEPT RUST : thiserror
/// - #[derive(Error)] implémente std::error::Error automatiquement
/// - #[error("...")] génère l'implémentation de Display
/// - #[from] permet la conversion automatique avec l'opérateur ?
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("requête HTTP échouée : {0}")]
    Http(#[from] reqwest::Error),

    #[error("le fournisseur a retourné HTTP {status} pour {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("symbole inconnu : {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("réponse inattendue : {0}")]
    Format(String),

    #[error("aucune donnée pour {symbol} sur {window}")]
    Empty { symbol: String, window: String },
}

/// Source de séries historiques journalières
///
/// CONCEPT RUST : #[async_trait]
/// - Les méthodes async dans un trait retournent une Box<dyn Future + Send>
/// - Une requête à la fois : le pipeline attend chaque appel avant le suivant
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Nom lisible du fournisseur (pour les logs)
    fn name(&self) -> &str;

    /// Télécharge la série complète du symbole sur la fenêtre
    async fn fetch(&self, symbol: &str, window: DateWindow) -> Result<TimeSeries, ProviderError>;
}
