// ============================================================================
// PriceDump - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;      // Fournisseur de données (Yahoo Finance)
pub mod config;   // Jobs préconfigurés (devises, futures)
pub mod models;   // Structures de données
pub mod pipeline; // Boucle télécharger -> sauvegarder
pub mod report;   // Diagnostics structurés
pub mod storage;  // Nommage et écriture CSV

pub use pipeline::{PersistedSeries, Pipeline};
