// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données du pipeline
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod instrument; // Instruments et registre (label -> symbole)
pub mod series;     // Séances journalières et séries historiques
pub mod window;     // Fenêtre de dates [start, end)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use pricedump::models::series::TimeSeries;
// On peut faire : use pricedump::models::TimeSeries;
pub use instrument::{sanitize_label, Instrument, InstrumentRegistry};
pub use series::{Annotation, Bar, TimeSeries, INDEX_COLUMN, PREVIEW_ROWS, PRICE_COLUMNS};
pub use window::DateWindow;
