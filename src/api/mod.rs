// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client qui récupère les séries historiques
// (Yahoo Finance) et le trait qui permet de le substituer en test
// ============================================================================

pub mod provider; // Trait PriceProvider + erreurs
pub mod yahoo;    // Client API Yahoo Finance

// Re-export des types principaux
pub use provider::{PriceProvider, ProviderError};
pub use yahoo::YahooProvider;
