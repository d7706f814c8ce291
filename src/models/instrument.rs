// ============================================================================
// Structure : Instrument / InstrumentRegistry
// ============================================================================
// Représente un instrument financier (paire de devises, contrat future, indice)
// identifié par un label lisible et un symbole propre au fournisseur.
//
// CONCEPTS RUST :
// 1. String vs &str :
//    - String : owned string (possède la mémoire, heap allocated)
//    - &str : borrowed string slice (référence, ne possède pas)
//    - Le registre possède ses instruments, on utilise donc String
//
// 2. Cow<'_, str> : "clone on write"
//    - Retourne une référence quand aucune transformation n'est nécessaire
//    - Alloue une nouvelle String seulement si on doit modifier le texte
// ============================================================================

use std::borrow::Cow;

/// Un instrument à télécharger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Label lisible (ex: "EUR/USD", "Crude Oil")
    pub label: String,

    /// Symbole chez le fournisseur (ex: "EURUSD=X", "CL=F")
    pub symbol: String,

    /// Identifiant explicite pour les noms de fichiers (ex: "crude_oil")
    /// Si absent, on dérive l'identifiant du label
    pub file_id: Option<String>,
}

impl Instrument {
    /// Constructeur : crée un instrument dont l'identifiant dérive du label
    pub fn new(label: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
            file_id: None,
        }
    }

    /// Fixe un identifiant de fichier explicite
    ///
    /// CONCEPT RUST : Builder pattern par valeur
    /// - Consomme self et retourne Self modifié
    /// - Permet d'enchaîner : Instrument::new(..).with_file_id(..)
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    /// Identifiant utilisé dans le nom du fichier de sortie
    ///
    /// Les "/" du label sont remplacés par "_" (ex: "EUR/USD" -> "EUR_USD")
    pub fn file_id(&self) -> Cow<'_, str> {
        match &self.file_id {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => sanitize_label(&self.label),
        }
    }
}

/// Rend un label utilisable dans un nom de fichier
pub fn sanitize_label(label: &str) -> Cow<'_, str> {
    if label.contains('/') {
        Cow::Owned(label.replace('/', "_"))
    } else {
        Cow::Borrowed(label)
    }
}

/// Registre ordonné d'instruments
///
/// L'ordre d'insertion est l'ordre de traitement par le pipeline.
/// Le registre n'est jamais modifié après sa construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentRegistry {
    instruments: Vec<Instrument>,
}

impl InstrumentRegistry {
    /// Crée un registre à partir d'une liste d'instruments
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Crée un registre à partir de paires (label, symbole)
    ///
    /// CONCEPT RUST : Iterators
    /// - .iter().map(...).collect() transforme le slice en Vec<Instrument>
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let instruments = pairs
            .iter()
            .map(|&(label, symbol)| Instrument::new(label, symbol))
            .collect();
        Self::new(instruments)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instrument> {
        self.instruments.iter()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_replaces_slash() {
        let eur = Instrument::new("EUR/USD", "EURUSD=X");
        assert_eq!(eur.file_id(), "EUR_USD");

        let dxy = Instrument::new("DXY", "DX-Y.NYB");
        assert_eq!(dxy.file_id(), "DXY");
    }

    #[test]
    fn test_explicit_file_id() {
        let cl = Instrument::new("Crude Oil", "CL=F").with_file_id("crude_oil");
        assert_eq!(cl.file_id(), "crude_oil");
        assert_eq!(cl.label, "Crude Oil");
    }

    #[test]
    fn test_sanitize_label_multiple_slashes() {
        assert_eq!(sanitize_label("A/B/C"), "A_B_C");
        assert!(matches!(sanitize_label("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_registry_keeps_order() {
        let registry = InstrumentRegistry::from_pairs(&[
            ("DXY", "DX-Y.NYB"),
            ("EUR/USD", "EURUSD=X"),
            ("CAD/USD", "CADUSD=X"),
        ]);

        let labels: Vec<&str> = registry.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["DXY", "EUR/USD", "CAD/USD"]);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
        assert!(InstrumentRegistry::default().is_empty());
    }
}
