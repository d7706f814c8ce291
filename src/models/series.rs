// ============================================================================
// Structure : Bar / TimeSeries
// ============================================================================
// Représente une série historique journalière pour un instrument
//
// CONCEPTS RUST :
// 1. NaiveDate : date de chrono sans timezone (index journalier)
// 2. f64 : floating point 64 bits pour les prix (précision suffisante)
// 3. u64 : unsigned 64 bits pour le volume (toujours positif)
// ============================================================================

use chrono::NaiveDate;

/// Nom de la colonne d'index dans les fichiers de sortie
pub const INDEX_COLUMN: &str = "Date";

/// Colonnes numériques fournies pour chaque séance
pub const PRICE_COLUMNS: [&str; 6] = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// Nombre de lignes affichées dans un aperçu
pub const PREVIEW_ROWS: usize = 5;

/// Une séance journalière (Open, High, Low, Close, Adj Close, Volume)
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Date de la séance (timezone de la place de cotation)
    pub date: NaiveDate,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Clôture ajustée des dividendes et splits
    pub adj_close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl Bar {
    /// Constructeur : crée une nouvelle séance
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }
    }

    /// Valeurs numériques formatées, dans l'ordre de PRICE_COLUMNS
    pub fn values(&self) -> [String; 6] {
        [
            self.open.to_string(),
            self.high.to_string(),
            self.low.to_string(),
            self.close.to_string(),
            self.adj_close.to_string(),
            self.volume.to_string(),
        ]
    }
}

/// Colonne constante ajoutée avant l'écriture (ex: Product = "Crude Oil")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub column: String,
    pub value: String,
}

/// Série historique d'un instrument
///
/// CONCEPT RUST : Ownership
/// - TimeSeries possède le Vec de séances
/// - Chaque invocation du pipeline possède ses propres séries,
///   rien n'est partagé entre instruments
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Symbole du fournisseur
    pub symbol: String,

    /// Séances, triées par date croissante
    pub bars: Vec<Bar>,

    /// Colonne constante optionnelle
    pub annotation: Option<Annotation>,
}

impl TimeSeries {
    /// Crée une série vide
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
            annotation: None,
        }
    }

    /// Crée une série à partir de séances déjà chargées
    pub fn with_bars(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            annotation: None,
        }
    }

    /// Ajoute une séance
    pub fn add_bar(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// Ajoute (ou remplace) la colonne constante
    pub fn annotate(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.annotation = Some(Annotation {
            column: column.into(),
            value: value.into(),
        });
    }

    /// Retourne le nombre de séances
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Noms des colonnes de données (hors index)
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = PRICE_COLUMNS.to_vec();
        if let Some(annotation) = &self.annotation {
            columns.push(annotation.column.as_str());
        }
        columns
    }

    /// Forme de la série : (lignes, colonnes), l'index n'est pas compté
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.columns().len())
    }

    /// Les n premières séances
    pub fn head(&self, n: usize) -> &[Bar] {
        &self.bars[..n.min(self.bars.len())]
    }

    /// Une ligne complète (index + valeurs numériques + annotation)
    fn row(&self, bar: &Bar) -> Vec<String> {
        let mut row = Vec::with_capacity(PRICE_COLUMNS.len() + 2);
        row.push(bar.date.format("%Y-%m-%d").to_string());
        row.extend(bar.values());
        if let Some(annotation) = &self.annotation {
            row.push(annotation.value.clone());
        }
        row
    }

    /// Toutes les lignes, prêtes à écrire
    ///
    /// CONCEPT RUST : impl Iterator
    /// - Retourne un itérateur paresseux sans allouer de Vec intermédiaire
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.bars.iter().map(move |bar| self.row(bar))
    }

    /// Aperçu texte des n premières lignes, colonnes alignées
    pub fn preview(&self, n: usize) -> String {
        let mut header = vec![INDEX_COLUMN.to_string()];
        header.extend(self.columns().into_iter().map(String::from));

        let mut table: Vec<Vec<String>> = vec![header];
        table.extend(self.head(n).iter().map(|bar| self.row(bar)));

        let widths: Vec<usize> = (0..table[0].len())
            .map(|col| table.iter().map(|row| row[col].len()).max().unwrap_or(0))
            .collect();

        table
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
