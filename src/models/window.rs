// ============================================================================
// Structure : DateWindow
// ============================================================================
// Fenêtre historique bornée [start, end) demandée au fournisseur.
// La date de fin est exclusive : une fenêtre 2021-01-01 -> 2024-01-14
// s'arrête à la séance du 13 janvier.
// ============================================================================

use anyhow::{ensure, Result};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Crée une fenêtre, refuse start >= end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        ensure!(
            start < end,
            "Fenêtre de dates invalide : {} doit précéder {}",
            start,
            end
        );
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Timestamp Unix (UTC, minuit) du début de la fenêtre
    pub fn start_timestamp(&self) -> i64 {
        midnight_utc(self.start)
    }

    /// Timestamp Unix (UTC, minuit) de la fin exclusive
    pub fn end_timestamp(&self) -> i64 {
        midnight_utc(self.end)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
