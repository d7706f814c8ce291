// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère les séries historiques journalières depuis l'API "chart" v8
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : erreurs typées avec thiserror
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::provider::{PriceProvider, ProviderError};
use crate::models::{Bar, DateWindow, TimeSeries};

/// URL de base de l'API publique
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// User-Agent de navigateur pour éviter le blocage par Yahoo
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Yahoo retourne un JSON imbriqué, on définit des structures qui matchent
// exactement la structure JSON pour que serde puisse désérialiser automatiquement
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Métadonnées du symbole
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    symbol: Option<String>,
    /// Timezone IANA de la place de cotation (ex: "America/New_York")
    exchange_timezone_name: Option<String>,
    /// Décalage (secondes) au moment de la requête, pas à la date de chaque séance
    #[serde(rename = "gmtoffset")]
    gmt_offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

/// Données OHLCV (Open, High, Low, Close, Volume)
#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

// ============================================================================
// Client
// ============================================================================

/// Fournisseur Yahoo Finance
///
/// Le client HTTP est créé une seule fois et réutilisé pour chaque instrument.
/// Aucun timeout propre : on garde les valeurs par défaut de reqwest.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    /// Crée un client pointant vers l'API publique
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Crée un client avec une URL de base personnalisée (serveur simulé en test)
    pub fn with_base_url(base_url: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Construit l'URL "chart" du symbole
    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    /// Télécharge les séances journalières du symbole
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Macro tracing qui ajoute automatiquement un span
    /// - Tous les logs à l'intérieur auront le contexte symbol + window
    #[instrument(skip(self, window), fields(window = %window))]
    async fn fetch(&self, symbol: &str, window: DateWindow) -> Result<TimeSeries, ProviderError> {
        let url = self.chart_url(symbol);
        let period1 = window.start_timestamp().to_string();
        let period2 = window.end_timestamp().to_string();
        debug!(url = %url, period1 = %period1, period2 = %period2, "Built Yahoo Finance API URL");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if status == reqwest::StatusCode::NOT_FOUND {
            warn!("Yahoo Finance does not know this symbol");
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        if !status.is_success() {
            error!(status = %status, "Yahoo Finance returned error status");
            return Err(ProviderError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let chart: ChartResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Format(e.to_string()))?;

        let series = parse_chart_response(chart, symbol, window)?;
        info!(rows = series.len(), "Successfully fetched price history");
        Ok(series)
    }
}

/// Horloge de la place de cotation, pour dater chaque séance
///
/// Yahoo horodate les séances journalières à minuit heure locale.
/// Avec une timezone nommée, le changement d'heure est pris en compte
/// séance par séance. Le gmtoffset fixe ne sert qu'en dernier recours.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExchangeClock {
    Named(Tz),
    Fixed(i64),
}

impl ExchangeClock {
    fn from_meta(meta: &Meta) -> Self {
        let offset = meta.gmt_offset.unwrap_or(0);
        match meta.exchange_timezone_name.as_deref() {
            Some(name) => match name.parse::<Tz>() {
                Ok(tz) => ExchangeClock::Named(tz),
                Err(_) => {
                    warn!(timezone = %name, offset, "Unknown exchange timezone, using fixed offset");
                    ExchangeClock::Fixed(offset)
                }
            },
            None => ExchangeClock::Fixed(offset),
        }
    }

    /// Date locale d'un timestamp Unix
    fn local_date(&self, timestamp: i64) -> Option<NaiveDate> {
        match self {
            ExchangeClock::Named(tz) => Some(
                Utc.timestamp_opt(timestamp, 0)
                    .single()?
                    .with_timezone(tz)
                    .date_naive(),
            ),
            ExchangeClock::Fixed(offset) => {
                Some(DateTime::from_timestamp(timestamp + offset, 0)?.date_naive())
            }
        }
    }
}

/// Convertit la réponse Yahoo en TimeSeries
///
/// Les dates sont calculées dans la timezone de la place de cotation,
/// comme l'index journalier affiché par Yahoo.
fn parse_chart_response(
    response: ChartResponse,
    symbol: &str,
    window: DateWindow,
) -> Result<TimeSeries, ProviderError> {
    let chart = response.chart;

    if let Some(err) = chart.error {
        if err.code == "Not Found" {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        return Err(ProviderError::Format(format!(
            "{}: {}",
            err.code,
            err.description.unwrap_or_default()
        )));
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::Format("aucun résultat dans la réponse".into()))?;

    if let Some(returned) = &result.meta.symbol {
        if returned != symbol {
            debug!(requested = %symbol, returned = %returned, "Provider returned a different symbol label");
        }
    }

    let clock = ExchangeClock::from_meta(&result.meta);
    let timestamps = result.timestamp.unwrap_or_default();

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .and_then(|a| a.adjclose)
        .unwrap_or_default();

    let mut series = TimeSeries::new(symbol);
    let mut skipped = 0usize;

    for (i, &timestamp) in timestamps.iter().enumerate() {
        // Une séance sans open/high/low/close est ignorée
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&opens, i),
            value_at(&highs, i),
            value_at(&lows, i),
            value_at(&closes, i),
        ) else {
            skipped += 1;
            continue;
        };

        let adj_close = value_at(&adj_closes, i).unwrap_or(close);
        let volume = volumes.get(i).copied().flatten().unwrap_or(0);

        let date = clock
            .local_date(timestamp)
            .ok_or_else(|| ProviderError::Format(format!("timestamp invalide : {}", timestamp)))?;

        series.add_bar(Bar::new(date, open, high, low, close, adj_close, volume));
    }

    if skipped > 0 {
        warn!(
            skipped,
            total = timestamps.len(),
            "Skipped bars with missing data"
        );
    }

    if series.is_empty() {
        error!("No valid bar found");
        return Err(ProviderError::Empty {
            symbol: symbol.to_string(),
            window: window.to_string(),
        });
    }

    Ok(series)
}

fn value_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

// ============================================================================
// Tests unitaires
// ============================================================================
