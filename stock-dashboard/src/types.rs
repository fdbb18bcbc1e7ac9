//! Core data types for quote payloads
//!
//! These types match the JSON returned by the recommendation service at
//! `/api/stocks`, `/api/stock/{symbol}` and `/api/historico/{symbol}`.

use serde::{Deserialize, Serialize};

/// Recommendation label the service sends outside trading hours
pub const MARKET_CLOSED: &str = "MERCADO FECHADO";

/// Recommendation label for a buy signal
pub const BUY: &str = "COMPRAR";

/// Recommendation label for a sell signal
pub const SELL: &str = "VENDER";

/// Quote for a single instrument
///
/// Server-supplied and transient: the client only displays it and remembers
/// the latest one per symbol.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Quote {
    /// Instrument identifier (e.g., "PETR4.SA")
    pub symbol: String,
    /// Last close price
    pub price: f64,
    /// Raw recommendation label ("COMPRAR", "VENDER", "MERCADO FECHADO", ...)
    pub recommendation: String,
    /// Relative Strength Index
    #[serde(default)]
    pub rsi: f64,
    /// Average Directional Index
    #[serde(default)]
    pub adx: f64,
    /// Timestamp of the quote, as sent by the server
    pub date: String,
    /// Trading session state ("ABERTO" / "FECHADO"), not sent by every backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_status: Option<String>,
}

impl Quote {
    /// Check if the service flagged the market as closed for this quote
    pub fn is_market_closed(&self) -> bool {
        self.recommendation == MARKET_CLOSED
    }
}

/// One month of daily closes for an instrument
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceHistory {
    /// Session dates, already formatted by the server (DD/MM/YYYY)
    #[serde(rename = "datas")]
    pub dates: Vec<String>,
    /// Daily closes, oldest first
    #[serde(rename = "precos")]
    pub prices: Vec<f64>,
    pub min: f64,
    pub max: f64,
    /// Change between first and last close, in percent
    #[serde(rename = "variacao")]
    pub change_pct: f64,
}

/// Commands emitted by cards and consumed by a single subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// The detail trigger of a card was activated
    DetailRequested(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_from_server_payload() {
        let json = r#"{
            "symbol": "PETR4.SA",
            "price": 38.42,
            "rsi": 45,
            "adx": 27,
            "recommendation": "MANTER",
            "date": "2024-01-01 10:00:00",
            "market_status": "ABERTO"
        }"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.symbol, "PETR4.SA");
        assert_eq!(quote.price, 38.42);
        assert_eq!(quote.rsi, 45.0);
        assert_eq!(quote.adx, 27.0);
        assert_eq!(quote.market_status.as_deref(), Some("ABERTO"));
        assert!(!quote.is_market_closed());
    }

    #[test]
    fn test_quote_without_indicators() {
        let json = r#"{"symbol":"VALE3","price":61.0,"recommendation":"MERCADO FECHADO","date":"2024-01-01T10:00:00"}"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.rsi, 0.0);
        assert_eq!(quote.adx, 0.0);
        assert_eq!(quote.market_status, None);
        assert!(quote.is_market_closed());
    }

    #[test]
    fn test_price_history_field_names() {
        let json = r#"{
            "datas": ["01/01/2024", "02/01/2024"],
            "precos": [10.0, 11.0],
            "min": 10.0,
            "max": 11.0,
            "variacao": 10.0
        }"#;

        let history: PriceHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.dates.len(), 2);
        assert_eq!(history.prices, vec![10.0, 11.0]);
        assert_eq!(history.change_pct, 10.0);
    }
}
