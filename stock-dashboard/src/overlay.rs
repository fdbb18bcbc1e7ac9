//! Detail overlay and its controller
//!
//! The controller is the single subscriber of [`DashboardEvent::DetailRequested`]:
//! it fetches one quote, then either fills and shows the overlay or raises a
//! blocking notification.
//!
//! [`DashboardEvent::DetailRequested`]: crate::types::DashboardEvent::DetailRequested

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    client::QuoteSource,
    dashboard::Dashboard,
    error::{DashboardError, DisplayTarget},
    format::{StyleToken, format_currency, format_timestamp},
    types::{PriceHistory, Quote},
};

/// Detail view for one instrument
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailOverlay {
    visible: bool,
    symbol: Option<String>,
    pub title: String,
    pub price: String,
    pub rsi: String,
    pub adx: String,
    pub recommendation: String,
    pub style: StyleToken,
    pub last_updated: String,
    pub market_status: Option<String>,
    pub history: Option<PriceHistory>,
}

impl DetailOverlay {
    /// Fill every field from `quote`, dropping any history of a previous symbol
    pub fn populate(&mut self, quote: &Quote) {
        self.symbol = Some(quote.symbol.clone());
        self.title = format!("Details - {}", quote.symbol);
        self.price = format_currency(quote.price);
        self.rsi = format_indicator(quote.rsi);
        self.adx = format_indicator(quote.adx);
        self.recommendation = quote.recommendation.clone();
        self.style = StyleToken::classify(&quote.recommendation);
        self.last_updated = format_timestamp(&quote.date);
        self.market_status = quote.market_status.clone();
        self.history = None;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Symbol currently populated, if any
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Attach price history, only while the overlay still shows `symbol`
    pub fn attach_history(
        &mut self,
        symbol: &str,
        history: PriceHistory,
    ) -> Result<(), DashboardError> {
        if !self.visible || self.symbol.as_deref() != Some(symbol) {
            return Err(DashboardError::missing(DisplayTarget::Overlay, symbol));
        }
        self.history = Some(history);
        Ok(())
    }
}

/// Blocking message shown on top of everything until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

/// Render an indicator the way the service reports it: `45`, `27.5`
pub fn format_indicator(value: f64) -> String {
    format!("{value}")
}

/// Handle one detail request against the shared dashboard
///
/// The lock is released while requests are in flight. Returns whether the
/// overlay was shown.
pub async fn open_detail(state: &Mutex<Dashboard>, source: &dyn QuoteSource, symbol: &str) -> bool {
    info!("Opening details for {}", symbol);

    let result = source.fetch_quote(symbol).await;
    let shown = {
        let mut dashboard = state.lock().await;
        let quote = dashboard.settle_quote(symbol, result);
        dashboard.show_detail(symbol, quote.as_ref())
    };
    if !shown {
        return false;
    }

    let result = source.fetch_history(symbol).await;
    let mut dashboard = state.lock().await;
    if let Some(history) = dashboard.settle_history(symbol, result) {
        if let Err(e) = dashboard.overlay_mut().attach_history(symbol, history) {
            warn!("Dropping price history: {}", e);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DashboardConfig, dashboard::tests::StubSource};

    fn quote(symbol: &str) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price: 61.5,
            recommendation: "VENDER".to_string(),
            rsi: 72.0,
            adx: 27.5,
            date: "2024-01-02 15:30:00".to_string(),
            market_status: Some("ABERTO".to_string()),
        }
    }

    fn history() -> PriceHistory {
        PriceHistory {
            dates: vec!["01/01/2024".to_string(), "02/01/2024".to_string()],
            prices: vec![60.0, 61.5],
            min: 60.0,
            max: 61.5,
            change_pct: 2.5,
        }
    }

    #[test]
    fn test_populate_overlay() {
        let mut overlay = DetailOverlay::default();
        overlay.populate(&quote("VALE3"));

        assert!(!overlay.is_visible());
        assert_eq!(overlay.symbol(), Some("VALE3"));
        assert_eq!(overlay.title, "Details - VALE3");
        assert_eq!(overlay.price, "R$ 61,50");
        assert_eq!(overlay.rsi, "72");
        assert_eq!(overlay.adx, "27.5");
        assert_eq!(overlay.style, StyleToken::Sell);
        assert_eq!(overlay.last_updated, "02/01/2024, 15:30:00");
        assert_eq!(overlay.market_status.as_deref(), Some("ABERTO"));
    }

    #[test]
    fn test_attach_history_guarded() {
        let mut overlay = DetailOverlay::default();
        assert!(overlay.attach_history("VALE3", history()).is_err());

        overlay.populate(&quote("VALE3"));
        overlay.show();
        assert!(overlay.attach_history("PETR4", history()).is_err());
        overlay.attach_history("VALE3", history()).unwrap();
        assert_eq!(overlay.history, Some(history()));

        overlay.hide();
        assert!(overlay.attach_history("VALE3", history()).is_err());
    }

    #[tokio::test]
    async fn test_open_detail_shows_overlay() {
        let source = StubSource::default()
            .with_quote(Ok(quote("VALE3")))
            .with_history(Ok(history()));
        let state = Mutex::new(Dashboard::new(DashboardConfig::default()));

        assert!(open_detail(&state, &source, "VALE3").await);

        let dashboard = state.lock().await;
        assert!(dashboard.overlay().is_visible());
        assert_eq!(dashboard.overlay().title, "Details - VALE3");
        assert_eq!(dashboard.overlay().history, Some(history()));
        assert_eq!(dashboard.notification(), None);
        assert_eq!(dashboard.cached_quote("VALE3"), Some(&quote("VALE3")));
    }

    #[tokio::test]
    async fn test_open_detail_without_history() {
        let source = StubSource::default()
            .with_quote(Ok(quote("VALE3")))
            .with_history(Err(DashboardError::Status(400)));
        let state = Mutex::new(Dashboard::new(DashboardConfig::default()));

        assert!(open_detail(&state, &source, "VALE3").await);

        let dashboard = state.lock().await;
        assert!(dashboard.overlay().is_visible());
        assert_eq!(dashboard.overlay().history, None);
    }

    #[tokio::test]
    async fn test_open_detail_failure_notifies() {
        let source = StubSource::default().with_quote(Err(DashboardError::Status(404)));
        let state = Mutex::new(Dashboard::new(DashboardConfig::default()));

        assert!(!open_detail(&state, &source, "XXXX3").await);

        let dashboard = state.lock().await;
        assert!(!dashboard.overlay().is_visible());
        assert_eq!(dashboard.overlay().symbol(), None);
        let notification = dashboard.notification().unwrap();
        assert_eq!(notification.message, "Data unavailable for XXXX3");
        assert_eq!(source.history_calls(), 0);
    }
}
