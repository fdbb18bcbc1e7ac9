//! Background tasks driving the dashboard
//!
//! - bulk refresh: re-fetches every quote once per refresh interval
//! - countdown: redraws the time left until the next refresh every second
//! - detail handler: the single subscriber of card detail requests

use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    client::QuoteSource,
    dashboard::{Dashboard, RefreshOutcome},
    overlay::open_detail,
    types::DashboardEvent,
};

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Run one bulk refresh against the shared dashboard
///
/// The lock is only taken to issue the sequence number and to apply the
/// response, never while the request is in flight.
pub async fn refresh(state: &Mutex<Dashboard>, source: &dyn QuoteSource) -> RefreshOutcome {
    let seq = state.lock().await.begin_refresh();
    let result = source.fetch_quotes().await;
    let outcome = state.lock().await.complete_refresh(seq, result, Utc::now());

    if outcome.stale {
        debug!("Bulk refresh #{} superseded", seq);
    } else {
        info!(
            "Bulk refresh #{}: {} updated, {} new",
            seq, outcome.updated, outcome.created
        );
    }
    outcome
}

/// Spawn the bulk refresh timer
///
/// The first tick fires one `period` after start. Each tick runs in its own
/// task, so a slow response never delays the next tick.
pub fn spawn_bulk_refresh(
    state: SharedDashboard,
    source: Arc<dyn QuoteSource>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let state = Arc::clone(&state);
            let source = Arc::clone(&source);
            tokio::spawn(async move {
                refresh(&state, source.as_ref()).await;
            });
        }
    })
}

/// Spawn the countdown timer
pub fn spawn_countdown(state: SharedDashboard, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Err(e) = state.lock().await.tick_countdown(Utc::now()) {
                debug!("Countdown skipped: {}", e);
            }
        }
    })
}

/// Spawn the subscriber handling detail requests emitted by cards
///
/// Requests are handled one at a time, in the order they were emitted. The
/// task ends when every sender is dropped.
pub fn spawn_detail_handler(
    state: SharedDashboard,
    source: Arc<dyn QuoteSource>,
    mut event_rx: mpsc::Receiver<DashboardEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                DashboardEvent::DetailRequested(symbol) => {
                    open_detail(&state, source.as_ref(), &symbol).await;
                }
            }
        }
        debug!("Detail request channel closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DashboardConfig,
        dashboard::tests::{StubSource, quote},
        error::DashboardError,
        format::StyleToken,
    };

    fn shared(config: DashboardConfig) -> SharedDashboard {
        Arc::new(Mutex::new(Dashboard::new(config)))
    }

    #[tokio::test]
    async fn test_refresh_applies_quotes() {
        let source = StubSource::default().with_quotes(Ok(vec![quote("PETR4", "COMPRAR")]));
        let state = Mutex::new(Dashboard::new(DashboardConfig::default()));

        let outcome = refresh(&state, &source).await;
        assert_eq!(outcome.created, 1);
        assert!(state.lock().await.board().contains("PETR4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_refresh_waits_one_period() {
        let source: Arc<dyn QuoteSource> = Arc::new(
            StubSource::default()
                .with_quotes(Ok(vec![quote("PETR4", "COMPRAR")]))
                .with_quotes(Ok(vec![quote("PETR4", "VENDER")])),
        );
        let state = shared(DashboardConfig::default());
        let period = Duration::from_secs(300);

        let handle = spawn_bulk_refresh(Arc::clone(&state), source, period);

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert!(state.lock().await.board().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            state.lock().await.board().card("PETR4").unwrap().style,
            StyleToken::Buy
        );

        tokio::time::sleep(period).await;
        let dashboard = state.lock().await;
        assert_eq!(dashboard.board().len(), 1);
        assert_eq!(dashboard.board().card("PETR4").unwrap().style, StyleToken::Sell);
        drop(dashboard);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_refresh_survives_failed_tick() {
        let source: Arc<dyn QuoteSource> = Arc::new(
            StubSource::default().with_quotes(Err(DashboardError::Status(503))),
        );
        let state = shared(DashboardConfig::default());
        state
            .lock()
            .await
            .apply_quotes(&[quote("PETR4", "COMPRAR")]);
        let before = state.lock().await.board().card("PETR4").cloned();

        let handle = spawn_bulk_refresh(Arc::clone(&state), source, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(!handle.is_finished());
        assert_eq!(state.lock().await.board().card("PETR4").cloned(), before);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_writes_display() {
        let state = shared(DashboardConfig::default());
        assert_eq!(state.lock().await.board().countdown(), Some(""));

        let handle = spawn_countdown(Arc::clone(&state), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let text = state.lock().await.board().countdown().map(str::to_string);
        assert!(matches!(text.as_deref(), Some("5:00") | Some("4:59")), "{text:?}");

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_without_display_is_noop() {
        let state = shared(DashboardConfig::default().with_countdown(false));

        let handle = spawn_countdown(Arc::clone(&state), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(!handle.is_finished());
        assert_eq!(state.lock().await.board().countdown(), None);

        handle.abort();
    }

    #[tokio::test]
    async fn test_detail_handler_consumes_requests() {
        let source: Arc<dyn QuoteSource> = Arc::new(
            StubSource::default()
                .with_quote(Ok(quote("PETR4", "COMPRAR")))
                .with_history(Err(DashboardError::Status(404))),
        );
        let state = shared(DashboardConfig::default());
        let (event_tx, event_rx) = mpsc::channel(8);

        let handle = spawn_detail_handler(Arc::clone(&state), source, event_rx);

        let card = crate::board::Card::build("PETR4", None);
        event_tx.send(card.activate_trigger()).await.unwrap();
        drop(event_tx);
        handle.await.unwrap();

        let dashboard = state.lock().await;
        assert!(dashboard.overlay().is_visible());
        assert_eq!(dashboard.overlay().symbol(), Some("PETR4"));
    }
}
