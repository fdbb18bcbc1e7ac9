//! Dashboard controller
//!
//! [`Dashboard`] owns every piece of mutable state: the board, the detail
//! overlay, the quote cache and the refresh deadline. Network results are
//! handed to it after the request completes, so a shared instance is never
//! locked across a request.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::{
    board::{Board, Card},
    client::QuoteSource,
    config::DashboardConfig,
    error::DashboardError,
    format::{format_countdown, format_currency, format_timestamp},
    overlay::{DetailOverlay, Notification},
    types::{PriceHistory, Quote},
};

/// Result of applying one bulk refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Existing cards patched in place
    pub updated: usize,
    /// Cards built for symbols seen for the first time
    pub created: usize,
    /// Response discarded because a newer one was already applied
    pub stale: bool,
}

pub struct Dashboard {
    config: DashboardConfig,
    board: Board,
    overlay: DetailOverlay,
    notification: Option<Notification>,
    cache: HashMap<String, Quote>,
    deadline: DateTime<Utc>,
    last_refresh: Option<DateTime<Utc>>,
    issued_seq: u64,
    applied_seq: u64,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self::new_at(config, Utc::now())
    }

    /// Create a dashboard whose first refresh is due one interval after `now`
    pub fn new_at(config: DashboardConfig, now: DateTime<Utc>) -> Self {
        let board = Board::new(config.show_countdown);
        let deadline = next_deadline(now, &config);
        Self {
            config,
            board,
            overlay: DetailOverlay::default(),
            notification: None,
            cache: HashMap::new(),
            deadline,
            last_refresh: None,
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn overlay(&self) -> &DetailOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut DetailOverlay {
        &mut self.overlay
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Most recent quote received for `symbol`
    pub fn cached_quote(&self, symbol: &str) -> Option<&Quote> {
        self.cache.get(symbol)
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Dismiss the notification, or else close the overlay
    ///
    /// Returns `false` if nothing was open.
    pub fn close_top(&mut self) -> bool {
        if self.notification.take().is_some() {
            return true;
        }
        if self.overlay.is_visible() {
            self.overlay.hide();
            return true;
        }
        false
    }

    // ----- Bulk refresh -----

    /// Fetch all quotes, degrading any failure to an empty list
    pub async fn fetch_all_quotes(&mut self, source: &dyn QuoteSource) -> Vec<Quote> {
        let result = source.fetch_quotes().await;
        self.settle_bulk(result, Utc::now())
    }

    /// Fetch all quotes and patch the board with them
    pub async fn refresh_all(&mut self, source: &dyn QuoteSource) -> RefreshOutcome {
        let seq = self.begin_refresh();
        let result = source.fetch_quotes().await;
        self.complete_refresh(seq, result, Utc::now())
    }

    /// Issue the sequence number for a bulk request about to be sent
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Apply the response of the bulk request issued as `seq`
    ///
    /// A response older than the last applied one is discarded. A failed
    /// request changes nothing.
    pub fn complete_refresh(
        &mut self,
        seq: u64,
        result: Result<Vec<Quote>, DashboardError>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if seq < self.applied_seq {
            debug!(
                "Discarding bulk response #{} (already applied #{})",
                seq, self.applied_seq
            );
            return RefreshOutcome {
                stale: true,
                ..Default::default()
            };
        }

        let quotes = self.settle_bulk(result, now);
        if quotes.is_empty() {
            return RefreshOutcome::default();
        }

        self.applied_seq = seq;
        self.apply_quotes(&quotes)
    }

    fn settle_bulk(
        &mut self,
        result: Result<Vec<Quote>, DashboardError>,
        now: DateTime<Utc>,
    ) -> Vec<Quote> {
        match result {
            Ok(quotes) => {
                self.deadline = next_deadline(now, &self.config);
                self.last_refresh = Some(now);
                quotes
            }
            Err(e) => {
                error!("Failed to fetch quotes: {}", e);
                Vec::new()
            }
        }
    }

    /// Patch or build the card of every quote and remember the quotes
    pub fn apply_quotes(&mut self, quotes: &[Quote]) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();

        for quote in quotes {
            match self.board.card_mut(&quote.symbol) {
                Ok(card) => {
                    card.apply_quote(Some(quote));
                    outcome.updated += 1;
                }
                Err(_) => {
                    info!("Adding card for {}", quote.symbol);
                    self.board.insert(Card::build(&quote.symbol, Some(quote)));
                    outcome.created += 1;
                }
            }
            self.cache.insert(quote.symbol.clone(), quote.clone());
        }

        outcome
    }

    // ----- Single instrument -----

    /// Fetch one quote, degrading any failure to `None`
    pub async fn fetch_quote(&mut self, source: &dyn QuoteSource, symbol: &str) -> Option<Quote> {
        let result = source.fetch_quote(symbol).await;
        self.settle_quote(symbol, result)
    }

    /// Cache a successful single fetch, log a failed one
    ///
    /// A failure leaves the cached quote for `symbol` as it was.
    pub fn settle_quote(
        &mut self,
        symbol: &str,
        result: Result<Quote, DashboardError>,
    ) -> Option<Quote> {
        match result {
            Ok(quote) => {
                self.cache.insert(symbol.to_string(), quote.clone());
                Some(quote)
            }
            Err(e) => {
                error!("Failed to fetch quote for {}: {}", symbol, e);
                None
            }
        }
    }

    pub fn settle_history(
        &self,
        symbol: &str,
        result: Result<PriceHistory, DashboardError>,
    ) -> Option<PriceHistory> {
        match result {
            Ok(history) => Some(history),
            Err(e) => {
                warn!("Failed to fetch price history for {}: {}", symbol, e);
                None
            }
        }
    }

    /// Show the overlay for `quote`, or notify that `symbol` is unavailable
    pub fn show_detail(&mut self, symbol: &str, quote: Option<&Quote>) -> bool {
        match quote {
            Some(quote) => {
                self.overlay.populate(quote);
                self.overlay.show();
                true
            }
            None => {
                self.notification = Some(Notification {
                    message: self.unavailable_message(symbol),
                });
                false
            }
        }
    }

    fn unavailable_message(&self, symbol: &str) -> String {
        match self.cache.get(symbol) {
            Some(last) => format!(
                "Data unavailable for {} (last known {} at {})",
                symbol,
                format_currency(last.price),
                format_timestamp(&last.date)
            ),
            None => format!("Data unavailable for {}", symbol),
        }
    }

    // ----- Countdown -----

    /// Milliseconds until the next bulk refresh is due, negative once overdue
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_milliseconds()
    }

    /// Redraw the countdown display
    pub fn tick_countdown(&mut self, now: DateTime<Utc>) -> Result<(), DashboardError> {
        let text = format_countdown(self.remaining_ms(now));
        self.board.set_countdown(text)
    }
}

fn next_deadline(now: DateTime<Utc>, config: &DashboardConfig) -> DateTime<Utc> {
    TimeDelta::from_std(config.refresh_interval)
        .ok()
        .and_then(|interval| now.checked_add_signed(interval))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
