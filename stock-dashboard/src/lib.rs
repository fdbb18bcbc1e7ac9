//! Stock Dashboard - Shared Library
//!
//! Terminal dashboard for a stock recommendation service: one card per
//! instrument, refreshed on a fixed period, with an on-demand detail view.
//!
//! The library includes:
//! - Quote payload types and display formatting
//! - REST client for the recommendation service
//! - Board/card view model and the detail overlay
//! - Background refresh, countdown and detail tasks
//! - Keyboard handling
//! - Ratatui rendering
pub mod board;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod input;
pub mod overlay;
pub mod scheduler;
pub mod types;
pub mod widget;

// Re-export commonly used types for convenience
pub use board::{Board, Card, DetailTrigger};
pub use client::{HttpQuoteSource, QuoteSource};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, RefreshOutcome};
pub use error::{DashboardError, DisplayTarget};
pub use format::{
    StyleToken, classify_recommendation, format_countdown, format_currency, format_timestamp,
};
pub use input::{KeyAction, handle_key};
pub use overlay::{DetailOverlay, Notification, open_detail};
pub use scheduler::{
    SharedDashboard, refresh, spawn_bulk_refresh, spawn_countdown, spawn_detail_handler,
};
pub use types::{DashboardEvent, PriceHistory, Quote};
pub use widget::{card_columns, render_dashboard};
