//! Display formatting for quotes
//!
//! Pure functions, fixed to the pt-BR locale and BRL currency the
//! recommendation service quotes in.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use ratatui::style::Color;
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};

use crate::types::{BUY, MARKET_CLOSED, SELL};

const CURRENCY_SYMBOL: &str = "R$";
const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Rendered in place of a timestamp that could not be parsed
pub const INVALID_DATE: &str = "Invalid Date";

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// Same palette as the card borders
const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_CLOSED: Color = Color::Rgb(120, 120, 120);

/// Visual category of a recommendation
///
/// A card carries exactly one token at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleToken {
    Closed,
    Buy,
    Sell,
    #[default]
    Neutral,
}

impl StyleToken {
    /// Map a raw recommendation label to its style token
    ///
    /// The closed-market label is matched first, exactly (case-sensitive,
    /// untrimmed).
    pub fn classify(label: &str) -> Self {
        if label == MARKET_CLOSED {
            return StyleToken::Closed;
        }
        match label {
            BUY => StyleToken::Buy,
            SELL => StyleToken::Sell,
            _ => StyleToken::Neutral,
        }
    }

    /// Stable class-like name
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleToken::Closed => "closed",
            StyleToken::Buy => "buy",
            StyleToken::Sell => "sell",
            StyleToken::Neutral => "neutral",
        }
    }

    /// Terminal colour for badges and borders
    pub fn color(&self) -> Color {
        match self {
            StyleToken::Closed => C_CLOSED,
            StyleToken::Buy => C_BUY,
            StyleToken::Sell => C_SELL,
            StyleToken::Neutral => C_NEUTRAL,
        }
    }
}

impl std::fmt::Display for StyleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shorthand for [`StyleToken::classify`]
pub fn classify_recommendation(label: &str) -> StyleToken {
    StyleToken::classify(label)
}

/// Format a price as BRL, e.g. `R$ 1.234,50`
pub fn format_currency(value: f64) -> String {
    if value.is_nan() {
        return format!("{CURRENCY_SYMBOL} NaN");
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}{CURRENCY_SYMBOL} ∞");
    }

    let (negative, digits) = match Decimal::from_f64(value) {
        Some(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let negative = rounded.is_sign_negative() && !rounded.is_zero();
            rounded = rounded.abs();
            rounded.rescale(2);
            (negative, rounded.to_string())
        }
        // Out of Decimal range, fall back to float formatting
        None => (value < 0.0, format!("{:.2}", value.abs())),
    };

    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}{CURRENCY_SYMBOL} {}{DECIMAL_SEPARATOR}{fraction}",
        group_thousands(integer)
    )
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Parse the timestamp formats the service is known to send
///
/// Offset-bearing timestamps are converted to local time, naive ones are
/// taken as local already.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Format a server timestamp for display, e.g. `01/01/2024, 10:00:00`
///
/// Unparseable input yields [`INVALID_DATE`] rather than an error.
pub fn format_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(parsed) => parsed.format(TIMESTAMP_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Format the time left until the next refresh as `M:SS`
///
/// Minutes are not rolled over into hours.
pub fn format_countdown(ms_remaining: i64) -> String {
    if ms_remaining < 0 {
        return "0:00".to_string();
    }
    let minutes = ms_remaining / 60_000;
    let seconds = (ms_remaining % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}
