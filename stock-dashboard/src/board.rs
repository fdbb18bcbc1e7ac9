//! Board of instrument cards
//!
//! The [`Board`] is the container: one [`Card`] per symbol, kept in insertion
//! order. Cards are built once and then patched in place on every refresh.

use indexmap::IndexMap;

use crate::{
    error::{DashboardError, DisplayTarget},
    format::{StyleToken, format_currency, format_timestamp},
    types::{DashboardEvent, Quote},
};

/// Placeholder shown until a card receives its first quote
pub const PLACEHOLDER: &str = "--";

/// Detail trigger of a card, identified by the symbol it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTrigger {
    pub symbol: String,
}

impl DetailTrigger {
    /// Emit the command the overlay controller subscribes to
    pub fn activate(&self) -> DashboardEvent {
        DashboardEvent::DetailRequested(self.symbol.clone())
    }
}

/// Summary card for one instrument
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub price: String,
    pub recommendation: String,
    pub style: StyleToken,
    pub last_updated: String,
    pub market_closed: bool,
    pub trigger: DetailTrigger,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            title: String::new(),
            price: PLACEHOLDER.to_string(),
            recommendation: PLACEHOLDER.to_string(),
            style: StyleToken::default(),
            last_updated: PLACEHOLDER.to_string(),
            market_closed: false,
            trigger: DetailTrigger {
                symbol: String::new(),
            },
        }
    }
}

impl Card {
    /// Build a fresh card for `symbol`, applying `quote` when one is given
    pub fn build(symbol: &str, quote: Option<&Quote>) -> Self {
        let mut card = Self {
            title: symbol.to_string(),
            trigger: DetailTrigger {
                symbol: symbol.to_string(),
            },
            ..Default::default()
        };
        card.apply_quote(quote);
        card
    }

    pub fn symbol(&self) -> &str {
        &self.trigger.symbol
    }

    /// Replace the displayed fields with those of `quote`
    ///
    /// `None` leaves the card untouched.
    pub fn apply_quote(&mut self, quote: Option<&Quote>) {
        let Some(quote) = quote else {
            return;
        };

        self.price = format_currency(quote.price);
        self.recommendation = quote.recommendation.clone();
        self.style = StyleToken::classify(&quote.recommendation);
        self.last_updated = format_timestamp(&quote.date);
        self.market_closed = quote.is_market_closed();
    }

    pub fn activate_trigger(&self) -> DashboardEvent {
        self.trigger.activate()
    }
}

/// Container of cards plus the countdown display
#[derive(Debug, Clone, Default)]
pub struct Board {
    cards: IndexMap<String, Card>,
    countdown: Option<String>,
    selected: usize,
}

impl Board {
    /// Create an empty board, with or without a countdown display
    pub fn new(with_countdown: bool) -> Self {
        Self {
            cards: IndexMap::new(),
            countdown: with_countdown.then(String::new),
            selected: 0,
        }
    }

    /// Insert a card keyed by its symbol
    ///
    /// Returns `false` and keeps the existing card if the symbol is already
    /// on the board.
    pub fn insert(&mut self, card: Card) -> bool {
        if self.cards.contains_key(card.symbol()) {
            return false;
        }
        self.cards.insert(card.symbol().to_string(), card);
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.cards.contains_key(symbol)
    }

    pub fn card(&self, symbol: &str) -> Option<&Card> {
        self.cards.get(symbol)
    }

    pub fn card_mut(&mut self, symbol: &str) -> Result<&mut Card, DashboardError> {
        self.cards
            .get_mut(symbol)
            .ok_or_else(|| DashboardError::missing(DisplayTarget::Card, symbol))
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Current countdown text, `None` if the board has no countdown display
    pub fn countdown(&self) -> Option<&str> {
        self.countdown.as_deref()
    }

    pub fn set_countdown(&mut self, text: impl Into<String>) -> Result<(), DashboardError> {
        match self.countdown.as_mut() {
            Some(countdown) => {
                *countdown = text.into();
                Ok(())
            }
            None => Err(DashboardError::missing(DisplayTarget::Countdown, "")),
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.cards.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&Card> {
        self.cards.get_index(self.selected).map(|(_, card)| card)
    }

    /// Move the selection by `delta` cards, clamped to the board
    pub fn select_offset(&mut self, delta: isize) {
        if self.cards.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.cards.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn select_next(&mut self) {
        self.select_offset(1);
    }

    pub fn select_prev(&mut self) {
        self.select_offset(-1);
    }

    /// Activate the detail trigger of the selected card
    pub fn activate_selected(&self) -> Option<DashboardEvent> {
        self.selected().map(Card::activate_trigger)
    }
}
