use std::fmt;
use thiserror::Error;

/// Display targets the dashboard writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    /// Card for a given symbol on the board
    Card,
    /// Countdown to the next bulk refresh
    Countdown,
    /// Detail overlay
    Overlay,
}

impl fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayTarget::Card => "card",
            DisplayTarget::Countdown => "countdown",
            DisplayTarget::Overlay => "overlay",
        };
        f.write_str(name)
    }
}

/// All errors generated in `stock-dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("display target missing: {target} {detail}")]
    MissingDisplayTarget {
        target: DisplayTarget,
        detail: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn missing(target: DisplayTarget, detail: impl Into<String>) -> Self {
        Self::MissingDisplayTarget {
            target,
            detail: detail.into(),
        }
    }

    /// Determine if an error came from the network or from decoding a response.
    ///
    /// Callers cannot tell these apart and treat them the same way: log and
    /// fall back to an empty result.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_network_or_parse(&self) -> bool {
        match self {
            DashboardError::Request(_) | DashboardError::Status(_) | DashboardError::Decode(_) => {
                true
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
