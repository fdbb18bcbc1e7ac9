//! Ratatui rendering of the dashboard
//!
//! Status bar on top, a grid of cards below, the detail overlay and the
//! blocking notification drawn over everything when open.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Sparkline, Wrap},
};

use crate::{
    board::{Board, Card},
    dashboard::Dashboard,
    format::{StyleToken, format_currency},
    overlay::{DetailOverlay, Notification},
    types::PriceHistory,
};

pub const CARD_WIDTH: u16 = 30;
pub const CARD_HEIGHT: u16 = 6;

const OVERLAY_SIZE: (u16, u16) = (52, 18);
const NOTIFICATION_SIZE: (u16, u16) = (60, 7);

const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_HEADER: Color = Color::Rgb(180, 130, 220);
const C_ALERT: Color = Color::Rgb(255, 69, 58);

/// Number of card columns that fit in `width`
pub fn card_columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

pub fn render_dashboard(f: &mut Frame, dashboard: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    render_status_bar(f, chunks[0], dashboard);
    render_board(f, chunks[1], dashboard.board());

    if dashboard.overlay().is_visible() {
        render_overlay(f, f.area(), dashboard.overlay());
    }
    if let Some(notification) = dashboard.notification() {
        render_notification(f, f.area(), notification);
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let title = Span::styled(
        " ◆ STOCK DASHBOARD ◆ ",
        Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD),
    );

    let refreshed = match dashboard.last_refresh() {
        Some(at) => Span::styled(
            format!(" Updated {} ", at.with_timezone(&Local).format("%H:%M:%S")),
            Style::default().fg(C_ACCENT),
        ),
        None => Span::styled(" Waiting for data ", Style::default().fg(C_DIM)),
    };

    let mut spans = vec![title, refreshed];
    if let Some(countdown) = dashboard.board().countdown() {
        spans.push(Span::styled(
            format!(" Next refresh in {countdown} "),
            Style::default().fg(C_BRIGHT),
        ));
    }
    spans.push(Span::styled(
        " [←↑↓→] Select [Enter] Details [Esc] Close [Q] Quit ",
        Style::default().fg(C_DIM),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(C_HEADER));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_board(f: &mut Frame, area: Rect, board: &Board) {
    if board.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "Waiting for quotes...",
            Style::default().fg(C_DIM),
        )))
        .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let columns = card_columns(area.width);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let selected = board.selected_index().unwrap_or(0);
    let first_row = (selected / columns).saturating_sub(visible_rows - 1);

    for (index, card) in board.cards().enumerate() {
        let row = index / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let (Ok(col), Ok(row)) = (
            u16::try_from(index % columns),
            u16::try_from(row - first_row),
        ) else {
            continue;
        };

        let card_area = Rect {
            x: area.x + col * CARD_WIDTH,
            y: area.y + row * CARD_HEIGHT,
            width: CARD_WIDTH.min(area.width),
            height: CARD_HEIGHT.min(area.height),
        };
        render_card(f, card_area.intersection(area), card, index == selected);
    }
}

fn render_card(f: &mut Frame, area: Rect, card: &Card, selected: bool) {
    let color = card.style.color();
    let mut border_style = Style::default().fg(color);
    if selected {
        border_style = border_style.add_modifier(Modifier::BOLD);
    }

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", card.title),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border_style);

    let mut body_style = Style::default();
    if card.market_closed {
        body_style = body_style.add_modifier(Modifier::DIM);
    }

    let lines = vec![
        Line::from(Span::styled(
            card.price.clone(),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {} ", card.recommendation),
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Updated ", Style::default().fg(C_DIM)),
            Span::raw(card.last_updated.clone()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block).style(body_style);
    f.render_widget(paragraph, area);
}

fn render_overlay(f: &mut Frame, area: Rect, overlay: &DetailOverlay) {
    let rect = centered(OVERLAY_SIZE.0, OVERLAY_SIZE.1, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", overlay.title),
            Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(inner);

    let label = |text: &'static str| Span::styled(format!("{text:<16}"), Style::default().fg(C_DIM));
    let mut lines = vec![
        Line::from(vec![
            label("Price"),
            Span::styled(
                overlay.price.clone(),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![label("RSI"), Span::raw(overlay.rsi.clone())]),
        Line::from(vec![label("ADX"), Span::raw(overlay.adx.clone())]),
        Line::from(vec![
            label("Recommendation"),
            Span::styled(
                overlay.recommendation.clone(),
                Style::default()
                    .fg(overlay.style.color())
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(status) = &overlay.market_status {
        lines.push(Line::from(vec![label("Market"), Span::raw(status.clone())]));
    }
    lines.push(Line::from(vec![
        label("Last update"),
        Span::raw(overlay.last_updated.clone()),
    ]));
    lines.push(Line::from(Span::styled(
        "[Esc] Close",
        Style::default().fg(C_DIM),
    )));
    f.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(history) = &overlay.history {
        render_history(f, chunks[1], history);
    }
}

fn render_history(f: &mut Frame, area: Rect, history: &PriceHistory) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let change_color = if history.change_pct >= 0.0 {
        StyleToken::Buy.color()
    } else {
        StyleToken::Sell.color()
    };
    let summary = Line::from(vec![
        Span::styled("1M ", Style::default().fg(C_DIM)),
        Span::raw(format!(
            "min {} max {} ",
            format_currency(history.min),
            format_currency(history.max)
        )),
        Span::styled(
            format!("{:+.2}%", history.change_pct),
            Style::default().fg(change_color),
        ),
    ]);
    f.render_widget(Paragraph::new(summary), chunks[0]);

    let points = sparkline_points(&history.prices);
    if !points.is_empty() {
        let sparkline = Sparkline::default()
            .data(&points)
            .style(Style::default().fg(C_ACCENT))
            .max(100);
        f.render_widget(sparkline, chunks[1]);
    }
}

/// Scale prices to 1..=100 for the sparkline
fn sparkline_points(prices: &[f64]) -> Vec<u64> {
    let finite: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    finite
        .iter()
        .map(|price| {
            if range > 0.0 {
                1 + ((price - min) / range * 99.0).round() as u64
            } else {
                50
            }
        })
        .collect()
}

fn render_notification(f: &mut Frame, area: Rect, notification: &Notification) {
    let rect = centered(NOTIFICATION_SIZE.0, NOTIFICATION_SIZE.1, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Span::styled(
            " Notice ",
            Style::default().fg(C_ALERT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(C_ALERT));

    let lines = vec![
        Line::from(Span::raw(notification.message.clone())),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(C_DIM))),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, rect);
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
